pub mod observer;

pub use observer::{progress_bar, LogObserver, NetworkEvent, NetworkObserver, PersistStatus};
