pub mod codec;
pub mod persistence;
pub mod snapshot;

pub use codec::{NetworkCodec, NETWORK_FILE_EXTENSION};
pub use snapshot::{LayerSnapshot, NetworkSnapshot, SNAPSHOT_FORMAT_VERSION};
