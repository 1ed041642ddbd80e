//! Decoder for the IDX binary format used by MNIST and its derivatives
//! (Fashion-MNIST, EMNIST, ...).
//!
//! MNIST-style files decode with [`IdxLayout::Standard`]. EMNIST letters
//! store every image transposed and number the classes `1..=26`; decode
//! them with [`IdxLayout::EmnistLetters`], which transposes the pixels back
//! and shifts labels to `0..=25` (`a` is 0).
//!
//! # IDX3 image file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x03        (number of dimensions = 3)
//! bytes  4-7:   N           (number of images, big-endian u32)
//! bytes  8-11:  rows        (image height in pixels, big-endian u32)
//! bytes 12-15:  cols        (image width in pixels, big-endian u32)
//! bytes 16..:   N * rows * cols bytes, row-major, uint8
//! ```
//!
//! # IDX1 label file layout
//! ```text
//! bytes  0-1:   0x00 0x00   (reserved, must be zero)
//! byte   2:     0x08        (dtype = uint8)
//! byte   3:     0x01        (number of dimensions = 1)
//! bytes  4-7:   N           (number of labels, big-endian u32)
//! bytes  8..:   N bytes, each a class index
//! ```

use std::fs;
use std::path::Path;

use log::debug;

use crate::data::dataset::{DataSet, Match};
use crate::error::{Error, Result};

/// Decoded image block: dimensions plus one normalised pixel vector per image.
#[derive(Debug, Clone, PartialEq)]
pub struct IdxImages {
    pub rows: usize,
    pub cols: usize,
    pub images: Vec<Vec<f64>>,
}

/// Pixel and label conventions of an IDX pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdxLayout {
    /// Row-major images, labels are class indices.
    #[default]
    Standard,
    /// Transposed images, labels `1..=26` for `a..=z`.
    EmnistLetters,
}

impl IdxLayout {
    /// Value of the first class in the label file.
    pub fn label_offset(self) -> usize {
        match self {
            IdxLayout::Standard => 0,
            IdxLayout::EmnistLetters => 1,
        }
    }

    pub fn is_transposed(self) -> bool {
        matches!(self, IdxLayout::EmnistLetters)
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> usize {
    u32::from_be_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]]) as usize
}

fn check_header(bytes: &[u8], dims: u8, header_len: usize, what: &str) -> Result<()> {
    if bytes.len() < header_len {
        return Err(Error::DatasetFormat(format!(
            "IDX {what} file too short: expected at least {header_len} header bytes, got {}.",
            bytes.len()
        )));
    }
    if bytes[0] != 0x00 || bytes[1] != 0x00 {
        return Err(Error::DatasetFormat(format!(
            "IDX {what} file: bytes 0-1 must be 0x00 0x00 (reserved), got 0x{:02X} 0x{:02X}.",
            bytes[0], bytes[1]
        )));
    }
    if bytes[2] != 0x08 {
        return Err(Error::DatasetFormat(format!(
            "IDX {what} file: byte 2 (dtype) must be 0x08 (uint8), got 0x{:02X}.",
            bytes[2]
        )));
    }
    if bytes[3] != dims {
        return Err(Error::DatasetFormat(format!(
            "IDX {what} file: byte 3 (dimensions) must be {dims}, got {}.",
            bytes[3]
        )));
    }
    Ok(())
}

/// Resolves how many items to read given the declared count and an
/// optional caller limit.
fn take_count(declared: usize, limit: Option<usize>) -> Result<usize> {
    match limit {
        Some(n) if n > declared => Err(Error::InvalidArgument(format!(
            "requested {n} samples but the file only holds {declared}"
        ))),
        Some(n) => Ok(n),
        None => Ok(declared),
    }
}

/// Parses an IDX3 image file. Pixels are divided by 255 so values lie in
/// `[0, 1]`. `limit` reads only the first `limit` images.
pub fn parse_images(bytes: &[u8], limit: Option<usize>) -> Result<IdxImages> {
    parse_images_with(bytes, limit, IdxLayout::Standard)
}

/// Like [`parse_images`]; a transposed layout yields `cols × rows` images.
pub fn parse_images_with(bytes: &[u8], limit: Option<usize>, layout: IdxLayout) -> Result<IdxImages> {
    check_header(bytes, 0x03, 16, "image")?;

    let declared = read_u32(bytes, 4);
    let rows = read_u32(bytes, 8);
    let cols = read_u32(bytes, 12);
    let count = take_count(declared, limit)?;

    let n_pixels = rows.checked_mul(cols).ok_or_else(|| {
        Error::DatasetFormat(format!("IDX image file: rows * cols overflows (rows={rows}, cols={cols})."))
    })?;
    let required = count
        .checked_mul(n_pixels)
        .and_then(|n| n.checked_add(16))
        .ok_or_else(|| Error::DatasetFormat("IDX image file: data length overflows.".to_owned()))?;
    if bytes.len() < required {
        return Err(Error::DatasetFormat(format!(
            "IDX image file too short: {count} images of {rows}×{cols} pixels need {required} bytes, \
             file has {}.",
            bytes.len()
        )));
    }

    let images: Vec<Vec<f64>> = if n_pixels == 0 {
        vec![Vec::new(); count]
    } else {
        bytes[16..required]
            .chunks_exact(n_pixels)
            .map(|chunk| {
                if layout.is_transposed() {
                    transpose_pixels(chunk, rows, cols)
                } else {
                    chunk.iter().map(|&px| px as f64 / 255.0).collect()
                }
            })
            .collect()
    };

    if layout.is_transposed() {
        Ok(IdxImages { rows: cols, cols: rows, images })
    } else {
        Ok(IdxImages { rows, cols, images })
    }
}

/// Reads a row-major `rows × cols` image column by column.
fn transpose_pixels(chunk: &[u8], rows: usize, cols: usize) -> Vec<f64> {
    (0..cols)
        .flat_map(|c| (0..rows).map(move |r| chunk[r * cols + c] as f64 / 255.0))
        .collect()
}

/// Parses an IDX1 label file. `limit` reads only the first `limit` labels.
pub fn parse_labels(bytes: &[u8], limit: Option<usize>) -> Result<Vec<usize>> {
    parse_labels_with(bytes, limit, IdxLayout::Standard)
}

/// Like [`parse_labels`], shifting every label down by the layout's offset.
pub fn parse_labels_with(bytes: &[u8], limit: Option<usize>, layout: IdxLayout) -> Result<Vec<usize>> {
    check_header(bytes, 0x01, 8, "label")?;

    let declared = read_u32(bytes, 4);
    let count = take_count(declared, limit)?;
    if bytes.len() < 8 + count {
        return Err(Error::DatasetFormat(format!(
            "IDX label file too short: {count} labels need {} bytes, file has {}.",
            8 + count,
            bytes.len()
        )));
    }

    let offset = layout.label_offset();
    bytes[8..8 + count]
        .iter()
        .enumerate()
        .map(|(i, &l)| {
            (l as usize).checked_sub(offset).ok_or_else(|| {
                Error::DatasetFormat(format!(
                    "IDX label file: label {l} at index {i} is below the first class {offset}."
                ))
            })
        })
        .collect()
}

/// Decodes an image file and its label file into a labelled dataset.
pub fn parse_pair(image_bytes: &[u8], label_bytes: &[u8], limit: Option<usize>) -> Result<DataSet> {
    parse_pair_with(image_bytes, label_bytes, limit, IdxLayout::Standard)
}

pub fn parse_pair_with(
    image_bytes: &[u8],
    label_bytes: &[u8],
    limit: Option<usize>,
    layout: IdxLayout,
) -> Result<DataSet> {
    let declared_images = if image_bytes.len() >= 8 { read_u32(image_bytes, 4) } else { 0 };
    let declared_labels = if label_bytes.len() >= 8 { read_u32(label_bytes, 4) } else { 0 };

    let images = parse_images_with(image_bytes, limit, layout)?;
    let labels = parse_labels_with(label_bytes, limit, layout)?;
    if declared_images != declared_labels {
        return Err(Error::DatasetFormat(format!(
            "IDX file mismatch: image file declares {declared_images} items but label file declares \
             {declared_labels}."
        )));
    }

    let IdxImages { rows, cols, images } = images;
    Ok(images
        .into_iter()
        .zip(labels)
        .map(|(input, label)| Match::image(cols, rows, input, Some(label)))
        .collect())
}

/// Decodes an image file into an unlabelled dataset.
pub fn parse_unlabeled(image_bytes: &[u8], limit: Option<usize>) -> Result<DataSet> {
    parse_unlabeled_with(image_bytes, limit, IdxLayout::Standard)
}

pub fn parse_unlabeled_with(image_bytes: &[u8], limit: Option<usize>, layout: IdxLayout) -> Result<DataSet> {
    let IdxImages { rows, cols, images } = parse_images_with(image_bytes, limit, layout)?;
    Ok(images
        .into_iter()
        .map(|input| Match::image(cols, rows, input, None))
        .collect())
}

pub fn load_pair(image_path: impl AsRef<Path>, label_path: impl AsRef<Path>, limit: Option<usize>) -> Result<DataSet> {
    load_pair_with(image_path, label_path, limit, IdxLayout::Standard)
}

pub fn load_pair_with(
    image_path: impl AsRef<Path>,
    label_path: impl AsRef<Path>,
    limit: Option<usize>,
    layout: IdxLayout,
) -> Result<DataSet> {
    let image_path = image_path.as_ref();
    let label_path = label_path.as_ref();
    let set = parse_pair_with(&fs::read(image_path)?, &fs::read(label_path)?, limit, layout)?;
    debug!(
        "loaded {} samples ({:?}) from {} / {}",
        set.len(),
        layout,
        image_path.display(),
        label_path.display()
    );
    Ok(set)
}

pub fn load_unlabeled(image_path: impl AsRef<Path>, limit: Option<usize>) -> Result<DataSet> {
    load_unlabeled_with(image_path, limit, IdxLayout::Standard)
}

pub fn load_unlabeled_with(image_path: impl AsRef<Path>, limit: Option<usize>, layout: IdxLayout) -> Result<DataSet> {
    let image_path = image_path.as_ref();
    let set = parse_unlabeled_with(&fs::read(image_path)?, limit, layout)?;
    debug!("loaded {} unlabelled samples from {}", set.len(), image_path.display());
    Ok(set)
}
