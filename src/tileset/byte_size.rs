//! `computeByteSize` (spec §4.5, §8 byte-size identity), grounded in
//! `examples/original_source/Cesium3DTilesSelection/src/Tile.cpp`'s `Tile::computeByteSize`.

use crate::content::Model;

/// Sum of buffer bytes, plus decoded image bytes, minus the source buffer-view bytes for images
/// that were themselves decoded from a buffer (so embedded-image bytes aren't counted twice).
pub fn compute_byte_size(model: &Model) -> usize {
    let buffer_bytes: usize = model.buffers.iter().map(|b| b.data.len()).sum();

    let mut image_bytes = 0usize;
    for image in &model.images {
        image_bytes += image.pixel_data.len();
        if let Some(buffer_view) = image.buffer_view {
            if let Some(length) = model.buffer_view_lengths.get(buffer_view) {
                image_bytes = image_bytes.saturating_sub(*length);
            }
        }
    }

    buffer_bytes + image_bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{Buffer, Image};

    #[test]
    fn subtracts_source_buffer_view_for_decoded_images() {
        let model = Model {
            buffers: vec![Buffer {
                data: vec![0u8; 1000],
            }],
            images: vec![Image {
                buffer_view: Some(0),
                pixel_data: vec![0u8; 4000],
            }],
            buffer_view_lengths: vec![600],
        };
        // 1000 (buffer) + 4000 (decoded image) - 600 (source bytes already counted in the buffer)
        assert_eq!(compute_byte_size(&model), 4400);
    }

    #[test]
    fn image_without_buffer_view_is_additive() {
        let model = Model {
            buffers: vec![Buffer { data: vec![0u8; 100] }],
            images: vec![Image {
                buffer_view: None,
                pixel_data: vec![0u8; 50],
            }],
            buffer_view_lengths: vec![],
        };
        assert_eq!(compute_byte_size(&model), 150);
    }
}
