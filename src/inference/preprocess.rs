//! Image preprocessing for the feature-extraction network.
//!
//! The extractor expects a fixed square resolution, 3-channel RGB, pixel
//! values scaled to [0, 1], batch-of-one NHWC layout.

use std::path::Path;

use image::imageops::FilterType;
use ndarray::Array4;

use super::InferenceError;

/// Input resolution of the feature-extraction network.
pub const INPUT_SIZE: u32 = 224;

/// Decode, resize and scale an image into a `[1, 224, 224, 3]` tensor.
pub fn image_tensor(path: &Path) -> Result<Array4<f32>, InferenceError> {
    let img = image::open(path).map_err(|e| InferenceError::ImageDecode(e.to_string()))?;
    Ok(tensor_from_image(&img))
}

/// Resize and scale an already-decoded image.
pub fn tensor_from_image(img: &image::DynamicImage) -> Array4<f32> {
    let resized = img
        .resize_exact(INPUT_SIZE, INPUT_SIZE, FilterType::Triangle)
        .to_rgb8();

    let size = INPUT_SIZE as usize;
    let mut tensor = Array4::<f32>::zeros((1, size, size, 3));
    for (x, y, pixel) in resized.enumerate_pixels() {
        for channel in 0..3 {
            tensor[[0, y as usize, x as usize, channel]] = pixel[channel] as f32 / 255.0;
        }
    }
    tensor
}
