use serde::{Deserialize, Serialize};

use crate::compositor::{Compositor, PixelFormat};
use crate::dxt1;
use crate::resample::resample_bilinear;
use crate::store::AnimatedGif;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextureFormat {
    Rgb8,
    Rgba8,
    Dxt1,
}

impl TextureFormat {
    /// Pixel format the canvas must be composited in before conversion.
    pub fn pixel_format(self) -> PixelFormat {
        match self {
            Self::Rgb8 | Self::Dxt1 => PixelFormat::Rgb,
            Self::Rgba8 => PixelFormat::Rgba,
        }
    }

    /// Bytes one frame occupies at the given texture dimensions.
    pub fn frame_bytes(self, width: u32, height: u32) -> usize {
        match self {
            Self::Rgb8 => width as usize * height as usize * 3,
            Self::Rgba8 => width as usize * height as usize * 4,
            Self::Dxt1 => dxt1::compressed_size(width, height),
        }
    }

    fn min_dimension(self) -> u32 {
        match self {
            Self::Dxt1 => dxt1::BLOCK_DIM,
            _ => 1,
        }
    }
}

/// Round up to the next power of two; downstream texture storage only
/// accepts power-of-two dimensions.
pub fn ceil_pow2(v: u32) -> u32 {
    v.max(1).next_power_of_two()
}

/// Texture dimensions for a canvas: next power of two, floored at the
/// format's block granularity.
pub fn texture_dimensions(image: &AnimatedGif, format: TextureFormat) -> (u32, u32) {
    let min = format.min_dimension();
    (
        ceil_pow2(image.width).max(min),
        ceil_pow2(image.height).max(min),
    )
}

/// The eager Output Adapter result: one retained buffer per frame, all in
/// the final texture format and texture dimensions.
#[derive(Debug, Clone)]
pub struct TextureBuffer {
    width: u32,
    height: u32,
    format: TextureFormat,
    frames: Vec<Vec<u8>>,
}

impl TextureBuffer {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_data(&self, index: usize) -> Option<&[u8]> {
        self.frames.get(index).map(|f| f.as_slice())
    }
}

/// Composite, resample and convert every frame of `image` up front.
///
/// Frames are processed strictly in index order so the previous-canvas
/// accumulator sees the same state the lazy path would; for any frame
/// index the output bytes are identical to compositing that frame lazily.
pub fn process_frames(image: &AnimatedGif, format: TextureFormat) -> TextureBuffer {
    let (tex_w, tex_h) = texture_dimensions(image, format);
    let pixel_format = format.pixel_format();
    let channels = pixel_format.channels();

    let mut compositor = Compositor::new(image, pixel_format);
    let mut scratch = vec![0u8; tex_w as usize * tex_h as usize * channels];
    let mut frames = Vec::with_capacity(image.frame_count());

    for index in 0..image.frame_count() {
        // Index is always in range here.
        let canvas = match compositor.composite(image, index) {
            Ok(canvas) => canvas,
            Err(_) => break,
        };

        resample_bilinear(
            canvas,
            image.width,
            image.height,
            &mut scratch,
            tex_w,
            tex_h,
            channels,
        );

        let frame = match format {
            TextureFormat::Rgb8 | TextureFormat::Rgba8 => scratch.clone(),
            TextureFormat::Dxt1 => dxt1::compress_rgb(&scratch, tex_w, tex_h),
        };
        frames.push(frame);
    }

    TextureBuffer {
        width: tex_w,
        height: tex_h,
        format,
        frames,
    }
}
