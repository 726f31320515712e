use crate::error::{GiftexError, GiftexResult};
use crate::store::{AnimatedGif, DisposalMode, FrameRecord};
use image::{RgbImage, RgbaImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn channels(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// GIF89a interlace passes as (first row, row step). Later passes fill the
/// rows earlier passes skipped; the raster buffer stores rows pass-major.
const INTERLACE_PASSES: [(usize, usize); 4] = [(0, 8), (4, 8), (2, 4), (1, 2)];

/// Composites frames of an [`AnimatedGif`] onto a full-canvas pixel buffer.
///
/// The compositor owns the previous-canvas accumulator that GIF disposal
/// semantics are defined against. Results are only correct when frames are
/// composited in strictly increasing index order (wrapping from the last
/// frame back to 0 is fine); seeking requires [`Compositor::reset`] and a
/// replay from frame 0.
pub struct Compositor {
    format: PixelFormat,
    width: usize,
    height: usize,
    canvas: Vec<u8>,
    previous: Vec<u8>,
}

impl Compositor {
    pub fn new(image: &AnimatedGif, format: PixelFormat) -> Self {
        let size = image.width as usize * image.height as usize * format.channels();
        Self {
            format,
            width: image.width as usize,
            height: image.height as usize,
            canvas: vec![0; size],
            previous: vec![0; size],
        }
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width as u32
    }

    pub fn height(&self) -> u32 {
        self.height as u32
    }

    /// The working canvas as produced by the last [`Compositor::composite`].
    pub fn canvas(&self) -> &[u8] {
        &self.canvas
    }

    /// Zero both the working canvas and the previous-canvas accumulator,
    /// as if no frame had been composited yet.
    pub fn reset(&mut self) {
        self.canvas.fill(0);
        self.previous.fill(0);
    }

    /// Composite frame `index` over the accumulated state of all frames
    /// composited before it, then apply the frame's disposal method to the
    /// accumulator so the next sequential call sees the correct base.
    pub fn composite<'a>(
        &'a mut self,
        image: &AnimatedGif,
        index: usize,
    ) -> GiftexResult<&'a [u8]> {
        let frame = image
            .frame(index)
            .ok_or(GiftexError::FrameIndex(index))?;

        self.canvas.copy_from_slice(&self.previous);
        self.render_frame(image, frame);
        self.dispose(image, frame);

        Ok(&self.canvas)
    }

    fn render_frame(&mut self, image: &AnimatedGif, frame: &FrameRecord) {
        let palette = frame.palette(image);
        let height = frame.height as usize;

        if frame.interlaced {
            // Rows are stored pass-major; walk the flat raster in storage
            // order while targeting the logical row of each pass.
            let mut src_row = 0;
            for (first, step) in INTERLACE_PASSES {
                let mut y = first;
                while y < height {
                    self.render_row(frame, palette, src_row, y);
                    src_row += 1;
                    y += step;
                }
            }
        } else {
            for y in 0..height {
                self.render_row(frame, palette, y, y);
            }
        }
    }

    /// Draw raster row `src_row` of the frame at logical row `dst_row`.
    /// Transparent and out-of-palette indices leave the canvas untouched;
    /// coordinates outside the canvas are skipped.
    fn render_row(&mut self, frame: &FrameRecord, palette: &[u8], src_row: usize, dst_row: usize) {
        let screen_y = frame.top as usize + dst_row;
        if screen_y >= self.height {
            return;
        }

        let channels = self.format.channels();
        let frame_width = frame.width as usize;

        for x in 0..frame_width {
            let screen_x = frame.left as usize + x;
            if screen_x >= self.width {
                continue;
            }

            let Some(&index) = frame.indices.get(src_row * frame_width + x) else {
                // Short raster buffer, tolerate and stop this row.
                return;
            };
            if frame.transparent == Some(index) {
                continue;
            }
            let Some(rgb) = palette.get(index as usize * 3..index as usize * 3 + 3) else {
                continue;
            };

            let at = (screen_y * self.width + screen_x) * channels;
            self.canvas[at] = rgb[0];
            self.canvas[at + 1] = rgb[1];
            self.canvas[at + 2] = rgb[2];
            if channels == 4 {
                self.canvas[at + 3] = 255;
            }
        }
    }

    /// Mutate the previous-canvas accumulator for the next sequential frame.
    fn dispose(&mut self, image: &AnimatedGif, frame: &FrameRecord) {
        match frame.disposal {
            DisposalMode::RestoreBackground => {
                if let Some(rgb) = image.background_rgb() {
                    self.fill_previous_rect(frame, rgb);
                }
                // Background index outside the palette: leave the
                // accumulator unchanged, matching tolerant viewers.
            }
            DisposalMode::RestorePrevious => {}
            DisposalMode::Unspecified | DisposalMode::DoNotDispose => {
                self.previous.copy_from_slice(&self.canvas);
            }
        }
    }

    fn fill_previous_rect(&mut self, frame: &FrameRecord, rgb: [u8; 3]) {
        let channels = self.format.channels();
        let left = frame.left as usize;
        let top = frame.top as usize;
        let fill_w = (frame.width as usize).min(self.width.saturating_sub(left));
        let fill_h = (frame.height as usize).min(self.height.saturating_sub(top));

        for y in 0..fill_h {
            let row = ((top + y) * self.width + left) * channels;
            for x in 0..fill_w {
                let at = row + x * channels;
                self.previous[at] = rgb[0];
                self.previous[at + 1] = rgb[1];
                self.previous[at + 2] = rgb[2];
                if channels == 4 {
                    self.previous[at + 3] = 255;
                }
            }
        }
    }

    /// Snapshot the working canvas as an [`RgbImage`]. `None` unless the
    /// compositor was built with [`PixelFormat::Rgb`].
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        if self.format != PixelFormat::Rgb {
            return None;
        }
        RgbImage::from_raw(self.width as u32, self.height as u32, self.canvas.clone())
    }

    /// Snapshot the working canvas as an [`RgbaImage`]. `None` unless the
    /// compositor was built with [`PixelFormat::Rgba`].
    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        if self.format != PixelFormat::Rgba {
            return None;
        }
        RgbaImage::from_raw(self.width as u32, self.height as u32, self.canvas.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Four easily distinguished palette entries.
    const PALETTE: [u8; 12] = [
        10, 20, 30, // 0
        40, 50, 60, // 1
        70, 80, 90, // 2
        200, 210, 220, // 3
    ];

    fn image_2x2() -> AnimatedGif {
        AnimatedGif::new(2, 2, PALETTE.to_vec())
    }

    fn solid_frame(width: u32, height: u32, index: u8) -> FrameRecord {
        FrameRecord::new(width, height, vec![index; (width * height) as usize])
    }

    fn rgb_at(buf: &[u8], width: usize, x: usize, y: usize) -> [u8; 3] {
        let at = (y * width + x) * 3;
        [buf[at], buf[at + 1], buf[at + 2]]
    }

    fn palette_rgb(index: u8) -> [u8; 3] {
        let at = index as usize * 3;
        [PALETTE[at], PALETTE[at + 1], PALETTE[at + 2]]
    }

    #[test]
    fn single_frame_is_direct_palette_lookup() {
        let mut image = image_2x2();
        image.add_frame(FrameRecord::new(2, 2, vec![0, 1, 2, 3]));

        let mut compositor = Compositor::new(&image, PixelFormat::Rgb);
        let canvas = compositor.composite(&image, 0).unwrap();

        assert_eq!(rgb_at(canvas, 2, 0, 0), palette_rgb(0));
        assert_eq!(rgb_at(canvas, 2, 1, 0), palette_rgb(1));
        assert_eq!(rgb_at(canvas, 2, 0, 1), palette_rgb(2));
        assert_eq!(rgb_at(canvas, 2, 1, 1), palette_rgb(3));
    }

    #[test]
    fn transparent_subrect_preserves_prior_frame() {
        let mut image = image_2x2();
        image.add_frame(solid_frame(2, 2, 1));
        image.add_frame(
            FrameRecord::new(1, 1, vec![0])
                .with_offset(1, 1)
                .with_transparent(0),
        );

        let mut compositor = Compositor::new(&image, PixelFormat::Rgb);
        compositor.composite(&image, 0).unwrap();
        let canvas = compositor.composite(&image, 1).unwrap();

        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(rgb_at(canvas, 2, x, y), palette_rgb(1));
        }
    }

    #[test]
    fn restore_to_background_fills_subrect() {
        let mut image = image_2x2().with_background(2);
        image.add_frame(solid_frame(2, 2, 1).with_disposal(DisposalMode::RestoreBackground));
        // Second frame draws nothing (fully transparent 1x1).
        image.add_frame(FrameRecord::new(1, 1, vec![0]).with_transparent(0));

        let mut compositor = Compositor::new(&image, PixelFormat::Rgb);
        compositor.composite(&image, 0).unwrap();
        let canvas = compositor.composite(&image, 1).unwrap();

        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(rgb_at(canvas, 2, x, y), palette_rgb(2));
        }
    }

    #[test]
    fn background_index_out_of_palette_leaves_accumulator() {
        let mut image = image_2x2().with_background(200);
        image.add_frame(solid_frame(2, 2, 1).with_disposal(DisposalMode::RestoreBackground));
        image.add_frame(FrameRecord::new(1, 1, vec![0]).with_transparent(0));

        let mut compositor = Compositor::new(&image, PixelFormat::Rgb);
        compositor.composite(&image, 0).unwrap();
        let canvas = compositor.composite(&image, 1).unwrap();

        // Accumulator was never updated (no do-not-dispose ran), so the
        // second frame composites over the zeroed canvas.
        assert_eq!(rgb_at(canvas, 2, 0, 0), [0, 0, 0]);
    }

    #[test]
    fn restore_to_previous_recovers_pre_frame_canvas() {
        let mut image = image_2x2();
        image.add_frame(solid_frame(2, 2, 0)); // baseline, do-not-dispose
        image.add_frame(solid_frame(2, 2, 3).with_disposal(DisposalMode::RestorePrevious));
        image.add_frame(FrameRecord::new(1, 1, vec![0]).with_transparent(0));

        let mut compositor = Compositor::new(&image, PixelFormat::Rgb);
        compositor.composite(&image, 0).unwrap();
        compositor.composite(&image, 1).unwrap();
        let canvas = compositor.composite(&image, 2).unwrap();

        // Frame 2's base must be the canvas from before frame 1 drew.
        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(rgb_at(canvas, 2, x, y), palette_rgb(0));
        }
    }

    #[test]
    fn interlaced_frame_matches_sequential_rows() {
        // 2x8 frame, every row filled with its logical row number as the
        // palette index (palette padded to 8 entries).
        let mut palette = Vec::new();
        for i in 0..8u8 {
            palette.extend_from_slice(&[i * 10, i * 10 + 1, i * 10 + 2]);
        }

        let sequential: Vec<u8> = (0..8u8).flat_map(|row| [row, row]).collect();

        // Storage order for height 8: pass rows 0, 4, 2, 6, 1, 3, 5, 7.
        let storage_rows = [0u8, 4, 2, 6, 1, 3, 5, 7];
        let interlaced: Vec<u8> = storage_rows.iter().flat_map(|&row| [row, row]).collect();

        let mut plain = AnimatedGif::new(2, 8, palette.clone());
        plain.add_frame(FrameRecord::new(2, 8, sequential));

        let mut laced = AnimatedGif::new(2, 8, palette);
        laced.add_frame(FrameRecord::new(2, 8, interlaced).with_interlaced(true));

        let mut a = Compositor::new(&plain, PixelFormat::Rgb);
        let mut b = Compositor::new(&laced, PixelFormat::Rgb);
        let plain_out = a.composite(&plain, 0).unwrap().to_vec();
        let laced_out = b.composite(&laced, 0).unwrap();

        assert_eq!(plain_out, laced_out);
    }

    #[test]
    fn out_of_bounds_subrect_is_clipped() {
        let mut image = image_2x2();
        // 3x3 frame anchored at (1, 1) hangs off the 2x2 canvas.
        image.add_frame(solid_frame(3, 3, 3).with_offset(1, 1));

        let mut compositor = Compositor::new(&image, PixelFormat::Rgb);
        let canvas = compositor.composite(&image, 0).unwrap();

        assert_eq!(rgb_at(canvas, 2, 0, 0), [0, 0, 0]);
        assert_eq!(rgb_at(canvas, 2, 1, 1), palette_rgb(3));
    }

    #[test]
    fn out_of_palette_index_is_skipped() {
        let mut image = image_2x2();
        image.add_frame(FrameRecord::new(2, 2, vec![0, 9, 9, 3]));

        let mut compositor = Compositor::new(&image, PixelFormat::Rgb);
        let canvas = compositor.composite(&image, 0).unwrap();

        assert_eq!(rgb_at(canvas, 2, 0, 0), palette_rgb(0));
        assert_eq!(rgb_at(canvas, 2, 1, 0), [0, 0, 0]);
        assert_eq!(rgb_at(canvas, 2, 0, 1), [0, 0, 0]);
        assert_eq!(rgb_at(canvas, 2, 1, 1), palette_rgb(3));
    }

    #[test]
    fn rgba_written_pixels_are_opaque_untouched_stay_clear() {
        let mut image = image_2x2();
        image.add_frame(
            FrameRecord::new(1, 1, vec![1]).with_offset(0, 0),
        );

        let mut compositor = Compositor::new(&image, PixelFormat::Rgba);
        let canvas = compositor.composite(&image, 0).unwrap();

        assert_eq!(&canvas[0..4], &[40, 50, 60, 255]);
        assert_eq!(&canvas[4..8], &[0, 0, 0, 0]);
    }

    #[test]
    fn composite_same_frame_twice_is_identical() {
        let mut image = image_2x2();
        image.add_frame(FrameRecord::new(2, 2, vec![0, 1, 2, 3]));

        let mut compositor = Compositor::new(&image, PixelFormat::Rgb);
        let first = compositor.composite(&image, 0).unwrap().to_vec();
        let second = compositor.composite(&image, 0).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn composite_out_of_range_index_errors() {
        let image = image_2x2();
        let mut compositor = Compositor::new(&image, PixelFormat::Rgb);
        assert!(matches!(
            compositor.composite(&image, 0),
            Err(GiftexError::FrameIndex(0))
        ));
    }
}
