use serde::{Deserialize, Serialize};

/// Per-frame instruction for how the canvas is treated before the next
/// frame is drawn. Unknown raw values are normalized to `Unspecified`,
/// which composites exactly like `DoNotDispose`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DisposalMode {
    Unspecified,
    DoNotDispose,
    RestoreBackground,
    RestorePrevious,
}

impl Default for DisposalMode {
    fn default() -> Self {
        Self::Unspecified
    }
}

/// One decoded GIF sub-image plus its graphics-control metadata.
///
/// `indices` is the flat palette-index raster, `width * height` bytes.
/// When `interlaced` is set the rows are stored in the four-pass GIF
/// interlace order rather than sequentially.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameRecord {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
    pub local_palette: Option<Vec<u8>>,
    pub indices: Vec<u8>,
    pub interlaced: bool,
    pub disposal: DisposalMode,
    pub transparent: Option<u8>,
    pub delay_hundredths: u16,
}

impl FrameRecord {
    pub fn new(width: u32, height: u32, indices: Vec<u8>) -> Self {
        Self {
            left: 0,
            top: 0,
            width,
            height,
            local_palette: None,
            indices,
            interlaced: false,
            disposal: DisposalMode::default(),
            transparent: None,
            delay_hundredths: 10,
        }
    }

    pub fn with_offset(mut self, left: u32, top: u32) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    pub fn with_palette(mut self, palette: Vec<u8>) -> Self {
        self.local_palette = Some(palette);
        self
    }

    pub fn with_disposal(mut self, disposal: DisposalMode) -> Self {
        self.disposal = disposal;
        self
    }

    pub fn with_transparent(mut self, index: u8) -> Self {
        self.transparent = Some(index);
        self
    }

    pub fn with_delay(mut self, hundredths: u16) -> Self {
        self.delay_hundredths = hundredths;
        self
    }

    pub fn with_interlaced(mut self, interlaced: bool) -> Self {
        self.interlaced = interlaced;
        self
    }

    /// The palette this frame's indices resolve against: the local color
    /// table when present, the global one otherwise.
    pub fn palette<'a>(&'a self, image: &'a AnimatedGif) -> &'a [u8] {
        self.local_palette
            .as_deref()
            .unwrap_or(&image.global_palette)
    }
}

/// A fully materialized GIF: logical-screen attributes plus every frame.
/// Immutable after decode; compositing state lives in [`crate::Compositor`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimatedGif {
    pub width: u32,
    pub height: u32,
    /// Global color table as RGB triples. May be empty.
    pub global_palette: Vec<u8>,
    /// Background color index into the global palette, if declared.
    pub background: Option<usize>,
    pub frames: Vec<FrameRecord>,
}

impl AnimatedGif {
    pub fn new(width: u32, height: u32, global_palette: Vec<u8>) -> Self {
        Self {
            width,
            height,
            global_palette,
            background: None,
            frames: Vec::new(),
        }
    }

    pub fn with_background(mut self, index: usize) -> Self {
        self.background = Some(index);
        self
    }

    pub fn add_frame(&mut self, frame: FrameRecord) {
        self.frames.push(frame);
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame(&self, index: usize) -> Option<&FrameRecord> {
        self.frames.get(index)
    }

    pub fn is_animated(&self) -> bool {
        self.frames.len() > 1
    }

    pub fn total_duration_hundredths(&self) -> u32 {
        self.frames.iter().map(|f| f.delay_hundredths as u32).sum()
    }

    /// Background color as an RGB triple, or `None` when the background
    /// index is absent or outside the global palette.
    pub fn background_rgb(&self) -> Option<[u8; 3]> {
        let index = self.background?;
        let rgb = self.global_palette.get(index * 3..index * 3 + 3)?;
        Some([rgb[0], rgb[1], rgb[2]])
    }
}
