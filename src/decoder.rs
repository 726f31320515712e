use std::io::Cursor;

use gif::{ColorOutput, DecodeOptions};
use log::debug;

use crate::error::{GiftexError, GiftexResult};
use crate::store::{AnimatedGif, DisposalMode, FrameRecord};

/// Adapter over the `gif` crate: fully materializes an in-memory GIF byte
/// stream into an [`AnimatedGif`] frame store.
///
/// Container-level failures map to [`GiftexError::Open`], truncated or
/// corrupt frame data to [`GiftexError::Slurp`]; on either, all partially
/// decoded state is dropped. Closing is plain ownership: drop the
/// returned [`AnimatedGif`].
pub struct GiftexDecoder;

impl GiftexDecoder {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(&self, bytes: &[u8]) -> GiftexResult<AnimatedGif> {
        let mut options = DecodeOptions::new();
        options.set_color_output(ColorOutput::Indexed);

        let mut reader = options
            .read_info(Cursor::new(bytes))
            .map_err(GiftexError::Open)?;

        let mut image = AnimatedGif::new(
            reader.width() as u32,
            reader.height() as u32,
            reader
                .global_palette()
                .map(|p| p.to_vec())
                .unwrap_or_default(),
        );
        image.background = reader.bg_color();

        while let Some(frame) = reader.read_next_frame().map_err(GiftexError::Slurp)? {
            image.add_frame(convert_frame(frame));
        }

        debug!(
            "decoded GIF: {}x{}, {} frames",
            image.width,
            image.height,
            image.frame_count()
        );

        Ok(image)
    }
}

impl Default for GiftexDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn convert_frame(frame: &gif::Frame<'_>) -> FrameRecord {
    FrameRecord {
        left: frame.left as u32,
        top: frame.top as u32,
        width: frame.width as u32,
        height: frame.height as u32,
        local_palette: frame.palette.clone(),
        indices: frame.buffer.to_vec(),
        // The high-level reader de-interlaces while decoding, so the
        // raster is already in sequential row order here.
        interlaced: false,
        disposal: convert_disposal(frame.dispose),
        transparent: frame.transparent,
        delay_hundredths: frame.delay,
    }
}

fn convert_disposal(method: gif::DisposalMethod) -> DisposalMode {
    match method {
        gif::DisposalMethod::Any => DisposalMode::Unspecified,
        gif::DisposalMethod::Keep => DisposalMode::DoNotDispose,
        gif::DisposalMethod::Background => DisposalMode::RestoreBackground,
        gif::DisposalMethod::Previous => DisposalMode::RestorePrevious,
    }
}
