use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread;

use log::warn;

use crate::decoder::GiftexDecoder;
use crate::error::GiftexResult;
use crate::sequencer::FrameSequencer;
use crate::store::AnimatedGif;
use crate::texture::{process_frames, TextureBuffer, TextureFormat};

#[derive(Default)]
struct Shared {
    buffer: OnceLock<TextureBuffer>,
    processed: AtomicBool,
}

/// High-level GIF-to-texture helper: owns the decoded image, a one-shot
/// background worker that eagerly converts every frame to the selected
/// texture format, and the frame sequencer.
///
/// Workflow: [`GifAnimator::open`], poll [`GifAnimator::is_processed`]
/// until the worker publishes, then drive the animation with
/// [`GifAnimator::should_advance`] / [`GifAnimator::next_frame`] and read
/// [`GifAnimator::frame_data`]. Every operation on a never-opened or
/// closed animator is a safe no-op returning a neutral value.
pub struct GifAnimator {
    format: TextureFormat,
    image: Option<Arc<AnimatedGif>>,
    shared: Arc<Shared>,
    worker: Option<thread::JoinHandle<()>>,
    sequencer: FrameSequencer,
}

impl GifAnimator {
    pub fn new(format: TextureFormat) -> Self {
        Self {
            format,
            image: None,
            shared: Arc::new(Shared::default()),
            worker: None,
            sequencer: FrameSequencer::empty(),
        }
    }

    /// Decode `bytes` and start the background texture worker.
    ///
    /// Any previously opened image is closed first, which joins its
    /// worker before state is reinitialized; the worker runs at most once
    /// per opened image.
    pub fn open(&mut self, bytes: &[u8]) -> GiftexResult<()> {
        self.close();

        let image = Arc::new(GiftexDecoder::new().decode(bytes)?);
        let shared = Arc::new(Shared::default());

        let worker_image = Arc::clone(&image);
        let worker_shared = Arc::clone(&shared);
        let format = self.format;
        let worker = thread::Builder::new()
            .name("giftex-texture-proc".into())
            .spawn(move || {
                if worker_image.frame_count() == 0 {
                    // Readiness is all-or-nothing: leave the flag unset so
                    // callers fall back to their placeholder display.
                    warn!("GIF has no frames, texture processing skipped");
                    return;
                }
                let buffer = process_frames(&worker_image, format);
                let _ = worker_shared.buffer.set(buffer);
                worker_shared.processed.store(true, Ordering::Release);
            })?;

        self.sequencer = FrameSequencer::new(&image);
        self.image = Some(image);
        self.shared = shared;
        self.worker = Some(worker);

        Ok(())
    }

    /// Join the worker and release the image and all texture buffers.
    /// Idempotent; also runs on drop.
    pub fn close(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.image = None;
        self.shared = Arc::new(Shared::default());
        self.sequencer = FrameSequencer::empty();
    }

    /// Whether the background worker has published all frames.
    pub fn is_processed(&self) -> bool {
        self.shared.processed.load(Ordering::Acquire)
    }

    pub fn is_open(&self) -> bool {
        self.image.is_some()
    }

    pub fn image(&self) -> Option<&AnimatedGif> {
        self.image.as_deref()
    }

    pub fn frame_count(&self) -> usize {
        self.image.as_ref().map_or(0, |image| image.frame_count())
    }

    pub fn selected_frame(&self) -> usize {
        self.sequencer.selected()
    }

    /// Advance to the next frame, wrapping past the end; `true` when the
    /// animation just looped back to frame 0.
    pub fn next_frame(&mut self) -> bool {
        self.sequencer.advance()
    }

    /// Whether the current frame's display interval has elapsed.
    pub fn should_advance(&self) -> bool {
        self.sequencer.should_advance()
    }

    /// Texture bytes of the selected frame, once processing completed.
    pub fn frame_data(&self) -> Option<&[u8]> {
        if !self.is_processed() {
            return None;
        }
        self.shared
            .buffer
            .get()?
            .frame_data(self.sequencer.selected())
    }

    /// Texture resolution, `(0, 0)` until processing completed.
    pub fn frame_size(&self) -> (u32, u32) {
        if !self.is_processed() {
            return (0, 0);
        }
        match self.shared.buffer.get() {
            Some(buffer) => (buffer.width(), buffer.height()),
            None => (0, 0),
        }
    }

    pub fn format(&self) -> TextureFormat {
        self.format
    }
}

impl Drop for GifAnimator {
    fn drop(&mut self) {
        self.close();
    }
}
