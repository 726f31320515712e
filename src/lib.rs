pub mod animator;
pub mod compositor;
pub mod decoder;
pub mod dxt1;
pub mod error;
pub mod resample;
pub mod sequencer;
pub mod store;
pub mod texture;

pub use animator::GifAnimator;
pub use compositor::{Compositor, PixelFormat};
pub use decoder::GiftexDecoder;
pub use error::{GiftexError, GiftexResult};
pub use resample::resample_bilinear;
pub use sequencer::{FrameSequencer, DEFAULT_FRAME_DELAY, MIN_FRAME_DELAY};
pub use store::{AnimatedGif, DisposalMode, FrameRecord};
pub use texture::{ceil_pow2, process_frames, texture_dimensions, TextureBuffer, TextureFormat};

pub const VERSION: &str = "0.3.0";
