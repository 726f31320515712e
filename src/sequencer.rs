use std::time::{Duration, Instant};

use crate::store::AnimatedGif;

/// Delays below this are treated as degenerate and replaced with
/// [`DEFAULT_FRAME_DELAY`], the clamp web browsers apply to absurdly
/// fast GIFs.
pub const MIN_FRAME_DELAY: Duration = Duration::from_millis(20);
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

/// Tracks the currently selected frame and the wall-clock deadline at
/// which the animation should move on to the next one.
///
/// Mutation happens only through [`FrameSequencer::advance`];
/// [`FrameSequencer::should_advance`] is a pure query. With zero frames
/// every operation is a neutral no-op.
#[derive(Debug, Clone)]
pub struct FrameSequencer {
    selected: usize,
    delays: Vec<u16>,
    next_due: Option<Instant>,
}

impl FrameSequencer {
    pub fn new(image: &AnimatedGif) -> Self {
        let delays: Vec<u16> = image.frames.iter().map(|f| f.delay_hundredths).collect();
        let next_due = delays
            .first()
            .map(|&d| Instant::now() + effective_delay(d));
        Self {
            selected: 0,
            delays,
            next_due,
        }
    }

    /// A sequencer over zero frames; all operations are no-ops.
    pub fn empty() -> Self {
        Self {
            selected: 0,
            delays: Vec::new(),
            next_due: None,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.delays.len()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Step to the next frame, wrapping to 0 past the end, and re-arm the
    /// advance deadline from the new frame's delay. Returns `true` when
    /// the step wrapped (a full cycle completed).
    pub fn advance(&mut self) -> bool {
        self.advance_at(Instant::now())
    }

    /// `true` once the current frame's display interval has elapsed.
    pub fn should_advance(&self) -> bool {
        self.should_advance_at(Instant::now())
    }

    pub fn advance_at(&mut self, now: Instant) -> bool {
        if self.delays.is_empty() {
            return false;
        }

        self.selected += 1;
        if self.selected >= self.delays.len() {
            self.selected = 0;
        }

        self.next_due = Some(now + effective_delay(self.delays[self.selected]));

        self.selected == 0
    }

    pub fn should_advance_at(&self, now: Instant) -> bool {
        match self.next_due {
            Some(due) => due < now,
            None => false,
        }
    }
}

/// Delay in hundredths of a second to wall-clock duration, with the
/// minimum-delay floor applied.
fn effective_delay(hundredths: u16) -> Duration {
    let delay = Duration::from_millis(hundredths as u64 * 10);
    if delay < MIN_FRAME_DELAY {
        DEFAULT_FRAME_DELAY
    } else {
        delay
    }
}
