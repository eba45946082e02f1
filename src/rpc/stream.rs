//! Image streaming state for `stream_on` / `stream_off`.
//!
//! The `StreamManager` tracks whether the host asked for a stream, the
//! minimum delay between images, and how many images remain.

/// Validated `stream_on` arguments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamRequest {
    /// Minimum delay between images; 0 sends every frame.
    pub delay_ms: u32,
    /// Images to send before stopping; 0 streams until `stream_off`.
    pub num_frames: u32,
}

/// Stream subscription state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    /// Not streaming; no images sent.
    Inactive,
    /// Streaming. `remaining` is `None` for an unbounded stream.
    Active { delay_ms: u32, remaining: Option<u32> },
}

/// Manages image streaming to the connected host.
pub struct StreamManager {
    state: StreamState,
    elapsed_ms: u32,
    /// Number of images dropped due to backpressure.
    dropped_count: u32,
}

impl Default for StreamManager {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamManager {
    pub fn new() -> Self {
        Self {
            state: StreamState::Inactive,
            elapsed_ms: 0,
            dropped_count: 0,
        }
    }

    /// Start (or restart) streaming.
    pub fn start(&mut self, req: StreamRequest) {
        self.state = StreamState::Active {
            delay_ms: req.delay_ms,
            remaining: (req.num_frames > 0).then_some(req.num_frames),
        };
        // The first image goes out as soon as one is ready.
        self.elapsed_ms = req.delay_ms;
    }

    /// Stop streaming.
    pub fn stop(&mut self) {
        self.state = StreamState::Inactive;
    }

    /// Advance time. Returns `true` if the next ready image should be sent.
    pub fn tick(&mut self, delta_ms: u32) -> bool {
        match self.state {
            StreamState::Active { delay_ms, .. } => {
                self.elapsed_ms = self.elapsed_ms.saturating_add(delta_ms);
                self.elapsed_ms >= delay_ms
            }
            StreamState::Inactive => false,
        }
    }

    /// Record that an image was sent. Ends a bounded stream on its last
    /// image; returns `true` when that happens.
    pub fn record_sent(&mut self) -> bool {
        let StreamState::Active { delay_ms, remaining } = self.state else {
            return false;
        };
        self.elapsed_ms = 0;
        match remaining {
            Some(1) => {
                self.state = StreamState::Inactive;
                true
            }
            Some(n) => {
                self.state = StreamState::Active { delay_ms, remaining: Some(n - 1) };
                false
            }
            None => false,
        }
    }

    /// Record a dropped image (transport couldn't keep up).
    pub fn record_drop(&mut self) {
        self.dropped_count += 1;
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, StreamState::Active { .. })
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn dropped_count(&self) -> u32 {
        self.dropped_count
    }
}
