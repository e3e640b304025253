use anyhow::Result;

/// Browser handle of a requested frame, needed to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHandle(pub i32);

pub trait FrameSource {
    fn request_frame(&self) -> Result<FrameHandle>;
    fn cancel_frame(&self, handle: FrameHandle) -> Result<()>;
}

/// Owns the single outstanding "next frame" request
///
/// ┌──────────── Scheduler States ────────────┐
/// │  idle     ── schedule() ──►  pending     │
/// │  pending  ── on_frame() ──►  idle        │
/// │  pending  ── halt()     ──►  halted      │
/// │  halted   ── resume()   ──►  pending     │
/// └──────────────────────────────────────────┘
/// At most one frame is ever pending, so pausing and unpausing repeatedly
/// cannot stack up requests.
pub struct FrameScheduler<S: FrameSource> {
    source: S,
    pending: Option<FrameHandle>,
    halted: bool,
}

impl<S: FrameSource> FrameScheduler<S> {
    pub fn new(source: S) -> Self {
        FrameScheduler {
            source,
            pending: None,
            halted: false,
        }
    }

    pub fn schedule(&mut self) -> Result<()> {
        if self.halted || self.pending.is_some() {
            return Ok(());
        }
        self.pending = Some(self.source.request_frame()?);
        Ok(())
    }

    /// Called when a requested frame fires, returns whether it should run
    pub fn on_frame(&mut self) -> bool {
        self.pending = None;
        !self.halted
    }

    pub fn halt(&mut self) -> Result<()> {
        self.halted = true;
        if let Some(handle) = self.pending.take() {
            self.source.cancel_frame(handle)?;
        }
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.halted = false;
        self.schedule()
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
