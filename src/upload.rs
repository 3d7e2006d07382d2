use crate::models::UploadStatus;

pub const MAX_PROGRESS: f64 = 100.0;

/// Outcome of a single simulated progress tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// Progress advanced but is still short of 100.
    Advancing,
    /// This tick clamped progress to 100 for the first time.
    Filled,
    /// The tracker is no longer in the uploading phase; the tick did nothing.
    Ignored,
}

/// Lifecycle of the tracked file: uploading → processing → ready, with
/// error reachable from any state before ready.
///
/// The simulated timeline (ticks and phase delays) and the real upload
/// request feed this machine independently. `Ready` requires both: the
/// simulated processing phase must have elapsed AND the backend must have
/// acknowledged the upload. Whichever arrives last completes the
/// transition, so the tracker can never claim readiness for a file the
/// server never received.
#[derive(Debug, Clone)]
pub struct UploadTracker {
    status: UploadStatus,
    progress: f64,
    timeline_complete: bool,
    upload_confirmed: bool,
}

impl Default for UploadTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadTracker {
    pub fn new() -> Self {
        Self {
            status: UploadStatus::Uploading,
            progress: 0.0,
            timeline_complete: false,
            upload_confirmed: false,
        }
    }

    pub fn status(&self) -> UploadStatus {
        self.status
    }

    /// Meaningful only while uploading or processing; forced to 100 on
    /// entering `Ready`.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Advance the simulated upload bar. Progress never decreases and is
    /// clamped to 100; the fill is reported exactly once.
    pub fn tick(&mut self, increment: f64) -> Tick {
        if self.status != UploadStatus::Uploading || self.progress >= MAX_PROGRESS {
            return Tick::Ignored;
        }
        if increment > 0.0 {
            self.progress = (self.progress + increment).min(MAX_PROGRESS);
        }
        if self.progress >= MAX_PROGRESS {
            Tick::Filled
        } else {
            Tick::Advancing
        }
    }

    /// Enter the processing phase. The bar restarts at 0 to represent the
    /// second, distinct phase of work. Valid only once the bar has filled.
    pub fn begin_processing(&mut self) {
        if self.status == UploadStatus::Uploading && self.progress >= MAX_PROGRESS {
            self.status = UploadStatus::Processing;
            self.progress = 0.0;
        }
    }

    /// The simulated processing delay has elapsed.
    pub fn finish_processing(&mut self) {
        if self.status == UploadStatus::Processing {
            self.timeline_complete = true;
            self.try_ready();
        }
    }

    /// The real upload request succeeded.
    pub fn confirm_upload(&mut self) {
        if self.status != UploadStatus::Error {
            self.upload_confirmed = true;
            self.try_ready();
        }
    }

    /// The real upload request failed. Terminal: the user has to remove
    /// the file and retry, nothing advances out of `Error`.
    pub fn fail_upload(&mut self) {
        if self.status != UploadStatus::Ready {
            self.status = UploadStatus::Error;
        }
    }

    fn try_ready(&mut self) {
        if self.status == UploadStatus::Processing && self.timeline_complete && self.upload_confirmed
        {
            self.status = UploadStatus::Ready;
            self.progress = MAX_PROGRESS;
        }
    }
}
