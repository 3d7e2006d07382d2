use std::sync::{Arc, Mutex};

use log::{debug, error, info};
use rand::Rng;

use crate::api::{ApiClient, ApiError};
use crate::config::ClientConfig;
use crate::models::{Message, PdfFile, UploadStatus};
use crate::upload::{Tick, UploadTracker};

/// Shown in place of an answer when the chat request fails without a
/// backend-provided error message.
pub const ANSWER_FAILED: &str = "답변을 가져오는 중 오류가 발생했습니다.";

struct SessionState {
    file: Option<PdfFile>,
    tracker: Option<UploadTracker>,
    messages: Vec<Message>,
    in_flight: bool,
    /// Bumped whenever the tracked file is replaced or removed. Timer
    /// drivers and in-flight replies carry the generation they started
    /// under and stop once it no longer matches.
    generation: u64,
}

impl SessionState {
    fn sync_file(&mut self) {
        if let (Some(file), Some(tracker)) = (self.file.as_mut(), self.tracker.as_ref()) {
            file.status = tracker.status();
            file.upload_progress = tracker.progress();
        }
    }
}

/// The live chat screen's working set: one optional tracked file and one
/// message transcript, plus the in-flight gate for question submission.
///
/// Cloning shares the underlying state, so a clone can be handed to the
/// rendering layer while background tasks keep driving the lifecycle.
#[derive(Clone)]
pub struct ChatSession {
    state: Arc<Mutex<SessionState>>,
    api: ApiClient,
    config: ClientConfig,
}

impl ChatSession {
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let api = ApiClient::new(&config)?;
        Ok(Self {
            state: Arc::new(Mutex::new(SessionState {
                file: None,
                tracker: None,
                messages: Vec::new(),
                in_flight: false,
                generation: 0,
            })),
            api,
            config,
        })
    }

    /// Accept a new PDF. Replaces any previous file, resets the transcript
    /// to the single file-status marker message, and starts two concurrent
    /// tasks: the simulated progress timeline and the real upload request.
    /// Must be called from within a tokio runtime.
    pub fn attach_file(&self, name: impl Into<String>, bytes: Vec<u8>) -> PdfFile {
        let name = name.into();
        let file = PdfFile::new(name.clone(), bytes.len() as u64);
        let generation = {
            let mut state = self.state.lock().unwrap();
            state.generation += 1;
            state.file = Some(file.clone());
            state.tracker = Some(UploadTracker::new());
            state.messages = vec![Message::file_uploaded()];
            state.in_flight = false;
            state.generation
        };
        info!("accepted {} ({} bytes)", file.name, file.size);

        let sim = self.clone();
        tokio::spawn(async move { sim.run_simulation(generation).await });

        let uploader = self.clone();
        tokio::spawn(async move {
            match uploader.api.upload_pdf(&name, bytes).await {
                Ok(()) => {
                    debug!("upload of {name} confirmed");
                    uploader.with_tracker(generation, UploadTracker::confirm_upload);
                }
                Err(e) => {
                    error!("PDF upload failed: {e}");
                    uploader.with_tracker(generation, UploadTracker::fail_upload);
                }
            }
        });

        file
    }

    /// Drop the current file and the whole transcript. Invalidates any
    /// timers or in-flight replies still running against the old file.
    pub fn remove_file(&self) {
        let mut state = self.state.lock().unwrap();
        state.generation += 1;
        state.file = None;
        state.tracker = None;
        state.messages.clear();
        state.in_flight = false;
        debug!("session reset");
    }

    /// Whether a question could be submitted right now: non-blank text,
    /// nothing in flight, and a file in exactly the `Ready` state.
    pub fn can_ask(&self, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }
        let state = self.state.lock().unwrap();
        !state.in_flight
            && state.file.as_ref().map(|f| f.status) == Some(UploadStatus::Ready)
    }

    /// Submit a question. A rejected submission appends nothing and makes
    /// no network call. An accepted one appends the user message at once,
    /// then exactly one assistant message: the backend's answer, or a
    /// human-readable error string if the request failed. Returns the
    /// assistant content, or `None` if the gate rejected the submission or
    /// the file was replaced while the request was in flight.
    pub async fn ask(&self, text: &str) -> Option<String> {
        let question = text.trim().to_string();
        if question.is_empty() {
            return None;
        }
        let generation = {
            let mut state = self.state.lock().unwrap();
            let ready =
                state.file.as_ref().map(|f| f.status) == Some(UploadStatus::Ready);
            if state.in_flight || !ready {
                return None;
            }
            state.in_flight = true;
            state.messages.push(Message::user(question.clone()));
            state.generation
        };

        let reply = match self.api.ask(&question).await {
            Ok(answer) => answer,
            Err(e @ ApiError::Api { .. }) => {
                error!("RAG chat request rejected: {e}");
                e.to_string()
            }
            Err(e) => {
                error!("RAG chat request failed: {e}");
                ANSWER_FAILED.to_string()
            }
        };

        let mut state = self.state.lock().unwrap();
        if state.generation != generation {
            // The file was removed or replaced mid-flight; the reply no
            // longer belongs to the current transcript.
            return None;
        }
        state.messages.push(Message::assistant(reply.clone()));
        state.in_flight = false;
        Some(reply)
    }

    /// Snapshot of the tracked file, if any.
    pub fn file(&self) -> Option<PdfFile> {
        self.state.lock().unwrap().file.clone()
    }

    /// Snapshot of the transcript in display order.
    pub fn messages(&self) -> Vec<Message> {
        self.state.lock().unwrap().messages.clone()
    }

    /// True while a question round-trip is outstanding.
    pub fn is_loading(&self) -> bool {
        self.state.lock().unwrap().in_flight
    }

    async fn run_simulation(&self, generation: u64) {
        let timings = self.config.upload.clone();
        let bound = timings.max_increment.max(f64::MIN_POSITIVE);
        loop {
            tokio::time::sleep(timings.tick_interval()).await;
            let increment = rand::rng().random_range(0.0..bound);
            match self.with_tracker(generation, |t| t.tick(increment)) {
                Some(Tick::Advancing) => continue,
                Some(Tick::Filled) => break,
                // Superseded file or a tracker already in error.
                Some(Tick::Ignored) | None => return,
            }
        }
        // Hold the full bar briefly before flipping phases.
        tokio::time::sleep(timings.full_bar_hold()).await;
        if self
            .with_tracker(generation, UploadTracker::begin_processing)
            .is_none()
        {
            return;
        }
        tokio::time::sleep(timings.processing()).await;
        self.with_tracker(generation, UploadTracker::finish_processing);
    }

    /// Run `f` against the tracker iff the session still belongs to the
    /// given generation, then mirror status and progress into the file
    /// record. Returns `None` when the file has been superseded.
    fn with_tracker<R>(
        &self,
        generation: u64,
        f: impl FnOnce(&mut UploadTracker) -> R,
    ) -> Option<R> {
        let mut state = self.state.lock().unwrap();
        if state.generation != generation {
            return None;
        }
        let result = state.tracker.as_mut().map(f);
        state.sync_file();
        result
    }
}
