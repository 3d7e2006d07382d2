//! Core of a PDF question-answering chat client: the upload/processing
//! status lifecycle, the live chat session, the in-memory conversation
//! history, and the client for the backend upload and RAG endpoints.

pub mod api;
pub mod config;
pub mod history;
pub mod models;
pub mod session;
pub mod upload;

pub use api::{ApiClient, ApiError};
pub use config::{ClientConfig, UploadTimings};
pub use history::History;
pub use models::{Conversation, Message, MessageRole, PdfFile, UploadStatus, FILE_UPLOADED};
pub use session::ChatSession;
pub use upload::{Tick, UploadTracker};
