use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel message content. A `system` message carrying this value marks
/// the spot in the transcript where the file-status card is rendered
/// instead of literal text.
pub const FILE_UPLOADED: &str = "FILE_UPLOADED";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub role: MessageRole,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            role,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }

    /// The marker message inserted when a file is accepted.
    pub fn file_uploaded() -> Self {
        Self::new(MessageRole::System, FILE_UPLOADED)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Uploading,
    Processing,
    Ready,
    Error,
}

/// The single tracked file of a chat session, or a snapshot of one inside
/// a historical conversation. The raw bytes are not kept here; they live
/// only as long as the upload request needs them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PdfFile {
    pub id: String,
    pub name: String,
    pub size: u64,
    pub upload_progress: f64,
    pub status: UploadStatus,
}

impl PdfFile {
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            size,
            upload_progress: 0.0,
            status: UploadStatus::Uploading,
        }
    }
}

/// A titled, ordered transcript, optionally tied to one uploaded file.
/// Conversations are independent records; they never share messages or
/// file snapshots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub uploaded_file: Option<PdfFile>,
}

impl Conversation {
    pub fn new(title: impl Into<String>, uploaded_file: Option<PdfFile>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            messages: Vec::new(),
            uploaded_file,
        }
    }
}
