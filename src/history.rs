use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use log::debug;

use crate::models::{Conversation, Message, PdfFile, UploadStatus};
use crate::upload::MAX_PROGRESS;

struct HistoryStore {
    conversations: Vec<Conversation>,
    /// Two-step deletion: the id parked here is removed only on an
    /// explicit confirm.
    pending_delete: Option<String>,
}

/// Browsable record of past conversations. Demonstration data only: the
/// store is in-memory, seeded with fixed sample content, and replies to
/// new messages with a canned echo instead of calling the backend.
#[derive(Clone)]
pub struct History {
    store: Arc<Mutex<HistoryStore>>,
    reply_delay: Duration,
}

impl History {
    pub fn new(reply_delay: Duration) -> Self {
        Self {
            store: Arc::new(Mutex::new(HistoryStore {
                conversations: Vec::new(),
                pending_delete: None,
            })),
            reply_delay,
        }
    }

    /// A history pre-populated with the sample conversations.
    pub fn with_demo_data(reply_delay: Duration) -> Self {
        let history = Self::new(reply_delay);
        {
            let mut store = history.store.lock().unwrap();
            store.conversations = demo_conversations();
        }
        history
    }

    pub fn conversations(&self) -> Vec<Conversation> {
        self.store.lock().unwrap().conversations.clone()
    }

    pub fn conversation(&self, id: &str) -> Option<Conversation> {
        self.store
            .lock()
            .unwrap()
            .conversations
            .iter()
            .find(|c| c.id == id)
            .cloned()
    }

    /// Append a message to one historical conversation and, after the
    /// reply delay, a canned echo answer. Sibling conversations are never
    /// touched. Returns the echo reply, or `None` if the text is blank,
    /// the conversation does not exist, or it was deleted mid-delay.
    pub async fn send_message(&self, id: &str, text: &str) -> Option<Message> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        {
            let mut store = self.store.lock().unwrap();
            let conversation = store.conversations.iter_mut().find(|c| c.id == id)?;
            conversation.messages.push(Message::user(text));
        }

        tokio::time::sleep(self.reply_delay).await;

        let reply = Message::assistant(format!("\"{text}\"에 대한 답변입니다."));
        let mut store = self.store.lock().unwrap();
        let conversation = store.conversations.iter_mut().find(|c| c.id == id)?;
        conversation.messages.push(reply.clone());
        Some(reply)
    }

    /// Park a conversation for deletion. Returns false if the id is
    /// unknown, in which case nothing is parked.
    pub fn request_delete(&self, id: &str) -> bool {
        let mut store = self.store.lock().unwrap();
        if store.conversations.iter().any(|c| c.id == id) {
            store.pending_delete = Some(id.to_string());
            true
        } else {
            false
        }
    }

    /// Carry out the parked deletion, removing exactly that conversation.
    /// No soft delete, no undo.
    pub fn confirm_delete(&self) -> Option<Conversation> {
        let mut store = self.store.lock().unwrap();
        let id = store.pending_delete.take()?;
        let index = store.conversations.iter().position(|c| c.id == id)?;
        let removed = store.conversations.remove(index);
        debug!("deleted conversation {} ({})", removed.id, removed.title);
        Some(removed)
    }

    pub fn cancel_delete(&self) {
        self.store.lock().unwrap().pending_delete = None;
    }
}

fn demo_file(name: &str, size_mb: u64) -> PdfFile {
    PdfFile {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        size: size_mb * 1024 * 1024,
        upload_progress: MAX_PROGRESS,
        status: UploadStatus::Ready,
    }
}

fn demo_message(role: crate::models::MessageRole, content: &str, days_ago: i64) -> Message {
    let mut message = Message::new(role, content);
    message.timestamp = Utc::now() - chrono::Duration::days(days_ago);
    message
}

fn demo_conversations() -> Vec<Conversation> {
    use crate::models::MessageRole::{Assistant, User};

    let mut lecture = Conversation::new("과거_강의노트.pdf", Some(demo_file("과거_강의노트.pdf", 5)));
    lecture.messages = vec![
        demo_message(
            Assistant,
            "안녕하세요! 이전에 업로드했던 \"과거_강의노트.pdf\"에 대해 질문해주세요.",
            2,
        ),
        demo_message(User, "이 문서의 주요 요점을 요약해 줄 수 있나요?", 2),
        demo_message(
            Assistant,
            "네, \"과거_강의노트.pdf\"의 주요 요점은 다음과 같습니다:\n\n\
             1. 핵심 개념: 인공지능의 기본 원리와 머신러닝 알고리즘.\n\
             2. 주요 이론: 딥러닝의 신경망 구조와 학습 방법.\n\
             3. 응용 분야: 자연어 처리 및 컴퓨터 비전에서의 활용 사례.\n\n\
             더 궁금한 점이 있으신가요?",
            2,
        ),
    ];

    let mut plan =
        Conversation::new("프로젝트_기획서_v1.pdf", Some(demo_file("프로젝트_기획서_v1.pdf", 8)));
    plan.messages = vec![
        demo_message(Assistant, "프로젝트 기획서에 대해 질문해주세요.", 5),
        demo_message(User, "핵심 목표는 무엇인가요?", 5),
        demo_message(Assistant, "핵심 목표는 사용자 경험 개선과 시장 점유율 확대입니다.", 5),
    ];

    let mut paper =
        Conversation::new("연구_논문_최종.pdf", Some(demo_file("연구_논문_최종.pdf", 12)));
    paper.messages = vec![
        demo_message(Assistant, "연구 논문에 대해 궁금한 점을 물어보세요.", 10),
        demo_message(User, "이 논문의 주요 기여는 무엇인가요?", 10),
        demo_message(
            Assistant,
            "이 논문은 새로운 알고리즘을 제안하여 기존 방법론의 한계를 극복하고, \
             실험을 통해 그 효율성을 입증했습니다.",
            10,
        ),
    ];

    vec![lecture, plan, paper]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MessageRole;

    fn demo() -> History {
        History::with_demo_data(Duration::ZERO)
    }

    #[test]
    fn demo_data_has_three_independent_conversations() {
        let history = demo();
        let conversations = history.conversations();
        assert_eq!(conversations.len(), 3);
        for conversation in &conversations {
            assert_eq!(conversation.messages.len(), 3);
            let file = conversation.uploaded_file.as_ref().unwrap();
            assert_eq!(file.status, UploadStatus::Ready);
            assert_eq!(file.name, conversation.title);
        }
    }

    #[tokio::test]
    async fn send_message_appends_user_then_canned_reply() {
        let history = demo();
        let id = history.conversations()[0].id.clone();

        let reply = history.send_message(&id, "핵심만 알려줘").await.unwrap();
        assert_eq!(reply.content, "\"핵심만 알려줘\"에 대한 답변입니다.");

        let conversation = history.conversation(&id).unwrap();
        assert_eq!(conversation.messages.len(), 5);
        let tail = &conversation.messages[3..];
        assert_eq!(tail[0].role, MessageRole::User);
        assert_eq!(tail[0].content, "핵심만 알려줘");
        assert_eq!(tail[1].role, MessageRole::Assistant);

        // Siblings untouched.
        for other in history.conversations().iter().filter(|c| c.id != id) {
            assert_eq!(other.messages.len(), 3);
        }
    }

    #[tokio::test]
    async fn blank_or_unknown_targets_append_nothing() {
        let history = demo();
        let id = history.conversations()[0].id.clone();
        assert!(history.send_message(&id, "   ").await.is_none());
        assert!(history.send_message("no-such-id", "질문").await.is_none());
        assert_eq!(history.conversation(&id).unwrap().messages.len(), 3);
    }

    #[test]
    fn deletion_is_two_step_and_removes_exactly_one_id() {
        let history = demo();
        let before = history.conversations();
        let target = before[1].id.clone();

        assert!(history.request_delete(&target));
        let removed = history.confirm_delete().unwrap();
        assert_eq!(removed.id, target);

        let after = history.conversations();
        assert_eq!(after.len(), 2);
        assert!(after.iter().all(|c| c.id != target));
        // The survivors are byte-for-byte what they were.
        for survivor in &after {
            let original = before.iter().find(|c| c.id == survivor.id).unwrap();
            assert_eq!(
                serde_json::to_string(survivor).unwrap(),
                serde_json::to_string(original).unwrap()
            );
        }
    }

    #[test]
    fn cancel_delete_keeps_the_conversation() {
        let history = demo();
        let target = history.conversations()[0].id.clone();
        assert!(history.request_delete(&target));
        history.cancel_delete();
        assert!(history.confirm_delete().is_none());
        assert_eq!(history.conversations().len(), 3);
    }

    #[test]
    fn confirm_without_request_is_a_noop() {
        let history = demo();
        assert!(history.confirm_delete().is_none());
        assert_eq!(history.conversations().len(), 3);
        assert!(!history.request_delete("missing"));
        assert!(history.confirm_delete().is_none());
    }
}
