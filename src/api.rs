use reqwest::{multipart, Client, Response};
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;

/// Fallback when an upload failure carries no parseable `{ error }` body.
pub const UPLOAD_FAILED: &str = "업로드 실패";
/// Fallback when a chat failure carries no parseable `{ error }` body.
pub const CHAT_FAILED: &str = "서버 오류";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-2xx response. `message` is already human-readable: either the
    /// backend's own `error` field or a generic fallback.
    #[error("{message}")]
    Api { status: u16, message: String },
}

#[derive(Serialize)]
struct ChatQuery<'a> {
    question: &'a str,
}

#[derive(Deserialize)]
struct ChatAnswer {
    answer: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

/// Thin client for the two backend endpoints the chat consumes.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// `POST /api/upload-pdf` — multipart form, field name `file`.
    /// Any 2xx is success; the response body is not inspected.
    pub async fn upload_pdf(&self, file_name: &str, bytes: Vec<u8>) -> Result<(), ApiError> {
        let part = multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")?;
        let form = multipart::Form::new().part("file", part);

        let resp = self
            .client
            .post(format!("{}/api/upload-pdf", self.base_url))
            .multipart(form)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::api_error(resp, UPLOAD_FAILED).await);
        }
        Ok(())
    }

    /// `POST /api/rag-chat` — asks a question about the uploaded document
    /// and returns the backend's answer.
    pub async fn ask(&self, question: &str) -> Result<String, ApiError> {
        let resp = self
            .client
            .post(format!("{}/api/rag-chat", self.base_url))
            .json(&ChatQuery { question })
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(Self::api_error(resp, CHAT_FAILED).await);
        }
        let data: ChatAnswer = resp.json().await?;
        Ok(data.answer)
    }

    async fn api_error(resp: Response, fallback: &str) -> ApiError {
        let status = resp.status().as_u16();
        let message = resp
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| fallback.to_string());
        ApiError::Api { status, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn client_for(server: &Server) -> ApiClient {
        let config = ClientConfig {
            base_url: server.url(),
            ..ClientConfig::default()
        };
        ApiClient::new(&config).unwrap()
    }

    #[tokio::test]
    async fn ask_returns_the_answer_field() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/rag-chat")
            .match_body(Matcher::Json(serde_json::json!({ "question": "요약해줘" })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{ "answer": "테스트 요약" }"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let answer = client.ask("요약해줘").await.unwrap();
        assert_eq!(answer, "테스트 요약");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn ask_surfaces_the_backend_error_field() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/rag-chat")
            .with_status(500)
            .with_body(r#"{ "error": "서버 오류" }"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let err = client.ask("요약해줘").await.unwrap_err();
        match err {
            ApiError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "서버 오류");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparseable_failure_body_falls_back_to_generic_message() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/rag-chat")
            .with_status(502)
            .with_body("<html>bad gateway</html>")
            .create_async()
            .await;

        let client = client_for(&server);
        match client.ask("질문").await.unwrap_err() {
            ApiError::Api { message, .. } => assert_eq!(message, CHAT_FAILED),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn upload_accepts_any_2xx() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/upload-pdf")
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data.*".to_string()),
            )
            .with_status(201)
            .create_async()
            .await;

        let client = client_for(&server);
        client.upload_pdf("notes.pdf", b"%PDF-1.4".to_vec()).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn upload_failure_uses_error_body_or_fallback() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/upload-pdf")
            .with_status(400)
            .with_body(r#"{ "error": "PDF 파일만 업로드할 수 있습니다" }"#)
            .create_async()
            .await;

        let client = client_for(&server);
        match client.upload_pdf("notes.txt", vec![1]).await.unwrap_err() {
            ApiError::Api { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "PDF 파일만 업로드할 수 있습니다");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
