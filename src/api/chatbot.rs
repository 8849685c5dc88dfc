//! Chatbot endpoint

use super::types::ChatReply;
use crate::error::{Error, Result};
use crate::http::{ApiRequest, AuthenticatedClient};
use serde_json::json;

const CHATBOT_PATH: &str = "/chatbot/ask/";

/// Question-and-answer chatbot
#[derive(Debug, Clone, Copy)]
pub struct ChatbotApi<'a> {
    client: &'a AuthenticatedClient,
}

impl<'a> ChatbotApi<'a> {
    pub(crate) fn new(client: &'a AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Ask a question and return the answer text
    pub async fn ask(&self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::Other("question must not be empty".to_string()));
        }

        let reply: ChatReply = self
            .client
            .send_json(ApiRequest::post(CHATBOT_PATH).json(json!({"question": question})))
            .await?;
        Ok(reply.answer)
    }
}
