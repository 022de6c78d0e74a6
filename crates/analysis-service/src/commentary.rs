//! Hosted-LLM commentary client (Groq chat completions API).

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::AnalysisConfig;
use crate::error::AnalysisError;

const API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const TIMEOUT_SECS: u64 = 60;

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

pub struct CommentaryClient {
    client: Client,
    api_key: Option<String>,
    model: String,
}

impl CommentaryClient {
    pub fn new(config: &AnalysisConfig) -> Self {
        let client = Client::builder()
            .user_agent("ChessReview/1.0")
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()
            .unwrap();
        Self {
            client,
            api_key: config.groq_api_key.clone(),
            model: config.groq_model.clone(),
        }
    }

    /// False when no API key is configured; calls will fail fast.
    pub fn available(&self) -> bool {
        self.api_key.is_some()
    }

    /// Free-text commentary for a whole game given as PGN.
    pub async fn game_commentary(&self, pgn: &str) -> Result<String, AnalysisError> {
        let prompt = format!(
            "You are a chess grandmaster. Analyze this chess game:\n\n{pgn}\n\n\
             Please provide:\n\
             1. Opening identification and assessment\n\
             2. Key turning points in the game\n\
             3. Critical mistakes and missed opportunities\n\
             4. Strategic themes throughout the game\n\
             5. Suggestions for improvement"
        );
        self.chat(prompt).await
    }

    /// Free-text commentary for a single position given as FEN.
    pub async fn position_commentary(&self, fen: &str) -> Result<String, AnalysisError> {
        let prompt = format!(
            "You are a chess grandmaster. Analyze this chess position given in FEN notation:\n\
             {fen}\n\n\
             Please provide:\n\
             1. Overall assessment of the position (material, piece activity, king safety)\n\
             2. Key tactical and strategic ideas for both sides\n\
             3. 2-3 concrete best moves with brief explanations\n\
             4. Any potential mistakes to avoid"
        );
        self.chat(prompt).await
    }

    async fn chat(&self, prompt: String) -> Result<String, AnalysisError> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AnalysisError::CommentaryUnavailable);
        };

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(API_URL)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalysisError::Commentary(format!("request error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Commentary(format!("HTTP {status}: {body}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Commentary(format!("bad response body: {e}")))?;

        parsed
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .ok_or_else(|| AnalysisError::Commentary("empty response".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_without_key() -> AnalysisConfig {
        AnalysisConfig {
            stockfish_path: "stockfish".into(),
            search_depth: 18,
            multipv: 3,
            groq_api_key: None,
            groq_model: "llama-3.3-70b-versatile".into(),
        }
    }

    #[tokio::test]
    async fn test_unavailable_without_api_key() {
        let client = CommentaryClient::new(&config_without_key());
        assert!(!client.available());

        let err = client.game_commentary("1. e4 e5 *").await.unwrap_err();
        assert!(matches!(err, AnalysisError::CommentaryUnavailable));

        let err = client
            .position_commentary("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1")
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::CommentaryUnavailable));
    }

    #[test]
    fn test_request_serialization() {
        let request = ChatRequest {
            model: "llama-3.3-70b-versatile".into(),
            messages: vec![ChatMessage {
                role: "user",
                content: "hello".into(),
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["model"], "llama-3.3-70b-versatile");
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
