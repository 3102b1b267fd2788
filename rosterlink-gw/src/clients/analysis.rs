//! Analysis (ranking) endpoint client
//!
//! OpenAI-style chat completion client used to turn flattened player
//! statistics into a generated ranking. The API key is optional at
//! construction; a missing key fails the call, not the startup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

const MAX_TOKENS: u32 = 1500;
const TEMPERATURE: f32 = 0.7;

const SYSTEM_PROMPT: &str =
    "You are an expert sports analyst who creates objective rankings based on data.";

/// Analysis client errors
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// No API key configured
    #[error("Analysis API key is not configured")]
    MissingApiKey,

    /// Request exceeded the client timeout
    #[error("Analysis endpoint timed out")]
    Timeout,

    /// Network communication error
    #[error("Network error: {0}")]
    Network(String),

    /// Endpoint returned a non-success HTTP status
    #[error("Analysis endpoint returned {0}: {1}")]
    Api(u16, String),

    /// Response had no usable completion
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Completed analysis with its usage metadata
#[derive(Debug, Clone)]
pub struct Analysis {
    pub text: String,
    pub model: String,
    pub tokens_used: Option<u64>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatUsage {
    total_tokens: u64,
}

/// Analysis endpoint client
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl AnalysisClient {
    pub fn new(
        http: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            api_key,
            model: model.into(),
        }
    }

    /// Generate a ranking from pre-flattened player fact lines
    pub async fn rank_players(&self, player_lines: &[String]) -> Result<Analysis, AnalysisError> {
        let api_key = self.api_key.as_deref().ok_or(AnalysisError::MissingApiKey)?;

        let prompt = build_ranking_prompt(player_lines);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        tracing::debug!(
            endpoint = %self.endpoint,
            players = player_lines.len(),
            "Requesting player ranking analysis"
        );

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Timeout
                } else {
                    AnalysisError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnalysisError::Api(status.as_u16(), body));
        }

        let completion: ChatResponse = response
            .json()
            .await
            .map_err(|e| AnalysisError::Parse(e.to_string()))?;

        let text = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| AnalysisError::Parse("response carried no completion".to_string()))?;

        Ok(Analysis {
            text,
            model: self.model.clone(),
            tokens_used: completion.usage.map(|u| u.total_tokens),
        })
    }
}

fn build_ranking_prompt(player_lines: &[String]) -> String {
    format!(
        "Analyze the following sports players and build a ranking based on their 2024 statistics.\n\
         \n\
         Players:\n{}\n\
         \n\
         Please:\n\
         1. Rank the players from 1 to {} by performance\n\
         2. Explain the criteria used for the ranking\n\
         3. Add a short comment for each player in the top 5\n\
         4. Answer in JSON with the structure:\n\
         {{\n\
             \"ranking\": [\n\
                 {{\"position\": 1, \"name\": \"Player Name\", \"team\": \"Team Name\", \"score\": 95, \"comment\": \"Explanation\"}}\n\
             ],\n\
             \"criteria\": \"Explanation of the criteria used\",\n\
             \"summary\": \"Overall summary of the analysis\"\n\
         }}",
        player_lines.join("\n"),
        player_lines.len()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_api_key_fails_without_network() {
        let client = AnalysisClient::new(
            reqwest::Client::new(),
            "http://127.0.0.1:1/chat/completions",
            None,
            "gpt-3.5-turbo",
        );

        let err = client
            .rank_players(&["- A (Lakers)".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::MissingApiKey));
    }

    #[test]
    fn prompt_names_the_player_count() {
        let lines = vec!["- A (Lakers)".to_string(), "- B (Lakers)".to_string()];
        let prompt = build_ranking_prompt(&lines);
        assert!(prompt.contains("from 1 to 2"));
        assert!(prompt.contains("- B (Lakers)"));
    }
}
