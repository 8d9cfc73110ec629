//! Text-completion fallback for SQL generation.
//!
//! The deterministic synthesizer is the primary path; this client exists so
//! a caller can ask an LLM for the SQL instead. It stays behind the narrow
//! `CompletionClient` trait and nothing in the pipeline depends on it.

use async_trait::async_trait;

use crate::error::{AnalyticsError, Result};
use crate::schema::SCHEMA_OVERVIEW;

#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// OpenAI-compatible chat-completions client.
#[derive(Clone)]
pub struct LlmClient {
    api_key: String,
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl LlmClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }
}

#[async_trait]
impl CompletionClient for LlmClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        // Dummy key short-circuits for offline runs and tests.
        if self.api_key == "dummy-api-key" {
            return Ok(
                "SELECT batter_full_name, SUM(runs_batter) AS total_runs FROM ipl_data_complete GROUP BY batter_full_name ORDER BY total_runs DESC LIMIT 10".to_string(),
            );
        }

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": "You are a precise SQL generator. Return only the SQL statement, no prose."},
                {"role": "user", "content": prompt}
            ],
            "temperature": 0.1,
            "max_tokens": 1000
        });

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalyticsError::Llm(format!("LLM API call failed: {}", e)))?;

        let response_json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AnalyticsError::Llm(format!("failed to parse LLM response: {}", e)))?;

        let content = response_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AnalyticsError::Llm("no content in LLM response".to_string()))?;

        Ok(content.to_string())
    }
}

/// Renders the generation prompt: schema, canonical players already matched
/// by the extractor, and any explicit minimum threshold from the question.
pub struct SqlPromptBuilder;

impl SqlPromptBuilder {
    pub fn build(
        question: &str,
        matched_players: &[String],
        min_runs: Option<u32>,
    ) -> String {
        let player_context = if matched_players.is_empty() {
            String::new()
        } else {
            format!("\nDetected players: {}", matched_players.join(", "))
        };

        let threshold_context = match min_runs {
            Some(threshold) => format!(
                "\nMinimum threshold: use {} runs in the HAVING clause instead of defaults",
                threshold
            ),
            None => String::new(),
        };

        format!(
            r#"You are an expert cricket analyst generating PostgreSQL for one question.

{schema}
{players}{threshold}

Question: "{question}"

Rules:
1. Generate exactly one SELECT statement, nothing else.
2. Use exact player names from the detected players list when available.
3. Apply minimum-sample HAVING clauses so tiny samples never rank.
4. Guard every rate division with NULLIF or a CASE zero-check.
5. Order results by the most meaningful column and LIMIT to 15 rows."#,
            schema = SCHEMA_OVERVIEW,
            players = player_context,
            threshold = threshold_context,
            question = question,
        )
    }
}

/// Strip markdown fences and leading prose so the text starts at the first
/// SELECT (or WITH). Returns None when no statement is recognizable.
pub fn clean_sql_response(raw: &str) -> Option<String> {
    let without_fences = raw.replace("```sql", "").replace("```", "");
    let trimmed = without_fences.trim();

    let upper = trimmed.to_uppercase();
    ["SELECT", "WITH"]
        .iter()
        .filter_map(|keyword| upper.find(keyword))
        .min()
        .map(|idx| trimmed[idx..].trim().to_string())
}
