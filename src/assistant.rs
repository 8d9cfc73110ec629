//! Assistant facade: one entry point per question.
//!
//! Wires the analyzer, the synthesizer and the external collaborators
//! (executor, formatter, optional LLM) into a single request flow. The
//! pipeline itself is stateless; the assistant only holds shared handles.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::analysis::{AnalysisRecord, QueryAnalyzer};
use crate::catalog::{CatalogHandle, CatalogSource};
use crate::config::AnalyticsConfig;
use crate::error::{AnalyticsError, Result};
use crate::executor::SqlExecutor;
use crate::formatter::ResultFormatter;
use crate::llm::{clean_sql_response, CompletionClient, SqlPromptBuilder};
use crate::synthesizer::{GeneratedSql, SqlSynthesizer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// SQL executed and rows (possibly zero) came back.
    QueryResult,
    /// No SQL could be produced for the question.
    NoQuery,
    /// SQL was produced but no executor is configured.
    SqlOnly,
    /// The store rejected the statement or timed out.
    ExecutionError,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantResponse {
    pub request_id: String,
    pub answered_at: chrono::DateTime<chrono::Utc>,
    pub response_type: ResponseType,
    /// Natural-language gloss for the user.
    pub answer: String,
    pub title: String,
    pub sql: String,
    pub analysis: AnalysisRecord,
    pub columns: Vec<String>,
    pub rows: Vec<HashMap<String, Value>>,
    /// Aligned text table, empty unless rows came back.
    pub table: String,
}

pub struct CricketAssistant {
    analyzer: QueryAnalyzer,
    synthesizer: SqlSynthesizer,
    catalog: Arc<CatalogHandle>,
    executor: Option<Arc<dyn SqlExecutor>>,
    llm: Option<Arc<dyn CompletionClient>>,
}

impl CricketAssistant {
    pub fn new(config: &AnalyticsConfig, catalog: Arc<CatalogHandle>) -> Self {
        Self {
            analyzer: QueryAnalyzer::new(config),
            synthesizer: SqlSynthesizer::new(config.synthesis.clone()),
            catalog,
            executor: None,
            llm: None,
        }
    }

    pub fn with_executor(mut self, executor: Arc<dyn SqlExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn with_llm(mut self, llm: Arc<dyn CompletionClient>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Rebuild the catalog from the source and publish the new snapshot.
    pub async fn reload_catalog(&self, source: &dyn CatalogSource) -> Result<()> {
        self.catalog.reload(source).await
    }

    /// The deterministic front half: analyze and synthesize, no I/O.
    pub fn plan(&self, question: &str) -> (AnalysisRecord, GeneratedSql) {
        let snapshot = self.catalog.snapshot();
        let record = self.analyzer.analyze(question, &snapshot);
        let generated = self.synthesizer.synthesize(&record);
        (record, generated)
    }

    /// Full deterministic flow: analyze, synthesize, execute, format.
    pub async fn answer(&self, question: &str) -> AssistantResponse {
        let request_id = uuid::Uuid::new_v4().to_string();
        info!(%request_id, question, "processing question");

        let (record, generated) = self.plan(question);
        self.finish(request_id, record, generated).await
    }

    /// Alternate flow: ask the LLM for the SQL instead of the synthesizer.
    /// The analysis record still comes from the deterministic extractors so
    /// the prompt carries canonical names and thresholds.
    pub async fn answer_with_llm(&self, question: &str) -> Result<AssistantResponse> {
        let llm = self
            .llm
            .as_ref()
            .ok_or_else(|| AnalyticsError::Llm("no completion client configured".to_string()))?;

        let request_id = uuid::Uuid::new_v4().to_string();
        let snapshot = self.catalog.snapshot();
        let record = self.analyzer.analyze(question, &snapshot);

        let prompt = SqlPromptBuilder::build(
            question,
            &record.entities.players,
            record.filters.min_runs,
        );
        let raw = llm.complete(&prompt).await?;
        let generated = match clean_sql_response(&raw) {
            Some(sql) => GeneratedSql {
                title: "LLM-GENERATED QUERY".to_string(),
                sql,
            },
            None => GeneratedSql {
                title: "LLM-GENERATED QUERY".to_string(),
                sql: "-- The completion service returned no recognizable SELECT.".to_string(),
            },
        };

        Ok(self.finish(request_id, record, generated).await)
    }

    async fn finish(
        &self,
        request_id: String,
        record: AnalysisRecord,
        generated: GeneratedSql,
    ) -> AssistantResponse {
        if generated.is_placeholder() {
            let formatted = ResultFormatter::no_query(&generated);
            return AssistantResponse {
                request_id,
                answered_at: chrono::Utc::now(),
                response_type: ResponseType::NoQuery,
                answer: formatted.gloss,
                title: generated.title.clone(),
                sql: generated.sql,
                analysis: record,
                columns: Vec::new(),
                rows: Vec::new(),
                table: String::new(),
            };
        }

        let executor = match &self.executor {
            Some(executor) => executor,
            None => {
                return AssistantResponse {
                    request_id,
                    answered_at: chrono::Utc::now(),
                    response_type: ResponseType::SqlOnly,
                    answer: format!("Generated SQL for: {}", generated.title),
                    title: generated.title.clone(),
                    sql: generated.sql,
                    analysis: record,
                    columns: Vec::new(),
                    rows: Vec::new(),
                    table: String::new(),
                }
            }
        };

        let outcome = executor.execute(&generated.sql).await;
        let formatted = ResultFormatter::format(&generated, &outcome);
        let response_type = if outcome.success {
            ResponseType::QueryResult
        } else {
            ResponseType::ExecutionError
        };

        AssistantResponse {
            request_id,
            answered_at: chrono::Utc::now(),
            response_type,
            answer: formatted.gloss,
            title: generated.title.clone(),
            sql: generated.sql,
            analysis: record,
            columns: outcome.columns,
            rows: outcome.rows,
            table: formatted.table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CanonicalCatalog;
    use crate::executor::ExecutionOutcome;
    use async_trait::async_trait;

    struct RecordingExecutor;

    #[async_trait]
    impl SqlExecutor for RecordingExecutor {
        async fn execute(&self, sql: &str) -> ExecutionOutcome {
            assert!(!sql.contains("--") || sql.lines().count() > 1, "placeholder reached the executor");
            ExecutionOutcome {
                success: true,
                columns: vec!["player".to_string()],
                rows: vec![],
                error: None,
                elapsed_ms: 1,
            }
        }
    }

    fn assistant_with_executor() -> CricketAssistant {
        let catalog = CanonicalCatalog::new(
            vec!["Virat Kohli".to_string(), "Jasprit Bumrah".to_string()],
            vec![],
        );
        CricketAssistant::new(
            &AnalyticsConfig::default(),
            Arc::new(CatalogHandle::new(catalog)),
        )
        .with_executor(Arc::new(RecordingExecutor))
    }

    #[tokio::test]
    async fn unresolvable_question_short_circuits_before_execution() {
        let response = assistant_with_executor().answer("john smith stats").await;
        assert_eq!(response.response_type, ResponseType::NoQuery);
        assert!(response.answer.contains("Could not determine a query"));
    }

    #[tokio::test]
    async fn resolvable_question_reaches_the_executor() {
        let response = assistant_with_executor().answer("Virat Kohli total runs").await;
        assert_eq!(response.response_type, ResponseType::QueryResult);
        assert!(response.answer.contains("no rows"));
    }

    #[tokio::test]
    async fn sql_only_without_executor() {
        let catalog = CanonicalCatalog::new(vec!["Virat Kohli".to_string()], vec![]);
        let assistant = CricketAssistant::new(
            &AnalyticsConfig::default(),
            Arc::new(CatalogHandle::new(catalog)),
        );
        let response = assistant.answer("kohli strike rate").await;
        assert_eq!(response.response_type, ResponseType::SqlOnly);
        assert!(response.sql.contains("SELECT"));
    }
}
