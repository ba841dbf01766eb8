use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::AugmentationConfig;

use super::domain::{Insight, ScoreSnapshot, WeeklyMetrics};
use super::insights::rank_insights;

const MIN_INSIGHTS: usize = 3;
const MAX_INSIGHTS: usize = 5;

/// Context handed to the generative-text collaborator. The deterministic
/// score is always computed first; this only shapes the prose.
#[derive(Debug, Clone, Serialize)]
pub struct AugmentationContext<'a> {
    pub snapshot: &'a ScoreSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<&'a ScoreSnapshot>,
    pub metrics: &'a WeeklyMetrics,
}

/// Capability interface for insight phrasing. Two implementations ship with
/// the crate: [`DisabledAugmenter`] and [`ChatCompletionAugmenter`]; callers
/// can plug in their own.
pub trait InsightAugmenter: Send + Sync {
    fn augment(&self, context: &AugmentationContext<'_>) -> Result<Vec<Insight>, AugmentError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AugmentError {
    #[error("augmentation disabled by configuration")]
    Disabled,
    #[error("augmentation request timed out")]
    Timeout,
    #[error("augmentation transport failed: {0}")]
    Transport(String),
    #[error("augmentation response invalid: {0}")]
    InvalidResponse(String),
}

/// No-op implementation selected when no API key is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledAugmenter;

impl InsightAugmenter for DisabledAugmenter {
    fn augment(&self, _context: &AugmentationContext<'_>) -> Result<Vec<Insight>, AugmentError> {
        Err(AugmentError::Disabled)
    }
}

/// Live client against an OpenAI-compatible chat-completions endpoint. The
/// request carries a hard timeout so a slow collaborator can never hold up
/// the deterministic pipeline.
pub struct ChatCompletionAugmenter {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatCompletionAugmenter {
    pub fn from_config(config: &AugmentationConfig) -> Result<Self, AugmentError> {
        let api_key = config.api_key.clone().ok_or(AugmentError::Disabled)?;
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| AugmentError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key,
            model: config.model.clone(),
        })
    }

    fn prompt(context: &AugmentationContext<'_>) -> String {
        let snapshot = context.snapshot;
        let previous_line = match context.previous {
            Some(previous) => format!(
                "Previous week overall: {:.1} (change {:+.1} points)\n",
                previous.overall,
                snapshot.overall - previous.overall
            ),
            None => String::new(),
        };
        let context_json =
            serde_json::to_string_pretty(context).unwrap_or_else(|_| "{}".to_string());
        format!(
            "Analyze this user's weekly food-impact scores and provide 3-5 specific insights.\n\
             Overall: {:.1}/100, Waste: {:.1}/100, Nutrition: {:.1}/100, Sustainability: {:.1}/100\n\
             {previous_line}\
             Full context:\n{context_json}\n\n\
             Respond with JSON only, in the form:\n\
             {{\"insights\": [{{\"type\": \"success|warning|info\", \"category\": \"waste|nutrition|sustainability|overall\", \
             \"message\": \"...\", \"impact\": \"high|medium|low\", \"potential_points\": {{\"low\": 0, \"high\": 0}}}}]}}\n\
             Reference concrete numbers and item names from the context. \
             potential_points is optional.",
            snapshot.overall,
            snapshot.waste.value,
            snapshot.nutrition.value,
            snapshot.sustainability.value,
        )
    }
}

impl InsightAugmenter for ChatCompletionAugmenter {
    fn augment(&self, context: &AugmentationContext<'_>) -> Result<Vec<Insight>, AugmentError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You are an expert in sustainable food practices. Provide specific, actionable insights as structured JSON.",
                },
                { "role": "user", "content": Self::prompt(context) },
            ],
            "temperature": 0.7,
            "max_tokens": 400,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AugmentError::Transport(format!(
                "endpoint returned {status}"
            )));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .map_err(|err| AugmentError::InvalidResponse(err.to_string()))?;
        let content = completion
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| AugmentError::InvalidResponse("no completion choices".to_string()))?;

        parse_insight_payload(content)
    }
}

fn classify_transport_error(err: reqwest::Error) -> AugmentError {
    if err.is_timeout() {
        AugmentError::Timeout
    } else {
        AugmentError::Transport(err.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: String,
}

#[derive(Debug, Deserialize)]
struct InsightPayload {
    insights: Vec<Insight>,
}

/// Parse and schema-check the collaborator's reply. Anything that fails
/// validation is discarded; fewer than three surviving insights counts as an
/// invalid response so the caller falls back to the rule-based set.
pub(crate) fn parse_insight_payload(content: &str) -> Result<Vec<Insight>, AugmentError> {
    let stripped = strip_code_fences(content);
    let payload: InsightPayload = serde_json::from_str(stripped)
        .map_err(|err| AugmentError::InvalidResponse(err.to_string()))?;

    let mut insights: Vec<Insight> = payload
        .insights
        .into_iter()
        .filter(is_valid_insight)
        .collect();

    if insights.len() < MIN_INSIGHTS {
        return Err(AugmentError::InvalidResponse(format!(
            "only {} usable insight(s) after validation",
            insights.len()
        )));
    }

    rank_insights(&mut insights);
    insights.truncate(MAX_INSIGHTS);
    Ok(insights)
}

fn is_valid_insight(insight: &Insight) -> bool {
    if insight.message.trim().is_empty() {
        return false;
    }
    match insight.potential_points {
        Some(range) => {
            range.low.is_finite()
                && range.high.is_finite()
                && range.low >= 0.0
                && range.low <= range.high
                && range.high <= 100.0
        }
        None => true,
    }
}

fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}
