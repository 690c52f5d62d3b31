use crate::core::fortune::FortuneResult;
use crate::core::narration::{Narration, Narrator};
use crate::core::personality::PersonalityType;
use crate::providers::util::with_retry;
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

const RETRIES: usize = 3;
const RETRY_DELAY_MS: u64 = 500;

/// Narrator backed by the Gemini `generateContent` endpoint.
pub struct GeminiNarrator {
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiNarrator {
    pub fn new(base_url: &str, model: &str, api_key: &str) -> Self {
        GeminiNarrator {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

fn build_prompt(personality: PersonalityType, date: NaiveDate, fortune: &FortuneResult) -> String {
    format!(
        "The user's personality type is {personality}. Write their personalized fortune for {date}. \
         Today's overall luck is {score}/5 ({level}, {trend}).\n\
         Requirements:\n\
         1. Warm, playful and upbeat tone\n\
         2. Cover love luck, work luck and one tip for the day\n\
         3. Reflect the date and season\n\
         4. Keep each item under 30 words\n\n\
         Reply with JSON in exactly this shape:\n\
         {{\"love\": \"...\", \"work\": \"...\", \"tip\": \"...\"}}",
        score = fortune.overall.score,
        level = fortune.overall.level,
        trend = fortune.overall.trend,
    )
}

/// Returns the span from the first `{` to the last `}`, which is how model
/// replies wrapped in prose or code fences are unwrapped.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn parse_narration(text: &str) -> Result<Narration> {
    let json = extract_json_object(text)
        .ok_or_else(|| anyhow!("No JSON object in narration reply: '{}'", text))?;
    serde_json::from_str(json)
        .with_context(|| format!("Failed to parse narration reply: '{json}'"))
}

#[async_trait]
impl Narrator for GeminiNarrator {
    #[instrument(name = "GeminiNarrate", skip(self, fortune), fields(personality = %personality))]
    async fn narrate(
        &self,
        personality: PersonalityType,
        date: NaiveDate,
        fortune: &FortuneResult,
    ) -> Result<Narration> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: build_prompt(personality, date, fortune),
                }],
            }],
        };
        debug!("Requesting narration from {}", url);

        let client = reqwest::Client::builder()
            .user_agent("typefortune/1.0")
            .build()?;
        let response = with_retry(
            || async {
                client
                    .post(&url)
                    .header("x-goog-api-key", &self.api_key)
                    .json(&body)
                    .send()
                    .await?
                    .error_for_status()
            },
            RETRIES,
            RETRY_DELAY_MS,
        )
        .await
        .with_context(|| format!("Failed to request narration for {personality}"))?;

        let data: GenerateResponse = response
            .json()
            .await
            .context("Failed to decode narration response")?;
        let text = data
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| anyhow!("Narration response has no candidates"))?;

        parse_narration(&text)
    }
}
