use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};

use kids_core::json_repair::{parse_array_as, ParseMode};
use kids_core::{ChatMessage, ChatRole, Level, QuizQuestion, VocabularyCard};

use super::{ContentError, ContentProvider, ContentResult, Illustration};
use crate::config::GeminiConfig;

const BASE_BACKOFF_MS: u64 = 200;
const QUIZ_QUESTION_COUNT: usize = 3;

/// Gemini `generateContent` REST client.
#[derive(Clone)]
pub struct GeminiProvider {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiProvider {
    pub fn new(config: GeminiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, client }
    }

    pub fn is_available(&self) -> bool {
        self.config.is_available()
    }

    async fn generate_text(&self, request: &GenerateContentRequest) -> ContentResult<String> {
        let response = self.generate(&self.config.text_model, request).await?;
        extract_text(response).ok_or(ContentError::Empty)
    }

    async fn generate(&self, model: &str, request: &GenerateContentRequest) -> ContentResult<GenerateContentResponse> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or(ContentError::NotConfigured("GEMINI_API_KEY"))?;
        let url = format!("{}/models/{model}:generateContent", self.config.api_endpoint);
        self.post_with_retry(&url, api_key, request).await
    }

    async fn post_with_retry(
        &self,
        url: &str,
        api_key: &str,
        payload: &GenerateContentRequest,
    ) -> ContentResult<GenerateContentResponse> {
        let max_retries = self.config.max_retries;
        let mut last_error: Option<ContentError> = None;

        for retry in 0..=max_retries {
            let sent = self
                .client
                .post(url)
                .query(&[("key", api_key)])
                .json(payload)
                .send()
                .await;
            match sent {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        let bytes = resp.bytes().await?;
                        return serde_json::from_slice(&bytes).map_err(|e| {
                            warn!(error = %e, "failed to decode Gemini response");
                            ContentError::Json(e)
                        });
                    }
                    let body = resp.text().await.unwrap_or_default();
                    let err = ContentError::HttpStatus { status, body: error_message(&body) };
                    if retry < max_retries && is_retryable(status) {
                        warn!(retry, ?status, "Gemini request failed, retrying");
                        sleep(backoff(retry)).await;
                        last_error = Some(err);
                        continue;
                    }
                    return Err(err);
                }
                Err(e) => {
                    let err = ContentError::Request(e);
                    if retry < max_retries {
                        warn!(retry, error = %err, "Gemini request error, retrying");
                        sleep(backoff(retry)).await;
                        last_error = Some(err);
                        continue;
                    }
                    return Err(err);
                }
            }
        }
        Err(last_error.unwrap_or(ContentError::NotConfigured("retry budget")))
    }
}

#[async_trait]
impl ContentProvider for GeminiProvider {
    async fn vocabulary(&self, level: Level, words: &[String]) -> ContentResult<Vec<VocabularyCard>> {
        let request = GenerateContentRequest::json(vocabulary_prompt(level, words), Some(0.4));
        let text = self.generate_text(&request).await?;
        let (cards, mode) = parse_array_as::<VocabularyCard>(&text)?;
        if mode == ParseMode::Repaired {
            debug!(count = cards.len(), "vocabulary response was truncated and repaired");
        }
        Ok(cards)
    }

    async fn illustration(&self, prompt: &str) -> ContentResult<Option<Illustration>> {
        let request = GenerateContentRequest::text(illustration_prompt(prompt));
        let response = self.generate(&self.config.image_model, &request).await?;
        let Some(inline) = extract_inline_data(response) else {
            return Ok(None);
        };
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(inline.data.as_bytes())
            .map_err(|e| ContentError::Malformed(format!("image payload: {e}")))?;
        Ok(Some(Illustration { bytes, mime_type: inline.mime_type }))
    }

    async fn quiz(&self, level: Level) -> ContentResult<Vec<QuizQuestion>> {
        let request = GenerateContentRequest::json(quiz_prompt(level), None);
        let text = self.generate_text(&request).await?;
        let (questions, _) = parse_array_as::<QuizQuestion>(&text)?;
        Ok(questions)
    }

    async fn translate(&self, text: &str) -> ContentResult<String> {
        let request = GenerateContentRequest::text(format!(
            "Translate to Simplified Chinese (zh-CN). Output translation only.\n\nText: \"{text}\""
        ));
        Ok(self.generate_text(&request).await?.trim().to_string())
    }

    async fn chat(&self, level: Level, history: &[ChatMessage]) -> ContentResult<String> {
        let contents: Vec<Content> = history
            .iter()
            .skip_while(|m| m.role == ChatRole::Model)
            .map(|m| Content::new(role_name(m.role), vec![Part::text(m.text.clone())]))
            .collect();
        if contents.is_empty() {
            return Err(ContentError::Malformed("conversation has no learner message".to_string()));
        }
        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::new("user", vec![Part::text(chat_instruction(level))])),
            generation_config: None,
        };
        Ok(self.generate_text(&request).await?.trim().to_string())
    }
}

// ==================== Prompts ====================

fn vocabulary_prompt(level: Level, words: &[String]) -> String {
    format!(
        "You are an expert Cambridge English Dictionary API for children.\n\
         TASK: Generate vocabulary data for: {}.\n\
         LEVEL: Cambridge {level} (Simple English).\n\
         OUTPUT: Strict JSON array. No text.\n\
         Fields: word, pronunciation, definition (simple), exampleSentence, \
         sentenceTranslation (Simplified Chinese), emoji, imagePrompt (cute cartoon style).",
        words.join(", ")
    )
}

fn illustration_prompt(subject: &str) -> String {
    format!("Draw a {subject}. Simple, cute, flat vector art style for kids. White background.")
}

fn quiz_prompt(level: Level) -> String {
    format!(
        "Create a JSON list of {QUIZ_QUESTION_COUNT} quiz questions for Cambridge English {level}. \
         Mix multiple-choice and scramble. Each item has \"type\" (\"multiple-choice\" or \"scramble\"), \
         \"question\" and \"explanation\"; multiple-choice items add \"options\" and \"correctAnswer\" \
         (index), scramble items add \"scrambleSentence\"."
    )
}

pub fn chat_instruction(level: Level) -> String {
    format!("You are a helpful animal tutor for a child (Level: {level}). Keep it simple.")
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Model => "model",
    }
}

// ==================== Wire format ====================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl GenerateContentRequest {
    fn text(prompt: String) -> Self {
        Self {
            contents: vec![Content::new("user", vec![Part::text(prompt)])],
            system_instruction: None,
            generation_config: None,
        }
    }

    fn json(prompt: String, temperature: Option<f32>) -> Self {
        Self {
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                temperature,
            }),
            ..Self::text(prompt)
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

impl Content {
    fn new(role: &str, parts: Vec<Part>) -> Self {
        Self { role: role.to_string(), parts }
    }
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

impl Part {
    fn text(text: String) -> Self {
        Self { text }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PartResponse {
    text: Option<String>,
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn first_parts(response: GenerateContentResponse) -> Vec<PartResponse> {
    response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts)
        .unwrap_or_default()
}

fn extract_text(response: GenerateContentResponse) -> Option<String> {
    let text: String = first_parts(response).into_iter().filter_map(|p| p.text).collect();
    (!text.trim().is_empty()).then_some(text)
}

fn extract_inline_data(response: GenerateContentResponse) -> Option<InlineData> {
    first_parts(response).into_iter().find_map(|p| p.inline_data)
}

fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let msg = wrapper.error.message.unwrap_or_else(|| body.to_string());
            match wrapper.error.status {
                Some(status) if !status.is_empty() => format!("{status}: {msg}"),
                _ => msg,
            }
        })
        .unwrap_or_else(|_| body.to_string())
}

fn is_retryable(status: reqwest::StatusCode) -> bool {
    status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
        || status.is_server_error()
}

fn backoff(retry: usize) -> Duration {
    Duration::from_millis(BASE_BACKOFF_MS * (1 << retry.min(6)))
}
