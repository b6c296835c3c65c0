use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{ResultType, SubmissionKey};

/// One graded answer as produced by the external grader. This crate never
/// grades; it only classifies the flags and similarity scores it is handed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

/// Already-validated body sent to the transport. Validation runs before the
/// coordinator mutates any state; an invalid payload never enters the retry
/// path.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmissionPayload {
    #[validate(length(min = 1, message = "quiz_id is required"))]
    pub quiz_id: String,
    #[validate(length(min = 1, message = "slug is required"))]
    pub slug: String,
    #[validate(length(min = 1, message = "at least one answer is required"))]
    pub answers: Vec<AnswerRecord>,
    /// Seconds spent on the quiz; zero means the caller never populated it.
    #[validate(range(min = 1, message = "total_time is required"))]
    pub total_time: u32,
    #[validate(range(min = 0.0, max = 100.0, message = "score must be within 0..=100"))]
    pub score: f64,
    #[serde(rename = "type")]
    pub kind: ResultType,
    pub total_questions: u32,
    pub completed_at: DateTime<Utc>,
}

/// Caller-facing submission request. Created once per user action; the key
/// is derived from the payload so duplicates of the same logical result
/// always collide.
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub key: SubmissionKey,
    pub slug: String,
    pub payload: SubmissionPayload,
}

impl SubmissionRequest {
    pub fn new(payload: SubmissionPayload) -> Self {
        Self {
            key: SubmissionKey::new(&payload.quiz_id, payload.kind),
            slug: payload.slug.clone(),
            payload,
        }
    }
}

/// Saved result as confirmed by the remote store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResult {
    pub id: Uuid,
    pub score: f64,
    pub max_score: f64,
    pub submitted_at: DateTime<Utc>,
}

/// Successful submission outcome. Also the durable guard record body, so a
/// cold-started coordinator can serve the result without resubmitting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmissionOutcome {
    pub result: QuizResult,
    pub succeeded_at: DateTime<Utc>,
}
