use serde::{Deserialize, Serialize};
use std::fmt;

pub mod submission;

pub use submission::{
    AnswerRecord, QuizResult, SubmissionOutcome, SubmissionPayload, SubmissionRequest,
};

/// Kind of quiz result being submitted. Part of the logical submission key:
/// the same quiz can produce independent results of different kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    Mcq,
    Code,
    Blanks,
    OpenEnded,
}

impl ResultType {
    pub const ALL: [ResultType; 4] = [
        ResultType::Mcq,
        ResultType::Code,
        ResultType::Blanks,
        ResultType::OpenEnded,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResultType::Mcq => "mcq",
            ResultType::Code => "code",
            ResultType::Blanks => "blanks",
            ResultType::OpenEnded => "openended",
        }
    }
}

impl fmt::Display for ResultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identity of one logical submission, derived from
/// `(quiz_id, result_type)`. Two requests with the same key refer to the
/// same underlying result and must never both reach the network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionKey(String);

impl SubmissionKey {
    pub fn new(quiz_id: &str, kind: ResultType) -> Self {
        Self(format!("{}:{}", quiz_id, kind.as_str()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Quiz identifier half of the key.
    pub fn quiz_id(&self) -> &str {
        self.0.split(':').next().unwrap_or_default()
    }

    /// Prefix shared by every key of the same quiz. The reset flow drops all
    /// coordinator state matching this prefix.
    pub fn quiz_prefix(&self) -> String {
        format!("{}:", self.quiz_id())
    }
}

impl fmt::Display for SubmissionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_combines_quiz_id_and_result_type() {
        let key = SubmissionKey::new("quiz-1", ResultType::OpenEnded);
        assert_eq!(key.as_str(), "quiz-1:openended");
        assert_eq!(key.quiz_id(), "quiz-1");
        assert_eq!(key.quiz_prefix(), "quiz-1:");
    }

    #[test]
    fn keys_for_different_result_types_are_distinct() {
        let mcq = SubmissionKey::new("quiz-1", ResultType::Mcq);
        let code = SubmissionKey::new("quiz-1", ResultType::Code);
        assert_ne!(mcq, code);
        assert_eq!(mcq.quiz_prefix(), code.quiz_prefix());
    }

    #[test]
    fn result_type_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ResultType::OpenEnded).unwrap(),
            "\"openended\""
        );
        assert_eq!(serde_json::to_string(&ResultType::Mcq).unwrap(), "\"mcq\"");
    }
}
