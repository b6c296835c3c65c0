use crate::models::submission::AnswerRecord;
use crate::models::ResultType;

/// Fill-in-the-blank answers count as correct above this similarity score.
const BLANKS_SIMILARITY_THRESHOLD: f64 = 80.0;
/// Open-ended answers are graded more leniently.
const OPENENDED_SIMILARITY_THRESHOLD: f64 = 70.0;

/// Counts the answers considered correct for the given result type.
/// Exact-match types use the grader's boolean flag; free-text types use the
/// grader's similarity score against a per-type threshold.
pub fn correct_answer_count(answers: &[AnswerRecord], kind: ResultType) -> usize {
    answers.iter().filter(|a| is_correct(a, kind)).count()
}

fn is_correct(answer: &AnswerRecord, kind: ResultType) -> bool {
    match kind {
        ResultType::Mcq | ResultType::Code => answer.is_correct,
        ResultType::Blanks => answer.similarity.unwrap_or(0.0) > BLANKS_SIMILARITY_THRESHOLD,
        ResultType::OpenEnded => answer.similarity.unwrap_or(0.0) > OPENENDED_SIMILARITY_THRESHOLD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn answer(is_correct: bool, similarity: Option<f64>) -> AnswerRecord {
        AnswerRecord {
            question_id: "q".to_string(),
            answer: None,
            is_correct,
            similarity,
        }
    }

    #[test]
    fn mcq_and_code_use_the_exact_match_flag() {
        let answers = vec![answer(true, None), answer(false, Some(99.0))];
        assert_eq!(correct_answer_count(&answers, ResultType::Mcq), 1);
        assert_eq!(correct_answer_count(&answers, ResultType::Code), 1);
    }

    #[test]
    fn blanks_require_similarity_above_80() {
        let answers = vec![
            answer(false, Some(80.0)),
            answer(false, Some(80.5)),
            answer(false, None),
        ];
        assert_eq!(correct_answer_count(&answers, ResultType::Blanks), 1);
    }

    #[test]
    fn openended_requires_similarity_above_70() {
        let answers = vec![
            answer(false, Some(70.0)),
            answer(false, Some(75.0)),
            answer(false, Some(95.0)),
        ];
        assert_eq!(correct_answer_count(&answers, ResultType::OpenEnded), 2);
    }
}
