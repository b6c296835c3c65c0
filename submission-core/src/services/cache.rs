use std::collections::HashMap;

use crate::models::submission::SubmissionOutcome;
use crate::models::SubmissionKey;

/// Last known successful outcome per key, serving fast local read-back.
/// Entries are written only on confirmed success and never mutated; a fresh
/// logical attempt requires a new key or an explicit invalidation.
#[derive(Default)]
pub struct ResultCache {
    entries: HashMap<SubmissionKey, SubmissionOutcome>,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &SubmissionKey) -> Option<SubmissionOutcome> {
        self.entries.get(key).cloned()
    }

    pub fn put(&mut self, key: SubmissionKey, outcome: SubmissionOutcome) {
        self.entries.insert(key, outcome);
    }

    /// With a key, removes every entry sharing the key's quiz prefix;
    /// without one, clears everything (logout/session reset).
    pub fn invalidate(&mut self, key: Option<&SubmissionKey>) {
        match key {
            Some(key) => {
                let prefix = key.quiz_prefix();
                self.entries.retain(|k, _| !k.as_str().starts_with(&prefix));
            }
            None => self.entries.clear(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission::QuizResult;
    use crate::models::ResultType;
    use chrono::Utc;
    use uuid::Uuid;

    fn outcome() -> SubmissionOutcome {
        SubmissionOutcome {
            result: QuizResult {
                id: Uuid::new_v4(),
                score: 80.0,
                max_score: 100.0,
                submitted_at: Utc::now(),
            },
            succeeded_at: Utc::now(),
        }
    }

    #[test]
    fn put_then_get_returns_the_outcome() {
        let mut cache = ResultCache::new();
        let key = SubmissionKey::new("quiz-1", ResultType::Mcq);

        assert!(cache.get(&key).is_none());
        let stored = outcome();
        cache.put(key.clone(), stored.clone());
        assert_eq!(cache.get(&key).unwrap().result.id, stored.result.id);
    }

    #[test]
    fn prefix_invalidation_forgets_the_whole_quiz() {
        let mut cache = ResultCache::new();
        let mcq = SubmissionKey::new("quiz-1", ResultType::Mcq);
        let blanks = SubmissionKey::new("quiz-1", ResultType::Blanks);
        let other = SubmissionKey::new("quiz-2", ResultType::Mcq);

        cache.put(mcq.clone(), outcome());
        cache.put(blanks.clone(), outcome());
        cache.put(other.clone(), outcome());

        cache.invalidate(Some(&mcq));
        assert!(cache.get(&mcq).is_none());
        assert!(cache.get(&blanks).is_none());
        assert!(cache.get(&other).is_some());
    }

    #[test]
    fn full_invalidation_clears_everything() {
        let mut cache = ResultCache::new();
        cache.put(SubmissionKey::new("quiz-1", ResultType::Mcq), outcome());
        cache.put(SubmissionKey::new("quiz-2", ResultType::Code), outcome());

        cache.invalidate(None);
        assert!(cache.is_empty());
    }
}
