#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use submission_core::{
    AnswerRecord, CoordinatorConfig, MemoryKvStore, QuizResult, ResultTransport, ResultType,
    SubmissionCoordinator, SubmissionPayload, SubmissionRequest, TransportError,
};

pub fn init_tracing() {
    // Initialize tracing for tests
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Scripted transport double. Responses are served from the script in
/// order; once the script runs dry, `fallback` decides whether every
/// further call succeeds with a fresh result or keeps failing.
pub struct MockTransport {
    calls: AtomicUsize,
    script: Mutex<VecDeque<Result<QuizResult, TransportError>>>,
    fallback: Option<TransportError>,
    delay: Duration,
    pub call_instants: Mutex<Vec<tokio::time::Instant>>,
}

impl MockTransport {
    pub fn new(script: Vec<Result<QuizResult, TransportError>>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            script: Mutex::new(script.into()),
            fallback: None,
            delay: Duration::ZERO,
            call_instants: Mutex::new(Vec::new()),
        }
    }

    /// Succeeds on every call.
    pub fn always_ok() -> Self {
        Self::new(Vec::new())
    }

    /// Fails every call (beyond any script) with the given error.
    pub fn always_failing(err: TransportError) -> Self {
        let mut transport = Self::new(Vec::new());
        transport.fallback = Some(err);
        transport
    }

    pub fn with_script(mut self, script: Vec<Result<QuizResult, TransportError>>) -> Self {
        self.script = Mutex::new(script.into());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ResultTransport for MockTransport {
    async fn send(
        &self,
        _slug: &str,
        payload: &SubmissionPayload,
    ) -> Result<QuizResult, TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.call_instants
            .lock()
            .unwrap()
            .push(tokio::time::Instant::now());

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(step) => step,
            None => match &self.fallback {
                Some(err) => Err(err.clone()),
                None => Ok(ok_result(payload.score)),
            },
        }
    }
}

pub fn ok_result(score: f64) -> QuizResult {
    QuizResult {
        id: Uuid::new_v4(),
        score,
        max_score: 100.0,
        submitted_at: Utc::now(),
    }
}

pub fn transient(message: &str) -> TransportError {
    TransportError::Transient(message.to_string())
}

pub fn permanent(message: &str) -> TransportError {
    TransportError::Permanent(message.to_string())
}

pub fn payload(quiz_id: &str, kind: ResultType) -> SubmissionPayload {
    SubmissionPayload {
        quiz_id: quiz_id.to_string(),
        slug: format!("{}-slug", quiz_id),
        answers: vec![AnswerRecord {
            question_id: "a".to_string(),
            answer: Some("42".to_string()),
            is_correct: true,
            similarity: None,
        }],
        total_time: 120,
        score: 80.0,
        kind,
        total_questions: 1,
        completed_at: Utc::now(),
    }
}

pub fn request(quiz_id: &str, kind: ResultType) -> SubmissionRequest {
    SubmissionRequest::new(payload(quiz_id, kind))
}

/// Configuration with throttling and retry delays disabled, so tests only
/// exercise what they mean to.
pub fn quick_config() -> CoordinatorConfig {
    CoordinatorConfig {
        throttle_window: Duration::ZERO,
        max_retries: 0,
        initial_retry_delay: Duration::from_millis(1),
        ..CoordinatorConfig::default()
    }
}

pub fn coordinator(
    transport: &Arc<MockTransport>,
    store: &Arc<MemoryKvStore>,
    config: CoordinatorConfig,
) -> SubmissionCoordinator {
    init_tracing();
    SubmissionCoordinator::new(config, transport.clone(), store.clone())
}
