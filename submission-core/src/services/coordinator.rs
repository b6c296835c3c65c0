use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use validator::Validate;

use crate::config::CoordinatorConfig;
use crate::error::SubmitError;
use crate::metrics::{
    record_cache_hit, record_cache_miss, GUARD_HITS_TOTAL, IN_FLIGHT_JOINS_TOTAL,
    SUBMISSIONS_IN_FLIGHT, SUBMISSIONS_TOTAL, TRANSPORT_RETRIES_TOTAL,
};
use crate::models::submission::{SubmissionOutcome, SubmissionRequest};
use crate::models::SubmissionKey;
use crate::services::attempts::AttemptLedger;
use crate::services::cache::ResultCache;
use crate::services::guard::PersistenceGuard;
use crate::services::throttle::ThrottleGate;
use crate::stores::KvStore;
use crate::transport::{ResultTransport, TransportError};
use crate::utils::retry::{retry_async_with_config, RetryConfig, RetryError};

type SharedSubmission = Shared<BoxFuture<'static, Result<SubmissionOutcome, SubmitError>>>;

struct InFlightEntry {
    started_at: DateTime<Utc>,
    future: SharedSubmission,
}

/// All in-memory registries live behind one mutex. The lock is only held
/// for bookkeeping; the network call and the guard store are awaited
/// outside it.
struct Registries {
    in_flight: HashMap<SubmissionKey, InFlightEntry>,
    attempts: AttemptLedger,
    throttle: ThrottleGate,
    cache: ResultCache,
}

struct Inner {
    config: CoordinatorConfig,
    transport: Arc<dyn ResultTransport>,
    guard: PersistenceGuard,
    registries: Mutex<Registries>,
}

/// Orchestrates exactly-once delivery of quiz results: durable idempotence
/// guard, single-flight deduplication, per-key throttling, a bounded outer
/// attempt budget, and backed-off retries around the injected transport.
///
/// Construct one per application and hand clones to callers; every clone
/// shares the same registries.
#[derive(Clone)]
pub struct SubmissionCoordinator {
    inner: Arc<Inner>,
}

impl SubmissionCoordinator {
    pub fn new(
        config: CoordinatorConfig,
        transport: Arc<dyn ResultTransport>,
        store: Arc<dyn KvStore>,
    ) -> Self {
        let guard = PersistenceGuard::new(store, config.guard_namespace.clone());
        let registries = Registries {
            in_flight: HashMap::new(),
            attempts: AttemptLedger::new(),
            throttle: ThrottleGate::new(config.throttle_window),
            cache: ResultCache::new(),
        };
        Self {
            inner: Arc::new(Inner {
                config,
                transport,
                guard,
                registries: Mutex::new(registries),
            }),
        }
    }

    /// Submits one logical result. Concurrent calls for the same key all
    /// receive the outcome of a single network call; a key that already
    /// succeeded (even before a restart) is served from the guard record
    /// without any network traffic.
    pub async fn submit(
        &self,
        request: SubmissionRequest,
    ) -> Result<SubmissionOutcome, SubmitError> {
        if let Err(e) = request.payload.validate() {
            let err = SubmitError::Validation(e.to_string());
            SUBMISSIONS_TOTAL.with_label_values(&[err.metric_label()]).inc();
            return Err(err);
        }
        let key = request.key.clone();

        // Durable guard first: an already-saved result must never reach the
        // network again, even on a cold start.
        match self.inner.guard.load(&key).await {
            Ok(Some(outcome)) => {
                GUARD_HITS_TOTAL.inc();
                record_cache_hit();
                tracing::info!("Submission {} already saved, returning stored result", key);
                let mut regs = self.inner.registries.lock().unwrap();
                if regs.cache.get(&key).is_none() {
                    regs.cache.put(key, outcome.clone());
                }
                return Ok(outcome);
            }
            Ok(None) => {}
            Err(e) => {
                let err = SubmitError::Store(format!("{:#}", e));
                SUBMISSIONS_TOTAL.with_label_values(&[err.metric_label()]).inc();
                tracing::error!("Guard store lookup failed for {}: {:#}", key, e);
                return Err(err);
            }
        }
        record_cache_miss();

        let shared = {
            let mut regs = self.inner.registries.lock().unwrap();

            // A success may have settled between the guard read and taking
            // the lock; the cache is written before the in-flight entry is
            // dropped, so it is visible here.
            if let Some(outcome) = regs.cache.get(&key) {
                return Ok(outcome);
            }

            // Someone else owns the network call: join their outcome.
            if let Some(entry) = regs.in_flight.get(&key) {
                IN_FLIGHT_JOINS_TOTAL.inc();
                tracing::debug!(
                    "Joining in-flight submission for {} started at {}",
                    key,
                    entry.started_at
                );
                entry.future.clone()
            } else {
                if !regs.throttle.try_acquire(&key) {
                    let retry_after = regs
                        .throttle
                        .remaining(&key)
                        .unwrap_or(self.inner.config.throttle_window);
                    let err = SubmitError::Throttled { retry_after };
                    SUBMISSIONS_TOTAL.with_label_values(&[err.metric_label()]).inc();
                    tracing::warn!(
                        "Submission for {} throttled, retry allowed in {:?}",
                        key,
                        retry_after
                    );
                    return Err(err);
                }

                if regs.attempts.get(&key) >= self.inner.config.max_attempts {
                    let err = SubmitError::MaxAttemptsExceeded {
                        key: key.clone(),
                        max: self.inner.config.max_attempts,
                    };
                    SUBMISSIONS_TOTAL.with_label_values(&[err.metric_label()]).inc();
                    tracing::warn!("Attempt budget exhausted for {}", key);
                    return Err(err);
                }

                let attempt = regs.attempts.increment(&key);
                tracing::info!(
                    "Starting submission for {} (attempt {}/{})",
                    key,
                    attempt,
                    self.inner.config.max_attempts
                );

                // Detached owner task: a caller abandoning its await must not
                // abort a submission that may already have reached the server.
                // The entry is inserted under the same lock held since before
                // the spawn, so the task cannot settle ahead of registration.
                let handle = tokio::spawn(Self::run_submission(self.inner.clone(), request));
                let future: SharedSubmission = async move {
                    match handle.await {
                        Ok(outcome) => outcome,
                        Err(e) => Err(SubmitError::Internal(e.to_string())),
                    }
                }
                .boxed()
                .shared();

                regs.in_flight.insert(
                    key,
                    InFlightEntry {
                        started_at: Utc::now(),
                        future: future.clone(),
                    },
                );
                SUBMISSIONS_IN_FLIGHT.inc();
                future
            }
        };

        shared.await
    }

    /// One owned network submission: backed-off retries around the
    /// transport, then bookkeeping for whichever way it settled.
    async fn run_submission(
        inner: Arc<Inner>,
        request: SubmissionRequest,
    ) -> Result<SubmissionOutcome, SubmitError> {
        let key = request.key.clone();
        let slug = request.slug.clone();
        let payload = &request.payload;
        let transport = inner.transport.clone();

        let retry_cfg = RetryConfig {
            max_retries: inner.config.max_retries,
            initial_delay: inner.config.initial_retry_delay,
            max_delay: inner.config.max_retry_delay,
            jitter_max: None,
        };

        let calls = AtomicUsize::new(0);
        let sent = retry_async_with_config(
            retry_cfg,
            |e: &TransportError| e.is_transient(),
            || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n > 0 {
                    TRANSPORT_RETRIES_TOTAL.inc();
                    tracing::info!("Retrying submission for {} (transport call {})", key, n + 1);
                }
                async { transport.send(&slug, payload).await }
            },
        )
        .await;

        match sent {
            Ok(result) => {
                let outcome = SubmissionOutcome {
                    result,
                    succeeded_at: Utc::now(),
                };
                {
                    let mut regs = inner.registries.lock().unwrap();
                    regs.cache.put(key.clone(), outcome.clone());
                    regs.attempts.reset(&key);
                }
                if let Err(e) = inner.guard.mark(&key, &outcome).await {
                    // The remote store already has the result; refusing to
                    // return it here could only provoke a duplicate later.
                    tracing::error!("Failed to persist guard record for {}: {:#}", key, e);
                }
                Self::settle(&inner, &key);
                SUBMISSIONS_TOTAL.with_label_values(&["success"]).inc();
                tracing::info!(
                    "Submission for {} saved (score {}/{})",
                    key,
                    outcome.result.score,
                    outcome.result.max_score
                );
                Ok(outcome)
            }
            Err(failure) => {
                Self::settle(&inner, &key);
                let err = match failure {
                    RetryError::Exhausted { attempts, last } => SubmitError::RetriesExhausted {
                        attempts,
                        last,
                    },
                    RetryError::Permanent(e) => SubmitError::Transport(e),
                };
                SUBMISSIONS_TOTAL.with_label_values(&[err.metric_label()]).inc();
                // The attempt ledger is intentionally not reset here, so
                // outer user-triggered retries stay bounded.
                tracing::warn!("Submission for {} failed: {}", key, err);
                Err(err)
            }
        }
    }

    fn settle(inner: &Inner, key: &SubmissionKey) {
        let mut regs = inner.registries.lock().unwrap();
        if regs.in_flight.remove(key).is_some() {
            SUBMISSIONS_IN_FLIGHT.dec();
        }
    }

    /// Fast local read of a previously saved result: in-memory cache first,
    /// then the durable guard record (warming the cache), never the network.
    pub async fn get_cached(
        &self,
        key: &SubmissionKey,
    ) -> Result<Option<SubmissionOutcome>, SubmitError> {
        {
            let regs = self.inner.registries.lock().unwrap();
            if let Some(outcome) = regs.cache.get(key) {
                record_cache_hit();
                return Ok(Some(outcome));
            }
        }
        record_cache_miss();

        match self.inner.guard.load(key).await {
            Ok(Some(outcome)) => {
                let mut regs = self.inner.registries.lock().unwrap();
                regs.cache.put(key.clone(), outcome.clone());
                Ok(Some(outcome))
            }
            Ok(None) => Ok(None),
            Err(e) => Err(SubmitError::Store(format!("{:#}", e))),
        }
    }

    /// Forgets coordinator state for one quiz (all result types sharing its
    /// key prefix), including the durable guard records — the legitimate
    /// "retake" path. With `None`, clears all in-memory state; durable
    /// records are removable per key only.
    pub async fn clear_cache(&self, key: Option<&SubmissionKey>) -> Result<(), SubmitError> {
        match key {
            Some(key) => {
                let prefix = key.quiz_prefix();
                {
                    let mut regs = self.inner.registries.lock().unwrap();
                    regs.cache.invalidate(Some(key));
                    regs.attempts.clear_prefix(&prefix);
                    regs.throttle.clear_prefix(&prefix);
                    let before = regs.in_flight.len();
                    regs.in_flight.retain(|k, _| !k.as_str().starts_with(&prefix));
                    SUBMISSIONS_IN_FLIGHT.sub((before - regs.in_flight.len()) as i64);
                }
                self.inner
                    .guard
                    .clear_quiz(key.quiz_id())
                    .await
                    .map_err(|e| SubmitError::Store(format!("{:#}", e)))?;
                tracing::info!("Cleared submission state for quiz {}", key.quiz_id());
            }
            None => {
                let mut regs = self.inner.registries.lock().unwrap();
                regs.cache.invalidate(None);
                regs.attempts.clear_all();
                regs.throttle.clear_all();
                SUBMISSIONS_IN_FLIGHT.sub(regs.in_flight.len() as i64);
                regs.in_flight.clear();
                tracing::info!("Cleared all submission state");
            }
        }
        Ok(())
    }
}
