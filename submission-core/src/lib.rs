#![allow(dead_code)]

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod services;
pub mod stores;
pub mod transport;
pub mod utils;

pub use config::CoordinatorConfig;
pub use error::SubmitError;
pub use models::{
    AnswerRecord, QuizResult, ResultType, SubmissionKey, SubmissionOutcome, SubmissionPayload,
    SubmissionRequest,
};
pub use services::SubmissionCoordinator;
pub use stores::{FileKvStore, KvStore, MemoryKvStore, RedisKvStore};
pub use transport::{ResultTransport, TransportError};
pub use utils::scoring::correct_answer_count;
