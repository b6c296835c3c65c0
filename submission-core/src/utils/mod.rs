pub mod retry;
pub mod scoring;
