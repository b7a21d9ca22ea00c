//! Cross-module tests for the retrieval pipeline.

mod audit;
mod concurrency;
mod support;
