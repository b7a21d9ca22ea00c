//! Retrieval-augmented answering.
//!
//! Role-filtered retrieval, confidence, citations and grounded generation.

pub mod ask;
pub mod citations;
pub mod confidence;
pub mod retrieve;
pub mod types;

pub use ask::AnswerGenerator;
pub use citations::citations;
pub use confidence::confidence;
pub use retrieve::Retriever;
pub use types::RagResponse;
