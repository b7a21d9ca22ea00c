//! Audit events emitted by `answer_query`.

use super::support::*;
use crate::audit::AUDIT_TARGET;
use crate::progress::ProgressReporter;
use crate::types::AskOptions;
use std::io::Write;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

/// In-memory log sink shared with the subscriber.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    fn audit_lines(&self) -> Vec<String> {
        self.contents()
            .lines()
            .filter(|line| line.contains(AUDIT_TARGET))
            .map(str::to_string)
            .collect()
    }
}

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn capture() -> (LogBuffer, tracing::subscriber::DefaultGuard) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_target(true)
        .with_max_level(tracing::Level::INFO)
        .finish();
    let guard = tracing::subscriber::set_default(subscriber);
    (buffer, guard)
}

fn ask(role: &str) -> AskOptions {
    AskOptions {
        role: role.to_string(),
        query: "How many days of annual leave?".to_string(),
        top_k: 5,
        principal: Some("dana".to_string()),
    }
}

#[tokio::test]
async fn test_answered_query_is_audited() {
    let temp = TempDir::new().unwrap();
    company_docs(temp.path());
    let service = service(Arc::new(RecordingLlm::default()));
    service
        .run_ingestion(temp.path(), &ProgressReporter::noop())
        .await
        .unwrap();

    let (logs, _guard) = capture();
    service.answer_query(ask("hr")).await.unwrap();

    let lines = logs.audit_lines();
    assert_eq!(lines.len(), 1, "{:?}", lines);
    assert!(lines[0].contains("query answered"));
    assert!(lines[0].contains("principal=\"dana\"") || lines[0].contains("principal=dana"));
}

#[tokio::test]
async fn test_query_before_ingestion_is_audited_as_failed() {
    let service = service(Arc::new(RecordingLlm::default()));

    let (logs, _guard) = capture();
    let err = service.answer_query(ask("hr")).await.unwrap_err();
    assert!(err.is_not_ready());

    let lines = logs.audit_lines();
    assert_eq!(lines.len(), 1, "{:?}", lines);
    assert!(lines[0].contains("query failed"));
    assert!(lines[0].contains("Index not ready"));
}

#[tokio::test]
async fn test_generator_failure_is_audited_as_failed() {
    let temp = TempDir::new().unwrap();
    company_docs(temp.path());
    let service = service(Arc::new(UnreachableLlm));
    service
        .run_ingestion(temp.path(), &ProgressReporter::noop())
        .await
        .unwrap();

    let (logs, _guard) = capture();
    service.answer_query(ask("hr")).await.unwrap_err();

    let lines = logs.audit_lines();
    assert_eq!(lines.len(), 1, "{:?}", lines);
    assert!(lines[0].contains("query failed"));
    assert!(lines[0].contains("LLM error"));
}

#[tokio::test]
async fn test_unknown_role_is_audited_as_rejected() {
    let service = service(Arc::new(RecordingLlm::default()));

    let (logs, _guard) = capture();
    service.answer_query(ask("intern")).await.unwrap_err();

    let lines = logs.audit_lines();
    assert_eq!(lines.len(), 1, "{:?}", lines);
    assert!(lines[0].contains("query rejected"));
}
