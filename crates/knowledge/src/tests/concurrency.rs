//! Concurrent queries during rebuilds.

use super::support::*;
use crate::progress::ProgressReporter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_readers_never_see_a_partial_generation() {
    let small = TempDir::new().unwrap();
    write_doc(small.path(), "hr/leave.md", "Employees receive 25 days of annual leave.");

    let large = TempDir::new().unwrap();
    company_docs(large.path());

    let service = Arc::new(service(Arc::new(RecordingLlm::default())));
    let small_stats = service
        .run_ingestion(small.path(), &ProgressReporter::noop())
        .await
        .unwrap();
    let large_stats = service
        .run_ingestion(large.path(), &ProgressReporter::noop())
        .await
        .unwrap();
    let sizes = [
        small_stats.total_chunks as usize,
        large_stats.total_chunks as usize,
    ];

    let stop = Arc::new(AtomicBool::new(false));
    let mut readers = Vec::new();
    for _ in 0..4 {
        let service = Arc::clone(&service);
        let stop = Arc::clone(&stop);
        readers.push(tokio::spawn(async move {
            let mut observed = 0u32;
            while !stop.load(Ordering::SeqCst) {
                let generation = service.index_handle().current().unwrap();
                assert!(sizes.contains(&generation.index.len()));

                let hits = service
                    .retrieve("hr", "annual leave", 5)
                    .await
                    .unwrap();
                assert_eq!(hits.len(), 1);
                assert!(hits[0].chunk.source_path.starts_with("hr/leave"));

                observed += 1;
                tokio::task::yield_now().await;
            }
            observed
        }));
    }

    for round in 0..6 {
        let dir = if round % 2 == 0 { small.path() } else { large.path() };
        service
            .run_ingestion(dir, &ProgressReporter::noop())
            .await
            .unwrap();
    }

    stop.store(true, Ordering::SeqCst);
    for reader in readers {
        assert!(reader.await.unwrap() > 0);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rebuilds_are_serialised() {
    let temp = TempDir::new().unwrap();
    company_docs(temp.path());

    let service = Arc::new(service(Arc::new(RecordingLlm::default())));

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let service = Arc::clone(&service);
        let path = temp.path().to_path_buf();
        tasks.push(tokio::spawn(async move {
            service
                .run_ingestion(&path, &ProgressReporter::noop())
                .await
                .unwrap()
        }));
    }

    let mut generations = Vec::new();
    let mut counts = Vec::new();
    for task in tasks {
        let stats = task.await.unwrap();
        generations.push(stats.generation);
        counts.push(stats.total_chunks);
    }

    generations.sort_unstable();
    generations.dedup();
    assert_eq!(generations.len(), 4);
    assert!(counts.windows(2).all(|w| w[0] == w[1]));

    let status = service.status();
    assert_eq!(status.generation, generations.last().copied());
    assert_eq!(status.chunks, counts[0] as usize);
}
