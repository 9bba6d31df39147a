//! Integration test: rounds of scheduling and verification converge, leave
//! permanent failures after the ceiling, and never grow the failure set.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::fake_extractor::FakeExtractor;
use tempfile::tempdir;
use ypd_core::batch::{run_batch, run_single, BatchOptions};
use ypd_core::job::MediaKind;
use ypd_core::scheduler::PoolOptions;
use ypd_core::verify;

fn options(max_rounds: u32) -> BatchOptions {
    BatchOptions {
        pool: PoolOptions {
            max_concurrency: 4,
            ..PoolOptions::default()
        },
        max_rounds,
        ..BatchOptions::default()
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn one_permanent_failure_after_four_rounds() {
    let out = tempdir().unwrap();
    let jobs = vec![
        common::job(MediaKind::Audio, "https://m/1", "first"),
        common::job(MediaKind::Video, "https://m/2", "second"),
        common::job(MediaKind::Audio, "https://m/3", "third"),
    ];
    let extractor = Arc::new(
        FakeExtractor::with_delay(Duration::from_millis(20)).always_fail("https://m/2"),
    );

    let report = run_batch(jobs.clone(), out.path(), extractor.clone(), &options(4))
        .await
        .unwrap();

    assert_eq!(report.succeeded, vec![jobs[0].clone(), jobs[2].clone()]);
    assert_eq!(report.failed, vec![jobs[1].clone()]);
    assert!(!report.is_complete());

    let rounds: Vec<(u32, usize, usize, usize)> = report
        .rounds
        .iter()
        .map(|r| (r.round, r.attempted, r.succeeded, r.failed))
        .collect();
    assert_eq!(rounds, [(1, 3, 2, 1), (2, 1, 0, 1), (3, 1, 0, 1), (4, 1, 0, 1)]);

    assert_eq!(extractor.calls("https://m/1"), 1);
    assert_eq!(extractor.calls("https://m/2"), 4);
    assert_eq!(extractor.calls("https://m/3"), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn flaky_job_recovers_and_failures_never_grow() {
    let out = tempdir().unwrap();
    let jobs = vec![
        common::job(MediaKind::Audio, "https://f/1", "steady"),
        common::job(MediaKind::Audio, "https://f/2", "flaky"),
        common::job(MediaKind::Audio, "https://f/3", "flakier"),
    ];
    let extractor = Arc::new(
        FakeExtractor::default()
            .fail_first("https://f/2", 1)
            .fail_first("https://f/3", 2),
    );

    let report = run_batch(jobs.clone(), out.path(), extractor, &options(4))
        .await
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(report.succeeded, jobs);
    assert_eq!(report.rounds.len(), 3);
    assert!(report.rounds.windows(2).all(|w| w[1].failed <= w[0].failed));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn sibling_file_does_not_verify_a_failed_title_job() {
    let out = tempdir().unwrap();
    let jobs = vec![
        common::job(MediaKind::Audio, "https://p/a", "song %(title)s"),
        common::job(MediaKind::Audio, "https://p/b", "song %(title)s"),
    ];
    let extractor = Arc::new(FakeExtractor::default().fail_first("https://p/a", 1));

    let report = run_batch(jobs.clone(), out.path(), extractor.clone(), &BatchOptions::default())
        .await
        .unwrap();

    assert_eq!(extractor.calls("https://p/a"), 2);
    assert!(report.is_complete());
    assert_eq!(report.succeeded, jobs);
    assert!(report.rounds.windows(2).all(|w| w[1].failed <= w[0].failed));
    assert!(out.path().join("song Title a.mp3").exists());
    assert!(out.path().join("song Title b.mp3").exists());
}

#[tokio::test]
async fn reverification_gives_the_same_partition() {
    let out = tempdir().unwrap();
    let jobs = vec![
        common::job(MediaKind::Audio, "https://r/1", "kept"),
        common::job(MediaKind::Audio, "https://r/2", "lost"),
    ];
    let extractor = Arc::new(FakeExtractor::default().always_fail("https://r/2"));
    let since = ypd_core::batch::batch_start();

    run_batch(jobs.clone(), out.path(), extractor, &options(1))
        .await
        .unwrap();

    let first = verify::verify(out.path(), &jobs, since, true).unwrap();
    let second = verify::verify(out.path(), &jobs, since, true).unwrap();
    assert_eq!(first.succeeded, second.succeeded);
    assert_eq!(first.failed, second.failed);
    assert_eq!(first.failed, vec![jobs[1].clone()]);
}

#[tokio::test]
async fn single_entry_reports_new_media() {
    let out = tempdir().unwrap();
    let extractor = Arc::new(FakeExtractor::default().always_fail("https://s/bad"));

    let ok = run_single(
        common::job(MediaKind::Video, "https://s/good", "good"),
        out.path(),
        extractor.clone(),
        &options(4),
    )
    .await
    .unwrap();
    assert!(ok);

    let failed = run_single(
        common::job(MediaKind::Video, "https://s/bad", "bad"),
        &out.path().join("elsewhere"),
        extractor.clone(),
        &options(4),
    )
    .await
    .unwrap();
    assert!(!failed);
    assert_eq!(extractor.calls("https://s/bad"), 1);
}
