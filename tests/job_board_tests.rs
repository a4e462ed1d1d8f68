use anyhow::Result;
use jobscout::clock::ManualClock;
use jobscout::config::Config;
use jobscout::{FileStore, JobBoard};
use std::sync::Arc;
use tempfile::TempDir;

fn open(path: &std::path::Path, clock: &ManualClock) -> JobBoard {
    JobBoard::with_clock(
        Arc::new(FileStore::new(path)),
        &Config::default(),
        Arc::new(clock.clone()),
    )
}

#[test]
fn test_session_state_survives_restart() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("store.json");
    let clock = ManualClock::new(1_000);

    let saved_id = {
        let mut board = open(&path, &clock);
        board.search("Rust", "Berlin")?;
        clock.advance(10);
        board.search("Go", "")?;
        let (job, saved) = board.toggle_result(0).expect("search returns at least five jobs");
        assert!(saved);
        job.id
    };

    let board = open(&path, &clock);
    assert!(board.is_saved(&saved_id));
    assert_eq!(board.history().len(), 2);
    assert_eq!(board.history()[0].keyword, "Go");
    assert!(!board.last_results().is_empty());
    Ok(())
}

#[test]
fn test_rerun_moves_entry_to_front() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let clock = ManualClock::new(1_000);
    let mut board = open(&temp_dir.path().join("store.json"), &clock);

    board.search("go", "remote")?;
    clock.advance(1);
    board.search("rust", "")?;
    clock.advance(1);

    assert!(board.rerun(1)?.is_some());
    let terms: Vec<(&str, &str)> = board
        .history()
        .iter()
        .map(|e| (e.keyword.as_str(), e.location.as_str()))
        .collect();
    assert_eq!(terms, vec![("go", "remote"), ("rust", "")]);
    assert!(board
        .last_results()
        .iter()
        .all(|j| j.location.as_deref() == Some("remote")));

    assert!(board.rerun(7)?.is_none());
    Ok(())
}

#[test]
fn test_configured_history_limit_applies() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let clock = ManualClock::new(1_000);
    let mut config = Config::default();
    config.history.max_items = 2;

    let mut board = JobBoard::with_clock(
        Arc::new(FileStore::new(temp_dir.path().join("store.json"))),
        &config,
        Arc::new(clock.clone()),
    );
    for keyword in ["a", "b", "c"] {
        board.search(keyword, "")?;
        clock.advance(1);
    }

    let keywords: Vec<&str> = board.history().iter().map(|e| e.keyword.as_str()).collect();
    assert_eq!(keywords, vec!["c", "b"]);
    Ok(())
}
