//! Reading the onset feed while a background pass is still appending.

mod common;

use common::*;
use fluxbeat::onset::window_index_for_time;
use fluxbeat::{analyze, spawn, spawn_with, AnalysisConfig, AnalysisContext, CancelToken, Error};

#[test]
fn feed_only_grows_and_never_revises() {
    let samples = gen_beat_track(600, 7);
    let buffer = mono(samples);
    let expected = analyze(&buffer, &AnalysisConfig::default()).unwrap();

    let handle = spawn(buffer, AnalysisConfig::default()).unwrap();
    let feed = handle.feed().clone();

    let mut last_len = 0;
    while !feed.is_finished() {
        let snapshot = feed.snapshot();
        assert!(snapshot.len() >= last_len);
        // Whatever is visible already matches the final answer
        assert_eq!(snapshot[..], expected.records[..snapshot.len()]);
        last_len = snapshot.len();
        std::thread::yield_now();
    }

    let analysis = handle.join().unwrap();
    assert_eq!(analysis.records, expected.records);
    assert_eq!(feed.snapshot(), expected.records);
}

#[test]
fn cancelled_background_pass_reports_progress_made() {
    let cancel = CancelToken::new();
    cancel.cancel();
    let ctx = AnalysisContext::new().with_cancel(cancel);

    let handle = spawn_with(mono(gen_noise(WINDOW * 100, 0.2, 1)), AnalysisConfig::default(), ctx)
        .unwrap();
    let feed = handle.feed().clone();
    let err = handle.join().unwrap_err();

    assert!(matches!(err, Error::Cancelled { windows_done: 0 }));
    assert!(feed.is_finished());
    assert!(feed.is_empty());
}

#[test]
fn handle_cancel_stops_the_pass() {
    let handle = spawn(mono(gen_noise(WINDOW * 3000, 0.2, 2)), AnalysisConfig::default()).unwrap();
    handle.cancel();
    match handle.join() {
        Err(Error::Cancelled { windows_done }) => assert!(windows_done < 3000),
        // The pass may legitimately finish before the flag is observed
        Ok(analysis) => assert_eq!(analysis.windows, 3000),
        Err(other) => panic!("unexpected error: {}", other),
    }
}

#[test]
fn playback_time_selects_display_window() {
    let buffer = mono(gen_beat_track(300, 6));
    let handle = spawn(buffer, AnalysisConfig::default()).unwrap();
    let feed = handle.feed().clone();
    handle.join().unwrap();

    let index = window_index_for_time(3.0, SR, WINDOW);
    assert_eq!(index, 129);

    let visible = feed.display_window(Some(index), 100);
    assert_eq!(visible.len(), 100);
    assert_eq!(visible[0], feed.get(79).unwrap());
}
