//! Integration tests for the session event loop and background analysis.

mod common;

use std::time::Duration;

use game_session::{Event, ViewModel};

/// Poll until the background analysis settles or the deadline passes.
async fn wait_for_analysis(session: &mut game_session::Session) {
    for _ in 0..500 {
        session.dispatch(Event::PollAnalysis).unwrap();
        if !session.analysis_in_progress() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("analysis did not finish in time");
}

#[tokio::test]
async fn test_background_analysis_publishes_whole_report() {
    let mut session = common::session();
    session
        .dispatch(Event::LoadPgn(common::SCHOLAR_OPENING_PGN.to_string()))
        .unwrap();

    session.dispatch(Event::StartAnalysis).unwrap();
    assert!(session.analysis_in_progress());
    assert!(session.report().is_none());

    wait_for_analysis(&mut session).await;

    let report = session.report().expect("report published");
    assert_eq!(report.moves.len(), 4);
    assert_eq!(report.opening.name, "King's Pawn Game");
    // Background evaluations (here: recorded engine failures) seed the cache.
    assert!(!session.cache().is_empty());

    let view = ViewModel::derive(&session);
    assert!(!view.analysis_in_progress);
    assert_eq!(view.opening.as_deref(), Some("King's Pawn Game (C40)"));
}

#[tokio::test]
async fn test_stale_analysis_result_is_discarded() {
    let mut session = common::session();
    session
        .dispatch(Event::LoadPgn(common::SCHOLAR_OPENING_PGN.to_string()))
        .unwrap();
    session.dispatch(Event::StartAnalysis).unwrap();

    // Loading a different game while analysis is in flight bumps the
    // generation; the old result must not be published.
    session
        .dispatch(Event::LoadPgn("1. d4 d5 *".to_string()))
        .unwrap();
    assert!(!session.analysis_in_progress());

    tokio::time::sleep(Duration::from_millis(200)).await;
    session.dispatch(Event::PollAnalysis).unwrap();
    assert!(session.report().is_none());
    assert!(session.cache().is_empty());
}

#[tokio::test]
async fn test_starting_twice_is_a_no_op() {
    let mut session = common::session();
    session
        .dispatch(Event::LoadPgn(common::SCHOLAR_OPENING_PGN.to_string()))
        .unwrap();

    session.dispatch(Event::StartAnalysis).unwrap();
    session.dispatch(Event::StartAnalysis).unwrap();
    assert!(session
        .debug_entries()
        .iter()
        .any(|entry| entry.ends_with("Analysis already in progress")));

    wait_for_analysis(&mut session).await;
    assert!(session.report().is_some());
}
