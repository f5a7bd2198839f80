//! Integration tests for `SpeechLibrary` warm-up.

mod common;

use std::time::Duration;

use common::{Call, Harness, entries_with_prefix};
use salvo_voice::CountdownError;
use tempfile::tempdir;

#[tokio::test]
async fn warm_up_creates_one_clamped_clip_per_numeral() {
    let tmp = tempdir().unwrap();
    let h = Harness::new(tmp.path(), 4);

    h.library.ensure_ready().await.unwrap();

    assert!(h.library.is_ready());
    assert_eq!(h.library.len().await, 4);
    assert_eq!(h.backend.spoken(), ["1.", "2.", "3.", "4."]);
    for n in 1..=4 {
        let clip = h.library.get(n).await.unwrap();
        assert_eq!(clip.path(), h.library_dir().join(format!("{n}.wav")));
        assert!(clip.exists());
    }
    assert!(h.backend.calls().iter().all(|c| match c {
        Call::Normalize { clamp, .. } => *clamp == Some(Duration::from_secs(1)),
        _ => true,
    }));

    // Raw clips and the warm-up scratch directory are gone.
    assert!(entries_with_prefix(&h.library_dir(), ".warm-").is_empty());
    assert_eq!(std::fs::read_dir(h.library_dir()).unwrap().count(), 4);
}

#[tokio::test]
async fn warm_up_is_idempotent() {
    let tmp = tempdir().unwrap();
    let h = Harness::new(tmp.path(), 3);

    h.library.ensure_ready().await.unwrap();
    let calls = h.backend.call_count();
    h.library.ensure_ready().await.unwrap();

    assert_eq!(h.backend.call_count(), calls);
}

#[tokio::test]
async fn clips_from_a_previous_run_are_adopted() {
    let tmp = tempdir().unwrap();
    {
        let first_run = Harness::new(tmp.path(), 3);
        first_run.library.ensure_ready().await.unwrap();
    }

    let h = Harness::new(tmp.path(), 5);
    h.library.ensure_ready().await.unwrap();

    assert_eq!(h.backend.spoken(), ["4.", "5."]);
    assert_eq!(h.library.len().await, 5);
}

#[tokio::test]
async fn a_failing_numeral_aborts_warm_up() {
    let tmp = tempdir().unwrap();
    let h = Harness::new(tmp.path(), 5);
    h.backend.fail_on(Some("3."));

    let err = h.library.ensure_ready().await.unwrap_err();
    assert!(matches!(err, CountdownError::Synthesis(_)), "got {err:?}");
    assert!(!h.library.is_ready());
    assert!(h.library.get(2).await.is_some());
    assert!(h.library.get(3).await.is_none());
    assert!(entries_with_prefix(&h.library_dir(), ".warm-").is_empty());

    // Retrying picks up where the failure left off.
    h.backend.fail_on(None);
    h.library.ensure_ready().await.unwrap();
    assert!(h.library.is_ready());
    assert_eq!(
        h.backend.spoken().iter().filter(|t| *t == "1.").count(),
        1,
        "numerals written before the failure are not regenerated"
    );
}

#[tokio::test]
async fn get_reports_absent_numerals() {
    let tmp = tempdir().unwrap();
    let h = Harness::new(tmp.path(), 2);
    h.library.ensure_ready().await.unwrap();

    assert!(h.library.get(0).await.is_none());
    assert!(h.library.get(3).await.is_none());

    std::fs::remove_file(h.library_dir().join("2.wav")).unwrap();
    assert!(h.library.get(2).await.is_none());
}
