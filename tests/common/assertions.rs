//! Custom test assertions for integration tests

use media_dl::{DownloadController, DownloadEvent};
use std::time::Duration;

/// Poll `controller` until a `Done` arrives or `timeout` elapses
///
/// Returns every event drained, including anything that followed `Done` in
/// the final batch.
pub async fn drive_to_done(
    controller: &mut DownloadController,
    timeout: Duration,
) -> Vec<DownloadEvent> {
    let mut events = Vec::new();
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        events.extend(controller.poll());
        if events.iter().any(DownloadEvent::is_done) {
            return events;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("Timed out waiting for Done, events so far: {:?}", events);
}

/// Assert exactly one `Done` exists, it is the last orchestrator event, and it carries `ok`
///
/// Controller warnings about history may follow `Done`; those are skipped.
pub fn assert_single_done(events: &[DownloadEvent], ok: bool) {
    let done: Vec<usize> = events
        .iter()
        .enumerate()
        .filter(|(_, e)| e.is_done())
        .map(|(i, _)| i)
        .collect();
    assert_eq!(done.len(), 1, "expected exactly one Done in {:?}", events);
    assert_eq!(events[done[0]], DownloadEvent::Done { ok });
    for trailing in &events[done[0] + 1..] {
        match trailing {
            DownloadEvent::Log { message } if message.starts_with("Warning: ") => {}
            other => panic!("unexpected event after Done: {:?}", other),
        }
    }
}

/// Log messages in order
pub fn log_messages(events: &[DownloadEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            DownloadEvent::Log { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// Number of progress events
pub fn progress_count(events: &[DownloadEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, DownloadEvent::Progress(_)))
        .count()
}
