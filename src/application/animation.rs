//! Timed playback of a traversal
//!
//! A playback runs as a tokio task that forwards one event per step over a
//! channel. Starting a new playback cancels the previous one, so two
//! sequences never interleave on screen.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, trace};

use crate::application::error::{ApplicationError, ApplicationResult};
use crate::domain::traversal::VisitEvent;

const CHANNEL_CAPACITY: usize = 16;

struct Playback {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

/// Owner of at most one running playback.
#[derive(Default)]
pub struct TraversalPlayer {
    current: Option<Playback>,
}

impl TraversalPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start emitting `events`, the first immediately and the rest `delay`
    /// apart. Any playback still running is cancelled first.
    ///
    /// The returned receiver closes when the sequence ends or is cancelled.
    /// Must be called from within a tokio runtime.
    #[instrument(level = "debug", skip(self, events), fields(events = events.len()))]
    pub fn play(
        &mut self,
        events: Vec<VisitEvent>,
        delay: Duration,
    ) -> ApplicationResult<mpsc::Receiver<VisitEvent>> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            ApplicationError::Animation {
                message: format!("no async runtime: {e}"),
            }
        })?;
        self.cancel();

        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let handle = runtime.spawn(run(events, delay, tx, cancel.clone()));
        self.current = Some(Playback { cancel, handle });
        Ok(rx)
    }

    /// Stop the running playback, if any.
    pub fn cancel(&mut self) {
        if let Some(playback) = self.current.take() {
            if !playback.handle.is_finished() {
                debug!("cancelling running traversal");
            }
            playback.cancel.cancel();
        }
    }

    pub fn is_playing(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|playback| !playback.handle.is_finished())
    }
}

impl Drop for TraversalPlayer {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for TraversalPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TraversalPlayer")
            .field("playing", &self.is_playing())
            .finish()
    }
}

async fn run(
    events: Vec<VisitEvent>,
    delay: Duration,
    tx: mpsc::Sender<VisitEvent>,
    cancel: CancellationToken,
) {
    for (step, event) in events.into_iter().enumerate() {
        if step > 0 {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            sent = tx.send(event) => {
                if sent.is_err() {
                    trace!("receiver dropped, stopping traversal");
                    return;
                }
            }
        }
    }
    trace!("traversal finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::node::NodeId;
    use crate::domain::traversal::VisitPhase;

    fn events(n: u64) -> Vec<VisitEvent> {
        (1..=n)
            .map(|id| VisitEvent::new(NodeId(id), VisitPhase::Visit))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn given_events_when_playing_then_spaced_by_delay() {
        let mut player = TraversalPlayer::new();
        let start = tokio::time::Instant::now();
        let mut rx = player
            .play(events(3), Duration::from_millis(500))
            .expect("inside runtime");

        let mut received = Vec::new();
        while let Some(event) = rx.recv().await {
            received.push((event.id.0, start.elapsed().as_millis()));
        }
        assert_eq!(received, vec![(1, 0), (2, 500), (3, 1000)]);
    }

    #[tokio::test(start_paused = true)]
    async fn given_running_playback_when_playing_again_then_previous_is_cancelled() {
        let mut player = TraversalPlayer::new();
        let mut first = player
            .play(events(3), Duration::from_millis(500))
            .expect("inside runtime");
        let mut second = player
            .play(events(2), Duration::from_millis(500))
            .expect("inside runtime");

        assert_eq!(first.recv().await, None);
        let mut ids = Vec::new();
        while let Some(event) = second.recv().await {
            ids.push(event.id.0);
        }
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test(start_paused = true)]
    async fn given_running_playback_when_cancelled_then_channel_closes() {
        let mut player = TraversalPlayer::new();
        let mut rx = player
            .play(events(5), Duration::from_millis(500))
            .expect("inside runtime");
        assert_eq!(rx.recv().await.map(|e| e.id.0), Some(1));

        player.cancel();
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn given_no_runtime_when_playing_then_fails() {
        let mut player = TraversalPlayer::new();
        let result = player.play(events(1), Duration::from_millis(1));
        assert!(matches!(result, Err(ApplicationError::Animation { .. })));
    }
}
