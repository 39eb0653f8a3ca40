//! Announcement queue consumer

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    announce::{deliver, AudioOutput, Playback},
    state::{AppState, Notification},
};

/// Background task that voices queued milestones one after another.
///
/// Each playback is awaited to completion before the next notification is
/// taken from the queue, so phrases never overlap.
pub async fn announcer_task<A: AudioOutput>(
    state: Arc<AppState>,
    mut queue: mpsc::UnboundedReceiver<Notification>,
    audio: A,
) {
    info!("Starting announcer task");

    while let Some(notification) = queue.recv().await {
        let preferences = match state.get_preferences() {
            Ok(preferences) => preferences,
            Err(e) => {
                warn!("Skipping announcement for {}: {}", notification.label, e);
                continue;
            }
        };

        match Playback::plan(&preferences, &notification) {
            Some(playback) => deliver(&audio, &playback).await,
            None => debug!("Speech disabled, not announcing {:?}", notification.milestone),
        }
    }

    info!("Announcement queue closed, announcer stopping");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Milestone, TimerId};
    use crate::storage::{BoardDocument, Storage};
    use std::{sync::Mutex, time::Duration};
    use tempfile::TempDir;
    use tokio::time::{sleep, Instant};

    #[derive(Clone, Default)]
    struct SlowVoice {
        spoken: Arc<Mutex<Vec<(String, Instant, Instant)>>>,
    }

    impl AudioOutput for SlowVoice {
        async fn play_clip(&self, _reference: &str) -> Result<(), String> {
            Err("no clips".to_string())
        }

        async fn speak(&self, text: &str, _voice: &str) -> Result<(), String> {
            let started = Instant::now();
            sleep(Duration::from_secs(2)).await;
            self.spoken
                .lock()
                .unwrap()
                .push((text.to_string(), started, Instant::now()));
            Ok(())
        }
    }

    fn notification(label: &str, milestone: Milestone) -> Notification {
        Notification {
            timer_id: TimerId::from(label),
            label: label.to_string(),
            milestone,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn phrases_never_overlap() {
        let dir = TempDir::new().unwrap();
        let state = Arc::new(AppState::new(
            Storage::new(dir.path().join("board.json")),
            BoardDocument::default(),
            0,
            "127.0.0.1".to_string(),
        ));
        let (tx, rx) = mpsc::unbounded_channel();
        let voice = SlowVoice::default();
        let handle = tokio::spawn(announcer_task(Arc::clone(&state), rx, voice.clone()));

        tx.send(notification("A", Milestone::Threshold(300))).unwrap();
        tx.send(notification("B", Milestone::Threshold(120))).unwrap();
        tx.send(notification("C", Milestone::Finished)).unwrap();
        drop(tx);
        handle.await.unwrap();

        let spoken = voice.spoken.lock().unwrap();
        let texts: Vec<_> = spoken.iter().map(|(text, _, _)| text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "A: five minutes remaining.",
                "B: two minutes remaining.",
                "C: time's up!"
            ]
        );
        for pair in spoken.windows(2) {
            assert!(pair[1].1 >= pair[0].2);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn muted_board_stays_quiet() {
        let dir = TempDir::new().unwrap();
        let mut document = BoardDocument::default();
        document.preferences.speech_enabled = false;
        let state = Arc::new(AppState::new(
            Storage::new(dir.path().join("board.json")),
            document,
            0,
            "127.0.0.1".to_string(),
        ));
        let (tx, rx) = mpsc::unbounded_channel();
        let voice = SlowVoice::default();
        let handle = tokio::spawn(announcer_task(state, rx, voice.clone()));

        tx.send(notification("A", Milestone::Finished)).unwrap();
        drop(tx);
        handle.await.unwrap();

        assert!(voice.spoken.lock().unwrap().is_empty());
    }
}
