//! Background driver that plays a division board one step at a time.
//!
//! One task runs per playing tutor. It is armed with the tutor's timer
//! generation and exits as soon as that generation goes stale (any manual
//! navigation, mode change, reset or new problem), the session is closed, or
//! the board reaches its last step. Handlers that move a playing board arm a
//! fresh driver, which restarts the interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::division::Step;
use crate::session::{SessionId, SessionStore};
use crate::websocket::{EventBroadcaster, TutorEvent};

/// Spawns a driver for `session`, armed with `generation`.
pub fn spawn(
    store: Arc<Mutex<SessionStore>>,
    broadcaster: EventBroadcaster,
    session: SessionId,
    generation: u64,
    interval: Duration,
) -> JoinHandle<()> {
    debug!(session, generation, "Arming autoplay");
    tokio::spawn(run(store, broadcaster, session, generation, interval))
}

async fn run(
    store: Arc<Mutex<SessionStore>>,
    broadcaster: EventBroadcaster,
    session: SessionId,
    mut generation: u64,
    interval: Duration,
) {
    loop {
        tokio::time::sleep(interval).await;

        let mut store = store.lock().await;
        let Ok(tutor) = store.division_mut(session) else {
            debug!(session, "Autoplay stopped: session closed");
            return;
        };
        if tutor.timer_generation() != generation {
            debug!(session, generation, "Autoplay stopped: stale timer");
            return;
        }

        if tutor.tick() {
            if let Some(step) = tutor.current_step() {
                broadcaster.send(TutorEvent::step_advanced(
                    session,
                    tutor.cursor(),
                    step.kind(),
                    true,
                ));
                if let Step::Finish {
                    quotient,
                    remainder,
                } = step
                {
                    broadcaster.send(TutorEvent::division_complete(
                        session, *quotient, *remainder,
                    ));
                }
            }
        }

        if !tutor.is_autoplaying() {
            debug!(session, "Autoplay stopped: last step reached");
            return;
        }
        generation = tutor.timer_generation();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::board::Mode;
    use crate::config::Config;
    use crate::division::DivisionSettings;

    const TICK: Duration = Duration::from_millis(5);

    fn playing_store() -> (Arc<Mutex<SessionStore>>, SessionId, u64) {
        let mut store = SessionStore::new(Config::default());
        let id = store
            .open_division(Some(DivisionSettings {
                dividend: 17,
                divisor: 5,
            }))
            .unwrap();
        let tutor = store.division_mut(id).unwrap();
        tutor.set_autoplay(true).unwrap();
        let generation = tutor.timer_generation();
        (Arc::new(Mutex::new(store)), id, generation)
    }

    #[tokio::test]
    async fn test_plays_to_the_end_and_stops() {
        let (store, id, generation) = playing_store();
        let broadcaster = EventBroadcaster::default();
        let mut events = broadcaster.subscribe();

        spawn(store.clone(), broadcaster, id, generation, TICK)
            .await
            .unwrap();

        let guard = store.lock().await;
        let tutor = guard.division(id).unwrap();
        assert!(tutor.is_complete());
        assert!(!tutor.is_autoplaying());
        drop(guard);

        let mut advanced = 0;
        let mut completed = false;
        while let Ok(event) = events.try_recv() {
            match event {
                TutorEvent::StepAdvanced(payload) => {
                    advanced += 1;
                    assert!(payload.autoplay);
                }
                TutorEvent::DivisionComplete(payload) => {
                    completed = true;
                    assert_eq!((payload.quotient, payload.remainder), (3, 2));
                }
                _ => {}
            }
        }
        assert_eq!(advanced, 8);
        assert!(completed);
    }

    #[tokio::test]
    async fn test_stale_generation_exits_without_moving() {
        let (store, id, generation) = playing_store();
        store.lock().await.division_mut(id).unwrap().next().unwrap();

        spawn(store.clone(), EventBroadcaster::default(), id, generation, TICK)
            .await
            .unwrap();

        let guard = store.lock().await;
        assert_eq!(guard.division(id).unwrap().cursor(), 1);
    }

    #[tokio::test]
    async fn test_mode_change_stops_playback() {
        let (store, id, generation) = playing_store();
        let handle = spawn(store.clone(), EventBroadcaster::default(), id, generation, TICK);
        store
            .lock()
            .await
            .division_mut(id)
            .unwrap()
            .set_mode(Mode::Practice);

        handle.await.unwrap();
        let guard = store.lock().await;
        let tutor = guard.division(id).unwrap();
        assert_eq!(tutor.mode(), Mode::Practice);
        assert_eq!(tutor.cursor(), 1);
    }

    #[tokio::test]
    async fn test_closed_session_exits() {
        let (store, id, generation) = playing_store();
        store.lock().await.close_division(id).unwrap();

        spawn(store.clone(), EventBroadcaster::default(), id, generation, TICK)
            .await
            .unwrap();
        assert!(store.lock().await.is_empty());
    }
}
