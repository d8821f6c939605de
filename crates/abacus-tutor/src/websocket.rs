//! WebSocket event types and broadcasting for live tutor feedback.
//!
//! Every connected client receives every event; clients filter by session id.
//!
//! # Event Types
//!
//! - `connected` - Sent when a client connects, includes current progress
//! - `answer_checked` - A topic or division answer was checked
//! - `celebrate` - A topic answer was correct
//! - `step_advanced` - A division board moved (manually or by autoplay)
//! - `division_complete` - A division problem reached its final step
//! - `error` - A request failed
//!
//! # Example
//!
//! ```no_run
//! use abacus_tutor::websocket::{EventBroadcaster, TutorEvent};
//!
//! # async fn example() {
//! let broadcaster = EventBroadcaster::new(100);
//! let mut receiver = broadcaster.subscribe();
//!
//! broadcaster.send(TutorEvent::error("Session not found: '7'"));
//!
//! if let Ok(event) = receiver.recv().await {
//!     println!("Received: {:?}", event);
//! }
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::api::AppState;
use crate::division::StepKind;
use crate::session::{ProgressSnapshot, SessionId};
use crate::topics::TopicKind;

// ============================================================================
// Event Payloads
// ============================================================================

/// Payload for the `connected` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectedPayload {
    /// Progress at connection time.
    pub progress: ProgressSnapshot,
    /// When the client connected.
    pub timestamp: DateTime<Utc>,
}

/// Payload for the `answer_checked` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerCheckedPayload {
    /// Session the answer belongs to.
    pub session: SessionId,
    /// Whether the answer matched.
    pub correct: bool,
    /// The expected answer.
    pub expected: String,
}

/// Payload for the `celebrate` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CelebratePayload {
    /// Session that earned it.
    pub session: SessionId,
    /// Topic practised.
    pub topic: TopicKind,
    /// Streak after the correct answer.
    pub streak: u32,
}

/// Payload for the `step_advanced` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepAdvancedPayload {
    /// Division session.
    pub session: SessionId,
    /// New cursor.
    pub cursor: usize,
    /// Kind of the step now under the cursor.
    pub step: StepKind,
    /// Whether autoplay moved the board.
    pub autoplay: bool,
}

/// Payload for the `division_complete` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DivisionCompletePayload {
    /// Division session.
    pub session: SessionId,
    /// Final quotient.
    pub quotient: u64,
    /// Final remainder.
    pub remainder: u64,
}

/// Payload for the `error` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Human-readable error message.
    pub message: String,
}

// ============================================================================
// Event Enum
// ============================================================================

/// WebSocket events.
///
/// All events are serialized as JSON objects with "event" and "payload" fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum TutorEvent {
    /// Sent when a client connects.
    Connected(ConnectedPayload),
    /// Sent after every checked answer.
    AnswerChecked(AnswerCheckedPayload),
    /// Sent after a correct topic answer.
    Celebrate(CelebratePayload),
    /// Sent when a division board moves.
    StepAdvanced(StepAdvancedPayload),
    /// Sent when a division problem is finished.
    DivisionComplete(DivisionCompletePayload),
    /// Sent when a request fails.
    Error(ErrorPayload),
}

impl TutorEvent {
    /// Creates a `Connected` event.
    #[must_use]
    pub fn connected(progress: ProgressSnapshot) -> Self {
        Self::Connected(ConnectedPayload {
            progress,
            timestamp: Utc::now(),
        })
    }

    /// Creates an `AnswerChecked` event.
    #[must_use]
    pub fn answer_checked(session: SessionId, correct: bool, expected: impl Into<String>) -> Self {
        Self::AnswerChecked(AnswerCheckedPayload {
            session,
            correct,
            expected: expected.into(),
        })
    }

    /// Creates a `Celebrate` event.
    #[must_use]
    pub const fn celebrate(session: SessionId, topic: TopicKind, streak: u32) -> Self {
        Self::Celebrate(CelebratePayload {
            session,
            topic,
            streak,
        })
    }

    /// Creates a `StepAdvanced` event.
    #[must_use]
    pub const fn step_advanced(
        session: SessionId,
        cursor: usize,
        step: StepKind,
        autoplay: bool,
    ) -> Self {
        Self::StepAdvanced(StepAdvancedPayload {
            session,
            cursor,
            step,
            autoplay,
        })
    }

    /// Creates a `DivisionComplete` event.
    #[must_use]
    pub const fn division_complete(session: SessionId, quotient: u64, remainder: u64) -> Self {
        Self::DivisionComplete(DivisionCompletePayload {
            session,
            quotient,
            remainder,
        })
    }

    /// Creates an `Error` event.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            message: message.into(),
        })
    }

    /// Returns the event name as a string.
    #[must_use]
    pub const fn event_name(&self) -> &'static str {
        match self {
            Self::Connected(_) => "connected",
            Self::AnswerChecked(_) => "answer_checked",
            Self::Celebrate(_) => "celebrate",
            Self::StepAdvanced(_) => "step_advanced",
            Self::DivisionComplete(_) => "division_complete",
            Self::Error(_) => "error",
        }
    }
}

// ============================================================================
// Event Broadcaster
// ============================================================================

/// Broadcasts tutor events to all connected WebSocket clients.
///
/// Events are not persisted for disconnected clients.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<TutorEvent>,
}

impl EventBroadcaster {
    /// Creates a broadcaster whose subscribers buffer up to `capacity` events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Creates a new subscriber.
    ///
    /// A subscriber that falls behind receives a `Lagged` error and misses
    /// some events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TutorEvent> {
        self.sender.subscribe()
    }

    /// Broadcasts an event, returning the number of receivers reached.
    pub fn send(&self, event: TutorEvent) -> usize {
        // Err only means nobody is listening
        self.sender.send(event).unwrap_or(0)
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}

// ============================================================================
// WebSocket Handler
// ============================================================================

/// Heartbeat ping period.
const HEARTBEAT: Duration = Duration::from_secs(30);

/// Maximum number of missed pong responses before disconnecting.
const MAX_MISSED_PONGS: u8 = 3;

/// WebSocket upgrade handler for `/ws`.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> Response {
    info!("New WebSocket connection request");
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Handles a single WebSocket connection.
///
/// - Sends `connected` with the current progress immediately
/// - Forwards every broadcast event to the client
/// - Pings every 30 seconds and closes after 3 missed pongs
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    // Subscribe before reading progress so no event falls in between
    let mut event_receiver = state.broadcaster.subscribe();

    let progress = state.store.lock().await.progress();
    let connected_json = match serde_json::to_string(&TutorEvent::connected(progress)) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize connected event: {}", e);
            return;
        }
    };

    if sender.send(Message::Text(connected_json)).await.is_err() {
        debug!("Client disconnected before receiving connected event");
        return;
    }

    info!("WebSocket client connected");

    let mut heartbeat_interval = interval(HEARTBEAT);
    let mut missed_pongs = 0u8;

    loop {
        tokio::select! {
            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Pong(_))) => {
                        missed_pongs = 0;
                        debug!("Received pong from client");
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Client requested close");
                        break;
                    }
                    Some(Ok(Message::Text(_) | Message::Binary(_))) => {
                        debug!("Ignoring data message from client");
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if sender.send(Message::Pong(data)).await.is_err() {
                            debug!("Failed to send pong, client disconnected");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket error: {}", e);
                        break;
                    }
                    None => {
                        debug!("WebSocket stream ended");
                        break;
                    }
                }
            }

            event = event_receiver.recv() => {
                match event {
                    Ok(tutor_event) => {
                        let json = match serde_json::to_string(&tutor_event) {
                            Ok(j) => j,
                            Err(e) => {
                                warn!("Failed to serialize event: {}", e);
                                continue;
                            }
                        };

                        if sender.send(Message::Text(json)).await.is_err() {
                            debug!("Failed to send event, client disconnected");
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!("Client lagged, missed {} events", n);
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        info!("Broadcaster closed");
                        break;
                    }
                }
            }

            _ = heartbeat_interval.tick() => {
                if sender.send(Message::Ping(vec![])).await.is_err() {
                    debug!("Failed to send ping, client disconnected");
                    break;
                }
                missed_pongs += 1;
                if missed_pongs >= MAX_MISSED_PONGS {
                    info!("Client missed {} pongs, closing connection", MAX_MISSED_PONGS);
                    break;
                }
            }
        }
    }

    info!("WebSocket client disconnected");
}

// ============================================================================
// Tests
// ============================================================================
