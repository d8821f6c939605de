//! HTTP API for the Abacus tutor.
//!
//! Widgets keep their state server-side; every endpoint returns a fresh
//! snapshot of the widget it touched.
//!
//! # Endpoints
//!
//! - `GET /api/curriculum` - The curriculum tree
//! - `GET /api/curriculum/:grade/:term` - One term's topics
//! - `POST /api/sessions` - Open a topic widget
//! - `GET|DELETE /api/sessions/:id` - Inspect or close a topic widget
//! - `POST /api/sessions/:id/{lesson/next,lesson/prev,practice,answer,next}`
//! - `POST /api/division` - Open a division tutor
//! - `GET|DELETE /api/division/:id`, `GET /api/division/:id/board`
//! - `POST /api/division/:id/{next,prev,jump,reset,new,mode,autoplay,input,answer}`
//! - `GET /api/progress` - Accumulated statistics
//! - `GET /ws` - Event stream
//!
//! # Example
//!
//! ```no_run
//! use abacus_tutor::{create_router, AppState, Config};
//!
//! # async fn example() {
//! let router = create_router(AppState::new(Config::default()));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//! axum::serve(listener, router).await.unwrap();
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::autoplay;
use crate::board::{Board, Mode};
use crate::curriculum::{curriculum, Curriculum, Navigator, Term};
use crate::division::{DivisionSettings, Step};
use crate::error::TutorError;
use crate::practice::{Feedback, WidgetView};
use crate::session::{ProgressSnapshot, SessionId, SessionStore};
use crate::topics::TopicKind;
use crate::tutor::{DivisionTutor, StepCheck, TutorView};
use crate::websocket::{ws_handler, EventBroadcaster, TutorEvent};
use crate::Config;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for opening a topic widget.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenSessionRequest {
    /// Curriculum topic slug.
    pub topic: String,
}

/// Request body carrying a learner answer.
#[derive(Debug, Clone, Deserialize)]
pub struct AnswerRequest {
    /// The learner's answer text.
    pub answer: String,
}

/// Request body for opening a division tutor or replacing its problem.
///
/// Omit both fields for a random problem.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DivisionRequest {
    /// Requested dividend.
    pub dividend: Option<u64>,
    /// Requested divisor.
    pub divisor: Option<u64>,
}

/// Request body for `jump`.
#[derive(Debug, Clone, Deserialize)]
pub struct JumpRequest {
    /// Target step index (clamped).
    pub index: usize,
}

/// Request body for `mode`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModeRequest {
    /// Target mode.
    pub mode: Mode,
}

/// Request body for `autoplay`.
#[derive(Debug, Clone, Deserialize)]
pub struct AutoplayRequest {
    /// Start or stop playback.
    pub enabled: bool,
}

/// Request body for `input`.
#[derive(Debug, Clone, Deserialize)]
pub struct InputRequest {
    /// Pending input text.
    pub text: String,
}

/// A topic widget snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct SessionResponse {
    /// Session id.
    pub id: SessionId,
    /// Widget state.
    pub widget: WidgetView,
}

/// Response to a topic answer.
#[derive(Debug, Clone, Serialize)]
pub struct TopicAnswerResponse {
    /// Session id.
    pub id: SessionId,
    /// Result of the check.
    pub feedback: Feedback,
    /// Widget state after the check.
    pub widget: WidgetView,
}

/// A division tutor snapshot.
#[derive(Debug, Clone, Serialize)]
pub struct DivisionResponse {
    /// Session id.
    pub id: SessionId,
    /// Tutor state.
    pub tutor: TutorView,
}

/// Response to a division step answer.
#[derive(Debug, Clone, Serialize)]
pub struct DivisionAnswerResponse {
    /// Session id.
    pub id: SessionId,
    /// Result of the check.
    pub check: StepCheck,
    /// Tutor state after the check.
    pub tutor: TutorView,
}

/// A term with the path that led to it.
#[derive(Debug, Clone, Serialize)]
pub struct TermResponse {
    /// Titles from grade to term.
    pub breadcrumbs: Vec<&'static str>,
    /// The term.
    pub term: &'static Term,
}

/// Error response body returned on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Description of the error.
    pub error: String,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the HTTP server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Service configuration.
    pub config: Config,
    /// All open sessions.
    pub store: Arc<Mutex<SessionStore>>,
    /// Event fan-out to WebSocket clients.
    pub broadcaster: EventBroadcaster,
}

impl AppState {
    /// Creates a state with an empty session store.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            store: Arc::new(Mutex::new(SessionStore::new(config.clone()))),
            config,
            broadcaster: EventBroadcaster::default(),
        }
    }

    const fn autoplay_interval(&self) -> Duration {
        Duration::from_millis(self.config.autoplay_interval_ms)
    }

    /// Logs and broadcasts a failed request.
    fn report(&self, err: TutorError) -> ApiError {
        warn!(error = %err, "Request failed");
        self.broadcaster.send(TutorEvent::error(err.to_string()));
        ApiError::Tutor(err)
    }

    /// Emits movement events and re-arms autoplay after a board change.
    fn after_move(&self, id: SessionId, tutor: &DivisionTutor, before: usize) {
        if tutor.cursor() != before {
            if let Some(step) = tutor.current_step() {
                self.broadcaster.send(TutorEvent::step_advanced(
                    id,
                    tutor.cursor(),
                    step.kind(),
                    false,
                ));
                if let Step::Finish {
                    quotient,
                    remainder,
                } = step
                {
                    self.broadcaster
                        .send(TutorEvent::division_complete(id, *quotient, *remainder));
                }
            }
        }

        if tutor.is_autoplaying() {
            autoplay::spawn(
                Arc::clone(&self.store),
                self.broadcaster.clone(),
                id,
                tutor.timer_generation(),
                self.autoplay_interval(),
            );
        }
    }
}

// ============================================================================
// API Error Type
// ============================================================================

/// Internal error type for API handlers.
#[derive(Debug)]
enum ApiError {
    /// A tutor operation failed.
    Tutor(TutorError),
    /// The request body is inconsistent.
    BadRequest(String),
}

impl From<TutorError> for ApiError {
    fn from(err: TutorError) -> Self {
        Self::Tutor(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Tutor(err) => {
                let status = match &err {
                    e if e.is_input_error() => StatusCode::BAD_REQUEST,
                    TutorError::ConfigParseError { .. }
                    | TutorError::ConfigValidationError { .. } => StatusCode::BAD_REQUEST,
                    TutorError::NotFound { .. } => StatusCode::NOT_FOUND,
                    TutorError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
                    TutorError::SessionLimit { .. } => StatusCode::SERVICE_UNAVAILABLE,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, err.to_string())
            }
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the HTTP router with all API endpoints, the WebSocket route, CORS
/// for development and request tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/curriculum", get(handle_curriculum))
        .route("/curriculum/:grade/:term", get(handle_term))
        .route("/sessions", post(handle_open_session))
        .route(
            "/sessions/:id",
            get(handle_get_session).delete(handle_close_session),
        )
        .route("/sessions/:id/lesson/next", post(handle_lesson_next))
        .route("/sessions/:id/lesson/prev", post(handle_lesson_prev))
        .route("/sessions/:id/practice", post(handle_start_practice))
        .route("/sessions/:id/answer", post(handle_topic_answer))
        .route("/sessions/:id/next", post(handle_next_problem))
        .route("/division", post(handle_open_division))
        .route(
            "/division/:id",
            get(handle_get_division).delete(handle_close_division),
        )
        .route("/division/:id/board", get(handle_division_board))
        .route("/division/:id/next", post(handle_division_next))
        .route("/division/:id/prev", post(handle_division_prev))
        .route("/division/:id/jump", post(handle_division_jump))
        .route("/division/:id/reset", post(handle_division_reset))
        .route("/division/:id/new", post(handle_division_new))
        .route("/division/:id/mode", post(handle_division_mode))
        .route("/division/:id/autoplay", post(handle_division_autoplay))
        .route("/division/:id/input", post(handle_division_input))
        .route("/division/:id/answer", post(handle_division_answer))
        .route("/progress", get(handle_progress));

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

// ============================================================================
// Curriculum Handlers
// ============================================================================

/// Handler for `GET /api/curriculum`.
async fn handle_curriculum() -> Json<&'static Curriculum> {
    Json(curriculum())
}

/// Handler for `GET /api/curriculum/:grade/:term`.
async fn handle_term(
    Path((grade, term)): Path<(String, String)>,
) -> Result<Json<TermResponse>, ApiError> {
    let mut navigator = Navigator::default();
    navigator.select_grade(&grade)?;
    let term = navigator.select_term(&term)?;
    Ok(Json(TermResponse {
        breadcrumbs: navigator.breadcrumbs(),
        term,
    }))
}

// ============================================================================
// Topic Session Handlers
// ============================================================================

/// Handler for `POST /api/sessions`.
async fn handle_open_session(
    State(state): State<Arc<AppState>>,
    Json(request): Json<OpenSessionRequest>,
) -> Result<(StatusCode, Json<SessionResponse>), ApiError> {
    let mut store = state.store.lock().await;
    let id = store
        .open_topic(&request.topic)
        .map_err(|e| state.report(e))?;
    let widget = store.topic(id)?.view();
    info!(session = id, topic = %request.topic, "Opened topic session");
    Ok((StatusCode::CREATED, Json(SessionResponse { id, widget })))
}

/// Handler for `GET /api/sessions/:id`.
async fn handle_get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionResponse>, ApiError> {
    let store = state.store.lock().await;
    let widget = store.topic(id)?.view();
    Ok(Json(SessionResponse { id, widget }))
}

/// Handler for `DELETE /api/sessions/:id`.
async fn handle_close_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<StatusCode, ApiError> {
    state.store.lock().await.close_topic(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for `POST /api/sessions/:id/lesson/next`.
async fn handle_lesson_next(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut store = state.store.lock().await;
    let widget = store.next_page(id).map_err(|e| state.report(e))?.view();
    Ok(Json(SessionResponse { id, widget }))
}

/// Handler for `POST /api/sessions/:id/lesson/prev`.
async fn handle_lesson_prev(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut store = state.store.lock().await;
    let widget = store.prev_page(id).map_err(|e| state.report(e))?.view();
    Ok(Json(SessionResponse { id, widget }))
}

/// Handler for `POST /api/sessions/:id/practice`.
async fn handle_start_practice(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut store = state.store.lock().await;
    let widget = store
        .start_practice(id)
        .map_err(|e| state.report(e))?
        .view();
    Ok(Json(SessionResponse { id, widget }))
}

/// Handler for `POST /api/sessions/:id/answer`.
///
/// A wrong answer is a normal `200` response with `correct: false`.
async fn handle_topic_answer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<TopicAnswerResponse>, ApiError> {
    let mut store = state.store.lock().await;
    let (topic, feedback) = store
        .submit(id, &request.answer)
        .map_err(|e| state.report(e))?;

    info!(
        session = id,
        topic = %topic,
        correct = feedback.correct,
        streak = feedback.streak,
        "Topic answer checked"
    );

    state.broadcaster.send(TutorEvent::answer_checked(
        id,
        feedback.correct,
        feedback.expected.clone(),
    ));
    if feedback.correct {
        state
            .broadcaster
            .send(TutorEvent::celebrate(id, topic, feedback.streak));
    }

    let widget = store.topic(id)?.view();
    Ok(Json(TopicAnswerResponse {
        id,
        feedback,
        widget,
    }))
}

/// Handler for `POST /api/sessions/:id/next`.
async fn handle_next_problem(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<SessionResponse>, ApiError> {
    let mut store = state.store.lock().await;
    let widget = store.next_problem(id).map_err(|e| state.report(e))?.view();
    Ok(Json(SessionResponse { id, widget }))
}

// ============================================================================
// Division Handlers
// ============================================================================

fn division_settings(request: &DivisionRequest) -> Result<Option<DivisionSettings>, ApiError> {
    match (request.dividend, request.divisor) {
        (Some(dividend), Some(divisor)) => Ok(Some(DivisionSettings { dividend, divisor })),
        (None, None) => Ok(None),
        _ => Err(ApiError::BadRequest(
            "Provide both dividend and divisor, or neither for a random problem".to_string(),
        )),
    }
}

/// Runs `action` on a tutor, then emits events and re-arms autoplay.
async fn move_division<F>(
    state: &AppState,
    id: SessionId,
    action: F,
) -> Result<Json<DivisionResponse>, ApiError>
where
    F: FnOnce(&mut DivisionTutor) -> crate::Result<()>,
{
    let mut store = state.store.lock().await;
    let tutor = store.division_mut(id).map_err(|e| state.report(e))?;
    let before = tutor.cursor();
    action(tutor).map_err(|e| state.report(e))?;
    state.after_move(id, tutor, before);
    Ok(Json(DivisionResponse {
        id,
        tutor: tutor.view(),
    }))
}

/// Handler for `POST /api/division`.
async fn handle_open_division(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DivisionRequest>,
) -> Result<(StatusCode, Json<DivisionResponse>), ApiError> {
    let settings = division_settings(&request)?;
    let mut store = state.store.lock().await;
    let id = store.open_division(settings).map_err(|e| state.report(e))?;
    let tutor = store.division(id)?.view();
    Ok((StatusCode::CREATED, Json(DivisionResponse { id, tutor })))
}

/// Handler for `GET /api/division/:id`.
async fn handle_get_division(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<DivisionResponse>, ApiError> {
    let store = state.store.lock().await;
    let tutor = store.division(id)?.view();
    Ok(Json(DivisionResponse { id, tutor }))
}

/// Handler for `DELETE /api/division/:id`.
async fn handle_close_division(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<StatusCode, ApiError> {
    state.store.lock().await.close_division(id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for `GET /api/division/:id/board`.
async fn handle_division_board(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<Board>, ApiError> {
    let store = state.store.lock().await;
    Ok(Json(store.division(id)?.board()))
}

/// Handler for `POST /api/division/:id/next`.
async fn handle_division_next(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<DivisionResponse>, ApiError> {
    move_division(&state, id, |tutor| tutor.next().map(drop)).await
}

/// Handler for `POST /api/division/:id/prev`.
async fn handle_division_prev(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<DivisionResponse>, ApiError> {
    move_division(&state, id, |tutor| tutor.prev().map(drop)).await
}

/// Handler for `POST /api/division/:id/jump`.
async fn handle_division_jump(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
    Json(request): Json<JumpRequest>,
) -> Result<Json<DivisionResponse>, ApiError> {
    move_division(&state, id, |tutor| tutor.jump(request.index).map(drop)).await
}

/// Handler for `POST /api/division/:id/reset`.
async fn handle_division_reset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
) -> Result<Json<DivisionResponse>, ApiError> {
    move_division(&state, id, |tutor| {
        tutor.reset();
        Ok(())
    })
    .await
}

/// Handler for `POST /api/division/:id/mode`.
async fn handle_division_mode(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
    Json(request): Json<ModeRequest>,
) -> Result<Json<DivisionResponse>, ApiError> {
    move_division(&state, id, |tutor| {
        tutor.set_mode(request.mode);
        Ok(())
    })
    .await
}

/// Handler for `POST /api/division/:id/autoplay`.
async fn handle_division_autoplay(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
    Json(request): Json<AutoplayRequest>,
) -> Result<Json<DivisionResponse>, ApiError> {
    info!(session = id, enabled = request.enabled, "Autoplay request");
    move_division(&state, id, |tutor| {
        tutor.set_autoplay(request.enabled).map(drop)
    })
    .await
}

/// Handler for `POST /api/division/:id/input`.
async fn handle_division_input(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
    Json(request): Json<InputRequest>,
) -> Result<Json<DivisionResponse>, ApiError> {
    move_division(&state, id, |tutor| tutor.set_input(request.text)).await
}

/// Handler for `POST /api/division/:id/new`.
async fn handle_division_new(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
    Json(request): Json<DivisionRequest>,
) -> Result<Json<DivisionResponse>, ApiError> {
    let settings = division_settings(&request)?;
    let mut store = state.store.lock().await;
    let tutor = store
        .new_division_problem(id, settings)
        .map_err(|e| state.report(e))?
        .view();
    Ok(Json(DivisionResponse { id, tutor }))
}

/// Handler for `POST /api/division/:id/answer`.
///
/// A wrong answer is a normal `200` response with `correct: false`.
async fn handle_division_answer(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SessionId>,
    Json(request): Json<AnswerRequest>,
) -> Result<Json<DivisionAnswerResponse>, ApiError> {
    let mut store = state.store.lock().await;
    let before = store.division(id).map_err(|e| state.report(e))?.cursor();
    let check = store
        .submit_division(id, &request.answer)
        .map_err(|e| state.report(e))?;

    info!(
        session = id,
        step = %check.step,
        correct = check.correct,
        "Division answer checked"
    );
    state.broadcaster.send(TutorEvent::answer_checked(
        id,
        check.correct,
        check.expected.clone(),
    ));
    if check.correct {
        state.broadcaster.send(TutorEvent::celebrate(
            id,
            TopicKind::LongDivision,
            check.streak,
        ));
    }

    let tutor = store.division(id)?;
    state.after_move(id, tutor, before);
    Ok(Json(DivisionAnswerResponse {
        id,
        check,
        tutor: tutor.view(),
    }))
}

// ============================================================================
// Progress Handler
// ============================================================================

/// Handler for `GET /api/progress`.
async fn handle_progress(State(state): State<Arc<AppState>>) -> Json<ProgressSnapshot> {
    Json(state.store.lock().await.progress())
}

// ============================================================================
// Tests
// ============================================================================
