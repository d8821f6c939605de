//! Abacus tutor core
//!
//! Curriculum, lesson widgets, the long-division tutor, and the HTTP and
//! WebSocket API that serves them.

pub mod answer;
pub mod api;
pub mod autoplay;
pub mod board;
pub mod config;
pub mod curriculum;
pub mod division;
pub mod error;
pub mod lesson;
pub mod practice;
pub mod session;
pub mod topics;
pub mod tutor;
pub mod websocket;

pub use answer::Answer;
pub use api::{create_router, AppState, ErrorResponse};
pub use board::{project, Board, Cell, CellContent, Mode};
pub use config::{Config, DivisionConfig, ReportFormat};
pub use curriculum::{curriculum, Curriculum, Grade, Location, Navigator, Term, Topic};
pub use division::{generate_steps, DivisionProblem, DivisionSettings, Step, StepKind};
pub use error::{Result, TutorError};
pub use lesson::{lesson_for, Lesson, LessonPage};
pub use practice::{Feedback, PracticeStatus, TopicWidget, WidgetView};
pub use session::{
    DivisionStats, ProgressSnapshot, SessionId, SessionStore, TopicProgress, TopicStats,
};
pub use topics::{Problem, TopicKind};
pub use tutor::{DivisionTutor, StepCheck, TutorView};
pub use websocket::{EventBroadcaster, TutorEvent};
