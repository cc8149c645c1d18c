//! State module — the open-file session and its loading gate.

pub mod session;

pub use session::{IngestSummary, LogSession, SessionData, SessionError, SharedSession};
