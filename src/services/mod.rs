//! External service interactions
//!
//! Loading session fixtures from disk into the host model.

pub mod session_file;

pub use session_file::{demo_session, load_session, Session};
