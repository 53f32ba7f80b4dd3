pub mod backoff;
pub mod session;

pub use backoff::Backoff;
pub use session::{LiveSession, RefreshTrigger, SessionState};
