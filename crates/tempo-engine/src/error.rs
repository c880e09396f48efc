use thiserror::Error;

/// Result type for scheduler operations.
pub type Result<T> = std::result::Result<T, SchedulerError>;

/// Errors raised synchronously by the scheduler and its boundary layer.
///
/// All of these are caller mistakes. Falling behind schedule is never an
/// error; it is handled by drift correction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulerError {
    /// A configuration value was out of range.
    #[error("invalid {what}: {value} (must be finite and >= 0)")]
    InvalidArgument { what: &'static str, value: f64 },

    /// Configuration or `start()` attempted after the scheduler started.
    #[error("scheduler already started")]
    AlreadyStarted,

    /// `stop()` attempted before `start()`.
    #[error("scheduler was never started")]
    NotStarted,

    /// `stop()` attempted on a scheduler that is already stopped.
    #[error("scheduler already stopped")]
    AlreadyStopped,

    /// Frame advance or pause requested while a frame advance is in flight.
    #[error("frame advance already in progress")]
    Reentrant,

    /// A deadline was requested while running at a constant frame rate.
    #[error("deadline requests need event-driven mode (fps is {fps}, not 0)")]
    NotEventDriven { fps: f64 },

    /// An input handler of this kind was already registered.
    #[error("{kind} handler already set")]
    HandlerAlreadySet { kind: &'static str },
}
