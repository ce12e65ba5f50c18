use thiserror::Error;

/// Error kinds from §7. Runtime components never propagate these across the room boundary —
/// the combat ticker and session frame loop catch and convert them to a user-visible line or a
/// logged-and-discarded event, per §7's propagation policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Malformed input from the session; user-visible message, session continues.
    #[error("invalid: {0}")]
    Invalid(String),

    /// Well-formed but disallowed (rate-limited, action slot used, shop closed, insufficient
    /// gold); user-visible message.
    #[error("rejected: {0}")]
    Rejected(String),

    /// Target missing; for attacks, the caller still consumes the primary slot.
    #[error("not found: {0}")]
    NotFound(String),

    /// An optimistic transaction lost its race; silently absorbed by callers.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage or external-service failure; the command fails with a generic message, the
    /// server continues.
    #[error("transient failure: {0}")]
    Transient(String),

    /// Only raised during catalog load or ticker init; aborts startup.
    #[error("fatal: {0}")]
    Fatal(String),
}

impl CoreError {
    /// The line shown to the session that issued the failing command.
    pub fn user_message(&self) -> String {
        match self {
            CoreError::Invalid(msg) => format!("That doesn't make sense: {msg}"),
            CoreError::Rejected(msg) => msg.clone(),
            CoreError::NotFound(msg) => format!("You don't see {msg} here."),
            CoreError::Conflict(_) => "Someone beat you to it.".to_string(),
            CoreError::Transient(_) => "Something went wrong. Try again.".to_string(),
            CoreError::Fatal(msg) => format!("Fatal error: {msg}"),
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
