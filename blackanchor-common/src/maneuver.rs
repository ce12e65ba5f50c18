use serde::{Deserialize, Serialize};
use std::fmt;

/// A maneuver (out-of-scope catalog content per spec §1, "character-creation... maneuvers");
/// only the id and the slot-bound bookkeeping the core needs are carried here.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ManeuverId(pub String);

impl fmt::Display for ManeuverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ManeuverId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
