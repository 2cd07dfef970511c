use serde::{Deserialize, Serialize};

/// Three-way classification of how full the venue felt. Derived fresh from
/// the free-text crowd feel on every generation call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrowdLevel {
    Busy,
    Normal,
    Quiet,
}

impl CrowdLevel {
    /// Returns the tag string for this level (e.g., "crowd:busy").
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Busy => "crowd:busy",
            Self::Normal => "crowd:normal",
            Self::Quiet => "crowd:quiet",
        }
    }
}
