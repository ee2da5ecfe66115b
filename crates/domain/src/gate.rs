//! Gate commands: actuation requests sent to a zone's water gate.

use serde::{Deserialize, Serialize};

use crate::id::ZoneId;
use crate::time::Timestamp;

/// Requested gate position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum GateAction {
    Open,
    Close,
}

impl GateAction {
    /// The action that undoes this one.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            Self::Open => Self::Close,
            Self::Close => Self::Open,
        }
    }
}

impl std::fmt::Display for GateAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open => f.write_str("OPEN"),
            Self::Close => f.write_str("CLOSE"),
        }
    }
}

/// A command handed to the transport. Never mutated after construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateCommand {
    zone_id: ZoneId,
    action: GateAction,
    reason: String,
    issued_at: Timestamp,
}

impl GateCommand {
    #[must_use]
    pub fn new(
        zone_id: ZoneId,
        action: GateAction,
        reason: impl Into<String>,
        issued_at: Timestamp,
    ) -> Self {
        Self {
            zone_id,
            action,
            reason: reason.into(),
            issued_at,
        }
    }

    #[must_use]
    pub fn zone_id(&self) -> ZoneId {
        self.zone_id
    }

    #[must_use]
    pub fn action(&self) -> GateAction {
        self.action
    }

    /// Human-readable justification, e.g. `"25.5 below dry threshold 40.00"`.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    #[must_use]
    pub fn issued_at(&self) -> Timestamp {
        self.issued_at
    }
}

impl std::fmt::Display for GateCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "zone {} -> {} ({})", self.zone_id, self.action, self.reason)
    }
}
