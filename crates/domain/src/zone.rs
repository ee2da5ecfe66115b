//! Zone state: the per-zone gate state machine.
//!
//! Each zone is either CLOSED (initial) or OPEN. Transitions are driven by
//! moisture values through [`ZoneState::decide`], which applies, in order:
//!
//! 1. the cooldown: no command if the last one for this zone is younger than
//!    [`ControlPolicy::cooldown`], whatever the value;
//! 2. the hysteresis band: OPEN only when dry and currently closed, CLOSE
//!    only when wet and currently open.
//!
//! `last_command_at` moves if and only if a command is issued, so the
//! command sequence of a zone strictly alternates OPEN, CLOSE, OPEN, …

use std::time::Duration;

use serde::Serialize;

use crate::gate::{GateAction, GateCommand};
use crate::id::ZoneId;
use crate::policy::{ControlPolicy, MoistureBand};
use crate::time::Timestamp;

/// Outcome of evaluating one moisture reading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// The sensor is not in the routing table.
    Unrouted,
    /// The zone commanded too recently; the reading was absorbed.
    CoolingDown { remaining: Duration },
    /// Dead zone, or the zone is already in the requested position.
    Unchanged,
    /// A transition happened and this command must be sent.
    Issued(GateCommand),
}

impl Decision {
    /// The command to publish, if any.
    #[must_use]
    pub fn command(&self) -> Option<&GateCommand> {
        match self {
            Self::Issued(cmd) => Some(cmd),
            _ => None,
        }
    }
}

/// Mutable gate state of a single zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ZoneState {
    zone_id: ZoneId,
    is_open: bool,
    last_command_at: Option<Timestamp>,
}

impl ZoneState {
    /// A closed zone that has never been commanded.
    #[must_use]
    pub fn closed(zone_id: ZoneId) -> Self {
        Self {
            zone_id,
            is_open: false,
            last_command_at: None,
        }
    }

    #[must_use]
    pub fn zone_id(&self) -> ZoneId {
        self.zone_id
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// `None` until the first command is issued for this zone.
    #[must_use]
    pub fn last_command_at(&self) -> Option<Timestamp> {
        self.last_command_at
    }

    /// Time left before this zone may be commanded again, as seen at `now`.
    ///
    /// A clock that stepped backwards counts as zero elapsed time.
    #[must_use]
    pub fn cooldown_remaining(&self, now: Timestamp, cooldown: Duration) -> Option<Duration> {
        let last = self.last_command_at?;
        let elapsed = now
            .signed_duration_since(last)
            .to_std()
            .unwrap_or(Duration::ZERO);
        (elapsed < cooldown).then(|| cooldown - elapsed)
    }

    /// Apply one moisture value observed at `now`.
    ///
    /// Must be called while holding exclusive access to this state: the
    /// cooldown check, the threshold comparison and the writes form one
    /// atomic step.
    pub fn decide(&mut self, value: f64, now: Timestamp, policy: &ControlPolicy) -> Decision {
        if let Some(remaining) = self.cooldown_remaining(now, policy.cooldown()) {
            return Decision::CoolingDown { remaining };
        }

        match policy.classify(value) {
            MoistureBand::Dry if !self.is_open => {
                let reason = format!(
                    "{value} below dry threshold {:.2}",
                    policy.dry_threshold()
                );
                self.transition(GateAction::Open, reason, now)
            }
            MoistureBand::Wet if self.is_open => {
                let reason = format!(
                    "{value} above wet threshold {:.2}",
                    policy.wet_threshold()
                );
                self.transition(GateAction::Close, reason, now)
            }
            _ => Decision::Unchanged,
        }
    }

    fn transition(&mut self, action: GateAction, reason: String, now: Timestamp) -> Decision {
        self.is_open = action == GateAction::Open;
        self.last_command_at = Some(now);
        Decision::Issued(GateCommand::new(self.zone_id, action, reason, now))
    }
}
