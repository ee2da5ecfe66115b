//! Property tests for the gate decision engine.
//!
//! Random reading sequences (random sensors, values and inter-arrival gaps)
//! are replayed against an engine driven by a manual clock, and the emitted
//! commands are checked against the control-loop invariants.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use fieldgate_app::decision_engine::DecisionEngine;
use fieldgate_app::ports::CommandPublisher;
use fieldgate_app::ports::clock::ManualClock;
use fieldgate_app::zone_store::ZoneStore;
use fieldgate_domain::error::FieldGateError;
use fieldgate_domain::gate::{GateAction, GateCommand};
use fieldgate_domain::id::{SensorId, ZoneId};
use fieldgate_domain::policy::ControlPolicy;
use fieldgate_domain::reading::{SensorKind, SensorReading};
use fieldgate_domain::routing::RoutingTable;
use fieldgate_domain::time::{Timestamp, from_unix_secs};
use proptest::prelude::*;

const COOLDOWN_SECS: u64 = 30;
const DRY: f64 = 40.0;
const WET: f64 = 70.0;

struct NullPublisher;

impl CommandPublisher for NullPublisher {
    fn publish_command(
        &self,
        _command: &GateCommand,
    ) -> impl Future<Output = Result<(), FieldGateError>> + Send {
        async { Ok(()) }
    }
}

fn start() -> Timestamp {
    from_unix_secs(1_700_000_000).unwrap()
}

/// Sensors 1..=4 feed zone 1, 5..=8 feed zone 2; 9 and above are unrouted.
fn engine() -> (DecisionEngine<NullPublisher, Arc<ManualClock>>, Arc<ManualClock>) {
    let routing = RoutingTable::builder()
        .route_range(SensorId::new(1)..=SensorId::new(4), ZoneId::new(1))
        .route_range(SensorId::new(5)..=SensorId::new(8), ZoneId::new(2))
        .build()
        .unwrap();
    let zones = ZoneStore::new(&routing);
    let policy = ControlPolicy::new(DRY, WET, Duration::from_secs(COOLDOWN_SECS)).unwrap();
    let clock = Arc::new(ManualClock::new(start()));
    let engine =
        DecisionEngine::new(routing, zones, policy, NullPublisher, Arc::clone(&clock)).unwrap();
    (engine, clock)
}

/// (gap before the reading in seconds, sensor id, moisture value)
fn step() -> impl Strategy<Value = (u64, u32, f64)> {
    (0u64..45, 1u32..=10, 0.0f64..100.0)
}

/// Replay the steps and return every issued command.
fn replay(steps: &[(u64, u32, f64)]) -> Vec<GateCommand> {
    let (engine, clock) = engine();
    let mut issued = Vec::new();
    for &(gap, sensor, value) in steps {
        clock.advance(Duration::from_secs(gap));
        let reading =
            SensorReading::new(SensorId::new(sensor), SensorKind::Moisture, value, start())
                .unwrap();
        if let Some(command) = engine.decide(&reading).unwrap().command() {
            issued.push(command.clone());
        }
    }
    issued
}

fn by_zone(commands: &[GateCommand]) -> HashMap<ZoneId, Vec<&GateCommand>> {
    let mut zones: HashMap<ZoneId, Vec<&GateCommand>> = HashMap::new();
    for command in commands {
        zones.entry(command.zone_id()).or_default().push(command);
    }
    zones
}

proptest! {
    /// Two commands for the same zone are always at least one cooldown apart.
    #[test]
    fn commands_per_zone_respect_cooldown(steps in proptest::collection::vec(step(), 1..200)) {
        let commands = replay(&steps);
        let cooldown = chrono::TimeDelta::seconds(i64::try_from(COOLDOWN_SECS).unwrap());
        for zone_commands in by_zone(&commands).values() {
            for pair in zone_commands.windows(2) {
                prop_assert!(pair[1].issued_at() - pair[0].issued_at() >= cooldown);
            }
        }
    }

    /// Per zone the command stream is OPEN, CLOSE, OPEN, … starting with OPEN.
    #[test]
    fn commands_per_zone_alternate(steps in proptest::collection::vec(step(), 1..200)) {
        let commands = replay(&steps);
        for zone_commands in by_zone(&commands).values() {
            prop_assert_eq!(zone_commands[0].action(), GateAction::Open);
            for pair in zone_commands.windows(2) {
                prop_assert_eq!(pair[1].action(), pair[0].action().opposite());
            }
        }
    }

    /// Every OPEN was caused by a dry value, every CLOSE by a wet one.
    #[test]
    fn commands_only_fire_outside_dead_zone(steps in proptest::collection::vec(step(), 1..200)) {
        let (engine, clock) = engine();
        for (gap, sensor, value) in steps {
            clock.advance(Duration::from_secs(gap));
            let reading = SensorReading::new(
                SensorId::new(sensor),
                SensorKind::Moisture,
                value,
                start(),
            )
            .unwrap();
            if let Some(command) = engine.decide(&reading).unwrap().command() {
                match command.action() {
                    GateAction::Open => {
                        prop_assert!(value < DRY);
                    }
                    GateAction::Close => {
                        prop_assert!(value > WET);
                    }
                }
            }
        }
    }

    /// Dead-zone values never move a gate, whatever the prior state.
    #[test]
    fn dead_zone_never_changes_state(
        warmup in proptest::collection::vec(step(), 0..50),
        values in proptest::collection::vec(DRY..=WET, 1..50),
        sensor in 1u32..=8,
    ) {
        let (engine, clock) = engine();
        for (gap, sensor, value) in warmup {
            clock.advance(Duration::from_secs(gap));
            let reading = SensorReading::new(
                SensorId::new(sensor),
                SensorKind::Moisture,
                value,
                start(),
            )
            .unwrap();
            engine.decide(&reading).unwrap();
        }

        let before = engine.zones().snapshot();
        for value in values {
            clock.advance(Duration::from_secs(COOLDOWN_SECS));
            let reading = SensorReading::new(
                SensorId::new(sensor),
                SensorKind::Moisture,
                value,
                start(),
            )
            .unwrap();
            prop_assert!(engine.decide(&reading).unwrap().command().is_none());
        }
        prop_assert_eq!(engine.zones().snapshot(), before);
    }

    /// Unrouted sensors never touch zone state.
    #[test]
    fn unrouted_sensors_never_change_state(
        readings in proptest::collection::vec((9u32..10_000, 0.0f64..100.0), 1..100),
    ) {
        let (engine, clock) = engine();
        let before = engine.zones().snapshot();
        for (sensor, value) in readings {
            clock.advance(Duration::from_secs(COOLDOWN_SECS));
            let reading = SensorReading::new(
                SensorId::new(sensor),
                SensorKind::Moisture,
                value,
                start(),
            )
            .unwrap();
            prop_assert!(engine.decide(&reading).unwrap().command().is_none());
        }
        prop_assert_eq!(engine.zones().snapshot(), before);
    }
}
