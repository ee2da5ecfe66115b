//! Routing table: which irrigation zone each sensor feeds.
//!
//! Built once at startup and read-only afterwards, so lookups need no
//! synchronization. A sensor that is not in the table is simply not a
//! controlled sensor.

use std::collections::{BTreeSet, HashMap};
use std::ops::RangeInclusive;

use crate::error::ValidationError;
use crate::id::{SensorId, ZoneId};

/// Largest number of sensors a single range may route.
pub const MAX_RANGE_LEN: u32 = 65_536;

/// One `sensor → zone` mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingEntry {
    pub sensor_id: SensorId,
    pub zone_id: ZoneId,
}

/// Immutable sensor-to-zone mapping.
#[derive(Debug, Clone, Default)]
pub struct RoutingTable {
    routes: HashMap<SensorId, ZoneId>,
    zones: BTreeSet<ZoneId>,
}

impl RoutingTable {
    /// Create a builder for constructing a [`RoutingTable`].
    #[must_use]
    pub fn builder() -> RoutingTableBuilder {
        RoutingTableBuilder::default()
    }

    /// The zone fed by `sensor_id`, or `None` for an uncontrolled sensor.
    #[must_use]
    pub fn zone_for(&self, sensor_id: SensorId) -> Option<ZoneId> {
        self.routes.get(&sensor_id).copied()
    }

    /// Distinct zone ids referenced by at least one entry, ascending.
    pub fn zones(&self) -> impl Iterator<Item = ZoneId> + '_ {
        self.zones.iter().copied()
    }

    /// All entries, in no particular order.
    pub fn entries(&self) -> impl Iterator<Item = RoutingEntry> + '_ {
        self.routes
            .iter()
            .map(|(&sensor_id, &zone_id)| RoutingEntry { sensor_id, zone_id })
    }

    /// Number of routed sensors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    #[must_use]
    pub fn zone_count(&self) -> usize {
        self.zones.len()
    }
}

/// Step-by-step builder for [`RoutingTable`].
#[derive(Debug, Default)]
pub struct RoutingTableBuilder {
    entries: Vec<RoutingEntry>,
    ranges: Vec<(SensorId, SensorId, ZoneId)>,
}

impl RoutingTableBuilder {
    /// Route a single sensor to a zone.
    #[must_use]
    pub fn route(mut self, sensor_id: SensorId, zone_id: ZoneId) -> Self {
        self.entries.push(RoutingEntry { sensor_id, zone_id });
        self
    }

    /// Route every sensor in an inclusive id range to a zone.
    #[must_use]
    pub fn route_range(mut self, sensors: RangeInclusive<SensorId>, zone_id: ZoneId) -> Self {
        let (first, last) = sensors.into_inner();
        self.ranges.push((first, last, zone_id));
        self
    }

    /// Consume the builder, validate, and return a [`RoutingTable`].
    ///
    /// Routing the same sensor to the same zone twice is harmless.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyRange`] for a range whose start is
    /// after its end, [`ValidationError::RangeTooLarge`] for a range of more
    /// than [`MAX_RANGE_LEN`] sensors, and [`ValidationError::ConflictingRoute`]
    /// when a sensor is routed to two different zones.
    pub fn build(self) -> Result<RoutingTable, ValidationError> {
        let mut expanded = self.entries;
        for (first, last, zone_id) in self.ranges {
            if first > last {
                return Err(ValidationError::EmptyRange { first, last });
            }
            if last.get() - first.get() >= MAX_RANGE_LEN {
                return Err(ValidationError::RangeTooLarge {
                    first,
                    last,
                    max: MAX_RANGE_LEN,
                });
            }
            expanded.extend((first.get()..=last.get()).map(|raw| RoutingEntry {
                sensor_id: SensorId::new(raw),
                zone_id,
            }));
        }

        let mut table = RoutingTable::default();
        for RoutingEntry { sensor_id, zone_id } in expanded {
            match table.routes.get(&sensor_id) {
                Some(&existing) if existing != zone_id => {
                    return Err(ValidationError::ConflictingRoute {
                        sensor_id,
                        first: existing,
                        second: zone_id,
                    });
                }
                Some(_) => {}
                None => {
                    table.routes.insert(sensor_id, zone_id);
                    table.zones.insert(zone_id);
                }
            }
        }
        Ok(table)
    }
}
