//! Chart series projected from derived rows.
//!
//! Each view is a flat list of serializable points that the rendering layer
//! plots as-is.

use std::collections::BTreeMap;

use serde::Serialize;

use super::DerivedRow;

/// Efficiencies at or above this are dropped from the efficiency chart.
pub const EFFICIENCY_CHART_CEILING_KM_L: f64 = 50.0;

/// Speed against RPM, labelled with the implied gear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GearPoint {
    /// Vehicle speed, km/h.
    pub speed_kmh: f64,
    /// Engine speed.
    pub rpm: f64,
    /// Implied gear.
    pub gear: u8,
}

/// Throttle position against RPM.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThrottlePoint {
    /// Engine speed.
    pub rpm: f64,
    /// Throttle position, percent.
    pub throttle_pct: f64,
}

/// Engine load against speed, coloured by implied gear.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadPoint {
    /// Vehicle speed, km/h.
    pub speed_kmh: f64,
    /// Engine load, percent.
    pub engine_load_pct: f64,
    /// Implied gear, if moving.
    pub gear: Option<u8>,
}

/// Instant fuel efficiency against speed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EfficiencyPoint {
    /// Vehicle speed, km/h.
    pub speed_kmh: f64,
    /// Fuel efficiency, km/L.
    pub efficiency_km_l: f64,
}

/// Moving samples with an implied gear.
pub fn gear_view<'a>(rows: impl IntoIterator<Item = &'a DerivedRow>) -> Vec<GearPoint> {
    rows.into_iter()
        .filter_map(|row| {
            row.gear.map(|gear| GearPoint {
                speed_kmh: row.speed_kmh,
                rpm: row.rpm,
                gear,
            })
        })
        .collect()
}

/// Gear points grouped by gear, one series per gear.
#[must_use]
pub fn gear_groups(points: &[GearPoint]) -> BTreeMap<u8, Vec<GearPoint>> {
    let mut groups: BTreeMap<u8, Vec<GearPoint>> = BTreeMap::new();
    for point in points {
        groups.entry(point.gear).or_default().push(*point);
    }
    groups
}

/// Throttle against RPM for every running sample.
pub fn throttle_view<'a>(rows: impl IntoIterator<Item = &'a DerivedRow>) -> Vec<ThrottlePoint> {
    rows.into_iter()
        .filter(|row| row.engine_running())
        .map(|row| ThrottlePoint {
            rpm: row.rpm,
            throttle_pct: row.throttle_pct,
        })
        .collect()
}

/// Load against speed for every running sample.
pub fn load_view<'a>(rows: impl IntoIterator<Item = &'a DerivedRow>) -> Vec<LoadPoint> {
    rows.into_iter()
        .filter(|row| row.engine_running())
        .map(|row| LoadPoint {
            speed_kmh: row.speed_kmh,
            engine_load_pct: row.engine_load_pct,
            gear: row.gear,
        })
        .collect()
}

/// RPM of every idle sample.
pub fn idle_rpm<'a>(rows: impl IntoIterator<Item = &'a DerivedRow>) -> Vec<f64> {
    rows.into_iter()
        .filter(|row| row.is_idle())
        .map(|row| row.rpm)
        .collect()
}

/// Defined efficiencies below [`EFFICIENCY_CHART_CEILING_KM_L`].
pub fn efficiency_view<'a>(
    rows: impl IntoIterator<Item = &'a DerivedRow>,
) -> Vec<EfficiencyPoint> {
    rows.into_iter()
        .filter_map(|row| {
            row.efficiency_km_l
                .filter(|efficiency| *efficiency < EFFICIENCY_CHART_CEILING_KM_L)
                .map(|efficiency_km_l| EfficiencyPoint {
                    speed_kmh: row.speed_kmh,
                    efficiency_km_l,
                })
        })
        .collect()
}
