//! Vehicle model shared by the generator and the metrics calculator.
//!
//! A [`VehicleProfile`] holds the drivetrain and engine constants used to turn
//! a road speed into an engine speed, to estimate fuel flow from the mass air
//! flow, and to recover the gear implied by an observed speed/RPM pair.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Drivetrain, engine and fuel-model constants for the simulated vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleProfile {
    /// Engine speed when idling.
    pub idle_rpm: f64,
    /// Rev limit.
    pub max_rpm: f64,
    /// Top speed; also the upper bound accepted for `speed_kmh`.
    pub max_speed_kmh: f64,
    /// Gear ratios, first gear first.
    pub gear_ratios: Vec<f64>,
    /// Speed above which each gear is selected, first gear first.
    pub gear_min_speed_kmh: Vec<f64>,
    /// Final drive ratio.
    pub final_drive: f64,
    /// Rolling radius of the driven wheels in meters.
    pub tire_radius_m: f64,
    /// Engine displacement in liters.
    pub displacement_l: f64,
    /// Intake air density in kg/m³.
    pub air_density: f64,
    /// Volumetric efficiency (0-1).
    pub volumetric_efficiency: f64,
    /// Stoichiometric air/fuel ratio.
    pub air_fuel_ratio: f64,
    /// Fuel density in kg/L.
    pub fuel_density_kg_l: f64,
}

impl Default for VehicleProfile {
    fn default() -> Self {
        Self {
            idle_rpm: 800.0,
            max_rpm: 7000.0,
            max_speed_kmh: 180.0,
            gear_ratios: vec![3.5, 2.0, 1.4, 1.0, 0.8, 0.6],
            gear_min_speed_kmh: vec![0.0, 15.0, 30.0, 50.0, 70.0, 90.0],
            final_drive: 3.5,
            tire_radius_m: 0.3,
            displacement_l: 1.6,
            air_density: 1.225,
            volumetric_efficiency: 0.85,
            air_fuel_ratio: 14.7,
            fuel_density_kg_l: 0.74,
        }
    }
}

impl VehicleProfile {
    /// Validate the profile.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] naming the first inconsistent field.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("vehicle.idle_rpm", self.idle_rpm),
            ("vehicle.max_rpm", self.max_rpm),
            ("vehicle.max_speed_kmh", self.max_speed_kmh),
            ("vehicle.final_drive", self.final_drive),
            ("vehicle.tire_radius_m", self.tire_radius_m),
            ("vehicle.displacement_l", self.displacement_l),
            ("vehicle.air_density", self.air_density),
            ("vehicle.volumetric_efficiency", self.volumetric_efficiency),
            ("vehicle.air_fuel_ratio", self.air_fuel_ratio),
            ("vehicle.fuel_density_kg_l", self.fuel_density_kg_l),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(Error::invalid_parameter(
                    name,
                    format!("must be a positive number, got {value}"),
                ));
            }
        }

        // samples are whole rpm, so at least one whole value must fit in the band
        if self.max_rpm < self.idle_rpm + 1.0 {
            return Err(Error::invalid_parameter(
                "vehicle.max_rpm",
                format!(
                    "must exceed idle_rpm ({}) by at least 1, got {}",
                    self.idle_rpm, self.max_rpm
                ),
            ));
        }

        if self.gear_ratios.is_empty() || self.gear_ratios.len() > usize::from(u8::MAX) {
            return Err(Error::invalid_parameter(
                "vehicle.gear_ratios",
                format!("must list 1 to 255 gears, got {}", self.gear_ratios.len()),
            ));
        }
        if self.gear_ratios.iter().any(|r| !(r.is_finite() && *r > 0.0)) {
            return Err(Error::invalid_parameter(
                "vehicle.gear_ratios",
                "every ratio must be a positive number",
            ));
        }
        if self.gear_min_speed_kmh.len() != self.gear_ratios.len() {
            return Err(Error::invalid_parameter(
                "vehicle.gear_min_speed_kmh",
                format!(
                    "must have one entry per gear ({}), got {}",
                    self.gear_ratios.len(),
                    self.gear_min_speed_kmh.len()
                ),
            ));
        }
        if self
            .gear_min_speed_kmh
            .iter()
            .any(|v| !(v.is_finite() && *v >= 0.0))
        {
            return Err(Error::invalid_parameter(
                "vehicle.gear_min_speed_kmh",
                "every threshold must be a non-negative number",
            ));
        }
        if self.gear_min_speed_kmh.windows(2).any(|w| w[0] >= w[1]) {
            return Err(Error::invalid_parameter(
                "vehicle.gear_min_speed_kmh",
                "thresholds must be strictly increasing",
            ));
        }

        Ok(())
    }

    /// Number of forward gears.
    #[must_use]
    pub fn gear_count(&self) -> usize {
        self.gear_ratios.len()
    }

    /// Gear selected at the given speed (1-based).
    ///
    /// The highest gear whose minimum speed lies below `speed_kmh`; first gear
    /// when stationary.
    #[must_use]
    pub fn gear_for_speed(&self, speed_kmh: f64) -> u8 {
        let gear = self
            .gear_min_speed_kmh
            .iter()
            .take_while(|&&limit| speed_kmh > limit)
            .count()
            .max(1);
        u8::try_from(gear).unwrap_or(u8::MAX)
    }

    /// Theoretical engine revolutions per km/h in the given gear.
    #[must_use]
    pub fn rpm_per_kmh(&self, gear: u8) -> Option<f64> {
        let ratio = self.gear_ratios.get(usize::from(gear).checked_sub(1)?)?;
        Some(60.0 * self.final_drive * ratio / (3.6 * 2.0 * PI * self.tire_radius_m))
    }

    /// Engine speed at `speed_kmh` in `gear`, clamped to the idle/rev-limit band.
    #[must_use]
    pub fn engine_rpm(&self, speed_kmh: f64, gear: u8) -> f64 {
        let rpm = self.rpm_per_kmh(gear).unwrap_or(0.0) * speed_kmh;
        rpm.clamp(self.idle_rpm, self.max_rpm)
    }

    /// Fuel flow in L/h estimated from the mass air flow.
    ///
    /// `maf = displacement × rpm / 120 × air_density × VE × load`, fuel mass is
    /// `maf / AFR`, converted to volume with the fuel density.
    #[must_use]
    pub fn fuel_flow_lph(&self, rpm: f64, load_pct: f64) -> f64 {
        let maf_g_s = (self.displacement_l * rpm / 120.0)
            * self.air_density
            * self.volumetric_efficiency
            * (load_pct / 100.0);
        let fuel_g_s = maf_g_s / self.air_fuel_ratio;
        (fuel_g_s / (self.fuel_density_kg_l * 1000.0) * 3600.0).max(0.0)
    }

    /// The gear whose theoretical RPM-per-km/h ratio best matches an observation.
    ///
    /// Returns `None` when the vehicle is stationary or the engine is off.
    #[must_use]
    pub fn implied_gear(&self, speed_kmh: f64, rpm: f64) -> Option<u8> {
        if speed_kmh < 1.0 || rpm <= 0.0 {
            return None;
        }
        let observed = (rpm / speed_kmh).ln();
        (1..=u8::try_from(self.gear_count()).unwrap_or(u8::MAX))
            .filter_map(|gear| Some((gear, (observed - self.rpm_per_kmh(gear)?.ln()).abs())))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(gear, _)| gear)
    }
}
