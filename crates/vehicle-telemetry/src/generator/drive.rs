//! Per-sample drive simulation.
//!
//! The vehicle moves between three states: parked with the engine off, idling
//! in place, and driving toward a target speed. Each call to
//! [`DriveSimulator::step`] advances the state once and produces one record.

use chrono::{DateTime, Utc};
use rand::Rng;

use super::scenario::Scenario;
use crate::record::TelemetryRecord;
use crate::vehicle::VehicleProfile;

/// Chance that a driving vehicle picks a new target speed at a sample.
const RETARGET_PROBABILITY: f64 = 0.3;

/// Engine load held while lugging the engine.
const LUGGING_LOAD_PCT: f64 = 90.0;

/// Gear used when lugging the engine at low speed.
const LUGGING_GEAR: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineState {
    /// Parked, engine off
    Off,
    /// Engine running, vehicle stationary
    Idling,
    /// Engine running, vehicle moving toward a target speed
    Driving,
}

/// Stateful drive simulator; randomness is supplied by the caller.
#[derive(Debug)]
pub(crate) struct DriveSimulator<'a> {
    vehicle: &'a VehicleProfile,
    interval_hours: f64,
    scenario: Scenario,
    state: EngineState,
    speed_kmh: f64,
    target_speed_kmh: f64,
}

impl<'a> DriveSimulator<'a> {
    pub(crate) fn new(vehicle: &'a VehicleProfile, interval_hours: f64) -> Self {
        Self {
            vehicle,
            interval_hours,
            scenario: Scenario::Mixed,
            state: EngineState::Off,
            speed_kmh: 0.0,
            target_speed_kmh: 0.0,
        }
    }

    /// Switch the dominant scenario, keeping a running engine running.
    pub(crate) fn set_scenario<R: Rng + ?Sized>(&mut self, scenario: Scenario, rng: &mut R) {
        self.scenario = scenario;
        if self.state != EngineState::Off {
            self.start_engine(rng);
        }
    }

    /// Advance one sample and produce its record.
    pub(crate) fn step<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        timestamp: DateTime<Utc>,
    ) -> TelemetryRecord {
        self.advance_state(rng);
        match self.state {
            EngineState::Off => {
                self.speed_kmh = 0.0;
                self.sample(timestamp, 0.0, 0.0, 0.0, 0.0, 0.0)
            }
            EngineState::Idling => {
                self.speed_kmh = 0.0;
                self.idle_sample(rng, timestamp, 0.0)
            }
            EngineState::Driving => self.drive_sample(rng, timestamp),
        }
    }

    fn advance_state<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        match self.state {
            EngineState::Off => {
                if rng.gen_bool(self.scenario.start_probability()) {
                    self.start_engine(rng);
                }
            }
            EngineState::Idling | EngineState::Driving => {
                if rng.gen_bool(self.scenario.stop_probability()) {
                    self.state = EngineState::Off;
                } else if self.state == EngineState::Driving
                    && rng.gen_bool(RETARGET_PROBABILITY)
                {
                    self.target_speed_kmh = self.draw_target(rng);
                }
            }
        }
    }

    fn start_engine<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.scenario.is_stationary() {
            self.state = EngineState::Idling;
        } else {
            self.state = EngineState::Driving;
            self.target_speed_kmh = self.draw_target(rng);
        }
    }

    fn draw_target<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let (low, high) = self.scenario.target_speed_range();
        rng.gen_range(low..=high).min(self.vehicle.max_speed_kmh)
    }

    fn idle_sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        timestamp: DateTime<Utc>,
        speed_kmh: f64,
    ) -> TelemetryRecord {
        let vehicle = self.vehicle;
        let throttle = rng.gen_range(0.0..=5.0);
        let rpm = (vehicle.idle_rpm + throttle * 20.0 + rng.gen_range(-25.0..=25.0))
            .clamp(vehicle.idle_rpm, vehicle.max_rpm);
        let load = (10.0 + throttle * 0.8 + rng.gen_range(0.0..=5.0)).clamp(10.0, 100.0);
        let fuel = self.fuel_used(rng, rpm, load);
        self.sample(timestamp, speed_kmh, rpm, throttle, load, fuel)
    }

    fn drive_sample<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        timestamp: DateTime<Utc>,
    ) -> TelemetryRecord {
        let vehicle = self.vehicle;
        let previous = self.speed_kmh;
        let approach = rng.gen_range(0.4..=0.8);
        let speed = (previous
            + (self.target_speed_kmh - previous) * approach
            + rng.gen_range(-5.0..=5.0))
        .clamp(0.0, vehicle.max_speed_kmh);
        self.speed_kmh = speed;

        if speed < 1.0 {
            return self.idle_sample(rng, timestamp, speed);
        }

        let acceleration = speed - previous;
        let throttle = if acceleration < -10.0 {
            // coasting or braking
            rng.gen_range(0.0..=5.0)
        } else {
            0.35 * speed
                + self.scenario.throttle_gain() * acceleration.max(0.0)
                + rng.gen_range(-8.0..=8.0)
        }
        .clamp(0.0, 100.0);

        let mut gear = vehicle.gear_for_speed(speed);
        let mut lugging = false;
        if self.scenario == Scenario::Inefficient {
            if speed > 20.0 && speed < 50.0 {
                gear = 1;
            } else if speed > 10.0 && speed <= 20.0 {
                gear = LUGGING_GEAR.min(u8::try_from(vehicle.gear_count()).unwrap_or(u8::MAX));
                lugging = true;
            }
        }

        let rpm = (vehicle.engine_rpm(speed, gear) * rng.gen_range(0.97..=1.03))
            .clamp(vehicle.idle_rpm, vehicle.max_rpm);
        let load = if lugging {
            LUGGING_LOAD_PCT
        } else {
            (throttle * 0.8 + speed * 0.1 + rng.gen_range(-5.0..=5.0)).clamp(10.0, 100.0)
        };
        let fuel = self.fuel_used(rng, rpm, load);
        self.sample(timestamp, speed, rpm, throttle, load, fuel)
    }

    /// Build a record with readings quantized to the precision written to
    /// disk. Rounding happens before clamping, against limits rounded inward,
    /// so every record passes the reader's bounds check.
    fn sample(
        &self,
        timestamp: DateTime<Utc>,
        speed_kmh: f64,
        rpm: f64,
        throttle_pct: f64,
        engine_load_pct: f64,
        fuel_used_l: f64,
    ) -> TelemetryRecord {
        let vehicle = self.vehicle;
        let max_speed = floor_to(vehicle.max_speed_kmh, 10.0);
        let rpm = if rpm > 0.0 {
            quantize(rpm, 1.0).clamp(vehicle.idle_rpm.ceil(), vehicle.max_rpm.floor())
        } else {
            0.0
        };
        TelemetryRecord {
            timestamp,
            speed_kmh: quantize(speed_kmh, 10.0).clamp(0.0, max_speed),
            rpm,
            throttle_pct: quantize(throttle_pct, 10.0).clamp(0.0, 100.0),
            engine_load_pct: quantize(engine_load_pct, 10.0).clamp(0.0, 100.0),
            fuel_used_l: quantize(fuel_used_l, 1_000_000.0).max(0.0),
        }
    }

    fn fuel_used<R: Rng + ?Sized>(&self, rng: &mut R, rpm: f64, load: f64) -> f64 {
        self.vehicle.fuel_flow_lph(rpm, load) * self.interval_hours * rng.gen_range(0.95..=1.05)
    }
}

/// Round to `1 / scale`. Adding zero folds `-0.0` into `0.0`.
fn quantize(value: f64, scale: f64) -> f64 {
    (value * scale).round() / scale + 0.0
}

/// Round down to `1 / scale`.
fn floor_to(value: f64, scale: f64) -> f64 {
    (value * scale).floor() / scale
}
