//! Damped harmonic oscillator used to smooth scroll progress.
//!
//! Integrated with semi-implicit Euler in fixed sub-steps so behavior does not depend on the host
//! frame rate.

use crate::foundation::error::{ReelError, ReelResult};

/// Sub-step used by [`Spring::step`], in seconds.
const SUBSTEP_S: f64 = 1.0 / 240.0;

/// Longest frame delta integrated in one call; longer gaps (a backgrounded tab) are truncated.
const MAX_DT_S: f64 = 0.1;

/// Spring coefficients.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SpringConfig {
    /// Restoring force per unit displacement.
    pub stiffness: f64,
    /// Opposing force per unit velocity.
    pub damping: f64,
    /// Oscillator mass.
    pub mass: f64,
    /// Displacement below which the spring may come to rest.
    pub rest_delta: f64,
    /// Speed below which the spring may come to rest.
    pub rest_speed: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 100.0,
            damping: 30.0,
            mass: 1.0,
            rest_delta: 0.001,
            rest_speed: 0.01,
        }
    }
}

impl SpringConfig {
    /// Damping that makes the spring exactly critically damped for `stiffness` and `mass`.
    pub fn critical_damping(stiffness: f64, mass: f64) -> f64 {
        2.0 * (stiffness * mass).sqrt()
    }

    /// Damping ratio; `1.0` is critical, above is overdamped.
    pub fn damping_ratio(&self) -> f64 {
        self.damping / Self::critical_damping(self.stiffness, self.mass)
    }

    /// Validate that every coefficient is finite and in range.
    pub fn validate(&self) -> ReelResult<()> {
        let fields = [
            ("stiffness", self.stiffness),
            ("damping", self.damping),
            ("mass", self.mass),
            ("rest_delta", self.rest_delta),
            ("rest_speed", self.rest_speed),
        ];
        for (name, v) in fields {
            if !v.is_finite() {
                return Err(ReelError::validation(format!("spring {name} must be finite")));
            }
        }
        if self.stiffness <= 0.0 || self.mass <= 0.0 {
            return Err(ReelError::validation(
                "spring stiffness and mass must be > 0",
            ));
        }
        if self.damping < 0.0 {
            return Err(ReelError::validation("spring damping must be >= 0"));
        }
        if self.rest_delta <= 0.0 || self.rest_speed <= 0.0 {
            return Err(ReelError::validation(
                "spring rest_delta and rest_speed must be > 0",
            ));
        }
        Ok(())
    }
}

/// One-dimensional spring chasing a target.
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    cfg: SpringConfig,
    position: f64,
    velocity: f64,
    target: f64,
}

impl Spring {
    /// Spring at rest at `value`.
    pub fn new(cfg: SpringConfig, value: f64) -> Self {
        Self {
            cfg,
            position: value,
            velocity: 0.0,
            target: value,
        }
    }

    /// Current position.
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Current velocity (units per second).
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// Value being chased.
    pub fn target(&self) -> f64 {
        self.target
    }

    /// Retarget without touching position or velocity.
    pub fn set_target(&mut self, target: f64) {
        if target.is_finite() {
            self.target = target;
        }
    }

    /// Snap to `value` and stop.
    pub fn jump(&mut self, value: f64) {
        self.position = value;
        self.target = value;
        self.velocity = 0.0;
    }

    /// `true` once both displacement and speed are under the rest thresholds.
    pub fn is_at_rest(&self) -> bool {
        (self.position - self.target).abs() <= self.cfg.rest_delta
            && self.velocity.abs() <= self.cfg.rest_speed
    }

    /// Integrate `dt_s` seconds. Returns `true` when the spring is at rest afterwards, in which
    /// case the position has been snapped exactly onto the target.
    pub fn step(&mut self, dt_s: f64) -> bool {
        let mut remaining = if dt_s.is_finite() {
            dt_s.clamp(0.0, MAX_DT_S)
        } else {
            0.0
        };
        let SpringConfig {
            stiffness: k,
            damping: c,
            mass: m,
            ..
        } = self.cfg;

        while remaining > 0.0 && !self.is_at_rest() {
            let h = remaining.min(SUBSTEP_S);
            let accel = (-k * (self.position - self.target) - c * self.velocity) / m;
            self.velocity += accel * h;
            self.position += self.velocity * h;
            remaining -= h;
        }

        if self.is_at_rest() {
            self.position = self.target;
            self.velocity = 0.0;
            return true;
        }
        false
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/spring.rs"]
mod tests;
