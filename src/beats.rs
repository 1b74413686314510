//! Text beats layered over the frame sequence.
//!
//! Each beat is a pure function of smoothed progress: an opacity schedule and a vertical offset
//! schedule. Beats may overlap to cross-fade. The sequencer keeps no state between samples.

use std::collections::BTreeSet;

use crate::animation::keyframes::Keyframes;
use crate::foundation::error::{ReelError, ReelResult};

/// Horizontal placement of a beat's copy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Align {
    #[default]
    Center,
    Left,
    Right,
}

/// One text overlay and its schedules.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Beat {
    /// Stable identifier, unique within a sequencer.
    pub name: String,
    pub heading: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub align: Align,
    /// Opacity over progress; sampled values are clamped to `[0, 1]`.
    pub opacity: Keyframes<f64>,
    /// Vertical offset in pixels over progress.
    pub offset_y: Keyframes<f64>,
}

/// A beat sampled at one progress value.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct BeatFrame {
    pub name: String,
    pub opacity: f64,
    pub offset_y: f64,
}

impl BeatFrame {
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0
    }
}

impl Beat {
    pub fn new(
        name: impl Into<String>,
        heading: impl Into<String>,
        body: impl Into<String>,
        align: Align,
        opacity: Keyframes<f64>,
        offset_y: Keyframes<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            heading: heading.into(),
            body: body.into(),
            align,
            opacity,
            offset_y,
        }
    }

    pub fn validate(&self) -> ReelResult<()> {
        if self.name.trim().is_empty() {
            return Err(ReelError::validation("beat name must be non-empty"));
        }
        for (what, kf) in [("opacity", &self.opacity), ("offset_y", &self.offset_y)] {
            kf.validate().map_err(|e| {
                ReelError::validation(format!("beat '{}' {what}: {e}", self.name))
            })?;
            if kf.values.iter().any(|v| !v.is_finite()) {
                return Err(ReelError::validation(format!(
                    "beat '{}' {what} values must be finite",
                    self.name
                )));
            }
        }
        Ok(())
    }

    pub fn sample(&self, progress: f64) -> BeatFrame {
        BeatFrame {
            name: self.name.clone(),
            opacity: self.opacity.sample(progress).unwrap_or(0.0).clamp(0.0, 1.0),
            offset_y: self.offset_y.sample(progress).unwrap_or(0.0),
        }
    }
}

/// Validated set of beats plus the scroll-indicator fade.
#[derive(Clone, Debug, PartialEq)]
pub struct BeatSequencer {
    beats: Vec<Beat>,
    indicator: Keyframes<f64>,
}

impl Default for BeatSequencer {
    fn default() -> Self {
        Self {
            beats: default_beats(),
            indicator: default_scroll_indicator(),
        }
    }
}

impl BeatSequencer {
    pub fn new(beats: Vec<Beat>, indicator: Keyframes<f64>) -> ReelResult<Self> {
        let mut seen = BTreeSet::new();
        for beat in &beats {
            beat.validate()?;
            if !seen.insert(beat.name.as_str()) {
                return Err(ReelError::validation(format!(
                    "duplicate beat name '{}'",
                    beat.name
                )));
            }
        }
        indicator
            .validate()
            .map_err(|e| ReelError::validation(format!("scroll indicator: {e}")))?;
        Ok(Self { beats, indicator })
    }

    pub fn beats(&self) -> &[Beat] {
        &self.beats
    }

    /// Every beat at `progress`, in configuration order.
    pub fn sample(&self, progress: f64) -> Vec<BeatFrame> {
        self.beats.iter().map(|b| b.sample(progress)).collect()
    }

    /// Opacity of the "scroll to pour" hint.
    pub fn indicator_opacity(&self, progress: f64) -> f64 {
        self.indicator.sample(progress).unwrap_or(0.0).clamp(0.0, 1.0)
    }
}

/// The four beats of the brand hero.
pub fn default_beats() -> Vec<Beat> {
    vec![
        Beat::new(
            "earth-essence",
            "EARTH & ESSENCE",
            "Tradition crafted from the ground up, inside ancient clay vessels.",
            Align::Center,
            Keyframes::linear([0.0, 0.1, 0.15, 0.25], [1.0, 1.0, 0.0, 0.0]),
            Keyframes::linear([0.0, 0.1, 0.15, 0.25], [0.0, 0.0, -20.0, -20.0]),
        ),
        Beat::new(
            "raw-purity",
            "RAW PURITY",
            "Unfiltered natural nourishment that feels alive with every pour.",
            Align::Left,
            Keyframes::linear([0.25, 0.35, 0.35, 0.45], [0.0, 1.0, 1.0, 0.0]),
            Keyframes::linear([0.25, 0.35, 0.35, 0.45], [20.0, 0.0, 0.0, -20.0]),
        ),
        Beat::new(
            "dynamic-flow",
            "DYNAMIC FLOW",
            "Captured in the moment of perfection, untouched by modern processing.",
            Align::Right,
            Keyframes::linear([0.50, 0.60, 0.60, 0.70], [0.0, 1.0, 1.0, 0.0]),
            Keyframes::linear([0.50, 0.60, 0.60, 0.70], [20.0, 0.0, 0.0, -20.0]),
        ),
        Beat::new(
            "taste-origins",
            "TASTE THE ORIGINS",
            "Experience the difference real tradition makes.",
            Align::Center,
            Keyframes::linear([0.75, 0.85, 1.0, 1.0], [0.0, 1.0, 1.0, 1.0]),
            Keyframes::linear([0.75, 0.85, 1.0, 1.0], [20.0, 0.0, 0.0, 0.0]),
        ),
    ]
}

/// Scroll hint: fully visible at the top, gone by 10% progress.
pub fn default_scroll_indicator() -> Keyframes<f64> {
    Keyframes::linear([0.0, 0.1], [1.0, 0.0])
}

#[cfg(test)]
#[path = "../tests/unit/beats/beats.rs"]
mod tests;
