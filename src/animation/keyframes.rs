use crate::{
    animation::ease::Ease,
    foundation::core::Vec2,
    foundation::error::{ReelError, ReelResult},
};

/// Interpolation contract for keyframed value types.
pub trait Lerp: Sized {
    /// Interpolate from `a` to `b` with normalized factor `t` in `[0, 1]`.
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

impl Lerp for f32 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        (*a as f64 + ((*b as f64 - *a as f64) * t)) as f32
    }
}

impl Lerp for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Vec2::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t)
    }
}

/// Piecewise schedule mapping a progress value to an output.
///
/// `at` holds the breakpoints (non-decreasing), `values` the output at each breakpoint. Between
/// breakpoints the output is interpolated through that segment's entry in `eases` (linear when the
/// list is empty); outside the first/last breakpoint it is held at the first/last value. Repeated
/// breakpoints are allowed and produce a step.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Keyframes<T> {
    /// Progress breakpoints, sorted.
    pub at: Vec<f64>,
    /// Output at each breakpoint.
    pub values: Vec<T>,
    /// Easing per segment: empty, or one entry for each pair of adjacent breakpoints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub eases: Vec<Ease>,
}

impl<T> Keyframes<T>
where
    T: Lerp + Clone,
{
    /// Linear schedule from parallel breakpoint/value lists.
    pub fn linear(at: impl Into<Vec<f64>>, values: impl Into<Vec<T>>) -> Self {
        Self {
            at: at.into(),
            values: values.into(),
            eases: Vec::new(),
        }
    }

    /// Replace the per-segment easing.
    pub fn with_eases(mut self, eases: impl Into<Vec<Ease>>) -> Self {
        self.eases = eases.into();
        self
    }

    fn segment_ease(&self, segment: usize) -> Ease {
        self.eases.get(segment).copied().unwrap_or(Ease::Linear)
    }

    /// Validate breakpoint ordering and list shapes.
    pub fn validate(&self) -> ReelResult<()> {
        if self.at.is_empty() {
            return Err(ReelError::validation(
                "keyframes must have at least one breakpoint",
            ));
        }
        if self.at.len() != self.values.len() {
            return Err(ReelError::validation(format!(
                "keyframes have {} breakpoints but {} values",
                self.at.len(),
                self.values.len()
            )));
        }
        if self.at.iter().any(|a| !a.is_finite()) {
            return Err(ReelError::validation("keyframe breakpoints must be finite"));
        }
        if !self.at.windows(2).all(|w| w[0] <= w[1]) {
            return Err(ReelError::validation(
                "keyframe breakpoints must be non-decreasing",
            ));
        }
        if !self.eases.is_empty() && self.eases.len() != self.at.len() - 1 {
            return Err(ReelError::validation(format!(
                "keyframes have {} segments but {} eases",
                self.at.len() - 1,
                self.eases.len()
            )));
        }
        Ok(())
    }

    /// Sample at `progress`. Returns `None` only for an empty schedule.
    pub fn sample(&self, progress: f64) -> Option<T> {
        let n = self.at.len().min(self.values.len());
        if n == 0 {
            return None;
        }
        let at = &self.at[..n];

        if !progress.is_finite() || progress <= at[0] {
            return Some(self.values[0].clone());
        }
        let idx = at.partition_point(|&a| a <= progress);
        if idx >= n {
            return Some(self.values[n - 1].clone());
        }

        let (a0, a1) = (at[idx - 1], at[idx]);
        let span = a1 - a0;
        if span <= 0.0 {
            return Some(self.values[idx - 1].clone());
        }
        let t = self.segment_ease(idx - 1).apply((progress - a0) / span);
        Some(T::lerp(&self.values[idx - 1], &self.values[idx], t))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/animation/keyframes.rs"]
mod tests;
