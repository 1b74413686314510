use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animation::keyframes::Keyframes;
use crate::animation::spring::SpringConfig;
use crate::assets::sequence::SequenceSpec;
use crate::beats::{Beat, BeatSequencer, default_beats, default_scroll_indicator};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{ReelError, ReelResult};
use crate::scroll::progress::ScrollBinding;

/// What to do when preloading has not finished after [`PreloadPolicy::timeout_ms`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StallAction {
    /// Log and keep showing the loading state.
    #[default]
    KeepWaiting,
    /// Become ready with the frames decoded so far; the rest never paint.
    ShowAvailable,
}

/// Preload timeout. Without `timeout_ms` the player waits for every frame indefinitely.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloadPolicy {
    pub timeout_ms: Option<u64>,
    pub on_timeout: StallAction,
}

/// Color accepted as `"#RRGGBB"`, `"#RRGGBBAA"`, `{ "r", "g", "b", "a"? }` or `[r, g, b, a?]`.
///
/// Object and array channels are normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ColorDef {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl ColorDef {
    pub fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Straight-alpha 8-bit color.
    pub fn to_rgba8(self) -> Rgba8 {
        fn to_u8(x: f64) -> u8 {
            if x.is_nan() {
                return 0;
            }
            (x.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        Rgba8 {
            r: to_u8(self.r),
            g: to_u8(self.g),
            b: to_u8(self.b),
            a: to_u8(self.a),
        }
    }
}

impl From<Rgba8> for ColorDef {
    fn from(c: Rgba8) -> Self {
        let f = |v: u8| f64::from(v) / 255.0;
        Self::rgba(f(c.r), f(c.g), f(c.b), f(c.a))
    }
}

impl<'de> Deserialize<'de> for ColorDef {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Hex(String),
            Obj {
                r: f64,
                g: f64,
                b: f64,
                #[serde(default = "one")]
                a: f64,
            },
            Arr(Vec<f64>),
        }

        fn one() -> f64 {
            1.0
        }

        match Repr::deserialize(deserializer)? {
            Repr::Hex(s) => parse_hex(&s).map_err(serde::de::Error::custom),
            Repr::Obj { r, g, b, a } => Ok(Self::rgba(r, g, b, a)),
            Repr::Arr(v) => match v.as_slice() {
                &[r, g, b] => Ok(Self::rgba(r, g, b, 1.0)),
                &[r, g, b, a] => Ok(Self::rgba(r, g, b, a)),
                _ => Err(serde::de::Error::custom(
                    "color array must be [r,g,b] or [r,g,b,a]",
                )),
            },
        }
    }
}

fn parse_hex(s: &str) -> Result<ColorDef, String> {
    let s = s.trim();
    let s = s.strip_prefix('#').unwrap_or(s);
    if !s.is_ascii() || !(s.len() == 6 || s.len() == 8) {
        return Err(format!("color \"#{s}\" must be #RRGGBB or #RRGGBBAA"));
    }

    let byte = |i: usize| -> Result<f64, String> {
        let pair = &s[i..i + 2];
        u8::from_str_radix(pair, 16)
            .map(|v| f64::from(v) / 255.0)
            .map_err(|_| format!("invalid hex byte \"{pair}\""))
    };
    let a = if s.len() == 8 { byte(6)? } else { 1.0 };
    Ok(ColorDef::rgba(byte(0)?, byte(2)?, byte(4)?, a))
}

/// Everything a [`crate::FramePlayer`] needs besides its host, canvas and loader.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub sequence: SequenceSpec,
    pub binding: ScrollBinding,
    pub spring: SpringConfig,
    /// Fill behind letterboxed frames.
    pub background: ColorDef,
    pub beats: Vec<Beat>,
    pub scroll_indicator: Keyframes<f64>,
    pub preload: PreloadPolicy,
    /// Height of the scroll section, in viewport heights.
    pub scroll_length_vh: f64,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            sequence: SequenceSpec::default(),
            binding: ScrollBinding::WholePage,
            spring: SpringConfig::default(),
            background: ColorDef::from(Rgba8::opaque(0x05, 0x05, 0x05)),
            beats: default_beats(),
            scroll_indicator: default_scroll_indicator(),
            preload: PreloadPolicy::default(),
            scroll_length_vh: 400.0,
        }
    }
}

impl PlayerConfig {
    pub fn from_reader<R: std::io::Read>(r: R) -> ReelResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| ReelError::serde(format!("parse player config JSON: {e}")))
    }

    pub fn from_json_str(s: &str) -> ReelResult<Self> {
        serde_json::from_str(s)
            .map_err(|e| ReelError::serde(format!("parse player config JSON: {e}")))
    }

    pub fn from_path(path: impl AsRef<Path>) -> ReelResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ReelError::validation(format!("open player config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    pub fn to_json_pretty(&self) -> ReelResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ReelError::serde(format!("serialize player config: {e}")))
    }

    /// Check every section; the first problem is reported.
    pub fn validate(&self) -> ReelResult<()> {
        self.sequence.validate()?;
        self.spring.validate()?;
        if let ScrollBinding::Scoped { container } = &self.binding
            && container.trim().is_empty()
        {
            return Err(ReelError::validation(
                "scoped binding needs a container id",
            ));
        }
        let ColorDef { r, g, b, a } = self.background;
        if [r, g, b, a].iter().any(|c| !c.is_finite()) {
            return Err(ReelError::validation("background color must be finite"));
        }
        if !self.scroll_length_vh.is_finite() || self.scroll_length_vh < 100.0 {
            return Err(ReelError::validation(
                "scroll_length_vh must be at least 100",
            ));
        }
        if self.preload.timeout_ms == Some(0) {
            return Err(ReelError::validation(
                "preload timeout_ms must be positive when set",
            ));
        }
        self.beat_sequencer().map(|_| ())
    }

    /// Validated beat sequencer for this configuration.
    pub fn beat_sequencer(&self) -> ReelResult<BeatSequencer> {
        BeatSequencer::new(self.beats.clone(), self.scroll_indicator.clone())
    }

    pub fn background_rgba8(&self) -> Rgba8 {
        self.background.to_rgba8()
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
