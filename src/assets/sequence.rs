use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};

/// Location and numbering of a pre-rendered image sequence.
///
/// Frame `i` lives at `<base_path>/<dir>/<prefix>-<i zero-padded to pad>.<ext>`.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SequenceSpec {
    /// URI prefix shared by every frame, usually `/`.
    pub base_path: String,
    /// Directory holding the frames.
    pub dir: String,
    /// File name prefix before the frame number.
    pub prefix: String,
    /// File extension without the dot.
    pub ext: String,
    /// Number of frames, numbered `1..=frame_count`.
    pub frame_count: u32,
    /// Zero-padded width of the frame number.
    pub pad: usize,
}

impl Default for SequenceSpec {
    fn default() -> Self {
        Self {
            base_path: "/".to_owned(),
            dir: "sequence".to_owned(),
            prefix: "ezgif-frame".to_owned(),
            ext: "jpg".to_owned(),
            frame_count: 162,
            pad: 3,
        }
    }
}

impl SequenceSpec {
    /// Validate numbering and path segments.
    pub fn validate(&self) -> ReelResult<()> {
        if self.frame_count == 0 {
            return Err(ReelError::validation("sequence frame_count must be >= 1"));
        }
        let digits = self.frame_count.to_string().len();
        if self.pad < digits {
            return Err(ReelError::validation(format!(
                "sequence pad {} is too narrow for {} frames",
                self.pad, self.frame_count
            )));
        }
        for (name, seg) in [
            ("dir", &self.dir),
            ("prefix", &self.prefix),
            ("ext", &self.ext),
        ] {
            if seg.is_empty() {
                return Err(ReelError::validation(format!(
                    "sequence {name} must be non-empty"
                )));
            }
            if seg.contains('/') || seg.contains('\\') || seg == ".." {
                return Err(ReelError::validation(format!(
                    "sequence {name} must be a single path segment"
                )));
            }
        }
        Ok(())
    }

    /// URI of frame `index`.
    pub fn uri(&self, index: FrameIndex) -> String {
        let base = self.base_path.trim_end_matches('/');
        format!(
            "{base}/{dir}/{prefix}-{num:0pad$}.{ext}",
            dir = self.dir,
            prefix = self.prefix,
            num = index.0,
            pad = self.pad,
            ext = self.ext,
        )
    }

    /// Every frame index in order.
    pub fn indices(&self) -> impl Iterator<Item = FrameIndex> + use<> {
        (1..=self.frame_count).map(FrameIndex)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/sequence.rs"]
mod tests;
