use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::{debug, warn};

use crate::assets::decode::DecodedImage;
use crate::assets::loader::FrameLoader;
use crate::assets::sequence::SequenceSpec;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::ReelResult;
use crate::foundation::signal::{Signal, Subscription};

/// One entry of the frame table. `image` goes from `None` to `Some` at most once.
#[derive(Clone, Debug)]
pub struct FrameAsset {
    /// 1-based frame number.
    pub index: FrameIndex,
    /// URI the frame was requested from.
    pub uri: String,
    /// Decoded pixels, once available.
    pub image: Option<DecodedImage>,
}

/// Preload counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct LoadStatus {
    /// Frames decoded successfully.
    pub loaded: u32,
    /// Frames whose load or decode failed for good.
    pub failed: u32,
    /// Frames requested.
    pub total: u32,
}

impl LoadStatus {
    /// Every frame decoded.
    pub fn is_complete(self) -> bool {
        self.loaded == self.total
    }

    /// Every request has an outcome, successful or not.
    pub fn is_settled(self) -> bool {
        self.loaded + self.failed >= self.total
    }

    /// Loaded share in `[0, 1]`, as shown by the loading bar.
    pub fn fraction(self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        f64::from(self.loaded) / f64::from(self.total)
    }
}

/// Frame assets of one mount, indexed by frame number.
#[derive(Debug)]
pub struct FrameTable {
    frames: Vec<FrameAsset>,
    loaded: u32,
    failed: u32,
}

impl FrameTable {
    /// Empty table with one entry per frame of `seq`.
    pub fn new(seq: &SequenceSpec) -> Self {
        Self {
            frames: seq
                .indices()
                .map(|index| FrameAsset {
                    index,
                    uri: seq.uri(index),
                    image: None,
                })
                .collect(),
            loaded: 0,
            failed: 0,
        }
    }

    /// Entry for `index`, if it is in range.
    pub fn asset(&self, index: FrameIndex) -> Option<&FrameAsset> {
        if index.0 == 0 {
            return None;
        }
        self.frames.get(index.slot())
    }

    /// Decoded image for `index`, if it exists and has decoded.
    pub fn image(&self, index: FrameIndex) -> Option<&DecodedImage> {
        self.asset(index).and_then(|a| a.image.as_ref())
    }

    /// All entries in frame order.
    pub fn assets(&self) -> &[FrameAsset] {
        &self.frames
    }

    /// Current counters.
    pub fn status(&self) -> LoadStatus {
        LoadStatus {
            loaded: self.loaded,
            failed: self.failed,
            total: self.frames.len() as u32,
        }
    }

    /// Store a decoded image. Returns `false` (and changes nothing) for an out-of-range index or
    /// a frame that already has an image.
    pub fn record_decoded(&mut self, index: FrameIndex, image: DecodedImage) -> bool {
        if index.0 == 0 {
            return false;
        }
        let Some(asset) = self.frames.get_mut(index.slot()) else {
            return false;
        };
        if asset.image.is_some() {
            return false;
        }
        asset.image = Some(image);
        self.loaded += 1;
        true
    }

    /// Count a permanent failure. Frames that already decoded are left alone.
    pub fn record_failure(&mut self, index: FrameIndex) -> bool {
        match self.asset(index) {
            Some(a) if a.image.is_none() => {
                self.failed += 1;
                true
            }
            _ => false,
        }
    }
}

struct PreloadShared {
    table: RefCell<FrameTable>,
    status: Signal<LoadStatus>,
}

/// Completion handle for one frame request.
///
/// Consumed by [`DecodeReply::resolve`], so each request has at most one outcome. Resolving after
/// the owning player was torn down is a no-op.
pub struct DecodeReply {
    index: FrameIndex,
    uri: String,
    target: Weak<PreloadShared>,
}

impl fmt::Debug for DecodeReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeReply")
            .field("index", &self.index)
            .field("uri", &self.uri)
            .field("live", &(self.target.strong_count() > 0))
            .finish()
    }
}

impl DecodeReply {
    /// Frame this reply belongs to.
    pub fn index(&self) -> FrameIndex {
        self.index
    }

    /// URI that was requested.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// `true` while the requesting player is still mounted.
    pub fn is_live(&self) -> bool {
        self.target.strong_count() > 0
    }

    /// Deliver the outcome of the request.
    pub fn resolve(self, result: ReelResult<DecodedImage>) {
        let Some(shared) = self.target.upgrade() else {
            debug!(frame = self.index.0, "decode finished after teardown; dropped");
            return;
        };

        let status = {
            let mut table = shared.table.borrow_mut();
            match result {
                Ok(image) => {
                    if !table.record_decoded(self.index, image) {
                        debug!(frame = self.index.0, "duplicate decode ignored");
                    }
                }
                Err(err) => {
                    warn!(frame = self.index.0, uri = %self.uri, error = %err, "frame failed to load; it will not paint");
                    table.record_failure(self.index);
                }
            }
            table.status()
        };
        shared.status.set(status);
    }
}

/// Preload of one image sequence, owned by a single player mount.
pub struct Preload {
    shared: Rc<PreloadShared>,
}

impl fmt::Debug for Preload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Preload")
            .field("status", &self.status())
            .finish()
    }
}

impl Preload {
    /// Create the frame table and issue one request per frame.
    pub fn start(seq: &SequenceSpec, loader: &dyn FrameLoader) -> Self {
        let table = FrameTable::new(seq);
        let status = table.status();
        let shared = Rc::new(PreloadShared {
            table: RefCell::new(table),
            status: Signal::new(status),
        });

        debug!(frames = seq.frame_count, "requesting image sequence");
        for index in seq.indices() {
            loader.request(DecodeReply {
                index,
                uri: seq.uri(index),
                target: Rc::downgrade(&shared),
            });
        }
        Self { shared }
    }

    /// Current counters.
    pub fn status(&self) -> LoadStatus {
        self.shared.status.get()
    }

    /// Listen for counter changes; fires once per resolved request.
    pub fn on_status(&self, f: impl Fn(&LoadStatus) + 'static) -> Subscription {
        self.shared.status.subscribe(f)
    }

    /// Decoded image for `index`. Cheap: pixels are shared.
    pub fn image(&self, index: FrameIndex) -> Option<DecodedImage> {
        self.shared.table.borrow().image(index).cloned()
    }

    /// Borrow the frame table.
    pub fn with_table<R>(&self, f: impl FnOnce(&FrameTable) -> R) -> R {
        f(&self.shared.table.borrow())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/preload.rs"]
mod tests;
