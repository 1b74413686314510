//! Scrollreel plays a pre-rendered image sequence scrubbed by page scroll.
//!
//! A [`FramePlayer`] is mounted on a [`Host`] (event loop plus scrollable page) with a
//! [`CanvasElement`] and a [`FrameLoader`]:
//!
//! - every frame is requested at mount and the player stays `Loading` until all have decoded
//! - once `Ready`, scroll progress is smoothed by a spring and mapped to a frame index
//! - the matching frame is painted contain-fit on every progress change and every resize
//! - text beats and the scroll hint are pure functions of the smoothed progress
//!
//! [`ScrollSession`] drives all of this headlessly for the CLI and tests.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod animation;
pub(crate) mod assets;
pub(crate) mod beats;
pub(crate) mod config;
pub(crate) mod host;
pub(crate) mod player;
pub(crate) mod render;
pub(crate) mod scroll;
pub(crate) mod session;

pub use crate::foundation::core::{Affine, FrameIndex, Rect, Rgba8, Size, Vec2, Viewport};
pub use crate::foundation::error::{ReelError, ReelResult};
pub use crate::foundation::signal::{Signal, Subscription};

pub use crate::animation::ease::Ease;
pub use crate::animation::keyframes::{Keyframes, Lerp};
pub use crate::animation::spring::{Spring, SpringConfig};
pub use crate::assets::decode::{DecodedImage, decode_image};
pub use crate::assets::loader::{FrameLoader, FsLoader, ManualLoader, MemoryLoader};
pub use crate::assets::preload::{DecodeReply, FrameAsset, FrameTable, LoadStatus, Preload};
pub use crate::assets::sequence::SequenceSpec;
pub use crate::beats::{
    Align, Beat, BeatFrame, BeatSequencer, default_beats, default_scroll_indicator,
};
pub use crate::config::{ColorDef, PlayerConfig, PreloadPolicy, StallAction};
pub use crate::host::Host;
pub use crate::host::event_loop::{AnimationFrame, EventLoop, FRAME_MS, Timeout};
pub use crate::host::page::{ElementBox, Page, PageLayout};
pub use crate::player::{FramePlayer, Phase};
pub use crate::render::draw::{DrawOutcome, FrameDrawer};
pub use crate::render::fit::contain_rect;
pub use crate::render::surface::{CanvasElement, CanvasSurface, SurfaceStats, image_paint};
pub use crate::scroll::progress::{
    ProgressTracker, ScrollBinding, scoped_progress, whole_page_progress,
};
pub use crate::scroll::smoothed::SmoothedProgress;
pub use crate::session::ScrollSession;
