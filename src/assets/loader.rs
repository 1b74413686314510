use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::rc::Rc;

use anyhow::Context;

use crate::assets::decode::{DecodedImage, decode_image};
use crate::assets::preload::DecodeReply;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{ReelError, ReelResult};
use crate::host::event_loop::EventLoop;

/// Source of encoded frame images.
///
/// `request` must not block. The loader keeps the reply and resolves it later, in any order,
/// exactly once or never. Resolving after the requester is gone is harmless.
pub trait FrameLoader {
    fn request(&self, reply: DecodeReply);
}

/// Reads frames from a directory that stands in for the site root.
///
/// `/sequence/ezgif-frame-001.jpg` resolves to `<root>/sequence/ezgif-frame-001.jpg`. Reading and
/// decoding happen in a task on the event loop.
#[derive(Clone, Debug)]
pub struct FsLoader {
    root: PathBuf,
    events: EventLoop,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>, events: &EventLoop) -> Self {
        Self {
            root: root.into(),
            events: events.clone(),
        }
    }

    /// Directory URIs are resolved against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Filesystem path for `uri`.
    pub fn resolve_path(&self, uri: &str) -> ReelResult<PathBuf> {
        let rel = uri_to_rel_path(uri)?;
        Ok(self.root.join(rel))
    }

    /// Read and decode synchronously.
    pub fn load_now(&self, uri: &str) -> ReelResult<DecodedImage> {
        let path = self.resolve_path(uri)?;
        let bytes =
            std::fs::read(&path).with_context(|| format!("read frame '{}'", path.display()))?;
        decode_image(&bytes)
    }
}

impl FrameLoader for FsLoader {
    fn request(&self, reply: DecodeReply) {
        let this = self.clone();
        self.events.spawn_local(move || {
            if !reply.is_live() {
                return;
            }
            let result = this.load_now(reply.uri());
            reply.resolve(result);
        });
    }
}

/// Site-root URI to a relative path: strips the leading `/`, rejects schemes and `..`.
pub(crate) fn uri_to_rel_path(uri: &str) -> ReelResult<PathBuf> {
    if uri.contains("://") {
        return Err(ReelError::validation(format!(
            "uri '{uri}' is not site-relative"
        )));
    }
    let trimmed = uri.trim_start_matches('/');
    if trimmed.is_empty() {
        return Err(ReelError::validation("frame uri must not be empty"));
    }
    let rel = trimmed.replace('\\', "/");

    let mut out = PathBuf::new();
    for c in Path::new(&rel).components() {
        match c {
            Component::CurDir => {}
            Component::Normal(seg) => out.push(seg),
            Component::ParentDir => {
                return Err(ReelError::validation(format!(
                    "uri '{uri}' must not contain '..'"
                )));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(ReelError::validation(format!(
                    "uri '{uri}' must be site-relative"
                )));
            }
        }
    }
    if out.as_os_str().is_empty() {
        return Err(ReelError::validation(format!("uri '{uri}' names no file")));
    }
    Ok(out)
}

/// In-memory encoded frames keyed by URI. Decodes in a task on the event loop.
#[derive(Clone)]
pub struct MemoryLoader {
    files: Rc<RefCell<HashMap<String, Rc<[u8]>>>>,
    events: EventLoop,
}

impl fmt::Debug for MemoryLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryLoader")
            .field("files", &self.files.borrow().len())
            .finish()
    }
}

impl MemoryLoader {
    pub fn new(events: &EventLoop) -> Self {
        Self {
            files: Rc::new(RefCell::new(HashMap::new())),
            events: events.clone(),
        }
    }

    /// Register the encoded bytes served for `uri`.
    pub fn insert(&self, uri: impl Into<String>, bytes: impl Into<Rc<[u8]>>) {
        self.files.borrow_mut().insert(uri.into(), bytes.into());
    }

    pub fn len(&self) -> usize {
        self.files.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.borrow().is_empty()
    }
}

impl FrameLoader for MemoryLoader {
    fn request(&self, reply: DecodeReply) {
        let bytes = self.files.borrow().get(reply.uri()).cloned();
        self.events.spawn_local(move || {
            if !reply.is_live() {
                return;
            }
            let result = match bytes {
                Some(bytes) => decode_image(&bytes),
                None => Err(ReelError::decode(format!("no frame at '{}'", reply.uri()))),
            };
            reply.resolve(result);
        });
    }
}

/// Holds every reply until the caller resolves it. Lets hosts and tests control completion order.
#[derive(Clone, Default)]
pub struct ManualLoader {
    pending: Rc<RefCell<Vec<DecodeReply>>>,
}

impl fmt::Debug for ManualLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManualLoader")
            .field("pending", &self.pending_len())
            .finish()
    }
}

impl ManualLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests not yet resolved.
    pub fn pending_len(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Frame numbers awaiting a reply, in request order.
    pub fn pending_indices(&self) -> Vec<FrameIndex> {
        self.pending.borrow().iter().map(DecodeReply::index).collect()
    }

    /// Remove and return the reply for `index`.
    pub fn take(&self, index: FrameIndex) -> Option<DecodeReply> {
        let mut pending = self.pending.borrow_mut();
        let pos = pending.iter().position(|r| r.index() == index)?;
        Some(pending.remove(pos))
    }

    /// Resolve `index` with `result`. Returns `false` if nothing was pending for it.
    pub fn resolve(&self, index: FrameIndex, result: ReelResult<DecodedImage>) -> bool {
        // The borrow must end before resolving: listeners may issue new requests.
        let Some(reply) = self.take(index) else {
            return false;
        };
        reply.resolve(result);
        true
    }

    /// Resolve every pending request in request order, computing each outcome with `f`.
    pub fn resolve_all(&self, mut f: impl FnMut(FrameIndex) -> ReelResult<DecodedImage>) -> usize {
        let replies = std::mem::take(&mut *self.pending.borrow_mut());
        let n = replies.len();
        for reply in replies {
            let result = f(reply.index());
            reply.resolve(result);
        }
        n
    }

    /// Drop every pending reply unresolved.
    pub fn forget_all(&self) -> usize {
        std::mem::take(&mut *self.pending.borrow_mut()).len()
    }
}

impl FrameLoader for ManualLoader {
    fn request(&self, reply: DecodeReply) {
        self.pending.borrow_mut().push(reply);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/loader.rs"]
mod tests;
