//! Frame store - batch resolution of descriptors into drawable frames.
//!
//! **Why**: Frames cut from the same spritesheet must not decode the sheet
//! once per frame. Resolution runs front-loaded, before playback starts,
//! and deduplicates decode work through the descriptors' sharing keys.
//!
//! **Used by**: Player (`init_frames`), headless runner.
//!
//! # Caching
//!
//! The sharing-key cache is function-scoped: built fresh per `resolve` call
//! and threaded through the pass as an explicit map parameter. Nothing is
//! cached across calls, so a reloaded sequence can never see stale images.
//!
//! # Degradation
//!
//! A missing or undecodable asset resolves to a fully-transparent
//! placeholder of the descriptor's declared source dimensions. The batch
//! never aborts on one bad frame; failures are logged and playback carries
//! on.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use log::{debug, warn};
use uuid::Uuid;

use super::frame::{FrameKind, SpriteFrame};
use super::image::{ResolvedFrame, SpriteImage};

/// External asset source for frame resolution.
///
/// Implementations must be idempotent for the same sharing key within one
/// resolution pass: repeated `sheet` lookups return the same image instance.
pub trait AssetResolver {
    /// Encoded bytes backing a single-image frame.
    fn image_bytes(&self, id: Uuid) -> Option<&[u8]>;

    /// Pre-decoded spritesheet for a sharing key.
    fn sheet(&self, key: &str) -> Option<Arc<SpriteImage>>;
}

/// In-memory asset registry: encoded bytes per frame id, decoded sheets per
/// sharing key. Insertion-ordered so sequences list assets predictably.
#[derive(Debug, Default)]
pub struct SheetLibrary {
    images: IndexMap<Uuid, Vec<u8>>,
    sheets: IndexMap<String, Arc<SpriteImage>>,
}

impl SheetLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded bytes for a single-image frame.
    pub fn add_image(&mut self, id: Uuid, bytes: Vec<u8>) {
        self.images.insert(id, bytes);
    }

    /// Register a decoded spritesheet under its sharing key.
    pub fn add_sheet(&mut self, key: impl Into<String>, sheet: SpriteImage) {
        self.sheets.insert(key.into(), Arc::new(sheet));
    }

    /// Decode and register a spritesheet from encoded bytes.
    pub fn add_sheet_bytes(&mut self, key: impl Into<String>, bytes: &[u8]) -> Result<(), super::image::ImageError> {
        let sheet = SpriteImage::decode(bytes)?;
        self.add_sheet(key, sheet);
        Ok(())
    }

    pub fn sheet_keys(&self) -> impl Iterator<Item = &str> {
        self.sheets.keys().map(|k| k.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty() && self.sheets.is_empty()
    }
}

impl AssetResolver for SheetLibrary {
    fn image_bytes(&self, id: Uuid) -> Option<&[u8]> {
        self.images.get(&id).map(|v| v.as_slice())
    }

    fn sheet(&self, key: &str) -> Option<Arc<SpriteImage>> {
        self.sheets.get(key).cloned()
    }
}

/// Resolve descriptors into drawable frames.
///
/// Order-preserving: output order equals descriptor order regardless of the
/// cache hit/miss pattern.
pub fn resolve(resolver: &dyn AssetResolver, descriptors: &[SpriteFrame]) -> Vec<ResolvedFrame> {
    let mut cache: HashMap<String, Arc<SpriteImage>> = HashMap::new();

    let resolved: Vec<ResolvedFrame> = descriptors
        .iter()
        .map(|frame| ResolvedFrame {
            frame: frame.clone(),
            image: resolve_one(resolver, frame, &mut cache),
        })
        .collect();

    debug!(
        "Resolved {} frames ({} shared decode(s))",
        resolved.len(),
        cache.len()
    );
    resolved
}

/// Resolve one descriptor, consulting and feeding the pass-local cache.
fn resolve_one(
    resolver: &dyn AssetResolver,
    frame: &SpriteFrame,
    cache: &mut HashMap<String, Arc<SpriteImage>>,
) -> Arc<SpriteImage> {
    if let Some(key) = frame.sharing_key.as_deref()
        && let Some(image) = cache.get(key)
    {
        return Arc::clone(image);
    }

    let image = decode_frame(resolver, frame);

    if let Some(key) = &frame.sharing_key {
        cache.insert(key.clone(), Arc::clone(&image));
    }
    image
}

fn decode_frame(resolver: &dyn AssetResolver, frame: &SpriteFrame) -> Arc<SpriteImage> {
    match frame.kind {
        FrameKind::SingleImage => match resolver.image_bytes(frame.id) {
            Some(bytes) => match SpriteImage::decode(bytes) {
                Ok(image) => Arc::new(image),
                Err(e) => {
                    warn!("Frame {}: decode failed ({}), using placeholder", frame.id, e);
                    placeholder(frame)
                }
            },
            None => {
                warn!("Frame {}: no image bytes, using placeholder", frame.id);
                placeholder(frame)
            }
        },
        FrameKind::SpritesheetRegion => {
            let found = frame.sharing_key.as_deref().and_then(|key| resolver.sheet(key));
            match found {
                Some(sheet) => sheet,
                None => {
                    warn!(
                        "Frame {}: sheet {:?} not found, using placeholder",
                        frame.id, frame.sharing_key
                    );
                    placeholder(frame)
                }
            }
        }
    }
}

/// Transparent stand-in sized to the descriptor's declared source rect.
fn placeholder(frame: &SpriteFrame) -> Arc<SpriteImage> {
    let width = frame.source_rect.width.max(0.0) as usize;
    let height = frame.source_rect.height.max(0.0) as usize;
    Arc::new(SpriteImage::transparent(width, height))
}
