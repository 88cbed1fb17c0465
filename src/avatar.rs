use std::collections::{HashMap, VecDeque};

use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use macroquad::experimental::coroutines::{start_coroutine, Coroutine};
use macroquad::logging::warn;
use macroquad::prelude::{load_file, FilterMode, Image, Texture2D};

use crate::protocol::{AvatarPayload, Facing};

/// Decoded frame set for one avatar. Slots are pre-sized from the declared
/// source count; a slot stays `None` when its image failed to decode. The
/// avatar is drawable only once every declared source has settled, success
/// or failure, so a bad frame can never hang the readiness gate.
pub struct AvatarFrames {
    remaining: usize,
    dirs: HashMap<Facing, Vec<Option<Texture2D>>>,
}

impl AvatarFrames {
    pub fn ready(&self) -> bool {
        self.remaining == 0
    }
}

/// Clamped frame lookup: requests past the end of an N-frame sequence
/// resolve to N-1; an empty sequence has no frame at all.
fn frame_index(index: usize, len: usize) -> Option<usize> {
    let last = len.checked_sub(1)?;
    Some(index.min(last))
}

struct SourceSlot {
    avatar: String,
    facing: Facing,
    index: usize,
}

struct PendingSource {
    slot: SourceSlot,
    src: String,
}

struct ActiveFetch {
    slot: SourceSlot,
    fetch: Coroutine<Result<Vec<u8>, macroquad::Error>>,
}

/// Lazily-populated avatar name → frame set cache. Definitions register once
/// per distinct name and are never dropped; their frames fill in as sources
/// settle through `poll`.
pub struct AvatarStore {
    avatars: HashMap<String, AvatarFrames>,
    pending: VecDeque<PendingSource>,
    active: Vec<ActiveFetch>,
}

impl AvatarStore {
    pub fn new() -> Self {
        AvatarStore {
            avatars: HashMap::new(),
            pending: VecDeque::new(),
            active: Vec::new(),
        }
    }

    /// Register an avatar definition and queue its frame sources for
    /// loading. Already-known names are skipped. `priority` puts the sources
    /// at the head of the queue (used for the local player's own avatar).
    pub fn register(&mut self, name: &str, payload: &AvatarPayload, priority: bool) {
        if name.is_empty() || self.avatars.contains_key(name) {
            return;
        }

        let mut dirs = HashMap::new();
        let mut queued = Vec::new();
        for (&facing, sources) in &payload.frames {
            if sources.is_empty() {
                continue;
            }
            dirs.insert(facing, vec![None; sources.len()]);
            for (index, src) in sources.iter().enumerate() {
                queued.push(PendingSource {
                    slot: SourceSlot {
                        avatar: name.to_string(),
                        facing,
                        index,
                    },
                    src: src.clone(),
                });
            }
        }

        // Zero declared sources: ready immediately with empty sequences.
        self.avatars.insert(
            name.to_string(),
            AvatarFrames {
                remaining: queued.len(),
                dirs,
            },
        );
        if priority {
            for p in queued.into_iter().rev() {
                self.pending.push_front(p);
            }
        } else {
            self.pending.extend(queued);
        }
    }

    /// Drive loading: decode inline `data:` sources, start fetches for the
    /// rest, and settle any fetch that completed since last frame. Called
    /// once per frame from the update path so every mutation of frame state
    /// happens here rather than in scattered callbacks.
    pub fn poll(&mut self) {
        while let Some(p) = self.pending.pop_front() {
            match data_url_payload(&p.src) {
                Some(encoded) => {
                    let tex = match BASE64_STANDARD.decode(encoded) {
                        Ok(bytes) => decode_texture(&bytes),
                        Err(err) => {
                            warn!("bad base64 in avatar frame source: {}", err);
                            None
                        }
                    };
                    self.settle(&p.slot, tex);
                }
                None => {
                    let src = p.src.clone();
                    self.active.push(ActiveFetch {
                        slot: p.slot,
                        fetch: start_coroutine(async move { load_file(&src).await }),
                    });
                }
            }
        }

        for i in (0..self.active.len()).rev() {
            if let Some(result) = self.active[i].fetch.retrieve() {
                let done = self.active.swap_remove(i);
                let tex = match result {
                    Ok(bytes) => decode_texture(&bytes),
                    Err(err) => {
                        warn!("avatar frame fetch failed: {:?}", err);
                        None
                    }
                };
                self.settle(&done.slot, tex);
            }
        }
    }

    /// Single settle path for every source, loaded or failed. Each source
    /// settles exactly once; readiness is the counter reaching zero.
    fn settle(&mut self, slot: &SourceSlot, tex: Option<Texture2D>) {
        let Some(frames) = self.avatars.get_mut(&slot.avatar) else {
            return;
        };
        if let Some(seq) = frames.dirs.get_mut(&slot.facing) {
            if let Some(entry) = seq.get_mut(slot.index) {
                *entry = tex;
            }
        }
        frames.remaining = frames.remaining.saturating_sub(1);
    }

    /// Resolve the drawable frame for (avatar, facing, animation index).
    /// `None` means the placeholder square path: unknown avatar, frames not
    /// yet settled, no sequence for this facing, or a failed slot.
    pub fn frame(&self, avatar: &str, facing: Facing, index: usize) -> Option<&Texture2D> {
        let def = self.avatars.get(avatar)?;
        if !def.ready() {
            return None;
        }
        let seq = def.dirs.get(&facing)?;
        seq[frame_index(index, seq.len())?].as_ref()
    }

    pub fn is_ready(&self, avatar: &str) -> bool {
        self.avatars.get(avatar).is_some_and(|a| a.ready())
    }
}

/// Extract the base64 payload of a `data:` URL source, if it is one.
fn data_url_payload(src: &str) -> Option<&str> {
    if !src.starts_with("data:") {
        return None;
    }
    src.split_once(";base64,").map(|(_, rest)| rest)
}

fn decode_texture(bytes: &[u8]) -> Option<Texture2D> {
    match Image::from_file_with_format(bytes, None) {
        Ok(img) => {
            let tex = Texture2D::from_image(&img);
            tex.set_filter(FilterMode::Nearest);
            Some(tex)
        }
        Err(err) => {
            warn!("avatar frame image decode failed: {:?}", err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(facing: Facing, sources: &[&str]) -> AvatarPayload {
        let mut frames = HashMap::new();
        frames.insert(facing, sources.iter().map(|s| s.to_string()).collect());
        AvatarPayload {
            name: String::new(),
            frames,
        }
    }

    #[test]
    fn test_zero_sources_ready_immediately() {
        let mut store = AvatarStore::new();
        store.register("ghost", &AvatarPayload::default(), false);
        assert!(store.is_ready("ghost"));
        assert!(store.frame("ghost", Facing::South, 0).is_none());
    }

    #[test]
    fn test_all_failures_still_reach_ready() {
        let mut store = AvatarStore::new();
        store.register("knight", &payload(Facing::South, &["a", "b", "c"]), false);
        assert!(!store.is_ready("knight"));

        // Settle every source as a failure; the gate must not hang.
        for index in 0..3 {
            let slot = SourceSlot {
                avatar: "knight".to_string(),
                facing: Facing::South,
                index,
            };
            store.settle(&slot, None);
        }
        assert!(store.is_ready("knight"));
        // Ready, but every slot failed: still the placeholder path.
        assert!(store.frame("knight", Facing::South, 0).is_none());
    }

    #[test]
    fn test_register_is_once_per_name() {
        let mut store = AvatarStore::new();
        store.register("knight", &payload(Facing::South, &["a"]), false);
        assert_eq!(store.pending.len(), 1);
        store.register("knight", &payload(Facing::South, &["x", "y"]), false);
        assert_eq!(store.pending.len(), 1);
    }

    #[test]
    fn test_priority_sources_load_first() {
        let mut store = AvatarStore::new();
        store.register("other", &payload(Facing::South, &["o1", "o2"]), false);
        store.register("mine", &payload(Facing::South, &["m1", "m2"]), true);
        let order: Vec<&str> = store.pending.iter().map(|p| p.src.as_str()).collect();
        assert_eq!(order, vec!["m1", "m2", "o1", "o2"]);
    }

    #[test]
    fn test_frame_index_clamps_to_last() {
        assert_eq!(frame_index(0, 3), Some(0));
        assert_eq!(frame_index(2, 3), Some(2));
        assert_eq!(frame_index(7, 3), Some(2));
        assert_eq!(frame_index(0, 0), None);
    }

    #[test]
    fn test_missing_facing_has_no_frame() {
        let mut store = AvatarStore::new();
        store.register("knight", &payload(Facing::South, &["a"]), false);
        let slot = SourceSlot {
            avatar: "knight".to_string(),
            facing: Facing::South,
            index: 0,
        };
        store.settle(&slot, None);
        assert!(store.is_ready("knight"));
        // No west frames were ever declared.
        assert!(store.frame("knight", Facing::West, 0).is_none());
    }

    #[test]
    fn test_data_url_payload_extraction() {
        assert_eq!(
            data_url_payload("data:image/png;base64,AAAA"),
            Some("AAAA")
        );
        assert_eq!(data_url_payload("assets/knight_s0.png"), None);
        assert_eq!(data_url_payload("data:image/png,rawdata"), None);
    }
}
