//! Foreground-process resolution: mapping the currently-focused window to
//! the lower-cased base name of its owning executable, through a bounded
//! LRU cache keyed by PID. See spec §4.1.
//!
//! The three composed OS calls (foreground window -> owning PID -> open
//! process -> image name) are behind the [`ProcessLookup`] trait so the
//! cache and resolution logic are testable without a live window manager.

use std::collections::{HashMap, VecDeque};

/// Bounded cache capacity. On overflow, the least-recently-used half is
/// evicted in one pass (spec §3: "on overflow, the oldest half by
/// insertion order is dropped" — implemented here as LRU order, which the
/// design notes explicitly license as an equivalent bounded policy).
const CAPACITY: usize = 128;

/// Composes the platform calls needed to go from "the foreground window"
/// to "the lower-cased base name of the process that owns it". Consulted
/// only from the hook thread — no internal synchronization is needed or
/// provided.
pub trait ProcessLookup: Send {
    /// The PID owning the current foreground window, or `None` on any
    /// failure.
    fn foreground_pid(&self) -> Option<u32>;

    /// The full image path of the process `pid`, or `None` on any
    /// failure (process exited, access denied, etc).
    fn image_path(&self, pid: u32) -> Option<String>;
}

/// A [`ProcessLookup`] that never resolves anything. Used on platforms
/// with no real backend (see [`crate::platform`]).
#[derive(Debug, Default, Clone, Copy)]
pub struct NullProcessLookup;

impl ProcessLookup for NullProcessLookup {
    fn foreground_pid(&self) -> Option<u32> {
        None
    }

    fn image_path(&self, _pid: u32) -> Option<String> {
        None
    }
}

/// Lower-cases the base name (the portion after the last path separator)
/// of `path`. An empty or separator-only path yields an empty string.
fn base_name_lower(path: &str) -> String {
    path.rsplit(['\\', '/'])
        .next()
        .unwrap_or("")
        .to_lowercase()
}

/// A single-threaded-access, bounded LRU cache from PID to lower-cased
/// executable base name (including the empty string, cached on lookup
/// failure so a persistently-unresolvable PID doesn't repeat the
/// expensive OS round trip every event).
pub struct ProcessNameCache {
    entries: HashMap<u32, String>,
    /// Recency order, oldest at the front, most-recently-touched at the
    /// back.
    order: VecDeque<u32>,
}

impl ProcessNameCache {
    pub fn new() -> Self {
        ProcessNameCache {
            entries: HashMap::with_capacity(CAPACITY),
            order: VecDeque::with_capacity(CAPACITY),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn touch(&mut self, pid: u32) {
        if let Some(pos) = self.order.iter().position(|&p| p == pid) {
            self.order.remove(pos);
        }
        self.order.push_back(pid);
    }

    fn insert(&mut self, pid: u32, name: String) {
        self.entries.insert(pid, name);
        self.touch(pid);

        if self.entries.len() > CAPACITY {
            let evict_count = CAPACITY / 2;
            for _ in 0..evict_count {
                if let Some(oldest) = self.order.pop_front() {
                    self.entries.remove(&oldest);
                } else {
                    break;
                }
            }
        }
    }

    /// Resolves `pid` to a lower-cased executable base name, consulting
    /// (and populating) the cache. Any lookup failure resolves to, and
    /// caches, the empty string — never an error.
    pub fn by_pid(&mut self, lookup: &dyn ProcessLookup, pid: u32) -> String {
        if let Some(name) = self.entries.get(&pid) {
            let name = name.clone();
            self.touch(pid);
            return name;
        }

        let name = lookup
            .image_path(pid)
            .map(|p| base_name_lower(&p))
            .unwrap_or_default();

        self.insert(pid, name.clone());
        name
    }

    /// Resolves the foreground window's owning process to a lower-cased
    /// executable base name, or the empty string on any failure.
    pub fn foreground_exe(&mut self, lookup: &dyn ProcessLookup) -> String {
        match lookup.foreground_pid() {
            Some(pid) => self.by_pid(lookup, pid),
            None => String::new(),
        }
    }
}

impl Default for ProcessNameCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap as StdHashMap;

    struct FakeLookup {
        foreground: RefCell<Option<u32>>,
        images: StdHashMap<u32, String>,
    }

    impl ProcessLookup for FakeLookup {
        fn foreground_pid(&self) -> Option<u32> {
            *self.foreground.borrow()
        }

        fn image_path(&self, pid: u32) -> Option<String> {
            self.images.get(&pid).cloned()
        }
    }

    #[test]
    fn resolves_and_lowercases_base_name() {
        let mut images = StdHashMap::new();
        images.insert(42, r"C:\Program Files\Chrome\Chrome.EXE".to_string());
        let lookup = FakeLookup {
            foreground: RefCell::new(Some(42)),
            images,
        };
        let mut cache = ProcessNameCache::new();
        assert_eq!(cache.foreground_exe(&lookup), "chrome.exe");
    }

    #[test]
    fn failure_resolves_to_empty_and_is_cached() {
        let lookup = FakeLookup {
            foreground: RefCell::new(Some(7)),
            images: StdHashMap::new(),
        };
        let mut cache = ProcessNameCache::new();
        assert_eq!(cache.foreground_exe(&lookup), "");
        assert_eq!(cache.len(), 1);
        // Second call hits the cache, not `image_path` again (same result).
        assert_eq!(cache.foreground_exe(&lookup), "");
    }

    #[test]
    fn no_foreground_window_yields_empty_without_caching() {
        let lookup = FakeLookup {
            foreground: RefCell::new(None),
            images: StdHashMap::new(),
        };
        let mut cache = ProcessNameCache::new();
        assert_eq!(cache.foreground_exe(&lookup), "");
        assert!(cache.is_empty());
    }

    #[test]
    fn overflow_evicts_oldest_half() {
        let images: StdHashMap<u32, String> = (0..200)
            .map(|pid| (pid, format!("proc{pid}.exe")))
            .collect();
        let lookup = FakeLookup {
            foreground: RefCell::new(None),
            images,
        };
        let mut cache = ProcessNameCache::new();
        for pid in 0..200 {
            cache.by_pid(&lookup, pid);
        }
        assert!(cache.len() <= CAPACITY);
        // The most recently inserted entries must have survived the evict.
        assert_eq!(cache.by_pid(&lookup, 199), "proc199.exe");
    }
}
