//! Tiny persisted-preference layer. One flag lives here today (whether the
//! swipe guide was shown); the interface is injectable so components can be
//! exercised with an in-memory store.

#[cfg(target_arch = "wasm32")]
use gloo_storage::{LocalStorage, Storage};

pub const SEEN_GUIDE_KEY: &str = "reelscroll.seen_swipe_guide";

pub trait PrefStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// Browser-local storage. Reads and writes that fail (quota, privacy mode)
/// degrade to "not set".
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalPrefs;

#[cfg(target_arch = "wasm32")]
impl PrefStore for LocalPrefs {
    fn get(&self, key: &str) -> Option<String> {
        LocalStorage::get::<String>(key).ok()
    }

    fn set(&self, key: &str, value: &str) {
        let _ = LocalStorage::set(key, value.to_string());
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use memory::MemoryPrefs as LocalPrefs;

#[cfg(any(test, not(target_arch = "wasm32")))]
pub mod memory {
    use super::PrefStore;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory store for the native target and for tests.
    #[derive(Debug, Clone, Default)]
    pub struct MemoryPrefs {
        entries: RefCell<HashMap<String, String>>,
    }

    impl PrefStore for MemoryPrefs {
        fn get(&self, key: &str) -> Option<String> {
            self.entries.borrow().get(key).cloned()
        }

        fn set(&self, key: &str, value: &str) {
            self.entries
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
        }
    }
}

/// Read once at startup to decide whether the directional hint shows.
pub fn has_seen_guide(store: &dyn PrefStore) -> bool {
    store.get(SEEN_GUIDE_KEY).is_some()
}

/// Written on the first slide change of a session.
pub fn mark_guide_seen(store: &dyn PrefStore) {
    store.set(SEEN_GUIDE_KEY, "true");
}

#[cfg(test)]
mod tests {
    use super::memory::MemoryPrefs;
    use super::*;

    #[test]
    fn guide_flag_round_trip() {
        let store = MemoryPrefs::default();
        assert!(!has_seen_guide(&store));
        mark_guide_seen(&store);
        assert!(has_seen_guide(&store));
    }

    #[test]
    fn unrelated_keys_do_not_count() {
        let store = MemoryPrefs::default();
        store.set("reelscroll.other", "true");
        assert!(!has_seen_guide(&store));
    }
}
