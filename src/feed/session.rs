use crate::api::FeedItem;
use crate::feed::wheel::Step;

/// Once this many ids have been remembered the whole history is dropped, not
/// evicted item by item. Repeats after a reset are an accepted trade-off.
pub const HISTORY_CAP: usize = 100;

/// Result of an active-index move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlideChange {
    pub active: usize,
    /// The new active index is the last loaded slide; time to fetch more.
    pub reached_tail: bool,
}

/// Ordered feed state for one scroll session: the append-only item sequence,
/// the recently-shown id history the catalog uses for dedup, and the active
/// index. Fetching itself happens outside; this type only hands out the
/// exclude-id snapshot and takes the result back, guarding against
/// overlapping loads triggered by rapid slide changes.
#[derive(Debug, Clone, Default)]
pub struct FeedSession {
    items: Vec<FeedItem>,
    recent_ids: Vec<String>,
    active: usize,
    /// True until the first page (success or failure) completes. Gates the
    /// initial render behind a spinner.
    loading: bool,
    in_flight: bool,
}

impl FeedSession {
    pub fn new() -> Self {
        Self {
            loading: true,
            ..Self::default()
        }
    }

    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn active_item(&self) -> Option<&FeedItem> {
        self.items.get(self.active)
    }

    pub fn tail_index(&self) -> Option<usize> {
        self.items.len().checked_sub(1)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[cfg(test)]
    fn history_len(&self) -> usize {
        self.recent_ids.len()
    }

    /// Start a load if none is in flight. Returns the ids to exclude, after
    /// resetting the history once it has hit the cap.
    pub fn begin_load(&mut self) -> Option<Vec<String>> {
        if self.in_flight {
            return None;
        }
        if self.recent_ids.len() >= HISTORY_CAP {
            self.recent_ids.clear();
        }
        self.in_flight = true;
        Some(self.recent_ids.clone())
    }

    /// Append a fetched page in the order the catalog returned it and merge
    /// its ids into the history. Also called with an empty page on recovered
    /// failures, which simply releases the guard.
    pub fn complete_load(&mut self, page: Vec<FeedItem>) {
        self.in_flight = false;
        self.loading = false;
        self.recent_ids
            .extend(page.iter().map(|item| item.id.clone()));
        self.items.extend(page);
    }

    /// A failed fetch keeps everything we already have.
    pub fn fail_load(&mut self) {
        self.in_flight = false;
        self.loading = false;
    }

    /// Move one slide in the given direction, clamped at both ends.
    pub fn step(&mut self, step: Step) -> Option<SlideChange> {
        let target = match step {
            Step::Advance => self.active.saturating_add(1),
            Step::Retreat => self.active.saturating_sub(1),
        };
        self.set_active(target)
    }

    /// Jump to an index (clamped). Returns `None` when nothing moved.
    pub fn set_active(&mut self, index: usize) -> Option<SlideChange> {
        let last = self.tail_index()?;
        let clamped = index.min(last);
        if clamped == self.active {
            return None;
        }
        self.active = clamped;
        Some(SlideChange {
            active: clamped,
            reached_tail: clamped == last,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> FeedItem {
        FeedItem {
            id: id.to_string(),
            url: format!("https://cdn.test/{id}.m3u8"),
            ..FeedItem::default()
        }
    }

    fn page(ids: &[&str]) -> Vec<FeedItem> {
        ids.iter().map(|id| item(id)).collect()
    }

    #[test]
    fn loads_append_in_returned_order_and_never_shrink() {
        let mut session = FeedSession::new();
        let exclude = session.begin_load().unwrap();
        assert!(exclude.is_empty());
        session.complete_load(page(&["a", "b"]));
        assert_eq!(session.len(), 2);

        session.begin_load().unwrap();
        session.complete_load(page(&["c"]));
        let ids: Vec<_> = session.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn overlapping_loads_are_guarded() {
        let mut session = FeedSession::new();
        assert!(session.begin_load().is_some());
        assert!(session.begin_load().is_none());
        session.complete_load(page(&["a"]));
        assert!(session.begin_load().is_some());
    }

    #[test]
    fn reaching_tail_reports_exclude_ids_for_everything_shown() {
        let mut session = FeedSession::new();
        session.begin_load().unwrap();
        let initial = page(&["v0", "v1", "v2", "v3"]);
        let n = initial.len();
        session.complete_load(initial);

        // Scroll 0 -> n-1; only the last step reports the tail.
        let mut tail_hits = 0;
        for idx in 1..n {
            let change = session.set_active(idx).unwrap();
            if change.reached_tail {
                tail_hits += 1;
            }
        }
        assert_eq!(tail_hits, 1);

        let exclude = session.begin_load().unwrap();
        assert_eq!(exclude, vec!["v0", "v1", "v2", "v3"]);
    }

    #[test]
    fn history_resets_entirely_at_cap() {
        let mut session = FeedSession::new();
        session.begin_load().unwrap();
        let ids: Vec<String> = (0..HISTORY_CAP).map(|i| format!("v{i}")).collect();
        let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
        session.complete_load(page(&refs));
        assert_eq!(session.history_len(), HISTORY_CAP);

        // Cap reached: the next load starts from an empty history, not a
        // trimmed one.
        let exclude = session.begin_load().unwrap();
        assert!(exclude.is_empty());
        assert_eq!(session.history_len(), 0);
        session.complete_load(page(&["again"]));
        assert_eq!(session.history_len(), 1);
        assert_eq!(session.len(), HISTORY_CAP + 1);
    }

    #[test]
    fn failed_fetch_keeps_items_and_releases_guard() {
        let mut session = FeedSession::new();
        session.begin_load().unwrap();
        session.complete_load(page(&["a", "b"]));

        session.begin_load().unwrap();
        session.fail_load();
        assert_eq!(session.len(), 2);
        assert!(!session.is_loading());
        assert!(session.begin_load().is_some());
    }

    #[test]
    fn loading_gate_clears_on_first_completion_even_on_failure() {
        let mut session = FeedSession::new();
        assert!(session.is_loading());
        session.begin_load().unwrap();
        session.fail_load();
        assert!(!session.is_loading());
    }

    #[test]
    fn active_index_clamps_and_stays_valid() {
        let mut session = FeedSession::new();
        assert!(session.set_active(3).is_none());
        assert!(session.step(Step::Advance).is_none());

        session.begin_load().unwrap();
        session.complete_load(page(&["a", "b", "c"]));

        assert!(session.step(Step::Retreat).is_none());
        let change = session.set_active(99).unwrap();
        assert_eq!(change.active, 2);
        assert!(change.reached_tail);
        assert!(session.step(Step::Advance).is_none());
        assert_eq!(session.active(), 2);
    }

    #[tokio::test]
    async fn stale_page_still_appends_after_further_slide_changes() {
        let mut session = FeedSession::new();
        session.begin_load().unwrap();
        session.complete_load(page(&["a", "b"]));

        // Tail load starts, then the user keeps scrolling before it lands.
        let exclude = session.begin_load().unwrap();
        session.set_active(1);
        session.set_active(0);

        let late = async move { page(&["c"]) }.await;
        session.complete_load(late);
        assert_eq!(exclude, vec!["a", "b"]);
        let ids: Vec<_> = session.items().iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
        assert_eq!(session.active(), 0);
    }
}
