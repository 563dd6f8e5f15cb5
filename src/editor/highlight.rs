use std::time::{Duration, Instant};

use crate::editor::list::ElementKey;

/// Default time a freshly merged element stays highlighted.
pub const DEFAULT_MERGE_HIGHLIGHT: Duration = Duration::from_millis(1000);

/// The "recently merged" flag with its pending clear.
///
/// The clear is a deadline owned by this value rather than a detached timer:
/// marking a newer merge replaces the deadline, and [`cancel`](Self::cancel)
/// drops it, so an older clear can never wipe a newer highlight.
#[derive(Debug, Clone)]
pub struct MergeHighlight {
    window: Duration,
    pending: Option<(ElementKey, Instant)>,
}

impl MergeHighlight {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Highlight `key` until `now + window`, replacing any earlier highlight.
    pub fn mark(&mut self, key: ElementKey, now: Instant) {
        self.pending = Some((key, now + self.window));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Clear the highlight if its deadline has passed. Returns `true` if it was cleared.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.pending {
            Some((_, deadline)) if now >= deadline => {
                self.pending = None;
                true
            }
            _ => false,
        }
    }

    pub fn key(&self) -> Option<ElementKey> {
        self.pending.map(|(key, _)| key)
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|(_, deadline)| deadline)
    }

    pub fn is_marked(&self, key: ElementKey) -> bool {
        self.key() == Some(key)
    }
}

impl Default for MergeHighlight {
    fn default() -> Self {
        Self::new(DEFAULT_MERGE_HIGHLIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_then_expire_after_window() {
        let mut hl = MergeHighlight::default();
        let t0 = Instant::now();
        hl.mark(ElementKey(3), t0);
        assert!(hl.is_marked(ElementKey(3)));
        assert!(!hl.expire(t0 + Duration::from_millis(999)));
        assert!(hl.expire(t0 + Duration::from_millis(1000)));
        assert_eq!(hl.key(), None);
    }

    #[test]
    fn newer_mark_restarts_deadline() {
        let mut hl = MergeHighlight::default();
        let t0 = Instant::now();
        hl.mark(ElementKey(1), t0);
        hl.mark(ElementKey(2), t0 + Duration::from_millis(800));
        // The first deadline has passed, but the newer highlight survives it.
        assert!(!hl.expire(t0 + Duration::from_millis(1200)));
        assert!(hl.is_marked(ElementKey(2)));
        assert!(hl.expire(t0 + Duration::from_millis(1800)));
    }

    #[test]
    fn cancel_drops_pending_clear() {
        let mut hl = MergeHighlight::new(Duration::from_millis(50));
        let t0 = Instant::now();
        hl.mark(ElementKey(1), t0);
        hl.cancel();
        assert_eq!(hl.deadline(), None);
        assert!(!hl.expire(t0 + Duration::from_secs(1)));
    }
}
