use std::time::{Duration, Instant};

use serde::Serialize;

use crate::editor::highlight::MergeHighlight;
use crate::editor::list::{ElementKey, ElementList};

/// Where a drag gesture currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DragPhase {
    #[default]
    Idle,
    /// Dragging with no usable target underneath.
    Dragging { active: ElementKey },
    /// Hovering a neighbor: dropping here merges.
    OverAdjacent {
        active: ElementKey,
        over: ElementKey,
    },
    /// Hovering a non-neighbor: dropping here only reorders.
    OverNonAdjacent {
        active: ElementKey,
        over: ElementKey,
    },
}

impl DragPhase {
    /// The element being dragged, if any.
    pub fn dragged(&self) -> Option<ElementKey> {
        match *self {
            Self::Idle => None,
            Self::Dragging { active }
            | Self::OverAdjacent { active, .. }
            | Self::OverNonAdjacent { active, .. } => Some(active),
        }
    }

    /// The `(active, over)` pair eligible for merge, if any.
    pub fn merge_candidate(&self) -> Option<(ElementKey, ElementKey)> {
        match *self {
            Self::OverAdjacent { active, over } => Some((active, over)),
            _ => None,
        }
    }
}

/// What a drop did to the list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// No target, self target, or a stale key: nothing changed.
    Cancelled,
    /// Two neighbors became one element.
    Merged { key: ElementKey, text: String },
    /// The dragged element moved from one index to another.
    Moved { from: usize, to: usize },
}

/// Interactive editor over an [`ElementList`].
///
/// Drives the reorder/merge state machine from drag events and applies the
/// explicit commands (combine, edit, delete). All operations are total:
/// an invalid target or index leaves the list untouched.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    list: ElementList,
    phase: DragPhase,
    highlight: MergeHighlight,
    uppercase: bool,
}

impl Editor {
    pub fn new(highlight_window: Duration) -> Self {
        Self {
            highlight: MergeHighlight::new(highlight_window),
            ..Self::default()
        }
    }

    pub fn list(&self) -> &ElementList {
        &self.list
    }

    pub fn phase(&self) -> DragPhase {
        self.phase
    }

    pub fn uppercase(&self) -> bool {
        self.uppercase
    }

    /// Set the uppercase toggle. Existing elements are not rewritten.
    pub fn set_uppercase(&mut self, on: bool) {
        self.uppercase = on;
    }

    pub fn toggle_uppercase(&mut self) -> bool {
        self.uppercase = !self.uppercase;
        self.uppercase
    }

    /// Apply the uppercase toggle to `text`.
    pub fn apply_case(&self, text: &str) -> String {
        if self.uppercase {
            text.to_uppercase()
        } else {
            text.to_owned()
        }
    }

    /// Replace the whole list, resetting gesture and highlight state. Keys
    /// keep counting up, so keys from the previous contents never resolve.
    pub fn load<I, S>(&mut self, texts: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list.clear();
        for text in texts {
            self.list.push(text);
        }
        self.phase = DragPhase::Idle;
        self.highlight.cancel();
    }

    /// Empty the list and drop any pending highlight clear.
    pub fn clear(&mut self) {
        self.list.clear();
        self.phase = DragPhase::Idle;
        self.highlight.cancel();
    }

    /// Serialized form of the list.
    pub fn export(&self, separator: &str) -> String {
        self.list.join(separator)
    }

    // ── Drag gestures ─────────────────────────────────────────

    pub fn start_drag(&mut self, active: ElementKey) {
        self.phase = DragPhase::Dragging { active };
        self.highlight.cancel();
        tracing::debug!(%active, "drag started");
    }

    pub fn drag_over(&mut self, active: ElementKey, target: Option<ElementKey>) {
        self.phase = match target {
            Some(over) if over != active => match self.indices(active, over) {
                Some((a, o)) if a.abs_diff(o) == 1 => DragPhase::OverAdjacent { active, over },
                Some(_) => DragPhase::OverNonAdjacent { active, over },
                None => DragPhase::Dragging { active },
            },
            _ => DragPhase::Dragging { active },
        };
        tracing::trace!(phase = ?self.phase, "drag over");
    }

    /// Finish a drag gesture.
    ///
    /// Merges when `active` and `target` are neighbors and the last
    /// [`drag_over`](Self::drag_over) flagged a merge candidate; otherwise
    /// moves `active` to the target's index. Always returns to idle.
    pub fn drop(&mut self, active: ElementKey, target: Option<ElementKey>) -> DropOutcome {
        self.drop_at(active, target, Instant::now())
    }

    /// [`drop`](Self::drop) with an explicit clock for the merge highlight.
    pub fn drop_at(
        &mut self,
        active: ElementKey,
        target: Option<ElementKey>,
        now: Instant,
    ) -> DropOutcome {
        let had_candidate = self.phase.merge_candidate().is_some();
        self.phase = DragPhase::Idle;

        let Some(over) = target.filter(|&t| t != active) else {
            tracing::debug!(%active, "drop without target");
            return DropOutcome::Cancelled;
        };
        let Some((from, to)) = self.indices(active, over) else {
            tracing::debug!(%active, %over, "drop on stale element");
            return DropOutcome::Cancelled;
        };

        if from.abs_diff(to) == 1 && had_candidate {
            let lower = from.min(to);
            return match self.merge_at(lower, now) {
                Some((key, text)) => {
                    tracing::debug!(%key, text = %text, "merged by drop");
                    DropOutcome::Merged { key, text }
                }
                None => DropOutcome::Cancelled,
            };
        }

        self.list.move_element(from, to);
        tracing::debug!(%active, from, to, "moved by drop");
        DropOutcome::Moved { from, to }
    }

    // ── Explicit commands ─────────────────────────────────────

    /// Merge the element at `index` with its successor. No-op at the last index.
    pub fn combine_with_next(&mut self, index: usize) -> Option<ElementKey> {
        self.combine_with_next_at(index, Instant::now())
    }

    pub fn combine_with_next_at(&mut self, index: usize, now: Instant) -> Option<ElementKey> {
        let (key, text) = self.merge_at(index, now)?;
        tracing::debug!(%key, index, text = %text, "combined with next");
        Some(key)
    }

    /// Replace the text at `index`, applying the uppercase toggle.
    pub fn edit_element(&mut self, index: usize, text: &str) -> bool {
        let text = self.apply_case(text);
        let changed = self.list.set_text(index, text);
        if changed {
            tracing::debug!(index, "element edited");
        }
        changed
    }

    pub fn delete_element(&mut self, index: usize) -> bool {
        let removed = self.list.remove(index);
        if let Some(element) = &removed {
            if self.highlight.is_marked(element.key) {
                self.highlight.cancel();
            }
            tracing::debug!(index, key = %element.key, "element deleted");
        }
        removed.is_some()
    }

    // ── Transient display state ───────────────────────────────

    /// Text of the element still flagged as just merged.
    pub fn recently_merged(&self) -> Option<&str> {
        self.highlight.key().and_then(|key| self.list.text_of(key))
    }

    pub fn is_recently_merged(&self, key: ElementKey) -> bool {
        self.highlight.is_marked(key)
    }

    pub fn is_dragging(&self, key: ElementKey) -> bool {
        self.phase.dragged() == Some(key)
    }

    /// Whether `key` is half of the current merge candidate.
    pub fn is_overlapping(&self, key: ElementKey) -> bool {
        self.phase
            .merge_candidate()
            .is_some_and(|(active, over)| active == key || over == key)
    }

    /// Run the pending highlight clear if it is due.
    pub fn tick(&mut self, now: Instant) {
        if self.highlight.expire(now) {
            tracing::trace!("merge highlight cleared");
        }
    }

    fn indices(&self, active: ElementKey, over: ElementKey) -> Option<(usize, usize)> {
        Some((self.list.position(active)?, self.list.position(over)?))
    }

    fn merge_at(&mut self, index: usize, now: Instant) -> Option<(ElementKey, String)> {
        let key = self.list.merge_with_next(index)?;
        self.highlight.mark(key, now);
        let text = self.list.text_of(key).unwrap_or_default().to_owned();
        Some((key, text))
    }
}
