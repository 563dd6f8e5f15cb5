use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::editor::controller::Editor;
use crate::editor::list::ElementKey;
use crate::error::{DescError, Result};

/// One recorded editor event. Elements are addressed by their position at
/// the moment the event is applied.
///
/// ```yaml
/// - op: start
///   at: 0
/// - op: over
///   at: 1
/// - op: drop
///   at: 1
/// - op: edit
///   at: 0
///   text: hex bolt
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptEvent {
    Start { at: usize },
    Over { at: Option<usize> },
    Drop { at: Option<usize> },
    Combine { at: usize },
    Edit { at: usize, text: String },
    Delete { at: usize },
    Uppercase { on: bool },
    /// Advance the script clock.
    Wait { ms: u64 },
}

/// Final state after a script has run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptReport {
    pub elements: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recently_merged: Option<String>,
}

/// Parse a YAML list of [`ScriptEvent`]s.
///
/// # Errors
///
/// Returns [`DescError::Yaml`] if the document is not a valid event list.
pub fn parse_script(yaml: &str) -> Result<Vec<ScriptEvent>> {
    if yaml.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_yaml::from_str(yaml)?)
}

/// Replays events against an [`Editor`] on a virtual clock.
pub struct ScriptRunner<'a> {
    editor: &'a mut Editor,
    active: Option<ElementKey>,
    now: Instant,
}

impl<'a> ScriptRunner<'a> {
    pub fn new(editor: &'a mut Editor) -> Self {
        Self {
            editor,
            active: None,
            now: Instant::now(),
        }
    }

    /// Apply every event in order, then report the list.
    ///
    /// # Errors
    ///
    /// Returns [`DescError::Script`] for `over`/`drop` without a preceding
    /// `start`, and for explicit commands addressing a missing element.
    pub fn run(mut self, events: &[ScriptEvent]) -> Result<ScriptReport> {
        for (i, event) in events.iter().enumerate() {
            self.apply(event).map_err(|message| DescError::Script {
                step: i + 1,
                message,
            })?;
            self.editor.tick(self.now);
        }
        Ok(ScriptReport {
            elements: self.editor.list().texts(),
            recently_merged: self.editor.recently_merged().map(str::to_owned),
        })
    }

    fn apply(&mut self, event: &ScriptEvent) -> std::result::Result<(), String> {
        let len = self.editor.list().len();
        let missing = |at: usize| format!("no element at position {at} (list has {len})");

        match event {
            ScriptEvent::Start { at } => {
                let key = self.editor.list().key_at(*at).ok_or_else(|| missing(*at))?;
                self.active = Some(key);
                self.editor.start_drag(key);
            }
            ScriptEvent::Over { at } => {
                let active = self.active.ok_or("over without start")?;
                let target = at.and_then(|i| self.editor.list().key_at(i));
                self.editor.drag_over(active, target);
            }
            ScriptEvent::Drop { at } => {
                let active = self.active.take().ok_or("drop without start")?;
                let target = at.and_then(|i| self.editor.list().key_at(i));
                self.editor.drop_at(active, target, self.now);
            }
            ScriptEvent::Combine { at } => {
                if *at >= len {
                    return Err(missing(*at));
                }
                self.editor.combine_with_next_at(*at, self.now);
            }
            ScriptEvent::Edit { at, text } => {
                if !self.editor.edit_element(*at, text) {
                    return Err(missing(*at));
                }
            }
            ScriptEvent::Delete { at } => {
                if !self.editor.delete_element(*at) {
                    return Err(missing(*at));
                }
            }
            ScriptEvent::Uppercase { on } => self.editor.set_uppercase(*on),
            ScriptEvent::Wait { ms } => self.now += Duration::from_millis(*ms),
        }
        Ok(())
    }
}
