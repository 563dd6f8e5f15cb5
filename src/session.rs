use crate::config::Config;
use crate::editor::Editor;
use crate::error::Result;
use crate::parser::parse::parse_description;
use crate::store::{KeyValueStore, Library};

/// Destination for "copy" actions.
pub trait Clipboard {
    fn write_text(&mut self, text: &str);
}

/// Asks the user for replacement text. `None` means cancelled.
pub trait EditPrompt {
    fn request(&mut self, current: &str) -> Option<String>;
}

/// One description being built: raw input, its editable elements, and the
/// library that records generated and saved results.
pub struct Session<S> {
    input: String,
    editor: Editor,
    library: Library<S>,
    separator: String,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(library: Library<S>, config: &Config) -> Self {
        let mut editor = Editor::new(config.merge_highlight());
        editor.set_uppercase(config.uppercase);
        Self {
            input: String::new(),
            editor,
            library,
            separator: config.separator.clone(),
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut Editor {
        &mut self.editor
    }

    pub fn library(&self) -> &Library<S> {
        &self.library
    }

    pub fn library_mut(&mut self) -> &mut Library<S> {
        &mut self.library
    }

    /// The elements joined with the configured separator.
    pub fn export(&self) -> String {
        self.editor.export(&self.separator)
    }

    /// Parse the input into elements.
    ///
    /// Blank input does nothing. Otherwise both the raw input and the joined
    /// result are recorded in history. Returns whether anything was generated.
    ///
    /// # Errors
    ///
    /// Returns an error if recording history fails.
    pub fn generate(&mut self) -> Result<bool> {
        if self.input.trim().is_empty() {
            return Ok(false);
        }
        self.library.add_to_history(&self.input)?;

        let parsed = parse_description(&self.input);
        let elements: Vec<String> = parsed
            .elements()
            .iter()
            .map(|e| self.editor.apply_case(e))
            .collect();
        self.editor.load(elements);

        let output = self.export();
        self.library.add_to_history(&output)?;
        tracing::debug!(elements = self.editor.list().len(), "generated");
        Ok(true)
    }

    /// Save the elements, or the raw input when there are none.
    ///
    /// # Errors
    ///
    /// Returns an error if the store write fails.
    pub fn save(&mut self) -> Result<bool> {
        if !self.editor.list().is_empty() {
            let output = self.export();
            self.library.add_to_saved(&output)
        } else if !self.input.trim().is_empty() {
            let input = self.input.clone();
            self.library.add_to_saved(&input)
        } else {
            Ok(false)
        }
    }

    /// Copy the elements, or the raw input when there are none.
    pub fn copy(&self, clipboard: &mut dyn Clipboard) {
        if self.editor.list().is_empty() {
            clipboard.write_text(&self.input);
        } else {
            clipboard.write_text(&self.export());
        }
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.editor.clear();
    }

    /// Ask `prompt` for new text for the element at `index` and apply it.
    pub fn edit_with_prompt(&mut self, index: usize, prompt: &mut dyn EditPrompt) -> bool {
        let Some(current) = self.editor.list().get(index).map(|e| e.text.clone()) else {
            return false;
        };
        match prompt.request(&current) {
            Some(text) => self.editor.edit_element(index, &text),
            None => false,
        }
    }

    /// Load the library's current description into the input, if one is set.
    pub fn adopt_current(&mut self) -> bool {
        match self.library.current_description() {
            Some(text) => {
                self.input = text;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Limits, MemoryStore};

    #[derive(Default)]
    struct RecordingClipboard(Vec<String>);

    impl Clipboard for RecordingClipboard {
        fn write_text(&mut self, text: &str) {
            self.0.push(text.to_owned());
        }
    }

    struct FixedPrompt(Option<&'static str>);

    impl EditPrompt for FixedPrompt {
        fn request(&mut self, _current: &str) -> Option<String> {
            self.0.map(str::to_owned)
        }
    }

    fn session() -> Session<MemoryStore> {
        let library = Library::open(MemoryStore::new(), Limits::default());
        Session::new(library, &Config::default())
    }

    #[test]
    fn generate_builds_elements_and_records_history() {
        let mut s = session();
        s.set_input("1/2\" pin STAINLESS STEEL");
        assert!(s.generate().unwrap());
        assert_eq!(s.export(), "PIN, 1/2 IN., STAINLESS STEEL");
        let texts: Vec<_> = s.library().history().iter().map(|h| h.text.clone()).collect();
        assert_eq!(
            texts,
            vec!["PIN, 1/2 IN., STAINLESS STEEL", "1/2\" pin STAINLESS STEEL"]
        );
    }

    #[test]
    fn generate_blank_input_is_noop() {
        let mut s = session();
        s.set_input("   ");
        assert!(!s.generate().unwrap());
        assert!(s.library().history().is_empty());
    }

    #[test]
    fn generate_applies_uppercase_toggle() {
        let mut s = session();
        s.editor_mut().set_uppercase(true);
        s.set_input("hex bolt");
        s.generate().unwrap();
        assert_eq!(s.export(), "BOLT, HEX");
    }

    #[test]
    fn save_prefers_elements_over_input() {
        let mut s = session();
        s.set_input("nut BRASS");
        s.generate().unwrap();
        assert!(s.save().unwrap());
        assert_eq!(s.library().saved()[0].text, "NUT, BRASS");
    }

    #[test]
    fn save_falls_back_to_input() {
        let mut s = session();
        s.set_input("raw text");
        assert!(s.save().unwrap());
        assert_eq!(s.library().saved()[0].text, "raw text");
    }

    #[test]
    fn save_with_nothing_is_noop() {
        let mut s = session();
        assert!(!s.save().unwrap());
    }

    #[test]
    fn copy_writes_elements_or_input() {
        let mut s = session();
        let mut clip = RecordingClipboard::default();
        s.set_input("washer");
        s.copy(&mut clip);
        s.generate().unwrap();
        s.copy(&mut clip);
        assert_eq!(clip.0, vec!["washer", "WASHER"]);
    }

    #[test]
    fn clear_empties_input_and_elements() {
        let mut s = session();
        s.set_input("pin");
        s.generate().unwrap();
        s.clear();
        assert_eq!(s.input(), "");
        assert!(s.editor().list().is_empty());
    }

    #[test]
    fn edit_with_prompt_applies_or_cancels() {
        let mut s = session();
        s.set_input("pin BRASS");
        s.generate().unwrap();
        assert!(!s.edit_with_prompt(0, &mut FixedPrompt(None)));
        assert_eq!(s.export(), "PIN, BRASS");
        assert!(s.edit_with_prompt(0, &mut FixedPrompt(Some("dowel pin"))));
        assert_eq!(s.export(), "dowel pin, BRASS");
        assert!(!s.edit_with_prompt(9, &mut FixedPrompt(Some("x"))));
    }

    #[test]
    fn adopt_current_loads_reused_text() {
        let mut s = session();
        assert!(!s.adopt_current());
        s.library_mut().reuse("BOLT, BRASS").unwrap();
        assert!(s.adopt_current());
        assert_eq!(s.input(), "BOLT, BRASS");
    }
}
