use serde::Serialize;

/// Stable identity of an element within one [`ElementList`].
///
/// Keys are never reused by the list that issued them, so gestures stay
/// unambiguous when two elements carry the same text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ElementKey(pub u64);

impl std::fmt::Display for ElementKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One labeled segment of a description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Element {
    pub key: ElementKey,
    pub text: String,
}

/// Ordered elements of a description. Order is the export order.
#[derive(Debug, Clone, Default)]
pub struct ElementList {
    entries: Vec<Element>,
    next_key: u64,
}

impl ElementList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from texts, issuing fresh keys in order.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::new();
        for text in texts {
            list.push(text);
        }
        list
    }

    fn issue_key(&mut self) -> ElementKey {
        let key = ElementKey(self.next_key);
        self.next_key += 1;
        key
    }

    /// Append an element and return its key.
    pub fn push(&mut self, text: impl Into<String>) -> ElementKey {
        let key = self.issue_key();
        self.entries.push(Element {
            key,
            text: text.into(),
        });
        key
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn elements(&self) -> &[Element] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&Element> {
        self.entries.get(index)
    }

    /// Current position of the element with `key`.
    pub fn position(&self, key: ElementKey) -> Option<usize> {
        self.entries.iter().position(|e| e.key == key)
    }

    /// Key of the first element whose text equals `text`.
    pub fn find_text(&self, text: &str) -> Option<ElementKey> {
        self.entries.iter().find(|e| e.text == text).map(|e| e.key)
    }

    pub fn key_at(&self, index: usize) -> Option<ElementKey> {
        self.entries.get(index).map(|e| e.key)
    }

    pub fn text_of(&self, key: ElementKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.text.as_str())
    }

    pub fn texts(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.text.clone()).collect()
    }

    /// Serialized form: texts joined with `separator`.
    pub fn join(&self, separator: &str) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Replace the text at `index`, keeping its key. Returns `false` if out of range.
    pub fn set_text(&mut self, index: usize, text: String) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                entry.text = text;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, index: usize) -> Option<Element> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    /// Move the element at `from` so it ends up at `to`.
    ///
    /// The element is removed first and `to` is applied to the shortened
    /// list (clamped to its end).
    pub fn move_element(&mut self, from: usize, to: usize) -> bool {
        let Some(entry) = self.remove(from) else {
            return false;
        };
        let to = to.min(self.entries.len());
        self.entries.insert(to, entry);
        true
    }

    /// Replace the elements at `index` and `index + 1` with one element whose
    /// text is theirs joined by a space. Returns the new element's key.
    pub fn merge_with_next(&mut self, index: usize) -> Option<ElementKey> {
        if index + 1 >= self.entries.len() {
            return None;
        }
        let second = self.entries.remove(index + 1);
        let first = self.entries.remove(index);
        let key = self.issue_key();
        self.entries.insert(
            index,
            Element {
                key,
                text: format!("{} {}", first.text, second.text),
            },
        );
        Some(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
