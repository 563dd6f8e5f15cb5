use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::editor::script::{ScriptRunner, parse_script};
use crate::error::{DescError, Result};
use crate::parser::parse::{ParsedDescription, parse_description};
use crate::session::Session;
use crate::store::collection::CollectionItem;
use crate::store::{JsonFileStore, Library};

/// Options shared by every command that touches the store.
#[derive(Debug, Clone, Default)]
pub struct Options {
    pub store: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub uppercase: bool,
}

impl Options {
    /// Resolve the effective configuration: file values, then flag overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a given config file cannot be loaded.
    pub fn resolve(&self) -> Result<Config> {
        let mut config = Config::load_or_default(self.config.as_deref())?;
        if let Some(store) = &self.store {
            config.store_path.clone_from(store);
        }
        if self.uppercase {
            config.uppercase = true;
        }
        Ok(config)
    }

    /// Open a session over the file store named by the resolved config.
    ///
    /// # Errors
    ///
    /// Returns an error if the config or the store file cannot be read.
    pub fn open_session(&self) -> Result<Session<JsonFileStore>> {
        let config = self.resolve()?;
        let library = open_library(&config)?;
        Ok(Session::new(library, &config))
    }

    fn open_library(&self) -> Result<Library<JsonFileStore>> {
        open_library(&self.resolve()?)
    }
}

fn open_library(config: &Config) -> Result<Library<JsonFileStore>> {
    let store = JsonFileStore::open(&config.store_path)?;
    Ok(Library::open(store, config.limits()))
}

/// Subcommands of `history`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryAction {
    List,
    Remove(String),
    Save(String),
    Reuse(String),
}

/// Subcommands of `saved`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SavedAction {
    List,
    Remove(String),
    Reuse(String),
}

fn format_parsed(parsed: &ParsedDescription, format: &str) -> Result<String> {
    match format {
        "text" => Ok(format!(
            "noun: {}\nspecs: {}\nmaterial: {}\n",
            parsed.main_noun,
            parsed.specs.join(", "),
            parsed.material
        )),
        "json" => Ok(serde_json::to_string_pretty(parsed)? + "\n"),
        "yaml" => Ok(serde_yaml::to_string(parsed)?),
        other => Err(DescError::invalid(format!(
            "unknown format '{other}' (expected: text, json, yaml)"
        ))),
    }
}

/// Run the `parse` command: print the labeled parts of a description.
///
/// # Errors
///
/// Returns an error if `format` is unknown.
pub fn run_parse(text: &str, format: &str) -> Result<String> {
    format_parsed(&parse_description(text), format)
}

/// Run the `generate` command: parse into elements, record history, and
/// print the joined result.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or written.
pub fn run_generate(text: &str, options: &Options) -> Result<String> {
    let mut session = options.open_session()?;
    session.set_input(text);
    if !session.generate()? {
        return Err(DescError::invalid("empty description"));
    }
    Ok(session.export() + "\n")
}

/// Run the `edit` command: generate elements, replay a gesture script on
/// them, and print the result.
///
/// # Errors
///
/// Returns an error if `format` is unknown, `text` is blank, the script
/// cannot be read or parsed, a script step fails, or the store cannot be
/// opened. The first two are checked before anything is recorded.
pub fn run_edit(text: &str, script: &Path, format: &str, options: &Options) -> Result<String> {
    let source = std::fs::read_to_string(script).map_err(|source| DescError::Read {
        path: script.to_path_buf(),
        source,
    })?;
    if !matches!(format, "text" | "json" | "yaml") {
        return Err(DescError::invalid(format!(
            "unknown format '{format}' (expected: text, json, yaml)"
        )));
    }
    if text.trim().is_empty() {
        return Err(DescError::invalid("empty description"));
    }
    let events = parse_script(&source)?;

    let mut session = options.open_session()?;
    session.set_input(text);
    session.generate()?;
    let report = ScriptRunner::new(session.editor_mut()).run(&events)?;

    match format {
        "json" => Ok(serde_json::to_string_pretty(&report)? + "\n"),
        "yaml" => Ok(serde_yaml::to_string(&report)?),
        _ => Ok(session.export() + "\n"),
    }
}

/// Run the `save` command: keep `text` in the saved list.
///
/// # Errors
///
/// Returns an error if the text is blank or the store cannot be written.
pub fn run_save(text: &str, options: &Options) -> Result<String> {
    let mut session = options.open_session()?;
    session.set_input(text);
    if text.trim().is_empty() {
        return Err(DescError::invalid("empty description"));
    }
    if session.save()? {
        Ok(format!("saved: {text}\n"))
    } else {
        Ok(format!("already saved: {text}\n"))
    }
}

/// Run the `reuse` command: publish `text` as the current description.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn run_reuse(text: &str, options: &Options) -> Result<String> {
    let mut library = options.open_library()?;
    library.reuse(text)?;
    Ok(format!("current description: {text}\n"))
}

/// Run the `current` command: print the current description, if any.
///
/// # Errors
///
/// Returns an error if the store cannot be opened.
pub fn run_current(options: &Options) -> Result<String> {
    let library = options.open_library()?;
    Ok(library
        .current_description()
        .map_or_else(String::new, |text| text + "\n"))
}

fn list_items<T: CollectionItem>(items: &[T], empty: &str) -> String {
    if items.is_empty() {
        return format!("{empty}\n");
    }
    items
        .iter()
        .map(|item| format!("{}  {}\n", item.id(), item.text()))
        .collect()
}

/// Run the `history` command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or written, or an id is unknown.
pub fn run_history(action: &HistoryAction, options: &Options) -> Result<String> {
    let mut library = options.open_library()?;
    match action {
        HistoryAction::List => Ok(list_items(library.history(), "no recent descriptions")),
        HistoryAction::Remove(id) => {
            if library.remove_from_history(id)? {
                Ok(format!("removed {id}\n"))
            } else {
                Err(DescError::unknown_item(id.as_str()))
            }
        }
        HistoryAction::Save(id) => {
            if library.save_from_history(id)? {
                Ok(format!("saved {id}\n"))
            } else {
                Ok(format!("already saved: {id}\n"))
            }
        }
        HistoryAction::Reuse(id) => {
            let text = library.reuse_from_history(id)?;
            Ok(format!("current description: {text}\n"))
        }
    }
}

/// Run the `saved` command.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or written, or an id is unknown.
pub fn run_saved(action: &SavedAction, options: &Options) -> Result<String> {
    let mut library = options.open_library()?;
    match action {
        SavedAction::List => Ok(list_items(library.saved(), "no saved descriptions")),
        SavedAction::Remove(id) => {
            if library.remove_from_saved(id)? {
                Ok(format!("removed {id}\n"))
            } else {
                Err(DescError::unknown_item(id.as_str()))
            }
        }
        SavedAction::Reuse(id) => {
            let text = library.reuse_from_saved(id)?;
            Ok(format!("current description: {text}\n"))
        }
    }
}
