use std::path::{Path, PathBuf};

use partdesc::cli::commands::{
    HistoryAction, Options, SavedAction, run_current, run_edit, run_generate, run_history,
    run_parse, run_reuse, run_save, run_saved,
};
use partdesc::store::{JsonFileStore, KeyValueStore, Library, Limits};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn options(dir: &Path) -> Options {
    Options {
        store: Some(dir.join("store.json")),
        config: None,
        uppercase: false,
    }
}

fn reopen(dir: &Path) -> Library<JsonFileStore> {
    let store = JsonFileStore::open(dir.join("store.json")).expect("store should open");
    Library::open(store, Limits::default())
}

// ── Parse ──────────────────────────────────────────────────

#[test]
fn cli_parse_does_not_touch_store() {
    let out = run_parse("3/8\" x 2\" long HEX BOLT CARBON STEEL", "text")
        .expect("parse should succeed");
    assert!(out.starts_with("noun: BOLT\n"), "got: {out}");
    assert!(out.contains("material: CARBON STEEL"), "got: {out}");
}

// ── Generate and history ───────────────────────────────────

#[test]
fn cli_generate_records_input_and_output() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_generate("1/2\" PIN BRASS", &options(dir.path())).expect("generate");
    assert_eq!(out, "PIN, 1/2 IN., BRASS\n");

    let lib = reopen(dir.path());
    let texts: Vec<_> = lib.history().iter().map(|h| h.text.as_str()).collect();
    assert_eq!(texts, vec!["PIN, 1/2 IN., BRASS", "1/2\" PIN BRASS"]);
}

#[test]
fn cli_generate_blank_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_generate("   ", &options(dir.path())).unwrap_err();
    assert!(err.to_string().contains("empty description"), "got: {err}");
    assert!(!dir.path().join("store.json").exists());
}

#[test]
fn cli_generate_upper_flag() {
    let dir = tempfile::tempdir().unwrap();
    let mut opts = options(dir.path());
    opts.uppercase = true;
    let out = run_generate("hex bolt", &opts).expect("generate");
    assert_eq!(out, "BOLT, HEX\n");
}

#[test]
fn cli_history_list_and_remove() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    run_generate("WASHER", &opts).unwrap();

    let listing = run_history(&HistoryAction::List, &opts).unwrap();
    assert_eq!(listing.lines().count(), 1, "got: {listing}");

    let id = reopen(dir.path()).history()[0].id.clone();
    let out = run_history(&HistoryAction::Remove(id.clone()), &opts).unwrap();
    assert_eq!(out, format!("removed {id}\n"));
    assert_eq!(
        run_history(&HistoryAction::List, &opts).unwrap(),
        "no recent descriptions\n"
    );
}

#[test]
fn cli_history_remove_unknown_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_history(&HistoryAction::Remove("nope".into()), &options(dir.path()))
        .unwrap_err();
    assert!(err.to_string().contains("nope"), "got: {err}");
}

#[test]
fn cli_history_save_copies_into_saved() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    run_generate("NUT BRASS", &opts).unwrap();
    let id = reopen(dir.path()).history()[0].id.clone();

    run_history(&HistoryAction::Save(id), &opts).unwrap();
    let saved = run_saved(&SavedAction::List, &opts).unwrap();
    assert!(saved.contains("NUT, BRASS"), "got: {saved}");
}

#[test]
fn cli_history_reuse_sets_current() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    run_generate("BOLT STEEL", &opts).unwrap();
    let item = reopen(dir.path()).history()[0].clone();

    let out = run_history(&HistoryAction::Reuse(item.id), &opts).unwrap();
    assert_eq!(out, format!("current description: {}\n", item.text));
    assert_eq!(run_current(&opts).unwrap(), format!("{}\n", item.text));
}

// ── Saved ──────────────────────────────────────────────────

#[test]
fn cli_save_twice_reports_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    assert_eq!(run_save("PIN, BRASS", &opts).unwrap(), "saved: PIN, BRASS\n");
    assert_eq!(
        run_save("PIN, BRASS", &opts).unwrap(),
        "already saved: PIN, BRASS\n"
    );
    assert_eq!(reopen(dir.path()).saved().len(), 1);
}

#[test]
fn cli_saved_remove() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    run_save("SCREW", &opts).unwrap();
    let id = reopen(dir.path()).saved()[0].id.clone();
    run_saved(&SavedAction::Remove(id), &opts).unwrap();
    assert_eq!(
        run_saved(&SavedAction::List, &opts).unwrap(),
        "no saved descriptions\n"
    );
}

#[test]
fn cli_saved_limit_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("partdesc.yaml");
    std::fs::write(&config, "saved_limit: 2\n").unwrap();
    let opts = Options {
        config: Some(config),
        ..options(dir.path())
    };
    for text in ["a", "b", "c"] {
        run_save(text, &opts).unwrap();
    }
    let lib = reopen(dir.path());
    let texts: Vec<_> = lib.saved().iter().map(|s| s.text.as_str()).collect();
    assert_eq!(texts, vec!["c", "b"]);
}

#[test]
fn cli_saved_reuse_sets_current() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    run_save("PIN, BRASS", &opts).unwrap();
    let id = reopen(dir.path()).saved()[0].id.clone();

    run_saved(&SavedAction::Reuse(id), &opts).unwrap();
    assert_eq!(run_current(&opts).unwrap(), "PIN, BRASS\n");
}

#[test]
fn cli_saved_reuse_unknown_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    let err = run_saved(&SavedAction::Reuse("nope".into()), &opts).unwrap_err();
    assert!(err.to_string().contains("nope"), "got: {err}");
    assert_eq!(run_current(&opts).unwrap(), "");
}

// ── Current description ────────────────────────────────────

#[test]
fn cli_reuse_then_current() {
    let dir = tempfile::tempdir().unwrap();
    let opts = options(dir.path());
    assert_eq!(run_current(&opts).unwrap(), "");
    run_reuse("BOLT, STEEL", &opts).unwrap();
    assert_eq!(run_current(&opts).unwrap(), "BOLT, STEEL\n");

    let lib = reopen(dir.path());
    assert!(lib.history().is_empty());
    assert!(lib.store().get("currentDescription").is_some());
}

// ── Edit scripts ───────────────────────────────────────────

#[test]
fn cli_edit_replays_script() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_edit(
        "PIN 2\" BRASS",
        &fixture("merge_then_move.yaml"),
        "text",
        &options(dir.path()),
    )
    .expect("edit should succeed");
    assert_eq!(out, "BRASS, PIN 2 IN.\n");
}

#[test]
fn cli_edit_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_edit(
        "PIN 2\" BRASS",
        &fixture("merge_then_move.yaml"),
        "json",
        &options(dir.path()),
    )
    .unwrap();
    assert!(out.contains("\"elements\""), "got: {out}");
    assert!(out.contains("\"BRASS\""), "got: {out}");
}

#[test]
fn cli_edit_reports_failing_step() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_edit(
        "PIN BRASS",
        &fixture("bad_step.yaml"),
        "text",
        &options(dir.path()),
    )
    .unwrap_err();
    assert!(err.to_string().contains("step 1"), "got: {err}");
}

#[test]
fn cli_edit_blank_text_is_error_and_records_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_edit(
        "  ",
        &fixture("merge_then_move.yaml"),
        "text",
        &options(dir.path()),
    )
    .unwrap_err();
    assert!(err.to_string().contains("empty description"), "got: {err}");
    assert!(!dir.path().join("store.json").exists());
}

#[test]
fn cli_edit_unknown_format_records_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_edit(
        "PIN 2\" BRASS",
        &fixture("merge_then_move.yaml"),
        "xml",
        &options(dir.path()),
    )
    .unwrap_err();
    assert!(err.to_string().contains("unknown format"), "got: {err}");
    assert!(!dir.path().join("store.json").exists());
}

#[test]
fn cli_edit_missing_script_is_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = run_edit(
        "PIN",
        &dir.path().join("missing.yaml"),
        "text",
        &options(dir.path()),
    )
    .unwrap_err();
    assert!(err.to_string().contains("failed to read"), "got: {err}");
}

// ── Store file ─────────────────────────────────────────────

#[test]
fn corrupt_store_file_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("store.json"), "{not json").unwrap();
    let out = run_generate("PIN", &options(dir.path())).unwrap();
    assert_eq!(out, "PIN\n");
    assert_eq!(reopen(dir.path()).history().len(), 1);
}
