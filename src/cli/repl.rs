use std::io::{BufRead, Write};
use std::time::Instant;

use crate::editor::{Editor, ElementKey};
use crate::error::{DescError, Result};
use crate::session::{Clipboard, EditPrompt, Session};
use crate::store::KeyValueStore;

const HELP: &str = "\
commands:
  gen <text>            parse text into elements
  show                  print the elements
  drag <from> <to>      drag one element onto another (start, over, drop)
  start <i>             begin dragging element i
  over <i|->            hover element i (or nothing)
  drop <i|->            release over element i (or nothing)
  combine <i>           merge element i with the next one
  edit <i>              replace element i (prompts for text)
  set <i> <text>        replace element i with text
  del <i>               delete element i
  upper                 toggle uppercase for new and edited elements
  save | copy | clear   act on the current description
  history | saved       list stored descriptions
  adopt                 load the current description as input
  quit";

/// Copies by echoing to the REPL output.
struct EchoClipboard<'a, W> {
    out: &'a mut W,
}

impl<W: Write> Clipboard for EchoClipboard<'_, W> {
    fn write_text(&mut self, text: &str) {
        // Fire-and-forget: a failed echo has nowhere better to be reported.
        let _ = writeln!(self.out, "copied: {text}");
    }
}

/// Prompts on the REPL output and reads the reply line from its input.
/// An empty reply is empty text; only end of input cancels.
struct LinePrompt<'a, R, W> {
    input: &'a mut R,
    out: &'a mut W,
}

impl<R: BufRead, W: Write> EditPrompt for LinePrompt<'_, R, W> {
    fn request(&mut self, current: &str) -> Option<String> {
        write!(self.out, "edit [{current}]: ").ok()?;
        self.out.flush().ok()?;
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_owned()),
        }
    }
}

/// Render the elements on one line.
///
/// `>` marks the dragged element, `~` a merge candidate and `*` an element
/// that was just merged.
pub fn render(editor: &Editor) -> String {
    if editor.list().is_empty() {
        return "(no elements)".to_owned();
    }
    editor
        .list()
        .elements()
        .iter()
        .enumerate()
        .map(|(i, element)| {
            let mut marks = String::new();
            if editor.is_dragging(element.key) {
                marks.push('>');
            }
            if editor.is_overlapping(element.key) {
                marks.push('~');
            }
            if editor.is_recently_merged(element.key) {
                marks.push('*');
            }
            format!("{i}:[{}]{marks}", element.text)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse_index(word: Option<&str>) -> Result<usize> {
    let word = word.ok_or_else(|| DescError::invalid("missing index"))?;
    word.parse()
        .map_err(|_| DescError::invalid(format!("not an index: '{word}'")))
}

/// `-` means "no target".
fn parse_target<S>(session: &Session<S>, word: Option<&str>) -> Result<Option<ElementKey>>
where
    S: KeyValueStore,
{
    match word {
        None | Some("-") => Ok(None),
        Some(_) => Ok(session.editor().list().key_at(parse_index(word)?)),
    }
}

fn key_at<S: KeyValueStore>(session: &Session<S>, index: usize) -> Result<ElementKey> {
    session
        .editor()
        .list()
        .key_at(index)
        .ok_or(DescError::IndexOutOfRange {
            index,
            len: session.editor().list().len(),
        })
}

/// A whole gesture in one command: start, hover, and drop.
fn drag<'a, S, I>(session: &mut Session<S>, args: &mut I) -> Result<Option<String>>
where
    S: KeyValueStore,
    I: Iterator<Item = &'a str>,
{
    let from = key_at(session, parse_index(args.next())?)?;
    let to = parse_target(session, args.next())?;
    let editor = session.editor_mut();
    editor.start_drag(from);
    editor.drag_over(from, to);
    editor.drop(from, to);
    Ok(Some(render(session.editor())))
}

fn set<S: KeyValueStore>(session: &mut Session<S>, rest: &str) -> Result<Option<String>> {
    let (index, text) = rest.split_once(' ').unwrap_or((rest, ""));
    let index = parse_index(Some(index))?;
    if !session.editor_mut().edit_element(index, text.trim()) {
        return Err(DescError::IndexOutOfRange {
            index,
            len: session.editor().list().len(),
        });
    }
    Ok(Some(render(session.editor())))
}

/// Interactive line editor over a [`Session`].
///
/// Reads one command per line until `quit` or end of input. Command errors
/// are printed and the loop continues.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails.
pub fn run_repl<S, R, W>(session: &mut Session<S>, input: &mut R, out: &mut W) -> Result<()>
where
    S: KeyValueStore,
    R: BufRead,
    W: Write,
{
    let mut dragging: Option<ElementKey> = None;
    let mut line = String::new();

    loop {
        write!(out, "> ")?;
        out.flush()?;
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }
        session.editor_mut().tick(Instant::now());

        let trimmed = line.trim();
        let (command, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
        let rest = rest.trim();
        let mut args = rest.split_whitespace();

        let result: Result<Option<String>> = match command {
            "" => Ok(None),
            "quit" | "exit" => break,
            "help" => Ok(Some(HELP.to_owned())),
            "gen" | "generate" => {
                session.set_input(rest);
                session.generate().map(|generated| {
                    Some(if generated {
                        render(session.editor())
                    } else {
                        "nothing to generate".to_owned()
                    })
                })
            }
            "show" => Ok(Some(render(session.editor()))),
            "drag" => drag(session, &mut args),
            "start" => parse_index(args.next())
                .and_then(|i| key_at(session, i))
                .map(|key| {
                    dragging = Some(key);
                    session.editor_mut().start_drag(key);
                    Some(render(session.editor()))
                }),
            "over" | "drop" => match dragging {
                None => Err(DescError::invalid("no drag in progress")),
                Some(active) => parse_target(session, args.next()).map(|target| {
                    if command == "over" {
                        session.editor_mut().drag_over(active, target);
                    } else {
                        dragging = None;
                        session.editor_mut().drop(active, target);
                    }
                    Some(render(session.editor()))
                }),
            },
            "combine" => parse_index(args.next()).map(|i| {
                session.editor_mut().combine_with_next(i);
                Some(render(session.editor()))
            }),
            "edit" => parse_index(args.next()).and_then(|i| {
                let mut prompt = LinePrompt {
                    input: &mut *input,
                    out: &mut *out,
                };
                if session.edit_with_prompt(i, &mut prompt) {
                    Ok(Some(render(session.editor())))
                } else {
                    Ok(Some("unchanged".to_owned()))
                }
            }),
            "set" => set(session, rest),
            "del" | "delete" => parse_index(args.next()).and_then(|i| {
                if session.editor_mut().delete_element(i) {
                    Ok(Some(render(session.editor())))
                } else {
                    Err(DescError::IndexOutOfRange {
                        index: i,
                        len: session.editor().list().len(),
                    })
                }
            }),
            "upper" => {
                let on = session.editor_mut().toggle_uppercase();
                Ok(Some(format!("uppercase {}", if on { "on" } else { "off" })))
            }
            "save" => session.save().map(|saved| {
                Some(if saved { "saved" } else { "nothing new to save" }.to_owned())
            }),
            "copy" => {
                session.copy(&mut EchoClipboard { out: &mut *out });
                Ok(None)
            }
            "clear" => {
                dragging = None;
                session.clear();
                Ok(Some("cleared".to_owned()))
            }
            "history" => Ok(Some(
                session
                    .library()
                    .history()
                    .iter()
                    .map(|item| format!("{}  {}", item.id, item.text))
                    .collect::<Vec<_>>()
                    .join("\n"),
            )),
            "saved" => Ok(Some(
                session
                    .library()
                    .saved()
                    .iter()
                    .map(|item| format!("{}  {}", item.id, item.text))
                    .collect::<Vec<_>>()
                    .join("\n"),
            )),
            "adopt" => Ok(Some(if session.adopt_current() {
                format!("input: {}", session.input())
            } else {
                "no current description".to_owned()
            })),
            other => Err(DescError::invalid(format!(
                "unknown command '{other}' (try 'help')"
            ))),
        };

        match result {
            Ok(Some(message)) if !message.is_empty() => writeln!(out, "{message}")?,
            Ok(_) => {}
            Err(e) => writeln!(out, "error: {e}")?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::{Library, Limits, MemoryStore};

    fn run(script: &str) -> (Session<MemoryStore>, String) {
        let library = Library::open(MemoryStore::new(), Limits::default());
        let mut session = Session::new(library, &Config::default());
        let mut input = script.as_bytes();
        let mut out = Vec::new();
        run_repl(&mut session, &mut input, &mut out).unwrap();
        (session, String::from_utf8(out).unwrap())
    }

    #[test]
    fn gen_then_show() {
        let (session, out) = run("gen 1/2\" PIN BRASS\nshow\n");
        assert_eq!(session.export(), "PIN, 1/2 IN., BRASS");
        assert!(out.contains("0:[PIN] 1:[1/2 IN.] 2:[BRASS]"), "got: {out}");
    }

    #[test]
    fn drag_adjacent_merges_and_marks() {
        let (session, out) = run("gen PIN 2\" BRASS\ndrag 0 1\n");
        assert_eq!(session.export(), "PIN 2 IN., BRASS");
        assert!(out.contains("0:[PIN 2 IN.]*"), "got: {out}");
    }

    #[test]
    fn step_by_step_drag_reorders() {
        let (session, _) = run("gen PIN 2\" BRASS\nstart 0\nover 2\ndrop 2\n");
        assert_eq!(session.export(), "2 IN., BRASS, PIN");
    }

    #[test]
    fn over_without_start_reports_error() {
        let (_, out) = run("gen PIN\nover 0\n");
        assert!(out.contains("error: invalid argument: no drag in progress"), "got: {out}");
    }

    #[test]
    fn edit_prompts_for_text() {
        let (session, out) = run("gen PIN BRASS\nedit 0\ndowel pin\n");
        assert!(out.contains("edit [PIN]: "), "got: {out}");
        assert_eq!(session.export(), "dowel pin, BRASS");
    }

    #[test]
    fn edit_with_empty_reply_clears_text() {
        let (session, _) = run("gen PIN BRASS\nedit 0\n\n");
        assert_eq!(session.editor().list().texts(), vec!["", "BRASS"]);
    }

    #[test]
    fn edit_at_end_of_input_is_cancelled() {
        let (session, out) = run("gen PIN BRASS\nedit 0\n");
        assert!(out.contains("unchanged"), "got: {out}");
        assert_eq!(session.export(), "PIN, BRASS");
    }

    #[test]
    fn upper_then_set() {
        let (session, _) = run("gen PIN BRASS\nupper\nset 1 yellow brass\n");
        assert_eq!(session.export(), "PIN, YELLOW BRASS");
    }

    #[test]
    fn delete_out_of_range_reports_error() {
        let (_, out) = run("gen PIN\ndel 4\n");
        assert!(out.contains("error: index 4 out of range"), "got: {out}");
    }

    #[test]
    fn save_copy_and_history() {
        let (session, out) = run("gen NUT COPPER\nsave\ncopy\nquit\nshow\n");
        assert_eq!(session.library().saved()[0].text, "NUT, COPPER");
        assert!(out.contains("copied: NUT, COPPER"), "got: {out}");
        assert_eq!(session.library().history().len(), 2);
    }

    #[test]
    fn unknown_command_keeps_running() {
        let (session, out) = run("wiggle\ngen PIN\n");
        assert!(out.contains("unknown command 'wiggle'"), "got: {out}");
        assert_eq!(session.export(), "PIN");
    }
}
