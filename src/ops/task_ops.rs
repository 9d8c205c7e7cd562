use std::fmt;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::io::config_io::resolve_file;
use crate::io::store::{self, LineOutOfRange, Store, StoreError};
use crate::model::config::{Config, DisplayConfig};
use crate::model::task::{Priority, Task};
use crate::parse::task_parser::insert_after_priority;
use crate::parse::{completion_entry, stamp_created};

/// Error type for task operations
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("'{command}' requires a line NUMBER, got '{value}'")]
    NotANumber { command: &'static str, value: String },
    #[error("'{command}': no task on line {line} (todo file has {len})")]
    NoSuchLine {
        command: &'static str,
        line: usize,
        len: usize,
    },
    #[error("'{command}' requires a priority letter A-X, got '{value}'")]
    InvalidPriority { command: &'static str, value: String },
    #[error("'{command}' requires a(n) {what}")]
    MissingArgument {
        command: &'static str,
        what: &'static str,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The active and completed task files of one todo directory.
#[derive(Debug, Clone)]
pub struct TodoFiles {
    pub dir: PathBuf,
    pub todo: Store,
    pub done: Store,
}

impl TodoFiles {
    pub fn new(dir: &Path, config: &Config) -> Self {
        TodoFiles {
            dir: dir.to_path_buf(),
            todo: Store::new(resolve_file(dir, &config.files.todo)),
            done: Store::new(resolve_file(dir, &config.files.done)),
        }
    }
}

/// What a successful command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Added { line: usize, text: String },
    Completed { line: usize, entry: String },
    Deleted { line: usize, text: String },
    Changed { line: usize, old: String, new: String },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Added { line, text } => write!(f, "'{}' added on line {}.", text, line),
            Outcome::Completed { line, .. } => write!(f, "Item {} marked as done.", line),
            Outcome::Deleted { line, .. } => write!(f, "Item {} deleted.", line),
            Outcome::Changed { line, old, new } => {
                write!(f, "Item {} changed from '{}' to '{}'.", line, old, new)
            }
        }
    }
}

/// Files to snapshot and the message to snapshot them with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRequest {
    pub files: Vec<PathBuf>,
    pub message: String,
}

impl Outcome {
    /// The version-control request for this change.
    pub fn sync_request(&self, files: &TodoFiles) -> SyncRequest {
        let todo = files.todo.path().to_path_buf();
        match self {
            Outcome::Completed { entry, .. } => SyncRequest {
                files: vec![todo, files.done.path().to_path_buf()],
                message: entry.clone(),
            },
            Outcome::Deleted { text, .. } => SyncRequest {
                files: vec![todo],
                message: format!("'{}' deleted.", text),
            },
            Outcome::Added { .. } | Outcome::Changed { .. } => SyncRequest {
                files: vec![todo],
                message: format!("TODO: {}", self),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Argument validation
// ---------------------------------------------------------------------------

/// Command names as they appear in error messages.
pub mod command {
    pub const DO: &str = "do";
    pub const DEL: &str = "del";
    pub const APPEND: &str = "append";
    pub const PREPEND: &str = "prepend";
    pub const PRI: &str = "pri";
    pub const DEPRI: &str = "depri";
}

/// Parse a 1-based line number argument. Anything but ASCII digits is
/// `NotANumber`; a number too large for `usize` can never be in range.
/// Touches no file, so callers can run it before taking the lock.
pub fn parse_line(command: &'static str, arg: &str) -> Result<usize, TaskError> {
    if arg.is_empty() || !arg.bytes().all(|b| b.is_ascii_digit()) {
        return Err(TaskError::NotANumber {
            command,
            value: arg.to_string(),
        });
    }
    Ok(arg.parse().unwrap_or(usize::MAX))
}

fn required_text<'a>(
    command: &'static str,
    what: &'static str,
    text: &'a str,
) -> Result<&'a str, TaskError> {
    let text = text.trim();
    if text.is_empty() {
        Err(TaskError::MissingArgument { command, what })
    } else {
        Ok(text)
    }
}

/// Parse a priority letter argument. Touches no file.
pub fn parse_priority(command: &'static str, letter: Option<&str>) -> Result<Priority, TaskError> {
    let letter = letter.ok_or(TaskError::MissingArgument {
        command,
        what: "NUMBER then a capital letter",
    })?;
    Priority::parse(letter).ok_or_else(|| TaskError::InvalidPriority {
        command,
        value: letter.to_string(),
    })
}

fn no_such_line(command: &'static str) -> impl Fn(LineOutOfRange) -> TaskError {
    move |e| TaskError::NoSuchLine {
        command,
        line: e.line,
        len: e.len,
    }
}

/// Keep a task on one line.
fn single_line(text: &str) -> String {
    text.replace(['\r', '\n'], " ")
}

// ---------------------------------------------------------------------------
// Adding
// ---------------------------------------------------------------------------

/// Append a new task as the last line. With `prepend_date` on, the line is
/// stamped with `today`. Any text is accepted, the empty string included;
/// line breaks become spaces.
pub fn add(
    files: &TodoFiles,
    text: &str,
    display: &DisplayConfig,
    today: NaiveDate,
) -> Result<Outcome, TaskError> {
    let mut line = single_line(text);
    if display.prepend_date {
        line = stamp_created(&line, today);
    }
    let count = files.todo.load_or_empty()?.len();
    files.todo.append_line(&line)?;
    Ok(Outcome::Added {
        line: count + 1,
        text: line,
    })
}

/// Add each line of `text` as its own task, in order.
pub fn add_multi(
    files: &TodoFiles,
    text: &str,
    display: &DisplayConfig,
    today: NaiveDate,
) -> Result<Vec<Outcome>, TaskError> {
    text.lines().map(|l| add(files, l, display, today)).collect()
}

// ---------------------------------------------------------------------------
// Removing
// ---------------------------------------------------------------------------

/// Mark a task done: strip its priority, stamp it `x <today>`, and move it
/// to the done file.
pub fn complete(files: &TodoFiles, arg: &str, today: NaiveDate) -> Result<Outcome, TaskError> {
    const CMD: &str = command::DO;
    let line = parse_line(CMD, arg)?;
    let lines = files.todo.load()?;
    let (removed, rest) = store::extract(lines, line).map_err(no_such_line(CMD))?;

    let entry = completion_entry(&Task::parse(&removed), today);
    // done first: a failure below leaves a duplicate, never a lost task
    files.done.append_line(&entry)?;
    files.todo.overwrite(&rest)?;
    tracing::debug!(line, "completed task");
    Ok(Outcome::Completed { line, entry })
}

/// Delete a task without archiving it.
pub fn delete(files: &TodoFiles, arg: &str) -> Result<Outcome, TaskError> {
    const CMD: &str = command::DEL;
    let line = parse_line(CMD, arg)?;
    let lines = files.todo.load()?;
    let (removed, rest) = store::extract(lines, line).map_err(no_such_line(CMD))?;
    files.todo.overwrite(&rest)?;
    tracing::debug!(line, "deleted task");
    Ok(Outcome::Deleted {
        line,
        text: removed,
    })
}

// ---------------------------------------------------------------------------
// Editing in place
// ---------------------------------------------------------------------------

/// Replace line `line` with `edit(old)`, keeping its position. The line is
/// range-checked before `edit` runs, so its own argument errors come second.
fn rewrite(
    files: &TodoFiles,
    command: &'static str,
    line: usize,
    edit: impl FnOnce(&Task) -> Result<String, TaskError>,
) -> Result<Outcome, TaskError> {
    let lines = files.todo.load()?;
    let (old, mut rest) = store::extract(lines, line).map_err(no_such_line(command))?;
    let new = edit(&Task::parse(&old))?;
    if new != old {
        rest.insert(line - 1, new.clone());
        files.todo.overwrite(&rest)?;
        tracing::debug!(line, command, "rewrote task");
    }
    Ok(Outcome::Changed { line, old, new })
}

/// Add text to the end of a task.
pub fn append(files: &TodoFiles, arg: &str, text: &str) -> Result<Outcome, TaskError> {
    const CMD: &str = command::APPEND;
    let line = parse_line(CMD, arg)?;
    rewrite(files, CMD, line, |task| {
        let text = single_line(required_text(CMD, "NUMBER then a string", text)?);
        Ok(format!("{} {}", task.text(), text))
    })
}

/// Add text to the start of a task, after its priority marker.
pub fn prepend(files: &TodoFiles, arg: &str, text: &str) -> Result<Outcome, TaskError> {
    const CMD: &str = command::PREPEND;
    let line = parse_line(CMD, arg)?;
    rewrite(files, CMD, line, |task| {
        let text = single_line(required_text(CMD, "NUMBER then a string", text)?);
        Ok(insert_after_priority(task.text(), &format!("{} ", text)))
    })
}

/// Set or replace a task's priority.
pub fn prioritize(files: &TodoFiles, arg: &str, letter: Option<&str>) -> Result<Outcome, TaskError> {
    const CMD: &str = command::PRI;
    let line = parse_line(CMD, arg)?;
    let priority = parse_priority(CMD, letter)?;
    rewrite(files, CMD, line, |task| Ok(task.with_priority(priority).text().to_string()))
}

/// Remove a task's priority. A task without one is left as is.
pub fn deprioritize(files: &TodoFiles, arg: &str) -> Result<Outcome, TaskError> {
    const CMD: &str = command::DEPRI;
    let line = parse_line(CMD, arg)?;
    rewrite(files, CMD, line, |task| Ok(task.without_priority().text().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    const SAMPLE: &str = "(A) Task one\nTask two +proj\n(B) Task three @ctx\n";

    fn setup(content: &str) -> (TempDir, TodoFiles) {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("todo.txt"), content).unwrap();
        let files = TodoFiles::new(tmp.path(), &Config::default());
        (tmp, files)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 14).unwrap()
    }

    fn todo_text(files: &TodoFiles) -> String {
        fs::read_to_string(files.todo.path()).unwrap()
    }

    // --- add ---

    #[test]
    fn test_add_appends_last_line() {
        let (_tmp, files) = setup(SAMPLE);
        let out = add(&files, "Buy milk +errands", &DisplayConfig::default(), today()).unwrap();
        assert_eq!(
            out,
            Outcome::Added {
                line: 4,
                text: "Buy milk +errands".into()
            }
        );
        assert!(todo_text(&files).ends_with("(B) Task three @ctx\nBuy milk +errands\n"));
        assert_eq!(out.to_string(), "'Buy milk +errands' added on line 4.");
    }

    #[test]
    fn test_add_creates_missing_store() {
        let tmp = TempDir::new().unwrap();
        let files = TodoFiles::new(tmp.path(), &Config::default());
        let out = add(&files, "First", &DisplayConfig::default(), today()).unwrap();
        assert_eq!(
            out,
            Outcome::Added {
                line: 1,
                text: "First".into()
            }
        );
        assert_eq!(todo_text(&files), "First\n");
    }

    #[test]
    fn test_add_with_prepend_date() {
        let (_tmp, files) = setup("");
        let display = DisplayConfig {
            prepend_date: true,
            ..Default::default()
        };
        add(&files, "(A) Call dentist", &display, today()).unwrap();
        add(&files, "Buy milk", &display, today()).unwrap();
        assert_eq!(
            todo_text(&files),
            "(A) 2024-05-14 Call dentist\n2024-05-14 Buy milk\n"
        );
    }

    #[test]
    fn test_add_multi_adds_every_line() {
        let (_tmp, files) = setup("Existing\n");
        let outs = add_multi(
            &files,
            "First +a\n\nSecond @b\n",
            &DisplayConfig::default(),
            today(),
        )
        .unwrap();
        let lines: Vec<usize> = outs
            .iter()
            .map(|o| match o {
                Outcome::Added { line, .. } => *line,
                _ => 0,
            })
            .collect();
        assert_eq!(lines, vec![2, 3, 4]);
        assert_eq!(todo_text(&files), "Existing\nFirst +a\n\nSecond @b\n");
    }

    #[test]
    fn test_add_never_rejects_text() {
        let (_tmp, files) = setup("");
        let out = add(&files, "", &DisplayConfig::default(), today()).unwrap();
        assert_eq!(
            out,
            Outcome::Added {
                line: 1,
                text: String::new()
            }
        );
        add(&files, "  padded  ", &DisplayConfig::default(), today()).unwrap();
        add(&files, "two\nlines", &DisplayConfig::default(), today()).unwrap();
        assert_eq!(todo_text(&files), "\n  padded  \ntwo lines\n");
    }

    // --- do / del ---

    #[test]
    fn test_complete_moves_to_done() {
        let (_tmp, files) = setup(SAMPLE);
        let out = complete(&files, "1", today()).unwrap();
        assert_eq!(
            out,
            Outcome::Completed {
                line: 1,
                entry: "x 2024-05-14 Task one".into()
            }
        );
        assert_eq!(todo_text(&files), "Task two +proj\n(B) Task three @ctx\n");
        assert_eq!(
            fs::read_to_string(files.done.path()).unwrap(),
            "x 2024-05-14 Task one\n"
        );

        let sync = out.sync_request(&files);
        assert_eq!(sync.files.len(), 2);
        assert_eq!(sync.message, "x 2024-05-14 Task one");
    }

    #[test]
    fn test_delete() {
        let (_tmp, files) = setup(SAMPLE);
        let out = delete(&files, "2").unwrap();
        assert_eq!(
            out,
            Outcome::Deleted {
                line: 2,
                text: "Task two +proj".into()
            }
        );
        assert_eq!(todo_text(&files), "(A) Task one\n(B) Task three @ctx\n");
        assert!(!files.done.path().exists());
        assert_eq!(out.sync_request(&files).message, "'Task two +proj' deleted.");
    }

    #[test]
    fn test_complete_missing_store_is_error() {
        let tmp = TempDir::new().unwrap();
        let files = TodoFiles::new(tmp.path(), &Config::default());
        assert!(matches!(
            complete(&files, "1", today()),
            Err(TaskError::Store(_))
        ));
    }

    // --- append / prepend ---

    #[test]
    fn test_append_keeps_position() {
        let (_tmp, files) = setup(SAMPLE);
        let out = append(&files, "2", "@phone").unwrap();
        assert_eq!(
            out.to_string(),
            "Item 2 changed from 'Task two +proj' to 'Task two +proj @phone'."
        );
        assert_eq!(
            todo_text(&files),
            "(A) Task one\nTask two +proj @phone\n(B) Task three @ctx\n"
        );
    }

    #[test]
    fn test_prepend_after_priority() {
        let (_tmp, files) = setup(SAMPLE);
        prepend(&files, "1", "Urgent:").unwrap();
        prepend(&files, "2", "Maybe").unwrap();
        assert_eq!(
            todo_text(&files),
            "(A) Urgent: Task one\nMaybe Task two +proj\n(B) Task three @ctx\n"
        );
    }

    #[test]
    fn test_append_missing_text() {
        let (_tmp, files) = setup(SAMPLE);
        assert!(matches!(
            append(&files, "1", "  "),
            Err(TaskError::MissingArgument { command: "append", .. })
        ));
        assert_eq!(todo_text(&files), SAMPLE);
    }

    #[test]
    fn test_append_out_of_range_leaves_store_unchanged() {
        let (_tmp, files) = setup(SAMPLE);
        let err = append(&files, "5", "more").unwrap_err();
        assert!(matches!(
            err,
            TaskError::NoSuchLine {
                command: "append",
                line: 5,
                len: 3
            }
        ));
        assert_eq!(todo_text(&files), SAMPLE);
    }

    // --- pri / depri ---

    #[test]
    fn test_prioritize_inserts_marker() {
        let (_tmp, files) = setup(SAMPLE);
        let out = prioritize(&files, "2", Some("C")).unwrap();
        assert_eq!(
            out.to_string(),
            "Item 2 changed from 'Task two +proj' to '(C) Task two +proj'."
        );
        assert_eq!(
            todo_text(&files),
            "(A) Task one\n(C) Task two +proj\n(B) Task three @ctx\n"
        );
    }

    #[test]
    fn test_prioritize_replaces_marker() {
        let (_tmp, files) = setup(SAMPLE);
        prioritize(&files, "3", Some("A")).unwrap();
        assert!(todo_text(&files).ends_with("(A) Task three @ctx\n"));
    }

    #[test]
    fn test_prioritize_invalid_letter() {
        let (_tmp, files) = setup(SAMPLE);
        for bad in ["Z", "a", "AB", ""] {
            assert!(matches!(
                prioritize(&files, "1", Some(bad)),
                Err(TaskError::InvalidPriority { .. })
            ));
        }
        assert!(matches!(
            prioritize(&files, "1", None),
            Err(TaskError::MissingArgument { .. })
        ));
        assert_eq!(todo_text(&files), SAMPLE);
    }

    #[test]
    fn test_deprioritize() {
        let (_tmp, files) = setup(SAMPLE);
        let out = deprioritize(&files, "1").unwrap();
        assert_eq!(
            out,
            Outcome::Changed {
                line: 1,
                old: "(A) Task one".into(),
                new: "Task one".into()
            }
        );
        // Already unprioritized: silent no-op
        let out = deprioritize(&files, "2").unwrap();
        assert_eq!(
            out,
            Outcome::Changed {
                line: 2,
                old: "Task two +proj".into(),
                new: "Task two +proj".into()
            }
        );
        assert_eq!(todo_text(&files), "Task one\nTask two +proj\n(B) Task three @ctx\n");
    }

    #[test]
    fn test_range_checked_before_text() {
        let (_tmp, files) = setup(SAMPLE);
        for result in [append(&files, "5", ""), prepend(&files, "5", "  ")] {
            assert!(matches!(
                result,
                Err(TaskError::NoSuchLine { line: 5, len: 3, .. })
            ));
        }
        assert_eq!(todo_text(&files), SAMPLE);
    }

    // --- validation order ---

    #[test]
    fn test_not_a_number_before_file_access() {
        // No todo file exists: a store error would mean the file was touched
        let tmp = TempDir::new().unwrap();
        let files = TodoFiles::new(tmp.path(), &Config::default());
        for arg in ["two", "", "-1", "1a", "+3"] {
            assert!(matches!(
                delete(&files, arg),
                Err(TaskError::NotANumber { command: "del", .. })
            ));
            assert!(matches!(
                prioritize(&files, arg, Some("Z")),
                Err(TaskError::NotANumber { command: "pri", .. })
            ));
            assert!(matches!(
                append(&files, arg, ""),
                Err(TaskError::NotANumber { .. })
            ));
        }
        assert!(!files.todo.path().exists());
    }

    #[test]
    fn test_parse_helpers_are_pure() {
        assert_eq!(parse_line(command::DO, "12").unwrap(), 12);
        assert!(matches!(
            parse_line(command::DO, "abc"),
            Err(TaskError::NotANumber { command: "do", .. })
        ));
        assert_eq!(
            parse_priority(command::PRI, Some("B")).unwrap(),
            Priority::parse("B").unwrap()
        );
        assert!(matches!(
            parse_priority(command::PRI, None),
            Err(TaskError::MissingArgument { command: "pri", .. })
        ));
        assert!(matches!(
            parse_priority(command::PRI, Some("b")),
            Err(TaskError::InvalidPriority { .. })
        ));
    }

    #[test]
    fn test_line_zero_and_huge() {
        let (_tmp, files) = setup(SAMPLE);
        assert!(matches!(
            delete(&files, "0"),
            Err(TaskError::NoSuchLine { line: 0, .. })
        ));
        assert!(matches!(
            delete(&files, "99999999999999999999999999"),
            Err(TaskError::NoSuchLine { .. })
        ));
        assert_eq!(todo_text(&files), SAMPLE);
    }

    #[test]
    fn test_error_messages_name_command() {
        let (_tmp, files) = setup(SAMPLE);
        let err = prepend(&files, "x", "text").unwrap_err();
        assert_eq!(err.to_string(), "'prepend' requires a line NUMBER, got 'x'");
        let err = append(&files, "1", "").unwrap_err();
        assert_eq!(err.to_string(), "'append' requires a(n) NUMBER then a string");
        let err = complete(&files, "9", today()).unwrap_err();
        assert_eq!(err.to_string(), "'do': no task on line 9 (todo file has 3)");
    }

    #[test]
    fn test_sync_request_for_changes() {
        let (_tmp, files) = setup(SAMPLE);
        let out = prioritize(&files, "2", Some("C")).unwrap();
        let sync = out.sync_request(&files);
        assert_eq!(sync.files, vec![files.todo.path().to_path_buf()]);
        assert_eq!(
            sync.message,
            "TODO: Item 2 changed from 'Task two +proj' to '(C) Task two +proj'."
        );
    }
}
