use std::path::PathBuf;

use serde::Serialize;

use crate::ops::task_ops::Outcome;
use crate::ops::view::{Group, View, ViewLine};
use crate::util::color::TermColor;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct TaskJson {
    pub line: usize,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contexts: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub due: Vec<String>,
}

#[derive(Serialize)]
pub struct GroupJson {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,
    pub tasks: Vec<TaskJson>,
}

#[derive(Serialize)]
pub struct ViewJson {
    pub groups: Vec<GroupJson>,
    pub shown: usize,
    pub total: usize,
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

/// The stored task, not the display text: JSON consumers get every tag.
pub fn line_to_json(line: &ViewLine) -> TaskJson {
    let task = &line.task;
    TaskJson {
        line: line.number,
        text: task.text().to_string(),
        priority: task.priority().map(|p| p.letter()),
        created: task.created().map(|d| d.to_string()),
        projects: task.projects().into_iter().collect(),
        contexts: task.contexts().into_iter().collect(),
        due: task.due_dates().iter().map(|d| d.to_string()).collect(),
    }
}

fn group_to_json(group: &Group) -> GroupJson {
    GroupJson {
        heading: group.heading.clone(),
        tasks: group.lines.iter().map(line_to_json).collect(),
    }
}

pub fn view_to_json(view: &View) -> ViewJson {
    ViewJson {
        groups: view.groups.iter().map(group_to_json).collect(),
        shown: view.shown(),
        total: view.total,
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// Highlight the `commit <hash>` lines of `git log` output.
pub fn format_log(log: &str, plain: bool) -> Vec<String> {
    log.lines()
        .map(|line| {
            if !plain && line.starts_with("commit") {
                format!("{}{}{}", TermColor::Yellow.ansi(), line, TermColor::Default.ansi())
            } else {
                line.to_string()
            }
        })
        .collect()
}

/// What a change prints. `do` and `del` echo the affected line first.
pub fn format_outcome(outcome: &Outcome) -> Vec<String> {
    let mut lines = Vec::new();
    match outcome {
        Outcome::Completed { entry, .. } => lines.push(entry.clone()),
        Outcome::Deleted { text, .. } => lines.push(format!("'{}' deleted.", text)),
        Outcome::Added { .. } | Outcome::Changed { .. } => {}
    }
    lines.push(format!("TODO: {}", outcome));
    lines
}

/// `TODO: <files> archived.`
pub fn format_archived(files: &[PathBuf]) -> String {
    let names: Vec<String> = files.iter().map(|p| p.display().to_string()).collect();
    format!("TODO: {} archived.", names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::DisplayConfig;
    use crate::model::task::Task;
    use crate::ops::view::{Basis, build_view};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_view_json_uses_stored_text() {
        let tasks = vec![
            Task::parse("(A) 2024-01-01 Call dentist +health @phone #{2024-03-15}"),
            Task::parse("Buy milk"),
        ];
        let display = DisplayConfig {
            hide_projects: true,
            hide_priority: true,
            ..Default::default()
        };
        let view = build_view(&tasks, Basis::Priority, &display);
        let json = serde_json::to_value(view_to_json(&view)).unwrap();

        assert_eq!(json["shown"], 2);
        assert_eq!(json["total"], 2);
        let first = &json["groups"][0]["tasks"][0];
        assert_eq!(first["line"], 1);
        assert_eq!(first["priority"], "A");
        assert_eq!(first["created"], "2024-01-01");
        assert_eq!(first["projects"], serde_json::json!(["health"]));
        assert_eq!(first["contexts"], serde_json::json!(["phone"]));
        assert_eq!(first["due"], serde_json::json!(["2024-03-15"]));
        assert_eq!(
            first["text"],
            "(A) 2024-01-01 Call dentist +health @phone #{2024-03-15}"
        );

        let second = &json["groups"][1]["tasks"][0];
        assert!(second.get("priority").is_none());
        assert!(second.get("projects").is_none());
        assert!(json["groups"][1].get("heading").is_none());
    }

    #[test]
    fn test_format_log() {
        let log = "commit abc123\nAuthor: me\n\n    Buy milk";
        let out = format_log(log, false);
        assert_eq!(
            out[0],
            format!("{}commit abc123{}", TermColor::Yellow.ansi(), TermColor::Default.ansi())
        );
        assert_eq!(out[1], "Author: me");
        assert_eq!(format_log(log, true)[0], "commit abc123");
    }

    #[test]
    fn test_format_outcome() {
        let done = Outcome::Completed {
            line: 1,
            entry: "x 2024-05-01 Task one".to_string(),
        };
        assert_eq!(
            format_outcome(&done),
            vec!["x 2024-05-01 Task one", "TODO: Item 1 marked as done."]
        );
        let deleted = Outcome::Deleted {
            line: 2,
            text: "Buy milk".to_string(),
        };
        assert_eq!(
            format_outcome(&deleted),
            vec!["'Buy milk' deleted.", "TODO: Item 2 deleted."]
        );
        let added = Outcome::Added {
            line: 4,
            text: "Walk dog".to_string(),
        };
        assert_eq!(format_outcome(&added), vec!["TODO: 'Walk dog' added on line 4."]);
    }

    #[test]
    fn test_format_archived() {
        let files = vec![PathBuf::from("/t/todo.txt"), PathBuf::from("/t/done.txt")];
        assert_eq!(format_archived(&files), "TODO: /t/todo.txt, /t/done.txt archived.");
    }
}
