use chrono::NaiveDate;

use crate::model::task::Task;
use crate::parse::task_parser::{split_priority, strip_priority};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Serialize lines to file content: each line gets exactly one `eol`.
pub fn serialize_lines(lines: &[String], eol: &str) -> String {
    let mut out = String::with_capacity(lines.iter().map(|l| l.len() + eol.len()).sum());
    for line in lines {
        out.push_str(line);
        out.push_str(eol);
    }
    out
}

/// Stamp a creation date onto a new task line: after its `(L)` marker if
/// there is one, else at the start.
///
/// Unlike the stored-marker check this accepts `(L)` with no space after it,
/// so `(A)Call mom` becomes `(A) 2024-01-01 Call mom`.
pub fn stamp_created(line: &str, date: NaiveDate) -> String {
    let stamp = date.format(DATE_FORMAT);
    let (priority, rest) = split_priority(line);
    if let Some(p) = priority {
        return format!("({}) {} {}", p, stamp, rest);
    }
    let b = line.as_bytes();
    if b.len() >= 3 && b[0] == b'(' && b[2] == b')' && (b'A'..=b'X').contains(&b[1]) {
        return format!("{} {} {}", &line[..3], stamp, &line[3..]);
    }
    format!("{} {}", stamp, line)
}

/// Render the done-file entry for a completed task:
/// `x <date> <line minus priority marker>`.
pub fn completion_entry(task: &Task, date: NaiveDate) -> String {
    format!("x {} {}", date.format(DATE_FORMAT), strip_priority(task.text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_serialize_lines() {
        let lines = vec!["one".to_string(), "two".to_string()];
        assert_eq!(serialize_lines(&lines, "\n"), "one\ntwo\n");
        assert_eq!(serialize_lines(&lines, "\r\n"), "one\r\ntwo\r\n");
        assert_eq!(serialize_lines(&[], "\n"), "");
    }

    #[test]
    fn test_stamp_created() {
        assert_eq!(stamp_created("Call mom", day()), "2024-01-01 Call mom");
        assert_eq!(stamp_created("(A) Call mom", day()), "(A) 2024-01-01 Call mom");
        assert_eq!(stamp_created("(A)Call mom", day()), "(A) 2024-01-01 Call mom");
        assert_eq!(stamp_created("(Z) Call mom", day()), "2024-01-01 (Z) Call mom");
    }

    #[test]
    fn test_completion_entry_strips_priority() {
        let task = Task::parse("(A) Task one");
        assert_eq!(completion_entry(&task, day()), "x 2024-01-01 Task one");
        let task = Task::parse("Buy milk +errands");
        assert_eq!(completion_entry(&task, day()), "x 2024-01-01 Buy milk +errands");
    }
}
