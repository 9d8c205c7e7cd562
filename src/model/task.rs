use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::parse::task_parser::{self, TokenKind};

/// A task priority, one uppercase letter in `A..=X`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "char", into = "char")]
pub struct Priority(char);

impl Priority {
    /// Highest priority letter
    pub const FIRST: char = 'A';
    /// Lowest priority letter; also the bucket of unprioritized tasks
    pub const LAST: char = 'X';

    /// Accepts a single uppercase letter in `A..=X`.
    pub fn new(letter: char) -> Option<Self> {
        if (Self::FIRST..=Self::LAST).contains(&letter) {
            Some(Priority(letter))
        } else {
            None
        }
    }

    /// Parse a command-line argument. Exactly one character is accepted.
    pub fn parse(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Self::new(c),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        self.0
    }

    /// Every legal priority, highest first.
    #[cfg(test)]
    pub(crate) fn all() -> impl Iterator<Item = Priority> {
        (Self::FIRST..=Self::LAST).map(Priority)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<char> for Priority {
    type Error = String;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        Priority::new(c).ok_or_else(|| format!("invalid priority '{}': expected A-X", c))
    }
}

impl From<Priority> for char {
    fn from(p: Priority) -> char {
        p.0
    }
}

/// One line of the todo file.
///
/// The raw text is the single source of truth. Priority and creation date
/// are parsed once at construction; tags are scanned on demand. Fields are
/// private so the cached values can never drift from the text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    text: String,
    priority: Option<Priority>,
    created: Option<NaiveDate>,
}

impl Task {
    /// Parse a raw line. Never fails; a trailing newline is dropped.
    pub fn parse(raw: &str) -> Self {
        let text = raw
            .strip_suffix('\n')
            .map(|s| s.strip_suffix('\r').unwrap_or(s))
            .unwrap_or(raw)
            .to_string();
        let (priority, after_marker) = task_parser::split_priority(&text);
        let (created, _) = task_parser::split_created(after_marker);
        Task {
            text,
            priority,
            created,
        }
    }

    /// The full line text, without a trailing newline.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn priority(&self) -> Option<Priority> {
        self.priority
    }

    /// The priority bucket: the parsed letter, or `X` for none.
    pub fn bucket(&self) -> char {
        self.priority.map_or(Priority::LAST, Priority::letter)
    }

    pub fn created(&self) -> Option<NaiveDate> {
        self.created
    }

    /// Text after the priority marker and creation date.
    pub fn body(&self) -> &str {
        let (_, rest) = task_parser::split_priority(&self.text);
        task_parser::split_created(rest).1
    }

    /// All `+project` names in the line.
    pub fn projects(&self) -> BTreeSet<String> {
        self.tag_values(TokenKind::Project)
    }

    /// All `@context` names in the line.
    pub fn contexts(&self) -> BTreeSet<String> {
        self.tag_values(TokenKind::Context)
    }

    /// All `#{YYYY-MM-DD}` due dates in the line.
    pub fn due_dates(&self) -> BTreeSet<NaiveDate> {
        task_parser::scan_tokens(&self.text)
            .into_iter()
            .filter_map(|t| match t.kind {
                TokenKind::Due(date) => Some(date),
                _ => None,
            })
            .collect()
    }

    /// A copy of this task with the given priority marker.
    pub fn with_priority(&self, priority: Priority) -> Task {
        Task::parse(&task_parser::set_priority(&self.text, priority))
    }

    /// A copy of this task with any leading priority marker removed.
    pub fn without_priority(&self) -> Task {
        Task::parse(&task_parser::strip_priority(&self.text))
    }

    fn tag_values(&self, kind: TokenKind) -> BTreeSet<String> {
        task_parser::scan_tokens(&self.text)
            .into_iter()
            .filter(|t| t.kind == kind)
            .map(|t| t.value.to_string())
            .collect()
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_priority_range() {
        assert_eq!(Priority::new('A').map(Priority::letter), Some('A'));
        assert_eq!(Priority::new('X').map(Priority::letter), Some('X'));
        assert!(Priority::new('Y').is_none());
        assert!(Priority::new('Z').is_none());
        assert!(Priority::new('a').is_none());
        assert_eq!(Priority::all().count(), 24);
    }

    #[test]
    fn test_priority_parse_arg() {
        assert_eq!(Priority::parse("C"), Priority::new('C'));
        assert!(Priority::parse("").is_none());
        assert!(Priority::parse("AB").is_none());
        assert!(Priority::parse("c").is_none());
    }

    #[test]
    fn test_parse_full_line() {
        let task = Task::parse("(A) 2024-01-01 Call dentist +health @phone\n");
        assert_eq!(task.text(), "(A) 2024-01-01 Call dentist +health @phone");
        assert_eq!(task.priority(), Priority::new('A'));
        assert_eq!(task.created(), Some(date(2024, 1, 1)));
        assert_eq!(task.body(), "Call dentist +health @phone");
        assert_eq!(task.projects().into_iter().collect::<Vec<_>>(), vec!["health"]);
        assert_eq!(task.contexts().into_iter().collect::<Vec<_>>(), vec!["phone"]);
        assert!(task.due_dates().is_empty());
    }

    #[test]
    fn test_parse_unprioritized() {
        let task = Task::parse("Buy milk +errands");
        assert_eq!(task.priority(), None);
        assert_eq!(task.bucket(), 'X');
        assert_eq!(task.created(), None);
        assert_eq!(task.body(), "Buy milk +errands");
    }

    #[test]
    fn test_marker_requires_trailing_space() {
        let task = Task::parse("(A)Call mom");
        assert_eq!(task.priority(), None);
        let task = Task::parse("(Z) out of range");
        assert_eq!(task.priority(), None);
    }

    #[test]
    fn test_date_without_priority() {
        let task = Task::parse("2023-12-31 New year prep");
        assert_eq!(task.priority(), None);
        assert_eq!(task.created(), Some(date(2023, 12, 31)));
        assert_eq!(task.body(), "New year prep");
    }

    #[test]
    fn test_due_dates() {
        let task = Task::parse("(B) Finish report #{2024-03-15} +work #{2024-3-1}");
        let due: Vec<_> = task.due_dates().into_iter().collect();
        assert_eq!(due, vec![date(2024, 3, 1), date(2024, 3, 15)]);
    }

    #[test]
    fn test_multiple_projects_deduplicated() {
        let task = Task::parse("Write +docs and +code for +docs");
        let projects: Vec<_> = task.projects().into_iter().collect();
        assert_eq!(projects, vec!["code", "docs"]);
    }

    #[test]
    fn test_with_and_without_priority() {
        let task = Task::parse("Task two +proj");
        let pri = task.with_priority(Priority::new('C').unwrap());
        assert_eq!(pri.text(), "(C) Task two +proj");
        assert_eq!(pri.priority(), Priority::new('C'));
        assert_eq!(pri.without_priority().text(), "Task two +proj");
    }

    #[test]
    fn test_display_is_identity() {
        let line = "(B) 2024-02-02 Something @home #{2024-02-10}";
        assert_eq!(Task::parse(line).to_string(), line);
    }
}
