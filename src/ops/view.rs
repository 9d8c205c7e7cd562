use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Display;

use crate::model::config::{ColorConfig, DisplayConfig};
use crate::model::task::Task;
use crate::parse::task_parser::{TokenKind, remove_tokens, strip_priority};
use crate::util::color::REVERSE;

/// The dimension a listing is grouped by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    Priority,
    Date,
    Project,
    Context,
}

/// One task as it appears in a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewLine {
    /// 1-based position in the todo file
    pub number: usize,
    /// The stored task, untouched by display options
    pub task: Task,
    /// What gets printed after the number
    pub text: String,
}

/// A run of lines sharing a basis key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    /// `Some(key)` for project/context/date groups; rendered as `key:` with
    /// tab-indented lines
    pub heading: Option<String>,
    pub lines: Vec<ViewLine>,
}

/// A grouped, ordered listing, ready to render
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub groups: Vec<Group>,
    /// Number of tasks in the todo file
    pub total: usize,
}

impl View {
    /// Lines shown, capped at the store size. Tasks listed under several
    /// tags count once per listing.
    pub fn shown(&self) -> usize {
        let count: usize = self.groups.iter().map(|g| g.lines.len()).sum();
        count.min(self.total)
    }

    pub fn lines(&self) -> impl Iterator<Item = &ViewLine> {
        self.groups.iter().flat_map(|g| g.lines.iter())
    }
}

/// Build a listing of `tasks` grouped by `basis`.
pub fn build_view(tasks: &[Task], basis: Basis, display: &DisplayConfig) -> View {
    let mut groups = match basis {
        Basis::Priority => priority_groups(tasks, display),
        Basis::Date => keyed_groups(tasks, display, Task::due_dates),
        Basis::Project => keyed_groups(tasks, display, Task::projects),
        Basis::Context => keyed_groups(tasks, display, Task::contexts),
    };
    apply_suppressions(&mut groups, display);
    View {
        groups,
        total: tasks.len(),
    }
}

fn view_line(number: usize, task: &Task, display: &DisplayConfig) -> ViewLine {
    let text = if display.hide_priority {
        strip_priority(task.text())
    } else {
        task.text().to_string()
    };
    ViewLine {
        number,
        task: task.clone(),
        text,
    }
}

/// Priority buckets A through X, unprioritized tasks in X, file order inside
/// each bucket. Only `hide_priority` is applied.
pub(crate) fn priority_groups(tasks: &[Task], display: &DisplayConfig) -> Vec<Group> {
    let mut buckets: BTreeMap<char, Vec<ViewLine>> = BTreeMap::new();
    for (i, task) in tasks.iter().enumerate() {
        buckets
            .entry(task.bucket())
            .or_default()
            .push(view_line(i + 1, task, display));
    }
    buckets
        .into_values()
        .map(|lines| Group {
            heading: None,
            lines,
        })
        .collect()
}

/// One headed group per key, in key order; a task with several keys is
/// listed under each. Tasks with no key follow, unheaded.
fn keyed_groups<K: Ord + Display>(
    tasks: &[Task],
    display: &DisplayConfig,
    keys: impl Fn(&Task) -> BTreeSet<K>,
) -> Vec<Group> {
    let mut keyed: BTreeMap<K, Vec<ViewLine>> = BTreeMap::new();
    let mut rest = Vec::new();
    for (i, task) in tasks.iter().enumerate() {
        let task_keys = keys(task);
        if task_keys.is_empty() {
            rest.push(view_line(i + 1, task, display));
            continue;
        }
        for key in task_keys {
            keyed
                .entry(key)
                .or_default()
                .push(view_line(i + 1, task, display));
        }
    }

    let mut groups: Vec<Group> = keyed
        .into_iter()
        .map(|(key, lines)| Group {
            heading: Some(key.to_string()),
            lines,
        })
        .collect();
    if !rest.is_empty() {
        groups.push(Group {
            heading: None,
            lines: rest,
        });
    }
    groups
}

/// Tag hiding, then legacy sort, inside every group. Runs after grouping and
/// filtering so both see the unsuppressed text.
pub(crate) fn apply_suppressions(groups: &mut [Group], display: &DisplayConfig) {
    for group in groups {
        for line in &mut group.lines {
            line.text = hide_tags(&line.text, display);
        }
        if display.legacy_sort {
            legacy_sort(&mut group.lines);
        }
    }
}

/// Apply hide-projects, hide-contexts, hide-dates, in that order.
fn hide_tags(text: &str, display: &DisplayConfig) -> String {
    let mut text = text.to_string();
    if display.hide_projects {
        text = remove_tokens(&text, |k| *k == TokenKind::Project);
    }
    if display.hide_contexts {
        text = remove_tokens(&text, |k| *k == TokenKind::Context);
    }
    if display.hide_dates {
        text = remove_tokens(&text, |k| matches!(k, TokenKind::Due(_)));
    }
    text
}

/// Alphabetical by displayed text, ignoring the priority marker. Stable.
fn legacy_sort(lines: &mut [ViewLine]) {
    lines.sort_by_cached_key(|l| strip_priority(&l.text));
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Digits needed for the largest line number.
pub fn number_width(total: usize) -> usize {
    total.max(1).to_string().len()
}

/// Render a view to terminal lines, footer not included.
pub fn render_view(view: &View, display: &DisplayConfig, colors: &ColorConfig) -> Vec<String> {
    let width = number_width(view.total);
    let mut out = Vec::new();
    for group in &view.groups {
        if let Some(ref heading) = group.heading {
            out.push(format!("{}:", heading));
        }
        for line in &group.lines {
            let mut s = String::new();
            if group.heading.is_some() {
                s.push('\t');
            }
            s.push_str(&render_line(line, width, display, colors));
            out.push(s);
        }
    }
    out
}

/// `<color><reverse>NN text<reset>`. Plain mode drops the color codes.
fn render_line(
    line: &ViewLine,
    width: usize,
    display: &DisplayConfig,
    colors: &ColorConfig,
) -> String {
    let mut s = String::new();
    if !display.plain {
        s.push_str(colors.for_priority(line.task.priority()).ansi());
    }
    if display.invert {
        s.push_str(REVERSE);
    }
    s.push_str(&format!("{:0width$} {}", line.number, line.text, width = width));
    if !display.plain || display.invert {
        s.push_str(colors.default.ansi());
    }
    s
}

/// The summary printed under every listing.
pub fn footer(view: &View) -> [String; 2] {
    [
        "--".to_string(),
        format!("TODO: {} of {} tasks shown", view.shown(), view.total),
    ]
}
