use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::task::Priority;
use crate::util::color::TermColor;

/// Configuration from config.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub files: FilesConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub colors: ColorConfig,
    #[serde(default)]
    pub sync: SyncConfig,
}

/// File names, relative to the todo directory unless absolute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilesConfig {
    #[serde(default = "default_todo_file")]
    pub todo: String,
    #[serde(default = "default_done_file")]
    pub done: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        FilesConfig {
            todo: default_todo_file(),
            done: default_done_file(),
        }
    }
}

fn default_todo_file() -> String {
    "todo.txt".to_string()
}

fn default_done_file() -> String {
    "done.txt".to_string()
}

/// Display toggles. Each command-line flag flips the configured value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayConfig {
    /// No color codes in listings
    #[serde(default)]
    pub plain: bool,
    /// Hide `(L)` markers in listings
    #[serde(default)]
    pub hide_priority: bool,
    /// Prefix new tasks with today's date
    #[serde(default)]
    pub prepend_date: bool,
    #[serde(default)]
    pub hide_projects: bool,
    #[serde(default)]
    pub hide_contexts: bool,
    #[serde(default)]
    pub hide_dates: bool,
    /// Reverse video
    #[serde(default)]
    pub invert: bool,
    /// Alphabetical order inside each bucket
    #[serde(default)]
    pub legacy_sort: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorConfig {
    /// Color for unprioritized lines and for resetting after each line
    #[serde(default = "default_color")]
    pub default: TermColor,
    /// Priority letter → color
    #[serde(default = "default_priority_colors")]
    pub priority: BTreeMap<Priority, TermColor>,
}

impl Default for ColorConfig {
    fn default() -> Self {
        ColorConfig {
            default: default_color(),
            priority: default_priority_colors(),
        }
    }
}

impl ColorConfig {
    /// The color a line is drawn in. Prioritized lines with no color of
    /// their own fall back to the `X` color; unprioritized lines use the
    /// default color.
    pub fn for_priority(&self, priority: Option<Priority>) -> TermColor {
        let Some(p) = priority else {
            return self.default;
        };
        self.priority
            .get(&p)
            .or_else(|| Priority::new(Priority::LAST).and_then(|x| self.priority.get(&x)))
            .copied()
            .unwrap_or(self.default)
    }
}

fn default_color() -> TermColor {
    TermColor::Default
}

fn default_priority_colors() -> BTreeMap<Priority, TermColor> {
    [
        ('A', TermColor::Yellow),
        ('B', TermColor::Green),
        ('C', TermColor::LightBlue),
        ('X', TermColor::White),
    ]
    .into_iter()
    .filter_map(|(c, color)| Priority::new(c).map(|p| (p, color)))
    .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Commit the todo files to git after every change
    #[serde(default)]
    pub enabled: bool,
}
