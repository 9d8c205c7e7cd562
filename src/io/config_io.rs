use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::Config;

/// Name of the config file inside the todo directory
pub const CONFIG_FILE: &str = "config.toml";

/// Commented template written by `todo init`.
const CONFIG_TEMPLATE: &str = r##"# todo configuration. Every key is optional.

[files]
# Relative paths are resolved against the todo directory.
todo = "todo.txt"
done = "done.txt"

[display]
# Each of these can be flipped for one run with a command-line flag.
plain = false           # -p  no color codes
hide_priority = false   # -P  hide (A) markers in listings
prepend_date = false    # -t  stamp new tasks with today's date
hide_projects = false   # -+  hide +project tags
hide_contexts = false   # -@  hide @context tags
hide_dates = false      # -#  hide #{date} tags
invert = false          # -i  reverse video
legacy_sort = false     # -l  alphabetical order inside each group

[colors]
# black, red, green, brown, blue, purple, cyan, light grey, dark grey,
# light red, light green, yellow, light blue, light purple, light cyan,
# white, bold, default
default = "default"

[colors.priority]
A = "yellow"
B = "green"
C = "light blue"
X = "white"

[sync]
# Commit todo.txt and done.txt to git after every change.
enabled = false
"##;

/// Error type for config I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not edit {path}: {source}")]
    EditError {
        path: PathBuf,
        source: toml_edit::TomlError,
    },
    #[error("config template is not valid TOML: {0}")]
    TemplateError(#[from] toml_edit::TomlError),
}

/// Get the user's home directory
fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

/// Expand a leading `~` to the home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if path == "~" {
        return dirs_home();
    }
    match path.strip_prefix("~/") {
        Some(rest) => dirs_home().join(rest),
        None => PathBuf::from(path),
    }
}

/// Resolve the todo directory: `--dir`, then `$TODO_DIR`, then `~/.todo`.
pub fn resolve_todo_dir(flag: Option<&str>) -> PathBuf {
    if let Some(dir) = flag {
        return expand_tilde(dir);
    }
    match std::env::var("TODO_DIR") {
        Ok(dir) if !dir.is_empty() => expand_tilde(&dir),
        _ => dirs_home().join(".todo"),
    }
}

/// Resolve the config file: `--config`, then `<todo dir>/config.toml`.
pub fn resolve_config_path(todo_dir: &Path, flag: Option<&str>) -> PathBuf {
    match flag {
        Some(path) => expand_tilde(path),
        None => todo_dir.join(CONFIG_FILE),
    }
}

/// Resolve a configured file name against the todo directory.
pub fn resolve_file(todo_dir: &Path, name: &str) -> PathBuf {
    let path = expand_tilde(name);
    if path.is_absolute() {
        path
    } else {
        todo_dir.join(path)
    }
}

/// Load the config at `path`. A missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Render the config template, editing the few values `init` decides.
/// Comments and layout of the template are preserved.
pub fn render_config(sync_enabled: bool) -> Result<String, ConfigError> {
    let mut doc: toml_edit::DocumentMut = CONFIG_TEMPLATE.parse()?;
    set_sync_enabled(&mut doc, sync_enabled);
    Ok(doc.to_string())
}

/// Set `[sync] enabled`, keeping any trailing comment on the line.
pub fn set_sync_enabled(doc: &mut toml_edit::DocumentMut, enabled: bool) {
    if !doc.contains_key("sync") {
        doc["sync"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let decor = doc["sync"]
        .get("enabled")
        .and_then(|item| item.as_value())
        .map(|v| v.decor().clone());
    let mut value = toml_edit::Value::from(enabled);
    if let Some(decor) = decor {
        *value.decor_mut() = decor;
    }
    doc["sync"]["enabled"] = toml_edit::Item::Value(value);
}

/// Turn on `[sync] enabled` in an existing config file, keeping the rest of
/// the file as the user wrote it.
pub fn enable_sync_in_file(path: &Path) -> Result<(), ConfigError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let mut doc: toml_edit::DocumentMut = text.parse().map_err(|e| ConfigError::EditError {
        path: path.to_path_buf(),
        source: e,
    })?;
    set_sync_enabled(&mut doc, true);
    fs::write(path, doc.to_string()).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write a config file, refusing to clobber an existing one.
pub fn write_new_config(path: &Path, content: &str) -> Result<bool, ConfigError> {
    if path.exists() {
        return Ok(false);
    }
    fs::write(path, content).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(true)
}
