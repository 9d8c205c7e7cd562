use regex::Regex;

use crate::model::config::DisplayConfig;
use crate::model::task::Task;
use crate::ops::view::{View, apply_suppressions, number_width, priority_groups};

/// Compile one filter term. The term is matched literally, optionally
/// flanked by a single whitespace character.
fn term_regex(term: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"\s?({})\s?", regex::escape(term)))
}

/// Keep only the lines of the priority listing whose numbered text matches
/// every term. An empty term list keeps everything.
///
/// Terms see the line as it would be printed before tag hiding: zero-padded
/// number, a space, then the text with `hide_priority` applied. Tags are
/// hidden after matching, so `+proj` can be filtered on even with `-+`.
/// Legacy sort then orders the matches inside each priority bucket, as in
/// the plain listing.
pub fn filter_view(
    tasks: &[Task],
    terms: &[String],
    display: &DisplayConfig,
) -> Result<View, regex::Error> {
    let regexes = terms
        .iter()
        .map(|t| term_regex(t))
        .collect::<Result<Vec<_>, _>>()?;
    let width = number_width(tasks.len());

    let mut groups = priority_groups(tasks, display);
    for group in &mut groups {
        for re in &regexes {
            group
                .lines
                .retain(|l| re.is_match(&format!("{:0width$} {}", l.number, l.text, width = width)));
        }
    }
    groups.retain(|g| !g.lines.is_empty());
    apply_suppressions(&mut groups, display);

    let view = View {
        groups,
        total: tasks.len(),
    };
    tracing::debug!(terms = terms.len(), matched = view.shown(), "filtered listing");
    Ok(view)
}
