//! Versioned message-merge rendering: a for-each-duplicated subtree writes
//! its output onto edges stamped with a `version_index`. A node downstream
//! of the (un-duplicated) for-each group sees one edge per iteration and
//! renders them back in order — by `index` alone, never by `sub_header`,
//! per the engine's merge-ordering rule.

use crate::object::{EdgeModifier, EdgeObject};

/// Collects every completed edge among `edge_ids` that carries a version
/// stamp, sorted by iteration index, and joins their content with blank
/// lines — the default rendering a downstream node sees for a for-each
/// result it didn't otherwise combine itself.
pub fn render_versioned(edges: &[&EdgeObject]) -> String {
    let mut versioned: Vec<(usize, String)> = edges
        .iter()
        .filter_map(|edge| {
            let payload = edge.payload();
            let version = payload.versions.first()?;
            Some((version.index, payload.content.unwrap_or_default()))
        })
        .collect();
    versioned.sort_by_key(|(index, _)| *index);
    versioned.into_iter().map(|(_, content)| content).collect::<Vec<_>>().join("\n\n")
}

/// Renders a set of same-label versioned edges per the render mode the
/// destination edge's modifier selects: a two-column Markdown table keyed
/// by iteration, a nested bullet list, ATX headings, or (the default)
/// blank-line-separated paragraphs. Embedded newlines become `<br>` inside
/// table cells so one iteration's value can't break the row out.
pub fn render_modifier(edges: &[&EdgeObject], label: &str, modifier: Option<EdgeModifier>) -> String {
    let mut versioned: Vec<(usize, String)> = edges
        .iter()
        .map(|edge| {
            let payload = edge.payload();
            let index = payload.versions.first().map(|v| v.index).unwrap_or(0);
            (index, payload.content.unwrap_or_default())
        })
        .collect();
    versioned.sort_by_key(|(index, _)| *index);

    match modifier {
        Some(EdgeModifier::Table) => {
            let mut out = format!("| # | {label} |\n| --- | --- |\n");
            for (index, content) in &versioned {
                out.push_str(&format!("| {} | {} |\n", index + 1, content.replace('\n', "<br>")));
            }
            out.trim_end().to_string()
        }
        Some(EdgeModifier::List) => {
            versioned.into_iter().map(|(_, content)| format!("- {content}")).collect::<Vec<_>>().join("\n")
        }
        Some(EdgeModifier::Headers) => versioned
            .into_iter()
            .map(|(index, content)| format!("### {label} {}\n{content}", index + 1))
            .collect::<Vec<_>>()
            .join("\n\n"),
        _ => versioned.into_iter().map(|(_, content)| content).collect::<Vec<_>>().join("\n\n"),
    }
}
