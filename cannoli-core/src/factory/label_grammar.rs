//! Edge-label grammar: prefix, body, optional trailing `|`/`~`. Reified as
//! named parsers rather than scattered regexes.
//!
//! A raw canvas edge label decomposes into:
//! - an optional leading prefix selecting a subtype or modifier
//!   (`* ? @ < =` select subtype; `[` / `:` select a modifier),
//! - the body (the edge's logical name/label used for variable/field/choice
//!   matching and versioned-edge fan-in grouping),
//! - an optional trailing `|` or `~` enabling `add_messages`,
//! - an optional trailing `(table|list|headers)` render-mode marker
//!   consulted by the merge-rendering destination edge.

use crate::object::{EdgeModifier, EdgeSubtype};

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ParsedLabel {
    pub subtype_prefix: Option<EdgeSubtype>,
    pub modifier: Option<EdgeModifier>,
    pub body: String,
    pub add_messages: bool,
}

/// Parses one raw edge label per the grammar above. An empty label parses to
/// an empty body with no prefix/modifier/add_messages — callers apply the
/// heuristic fallback in that case.
pub fn parse_label(raw: &str) -> ParsedLabel {
    let mut rest = raw.trim();
    let mut add_messages = false;

    if let Some(stripped) = rest.strip_suffix('|') {
        add_messages = true;
        rest = stripped.trim_end();
    } else if let Some(stripped) = rest.strip_suffix('~') {
        add_messages = true;
        rest = stripped.trim_end();
    }

    let mut modifier = None;
    if let Some(stripped) = rest.strip_prefix('[') {
        modifier = Some(EdgeModifier::Folder);
        rest = stripped.trim_start();
    } else if let Some(stripped) = rest.strip_prefix(':') {
        modifier = Some(EdgeModifier::Property);
        rest = stripped.trim_start();
    }

    if let Some(mode) = rest.strip_suffix(")") {
        if let Some(idx) = mode.rfind('(') {
            let marker = &mode[idx + 1..];
            let render_mode = match marker {
                "table" => Some(EdgeModifier::Table),
                "list" => Some(EdgeModifier::List),
                "headers" => Some(EdgeModifier::Headers),
                _ => None,
            };
            if let Some(render_mode) = render_mode {
                modifier = Some(render_mode);
                rest = mode[..idx].trim_end();
            }
        }
    }

    let (subtype_prefix, body) = if let Some(stripped) = rest.strip_prefix('*') {
        (Some(EdgeSubtype::Choice), stripped.trim_start().to_string())
    } else if let Some(stripped) = rest.strip_prefix('?') {
        (Some(EdgeSubtype::Field), stripped.trim_start().to_string())
    } else if let Some(stripped) = rest.strip_prefix('@') {
        (Some(EdgeSubtype::Variable), stripped.trim_start().to_string())
    } else if let Some(stripped) = rest.strip_prefix('<') {
        (Some(EdgeSubtype::List), stripped.trim_start().to_string())
    } else if let Some(stripped) = rest.strip_prefix('=') {
        (Some(EdgeSubtype::Config), stripped.trim_start().to_string())
    } else {
        (None, rest.to_string())
    };

    ParsedLabel {
        subtype_prefix,
        modifier,
        body,
        add_messages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: a bare label with no prefix/suffix parses to body only.
    #[test]
    fn parse_label_plain_body() {
        let p = parse_label("myVar");
        assert_eq!(p.subtype_prefix, None);
        assert_eq!(p.modifier, None);
        assert_eq!(p.body, "myVar");
        assert!(!p.add_messages);
    }

    /// **Scenario**: `*yes` is a choice-prefixed label with body "yes".
    #[test]
    fn parse_label_choice_prefix() {
        let p = parse_label("*yes");
        assert_eq!(p.subtype_prefix, Some(EdgeSubtype::Choice));
        assert_eq!(p.body, "yes");
    }

    /// **Scenario**: `?field` is a field-prefixed label.
    #[test]
    fn parse_label_field_prefix() {
        let p = parse_label("?field");
        assert_eq!(p.subtype_prefix, Some(EdgeSubtype::Field));
        assert_eq!(p.body, "field");
    }

    /// **Scenario**: trailing `|` sets add_messages and is stripped from the body.
    #[test]
    fn parse_label_trailing_pipe_sets_add_messages() {
        let p = parse_label("history|");
        assert!(p.add_messages);
        assert_eq!(p.body, "history");
    }

    /// **Scenario**: leading `[` sets the folder modifier.
    #[test]
    fn parse_label_leading_bracket_sets_folder_modifier() {
        let p = parse_label("[notes/inbox");
        assert_eq!(p.modifier, Some(EdgeModifier::Folder));
        assert_eq!(p.body, "notes/inbox");
    }

    /// **Scenario**: leading `:` sets the property modifier.
    #[test]
    fn parse_label_leading_colon_sets_property_modifier() {
        let p = parse_label(":status");
        assert_eq!(p.modifier, Some(EdgeModifier::Property));
        assert_eq!(p.body, "status");
    }

    /// **Scenario**: a trailing `(table)` marker sets the table render modifier.
    #[test]
    fn parse_label_table_render_marker() {
        let p = parse_label("results(table)");
        assert_eq!(p.modifier, Some(EdgeModifier::Table));
        assert_eq!(p.body, "results");
    }

    /// **Scenario**: prefix and trailing pipe compose correctly.
    #[test]
    fn parse_label_prefix_and_trailing_pipe_compose() {
        let p = parse_label("@name|");
        assert_eq!(p.subtype_prefix, Some(EdgeSubtype::Variable));
        assert_eq!(p.body, "name");
        assert!(p.add_messages);
    }
}
