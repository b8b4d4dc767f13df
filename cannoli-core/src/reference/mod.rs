//! The reference grammar: `{{NOTE}}`, `{{[[Note]](modifiers)}}`, `{{[floating]}}`,
//! `{{@var}}`, `{{+@create}}`, and `{{#}}`/`{{##}}` loop-index placeholders.
//!
//! Reified as named parser functions rather than scattered regexes: each
//! placeholder shape gets its own recognizer (`parse_one`), and the module
//! exposes `parse_references` to scan a whole node's `text` for all
//! placeholders in order.

use once_cell::sync::Lazy;
use regex::Regex;

/// One parsed `{{...}}` placeholder found in a node's `text`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reference {
    /// `{{name}}` — a plain variable/edge-label lookup, including the
    /// special names `NOTE` and `SELECTION`, which have no backing edge id.
    Variable(String),
    /// `{{[[Note]]}}` or `{{[[Note]](modifier)}}` — a note-link reference.
    NoteLink { name: String, modifier: Option<String> },
    /// `{{[name]}}` — a floating-variable-node lookup.
    Floating(String),
    /// `{{@name}}` — a dynamically named reference (e.g. action/template name).
    Dynamic(String),
    /// `{{+@name}}` — a dynamic-name create-note reference.
    DynamicCreate(String),
    /// `{{#}}`, `{{##}}`, ... — loop index of the Nth enclosing repeat/for-each
    /// group by depth (one `#` = depth 1, closest enclosing loop).
    LoopIndex(usize),
}

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{(.*?)\}\}").unwrap());
static NOTE_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[\[([^\]]+)\]\](?:\(([^)]*)\))?$").unwrap());
static FLOATING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[([^\]]+)\]$").unwrap());
static LOOP_INDEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#+)$").unwrap());

/// Classifies the inner text of a single `{{...}}` match.
pub fn parse_one(inner: &str) -> Reference {
    let trimmed = inner.trim();

    if let Some(caps) = LOOP_INDEX.captures(trimmed) {
        return Reference::LoopIndex(caps[1].len());
    }
    if let Some(caps) = NOTE_LINK.captures(trimmed) {
        return Reference::NoteLink {
            name: caps[1].to_string(),
            modifier: caps.get(2).map(|m| m.as_str().to_string()),
        };
    }
    if let Some(caps) = FLOATING.captures(trimmed) {
        return Reference::Floating(caps[1].to_string());
    }
    if let Some(rest) = trimmed.strip_prefix("+@") {
        return Reference::DynamicCreate(rest.to_string());
    }
    if let Some(rest) = trimmed.strip_prefix('@') {
        return Reference::Dynamic(rest.to_string());
    }
    Reference::Variable(trimmed.to_string())
}

/// Scans `text` for every `{{...}}` placeholder, in left-to-right order.
/// A node's `references[]` is exactly this list.
pub fn parse_references(text: &str) -> Vec<Reference> {
    PLACEHOLDER
        .captures_iter(text)
        .map(|caps| parse_one(&caps[1]))
        .collect()
}

/// True if `text` is *solely* a single `{{...}}` placeholder with nothing
/// else on the line — used by the factory to classify a standalone
/// `text`-node as a `reference` content node.
pub fn is_bare_reference(text: &str) -> bool {
    let trimmed = text.trim();
    if trimmed.contains('\n') {
        return false;
    }
    PLACEHOLDER.find_iter(trimmed).count() == 1
        && PLACEHOLDER
            .find(trimmed)
            .map(|m| m.start() == 0 && m.end() == trimmed.len())
            .unwrap_or(false)
}

/// One image embed found in a call node's text: images embedded as
/// `![[...]]` file refs or markdown `![](url)` links.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ImageEmbed {
    File(String),
    Url(String),
}

static FILE_EMBED: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[\[([^\]]+)\]\]").unwrap());
static MARKDOWN_IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[[^\]]*\]\(([^)]+)\)").unwrap());

pub fn parse_image_embeds(text: &str) -> Vec<ImageEmbed> {
    let mut out = Vec::new();
    for caps in FILE_EMBED.captures_iter(text) {
        out.push(ImageEmbed::File(caps[1].to_string()));
    }
    for caps in MARKDOWN_IMAGE.captures_iter(text) {
        out.push(ImageEmbed::Url(caps[1].to_string()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: a plain `{{name}}` placeholder parses as Variable.
    #[test]
    fn parse_one_plain_variable() {
        assert_eq!(parse_one("input"), Reference::Variable("input".to_string()));
    }

    /// **Scenario**: `{{[[Note]]}}` parses as a note link with no modifier.
    #[test]
    fn parse_one_note_link_without_modifier() {
        assert_eq!(
            parse_one("[[Note]]"),
            Reference::NoteLink { name: "Note".to_string(), modifier: None }
        );
    }

    /// **Scenario**: `{{[[Note]](folder)}}` parses as a note link carrying its modifier.
    #[test]
    fn parse_one_note_link_with_modifier() {
        assert_eq!(
            parse_one("[[Note]](folder)"),
            Reference::NoteLink { name: "Note".to_string(), modifier: Some("folder".to_string()) }
        );
    }

    /// **Scenario**: `{{[floating]}}` parses as Floating.
    #[test]
    fn parse_one_floating_variable() {
        assert_eq!(parse_one("[floating]"), Reference::Floating("floating".to_string()));
    }

    /// **Scenario**: `{{@dynamic}}` and `{{+@create}}` parse distinctly.
    #[test]
    fn parse_one_dynamic_and_dynamic_create() {
        assert_eq!(parse_one("@tpl"), Reference::Dynamic("tpl".to_string()));
        assert_eq!(parse_one("+@newNote"), Reference::DynamicCreate("newNote".to_string()));
    }

    /// **Scenario**: `{{#}}` is depth 1, `{{##}}` is depth 2.
    #[test]
    fn parse_one_loop_index_depth() {
        assert_eq!(parse_one("#"), Reference::LoopIndex(1));
        assert_eq!(parse_one("##"), Reference::LoopIndex(2));
    }

    /// **Scenario**: scanning text with multiple placeholders returns them in order.
    #[test]
    fn parse_references_scans_multiple_placeholders_in_order() {
        let refs = parse_references("Hello {{name}}, see {{[[Note]]}} at {{#}}");
        assert_eq!(
            refs,
            vec![
                Reference::Variable("name".to_string()),
                Reference::NoteLink { name: "Note".to_string(), modifier: None },
                Reference::LoopIndex(1),
            ]
        );
    }

    /// **Scenario**: a text node containing only one placeholder on a single line is a bare reference.
    #[test]
    fn is_bare_reference_single_placeholder_no_newline() {
        assert!(is_bare_reference("{{[[Note]]}}"));
        assert!(!is_bare_reference("prefix {{[[Note]]}}"));
        assert!(!is_bare_reference("{{[[Note]]}}\nmore text"));
        assert!(!is_bare_reference("{{a}} and {{b}}"));
    }

    /// **Scenario**: image embeds are extracted for both file and markdown-url forms.
    #[test]
    fn parse_image_embeds_file_and_url_forms() {
        let embeds = parse_image_embeds("look ![[photo.png]] and ![alt](https://x/y.png)");
        assert_eq!(
            embeds,
            vec![
                ImageEmbed::File("photo.png".to_string()),
                ImageEmbed::Url("https://x/y.png".to_string()),
            ]
        );
    }
}
