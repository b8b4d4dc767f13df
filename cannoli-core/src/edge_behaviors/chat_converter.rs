//! A `chat-converter` edge parses a source node's rendered content against
//! the transcript block format (`"---\n# <u>{role}</u>\n\n{content}"`) into
//! a typed message list, so a downstream call node that only understands
//! `{messages}` can accept a multi-turn transcript instead of one opaque
//! string. Content with no recognizable block delimiter is treated as a
//! single user turn, same as before this parsing existed.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::context::RunContext;
use crate::message::Message;
use crate::object::{EdgeObject, NodeObject};

static BLOCK_HEADER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^---\n# <u>(\w+)</u>\n\n").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Truncation {
    None,
    LastN(usize),
    TokenBudget(usize),
}

/// Parses the edge's own label as a truncation directive, the same way a
/// repeat group's label doubles as its loop count: a plain `"N"` keeps only
/// the last N turns; a `"#N"` keeps as many trailing turns as fit an N-token
/// budget (§12.4); anything else, including no label, truncates nothing.
fn parse_truncation(label: Option<&str>) -> Truncation {
    let Some(trimmed) = label.map(str::trim) else { return Truncation::None };
    if let Some(rest) = trimmed.strip_prefix('#') {
        if let Ok(n) = rest.trim().parse::<usize>() {
            return Truncation::TokenBudget(n);
        }
        return Truncation::None;
    }
    trimmed.parse::<usize>().map(Truncation::LastN).unwrap_or(Truncation::None)
}

fn role_to_message(role: &str, content: String) -> Message {
    match role {
        "system" => Message::System(content),
        "assistant" => Message::assistant(content),
        _ => Message::User(content),
    }
}

/// Splits `transcript` into `(role, content)` blocks at each
/// `---\n# <u>{role}</u>\n\n` delimiter, trimming each block's trailing
/// whitespace (the blank line the format template leaves before the next
/// block, or before the `"END OF STREAM"` sentinel).
fn parse_transcript(transcript: &str) -> Vec<Message> {
    let headers: Vec<_> = BLOCK_HEADER.captures_iter(transcript).collect();
    let mut messages = Vec::with_capacity(headers.len());
    for (i, caps) in headers.iter().enumerate() {
        let role = caps.get(1).unwrap().as_str().to_string();
        let whole = caps.get(0).unwrap();
        let start = whole.end();
        let end = headers.get(i + 1).map(|next| next.get(0).unwrap().start()).unwrap_or(transcript.len());
        let content = transcript[start..end].trim_end().to_string();
        messages.push(role_to_message(&role, content));
    }
    messages
}

/// A simple whitespace-token estimator — not a real tokenizer, just a
/// stable, cheap proxy for budget truncation.
fn estimate_tokens(message: &Message) -> usize {
    message.text().split_whitespace().count()
}

/// Keeps the trailing messages allowed under `mode`, trimmed from the
/// front — the oldest turns are dropped first, as a transcript grows.
fn truncate(messages: Vec<Message>, mode: Truncation) -> Vec<Message> {
    match mode {
        Truncation::None => messages,
        Truncation::LastN(n) => {
            let start = messages.len().saturating_sub(n);
            messages[start..].to_vec()
        }
        Truncation::TokenBudget(budget) => {
            let mut kept = Vec::new();
            let mut total = 0;
            for message in messages.into_iter().rev() {
                let cost = estimate_tokens(&message);
                if total + cost > budget && !kept.is_empty() {
                    break;
                }
                total += cost;
                kept.push(message);
            }
            kept.reverse();
            kept
        }
    }
}

pub fn load(edge: &EdgeObject, source: &NodeObject, _ctx: &RunContext) {
    let content = source.buffer.lock().expect("node buffer lock poisoned").content.clone().unwrap_or_default();

    let parsed = parse_transcript(&content);
    let messages = if parsed.is_empty() {
        vec![Message::User(content.clone())]
    } else {
        truncate(parsed, parse_truncation(edge.label.as_deref()))
    };

    let rendered = messages.iter().map(Message::text).collect::<Vec<_>>().join("\n\n");
    edge.load(Some(rendered), messages, edge.payload().versions);
}
