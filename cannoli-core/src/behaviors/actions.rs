//! Shared action-invocation plumbing (§4.5 Action invocation, §6 Actions),
//! used by both the HTTP content node's `action`/`mcp` modes and the
//! sub-cannoli content node: collecting incoming variable values into an
//! argument map, coercing them per the action's declared `arg_info`,
//! collapsing a receive-style action's two-phase handshake into one
//! invocation, and routing an object-shaped response back out over
//! same-named outgoing edges (`coerceActionResponseToString`).

use std::collections::HashMap;

use serde_json::Value;

use crate::context::RunContext;
use crate::error::CannoliError;
use crate::object::NodeObject;
use crate::ports::{Action, ArgCategory, ArgType};

/// Every incoming labeled edge's content, keyed by label, plus the node's
/// own rendered text under the reserved key `"input"`.
fn collect_incoming_args(node: &NodeObject, ctx: &RunContext, rendered: &str) -> HashMap<String, String> {
    let mut args = HashMap::new();
    args.insert("input".to_string(), rendered.to_string());
    for dep_id in &node.base.dependencies {
        let Some(edge) = ctx.graph.edges.get(dep_id) else { continue };
        let Some(label) = &edge.label else { continue };
        if let Some(content) = edge.content() {
            args.insert(label.clone(), content);
        }
    }
    args
}

fn coerce(ty: ArgType, raw: &str) -> Value {
    match ty {
        ArgType::Number => raw
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(raw.to_string())),
        ArgType::Boolean => match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Value::Bool(true),
            "false" | "0" | "no" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        ArgType::StringList => Value::Array(raw.split(',').map(|s| Value::String(s.trim().to_string())).collect()),
        ArgType::String => Value::String(raw.to_string()),
    }
}

/// Builds the JSON args object `action.call` receives. An action with no
/// declared `arg_info` (the default) receives every incoming value
/// verbatim, as a plain object of strings — this is the old fixed
/// `{"input": ...}` shape generalized to every labeled incoming edge. An
/// action that declares `arg_info` instead gets exactly those keys, sourced
/// and coerced per entry: `Config`/`Secret` pull from the run's `RunConfig`;
/// `FileManager`/`Fetcher` are supplied as the fixed sentinel string
/// `"<port>"`, since the ports themselves aren't representable as JSON and
/// an action declaring one of these categories is expected to reach the
/// real port through its own side channel, not through this value;
/// `Extra`/`Arg` pull from the incoming map, coerced by `ty` for `Arg`.
pub fn build_args(node: &NodeObject, ctx: &RunContext, action: &dyn Action, rendered: &str) -> Value {
    let incoming = collect_incoming_args(node, ctx, rendered);
    let declared = action.arg_info();
    if declared.is_empty() {
        return Value::Object(incoming.into_iter().map(|(k, v)| (k, Value::String(v))).collect());
    }

    let mut map = serde_json::Map::new();
    for info in &declared {
        let value = match info.category {
            ArgCategory::Config | ArgCategory::Secret => ctx.config.get(&info.name).cloned().unwrap_or(Value::Null),
            ArgCategory::FileManager | ArgCategory::Fetcher => Value::String("<port>".to_string()),
            ArgCategory::Extra => incoming.get(&info.name).cloned().map(Value::String).unwrap_or(Value::Null),
            ArgCategory::Arg => incoming.get(&info.name).map(|raw| coerce(info.ty, raw)).unwrap_or(Value::Null),
        };
        map.insert(info.name.clone(), value);
    }
    Value::Object(map)
}

/// Runs `action` against `args`. For a receive-style action, `call`'s result
/// is an intermediate value that `receive` finalizes; both calls happen
/// here in one pass rather than as a genuine scheduler-level suspend, and
/// the intermediate is kept on the node's `receive_info` buffer field for
/// introspection.
pub async fn invoke(action: &dyn Action, args: Value, node: &NodeObject) -> Result<Value, CannoliError> {
    let intermediate = action.call(args).await?;
    if !action.is_receive_style() {
        return Ok(intermediate);
    }
    node.buffer.lock().expect("node buffer lock poisoned").receive_info = Some(intermediate.clone());
    action.receive(intermediate).await
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `coerceActionResponseToString` (§6 Actions): if `response` is a JSON
/// object and every one of `node`'s labeled outgoing edges matches one of
/// its keys, route each value directly onto its same-named edge — bypassing
/// the single-buffer-content path — and return `None`, since no single
/// string represents a response that was fully routed this way. Otherwise
/// render the whole response as a string for the node's own buffer.
pub fn coerce_response_to_string(node: &NodeObject, ctx: &RunContext, response: &Value) -> Option<String> {
    let outgoing: Vec<_> = ctx.graph.edges.values().filter(|edge| edge.source == node.id()).collect();
    let labeled: Vec<_> = outgoing.iter().filter(|edge| edge.label.is_some()).collect();

    if let Value::Object(map) = response {
        if !labeled.is_empty() && labeled.iter().all(|edge| map.contains_key(edge.label.as_ref().unwrap())) {
            for edge in &labeled {
                let label = edge.label.as_ref().unwrap();
                edge.load(Some(value_to_text(&map[label])), vec![], edge.payload().versions);
            }
            return None;
        }
    }
    Some(value_to_text(response))
}
