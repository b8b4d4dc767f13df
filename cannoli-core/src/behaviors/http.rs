//! The `http` content node (§4.5 HTTP, §6 Actions): a zod-like config
//! overlaid group-then-node (innermost-last: a closer-enclosing group wins
//! over a farther one, and the node's own `config` edge wins over every
//! group), first-line mode dispatch between a registered action, an `mcp`
//! goal block, a literal URL, a JSON request object, or a named HTTP
//! template, run under a per-call timeout with `catch`-gated failure
//! handling.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

use crate::context::RunContext;
use crate::error::CannoliError;
use crate::object::{EdgeSubtype, NodeObject, Status};
use crate::ports::HttpRequest;

use super::actions::{build_args, coerce_response_to_string, invoke};
use super::variables::{floating_node_content, render, substitute_braces};

const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// The reserved action name a `"""mcp"""` block invokes — spec §6's port
/// surface names no separate goal-agent interface, so an `mcp` block is
/// modeled as calling whatever action a host registers under this name.
const MCP_ACTION_NAME: &str = "mcp";

#[derive(Clone, Debug, Default)]
struct HttpConfig {
    url: Option<String>,
    method: Option<String>,
    headers: Option<HashMap<String, String>>,
    catch: Option<bool>,
    timeout_ms: Option<u64>,
}

impl HttpConfig {
    fn from_value(value: &Value) -> Self {
        Self {
            url: value.get("url").and_then(|v| v.as_str()).map(str::to_string),
            method: value.get("method").and_then(|v| v.as_str()).map(str::to_string),
            headers: value.get("headers").and_then(|v| v.as_object()).map(|obj| {
                obj.iter().filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string()))).collect()
            }),
            catch: value.get("catch").and_then(|v| v.as_bool()),
            timeout_ms: value.get("timeout").and_then(|v| v.as_u64()),
        }
    }

    /// Overlays `more` on top of `self`: any field `more` sets wins. Callers
    /// fold outermost-group-first so the last config folded in — the
    /// nearest-enclosing group, then the node-local one — wins any conflict.
    fn overlay(mut self, more: HttpConfig) -> Self {
        if more.url.is_some() {
            self.url = more.url;
        }
        if more.method.is_some() {
            self.method = more.method;
        }
        if more.headers.is_some() {
            self.headers = more.headers;
        }
        if more.catch.is_some() {
            self.catch = more.catch;
        }
        if more.timeout_ms.is_some() {
            self.timeout_ms = more.timeout_ms;
        }
        self
    }

    fn catch_or_default(&self) -> bool {
        self.catch.unwrap_or(true)
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS))
    }
}

/// A node-local config, read from any `config`-subtype incoming edge's JSON
/// content.
fn node_local_config(node: &NodeObject, ctx: &RunContext) -> HttpConfig {
    node.base
        .dependencies
        .iter()
        .filter_map(|id| ctx.graph.edges.get(id))
        .filter(|edge| edge.subtype == EdgeSubtype::Config)
        .filter_map(|edge| edge.content())
        .filter_map(|text| serde_json::from_str::<Value>(&text).ok())
        .map(|value| HttpConfig::from_value(&value))
        .fold(HttpConfig::default(), HttpConfig::overlay)
}

/// Enclosing groups' own config, outermost-first (`node.groups` is
/// immediate-parent-first, so this walks it in reverse), each overlaid by
/// the next one in, so a closer-enclosing group wins over a farther one.
fn group_config(node: &NodeObject, ctx: &RunContext) -> HttpConfig {
    node.groups
        .iter()
        .rev()
        .filter_map(|id| ctx.graph.groups.get(id))
        .filter_map(|group| group.config.as_ref())
        .map(HttpConfig::from_value)
        .fold(HttpConfig::default(), HttpConfig::overlay)
}

fn resolved_config(node: &NodeObject, ctx: &RunContext) -> HttpConfig {
    group_config(node, ctx).overlay(node_local_config(node, ctx))
}

enum HttpMode {
    Action(String),
    Mcp(String),
    Url(String),
    Json(Value),
    Template(String),
}

/// Classifies rendered node text by its first line / shape: a fenced
/// ` ```mcp ``` ` block names an agentic goal; `action: name` dispatches to
/// a registered action; `template: name` resolves a named floating HTTP
/// template; text parsing as a JSON object is a full request description;
/// anything else is treated as a literal URL.
fn determine_mode(rendered: &str) -> HttpMode {
    let trimmed = rendered.trim();
    if let Some(rest) = trimmed.strip_prefix("```mcp") {
        let goal = rest.strip_suffix("```").unwrap_or(rest).trim().to_string();
        return HttpMode::Mcp(goal);
    }
    if let Some(first_line) = trimmed.lines().next() {
        if let Some(name) = first_line.strip_prefix("action:") {
            return HttpMode::Action(name.trim().to_string());
        }
        if let Some(name) = first_line.strip_prefix("template:") {
            return HttpMode::Template(name.trim().to_string());
        }
    }
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() {
            return HttpMode::Json(value);
        }
    }
    HttpMode::Url(trimmed.to_string())
}

fn request_from_json(value: &Value, config: &HttpConfig) -> HttpRequest {
    let url = value.get("url").and_then(|v| v.as_str()).map(str::to_string).or_else(|| config.url.clone()).unwrap_or_default();
    let method = value
        .get("method")
        .and_then(|v| v.as_str())
        .map(str::to_string)
        .or_else(|| config.method.clone())
        .unwrap_or_else(|| "GET".to_string());
    let headers = value
        .get("headers")
        .and_then(|v| v.as_object())
        .map(|obj| obj.iter().filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string()))).collect())
        .or_else(|| config.headers.clone())
        .unwrap_or_default();
    let body = value.get("body").cloned();
    HttpRequest { method, url, headers, body }
}

fn settle_error(node: &NodeObject, config_catch: bool, message: String) {
    let mut buffer = node.buffer.lock().expect("node buffer lock poisoned");
    buffer.content = Some(message);
    drop(buffer);
    node.base.set_status(if config_catch { Status::Error } else { Status::Complete });
}

fn settle_success(node: &NodeObject, body: String, status: u16) {
    let mut buffer = node.buffer.lock().expect("node buffer lock poisoned");
    buffer.content = Some(body);
    buffer.receive_info = Some(serde_json::json!({ "status": status }));
    drop(buffer);
    node.base.set_status(Status::Complete);
}

async fn run_fetch(request: HttpRequest, config: &HttpConfig, ctx: &RunContext) -> Result<(String, u16), CannoliError> {
    match tokio::time::timeout(config.timeout(), ctx.ports.fetcher.fetch(request)).await {
        Ok(Ok(response)) => Ok((response.body, response.status)),
        Ok(Err(err)) => Err(err),
        Err(_) => Err(CannoliError::HttpFailed("request timed out".to_string())),
    }
}

async fn run_action(node: &NodeObject, ctx: &RunContext, config: &HttpConfig, name: &str, rendered: &str) {
    let Some(action) = ctx.ports.actions.get(name) else {
        settle_error(node, config.catch_or_default(), format!("no action registered named {name}"));
        return;
    };
    let args = build_args(node, ctx, action.as_ref(), rendered);
    match invoke(action.as_ref(), args, node).await {
        Ok(value) => match coerce_response_to_string(node, ctx, &value) {
            Some(text) => settle_success(node, text, 200),
            None => {
                node.buffer.lock().expect("node buffer lock poisoned").content = Some(String::new());
                node.base.set_status(Status::Complete);
            }
        },
        Err(err) => settle_error(node, config.catch_or_default(), err.to_string()),
    }
}

pub async fn execute(node: &NodeObject, ctx: &RunContext) {
    let config = resolved_config(node, ctx);

    let rendered = match render(node, ctx).await {
        Ok(text) => text,
        Err(err) => {
            settle_error(node, config.catch_or_default(), err.to_string());
            return;
        }
    };

    match determine_mode(&rendered) {
        HttpMode::Url(url) => {
            let url = config.url.clone().unwrap_or(url);
            let method = config.method.clone().unwrap_or_else(|| "GET".to_string());
            let headers = config.headers.clone().unwrap_or_default();
            let request = HttpRequest { method, url, headers, body: None };
            match run_fetch(request, &config, ctx).await {
                Ok((body, status)) => settle_success(node, body, status),
                Err(err) => settle_error(node, config.catch_or_default(), err.to_string()),
            }
        }
        HttpMode::Json(value) => {
            let request = request_from_json(&value, &config);
            match run_fetch(request, &config, ctx).await {
                Ok((body, status)) => settle_success(node, body, status),
                Err(err) => settle_error(node, config.catch_or_default(), err.to_string()),
            }
        }
        HttpMode::Template(name) => {
            let Some(template_text) = floating_node_content(ctx, &name) else {
                settle_error(node, config.catch_or_default(), format!("no HTTP template named {name}"));
                return;
            };
            let substituted = substitute_braces(&template_text, node, ctx);
            let Ok(value) = serde_json::from_str::<Value>(&substituted) else {
                settle_error(node, config.catch_or_default(), "HTTP template did not render to a JSON request".to_string());
                return;
            };
            let request = request_from_json(&value, &config);
            match run_fetch(request, &config, ctx).await {
                Ok((body, status)) => settle_success(node, body, status),
                Err(err) => settle_error(node, config.catch_or_default(), err.to_string()),
            }
        }
        HttpMode::Action(name) => run_action(node, ctx, &config, &name, &rendered).await,
        HttpMode::Mcp(goal) => run_action(node, ctx, &config, MCP_ACTION_NAME, &goal).await,
    }
}
