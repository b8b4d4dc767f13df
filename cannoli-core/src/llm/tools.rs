//! The three built-in forced-function-call tools a choose/form call node
//! uses to get a structured decision back from the model instead of free
//! text.

use serde_json::json;

use super::FunctionSpec;

/// Forces the model to pick exactly one of `choices` (the labels of a
/// choose node's outgoing choice edges).
pub fn choice_tool(choices: &[String]) -> FunctionSpec {
    FunctionSpec {
        name: "choice".to_string(),
        description: "Select exactly one of the available choices.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "choice": { "type": "string", "enum": choices }
            },
            "required": ["choice"]
        }),
    }
}

/// Forces the model to pick one of a set of candidate note names (used by a
/// choose node whose choices come from a list of notes rather than edges).
pub fn note_select_tool(notes: &[String]) -> FunctionSpec {
    FunctionSpec {
        name: "note_select".to_string(),
        description: "Select exactly one of the available notes.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "note": { "type": "string", "enum": notes }
            },
            "required": ["note"]
        }),
    }
}

/// Forces the model to return one value per named field (a form node's
/// `field` edge labels).
pub fn form_tool(fields: &[String]) -> FunctionSpec {
    let properties: serde_json::Map<String, serde_json::Value> = fields
        .iter()
        .map(|field| (field.clone(), json!({ "type": "string" })))
        .collect();
    FunctionSpec {
        name: "form".to_string(),
        description: "Fill in every named field.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": serde_json::Value::Object(properties),
            "required": fields
        }),
    }
}
