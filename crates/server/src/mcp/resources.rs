//! Read-only resources: the record schema.

use serde_json::{json, Value};

use crate::error::AppError;
use crate::mcp::tools::record_schema;

pub const SCHEMA_URI: &str = "schema://video_metadata";

pub fn resource_definitions() -> Vec<Value> {
    vec![json!({
        "uri": SCHEMA_URI,
        "name": "Video Metadata Schema",
        "description": "JSON Schema of a video metadata record",
        "mimeType": "application/json",
    })]
}

/// The `resources/read` result for `uri`.
pub fn read_resource(uri: &str) -> Result<Value, AppError> {
    if uri != SCHEMA_URI {
        return Err(AppError::InvalidParams(format!("Unknown resource: {uri}")));
    }

    let mut schema = record_schema(&["id", "title", "game_type", "teams", "created_at", "updated_at"]);
    let properties = &mut schema["properties"];
    properties["id"] = json!({ "type": "integer" });
    properties["created_at"] = json!({ "type": "string", "format": "date-time" });
    properties["updated_at"] = json!({ "type": "string", "format": "date-time" });
    schema["title"] = json!("VideoMetadata");

    let text = serde_json::to_string_pretty(&schema)
        .map_err(|err| AppError::InternalError(err.to_string()))?;

    Ok(json!({
        "contents": [{
            "uri": SCHEMA_URI,
            "mimeType": "application/json",
            "text": text,
        }],
    }))
}
