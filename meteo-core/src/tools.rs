use serde::Serialize;
use serde_json::{Value, json};
use std::sync::LazyLock;
use tracing::debug;

use crate::provider::WeatherProvider;

/// Descriptor for one callable tool, as advertised by `tools/list`.
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// The two callable tools. Built once at first use, never mutated; every
/// surface (transports, info document, CLI help) reads from here.
static TOOLS: LazyLock<Vec<Tool>> = LazyLock::new(|| {
    vec![
        Tool {
            name: "get_weather".to_string(),
            description: "Météo actuelle pour une ville".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "city": {"type": "string", "description": "Nom de la ville"}
                },
                "required": ["city"],
            }),
        },
        Tool {
            name: "get_forecast".to_string(),
            description: "Prévisions quotidiennes pour une ville".to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "city": {"type": "string"},
                    "days": {"type": "integer", "minimum": 1, "maximum": 16}
                },
                "required": ["city", "days"],
            }),
        },
    ]
});

pub fn all() -> &'static [Tool] {
    &TOOLS
}

/// Execute a tool by name and return its in-band JSON payload.
///
/// Bad arguments, an unknown name, and provider failures all come back as
/// `{"error": <message>}` in the same payload position as a success.
/// Callers inspect the payload, not the transport status.
pub async fn run_tool(provider: &dyn WeatherProvider, name: &str, arguments: &Value) -> Value {
    debug!(tool = name, "executing tool");

    match name {
        "get_weather" => {
            let Some(city) = city_argument(arguments) else {
                return json!({"error": "city parameter required"});
            };
            match provider.current(city).await {
                Ok(report) => to_payload(report),
                Err(e) => json!({"error": e.to_string()}),
            }
        }
        "get_forecast" => {
            let Some(city) = city_argument(arguments) else {
                return json!({"error": "city parameter required"});
            };
            let days = match arguments.get("days") {
                None => 3,
                Some(value) => match value.as_i64() {
                    Some(days) => days,
                    None => return json!({"error": "days must be an integer"}),
                },
            };
            match provider.forecast(city, days).await {
                Ok(forecast) => to_payload(forecast),
                Err(e) => json!({"error": e.to_string()}),
            }
        }
        other => json!({"error": format!("Unknown tool: {other}")}),
    }
}

fn city_argument(arguments: &Value) -> Option<&str> {
    arguments
        .get("city")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|city| !city.is_empty())
}

fn to_payload<T: Serialize>(value: T) -> Value {
    match serde_json::to_value(value) {
        Ok(payload) => payload,
        Err(e) => json!({"error": e.to_string()}),
    }
}
