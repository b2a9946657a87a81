use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::{fmt::Display, sync::Arc};
use tracing::debug;

use crate::{provider::WeatherProvider, tools};

/// Protocol revision advertised during `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Server identity reported by `initialize`, the info document and `/health`.
pub const SERVER_NAME: &str = "meteo-mcp";

pub const PARSE_ERROR: i32 = -32700;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INTERNAL_ERROR: i32 = -32603;

/// Decoded incoming message. Everything but `method` is optional.
#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
}

impl RpcResponse {
    fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    fn failure(id: Option<Value>, error: RpcError) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Value,
}

/// Stateless request/response transformer shared by both transports.
///
/// Tool-execution failures never surface here as protocol errors: they are
/// converted to in-band payloads by [`tools::run_tool`] and travel inside an
/// otherwise successful response.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    provider: Arc<dyn WeatherProvider>,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider }
    }

    /// Entry point for raw frames: parse, dispatch, answer. A body that does
    /// not decode as a message yields the one transport-level error, `-32700`.
    pub async fn handle_message(&self, raw: &str) -> Option<RpcResponse> {
        let request: RpcRequest = match serde_json::from_str(raw) {
            Ok(request) => request,
            Err(e) => {
                return Some(RpcResponse::failure(
                    None,
                    RpcError {
                        code: PARSE_ERROR,
                        message: format!("Parse error: {e}"),
                    },
                ));
            }
        };

        self.dispatch(request).await
    }

    /// Route one decoded message. Returns `None` only for notifications.
    pub async fn dispatch(&self, request: RpcRequest) -> Option<RpcResponse> {
        debug!(method = %request.method, "dispatching request");

        let RpcRequest { id, method, params, .. } = request;

        let result = match method.as_str() {
            "initialize" => Ok(initialize_result()),
            "initialized" | "notifications/initialized" => return None,
            "tools/list" => list_tools_result(),
            "tools/call" => self.call_tool(params).await,
            other => Err(RpcError {
                code: METHOD_NOT_FOUND,
                message: format!("Method not found: {other}"),
            }),
        };

        Some(match result {
            Ok(result) => RpcResponse::success(id, result),
            Err(error) => RpcResponse::failure(id, error),
        })
    }

    async fn call_tool(&self, params: Option<Value>) -> Result<Value, RpcError> {
        let params: CallToolParams =
            serde_json::from_value(params.unwrap_or(Value::Null)).map_err(internal_error)?;

        let payload = tools::run_tool(self.provider.as_ref(), &params.name, &params.arguments).await;
        let text = serde_json::to_string(&payload).map_err(internal_error)?;

        Ok(json!({
            "content": [{"type": "text", "text": text}]
        }))
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {"tools": {}},
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

fn list_tools_result() -> Result<Value, RpcError> {
    let tools = serde_json::to_value(tools::all()).map_err(internal_error)?;
    Ok(json!({"tools": tools}))
}

fn internal_error(e: impl Display) -> RpcError {
    RpcError {
        code: INTERNAL_ERROR,
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::{Error, Result},
        model::{Coordinates, CurrentReport, CurrentWeather, DailyForecastItem, ForecastResult},
        provider::WeatherProvider,
    };
    use async_trait::async_trait;

    #[derive(Debug)]
    struct StubProvider;

    #[async_trait]
    impl WeatherProvider for StubProvider {
        async fn current(&self, city: &str) -> Result<CurrentReport> {
            if city == "Atlantis" {
                return Err(Error::CityNotFound(city.to_string()));
            }
            Ok(CurrentReport {
                city: city.to_string(),
                coordinates: Coordinates {
                    latitude: 48.85,
                    longitude: 2.35,
                    name: city.to_string(),
                    country_code: Some("FR".to_string()),
                    timezone: Some("Europe/Paris".to_string()),
                },
                current: CurrentWeather {
                    temperature_c: 20.0,
                    relative_humidity: None,
                    apparent_temperature_c: None,
                    weather_code: Some(0),
                    wind_speed_kmh: None,
                    precipitation_mm: None,
                    description: Some("Ciel dégagé".to_string()),
                },
            })
        }

        async fn forecast(&self, city: &str, days: i64) -> Result<ForecastResult> {
            let days = days.clamp(1, 16) as usize;
            let daily = (0..days)
                .map(|i| DailyForecastItem {
                    date: format!("2024-06-{:02}", i + 1),
                    temp_min_c: Some(12.0),
                    temp_max_c: Some(22.0),
                    precipitation_sum_mm: None,
                    wind_speed_max_kmh: None,
                    weather_code: Some(1),
                    description: Some("Principalement clair".to_string()),
                })
                .collect::<Vec<_>>();

            Ok(ForecastResult {
                city: city.to_string(),
                coordinates: Coordinates {
                    latitude: 48.85,
                    longitude: 2.35,
                    name: city.to_string(),
                    country_code: None,
                    timezone: None,
                },
                days: daily.len(),
                daily,
            })
        }
    }

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(Arc::new(StubProvider))
    }

    fn content_text(response: &RpcResponse) -> Value {
        let result = response.result.as_ref().expect("tool call must succeed");
        let text = result["content"][0]["text"].as_str().expect("text content item");
        serde_json::from_str(text).expect("content text is JSON")
    }

    #[tokio::test]
    async fn initialize_reports_identity_and_capabilities() {
        let response = dispatcher()
            .handle_message(r#"{"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}"#)
            .await
            .expect("initialize answers");

        let result = response.result.expect("result present");
        assert_eq!(result["protocolVersion"], json!(PROTOCOL_VERSION));
        assert_eq!(result["capabilities"], json!({"tools": {}}));
        assert_eq!(result["serverInfo"]["name"], json!(SERVER_NAME));
        assert_eq!(response.id, Some(json!(1)));
    }

    #[tokio::test]
    async fn initialized_notification_gets_no_response() {
        let dispatcher = dispatcher();
        assert!(dispatcher.handle_message(r#"{"method": "initialized"}"#).await.is_none());
        assert!(
            dispatcher
                .handle_message(r#"{"method": "notifications/initialized"}"#)
                .await
                .is_none()
        );
    }

    #[tokio::test]
    async fn tools_list_is_idempotent() {
        let dispatcher = dispatcher();
        let first = dispatcher
            .handle_message(r#"{"id": 1, "method": "tools/list"}"#)
            .await
            .expect("list answers");
        let second = dispatcher
            .handle_message(r#"{"id": 1, "method": "tools/list"}"#)
            .await
            .expect("list answers");

        let first = serde_json::to_string(&first.result).expect("serialize");
        let second = serde_json::to_string(&second.result).expect("serialize");
        assert_eq!(first, second);
        assert!(first.contains("get_weather"));
        assert!(first.contains("get_forecast"));
    }

    #[tokio::test]
    async fn unknown_method_is_a_protocol_error() {
        let response = dispatcher()
            .handle_message(r#"{"id": 7, "method": "foo"}"#)
            .await
            .expect("error response");

        let error = response.error.expect("error present");
        assert_eq!(error.code, METHOD_NOT_FOUND);
        assert!(error.message.contains("foo"));
        assert!(response.result.is_none());
    }

    #[tokio::test]
    async fn malformed_body_is_a_parse_error() {
        let response = dispatcher().handle_message("not json at all").await.expect("error response");

        let error = response.error.expect("error present");
        assert_eq!(error.code, PARSE_ERROR);
        assert!(response.id.is_none());
    }

    #[tokio::test]
    async fn call_without_city_stays_in_band() {
        let response = dispatcher()
            .handle_message(
                r#"{"id": 2, "method": "tools/call", "params": {"name": "get_weather", "arguments": {}}}"#,
            )
            .await
            .expect("successful envelope");

        assert!(response.error.is_none());
        assert_eq!(content_text(&response), json!({"error": "city parameter required"}));
    }

    #[tokio::test]
    async fn unknown_tool_stays_in_band() {
        let response = dispatcher()
            .handle_message(
                r#"{"id": 3, "method": "tools/call", "params": {"name": "nonexistent", "arguments": {}}}"#,
            )
            .await
            .expect("successful envelope");

        assert!(response.error.is_none());
        assert_eq!(content_text(&response), json!({"error": "Unknown tool: nonexistent"}));
    }

    #[tokio::test]
    async fn provider_failure_stays_in_band() {
        let response = dispatcher()
            .handle_message(
                r#"{"id": 4, "method": "tools/call", "params": {"name": "get_weather", "arguments": {"city": "Atlantis"}}}"#,
            )
            .await
            .expect("successful envelope");

        assert!(response.error.is_none());
        assert_eq!(content_text(&response), json!({"error": "Ville introuvable: Atlantis"}));
    }

    #[tokio::test]
    async fn call_tool_returns_weather_payload() {
        let response = dispatcher()
            .handle_message(
                r#"{"id": 5, "method": "tools/call", "params": {"name": "get_weather", "arguments": {"city": "Paris"}}}"#,
            )
            .await
            .expect("successful envelope");

        let payload = content_text(&response);
        assert_eq!(payload["city"], json!("Paris"));
        assert_eq!(payload["current"]["description"], json!("Ciel dégagé"));
    }

    #[tokio::test]
    async fn forecast_result_keeps_days_in_sync() {
        let response = dispatcher()
            .handle_message(
                r#"{"id": 6, "method": "tools/call", "params": {"name": "get_forecast", "arguments": {"city": "Paris", "days": 30}}}"#,
            )
            .await
            .expect("successful envelope");

        let payload = content_text(&response);
        assert_eq!(payload["days"], json!(16));
        assert_eq!(payload["daily"].as_array().map(Vec::len), Some(16));
    }

    #[tokio::test]
    async fn call_without_params_is_internal_error() {
        let response = dispatcher()
            .handle_message(r#"{"id": 8, "method": "tools/call"}"#)
            .await
            .expect("error response");

        let error = response.error.expect("error present");
        assert_eq!(error.code, INTERNAL_ERROR);
    }
}
