use std::collections::HashMap;
use std::io::{self, BufRead, Write};
use std::time::Instant;

use accessisky_tonight::{
    generate_summary_text, moon_interference, BortleScale, LocationRequest,
    ObserverLocation, SourceError, TonightData, ViewingAssessor, ViewingInput,
};
use chrono::{NaiveDate, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::ServerConfig;
use crate::protocol::{
    JsonRpcRequest, JsonRpcResponse, INVALID_PARAMS, INVALID_REQUEST, METHOD_NOT_FOUND,
    PARSE_ERROR,
};

const DEFAULT_MCP_PROTOCOL_VERSION: &str = "2024-11-05";
const INTERNAL_ERROR: i64 = -32603;
/// Largest `Content-Length` body accepted on stdio.
const MAX_FRAME_BYTES: usize = 4 * 1024 * 1024;

pub struct ViewingServer {
    assessor: ViewingAssessor,
    runtime: tokio::runtime::Runtime,
    default_light_pollution: f64,
    metrics: Mutex<HashMap<String, ToolMetric>>,
}

#[derive(Debug, Default, Clone)]
struct ToolMetric {
    ok: u64,
    err: u64,
    total_latency_ms: f64,
    max_latency_ms: f64,
}

impl ViewingServer {
    pub fn new(config: ServerConfig) -> Result<Self, SourceError> {
        let assessor = ViewingAssessor::from_config(config.sources)?;
        Self::with_assessor(assessor, config.default_light_pollution)
    }

    pub fn with_assessor(
        assessor: ViewingAssessor,
        default_light_pollution: f64,
    ) -> Result<Self, SourceError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_all()
            .build()?;
        Ok(Self {
            assessor,
            runtime,
            default_light_pollution,
            metrics: Mutex::new(HashMap::new()),
        })
    }

    pub fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != "2.0" {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                "invalid jsonrpc version",
            ));
        }

        let is_notification = request.id.is_none();
        let id = request.id.clone().unwrap_or(Value::Null);

        if is_notification && request.method.starts_with("notifications/") {
            return None;
        }

        let response = match request.method.as_str() {
            "initialize" => {
                let protocol_version = request
                    .params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_MCP_PROTOCOL_VERSION);
                JsonRpcResponse::success(
                    id,
                    json!({
                        "protocolVersion": protocol_version,
                        "serverInfo": {"name": "accessiskyd", "version": env!("CARGO_PKG_VERSION")},
                        "capabilities": {
                            "tools": {
                                "listChanged": false
                            }
                        }
                    }),
                )
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, tools_list_result()),
            "tools/call" => self.handle_tools_call(id, request.params),
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, "method not found"),
        };

        Some(response)
    }

    fn record_tool_metrics(&self, tool: &str, latency_ms: f64, is_error: bool) {
        let mut locked = self.metrics.lock();
        let metric = locked.entry(tool.to_string()).or_default();
        if is_error {
            metric.err = metric.err.saturating_add(1);
        } else {
            metric.ok = metric.ok.saturating_add(1);
        }
        metric.total_latency_ms += latency_ms;
        metric.max_latency_ms = metric.max_latency_ms.max(latency_ms);
    }

    fn handle_tools_call(&self, id: Value, params: Value) -> JsonRpcResponse {
        let parsed: ToolsCallParams = match serde_json::from_value(params) {
            Ok(v) => v,
            Err(err) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("invalid params: {err}"));
            }
        };

        let start = Instant::now();
        let response = match parsed.name.as_str() {
            "viewing_conditions" => self.exec_viewing_conditions(id, parsed.arguments),
            "moon_interference" => self.exec_moon_interference(id, parsed.arguments),
            "location_conditions" => self.exec_location_conditions(id, parsed.arguments),
            "tonight_summary" => self.exec_tonight_summary(id, parsed.arguments),
            "server_stats" => self.exec_server_stats(id),
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, "unknown tool"),
        };

        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        tracing::debug!(
            tool = %parsed.name,
            latency_ms,
            error = ?response.error_code(),
            "tool call"
        );
        self.record_tool_metrics(&parsed.name, latency_ms, response.error.is_some());
        response
    }

    fn exec_viewing_conditions(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: ViewingConditionsInput = match parse_args_optional(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };

        let mut conditions = self.assessor.assess(&args.input);
        if let Some(bortle) = args.bortle_scale {
            conditions = conditions.with_bortle_scale(bortle);
        }
        let text = conditions.to_string();
        structured(id, &conditions, text)
    }

    #[allow(clippy::unused_self)]
    fn exec_moon_interference(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: MoonInterferenceInput = match parse_args(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };

        let interference = moon_interference(args.illumination_percent, args.is_moon_up);
        JsonRpcResponse::tool_result(
            id,
            json!({ "interference": interference }),
            format!("moon interference={interference:.3}"),
        )
    }

    fn exec_location_conditions(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let args: LocationConditionsInput = match parse_args(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };

        if !(-90.0..=90.0).contains(&args.latitude) {
            return JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                "latitude must be between -90 and 90",
            );
        }
        if !(-180.0..=180.0).contains(&args.longitude) {
            return JsonRpcResponse::error(
                id,
                INVALID_PARAMS,
                "longitude must be between -180 and 180",
            );
        }

        let date = args.date.unwrap_or_else(|| Utc::now().date_naive());
        let mut request =
            LocationRequest::new(ObserverLocation::new(args.latitude, args.longitude), date)
                .with_light_pollution(
                    args.light_pollution_factor
                        .unwrap_or(self.default_light_pollution),
                );
        if let Some(up) = args.is_moon_up {
            request = request.with_moon_up(up);
        }

        let assessment = self
            .runtime
            .block_on(self.assessor.assess_for_location(&request));
        let text = assessment.conditions.to_string();
        structured(id, &assessment, text)
    }

    #[allow(clippy::unused_self)]
    fn exec_tonight_summary(&self, id: Value, arguments: Option<Value>) -> JsonRpcResponse {
        let data: TonightData = match parse_args_optional(arguments) {
            Ok(v) => v,
            Err(resp) => return with_id(resp, id),
        };

        let summary_text = generate_summary_text(&data);
        JsonRpcResponse::tool_result(
            id,
            json!({ "summary_text": summary_text }),
            summary_text.clone(),
        )
    }

    fn exec_server_stats(&self, id: Value) -> JsonRpcResponse {
        let tools: HashMap<String, ToolStats> = self
            .metrics
            .lock()
            .iter()
            .map(|(name, m)| (name.clone(), ToolStats::from(m)))
            .collect();
        let calls: u64 = tools.values().map(|t| t.ok + t.err).sum();

        JsonRpcResponse::tool_result(
            id,
            json!({
                "tools": tools,
                "weather_source": self.assessor.weather_source(),
                "moon_source": self.assessor.moon_source(),
                "default_light_pollution": self.default_light_pollution
            }),
            format!("stats calls={calls}"),
        )
    }

    pub fn serve_stdio(&self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Reads requests until EOF. Each response uses the framing of its request.
    pub fn serve<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> io::Result<()> {
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }

            let trimmed = line.trim_end_matches(['\r', '\n']).trim_start();
            if trimmed.is_empty() {
                continue;
            }

            let (payload, frame) = if is_stdio_header_line(trimmed) {
                let content_length = match read_stdio_content_length(&mut reader, trimmed) {
                    Ok(v) => v,
                    Err(err) => {
                        let response = JsonRpcResponse::error(
                            Value::Null,
                            PARSE_ERROR,
                            format!("invalid stdio frame: {err}"),
                        );
                        write_stdio_response(&mut writer, &response, StdioFrame::LineDelimited)?;
                        continue;
                    }
                };

                if content_length > MAX_FRAME_BYTES {
                    let response = JsonRpcResponse::error(
                        Value::Null,
                        PARSE_ERROR,
                        format!("stdio frame exceeds limit of {MAX_FRAME_BYTES} bytes"),
                    );
                    write_stdio_response(&mut writer, &response, StdioFrame::ContentLength)?;
                    continue;
                }

                let mut body = vec![0_u8; content_length];
                if let Err(err) = reader.read_exact(&mut body) {
                    let response = JsonRpcResponse::error(
                        Value::Null,
                        PARSE_ERROR,
                        format!("invalid stdio frame body: {err}"),
                    );
                    write_stdio_response(&mut writer, &response, StdioFrame::ContentLength)?;
                    continue;
                }
                (body, StdioFrame::ContentLength)
            } else {
                (trimmed.as_bytes().to_vec(), StdioFrame::LineDelimited)
            };

            let request: JsonRpcRequest = match serde_json::from_slice(&payload) {
                Ok(v) => v,
                Err(err) => {
                    tracing::warn!(error = %err, "unparseable request");
                    let response =
                        JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("parse error: {err}"));
                    write_stdio_response(&mut writer, &response, frame)?;
                    continue;
                }
            };

            if let Some(response) = self.handle_request(request) {
                write_stdio_response(&mut writer, &response, frame)?;
            }
        }

        Ok(())
    }
}

fn tools_list_result() -> Value {
    json!({
        "tools": [
            {
                "name": "viewing_conditions",
                "description": "Score stargazing conditions from cloud cover, moon, darkness and light pollution.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "cloud_cover_percent": {"type": "number"},
                        "moon_illumination_percent": {"type": "number"},
                        "is_astronomical_night": {"type": "boolean"},
                        "is_moon_up": {"type": "boolean"},
                        "light_pollution_factor": {"type": "number"},
                        "bortle_scale": {"type": "integer", "minimum": 1, "maximum": 9}
                    }
                }
            },
            {
                "name": "moon_interference",
                "description": "Moon interference factor (0 none, 1 full moon overhead).",
                "inputSchema": {
                    "type": "object",
                    "required": ["illumination_percent"],
                    "properties": {
                        "illumination_percent": {"type": "number"},
                        "is_moon_up": {"type": "boolean"}
                    }
                }
            },
            {
                "name": "location_conditions",
                "description": "Resolve cloud cover and moon for a location and date, then score viewing conditions.",
                "inputSchema": {
                    "type": "object",
                    "required": ["latitude", "longitude"],
                    "properties": {
                        "latitude": {"type": "number", "minimum": -90, "maximum": 90},
                        "longitude": {"type": "number", "minimum": -180, "maximum": 180},
                        "date": {"type": "string", "format": "date"},
                        "light_pollution_factor": {"type": "number"},
                        "is_moon_up": {"type": "boolean"}
                    }
                }
            },
            {
                "name": "tonight_summary",
                "description": "Plain-language summary of tonight's sky for screen readers.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "moon_phase": {"type": "string"},
                        "moon_illumination": {"type": "integer"},
                        "moon_rise_time": {"type": "string"},
                        "moon_set_time": {"type": "string"},
                        "iss_passes": {"type": "array", "items": {"type": "string"}},
                        "visible_planets": {"type": "array", "items": {"type": "string"}},
                        "active_meteor_showers": {"type": "array", "items": {"type": "string"}},
                        "aurora_kp": {"type": "number"},
                        "aurora_activity": {"type": "string"},
                        "viewing_score": {"type": "integer"},
                        "cloud_cover_percent": {"type": "integer"},
                        "viewing_description": {"type": "string"}
                    }
                }
            },
            {
                "name": "server_stats",
                "description": "Per-tool call counters and latency.",
                "inputSchema": {"type": "object", "properties": {}}
            }
        ]
    })
}

fn structured<T: Serialize>(id: Value, value: &T, text: String) -> JsonRpcResponse {
    match serde_json::to_value(value) {
        Ok(v) => JsonRpcResponse::tool_result(id, v, text),
        Err(err) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("serialize result: {err}")),
    }
}

fn with_id(mut response: JsonRpcResponse, id: Value) -> JsonRpcResponse {
    response.id = id;
    response
}

#[derive(Debug, Clone, Copy)]
enum StdioFrame {
    LineDelimited,
    ContentLength,
}

fn write_stdio_response<W: Write>(
    writer: &mut W,
    response: &JsonRpcResponse,
    frame: StdioFrame,
) -> io::Result<()> {
    match frame {
        StdioFrame::LineDelimited => {
            let serialized = serde_json::to_string(response)?;
            writeln!(writer, "{serialized}")?;
        }
        StdioFrame::ContentLength => {
            let serialized = serde_json::to_vec(response)?;
            write!(writer, "Content-Length: {}\r\n\r\n", serialized.len())?;
            writer.write_all(&serialized)?;
        }
    }
    writer.flush()
}

fn is_stdio_header_line(line: &str) -> bool {
    let lower = line.to_ascii_lowercase();
    lower.starts_with("content-length:") || lower.starts_with("content-type:")
}

fn read_stdio_content_length<R: BufRead>(reader: &mut R, first_line: &str) -> io::Result<usize> {
    let mut content_length = parse_content_length(first_line);
    let mut header_line = String::new();
    loop {
        header_line.clear();
        if reader.read_line(&mut header_line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "unexpected eof while reading frame headers",
            ));
        }
        let trimmed = header_line.trim_end_matches(['\r', '\n']);
        if trimmed.is_empty() {
            break;
        }
        if let Some(v) = parse_content_length(trimmed) {
            content_length = Some(v);
        }
    }
    content_length
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "missing content-length header"))
}

fn parse_content_length(line: &str) -> Option<usize> {
    let (name, value) = line.split_once(':')?;
    if !name.trim().eq_ignore_ascii_case("content-length") {
        return None;
    }
    value.trim().parse::<usize>().ok()
}

fn parse_args<T: for<'de> Deserialize<'de>>(
    arguments: Option<Value>,
) -> Result<T, JsonRpcResponse> {
    let Some(args) = arguments else {
        return Err(JsonRpcResponse::error(
            Value::Null,
            INVALID_PARAMS,
            "missing tool arguments",
        ));
    };

    serde_json::from_value(args).map_err(|err| {
        JsonRpcResponse::error(
            Value::Null,
            INVALID_PARAMS,
            format!("invalid tool arguments: {err}"),
        )
    })
}

fn parse_args_optional<T: for<'de> Deserialize<'de> + Default>(
    arguments: Option<Value>,
) -> Result<T, JsonRpcResponse> {
    match arguments {
        Some(v) => serde_json::from_value(v).map_err(|err| {
            JsonRpcResponse::error(
                Value::Null,
                INVALID_PARAMS,
                format!("invalid tool arguments: {err}"),
            )
        }),
        None => Ok(T::default()),
    }
}

#[derive(Debug, Deserialize)]
struct ToolsCallParams {
    name: String,
    arguments: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct ViewingConditionsInput {
    #[serde(flatten)]
    input: ViewingInput,
    #[serde(default)]
    bortle_scale: Option<BortleScale>,
}

const fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct MoonInterferenceInput {
    illumination_percent: f64,
    #[serde(default = "default_true")]
    is_moon_up: bool,
}

#[derive(Debug, Deserialize)]
struct LocationConditionsInput {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    light_pollution_factor: Option<f64>,
    #[serde(default)]
    is_moon_up: Option<bool>,
}

#[derive(Debug, Serialize)]
struct ToolStats {
    ok: u64,
    err: u64,
    avg_latency_ms: f64,
    max_latency_ms: f64,
}

impl From<&ToolMetric> for ToolStats {
    #[allow(clippy::cast_precision_loss)]
    fn from(m: &ToolMetric) -> Self {
        let calls = m.ok + m.err;
        let avg_latency_ms = if calls == 0 {
            0.0
        } else {
            m.total_latency_ms / calls as f64
        };
        Self {
            ok: m.ok,
            err: m.err,
            avg_latency_ms,
            max_latency_ms: m.max_latency_ms,
        }
    }
}
