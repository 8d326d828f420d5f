//! Integration tests for MCP protocol handling.
//!
//! These tests drive the MCP server through complete sessions over in-memory
//! I/O, covering the lifecycle, error responses and every tool.

use std::sync::Arc;

use async_trait::async_trait;
use basics_mcp::calendar::{
    CalendarError, CalendarEvent, CalendarProvider, CalendarResult, EventQuery, FixedClock,
};
use basics_mcp::config::ToolsConfig;
use basics_mcp::mcp::protocol::{parse_message, IncomingMessage, RequestId};
use basics_mcp::mcp::server::ServerState;
use basics_mcp::mcp::{McpServer, Transport};
use basics_mcp::tools::ToolRegistry;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};

// =============================================================================
// Helpers
// =============================================================================

struct StaticCalendar {
    events: Vec<CalendarEvent>,
}

#[async_trait]
impl CalendarProvider for StaticCalendar {
    async fn list_events(&self, _query: &EventQuery) -> CalendarResult<Vec<CalendarEvent>> {
        Ok(self.events.clone())
    }
}

struct BrokenCalendar;

#[async_trait]
impl CalendarProvider for BrokenCalendar {
    async fn list_events(&self, _query: &EventQuery) -> CalendarResult<Vec<CalendarEvent>> {
        Err(CalendarError::Api {
            status: 401,
            message: "Request had invalid authentication credentials.".to_string(),
        })
    }
}

const INITIALIZE: &str = r#"{"jsonrpc":"2.0","id":0,"method":"initialize","params":{"protocolVersion":"2025-06-18","capabilities":{},"clientInfo":{"name":"test-client","version":"1.0.0"}}}"#;
const INITIALIZED: &str = r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#;

fn tool_call(id: i64, name: &str, arguments: &Value) -> String {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": name, "arguments": arguments }
    })
    .to_string()
}

/// Runs a session with the given lines after the initialisation handshake
/// and returns every reply except the initialize response.
async fn session(provider: Arc<dyn CalendarProvider>, lines: &[String]) -> Vec<Value> {
    let mut input = format!("{INITIALIZE}\n{INITIALIZED}\n");
    for line in lines {
        input.push_str(line);
        input.push('\n');
    }

    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 15, 0, 0).unwrap());
    let tools = ToolRegistry::new(&ToolsConfig::default(), Some(provider), Arc::new(clock));
    let mut server = McpServer::new(Transport::new(input.as_bytes(), Vec::new()), tools);

    server.serve().await.unwrap();
    assert_eq!(server.state(), ServerState::ShuttingDown);

    let (_, written) = server.into_transport().into_parts();
    let mut replies: Vec<Value> = String::from_utf8(written)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    let init = replies.remove(0);
    assert_eq!(init["id"], 0);
    assert_eq!(init["result"]["protocolVersion"], "2025-06-18");
    replies
}

fn empty_calendar() -> Arc<dyn CalendarProvider> {
    Arc::new(StaticCalendar { events: Vec::new() })
}

fn text_of(reply: &Value) -> &str {
    reply["result"]["content"][0]["text"].as_str().unwrap()
}

// =============================================================================
// Protocol Parsing Tests
// =============================================================================

#[test]
fn test_parse_initialize_request() {
    let result = parse_message(INITIALIZE);
    assert!(result.is_ok());

    if let IncomingMessage::Request(req) = result.unwrap() {
        assert_eq!(req.method, "initialize");
        assert_eq!(req.id, RequestId::Number(0));
    } else {
        panic!("Expected Request");
    }
}

#[test]
fn test_parse_notification() {
    let result = parse_message(INITIALIZED);

    if let Ok(IncomingMessage::Notification(notif)) = result {
        assert_eq!(notif.method, "notifications/initialized");
    } else {
        panic!("Expected Notification");
    }
}

#[test]
fn test_parse_invalid_json() {
    assert!(parse_message("not valid json").is_err());
}

// =============================================================================
// Session Tests
// =============================================================================

#[tokio::test]
async fn test_tools_list() {
    let replies = session(
        empty_calendar(),
        &[r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#.to_string()],
    )
    .await;

    let tools = replies[0]["result"]["tools"].as_array().unwrap();
    let names: Vec<&str> = tools.iter().map(|t| t["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        ["ping", "do_sum", "do_the_sum", "getMyCalendarDataByDate"]
    );

    let sum = &tools[1];
    assert_eq!(sum["inputSchema"]["required"], json!(["a", "b"]));
    assert_eq!(sum["outputSchema"]["properties"]["result"]["type"], "number");
}

#[tokio::test]
async fn test_ping_tool() {
    let replies = session(
        empty_calendar(),
        &[
            tool_call(1, "ping", &json!({})),
            tool_call(2, "ping", &json!({"text": "hi"})),
        ],
    )
    .await;

    assert_eq!(text_of(&replies[0]), "Pong - No text provided");
    assert_eq!(text_of(&replies[1]), "Pong - you said: hi");
}

#[tokio::test]
async fn test_sum_tool_and_alias() {
    let replies = session(
        empty_calendar(),
        &[
            tool_call(1, "do_sum", &json!({"a": 2, "b": 3})),
            tool_call(2, "do_the_sum", &json!({"a": -1.5, "b": 0.25})),
        ],
    )
    .await;

    assert_eq!(text_of(&replies[0]), r#"{"result":5}"#);
    assert_eq!(replies[0]["result"]["structuredContent"], json!({"result": 5}));
    assert_eq!(text_of(&replies[1]), r#"{"result":-1.25}"#);
}

#[tokio::test]
async fn test_calendar_tool_lists_meetings() {
    let provider = Arc::new(StaticCalendar {
        events: vec![
            CalendarEvent::all_day("Company holiday", "2024-05-01"),
            CalendarEvent::timed("Standup", "2024-05-01T09:00:00Z"),
        ],
    });
    let replies = session(
        provider,
        &[tool_call(1, "getMyCalendarDataByDate", &json!({"date": "2024-05-01"}))],
    )
    .await;

    let body: Value = serde_json::from_str(text_of(&replies[0])).unwrap();
    assert_eq!(
        body,
        json!({"meetings": [
            "Company holiday at 2024-05-01",
            "Standup at 2024-05-01T09:00:00Z"
        ]})
    );
    assert!(replies[0]["result"].get("isError").is_none());
}

#[tokio::test]
async fn test_calendar_tool_reports_errors_as_data() {
    let replies = session(
        Arc::new(BrokenCalendar),
        &[
            tool_call(1, "getMyCalendarDataByDate", &json!({})),
            tool_call(2, "getMyCalendarDataByDate", &json!({"date": "not-a-date"})),
        ],
    )
    .await;

    for reply in &replies {
        assert!(reply.get("error").is_none(), "not a JSON-RPC error: {reply}");
        assert_eq!(reply["result"]["isError"], true);
    }

    let body: Value = serde_json::from_str(text_of(&replies[0])).unwrap();
    assert_eq!(
        body["error"],
        "Calendar API error (HTTP 401): Request had invalid authentication credentials."
    );

    let body: Value = serde_json::from_str(text_of(&replies[1])).unwrap();
    assert!(body["error"].as_str().unwrap().contains("not-a-date"));
}

#[tokio::test]
async fn test_error_responses() {
    let replies = session(
        empty_calendar(),
        &[
            "not valid json".to_string(),
            r#"{"jsonrpc":"1.0","id":7,"method":"ping"}"#.to_string(),
            r#"{"jsonrpc":"2.0","id":8,"method":"prompts/list"}"#.to_string(),
            tool_call(9, "do_sum", &json!({"a": "1", "b": 2})),
            r#"{"jsonrpc":"2.0","id":10,"method":"tools/call"}"#.to_string(),
        ],
    )
    .await;

    assert_eq!(replies[0]["error"]["code"], -32700);
    assert_eq!(replies[0]["id"], Value::Null);
    assert_eq!(replies[1]["error"]["code"], -32600);
    assert_eq!(replies[1]["id"], 7);
    assert_eq!(replies[2]["error"]["code"], -32601);
    assert_eq!(replies[3]["error"]["code"], -32602);
    assert_eq!(replies[4]["error"]["code"], -32602);
}

#[tokio::test]
async fn test_blank_lines_are_skipped() {
    let replies = session(
        empty_calendar(),
        &[
            String::new(),
            "   ".to_string(),
            r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#.to_string(),
        ],
    )
    .await;

    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0]["result"], json!({}));
}

#[tokio::test]
async fn test_invalid_utf8_line_keeps_session_alive() {
    let mut input = format!("{INITIALIZE}\n").into_bytes();
    input.extend_from_slice(b"\xff\xfe\n");
    input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n");

    let clock = FixedClock(Utc.with_ymd_and_hms(2024, 5, 1, 15, 0, 0).unwrap());
    let tools = ToolRegistry::new(&ToolsConfig::default(), None, Arc::new(clock));
    let mut server = McpServer::new(Transport::new(input.as_slice(), Vec::new()), tools);

    server.serve().await.unwrap();

    let (_, written) = server.into_transport().into_parts();
    let replies: Vec<Value> = String::from_utf8(written)
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();

    assert_eq!(replies.len(), 3);
    assert_eq!(replies[1]["error"]["code"], -32700);
    assert_eq!(replies[1]["id"], Value::Null);
    assert_eq!(replies[2]["id"], 1);
    assert_eq!(replies[2]["result"], json!({}));
}
