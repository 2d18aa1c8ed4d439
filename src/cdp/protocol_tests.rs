use super::*;

#[test]
fn test_cdp_request_serialize() {
    let req = CdpRequest {
        id: 1,
        method: "Page.navigate".to_string(),
        params: Some(serde_json::json!({"url": "https://example.com"})),
        session_id: None,
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("Page.navigate"));
    assert!(json.contains("example.com"));
    assert!(!json.contains("sessionId"));
}

#[test]
fn test_cdp_request_serialize_with_session() {
    let req = CdpRequest {
        id: 7,
        method: "Page.printToPDF".to_string(),
        params: None,
        session_id: Some("sess-1".to_string()),
    };
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("\"sessionId\":\"sess-1\""));
    assert!(!json.contains("params"));
}

#[test]
fn test_cdp_response_deserialize() {
    let json = r#"{"id": 1, "result": {"frameId": "abc"}}"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, Some(1));
    assert!(resp.result.is_some());
    assert!(resp.method.is_none());
}

#[test]
fn test_cdp_event_deserialize() {
    let json = r#"{
        "method": "Network.requestWillBeSent",
        "params": {"requestId": "req-1"},
        "sessionId": "sess-1"
    }"#;
    let resp: CdpResponse = serde_json::from_str(json).unwrap();
    assert_eq!(resp.id, None);
    assert_eq!(resp.method.as_deref(), Some("Network.requestWillBeSent"));
    assert_eq!(resp.session_id.as_deref(), Some("sess-1"));
}

#[test]
fn test_page_info_deserialize() {
    let json = r#"{
        "id": "page123",
        "type": "page",
        "title": "Test",
        "url": "https://example.com",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/page/page123"
    }"#;
    let info: PageInfo = serde_json::from_str(json).unwrap();
    assert_eq!(info.id, "page123");
    assert_eq!(info.page_type, "page");
}

#[test]
fn test_browser_version_deserialize() {
    let json = r#"{
        "Browser": "Chrome/120.0.0.0",
        "Protocol-Version": "1.3",
        "User-Agent": "Mozilla/5.0",
        "webSocketDebuggerUrl": "ws://localhost:9222/devtools/browser/xyz"
    }"#;
    let version: BrowserVersion = serde_json::from_str(json).unwrap();
    assert_eq!(version.browser, "Chrome/120.0.0.0");
    assert!(version.web_socket_debugger_url.starts_with("ws://"));
}

#[test]
fn test_mouse_button_serialize() {
    let json = serde_json::to_string(&MouseButton::Left).unwrap();
    assert_eq!(json, "\"left\"");
}

#[test]
fn test_print_params_a4_fixed_profile() {
    let params = PrintToPdfParams::a4_with_margin_cm(1.0);
    assert!(!params.landscape);
    assert!(params.print_background);
    assert_eq!(params.paper_width, 8.27);
    assert_eq!(params.paper_height, 11.7);
    // 1cm in inches on every side
    for margin in [
        params.margin_top,
        params.margin_bottom,
        params.margin_left,
        params.margin_right,
    ] {
        assert!((margin - 0.3937).abs() < 1e-3);
    }
}

#[test]
fn test_print_params_serialize_camel_case() {
    let params = PrintToPdfParams::a4_with_margin_cm(1.0);
    let json = serde_json::to_string(&params).unwrap();
    assert!(json.contains("printBackground"));
    assert!(json.contains("paperWidth"));
    assert!(json.contains("marginTop"));
}
