//! Custom assertions for E2E tests

use serde_json::Value;
use svcreg_http::{ClientResponse, ResponseBody, StatusCode};

/// Assert that a response carries `status` and the JSON body `{"error": message}`
pub fn assert_error_response(
    response: &ClientResponse,
    status: StatusCode,
    message: &str,
) -> Result<(), String> {
    if response.status != status {
        return Err(format!(
            "Expected status {}, got {} with body {:?}",
            status, response.status, response.data
        ));
    }

    match response.data.as_json().and_then(|body| body.get("error")) {
        Some(Value::String(error)) if error == message => Ok(()),
        _ => Err(format!(
            "Expected error body {{\"error\": {:?}}}, got {:?}",
            message, response.data
        )),
    }
}

/// Assert that `record` is the JSON form of the service `(name, host, port)`
pub fn assert_service_record(record: &Value, name: &str, host: &str, port: u16) -> Result<(), String> {
    let expected_id = format!("{}-{}-{}", name, host, port);
    let expected_url = format!("http://{}:{}", host, port);

    let checks = [
        ("id", record["id"] == expected_id.as_str()),
        ("name", record["name"] == name),
        ("host", record["host"] == host),
        ("port", record["port"] == port),
        ("url", record["url"] == expected_url.as_str()),
        ("timestamp", record["timestamp"].is_i64()),
    ];

    match checks.iter().find(|(_, ok)| !ok) {
        None => Ok(()),
        Some((field, _)) => Err(format!(
            "Field '{}' is wrong in service record {}",
            field, record
        )),
    }
}

/// Assert that a response has an empty body (e.g. 204)
pub fn assert_empty_body(response: &ClientResponse) -> Result<(), String> {
    match &response.data {
        ResponseBody::Text(text) if text.is_empty() => Ok(()),
        other => Err(format!("Expected empty body, got {:?}", other)),
    }
}
