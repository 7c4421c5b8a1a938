/// Wire types for the labeling server API
///
/// Every JSON response carries a `success` flag and, on failure,
/// an `error` string that is shown to the operator verbatim.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ApiError;
use crate::state::data::AnnotationMap;

#[derive(Serialize, Debug)]
pub struct ImagesRequest<'a> {
    pub folder_path: &'a str,
}

#[derive(Deserialize, Debug)]
pub struct ImagesResponse {
    pub success: bool,
    #[serde(default)]
    pub images: Vec<String>,
    pub error: Option<String>,
}

#[derive(Serialize, Debug)]
pub struct SaveRequest<'a> {
    pub annotations: &'a AnnotationMap,
}

#[derive(Deserialize, Debug)]
pub struct SaveResponse {
    pub success: bool,
    pub error: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct DedupeResponse {
    pub success: bool,
    pub error: Option<String>,
    pub output_file: Option<String>,
    #[serde(default)]
    pub original_count: u64,
    #[serde(default)]
    pub deduplicated_count: u64,
    #[serde(default)]
    pub removed_count: u64,
    #[serde(default)]
    pub quality_distribution: Value,
}

/// Outcome of a server-side deduplication pass
#[derive(Debug, Clone, PartialEq)]
pub struct DedupeSummary {
    pub output_file: String,
    pub original_count: u64,
    pub deduplicated_count: u64,
    pub removed_count: u64,
    /// e.g. "Good: 12, Bad: 3"
    pub quality_distribution: String,
}

/// Response of the status probe
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ServerStatus {
    pub status: String,
    pub timestamp: Option<String>,
}

/// What the startup status check learned about the server
#[derive(Debug, Clone, PartialEq)]
pub enum ServerCheck {
    Up(ServerStatus),
    /// Server answered but has no usable status route
    NoStatusRoute(String),
    /// Nothing answered at all
    Unreachable(String),
}

impl ServerCheck {
    pub fn from_result(result: Result<ServerStatus, ApiError>) -> Self {
        match result {
            Ok(status) => ServerCheck::Up(status),
            Err(e @ (ApiError::Transport(_) | ApiError::Url(_))) => {
                ServerCheck::Unreachable(e.to_string())
            }
            Err(e) => ServerCheck::NoStatusRoute(e.to_string()),
        }
    }
}

/// Turn the `success`/`error` envelope into a `Result`
pub fn check(success: bool, error: Option<String>) -> Result<(), ApiError> {
    if success {
        Ok(())
    } else {
        Err(ApiError::Server(
            error.unwrap_or_else(|| "unknown error".to_string()),
        ))
    }
}

impl ImagesResponse {
    pub fn into_result(self) -> Result<Vec<String>, ApiError> {
        check(self.success, self.error)?;
        Ok(self.images)
    }
}

impl SaveResponse {
    pub fn into_result(self) -> Result<(), ApiError> {
        check(self.success, self.error)
    }
}

impl DedupeResponse {
    pub fn into_result(self) -> Result<DedupeSummary, ApiError> {
        check(self.success, self.error)?;
        Ok(DedupeSummary {
            output_file: self.output_file.unwrap_or_default(),
            original_count: self.original_count,
            deduplicated_count: self.deduplicated_count,
            removed_count: self.removed_count,
            quality_distribution: describe_distribution(&self.quality_distribution),
        })
    }
}

/// The server sends the distribution pre-formatted, but accept a
/// `{label: count}` object too.
fn describe_distribution(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Object(counts) => counts
            .iter()
            .map(|(label, count)| format!("{}: {}", label, count))
            .collect::<Vec<_>>()
            .join(", "),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::{Annotation, Quality};
    use serde_json::json;

    #[test]
    fn test_save_request_shape() {
        let mut annotations = AnnotationMap::new();
        annotations.insert(
            "/data/a.jpg".into(),
            Annotation {
                quality: Quality::Good,
                timestamp: "2024-01-01T00:00:00.000Z".into(),
            },
        );

        let body = serde_json::to_value(SaveRequest { annotations: &annotations }).unwrap();

        assert_eq!(
            body,
            json!({
                "annotations": {
                    "/data/a.jpg": { "quality": "Good", "timestamp": "2024-01-01T00:00:00.000Z" }
                }
            })
        );
    }

    #[test]
    fn test_failed_envelope_keeps_error_text() {
        let response: ImagesResponse =
            serde_json::from_value(json!({ "success": false, "error": "folder does not exist" })).unwrap();

        match response.into_result() {
            Err(ApiError::Server(message)) => assert_eq!(message, "folder does not exist"),
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_server_check_http_status_means_reachable() {
        let check = ServerCheck::from_result(Err(ApiError::Status(404)));
        assert_eq!(check, ServerCheck::NoStatusRoute("HTTP error! status: 404".into()));

        let check = ServerCheck::from_result(Err(ApiError::Decode("expected value".into())));
        assert!(matches!(check, ServerCheck::NoStatusRoute(_)));
    }

    #[test]
    fn test_dedupe_summary_from_server_payload() {
        let response: DedupeResponse = serde_json::from_value(json!({
            "success": true,
            "output_file": "annotations_deduplicated_20240101_000000.csv",
            "original_count": 10,
            "deduplicated_count": 7,
            "removed_count": 3,
            "quality_distribution": "Good: 5, Bad: 2"
        }))
        .unwrap();

        let summary = response.into_result().unwrap();

        assert_eq!(summary.removed_count, 3);
        assert_eq!(summary.quality_distribution, "Good: 5, Bad: 2");
    }

    #[test]
    fn test_distribution_object_is_flattened() {
        let text = describe_distribution(&json!({ "Bad": 2, "Good": 5 }));
        assert_eq!(text, "Bad: 2, Good: 5");
    }
}
