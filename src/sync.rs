/// Annotation sync
///
/// Every mark sends the whole annotation map to the server. Saves are
/// best-effort: a failure is logged and dropped, because the next mark
/// resends a superset. Each save gets a sequence number so that a late
/// acknowledgement from an older save can be told apart from the newest one.

use tracing::{debug, warn};

use crate::api::ApiClient;
use crate::state::data::AnnotationMap;

/// What an acknowledgement turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ack {
    Saved,
    Failed(String),
    /// An older save finished after a newer one had already been acknowledged
    Stale,
}

#[derive(Debug, Default)]
pub struct AnnotationSync {
    next_seq: u64,
    /// Highest sequence number whose response has arrived
    last_acked: Option<u64>,
    failures: u64,
}

impl AnnotationSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take a snapshot of the map and reserve a sequence number for it.
    /// The returned future does the network call.
    pub fn persist(
        &mut self,
        client: &ApiClient,
        annotations: &AnnotationMap,
    ) -> (u64, impl std::future::Future<Output = Result<(), String>> + Send + 'static) {
        let seq = self.begin();
        let client = client.clone();
        let snapshot = annotations.clone();

        debug!("Saving {} annotations (seq {})", snapshot.len(), seq);

        let save = async move {
            client
                .save_annotations(&snapshot)
                .await
                .map_err(|e| e.to_string())
        };
        (seq, save)
    }

    fn begin(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }

    /// Record the result of save `seq`. Never surfaces anything to the user.
    pub fn acknowledge(&mut self, seq: u64, result: Result<(), String>) -> Ack {
        if self.last_acked.is_some_and(|last| seq < last) {
            debug!("Ignoring stale save acknowledgement (seq {})", seq);
            return Ack::Stale;
        }
        self.last_acked = Some(seq);

        match result {
            Ok(()) => Ack::Saved,
            Err(e) => {
                self.failures += 1;
                warn!(
                    "Saving annotations failed (seq {}, {} failures this run): {}",
                    seq, self.failures, e
                );
                Ack::Failed(e)
            }
        }
    }

    /// Number of saves issued so far
    pub fn issued(&self) -> u64 {
        self.next_seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_numbers_increase() {
        let mut sync = AnnotationSync::new();

        assert_eq!(sync.begin(), 1);
        assert_eq!(sync.begin(), 2);
        assert_eq!(sync.issued(), 2);
    }

    #[test]
    fn test_in_order_acks() {
        let mut sync = AnnotationSync::new();
        let first = sync.begin();
        let second = sync.begin();

        assert_eq!(sync.acknowledge(first, Ok(())), Ack::Saved);
        assert_eq!(sync.acknowledge(second, Ok(())), Ack::Saved);
    }

    #[test]
    fn test_out_of_order_ack_is_stale() {
        let mut sync = AnnotationSync::new();
        let first = sync.begin();
        let second = sync.begin();

        assert_eq!(sync.acknowledge(second, Ok(())), Ack::Saved);
        assert_eq!(sync.acknowledge(first, Err("late".into())), Ack::Stale);
        // A stale failure is not counted
        assert_eq!(sync.failures, 0);
    }

    #[tokio::test]
    async fn test_persist_failure_is_reported_to_acknowledge() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = ApiClient::from_parts(
            reqwest::Client::new(),
            reqwest::Url::parse(&format!("http://{}", addr)).unwrap(),
            crate::config::Routes::default(),
        );
        let mut sync = AnnotationSync::new();

        let (seq, save) = sync.persist(&client, &AnnotationMap::new());
        let result = save.await;

        assert_eq!(seq, 1);
        assert!(result.is_err());
        assert!(matches!(sync.acknowledge(seq, result), Ack::Failed(_)));
    }

    #[tokio::test]
    async fn test_each_save_carries_the_whole_map() {
        use crate::state::data::{Annotation, Quality};
        use axum::routing::post;
        use axum::{Json, Router};
        use serde_json::{json, Value};
        use std::sync::{Arc, Mutex};

        let bodies: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = bodies.clone();
        let router = Router::new().route(
            "/api/save",
            post(move |Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    sink.lock().unwrap().push(body);
                    Json(json!({ "success": true }))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = ApiClient::from_parts(
            reqwest::Client::new(),
            reqwest::Url::parse(&format!("http://{}", addr)).unwrap(),
            crate::config::Routes::default(),
        );
        let mut sync = AnnotationSync::new();
        let mut annotations = AnnotationMap::new();
        let stamp = "2024-01-01T00:00:00.000Z".to_string();

        annotations.insert("a.jpg".into(), Annotation { quality: Quality::Good, timestamp: stamp.clone() });
        let (first, save) = sync.persist(&client, &annotations);
        assert_eq!(sync.acknowledge(first, save.await), Ack::Saved);

        annotations.insert("b.jpg".into(), Annotation { quality: Quality::Bad, timestamp: stamp });
        let (second, save) = sync.persist(&client, &annotations);
        assert_eq!(sync.acknowledge(second, save.await), Ack::Saved);

        let bodies = bodies.lock().unwrap();
        assert_eq!(bodies.len(), 2);
        assert_eq!(bodies[0]["annotations"].as_object().unwrap().len(), 1);
        assert_eq!(bodies[1]["annotations"]["a.jpg"]["quality"], "Good");
        assert_eq!(bodies[1]["annotations"]["b.jpg"]["quality"], "Bad");
    }

    #[test]
    fn test_failure_is_recorded_not_retried() {
        let mut sync = AnnotationSync::new();
        let seq = sync.begin();

        let ack = sync.acknowledge(seq, Err("HTTP error! status: 500".into()));

        assert_eq!(ack, Ack::Failed("HTTP error! status: 500".into()));
        assert_eq!(sync.failures, 1);
        assert_eq!(sync.issued(), 1);
    }
}
