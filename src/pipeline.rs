//! Submit once, then forward every result in order.

use serde_json::Value;

use crate::error::{ForwardError, RelayError};
use crate::forwarder::Forwarder;
use crate::models::{GenerationRequest, GenerationResult};
use crate::provider::VideoProvider;
use crate::report;

#[derive(Debug)]
pub struct RunSummary {
    pub results: Vec<GenerationResult>,
    /// One entry per result, same order.
    pub outcomes: Vec<Result<Value, ForwardError>>,
}

impl RunSummary {
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }
}

/// Runs the whole flow. Configuration and provider failures are returned as
/// errors; per-result forward failures are collected in the summary.
pub async fn run<P>(
    provider: &P,
    forwarder: &Forwarder,
    request: &GenerationRequest,
) -> Result<RunSummary, RelayError>
where
    P: VideoProvider + ?Sized,
{
    // Fail on a missing endpoint before paying for a generation.
    let endpoint = forwarder.resolve_endpoint(None)?;

    report::submission_started(provider.name(), request);
    let results = provider.submit_video_generation(request).await?;
    report::results_received(&results);

    let mut outcomes = Vec::with_capacity(results.len());
    for result in &results {
        match forwarder.forward(result, request, Some(endpoint.as_str())).await {
            Ok(body) => outcomes.push(Ok(body)),
            Err(RelayError::Forward(e)) => outcomes.push(Err(e)),
            Err(fatal) => return Err(fatal),
        }
    }

    let summary = RunSummary { results, outcomes };
    report::summary(&summary);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ConfigError, ProviderError};
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct StubProvider {
        results: Vec<GenerationResult>,
        fail: bool,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn returning(results: Vec<GenerationResult>) -> Self {
            Self { results, fail: false, calls: AtomicUsize::new(0) }
        }

        fn failing() -> Self {
            Self { results: Vec::new(), fail: true, calls: AtomicUsize::new(0) }
        }
    }

    #[async_trait]
    impl VideoProvider for StubProvider {
        async fn submit_video_generation(
            &self,
            _request: &GenerationRequest,
        ) -> Result<Vec<GenerationResult>, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ProviderError::Task {
                    code: "error".into(),
                    message: "generation failed".into(),
                });
            }
            Ok(self.results.clone())
        }

        fn name(&self) -> &str {
            "stub"
        }
    }

    fn video(n: u32) -> GenerationResult {
        GenerationResult {
            video_url: format!("https://example.com/video{n}.mp4"),
            cost: Some(0.05),
            seed: Some(n as i64),
            status: "completed".into(),
            video_uuid: None,
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::builder("A majestic eagle").build().unwrap()
    }

    #[tokio::test]
    async fn completed_result_is_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = StubProvider::returning(vec![video(1)]);
        let forwarder = Forwarder::new(Some(server.uri()));
        let summary = run(&provider, &forwarder, &request()).await.unwrap();

        assert_eq!(summary.delivered(), 1);
        assert_eq!(summary.failed(), 0);
        assert_eq!(summary.outcomes[0].as_ref().unwrap(), &json!({ "ok": true }));
    }

    #[tokio::test]
    async fn each_result_gets_its_own_task_uuid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(3)
            .mount(&server)
            .await;

        let provider = StubProvider::returning(vec![video(1), video(2), video(3)]);
        let forwarder = Forwarder::new(Some(server.uri()));
        run(&provider, &forwarder, &request()).await.unwrap();

        let received = server.received_requests().await.unwrap();
        let mut ids: Vec<String> = received
            .iter()
            .map(|r| r.body_json::<Value>().unwrap()["taskUUID"].as_str().unwrap().to_string())
            .collect();
        let urls: Vec<String> = received
            .iter()
            .map(|r| r.body_json::<Value>().unwrap()["videoURL"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(
            urls,
            vec![
                "https://example.com/video1.mp4",
                "https://example.com/video2.mp4",
                "https://example.com/video3.mp4",
            ]
        );
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn forward_failure_does_not_abort_the_run() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("server error"))
            .mount(&server)
            .await;

        let provider = StubProvider::returning(vec![video(1), video(2)]);
        let forwarder = Forwarder::new(Some(server.uri()));
        let summary = run(&provider, &forwarder, &request()).await.unwrap();

        assert_eq!(summary.delivered(), 0);
        assert_eq!(summary.failed(), 2);
        assert!(matches!(
            summary.outcomes[0],
            Err(ForwardError::Rejected { status: 500, ref body }) if body == "server error"
        ));
    }

    #[tokio::test]
    async fn provider_failure_aborts_before_forwarding() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
            .expect(0)
            .mount(&server)
            .await;

        let provider = StubProvider::failing();
        let forwarder = Forwarder::new(Some(server.uri()));
        let err = run(&provider, &forwarder, &request()).await.unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, RelayError::Provider(ProviderError::Task { .. })));
    }

    #[tokio::test]
    async fn missing_endpoint_aborts_before_submitting() {
        let provider = StubProvider::returning(vec![video(1)]);
        let err = run(&provider, &Forwarder::new(None), &request()).await.unwrap_err();
        assert!(matches!(err, RelayError::Config(ConfigError::MissingEndpoint)));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }
}
