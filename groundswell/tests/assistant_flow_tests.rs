use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use groundswell::config::{LlmConfig, SearchConfig, SynthesisStrategy};
use groundswell::llm::assistants::AssistantsClient;
use groundswell::llm::RunStatus;
use groundswell::search::{SearchClient, SearchDispatcher};
use groundswell::synthesis::{
    NewsletterRequest, PollOutcome, SynthesisStart, Synthesizer, ToolCallingSynthesizer,
};

fn llm_config(base_url: String) -> LlmConfig {
    LlmConfig {
        strategy: SynthesisStrategy::ToolCalling,
        model: "gpt-4o".to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url),
        timeout_secs: 5,
    }
}

fn search_config(base_url: String) -> SearchConfig {
    SearchConfig {
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url),
        max_results: 5,
        time_range: "day".to_string(),
        timeout_secs: 5,
    }
}

fn synthesizer(llm_base: String, search_base: String) -> ToolCallingSynthesizer {
    let assistants = AssistantsClient::new(&llm_config(llm_base)).unwrap();
    let search = SearchDispatcher::new(SearchClient::new(&search_config(search_base)).unwrap());
    ToolCallingSynthesizer::new(assistants, search)
}

fn run_body(status: &str) -> serde_json::Value {
    json!({ "id": "r1", "status": status })
}

fn requires_action_body(call_id: &str) -> serde_json::Value {
    json!({
        "id": "r1",
        "status": "requires_action",
        "required_action": {
            "type": "submit_tool_outputs",
            "submit_tool_outputs": {
                "tool_calls": [
                    {
                        "id": call_id,
                        "type": "function",
                        "function": {
                            "name": "search_web",
                            "arguments": "{\"query\":\"site:x.com tenant union victory\"}"
                        }
                    }
                ]
            }
        }
    })
}

/// Replays a fixed sequence of responses, one per request, sticking on the
/// last one.
struct SequenceResponder {
    responses: Vec<serde_json::Value>,
    hits: Arc<AtomicUsize>,
}

impl Respond for SequenceResponder {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let index = self.hits.fetch_add(1, Ordering::SeqCst);
        let body = self
            .responses
            .get(index)
            .unwrap_or_else(|| self.responses.last().expect("sequence is non-empty"));
        ResponseTemplate::new(200).set_body_json(body.clone())
    }
}

#[tokio::test]
async fn test_begin_creates_assistant_thread_and_run() {
    let llm = MockServer::start().await;
    let search = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .expect(2)
        .mount(&search)
        .await;

    Mock::given(method("POST"))
        .and(path("/assistants"))
        .and(header("OpenAI-Beta", "assistants=v2"))
        .and(body_string_contains("search_web"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "asst_1" })))
        .expect(1)
        .mount(&llm)
        .await;

    Mock::given(method("POST"))
        .and(path("/threads"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "t1" })))
        .expect(1)
        .mount(&llm)
        .await;

    Mock::given(method("POST"))
        .and(path("/threads/t1/messages"))
        .and(body_string_contains("Search Results:"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "msg_1" })))
        .expect(1)
        .mount(&llm)
        .await;

    Mock::given(method("POST"))
        .and(path("/threads/t1/runs"))
        .and(body_string_contains("asst_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_body("queued")))
        .expect(1)
        .mount(&llm)
        .await;

    let synth = synthesizer(llm.uri(), search.uri());
    let request = NewsletterRequest {
        message: "Identify wins".to_string(),
        regions: vec!["Europe".to_string()],
        queries: vec!["campaign win".to_string(), "organizing success".to_string()],
    };

    match synth.begin(&request).await.unwrap() {
        SynthesisStart::Pending {
            thread_id,
            run_id,
            status,
        } => {
            assert_eq!(thread_id, "t1");
            assert_eq!(run_id, "r1");
            assert_eq!(status, RunStatus::Queued);
        }
        SynthesisStart::Completed { .. } => panic!("tool-calling begin should return a run handle"),
    }
}

#[tokio::test]
async fn test_poll_submits_one_batch_per_requires_action_and_terminates() {
    let llm = MockServer::start().await;
    let search = MockServer::start().await;

    // Status sequence observed across four polls.
    let responder = SequenceResponder {
        responses: vec![
            run_body("queued"),
            requires_action_body("call_1"),
            requires_action_body("call_2"),
            run_body("completed"),
        ],
        hits: Arc::new(AtomicUsize::new(0)),
    };

    Mock::given(method("GET"))
        .and(path("/threads/t1/runs/r1"))
        .respond_with(responder)
        .expect(4)
        .mount(&llm)
        .await;

    // Exactly one tool-output submission per requires_action observation.
    Mock::given(method("POST"))
        .and(path("/threads/t1/runs/r1/submit_tool_outputs"))
        .and(body_string_contains("tool_outputs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_body("in_progress")))
        .expect(2)
        .mount(&llm)
        .await;

    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "results": [{ "title": "found it" }] })),
        )
        .expect(2)
        .mount(&search)
        .await;

    Mock::given(method("GET"))
        .and(path("/threads/t1/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [
                {
                    "content": [
                        { "type": "text", "text": { "value": "### Europe\n- Rent freeze won", "annotations": [] } }
                    ]
                }
            ]
        })))
        .expect(1)
        .mount(&llm)
        .await;

    let synth = synthesizer(llm.uri(), search.uri());

    assert!(matches!(
        synth.check("t1", "r1").await.unwrap(),
        PollOutcome::Pending(RunStatus::Queued)
    ));
    assert!(matches!(
        synth.check("t1", "r1").await.unwrap(),
        PollOutcome::Pending(RunStatus::RequiresAction)
    ));
    assert!(matches!(
        synth.check("t1", "r1").await.unwrap(),
        PollOutcome::Pending(RunStatus::RequiresAction)
    ));

    match synth.check("t1", "r1").await.unwrap() {
        PollOutcome::Completed { response } => {
            assert_eq!(response, "### Europe\n- Rent freeze won");
        }
        other => panic!("expected completion, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failed_search_inside_tool_call_still_submits_full_batch() {
    let llm = MockServer::start().await;
    let search = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/threads/t1/runs/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(requires_action_body("call_1")))
        .mount(&llm)
        .await;

    // The search provider rejects the call; the placeholder is submitted
    // instead so the batch stays complete.
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("rejected"))
        .expect(1)
        .mount(&search)
        .await;

    Mock::given(method("POST"))
        .and(path("/threads/t1/runs/r1/submit_tool_outputs"))
        .and(body_string_contains("call_1"))
        .and(body_string_contains("Search failed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_body("in_progress")))
        .expect(1)
        .mount(&llm)
        .await;

    let synth = synthesizer(llm.uri(), search.uri());
    let outcome = synth.check("t1", "r1").await.unwrap();

    assert!(matches!(outcome, PollOutcome::Pending(RunStatus::RequiresAction)));
}

#[tokio::test]
async fn test_failed_run_reports_provider_error() {
    let llm = MockServer::start().await;
    let search = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/threads/t1/runs/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "r1",
            "status": "failed",
            "last_error": { "code": "rate_limit_exceeded", "message": "Rate limit reached" }
        })))
        .mount(&llm)
        .await;

    let synth = synthesizer(llm.uri(), search.uri());

    match synth.check("t1", "r1").await.unwrap() {
        PollOutcome::Failed { message } => assert_eq!(message, "Rate limit reached"),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_expired_run_without_error_detail_reports_status() {
    let llm = MockServer::start().await;
    let search = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/threads/t1/runs/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(run_body("expired")))
        .mount(&llm)
        .await;

    let synth = synthesizer(llm.uri(), search.uri());

    match synth.check("t1", "r1").await.unwrap() {
        PollOutcome::Failed { message } => {
            assert_eq!(message, "Run ended with status expired");
        }
        other => panic!("expected failure, got {other:?}"),
    }
}
