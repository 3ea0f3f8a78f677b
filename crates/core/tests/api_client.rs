//! Integration tests for ApiClient.
//!
//! Uses wiremock for HTTP mocking. Covers the case, signout and scoring endpoints and the
//! mapping of 404 / non-2xx / transport failures / unparsable bodies onto `ClientError`.

use std::time::Duration;

use serde_json::json;
use signout_core::{
    ApiClient, ClientConfig, ClientError, ClinicalValue, IllnessSeverity, NewSignout,
    NonEmptyText, Operation, Resource, SignoutId, ViewMode,
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_client(mock_server: &MockServer) -> ApiClient {
    let config = ClientConfig::new(mock_server.uri())
        .expect("valid base url")
        .with_timeout(Duration::from_secs(2));
    ApiClient::new(&config).expect("failed to create client")
}

fn id(raw: &str) -> SignoutId {
    SignoutId::parse(raw).unwrap()
}

fn case_detail_json() -> serde_json::Value {
    json!({
        "case_id": "case-001",
        "title": "Post-op fever",
        "tags": ["surgery", "sepsis"],
        "difficulty": "medium",
        "snapshot": {
            "one_liner": "67M POD2 after hemicolectomy with new fever",
            "active_problems": ["Fever", "AKI"],
            "vitals": {"HR": 118, "BP": "92/55", "RR": null},
            "labs": {"lactate": 3.1, "Cr": null},
            "meds": ["pip-tazo 4.5g q6h"],
            "pending": ["blood cultures x2"],
            "code_status": "Full Code"
        }
    })
}

#[tokio::test]
async fn test_get_case_forwards_mode_verbatim() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cases/case-001"))
        .and(query_param("mode", "exam"))
        .respond_with(ResponseTemplate::new(200).set_body_json(case_detail_json()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let detail = client
        .get_case("case-001", &ViewMode::exam())
        .await
        .expect("fetch failed");

    assert_eq!(detail.title, "Post-op fever");
    assert!(detail.hidden_truth.is_none());
    assert_eq!(
        detail.snapshot.vital("RR"),
        Some(&ClinicalValue::NotMeasured)
    );
    assert_eq!(detail.snapshot.vital("SpO2"), None);
    assert_eq!(detail.snapshot.lab("Cr"), Some(&ClinicalValue::NotMeasured));
}

#[tokio::test]
async fn test_get_case_passes_unknown_mode_through() {
    let mock_server = MockServer::start().await;

    let mut body = case_detail_json();
    body["hidden_truth"] = json!({
        "diagnosis": "anastomotic leak",
        "pitfalls": ["anchoring on atelectasis"],
        "recommended_actions": ["CT abdomen"]
    });

    Mock::given(method("GET"))
        .and(path("/api/cases/case-001"))
        .and(query_param("mode", "attending-review"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let detail = client
        .get_case("case-001", &ViewMode::new("attending-review"))
        .await
        .expect("fetch failed");

    let truth = detail.hidden_truth.expect("hidden truth returned");
    assert_eq!(truth.diagnosis, "anastomotic leak");
}

#[tokio::test]
async fn test_get_case_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cases/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Case not found"})))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let result = client.get_case("nope", &ViewMode::practice()).await;

    assert!(matches!(
        result,
        Err(ClientError::NotFound {
            resource: Resource::Case,
            ..
        })
    ));
}

#[tokio::test]
async fn test_get_case_blank_id_is_not_found_without_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    for blank in ["", "   "] {
        let result = client.get_case(blank, &ViewMode::exam()).await;
        assert!(matches!(
            result,
            Err(ClientError::NotFound {
                resource: Resource::Case,
                ..
            })
        ));
    }
}

#[tokio::test]
async fn test_list_cases() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/cases"))
        .and(header("user-agent", signout_core::constants::USER_AGENT_VALUE))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"case_id": "case-001", "title": "Post-op fever", "tags": ["surgery"], "difficulty": "medium"},
            {"case_id": "case-002", "title": "Hyperkalemia", "tags": [], "difficulty": "easy"}
        ])))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let cases = client.list_cases().await.expect("list failed");

    assert_eq!(cases.len(), 2);
    assert_eq!(cases[1].case_id, "case-002");
    assert_eq!(cases[0].tags, vec!["surgery".to_string()]);
}

#[tokio::test]
async fn test_create_signout_sends_null_free_text_and_accepts_201() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/signouts"))
        .and(body_json(json!({
            "case_id": "case-001",
            "illness_severity": "Unstable",
            "patient_summary": "67M POD2 febrile",
            "action_list": "recheck lactate",
            "situational_awareness": "may need ICU",
            "contingency_plans": "if MAP < 65 give 1L",
            "receiver_synthesis": "recheck lactate at 2am",
            "free_text": null
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"signout_id": "3b9d"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let payload = NewSignout {
        case_id: "case-001".into(),
        illness_severity: IllnessSeverity::Unstable,
        patient_summary: NonEmptyText::new("67M POD2 febrile").unwrap(),
        action_list: NonEmptyText::new("recheck lactate").unwrap(),
        situational_awareness: NonEmptyText::new("may need ICU").unwrap(),
        contingency_plans: NonEmptyText::new("if MAP < 65 give 1L").unwrap(),
        receiver_synthesis: NonEmptyText::new("recheck lactate at 2am").unwrap(),
        free_text: None,
    };

    let client = create_test_client(&mock_server);
    let created = client.create_signout(&payload).await.expect("create failed");

    assert_eq!(created.signout_id, id("3b9d"));
}

#[tokio::test]
async fn test_create_signout_rejected_keeps_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/signouts"))
        .respond_with(ResponseTemplate::new(422))
        .mount(&mock_server)
        .await;

    let payload = NewSignout {
        case_id: "case-001".into(),
        illness_severity: IllnessSeverity::Stable,
        patient_summary: NonEmptyText::new("a").unwrap(),
        action_list: NonEmptyText::new("b").unwrap(),
        situational_awareness: NonEmptyText::new("c").unwrap(),
        contingency_plans: NonEmptyText::new("d").unwrap(),
        receiver_synthesis: NonEmptyText::new("e").unwrap(),
        free_text: Some("note".into()),
    };

    let client = create_test_client(&mock_server);
    let err = client.create_signout(&payload).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::RequestFailed {
            operation: Operation::CreateSignout,
            status: 422
        }
    ));
}

#[tokio::test]
async fn test_get_signout_not_found_vs_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/signouts/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/signouts/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);

    let missing = client.get_signout(&id("gone")).await.unwrap_err();
    let broken = client.get_signout(&id("broken")).await.unwrap_err();

    assert!(missing.is_not_found());
    assert!(!broken.is_not_found());
    assert_eq!(broken.status(), Some(500));
}

#[tokio::test]
async fn test_get_signout_transport_failure_is_service_unavailable() {
    // Reserve a free port, then release it so the connection is refused.
    let uri = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        format!("http://{}", listener.local_addr().unwrap())
    };

    let client = ApiClient::new(&ClientConfig::new(&uri).unwrap()).unwrap();
    let err = client.get_signout(&id("any")).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::ServiceUnavailable {
            operation: Operation::GetSignout,
            ..
        }
    ));
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_get_signout_normalises_list_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/signouts/3b9d"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "3b9d",
            "case_id": "case-001",
            "created_at": "2026-03-04T21:15:09.123456Z",
            "illness_severity": "Unstable",
            "patient_summary": "67M POD2 febrile",
            "action_list": ["recheck lactate", "f/u cultures"],
            "situational_awareness": ["may need ICU"],
            "contingency_plans": ["if MAP < 65 give 1L"],
            "receiver_synthesis": "recheck lactate at 2am",
            "free_text": null
        })))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let signout = client.get_signout(&id("3b9d")).await.expect("fetch failed");

    assert_eq!(signout.action_items(), vec!["recheck lactate", "f/u cultures"]);
    assert_eq!(signout.free_text, None);
    assert!(signout.created_at_parsed().is_some());
}

#[tokio::test]
async fn test_unparsable_body_is_service_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/signouts/3b9d"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy error</html>"))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.get_signout(&id("3b9d")).await.unwrap_err();

    assert!(matches!(err, ClientError::ServiceUnavailable { .. }));
}

#[tokio::test]
async fn test_list_signouts_for_case() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/signouts"))
        .and(query_param("case_id", "case-001"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": "a1", "created_at": "2026-03-04T20:00:00Z"},
            {"id": "b2", "created_at": "2026-03-04T21:00:00Z"}
        ])))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let listed = client.list_signouts("case-001").await.expect("list failed");

    let ids: Vec<&str> = listed.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["a1", "b2"]);
}

#[tokio::test]
async fn test_score_signout_is_never_cached() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/signouts/3b9d/score"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "strengths": ["clear severity"],
            "improvements": [],
            "missing_critical": ["no code status"],
            "subscores": {"illness_severity": 2, "action_list": 1},
            "total_score": 3,
            "rubric_version": "ipass-v1"
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let first = client.score_signout(&id("3b9d")).await.expect("score failed");
    let second = client.score_signout(&id("3b9d")).await.expect("score failed");

    assert_eq!(first, second);
    assert_eq!(first.rubric_version, "ipass-v1");
    assert!(first.has_critical_gaps());
}

#[tokio::test]
async fn test_score_failure_preserves_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/signouts/3b9d/score"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    let err = client.score_signout(&id("3b9d")).await.unwrap_err();

    assert!(matches!(
        err,
        ClientError::RequestFailed {
            operation: Operation::ScoreSignout,
            status: 503
        }
    ));
    assert!(!err.user_message().contains("503"));
}

#[tokio::test]
async fn test_health() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server);
    assert!(client.health().await.expect("health failed").is_ok());
}
