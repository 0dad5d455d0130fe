use pretty_assertions::assert_eq;
use quizzora_core::{
    ErrorKind, FileInput, McqItem, QuizOutcome, QuizPayload, Rejection, ShortAnswerItem,
    SubmissionOutcome, TaskStatus, UploadInput, MALFORMED_RESPONSE,
};
use quizzora_engine::{BackendClient, EngineSettings, FailureKind, ReqwestBackend};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, body_string_contains, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn backend_for(server: &MockServer) -> ReqwestBackend {
    ReqwestBackend::new(EngineSettings {
        backend_url: server.uri(),
        ..EngineSettings::default()
    })
    .expect("backend")
}

fn pdf() -> UploadInput {
    UploadInput::File(FileInput::new(
        "notes.pdf",
        "application/pdf",
        b"%PDF-1.4 fake".to_vec(),
    ))
}

#[tokio::test]
async fn link_is_posted_as_json_and_cache_hit_is_reported() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/youtube"))
        .and(body_json(json!({"url": "https://youtu.be/x"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"fromCache": true, "summary": "S"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = backend_for(&server)
        .submit(&UploadInput::link("  https://youtu.be/x "))
        .await
        .expect("round trip");
    assert_eq!(outcome, SubmissionOutcome::CachedSummary { text: "S".into() });
}

#[tokio::test]
async fn file_is_uploaded_as_multipart_and_task_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(header_exists("content-type"))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"notes.pdf\""))
        .and(body_string_contains("%PDF-1.4 fake"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"taskId": "t1", "status": "processing"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let outcome = backend_for(&server).submit(&pdf()).await.expect("round trip");
    assert_eq!(
        outcome,
        SubmissionOutcome::TaskAccepted {
            task_id: "t1".into()
        }
    );
}

#[tokio::test]
async fn error_field_wins_over_everything_else() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/youtube"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "error": "Error processing YouTube video: private",
            "taskId": "ignored"
        })))
        .mount(&server)
        .await;

    let outcome = backend_for(&server)
        .submit(&UploadInput::link("https://youtu.be/private"))
        .await
        .expect("round trip");
    assert_eq!(
        outcome,
        SubmissionOutcome::Rejected(Rejection::backend(
            "Error processing YouTube video: private"
        ))
    );
}

#[tokio::test]
async fn unknown_shape_is_malformed_not_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fromCache": true})))
        .mount(&server)
        .await;

    let outcome = backend_for(&server).submit(&pdf()).await.expect("round trip");
    match outcome {
        SubmissionOutcome::Rejected(rejection) => {
            assert_eq!(rejection.kind, ErrorKind::MalformedResponse);
            assert_eq!(rejection.message, MALFORMED_RESPONSE);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_page_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .submit(&pdf())
        .await
        .expect_err("no usable answer");
    assert_eq!(err.kind, FailureKind::HttpStatus(502));
    assert_eq!(Rejection::from(err).kind, ErrorKind::TransportFailure);
}

#[tokio::test]
async fn non_json_success_body_is_invalid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/youtube"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;

    let err = backend_for(&server)
        .submit(&UploadInput::link("https://youtu.be/x"))
        .await
        .expect_err("no usable answer");
    assert_eq!(err.kind, FailureKind::InvalidBody);
}

#[tokio::test]
async fn unreachable_backend_says_so() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let backend = ReqwestBackend::new(EngineSettings {
        backend_url: format!("http://127.0.0.1:{port}"),
        ..EngineSettings::default()
    })
    .expect("backend");

    let err = backend
        .submit(&UploadInput::link("https://youtu.be/x"))
        .await
        .expect_err("nothing listening");
    assert_eq!(err.kind, FailureKind::Connect);
    assert!(err.message.contains("Cannot reach the backend"), "{}", err.message);
}

#[tokio::test]
async fn status_shapes_are_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status/running"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "processing",
            "progress": 0.4,
            "details": "Transcribing audio"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/status/done"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "completed", "summary": "Z"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/status/broken"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "error", "error": "Transcription failed"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/status/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "Task not found"})))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    assert_eq!(
        backend.status("running").await.expect("status"),
        TaskStatus::InProgress {
            fraction: Some(0.4)
        }
    );
    assert_eq!(
        backend.status("done").await.expect("status"),
        TaskStatus::Completed {
            summary: "Z".into()
        }
    );
    assert_eq!(
        backend.status("broken").await.expect("status"),
        TaskStatus::Failed(Rejection::backend("Transcription failed"))
    );
    assert_eq!(
        backend.status("gone").await.expect("status"),
        TaskStatus::Failed(Rejection::backend("Task not found"))
    );
}

#[tokio::test]
async fn quiz_is_requested_with_topic_and_summary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate_quiz"))
        .and(body_string_contains("name=\"topic\""))
        .and(body_string_contains("biology"))
        .and(body_string_contains("name=\"summary\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quiz": [
                {"question": "Capital of France?", "options": ["Berlin", "Paris"], "answer": 1},
                {"question": "Largest planet?", "options": ["Mars", "Jupiter", "Venus"], "answer": "b"}
            ],
            "shortAnswers": [
                {"question": "Define photosynthesis.", "sampleAnswer": "Light to energy."}
            ],
            "source": "Topic: biology"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = backend_for(&server)
        .generate_quiz("Plants convert light.", "biology")
        .await
        .expect("round trip");
    let expected = QuizPayload::Structured {
        mcq: vec![
            McqItem::new(
                "Capital of France?",
                vec!["Berlin".into(), "Paris".into()],
                1,
            )
            .expect("item"),
            McqItem::new(
                "Largest planet?",
                vec!["Mars".into(), "Jupiter".into(), "Venus".into()],
                1,
            )
            .expect("item"),
        ],
        short_answer: vec![ShortAnswerItem {
            question: "Define photosynthesis.".into(),
            sample_answer: "Light to energy.".into(),
        }],
    };
    assert_eq!(outcome, QuizOutcome::Ready(expected));
}

#[tokio::test]
async fn empty_quiz_lists_are_a_valid_structured_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate_quiz"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"quiz": [], "shortAnswers": []})),
        )
        .mount(&server)
        .await;

    let outcome = backend_for(&server)
        .generate_quiz("S", "anything")
        .await
        .expect("round trip");
    assert_eq!(
        outcome,
        QuizOutcome::Ready(QuizPayload::Structured {
            mcq: Vec::new(),
            short_answer: Vec::new(),
        })
    );
}

#[tokio::test]
async fn raw_response_and_broken_structure_fall_back_to_raw() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate_quiz"))
        .and(body_string_contains("rawtopic"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"raw_response": "1. Free text question"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/generate_quiz"))
        .and(body_string_contains("badindex"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quiz": [{"question": "Q", "options": ["a", "b"], "answer": 5}]
        })))
        .mount(&server)
        .await;

    let backend = backend_for(&server);
    assert_eq!(
        backend.generate_quiz("S", "rawtopic").await.expect("round trip"),
        QuizOutcome::Ready(QuizPayload::Raw {
            text: "1. Free text question".into()
        })
    );
    match backend.generate_quiz("S", "badindex").await.expect("round trip") {
        QuizOutcome::Ready(QuizPayload::Raw { text }) => {
            assert!(text.contains("\"answer\": 5"), "{text}");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[tokio::test]
async fn quiz_failure_is_a_backend_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate_quiz"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": "Failed to generate quiz",
            "details": "model overloaded"
        })))
        .mount(&server)
        .await;

    let outcome = backend_for(&server)
        .generate_quiz("S", "biology")
        .await
        .expect("round trip");
    assert_eq!(
        outcome,
        QuizOutcome::Rejected(Rejection::backend("Failed to generate quiz"))
    );
}

#[tokio::test]
async fn quiz_generation_gets_its_own_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate_quiz"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"quiz": [], "shortAnswers": []}))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;

    let patient = ReqwestBackend::new(EngineSettings {
        backend_url: server.uri(),
        request_timeout: Duration::from_millis(100),
        quiz_timeout: Duration::from_secs(5),
        ..EngineSettings::default()
    })
    .expect("backend");
    assert_eq!(
        patient.generate_quiz("S", "slow").await.expect("round trip"),
        QuizOutcome::Ready(QuizPayload::Structured {
            mcq: Vec::new(),
            short_answer: Vec::new(),
        })
    );

    let impatient = ReqwestBackend::new(EngineSettings {
        backend_url: server.uri(),
        quiz_timeout: Duration::from_millis(100),
        ..EngineSettings::default()
    })
    .expect("backend");
    let err = impatient
        .generate_quiz("S", "slow")
        .await
        .expect_err("model too slow");
    assert_eq!(err.kind, FailureKind::Timeout);
}
