use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use pretty_assertions::assert_eq;
use quizzora_core::{
    ErrorKind, QuizOutcome, Rejection, SubmissionOutcome, TaskStatus, UploadInput,
};
use quizzora_engine::{
    run_poll_loop, BackendClient, EngineEvent, EngineSettings, EventSink, FailureKind, PollExit,
    PollSettings, ReqwestBackend, TransportError, POLL_EXHAUSTED,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default, Clone)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn statuses(&self) -> Vec<TaskStatus> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Status { status, .. } => Some(status.clone()),
                _ => None,
            })
            .collect()
    }

    fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Answers `InProgress` until `complete_after` calls, then `Completed`.
/// Tracks how many status requests are in flight at once.
#[derive(Default)]
struct ScriptedBackend {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    complete_after: Option<usize>,
    latency: Duration,
    fail_transport: bool,
}

#[async_trait::async_trait]
impl BackendClient for ScriptedBackend {
    async fn submit(&self, _input: &UploadInput) -> Result<SubmissionOutcome, TransportError> {
        unreachable!("poll tests never submit")
    }

    async fn status(&self, _task_id: &str) -> Result<TaskStatus, TransportError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_transport {
            return Err(TransportError {
                kind: FailureKind::Connect,
                message: "Cannot reach the backend".into(),
            });
        }
        match self.complete_after {
            Some(limit) if call >= limit => Ok(TaskStatus::Completed {
                summary: "done".into(),
            }),
            _ => Ok(TaskStatus::InProgress {
                fraction: Some(0.1),
            }),
        }
    }

    async fn generate_quiz(
        &self,
        _summary: &str,
        _topic: &str,
    ) -> Result<QuizOutcome, TransportError> {
        unreachable!("poll tests never request quizzes")
    }
}

fn fast(max_polls: u32) -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(5),
        max_polls,
    }
}

#[tokio::test]
async fn two_polls_then_completed_and_no_third_request() {
    engine_logging::initialize_for_tests();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status/t1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "processing", "progress": 0.4})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/status/t1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "completed", "summary": "Z"})),
        )
        .mount(&server)
        .await;

    let backend = ReqwestBackend::new(EngineSettings {
        backend_url: server.uri(),
        ..EngineSettings::default()
    })
    .expect("backend");
    let sink = TestSink::default();
    let cancel = CancellationToken::new();

    let exit = run_poll_loop(&backend, 1, "t1", fast(100), &cancel, &sink).await;
    assert_eq!(exit, PollExit::Terminal);
    assert_eq!(
        sink.statuses(),
        vec![
            TaskStatus::InProgress {
                fraction: Some(0.4)
            },
            TaskStatus::Completed {
                summary: "Z".into()
            },
        ]
    );

    tokio::time::sleep(Duration::from_millis(50)).await;
    let requests = server.received_requests().await.expect("recording enabled");
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn requests_never_overlap_even_when_slow() {
    let backend = ScriptedBackend {
        complete_after: Some(4),
        latency: Duration::from_millis(30),
        ..ScriptedBackend::default()
    };
    let sink = TestSink::default();
    let cancel = CancellationToken::new();

    let exit = run_poll_loop(&backend, 1, "t", fast(100), &cancel, &sink).await;
    assert_eq!(exit, PollExit::Terminal);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 4);
    assert_eq!(backend.max_in_flight.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transport_failure_ends_the_loop_after_one_try() {
    let backend = ScriptedBackend {
        fail_transport: true,
        ..ScriptedBackend::default()
    };
    let sink = TestSink::default();
    let cancel = CancellationToken::new();

    let exit = run_poll_loop(&backend, 1, "t", fast(100), &cancel, &sink).await;
    assert_eq!(exit, PollExit::Terminal);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    match sink.statuses().as_slice() {
        [TaskStatus::Failed(rejection)] => {
            assert_eq!(rejection.kind, ErrorKind::TransportFailure)
        }
        other => panic!("unexpected statuses {other:?}"),
    }
}

#[tokio::test]
async fn poll_budget_is_bounded() {
    let backend = ScriptedBackend::default();
    let sink = TestSink::default();
    let cancel = CancellationToken::new();

    let exit = run_poll_loop(&backend, 1, "t", fast(3), &cancel, &sink).await;
    assert_eq!(exit, PollExit::Exhausted);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 3);
    let statuses = sink.statuses();
    assert_eq!(statuses.len(), 4);
    assert_eq!(
        statuses.last(),
        Some(&TaskStatus::Failed(Rejection::transport(POLL_EXHAUSTED)))
    );
}

#[tokio::test]
async fn cancelled_loop_goes_silent() {
    let backend = Arc::new(ScriptedBackend {
        latency: Duration::from_millis(10),
        ..ScriptedBackend::default()
    });
    let sink = TestSink::default();
    let cancel = CancellationToken::new();

    let task = {
        let backend = Arc::clone(&backend);
        let sink = sink.clone();
        let cancel = cancel.clone();
        tokio::spawn(async move {
            run_poll_loop(backend.as_ref(), 1, "t", fast(10_000), &cancel, &sink).await
        })
    };

    tokio::time::sleep(Duration::from_millis(60)).await;
    cancel.cancel();
    let exit = task.await.expect("poll task");
    assert_eq!(exit, PollExit::Cancelled);

    let calls = backend.calls.load(Ordering::SeqCst);
    let events = sink.len();
    assert!(calls > 0);
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(backend.calls.load(Ordering::SeqCst), calls);
    assert_eq!(sink.len(), events);
}
