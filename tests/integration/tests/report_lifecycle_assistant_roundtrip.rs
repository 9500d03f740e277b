use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use civic_ai::{ChatRequest, ChatResponse, ChatUsage, CivicAiError, LlmClient, Message};
use civic_assistant::{AssistantConfig, AssistantDispatcher, REFUSAL_REPLY};
use civic_core::Coordinates;
use civic_lifecycle::{LifecycleConfig, LifecycleError, ReportLifecycle};
use civic_store::{InMemoryCivicStore, StoreFixture, UserStore};
use civic_types::{NewReport, ReportStatus, User, UserRole};
use tokio::sync::Mutex as AsyncMutex;

const CITIZEN: u64 = 1;
const STAFF: u64 = 2;
const OTHER_CITIZEN: u64 = 3;

struct ScriptedClient {
    responses: AsyncMutex<VecDeque<Result<String, u16>>>,
    requests: AsyncMutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    fn new(responses: Vec<Result<String, u16>>) -> Arc<Self> {
        Arc::new(Self {
            responses: AsyncMutex::new(VecDeque::from(responses)),
            requests: AsyncMutex::new(Vec::new()),
        })
    }

    async fn request_count(&self) -> usize {
        self.requests.lock().await.len()
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse, CivicAiError> {
        self.requests.lock().await.push(request);
        match self.responses.lock().await.pop_front() {
            Some(Ok(text)) => Ok(ChatResponse {
                message: Message::assistant(text),
                finish_reason: Some("stop".to_string()),
                usage: ChatUsage::default(),
            }),
            Some(Err(status)) => Err(CivicAiError::HttpStatus {
                status,
                body: "scripted failure".to_string(),
            }),
            None => Err(CivicAiError::InvalidResponse(
                "scripted response queue exhausted".to_string(),
            )),
        }
    }
}

struct Harness {
    store: Arc<InMemoryCivicStore>,
    lifecycle: ReportLifecycle,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(InMemoryCivicStore::with_fixture(StoreFixture {
            users: vec![
                User::new(CITIZEN, "Asha", UserRole::Citizen),
                User::new(STAFF, "Ravi", UserRole::Staff),
                User::new(OTHER_CITIZEN, "Meena", UserRole::Citizen),
            ],
            reports: Vec::new(),
        }));
        let lifecycle = ReportLifecycle::new(store.clone(), LifecycleConfig::default());
        Self { store, lifecycle }
    }

    fn assistant(&self, client: Arc<ScriptedClient>) -> AssistantDispatcher {
        AssistantDispatcher::new(self.store.clone(), client, AssistantConfig::default())
    }

    async fn coins(&self, user_id: u64) -> u64 {
        self.store
            .find_user(user_id)
            .await
            .expect("user lookup")
            .expect("user exists")
            .civic_coins
    }
}

fn pothole_submission() -> NewReport {
    NewReport {
        owner_id: CITIZEN,
        title: "Pothole outside school gate".to_string(),
        location: "Residency Road".to_string(),
        description: Some("Two-wheelers are swerving into traffic".to_string()),
        category: "Roads".to_string(),
        origin: Some(Coordinates::new(12.90, 77.58)),
        image_ref: Some("uploads/pothole.jpg".to_string()),
        expected_resolution_at: None,
    }
}

#[tokio::test]
async fn integration_geofenced_lifecycle_closes_report_and_rewards_owner() {
    let harness = Harness::new();
    let lifecycle = &harness.lifecycle;
    let on_site = Coordinates::new(12.9005, 77.5805);

    let report = lifecycle.submit(pothole_submission()).await.expect("submit");
    let report = lifecycle.assign(&report, STAFF, "Ravi").await.expect("assign");

    let too_far = lifecycle
        .resolve(&report, Coordinates::new(12.95, 77.63), None)
        .await
        .expect_err("staff not on site");
    assert!(matches!(too_far, LifecycleError::OutOfRange { .. }));
    assert_eq!(
        lifecycle.fetch(report.id).await.expect("fetch").status,
        ReportStatus::Progress
    );

    let report = lifecycle
        .resolve(&report, on_site, Some("uploads/fixed.jpg".to_string()))
        .await
        .expect("resolve on site");
    assert_eq!(report.status, ReportStatus::Resolved);

    let report = lifecycle.verify(&report, on_site).await.expect("verify");
    assert_eq!(report.status, ReportStatus::Closed);
    assert!(report.verified);
    assert_eq!(harness.coins(CITIZEN).await, 50);

    let tasks = lifecycle.tasks_for_staff(STAFF).await.expect("tasks");
    assert_eq!(tasks.len(), 1);
    let inbox = lifecycle.notifications(CITIZEN).await.expect("inbox");
    assert_eq!(inbox.len(), 4);
    assert!(inbox[0].text.contains("50 civic coins"));
}

#[tokio::test]
async fn integration_assistant_follows_ticket_through_lifecycle() {
    let harness = Harness::new();
    let report = harness
        .lifecycle
        .submit(pothole_submission())
        .await
        .expect("submit");
    harness
        .lifecycle
        .assign(&report, STAFF, "Ravi")
        .await
        .expect("assign");

    let client = ScriptedClient::new(vec![Err(503)]);
    let assistant = harness.assistant(client.clone());
    let message = format!("what is the status of ticket #{}?", report.id);

    let reply = assistant.respond(&message, Some(CITIZEN)).await.expect("reply");
    assert!(reply.contains("IN PROGRESS — being worked on"));
    assert!(reply.contains("Assigned Agent: Ravi"));
    assert_eq!(client.request_count().await, 1);

    let refused = assistant
        .respond(&message, Some(OTHER_CITIZEN))
        .await
        .expect("reply");
    assert_eq!(refused, REFUSAL_REPLY);
    assert!(!refused.contains("Pothole"));
    assert_eq!(client.request_count().await, 1);
}

#[tokio::test]
async fn integration_delegate_answer_is_returned_when_available() {
    let harness = Harness::new();
    let report = harness
        .lifecycle
        .submit(pothole_submission())
        .await
        .expect("submit");

    let client = ScriptedClient::new(vec![Ok(
        "Your pothole report is open and waiting for assignment.".to_string(),
    )]);
    let assistant = harness.assistant(client.clone());
    let reply = assistant
        .respond(&format!("report {} update?", report.id), Some(CITIZEN))
        .await
        .expect("reply");

    assert_eq!(
        reply,
        "Your pothole report is open and waiting for assignment."
    );
    let requests = client.requests.lock().await;
    assert!(requests[0].messages[1]
        .content
        .contains("Title            : Pothole outside school gate"));
}

#[tokio::test]
async fn integration_concurrent_votes_count_each_citizen_once() {
    let harness = Arc::new(Harness::new());
    let report = harness
        .lifecycle
        .submit(pothole_submission())
        .await
        .expect("submit");

    let mut handles = Vec::new();
    for voter in [STAFF, OTHER_CITIZEN, OTHER_CITIZEN, STAFF] {
        let harness = harness.clone();
        let report = report.clone();
        handles.push(tokio::spawn(async move {
            harness.lifecycle.vote(&report, voter).await
        }));
    }

    let mut accepted = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.expect("join") {
            Ok(_) => accepted += 1,
            Err(LifecycleError::Conflict(_)) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(accepted, 2);
    assert_eq!(conflicts, 2);
    assert_eq!(
        harness.lifecycle.fetch(report.id).await.expect("fetch").upvote_count,
        2
    );
}
