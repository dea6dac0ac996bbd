//! A2A client against a mock agent

use action_agent_a2a::{A2aClient, A2aError, AgentCard, Message, Task, TaskStatus};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn completed_task(reply: &str) -> Task {
    let mut task = Task::new("task-42");
    task.add_message(Message::user("Create user a@b.com"));
    task.add_message(Message::agent(reply));
    task.set_status(TaskStatus::Completed);
    task
}

#[tokio::test]
async fn fetches_agent_card() {
    let server = MockServer::start().await;
    let card = AgentCard::new("action-agent", "Action Agent", server.uri());

    Mock::given(method("GET"))
        .and(path("/.well-known/agent.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&card))
        .expect(1)
        .mount(&server)
        .await;

    let client = A2aClient::new(server.uri()).unwrap();
    let fetched = client.get_agent_card().await.unwrap();
    assert_eq!(fetched, card);
}

#[tokio::test]
async fn sends_message_with_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tasks/send"))
        .and(header("authorization", "Bearer chat-agent-token"))
        .and(body_partial_json(json!({
            "message": {"role": "user", "parts": [{"type": "text", "text": "Create user a@b.com"}]}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"task": completed_task("User created: u-123")})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = A2aClient::new(server.uri())
        .unwrap()
        .with_bearer_token("chat-agent-token");
    let task = client.send_message("Create user a@b.com").await.unwrap();

    assert_eq!(task.status, TaskStatus::Completed);
    assert_eq!(task.latest_agent_text().as_deref(), Some("User created: u-123"));
}

#[tokio::test]
async fn continue_task_carries_task_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tasks/send"))
        .and(body_partial_json(json!({"taskId": "task-42"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"task": completed_task("done")})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = A2aClient::new(server.uri()).unwrap();
    let task = client.continue_task("task-42", "group engineering").await.unwrap();
    assert_eq!(task.id, "task-42");
}

#[tokio::test]
async fn get_and_cancel_task() {
    let server = MockServer::start().await;
    let mut cancelled = Task::new("task-7");
    cancelled.set_status(TaskStatus::Cancelled);

    Mock::given(method("GET"))
        .and(path("/tasks/task-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(Task::new("task-7")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tasks/task-7/cancel"))
        .and(body_partial_json(json!({"taskId": "task-7", "reason": "duplicate"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(&cancelled))
        .mount(&server)
        .await;

    let client = A2aClient::new(server.uri()).unwrap();
    assert_eq!(client.get_task("task-7").await.unwrap().status, TaskStatus::Working);

    let task = client
        .cancel_task("task-7", Some("duplicate".to_string()))
        .await
        .unwrap();
    assert_eq!(task.status, TaskStatus::Cancelled);
}

#[tokio::test]
async fn error_statuses_are_mapped() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks/finished"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 400,
            "message": "Task finished is in terminal state: completed"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/busy"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/secret"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = A2aClient::new(server.uri()).unwrap();

    match client.get_task("finished").await.unwrap_err() {
        A2aError::InvalidMessage { reason } => assert!(reason.contains("terminal state")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(matches!(
        client.get_task("busy").await.unwrap_err(),
        A2aError::RateLimitExceeded {
            retry_after_seconds: 7
        }
    ));
    assert!(matches!(
        client.get_task("secret").await.unwrap_err(),
        A2aError::AuthenticationRequired
    ));
}

#[tokio::test]
async fn unreachable_agent_is_a_connection_error() {
    let client = A2aClient::new("http://127.0.0.1:9/").unwrap();
    let err = client.get_agent_card().await.unwrap_err();
    assert!(matches!(err, A2aError::ConnectionError { .. }), "{err}");
}
