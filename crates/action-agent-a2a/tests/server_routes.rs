//! Router-level tests for the A2A server

use action_agent_a2a::{
    A2aServer, AgentCard, AgentHandler, AgentSkill, Message, SendMessageRequest, Task,
    TaskStatus, TaskStoreConfig,
};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use std::time::Duration;
use tower::ServiceExt;

/// Echoes text back; "need more" asks for input, "slowly" asks for input
/// after a pause, "explode" fails.
struct ScriptedAgent;

#[async_trait]
impl AgentHandler for ScriptedAgent {
    fn agent_card(&self) -> AgentCard {
        AgentCard::new("scripted", "Scripted Agent", "http://localhost:9000/")
            .with_skill(AgentSkill::new("echo", "Echo"))
    }

    async fn handle_message(&self, task: &mut Task, message: Message) -> Result<(), String> {
        let text = message.text();
        match text.as_str() {
            "explode" => Err("model provider unavailable".to_string()),
            "slowly" => {
                tokio::time::sleep(Duration::from_millis(50)).await;
                task.add_message(Message::agent("Still there?"));
                task.set_status(TaskStatus::InputRequired);
                Ok(())
            }
            "need more" => {
                task.add_message(Message::agent("Which group?"));
                task.set_status(TaskStatus::InputRequired);
                Ok(())
            }
            _ => {
                task.add_message(Message::agent(format!("Echo: {}", text)));
                Ok(())
            }
        }
    }
}

async fn call(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn send_body(text: &str, task_id: Option<&str>) -> Value {
    let mut request = SendMessageRequest::new(Message::user(text));
    request.task_id = task_id.map(str::to_string);
    serde_json::to_value(request).unwrap()
}

#[tokio::test]
async fn serves_agent_card_on_both_paths() {
    let router = A2aServer::new(ScriptedAgent).router();

    for path in ["/.well-known/agent.json", "/.well-known/agent-card.json"] {
        let (status, card) = call(&router, get(path)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(card["agentId"], "scripted");
        assert_eq!(card["skills"][0]["id"], "echo");
    }
}

#[tokio::test]
async fn send_completes_task_and_stores_it() {
    let server = A2aServer::new(ScriptedAgent);
    let router = server.router();

    let (status, body) = call(&router, post("/tasks/send", send_body("hello", None))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["status"], "completed");
    assert_eq!(body["task"]["messages"][1]["parts"][0]["text"], "Echo: hello");

    let task_id = body["task"]["id"].as_str().unwrap().to_string();
    let (status, task) = call(&router, get(&format!("/tasks/{task_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["id"], task_id.as_str());
    assert_eq!(task["messages"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn handler_error_fails_task_with_message() {
    let router = A2aServer::new(ScriptedAgent).router();

    let (status, body) = call(&router, post("/tasks/send", send_body("explode", None))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["status"], "failed");
    assert_eq!(
        body["task"]["messages"][1]["parts"][0]["text"],
        "Error: model provider unavailable"
    );
}

#[tokio::test]
async fn input_required_task_can_be_continued_then_rejected_when_terminal() {
    let router = A2aServer::new(ScriptedAgent).router();

    let (_, body) = call(&router, post("/tasks/send", send_body("need more", None))).await;
    assert_eq!(body["task"]["status"], "input-required");
    let task_id = body["task"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        &router,
        post("/tasks/send", send_body("engineering", Some(&task_id))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["task"]["status"], "completed");
    assert_eq!(body["task"]["messages"].as_array().unwrap().len(), 4);

    let (status, body) = call(
        &router,
        post("/tasks/send", send_body("again", Some(&task_id))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
}

#[tokio::test]
async fn cancel_input_required_task() {
    let router = A2aServer::new(ScriptedAgent).router();

    let (_, body) = call(&router, post("/tasks/send", send_body("need more", None))).await;
    let task_id = body["task"]["id"].as_str().unwrap().to_string();

    let (status, task) = call(
        &router,
        post(
            &format!("/tasks/{task_id}/cancel"),
            json!({"taskId": task_id, "reason": "user gave up"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(task["status"], "cancelled");

    let (status, _) = call(
        &router,
        post(
            &format!("/tasks/{task_id}/cancel"),
            json!({"taskId": task_id}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_task_is_not_found() {
    let router = A2aServer::new(ScriptedAgent).router();

    let (status, body) = call(&router, get("/tasks/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 404);

    let (status, _) = call(
        &router,
        post("/tasks/send", send_body("hi", Some("does-not-exist"))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_message_is_rejected() {
    let router = A2aServer::new(ScriptedAgent).router();

    let (status, body) = call(&router, post("/tasks/send", send_body("   ", None))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("no text"));
}

#[tokio::test]
async fn expired_tasks_are_gone() {
    let server = A2aServer::with_config(
        ScriptedAgent,
        TaskStoreConfig {
            default_ttl_secs: 0,
            cleanup_interval_secs: 1,
        },
    );
    let router = server.router();

    let (_, body) = call(&router, post("/tasks/send", send_body("hello", None))).await;
    let task_id = body["task"]["id"].as_str().unwrap().to_string();

    let (status, _) = call(&router, get(&format!("/tasks/{task_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&router, post("/tasks/send", send_body("hi", Some(&task_id)))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn concurrent_sends_to_one_task_keep_every_message() {
    let router = A2aServer::new(ScriptedAgent).router();

    let (_, body) = call(&router, post("/tasks/send", send_body("need more", None))).await;
    let task_id = body["task"]["id"].as_str().unwrap().to_string();

    let (first, second) = tokio::join!(
        call(&router, post("/tasks/send", send_body("slowly", Some(&task_id)))),
        call(&router, post("/tasks/send", send_body("slowly", Some(&task_id)))),
    );
    assert_eq!(first.0, StatusCode::OK);
    assert_eq!(second.0, StatusCode::OK);

    let (_, task) = call(&router, get(&format!("/tasks/{task_id}"))).await;
    let texts: Vec<&str> = task["messages"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|m| m["parts"][0]["text"].as_str())
        .collect();
    assert_eq!(
        texts,
        vec![
            "need more",
            "Which group?",
            "slowly",
            "Still there?",
            "slowly",
            "Still there?"
        ]
    );
    assert_eq!(task["status"], "input-required");
}
