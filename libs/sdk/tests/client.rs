//! Controller client tests against a mock HTTP server.

use photon_api::{task_states, TenantCreateSpec};
use photon_sdk::{ApiClientError, Client};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, token: Option<&str>) -> Client {
    Client::new(&server.uri(), token).unwrap()
}

#[tokio::test]
async fn get_task_decodes_task() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks/t-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "t-1",
            "operation": "CREATE_DISK",
            "state": "STARTED",
            "entity": { "id": "disk-9", "kind": "persistent-disk" },
            "steps": [
                { "sequence": 0, "operation": "RESERVE_RESOURCE", "state": "COMPLETED" },
                { "sequence": 1, "operation": "CREATE_DISK", "state": "STARTED" }
            ],
            "started_time": 1_700_000_000_000i64
        })))
        .mount(&server)
        .await;

    let task = client(&server, None).get_task("t-1").await.unwrap();

    assert_eq!(task.id, "t-1");
    assert_eq!(task.operation, "CREATE_DISK");
    assert_eq!(task.started_step().unwrap().sequence, 1);
    assert_eq!(task.entity.as_ref().unwrap().kind, "persistent-disk");
    assert!(!task.is_terminal());
}

#[tokio::test]
async fn wait_task_uses_blocking_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks/t-2/wait"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "t-2",
            "operation": "DELETE_VM",
            "state": "COMPLETED",
            "entity": { "id": "vm-4", "kind": "vm" }
        })))
        .mount(&server)
        .await;

    let task = client(&server, None).wait_task("t-2").await.unwrap();
    assert!(task.is_completed());
}

#[tokio::test]
async fn bearer_token_is_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tenants"))
        .and(header("authorization", "Bearer secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let tenants = client(&server, Some("secret-token"))
        .list_tenants()
        .await
        .unwrap();
    assert!(tenants.items.is_empty());
}

#[tokio::test]
async fn create_tenant_posts_spec_and_returns_task() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tenants"))
        .and(body_partial_json(json!({ "name": "acme" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": "t-3",
            "operation": "CREATE_TENANT",
            "state": "QUEUED",
            "entity": { "id": "tenant-1", "kind": "tenant" }
        })))
        .mount(&server)
        .await;

    let spec = TenantCreateSpec {
        name: "acme".to_string(),
    };
    let task = client(&server, None).create_tenant(&spec).await.unwrap();

    assert_eq!(task.state, task_states::QUEUED);
    assert_eq!(task.entity.unwrap().id, "tenant-1");
}

#[tokio::test]
async fn structured_error_body_is_decoded() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/disks/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "code": "DiskNotFound",
            "message": "disk 'missing' not found"
        })))
        .mount(&server)
        .await;

    let err = client(&server, None).get_disk("missing").await.unwrap_err();

    match &err {
        ApiClientError::Api { status, errors, task } => {
            assert_eq!(*status, 404);
            assert_eq!(errors[0].code, "DiskNotFound");
            assert!(task.is_none());
        }
        other => panic!("expected Api error, got {other:?}"),
    }
    assert!(err.to_string().contains("disk 'missing' not found"));
}

#[tokio::test]
async fn error_body_may_embed_partial_task() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks/t-9"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": "InternalError",
            "message": "step failed",
            "task": {
                "id": "t-9",
                "state": "ERROR",
                "steps": [{
                    "sequence": 0,
                    "operation": "CREATE_VM",
                    "state": "ERROR",
                    "errors": [{ "code": "QuotaError", "message": "quota exceeded" }]
                }]
            }
        })))
        .mount(&server)
        .await;

    let err = client(&server, None).get_task("t-9").await.unwrap_err();

    let task = err.task().expect("error should carry the partial task");
    assert!(task.is_failed());
    assert_eq!(task.api_errors()[0].message, "quota exceeded");
}

#[tokio::test]
async fn unparseable_error_body_falls_back_to_unknown() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/vms/vm-1"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client(&server, None).delete_vm("vm-1").await.unwrap_err();

    assert_eq!(err.status(), Some(502));
    assert_eq!(err.api_errors()[0].code, "unknown");
}

#[tokio::test]
async fn list_tasks_builds_filter_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks"))
        .and(query_param("entity_id", "vm-7"))
        .and(query_param("entity_kind", "vm"))
        .and(query_param("state", "ERROR"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": "t-7", "state": "ERROR" }]
        })))
        .mount(&server)
        .await;

    let tasks = client(&server, None)
        .list_tasks(Some("vm-7"), Some("vm"), Some("ERROR"))
        .await
        .unwrap();

    assert_eq!(tasks.items.len(), 1);
    assert_eq!(tasks.items[0].id, "t-7");
}
