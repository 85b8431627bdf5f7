//! End-to-end account flow against a mock platform server.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use task_harvester::account::process_account;
use task_harvester::cycle::{run_cycle, RunConfig};
use task_harvester::http::TokioSleeper;

// Well-known throwaway development keys.
const KEY_ONE: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const ADDRESS_ONE: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
const KEY_TWO: &str = "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";

fn test_config(server: &MockServer) -> RunConfig {
    RunConfig {
        api_base: server.uri(),
        ip_lookup_url: format!("{}/ip", server.uri()),
        http_timeout: Duration::from_secs(60),
        retries: 3,
        initial_backoff: Duration::ZERO,
        task_delay: Duration::ZERO,
        account_delay: Duration::ZERO,
        cycle_interval: Duration::from_secs(86_400),
        use_proxy: false,
    }
}

async fn mount_csrf(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/sanctum/csrf-cookie"))
        .respond_with(
            ResponseTemplate::new(204)
                .append_header("set-cookie", "XSRF-TOKEN=csrf%2Dtok; Path=/")
                .append_header("set-cookie", "harvester_session=abc123; Path=/; HttpOnly"),
        )
        .mount(server)
        .await;
}

async fn mount_login_success(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(header("x-xsrf-token", "csrf-tok"))
        .respond_with(
            ResponseTemplate::new(200)
                .append_header("set-cookie", "XSRF-TOKEN=csrf%2Dtok; Path=/")
                .append_header("set-cookie", "harvester_session=rotated; Path=/; HttpOnly")
                .set_body_json(json!({
                    "code": 0,
                    "message": "ok",
                    "data": { "access_token": "jwt-token-1" }
                })),
        )
        .mount(server)
        .await;
}

async fn mount_task_endpoints(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/task/user-visit"))
        .and(header("authorization", "Bearer jwt-token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "ok",
            "data": {
                "DAILY": {
                    "task_code": "DAILY",
                    "title": "Daily check-in",
                    "reward_point": 10,
                    "status": 1
                },
                "DONE_ALREADY": {
                    "task_code": "DONE_ALREADY",
                    "title": "Visit partner page",
                    "reward_point": 5,
                    "status": 2
                }
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/task/advance-visit"))
        .and(header("authorization", "Bearer jwt-token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "ok",
            "data": {}
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/task/user-visit/done"))
        .and(body_partial_json(json!({ "task_code": "DAILY" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "success"
        })))
        .mount(server)
        .await;
}

async fn mount_user_info(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/user"))
        .and(header("authorization", "Bearer jwt-token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 0,
            "message": "ok",
            "data": { "address": ADDRESS_ONE, "point": 42 }
        })))
        .mount(server)
        .await;
}

async fn mount_ip(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/ip"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "ip": "203.0.113.7" })),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_single_account_full_flow() {
    let server = MockServer::start().await;
    mount_csrf(&server).await;
    mount_login_success(&server).await;
    mount_task_endpoints(&server).await;
    mount_user_info(&server).await;
    mount_ip(&server).await;

    let cfg = test_config(&server);
    let summary = process_account(&cfg, 0, 1, KEY_ONE, None, &TokioSleeper).await;

    assert_eq!(summary.address.as_deref(), Some(ADDRESS_ONE));
    assert_eq!(summary.tasks_total, 1);
    assert_eq!(summary.tasks_completed, 1);
    assert_eq!(summary.points, Some(42));
}

#[tokio::test]
async fn test_login_rejection_skips_account() {
    let server = MockServer::start().await;
    mount_csrf(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "code": 1,
            "message": "Invalid signature",
            "data": null
        })))
        .mount(&server)
        .await;

    let cfg = test_config(&server);
    let summary = process_account(&cfg, 0, 1, KEY_ONE, None, &TokioSleeper).await;

    assert!(summary.address.is_none());
    assert_eq!(summary.tasks_total, 0);
    assert_eq!(summary.tasks_completed, 0);
    assert!(summary.points.is_none());
}

#[tokio::test]
async fn test_missing_csrf_cookie_skips_account() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sanctum/csrf-cookie"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let cfg = test_config(&server);
    let summary = process_account(&cfg, 0, 1, KEY_ONE, None, &TokioSleeper).await;

    assert!(summary.address.is_none());
    assert_eq!(summary.tasks_total, 0);
}

#[tokio::test]
async fn test_cycle_processes_every_account() {
    let server = MockServer::start().await;
    mount_csrf(&server).await;
    mount_login_success(&server).await;
    mount_task_endpoints(&server).await;
    mount_user_info(&server).await;
    mount_ip(&server).await;

    let cfg = test_config(&server);
    let keys = vec![KEY_ONE.to_string(), KEY_TWO.to_string()];
    let summaries = run_cycle(&cfg, &keys, &[], &TokioSleeper).await;

    assert_eq!(summaries.len(), 2);
    // Both accounts log in against the same permissive mock and complete the
    // single available task.
    assert!(summaries.iter().all(|s| s.tasks_completed == 1));
    assert_eq!(summaries[0].index, 0);
    assert_eq!(summaries[1].index, 1);
}
