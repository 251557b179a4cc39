//! API integration tests
//!
//! These run against a live server with the seeded service catalog and an
//! `admin`/`admin` superadmin account.

use reqwest::Client;
use serde_json::{json, Value};

const BASE_URL: &str = "http://localhost:8080/api/v1";

/// Helper to get an authenticated token
async fn get_auth_token(client: &Client) -> String {
    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send login request");

    let body: Value = response.json().await.expect("Failed to parse login response");
    body["token"].as_str().expect("No token in response").to_string()
}

/// Helper to ensure a non-superadmin admin account exists, returning its
/// token. Creation is idempotent across test runs (409 means it already
/// exists with the same password).
async fn ensure_admin_token(client: &Client, superadmin_token: &str, username: &str) -> String {
    let response = client
        .post(format!("{}/users", BASE_URL))
        .header("Authorization", format!("Bearer {}", superadmin_token))
        .json(&json!({
            "username": username,
            "password": "rahasia123",
            "name": format!("Petugas {}", username),
            "role": "ADMIN"
        }))
        .send()
        .await
        .expect("Failed to send create user request");
    assert!(
        response.status() == 201 || response.status() == 409,
        "unexpected create user status: {}",
        response.status()
    );

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({ "username": username, "password": "rahasia123" }))
        .send()
        .await
        .expect("Failed to send admin login request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse admin login");
    body["token"].as_str().expect("No token").to_string()
}

/// Helper to create a guest queue entry, returning the response body
async fn submit_guest(client: &Client, token: &str, name: &str, purpose: &str) -> Value {
    let response = client
        .post(format!("{}/queues/guest", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({
            "name": name,
            "phone": "081234567890",
            "purpose": purpose
        }))
        .send()
        .await
        .expect("Failed to send submission");

    assert_eq!(response.status(), 201);
    response.json().await.expect("Failed to parse submission response")
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
#[ignore]
async fn test_login() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "admin"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["token"].is_string());
    assert_eq!(body["user"]["username"], "admin");
}

#[tokio::test]
#[ignore]
async fn test_login_invalid_credentials() {
    let client = Client::new();

    let response = client
        .post(format!("{}/auth/login", BASE_URL))
        .json(&json!({
            "username": "admin",
            "password": "wrong"
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_guest_submission_assigns_number_and_tracking_link() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let body = submit_guest(&client, &token, "Budi Santoso", "PERPUSTAKAAN").await;

    assert!(body["queue_number"].as_i64().unwrap() >= 1);
    assert_eq!(body["service_name"], "Perpustakaan");
    assert_eq!(body["tracking_link"].as_str().unwrap().len(), 10);
}

#[tokio::test]
#[ignore]
async fn test_lainnya_purpose_falls_back_to_consultation() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let body = submit_guest(&client, &token, "Siti Aminah", "LAINNYA").await;

    assert_eq!(body["service_name"], "Konsultasi Statistik");
}

#[tokio::test]
#[ignore]
async fn test_concurrent_submissions_get_distinct_numbers() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let mut handles = Vec::new();
    for i in 0..10 {
        let client = client.clone();
        let token = token.clone();
        handles.push(tokio::spawn(async move {
            submit_guest(&client, &token, &format!("Pengunjung {}", i), "PERPUSTAKAAN").await
        }));
    }

    let mut numbers = Vec::new();
    for handle in handles {
        let body = handle.await.expect("Submission task panicked");
        numbers.push(body["queue_number"].as_i64().unwrap());
    }

    numbers.sort_unstable();
    numbers.dedup();
    assert_eq!(numbers.len(), 10, "queue numbers must be unique for the day");
}

#[tokio::test]
#[ignore]
async fn test_serve_then_complete_lifecycle() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let body = submit_guest(&client, &token, "Andi Wijaya", "KONSULTASI_STATISTIK").await;
    let queue_id = body["queue_id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/queues/{}/serve", BASE_URL, queue_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send serve request");
    assert!(response.status().is_success());

    let served: Value = response.json().await.expect("Failed to parse serve response");
    assert_eq!(served["status"], "SERVING");
    assert!(served["start_time"].is_string());

    let response = client
        .post(format!("{}/queues/{}/complete", BASE_URL, queue_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send complete request");
    assert!(response.status().is_success());

    let completed: Value = response.json().await.expect("Failed to parse complete response");
    assert_eq!(completed["status"], "COMPLETED");
    assert!(completed["end_time"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_completing_a_waiting_queue_is_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let body = submit_guest(&client, &token, "Dewi Lestari", "PERPUSTAKAAN").await;
    let queue_id = body["queue_id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/queues/{}/complete", BASE_URL, queue_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send complete request");

    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_serving_twice_is_rejected() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let body = submit_guest(&client, &token, "Rina Hartati", "PERPUSTAKAAN").await;
    let queue_id = body["queue_id"].as_i64().unwrap();

    for expected in [200, 409] {
        let response = client
            .post(format!("{}/queues/{}/serve", BASE_URL, queue_id))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to send serve request");
        assert_eq!(response.status(), expected);
    }
}

#[tokio::test]
#[ignore]
async fn test_other_admin_cannot_complete_foreign_queue() {
    let client = Client::new();
    let superadmin = get_auth_token(&client).await;
    let admin_a = ensure_admin_token(&client, &superadmin, "petugas_a").await;
    let admin_b = ensure_admin_token(&client, &superadmin, "petugas_b").await;

    let body = submit_guest(&client, &superadmin, "Tamu Berebut", "PERPUSTAKAAN").await;
    let queue_id = body["queue_id"].as_i64().unwrap();

    // Admin A starts the service
    let response = client
        .post(format!("{}/queues/{}/serve", BASE_URL, queue_id))
        .header("Authorization", format!("Bearer {}", admin_a))
        .send()
        .await
        .expect("Failed to send serve request");
    assert!(response.status().is_success());

    // Admin B may not close it
    let response = client
        .post(format!("{}/queues/{}/complete", BASE_URL, queue_id))
        .header("Authorization", format!("Bearer {}", admin_b))
        .send()
        .await
        .expect("Failed to send complete request");
    assert_eq!(response.status(), 403);

    // The rejected attempt must not have touched the queue
    let queue: Value = client
        .get(format!("{}/queues/{}", BASE_URL, queue_id))
        .header("Authorization", format!("Bearer {}", superadmin))
        .send()
        .await
        .expect("Failed to fetch queue")
        .json()
        .await
        .expect("Failed to parse queue");
    assert_eq!(queue["status"], "SERVING");
    assert!(queue["end_time"].is_null());

    // The superadmin may close any serving queue
    let response = client
        .post(format!("{}/queues/{}/complete", BASE_URL, queue_id))
        .header("Authorization", format!("Bearer {}", superadmin))
        .send()
        .await
        .expect("Failed to send complete request");
    assert!(response.status().is_success());
}

#[tokio::test]
#[ignore]
async fn test_other_admin_cannot_cancel_foreign_serving_queue() {
    let client = Client::new();
    let superadmin = get_auth_token(&client).await;
    let admin_a = ensure_admin_token(&client, &superadmin, "petugas_a").await;
    let admin_b = ensure_admin_token(&client, &superadmin, "petugas_b").await;

    let body = submit_guest(&client, &superadmin, "Tamu Dibatalkan", "PERPUSTAKAAN").await;
    let queue_id = body["queue_id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/queues/{}/serve", BASE_URL, queue_id))
        .header("Authorization", format!("Bearer {}", admin_a))
        .send()
        .await
        .expect("Failed to send serve request");
    assert!(response.status().is_success());

    // Canceling a queue someone else is serving needs ownership
    let response = client
        .post(format!("{}/queues/{}/cancel", BASE_URL, queue_id))
        .header("Authorization", format!("Bearer {}", admin_b))
        .send()
        .await
        .expect("Failed to send cancel request");
    assert_eq!(response.status(), 403);

    // The assigned admin may cancel their own serving queue
    let response = client
        .post(format!("{}/queues/{}/cancel", BASE_URL, queue_id))
        .header("Authorization", format!("Bearer {}", admin_a))
        .send()
        .await
        .expect("Failed to send cancel request");
    assert!(response.status().is_success());

    let canceled: Value = response.json().await.expect("Failed to parse cancel response");
    assert_eq!(canceled["status"], "CANCELED");
}

#[tokio::test]
#[ignore]
async fn test_cancel_from_waiting() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let body = submit_guest(&client, &token, "Joko Susilo", "PST_ONLINE").await;
    let queue_id = body["queue_id"].as_i64().unwrap();

    let response = client
        .post(format!("{}/queues/{}/cancel", BASE_URL, queue_id))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send cancel request");
    assert!(response.status().is_success());

    let canceled: Value = response.json().await.expect("Failed to parse cancel response");
    assert_eq!(canceled["status"], "CANCELED");
}

#[tokio::test]
#[ignore]
async fn test_public_tracking_by_code() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let body = submit_guest(&client, &token, "Lukman Hakim", "PERPUSTAKAAN").await;
    let code = body["tracking_link"].as_str().unwrap();

    // No auth header on the tracking endpoint
    let response = client
        .get(format!("{}/track/{}", BASE_URL, code))
        .send()
        .await
        .expect("Failed to send track request");
    assert!(response.status().is_success());

    let tracked: Value = response.json().await.expect("Failed to parse track response");
    assert_eq!(tracked["queue_number"], body["queue_number"]);
    assert_eq!(tracked["status"], "WAITING");
    assert_eq!(tracked["filled_skd"], false);

    let response = client
        .post(format!("{}/track/{}/skd", BASE_URL, code))
        .send()
        .await
        .expect("Failed to send skd request");
    assert_eq!(response.status(), 204);
}

#[tokio::test]
#[ignore]
async fn test_unknown_tracking_code_is_404() {
    let client = Client::new();

    let response = client
        .get(format!("{}/track/doesnotexist", BASE_URL))
        .send()
        .await
        .expect("Failed to send track request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_qr_exchange_and_one_time_link() {
    let client = Client::new();

    // Static uuid from config/default.toml
    let response = client
        .post(format!("{}/qr/exchange", BASE_URL))
        .json(&json!({ "uuid": "00000000-0000-0000-0000-000000000000" }))
        .send()
        .await
        .expect("Failed to send exchange request");
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.expect("Failed to parse exchange response");
    let link_uuid = body["link_uuid"].as_str().expect("No link uuid").to_string();

    // Fresh link validates
    let response = client
        .get(format!("{}/qr/validate/{}", BASE_URL, link_uuid))
        .send()
        .await
        .expect("Failed to send validate request");
    assert!(response.status().is_success());

    // First submission through the link succeeds
    let submission = json!({
        "name": "Pengunjung Online",
        "phone": "081298765432",
        "purpose": "KONSULTASI_STATISTIK"
    });
    let response = client
        .post(format!("{}/queues/visitor/{}", BASE_URL, link_uuid))
        .json(&submission)
        .send()
        .await
        .expect("Failed to send visitor submission");
    assert_eq!(response.status(), 201);

    // Second submission through the same link is refused
    let response = client
        .post(format!("{}/queues/visitor/{}", BASE_URL, link_uuid))
        .json(&submission)
        .send()
        .await
        .expect("Failed to send second visitor submission");
    assert_eq!(response.status(), 409);
}

#[tokio::test]
#[ignore]
async fn test_unknown_static_qr_is_rejected() {
    let client = Client::new();

    let response = client
        .post(format!("{}/qr/exchange", BASE_URL))
        .json(&json!({ "uuid": "11111111-2222-3333-4444-555555555555" }))
        .send()
        .await
        .expect("Failed to send exchange request");

    assert_eq!(response.status(), 404);
}

#[tokio::test]
#[ignore]
async fn test_queue_list_change_detection() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!("{}/queues", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send list request");
    assert!(response.status().is_success());

    let first: Value = response.json().await.expect("Failed to parse list response");
    assert_eq!(first["changed"], true);
    let hash = first["hash"].as_str().expect("No hash").to_string();

    // Same hash back means no payload the second time
    let response = client
        .get(format!("{}/queues?hash={}", BASE_URL, hash))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send second list request");

    let second: Value = response.json().await.expect("Failed to parse second response");
    assert_eq!(second["changed"], false);
    assert!(second.get("data").is_none() || second["data"].is_null());
}

#[tokio::test]
#[ignore]
async fn test_display_board_is_public() {
    let client = Client::new();

    let response = client
        .get(format!("{}/display", BASE_URL))
        .send()
        .await
        .expect("Failed to send display request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse display response");
    assert!(body["hash"].is_string());
}

#[tokio::test]
#[ignore]
async fn test_queue_list_requires_auth() {
    let client = Client::new();

    let response = client
        .get(format!("{}/queues", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), 401);
}

#[tokio::test]
#[ignore]
async fn test_stats_summary() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    submit_guest(&client, &token, "Statistik Harian", "PERPUSTAKAAN").await;

    let response = client
        .get(format!("{}/stats/summary", BASE_URL))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send stats request");
    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse stats response");
    assert!(body["total"].as_i64().unwrap() >= 1);
    assert!(body["waiting"].as_i64().unwrap() >= 1);
}

#[tokio::test]
#[ignore]
async fn test_csv_export() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!(
            "{}/export/queues?from=2020-01-01&to=2030-12-31&format=csv",
            BASE_URL
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send export request");
    assert!(response.status().is_success());
    assert!(response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("text/csv"))
        .unwrap_or(false));

    let body = response.text().await.expect("Failed to read export body");
    assert!(body.starts_with("queue_number,queue_date,status"));
}

#[tokio::test]
#[ignore]
async fn test_inverted_export_range_is_400() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    let response = client
        .get(format!(
            "{}/export/queues?from=2030-01-01&to=2020-01-01",
            BASE_URL
        ))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send export request");

    assert_eq!(response.status(), 400);
}

#[tokio::test]
#[ignore]
async fn test_service_delete_refused_while_referenced() {
    let client = Client::new();
    let token = get_auth_token(&client).await;

    // Ensure the Perpustakaan service has at least one queue entry
    submit_guest(&client, &token, "Pembaca Setia", "PERPUSTAKAAN").await;

    let services: Value = client
        .get(format!("{}/services", BASE_URL))
        .send()
        .await
        .expect("Failed to list services")
        .json()
        .await
        .expect("Failed to parse services");
    let perpustakaan = services
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["name"] == "Perpustakaan")
        .expect("Seeded service missing");

    let response = client
        .delete(format!("{}/services/{}", BASE_URL, perpustakaan["id"]))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .expect("Failed to send delete request");

    assert_eq!(response.status(), 409);
}
