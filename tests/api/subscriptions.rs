use serde_json::{json, Value};

use crate::helpers::TestApp;
use email_capture::routes::MAX_BODY_BYTES;

#[tokio::test]
async fn subscribe_returns_200_for_a_new_email() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app
        .post_subscription(json!({ "email": "new@example.com" }).to_string())
        .await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Body is not JSON.");
    assert_eq!(body, json!({ "success": true }));
}

#[tokio::test]
async fn subscribe_persists_the_new_subscriber() {
    let test_app = TestApp::spawn_app().await;

    test_app
        .post_subscription(json!({ "email": "New@Example.com" }).to_string())
        .await;

    let subscribers = test_app.subscribers().await;

    assert_eq!(subscribers.len(), 1);
    assert_eq!(subscribers[0].email, "new@example.com");
    assert_eq!(subscribers[0].source, "blog");
}

#[tokio::test]
async fn subscribe_twice_reports_already_subscribed() {
    let test_app = TestApp::spawn_app().await;
    let body = json!({ "email": "new@example.com" }).to_string();

    test_app.post_subscription(body.clone()).await;
    let response = test_app.post_subscription(body).await;

    assert_eq!(200, response.status().as_u16());
    let body: Value = response.json().await.expect("Body is not JSON.");
    assert_eq!(
        body,
        json!({ "success": true, "message": "Already subscribed" })
    );
    assert_eq!(test_app.subscribers().await.len(), 1);
}

#[tokio::test]
async fn subscribe_treats_case_variants_as_the_same_subscriber() {
    let test_app = TestApp::spawn_app().await;

    test_app
        .post_subscription(json!({ "email": "foo@bar.com" }).to_string())
        .await;
    let response = test_app
        .post_subscription(json!({ "email": "Foo@Bar.COM" }).to_string())
        .await;

    let body: Value = response.json().await.expect("Body is not JSON.");
    assert_eq!(body["message"], "Already subscribed");
    assert_eq!(test_app.subscribers().await.len(), 1);
}

#[tokio::test]
async fn subscribe_returns_400_when_body_is_present_but_not_valid() {
    let test_app = TestApp::spawn_app().await;

    // This is a common practice and it is called table-driven tests. In this case, it simulates different kind of possible request bodies
    // where API should return 400.
    let test_cases = vec![
        (json!({ "email": "not-an-email" }).to_string(), "no @ and no dot"),
        (json!({ "email": "frank@localhost" }).to_string(), "no dot"),
        (json!({ "email": "frank.test.com" }).to_string(), "no @"),
        (json!({ "email": "" }).to_string(), "empty email"),
        (json!({ "email": 42 }).to_string(), "email is not a string"),
        (json!({ "email": null }).to_string(), "email is null"),
        (json!({ "name": "Frank" }).to_string(), "missing email"),
        (json!([]).to_string(), "body is not an object"),
        (json!(["frank@test.com"]).to_string(), "email inside an array"),
        (json!("frank@test.com").to_string(), "bare string body"),
        (String::from("{\"email\":"), "truncated JSON"),
        (String::from("email=frank@test.com"), "form encoded body"),
        (String::new(), "empty body"),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = test_app.post_subscription(invalid_body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload was {}",
            error_message
        );
        let body: Value = response.json().await.expect("Body is not JSON.");
        assert_eq!(body, json!({ "error": "Invalid email" }));
    }

    assert!(test_app.subscribers().await.is_empty());
}

#[tokio::test]
async fn subscribe_accepts_a_large_body_under_the_limit() {
    let test_app = TestApp::spawn_app().await;
    let padding = "x".repeat(300 * 1024);

    let response = test_app
        .post_subscription(json!({ "email": "big@example.com", "pad": padding }).to_string())
        .await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(test_app.subscribers().await.len(), 1);
}

#[tokio::test]
async fn subscribe_returns_400_json_when_body_is_too_large() {
    let test_app = TestApp::spawn_app().await;
    let padding = "x".repeat(MAX_BODY_BYTES);

    let response = test_app
        .post_subscription(json!({ "email": "big@example.com", "pad": padding }).to_string())
        .await;

    assert_eq!(400, response.status().as_u16());
    let body: Value = response.json().await.expect("Body is not JSON.");
    assert_eq!(body, json!({ "error": "Invalid email" }));
    assert!(test_app.subscribers().await.is_empty());
}

#[tokio::test]
async fn subscribe_returns_500_when_the_store_is_corrupted() {
    let test_app = TestApp::spawn_app().await;
    std::fs::write(test_app.store_path(), "{ this is not a subscriber list")
        .expect("Failed to corrupt the store.");

    let response = test_app
        .post_subscription(json!({ "email": "new@example.com" }).to_string())
        .await;

    assert_eq!(500, response.status().as_u16());
    let body: Value = response.json().await.expect("Body is not JSON.");
    assert_eq!(body, json!({ "error": "Server error" }));
}

#[tokio::test]
async fn subscribe_returns_500_when_the_store_is_gone() {
    let test_app = TestApp::spawn_app().await;
    std::fs::remove_file(test_app.store_path()).expect("Failed to remove the store.");

    let response = test_app
        .post_subscription(json!({ "email": "new@example.com" }).to_string())
        .await;

    assert_eq!(500, response.status().as_u16());
}

#[tokio::test]
async fn concurrent_subscriptions_are_all_persisted() {
    let test_app = TestApp::spawn_app().await;
    let client = reqwest::Client::new();

    // Spawned so the server sees overlapping requests rather than a sequence
    let handles: Vec<_> = (0..25)
        .map(|i| {
            let request = client
                .post(format!("{}/subscribe", test_app.address))
                .json(&json!({ "email": format!("user{}@example.com", i) }));
            tokio::spawn(request.send())
        })
        .collect();

    for handle in handles {
        let response = handle
            .await
            .expect("Request task panicked.")
            .expect("Failed to execute request.");
        assert_eq!(200, response.status().as_u16());
    }
    assert_eq!(test_app.subscribers().await.len(), 25);
}
