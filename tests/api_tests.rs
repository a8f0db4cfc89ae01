// tests/api_tests.rs

use serde_json::{Value, json};
use voteboard::{config::Config, repository::Repositories, routes, state::AppState};

fn test_config() -> Config {
    Config {
        database_url: None,
        session_secret: "test_secret_for_integration_tests".to_string(),
        session_ttl: 600,
        cookie_secure: false,
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        rust_log: "error".to_string(),
        log_dir: "logs".to_string(),
        cors_origins: vec!["http://localhost:3000".to_string()],
    }
}

/// Spawns the app on a random port with a fresh in-memory store.
/// Returns the base URL (e.g., "http://127.0.0.1:12345/v1/api").
async fn spawn_app() -> String {
    spawn_app_with(test_config()).await
}

async fn spawn_app_with(config: Config) -> String {
    let state = AppState::new(Repositories::in_memory(), config);
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://127.0.0.1:{}/v1/api", port)
}

/// A client that keeps the session cookie between requests.
fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .build()
        .unwrap()
}

async fn register(client: &reqwest::Client, address: &str, name: &str) -> reqwest::Response {
    client
        .post(format!("{}/users", address))
        .json(&json!({
            "username": name,
            "email": format!("{}@example.com", name),
            "password": "password123"
        }))
        .send()
        .await
        .expect("Register failed")
}

/// Registers `name` and logs the client in as that user. Returns the user id.
async fn sign_up(client: &reqwest::Client, address: &str, name: &str) -> i64 {
    assert_eq!(register(client, address, name).await.status().as_u16(), 201);

    let login: Value = client
        .post(format!("{}/users/login", address))
        .json(&json!({
            "email": format!("{}@example.com", name),
            "password": "password123"
        }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .unwrap();
    assert_eq!(login["code"], 200);
    login["data"]["id"].as_i64().expect("user id in login response")
}

async fn create_post(client: &reqwest::Client, address: &str, title: &str) -> i64 {
    let body: Value = client
        .post(format!("{}/posts", address))
        .json(&json!({ "title": title, "body": "Some body" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["code"], 201);
    body["data"]["post_id"].as_i64().unwrap()
}

async fn votes(client: &reqwest::Client, url: &str) -> i64 {
    let body: Value = client.get(url).send().await.unwrap().json().await.unwrap();
    assert_eq!(body["code"], 200);
    body["data"]["votes"].as_i64().unwrap()
}

#[tokio::test]
async fn unknown_route_is_json_404() {
    let address = spawn_app().await;

    let response = client()
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 404);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], 404);
}

#[tokio::test]
async fn wildcard_cors_origin_is_skipped() {
    let mut config = test_config();
    config.cors_origins = vec!["*".to_string(), "http://localhost:3000".to_string()];
    let address = spawn_app_with(config).await;

    let response = client()
        .post(format!("{}/users/logout", address))
        .header("origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3000"
    );
}

#[tokio::test]
async fn register_returns_user_without_hash() {
    let address = spawn_app().await;

    let response = register(&client(), &address, "alice").await;

    assert_eq!(response.status().as_u16(), 201);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["username"], "alice");
    assert_eq!(body["data"]["email"], "alice@example.com");
    assert!(body["data"].get("hash").is_none());
}

#[tokio::test]
async fn duplicate_registration_conflicts() {
    let address = spawn_app().await;
    let client = client();

    register(&client, &address, "alice").await;
    let response = register(&client, &address, "alice").await;

    assert_eq!(response.status().as_u16(), 409);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "User already exists");
}

#[tokio::test]
async fn register_fails_validation() {
    let address = spawn_app().await;

    let response = client()
        .post(format!("{}/users", address))
        .json(&json!({
            "username": "yo",
            "email": "not-an-email",
            "password": "password123"
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Validation Error");
    assert!(body["data"]["username"].is_array());
    assert!(body["data"]["email"].is_array());
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let address = spawn_app().await;

    let response = client()
        .post(format!("{}/users", address))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid JSON");
}

#[tokio::test]
async fn login_failures() {
    let address = spawn_app().await;
    let client = client();
    register(&client, &address, "alice").await;

    let wrong_password = client
        .post(format!("{}/users/login", address))
        .json(&json!({ "email": "alice@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong_password.status().as_u16(), 401);

    let unknown = client
        .post(format!("{}/users/login", address))
        .json(&json!({ "email": "nobody@example.com", "password": "password123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status().as_u16(), 404);
}

#[tokio::test]
async fn protected_routes_need_a_session() {
    let address = spawn_app().await;
    let client = client();

    let anonymous = client
        .post(format!("{}/posts", address))
        .json(&json!({ "title": "t", "body": "b" }))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status().as_u16(), 401);

    sign_up(&client, &address, "alice").await;
    let post_id = create_post(&client, &address, "Hello").await;

    let logout = client
        .post(format!("{}/users/logout", address))
        .send()
        .await
        .unwrap();
    assert_eq!(logout.status().as_u16(), 200);

    let after_logout = client
        .get(format!("{}/posts/{}", address, post_id))
        .send()
        .await
        .unwrap();
    assert_eq!(after_logout.status().as_u16(), 401);
}

#[tokio::test]
async fn forged_session_cookie_is_rejected() {
    let address = spawn_app().await;

    let response = reqwest::Client::new()
        .get(format!("{}/posts/1", address))
        .header("cookie", "session=not.a.token")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn bad_id_param_is_rejected() {
    let address = spawn_app().await;
    let client = client();
    sign_up(&client, &address, "alice").await;

    let response = client
        .get(format!("{}/posts/abc", address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Invalid ID param");
}

#[tokio::test]
async fn post_vote_lifecycle() {
    let address = spawn_app().await;
    let alice = client();
    let bob = client();
    sign_up(&alice, &address, "alice").await;
    sign_up(&bob, &address, "bob").await;

    let post_id = create_post(&alice, &address, "Hello <b>world</b>").await;
    let post_url = format!("{}/posts/{}", address, post_id);
    let vote_url = format!("{}/vote", post_url);

    let post: Value = bob.get(&post_url).send().await.unwrap().json().await.unwrap();
    assert_eq!(post["data"]["title"], "Hello world");
    assert_eq!(votes(&bob, &vote_url).await, 0);

    for client in [&alice, &bob] {
        let response = client
            .post(&vote_url)
            .json(&json!({ "delta": 1 }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }
    assert_eq!(votes(&alice, &vote_url).await, 2);

    // Re-voting overwrites instead of adding.
    bob.post(&vote_url)
        .json(&json!({ "delta": -1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(votes(&alice, &vote_url).await, 0);

    alice.delete(&vote_url).send().await.unwrap();
    assert_eq!(votes(&alice, &vote_url).await, -1);

    let invalid = bob
        .post(&vote_url)
        .json(&json!({ "delta": 0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(invalid.status().as_u16(), 400);

    let deleted = alice.delete(&post_url).send().await.unwrap();
    assert_eq!(deleted.status().as_u16(), 200);

    let gone = alice.get(&post_url).send().await.unwrap();
    assert_eq!(gone.status().as_u16(), 404);

    let vote_on_deleted = bob
        .post(&vote_url)
        .json(&json!({ "delta": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(vote_on_deleted.status().as_u16(), 404);
}

#[tokio::test]
async fn only_the_author_edits_a_post() {
    let address = spawn_app().await;
    let alice = client();
    let bob = client();
    sign_up(&alice, &address, "alice").await;
    sign_up(&bob, &address, "bob").await;

    let post_id = create_post(&alice, &address, "Original").await;
    let post_url = format!("{}/posts/{}", address, post_id);

    let by_bob = bob
        .put(&post_url)
        .json(&json!({ "title": "Hijacked", "body": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(by_bob.status().as_u16(), 401);

    let delete_by_bob = bob.delete(&post_url).send().await.unwrap();
    assert_eq!(delete_by_bob.status().as_u16(), 401);

    let by_alice = alice
        .put(&post_url)
        .json(&json!({ "title": "Edited", "body": "New body" }))
        .send()
        .await
        .unwrap();
    assert_eq!(by_alice.status().as_u16(), 200);

    let post: Value = bob.get(&post_url).send().await.unwrap().json().await.unwrap();
    assert_eq!(post["data"]["title"], "Edited");
    assert_eq!(post["data"]["body"], "New body");

    let missing = alice
        .put(format!("{}/posts/9999", address))
        .json(&json!({ "title": "x", "body": "y" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
async fn comment_threads() {
    let address = spawn_app().await;
    let alice = client();
    let bob = client();
    sign_up(&alice, &address, "alice").await;
    let bob_id = sign_up(&bob, &address, "bob").await;

    let post_id = create_post(&alice, &address, "Thread").await;
    let comments_url = format!("{}/posts/{}/comments", address, post_id);

    let top: Value = bob
        .post(&comments_url)
        .json(&json!({ "body": "first" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(top["code"], 201);
    let top_id = top["data"]["comment_id"].as_i64().unwrap();

    let reply: Value = alice
        .post(&comments_url)
        .json(&json!({ "body": "reply", "parent_id": top_id }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let reply_id = reply["data"]["comment_id"].as_i64().unwrap();

    let orphan = alice
        .post(&comments_url)
        .json(&json!({ "body": "orphan", "parent_id": 9999 }))
        .send()
        .await
        .unwrap();
    assert_eq!(orphan.status().as_u16(), 404);

    let list: Value = alice.get(&comments_url).send().await.unwrap().json().await.unwrap();
    let list = list["data"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["depth"], 0);
    assert_eq!(list[0]["author_id"], bob_id);
    assert_eq!(list[1]["depth"], 1);
    assert_eq!(list[1]["parent_id"], top_id);

    let comment_url = format!("{}/comments/{}", address, top_id);
    let edit_by_alice = alice
        .put(&comment_url)
        .json(&json!({ "body": "not mine" }))
        .send()
        .await
        .unwrap();
    assert_eq!(edit_by_alice.status().as_u16(), 401);

    let edit_by_bob = bob
        .put(&comment_url)
        .json(&json!({ "body": "first, <i>edited</i>" }))
        .send()
        .await
        .unwrap();
    assert_eq!(edit_by_bob.status().as_u16(), 200);

    let comment: Value = alice.get(&comment_url).send().await.unwrap().json().await.unwrap();
    assert_eq!(comment["data"]["body"], "first, edited");

    let vote_url = format!("{}/comments/{}/vote", address, reply_id);
    bob.post(&vote_url)
        .json(&json!({ "delta": -1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(votes(&alice, &vote_url).await, -1);
    bob.delete(&vote_url).send().await.unwrap();
    assert_eq!(votes(&alice, &vote_url).await, 0);

    let deleted = alice
        .delete(format!("{}/comments/{}", address, reply_id))
        .send()
        .await
        .unwrap();
    assert_eq!(deleted.status().as_u16(), 200);

    let list: Value = bob.get(&comments_url).send().await.unwrap().json().await.unwrap();
    assert_eq!(list["data"].as_array().unwrap().len(), 1);

    alice.delete(format!("{}/posts/{}", address, post_id)).send().await.unwrap();
    let on_deleted_post = bob.get(&comments_url).send().await.unwrap();
    assert_eq!(on_deleted_post.status().as_u16(), 404);
}
