//! Shared fixtures for integration tests: a mock upstream that answers the
//! bootstrap sequence, and clients wired to it with temp-dir state.

#![allow(dead_code)]

pub mod socket_guard;

use std::path::Path;

use bird_reddit_core::{ClientConfig, NoWait, SessionClient, SessionCredential};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

pub const SECRET: &str = "secret-session-value";
pub const LOID: &str = "loid-123";
pub const CSRF: &str = "csrf-abc";
pub const MODHASH: &str = "mh-1";

/// Mounts the homepage, identity, and popular-listing endpoints.
///
/// The homepage sets `loid`; the identity call sets `csrf_token` and carries
/// the modhash.
pub async fn mount_bootstrap(server: &MockServer) {
    mount_homepage(server).await;
    mount_identity(server).await;
    mount_popular(server).await;
}

pub async fn mount_identity(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/me.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", format!("csrf_token={CSRF}; Path=/; Secure").as_str())
                .set_body_json(me_payload()),
        )
        .mount(server)
        .await;
}

pub async fn mount_homepage(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header(
                    "set-cookie",
                    format!("loid={LOID}; Domain=.reddit.com; Path=/; Max-Age=63072000").as_str(),
                )
                .set_body_string("<html><body>reddit</body></html>"),
        )
        .mount(server)
        .await;
}

pub async fn mount_popular(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/r/popular/hot.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(listing(&[])))
        .mount(server)
        .await;
}

pub fn me_payload() -> Value {
    json!({
        "kind": "t2",
        "data": {
            "id": "u1",
            "name": "ferris",
            "modhash": MODHASH,
            "comment_karma": 120,
            "link_karma": 45,
            "created_utc": 1_600_000_000.0
        }
    })
}

pub fn listing(children: &[Value]) -> Value {
    json!({"kind": "Listing", "data": {"after": null, "before": null, "children": children}})
}

pub fn post_thing(id: &str, title: &str) -> Value {
    json!({
        "kind": "t3",
        "data": {
            "id": id,
            "name": format!("t3_{id}"),
            "subreddit": "rust",
            "title": title,
            "author": "ferris",
            "score": 42,
            "upvote_ratio": 0.97,
            "num_comments": 3,
            "created_utc": 1_700_000_000.0,
            "permalink": format!("/r/rust/comments/{id}/slug/"),
            "selftext": "",
            "url": "https://blog.example/post",
            "is_self": false,
            "link_flair_text": null
        }
    })
}

pub fn comment_thing(id: &str, body: &str) -> Value {
    json!({
        "kind": "t1",
        "data": {
            "id": id,
            "name": format!("t1_{id}"),
            "author": "crab",
            "score": 5,
            "created_utc": 1_700_000_100.0,
            "body": body,
            "parent_id": "t3_abc",
            "is_submitter": false
        }
    })
}

/// Client against `server` with state under `state_dir` and no real sleeps.
pub fn client_for(server: &MockServer, state_dir: &Path, waiter: NoWait) -> SessionClient {
    client_with(server, state_dir, waiter, false)
}

pub fn client_with(
    server: &MockServer,
    state_dir: &Path,
    waiter: NoWait,
    no_jitter: bool,
) -> SessionClient {
    let config = ClientConfig::default()
        .with_base_url(&server.uri())
        .unwrap()
        .with_state_dir(state_dir)
        .with_no_jitter(no_jitter);
    SessionClient::builder(SessionCredential::new(SECRET))
        .config(config)
        .waiter(waiter)
        .build()
        .unwrap()
}

/// Requests received for `request_path`, in arrival order.
pub async fn requests_to(server: &MockServer, request_path: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|request| request.url.path() == request_path)
        .collect()
}

pub fn header_value(request: &Request, name: &str) -> Option<String> {
    request
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub fn body_text(request: &Request) -> String {
    String::from_utf8_lossy(&request.body).into_owned()
}
