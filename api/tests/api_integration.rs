//! End-to-end tests over the full router: signup/login, the authorization
//! tiers, counter semantics and the cross-entity consistency rules.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use api::{create_router, AppState, UploadConfig};
use authz::PolicyEngine;
use database::Database;
use notify::{MailConfig, Mailer};
use user::TokenService;

const SECRET: &str = "integration-secret";

async fn test_app() -> (TempDir, Router, AppState) {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("site.db");
    let db = Arc::new(Database::open(db_path.to_str().unwrap()).await.unwrap());

    let state = AppState {
        db,
        tokens: Arc::new(TokenService::new(SECRET, 1)),
        policy: Arc::new(PolicyEngine::new().unwrap()),
        mailer: Arc::new(Mailer::new(MailConfig::default())),
        uploads: Arc::new(UploadConfig::new(dir.path().join("uploads"))),
    };

    let router = create_router(state.clone());
    (dir, router, state)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn bare_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn signup(router: &Router, username: &str) {
    let (status, _) = send(
        router,
        json_request(
            "POST",
            "/signup",
            None,
            json!({
                "username": username,
                "password": "secret",
                "name": "成员",
                "name_en": "Member",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

async fn login(router: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        router,
        json_request(
            "POST",
            "/login",
            None,
            json!({"username": username, "password": password}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

/// Make an existing account an administrator, out of band.
async fn promote_to_admin(state: &AppState, username: &str) {
    sqlx::query("UPDATE users SET admin = 1 WHERE username = ?")
        .bind(username)
        .execute(state.db.pool())
        .await
        .unwrap();
}

#[tokio::test]
async fn signup_login_and_profile_round_trip() {
    let (_dir, router, state) = test_app().await;

    signup(&router, "alice").await;

    // Wrong password and unknown user fail with distinct statuses.
    let (status, _) = send(
        &router,
        json_request(
            "POST",
            "/login",
            None,
            json!({"username": "alice", "password": "wrong"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &router,
        json_request(
            "POST",
            "/login",
            None,
            json!({"username": "nobody", "password": "x"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let before = chrono::Utc::now().timestamp();
    let token = login(&router, "alice", "secret").await;

    // The token decodes to the issued identity with a one-day expiry.
    let claims = state.tokens.validate(&token).unwrap();
    assert_eq!(claims.username, "alice");
    assert!(!claims.admin);
    assert!(claims.expire >= before + 86_400);
    assert!(claims.expire <= chrono::Utc::now().timestamp() + 86_400);

    // Update a profile field and see it echo back.
    let (status, _) = send(
        &router,
        json_request(
            "PUT",
            "/api/profile",
            Some(&token),
            json!({"interests": "operating systems"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, profile) = send(&router, bare_request("GET", "/api/profile", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["interests"], "operating systems");
    // The password never appears in a read.
    assert!(profile.get("password").is_none());
    assert!(profile.get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_signup_is_rejected() {
    let (_dir, router, _state) = test_app().await;
    signup(&router, "alice").await;

    let (status, _) = send(
        &router,
        json_request(
            "POST",
            "/signup",
            None,
            json!({
                "username": "alice",
                "password": "other",
                "name": "重复",
                "name_en": "Duplicate",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signup_cannot_grant_admin() {
    let (_dir, router, _state) = test_app().await;

    let (status, _) = send(
        &router,
        json_request(
            "POST",
            "/signup",
            None,
            json!({
                "username": "sneaky",
                "password": "pw",
                "name": "潜入",
                "name_en": "Sneaky",
                "admin": true,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = login(&router, "sneaky", "pw").await;
    let (status, _) = send(&router, bare_request("GET", "/api/user", Some(&token))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn bad_tokens_are_unauthenticated_not_forbidden() {
    let (_dir, router, _state) = test_app().await;

    let (status, _) = send(&router, bare_request("GET", "/api/profile", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &router,
        bare_request("GET", "/api/profile", Some("not.a.token")),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Valid signature, expired claims: still unauthenticated.
    let expired = TokenService::new(SECRET, 0)
        .issue("ghost", "ghost", false)
        .unwrap();
    // A zero-day lifetime expires within the same second.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    let (status, _) = send(&router, bare_request("GET", "/api/profile", Some(&expired))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn profile_update_cannot_reach_another_account() {
    let (_dir, router, _state) = test_app().await;
    signup(&router, "alice").await;
    signup(&router, "bob").await;

    let alice = login(&router, "alice", "secret").await;
    let bob = login(&router, "bob", "secret").await;

    let (_, bob_profile) = send(&router, bare_request("GET", "/api/profile", Some(&bob))).await;
    let bob_id = bob_profile["id"].as_str().unwrap();

    // Alice smuggles Bob's id into her update; the target stays Alice.
    let (status, _) = send(
        &router,
        json_request(
            "PUT",
            "/api/profile",
            Some(&alice),
            json!({"id": bob_id, "_id": bob_id, "interests": "hijacked"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, bob_after) = send(&router, bare_request("GET", "/api/profile", Some(&bob))).await;
    assert!(bob_after["interests"].is_null());

    let (_, alice_after) = send(&router, bare_request("GET", "/api/profile", Some(&alice))).await;
    assert_eq!(alice_after["interests"], "hijacked");
}

#[tokio::test]
async fn admin_scope_matrix() {
    let (_dir, router, state) = test_app().await;
    signup(&router, "member").await;
    signup(&router, "root").await;
    promote_to_admin(&state, "root").await;

    let member = login(&router, "member", "secret").await;
    let admin = login(&router, "root", "secret").await;

    let admin_calls: Vec<(&str, &str, Option<Value>)> = vec![
        ("GET", "/api/user", None),
        (
            "POST",
            "/api/news",
            Some(json!({
                "title": "新闻", "title_en": "news",
                "content": "正文", "content_en": "body",
            })),
        ),
        (
            "POST",
            "/api/achievement",
            Some(json!({
                "title": "成果", "title_en": "achievement",
                "content": "正文", "content_en": "body",
            })),
        ),
        (
            "POST",
            "/api/group",
            Some(json!({"name": "编译组"})),
        ),
        ("GET", "/api/carousel_image", None),
    ];

    for (method, uri, body) in admin_calls {
        let member_req = match &body {
            Some(b) => json_request(method, uri, Some(&member), b.clone()),
            None => bare_request(method, uri, Some(&member)),
        };
        let (status, _) = send(&router, member_req).await;
        assert_eq!(
            status,
            StatusCode::FORBIDDEN,
            "member should be forbidden on {method} {uri}"
        );

        let admin_req = match &body {
            Some(b) => json_request(method, uri, Some(&admin), b.clone()),
            None => bare_request(method, uri, Some(&admin)),
        };
        let (status, _) = send(&router, admin_req).await;
        assert!(
            status.is_success(),
            "admin should succeed on {method} {uri}, got {status}"
        );
    }

    // Password reset follows the same tier, and resets to the documented
    // default.
    let (_, member_profile) =
        send(&router, bare_request("GET", "/api/profile", Some(&member))).await;
    let member_id = member_profile["id"].as_str().unwrap();

    let uri = format!("/api/password?id={member_id}");
    let (status, _) = send(&router, bare_request("DELETE", &uri, Some(&member))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&router, bare_request("DELETE", &uri, Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
    login(&router, "member", "123456").await;
}

#[tokio::test]
async fn visit_counter_increments_only_on_single_fetch() {
    let (_dir, router, state) = test_app().await;
    signup(&router, "root").await;
    promote_to_admin(&state, "root").await;
    let admin = login(&router, "root", "secret").await;

    let (status, created) = send(
        &router,
        json_request(
            "POST",
            "/api/news",
            Some(&admin),
            json!({
                "title": "新大楼", "title_en": "New building",
                "content": "正文", "content_en": "body",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_str().unwrap().to_string();

    // Unauthenticated public list shows the item untouched.
    let (status, listed) = send(&router, get("/news")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed[0]["visit_count"], 0);

    // The single fetch increments.
    let (status, item) = send(&router, get(&format!("/news?id={id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(item["visit_count"], 1);

    // Listing again does not.
    let (_, listed) = send(&router, get("/news")).await;
    assert_eq!(listed[0]["visit_count"], 1);

    // The English projection picks the other title.
    let (_, listed_en) = send(&router, get("/news?lang=en")).await;
    assert_eq!(listed_en[0]["title"], "New building");

    // The admin single fetch leaves the counter alone.
    let (_, admin_item) = send(
        &router,
        bare_request("GET", &format!("/api/news?id={id}"), Some(&admin)),
    )
    .await;
    assert_eq!(admin_item["visit_count"], 1);
}

#[tokio::test]
async fn group_delete_removes_membership_references() {
    let (_dir, router, state) = test_app().await;
    signup(&router, "u").await;
    signup(&router, "root").await;
    promote_to_admin(&state, "root").await;
    let admin = login(&router, "root", "secret").await;
    let member = login(&router, "u", "secret").await;

    let (status, group) = send(
        &router,
        json_request("POST", "/api/group", Some(&admin), json!({"name": "G1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let group_id = group["id"].as_str().unwrap().to_string();

    let (_, profile) = send(&router, bare_request("GET", "/api/profile", Some(&member))).await;
    let user_id = profile["id"].as_str().unwrap().to_string();

    // Assign U to G1 through the admin update path.
    let (status, _) = send(
        &router,
        json_request(
            "POST",
            "/api/user",
            Some(&admin),
            json!({"id": user_id, "groups": [group_id]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, groups) = send(
        &router,
        bare_request("GET", &format!("/api/group?uid={user_id}"), Some(&member)),
    )
    .await;
    assert_eq!(groups.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &router,
        bare_request(
            "DELETE",
            &format!("/api/group?id={group_id}"),
            Some(&admin),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, groups) = send(
        &router,
        bare_request("GET", &format!("/api/group?uid={user_id}"), Some(&member)),
    )
    .await;
    assert!(groups.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn sub_records_enforce_ownership_from_storage() {
    let (_dir, router, _state) = test_app().await;
    signup(&router, "alice").await;
    signup(&router, "bob").await;
    let alice = login(&router, "alice", "secret").await;
    let bob = login(&router, "bob", "secret").await;

    let (status, education) = send(
        &router,
        json_request(
            "POST",
            "/api/education",
            Some(&alice),
            json!({
                "start": "2020-09-01T00:00:00Z",
                "school": "SJTU",
                "major": "CS",
                "degree": 1,
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let education_id = education["id"].as_str().unwrap().to_string();

    // Bob knows the id but does not own the record.
    let uri = format!("/api/education?id={education_id}");
    let (status, _) = send(&router, bare_request("DELETE", &uri, Some(&bob))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&router, bare_request("DELETE", &uri, Some(&alice))).await;
    assert_eq!(status, StatusCode::OK);

    // Missing id fails fast; a gone record is NotFound.
    let (status, _) = send(&router, bare_request("DELETE", "/api/education", Some(&alice))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = send(&router, bare_request("DELETE", &uri, Some(&alice))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn multipart_request(
    uri: &str,
    token: &str,
    parts: &[(&str, Option<&str>, &str)],
) -> Request<Body> {
    let boundary = "X-INTEGRATION-BOUNDARY";
    let mut body = String::new();
    for (name, filename, content) in parts {
        body.push_str(&format!("--{boundary}\r\n"));
        match filename {
            Some(filename) => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
                ));
                body.push_str("Content-Type: application/octet-stream\r\n\r\n");
            }
            None => {
                body.push_str(&format!(
                    "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
                ));
            }
        }
        body.push_str(content);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    Request::post(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn document_upload_requires_matching_information() {
    let (_dir, router, _state) = test_app().await;
    signup(&router, "alice").await;
    let alice = login(&router, "alice", "secret").await;

    // Two files, one introduction: nothing persists.
    let request = multipart_request(
        "/api/doc",
        &alice,
        &[
            ("files", Some("a.txt"), "content a"),
            ("files", Some("b.txt"), "content b"),
            ("information", None, "only one"),
        ],
    );
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, docs) = send(&router, bare_request("GET", "/api/doc", Some(&alice))).await;
    assert!(docs.as_array().unwrap().is_empty());

    // Matching counts persist both.
    let request = multipart_request(
        "/api/doc",
        &alice,
        &[
            ("files", Some("a.txt"), "content a"),
            ("information", None, "intro a"),
            ("files", Some("b.txt"), "content b"),
            ("information", None, "intro b"),
        ],
    );
    let (status, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);

    let (_, docs) = send(&router, bare_request("GET", "/api/doc", Some(&alice))).await;
    assert_eq!(docs.as_array().unwrap().len(), 2);

    // The public download page lists them without a token.
    let (status, public_docs) = send(&router, get("/download")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(public_docs.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn blog_flow_with_attachment_and_cookie_download() {
    let (_dir, router, state) = test_app().await;
    signup(&router, "alice").await;
    signup(&router, "bob").await;
    signup(&router, "root").await;
    promote_to_admin(&state, "root").await;

    let alice = login(&router, "alice", "secret").await;
    let bob = login(&router, "bob", "secret").await;
    let admin = login(&router, "root", "secret").await;

    // Title contains "log", so no announcement is attempted.
    let request = multipart_request(
        "/api/blog",
        &alice,
        &[
            (
                "blog",
                None,
                r#"{"title": "Weekly log 1", "content": "<p>notes</p>"}"#,
            ),
            ("attachments", Some("slides.pdf"), "pdf-bytes"),
        ],
    );
    let (status, blog) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
    let blog_id = blog["id"].as_str().unwrap().to_string();

    // Own posts only, unless admin.
    let (_, own) = send(&router, bare_request("GET", "/api/blog", Some(&alice))).await;
    assert_eq!(own.as_array().unwrap().len(), 1);
    let (_, others) = send(&router, bare_request("GET", "/api/blog", Some(&bob))).await;
    assert!(others.as_array().unwrap().is_empty());
    let (_, all) = send(&router, bare_request("GET", "/api/blog", Some(&admin))).await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let file_id = own[0]["attachments"][0]["id"].as_str().unwrap().to_string();

    // The browser route needs the cookie; no cookie is unauthenticated.
    let uri = format!("/file?id={file_id}");
    let response = router.clone().oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let request = Request::get(&uri)
        .header(header::COOKIE, format!("api-token={alice}"))
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"pdf-bytes");

    // The public activity page shows the post without a token.
    let (status, page) = send(&router, get("/activity")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["blogs"].as_array().unwrap().len(), 1);

    let (status, view) = send(&router, get(&format!("/activity?id={blog_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["attachments"][0]["name"], "slides.pdf");

    // Any authenticated member may delete a post.
    let (status, _) = send(
        &router,
        bare_request("DELETE", &format!("/api/blog?id={blog_id}"), Some(&bob)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn public_pages_respond_without_auth() {
    let (_dir, router, _state) = test_app().await;
    signup(&router, "alice").await;

    let (status, home) = send(&router, get("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(home["top_news"].as_array().unwrap().is_empty());

    let (status, members) = send(&router, get("/member")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(members["students"].as_array().unwrap().len(), 1);

    let student_id = members["students"][0]["id"].as_str().unwrap();
    let (status, member) = send(&router, get(&format!("/showmember?id={student_id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(member["name_en"], "Member");
    assert!(member.get("password_hash").is_none());

    let (status, _) = send(&router, get("/showmember")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
}
