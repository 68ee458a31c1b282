mod common;

use axum::{Json, Router, extract::RawQuery, routing::get};
use bitsa_portal::{
    ApiClient, RequestBody,
    backend::repository::Repository,
    filters::{BlogFilter, EventFilter},
    form::SubmitOutcome,
    guard::Route,
    models::BlogPost,
    pages::{
        account::{LoginPage, ProfilePage, RegisterPage, logout},
        public::BlogListPage,
    },
};
use common::{ADMIN_EMAIL, ADMIN_PASSWORD, spawn_app};
use reqwest::StatusCode;
use serde_json::json;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// A stand-in `/api/blogs` that records the raw query string of each request.
async fn spawn_query_recorder() -> (String, Arc<Mutex<Vec<Option<String>>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let recorder = seen.clone();
    let router = Router::new().route(
        "/api/blogs",
        get(move |RawQuery(query): RawQuery| {
            let recorder = recorder.clone();
            async move {
                recorder.lock().unwrap().push(query);
                Json(Vec::<BlogPost>::new())
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (format!("http://127.0.0.1:{}/api", port), seen)
}

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = reqwest::Client::new()
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("req fail");
    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_filter_sends_only_filled_fields() {
    let (base, seen) = spawn_query_recorder().await;
    let api = ApiClient::new(base);

    api.fetch_blogs(&BlogFilter::keyword("x")).await.unwrap();
    api.fetch_blogs(&BlogFilter::default()).await.unwrap();
    api.fetch_blogs(&BlogFilter {
        keyword: "rust".into(),
        category: "News".into(),
        date: String::new(),
        limit: Some(3),
    })
    .await
    .unwrap();

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen[0].as_deref(), Some("keyword=x"));
    assert!(seen[1].as_deref().unwrap_or_default().is_empty());
    assert_eq!(seen[2].as_deref(), Some("keyword=rust&category=News&limit=3"));
}

#[tokio::test]
async fn test_blog_list_failure_renders_static_message() {
    // Nothing is routed under /missing, so every list call fails.
    let (base, _) = spawn_query_recorder().await;
    let portal = bitsa_portal::Portal::new(
        base.replace("/api", "/missing"),
        Arc::new(bitsa_portal::MemoryStore::new()),
        Arc::new(bitsa_portal::FixedAppearance(false)),
    );
    let mut page = BlogListPage::new(portal);
    page.apply_filters().await;
    assert_eq!(
        page.blogs.render(),
        bitsa_portal::view::ListRender::Failed {
            message: "Failed to fetch blogs.",
            stale: &[],
        }
    );
}

#[tokio::test]
async fn test_login_lands_by_role() {
    let app = spawn_app().await;
    app.register("Amina", "amina@bitsa.test").await;

    let admin_portal = app.portal();
    let mut login = LoginPage::new(admin_portal.clone());
    login.form.fields.email = ADMIN_EMAIL.into();
    login.form.fields.password = ADMIN_PASSWORD.into();
    assert_eq!(login.submit().await, SubmitOutcome::Submitted(Route::AdminDashboard));
    assert!(admin_portal.session.is_admin());

    let member_portal = app.portal();
    let mut login = LoginPage::new(member_portal.clone());
    login.form.fields.email = "amina@bitsa.test".into();
    login.form.fields.password = "member-pass".into();
    assert_eq!(login.submit().await, SubmitOutcome::Submitted(Route::Profile));
    assert!(member_portal.session.is_authenticated());
    assert!(!member_portal.session.is_admin());

    assert_eq!(logout(&member_portal), Route::Login);
    assert!(!member_portal.session.is_authenticated());
}

#[tokio::test]
async fn test_bad_credentials_keep_the_form() {
    let app = spawn_app().await;
    let mut login = LoginPage::new(app.portal());
    login.form.fields.email = ADMIN_EMAIL.into();
    login.form.fields.password = "wrong".into();

    assert_eq!(
        login.submit().await,
        SubmitOutcome::Failed("Invalid email or password".into())
    );
    assert_eq!(login.form.error(), Some("Invalid email or password"));
    assert_eq!(login.form.fields.email, ADMIN_EMAIL);
}

#[tokio::test]
async fn test_register_checks_confirmation_and_duplicates() {
    let app = spawn_app().await;
    let portal = app.portal();

    let mut page = RegisterPage::new(portal.clone());
    page.form.fields.name = "Amina".into();
    page.form.fields.email = "amina@bitsa.test".into();
    page.form.fields.password = "one".into();
    page.form.fields.confirm_password = "two".into();
    assert_eq!(
        page.submit().await,
        SubmitOutcome::Invalid("Passwords do not match.".into())
    );
    assert!(app.repo.find_user_by_email("amina@bitsa.test").await.is_none());

    page.form.fields.confirm_password = "one".into();
    assert_eq!(page.submit().await, SubmitOutcome::Submitted(Route::Profile));
    assert_eq!(portal.session.user().unwrap().name, "Amina");

    let mut again = RegisterPage::new(app.portal());
    again.form.fields.name = "Impostor".into();
    again.form.fields.email = "AMINA@bitsa.test".into();
    again.form.fields.password = "x".into();
    again.form.fields.confirm_password = "x".into();
    assert_eq!(
        again.submit().await,
        SubmitOutcome::Failed("User already exists".into())
    );
}

#[tokio::test]
async fn test_privileged_calls_need_a_valid_token() {
    let app = spawn_app().await;
    let api = ApiClient::new(app.address.clone());
    let body = RequestBody::Json(json!({ "title": "t", "content": "c" }));

    let err = api.create_blog(body.clone(), "not-a-jwt").await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    assert_eq!(err.server_message(), Some("Not authorized, token failed"));
    assert!(err.is_unauthorized());

    let member = app.register("Amina", "amina@bitsa.test").await;
    let err = api
        .fetch_admin_stats(&member.token)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::FORBIDDEN));
    assert_eq!(err.user_message("fallback"), "Not authorized as an admin");

    let events = api.fetch_events(&EventFilter::upcoming(5)).await.unwrap();
    assert!(events.is_empty());
}

#[tokio::test]
async fn test_profile_update_repersists_session() {
    let app = spawn_app().await;
    let member = app.register("Amina", "amina@bitsa.test").await;
    let portal = app.portal_as(member);

    let mut page = ProfilePage::new(portal.clone());
    page.load().await;
    assert_eq!(page.form.fields.name, "Amina");

    page.form.fields.name = "Amina W.".into();
    page.form.fields.course = "BSc IT".into();
    assert!(page.save().await);
    assert_eq!(page.notice().unwrap().text(), "Profile updated successfully!");
    assert_eq!(page.form.fields.course, "BSc IT");
    assert_eq!(portal.session.user().unwrap().name, "Amina W.");

    let stored = app.repo.get_user(&portal.session.user().unwrap().id).await.unwrap();
    assert_eq!(stored.course.as_deref(), Some("BSc IT"));
}
