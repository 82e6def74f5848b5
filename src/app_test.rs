use super::*;
use crate::net::gateway::REFRESH_PATH;
use crate::state::storage::{AuthMarker, MemoryStore, write_auth_marker};
use serde_json::json;
use time::OffsetDateTime;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn fresh_install_boots_logged_out_without_network() {
    let server = MockServer::start().await;
    let app = App::with_storage(ClientConfig::new(server.uri()), Arc::new(MemoryStore::new())).await.unwrap();

    assert!(!app.session.is_authenticated());
    assert!(server.received_requests().await.unwrap().is_empty());

    let outcome = app.router.navigate("/admin").await.unwrap();
    assert_eq!(outcome.route.path, "/login");
    assert_eq!(app.history().current().as_deref(), Some("/login"));
}

#[tokio::test]
async fn bootstrap_restores_session_from_file_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(REFRESH_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": "ok", "message": "" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/User/GetLoggedInUserData"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "id": "u-9", "email": "boss@pegasus.test", "roles": ["Admin", "Driver", "User"] },
            "message": ""
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = ClientConfig::new(server.uri());
    config.storage_path = dir.path().join("storage.json");
    write_auth_marker(
        &FileStore::new(&config.storage_path),
        AuthMarker::expiring_after(OffsetDateTime::now_utc(), 600),
    );

    let app = App::bootstrap(config).await.unwrap();

    assert!(app.session.is_routing_authenticated());
    assert_eq!(app.session.load_route_based_on_role(), "/admin");
    assert_eq!(app.router.navigate("/").await.unwrap().route.path, "/");
}
