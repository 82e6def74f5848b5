use super::*;
use crate::config::ClientConfig;
use crate::net::gateway::REFRESH_PATH;
use crate::net::refresh::RefreshState;
use crate::state::storage::{AUTH_MARKER_KEY, MemoryStore};
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DEFAULT_LIFETIME: u64 = 7 * 24 * 60 * 60;

// =============================================================================
// HELPERS
// =============================================================================

struct Harness {
    store: Arc<SessionStore>,
    storage: Arc<MemoryStore>,
    history: History,
}

fn harness(server: &MockServer) -> Harness {
    let gateway = Arc::new(ApiGateway::new(&ClientConfig::new(server.uri())).unwrap());
    let storage = Arc::new(MemoryStore::new());
    let history = History::new();
    let store = SessionStore::new(gateway, Arc::clone(&storage) as Arc<dyn KeyValueStore>, history.clone(), DEFAULT_LIFETIME);
    Harness { store, storage, history }
}

async fn mount(server: &MockServer, verb: &str, route: &str, status: u16, body: Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

async fn calls_to(server: &MockServer, route: &str) -> usize {
    server.received_requests().await.unwrap().iter().filter(|r| r.url.path() == route).count()
}

fn profile_json(roles: &[&str]) -> Value {
    json!({
        "data": {
            "id": "u-1",
            "email": "ada@pegasus.test",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "roles": roles
        },
        "message": ""
    })
}

fn user(roles: &[Role]) -> UserProfile {
    UserProfile {
        id: "u-1".into(),
        email: "ada@pegasus.test".into(),
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        phone_number: None,
        roles: roles.iter().copied().collect(),
    }
}

fn credentials() -> LoginRequest {
    LoginRequest { email: "ada@pegasus.test".into(), password: "hunter2".into() }
}

fn stored_marker(storage: &MemoryStore) -> Option<AuthMarker> {
    storage.get(AUTH_MARKER_KEY).unwrap().map(|raw| serde_json::from_str(&raw).unwrap())
}

fn plant_marker(storage: &MemoryStore, lifetime_secs: u64) {
    write_auth_marker(storage, AuthMarker::expiring_after(OffsetDateTime::now_utc(), lifetime_secs));
}

async fn mount_two_factor_success(server: &MockServer) {
    mount(server, "POST", "/api/Auth/Login", 200, json!({ "data": { "requiresTwoFactor": true }, "message": "Code sent" }))
        .await;
    mount(
        server,
        "POST",
        "/api/Auth/VerifyTwoFA",
        200,
        json!({ "data": { "isAuthenticated": true, "roles": ["Driver"] }, "message": "Welcome" }),
    )
    .await;
    mount(server, "GET", "/api/User/GetLoggedInUserData", 200, profile_json(&["Driver"])).await;
}

// =============================================================================
// LOGIN + TWO FACTOR
// =============================================================================

#[tokio::test]
async fn login_success_does_not_authenticate() {
    let server = MockServer::start().await;
    mount(&server, "POST", "/api/Auth/Login", 200, json!({ "data": { "requiresTwoFactor": true }, "message": "Code sent" }))
        .await;
    let h = harness(&server);

    let result = h.store.login(&credentials()).await;

    assert_eq!(result, ActionResult { success: true, message: "Code sent".into() });
    assert!(!h.store.is_authenticated());
    assert_eq!(stored_marker(&h.storage), None);
}

#[tokio::test]
async fn login_failure_reports_generic_message() {
    let server = MockServer::start().await;
    mount(&server, "POST", "/api/Auth/Login", 401, json!({ "message": "Wrong password" })).await;
    let h = harness(&server);

    let result = h.store.login(&credentials()).await;

    assert_eq!(result, ActionResult { success: false, message: LOGIN_FAILED.into() });
    assert_eq!(calls_to(&server, REFRESH_PATH).await, 0);
}

#[tokio::test]
async fn two_factor_without_login_fails_without_network() {
    let server = MockServer::start().await;
    let h = harness(&server);

    let result = h.store.verify_two_factor("123456").await;

    assert!(!result.success);
    assert_eq!(result.message, TWO_FACTOR_FAILED);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn two_factor_success_authenticates_and_persists_marker() {
    let server = MockServer::start().await;
    mount_two_factor_success(&server).await;
    mount(&server, "GET", "/api/Auth/SessionLifeTime", 200, json!({ "data": { "sessionLifetimeSeconds": 3600 }, "message": "" }))
        .await;
    let h = harness(&server);

    h.store.login(&credentials()).await;
    let before = OffsetDateTime::now_utc();
    let result = h.store.verify_two_factor(" 123456 ").await;

    assert_eq!(result, ActionResult { success: true, message: "Welcome".into() });
    let session = h.store.snapshot();
    assert!(session.is_authenticated);
    assert_eq!(session.session_lifetime_seconds, 3600);
    assert_eq!(session.user, Some(user(&[Role::Driver])));
    assert!(h.store.is_routing_authenticated());
    assert_eq!(h.store.load_route_based_on_role(), DRIVER_PATH);

    let marker = stored_marker(&h.storage).unwrap();
    assert!(marker.is_valid_at(before + time::Duration::minutes(59)));
    assert!(!marker.is_valid_at(before + time::Duration::minutes(61)));
}

#[tokio::test]
async fn two_factor_falls_back_to_default_lifetime() {
    let server = MockServer::start().await;
    mount_two_factor_success(&server).await;
    mount(&server, "GET", "/api/Auth/SessionLifeTime", 500, json!({})).await;
    let h = harness(&server);

    h.store.login(&credentials()).await;
    assert!(h.store.verify_two_factor("123456").await.success);

    assert_eq!(h.store.snapshot().session_lifetime_seconds, DEFAULT_LIFETIME);
    let marker = stored_marker(&h.storage).unwrap();
    assert!(marker.is_valid_at(OffsetDateTime::now_utc() + time::Duration::days(6)));
}

#[tokio::test]
async fn wrong_code_reports_failure() {
    let server = MockServer::start().await;
    mount(&server, "POST", "/api/Auth/Login", 200, json!({ "data": null, "message": "" })).await;
    mount(&server, "POST", "/api/Auth/VerifyTwoFA", 400, json!({ "message": "Invalid code" })).await;
    let h = harness(&server);

    h.store.login(&credentials()).await;
    let result = h.store.verify_two_factor("000000").await;

    assert_eq!(result, ActionResult { success: false, message: TWO_FACTOR_FAILED.into() });
    assert!(!h.store.is_authenticated());
}

#[tokio::test]
async fn two_factor_without_profile_logs_out() {
    let server = MockServer::start().await;
    mount(&server, "POST", "/api/Auth/Login", 200, json!({ "data": null, "message": "" })).await;
    mount(&server, "POST", "/api/Auth/VerifyTwoFA", 200, json!({ "data": { "isAuthenticated": true }, "message": "" })).await;
    mount(&server, "GET", "/api/Auth/SessionLifeTime", 500, json!({})).await;
    mount(&server, "GET", "/api/User/GetLoggedInUserData", 500, json!({})).await;
    mount(&server, "POST", "/api/Auth/Logout", 200, json!({ "data": true, "message": "" })).await;
    let h = harness(&server);

    h.store.login(&credentials()).await;
    let result = h.store.verify_two_factor("123456").await;

    assert_eq!(result, ActionResult { success: false, message: TWO_FACTOR_FAILED.into() });
    assert!(!h.store.is_authenticated());
    assert_eq!(stored_marker(&h.storage), None);
    assert_eq!(h.history.current().as_deref(), Some(LOGIN_PATH));
    assert_eq!(calls_to(&server, "/api/Auth/Logout").await, 1);
}

// =============================================================================
// INITIALIZE AUTH
// =============================================================================

#[tokio::test]
async fn initialize_without_marker_sends_nothing() {
    let server = MockServer::start().await;
    let h = harness(&server);

    assert!(!h.store.initialize_auth().await);

    assert!(server.received_requests().await.unwrap().is_empty());
    assert!(!h.store.is_authenticated());
}

#[tokio::test]
async fn initialize_with_expired_marker_sends_nothing() {
    let server = MockServer::start().await;
    let h = harness(&server);
    h.storage.set(AUTH_MARKER_KEY, r#"{"expiresAt":1}"#).unwrap();

    assert!(!h.store.initialize_auth().await);

    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(h.storage.get(AUTH_MARKER_KEY).unwrap(), None);
}

#[tokio::test]
async fn initialize_with_marker_refreshes_and_loads_profile() {
    let server = MockServer::start().await;
    mount(&server, "POST", REFRESH_PATH, 200, json!({ "data": "ok", "message": "" })).await;
    mount(&server, "GET", "/api/User/GetLoggedInUserData", 200, profile_json(&["User"])).await;
    let h = harness(&server);
    plant_marker(&h.storage, 60);

    assert!(h.store.initialize_auth().await);

    assert!(h.store.is_routing_authenticated());
    assert_eq!(h.store.load_route_based_on_role(), CUSTOMER_PATH);
    assert_eq!(calls_to(&server, REFRESH_PATH).await, 1);
    let marker = stored_marker(&h.storage).unwrap();
    assert!(marker.is_valid_at(OffsetDateTime::now_utc() + time::Duration::days(6)));
}

#[tokio::test]
async fn initialize_refresh_failure_logs_out() {
    let server = MockServer::start().await;
    mount(&server, "POST", REFRESH_PATH, 401, json!({})).await;
    mount(&server, "POST", "/api/Auth/Logout", 200, json!({ "data": true, "message": "" })).await;
    let h = harness(&server);
    plant_marker(&h.storage, 60);

    assert!(!h.store.initialize_auth().await);

    assert!(!h.store.is_authenticated());
    assert_eq!(stored_marker(&h.storage), None);
    assert_eq!(h.history.current().as_deref(), Some(LOGIN_PATH));
    assert_eq!(calls_to(&server, "/api/Auth/Logout").await, 1);
}

#[tokio::test]
async fn initialize_profile_failure_logs_out() {
    let server = MockServer::start().await;
    mount(&server, "POST", REFRESH_PATH, 200, json!({ "data": "ok", "message": "" })).await;
    mount(&server, "GET", "/api/User/GetLoggedInUserData", 500, json!({})).await;
    mount(&server, "POST", "/api/Auth/Logout", 200, json!({ "data": true, "message": "" })).await;
    let h = harness(&server);
    plant_marker(&h.storage, 60);

    assert!(!h.store.initialize_auth().await);

    assert_eq!(h.store.snapshot().user, None);
    assert_eq!(stored_marker(&h.storage), None);
}

#[tokio::test]
async fn initialize_forbidden_profile_logs_out_once() {
    let server = MockServer::start().await;
    mount(&server, "POST", REFRESH_PATH, 200, json!({ "data": "ok", "message": "" })).await;
    mount(&server, "GET", "/api/User/GetLoggedInUserData", 403, json!({})).await;
    mount(&server, "POST", "/api/Auth/Logout", 200, json!({ "data": true, "message": "" })).await;
    let h = harness(&server);
    plant_marker(&h.storage, 60);

    assert!(!h.store.initialize_auth().await);

    assert!(!h.store.is_authenticated());
    assert_eq!(stored_marker(&h.storage), None);
    assert_eq!(calls_to(&server, "/api/Auth/Logout").await, 1);
}

#[tokio::test]
async fn initialize_rearms_a_failed_refresh_machine() {
    let server = MockServer::start().await;
    mount(&server, "GET", "/api/Booking/getMyBookings", 401, json!({})).await;
    mount(&server, "POST", REFRESH_PATH, 500, json!({})).await;
    mount(&server, "POST", "/api/Auth/Logout", 200, json!({ "data": true, "message": "" })).await;
    let h = harness(&server);

    let _ = h.store.gateway.send(crate::net::http::PendingRequest::get("/api/Booking/getMyBookings")).await;
    assert_eq!(h.store.gateway.refresh_state(), RefreshState::Failed);

    plant_marker(&h.storage, 60);
    assert!(!h.store.initialize_auth().await);
    assert_eq!(calls_to(&server, REFRESH_PATH).await, 2);
}

// =============================================================================
// LOGOUT
// =============================================================================

#[tokio::test]
async fn logout_clears_state_even_when_backend_fails() {
    let server = MockServer::start().await;
    mount_two_factor_success(&server).await;
    mount(&server, "GET", "/api/Auth/SessionLifeTime", 500, json!({})).await;
    mount(&server, "POST", "/api/Auth/Logout", 503, json!({})).await;
    let h = harness(&server);
    h.store.login(&credentials()).await;
    assert!(h.store.verify_two_factor("123456").await.success);

    h.store.logout().await;

    let session = h.store.snapshot();
    assert!(!session.is_authenticated);
    assert_eq!(session.user, None);
    assert_eq!(stored_marker(&h.storage), None);
    assert_eq!(h.history.current().as_deref(), Some(LOGIN_PATH));
}

#[tokio::test]
async fn logout_is_idempotent() {
    let server = MockServer::start().await;
    let h = harness(&server);

    h.store.logout().await;
    h.store.logout().await;

    assert!(!h.store.is_authenticated());
    assert_eq!(h.history.entries(), vec![LOGIN_PATH.to_owned()]);
}

#[tokio::test]
async fn forbidden_response_forces_logout() {
    let server = MockServer::start().await;
    mount_two_factor_success(&server).await;
    mount(&server, "GET", "/api/Auth/SessionLifeTime", 500, json!({})).await;
    mount(&server, "GET", "/api/Admin/GetAllDrivers", 403, json!({})).await;
    mount(&server, "POST", "/api/Auth/Logout", 200, json!({ "data": true, "message": "" })).await;
    let h = harness(&server);
    h.store.login(&credentials()).await;
    assert!(h.store.verify_two_factor("123456").await.success);

    let err = crate::endpoints::admin::drivers(&h.store.gateway).await.unwrap_err();

    assert!(err.is_forbidden());
    assert!(!h.store.is_authenticated());
    assert_eq!(stored_marker(&h.storage), None);
}

// =============================================================================
// REGISTER / FORGOT PASSWORD
// =============================================================================

#[tokio::test]
async fn register_and_forgot_password_map_failures_to_fallback() {
    let server = MockServer::start().await;
    mount(&server, "POST", "/api/User/Registration", 409, json!({ "message": "Email taken" })).await;
    mount(&server, "POST", "/api/Auth/ForgotPassword", 200, json!({ "data": true, "message": "Check your inbox" })).await;
    let h = harness(&server);

    let registration = RegistrationRequest {
        first_name: "Ada".into(),
        last_name: "Lovelace".into(),
        email: "ada@pegasus.test".into(),
        phone_number: "0701234567".into(),
        password: "Secret123!".into(),
        confirm_password: "Secret123!".into(),
    };
    assert_eq!(
        h.store.register(&registration).await,
        ActionResult { success: false, message: FALLBACK_MESSAGE.into() }
    );
    assert_eq!(
        h.store.forgot_password(&PasswordResetRequest { email: "ada@pegasus.test".into() }).await,
        ActionResult { success: true, message: "Check your inbox".into() }
    );
    assert!(!h.store.is_authenticated());
}

// =============================================================================
// ROLE ROUTING
// =============================================================================

#[test]
fn role_routing_precedence() {
    assert_eq!(route_for_roles(&user(&[Role::Admin, Role::Driver, Role::User]).roles), ADMIN_PATH);
    assert_eq!(route_for_roles(&user(&[Role::Admin, Role::User]).roles), ADMIN_PATH);
    assert_eq!(route_for_roles(&user(&[Role::Driver, Role::User]).roles), DRIVER_PATH);
    assert_eq!(route_for_roles(&user(&[Role::User]).roles), CUSTOMER_PATH);
    assert_eq!(route_for_roles(&BTreeSet::new()), LOGIN_PATH);
}

#[tokio::test]
async fn empty_roles_are_not_routing_authenticated() {
    let server = MockServer::start().await;
    mount(&server, "POST", REFRESH_PATH, 200, json!({ "data": "ok", "message": "" })).await;
    mount(&server, "GET", "/api/User/GetLoggedInUserData", 200, profile_json(&[])).await;
    let h = harness(&server);
    plant_marker(&h.storage, 60);

    assert!(h.store.initialize_auth().await);

    assert!(h.store.is_authenticated());
    assert!(!h.store.is_routing_authenticated());
    assert_eq!(h.store.load_route_based_on_role(), LOGIN_PATH);
}
