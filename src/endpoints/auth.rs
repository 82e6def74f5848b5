//! `/api/Auth/*` and registration, all on the auth-only client.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::error::ApiError;
use crate::net::gateway::ApiGateway;
use crate::net::http::PendingRequest;
use crate::net::types::{
    ApiResponse, AuthResponse, LoginRequest, LoginResponse, PasswordResetRequest, RegistrationRequest,
    RegistrationResponse, SessionLifetime, TwoFactorRequest,
};

/// Start a login. A success only means the second factor was sent.
///
/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn login(gateway: &ApiGateway, request: &LoginRequest) -> Result<ApiResponse<LoginResponse>, ApiError> {
    gateway.call_auth(PendingRequest::post("/api/Auth/Login").json(request)?).await
}

/// Complete a login with the emailed code. Sets the session cookies.
///
/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn verify_two_fa(
    gateway: &ApiGateway,
    request: &TwoFactorRequest,
) -> Result<ApiResponse<AuthResponse>, ApiError> {
    gateway.call_auth(PendingRequest::post("/api/Auth/VerifyTwoFA").json(request)?).await
}

/// Renew the access cookie. Joins an in-flight refresh instead of racing it.
///
/// # Errors
///
/// Returns the refresh call's error. The session decision is left to the caller.
pub async fn refresh_token(gateway: &ApiGateway) -> Result<(), ApiError> {
    gateway.refresh_session().await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn session_lifetime(gateway: &ApiGateway) -> Result<ApiResponse<SessionLifetime>, ApiError> {
    gateway.call_auth(PendingRequest::get("/api/Auth/SessionLifeTime")).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn logout(gateway: &ApiGateway) -> Result<ApiResponse<bool>, ApiError> {
    gateway.call_auth(PendingRequest::post("/api/Auth/Logout")).await
}

/// Probe whether the current cookies are accepted. Any 2xx is success.
///
/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn verify_auth(gateway: &ApiGateway) -> Result<(), ApiError> {
    gateway.auth(PendingRequest::get("/api/Auth/VerifyAuth")).await.map(|_| ())
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn register(
    gateway: &ApiGateway,
    request: &RegistrationRequest,
) -> Result<ApiResponse<RegistrationResponse>, ApiError> {
    gateway.call_auth(PendingRequest::post("/api/User/Registration").json(request)?).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn forgot_password(
    gateway: &ApiGateway,
    request: &PasswordResetRequest,
) -> Result<ApiResponse<bool>, ApiError> {
    gateway.call_auth(PendingRequest::post("/api/Auth/ForgotPassword").json(request)?).await
}
