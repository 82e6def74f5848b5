//! Customer profile and booking endpoints.

#[cfg(test)]
#[path = "user_test.rs"]
mod user_test;

use crate::error::ApiError;
use crate::net::gateway::ApiGateway;
use crate::net::http::PendingRequest;
use crate::net::types::{
    ApiResponse, BookingResponse, BookingSearchRequest, PaginatedResult, UpdateBookingRequest, UpdateUserRequest,
    UpdateUserResponse, UserProfile,
};

pub const PROFILE_PATH: &str = "/api/User/GetLoggedInUserData";

/// Profile of the logged-in user, including roles.
///
/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn profile(gateway: &ApiGateway) -> Result<ApiResponse<UserProfile>, ApiError> {
    gateway.call(PendingRequest::get(PROFILE_PATH)).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn update_profile(
    gateway: &ApiGateway,
    request: &UpdateUserRequest,
) -> Result<ApiResponse<UpdateUserResponse>, ApiError> {
    gateway.call_with(PendingRequest::put("/api/User/UpdateUser"), request).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn my_bookings(
    gateway: &ApiGateway,
    query: &BookingSearchRequest,
) -> Result<ApiResponse<PaginatedResult<BookingResponse>>, ApiError> {
    gateway.call(PendingRequest::get("api/Booking/getMyBookings").query(query)?).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn booking_by_id(gateway: &ApiGateway, id: u64) -> Result<ApiResponse<BookingResponse>, ApiError> {
    gateway.call(PendingRequest::get(format!("api/Booking/GetBookingById/{id}"))).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn cancel_booking(gateway: &ApiGateway, id: u64) -> Result<ApiResponse<bool>, ApiError> {
    gateway.call(PendingRequest::put(format!("api/Booking/CancelBooking/{id}"))).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn update_booking(
    gateway: &ApiGateway,
    request: &UpdateBookingRequest,
) -> Result<ApiResponse<BookingResponse>, ApiError> {
    gateway.call_with(PendingRequest::put("/api/Booking/updateBooking"), request).await
}
