//! Driver endpoints: job board, own bookings, and profile.

#[cfg(test)]
#[path = "driver_test.rs"]
mod driver_test;

use crate::error::ApiError;
use crate::net::gateway::ApiGateway;
use crate::net::http::PendingRequest;
use crate::net::types::{
    ApiResponse, BookingResponse, BookingSearchRequest, DriverInfo, PaginatedResult, ReceiptRequest,
    UpdateDriverRequest, UpdateDriverResponse,
};

/// Unassigned bookings a driver may accept.
///
/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn available_bookings(
    gateway: &ApiGateway,
    query: &BookingSearchRequest,
) -> Result<ApiResponse<PaginatedResult<BookingResponse>>, ApiError> {
    gateway.call(PendingRequest::get("api/Driver/Bookings/Available").query(query)?).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn accept_booking(gateway: &ApiGateway, booking_id: u64) -> Result<ApiResponse<BookingResponse>, ApiError> {
    gateway.call(PendingRequest::post(format!("api/Driver/Bookings/{booking_id}/Accept"))).await
}

/// Hand an accepted booking back to the pool.
///
/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn cancel_booking(gateway: &ApiGateway, booking_id: u64) -> Result<ApiResponse<bool>, ApiError> {
    gateway.call(PendingRequest::post(format!("api/Driver/Bookings/{booking_id}/Cancel"))).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn my_bookings(
    gateway: &ApiGateway,
    query: &BookingSearchRequest,
) -> Result<ApiResponse<PaginatedResult<BookingResponse>>, ApiError> {
    gateway.call(PendingRequest::get("api/Driver/GetMyBookings").query(query)?).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn driver_info(gateway: &ApiGateway) -> Result<ApiResponse<DriverInfo>, ApiError> {
    gateway.call(PendingRequest::get("api/Driver/DriverInformation")).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn send_receipt(gateway: &ApiGateway, receipt: &ReceiptRequest) -> Result<ApiResponse<bool>, ApiError> {
    gateway.call_with(PendingRequest::post("/api/Driver/Bookings/SendReceipt"), receipt).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn complete_booking(
    gateway: &ApiGateway,
    booking_id: u64,
) -> Result<ApiResponse<BookingResponse>, ApiError> {
    gateway.call(PendingRequest::post(format!("api/Driver/Bookings/{booking_id}/Complete"))).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn update_driver(
    gateway: &ApiGateway,
    driver_id: &str,
    request: &UpdateDriverRequest,
) -> Result<ApiResponse<UpdateDriverResponse>, ApiError> {
    gateway.call_with(PendingRequest::put(format!("/api/Driver/UpdateDriver/{driver_id}")), request).await
}
