//! Admin endpoints: pricing, bookings, and driver management.

#[cfg(test)]
#[path = "admin_test.rs"]
mod admin_test;

use crate::error::ApiError;
use crate::net::gateway::ApiGateway;
use crate::net::http::PendingRequest;
use crate::net::types::{
    ApiResponse, AvailableDriver, BookingResponse, BookingSearchRequest, CreateDriverRequest, DriverSummary,
    NewTaxiSettings, PaginatedResult, TaxiSettings, UpdateBookingRequest,
};

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn taxi_prices(gateway: &ApiGateway) -> Result<ApiResponse<TaxiSettings>, ApiError> {
    gateway.call(PendingRequest::get("/api/Admin/GetAllTaxiPrices")).await
}

/// Publish a new price set. The backend keeps history; the newest wins.
///
/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn create_taxi_prices(
    gateway: &ApiGateway,
    settings: &NewTaxiSettings,
) -> Result<ApiResponse<TaxiSettings>, ApiError> {
    gateway.call_with(PendingRequest::post("/api/Admin/CreateNewTaxiPrices"), settings).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn all_bookings(
    gateway: &ApiGateway,
    query: &BookingSearchRequest,
) -> Result<ApiResponse<PaginatedResult<BookingResponse>>, ApiError> {
    gateway.call(PendingRequest::get("api/Admin/getAllBookings").query(query)?).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn booking_by_id(gateway: &ApiGateway, id: u64) -> Result<ApiResponse<BookingResponse>, ApiError> {
    gateway.call(PendingRequest::get(format!("/api/Admin/GetBookingById/{id}"))).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn update_booking(
    gateway: &ApiGateway,
    request: &UpdateBookingRequest,
) -> Result<ApiResponse<BookingResponse>, ApiError> {
    gateway.call_with(PendingRequest::put("/api/Admin/UpdateBooking"), request).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn drivers(gateway: &ApiGateway) -> Result<ApiResponse<Vec<DriverSummary>>, ApiError> {
    gateway.call(PendingRequest::get("/api/Admin/GetAllDrivers")).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn delete_driver(gateway: &ApiGateway, driver_id: &str) -> Result<ApiResponse<bool>, ApiError> {
    let id = clean_id(driver_id);
    gateway.call(PendingRequest::delete(format!("/api/Admin/DeleteDriver/{id}"))).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn create_driver(gateway: &ApiGateway, request: &CreateDriverRequest) -> Result<ApiResponse<bool>, ApiError> {
    gateway.call_with(PendingRequest::post("/api/Admin/CreateDriver"), request).await
}

/// Drivers free at the pickup time of `booking_id`.
///
/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn available_drivers(
    gateway: &ApiGateway,
    booking_id: u64,
) -> Result<ApiResponse<Vec<AvailableDriver>>, ApiError> {
    gateway.call(PendingRequest::get(format!("/api/Admin/GetAvailableDrivers/{booking_id}"))).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn assign_driver(
    gateway: &ApiGateway,
    booking_id: u64,
    driver_id: &str,
) -> Result<ApiResponse<bool>, ApiError> {
    let driver_id = clean_id(driver_id);
    gateway.call(PendingRequest::put(format!("/api/Admin/AssignDriver/{booking_id}/{driver_id}"))).await
}

/// Promote an existing account to admin.
///
/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn create_admin(gateway: &ApiGateway, email: &str) -> Result<ApiResponse<bool>, ApiError> {
    gateway.call(PendingRequest::post(format!("/api/Admin/CreateAdmin/{}", email.trim()))).await
}

/// Ids copied out of tables tend to carry zero-width characters.
pub(crate) fn clean_id(raw: &str) -> String {
    raw.chars().filter(|c| !matches!(c, '\u{200B}'..='\u{200D}' | '\u{FEFF}')).collect::<String>().trim().to_owned()
}
