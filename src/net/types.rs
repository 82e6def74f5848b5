//! Wire types for the booking backend.
//!
//! The backend owns this contract; field names follow its camelCase JSON.
//! Every response is wrapped in [`ApiResponse`].

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

// =============================================================================
// ENVELOPE
// =============================================================================

/// Standard `{ data, message }` envelope returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    pub total_count: u64,
    pub current_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

// =============================================================================
// ROLES & PROFILE
// =============================================================================

/// Coarse permission category deciding which dashboard a user may reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Admin,
    Driver,
    User,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Driver, Role::User];
}

/// Profile of the logged-in user from `GET /api/User/GetLoggedInUserData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub roles: BTreeSet<Role>,
}

impl UserProfile {
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}

// =============================================================================
// AUTH
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub requires_two_factor: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorRequest {
    pub email: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub is_authenticated: bool,
    #[serde(default)]
    pub roles: Vec<Role>,
    #[serde(default)]
    pub access_token_expires_in: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLifetime {
    pub session_lifetime_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordResetRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
}

pub type UpdateUserResponse = UpdateUserRequest;

// =============================================================================
// BOOKINGS
// =============================================================================

/// Status as the backend stores it; serialized as its integer code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BookingStatus {
    PendingEmailConfirmation,
    Confirmed,
    Cancelled,
    Completed,
}

impl TryFrom<u8> for BookingStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::PendingEmailConfirmation),
            1 => Ok(Self::Confirmed),
            2 => Ok(Self::Cancelled),
            3 => Ok(Self::Completed),
            other => Err(format!("unknown booking status {other}")),
        }
    }
}

impl From<BookingStatus> for u8 {
    fn from(status: BookingStatus) -> Self {
        match status {
            BookingStatus::PendingEmailConfirmation => 0,
            BookingStatus::Confirmed => 1,
            BookingStatus::Cancelled => 2,
            BookingStatus::Completed => 3,
        }
    }
}

/// Status filter exposed to customers in booking searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum CustomerBookingStatus {
    Confirmed,
    Cancelled,
    Completed,
}

impl TryFrom<u8> for CustomerBookingStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Confirmed),
            1 => Ok(Self::Cancelled),
            2 => Ok(Self::Completed),
            other => Err(format!("unknown customer booking status {other}")),
        }
    }
}

impl From<CustomerBookingStatus> for u8 {
    fn from(status: CustomerBookingStatus) -> Self {
        match status {
            CustomerBookingStatus::Confirmed => 0,
            CustomerBookingStatus::Cancelled => 1,
            CustomerBookingStatus::Completed => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl TryFrom<u8> for SortOrder {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Asc),
            1 => Ok(Self::Desc),
            other => Err(format!("unknown sort order {other}")),
        }
    }
}

impl From<SortOrder> for u8 {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Asc => 0,
            SortOrder::Desc => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub booking_id: u64,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub is_guest_booking: bool,
    pub price: f64,
    #[serde(default)]
    pub booking_date_time: String,
    pub pick_up_date_time: String,
    pub pick_up_address: String,
    #[serde(default)]
    pub pick_up_latitude: f64,
    #[serde(default)]
    pub pick_up_longitude: f64,
    #[serde(default)]
    pub first_stop_address: Option<String>,
    #[serde(default)]
    pub second_stop_address: Option<String>,
    pub drop_off_address: String,
    #[serde(default)]
    pub drop_off_latitude: f64,
    #[serde(default)]
    pub drop_off_longitude: f64,
    #[serde(default)]
    pub distance_km: f64,
    #[serde(default)]
    pub duration_minutes: f64,
    #[serde(default, rename = "flightnumber")]
    pub flight_number: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    pub status: BookingStatus,
    #[serde(default)]
    pub is_confirmed: bool,
    #[serde(default)]
    pub driver_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookingRequest {
    pub booking_id: u64,
    pub pick_up_date_time: String,
    pub pick_up_address: String,
    pub pick_up_latitude: f64,
    pub pick_up_longitude: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_stop_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_stop_latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_stop_longitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_stop_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_stop_latitude: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub second_stop_longitude: Option<f64>,
    pub drop_off_address: String,
    pub drop_off_latitude: f64,
    pub drop_off_longitude: f64,
    #[serde(rename = "flightnumber", skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Query for the paginated booking listings. Dates go out as `YYYY-MM-DD`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "iso_date::option")]
    pub from_date: Option<Date>,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "iso_date::option")]
    pub to_date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CustomerBookingStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upcoming_only: Option<bool>,
}

// =============================================================================
// ADMIN / PRICING / DRIVERS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxiSettings {
    pub id: u64,
    pub km_price: f64,
    pub minute_price: f64,
    pub start_price: f64,
    pub zone_price: f64,
    #[serde(default)]
    pub updated_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTaxiSettings {
    pub km_price: f64,
    pub minute_price: f64,
    pub start_price: f64,
    pub zone_price: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverSummary {
    pub driver_id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub car_license_plate: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDriverRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableDriver {
    pub driver_id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverInfo {
    pub driver_id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub profile_picture: String,
    #[serde(default)]
    pub car_id: Option<u64>,
    #[serde(default)]
    pub car_make: Option<String>,
    #[serde(default)]
    pub car_model: Option<String>,
    #[serde(default)]
    pub car_capacity: Option<u32>,
    #[serde(default)]
    pub car_type: Option<String>,
    #[serde(default)]
    pub car_license_plate: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDriverRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_make: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_capacity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub car_license_plate: Option<String>,
}

pub type UpdateDriverResponse = DriverInfo;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptRequest {
    pub booking_id: u64,
    pub customer_firstname: String,
    pub pickup_address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stops: Option<String>,
    pub destination: String,
    pub driver_firstname: String,
    pub license_plate: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub driver_image_url: Option<String>,
    pub pickup_time: String,
    pub distance_km: f64,
    pub duration_minutes: String,
    pub total_price: f64,
}

// =============================================================================
// MAP
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteRequest {
    pub input: String,
    pub session_token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteSuggestion {
    pub description: String,
    pub place_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteResponse {
    #[serde(default)]
    pub suggestions: Vec<AutocompleteSuggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceIdRequest {
    pub place_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}
