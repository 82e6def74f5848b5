//! Address autocomplete and geocoding.
//!
//! Autocomplete calls that belong to one typing session share a session
//! token so the upstream places provider bills them as one. [`MapSession`]
//! holds that token until a place is resolved.

#[cfg(test)]
#[path = "map_test.rs"]
mod map_test;

use uuid::Uuid;

use crate::error::ApiError;
use crate::net::gateway::ApiGateway;
use crate::net::http::PendingRequest;
use crate::net::types::{ApiResponse, AutocompleteRequest, AutocompleteResponse, Coordinate, PlaceIdRequest};

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn autocomplete(
    gateway: &ApiGateway,
    request: &AutocompleteRequest,
) -> Result<ApiResponse<AutocompleteResponse>, ApiError> {
    gateway.call_with(PendingRequest::post("api/Map/AutoComplete"), request).await
}

/// # Errors
///
/// Returns the classified [`ApiError`] of the call.
pub async fn coordinates(gateway: &ApiGateway, request: &PlaceIdRequest) -> Result<ApiResponse<Coordinate>, ApiError> {
    gateway.call(PendingRequest::get("/api/Map/GetLongNLat").query(request)?).await
}

/// One address-entry session: suggestions while typing, then a lookup.
#[derive(Debug, Clone)]
pub struct MapSession {
    token: Uuid,
}

impl Default for MapSession {
    fn default() -> Self {
        Self::new()
    }
}

impl MapSession {
    #[must_use]
    pub fn new() -> Self {
        Self { token: Uuid::new_v4() }
    }

    #[must_use]
    pub fn token(&self) -> String {
        self.token.to_string()
    }

    /// # Errors
    ///
    /// Returns the classified [`ApiError`] of the call.
    pub async fn suggest(&self, gateway: &ApiGateway, input: &str) -> Result<ApiResponse<AutocompleteResponse>, ApiError> {
        autocomplete(gateway, &AutocompleteRequest { input: input.to_owned(), session_token: self.token() }).await
    }

    /// Resolve the chosen place. Ends the session; the next one gets a fresh token.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] of the call.
    pub async fn resolve(&mut self, gateway: &ApiGateway, place_id: &str) -> Result<ApiResponse<Coordinate>, ApiError> {
        let request = PlaceIdRequest { place_id: place_id.to_owned(), session_token: Some(self.token()) };
        let result = coordinates(gateway, &request).await;
        self.token = Uuid::new_v4();
        result
    }
}
