use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{BookingReference, TableId};

/// Query parameters of `GET /booking/available-tables`.
///
/// Field names follow the backend's PascalCase binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AvailableTablesQuery {
    pub booking_date_time: String,
    pub number_of_guests: u32,
}

/// Body of `POST /booking`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub table_id: TableId,
    pub booking_date_time: DateTime<Utc>,
    pub number_of_guests: u32,
    pub customer_name: String,
    pub phone_number: String,
    pub email: String,
    pub special_requests: String,
}

/// Response of `POST /booking`.
///
/// Only `id` is relied upon; everything else the server echoes back is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedBooking {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<BookingReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<TableId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub booking_date_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_guests: Option<u32>,
}
