use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use shared::{
    domain::Table,
    protocol::{AvailableTablesQuery, CreateBookingRequest, CreatedBooking},
};
use tracing::{debug, info, warn};

pub mod confirmation;
pub mod error;
pub mod store;
pub mod validation;
pub mod wizard;

pub use confirmation::{ConfirmationResult, ConfirmationView, StepIndicator};
pub use error::{GatewayError, StateError, ValidationError};
pub use store::{BookingDraft, BookingStore, DraftUpdate, Step};
pub use wizard::{
    Actions, StepView, Submission, SubmissionTicket, TableFetch, TableFetchTicket,
    WizardController,
};

pub const DEFAULT_API_URL: &str = "https://localhost:7135/api";

/// Fixed probe used by [`BookingClient::check_connection`].
const CONNECTION_PROBE_DATE_TIME: &str = "2024-12-15T12:00:00.000Z";

/// The two backend operations the wizard depends on.
///
/// Neither call retries or deduplicates; callers guard against repeats.
#[async_trait]
pub trait BookingGateway: Send + Sync {
    async fn fetch_available_tables(
        &self,
        date: &str,
        time: &str,
        number_of_guests: u32,
    ) -> Result<Vec<Table>, GatewayError>;

    async fn create_booking(
        &self,
        request: &CreateBookingRequest,
    ) -> Result<CreatedBooking, GatewayError>;
}

pub struct BookingClient {
    http: Client,
    api_url: String,
}

impl BookingClient {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self::with_http_client(Client::new(), api_url)
    }

    pub fn with_http_client(http: Client, api_url: impl Into<String>) -> Self {
        let api_url = api_url.into().trim_end_matches('/').to_string();
        Self { http, api_url }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Probes the availability endpoint; any transport or HTTP failure reports `false`.
    pub async fn check_connection(&self) -> bool {
        let query = AvailableTablesQuery {
            booking_date_time: CONNECTION_PROBE_DATE_TIME.to_string(),
            number_of_guests: 2,
        };
        let result = self
            .http
            .get(format!("{}/booking/available-tables", self.api_url))
            .header(header::CONTENT_TYPE, "application/json")
            .query(&query)
            .send()
            .await;

        match result {
            Ok(response) => {
                debug!(status = %response.status(), "connection probe answered");
                response.status().is_success()
            }
            Err(err) => {
                warn!(api_url = %self.api_url, error = %err, "connection probe failed");
                false
            }
        }
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|source| GatewayError::Connectivity {
                api_url: self.api_url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "booking API returned an error");
            return Err(GatewayError::Network {
                status: status.as_u16(),
                body,
            });
        }

        response.json::<T>().await.map_err(GatewayError::Decode)
    }
}

/// Formats the entered date and time as the `BookingDateTime` query value.
pub fn booking_date_time_param(date: &str, time: &str) -> Result<String, GatewayError> {
    validation::combine_date_time(date, time)
        .map(|instant| instant.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
        .ok_or_else(|| GatewayError::InvalidDateTime {
            date: date.to_string(),
            time: time.to_string(),
        })
}

#[async_trait]
impl BookingGateway for BookingClient {
    async fn fetch_available_tables(
        &self,
        date: &str,
        time: &str,
        number_of_guests: u32,
    ) -> Result<Vec<Table>, GatewayError> {
        let query = AvailableTablesQuery {
            booking_date_time: booking_date_time_param(date, time)?,
            number_of_guests,
        };
        let url = format!("{}/booking/available-tables", self.api_url);
        debug!(%url, booking_date_time = %query.booking_date_time, number_of_guests, "fetching available tables");

        let tables: Vec<Table> = self
            .send_json(
                self.http
                    .get(&url)
                    .header(header::CONTENT_TYPE, "application/json")
                    .query(&query),
            )
            .await?;
        info!(count = tables.len(), "available tables loaded");
        Ok(tables)
    }

    async fn create_booking(
        &self,
        request: &CreateBookingRequest,
    ) -> Result<CreatedBooking, GatewayError> {
        let url = format!("{}/booking", self.api_url);
        debug!(%url, table_id = %request.table_id, number_of_guests = request.number_of_guests, "creating booking");

        // `json` sets `Content-Type: application/json`.
        let created: CreatedBooking = self.send_json(self.http.post(&url).json(request)).await?;
        match &created.id {
            Some(id) => info!(booking_id = %id, "booking created"),
            None => warn!("booking created but the API returned no id"),
        }
        Ok(created)
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
