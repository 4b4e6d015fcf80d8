//! Error taxonomy for the booking client.
//!
//! Validation errors stay inside the step that produced them, gateway errors come out of
//! the HTTP layer, and state errors mark wizard transitions that are not allowed.

use shared::{domain::TableId, error::ApiError};
use thiserror::Error;

use crate::{
    store::Step,
    validation::{Field, FieldErrors},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} is required")]
    Required { field: Field },
    #[error("{field} is not valid")]
    InvalidFormat { field: Field },
    #[error("Date must be today or later")]
    DateInPast,
    #[error("The restaurant opens at 10:00")]
    BeforeOpening,
    #[error("Last seating is at 21:00")]
    AfterLastSeating,
    #[error("Number of guests must be between 1 and 20 (got {guests})")]
    GuestsOutOfRange { guests: u32 },
    #[error("{field} must be at least {min} characters")]
    TooShort { field: Field, min: usize },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: Field, max: usize },
}

impl ValidationError {
    pub fn field(&self) -> Field {
        match self {
            Self::Required { field }
            | Self::InvalidFormat { field }
            | Self::TooShort { field, .. }
            | Self::TooLong { field, .. } => *field,
            Self::DateInPast => Field::Date,
            Self::BeforeOpening | Self::AfterLastSeating => Field::Time,
            Self::GuestsOutOfRange { .. } => Field::NumberOfGuests,
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Could not connect to the booking server at {api_url}. Check that the API is running and try again.")]
    Connectivity {
        api_url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP error {status}: {body}")]
    Network { status: u16, body: String },
    #[error("unexpected response from the booking server: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("invalid booking date/time '{date} {time}'")]
    InvalidDateTime { date: String, time: String },
}

impl GatewayError {
    /// Whether repeating the same request can succeed without changing the input.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidDateTime { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Network { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Problem details decoded from a non-success body, when the server sent JSON.
    pub fn problem(&self) -> Option<ApiError> {
        match self {
            Self::Network { body, .. } => ApiError::from_body(body),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("{step} is not complete")]
    StepIncomplete { step: Step },
    #[error("{0}")]
    Rejected(FieldErrors),
    #[error("this action belongs to {expected}, but the wizard is on {actual}")]
    WrongStep { expected: Step, actual: Step },
    #[error("cannot go back from {step}")]
    BackNotAllowed { step: Step },
    #[error("table {0} is not in the list of available tables")]
    UnknownTable(TableId),
    #[error("no table selected")]
    NoTableSelected,
    #[error("booking date and time are missing or invalid")]
    MissingDateTime,
    #[error("there is no failed booking to retry")]
    NothingToRetry,
}
