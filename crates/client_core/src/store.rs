//! Booking state store.
//!
//! The store owns the single [`BookingDraft`] of a wizard session. Readers only ever see a
//! shared reference; every mutation builds a complete replacement draft and swaps it in.

use std::fmt;

use chrono::{DateTime, Utc};
use shared::{domain::Table, protocol::CreateBookingRequest};

use crate::{
    error::StateError,
    validation::{self, MAX_SPECIAL_REQUESTS_LEN},
};

pub const DEFAULT_NUMBER_OF_GUESTS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Step {
    #[default]
    DateTime,
    Table,
    Contact,
    Confirmation,
}

impl Step {
    pub const ALL: [Step; 4] = [
        Step::DateTime,
        Step::Table,
        Step::Contact,
        Step::Confirmation,
    ];

    pub fn number(self) -> u8 {
        match self {
            Self::DateTime => 1,
            Self::Table => 2,
            Self::Contact => 3,
            Self::Confirmation => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|step| step.number() == number)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::DateTime => "Date & time",
            Self::Table => "Choose table",
            Self::Contact => "Contact details",
            Self::Confirmation => "Confirmation",
        }
    }

    /// The following step, saturating at [`Step::Confirmation`].
    pub fn next(self) -> Self {
        match self {
            Self::DateTime => Self::Table,
            Self::Table => Self::Contact,
            Self::Contact | Self::Confirmation => Self::Confirmation,
        }
    }

    /// The preceding step, saturating at [`Step::DateTime`].
    pub fn previous(self) -> Self {
        match self {
            Self::DateTime | Self::Table => Self::DateTime,
            Self::Contact => Self::Table,
            Self::Confirmation => Self::Contact,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.title())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingDraft {
    pub date: String,
    pub time: String,
    pub number_of_guests: u32,
    pub selected_table: Option<Table>,
    pub customer_name: String,
    pub phone_number: String,
    pub email: String,
    pub special_requests: String,
    pub current_step: Step,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for BookingDraft {
    fn default() -> Self {
        Self {
            date: String::new(),
            time: String::new(),
            number_of_guests: DEFAULT_NUMBER_OF_GUESTS,
            selected_table: None,
            customer_name: String::new(),
            phone_number: String::new(),
            email: String::new(),
            special_requests: String::new(),
            current_step: Step::DateTime,
            is_loading: false,
            error: None,
        }
    }
}

impl BookingDraft {
    /// Date and time combined into the instant sent to the API.
    pub fn booking_date_time(&self) -> Option<DateTime<Utc>> {
        validation::combine_date_time(&self.date, &self.time)
    }

    /// Builds the `POST /booking` payload with trimmed contact fields.
    pub fn booking_request(&self) -> Result<CreateBookingRequest, StateError> {
        let table = self
            .selected_table
            .as_ref()
            .ok_or(StateError::NoTableSelected)?;
        let booking_date_time = self
            .booking_date_time()
            .ok_or(StateError::MissingDateTime)?;

        Ok(CreateBookingRequest {
            table_id: table.id,
            booking_date_time,
            number_of_guests: self.number_of_guests,
            customer_name: self.customer_name.trim().to_string(),
            phone_number: self.phone_number.trim().to_string(),
            email: self.email.trim().to_string(),
            special_requests: self.special_requests.trim().to_string(),
        })
    }
}

/// Partial update merged into the draft by [`BookingStore::update`].
///
/// `None` leaves a field untouched. `selected_table: Some(None)` clears the selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftUpdate {
    pub date: Option<String>,
    pub time: Option<String>,
    pub number_of_guests: Option<u32>,
    pub selected_table: Option<Option<Table>>,
    pub customer_name: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub special_requests: Option<String>,
}

impl DraftUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn number_of_guests(mut self, number_of_guests: u32) -> Self {
        self.number_of_guests = Some(number_of_guests);
        self
    }

    pub fn selected_table(mut self, table: Option<Table>) -> Self {
        self.selected_table = Some(table);
        self
    }

    pub fn customer_name(mut self, name: impl Into<String>) -> Self {
        self.customer_name = Some(name.into());
        self
    }

    pub fn phone_number(mut self, phone: impl Into<String>) -> Self {
        self.phone_number = Some(phone.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn special_requests(mut self, text: impl Into<String>) -> Self {
        self.special_requests = Some(text.into());
        self
    }
}

#[derive(Debug, Default)]
pub struct BookingStore {
    draft: BookingDraft,
}

impl BookingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn current_step(&self) -> Step {
        self.draft.current_step
    }

    pub fn update(&mut self, update: DraftUpdate) {
        self.replace(|draft| BookingDraft {
            date: update.date.unwrap_or_else(|| draft.date.clone()),
            time: update.time.unwrap_or_else(|| draft.time.clone()),
            number_of_guests: update.number_of_guests.unwrap_or(draft.number_of_guests),
            selected_table: update
                .selected_table
                .unwrap_or_else(|| draft.selected_table.clone()),
            customer_name: update
                .customer_name
                .unwrap_or_else(|| draft.customer_name.clone()),
            phone_number: update
                .phone_number
                .unwrap_or_else(|| draft.phone_number.clone()),
            email: update.email.unwrap_or_else(|| draft.email.clone()),
            special_requests: update
                .special_requests
                .map(|text| truncate_chars(text, MAX_SPECIAL_REQUESTS_LEN))
                .unwrap_or_else(|| draft.special_requests.clone()),
            error: None,
            ..draft.clone()
        });
    }

    pub fn advance(&mut self) {
        self.replace(|draft| BookingDraft {
            current_step: draft.current_step.next(),
            error: None,
            ..draft.clone()
        });
    }

    pub fn retreat(&mut self) {
        self.replace(|draft| BookingDraft {
            current_step: draft.current_step.previous(),
            error: None,
            ..draft.clone()
        });
    }

    pub fn set_loading(&mut self, is_loading: bool) {
        self.replace(|draft| BookingDraft {
            is_loading,
            ..draft.clone()
        });
    }

    /// Records a failure and releases the loading flag.
    pub fn set_error(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.replace(|draft| BookingDraft {
            error: Some(message),
            is_loading: false,
            ..draft.clone()
        });
    }

    pub fn clear_error(&mut self) {
        self.replace(|draft| BookingDraft {
            error: None,
            ..draft.clone()
        });
    }

    pub fn reset(&mut self) {
        self.draft = BookingDraft::default();
    }

    pub fn is_current_step_valid(&self) -> bool {
        validation::is_step_valid(self.draft.current_step, &self.draft)
    }

    fn replace(&mut self, next: impl FnOnce(&BookingDraft) -> BookingDraft) {
        self.draft = next(&self.draft);
    }
}

fn truncate_chars(text: String, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text,
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
