//! Step gating and field-level validation.
//!
//! Two families live here. The `is_step*_valid` predicates decide whether the wizard may
//! leave a step; they only check presence and the guest bound. The `validate_*` functions
//! give inline feedback while the user types and are re-run when a step is submitted.
//! The two are deliberately separate: a date in the past still passes `is_step1_valid`.

use std::{collections::BTreeMap, fmt};

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use shared::domain::Table;

use crate::{error::ValidationError, store::BookingDraft, store::Step};

pub type ValidationResult<T> = Result<T, ValidationError>;

pub const MIN_GUESTS: u32 = 1;
pub const MAX_GUESTS: u32 = 20;
pub const OPENING_HOUR: u32 = 10;
pub const LAST_SEATING_HOUR: u32 = 21;
pub const MIN_NAME_LEN: usize = 2;
pub const MAX_NAME_LEN: usize = 100;
pub const MIN_PHONE_LEN: usize = 8;
pub const MAX_PHONE_LEN: usize = 15;
pub const MAX_SPECIAL_REQUESTS_LEN: usize = 500;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Date,
    Time,
    NumberOfGuests,
    CustomerName,
    PhoneNumber,
    Email,
    SpecialRequests,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Date => "Date",
            Self::Time => "Time",
            Self::NumberOfGuests => "Number of guests",
            Self::CustomerName => "Name",
            Self::PhoneNumber => "Phone number",
            Self::Email => "Email address",
            Self::SpecialRequests => "Special requests",
        })
    }
}

/// Errors collected when a whole step is submitted, at most one per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, ValidationError>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, result: ValidationResult<()>) {
        if let Err(err) = result {
            self.0.insert(err.field(), err);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, field: Field) -> Option<&ValidationError> {
        self.0.get(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &ValidationError)> {
        self.0.iter().map(|(field, err)| (*field, err))
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.0.values().map(ToString::to_string).collect();
        f.write_str(&messages.join("; "))
    }
}

// =============================================================================
// Step gating
// =============================================================================

pub fn is_step1_valid(draft: &BookingDraft) -> bool {
    !draft.date.is_empty()
        && !draft.time.is_empty()
        && (MIN_GUESTS..=MAX_GUESTS).contains(&draft.number_of_guests)
}

pub fn is_step2_valid(draft: &BookingDraft) -> bool {
    draft.selected_table.is_some()
}

pub fn is_step3_valid(draft: &BookingDraft) -> bool {
    !draft.customer_name.trim().is_empty()
        && !draft.phone_number.trim().is_empty()
        && !draft.email.trim().is_empty()
        && draft.email.contains('@')
}

pub fn is_step_valid(step: Step, draft: &BookingDraft) -> bool {
    match step {
        Step::DateTime => is_step1_valid(draft),
        Step::Table => is_step2_valid(draft),
        Step::Contact => is_step3_valid(draft),
        Step::Confirmation => true,
    }
}

// =============================================================================
// Field validators
// =============================================================================

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(date: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()
}

/// Accepts `HH:MM` and `HH:MM:SS`.
pub fn parse_time(time: &str) -> Option<NaiveTime> {
    let time = time.trim();
    NaiveTime::parse_from_str(time, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M:%S"))
        .ok()
}

/// The entered wall-clock date and time, taken as UTC the way the booking API expects.
pub fn combine_date_time(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let date = parse_date(date)?;
    let time = parse_time(time)?;
    Some(NaiveDateTime::new(date, time).and_utc())
}

/// Rejects dates before `today`; the time of day plays no part.
pub fn validate_date(date: &str, today: NaiveDate) -> ValidationResult<()> {
    let parsed = parse_date(date).ok_or(ValidationError::InvalidFormat { field: Field::Date })?;
    if parsed < today {
        return Err(ValidationError::DateInPast);
    }
    Ok(())
}

/// Service hours are checked on the hour only, so any minute within 21:xx passes.
pub fn validate_time(time: &str) -> ValidationResult<()> {
    let hour = parse_time(time)
        .map(|parsed| parsed.hour())
        .ok_or(ValidationError::InvalidFormat { field: Field::Time })?;

    if hour < OPENING_HOUR {
        return Err(ValidationError::BeforeOpening);
    }
    if hour > LAST_SEATING_HOUR {
        return Err(ValidationError::AfterLastSeating);
    }
    Ok(())
}

pub fn validate_guests(number_of_guests: u32) -> ValidationResult<()> {
    if !(MIN_GUESTS..=MAX_GUESTS).contains(&number_of_guests) {
        return Err(ValidationError::GuestsOutOfRange {
            guests: number_of_guests,
        });
    }
    Ok(())
}

pub fn validate_name(name: &str) -> ValidationResult<()> {
    let len = name.trim().chars().count();
    if len < MIN_NAME_LEN {
        return Err(ValidationError::TooShort {
            field: Field::CustomerName,
            min: MIN_NAME_LEN,
        });
    }
    if len > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: Field::CustomerName,
            max: MAX_NAME_LEN,
        });
    }
    Ok(())
}

/// `local@domain.tld` with no whitespace and exactly one `@`.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    if email.is_empty() {
        return Err(ValidationError::Required {
            field: Field::Email,
        });
    }
    if !is_email_shaped(email) {
        return Err(ValidationError::InvalidFormat {
            field: Field::Email,
        });
    }
    Ok(())
}

fn is_email_shaped(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    domain
        .char_indices()
        .any(|(idx, c)| c == '.' && idx > 0 && idx + 1 < domain.len())
}

/// Whitespace is ignored; what remains must be 8 to 15 of `0-9 - + ( )`.
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    if phone.trim().is_empty() {
        return Err(ValidationError::Required {
            field: Field::PhoneNumber,
        });
    }

    let compact: String = phone.chars().filter(|c| !c.is_whitespace()).collect();
    let len = compact.chars().count();
    let allowed = compact
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '(' | ')'));

    if !allowed || !(MIN_PHONE_LEN..=MAX_PHONE_LEN).contains(&len) {
        return Err(ValidationError::InvalidFormat {
            field: Field::PhoneNumber,
        });
    }
    Ok(())
}

pub fn validate_special_requests(text: &str) -> ValidationResult<()> {
    if text.chars().count() > MAX_SPECIAL_REQUESTS_LEN {
        return Err(ValidationError::TooLong {
            field: Field::SpecialRequests,
            max: MAX_SPECIAL_REQUESTS_LEN,
        });
    }
    Ok(())
}

/// Groups the digits of `input` as `ddd-ddd-dddd`, dropping everything else.
///
/// Digits past the tenth are discarded.
pub fn format_phone_number(input: &str) -> String {
    let digits: String = input.chars().filter(char::is_ascii_digit).collect();
    match digits.len() {
        0..=3 => digits,
        4..=6 => format!("{}-{}", &digits[..3], &digits[3..]),
        7..=10 => format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..]),
        _ => format!("{}-{}-{}", &digits[..3], &digits[3..6], &digits[6..10]),
    }
}

// =============================================================================
// Whole-step validation
// =============================================================================

pub fn validate_step1(draft: &BookingDraft, today: NaiveDate) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if draft.date.is_empty() {
        errors.check(Err(ValidationError::Required { field: Field::Date }));
    } else {
        errors.check(validate_date(&draft.date, today));
    }

    if draft.time.is_empty() {
        errors.check(Err(ValidationError::Required { field: Field::Time }));
    } else {
        errors.check(validate_time(&draft.time));
    }

    errors.check(validate_guests(draft.number_of_guests));
    errors
}

pub fn validate_step3(draft: &BookingDraft) -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.check(validate_name(&draft.customer_name));
    errors.check(validate_email(&draft.email));
    errors.check(validate_phone(&draft.phone_number));
    errors.check(validate_special_requests(&draft.special_requests));
    errors
}

// =============================================================================
// Helpers for the input views
// =============================================================================

/// Seating slots every half hour from opening until the last seating.
pub fn time_slots() -> Vec<String> {
    (OPENING_HOUR..=LAST_SEATING_HOUR)
        .flat_map(|hour| {
            let half = (hour < LAST_SEATING_HOUR).then(|| format!("{hour:02}:30"));
            std::iter::once(format!("{hour:02}:00")).chain(half)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFit {
    Perfect,
    Roomy,
    Standard,
}

impl TableFit {
    pub fn for_party(table: &Table, number_of_guests: u32) -> Self {
        if table.capacity == number_of_guests {
            Self::Perfect
        } else if table.capacity >= number_of_guests.saturating_add(2) {
            Self::Roomy
        } else {
            Self::Standard
        }
    }

    pub fn label(self) -> Option<&'static str> {
        match self {
            Self::Perfect => Some("perfect size"),
            Self::Roomy => Some("extra room"),
            Self::Standard => None,
        }
    }
}

#[cfg(test)]
#[path = "tests/validation_tests.rs"]
mod tests;
