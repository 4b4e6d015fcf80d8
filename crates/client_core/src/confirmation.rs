//! Read-only formatting of bookings for display.

use std::fmt;

use chrono::{DateTime, Timelike, Utc};

use crate::{
    store::{BookingDraft, Step},
    validation,
};

/// Hours a seating lasts; the displayed end time is the start plus this.
pub const SEATING_HOURS: u32 = 2;

/// A booking the server accepted, frozen at the moment of acceptance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationResult {
    confirmation_id: String,
    booking: BookingDraft,
}

impl ConfirmationResult {
    pub fn new(confirmation_id: impl Into<String>, booking: BookingDraft) -> Self {
        Self {
            confirmation_id: confirmation_id.into(),
            booking,
        }
    }

    pub fn confirmation_id(&self) -> &str {
        &self.confirmation_id
    }

    pub fn booking(&self) -> &BookingDraft {
        &self.booking
    }
}

/// Local confirmation number used when the API does not return an id.
pub fn fallback_confirmation_id(now: DateTime<Utc>) -> String {
    format!("BK{}", now.timestamp_millis())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationView {
    pub confirmation_id: String,
    pub weekday: String,
    pub date: String,
    pub time_range: String,
    pub table: String,
    pub guests: String,
    pub customer_name: String,
    pub email: String,
    pub phone_number: String,
    pub special_requests: Option<String>,
}

impl ConfirmationView {
    pub fn from_result(result: &ConfirmationResult) -> Self {
        let booking = result.booking();
        let (weekday, date) = date_parts(&booking.date);
        let special_requests = Some(booking.special_requests.trim())
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        Self {
            confirmation_id: result.confirmation_id().to_string(),
            weekday,
            date,
            time_range: time_range(&booking.time),
            table: table_label(booking),
            guests: guests_label(booking.number_of_guests),
            customer_name: booking.customer_name.trim().to_string(),
            email: booking.email.trim().to_string(),
            phone_number: booking.phone_number.trim().to_string(),
            special_requests,
        }
    }
}

impl fmt::Display for ConfirmationView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Booking confirmed!")?;
        writeln!(f, "Confirmation number: #{}", self.confirmation_id)?;
        writeln!(f)?;
        if !self.weekday.is_empty() {
            writeln!(f, "  {}", self.weekday)?;
        }
        writeln!(f, "  {}", self.date)?;
        writeln!(f, "  {}", self.time_range)?;
        writeln!(f, "  {}, {}", self.table, self.guests)?;
        writeln!(f, "  {}", self.customer_name)?;
        writeln!(f, "  {}", self.email)?;
        writeln!(f, "  {}", self.phone_number)?;
        if let Some(requests) = &self.special_requests {
            writeln!(f, "  Special requests: {requests}")?;
        }
        writeln!(f)?;
        writeln!(f, "The table is held for {SEATING_HOURS} hours from the booked time.")?;
        write!(f, "Tables may be released after 15 minutes of delay.")
    }
}

/// `("Monday", "19 October 2026")`; unparseable dates come back verbatim with no weekday.
pub fn date_parts(date: &str) -> (String, String) {
    match validation::parse_date(date) {
        Some(parsed) => (
            parsed.format("%A").to_string(),
            parsed.format("%-d %B %Y").to_string(),
        ),
        None => (String::new(), date.to_string()),
    }
}

/// `"12:00 - 14:00"`: same minute, hour plus the seating length.
///
/// Anything that is not a valid time of day comes back verbatim.
pub fn time_range(time: &str) -> String {
    let time = time.trim();
    match validation::parse_time(time) {
        Some(start) => format!(
            "{time} - {}:{:02}",
            start.hour() + SEATING_HOURS,
            start.minute()
        ),
        None => time.to_string(),
    }
}

pub fn guests_label(number_of_guests: u32) -> String {
    if number_of_guests == 1 {
        "1 person".to_string()
    } else {
        format!("{number_of_guests} people")
    }
}

fn table_label(booking: &BookingDraft) -> String {
    match &booking.selected_table {
        Some(table) => format!("Table {}", table.table_number),
        None => "No table".to_string(),
    }
}

/// Running summary shown while the booking is still being filled in.
pub fn booking_summary(draft: &BookingDraft) -> String {
    let mut lines = Vec::new();
    if !draft.date.is_empty() {
        let (weekday, date) = date_parts(&draft.date);
        if weekday.is_empty() {
            lines.push(format!("Date:   {date}"));
        } else {
            lines.push(format!("Date:   {weekday} {date}"));
        }
    }
    if !draft.time.is_empty() {
        lines.push(format!("Time:   {}", time_range(&draft.time)));
    }
    lines.push(format!("Guests: {}", guests_label(draft.number_of_guests)));
    if let Some(table) = &draft.selected_table {
        lines.push(format!(
            "Table:  {} (seats {})",
            table.table_number, table.capacity
        ));
    }
    lines.join("\n")
}

/// Progress bar across the four steps, marking finished ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepIndicator(pub Step);

impl fmt::Display for StepIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.0;
        let parts: Vec<String> = Step::ALL
            .into_iter()
            .map(|step| {
                if step < current {
                    format!("[✓ {}]", step.title())
                } else if step == current {
                    format!("[{} {}]*", step.number(), step.title())
                } else {
                    format!("[{} {}]", step.number(), step.title())
                }
            })
            .collect();
        f.write_str(&parts.join(" - "))
    }
}

#[cfg(test)]
#[path = "tests/confirmation_tests.rs"]
mod tests;
