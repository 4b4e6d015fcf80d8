//! Wizard controller: step dispatch, table loading and the submit-once booking flow.
//!
//! Network work is split into a synchronous `begin_*` call that hands out a ticket, the
//! gateway call itself, and an `apply_*`/`finish_*` call that consumes the ticket. Tickets
//! carry a generation number; results for a ticket that has been superseded (the user went
//! back, retried, or started over) are dropped instead of applied.

use chrono::{NaiveDate, Utc};
use shared::{
    domain::{Table, TableId},
    protocol::{CreateBookingRequest, CreatedBooking},
};
use tracing::{debug, info, warn};

use crate::{
    confirmation::{fallback_confirmation_id, ConfirmationResult},
    error::{GatewayError, StateError, ValidationError},
    store::{BookingDraft, BookingStore, DraftUpdate, Step},
    validation::{self, FieldErrors, ValidationResult},
    BookingGateway,
};

const MISSING_DETAILS_MESSAGE: &str =
    "Booking details are missing. Go back to the previous step.";

/// State of the available-tables list on step 2.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TableFetch {
    #[default]
    Idle,
    MissingDetails,
    Loading,
    Loaded(Vec<Table>),
    Failed(String),
}

impl TableFetch {
    pub fn tables(&self) -> &[Table] {
        match self {
            Self::Loaded(tables) => tables,
            _ => &[],
        }
    }
}

/// Submission of the booking on step 4.
///
/// `Submitting` and `Submitted` are the guard: no new request starts from them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Submission {
    #[default]
    NotSubmitted,
    Submitting,
    Submitted(ConfirmationResult),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFetchTicket {
    generation: u64,
    pub date: String,
    pub time: String,
    pub number_of_guests: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTicket {
    session: u64,
    pub request: CreateBookingRequest,
}

/// What the active step renders.
#[derive(Debug, Clone, Copy)]
pub enum StepView<'a> {
    DateTime {
        draft: &'a BookingDraft,
    },
    Table {
        draft: &'a BookingDraft,
        tables: &'a TableFetch,
    },
    Contact {
        draft: &'a BookingDraft,
    },
    Confirmation {
        draft: &'a BookingDraft,
        submission: &'a Submission,
    },
}

/// Controls the active step enables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Actions {
    pub go_back: bool,
    pub proceed: bool,
    pub select_table: bool,
    pub retry: bool,
    pub start_over: bool,
}

pub struct WizardController {
    store: BookingStore,
    tables: TableFetch,
    submission: Submission,
    fetch_generation: u64,
    session: u64,
    today: fn() -> NaiveDate,
}

impl Default for WizardController {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardController {
    pub fn new() -> Self {
        Self::with_calendar(validation::today)
    }

    /// Uses `today` instead of the local clock for the date-in-past check.
    pub fn with_calendar(today: fn() -> NaiveDate) -> Self {
        Self {
            store: BookingStore::new(),
            tables: TableFetch::Idle,
            submission: Submission::NotSubmitted,
            fetch_generation: 0,
            session: 0,
            today,
        }
    }

    pub fn draft(&self) -> &BookingDraft {
        self.store.draft()
    }

    pub fn step(&self) -> Step {
        self.store.current_step()
    }

    pub fn tables(&self) -> &TableFetch {
        &self.tables
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    pub fn view(&self) -> StepView<'_> {
        let draft = self.store.draft();
        match draft.current_step {
            Step::DateTime => StepView::DateTime { draft },
            Step::Table => StepView::Table {
                draft,
                tables: &self.tables,
            },
            Step::Contact => StepView::Contact { draft },
            Step::Confirmation => StepView::Confirmation {
                draft,
                submission: &self.submission,
            },
        }
    }

    pub fn actions(&self) -> Actions {
        let draft = self.store.draft();
        match draft.current_step {
            Step::DateTime => Actions {
                proceed: validation::is_step1_valid(draft),
                ..Actions::default()
            },
            Step::Table => match &self.tables {
                TableFetch::Loaded(tables) if !tables.is_empty() => Actions {
                    go_back: true,
                    proceed: validation::is_step2_valid(draft),
                    select_table: true,
                    ..Actions::default()
                },
                TableFetch::Failed(_) => Actions {
                    go_back: true,
                    retry: true,
                    ..Actions::default()
                },
                _ => Actions {
                    go_back: true,
                    ..Actions::default()
                },
            },
            Step::Contact => Actions {
                go_back: true,
                proceed: validation::is_step3_valid(draft),
                ..Actions::default()
            },
            Step::Confirmation => match &self.submission {
                Submission::Failed(_) => Actions {
                    retry: true,
                    start_over: true,
                    ..Actions::default()
                },
                Submission::Submitted(_) => Actions {
                    start_over: true,
                    ..Actions::default()
                },
                Submission::NotSubmitted | Submission::Submitting => Actions::default(),
            },
        }
    }

    // -------------------------------------------------------------------------
    // Step 1: date, time and party size
    // -------------------------------------------------------------------------

    /// Stores `date` and reports whether it passes live validation.
    ///
    /// The value is stored either way so the user can keep editing it.
    pub fn set_date(&mut self, date: impl Into<String>) -> ValidationResult<()> {
        let date = date.into();
        let check = live(&date, |value| validation::validate_date(value, (self.today)()));
        self.store.update(DraftUpdate::new().date(date));
        check
    }

    pub fn set_time(&mut self, time: impl Into<String>) -> ValidationResult<()> {
        let time = time.into();
        let check = live(&time, validation::validate_time);
        self.store.update(DraftUpdate::new().time(time));
        check
    }

    pub fn set_guests(&mut self, number_of_guests: u32) -> ValidationResult<()> {
        self.store
            .update(DraftUpdate::new().number_of_guests(number_of_guests));
        validation::validate_guests(number_of_guests)
    }

    pub fn submit_date_time(&mut self) -> Result<(), StateError> {
        self.expect_step(Step::DateTime)?;
        let errors = validation::validate_step1(self.store.draft(), (self.today)());
        if !errors.is_empty() {
            return Err(StateError::Rejected(errors));
        }
        if !validation::is_step1_valid(self.store.draft()) {
            return Err(StateError::StepIncomplete {
                step: Step::DateTime,
            });
        }
        self.enter_step(Step::Table);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Step 2: table selection
    // -------------------------------------------------------------------------

    /// Starts loading tables for the current draft.
    ///
    /// Returns `None` when date, time or guest count is missing; the step then only offers
    /// going back. Calling this again while a load is pending supersedes the pending one.
    pub fn begin_table_fetch(&mut self) -> Result<Option<TableFetchTicket>, StateError> {
        self.expect_step(Step::Table)?;
        self.fetch_generation += 1;

        let draft = self.store.draft();
        if draft.date.is_empty() || draft.time.is_empty() || draft.number_of_guests == 0 {
            warn!("table fetch skipped: booking details missing");
            self.tables = TableFetch::MissingDetails;
            self.store.set_error(MISSING_DETAILS_MESSAGE);
            return Ok(None);
        }

        let ticket = TableFetchTicket {
            generation: self.fetch_generation,
            date: draft.date.clone(),
            time: draft.time.clone(),
            number_of_guests: draft.number_of_guests,
        };
        self.tables = TableFetch::Loading;
        self.store.clear_error();
        self.store.set_loading(true);
        debug!(generation = ticket.generation, "table fetch started");
        Ok(Some(ticket))
    }

    /// Applies a finished table fetch. Returns `false` when the ticket was stale.
    pub fn apply_table_fetch(
        &mut self,
        ticket: TableFetchTicket,
        result: Result<Vec<Table>, GatewayError>,
    ) -> bool {
        if ticket.generation != self.fetch_generation || self.step() != Step::Table {
            debug!(
                generation = ticket.generation,
                current = self.fetch_generation,
                "discarding stale table fetch result"
            );
            return false;
        }

        match result {
            Ok(tables) => {
                let selection_gone = self
                    .store
                    .draft()
                    .selected_table
                    .as_ref()
                    .is_some_and(|selected| !tables.iter().any(|table| table.id == selected.id));
                if selection_gone {
                    self.store.update(DraftUpdate::new().selected_table(None));
                }
                info!(count = tables.len(), "tables available for selection");
                self.tables = TableFetch::Loaded(tables);
                self.store.set_loading(false);
            }
            Err(err) => {
                let message = table_fetch_message(&err);
                warn!(error = %err, "table fetch failed");
                self.tables = TableFetch::Failed(message.clone());
                self.store.set_error(message);
            }
        }
        true
    }

    /// Runs a whole table fetch against `gateway`.
    pub async fn load_tables<G>(&mut self, gateway: &G) -> Result<(), StateError>
    where
        G: BookingGateway + ?Sized,
    {
        let Some(ticket) = self.begin_table_fetch()? else {
            return Ok(());
        };
        let result = gateway
            .fetch_available_tables(&ticket.date, &ticket.time, ticket.number_of_guests)
            .await;
        self.apply_table_fetch(ticket, result);
        Ok(())
    }

    pub fn select_table(&mut self, table_id: TableId) -> Result<(), StateError> {
        self.expect_step(Step::Table)?;
        let table = self
            .tables
            .tables()
            .iter()
            .find(|table| table.id == table_id)
            .cloned()
            .ok_or(StateError::UnknownTable(table_id))?;
        self.store
            .update(DraftUpdate::new().selected_table(Some(table)));
        Ok(())
    }

    pub fn continue_from_table(&mut self) -> Result<(), StateError> {
        self.expect_step(Step::Table)?;
        if !validation::is_step2_valid(self.store.draft()) {
            return Err(StateError::StepIncomplete { step: Step::Table });
        }
        self.enter_step(Step::Contact);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Step 3: contact details
    // -------------------------------------------------------------------------

    pub fn set_customer_name(&mut self, name: impl Into<String>) -> ValidationResult<()> {
        let name = name.into();
        let check = live(&name, validation::validate_name);
        self.store.update(DraftUpdate::new().customer_name(name));
        check
    }

    /// Plain digit input is grouped as `ddd-ddd-dddd`; international formats are kept as typed.
    pub fn set_phone_number(&mut self, phone: impl Into<String>) -> ValidationResult<()> {
        let phone = phone.into();
        let phone = if is_plain_local_number(&phone) {
            validation::format_phone_number(&phone)
        } else {
            phone
        };
        let check = live(&phone, validation::validate_phone);
        self.store.update(DraftUpdate::new().phone_number(phone));
        check
    }

    pub fn set_email(&mut self, email: impl Into<String>) -> ValidationResult<()> {
        let email = email.into();
        let check = live(&email, validation::validate_email);
        self.store.update(DraftUpdate::new().email(email));
        check
    }

    /// Text past the length limit is cut off; the error still reports the overflow.
    pub fn set_special_requests(&mut self, text: impl Into<String>) -> ValidationResult<()> {
        let text = text.into();
        let check = validation::validate_special_requests(&text);
        self.store.update(DraftUpdate::new().special_requests(text));
        check
    }

    pub fn submit_contact(&mut self) -> Result<(), StateError> {
        self.expect_step(Step::Contact)?;
        let errors = validation::validate_step3(self.store.draft());
        if !errors.is_empty() {
            return Err(StateError::Rejected(errors));
        }
        if !validation::is_step3_valid(self.store.draft()) {
            return Err(StateError::StepIncomplete {
                step: Step::Contact,
            });
        }
        self.enter_step(Step::Confirmation);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Step 4: submission
    // -------------------------------------------------------------------------

    /// Claims the submission guard and builds the request payload.
    ///
    /// Returns `None` while a submission is in flight or after one succeeded, so repeated
    /// triggers never produce a second booking. From `Failed` a new attempt may start.
    pub fn begin_submission(&mut self) -> Result<Option<SubmissionTicket>, StateError> {
        self.expect_step(Step::Confirmation)?;
        match self.submission {
            Submission::Submitting | Submission::Submitted(_) => {
                debug!("submission already claimed, ignoring trigger");
                return Ok(None);
            }
            Submission::NotSubmitted | Submission::Failed(_) => {}
        }

        let request = self.store.draft().booking_request()?;
        self.submission = Submission::Submitting;
        self.store.clear_error();
        self.store.set_loading(true);
        info!(table_id = %request.table_id, number_of_guests = request.number_of_guests, "submitting booking");
        Ok(Some(SubmissionTicket {
            session: self.session,
            request,
        }))
    }

    /// Records the outcome of a submission. Returns `false` when the ticket was stale.
    pub fn finish_submission(
        &mut self,
        ticket: SubmissionTicket,
        result: Result<CreatedBooking, GatewayError>,
    ) -> bool {
        if ticket.session != self.session || self.submission != Submission::Submitting {
            debug!("discarding stale submission result");
            return false;
        }

        match result {
            Ok(created) => {
                let confirmation_id = created
                    .id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| fallback_confirmation_id(Utc::now()));
                self.store.set_loading(false);
                let result = ConfirmationResult::new(confirmation_id, self.store.draft().clone());
                info!(confirmation_id = result.confirmation_id(), "booking confirmed");
                self.submission = Submission::Submitted(result);
            }
            Err(err) => {
                let message = format!(
                    "Could not create the booking. Please try again. ({})",
                    describe(&err)
                );
                warn!(error = %err, retryable = err.is_retryable(), "booking submission failed");
                self.store.set_error(message.clone());
                self.submission = Submission::Failed(message);
            }
        }
        true
    }

    /// Submits the draft through `gateway` unless the guard is already held.
    pub async fn submit<G>(&mut self, gateway: &G) -> Result<(), StateError>
    where
        G: BookingGateway + ?Sized,
    {
        let Some(ticket) = self.begin_submission()? else {
            return Ok(());
        };
        let result = gateway.create_booking(&ticket.request).await;
        self.finish_submission(ticket, result);
        Ok(())
    }

    /// User-initiated retry after a failed submission.
    pub async fn retry_submission<G>(&mut self, gateway: &G) -> Result<(), StateError>
    where
        G: BookingGateway + ?Sized,
    {
        if !matches!(self.submission, Submission::Failed(_)) {
            return Err(StateError::NothingToRetry);
        }
        self.submit(gateway).await
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Back navigation, available from the table and contact steps only.
    pub fn go_back(&mut self) -> Result<(), StateError> {
        let step = self.step();
        match step {
            Step::Table | Step::Contact => {
                self.store.set_loading(false);
                self.enter_step(step.previous());
                Ok(())
            }
            Step::DateTime | Step::Confirmation => Err(StateError::BackNotAllowed { step }),
        }
    }

    /// Drops the draft and everything derived from it.
    pub fn start_over(&mut self) {
        info!("starting a new booking");
        self.store.reset();
        self.tables = TableFetch::Idle;
        self.submission = Submission::NotSubmitted;
        self.fetch_generation += 1;
        self.session += 1;
    }

    fn enter_step(&mut self, target: Step) {
        while self.step() < target {
            self.store.advance();
        }
        while self.step() > target {
            self.store.retreat();
        }
        // Step 2 reloads its list every time it is entered.
        self.tables = TableFetch::Idle;
        self.fetch_generation += 1;
        if target == Step::Confirmation {
            self.submission = Submission::NotSubmitted;
        }
        debug!(step = target.number(), "entered step");
    }

    fn expect_step(&self, expected: Step) -> Result<(), StateError> {
        let actual = self.step();
        if actual != expected {
            return Err(StateError::WrongStep { expected, actual });
        }
        Ok(())
    }
}

/// Live feedback is only given for non-empty input.
fn live(value: &str, check: impl FnOnce(&str) -> ValidationResult<()>) -> ValidationResult<()> {
    if value.is_empty() {
        Ok(())
    } else {
        check(value)
    }
}

fn is_plain_local_number(phone: &str) -> bool {
    let digits = phone.chars().filter(char::is_ascii_digit).count();
    digits > 0
        && digits <= 10
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || c == '-' || c.is_whitespace())
}

fn table_fetch_message(err: &GatewayError) -> String {
    match err {
        GatewayError::Connectivity { .. } => err.to_string(),
        _ => format!("Could not fetch available tables: {}", describe(err)),
    }
}

/// Prefers the server's problem-details summary over the raw error body.
fn describe(err: &GatewayError) -> String {
    let summary = err.problem().and_then(|problem| problem.summary());
    match (summary, err.status()) {
        (Some(summary), Some(status)) => format!("HTTP error {status}: {summary}"),
        _ => err.to_string(),
    }
}

/// Collected errors for a rejected step, for callers that only have a `StateError`.
pub fn rejected_fields(err: &StateError) -> Option<&FieldErrors> {
    match err {
        StateError::Rejected(errors) => Some(errors),
        _ => None,
    }
}

/// Message for a single live validation result, if any.
pub fn inline_message(result: &ValidationResult<()>) -> Option<String> {
    result.as_ref().err().map(ValidationError::to_string)
}

#[cfg(test)]
#[path = "tests/wizard_tests.rs"]
mod tests;
