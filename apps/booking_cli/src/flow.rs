//! Terminal front-end for the booking wizard.
//!
//! Every prompt accepts `q` to quit; end of input quits as well. Pressing Enter keeps the
//! value already entered.

use std::io::{BufRead, Write};

use anyhow::{bail, Result};
use client_core::{
    confirmation::booking_summary,
    validation::{self, TableFit, MAX_GUESTS, MIN_GUESTS},
    wizard::{inline_message, rejected_fields},
    BookingGateway, ConfirmationView, StateError, Step, StepIndicator, Submission, TableFetch,
    WizardController,
};
use shared::domain::Table;
use tracing::debug;

const RESTAURANT_PHONE: &str = "070-123 45 67";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    fn say(&mut self, text: impl AsRef<str>) -> Result<()> {
        writeln!(self.output, "{}", text.as_ref())?;
        Ok(())
    }

    fn warn(&mut self, text: impl AsRef<str>) -> Result<()> {
        writeln!(self.output, "  ! {}", text.as_ref())?;
        Ok(())
    }

    /// `None` on end of input or `q`; an empty line yields `current`.
    fn ask(&mut self, label: &str, current: &str) -> Result<Option<String>> {
        if current.is_empty() {
            write!(self.output, "{label}: ")?;
        } else {
            write!(self.output, "{label} [{current}]: ")?;
        }
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line.eq_ignore_ascii_case("q") {
            return Ok(None);
        }
        if line.is_empty() {
            return Ok(Some(current.to_string()));
        }
        Ok(Some(line.to_string()))
    }

    fn report(&mut self, err: &StateError) -> Result<()> {
        match rejected_fields(err) {
            Some(fields) => {
                for (_, error) in fields.iter() {
                    self.warn(error.to_string())?;
                }
                Ok(())
            }
            None => self.warn(err.to_string()),
        }
    }
}

/// Drives `wizard` until the user quits or input runs out.
pub async fn run<G, R, W>(
    gateway: &G,
    wizard: &mut WizardController,
    input: R,
    output: W,
) -> Result<()>
where
    G: BookingGateway + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut term = Terminal { input, output };
    term.say("Book a table")?;

    loop {
        term.say("")?;
        term.say(StepIndicator(wizard.step()).to_string())?;
        let flow = match wizard.step() {
            Step::DateTime => date_time_step(&mut term, wizard)?,
            Step::Table => table_step(&mut term, wizard, gateway).await?,
            Step::Contact => contact_step(&mut term, wizard)?,
            Step::Confirmation => confirmation_step(&mut term, wizard, gateway).await?,
        };
        if flow == Flow::Quit {
            debug!(step = wizard.step().number(), "wizard closed");
            term.say("Goodbye.")?;
            return Ok(());
        }
    }
}

fn date_time_step<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    wizard: &mut WizardController,
) -> Result<Flow> {
    term.say(booking_summary(wizard.draft()))?;

    let Some(date) = term.ask("Date (YYYY-MM-DD)", &wizard.draft().date.clone())? else {
        return Ok(Flow::Quit);
    };
    if let Some(message) = inline_message(&wizard.set_date(date)) {
        term.warn(message)?;
    }

    let slots = validation::time_slots();
    term.say(format!("Seating times: {}", slots.join(" ")))?;
    let Some(time) = term.ask("Time (HH:MM)", &wizard.draft().time.clone())? else {
        return Ok(Flow::Quit);
    };
    if let Some(message) = inline_message(&wizard.set_time(time)) {
        term.warn(message)?;
    }

    loop {
        let current = wizard.draft().number_of_guests.to_string();
        let Some(raw) = term.ask(&format!("Guests ({MIN_GUESTS}-{MAX_GUESTS})"), &current)? else {
            return Ok(Flow::Quit);
        };
        match raw.parse::<u32>() {
            Ok(guests) => {
                if let Some(message) = inline_message(&wizard.set_guests(guests)) {
                    term.warn(message)?;
                }
                break;
            }
            Err(_) => term.warn("Enter the number of guests as a whole number")?,
        }
    }

    if let Err(err) = wizard.submit_date_time() {
        term.report(&err)?;
    }
    Ok(Flow::Continue)
}

async fn table_step<G, R, W>(
    term: &mut Terminal<R, W>,
    wizard: &mut WizardController,
    gateway: &G,
) -> Result<Flow>
where
    G: BookingGateway + ?Sized,
    R: BufRead,
    W: Write,
{
    term.say(booking_summary(wizard.draft()))?;
    term.say("Looking for free tables...")?;
    wizard.load_tables(gateway).await?;

    loop {
        match wizard.tables().clone() {
            TableFetch::Loaded(tables) if !tables.is_empty() => {
                let guests = wizard.draft().number_of_guests;
                let selected = wizard.draft().selected_table.as_ref().map(|t| t.id);
                term.say("Available tables:")?;
                for (index, table) in tables.iter().enumerate() {
                    let marker = if selected == Some(table.id) { " (selected)" } else { "" };
                    term.say(format!("  {}. {}{marker}", index + 1, table_line(table, guests)))?;
                }

                let Some(choice) = term.ask("Table (number from the list, b to go back)", "")?
                else {
                    return Ok(Flow::Quit);
                };
                if choice.eq_ignore_ascii_case("b") {
                    wizard.go_back()?;
                    return Ok(Flow::Continue);
                }
                if choice.is_empty() && wizard.actions().proceed {
                    wizard.continue_from_table()?;
                    return Ok(Flow::Continue);
                }
                match choice
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|index| tables.get(index))
                {
                    Some(table) => {
                        wizard.select_table(table.id)?;
                        wizard.continue_from_table()?;
                        return Ok(Flow::Continue);
                    }
                    None => term.warn(format!("Pick a table between 1 and {}", tables.len()))?,
                }
            }
            TableFetch::Failed(message) => {
                term.warn(message)?;
                let Some(choice) = term.ask("r to retry, b to go back", "")? else {
                    return Ok(Flow::Quit);
                };
                if choice.eq_ignore_ascii_case("r") {
                    wizard.load_tables(gateway).await?;
                } else if choice.eq_ignore_ascii_case("b") {
                    wizard.go_back()?;
                    return Ok(Flow::Continue);
                }
            }
            other => {
                if matches!(other, TableFetch::Loaded(_)) {
                    term.warn(
                        "No tables are free for this time and party size. Go back and pick another time.",
                    )?;
                } else if let Some(error) = wizard.draft().error.clone() {
                    term.warn(error)?;
                }
                let Some(choice) = term.ask("b to go back", "")? else {
                    return Ok(Flow::Quit);
                };
                if choice.eq_ignore_ascii_case("b") {
                    wizard.go_back()?;
                    return Ok(Flow::Continue);
                }
            }
        }
    }
}

fn table_line(table: &Table, number_of_guests: u32) -> String {
    let line = format!("Table {} - seats {}", table.table_number, table.capacity);
    match TableFit::for_party(table, number_of_guests).label() {
        Some(label) => format!("{line} ({label})"),
        None => line,
    }
}

fn contact_step<R: BufRead, W: Write>(
    term: &mut Terminal<R, W>,
    wizard: &mut WizardController,
) -> Result<Flow> {
    term.say(booking_summary(wizard.draft()))?;

    let Some(name) = term.ask("Name", &wizard.draft().customer_name.clone())? else {
        return Ok(Flow::Quit);
    };
    if let Some(message) = inline_message(&wizard.set_customer_name(name)) {
        term.warn(message)?;
    }

    let Some(phone) = term.ask("Phone", &wizard.draft().phone_number.clone())? else {
        return Ok(Flow::Quit);
    };
    if let Some(message) = inline_message(&wizard.set_phone_number(phone)) {
        term.warn(message)?;
    }

    let Some(email) = term.ask("Email", &wizard.draft().email.clone())? else {
        return Ok(Flow::Quit);
    };
    if let Some(message) = inline_message(&wizard.set_email(email)) {
        term.warn(message)?;
    }

    let Some(requests) = term.ask(
        "Special requests (optional)",
        &wizard.draft().special_requests.clone(),
    )?
    else {
        return Ok(Flow::Quit);
    };
    if let Some(message) = inline_message(&wizard.set_special_requests(requests)) {
        term.warn(message)?;
    }

    let Some(next) = term.ask("Enter to review and book, b to go back", "")? else {
        return Ok(Flow::Quit);
    };
    if next.eq_ignore_ascii_case("b") {
        wizard.go_back()?;
        return Ok(Flow::Continue);
    }
    if let Err(err) = wizard.submit_contact() {
        term.report(&err)?;
    }
    Ok(Flow::Continue)
}

async fn confirmation_step<G, R, W>(
    term: &mut Terminal<R, W>,
    wizard: &mut WizardController,
    gateway: &G,
) -> Result<Flow>
where
    G: BookingGateway + ?Sized,
    R: BufRead,
    W: Write,
{
    match wizard.submission().clone() {
        Submission::NotSubmitted => {
            term.say(booking_summary(wizard.draft()))?;
            term.say("Sending your booking...")?;
            wizard.submit(gateway).await?;
            Ok(Flow::Continue)
        }
        Submission::Submitting => bail!("booking submission did not finish"),
        Submission::Submitted(result) => {
            term.say(ConfirmationView::from_result(&result).to_string())?;
            let Some(choice) = term.ask("n for a new booking, q to quit", "")? else {
                return Ok(Flow::Quit);
            };
            if choice.eq_ignore_ascii_case("n") {
                wizard.start_over();
                return Ok(Flow::Continue);
            }
            Ok(Flow::Quit)
        }
        Submission::Failed(message) => {
            term.warn(message)?;
            term.say(format!(
                "If the problem persists, call the restaurant on {RESTAURANT_PHONE}."
            ))?;
            let Some(choice) = term.ask("r to retry, n to start over", "")? else {
                return Ok(Flow::Quit);
            };
            if choice.eq_ignore_ascii_case("r") {
                wizard.retry_submission(gateway).await?;
            } else if choice.eq_ignore_ascii_case("n") {
                wizard.start_over();
            }
            Ok(Flow::Continue)
        }
    }
}

#[cfg(test)]
#[path = "tests/flow_tests.rs"]
mod tests;
