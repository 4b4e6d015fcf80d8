use super::*;
use shared::domain::{Table, TableId};

fn confirmed_draft() -> BookingDraft {
    BookingDraft {
        date: "2026-10-19".to_string(),
        time: "18:30".to_string(),
        number_of_guests: 4,
        selected_table: Some(Table {
            id: TableId(3),
            table_number: 12,
            capacity: 4,
        }),
        customer_name: "Anna Svensson".to_string(),
        phone_number: "070-123-4567".to_string(),
        email: "anna@example.se".to_string(),
        special_requests: String::new(),
        current_step: Step::Confirmation,
        ..BookingDraft::default()
    }
}

#[test]
fn view_formats_date_time_and_party() {
    let result = ConfirmationResult::new("42", confirmed_draft());
    let view = ConfirmationView::from_result(&result);

    assert_eq!(view.confirmation_id, "42");
    assert_eq!(view.weekday, "Monday");
    assert_eq!(view.date, "19 October 2026");
    assert_eq!(view.time_range, "18:30 - 20:30");
    assert_eq!(view.table, "Table 12");
    assert_eq!(view.guests, "4 people");
    assert_eq!(view.special_requests, None);
}

#[test]
fn rendered_text_lists_contact_and_special_requests() {
    let draft = BookingDraft {
        special_requests: "  Nut allergy ".to_string(),
        ..confirmed_draft()
    };
    let text = ConfirmationView::from_result(&ConfirmationResult::new("BK1", draft)).to_string();

    assert!(text.contains("Confirmation number: #BK1"));
    assert!(text.contains("Table 12, 4 people"));
    assert!(text.contains("Anna Svensson"));
    assert!(text.contains("anna@example.se"));
    assert!(text.contains("070-123-4567"));
    assert!(text.contains("Special requests: Nut allergy"));
}

#[test]
fn time_range_adds_two_hours_keeping_minutes() {
    assert_eq!(time_range("12:00"), "12:00 - 14:00");
    assert_eq!(time_range("21:30"), "21:30 - 23:30");
    assert_eq!(time_range("12:15:00"), "12:15:00 - 14:15");
    assert_eq!(time_range("later"), "later");
}

#[test]
fn time_range_keeps_out_of_range_input_verbatim() {
    assert_eq!(time_range("4294967295:00"), "4294967295:00");
    assert_eq!(time_range("25:00"), "25:00");
    assert_eq!(time_range("21:99"), "21:99");

    let draft = BookingDraft {
        time: "4294967295:00".to_string(),
        ..BookingDraft::default()
    };
    assert!(booking_summary(&draft).contains("Time:   4294967295:00"));
}

#[test]
fn guests_label_pluralizes() {
    assert_eq!(guests_label(1), "1 person");
    assert_eq!(guests_label(2), "2 people");
}

#[test]
fn unparseable_date_is_shown_verbatim() {
    assert_eq!(
        date_parts("someday"),
        (String::new(), "someday".to_string())
    );
}

#[test]
fn fallback_id_uses_timestamp_millis() {
    let now = "2026-10-18T10:00:00Z"
        .parse::<DateTime<Utc>>()
        .expect("timestamp");
    assert_eq!(fallback_confirmation_id(now), "BK1792317600000");
}

#[test]
fn summary_includes_selected_table() {
    let summary = booking_summary(&confirmed_draft());
    assert!(summary.contains("Monday 19 October 2026"));
    assert!(summary.contains("18:30 - 20:30"));
    assert!(summary.contains("4 people"));
    assert!(summary.contains("Table:  12 (seats 4)"));

    let empty = booking_summary(&BookingDraft::default());
    assert_eq!(empty, "Guests: 2 people");
}

#[test]
fn step_indicator_marks_done_and_current_steps() {
    let text = StepIndicator(Step::Contact).to_string();
    assert_eq!(
        text,
        "[✓ Date & time] - [✓ Choose table] - [3 Contact details]* - [4 Confirmation]"
    );
}
