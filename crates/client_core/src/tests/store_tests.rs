use super::*;
use shared::domain::TableId;

fn table(id: i64, table_number: i64, capacity: u32) -> Table {
    Table {
        id: TableId(id),
        table_number,
        capacity,
    }
}

fn filled_store() -> BookingStore {
    let mut store = BookingStore::new();
    store.update(
        DraftUpdate::new()
            .date("2026-10-19")
            .time("12:00")
            .number_of_guests(4)
            .selected_table(Some(table(3, 12, 4)))
            .customer_name("  Anna Svensson ")
            .phone_number("070-123-4567 ")
            .email(" anna@example.se")
            .special_requests("Window seat"),
    );
    store
}

#[test]
fn new_store_holds_default_draft() {
    let store = BookingStore::new();
    let draft = store.draft();
    assert_eq!(draft.current_step, Step::DateTime);
    assert_eq!(draft.number_of_guests, 2);
    assert!(draft.date.is_empty());
    assert!(draft.time.is_empty());
    assert!(draft.selected_table.is_none());
    assert!(draft.customer_name.is_empty());
    assert!(!draft.is_loading);
    assert!(draft.error.is_none());
}

#[test]
fn update_merges_only_given_fields_and_clears_error() {
    let mut store = BookingStore::new();
    store.update(DraftUpdate::new().date("2026-10-19"));
    store.set_error("boom");

    store.update(DraftUpdate::new().time("18:30"));

    let draft = store.draft();
    assert_eq!(draft.date, "2026-10-19");
    assert_eq!(draft.time, "18:30");
    assert_eq!(draft.number_of_guests, 2);
    assert!(draft.error.is_none());
}

#[test]
fn update_can_clear_selected_table() {
    let mut store = filled_store();
    store.update(DraftUpdate::new().selected_table(None));
    assert!(store.draft().selected_table.is_none());
}

#[test]
fn update_truncates_special_requests_to_limit() {
    let mut store = BookingStore::new();
    store.update(DraftUpdate::new().special_requests("å".repeat(600)));
    assert_eq!(store.draft().special_requests.chars().count(), 500);
}

#[test]
fn advance_never_passes_confirmation() {
    for start in Step::ALL {
        let mut store = BookingStore::new();
        while store.current_step() < start {
            store.advance();
        }
        for _ in 0..6 {
            store.advance();
            assert!(store.current_step().number() <= 4);
        }
        assert_eq!(store.current_step(), Step::Confirmation);
    }
}

#[test]
fn retreat_never_goes_below_first_step() {
    for start in Step::ALL {
        let mut store = BookingStore::new();
        while store.current_step() < start {
            store.advance();
        }
        for _ in 0..6 {
            store.retreat();
            assert!(store.current_step().number() >= 1);
        }
        assert_eq!(store.current_step(), Step::DateTime);
    }
}

#[test]
fn navigation_clears_error() {
    let mut store = BookingStore::new();
    store.set_error("first");
    store.advance();
    assert!(store.draft().error.is_none());

    store.set_error("second");
    store.retreat();
    assert!(store.draft().error.is_none());
}

#[test]
fn set_error_releases_loading_flag() {
    let mut store = BookingStore::new();
    store.set_loading(true);
    assert!(store.draft().is_loading);

    store.set_error("server down");
    assert!(!store.draft().is_loading);
    assert_eq!(store.draft().error.as_deref(), Some("server down"));

    store.clear_error();
    assert!(store.draft().error.is_none());
}

#[test]
fn reset_restores_defaults_from_any_state() {
    let mut store = filled_store();
    store.advance();
    store.advance();
    store.set_loading(true);
    store.set_error("late failure");

    store.reset();

    assert_eq!(store.draft(), &BookingDraft::default());
}

#[test]
fn booking_request_trims_contact_fields() {
    let store = filled_store();
    let request = store.draft().booking_request().expect("complete draft");

    assert_eq!(request.table_id, TableId(3));
    assert_eq!(request.number_of_guests, 4);
    assert_eq!(request.customer_name, "Anna Svensson");
    assert_eq!(request.phone_number, "070-123-4567");
    assert_eq!(request.email, "anna@example.se");
    assert_eq!(request.special_requests, "Window seat");
    assert_eq!(
        request.booking_date_time,
        "2026-10-19T12:00:00Z"
            .parse::<DateTime<Utc>>()
            .expect("timestamp")
    );
}

#[test]
fn booking_request_requires_table_and_date_time() {
    let mut store = BookingStore::new();
    store.update(DraftUpdate::new().date("2026-10-19").time("12:00"));
    assert_eq!(
        store.draft().booking_request(),
        Err(StateError::NoTableSelected)
    );

    store.update(
        DraftUpdate::new()
            .time("")
            .selected_table(Some(table(1, 1, 2))),
    );
    assert_eq!(
        store.draft().booking_request(),
        Err(StateError::MissingDateTime)
    );
}

#[test]
fn step_numbers_round_trip() {
    for step in Step::ALL {
        assert_eq!(Step::from_number(step.number()), Some(step));
    }
    assert_eq!(Step::from_number(0), None);
    assert_eq!(Step::from_number(5), None);
}

#[test]
fn current_step_validity_follows_the_active_step() {
    let mut store = BookingStore::new();
    assert!(!store.is_current_step_valid());

    store.update(DraftUpdate::new().date("2026-10-19").time("12:00"));
    assert!(store.is_current_step_valid());

    store.advance();
    assert!(!store.is_current_step_valid());

    store.advance();
    store.advance();
    assert!(store.is_current_step_valid());
}
