//! Tests for the board view model and its confirmed-moves overlay.

#![expect(
    clippy::expect_used,
    reason = "Test code uses expect for assertion clarity"
)]

use crate::pipeline::{
    domain::{Contact, ContactId, ListId, PersistedContactData, StageId},
    ports::BoardSync,
    services::PipelineBoard,
};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use mockable::{Clock, DefaultClock};
use rstest::{fixture, rstest};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn persisted(
    name: &str,
    stage_id: StageId,
    list_id: ListId,
    updated_at: DateTime<Utc>,
) -> Contact {
    Contact::from_persisted(PersistedContactData {
        id: ContactId::new(),
        name: name.to_owned(),
        stage_id,
        list_id,
        updated_at,
    })
}

struct BoardHarness {
    board: PipelineBoard<DefaultClock>,
    contact_id: ContactId,
    list_id: ListId,
    stage_a: StageId,
    stage_b: StageId,
    stage_c: StageId,
    fetched_at: DateTime<Utc>,
}

/// A board seeded with one contact in `stage_a`, fetched an hour ago.
#[fixture]
fn seeded() -> BoardHarness {
    let clock = DefaultClock;
    let stage_a = StageId::new();
    let stage_b = StageId::new();
    let stage_c = StageId::new();
    let list_id = ListId::new();
    let fetched_at = clock.utc() - ChronoDuration::hours(1);

    let contact = persisted("Mary Jackson", stage_a, list_id, fetched_at);
    let contact_id = contact.id();
    let board = PipelineBoard::new(Arc::new(clock));
    board.apply_snapshot(vec![contact]);

    BoardHarness {
        board,
        contact_id,
        list_id,
        stage_a,
        stage_b,
        stage_c,
        fetched_at,
    }
}

#[rstest]
fn snapshot_populates_the_board(seeded: BoardHarness) {
    assert_eq!(seeded.board.contact_count(), 1);
    let contact = seeded
        .board
        .contact(seeded.contact_id)
        .expect("contact rendered");
    assert_eq!(contact.stage_id(), seeded.stage_a);
    assert_eq!(
        seeded
            .board
            .contacts_in_stage(seeded.stage_a)
            .first()
            .map(Contact::id),
        Some(seeded.contact_id)
    );
    assert!(seeded.board.contacts_in_stage(seeded.stage_b).is_empty());
}

#[rstest]
fn contacts_in_stage_sorts_by_name(seeded: BoardHarness) {
    let zelda = persisted("Zelda", seeded.stage_a, seeded.list_id, seeded.fetched_at);
    let alan = persisted("Alan", seeded.stage_a, seeded.list_id, seeded.fetched_at);
    let mary = persisted("Mary Jackson", seeded.stage_a, seeded.list_id, seeded.fetched_at);
    seeded.board.apply_snapshot(vec![zelda, alan, mary]);

    let names: Vec<String> = seeded
        .board
        .contacts_in_stage(seeded.stage_a)
        .iter()
        .map(|contact| contact.name().to_owned())
        .collect();
    assert_eq!(names, vec!["Alan", "Mary Jackson", "Zelda"]);
}

#[rstest]
fn optimistic_and_revert_change_the_rendered_stage(seeded: BoardHarness) {
    seeded
        .board
        .apply_optimistic(seeded.contact_id, seeded.stage_b);
    assert_eq!(
        seeded
            .board
            .contact(seeded.contact_id)
            .expect("contact rendered")
            .stage_id(),
        seeded.stage_b
    );

    seeded.board.apply_revert(seeded.contact_id, seeded.stage_a);
    assert_eq!(
        seeded
            .board
            .contact(seeded.contact_id)
            .expect("contact rendered")
            .stage_id(),
        seeded.stage_a
    );
    assert!(!seeded.board.has_confirmed_overlay(seeded.contact_id));
}

#[rstest]
fn confirmed_overlay_survives_a_stale_snapshot(seeded: BoardHarness) {
    seeded
        .board
        .apply_confirmed(seeded.contact_id, seeded.stage_b);
    assert!(seeded.board.has_confirmed_overlay(seeded.contact_id));

    // Refetch returns the pre-move row, stamped before the confirmation.
    let stale = Contact::from_persisted(PersistedContactData {
        id: seeded.contact_id,
        name: "Mary Jackson".to_owned(),
        stage_id: seeded.stage_a,
        list_id: seeded.list_id,
        updated_at: seeded.fetched_at,
    });
    seeded.board.apply_snapshot(vec![stale]);

    let contact = seeded
        .board
        .contact(seeded.contact_id)
        .expect("contact rendered");
    assert_eq!(contact.stage_id(), seeded.stage_b, "overlay reapplied");
    assert_eq!(contact.updated_at(), seeded.fetched_at, "backend timestamp kept");
    assert!(seeded.board.has_confirmed_overlay(seeded.contact_id));
}

#[rstest]
fn snapshot_reflecting_the_move_consumes_the_overlay(seeded: BoardHarness) {
    seeded
        .board
        .apply_confirmed(seeded.contact_id, seeded.stage_b);

    let fresh = Contact::from_persisted(PersistedContactData {
        id: seeded.contact_id,
        name: "Mary Jackson".to_owned(),
        stage_id: seeded.stage_b,
        list_id: seeded.list_id,
        updated_at: Utc::now(),
    });
    seeded.board.apply_snapshot(vec![fresh]);

    assert!(!seeded.board.has_confirmed_overlay(seeded.contact_id));
    assert_eq!(
        seeded
            .board
            .contact(seeded.contact_id)
            .expect("contact rendered")
            .stage_id(),
        seeded.stage_b
    );
}

#[rstest]
fn newer_backend_write_beats_the_overlay(seeded: BoardHarness) {
    seeded
        .board
        .apply_confirmed(seeded.contact_id, seeded.stage_b);

    // Another client moved the contact again after our confirmation.
    let newer = Contact::from_persisted(PersistedContactData {
        id: seeded.contact_id,
        name: "Mary Jackson".to_owned(),
        stage_id: seeded.stage_c,
        list_id: seeded.list_id,
        updated_at: Utc::now() + ChronoDuration::hours(1),
    });
    seeded.board.apply_snapshot(vec![newer]);

    assert!(!seeded.board.has_confirmed_overlay(seeded.contact_id));
    assert_eq!(
        seeded
            .board
            .contact(seeded.contact_id)
            .expect("contact rendered")
            .stage_id(),
        seeded.stage_c
    );
}

#[rstest]
fn overlay_is_pruned_when_the_contact_disappears(seeded: BoardHarness) {
    seeded
        .board
        .apply_confirmed(seeded.contact_id, seeded.stage_b);

    seeded.board.apply_snapshot(Vec::new());

    assert_eq!(seeded.board.contact_count(), 0);
    assert!(!seeded.board.has_confirmed_overlay(seeded.contact_id));
}

#[rstest]
fn snapshot_rows_outside_the_active_list_are_dropped(seeded: BoardHarness) {
    seeded.board.set_active_list(Some(seeded.list_id));
    let insider = persisted("Mary Jackson", seeded.stage_a, seeded.list_id, seeded.fetched_at);
    let outsider = persisted("Dorothy Vaughan", seeded.stage_a, ListId::new(), seeded.fetched_at);
    seeded.board.apply_snapshot(vec![insider, outsider]);

    assert_eq!(seeded.board.contact_count(), 1);
}

#[rstest]
fn switching_lists_clears_the_board_and_overlay(seeded: BoardHarness) {
    seeded
        .board
        .apply_confirmed(seeded.contact_id, seeded.stage_b);
    assert!(seeded.board.has_confirmed_overlay(seeded.contact_id));

    seeded.board.set_active_list(Some(ListId::new()));

    assert_eq!(seeded.board.contact_count(), 0);
    assert!(!seeded.board.has_confirmed_overlay(seeded.contact_id));
}

#[rstest]
fn setting_the_same_list_keeps_the_board(seeded: BoardHarness) {
    seeded.board.set_active_list(None);
    assert_eq!(seeded.board.contact_count(), 1);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn resync_fires_after_the_settle_delay() {
    let clock = DefaultClock;
    let stage_a = StageId::new();
    let stage_b = StageId::new();
    let contact = persisted("Mary Jackson", stage_a, ListId::new(), clock.utc());
    let contact_id = contact.id();

    let fired = Arc::new(AtomicUsize::new(0));
    let probe = Arc::clone(&fired);
    let board = PipelineBoard::new(Arc::new(clock))
        .with_resync(Arc::new(move || {
            probe.fetch_add(1, Ordering::SeqCst);
        }));
    board.apply_snapshot(vec![contact]);

    board.apply_confirmed(contact_id, stage_b);
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 0, "not before the delay");

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1, "exactly once after 500ms");
}
