//! Domain-focused tests for tickets, comments, reflections, and paging.

use crate::partnership::domain::{BoardId, UserId};
use crate::ticket::domain::{
    Comment, PageNumber, PersistedTicketData, Reflection, Ticket, TicketCategory,
    TicketDomainError, TicketPatch, TicketPriority, TicketStatus,
};
use crate::ticket::ports::TicketFilter;
use mockable::DefaultClock;
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> DefaultClock {
    DefaultClock
}

fn sample_ticket(clock: &DefaultClock) -> Ticket {
    Ticket::new(
        BoardId::new(),
        UserId::new(),
        "Dishes pile up",
        Some("  The sink is full again  ".to_owned()),
        TicketCategory::Household,
        TicketPriority::Medium,
        clock,
    )
    .expect("valid ticket")
}

#[rstest]
fn ticket_new_normalizes_fields_and_starts_open(clock: DefaultClock) {
    let ticket = sample_ticket(&clock);

    assert_eq!(ticket.title(), "Dishes pile up");
    assert_eq!(ticket.description(), Some("The sink is full again"));
    assert_eq!(ticket.status(), TicketStatus::Open);
    assert!(!ticket.archived());
    assert_eq!(ticket.created_at(), ticket.updated_at());
}

#[rstest]
fn ticket_round_trips_through_persisted_data(clock: DefaultClock) {
    let original = sample_ticket(&clock);
    let rebuilt = Ticket::from_persisted(PersistedTicketData {
        id: original.id(),
        board_id: original.board_id(),
        author_id: original.author_id(),
        title: original.title().to_owned(),
        description: original.description().map(str::to_owned),
        category: original.category(),
        priority: original.priority(),
        status: original.status(),
        archived: original.archived(),
        created_at: original.created_at(),
        updated_at: original.updated_at(),
    });
    assert_eq!(rebuilt, original);
}

#[rstest]
fn ticket_new_rejects_blank_title(clock: DefaultClock) {
    let result = Ticket::new(
        BoardId::new(),
        UserId::new(),
        "   ",
        None,
        TicketCategory::Other,
        TicketPriority::Low,
        &clock,
    );
    assert_eq!(result, Err(TicketDomainError::EmptyTitle));
}

#[rstest]
fn ticket_new_drops_blank_description(clock: DefaultClock) {
    let ticket = Ticket::new(
        BoardId::new(),
        UserId::new(),
        "Quiet evenings",
        Some("   ".to_owned()),
        TicketCategory::Wellbeing,
        TicketPriority::Low,
        &clock,
    )
    .expect("valid ticket");
    assert_eq!(ticket.description(), None);
}

#[rstest]
fn apply_patch_updates_only_present_fields(clock: DefaultClock) {
    let mut ticket = sample_ticket(&clock);
    let patch = TicketPatch::default()
        .with_title("Dishes, again")
        .with_priority(TicketPriority::High);

    ticket.apply_patch(patch, &clock).expect("patch applies");

    assert_eq!(ticket.title(), "Dishes, again");
    assert_eq!(ticket.priority(), TicketPriority::High);
    assert_eq!(ticket.description(), Some("The sink is full again"));
    assert_eq!(ticket.category(), TicketCategory::Household);
}

#[rstest]
fn apply_patch_rejects_blank_title(clock: DefaultClock) {
    let mut ticket = sample_ticket(&clock);
    let result = ticket.apply_patch(TicketPatch::default().with_title("  "), &clock);
    assert_eq!(result, Err(TicketDomainError::EmptyTitle));
}

#[rstest]
fn empty_patch_is_a_no_op(clock: DefaultClock) {
    let mut ticket = sample_ticket(&clock);
    let before = ticket.clone();
    ticket
        .apply_patch(TicketPatch::default(), &clock)
        .expect("empty patch applies");
    assert_eq!(ticket, before);
}

#[rstest]
fn set_archived_leaves_status_alone(clock: DefaultClock) {
    let mut ticket = sample_ticket(&clock);
    ticket.set_archived(true, &clock);
    assert!(ticket.archived());
    assert_eq!(ticket.status(), TicketStatus::Open);
}

#[rstest]
fn comment_new_rejects_blank_body(clock: DefaultClock) {
    let result = Comment::new(
        crate::ticket::domain::TicketId::new(),
        UserId::new(),
        "   ",
        &clock,
    );
    assert_eq!(result, Err(TicketDomainError::EmptyBody));
}

#[rstest]
fn reflection_new_trims_body(clock: DefaultClock) {
    let reflection = Reflection::new(
        crate::ticket::domain::TicketId::new(),
        UserId::new(),
        "  We talked it through.  ",
        &clock,
    )
    .expect("valid reflection");
    assert_eq!(reflection.body(), "We talked it through.");
}

#[rstest]
#[case(0, 1)]
#[case(1, 1)]
#[case(7, 7)]
fn page_number_clamps_zero_to_one(#[case] input: u32, #[case] expected: u32) {
    assert_eq!(PageNumber::new(input).get(), expected);
}

#[rstest]
#[case(PageNumber::FIRST, 10, 0)]
#[case(PageNumber::new(2), 10, 10)]
#[case(PageNumber::new(3), 5, 10)]
fn page_number_offsets_by_page_size(
    #[case] page: PageNumber,
    #[case] page_size: u32,
    #[case] expected: u64,
) {
    assert_eq!(page.offset(page_size), expected);
}

#[rstest]
#[case("0", 1)]
#[case("1", 1)]
#[case("4", 4)]
fn page_number_clamp_holds_through_deserialization(
    #[case] payload: &str,
    #[case] expected: u32,
) -> eyre::Result<()> {
    let page: PageNumber = serde_json::from_str(payload)?;
    eyre::ensure!(page.get() == expected, "expected page {expected}, got {page}");
    eyre::ensure!(page.offset(10) == u64::from(expected - 1) * 10);
    Ok(())
}

#[rstest]
fn filter_matches_on_archived_and_present_criteria(clock: DefaultClock) {
    let ticket = sample_ticket(&clock);

    assert!(TicketFilter::default().matches(&ticket));
    assert!(
        TicketFilter {
            status: Some(TicketStatus::Open),
            priority: Some(TicketPriority::Medium),
            category: Some(TicketCategory::Household),
            archived: false,
        }
        .matches(&ticket)
    );
    assert!(
        !TicketFilter {
            priority: Some(TicketPriority::High),
            ..TicketFilter::default()
        }
        .matches(&ticket)
    );
    assert!(
        !TicketFilter {
            archived: true,
            ..TicketFilter::default()
        }
        .matches(&ticket)
    );
}

#[rstest]
#[case(TicketStatus::Open, "open")]
#[case(TicketStatus::InTalks, "in_talks")]
#[case(TicketStatus::NeedsReflection, "needs_reflection")]
#[case(TicketStatus::Resolved, "resolved")]
fn status_round_trips_through_storage_form(#[case] status: TicketStatus, #[case] text: &str) {
    assert_eq!(status.as_str(), text);
    assert_eq!(TicketStatus::try_from(text), Ok(status));
}

#[rstest]
fn status_rejects_unknown_text() {
    assert!(TicketStatus::try_from("in_progress").is_err());
    assert!(TicketStatus::try_from("closed").is_err());
}

#[rstest]
#[case(TicketCategory::Communication, "communication")]
#[case(TicketCategory::Relationship, "relationship")]
#[case(TicketCategory::Household, "household")]
#[case(TicketCategory::Finance, "finance")]
#[case(TicketCategory::Wellbeing, "wellbeing")]
#[case(TicketCategory::Other, "other")]
fn category_round_trips_through_storage_form(
    #[case] category: TicketCategory,
    #[case] text: &str,
) {
    assert_eq!(category.as_str(), text);
    assert_eq!(TicketCategory::try_from(text), Ok(category));
}

#[rstest]
fn priority_orders_low_to_high() {
    assert!(TicketPriority::Low < TicketPriority::Medium);
    assert!(TicketPriority::Medium < TicketPriority::High);
}
