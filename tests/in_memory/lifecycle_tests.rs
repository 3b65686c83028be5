//! End-to-end integration test for the full ticket journey.

use super::helpers::{app, pair_up};
use tandem::ticket::{
    domain::{PageNumber, TicketCategory, TicketPriority, TicketStatus},
    ports::TicketFilter,
    services::CreateTicketRequest,
};

#[tokio::test(flavor = "multi_thread")]
async fn a_ticket_travels_from_filing_to_resolution() {
    let app = app().await;
    let board = pair_up(&app).await;

    // Alice files the ticket.
    let ticket = app
        .tickets
        .create_ticket(
            app.alice,
            board.id(),
            CreateTicketRequest::new(
                "We never cook together anymore",
                TicketCategory::Relationship,
                TicketPriority::Medium,
            )
            .with_description("It used to be our thing on Sundays"),
        )
        .await
        .expect("ticket creation should succeed");
    assert_eq!(ticket.status(), TicketStatus::Open);

    // Bob's first comment opens the conversation.
    app.tickets
        .post_comment(app.bob, ticket.id(), "You're right. Sunday?")
        .await
        .expect("comment should succeed");
    let in_talks = app
        .tickets
        .get_ticket(app.bob, ticket.id())
        .await
        .expect("fetch should succeed");
    assert_eq!(in_talks.ticket.status(), TicketStatus::InTalks);

    // A few back-and-forth comments leave status alone.
    app.tickets
        .post_comment(app.alice, ticket.id(), "Sunday. I'll shop Saturday.")
        .await
        .expect("comment should succeed");
    let still_talking = app
        .tickets
        .get_ticket(app.alice, ticket.id())
        .await
        .expect("fetch should succeed");
    assert_eq!(still_talking.ticket.status(), TicketStatus::InTalks);

    // Alice, the author, calls it resolved; both must now reflect.
    let awaiting = app
        .tickets
        .resolve(app.alice, ticket.id())
        .await
        .expect("resolve should succeed");
    assert_eq!(awaiting.status(), TicketStatus::NeedsReflection);

    let first = app
        .tickets
        .submit_reflection(app.alice, ticket.id(), "I bottled it up too long.")
        .await
        .expect("first reflection should succeed");
    assert!(!first.resolved);

    let second = app
        .tickets
        .submit_reflection(app.bob, ticket.id(), "I'll notice sooner next time.")
        .await
        .expect("second reflection should succeed");
    assert!(second.resolved);

    // The resolved ticket still shows up in the live listing.
    let listing = app
        .tickets
        .list_tickets(
            app.bob,
            board.id(),
            TicketFilter {
                status: Some(TicketStatus::Resolved),
                ..TicketFilter::default()
            },
            PageNumber::FIRST,
        )
        .await
        .expect("listing should succeed");
    assert_eq!(listing.items.len(), 1);
    assert_eq!(listing.items[0].id(), ticket.id());

    // Archiving tucks it away without touching status.
    let archived = app
        .tickets
        .set_archived(app.alice, ticket.id(), true)
        .await
        .expect("archive should succeed");
    assert_eq!(archived.status(), TicketStatus::Resolved);

    let live = app
        .tickets
        .list_tickets(
            app.alice,
            board.id(),
            TicketFilter::default(),
            PageNumber::FIRST,
        )
        .await
        .expect("listing should succeed");
    assert!(live.items.is_empty());
}
