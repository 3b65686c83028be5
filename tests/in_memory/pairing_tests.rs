//! Integration tests for the invite handshake and the break-up cascade.

use super::helpers::{app, pair_up, register};
use tandem::partnership::ports::PartnershipRepository;
use tandem::ticket::{
    domain::PageNumber,
    ports::TicketFilter,
    services::{CreateTicketRequest, TicketLifecycleError},
};
use tandem::ticket::domain::{TicketCategory, TicketPriority};

#[tokio::test(flavor = "multi_thread")]
async fn handshake_creates_exactly_one_board_with_symmetric_links() {
    let app = app().await;
    let board = pair_up(&app).await;

    let alice = app
        .partnership
        .find_user(app.alice)
        .await
        .expect("lookup should succeed")
        .expect("alice exists");
    let bob = app
        .partnership
        .find_user(app.bob)
        .await
        .expect("lookup should succeed")
        .expect("bob exists");
    assert!(alice.is_partner_of(&bob));

    let from_alice = app
        .partnership
        .find_board_for_member(app.alice)
        .await
        .expect("lookup should succeed");
    let from_bob = app
        .partnership
        .find_board_for_member(app.bob)
        .await
        .expect("lookup should succeed");
    assert_eq!(from_alice, Some(board.clone()));
    assert_eq!(from_bob, Some(board));
}

#[tokio::test(flavor = "multi_thread")]
async fn acceptance_purges_every_other_pending_invite() {
    let app = app().await;
    let carol = register(&app.partnership, "Carol", "carol@example.com").await;
    let dave = register(&app.partnership, "Dave", "dave@example.com").await;

    // Carol courts Bob; Alice courts Dave; Alice also courts Bob.
    let rival = app
        .pairing
        .create_invite(carol, "bob@example.com")
        .await
        .expect("invite creation should succeed");
    let outbound = app
        .pairing
        .create_invite(app.alice, "dave@example.com")
        .await
        .expect("invite creation should succeed");
    let main = app
        .pairing
        .create_invite(app.alice, "bob@example.com")
        .await
        .expect("invite creation should succeed");

    app.pairing
        .respond(app.bob, main.id(), true)
        .await
        .expect("acceptance should succeed");

    for gone in [rival.id(), outbound.id()] {
        let invite = app
            .partnership
            .find_invite(gone)
            .await
            .expect("lookup should succeed");
        assert!(invite.is_none());
    }

    let dave_pending = app
        .pairing
        .pending_invites(dave)
        .await
        .expect("listing should succeed");
    assert!(dave_pending.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn break_up_removes_board_and_every_ticket_trace() {
    let app = app().await;
    let board = pair_up(&app).await;

    let ticket = app
        .tickets
        .create_ticket(
            app.alice,
            board.id(),
            CreateTicketRequest::new(
                "Date night",
                TicketCategory::Relationship,
                TicketPriority::High,
            ),
        )
        .await
        .expect("ticket creation should succeed");
    app.tickets
        .post_comment(app.bob, ticket.id(), "Friday works")
        .await
        .expect("comment should succeed");

    app.pairing
        .break_partnership(app.bob, app.alice)
        .await
        .expect("break-up should succeed");

    let board_gone = app
        .partnership
        .find_board(board.id())
        .await
        .expect("lookup should succeed");
    assert!(board_gone.is_none());

    let fetch = app.tickets.get_ticket(app.alice, ticket.id()).await;
    assert!(matches!(fetch, Err(TicketLifecycleError::TicketNotFound(_))));

    let listing = app
        .tickets
        .list_tickets(
            app.alice,
            board.id(),
            TicketFilter::default(),
            PageNumber::FIRST,
        )
        .await;
    assert!(matches!(listing, Err(TicketLifecycleError::BoardNotFound(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn both_partners_can_pair_again_after_a_break_up() {
    let app = app().await;
    pair_up(&app).await;
    app.pairing
        .break_partnership(app.alice, app.bob)
        .await
        .expect("break-up should succeed");

    let carol = register(&app.partnership, "Carol", "carol@example.com").await;
    let invite = app
        .pairing
        .create_invite(app.alice, "carol@example.com")
        .await
        .expect("invite creation should succeed");
    let board = app
        .pairing
        .respond(carol, invite.id(), true)
        .await
        .expect("acceptance should succeed")
        .expect("board exists");

    assert!(board.has_member(app.alice));
    assert!(board.has_member(carol));
}
