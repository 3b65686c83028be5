//! Service orchestration tests for the invite handshake and break-ups.

use crate::partnership::{
    adapters::memory::InMemoryPartnershipStore,
    domain::{Board, EmailAddress, Invite, PartnerPair, User, UserId},
    ports::{PartnershipRepository, PartnershipRepositoryError},
    services::{PairingError, PairingService},
};
use crate::ticket::{
    adapters::memory::InMemoryTicketStore,
    domain::{Ticket, TicketCategory, TicketPriority},
    ports::TicketRepository,
};
use mockable::DefaultClock;
use std::sync::Arc;

type TestService =
    PairingService<InMemoryPartnershipStore, InMemoryTicketStore<DefaultClock>, DefaultClock>;

struct Harness {
    service: TestService,
    repository: Arc<InMemoryPartnershipStore>,
    tickets: Arc<InMemoryTicketStore<DefaultClock>>,
    alice: UserId,
    bob: UserId,
}

async fn harness() -> Harness {
    let repository = Arc::new(InMemoryPartnershipStore::new());
    let tickets = Arc::new(InMemoryTicketStore::new(DefaultClock));
    let service = PairingService::new(
        Arc::clone(&repository),
        Arc::clone(&tickets),
        Arc::new(DefaultClock),
    );
    let alice = seed_user(&repository, "Alice", "alice@example.com").await;
    let bob = seed_user(&repository, "Bob", "bob@example.com").await;

    Harness {
        service,
        repository,
        tickets,
        alice,
        bob,
    }
}

async fn seed_user(
    repository: &InMemoryPartnershipStore,
    name: &str,
    email: &str,
) -> UserId {
    let user = User::new(
        name,
        EmailAddress::new(email).expect("valid email"),
        &DefaultClock,
    )
    .expect("valid user");
    repository.store_user(&user).await.expect("store user");
    user.id()
}

#[tokio::test(flavor = "multi_thread")]
async fn create_invite_persists_pending_invite() {
    let h = harness().await;

    let invite = h
        .service
        .create_invite(h.alice, "bob@example.com")
        .await
        .expect("invite creation should succeed");

    assert_eq!(invite.inviter_id(), h.alice);
    assert_eq!(invite.invitee_id(), h.bob);
    assert!(invite.is_pending());

    let pending = h
        .service
        .pending_invites(h.bob)
        .await
        .expect("listing should succeed");
    assert_eq!(pending, vec![invite]);
}

#[tokio::test(flavor = "multi_thread")]
async fn create_invite_rejects_unknown_address() {
    let h = harness().await;
    let result = h.service.create_invite(h.alice, "nobody@example.com").await;
    assert!(matches!(result, Err(PairingError::InviteeNotFound(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_invite_rejects_self_invite() {
    let h = harness().await;
    let result = h.service.create_invite(h.alice, "Alice@Example.com").await;
    assert!(matches!(result, Err(PairingError::SelfInvite)));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_invite_rejects_duplicate_pending_pair() {
    let h = harness().await;
    h.service
        .create_invite(h.alice, "bob@example.com")
        .await
        .expect("first invite should succeed");

    let result = h.service.create_invite(h.alice, "bob@example.com").await;
    assert!(matches!(
        result,
        Err(PairingError::Repository(
            PartnershipRepositoryError::DuplicatePendingInvite { .. }
        ))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn accept_links_partners_and_creates_board() {
    let h = harness().await;
    let invite = h
        .service
        .create_invite(h.alice, "bob@example.com")
        .await
        .expect("invite creation should succeed");

    let board = h
        .service
        .respond(h.bob, invite.id(), true)
        .await
        .expect("acceptance should succeed")
        .expect("acceptance should yield a board");

    assert!(board.has_member(h.alice));
    assert!(board.has_member(h.bob));

    let alice = h
        .repository
        .find_user(h.alice)
        .await
        .expect("lookup should succeed")
        .expect("alice exists");
    let bob = h
        .repository
        .find_user(h.bob)
        .await
        .expect("lookup should succeed")
        .expect("bob exists");
    assert!(alice.is_partner_of(&bob));
}

#[tokio::test(flavor = "multi_thread")]
async fn accept_purges_other_pending_invites_touching_either_party() {
    let h = harness().await;
    let carol = seed_user(&h.repository, "Carol", "carol@example.com").await;

    let main_invite = h
        .service
        .create_invite(h.alice, "bob@example.com")
        .await
        .expect("invite creation should succeed");
    let rival_invite = h
        .service
        .create_invite(carol, "bob@example.com")
        .await
        .expect("rival invite creation should succeed");

    h.service
        .respond(h.bob, main_invite.id(), true)
        .await
        .expect("acceptance should succeed");

    let gone = h
        .repository
        .find_invite(rival_invite.id())
        .await
        .expect("lookup should succeed");
    assert!(gone.is_none());

    let remaining = h
        .service
        .pending_invites(h.bob)
        .await
        .expect("listing should succeed");
    assert!(remaining.is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn reject_deletes_the_invite_outright() {
    let h = harness().await;
    let invite = h
        .service
        .create_invite(h.alice, "bob@example.com")
        .await
        .expect("invite creation should succeed");

    let outcome = h
        .service
        .respond(h.bob, invite.id(), false)
        .await
        .expect("rejection should succeed");
    assert!(outcome.is_none());

    let gone = h
        .repository
        .find_invite(invite.id())
        .await
        .expect("lookup should succeed");
    assert!(gone.is_none());

    let alice = h
        .repository
        .find_user(h.alice)
        .await
        .expect("lookup should succeed")
        .expect("alice exists");
    assert!(!alice.is_partnered());
}

#[tokio::test(flavor = "multi_thread")]
async fn respond_rejects_callers_other_than_the_invitee() {
    let h = harness().await;
    let carol = seed_user(&h.repository, "Carol", "carol@example.com").await;
    let invite = h
        .service
        .create_invite(h.alice, "bob@example.com")
        .await
        .expect("invite creation should succeed");

    let result = h.service.respond(carol, invite.id(), true).await;
    assert!(matches!(result, Err(PairingError::NotInvitee(id)) if id == carol));
}

#[tokio::test(flavor = "multi_thread")]
async fn partnered_caller_cannot_send_further_invites() {
    let h = harness().await;
    let _carol = seed_user(&h.repository, "Carol", "carol@example.com").await;
    let invite = h
        .service
        .create_invite(h.alice, "bob@example.com")
        .await
        .expect("invite creation should succeed");
    h.service
        .respond(h.bob, invite.id(), true)
        .await
        .expect("acceptance should succeed");

    let result = h.service.create_invite(h.alice, "carol@example.com").await;
    assert!(matches!(result, Err(PairingError::AlreadyPartnered(id)) if id == h.alice));

    let result = h.service.create_invite(h.bob, "carol@example.com").await;
    assert!(matches!(result, Err(PairingError::AlreadyPartnered(id)) if id == h.bob));
}

#[tokio::test(flavor = "multi_thread")]
async fn inviting_a_partnered_user_is_a_conflict() {
    let h = harness().await;
    let carol = seed_user(&h.repository, "Carol", "carol@example.com").await;
    let invite = h
        .service
        .create_invite(h.alice, "bob@example.com")
        .await
        .expect("invite creation should succeed");
    h.service
        .respond(h.bob, invite.id(), true)
        .await
        .expect("acceptance should succeed");

    let result = h.service.create_invite(carol, "bob@example.com").await;
    assert!(matches!(result, Err(PairingError::InviteePartnered(id)) if id == h.bob));
}

#[tokio::test(flavor = "multi_thread")]
async fn raced_second_accept_fails_with_already_partnered() {
    let h = harness().await;
    let carol = seed_user(&h.repository, "Carol", "carol@example.com").await;

    let carol_invite = h
        .service
        .create_invite(carol, "alice@example.com")
        .await
        .expect("invite creation should succeed");
    h.service
        .respond(h.alice, carol_invite.id(), true)
        .await
        .expect("acceptance should succeed");

    // Models the losing side of two racing accepts: a pending invite naming
    // Alice that the winning commit's purge did not observe.
    let stale = Invite::new(h.alice, h.bob, &DefaultClock).expect("valid invite");
    h.repository
        .store_invite(&stale)
        .await
        .expect("store invite");

    let pair = PartnerPair::new(h.alice, h.bob).expect("distinct members");
    let board = Board::new(pair, &DefaultClock);
    let result = h.repository.commit_acceptance(stale.id(), &board).await;
    assert!(matches!(
        result,
        Err(PartnershipRepositoryError::AlreadyPartnered(id)) if id == h.alice
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn break_partnership_unlinks_users_and_cascades_tickets() {
    let h = harness().await;
    let invite = h
        .service
        .create_invite(h.alice, "bob@example.com")
        .await
        .expect("invite creation should succeed");
    let board = h
        .service
        .respond(h.bob, invite.id(), true)
        .await
        .expect("acceptance should succeed")
        .expect("board exists");

    let ticket = Ticket::new(
        board.id(),
        h.alice,
        "Dishes pile up",
        None,
        TicketCategory::Household,
        TicketPriority::Medium,
        &DefaultClock,
    )
    .expect("valid ticket");
    h.tickets.store_ticket(&ticket).await.expect("store ticket");

    h.service
        .break_partnership(h.alice, h.bob)
        .await
        .expect("break-up should succeed");

    let alice = h
        .repository
        .find_user(h.alice)
        .await
        .expect("lookup should succeed")
        .expect("alice exists");
    assert!(!alice.is_partnered());

    let board_gone = h
        .repository
        .find_board(board.id())
        .await
        .expect("lookup should succeed");
    assert!(board_gone.is_none());

    let ticket_gone = h
        .tickets
        .find_ticket(ticket.id())
        .await
        .expect("lookup should succeed");
    assert!(ticket_gone.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn break_partnership_rejects_unlinked_pairs() {
    let h = harness().await;
    let result = h.service.break_partnership(h.alice, h.bob).await;
    assert!(matches!(result, Err(PairingError::PartnerMismatch { .. })));
}
