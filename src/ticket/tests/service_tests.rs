//! Service orchestration tests for the ticket lifecycle, comment log, and
//! reflection gate.

use crate::partnership::{
    adapters::memory::InMemoryPartnershipStore,
    domain::{Board, BoardId, EmailAddress, Invite, PartnerPair, User, UserId},
    ports::PartnershipRepository,
};
use crate::ticket::{
    adapters::memory::InMemoryTicketStore,
    domain::{PageNumber, TicketCategory, TicketPatch, TicketPriority, TicketStatus},
    ports::{TicketFilter, TicketRepositoryError},
    services::{CreateTicketRequest, TicketLifecycleError, TicketLifecycleService},
};
use mockable::DefaultClock;
use std::sync::Arc;

type TestService = TicketLifecycleService<
    InMemoryPartnershipStore,
    InMemoryTicketStore<DefaultClock>,
    DefaultClock,
>;

struct Harness {
    service: TestService,
    partnership: Arc<InMemoryPartnershipStore>,
    alice: UserId,
    bob: UserId,
    board: BoardId,
}

async fn harness() -> Harness {
    let partnership = Arc::new(InMemoryPartnershipStore::new());
    let store = Arc::new(InMemoryTicketStore::new(DefaultClock));
    let service = TicketLifecycleService::new(
        Arc::clone(&partnership),
        Arc::clone(&store),
        Arc::new(DefaultClock),
    );

    let alice = seed_user(&partnership, "Alice", "alice@example.com").await;
    let bob = seed_user(&partnership, "Bob", "bob@example.com").await;
    let board = commit_partnership(&partnership, alice, bob).await;

    Harness {
        service,
        partnership,
        alice,
        bob,
        board,
    }
}

async fn seed_user(
    partnership: &InMemoryPartnershipStore,
    name: &str,
    email: &str,
) -> UserId {
    let user = User::new(
        name,
        EmailAddress::new(email).expect("valid email"),
        &DefaultClock,
    )
    .expect("valid user");
    partnership.store_user(&user).await.expect("store user");
    user.id()
}

async fn commit_partnership(
    partnership: &InMemoryPartnershipStore,
    alice: UserId,
    bob: UserId,
) -> BoardId {
    let invite = Invite::new(alice, bob, &DefaultClock).expect("valid invite");
    partnership
        .store_invite(&invite)
        .await
        .expect("store invite");
    let pair = PartnerPair::new(alice, bob).expect("valid pair");
    let board = Board::new(pair, &DefaultClock);
    partnership
        .commit_acceptance(invite.id(), &board)
        .await
        .expect("commit acceptance")
        .id()
}

fn sample_request() -> CreateTicketRequest {
    CreateTicketRequest::new(
        "Dishes pile up",
        TicketCategory::Household,
        TicketPriority::Medium,
    )
    .with_description("The sink is full again")
}

#[tokio::test(flavor = "multi_thread")]
async fn create_and_get_ticket_flags_authorship() {
    let h = harness().await;
    let ticket = h
        .service
        .create_ticket(h.alice, h.board, sample_request())
        .await
        .expect("ticket creation should succeed");

    let author_view = h
        .service
        .get_ticket(h.alice, ticket.id())
        .await
        .expect("author fetch should succeed");
    assert!(author_view.is_author);
    assert_eq!(author_view.ticket, ticket);

    let partner_view = h
        .service
        .get_ticket(h.bob, ticket.id())
        .await
        .expect("partner fetch should succeed");
    assert!(!partner_view.is_author);
}

#[tokio::test(flavor = "multi_thread")]
async fn outsiders_are_turned_away_not_told_nothing_exists() {
    let h = harness().await;
    let carol = seed_user(&h.partnership, "Carol", "carol@example.com").await;
    let ticket = h
        .service
        .create_ticket(h.alice, h.board, sample_request())
        .await
        .expect("ticket creation should succeed");

    let create = h.service.create_ticket(carol, h.board, sample_request()).await;
    assert!(matches!(
        create,
        Err(TicketLifecycleError::NotBoardMember(id)) if id == carol
    ));

    let fetch = h.service.get_ticket(carol, ticket.id()).await;
    assert!(matches!(
        fetch,
        Err(TicketLifecycleError::NotBoardMember(id)) if id == carol
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_tickets_read_as_not_found_for_members() {
    let h = harness().await;
    let result = h
        .service
        .get_ticket(h.alice, crate::ticket::domain::TicketId::new())
        .await;
    assert!(matches!(result, Err(TicketLifecycleError::TicketNotFound(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn edit_ticket_is_author_only() {
    let h = harness().await;
    let ticket = h
        .service
        .create_ticket(h.alice, h.board, sample_request())
        .await
        .expect("ticket creation should succeed");

    let edited = h
        .service
        .edit_ticket(
            h.alice,
            ticket.id(),
            TicketPatch::default().with_priority(TicketPriority::High),
        )
        .await
        .expect("author edit should succeed");
    assert_eq!(edited.priority(), TicketPriority::High);

    let result = h
        .service
        .edit_ticket(
            h.bob,
            ticket.id(),
            TicketPatch::default().with_title("Hijacked"),
        )
        .await;
    assert!(matches!(
        result,
        Err(TicketLifecycleError::NotTicketAuthor(id)) if id == h.bob
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn partner_comment_promotes_open_ticket_to_in_talks() {
    let h = harness().await;
    let ticket = h
        .service
        .create_ticket(h.alice, h.board, sample_request())
        .await
        .expect("ticket creation should succeed");

    h.service
        .post_comment(h.alice, ticket.id(), "Adding context")
        .await
        .expect("author comment should succeed");
    let after_author = h
        .service
        .get_ticket(h.alice, ticket.id())
        .await
        .expect("fetch should succeed");
    assert_eq!(after_author.ticket.status(), TicketStatus::Open);

    h.service
        .post_comment(h.bob, ticket.id(), "Let's talk tonight")
        .await
        .expect("partner comment should succeed");
    let after_partner = h
        .service
        .get_ticket(h.alice, ticket.id())
        .await
        .expect("fetch should succeed");
    assert_eq!(after_partner.ticket.status(), TicketStatus::InTalks);
}

#[tokio::test(flavor = "multi_thread")]
async fn comments_page_newest_first_in_fives() {
    let h = harness().await;
    let ticket = h
        .service
        .create_ticket(h.alice, h.board, sample_request())
        .await
        .expect("ticket creation should succeed");

    for i in 0..7 {
        h.service
            .post_comment(h.alice, ticket.id(), &format!("note {i}"))
            .await
            .expect("comment should succeed");
    }

    let first = h
        .service
        .list_comments(h.bob, ticket.id(), PageNumber::FIRST)
        .await
        .expect("listing should succeed");
    assert_eq!(first.items.len(), 5);
    assert!(first.has_next_page);
    assert_eq!(first.remaining, 2);
    assert!(
        first
            .items
            .windows(2)
            .all(|pair| pair[0].created_at() >= pair[1].created_at())
    );

    let second = h
        .service
        .list_comments(h.bob, ticket.id(), PageNumber::new(2))
        .await
        .expect("listing should succeed");
    assert_eq!(second.items.len(), 2);
    assert!(!second.has_next_page);
    assert_eq!(second.remaining, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn tickets_page_in_tens_with_remainder() {
    let h = harness().await;
    for i in 0..12 {
        h.service
            .create_ticket(
                h.alice,
                h.board,
                CreateTicketRequest::new(
                    format!("Ticket {i}"),
                    TicketCategory::Other,
                    TicketPriority::Low,
                ),
            )
            .await
            .expect("ticket creation should succeed");
    }

    let first = h
        .service
        .list_tickets(h.bob, h.board, TicketFilter::default(), PageNumber::FIRST)
        .await
        .expect("listing should succeed");
    assert_eq!(first.items.len(), 10);
    assert!(first.has_next_page);
    assert_eq!(first.remaining, 2);

    let second = h
        .service
        .list_tickets(h.bob, h.board, TicketFilter::default(), PageNumber::new(2))
        .await
        .expect("listing should succeed");
    assert_eq!(second.items.len(), 2);
    assert!(!second.has_next_page);
    assert_eq!(second.remaining, 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn archived_tickets_leave_the_default_listing() {
    let h = harness().await;
    let ticket = h
        .service
        .create_ticket(h.alice, h.board, sample_request())
        .await
        .expect("ticket creation should succeed");

    let archived = h
        .service
        .set_archived(h.alice, ticket.id(), true)
        .await
        .expect("archive should succeed");
    assert!(archived.archived());
    assert_eq!(archived.status(), TicketStatus::Open);

    let live = h
        .service
        .list_tickets(h.alice, h.board, TicketFilter::default(), PageNumber::FIRST)
        .await
        .expect("listing should succeed");
    assert!(live.items.is_empty());

    let shelved = h
        .service
        .list_tickets(
            h.alice,
            h.board,
            TicketFilter {
                archived: true,
                ..TicketFilter::default()
            },
            PageNumber::FIRST,
        )
        .await
        .expect("listing should succeed");
    assert_eq!(shelved.items.len(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn resolve_sends_the_ticket_to_reflection() {
    let h = harness().await;
    let ticket = h
        .service
        .create_ticket(h.alice, h.board, sample_request())
        .await
        .expect("ticket creation should succeed");

    let resolved = h
        .service
        .resolve(h.alice, ticket.id())
        .await
        .expect("resolve should succeed");
    assert_eq!(resolved.status(), TicketStatus::NeedsReflection);

    let partner_attempt = h.service.resolve(h.bob, ticket.id()).await;
    assert!(matches!(
        partner_attempt,
        Err(TicketLifecycleError::NotTicketAuthor(id)) if id == h.bob
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn reflection_gate_resolves_on_the_second_distinct_author() {
    let h = harness().await;
    let ticket = h
        .service
        .create_ticket(h.alice, h.board, sample_request())
        .await
        .expect("ticket creation should succeed");
    h.service
        .resolve(h.alice, ticket.id())
        .await
        .expect("resolve should succeed");

    let first = h
        .service
        .submit_reflection(h.alice, ticket.id(), "I should ask sooner.")
        .await
        .expect("first reflection should succeed");
    assert!(!first.resolved);

    let mid = h
        .service
        .get_ticket(h.bob, ticket.id())
        .await
        .expect("fetch should succeed");
    assert_eq!(mid.ticket.status(), TicketStatus::NeedsReflection);

    let second = h
        .service
        .submit_reflection(h.bob, ticket.id(), "I will say when I'm drained.")
        .await
        .expect("second reflection should succeed");
    assert!(second.resolved);

    let done = h
        .service
        .get_ticket(h.alice, ticket.id())
        .await
        .expect("fetch should succeed");
    assert_eq!(done.ticket.status(), TicketStatus::Resolved);
}

#[tokio::test(flavor = "multi_thread")]
async fn repeat_reflections_by_one_author_are_conflicts() {
    let h = harness().await;
    let ticket = h
        .service
        .create_ticket(h.alice, h.board, sample_request())
        .await
        .expect("ticket creation should succeed");
    h.service
        .resolve(h.alice, ticket.id())
        .await
        .expect("resolve should succeed");
    h.service
        .submit_reflection(h.alice, ticket.id(), "First thoughts.")
        .await
        .expect("first reflection should succeed");

    let repeat = h
        .service
        .submit_reflection(h.alice, ticket.id(), "Second thoughts.")
        .await;
    assert!(matches!(
        repeat,
        Err(TicketLifecycleError::Repository(
            TicketRepositoryError::DuplicateReflection { .. }
        ))
    ));

    let status = h
        .service
        .get_ticket(h.alice, ticket.id())
        .await
        .expect("fetch should succeed");
    assert_eq!(status.ticket.status(), TicketStatus::NeedsReflection);
}

#[tokio::test(flavor = "multi_thread")]
async fn reflections_are_rejected_off_the_reflection_stage() {
    let h = harness().await;
    let ticket = h
        .service
        .create_ticket(h.alice, h.board, sample_request())
        .await
        .expect("ticket creation should succeed");

    let result = h
        .service
        .submit_reflection(h.alice, ticket.id(), "Too early.")
        .await;
    assert!(matches!(
        result,
        Err(TicketLifecycleError::NotAwaitingReflection {
            status: TicketStatus::Open,
            ..
        })
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn resolving_a_resolved_ticket_is_a_conflict() {
    let h = harness().await;
    let ticket = h
        .service
        .create_ticket(h.alice, h.board, sample_request())
        .await
        .expect("ticket creation should succeed");
    h.service
        .resolve(h.alice, ticket.id())
        .await
        .expect("resolve should succeed");
    h.service
        .submit_reflection(h.alice, ticket.id(), "Mine.")
        .await
        .expect("reflection should succeed");
    h.service
        .submit_reflection(h.bob, ticket.id(), "Mine too.")
        .await
        .expect("reflection should succeed");

    let result = h.service.resolve(h.alice, ticket.id()).await;
    assert!(matches!(
        result,
        Err(TicketLifecycleError::AlreadyResolved(id)) if id == ticket.id()
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_ticket_takes_its_log_with_it() {
    let h = harness().await;
    let ticket = h
        .service
        .create_ticket(h.alice, h.board, sample_request())
        .await
        .expect("ticket creation should succeed");
    h.service
        .post_comment(h.bob, ticket.id(), "On it")
        .await
        .expect("comment should succeed");

    h.service
        .delete_ticket(h.alice, ticket.id())
        .await
        .expect("delete should succeed");

    let fetch = h.service.get_ticket(h.alice, ticket.id()).await;
    assert!(matches!(fetch, Err(TicketLifecycleError::TicketNotFound(_))));

    let comments = h
        .service
        .list_comments(h.alice, ticket.id(), PageNumber::FIRST)
        .await;
    assert!(matches!(
        comments,
        Err(TicketLifecycleError::TicketNotFound(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn delete_ticket_is_author_only() {
    let h = harness().await;
    let ticket = h
        .service
        .create_ticket(h.alice, h.board, sample_request())
        .await
        .expect("ticket creation should succeed");

    let result = h.service.delete_ticket(h.bob, ticket.id()).await;
    assert!(matches!(
        result,
        Err(TicketLifecycleError::NotTicketAuthor(id)) if id == h.bob
    ));
}
