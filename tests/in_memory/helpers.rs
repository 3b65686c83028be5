//! Shared test helpers wiring the full service stack over in-memory
//! adapters.

use mockable::DefaultClock;
use std::sync::Arc;
use tandem::partnership::{
    adapters::memory::InMemoryPartnershipStore,
    domain::{Board, EmailAddress, User, UserId},
    ports::PartnershipRepository,
    services::{BoardService, PairingService},
};
use tandem::ticket::{adapters::memory::InMemoryTicketStore, services::TicketLifecycleService};

/// The whole application wired over in-memory storage: two registered
/// users and every service sharing the same stores.
pub struct App {
    /// Invite engine.
    pub pairing: PairingService<
        InMemoryPartnershipStore,
        InMemoryTicketStore<DefaultClock>,
        DefaultClock,
    >,
    /// Board manager.
    pub boards: BoardService<InMemoryPartnershipStore>,
    /// Ticket lifecycle engine.
    pub tickets: TicketLifecycleService<
        InMemoryPartnershipStore,
        InMemoryTicketStore<DefaultClock>,
        DefaultClock,
    >,
    /// Partnership storage, shared by all services.
    pub partnership: Arc<InMemoryPartnershipStore>,
    /// Alice's account.
    pub alice: UserId,
    /// Bob's account.
    pub bob: UserId,
}

/// Builds a fresh application with Alice and Bob registered.
pub async fn app() -> App {
    let partnership = Arc::new(InMemoryPartnershipStore::new());
    let store = Arc::new(InMemoryTicketStore::new(DefaultClock));
    let clock = Arc::new(DefaultClock);

    let pairing = PairingService::new(
        Arc::clone(&partnership),
        Arc::clone(&store),
        Arc::clone(&clock),
    );
    let boards = BoardService::new(Arc::clone(&partnership));
    let tickets = TicketLifecycleService::new(
        Arc::clone(&partnership),
        Arc::clone(&store),
        Arc::clone(&clock),
    );

    let alice = register(&partnership, "Alice", "alice@example.com").await;
    let bob = register(&partnership, "Bob", "bob@example.com").await;

    App {
        pairing,
        boards,
        tickets,
        partnership,
        alice,
        bob,
    }
}

/// Registers a user account directly against storage.
pub async fn register(
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

/// Runs the invite handshake from Alice to Bob and returns the shared
/// board.
pub async fn pair_up(app: &App) -> Board {
    let invite = app
        .pairing
        .create_invite(app.alice, "bob@example.com")
        .await
        .expect("invite creation should succeed");
    app.pairing
        .respond(app.bob, invite.id(), true)
        .await
        .expect("acceptance should succeed")
        .expect("acceptance should yield a board")
}
