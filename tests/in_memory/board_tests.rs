//! Integration tests for the board overview and renaming across partners.

use super::helpers::{app, pair_up};

#[tokio::test(flavor = "multi_thread")]
async fn overview_tracks_the_pairing_journey() {
    let app = app().await;

    let before = app
        .boards
        .overview(app.bob)
        .await
        .expect("overview should succeed");
    assert_eq!(before.username, "Bob");
    assert_eq!(before.pending_invite_count, 0);
    assert!(before.board.is_none());

    app.pairing
        .create_invite(app.alice, "bob@example.com")
        .await
        .expect("invite creation should succeed");
    let courted = app
        .boards
        .overview(app.bob)
        .await
        .expect("overview should succeed");
    assert_eq!(courted.pending_invite_count, 1);
    assert!(courted.board.is_none());

    let pending = app
        .pairing
        .pending_invites(app.bob)
        .await
        .expect("listing should succeed");
    app.pairing
        .respond(app.bob, pending[0].id(), true)
        .await
        .expect("acceptance should succeed");

    let paired = app
        .boards
        .overview(app.bob)
        .await
        .expect("overview should succeed");
    assert_eq!(paired.pending_invite_count, 0);
    assert!(paired.board.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn renames_are_visible_to_both_partners() {
    let app = app().await;
    let board = pair_up(&app).await;

    app.boards
        .rename_board(app.alice, board.id(), "Us Two")
        .await
        .expect("rename should succeed");

    let seen_by_bob = app
        .boards
        .overview(app.bob)
        .await
        .expect("overview should succeed")
        .board
        .expect("board exists");
    assert_eq!(seen_by_bob.name().as_str(), "Us Two");
}
