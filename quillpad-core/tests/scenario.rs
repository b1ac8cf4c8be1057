/*
    scenario.rs - End-to-end walk through the seeded platform

    Logs in, publishes, comments and shuts down through the session
    controller exactly as the presentation layer does.
*/

mod common;

use common::{next_delivery, seeded_session, test_config};
use quillpad_core::core_content::ContentError;
use quillpad_core::{PostId, Role, SessionController, SessionError, SessionState};
use std::time::Duration;

#[tokio::test]
async fn test_author_posts_reader_comments_author_is_notified() {
    let session = seeded_session();
    let mut events = session.dispatcher().subscribe();

    let author = session.login("author1", "abcd").expect("author login");
    assert_eq!(author.role(), Role::Author);

    let post = session.create_post("T", "B").unwrap();
    assert_eq!(post.id(), PostId(2));
    assert_eq!(post.title(), "T");
    assert_eq!(post.author(), "author1");

    session.login("reader1", "xyz").expect("reader login");
    let comment = session.add_comment(PostId(2), "nice").unwrap();
    assert_eq!(comment.text, "nice");
    assert_eq!(comment.author, "reader1");
    assert_eq!(post.comments().snapshot().unwrap(), vec![comment]);

    let delivered = next_delivery(&mut events, Duration::from_secs(2))
        .await
        .expect("notification delivered");
    assert_eq!(delivered.notification().recipient, "author1");
    assert_eq!(delivered.notification().post_id, PostId(2));
    assert_eq!(delivered.notification().commenter, "reader1");

    // Wrong secret: refused, current session untouched
    assert!(session.login("author1", "wrong").is_none());
    assert_eq!(
        session.current_account().unwrap().identifier(),
        "reader1"
    );

    session.shutdown().await;
    assert_eq!(session.state().unwrap(), SessionState::LoggedOut);
}

#[tokio::test]
async fn test_dashboard_text_after_activity() {
    let session = seeded_session();
    session.login("reader1", "xyz").unwrap();
    session.add_comment(PostId(1), "first!").unwrap();

    let text = session.render_all_posts().unwrap();
    assert_eq!(
        text,
        "--- POST [1] ---\n\
         Title: Welcome to the Blog!\n\
         By: author1\n\
         Content: This is the very first post.\n\
         Comments:\n  - first! (reader1)\n\
         ---------------------\n"
    );
}

#[tokio::test]
async fn test_errors_leave_store_untouched() {
    let session = seeded_session();

    assert!(matches!(
        session.create_post("T", "B"),
        Err(SessionError::NoActiveSession)
    ));

    session.login("admin1", "1234").unwrap();
    assert!(matches!(
        session.create_post("T", "B"),
        Err(SessionError::Content(ContentError::Unauthorized { role: Role::Admin, .. }))
    ));
    assert!(matches!(
        session.add_comment(PostId(7), "?"),
        Err(SessionError::Content(ContentError::PostNotFound(PostId(7))))
    ));

    let posts = session.list_posts().unwrap();
    assert_eq!(posts.len(), 1);
    assert!(posts[0].comments().is_empty().unwrap());
    assert_eq!(session.dispatcher().submitted(), 0);
}

#[tokio::test]
async fn test_shutdown_with_pending_notifications_returns() {
    let mut config = test_config(Duration::from_secs(30));
    config.notifier.shutdown_timeout = Duration::from_millis(100);
    let session = SessionController::bootstrap(&config).unwrap();

    session.login("reader1", "xyz").unwrap();
    for i in 0..5 {
        session.add_comment(PostId(1), &format!("c{}", i)).unwrap();
    }
    assert_eq!(session.dispatcher().pending(), 5);

    tokio::time::timeout(Duration::from_secs(5), session.shutdown())
        .await
        .expect("shutdown does not wait for slow deliveries");
    assert!(session.dispatcher().is_closed());
}
