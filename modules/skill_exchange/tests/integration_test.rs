//! Service behaviour against a migrated in-memory SQLite database.

use chrono::Utc;
use sea_orm::{Database, DatabaseConnection, EntityTrait, SqlErr};
use sea_orm_migration::MigratorTrait;
use uuid::Uuid;

use skill_exchange::config::SkillExchangeConfig;
use skill_exchange::contract::model::{
    NewSkillRequest, NewUser, ProfileUpdate, RequestStatus, SkillRole, User,
};
use skill_exchange::domain::error::DomainError;
use skill_exchange::domain::request::new_pending;
use skill_exchange::domain::service::Service;
use skill_exchange::infra::storage::entity::skill_request::{new_active_model, Entity as RequestEntity};
use skill_exchange::infra::storage::migrations::Migrator;
use skill_exchange::module::build_service;

async fn setup_with(cfg: SkillExchangeConfig) -> (Service, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to test database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    (build_service(db.clone(), &cfg), db)
}

async fn setup() -> Service {
    setup_with(SkillExchangeConfig::default()).await.0
}

async fn user(svc: &Service, name: &str) -> User {
    svc.create_user(NewUser {
        name: name.to_owned(),
        email: format!("{}@example.com", name.to_lowercase()),
        can_teach: "Guitar".into(),
        want_to_learn: "Rust".into(),
    })
    .await
    .expect("user created")
}

fn req(to: Uuid, skill: &str, role: &str) -> NewSkillRequest {
    NewSkillRequest {
        to_user_id: to,
        skill: skill.to_owned(),
        role: role.to_owned(),
    }
}

#[tokio::test]
async fn signup_rejects_duplicate_email_case_insensitively() {
    let svc = setup().await;
    let ada = user(&svc, "Ada").await;
    assert_eq!(ada.email, "ada@example.com");

    let err = svc
        .create_user(NewUser {
            name: "Other Ada".into(),
            email: "  ADA@example.com".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::EmailAlreadyExists { .. }));
}

#[tokio::test]
async fn signup_validates_name_and_email() {
    let svc = setup().await;
    let err = svc
        .create_user(NewUser {
            name: "   ".into(),
            email: "x@example.com".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput { ref field, .. } if field == "name"));

    let err = svc
        .create_user(NewUser {
            name: "X".into(),
            email: "not-an-email".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput { ref field, .. } if field == "email"));
}

#[tokio::test]
async fn send_request_lands_in_recipient_pending_with_sender_resolved() {
    let svc = setup().await;
    let alice = user(&svc, "Alice").await;
    let bob = user(&svc, "Bob").await;

    let sent = svc
        .send_request(alice.id, req(bob.id, "Guitar", "learn"))
        .await
        .unwrap();
    assert_eq!(sent.owner_id, bob.id);
    assert_eq!(sent.status, RequestStatus::Pending);

    let inbox = svc.list_requests(bob.id).await.unwrap();
    assert_eq!(inbox.pending.len(), 1);
    assert!(inbox.accepted.is_empty());
    let entry = &inbox.pending[0];
    assert_eq!(entry.id, sent.id);
    assert_eq!(entry.role, SkillRole::Learn);
    let from = entry.from.as_ref().expect("sender resolved");
    assert_eq!(from.id, alice.id);
    assert_eq!(from.name, "Alice");

    // Nothing shows up on the sender's side.
    let mine = svc.list_requests(alice.id).await.unwrap();
    assert!(mine.pending.is_empty() && mine.accepted.is_empty());
}

#[tokio::test]
async fn send_request_validates_input() {
    let svc = setup().await;
    let alice = user(&svc, "Alice").await;
    let bob = user(&svc, "Bob").await;

    let err = svc
        .send_request(alice.id, req(bob.id, "Guitar", "mentor"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput { ref field, .. } if field == "type"));

    let err = svc
        .send_request(alice.id, req(bob.id, "  ", "learn"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput { ref field, .. } if field == "skill"));

    let err = svc
        .send_request(alice.id, req(Uuid::new_v4(), "Guitar", "learn"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UserNotFound { .. }));
}

#[tokio::test]
async fn duplicate_pending_is_case_insensitive_but_role_sensitive() {
    let svc = setup().await;
    let alice = user(&svc, "Alice").await;
    let bob = user(&svc, "Bob").await;

    svc.send_request(alice.id, req(bob.id, "Guitar", "learn"))
        .await
        .unwrap();

    let err = svc
        .send_request(alice.id, req(bob.id, "gUITAR", "learn"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::DuplicatePending));

    // Same skill with the other role is a different offer.
    svc.send_request(alice.id, req(bob.id, "guitar", "teach"))
        .await
        .unwrap();

    let inbox = svc.list_requests(bob.id).await.unwrap();
    assert_eq!(inbox.pending.len(), 2);
}

#[tokio::test]
async fn storage_allows_one_pending_entry_per_exchange() {
    let (_svc, db) = setup_with(SkillExchangeConfig::default()).await;
    let owner = Uuid::new_v4();
    let from = Uuid::new_v4();
    let now = Utc::now();

    let first = new_pending(owner, from, "Guitar".into(), SkillRole::Learn, now);
    RequestEntity::insert(new_active_model(&first))
        .exec_without_returning(&db)
        .await
        .unwrap();

    // Written straight to the table, skipping the service's lookup.
    let twin = new_pending(owner, from, "GUITAR".into(), SkillRole::Learn, now);
    let err = RequestEntity::insert(new_active_model(&twin))
        .exec_without_returning(&db)
        .await
        .unwrap_err();
    assert!(
        matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))),
        "{err:?}"
    );

    // Accepted entries of the same shape are outside the constraint.
    let mut done = new_pending(owner, from, "Guitar".into(), SkillRole::Learn, now);
    done.status = RequestStatus::Accepted;
    done.accepted_at = Some(now);
    RequestEntity::insert(new_active_model(&done))
        .exec_without_returning(&db)
        .await
        .unwrap();
}

#[tokio::test]
async fn concurrent_identical_sends_store_one_pending_entry() {
    let svc = setup().await;
    let alice = user(&svc, "Alice").await;
    let bob = user(&svc, "Bob").await;

    let (a, b, c, d) = tokio::join!(
        svc.send_request(alice.id, req(bob.id, "Guitar", "learn")),
        svc.send_request(alice.id, req(bob.id, "guitar", "learn")),
        svc.send_request(alice.id, req(bob.id, "GUITAR", "learn")),
        svc.send_request(alice.id, req(bob.id, "Guitar", "learn")),
    );
    let results = [a, b, c, d];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| matches!(e, DomainError::DuplicatePending)));

    let inbox = svc.list_requests(bob.id).await.unwrap();
    assert_eq!(inbox.pending.len(), 1);
}

#[tokio::test]
async fn crossed_requests_accepted_by_both_sides_leave_one_entry_each() {
    let svc = setup().await;
    let alice = user(&svc, "Alice").await;
    let bob = user(&svc, "Bob").await;

    // Alice asks to learn guitar from Bob; Bob offers to teach Alice guitar.
    let to_bob = svc
        .send_request(alice.id, req(bob.id, "Guitar", "learn"))
        .await
        .unwrap();
    let to_alice = svc
        .send_request(bob.id, req(alice.id, "guitar", "teach"))
        .await
        .unwrap();

    svc.accept_request(bob.id, to_bob.id).await.unwrap();
    let kept = svc.accept_request(alice.id, to_alice.id).await.unwrap();

    let alice_side = svc.list_requests(alice.id).await.unwrap();
    assert!(alice_side.pending.is_empty());
    assert_eq!(alice_side.accepted.len(), 1);
    assert_eq!(alice_side.accepted[0].id, kept.id);
    assert_ne!(kept.id, to_alice.id);
    assert_eq!(kept.role, SkillRole::Teach);
    assert_eq!(kept.from_id, bob.id);

    let bob_side = svc.list_requests(bob.id).await.unwrap();
    assert!(bob_side.pending.is_empty());
    assert_eq!(bob_side.accepted.len(), 1);
    assert_eq!(bob_side.accepted[0].id, to_bob.id);
}

#[tokio::test]
async fn accept_moves_request_and_mirrors_with_inverted_role() {
    let svc = setup().await;
    let alice = user(&svc, "Alice").await;
    let bob = user(&svc, "Bob").await;

    let sent = svc
        .send_request(alice.id, req(bob.id, "Guitar", "learn"))
        .await
        .unwrap();
    let accepted = svc.accept_request(bob.id, sent.id).await.unwrap();
    assert_eq!(accepted.id, sent.id);
    assert_eq!(accepted.status, RequestStatus::Accepted);

    let bob_side = svc.list_requests(bob.id).await.unwrap();
    assert!(bob_side.pending.is_empty());
    assert_eq!(bob_side.accepted.len(), 1);
    assert_eq!(bob_side.accepted[0].id, sent.id);
    assert_eq!(bob_side.accepted[0].role, SkillRole::Learn);
    assert_eq!(bob_side.accepted[0].from.as_ref().unwrap().id, alice.id);

    let alice_side = svc.list_requests(alice.id).await.unwrap();
    assert!(alice_side.pending.is_empty());
    assert_eq!(alice_side.accepted.len(), 1);
    let mirror = &alice_side.accepted[0];
    assert_ne!(mirror.id, sent.id);
    assert_eq!(mirror.skill, "Guitar");
    assert_eq!(mirror.role, SkillRole::Teach);
    assert_eq!(mirror.from.as_ref().unwrap().id, bob.id);
    assert!(mirror.accepted_at.is_some());
}

#[tokio::test]
async fn resending_after_accept_is_rejected_in_both_directions() {
    let svc = setup().await;
    let alice = user(&svc, "Alice").await;
    let bob = user(&svc, "Bob").await;

    let sent = svc
        .send_request(alice.id, req(bob.id, "Guitar", "learn"))
        .await
        .unwrap();
    svc.accept_request(bob.id, sent.id).await.unwrap();

    let err = svc
        .send_request(alice.id, req(bob.id, "guitar", "learn"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AlreadyAccepted));

    // Bob offering the mirrored side to Alice hits her mirror entry.
    let err = svc
        .send_request(bob.id, req(alice.id, "GUITAR", "teach"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AlreadyAccepted));
}

#[tokio::test]
async fn accept_only_works_on_own_pending_requests() {
    let svc = setup().await;
    let alice = user(&svc, "Alice").await;
    let bob = user(&svc, "Bob").await;
    let carol = user(&svc, "Carol").await;

    let sent = svc
        .send_request(alice.id, req(bob.id, "Guitar", "learn"))
        .await
        .unwrap();

    let err = svc.accept_request(carol.id, sent.id).await.unwrap_err();
    assert!(matches!(err, DomainError::RequestNotFound { .. }));

    let err = svc
        .accept_request(bob.id, Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::RequestNotFound { .. }));

    svc.accept_request(bob.id, sent.id).await.unwrap();
    let err = svc.accept_request(bob.id, sent.id).await.unwrap_err();
    assert!(matches!(err, DomainError::RequestNotFound { .. }));

    // Exactly one mirror despite the repeated accept.
    assert_eq!(svc.list_requests(alice.id).await.unwrap().accepted.len(), 1);
}

#[tokio::test]
async fn accept_rolls_back_when_sender_is_gone() {
    let svc = setup().await;
    let bob = user(&svc, "Bob").await;
    let ghost = Uuid::new_v4();

    let sent = svc
        .send_request(ghost, req(bob.id, "Chess", "teach"))
        .await
        .unwrap();

    let err = svc.accept_request(bob.id, sent.id).await.unwrap_err();
    assert!(matches!(
        err,
        DomainError::MirrorFailure { request_id, sender_id } if request_id == sent.id && sender_id == ghost
    ));

    let inbox = svc.list_requests(bob.id).await.unwrap();
    assert_eq!(inbox.pending.len(), 1, "request stays pending");
    assert!(inbox.accepted.is_empty());
    assert!(inbox.pending[0].from.is_none());
}

#[tokio::test]
async fn decline_removes_only_the_pending_entry() {
    let svc = setup().await;
    let alice = user(&svc, "Alice").await;
    let bob = user(&svc, "Bob").await;

    let first = svc
        .send_request(alice.id, req(bob.id, "Guitar", "learn"))
        .await
        .unwrap();
    let second = svc
        .send_request(alice.id, req(bob.id, "Piano", "learn"))
        .await
        .unwrap();

    svc.decline_request(bob.id, first.id).await.unwrap();
    let inbox = svc.list_requests(bob.id).await.unwrap();
    assert_eq!(inbox.pending.len(), 1);
    assert_eq!(inbox.pending[0].id, second.id);

    let err = svc.decline_request(bob.id, first.id).await.unwrap_err();
    assert!(matches!(err, DomainError::RequestNotFound { .. }));

    // Declined requests can be sent again.
    svc.send_request(alice.id, req(bob.id, "Guitar", "learn"))
        .await
        .unwrap();
}

#[tokio::test]
async fn delete_accepted_does_not_touch_the_mirror() {
    let svc = setup().await;
    let alice = user(&svc, "Alice").await;
    let bob = user(&svc, "Bob").await;

    let sent = svc
        .send_request(alice.id, req(bob.id, "Guitar", "learn"))
        .await
        .unwrap();
    svc.accept_request(bob.id, sent.id).await.unwrap();

    // Pending-only operations do not see accepted entries.
    let err = svc.decline_request(bob.id, sent.id).await.unwrap_err();
    assert!(matches!(err, DomainError::RequestNotFound { .. }));

    svc.delete_accepted(bob.id, sent.id).await.unwrap();
    assert!(svc.list_requests(bob.id).await.unwrap().accepted.is_empty());
    assert_eq!(svc.list_requests(alice.id).await.unwrap().accepted.len(), 1);

    let err = svc.delete_accepted(bob.id, sent.id).await.unwrap_err();
    assert!(matches!(err, DomainError::RequestNotFound { .. }));
}

#[tokio::test]
async fn pending_requests_keep_arrival_order() {
    let svc = setup().await;
    let bob = user(&svc, "Bob").await;
    let mut senders = Vec::new();
    for name in ["Alice", "Carol", "Dave"] {
        senders.push(user(&svc, name).await);
    }
    for s in &senders {
        svc.send_request(s.id, req(bob.id, "Go", "learn"))
            .await
            .unwrap();
    }
    let order: Vec<_> = svc
        .list_requests(bob.id)
        .await
        .unwrap()
        .pending
        .into_iter()
        .map(|r| r.from.unwrap().name)
        .collect();
    assert_eq!(order, vec!["Alice", "Carol", "Dave"]);
}

#[tokio::test]
async fn ratings_replace_previous_and_summarize() {
    let svc = setup().await;
    let mentor = user(&svc, "Mentor").await;
    let a = user(&svc, "A").await;
    let b = user(&svc, "B").await;

    let empty = svc.get_user_profile(mentor.id).await.unwrap();
    assert_eq!(empty.summary.total_reviews, 0);
    assert_eq!(empty.summary.average_rating, 0.0);

    svc.submit_rating(a.id, mentor.id, 5).await.unwrap();
    let summary = svc.submit_rating(b.id, mentor.id, 4).await.unwrap();
    assert_eq!(summary.total_reviews, 2);
    assert_eq!(summary.average_rating, 4.5);

    // Re-rating replaces A's earlier rating.
    let summary = svc.submit_rating(a.id, mentor.id, 1).await.unwrap();
    assert_eq!(summary.total_reviews, 2);
    assert_eq!(summary.average_rating, 2.5);

    let profile = svc.get_user_profile(mentor.id).await.unwrap();
    assert_eq!(profile.summary, summary);
}

#[tokio::test]
async fn rating_validates_stars_and_ratee() {
    let svc = setup().await;
    let mentor = user(&svc, "Mentor").await;
    let a = user(&svc, "A").await;

    for bad in [0, 6, -1] {
        let err = svc.submit_rating(a.id, mentor.id, bad).await.unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { ref field, .. } if field == "rating"));
    }
    let err = svc
        .submit_rating(a.id, Uuid::new_v4(), 3)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::UserNotFound { .. }));
}

#[tokio::test]
async fn rating_can_require_an_accepted_pairing() {
    let (svc, _db) = setup_with(SkillExchangeConfig {
        require_pairing_for_rating: true,
        ..Default::default()
    })
    .await;
    let alice = user(&svc, "Alice").await;
    let bob = user(&svc, "Bob").await;

    let err = svc.submit_rating(alice.id, bob.id, 5).await.unwrap_err();
    assert!(matches!(err, DomainError::PairingRequired));

    let sent = svc
        .send_request(alice.id, req(bob.id, "Guitar", "learn"))
        .await
        .unwrap();
    svc.accept_request(bob.id, sent.id).await.unwrap();

    svc.submit_rating(alice.id, bob.id, 5).await.unwrap();
    svc.submit_rating(bob.id, alice.id, 4).await.unwrap();
}

#[tokio::test]
async fn messages_form_an_ordered_two_way_conversation() {
    let svc = setup().await;
    let alice = user(&svc, "Alice").await;
    let bob = user(&svc, "Bob").await;
    let carol = user(&svc, "Carol").await;

    svc.send_message(alice.id, bob.id, "hi bob".into())
        .await
        .unwrap();
    svc.send_message(bob.id, alice.id, "hi alice".into())
        .await
        .unwrap();
    svc.send_message(carol.id, alice.id, "unrelated".into())
        .await
        .unwrap();
    svc.send_message(alice.id, bob.id, "  padded  ".into())
        .await
        .unwrap();

    let history = svc.message_history(bob.id, alice.id).await.unwrap();
    let texts: Vec<_> = history.iter().map(|m| m.content.as_str()).collect();
    assert_eq!(texts, vec!["hi bob", "hi alice", "  padded  "]);

    // Same conversation from the other side.
    let other = svc.message_history(alice.id, bob.id).await.unwrap();
    assert_eq!(history, other);
}

#[tokio::test]
async fn blank_messages_are_rejected_and_receiver_is_not_checked() {
    let svc = setup().await;
    let alice = user(&svc, "Alice").await;

    let err = svc
        .send_message(alice.id, Uuid::new_v4(), " \n\t ".into())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput { ref field, .. } if field == "text"));

    let stranger = Uuid::new_v4();
    let sent = svc
        .send_message(alice.id, stranger, "hello?".into())
        .await
        .unwrap();
    assert_eq!(sent.receiver_id, stranger);
}

#[tokio::test]
async fn profile_update_keeps_omitted_fields() {
    let svc = setup().await;
    let alice = user(&svc, "Alice").await;

    let updated = svc
        .update_profile(
            alice.id,
            ProfileUpdate {
                name: "Alice B.".into(),
                can_teach: None,
                want_to_learn: Some("Haskell".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Alice B.");
    assert_eq!(updated.can_teach, "Guitar");
    assert_eq!(updated.want_to_learn, "Haskell");
    assert!(updated.updated_at >= alice.updated_at);

    let reloaded = svc.get_user(alice.id).await.unwrap();
    assert_eq!(reloaded, updated);

    let err = svc
        .update_profile(alice.id, ProfileUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput { .. }));
}

#[tokio::test]
async fn list_users_attaches_pending_requests() {
    let svc = setup().await;
    let alice = user(&svc, "Alice").await;
    let bob = user(&svc, "Bob").await;

    svc.send_request(alice.id, req(bob.id, "Guitar", "learn"))
        .await
        .unwrap();

    let listing = svc.list_users().await.unwrap();
    assert_eq!(listing.len(), 2);
    let bob_entry = listing.iter().find(|l| l.user.id == bob.id).unwrap();
    assert_eq!(bob_entry.pending.len(), 1);
    assert_eq!(bob_entry.pending[0].from_id, alice.id);
    let alice_entry = listing.iter().find(|l| l.user.id == alice.id).unwrap();
    assert!(alice_entry.pending.is_empty());
}
