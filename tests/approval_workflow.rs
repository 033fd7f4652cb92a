//! End-to-end behavior of the approve/reject workflow engine over the
//! in-memory store: guarded transitions, wallet debits, and notifications.

mod common;

use common::TestApp;
use rust_decimal::Decimal;
use uuid::Uuid;
use vaultdesk::store::models::status;
use vaultdesk::workflow::{Outcome, WorkflowError};

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

#[tokio::test]
async fn approving_a_deposit_flips_status_and_notifies() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let id = app
        .store
        .seed_deposit_with_email(user, "BTC", dec("250"), "user@example.com");

    let outcome = app.state.engine.approve_deposit(id).await.unwrap();
    assert!(outcome.is_completed());
    let deposit = app.store.deposit(id).unwrap();
    assert_eq!(deposit.status, status::APPROVED);
    assert!(deposit.approved_at.is_some());

    app.wait_for_mail(1).await;
    let sent = app.mailer.sent();
    assert_eq!(sent[0].to, "user@example.com");
    assert_eq!(sent[0].subject, "Deposit Approved");
}

#[tokio::test]
async fn second_approval_is_a_soft_no_op() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let id = app
        .store
        .seed_deposit_with_email(user, "ETH", dec("10"), "user@example.com");

    assert!(app.state.engine.approve_deposit(id).await.unwrap().is_completed());
    let again = app.state.engine.approve_deposit(id).await.unwrap();
    assert!(matches!(again, Outcome::AlreadyProcessed));

    app.wait_for_mail(1).await;
    assert_eq!(app.mailer.sent().len(), 1);
}

#[tokio::test]
async fn concurrent_approve_and_reject_have_one_winner() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let id = app
        .store
        .seed_deposit_with_email(user, "BTC", dec("42"), "user@example.com");

    let engine = app.state.engine.clone();
    let approve = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.approve_deposit(id).await })
    };
    let reject = tokio::spawn(async move { engine.reject_deposit(id).await });

    let approve = approve.await.unwrap().unwrap();
    let reject = reject.await.unwrap().unwrap();
    assert!(
        approve.is_completed() != reject.is_completed(),
        "exactly one transition must win"
    );

    let final_status = app.store.deposit(id).unwrap().status;
    if approve.is_completed() {
        assert_eq!(final_status, status::APPROVED);
    } else {
        assert_eq!(final_status, status::REJECTED);
    }
}

#[tokio::test]
async fn unresolvable_recipient_blocks_the_transition() {
    let app = TestApp::new();
    let id = app.store.seed_deposit(Uuid::new_v4(), "BTC", dec("5"));

    let err = app.state.engine.approve_deposit(id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::RecipientUnresolved(_)));
    assert_eq!(app.store.deposit(id).unwrap().status, status::PENDING);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn recipient_falls_back_to_profile_then_directory() {
    let app = TestApp::new();
    let via_profile = Uuid::new_v4();
    let via_directory = Uuid::new_v4();
    app.store.seed_profile(via_profile, "profile@example.com");
    app.store
        .seed_directory_email(via_directory, "directory@example.com");
    let first = app.store.seed_deposit(via_profile, "BTC", dec("1"));
    let second = app.store.seed_deposit(via_directory, "BTC", dec("2"));

    app.state.engine.approve_deposit(first).await.unwrap();
    app.state.engine.approve_deposit(second).await.unwrap();

    app.wait_for_mail(2).await;
    let recipients: Vec<String> = app.mailer.sent().iter().map(|m| m.to.clone()).collect();
    assert!(recipients.contains(&"profile@example.com".to_string()));
    assert!(recipients.contains(&"directory@example.com".to_string()));
}

#[tokio::test]
async fn approving_a_withdrawal_debits_exactly_the_amount() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    app.store.seed_profile(user, "user@example.com");
    app.store.set_balance(user, "BTC", dec("150"));
    let id = app.store.seed_withdrawal(user, "BTC", dec("100"), dec("1.5"));

    let outcome = app.state.engine.approve_withdrawal(id).await.unwrap();
    assert!(outcome.is_completed());
    assert_eq!(app.store.balance(user, "BTC"), Some(dec("50")));
    assert_eq!(app.store.withdrawal(id).unwrap().status, status::APPROVED);

    app.wait_for_mail(1).await;
    assert_eq!(app.mailer.sent()[0].subject, "Withdrawal Approved");
}

#[tokio::test]
async fn insufficient_balance_leaves_everything_untouched() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    app.store.seed_profile(user, "user@example.com");
    app.store.set_balance(user, "BTC", dec("50"));
    let id = app.store.seed_withdrawal(user, "BTC", dec("100"), dec("1"));

    let err = app.state.engine.approve_withdrawal(id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InsufficientFunds(_)));
    assert_eq!(app.store.balance(user, "BTC"), Some(dec("50")));
    assert_eq!(app.store.withdrawal(id).unwrap().status, status::PENDING);
    assert!(app.mailer.sent().is_empty());
}

#[tokio::test]
async fn missing_wallet_counts_as_zero_balance() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    app.store.seed_profile(user, "user@example.com");
    let id = app.store.seed_withdrawal(user, "BTC", dec("10"), dec("0"));

    let err = app.state.engine.approve_withdrawal(id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::InsufficientFunds(_)));
}

#[tokio::test]
async fn rejecting_a_withdrawal_never_touches_the_balance() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    app.store.seed_profile(user, "user@example.com");
    app.store.set_balance(user, "BTC", dec("500"));
    let id = app.store.seed_withdrawal(user, "BTC", dec("100"), dec("1"));

    let outcome = app.state.engine.reject_withdrawal(id).await.unwrap();
    assert!(outcome.is_completed());
    assert_eq!(app.store.balance(user, "BTC"), Some(dec("500")));
    assert_eq!(app.store.withdrawal(id).unwrap().status, status::REJECTED);

    app.wait_for_mail(1).await;
    assert_eq!(app.mailer.sent()[0].subject, "Withdrawal Rejected");
}

#[tokio::test]
async fn approving_an_unknown_id_is_not_found() {
    let app = TestApp::new();
    let err = app.state.engine.approve_deposit(9999).await.unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));
}

#[tokio::test]
async fn notification_failure_does_not_undo_the_approval() {
    let app = TestApp::new();
    let user = Uuid::new_v4();
    let id = app
        .store
        .seed_deposit_with_email(user, "BTC", dec("50"), "user@example.com");
    app.mailer.fail_next_sends();

    let outcome = app.state.engine.approve_deposit(id).await.unwrap();
    assert!(outcome.is_completed());
    assert_eq!(app.store.deposit(id).unwrap().status, status::APPROVED);
}
