//! Integration tests for tally-core services
//!
//! These tests run the services against a real DuckDB file in a temporary
//! directory.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use tempfile::TempDir;

use tally_core::config::Config;
use tally_core::domain::money::{parse_cents, MAX_AMOUNT_CENTS};
use tally_core::{Error, GroupId, Person, SettlementTransfer, TallyContext};

// ============================================================================
// Test Helpers
// ============================================================================

/// Create a context over a fresh data directory
fn create_test_context(temp_dir: &TempDir) -> TallyContext {
    TallyContext::new(temp_dir.path()).expect("Failed to create context")
}

async fn register(ctx: &TallyContext, name: &str) -> Person {
    ctx.person_service
        .register(name, &format!("{}@example.com", name.to_lowercase()))
        .await
        .expect("Failed to register person")
}

/// Create a group owned by `owner` that every other person joins
async fn create_group_with(ctx: &TallyContext, owner: &Person, others: &[&Person]) -> GroupId {
    let group = ctx.group_service.create_group("Trip", owner.id).await.unwrap();
    for person in others {
        ctx.group_service
            .join_group(group.id, person.id, &group.invitation_code)
            .await
            .unwrap();
    }
    group.id
}

// ============================================================================
// Balance & Settlement
// ============================================================================

#[tokio::test]
async fn test_group_balance_from_recorded_data() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);

    let p1 = register(&ctx, "Ada").await;
    let p2 = register(&ctx, "Bob").await;
    let p3 = register(&ctx, "Cy").await;
    let group_id = create_group_with(&ctx, &p1, &[&p2, &p3]).await;

    for (payer, amount) in [(&p1, 1000), (&p1, 250), (&p1, 500), (&p1, 90), (&p2, 777), (&p2, 5000)] {
        ctx.expense_service
            .record_expense(group_id, payer.id, amount, None)
            .await
            .unwrap();
    }

    let balance = ctx.group_service.get_group_balance(group_id).await.unwrap();
    assert_eq!(balance.get(p1.id), 571);
    assert_eq!(balance.get(p2.id), 4508);
    assert_eq!(balance.get(p3.id), -1269);

    ctx.transfer_service
        .record_transfer(group_id, p3.id, p2.id, 500)
        .await
        .unwrap();

    let balance = ctx.group_service.get_group_balance(group_id).await.unwrap();
    assert_eq!(balance.get(p1.id), 571);
    assert_eq!(balance.get(p2.id), 5008);
    assert_eq!(balance.get(p3.id), -1769);
}

#[tokio::test]
async fn test_settlement_plan_for_even_split() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);

    let ada = register(&ctx, "Ada").await;
    let bob = register(&ctx, "Bob").await;
    let cy = register(&ctx, "Cy").await;
    let group_id = create_group_with(&ctx, &ada, &[&bob, &cy]).await;

    // 3 expenses totalling 1200, average 400
    ctx.expense_service.record_expense(group_id, ada.id, 900, Some("hotel")).await.unwrap();
    ctx.expense_service.record_expense(group_id, bob.id, 300, Some("dinner")).await.unwrap();
    ctx.expense_service.record_expense(group_id, bob.id, 0, None).await.unwrap();

    let plan = ctx.group_service.get_settlement_plan(group_id).await.unwrap();
    assert_eq!(
        plan,
        vec![
            SettlementTransfer { amount_cents: 100, sender_id: bob.id, receiver_id: ada.id },
            SettlementTransfer { amount_cents: 400, sender_id: cy.id, receiver_id: ada.id },
        ]
    );
}

#[tokio::test]
async fn test_group_without_expenses_is_settled() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);

    let ada = register(&ctx, "Ada").await;
    let bob = register(&ctx, "Bob").await;
    let group_id = create_group_with(&ctx, &ada, &[&bob]).await;

    let balance = ctx.group_service.get_group_balance(group_id).await.unwrap();
    assert_eq!(balance.len(), 2);
    assert!(balance.is_settled());
    assert!(ctx.group_service.get_settlement_plan(group_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_group_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);

    assert!(matches!(
        ctx.group_service.get_group_balance(42).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        ctx.group_service.get_settlement_plan(42).await,
        Err(Error::NotFound(_))
    ));
}

// ============================================================================
// Membership rules
// ============================================================================

#[tokio::test]
async fn test_non_member_cannot_record_expense() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);

    let owner = register(&ctx, "Ada").await;
    let outsider = register(&ctx, "Eve").await;
    let group = ctx.group_service.create_group("Flat", owner.id).await.unwrap();

    let err = ctx
        .expense_service
        .record_expense(group.id, outsider.id, 1000, None)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::NotAMember { person_id, group_id } if person_id == outsider.id && group_id == group.id));
    assert!(ctx.expense_service.list_for_group(group.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_non_member_cannot_take_part_in_transfer() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);

    let owner = register(&ctx, "Ada").await;
    let outsider = register(&ctx, "Eve").await;
    let group = ctx.group_service.create_group("Flat", owner.id).await.unwrap();

    let as_sender = ctx
        .transfer_service
        .record_transfer(group.id, outsider.id, owner.id, 100)
        .await;
    let as_receiver = ctx
        .transfer_service
        .record_transfer(group.id, owner.id, outsider.id, 100)
        .await;

    assert!(matches!(as_sender, Err(Error::NotAMember { .. })));
    assert!(matches!(as_receiver, Err(Error::NotAMember { .. })));
    assert!(ctx.transfer_service.list_for_group(group.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_records_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);

    let ada = register(&ctx, "Ada").await;
    let bob = register(&ctx, "Bob").await;
    let group_id = create_group_with(&ctx, &ada, &[&bob]).await;

    assert!(matches!(
        ctx.expense_service.record_expense(group_id, ada.id, -1, None).await,
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        ctx.transfer_service.record_transfer(group_id, ada.id, ada.id, 10).await,
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        ctx.expense_service.record_expense(group_id + 1, ada.id, 10, None).await,
        Err(Error::NotFound(_))
    ));
}

#[tokio::test]
async fn test_amounts_above_limit_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);

    let ada = register(&ctx, "Ada").await;
    let bob = register(&ctx, "Bob").await;
    let group_id = create_group_with(&ctx, &ada, &[&bob]).await;

    // Largest amount the CLI can parse
    let huge = parse_cents("92233720368547758.07").unwrap();
    assert!(matches!(
        ctx.expense_service.record_expense(group_id, ada.id, huge, None).await,
        Err(Error::Validation(_))
    ));
    assert!(matches!(
        ctx.transfer_service.record_transfer(group_id, ada.id, bob.id, MAX_AMOUNT_CENTS + 1).await,
        Err(Error::Validation(_))
    ));

    ctx.expense_service
        .record_expense(group_id, ada.id, MAX_AMOUNT_CENTS, None)
        .await
        .unwrap();
    ctx.expense_service
        .record_expense(group_id, bob.id, MAX_AMOUNT_CENTS, None)
        .await
        .unwrap();

    let balance = ctx.group_service.get_group_balance(group_id).await.unwrap();
    assert!(balance.is_settled());
    assert!(ctx.group_service.get_settlement_plan(group_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_join_requires_invitation_code() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);

    let owner = register(&ctx, "Ada").await;
    let guest = register(&ctx, "Bob").await;
    let group = ctx.group_service.create_group("Flat", owner.id).await.unwrap();
    assert_eq!(group.member_ids, vec![owner.id]);

    let wrong = ctx.group_service.join_group(group.id, guest.id, "000000x").await;
    assert!(matches!(wrong, Err(Error::Unauthorized(_))));

    let joined = ctx
        .group_service
        .join_group(group.id, guest.id, &group.invitation_code)
        .await
        .unwrap();
    assert_eq!(joined.member_ids, vec![owner.id, guest.id]);

    let again = ctx
        .group_service
        .join_group(group.id, guest.id, &group.invitation_code)
        .await;
    assert!(matches!(again, Err(Error::Validation(_))));

    let guest_groups = ctx.group_service.list_groups_for(guest.id).await.unwrap();
    assert_eq!(guest_groups.len(), 1);
    assert_eq!(guest_groups[0].id, group.id);
}

#[tokio::test]
async fn test_group_owner_must_exist() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);

    assert!(matches!(
        ctx.group_service.create_group("Ghost town", 99).await,
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        ctx.group_service.create_group("   ", 99).await,
        Err(Error::Validation(_))
    ));
}

// ============================================================================
// Persons
// ============================================================================

#[tokio::test]
async fn test_duplicate_email_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = create_test_context(&temp_dir);

    ctx.person_service.register("Ada", "ada@example.com").await.unwrap();
    let err = ctx
        .person_service
        .register("Ada Again", "ADA@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(ctx.person_service.list().await.unwrap().len(), 1);
}

// ============================================================================
// Persistence
// ============================================================================

#[tokio::test]
async fn test_data_survives_reopen() {
    let temp_dir = TempDir::new().unwrap();
    let (group_id, ada_id) = {
        let ctx = create_test_context(&temp_dir);
        let ada = register(&ctx, "Ada").await;
        let bob = register(&ctx, "Bob").await;
        let group_id = create_group_with(&ctx, &ada, &[&bob]).await;
        ctx.expense_service
            .record_expense(group_id, ada.id, 2000, Some("groceries"))
            .await
            .unwrap();
        (group_id, ada.id)
    };

    let ctx = create_test_context(&temp_dir);
    let summary = ctx.group_service.get_summary(group_id).await.unwrap();
    assert_eq!(summary.group.member_ids.len(), 2);
    assert_eq!(summary.expense_count, 1);
    assert_eq!(summary.total_spent_cents, 2000);

    let balance = ctx.group_service.get_group_balance(group_id).await.unwrap();
    assert_eq!(balance.get(ada_id), 0);
}

#[tokio::test]
async fn test_active_person_is_saved_to_settings() {
    let temp_dir = TempDir::new().unwrap();
    {
        let mut ctx = create_test_context(&temp_dir);
        let ada = register(&ctx, "Ada").await;
        ctx.config.set_active_person(ada.id);
        ctx.save_config().unwrap();
    }

    let config = Config::load_with_env(temp_dir.path(), |_| None).unwrap();
    assert!(config.active_person.is_some());
}

#[tokio::test]
async fn test_in_memory_context() {
    let ctx = TallyContext::in_memory(Config::default()).unwrap();
    let ada = register(&ctx, "Ada").await;
    let group = ctx.group_service.create_group("Scratch", ada.id).await.unwrap();

    assert_eq!(ctx.group_service.get_group(group.id).await.unwrap().name, "Scratch");
    assert!(ctx.save_config().is_err());
}
