use beredt::config::SecurityConfig;
use beredt::db::{ItemInput, NewUser, Store};
use beredt::domain::Role;
use beredt::services::household_service::HouseholdService;
use beredt::services::household_service_impl::SeaOrmHouseholdService;

/// Cheap Argon2 parameters so the tests spend their time on the logic
/// under test instead of hashing.
fn test_security() -> SecurityConfig {
    SecurityConfig {
        argon2_memory_cost_kib: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
    }
}

async fn test_store() -> Store {
    Store::new("sqlite::memory:").await.expect("store boots")
}

async fn create_user(store: &Store, email: &str, phone: &str) -> i32 {
    store
        .create_user(
            NewUser {
                email: email.to_string(),
                password: "hemmelig123".to_string(),
                first_name: "Test".to_string(),
                last_name: "Bruker".to_string(),
                phone: phone.to_string(),
                latitude: None,
                longitude: None,
                role: Role::User,
            },
            &test_security(),
        )
        .await
        .expect("user created")
        .id
}

#[tokio::test]
async fn test_expired_join_code_admits_nobody() {
    let store = test_store().await;
    let service = SeaOrmHouseholdService::new(store.clone());

    let owner = create_user(&store, "eier@test.no", "+4741000001").await;
    let joiner = create_user(&store, "gjest@test.no", "+4741000002").await;

    let household = service
        .create(owner, "Testhusstand", 63.4, 10.4)
        .await
        .unwrap();

    // Insert a syntactically valid but already-expired code directly.
    let past = (chrono::Utc::now() - chrono::Duration::hours(1)).to_rfc3339();
    store
        .insert_join_code(household.id, "GAMMEL01", &past)
        .await
        .unwrap();

    let joined = service.join(joiner, "GAMMEL01").await.unwrap();
    assert!(joined.is_none());

    // No membership was created.
    assert!(store.membership(joiner, household.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_unknown_code_is_silent_and_empty_code_is_rejected() {
    let store = test_store().await;
    let service = SeaOrmHouseholdService::new(store.clone());

    let user = create_user(&store, "bruker@test.no", "+4741000003").await;

    let joined = service.join(user, "FINSIKKE").await.unwrap();
    assert!(joined.is_none());

    assert!(service.join(user, "").await.is_err());
    assert!(service.join(user, "   ").await.is_err());
}

#[tokio::test]
async fn test_generated_codes_are_unique_and_stored() {
    let store = test_store().await;
    let service = SeaOrmHouseholdService::new(store.clone());

    let owner = create_user(&store, "eier@test.no", "+4741000004").await;
    let household = service.create(owner, "Kodehus", 59.9, 10.7).await.unwrap();

    let mut seen = std::collections::HashSet::new();
    for _ in 0..25 {
        let code = service
            .generate_join_code(owner, household.id)
            .await
            .unwrap();

        assert_eq!(code.code.len(), 8);
        assert!(seen.insert(code.code.clone()), "duplicate code issued");
        assert!(store.join_code_exists(&code.code).await.unwrap());
    }
}

#[tokio::test]
async fn test_join_twice_keeps_single_membership() {
    let store = test_store().await;
    let service = SeaOrmHouseholdService::new(store.clone());

    let owner = create_user(&store, "eier@test.no", "+4741000005").await;
    let joiner = create_user(&store, "gjest@test.no", "+4741000006").await;

    let household = service.create(owner, "Dobbelthus", 59.9, 10.7).await.unwrap();
    let code = service
        .generate_join_code(owner, household.id)
        .await
        .unwrap();

    let first = service.join(joiner, &code.code).await.unwrap().unwrap();
    assert_eq!(first.member_count, 2);

    let second = service.join(joiner, &code.code).await.unwrap().unwrap();
    assert_eq!(second.member_count, 2);
}

#[tokio::test]
async fn test_remove_member_is_silent_noop_when_absent() {
    let store = test_store().await;
    let service = SeaOrmHouseholdService::new(store.clone());

    let owner = create_user(&store, "eier@test.no", "+4741000007").await;
    let outsider = create_user(&store, "utenfor@test.no", "+4741000008").await;

    let household = service.create(owner, "Stille hus", 59.9, 10.7).await.unwrap();

    // The outsider was never a member; removal still succeeds.
    service
        .remove_member(owner, household.id, outsider)
        .await
        .unwrap();

    assert_eq!(store.household_member_count(household.id).await.unwrap(), 1);
}

#[tokio::test]
async fn test_new_member_is_not_household_admin() {
    let store = test_store().await;
    let service = SeaOrmHouseholdService::new(store.clone());

    let owner = create_user(&store, "eier@test.no", "+4741000009").await;
    let joiner = create_user(&store, "gjest@test.no", "+4741000010").await;

    let household = service.create(owner, "Rollehus", 59.9, 10.7).await.unwrap();
    let code = service
        .generate_join_code(owner, household.id)
        .await
        .unwrap();
    service.join(joiner, &code.code).await.unwrap().unwrap();

    let membership = store.membership(joiner, household.id).await.unwrap().unwrap();
    assert!(!membership.is_admin);

    let owner_membership = store.membership(owner, household.id).await.unwrap().unwrap();
    assert!(owner_membership.is_admin);
    assert!(owner_membership.is_primary);
}

#[tokio::test]
async fn test_item_delete_clears_household_associations() {
    let store = test_store().await;
    let service = SeaOrmHouseholdService::new(store.clone());

    let owner = create_user(&store, "eier@test.no", "+4741000011").await;
    let household = service.create(owner, "Lagerhus", 59.9, 10.7).await.unwrap();

    let item = store
        .create_item(&ItemInput {
            name: "Knekkebrød".to_string(),
            amount: 3.0,
            unit_id: 5,
            category_id: 4,
            expiration_date: None,
            household_ids: vec![household.id],
        })
        .await
        .unwrap();

    assert_eq!(
        store.households_for_item(item.id).await.unwrap(),
        vec![household.id]
    );

    assert!(store.remove_item(item.id).await.unwrap());

    assert!(store.get_item(item.id).await.unwrap().is_none());
    assert!(store.households_for_item(item.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_primary_household_moves_with_set_primary() {
    let store = test_store().await;
    let service = SeaOrmHouseholdService::new(store.clone());

    let user = create_user(&store, "flytter@test.no", "+4741000012").await;

    let first = service.create(user, "Første", 59.9, 10.7).await.unwrap();
    let second = service.create(user, "Andre", 63.4, 10.4).await.unwrap();

    // The first household became primary automatically.
    assert!(store.membership(user, first.id).await.unwrap().unwrap().is_primary);
    assert!(!store.membership(user, second.id).await.unwrap().unwrap().is_primary);

    service.set_primary(user, second.id).await.unwrap();

    assert!(!store.membership(user, first.id).await.unwrap().unwrap().is_primary);
    assert!(store.membership(user, second.id).await.unwrap().unwrap().is_primary);
}
