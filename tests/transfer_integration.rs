//! Transfer Engine behavior against the in-memory store
//!
//! Covers pricing scenarios, settlement atomicity, the no-origin case, and
//! serialization of two competing transfers over one destination team.

use std::sync::Arc;

use chrono::{Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use football_manager_api::domain::error::DomainError;
use football_manager_api::domain::player::Player;
use football_manager_api::domain::repositories::RosterStore;
use football_manager_api::domain::team::Team;
use football_manager_api::domain::transfer::TransferEngine;
use football_manager_api::infrastructure::repositories::InMemoryRosterStore;

fn new_store() -> Arc<InMemoryRosterStore> {
    Arc::new(InMemoryRosterStore::new())
}

fn birth_date_years_ago(years: u32) -> NaiveDate {
    Utc::now()
        .date_naive()
        .checked_sub_months(Months::new(12 * years))
        .unwrap()
}

async fn seed_team(
    store: &Arc<InMemoryRosterStore>,
    name: &str,
    balance: i64,
    commission_percentage: i32,
) -> Team {
    let team = Team::new(name.to_string(), Decimal::from(balance), commission_percentage).unwrap();
    store.insert_team(&team).await.unwrap();
    team
}

async fn seed_player(
    store: &Arc<InMemoryRosterStore>,
    age_years: u32,
    experience_months: i32,
    team_id: Option<Uuid>,
) -> Player {
    let player = Player::new(
        "Jude".to_string(),
        "Bellingham".to_string(),
        birth_date_years_ago(age_years),
        experience_months,
        team_id,
    )
    .unwrap();
    store.insert_player(&player).await.unwrap();
    player
}

#[tokio::test]
async fn successful_transfer_moves_player_and_conserves_value() {
    let store = new_store();
    let origin = seed_team(&store, "Dortmund", 50_000, 0).await;
    let destination = seed_team(&store, "Real Madrid", 200_000, 5).await;
    // fee = 24 * 100000 / 20 = 120000, +5% = 126000
    let player = seed_player(&store, 20, 24, Some(origin.id())).await;

    let outcome = TransferEngine::new(store.clone())
        .transfer(player.id(), destination.id())
        .await
        .unwrap();

    assert_eq!(outcome.player.team_id(), Some(destination.id()));
    let settled = outcome.team.unwrap();
    assert_eq!(settled.id(), destination.id());
    assert_eq!(settled.balance(), Decimal::from(74_000));

    let origin_after = store.find_team(origin.id()).await.unwrap().unwrap();
    let destination_after = store.find_team(destination.id()).await.unwrap().unwrap();
    assert_eq!(origin_after.balance(), Decimal::from(176_000));
    assert_eq!(destination_after.balance(), Decimal::from(74_000));

    // value is conserved, only moved
    assert_eq!(
        origin_after.balance() + destination_after.balance(),
        Decimal::from(50_000 + 200_000)
    );

    let player_after = store.find_player(player.id()).await.unwrap().unwrap();
    assert_eq!(player_after.team_id(), Some(destination.id()));
}

#[tokio::test]
async fn insufficient_balance_fails_without_any_mutation() {
    let store = new_store();
    let origin = seed_team(&store, "Dortmund", 50_000, 0).await;
    // fee = 120000 + 10% = 132000 > 100000
    let destination = seed_team(&store, "Arsenal", 100_000, 10).await;
    let player = seed_player(&store, 20, 24, Some(origin.id())).await;

    let result = TransferEngine::new(store.clone())
        .transfer(player.id(), destination.id())
        .await;

    match result {
        Err(DomainError::InsufficientBalance {
            team_id,
            available,
            required,
        }) => {
            assert_eq!(team_id, destination.id());
            assert_eq!(available, Decimal::from(100_000));
            assert_eq!(required, Decimal::from(132_000));
        }
        other => panic!("expected InsufficientBalance, got {other:?}"),
    }

    // state is identical to the pre-call values
    assert_eq!(
        store.find_team(origin.id()).await.unwrap().unwrap(),
        origin
    );
    assert_eq!(
        store.find_team(destination.id()).await.unwrap().unwrap(),
        destination
    );
    assert_eq!(
        store.find_player(player.id()).await.unwrap().unwrap(),
        player
    );
}

#[tokio::test]
async fn unowned_player_transfers_in_with_no_seller_credited() {
    let store = new_store();
    let bystander = seed_team(&store, "Dortmund", 50_000, 0).await;
    let destination = seed_team(&store, "Real Madrid", 200_000, 5).await;
    let player = seed_player(&store, 20, 24, None).await;

    let outcome = TransferEngine::new(store.clone())
        .transfer(player.id(), destination.id())
        .await
        .unwrap();

    assert_eq!(outcome.player.team_id(), Some(destination.id()));

    let destination_after = store.find_team(destination.id()).await.unwrap().unwrap();
    assert_eq!(destination_after.balance(), Decimal::from(74_000));

    // no team was credited
    let bystander_after = store.find_team(bystander.id()).await.unwrap().unwrap();
    assert_eq!(bystander_after.balance(), Decimal::from(50_000));
}

#[tokio::test]
async fn balance_exactly_equal_to_fee_succeeds_down_to_zero() {
    let store = new_store();
    let destination = seed_team(&store, "Arsenal", 126_000, 5).await;
    let player = seed_player(&store, 20, 24, None).await;

    TransferEngine::new(store.clone())
        .transfer(player.id(), destination.id())
        .await
        .unwrap();

    let destination_after = store.find_team(destination.id()).await.unwrap().unwrap();
    assert_eq!(destination_after.balance(), Decimal::ZERO);
}

#[tokio::test]
async fn balance_one_cent_short_of_fee_fails() {
    let store = new_store();
    let destination = Team::new(
        "Arsenal".to_string(),
        Decimal::new(12_599_999, 2), // 125999.99, one cent short of 126000
        5,
    )
    .unwrap();
    store.insert_team(&destination).await.unwrap();
    let player = seed_player(&store, 20, 24, None).await;

    let result = TransferEngine::new(store.clone())
        .transfer(player.id(), destination.id())
        .await;

    assert!(matches!(
        result,
        Err(DomainError::InsufficientBalance { .. })
    ));

    let destination_after = store.find_team(destination.id()).await.unwrap().unwrap();
    assert_eq!(destination_after.balance(), Decimal::new(12_599_999, 2));
    let player_after = store.find_player(player.id()).await.unwrap().unwrap();
    assert_eq!(player_after.team_id(), None);
}

#[tokio::test]
async fn unknown_player_and_team_are_reported_as_not_found() {
    let store = new_store();
    let destination = seed_team(&store, "Arsenal", 100_000, 10).await;
    let player = seed_player(&store, 20, 24, None).await;
    let engine = TransferEngine::new(store.clone());

    let missing_player = engine.transfer(Uuid::new_v4(), destination.id()).await;
    assert!(matches!(
        missing_player,
        Err(DomainError::PlayerNotFound(_))
    ));

    let missing_team = engine.transfer(player.id(), Uuid::new_v4()).await;
    assert!(matches!(missing_team, Err(DomainError::TeamNotFound(_))));
}

#[tokio::test]
async fn transfer_within_the_same_team_nets_to_zero() {
    let store = new_store();
    let team = seed_team(&store, "Real Madrid", 200_000, 5).await;
    let player = seed_player(&store, 20, 24, Some(team.id())).await;

    let outcome = TransferEngine::new(store.clone())
        .transfer(player.id(), team.id())
        .await
        .unwrap();

    assert_eq!(outcome.player.team_id(), Some(team.id()));

    let team_after = store.find_team(team.id()).await.unwrap().unwrap();
    assert_eq!(team_after.balance(), Decimal::from(200_000));
}

#[tokio::test]
async fn zero_age_player_cannot_be_priced() {
    let store = new_store();
    let destination = seed_team(&store, "Arsenal", 100_000, 10).await;
    // six months old: age resolves to 0
    let birth = Utc::now()
        .date_naive()
        .checked_sub_months(Months::new(6))
        .unwrap();
    let player = Player::new(
        "Jude".to_string(),
        "Bellingham".to_string(),
        birth,
        6,
        None,
    )
    .unwrap();
    store.insert_player(&player).await.unwrap();

    let result = TransferEngine::new(store.clone())
        .transfer(player.id(), destination.id())
        .await;

    assert!(matches!(result, Err(DomainError::InvalidAge)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn competing_transfers_into_an_underfunded_team_settle_exactly_one() {
    let store = new_store();
    // each fee is 120000; the balance covers one transfer, not two
    let destination = seed_team(&store, "Manchester City", 150_000, 0).await;
    let first = seed_player(&store, 20, 24, None).await;
    let second = seed_player(&store, 20, 24, None).await;

    let engine_a = TransferEngine::new(store.clone());
    let engine_b = TransferEngine::new(store.clone());
    let destination_id = destination.id();
    let first_id = first.id();
    let second_id = second.id();

    let (a, b) = tokio::join!(
        tokio::spawn(async move { engine_a.transfer(first_id, destination_id).await }),
        tokio::spawn(async move { engine_b.transfer(second_id, destination_id).await }),
    );
    let a = a.unwrap();
    let b = b.unwrap();

    let successes = [&a, &b].into_iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one transfer must win");

    let loser = if a.is_ok() { &b } else { &a };
    assert!(matches!(
        loser,
        Err(DomainError::InsufficientBalance { .. })
    ));

    // the final balance reflects exactly one settled fee
    let destination_after = store.find_team(destination_id).await.unwrap().unwrap();
    assert_eq!(destination_after.balance(), Decimal::from(30_000));

    let first_after = store.find_player(first_id).await.unwrap().unwrap();
    let second_after = store.find_player(second_id).await.unwrap().unwrap();
    let moved = [first_after.team_id(), second_after.team_id()]
        .into_iter()
        .filter(|t| *t == Some(destination_id))
        .count();
    assert_eq!(moved, 1, "exactly one player must change ownership");
}
