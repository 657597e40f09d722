//! Game session lifecycle through the public registry API
//! Starts games, places bets, expires and settles them with a controlled clock

use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use yolo_game::{
    config::GameConfig,
    games::{
        types::MINOR_UNITS_PER_UNIT, Clock, FixedNumberSource, ManualClock, NumberSource,
        VRFGameEngine,
    },
    GameError, PlaceBetRequest, SessionRegistry, StakeStatus,
};

const TEN: u64 = 10 * MINOR_UNITS_PER_UNIT;

fn registry_with(numbers: Arc<dyn NumberSource>) -> (SessionRegistry, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
    ));
    let registry = SessionRegistry::new(GameConfig::default(), clock.clone(), numbers);
    (registry, clock)
}

fn bet(game_id: &str, nickname: &str, number: u8) -> PlaceBetRequest {
    PlaceBetRequest::new(game_id, nickname, number, TEN)
}

fn start_random_game(registry: &SessionRegistry) -> String {
    registry.open_game(None).unwrap().id().to_string()
}

#[test]
fn test_bet_on_unknown_game_is_rejected() {
    let (registry, _) = registry_with(Arc::new(FixedNumberSource(0)));

    let result = registry.place_bet(bet("does-not-exist", "emmanuel", 5));
    assert_eq!(
        result,
        Err(GameError::GameDoesNotExist("does-not-exist".to_string()))
    );
}

#[test]
fn test_new_game_is_registered_and_empty() {
    let (registry, _) = registry_with(Arc::new(FixedNumberSource(0)));

    let game = registry.open_game(Some("fresh".to_string())).unwrap();

    assert!(registry.is_game_available("fresh"));
    assert!(game.players().is_empty());
    assert_eq!(game.correct_number(), None);
    assert!(game.is_active());
}

#[test]
fn test_duplicate_game_id_is_rejected() {
    let (registry, _) = registry_with(Arc::new(FixedNumberSource(0)));

    registry.open_game(Some("same".to_string())).unwrap();
    let again = registry.open_game(Some("same".to_string()));

    assert_eq!(again.unwrap_err(), GameError::DuplicateGameId("same".to_string()));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_bet_on_expired_game_is_rejected() {
    let (registry, clock) = registry_with(Arc::new(FixedNumberSource(0)));
    let expired = registry
        .new_game("expired")
        .with_timeout(clock.now() - Duration::seconds(5));
    registry.start_new_game(expired).unwrap();

    let result = registry.place_bet(bet("expired", "emmanuel", 5));
    assert_eq!(result, Err(GameError::GameTimedOut("expired".to_string())));
}

#[test]
fn test_game_closes_once_timeout_passes() {
    let (registry, clock) = registry_with(Arc::new(FixedNumberSource(0)));
    let id = start_random_game(&registry);

    clock.advance(Duration::seconds(59));
    assert!(registry.place_bet(bet(&id, "early", 1)).is_ok());

    clock.advance(Duration::seconds(1));
    assert!(!registry.is_game_open(&id));
    assert!(registry.is_game_available(&id));
    assert!(matches!(
        registry.place_bet(bet(&id, "late", 1)),
        Err(GameError::GameTimedOut(_))
    ));
    assert!(matches!(registry.end_game(&id), Err(GameError::GameTimedOut(_))));
}

#[test]
fn test_player_places_bet() {
    let (registry, _) = registry_with(Arc::new(FixedNumberSource(0)));
    let id = start_random_game(&registry);

    registry.place_bet(bet(&id, "emmanuel", 5)).unwrap();

    let game = registry.get_game_by_id(&id).unwrap();
    let player = &game.players()["emmanuel"];
    assert_eq!(player.nickname, "emmanuel");
    assert_eq!(player.stake_amount, TEN);
    assert_eq!(player.stake_status, None);
    assert_eq!(player.end_of_game_balance, None);
}

#[test]
fn test_rebet_replaces_previous_bet() {
    let (registry, _) = registry_with(Arc::new(FixedNumberSource(0)));
    let id = start_random_game(&registry);

    registry.place_bet(bet(&id, "emmanuel", 5)).unwrap();
    registry
        .place_bet(PlaceBetRequest::new(&id, "emmanuel", 7, 2 * TEN))
        .unwrap();

    let game = registry.get_game_by_id(&id).unwrap();
    assert_eq!(game.players().len(), 1);
    assert_eq!(game.players()["emmanuel"].guessed_number, 7);
    assert_eq!(game.players()["emmanuel"].stake_amount, 2 * TEN);
}

#[test]
fn test_end_game_sets_correct_number() {
    let (registry, _) = registry_with(Arc::new(FixedNumberSource(3)));
    let id = start_random_game(&registry);

    let ended = registry.end_game(&id).unwrap();

    assert!(!ended.is_active());
    assert_eq!(ended.correct_number(), Some(3));
    assert!(matches!(registry.end_game(&id), Err(GameError::GameTimedOut(_))));
}

#[test]
fn test_end_game_rewards_winners() {
    let (registry, _) = registry_with(Arc::new(FixedNumberSource(4)));
    let id = start_random_game(&registry);

    registry.place_bet(bet(&id, "player1", 5)).unwrap();
    registry.place_bet(bet(&id, "player2", 4)).unwrap();
    registry.place_bet(bet(&id, "player3", 5)).unwrap();

    let ended = registry.end_game(&id).unwrap();
    assert_eq!(ended.correct_number(), Some(4));
    assert_eq!(ended.players().len(), 3);

    let losers = ended
        .players()
        .values()
        .filter(|p| p.stake_status == Some(StakeStatus::Loss))
        .count();
    assert_eq!(losers, 2);

    let winners: Vec<_> = ended
        .players()
        .values()
        .filter(|p| p.stake_status == Some(StakeStatus::Win))
        .collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].nickname, "player2");
    assert_eq!(winners[0].end_of_game_balance, Some(99 * MINOR_UNITS_PER_UNIT));

    let stats = registry.stats();
    assert_eq!(stats.games_settled, 1);
    assert_eq!(stats.winning_bets, 1);
    assert_eq!(stats.total_wagered, 3 * TEN);
}

#[test]
fn test_vrf_settled_game_verifies() {
    let (registry, _) = registry_with(Arc::new(VRFGameEngine::new_random()));
    let id = start_random_game(&registry);
    registry.place_bet(bet(&id, "emmanuel", 5)).unwrap();

    let ended = registry.end_game(&id).unwrap();

    assert!(ended.fairness().is_some());
    assert!(ended.correct_number().unwrap() <= 9);
    assert!(VRFGameEngine::verify_game(&ended).unwrap());
}
