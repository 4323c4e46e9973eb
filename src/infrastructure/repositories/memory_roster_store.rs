use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::player::Player;
use crate::domain::repositories::{RosterStore, StoreError, TransferCommit};
use crate::domain::roster::{PlayerWithTeam, TeamWithPlayers};
use crate::domain::team::Team;

#[derive(Default)]
struct RosterState {
    teams: HashMap<Uuid, Team>,
    players: HashMap<Uuid, Player>,
}

/// In-memory implementation of [`RosterStore`]
///
/// Two maps behind one mutex. Every operation takes the lock exactly once
/// and holds it for the whole operation, so single-row atomicity is
/// immediate and `commit_transfer` re-validates and applies under the same
/// acquisition. Backs the test suite and local runs without PostgreSQL.
#[derive(Default)]
pub struct InMemoryRosterStore {
    state: Mutex<RosterState>,
}

impl InMemoryRosterStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn by_name(teams: &mut [TeamWithPlayers]) {
    teams.sort_by(|a, b| a.team.name().cmp(b.team.name()));
}

fn by_player_name(players: &mut [Player]) {
    players.sort_by(|a, b| {
        (a.last_name(), a.first_name()).cmp(&(b.last_name(), b.first_name()))
    });
}

#[async_trait]
impl RosterStore for InMemoryRosterStore {
    async fn insert_team(&self, team: &Team) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();

        if state.teams.contains_key(&team.id()) {
            return Err(StoreError::Database(format!(
                "duplicate team id: {}",
                team.id()
            )));
        }

        state.teams.insert(team.id(), team.clone());
        Ok(())
    }

    async fn find_team(&self, id: Uuid) -> Result<Option<Team>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.teams.get(&id).cloned())
    }

    async fn find_team_with_players(
        &self,
        id: Uuid,
    ) -> Result<Option<TeamWithPlayers>, StoreError> {
        let state = self.state.lock().unwrap();

        let Some(team) = state.teams.get(&id).cloned() else {
            return Ok(None);
        };

        let mut players: Vec<Player> = state
            .players
            .values()
            .filter(|p| p.team_id() == Some(id))
            .cloned()
            .collect();
        by_player_name(&mut players);

        Ok(Some(TeamWithPlayers { team, players }))
    }

    async fn list_teams_with_players(&self) -> Result<Vec<TeamWithPlayers>, StoreError> {
        let state = self.state.lock().unwrap();

        let mut views: Vec<TeamWithPlayers> = state
            .teams
            .values()
            .map(|team| {
                let mut players: Vec<Player> = state
                    .players
                    .values()
                    .filter(|p| p.team_id() == Some(team.id()))
                    .cloned()
                    .collect();
                by_player_name(&mut players);

                TeamWithPlayers {
                    team: team.clone(),
                    players,
                }
            })
            .collect();
        by_name(&mut views);

        Ok(views)
    }

    async fn update_team(&self, team: &Team) -> Result<u64, StoreError> {
        let mut state = self.state.lock().unwrap();

        if !state.teams.contains_key(&team.id()) {
            return Ok(0);
        }

        state.teams.insert(team.id(), team.clone());
        Ok(1)
    }

    async fn delete_team(&self, id: Uuid) -> Result<u64, StoreError> {
        let mut state = self.state.lock().unwrap();

        if state.teams.remove(&id).is_none() {
            return Ok(0);
        }

        // Detach owned players; an ownership reference must never dangle.
        let owned: Vec<Player> = state
            .players
            .values()
            .filter(|p| p.team_id() == Some(id))
            .cloned()
            .collect();
        for player in owned {
            let detached = Player::from_persistence(
                player.id(),
                player.first_name().to_string(),
                player.last_name().to_string(),
                player.birth_date(),
                player.experience_months(),
                None,
            );
            state.players.insert(detached.id(), detached);
        }

        Ok(1)
    }

    async fn insert_player(&self, player: &Player) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();

        if state.players.contains_key(&player.id()) {
            return Err(StoreError::Database(format!(
                "duplicate player id: {}",
                player.id()
            )));
        }

        state.players.insert(player.id(), player.clone());
        Ok(())
    }

    async fn find_player(&self, id: Uuid) -> Result<Option<Player>, StoreError> {
        let state = self.state.lock().unwrap();
        Ok(state.players.get(&id).cloned())
    }

    async fn find_player_with_team(
        &self,
        id: Uuid,
    ) -> Result<Option<PlayerWithTeam>, StoreError> {
        let state = self.state.lock().unwrap();

        let Some(player) = state.players.get(&id).cloned() else {
            return Ok(None);
        };

        let team = player.team_id().and_then(|tid| state.teams.get(&tid)).cloned();
        Ok(Some(PlayerWithTeam { player, team }))
    }

    async fn list_players_with_team(&self) -> Result<Vec<PlayerWithTeam>, StoreError> {
        let state = self.state.lock().unwrap();

        let mut players: Vec<Player> = state.players.values().cloned().collect();
        by_player_name(&mut players);

        Ok(players
            .into_iter()
            .map(|player| {
                let team = player
                    .team_id()
                    .and_then(|tid| state.teams.get(&tid))
                    .cloned();
                PlayerWithTeam { player, team }
            })
            .collect())
    }

    async fn update_player(&self, player: &Player) -> Result<u64, StoreError> {
        let mut state = self.state.lock().unwrap();

        if !state.players.contains_key(&player.id()) {
            return Ok(0);
        }

        state.players.insert(player.id(), player.clone());
        Ok(1)
    }

    async fn delete_player(&self, id: Uuid) -> Result<u64, StoreError> {
        let mut state = self.state.lock().unwrap();
        Ok(u64::from(state.players.remove(&id).is_some()))
    }

    async fn commit_transfer(&self, commit: &TransferCommit) -> Result<(), StoreError> {
        let mut state = self.state.lock().unwrap();

        // Re-validate every expectation before touching anything; a stale
        // commit must leave the state byte-identical.
        let Some(player) = state.players.get(&commit.player_id) else {
            return Err(StoreError::Conflict);
        };
        if player.team_id() != commit.expected_player_team {
            return Err(StoreError::Conflict);
        }

        let Some(destination) = state.teams.get(&commit.destination_team_id) else {
            return Err(StoreError::Conflict);
        };
        if destination.balance() != commit.expected_destination_balance {
            return Err(StoreError::Conflict);
        }

        if let Some(origin_id) = commit.origin_team_id {
            let Some(origin) = state.teams.get(&origin_id) else {
                return Err(StoreError::Conflict);
            };
            if Some(origin.balance()) != commit.expected_origin_balance {
                return Err(StoreError::Conflict);
            }
        }

        // All expectations hold; apply the three writes under the same lock
        // acquisition. A transfer within the same team nets to zero.
        if commit.origin_team_id != Some(commit.destination_team_id) {
            if let Some(origin_id) = commit.origin_team_id {
                let credited = state.teams[&origin_id].credited(commit.fee);
                state.teams.insert(origin_id, credited);
            }

            let debited = state.teams[&commit.destination_team_id].debited(commit.fee);
            state.teams.insert(commit.destination_team_id, debited);
        }

        let moved = state.players[&commit.player_id].assigned_to(commit.destination_team_id);
        state.players.insert(moved.id(), moved);

        Ok(())
    }
}
