use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::player::Player;
use crate::domain::roster::{PlayerWithTeam, TeamWithPlayers};
use crate::domain::team::Team;

/// Errors raised by store implementations
///
/// Absence of a record is not an error; lookups return `Option` and
/// updates/deletes report affected rows instead.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The state observed by the caller changed before the write could be
    /// applied; nothing was written.
    #[error("concurrent modification detected")]
    Conflict,

    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// The three writes of a transfer settlement plus the state the engine
/// observed when it priced the transfer
///
/// The store must re-validate every `expected_*` field inside the same
/// transaction that applies the writes, and reject with
/// [`StoreError::Conflict`] - writing nothing - if any of them went stale.
#[derive(Debug, Clone)]
pub struct TransferCommit {
    pub player_id: Uuid,
    pub destination_team_id: Uuid,
    /// The selling team; `None` when the player was unowned (no credit step).
    pub origin_team_id: Option<Uuid>,
    pub fee: Decimal,
    pub expected_player_team: Option<Uuid>,
    pub expected_origin_balance: Option<Decimal>,
    pub expected_destination_balance: Decimal,
}

/// Store contract for the Team and Player aggregates
///
/// Point lookups, eager-join views, conditional single-row writes, and the
/// atomic multi-row transfer commit. Relationship-bearing reads come back
/// fully materialized - implementations must not fetch per related row.
#[async_trait]
pub trait RosterStore: Send + Sync {
    // ===== Teams =====

    async fn insert_team(&self, team: &Team) -> Result<(), StoreError>;

    async fn find_team(&self, id: Uuid) -> Result<Option<Team>, StoreError>;

    async fn find_team_with_players(&self, id: Uuid)
        -> Result<Option<TeamWithPlayers>, StoreError>;

    async fn list_teams_with_players(&self) -> Result<Vec<TeamWithPlayers>, StoreError>;

    /// Updates an existing row; returns affected rows (0 = the team vanished
    /// under the caller).
    async fn update_team(&self, team: &Team) -> Result<u64, StoreError>;

    /// Detaches owned players and deletes the team as one unit; returns
    /// affected team rows.
    async fn delete_team(&self, id: Uuid) -> Result<u64, StoreError>;

    // ===== Players =====

    async fn insert_player(&self, player: &Player) -> Result<(), StoreError>;

    async fn find_player(&self, id: Uuid) -> Result<Option<Player>, StoreError>;

    async fn find_player_with_team(&self, id: Uuid)
        -> Result<Option<PlayerWithTeam>, StoreError>;

    async fn list_players_with_team(&self) -> Result<Vec<PlayerWithTeam>, StoreError>;

    async fn update_player(&self, player: &Player) -> Result<u64, StoreError>;

    async fn delete_player(&self, id: Uuid) -> Result<u64, StoreError>;

    // ===== Transfer settlement =====

    /// Applies the two balance moves and the ownership change together, or
    /// not at all. See [`TransferCommit`].
    async fn commit_transfer(&self, commit: &TransferCommit) -> Result<(), StoreError>;
}
