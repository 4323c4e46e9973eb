use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::domain::player::Player;
use crate::domain::repositories::{RosterStore, StoreError, TransferCommit};
use crate::domain::roster::{PlayerWithTeam, TeamWithPlayers};
use crate::domain::team::Team;

/// PostgreSQL implementation of [`RosterStore`]
///
/// Relationship-bearing reads are joined in SQL and materialized in one
/// pass. The transfer commit runs as a single transaction that locks its
/// rows in deterministic order (teams by ascending id, then the player) and
/// re-validates the engine's expectations before writing.
pub struct PostgresRosterStore {
    pool: PgPool,
}

impl PostgresRosterStore {
    /// Creates a new PostgresRosterStore
    ///
    /// # Arguments
    /// * `pool` - SQLx connection pool for PostgreSQL
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn team_from_row(row: &PgRow) -> Result<Team, sqlx::Error> {
    Ok(Team::from_persistence(
        row.try_get("id")?,
        row.try_get("name")?,
        row.try_get("balance")?,
        row.try_get("commission_percentage")?,
    ))
}

fn player_from_row(row: &PgRow) -> Result<Player, sqlx::Error> {
    Ok(Player::from_persistence(
        row.try_get("id")?,
        row.try_get("first_name")?,
        row.try_get("last_name")?,
        row.try_get("birth_date")?,
        row.try_get("experience_months")?,
        row.try_get("team_id")?,
    ))
}

#[async_trait]
impl RosterStore for PostgresRosterStore {
    async fn insert_team(&self, team: &Team) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO teams (id, name, balance, commission_percentage) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(team.id())
        .bind(team.name())
        .bind(team.balance())
        .bind(team.commission_percentage())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_team(&self, id: Uuid) -> Result<Option<Team>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, balance, commission_percentage FROM teams WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| team_from_row(&r)).transpose()?)
    }

    async fn find_team_with_players(
        &self,
        id: Uuid,
    ) -> Result<Option<TeamWithPlayers>, StoreError> {
        let Some(team) = self.find_team(id).await? else {
            return Ok(None);
        };

        let rows = sqlx::query(
            "SELECT id, first_name, last_name, birth_date, experience_months, team_id \
             FROM players WHERE team_id = $1 \
             ORDER BY last_name, first_name",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let players = rows
            .iter()
            .map(player_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(TeamWithPlayers { team, players }))
    }

    async fn list_teams_with_players(&self) -> Result<Vec<TeamWithPlayers>, StoreError> {
        let team_rows = sqlx::query(
            "SELECT id, name, balance, commission_percentage FROM teams ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;

        let player_rows = sqlx::query(
            "SELECT id, first_name, last_name, birth_date, experience_months, team_id \
             FROM players WHERE team_id IS NOT NULL \
             ORDER BY last_name, first_name",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut players_by_team: HashMap<Uuid, Vec<Player>> = HashMap::new();
        for row in &player_rows {
            let player = player_from_row(row)?;
            if let Some(team_id) = player.team_id() {
                players_by_team.entry(team_id).or_default().push(player);
            }
        }

        team_rows
            .iter()
            .map(|row| {
                let team = team_from_row(row)?;
                let players = players_by_team.remove(&team.id()).unwrap_or_default();
                Ok(TeamWithPlayers { team, players })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(StoreError::from)
    }

    async fn update_team(&self, team: &Team) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE teams SET name = $2, balance = $3, commission_percentage = $4 WHERE id = $1",
        )
        .bind(team.id())
        .bind(team.name())
        .bind(team.balance())
        .bind(team.commission_percentage())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_team(&self, id: Uuid) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Detach owned players before the row goes away; an ownership
        // reference must never dangle.
        sqlx::query("UPDATE players SET team_id = NULL WHERE team_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM teams WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected())
    }

    async fn insert_player(&self, player: &Player) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO players (id, first_name, last_name, birth_date, experience_months, team_id) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(player.id())
        .bind(player.first_name())
        .bind(player.last_name())
        .bind(player.birth_date())
        .bind(player.experience_months())
        .bind(player.team_id())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_player(&self, id: Uuid) -> Result<Option<Player>, StoreError> {
        let row = sqlx::query(
            "SELECT id, first_name, last_name, birth_date, experience_months, team_id \
             FROM players WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| player_from_row(&r)).transpose()?)
    }

    async fn find_player_with_team(
        &self,
        id: Uuid,
    ) -> Result<Option<PlayerWithTeam>, StoreError> {
        let row = sqlx::query(
            "SELECT p.id, p.first_name, p.last_name, p.birth_date, p.experience_months, p.team_id, \
                    t.name AS team_name, t.balance AS team_balance, \
                    t.commission_percentage AS team_commission_percentage \
             FROM players p \
             LEFT JOIN teams t ON t.id = p.team_id \
             WHERE p.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| player_with_team_from_row(&r))
            .transpose()
            .map_err(StoreError::from)
    }

    async fn list_players_with_team(&self) -> Result<Vec<PlayerWithTeam>, StoreError> {
        let rows = sqlx::query(
            "SELECT p.id, p.first_name, p.last_name, p.birth_date, p.experience_months, p.team_id, \
                    t.name AS team_name, t.balance AS team_balance, \
                    t.commission_percentage AS team_commission_percentage \
             FROM players p \
             LEFT JOIN teams t ON t.id = p.team_id \
             ORDER BY p.last_name, p.first_name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(player_with_team_from_row)
            .collect::<Result<Vec<_>, sqlx::Error>>()
            .map_err(StoreError::from)
    }

    async fn update_player(&self, player: &Player) -> Result<u64, StoreError> {
        let result = sqlx::query(
            "UPDATE players \
             SET first_name = $2, last_name = $3, birth_date = $4, experience_months = $5, team_id = $6 \
             WHERE id = $1",
        )
        .bind(player.id())
        .bind(player.first_name())
        .bind(player.last_name())
        .bind(player.birth_date())
        .bind(player.experience_months())
        .bind(player.team_id())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_player(&self, id: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM players WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn commit_transfer(&self, commit: &TransferCommit) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        // Lock teams in ascending id order so two opposing transfers over
        // the same pair cannot deadlock, then lock the player.
        let mut team_ids: Vec<Uuid> = std::iter::once(commit.destination_team_id)
            .chain(commit.origin_team_id)
            .collect();
        team_ids.sort();
        team_ids.dedup();

        let mut balances: HashMap<Uuid, Decimal> = HashMap::new();
        for team_id in &team_ids {
            let row = sqlx::query("SELECT balance FROM teams WHERE id = $1 FOR UPDATE")
                .bind(team_id)
                .fetch_optional(&mut *tx)
                .await?;

            match row {
                Some(row) => {
                    balances.insert(*team_id, row.try_get("balance")?);
                }
                None => return Err(StoreError::Conflict),
            }
        }

        let player_row = sqlx::query("SELECT team_id FROM players WHERE id = $1 FOR UPDATE")
            .bind(commit.player_id)
            .fetch_optional(&mut *tx)
            .await?;

        let current_team: Option<Uuid> = match player_row {
            Some(row) => row.try_get("team_id")?,
            None => return Err(StoreError::Conflict),
        };

        // Re-validate everything the engine priced against; any drift means
        // the fee or the sufficiency check may no longer hold.
        if current_team != commit.expected_player_team {
            return Err(StoreError::Conflict);
        }
        if balances.get(&commit.destination_team_id) != Some(&commit.expected_destination_balance)
        {
            return Err(StoreError::Conflict);
        }
        if let Some(origin_id) = commit.origin_team_id {
            if balances.get(&origin_id).copied() != commit.expected_origin_balance {
                return Err(StoreError::Conflict);
            }
        }

        // A transfer within the same team nets to zero; skip the balance
        // writes entirely in that case.
        if commit.origin_team_id != Some(commit.destination_team_id) {
            if let Some(origin_id) = commit.origin_team_id {
                sqlx::query("UPDATE teams SET balance = balance + $2 WHERE id = $1")
                    .bind(origin_id)
                    .bind(commit.fee)
                    .execute(&mut *tx)
                    .await?;
            }

            sqlx::query("UPDATE teams SET balance = balance - $2 WHERE id = $1")
                .bind(commit.destination_team_id)
                .bind(commit.fee)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE players SET team_id = $2 WHERE id = $1")
            .bind(commit.player_id)
            .bind(commit.destination_team_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }
}

fn player_with_team_from_row(row: &PgRow) -> Result<PlayerWithTeam, sqlx::Error> {
    let player = player_from_row(row)?;

    let team = match player.team_id() {
        Some(team_id) => Some(Team::from_persistence(
            team_id,
            row.try_get("team_name")?,
            row.try_get("team_balance")?,
            row.try_get("team_commission_percentage")?,
        )),
        None => None,
    };

    Ok(PlayerWithTeam { player, team })
}
