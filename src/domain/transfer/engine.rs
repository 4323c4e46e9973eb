use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::timeout;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::error::DomainError;
use crate::domain::repositories::{RosterStore, StoreError, TransferCommit};
use crate::domain::roster::PlayerWithTeam;
use crate::domain::team::Team;
use crate::domain::transfer::fee::compute_fee;

/// How many times a conflicted settlement is re-run from scratch before the
/// conflict is surfaced to the caller.
const MAX_COMMIT_ATTEMPTS: u32 = 3;

/// Upper bound on one commit attempt, lock waits included.
const COMMIT_TIMEOUT: Duration = Duration::from_secs(5);

/// Orchestrates a player transfer
///
/// Loads the player and both teams, prices the transfer, checks the buyer
/// can pay, and hands the store one [`TransferCommit`] that either applies
/// the two balance moves and the ownership change together or applies
/// nothing. A commit rejected as stale is retried from scratch - fresh
/// loads, fresh fee - a bounded number of times.
pub struct TransferEngine {
    store: Arc<dyn RosterStore>,
}

impl TransferEngine {
    pub fn new(store: Arc<dyn RosterStore>) -> Self {
        Self { store }
    }

    /// Moves a player to `destination_team_id`, settling the fee between the
    /// origin team (if any) and the destination
    ///
    /// On success returns the updated player together with its new team,
    /// both reflecting post-settlement state. Any error means no state
    /// changed.
    pub async fn transfer(
        &self,
        player_id: Uuid,
        destination_team_id: Uuid,
    ) -> Result<PlayerWithTeam, DomainError> {
        let mut attempt = 1;
        loop {
            match self.try_transfer(player_id, destination_team_id).await {
                Err(DomainError::ConcurrencyConflict) if attempt < MAX_COMMIT_ATTEMPTS => {
                    warn!(
                        %player_id,
                        %destination_team_id,
                        attempt,
                        "transfer commit conflicted, retrying"
                    );
                    attempt += 1;
                }
                outcome => return outcome,
            }
        }
    }

    async fn try_transfer(
        &self,
        player_id: Uuid,
        destination_team_id: Uuid,
    ) -> Result<PlayerWithTeam, DomainError> {
        let player = self
            .store
            .find_player(player_id)
            .await?
            .ok_or(DomainError::PlayerNotFound(player_id))?;

        let destination = self
            .store
            .find_team(destination_team_id)
            .await?
            .ok_or(DomainError::TeamNotFound(destination_team_id))?;

        let fee = compute_fee(&player, &destination, Utc::now().date_naive())?;

        if destination.balance() < fee {
            return Err(DomainError::InsufficientBalance {
                team_id: destination_team_id,
                available: destination.balance(),
                required: fee,
            });
        }

        // An unowned player transfers in with no seller to credit.
        let origin: Option<Team> = match player.team_id() {
            Some(origin_id) => Some(
                self.store
                    .find_team(origin_id)
                    .await?
                    .ok_or(DomainError::TeamNotFound(origin_id))?,
            ),
            None => None,
        };

        let commit = TransferCommit {
            player_id,
            destination_team_id,
            origin_team_id: origin.as_ref().map(Team::id),
            fee,
            expected_player_team: player.team_id(),
            expected_origin_balance: origin.as_ref().map(Team::balance),
            expected_destination_balance: destination.balance(),
        };

        match timeout(COMMIT_TIMEOUT, self.store.commit_transfer(&commit)).await {
            // Could not acquire the rows within the bound; nothing was
            // written, so report it as retryable.
            Err(_elapsed) => Err(DomainError::ConcurrencyConflict),
            Ok(Err(StoreError::Conflict)) => Err(DomainError::ConcurrencyConflict),
            Ok(Err(StoreError::Database(message))) => Err(DomainError::Store(message)),
            Ok(Ok(())) => {
                info!(
                    %player_id,
                    origin_team = ?commit.origin_team_id,
                    %destination_team_id,
                    %fee,
                    "transfer settled"
                );

                // A transfer within the same team nets to zero.
                let settled_destination = if commit.origin_team_id == Some(destination_team_id) {
                    destination
                } else {
                    destination.debited(fee)
                };

                Ok(PlayerWithTeam {
                    player: player.assigned_to(destination_team_id),
                    team: Some(settled_destination),
                })
            }
        }
    }
}
