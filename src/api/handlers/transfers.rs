use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::handlers::players::PlayerWithTeamResponse;
use crate::api::SharedStore;
use crate::domain::transfer::TransferEngine;

/// Move a player to a destination team, settling the transfer fee between
/// the two teams' balances
///
/// POST /api/players/:player_id/transfer/:team_id
pub async fn transfer_player(
    State(store): State<SharedStore>,
    Path((player_id, team_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<PlayerWithTeamResponse>, ApiError> {
    let engine = TransferEngine::new(store);

    let outcome = engine.transfer(player_id, team_id).await?;

    Ok(Json(PlayerWithTeamResponse::from(&outcome)))
}
