use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::{ApiError, FieldErrors};
use crate::api::handlers::players::PlayerResponse;
use crate::api::SharedStore;
use crate::domain::error::DomainError;
use crate::domain::roster::TeamWithPlayers;
use crate::domain::team::Team;

/// Request body for creating a team or replacing its writable fields
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPayload {
    pub name: Option<String>,
    pub balance: Option<Decimal>,
    pub commission_percentage: Option<i32>,
}

impl TeamPayload {
    /// Per-field validation, run before any domain logic; on failure every
    /// violated field is reported at once.
    fn validate(self) -> Result<(String, Decimal, i32), ApiError> {
        let mut errors = FieldErrors::new();

        let name = match self.name {
            Some(v) if !v.trim().is_empty() => v,
            _ => {
                errors.insert(
                    "name",
                    "The team name cannot be blank. Please provide a valid name.".to_string(),
                );
                String::new()
            }
        };

        let balance = match self.balance {
            None => {
                errors.insert("balance", "Balance cannot be null. Please specify a balance.".to_string());
                Decimal::ZERO
            }
            Some(b) if b < Decimal::ZERO => {
                errors.insert("balance", "Balance must be at least 0.".to_string());
                Decimal::ZERO
            }
            Some(b) => b,
        };

        let commission_percentage = match self.commission_percentage {
            None => {
                errors.insert(
                    "commissionPercentage",
                    "Commission percentage cannot be null. Please specify a value between 0 and 100."
                        .to_string(),
                );
                0
            }
            Some(c) if c < 0 => {
                errors.insert(
                    "commissionPercentage",
                    "Commission percentage must be at least 0.".to_string(),
                );
                0
            }
            Some(c) if c > 100 => {
                errors.insert(
                    "commissionPercentage",
                    "Commission percentage cannot exceed 100.".to_string(),
                );
                0
            }
            Some(c) => c,
        };

        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        Ok((name, balance, commission_percentage))
    }
}

/// A team's public fields
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamResponse {
    pub id: Uuid,
    pub name: String,
    pub balance: Decimal,
    pub commission_percentage: i32,
}

impl From<&Team> for TeamResponse {
    fn from(team: &Team) -> Self {
        Self {
            id: team.id(),
            name: team.name().to_string(),
            balance: team.balance(),
            commission_percentage: team.commission_percentage(),
        }
    }
}

/// A team together with the players it owns
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamWithPlayersResponse {
    pub id: Uuid,
    pub name: String,
    pub balance: Decimal,
    pub commission_percentage: i32,
    pub players: Vec<PlayerResponse>,
}

impl From<&TeamWithPlayers> for TeamWithPlayersResponse {
    fn from(view: &TeamWithPlayers) -> Self {
        Self {
            id: view.team.id(),
            name: view.team.name().to_string(),
            balance: view.team.balance(),
            commission_percentage: view.team.commission_percentage(),
            players: view.players.iter().map(PlayerResponse::from).collect(),
        }
    }
}

/// List every team with its players
///
/// GET /api/teams
pub async fn list_teams(
    State(store): State<SharedStore>,
) -> Result<Json<Vec<TeamWithPlayersResponse>>, ApiError> {
    let views = store.list_teams_with_players().await?;

    Ok(Json(views.iter().map(TeamWithPlayersResponse::from).collect()))
}

/// Get a team by ID, players included
///
/// GET /api/teams/:id
pub async fn get_team(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
) -> Result<Json<TeamWithPlayersResponse>, ApiError> {
    let view = store
        .find_team_with_players(id)
        .await?
        .ok_or(DomainError::TeamNotFound(id))?;

    Ok(Json(TeamWithPlayersResponse::from(&view)))
}

/// Create a new team
///
/// POST /api/teams
pub async fn create_team(
    State(store): State<SharedStore>,
    Json(payload): Json<TeamPayload>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    let (name, balance, commission_percentage) = payload.validate()?;

    let team = Team::new(name, balance, commission_percentage).map_err(ApiError::bad_request)?;

    store.insert_team(&team).await?;

    Ok((StatusCode::CREATED, Json(TeamResponse::from(&team))))
}

/// Replace a team's writable fields
///
/// PATCH /api/teams/:id
pub async fn update_team(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
    Json(payload): Json<TeamPayload>,
) -> Result<Json<TeamResponse>, ApiError> {
    let (name, balance, commission_percentage) = payload.validate()?;

    let current = store
        .find_team(id)
        .await?
        .ok_or(DomainError::TeamNotFound(id))?;

    let updated = current
        .apply(name, balance, commission_percentage)
        .map_err(ApiError::bad_request)?;

    if store.update_team(&updated).await? == 0 {
        return Err(DomainError::TeamNotFound(id).into());
    }

    Ok(Json(TeamResponse::from(&updated)))
}

/// Delete a team, detaching its players first
///
/// DELETE /api/teams/:id
pub async fn delete_team(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
) -> Result<String, ApiError> {
    if store.delete_team(id).await? == 0 {
        return Err(DomainError::TeamNotFound(id).into());
    }

    Ok("Team deleted successfully".to_string())
}
