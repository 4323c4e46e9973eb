use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::errors::{ApiError, FieldErrors};
use crate::api::handlers::teams::TeamResponse;
use crate::api::SharedStore;
use crate::domain::error::DomainError;
use crate::domain::player::Player;
use crate::domain::roster::PlayerWithTeam;
use crate::domain::team::Team;

/// Request body for creating a player or replacing its writable fields
///
/// `teamId` is optional: a player may be created or left unowned.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerPayload {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub experience_months: Option<i32>,
    pub team_id: Option<Uuid>,
}

struct ValidatedPlayerPayload {
    first_name: String,
    last_name: String,
    birth_date: NaiveDate,
    experience_months: i32,
    team_id: Option<Uuid>,
}

impl PlayerPayload {
    /// Per-field validation, run before any domain logic; on failure every
    /// violated field is reported at once.
    fn validate(self) -> Result<ValidatedPlayerPayload, ApiError> {
        let mut errors = FieldErrors::new();
        let today = Utc::now().date_naive();

        let first_name = match self.first_name {
            Some(v) if !v.trim().is_empty() => v,
            _ => {
                errors.insert(
                    "firstName",
                    "The first name cannot be blank. Please provide a valid first name."
                        .to_string(),
                );
                String::new()
            }
        };

        let last_name = match self.last_name {
            Some(v) if !v.trim().is_empty() => v,
            _ => {
                errors.insert(
                    "lastName",
                    "The last name cannot be blank. Please provide a valid last name.".to_string(),
                );
                String::new()
            }
        };

        let birth_date = match self.birth_date {
            None => {
                errors.insert("birthDate", "Birth date cannot be null.".to_string());
                today
            }
            Some(d) if d >= today => {
                errors.insert("birthDate", "Birth date must be in the past.".to_string());
                today
            }
            Some(d) => d,
        };

        let experience_months = match self.experience_months {
            None => {
                errors.insert("experienceMonths", "Experience cannot be null.".to_string());
                0
            }
            Some(v) if v < 0 => {
                errors.insert("experienceMonths", "Experience must be at least 0.".to_string());
                0
            }
            Some(v) => v,
        };

        if !errors.is_empty() {
            return Err(ApiError::validation(errors));
        }

        Ok(ValidatedPlayerPayload {
            first_name,
            last_name,
            birth_date,
            experience_months,
            team_id: self.team_id,
        })
    }
}

/// A player's public fields
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub experience_months: i32,
}

impl From<&Player> for PlayerResponse {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id(),
            first_name: player.first_name().to_string(),
            last_name: player.last_name().to_string(),
            age: player.age_on(Utc::now().date_naive()),
            experience_months: player.experience_months(),
        }
    }
}

/// A player together with its owning team's public fields, if any
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerWithTeamResponse {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub age: i32,
    pub experience_months: i32,
    pub team: Option<TeamResponse>,
}

impl From<&PlayerWithTeam> for PlayerWithTeamResponse {
    fn from(view: &PlayerWithTeam) -> Self {
        let fields = PlayerResponse::from(&view.player);

        Self {
            id: fields.id,
            first_name: fields.first_name,
            last_name: fields.last_name,
            age: fields.age,
            experience_months: fields.experience_months,
            team: view.team.as_ref().map(TeamResponse::from),
        }
    }
}

/// Resolves an optional owning team, rejecting references to teams that do
/// not exist.
async fn resolve_team(
    store: &SharedStore,
    team_id: Option<Uuid>,
) -> Result<Option<Team>, ApiError> {
    match team_id {
        Some(id) => {
            let team = store
                .find_team(id)
                .await?
                .ok_or(DomainError::TeamNotFound(id))?;
            Ok(Some(team))
        }
        None => Ok(None),
    }
}

/// List every player with its owning team
///
/// GET /api/players
pub async fn list_players(
    State(store): State<SharedStore>,
) -> Result<Json<Vec<PlayerWithTeamResponse>>, ApiError> {
    let views = store.list_players_with_team().await?;

    Ok(Json(views.iter().map(PlayerWithTeamResponse::from).collect()))
}

/// Get a player by ID, owning team included
///
/// GET /api/players/:id
pub async fn get_player(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
) -> Result<Json<PlayerWithTeamResponse>, ApiError> {
    let view = store
        .find_player_with_team(id)
        .await?
        .ok_or(DomainError::PlayerNotFound(id))?;

    Ok(Json(PlayerWithTeamResponse::from(&view)))
}

/// Create a new player, optionally already owned by a team
///
/// POST /api/players
pub async fn create_player(
    State(store): State<SharedStore>,
    Json(payload): Json<PlayerPayload>,
) -> Result<(StatusCode, Json<PlayerWithTeamResponse>), ApiError> {
    let payload = payload.validate()?;
    let team = resolve_team(&store, payload.team_id).await?;

    let player = Player::new(
        payload.first_name,
        payload.last_name,
        payload.birth_date,
        payload.experience_months,
        team.as_ref().map(Team::id),
    )
    .map_err(ApiError::bad_request)?;

    store.insert_player(&player).await?;

    let view = PlayerWithTeam { player, team };
    Ok((StatusCode::CREATED, Json(PlayerWithTeamResponse::from(&view))))
}

/// Replace a player's writable fields
///
/// PATCH /api/players/:id
pub async fn update_player(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PlayerPayload>,
) -> Result<Json<PlayerWithTeamResponse>, ApiError> {
    let payload = payload.validate()?;

    let current = store
        .find_player(id)
        .await?
        .ok_or(DomainError::PlayerNotFound(id))?;

    let team = resolve_team(&store, payload.team_id).await?;

    let updated = current
        .apply(
            payload.first_name,
            payload.last_name,
            payload.birth_date,
            payload.experience_months,
            team.as_ref().map(Team::id),
        )
        .map_err(ApiError::bad_request)?;

    if store.update_player(&updated).await? == 0 {
        return Err(DomainError::PlayerNotFound(id).into());
    }

    let view = PlayerWithTeam {
        player: updated,
        team,
    };
    Ok(Json(PlayerWithTeamResponse::from(&view)))
}

/// Delete a player
///
/// DELETE /api/players/:id
pub async fn delete_player(
    State(store): State<SharedStore>,
    Path(id): Path<Uuid>,
) -> Result<String, ApiError> {
    if store.delete_player(id).await? == 0 {
        return Err(DomainError::PlayerNotFound(id).into());
    }

    Ok("Player deleted successfully".to_string())
}
