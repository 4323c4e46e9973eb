use crate::domain::player::Player;
use crate::domain::team::Team;

/// A team together with every player it currently owns
///
/// Assembled by the store from already-joined data; reading the players
/// never triggers further fetches.
#[derive(Debug, Clone)]
pub struct TeamWithPlayers {
    pub team: Team,
    pub players: Vec<Player>,
}

/// A player together with its owning team's public fields, if any
#[derive(Debug, Clone)]
pub struct PlayerWithTeam {
    pub player: Player,
    pub team: Option<Team>,
}
