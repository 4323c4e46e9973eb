// Read-side roster views

pub mod views;

pub use views::{PlayerWithTeam, TeamWithPlayers};
