//! Football Manager API Library
//!
//! Roster management for teams and players plus the transfer operation that
//! moves a player between teams and settles the fee between the two teams'
//! balances.

pub mod api;
pub mod domain;
pub mod infrastructure;
