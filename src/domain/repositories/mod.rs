// Store contracts for the roster aggregates

pub mod roster_store;

pub use roster_store::{RosterStore, StoreError, TransferCommit};
