// Infrastructure layer module
// Contains database adapters implementing the domain store contract

pub mod repositories;
