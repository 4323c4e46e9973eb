// Transfer pricing and settlement

pub mod engine;
pub mod fee;

pub use engine::TransferEngine;
pub use fee::compute_fee;
