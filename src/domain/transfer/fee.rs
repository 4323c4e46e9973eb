use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::error::DomainError;
use crate::domain::player::Player;
use crate::domain::team::Team;

/// Computes the fee the destination team owes for buying `player`
///
/// `base_price = experience_months * 100_000 / age`, the destination's
/// commission percentage is added on top, and the sum is rounded to the
/// cent, half-up. Deterministic: the pricing date is an explicit argument
/// and no state is read.
///
/// # Errors
/// [`DomainError::InvalidAge`] when the player's age on `as_of` is zero
/// (the base price divides by age).
pub fn compute_fee(
    player: &Player,
    destination: &Team,
    as_of: NaiveDate,
) -> Result<Decimal, DomainError> {
    let age = player.age_on(as_of);
    if age <= 0 {
        return Err(DomainError::InvalidAge);
    }

    let base_price =
        Decimal::from(player.experience_months()) * Decimal::from(100_000) / Decimal::from(age);
    let commission = base_price * Decimal::from(destination.commission_percentage()) / Decimal::from(100);

    Ok((base_price + commission).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}
