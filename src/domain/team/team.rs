use rust_decimal::Decimal;
use uuid::Uuid;

/// Team aggregate root
///
/// A club that owns players and settles transfer fees out of its balance.
///
/// # Invariants
/// - Name cannot be blank
/// - Balance is never negative
/// - Commission percentage stays within 0..=100
///
/// # Example
/// ```
/// use football_manager_api::domain::team::Team;
/// use rust_decimal::Decimal;
///
/// let team = Team::new("Arsenal".to_string(), Decimal::from(100_000), 10)
///     .expect("valid team");
///
/// assert_eq!(team.name(), "Arsenal");
/// assert_eq!(team.commission_percentage(), 10);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    id: Uuid,
    name: String,
    balance: Decimal,
    commission_percentage: i32,
}

impl Team {
    /// Creates a new Team aggregate
    ///
    /// # Arguments
    /// * `name` - The team's display name (cannot be blank)
    /// * `balance` - Opening balance (must not be negative)
    /// * `commission_percentage` - The team's cut of every transfer fee it
    ///   pays as buyer, in 0..=100
    ///
    /// # Returns
    /// * `Ok(Team)` - New team with a freshly assigned id
    /// * `Err(String)` - If any invariant is violated
    pub fn new(name: String, balance: Decimal, commission_percentage: i32) -> Result<Self, String> {
        Self::check_invariants(&name, balance, commission_percentage)?;

        Ok(Self {
            id: Uuid::new_v4(),
            name,
            balance,
            commission_percentage,
        })
    }

    /// Produces the next persisted state from a field-level update
    ///
    /// Replaces every writable field while keeping the id; the whole new
    /// value is handed to the store rather than mutating a shared instance.
    pub fn apply(
        &self,
        name: String,
        balance: Decimal,
        commission_percentage: i32,
    ) -> Result<Self, String> {
        Self::check_invariants(&name, balance, commission_percentage)?;

        Ok(Self {
            id: self.id,
            name,
            balance,
            commission_percentage,
        })
    }

    fn check_invariants(
        name: &str,
        balance: Decimal,
        commission_percentage: i32,
    ) -> Result<(), String> {
        if name.trim().is_empty() {
            return Err("Team name cannot be blank".to_string());
        }

        if balance < Decimal::ZERO {
            return Err("Balance cannot be negative".to_string());
        }

        if !(0..=100).contains(&commission_percentage) {
            return Err("Commission percentage must be between 0 and 100".to_string());
        }

        Ok(())
    }

    /// Returns a copy with `amount` added to the balance (seller side of a
    /// transfer settlement)
    pub fn credited(&self, amount: Decimal) -> Self {
        let mut next = self.clone();
        next.balance += amount;
        next
    }

    /// Returns a copy with `amount` subtracted from the balance (buyer side
    /// of a transfer settlement); callers must have checked sufficiency
    pub fn debited(&self, amount: Decimal) -> Self {
        let mut next = self.clone();
        next.balance -= amount;
        next
    }

    // ===== Getters =====

    /// Returns the team's ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the team's name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the team's current balance
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Returns the commission percentage applied when this team buys
    pub fn commission_percentage(&self) -> i32 {
        self.commission_percentage
    }

    /// Reconstructs a Team from persistence layer data
    ///
    /// Bypasses invariant validation since the data was validated before it
    /// was stored. Only to be used by store implementations.
    pub fn from_persistence(
        id: Uuid,
        name: String,
        balance: Decimal,
        commission_percentage: i32,
    ) -> Self {
        Self {
            id,
            name,
            balance,
            commission_percentage,
        }
    }
}
