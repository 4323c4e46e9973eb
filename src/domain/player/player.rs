use chrono::{Datelike, NaiveDate, Utc};
use uuid::Uuid;

/// Player aggregate root
///
/// A player optionally owned by one team. Ownership is the only
/// cross-aggregate relationship in the roster model and only the transfer
/// settlement or a field-level update may change it.
///
/// # Invariants
/// - First and last name cannot be blank
/// - Birth date lies strictly in the past
/// - Experience is a non-negative number of months
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    id: Uuid,
    first_name: String,
    last_name: String,
    birth_date: NaiveDate,
    experience_months: i32,
    team_id: Option<Uuid>,
}

impl Player {
    /// Creates a new Player aggregate
    ///
    /// # Returns
    /// * `Ok(Player)` - New player with a freshly assigned id, optionally
    ///   already owned by `team_id`
    /// * `Err(String)` - If any invariant is violated
    pub fn new(
        first_name: String,
        last_name: String,
        birth_date: NaiveDate,
        experience_months: i32,
        team_id: Option<Uuid>,
    ) -> Result<Self, String> {
        Self::check_invariants(&first_name, &last_name, birth_date, experience_months)?;

        Ok(Self {
            id: Uuid::new_v4(),
            first_name,
            last_name,
            birth_date,
            experience_months,
            team_id,
        })
    }

    /// Produces the next persisted state from a field-level update
    ///
    /// Replaces every writable field while keeping the id; the whole new
    /// value is handed to the store rather than mutating a shared instance.
    pub fn apply(
        &self,
        first_name: String,
        last_name: String,
        birth_date: NaiveDate,
        experience_months: i32,
        team_id: Option<Uuid>,
    ) -> Result<Self, String> {
        Self::check_invariants(&first_name, &last_name, birth_date, experience_months)?;

        Ok(Self {
            id: self.id,
            first_name,
            last_name,
            birth_date,
            experience_months,
            team_id,
        })
    }

    fn check_invariants(
        first_name: &str,
        last_name: &str,
        birth_date: NaiveDate,
        experience_months: i32,
    ) -> Result<(), String> {
        if first_name.trim().is_empty() {
            return Err("First name cannot be blank".to_string());
        }

        if last_name.trim().is_empty() {
            return Err("Last name cannot be blank".to_string());
        }

        if birth_date >= Utc::now().date_naive() {
            return Err("Birth date must be in the past".to_string());
        }

        if experience_months < 0 {
            return Err("Experience months cannot be negative".to_string());
        }

        Ok(())
    }

    /// Returns a copy owned by `team_id` (the ownership half of a transfer
    /// settlement)
    pub fn assigned_to(&self, team_id: Uuid) -> Self {
        let mut next = self.clone();
        next.team_id = Some(team_id);
        next
    }

    /// Full calendar years between the birth date and `as_of`
    ///
    /// The date is an explicit argument so pricing stays deterministic.
    pub fn age_on(&self, as_of: NaiveDate) -> i32 {
        let mut age = as_of.year() - self.birth_date.year();
        if (as_of.month(), as_of.day()) < (self.birth_date.month(), self.birth_date.day()) {
            age -= 1;
        }
        age
    }

    // ===== Getters =====

    /// Returns the player's ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Returns the player's first name
    pub fn first_name(&self) -> &str {
        &self.first_name
    }

    /// Returns the player's last name
    pub fn last_name(&self) -> &str {
        &self.last_name
    }

    /// Returns the player's birth date
    pub fn birth_date(&self) -> NaiveDate {
        self.birth_date
    }

    /// Returns the player's experience in months
    pub fn experience_months(&self) -> i32 {
        self.experience_months
    }

    /// Returns the owning team's id, if the player is owned
    pub fn team_id(&self) -> Option<Uuid> {
        self.team_id
    }

    /// Reconstructs a Player from persistence layer data
    ///
    /// Bypasses invariant validation since the data was validated before it
    /// was stored. Only to be used by store implementations.
    pub fn from_persistence(
        id: Uuid,
        first_name: String,
        last_name: String,
        birth_date: NaiveDate,
        experience_months: i32,
        team_id: Option<Uuid>,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            birth_date,
            experience_months,
            team_id,
        }
    }
}
