//! Resource bookkeeping advanced once per economy second.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Balance parameters of the economy.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Money available when the session starts.
    pub starting_money: f32,
    /// Population capacity before any house is built.
    pub starting_population_capacity: u32,
    /// Starvation progress gained per tick while food runs short.
    pub population_decrease_rate: f32,
    /// Food eaten per resident per tick.
    pub food_consumption_per_person: f32,
    /// Growth progress gained per tick while food suffices.
    pub population_growth_rate: f32,
    /// Money earned per unit of food eaten while a bank exists.
    pub money_multiplier_from_food: f32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            starting_money: 1000.0,
            starting_population_capacity: 10,
            population_decrease_rate: 0.2,
            food_consumption_per_person: 0.1,
            population_growth_rate: 0.5,
            money_multiplier_from_food: 0.5,
        }
    }
}

/// Returned when a purchase exceeds the available money.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
#[error("cannot spend {requested:.0}, only {available:.0} available")]
pub struct InsufficientFunds {
    /// Amount the caller tried to spend.
    pub requested: f32,
    /// Money held at the time of the request.
    pub available: f32,
}

/// Global resources driven by building effects.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceLedger {
    config: EconomyConfig,
    money: f32,
    population: u32,
    population_capacity: u32,
    base_population: u32,
    employed: u32,
    food: f32,
    food_production_rate: f32,
    banks: u32,
    growth_progress: f32,
    decrease_progress: f32,
}

impl ResourceLedger {
    /// Creates a ledger holding the starting resources of `config`.
    #[must_use]
    pub fn new(config: EconomyConfig) -> Self {
        Self {
            config,
            money: config.starting_money,
            population: 0,
            population_capacity: config.starting_population_capacity,
            base_population: 0,
            employed: 0,
            food: 0.0,
            food_production_rate: 0.0,
            banks: 0,
            growth_progress: 0.0,
            decrease_progress: 0.0,
        }
    }

    /// Balance parameters in effect.
    #[must_use]
    pub const fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// Money held.
    #[must_use]
    pub const fn money(&self) -> f32 {
        self.money
    }

    /// Current residents.
    #[must_use]
    pub const fn population(&self) -> u32 {
        self.population
    }

    /// Maximum number of residents.
    #[must_use]
    pub const fn population_capacity(&self) -> u32 {
        self.population_capacity
    }

    /// Residents that starvation cannot remove.
    #[must_use]
    pub const fn base_population(&self) -> u32 {
        self.base_population
    }

    /// Residents working on farms.
    #[must_use]
    pub const fn employed(&self) -> u32 {
        self.employed
    }

    /// Residents without a job.
    #[must_use]
    pub const fn unemployed(&self) -> u32 {
        self.population.saturating_sub(self.employed)
    }

    /// Stored food.
    #[must_use]
    pub const fn food(&self) -> f32 {
        self.food
    }

    /// Food produced per tick.
    #[must_use]
    pub const fn food_production_rate(&self) -> f32 {
        self.food_production_rate
    }

    /// Reports whether at least one bank is standing.
    #[must_use]
    pub const fn has_bank(&self) -> bool {
        self.banks > 0
    }

    /// Runs one economy second.
    pub fn tick(&mut self) {
        self.food += self.food_production_rate;
        let consumed = self.population as f32 * self.config.food_consumption_per_person;

        if self.food >= consumed {
            self.food -= consumed;
            if self.has_bank() && consumed > 0.0 {
                self.add_money(consumed * self.config.money_multiplier_from_food);
            }
            if self.population < self.population_capacity {
                self.growth_progress += self.config.population_growth_rate;
                if self.growth_progress >= 1.0 {
                    self.population += 1;
                    self.growth_progress -= 1.0;
                }
            }
        } else {
            self.food = 0.0;
            if self.population > self.base_population {
                self.decrease_progress += self.config.population_decrease_rate;
                if self.decrease_progress >= 1.0 {
                    self.population -= 1;
                    self.decrease_progress -= 1.0;
                }
            }
        }
    }

    /// Withdraws `amount`, leaving the ledger untouched when funds are short.
    pub fn spend_money(&mut self, amount: f32) -> Result<(), InsufficientFunds> {
        if self.money < amount {
            return Err(InsufficientFunds {
                requested: amount,
                available: self.money,
            });
        }
        self.money -= amount;
        Ok(())
    }

    /// Deposits `amount`.
    pub fn add_money(&mut self, amount: f32) {
        self.money += amount;
    }

    pub(crate) fn add_house(&mut self, capacity_increase: u32, initial_population: u32) {
        self.population_capacity += capacity_increase;
        self.population += initial_population;
        self.base_population += initial_population;
        self.population = self.population.min(self.population_capacity);
    }

    pub(crate) fn remove_house(&mut self, capacity_decrease: u32, initial_population: u32) {
        self.population_capacity = self.population_capacity.saturating_sub(capacity_decrease);
        self.base_population = self.base_population.saturating_sub(initial_population);
        self.population = self.population.min(self.population_capacity);
    }

    /// Staffs a farm; returns `false` when too few residents are unemployed.
    pub(crate) fn add_food_production(&mut self, amount: f32, workers_required: u32) -> bool {
        if self.unemployed() < workers_required {
            warn!(
                unemployed = self.unemployed(),
                workers_required, "not enough residents to staff the farm"
            );
            return false;
        }
        self.employed += workers_required;
        self.food_production_rate += amount;
        debug!(rate = self.food_production_rate, "food production increased");
        true
    }

    pub(crate) fn remove_food_production(&mut self, amount: f32, workers_freed: u32) {
        self.employed = self.employed.saturating_sub(workers_freed);
        self.food_production_rate = (self.food_production_rate - amount).max(0.0);
    }

    pub(crate) fn add_bank(&mut self) {
        self.banks += 1;
    }

    pub(crate) fn remove_bank(&mut self) {
        self.banks = self.banks.saturating_sub(1);
    }
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new(EconomyConfig::default())
    }
}
