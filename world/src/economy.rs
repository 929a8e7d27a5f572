//! Gold and lives bookkeeping.

use coop_defence_core::EconomyLedger;

/// Gold balance available at the start of a session.
pub const STARTING_GOLD: u32 = 200;

/// Lives available at the start of a session.
pub const STARTING_LIVES: u32 = 20;

/// Economy ledger owned by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Ledger {
    gold: u32,
    lives: u32,
}

impl Ledger {
    pub(crate) const fn new(gold: u32, lives: u32) -> Self {
        Self { gold, lives }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new(STARTING_GOLD, STARTING_LIVES)
    }
}

impl EconomyLedger for Ledger {
    fn credit(&mut self, amount: u32) {
        self.gold = self.gold.saturating_add(amount);
    }

    fn try_debit(&mut self, amount: u32) -> bool {
        match self.gold.checked_sub(amount) {
            Some(remaining) => {
                self.gold = remaining;
                true
            }
            None => false,
        }
    }

    fn balance(&self) -> u32 {
        self.gold
    }

    fn lose_lives(&mut self, amount: u32) -> u32 {
        self.lives = self.lives.saturating_sub(amount);
        self.lives
    }

    fn lives(&self) -> u32 {
        self.lives
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kill_reward_is_added_to_balance() {
        let mut ledger = Ledger::new(100, STARTING_LIVES);
        ledger.credit(15);
        assert_eq!(ledger.balance(), 115);
    }

    #[test]
    fn failed_debit_leaves_balance_untouched() {
        let mut ledger = Ledger::new(100, STARTING_LIVES);
        assert!(!ledger.try_debit(150));
        assert_eq!(ledger.balance(), 100);

        assert!(ledger.try_debit(100));
        assert_eq!(ledger.balance(), 0);
    }

    #[test]
    fn lives_floor_at_zero() {
        let mut ledger = Ledger::new(0, 2);
        assert_eq!(ledger.lose_lives(3), 0);
        assert_eq!(ledger.lives(), 0);
    }

    #[test]
    fn default_matches_starting_balances() {
        let ledger = Ledger::default();
        assert_eq!(ledger.balance(), STARTING_GOLD);
        assert_eq!(ledger.lives(), STARTING_LIVES);
    }
}
