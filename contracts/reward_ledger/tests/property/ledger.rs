#![allow(clippy::unwrap_used, clippy::expect_used, clippy::arithmetic_side_effects)]
//! Property-based tests for the pure accounting engine.
//!
//! Invariants tested:
//! - `total_staked` always equals the sum of every account's `staked`
//! - An account's pending reward never decreases except when it claims
//! - Claimed plus pending reward never exceeds what was distributed, and the
//!   shortfall is bounded by rounding dust
//! - Everything emitted while someone is staked is distributed
//! - How often the ledger is checkpointed does not change what stakers earn
//! - Equal stakes held for equal, non-overlapping windows earn equal rewards
//! - Concurrent stakers split each interval in proportion to their stake

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use reward_ledger::ledger::{Account, RewardLedger};
use reward_ledger::rewards;
use reward_ledger::ContractError;

const USERS: usize = 4;
const POOL: i128 = 1_000_000_000;
const DURATION: u64 = 1_000_000;
/// 1 000 units per day: under one unit per 86 s.
const REF_POOL: i128 = 1_000;
const REF_DURATION: u64 = 86_400;

// ── Helpers ───────────────────────────────────────────────────────────────────

#[derive(Arbitrary, Clone, Debug)]
enum Op {
    Stake { who: u8, amount: u32 },
    Withdraw { who: u8, amount: u32 },
    Claim { who: u8 },
    Advance { seconds: u16 },
}

struct Model {
    ledger: RewardLedger,
    accounts: Vec<Account>,
    claimed: Vec<i128>,
    /// Seconds of the emission window during which something was staked.
    staked_time: u64,
    now: u64,
}

impl Model {
    fn new() -> Self {
        let mut ledger = RewardLedger::default();
        ledger.fund(POOL, DURATION, 0).unwrap();
        Self {
            ledger,
            accounts: vec![Account::default(); USERS],
            claimed: vec![0; USERS],
            staked_time: 0,
            now: 0,
        }
    }

    /// Apply `op`, checking the error contract for rejected inputs.
    fn apply(&mut self, op: &Op) {
        let now = self.now;
        match *op {
            Op::Stake { who, amount } => {
                let account = &mut self.accounts[who as usize % USERS];
                let result = self.ledger.stake(account, i128::from(amount), now);
                if amount == 0 {
                    assert_eq!(result, Err(ContractError::InvalidAmount));
                } else {
                    assert!(result.is_ok());
                }
            }
            Op::Withdraw { who, amount } => {
                let account = &mut self.accounts[who as usize % USERS];
                let staked = account.staked;
                let result = self.ledger.withdraw(account, i128::from(amount), now);
                if amount == 0 {
                    assert_eq!(result, Err(ContractError::InvalidAmount));
                } else if i128::from(amount) > staked {
                    assert_eq!(result, Err(ContractError::InsufficientStake));
                    assert_eq!(account.staked, staked);
                } else {
                    assert_eq!(result, Ok(i128::from(amount)));
                }
            }
            Op::Claim { who } => {
                let idx = who as usize % USERS;
                let reward = self.ledger.claim(&mut self.accounts[idx], now).unwrap();
                self.claimed[idx] += reward;
                assert_eq!(self.accounts[idx].reward_debt, 0);
            }
            Op::Advance { seconds } => {
                let end = self.now + u64::from(seconds);
                if self.ledger.state().total_staked > 0 {
                    self.staked_time += end.min(DURATION) - self.now.min(DURATION);
                }
                self.now = end;
            }
        }
    }

    fn pending(&self) -> Vec<i128> {
        self.accounts
            .iter()
            .map(|a| self.ledger.pending_reward(a, self.now).unwrap())
            .collect()
    }
}

fn claimer(op: &Op) -> Option<usize> {
    match *op {
        Op::Claim { who } => Some(who as usize % USERS),
        _ => None,
    }
}

// ── proptest! blocks ──────────────────────────────────────────────────────────

proptest! {
    /// After any sequence of operations, `total_staked` equals the sum of stakes
    /// and no stake is ever negative.
    #[test]
    fn prop_total_staked_matches_sum(ops in prop::collection::vec(any::<Op>(), 1..80)) {
        let mut model = Model::new();

        for op in &ops {
            model.apply(op);

            let sum: i128 = model.accounts.iter().map(|a| a.staked).sum();
            prop_assert_eq!(model.ledger.state().total_staked, sum);
            prop_assert!(model.accounts.iter().all(|a| a.staked >= 0));
        }
    }

    /// Pending reward is non-decreasing for every account that does not claim.
    #[test]
    fn prop_pending_reward_monotonic(ops in prop::collection::vec(any::<Op>(), 1..80)) {
        let mut model = Model::new();

        for op in &ops {
            let before = model.pending();
            model.apply(op);
            let after = model.pending();

            for idx in 0..USERS {
                if claimer(op) == Some(idx) {
                    prop_assert_eq!(after[idx], 0);
                } else {
                    prop_assert!(
                        after[idx] >= before[idx],
                        "account {} pending dropped from {} to {} on {:?}",
                        idx, before[idx], after[idx], op
                    );
                }
            }
        }
    }

    /// Everything emitted while someone was staked is distributed, and
    /// claimed + pending falls short of it by at most one unit per settlement.
    #[test]
    fn prop_reward_conservation(ops in prop::collection::vec(any::<Op>(), 1..80)) {
        let mut model = Model::new();
        for op in &ops {
            model.apply(op);
        }

        // Settle the accumulator at the final timestamp so `distributed` is current.
        let mut observer = Account::default();
        model.ledger.checkpoint(&mut observer, model.now).unwrap();

        let owed: i128 = model.claimed.iter().sum::<i128>() + model.pending().iter().sum::<i128>();
        let distributed = model.ledger.state().distributed;

        // The rate is a whole number of units per second, so nothing is lost
        // between checkpoints.
        prop_assert_eq!(
            distributed,
            rewards::emission(model.staked_time, POOL, DURATION).unwrap()
        );
        prop_assert!(owed <= distributed, "owed {} > distributed {}", owed, distributed);
        prop_assert!(distributed - owed < ops.len() as i128 + USERS as i128 + 1);
    }

    /// A dominant staker keeps its share of the emission however often a
    /// tiny staker checkpoints the ledger.
    #[test]
    fn prop_checkpoint_cadence_does_not_starve_accrual(
        dust in 1i128..=1_000i128,
        gaps in prop::collection::vec(1u64..=600u64, 1..400),
    ) {
        const STAKE: i128 = 1_000_000_000;
        let mut ledger = RewardLedger::default();
        ledger.fund(REF_POOL, REF_DURATION, 0).unwrap();
        let mut alice = Account::default();
        let mut mallory = Account::default();
        ledger.stake(&mut alice, STAKE, 0).unwrap();
        ledger.stake(&mut mallory, dust, 0).unwrap();

        let mut now = 0u64;
        for gap in gaps {
            now += gap;
            ledger.claim(&mut mallory, now).unwrap();
        }

        let emitted = rewards::emission(now.min(REF_DURATION), REF_POOL, REF_DURATION).unwrap();
        // Each credited checkpoint rounds the time it used up to a whole
        // second, which costs under one second of emission per emitted unit.
        let slack = emitted * REF_POOL / i128::from(REF_DURATION) + 2;
        let pending = ledger.pending_reward(&alice, now).unwrap();

        prop_assert!(pending <= emitted);
        prop_assert!(
            pending * (STAKE + dust) >= (emitted - slack) * STAKE - (STAKE + dust),
            "alice earned {} of {} emitted", pending, emitted
        );
    }

    /// Two accounts staking the same amount for the same, non-overlapping
    /// window earn the same reward.
    #[test]
    fn prop_equal_stake_equal_window_equal_reward(
        amount in 1i128..=1_000_000_000_000i128,
        start in 0u64..=100_000u64,
        window in 1u64..=200_000u64,
        gap in 0u64..=100_000u64,
    ) {
        let mut ledger = RewardLedger::default();
        ledger.fund(POOL, DURATION, 0).unwrap();
        let mut alice = Account::default();
        let mut bob = Account::default();

        let alice_end = start + window;
        ledger.stake(&mut alice, amount, start).unwrap();
        ledger.withdraw(&mut alice, amount, alice_end).unwrap();

        let bob_start = alice_end + gap;
        ledger.stake(&mut bob, amount, bob_start).unwrap();
        ledger.withdraw(&mut bob, amount, bob_start + window).unwrap();

        let now = bob_start + window;
        prop_assert_eq!(
            ledger.pending_reward(&alice, now).unwrap(),
            ledger.pending_reward(&bob, now).unwrap()
        );
    }

    /// A lone staker earns the whole interval's emission, less at most one unit.
    #[test]
    fn prop_sole_staker_earns_emission(
        amount in 1i128..=1_000_000_000_000i128,
        elapsed in 0u64..=DURATION,
    ) {
        let mut ledger = RewardLedger::default();
        ledger.fund(POOL, DURATION, 0).unwrap();
        let mut alice = Account::default();
        ledger.stake(&mut alice, amount, 0).unwrap();

        let emitted = rewards::emission(elapsed, POOL, DURATION).unwrap();
        let pending = ledger.pending_reward(&alice, elapsed).unwrap();

        prop_assert!(pending <= emitted);
        prop_assert!(pending >= emitted - 1);
    }

    /// Concurrent stakers split an interval in proportion to stake.
    #[test]
    fn prop_reward_proportional_to_stake(
        a in 1i128..=1_000_000_000_000i128,
        b in 1i128..=1_000_000_000_000i128,
        elapsed in 1u64..=DURATION,
    ) {
        let mut ledger = RewardLedger::default();
        ledger.fund(POOL, DURATION, 0).unwrap();
        let mut alice = Account::default();
        let mut bob = Account::default();
        ledger.stake(&mut alice, a, 0).unwrap();
        ledger.stake(&mut bob, b, 0).unwrap();

        let emitted = rewards::emission(elapsed, POOL, DURATION).unwrap();
        let ra = ledger.pending_reward(&alice, elapsed).unwrap();

        // ra ≈ a × emitted / (a + b), rounded down by under two units.
        let scaled = ra * (a + b);
        prop_assert!(scaled <= a * emitted);
        prop_assert!(a * emitted - scaled < 2 * (a + b));
    }
}
