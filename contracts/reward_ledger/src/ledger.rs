//! Time-weighted reward accounting.
//!
//! [`RewardLedger`] owns the global distribution state and settles accounts
//! lazily: nothing happens per second, and each touch of an account folds in
//! whatever it earned since its previous checkpoint using the global
//! reward-per-token accumulator. Every operation is O(1) in the number of
//! accounts.
//!
//! The engine has no storage, no token movement and no clock. Callers pass the
//! current timestamp explicitly and persist the returned state themselves.
//! Operations are all-or-nothing: on `Err` neither the ledger nor the account
//! has been modified.

use soroban_sdk::contracttype;

use crate::{rewards, ContractError};

// ── State ───────────────────────────────────────────────────────────────────

/// Distribution state shared by every account.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GlobalState {
    /// Sum of every account's `staked`.
    pub total_staked: i128,
    /// Reward emitted per staked unit so far, scaled by [`rewards::PRECISION`].
    pub reward_per_token: i128,
    /// Emission has been credited up to here. Trails the latest checkpoint by
    /// less than one unit's worth of time.
    pub last_update: u64,
    /// Units emitted over one `reward_duration`; with it, the emission rate.
    pub reward_pool: i128,
    pub reward_duration: u64,
    /// Emission stops here.
    pub period_finish: u64,
    /// Reward credited to stakers through the accumulator.
    pub distributed: i128,
}

/// A single staker's position.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Account {
    pub staked: i128,
    /// Accumulator value at this account's last checkpoint.
    pub reward_per_token_paid: i128,
    /// Reward folded in at checkpoints and not yet claimed.
    pub reward_debt: i128,
    pub last_update: u64,
    pub total_claimed: i128,
}

// ── Engine ──────────────────────────────────────────────────────────────────

/// Outcome of settling the accumulator up to some timestamp.
struct Projection {
    reward_per_token: i128,
    /// Emission that reached the accumulator and counts as distributed.
    credited: i128,
    last_update: u64,
}

#[derive(Clone, Debug, Default)]
pub struct RewardLedger {
    state: GlobalState,
}

impl RewardLedger {
    pub fn new(state: GlobalState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &GlobalState {
        &self.state
    }

    pub fn into_state(self) -> GlobalState {
        self.state
    }

    /// Emission rate as `(reward_pool, reward_duration)`.
    pub fn reward_rate(&self) -> (i128, u64) {
        (self.state.reward_pool, self.state.reward_duration)
    }

    /// Projected accumulator value at `now`.
    pub fn reward_per_token(&self, now: u64) -> Result<i128, ContractError> {
        Ok(self.project(now)?.reward_per_token)
    }

    /// Reward `account` could claim at `now`. Read-only.
    pub fn pending_reward(&self, account: &Account, now: u64) -> Result<i128, ContractError> {
        let rpt = self.reward_per_token(now)?;
        rewards::earned(
            account.staked,
            rpt,
            account.reward_per_token_paid,
            account.reward_debt,
        )
    }

    /// Settle `account` up to `now` without changing its balances.
    pub fn checkpoint(&mut self, account: &mut Account, now: u64) -> Result<(), ContractError> {
        let (state, settled) = self.settle(account, now)?;
        self.commit(account, state, settled);
        Ok(())
    }

    /// Add `amount` to `account`'s stake. Returns the new `total_staked`.
    ///
    /// The account is settled first so the new deposit does not earn
    /// retroactively.
    pub fn stake(
        &mut self,
        account: &mut Account,
        amount: i128,
        now: u64,
    ) -> Result<i128, ContractError> {
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let (mut state, mut settled) = self.settle(account, now)?;
        settled.staked = settled
            .staked
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        state.total_staked = state
            .total_staked
            .checked_add(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;

        let new_total = state.total_staked;
        self.commit(account, state, settled);
        Ok(new_total)
    }

    /// Remove `amount` from `account`'s stake and return the principal owed.
    ///
    /// Earned reward stays in `reward_debt`; it is not paid out here.
    pub fn withdraw(
        &mut self,
        account: &mut Account,
        amount: i128,
        now: u64,
    ) -> Result<i128, ContractError> {
        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }
        if amount > account.staked {
            return Err(ContractError::InsufficientStake);
        }

        let (mut state, mut settled) = self.settle(account, now)?;
        settled.staked = settled
            .staked
            .checked_sub(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;
        state.total_staked = state
            .total_staked
            .checked_sub(amount)
            .ok_or(ContractError::ArithmeticOverflow)?;

        self.commit(account, state, settled);
        Ok(amount)
    }

    /// Settle `account` and hand out everything it has earned.
    ///
    /// Returns `Ok(0)` when nothing is owed.
    pub fn claim(&mut self, account: &mut Account, now: u64) -> Result<i128, ContractError> {
        let (state, mut settled) = self.settle(account, now)?;

        let reward = settled.reward_debt;
        settled.reward_debt = 0;
        settled.total_claimed = settled
            .total_claimed
            .checked_add(reward)
            .ok_or(ContractError::ArithmeticOverflow)?;

        self.commit(account, state, settled);
        Ok(reward)
    }

    /// Withdraw the whole stake and claim in one step.
    ///
    /// Returns `(principal, reward)`.
    pub fn exit(
        &mut self,
        account: &mut Account,
        now: u64,
    ) -> Result<(i128, i128), ContractError> {
        let mut scratch = self.clone();
        let mut position = account.clone();

        let staked = position.staked;
        let principal = if staked > 0 {
            scratch.withdraw(&mut position, staked, now)?
        } else {
            0
        };
        let reward = scratch.claim(&mut position, now)?;

        *self = scratch;
        *account = position;
        Ok((principal, reward))
    }

    /// Start a new emission period of `duration` seconds paying `amount`.
    ///
    /// Whatever the running period had not emitted yet is rolled into the new
    /// pool.
    pub fn fund(&mut self, amount: i128, duration: u64, now: u64) -> Result<(), ContractError> {
        if amount <= 0 || duration == 0 {
            return Err(ContractError::InvalidAmount);
        }

        let mut state = self.advance(now)?;

        let leftover = if now < state.period_finish {
            rewards::emission(
                state.period_finish - now,
                state.reward_pool,
                state.reward_duration,
            )?
        } else {
            0
        };
        // Sub-unit carry from the old rate does not cross into the new period.
        state.last_update = state.last_update.max(now);

        state.reward_pool = amount
            .checked_add(leftover)
            .ok_or(ContractError::ArithmeticOverflow)?;
        state.reward_duration = duration;
        state.period_finish = now
            .checked_add(duration)
            .ok_or(ContractError::ArithmeticOverflow)?;

        self.state = state;
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────────────────

    /// Accumulator, credited emission and checkpoint time after settling up
    /// to `now`.
    ///
    /// `last_update` only moves past time whose emission reached the
    /// accumulator. A checkpoint too soon after the previous one to emit a
    /// whole unit leaves it where it is, so the time is credited later instead
    /// of being lost. Time with nobody staked, and anything past
    /// `period_finish`, is skipped outright.
    fn project(&self, now: u64) -> Result<Projection, ContractError> {
        let state = &self.state;
        let until = now.min(state.period_finish);
        let skipped = Projection {
            reward_per_token: state.reward_per_token,
            credited: 0,
            last_update: state.last_update.max(now),
        };

        if state.total_staked <= 0 {
            return Ok(skipped);
        }

        let elapsed = until.saturating_sub(state.last_update);
        let emitted = rewards::emission(elapsed, state.reward_pool, state.reward_duration)?;
        let rpt =
            rewards::compute_reward_per_token(state.reward_per_token, emitted, state.total_staked)?;
        let window_closed = until == state.period_finish;

        if rpt == state.reward_per_token {
            return Ok(Projection {
                last_update: if window_closed {
                    skipped.last_update
                } else {
                    state.last_update
                },
                ..skipped
            });
        }

        let last_update = if window_closed {
            skipped.last_update
        } else {
            let used = rewards::emission_time(emitted, state.reward_pool, state.reward_duration)?;
            state
                .last_update
                .checked_add(used)
                .ok_or(ContractError::ArithmeticOverflow)?
        };

        Ok(Projection {
            reward_per_token: rpt,
            credited: emitted,
            last_update,
        })
    }

    /// Global state after a checkpoint at `now`.
    fn advance(&self, now: u64) -> Result<GlobalState, ContractError> {
        let projection = self.project(now)?;

        let mut state = self.state.clone();
        state.distributed = state
            .distributed
            .checked_add(projection.credited)
            .ok_or(ContractError::ArithmeticOverflow)?;
        state.reward_per_token = projection.reward_per_token;
        state.last_update = projection.last_update;
        Ok(state)
    }

    /// Global state and `account` after a checkpoint at `now`.
    fn settle(
        &self,
        account: &Account,
        now: u64,
    ) -> Result<(GlobalState, Account), ContractError> {
        let state = self.advance(now)?;

        let mut settled = account.clone();
        settled.reward_debt = rewards::earned(
            account.staked,
            state.reward_per_token,
            account.reward_per_token_paid,
            account.reward_debt,
        )?;
        settled.reward_per_token_paid = state.reward_per_token;
        settled.last_update = settled.last_update.max(now);

        Ok((state, settled))
    }

    fn commit(&mut self, account: &mut Account, state: GlobalState, settled: Account) {
        self.state = state;
        *account = settled;
    }
}
