#![no_std]

pub mod events;
pub mod ledger;
pub mod rewards;
mod storage;

use soroban_sdk::{contract, contractimpl, contracttype, log, token, Address, Env};

use ledger::{Account, GlobalState, RewardLedger};

// ── Contract errors ──────────────────────────────────────────────────────────

#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    InvalidAmount = 4,
    InsufficientStake = 5,
    AccountNotFound = 6,
    ArithmeticOverflow = 7,
    TokensIdentical = 8,
    /// Reserved: an empty claim currently settles as `Ok(0)`.
    NothingToClaim = 9,
}

// ── Public-facing types (re-exported for test consumers) ─────────────────────

/// Addresses fixed at `initialize`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LedgerConfig {
    pub admin: Address,
    pub stake_token: Address,
    pub reward_token: Address,
}

/// Snapshot of a user's staking position returned by `get_staker_info`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StakerInfo {
    pub staked: i128,
    pub pending_rewards: i128,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct RewardLedgerContract;

#[contractimpl]
impl RewardLedgerContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the contract.
    ///
    /// * `stake_token`  – SAC address of the token users stake.
    /// * `reward_token` – SAC address of the token distributed as rewards.
    ///
    /// Emission does not start until the admin calls `fund_rewards`.
    pub fn initialize(
        env: Env,
        admin: Address,
        stake_token: Address,
        reward_token: Address,
    ) -> Result<(), ContractError> {
        if storage::is_initialized(&env) {
            return Err(ContractError::AlreadyInitialized);
        }
        if stake_token == reward_token {
            return Err(ContractError::TokensIdentical);
        }

        storage::save_config(
            &env,
            &LedgerConfig {
                admin: admin.clone(),
                stake_token: stake_token.clone(),
                reward_token: reward_token.clone(),
            },
        );
        storage::save_global(
            &env,
            &GlobalState {
                last_update: env.ledger().timestamp(),
                ..GlobalState::default()
            },
        );

        events::publish_initialized(&env, admin, stake_token, reward_token);

        Ok(())
    }

    // ── Funding ─────────────────────────────────────────────────────────────

    /// Deposit `amount` reward tokens and emit them evenly over the next
    /// `duration` seconds.
    ///
    /// If a period is still running, its unemitted remainder is added to the
    /// new pool.
    pub fn fund_rewards(
        env: Env,
        admin: Address,
        amount: i128,
        duration: u64,
    ) -> Result<(), ContractError> {
        let config = storage::load_config(&env)?;
        admin.require_auth();
        Self::require_admin(&config, &admin)?;

        let now = env.ledger().timestamp();
        let mut ledger = RewardLedger::new(storage::load_global(&env));
        ledger.fund(amount, duration, now)?;

        token::Client::new(&env, &config.reward_token).transfer(
            &admin,
            &env.current_contract_address(),
            &amount,
        );

        let state = ledger.into_state();
        storage::save_global(&env, &state);

        events::publish_reward_funded(
            &env,
            amount,
            state.reward_pool,
            state.reward_duration,
            state.period_finish,
        );

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` stake tokens.
    ///
    /// The account is checkpointed first so the staker does not retroactively
    /// earn rewards on the newly deposited tokens.
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        let config = storage::load_config(&env)?;
        staker.require_auth();

        let now = env.ledger().timestamp();
        let mut ledger = RewardLedger::new(storage::load_global(&env));
        let mut account = storage::load_account(&env, &staker).unwrap_or_default();

        let new_total = ledger.stake(&mut account, amount, now)?;

        token::Client::new(&env, &config.stake_token).transfer(
            &staker,
            &env.current_contract_address(),
            &amount,
        );

        storage::save_account(&env, &staker, &account);
        storage::save_global(&env, ledger.state());

        events::publish_staked(&env, staker, amount, new_total);

        Ok(())
    }

    /// Return `amount` staked tokens to `staker`.
    ///
    /// Earned rewards are not paid out here; they stay claimable through
    /// `claim_reward`.
    pub fn withdraw(env: Env, staker: Address, amount: i128) -> Result<i128, ContractError> {
        let config = storage::load_config(&env)?;
        staker.require_auth();

        let now = env.ledger().timestamp();
        let mut ledger = RewardLedger::new(storage::load_global(&env));
        let mut account =
            storage::load_account(&env, &staker).ok_or(ContractError::AccountNotFound)?;

        let principal = ledger.withdraw(&mut account, amount, now)?;

        // State is written before the transfer (checks-effects-interactions).
        storage::save_account(&env, &staker, &account);
        storage::save_global(&env, ledger.state());

        token::Client::new(&env, &config.stake_token).transfer(
            &env.current_contract_address(),
            &staker,
            &principal,
        );

        events::publish_withdrawn(&env, staker, principal, ledger.state().total_staked);

        Ok(principal)
    }

    // ── Rewards ─────────────────────────────────────────────────────────────

    /// Claim all accumulated rewards for `staker`.
    ///
    /// Returns the amount paid. An account with nothing pending gets `0` and
    /// no transfer is made.
    pub fn claim_reward(env: Env, staker: Address) -> Result<i128, ContractError> {
        let config = storage::load_config(&env)?;
        staker.require_auth();

        let now = env.ledger().timestamp();
        let mut ledger = RewardLedger::new(storage::load_global(&env));
        let mut account =
            storage::load_account(&env, &staker).ok_or(ContractError::AccountNotFound)?;

        let reward = ledger.claim(&mut account, now)?;

        storage::save_account(&env, &staker, &account);
        storage::save_global(&env, ledger.state());

        if reward == 0 {
            log!(&env, "claim with nothing pending", staker);
            return Ok(0);
        }

        Self::pay_reward(&env, &config, &staker, reward);

        Ok(reward)
    }

    /// Withdraw the full stake and claim all rewards in a single call.
    ///
    /// Returns `(principal, reward)`.
    pub fn exit(env: Env, staker: Address) -> Result<(i128, i128), ContractError> {
        let config = storage::load_config(&env)?;
        staker.require_auth();

        let now = env.ledger().timestamp();
        let mut ledger = RewardLedger::new(storage::load_global(&env));
        let mut account =
            storage::load_account(&env, &staker).ok_or(ContractError::AccountNotFound)?;

        let (principal, reward) = ledger.exit(&mut account, now)?;

        storage::save_account(&env, &staker, &account);
        storage::save_global(&env, ledger.state());

        if principal > 0 {
            token::Client::new(&env, &config.stake_token).transfer(
                &env.current_contract_address(),
                &staker,
                &principal,
            );
            events::publish_withdrawn(
                &env,
                staker.clone(),
                principal,
                ledger.state().total_staked,
            );
        }
        if reward > 0 {
            Self::pay_reward(&env, &config, &staker, reward);
        }

        Ok((principal, reward))
    }

    /// Reward `staker` could claim right now. Does not mutate state.
    pub fn get_reward(env: Env, staker: Address) -> Result<i128, ContractError> {
        storage::load_config(&env)?;

        let account =
            storage::load_account(&env, &staker).ok_or(ContractError::AccountNotFound)?;
        RewardLedger::new(storage::load_global(&env))
            .pending_reward(&account, env.ledger().timestamp())
    }

    // ── View functions ───────────────────────────────────────────────────────

    /// Return the user's current staked balance.
    pub fn get_staked(env: Env, staker: Address) -> i128 {
        storage::load_account(&env, &staker)
            .map(|account| account.staked)
            .unwrap_or(0)
    }

    /// Return the raw accounting record for `staker`, if it ever staked.
    pub fn get_account(env: Env, staker: Address) -> Option<Account> {
        storage::load_account(&env, &staker)
    }

    /// Return the combined staking position for a user.
    ///
    /// Unlike `get_reward`, an unknown address reports an empty position.
    pub fn get_staker_info(env: Env, staker: Address) -> Result<StakerInfo, ContractError> {
        let account = storage::load_account(&env, &staker).unwrap_or_default();
        let pending_rewards = RewardLedger::new(storage::load_global(&env))
            .pending_reward(&account, env.ledger().timestamp())?;

        Ok(StakerInfo {
            staked: account.staked,
            pending_rewards,
        })
    }

    pub fn get_global_state(env: Env) -> GlobalState {
        storage::load_global(&env)
    }

    /// Return the sum of all currently staked tokens.
    pub fn get_total_staked(env: Env) -> i128 {
        storage::load_global(&env).total_staked
    }

    /// Return the emission rate as `(reward_pool, reward_duration)`:
    /// `reward_pool` units spread over `reward_duration` seconds.
    pub fn get_reward_rate(env: Env) -> (i128, u64) {
        RewardLedger::new(storage::load_global(&env)).reward_rate()
    }

    pub fn get_period_finish(env: Env) -> u64 {
        storage::load_global(&env).period_finish
    }

    /// Projected reward-per-token accumulator, scaled by `rewards::PRECISION`.
    pub fn reward_per_token(env: Env) -> Result<i128, ContractError> {
        RewardLedger::new(storage::load_global(&env)).reward_per_token(env.ledger().timestamp())
    }

    pub fn is_initialized(env: Env) -> bool {
        storage::is_initialized(&env)
    }

    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        Ok(storage::load_config(&env)?.admin)
    }

    pub fn get_config(env: Env) -> Result<LedgerConfig, ContractError> {
        storage::load_config(&env)
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Guard: revert if `caller` is not the configured admin.
    fn require_admin(config: &LedgerConfig, caller: &Address) -> Result<(), ContractError> {
        if *caller != config.admin {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    /// Move `reward` out of custody to `staker` and record the claim.
    fn pay_reward(env: &Env, config: &LedgerConfig, staker: &Address, reward: i128) {
        token::Client::new(env, &config.reward_token).transfer(
            &env.current_contract_address(),
            staker,
            &reward,
        );
        log!(env, "reward paid", staker.clone(), reward);
        events::publish_reward_claimed(env, staker.clone(), reward);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
