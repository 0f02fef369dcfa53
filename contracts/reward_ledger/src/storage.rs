use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::ledger::{Account, GlobalState};
use crate::{ContractError, LedgerConfig};

// ── Storage keys ────────────────────────────────────────────────────────────

const CONFIG: Symbol = symbol_short!("CONFIG");
const GLOBAL: Symbol = symbol_short!("GLOBAL");

// Per-account persistent storage uses tuple keys: (prefix, staker)
const ACCOUNT: Symbol = symbol_short!("ACCT");

/// ~30 days of 5 s ledgers.
const TTL_THRESHOLD: u32 = 518_400;
/// ~60 days of 5 s ledgers.
const TTL_EXTEND_TO: u32 = 1_036_800;

// ── Config ──────────────────────────────────────────────────────────────────

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&CONFIG)
}

pub fn load_config(env: &Env) -> Result<LedgerConfig, ContractError> {
    env.storage()
        .instance()
        .get(&CONFIG)
        .ok_or(ContractError::NotInitialized)
}

pub fn save_config(env: &Env, config: &LedgerConfig) {
    env.storage().instance().set(&CONFIG, config);
    extend_ttl_instance(env);
}

// ── Global state ────────────────────────────────────────────────────────────

/// Absent until the first mutation; a fresh ledger starts from zero.
pub fn load_global(env: &Env) -> GlobalState {
    env.storage().instance().get(&GLOBAL).unwrap_or_default()
}

pub fn save_global(env: &Env, state: &GlobalState) {
    env.storage().instance().set(&GLOBAL, state);
    extend_ttl_instance(env);
}

// ── Accounts ────────────────────────────────────────────────────────────────

/// `None` means the address has never staked. Accounts are never removed,
/// so this is distinguishable from a fully withdrawn position.
pub fn load_account(env: &Env, staker: &Address) -> Option<Account> {
    env.storage()
        .persistent()
        .get(&(ACCOUNT, staker.clone()))
}

pub fn save_account(env: &Env, staker: &Address, account: &Account) {
    let key = (ACCOUNT, staker.clone());
    env.storage().persistent().set(&key, account);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Extends the TTL of instance storage, which holds the config and the
/// global state together.
fn extend_ttl_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}
