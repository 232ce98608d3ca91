use soroban_sdk::{symbol_short, Address, Env, Symbol};

use crate::rewards::{AccountRecord, RewardState};

// ── Storage key constants ────────────────────────────────────────────────────

const OWNER: Symbol = symbol_short!("OWNER");
const PENDING_OWNER: Symbol = symbol_short!("PEND_OWN");
const STAKE_TOKEN: Symbol = symbol_short!("STK_TOK");
const REWARD_TOKEN: Symbol = symbol_short!("RWD_TOK");
const REWARD_STATE: Symbol = symbol_short!("RWD_ST");

// Per-account persistent storage uses tuple keys: (prefix, account)
const ACCOUNT: Symbol = symbol_short!("ACCT");

const DAY_IN_LEDGERS: u32 = 17280;
const TTL_EXTEND_TO: u32 = 30 * DAY_IN_LEDGERS;
const TTL_THRESHOLD: u32 = TTL_EXTEND_TO - DAY_IN_LEDGERS;

// ── Configuration ────────────────────────────────────────────────────────────

pub fn is_initialized(env: &Env) -> bool {
    env.storage().instance().has(&OWNER)
}

pub fn get_owner(env: &Env) -> Option<Address> {
    env.storage().instance().get(&OWNER)
}

pub fn set_owner(env: &Env, owner: &Address) {
    env.storage().instance().set(&OWNER, owner);
}

pub fn get_pending_owner(env: &Env) -> Option<Address> {
    env.storage().instance().get(&PENDING_OWNER)
}

pub fn set_pending_owner(env: &Env, pending: &Address) {
    env.storage().instance().set(&PENDING_OWNER, pending);
}

pub fn remove_pending_owner(env: &Env) {
    env.storage().instance().remove(&PENDING_OWNER);
}

pub fn get_stake_token(env: &Env) -> Option<Address> {
    env.storage().instance().get(&STAKE_TOKEN)
}

pub fn get_reward_token(env: &Env) -> Option<Address> {
    env.storage().instance().get(&REWARD_TOKEN)
}

pub fn set_tokens(env: &Env, stake_token: &Address, reward_token: &Address) {
    env.storage().instance().set(&STAKE_TOKEN, stake_token);
    env.storage().instance().set(&REWARD_TOKEN, reward_token);
}

// ── Reward state ─────────────────────────────────────────────────────────────

/// Global accrual state; all-zero before the first write.
pub fn get_reward_state(env: &Env) -> RewardState {
    env.storage()
        .instance()
        .get(&REWARD_STATE)
        .unwrap_or_default()
}

pub fn set_reward_state(env: &Env, state: &RewardState) {
    env.storage().instance().set(&REWARD_STATE, state);
}

// ── Accounts ─────────────────────────────────────────────────────────────────

fn account_key(account: &Address) -> (Symbol, Address) {
    (ACCOUNT, account.clone())
}

fn extend_ttl(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Load an account record. Accounts that never staked read as all-zero.
pub fn get_account(env: &Env, account: &Address) -> AccountRecord {
    let key = account_key(account);
    let record: Option<AccountRecord> = env.storage().persistent().get(&key);
    match record {
        Some(record) => {
            extend_ttl(env, &key);
            record
        }
        None => AccountRecord::default(),
    }
}

pub fn set_account(env: &Env, account: &Address, record: &AccountRecord) {
    let key = account_key(account);
    env.storage().persistent().set(&key, record);
    extend_ttl(env, &key);
}

pub fn has_account(env: &Env, account: &Address) -> bool {
    env.storage().persistent().has(&account_key(account))
}
