#![no_std]

pub mod errors;
pub mod events;
pub mod rewards;
pub mod storage;

use soroban_sdk::{contract, contractimpl, contracttype, token, Address, Env};

pub use errors::ContractError;
pub use rewards::{AccountRecord, RewardState, PRECISION};

// ── Public-facing types (re-exported for test consumers) ─────────────────────

/// Snapshot of an account's position returned by `get_account`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccountInfo {
    pub balance: i128,
    pub reward_per_token_paid: i128,
    pub rewards: i128,
    /// `rewards` plus everything accrued since the last checkpoint.
    pub earned: i128,
}

// ── Contract ─────────────────────────────────────────────────────────────────

#[contract]
pub struct StakingRewardsContract;

#[contractimpl]
impl StakingRewardsContract {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bootstrap the ledger.
    ///
    /// * `stake_token`  – SAC address of the token users stake.
    /// * `reward_token` – SAC address of the token distributed as rewards.
    ///
    /// Emission starts once the owner sets a duration and funds a period.
    pub fn initialize(
        env: Env,
        owner: Address,
        stake_token: Address,
        reward_token: Address,
    ) -> Result<(), ContractError> {
        if storage::is_initialized(&env) {
            return Err(ContractError::AlreadyInitialized);
        }
        if stake_token == reward_token {
            return Err(ContractError::TokensIdentical);
        }

        storage::set_owner(&env, &owner);
        storage::set_tokens(&env, &stake_token, &reward_token);
        storage::set_reward_state(&env, &RewardState::default());

        events::publish_initialized(&env, owner, stake_token, reward_token);

        Ok(())
    }

    // ── Staking ─────────────────────────────────────────────────────────────

    /// Deposit `amount` stake tokens.
    ///
    /// Rewards up to now accrue on the balance held *before* the deposit.
    pub fn stake(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        // 1. Checkpoint global state and the staker's record.
        let mut state = storage::get_reward_state(&env);
        let mut account = storage::get_account(&env, &staker);
        rewards::checkpoint(&env, &mut state, Some(&mut account), env.ledger().timestamp())?;

        // 2. Pull tokens from the staker into the contract.
        let stake_token = storage::get_stake_token(&env).ok_or(ContractError::NotInitialized)?;
        Self::transfer(&env, &stake_token, &staker, &env.current_contract_address(), amount)?;

        // 3. Increase the staker's balance and the global total.
        account.balance = account.balance.saturating_add(amount);
        state.total_supply = state.total_supply.saturating_add(amount);

        storage::set_account(&env, &staker, &account);
        storage::set_reward_state(&env, &state);

        events::publish_staked(&env, staker, amount, state.total_supply);

        Ok(())
    }

    /// Return `amount` staked tokens to the staker.
    pub fn withdraw(env: Env, staker: Address, amount: i128) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        if amount <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        let mut state = storage::get_reward_state(&env);
        let mut account = storage::get_account(&env, &staker);
        rewards::checkpoint(&env, &mut state, Some(&mut account), env.ledger().timestamp())?;

        Self::withdraw_checkpointed(&env, &staker, &mut state, &mut account, amount)
    }

    /// Claim all accumulated rewards for `staker`. Returns the amount paid.
    ///
    /// Claiming with nothing accrued is a no-op returning zero.
    pub fn get_reward(env: Env, staker: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        let mut state = storage::get_reward_state(&env);
        let mut account = storage::get_account(&env, &staker);
        rewards::checkpoint(&env, &mut state, Some(&mut account), env.ledger().timestamp())?;

        storage::set_reward_state(&env, &state);
        Self::pay_reward(&env, &staker, &mut account)
    }

    /// Withdraw the whole balance and claim every accrued reward.
    pub fn exit(env: Env, staker: Address) -> Result<i128, ContractError> {
        Self::require_initialized(&env)?;
        staker.require_auth();

        let mut state = storage::get_reward_state(&env);
        let mut account = storage::get_account(&env, &staker);
        rewards::checkpoint(&env, &mut state, Some(&mut account), env.ledger().timestamp())?;

        let balance = account.balance;
        if balance <= 0 {
            return Err(ContractError::InvalidAmount);
        }

        Self::withdraw_checkpointed(&env, &staker, &mut state, &mut account, balance)?;
        Self::pay_reward(&env, &staker, &mut account)
    }

    // ── Owner functions ──────────────────────────────────────────────────────

    /// Set the length of the next funded period.
    ///
    /// Only allowed once the current period has fully elapsed. Accrual state
    /// is not touched.
    pub fn set_rewards_duration(
        env: Env,
        caller: Address,
        duration: u64,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        let mut state = storage::get_reward_state(&env);
        if env.ledger().timestamp() < state.finish_at {
            return Err(ContractError::RewardPeriodActive);
        }

        state.duration = duration;
        storage::set_reward_state(&env, &state);

        events::publish_rewards_duration_set(&env, duration);

        Ok(())
    }

    /// Fund a new emission period of `duration` seconds starting now.
    ///
    /// If a period is still running, its unemitted remainder is folded into
    /// the new rate. The contract must already hold enough reward tokens to
    /// cover `reward_rate × duration`.
    pub fn notify_reward_amount(
        env: Env,
        caller: Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        caller.require_auth();
        Self::require_owner(&env, &caller)?;

        if amount < 0 {
            return Err(ContractError::InvalidAmount);
        }

        let now = env.ledger().timestamp();
        let mut state = storage::get_reward_state(&env);

        // Flush accrual at the old rate before it changes.
        rewards::checkpoint(&env, &mut state, None, now)?;

        let reward_rate = rewards::next_reward_rate(&state, amount, now)?;
        if reward_rate <= 0 {
            return Err(ContractError::ZeroRewardRate);
        }

        let reward_token = storage::get_reward_token(&env).ok_or(ContractError::NotInitialized)?;
        let reserve = token::Client::new(&env, &reward_token).balance(&env.current_contract_address());
        if reward_rate.saturating_mul(state.duration as i128) > reserve {
            return Err(ContractError::InsufficientRewardBalance);
        }

        state.reward_rate = reward_rate;
        state.finish_at = now.saturating_add(state.duration);
        state.updated_at = now;
        storage::set_reward_state(&env, &state);

        events::publish_reward_added(&env, amount, reward_rate, state.finish_at);

        Ok(())
    }

    // ── Ownership transfer (two-step) ───────────────────────────────────────

    /// Propose a new owner. The proposed address must call `accept_owner`.
    pub fn propose_owner(
        env: Env,
        current_owner: Address,
        new_owner: Address,
    ) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        current_owner.require_auth();
        Self::require_owner(&env, &current_owner)?;

        storage::set_pending_owner(&env, &new_owner);

        events::publish_owner_transfer_proposed(&env, current_owner, new_owner);

        Ok(())
    }

    /// Accept a pending ownership transfer. Only the proposed owner can call this.
    pub fn accept_owner(env: Env, new_owner: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        new_owner.require_auth();

        let pending = storage::get_pending_owner(&env).ok_or(ContractError::NoPendingOwner)?;
        if new_owner != pending {
            return Err(ContractError::NotAuthorized);
        }

        let old_owner = storage::get_owner(&env).ok_or(ContractError::NotInitialized)?;

        storage::set_owner(&env, &new_owner);
        storage::remove_pending_owner(&env);

        events::publish_owner_transfer_accepted(&env, old_owner, new_owner);

        Ok(())
    }

    /// Cancel a pending ownership transfer.
    pub fn cancel_owner_transfer(env: Env, current_owner: Address) -> Result<(), ContractError> {
        Self::require_initialized(&env)?;
        current_owner.require_auth();
        Self::require_owner(&env, &current_owner)?;

        let pending = storage::get_pending_owner(&env).ok_or(ContractError::NoPendingOwner)?;
        storage::remove_pending_owner(&env);

        events::publish_owner_transfer_cancelled(&env, current_owner, pending);

        Ok(())
    }

    pub fn pending_owner(env: Env) -> Option<Address> {
        storage::get_pending_owner(&env)
    }

    // ── View functions ───────────────────────────────────────────────────────

    pub fn is_initialized(env: Env) -> bool {
        storage::is_initialized(&env)
    }

    pub fn owner(env: Env) -> Result<Address, ContractError> {
        storage::get_owner(&env).ok_or(ContractError::NotInitialized)
    }

    pub fn staking_token(env: Env) -> Result<Address, ContractError> {
        storage::get_stake_token(&env).ok_or(ContractError::NotInitialized)
    }

    pub fn rewards_token(env: Env) -> Result<Address, ContractError> {
        storage::get_reward_token(&env).ok_or(ContractError::NotInitialized)
    }

    /// Return the sum of all currently staked tokens.
    pub fn total_supply(env: Env) -> i128 {
        storage::get_reward_state(&env).total_supply
    }

    /// Return the account's current staked balance.
    pub fn balance_of(env: Env, account: Address) -> i128 {
        storage::get_account(&env, &account).balance
    }

    /// Rewards credited at the account's last checkpoint, not yet claimed.
    pub fn rewards_of(env: Env, account: Address) -> i128 {
        storage::get_account(&env, &account).rewards
    }

    /// Return the reward-per-token accumulator projected to now.
    pub fn reward_per_token(env: Env) -> Result<i128, ContractError> {
        rewards::reward_per_token(&env, &storage::get_reward_state(&env), env.ledger().timestamp())
    }

    /// Return real-time claimable rewards for an account without mutating state.
    pub fn earned(env: Env, account: Address) -> Result<i128, ContractError> {
        let rpt = Self::reward_per_token(env.clone())?;
        rewards::earned(&env, &storage::get_account(&env, &account), rpt)
    }

    pub fn last_time_reward_applicable(env: Env) -> u64 {
        let state = storage::get_reward_state(&env);
        rewards::last_time_reward_applicable(env.ledger().timestamp(), state.finish_at)
    }

    /// Return the current emission rate (reward tokens per second).
    pub fn reward_rate(env: Env) -> i128 {
        storage::get_reward_state(&env).reward_rate
    }

    pub fn finish_at(env: Env) -> u64 {
        storage::get_reward_state(&env).finish_at
    }

    pub fn updated_at(env: Env) -> u64 {
        storage::get_reward_state(&env).updated_at
    }

    pub fn duration(env: Env) -> u64 {
        storage::get_reward_state(&env).duration
    }

    /// Total emission of one full period at the current rate.
    pub fn get_reward_for_duration(env: Env) -> i128 {
        let state = storage::get_reward_state(&env);
        state.reward_rate.saturating_mul(state.duration as i128)
    }

    /// Return the stored record and live `earned` value for an account.
    ///
    /// Reads the account and the global state once each, instead of the
    /// separate reads `balance_of` + `earned` would incur.
    pub fn get_account(env: Env, account: Address) -> Result<AccountInfo, ContractError> {
        let state = storage::get_reward_state(&env);
        let record = storage::get_account(&env, &account);
        let rpt = rewards::reward_per_token(&env, &state, env.ledger().timestamp())?;

        Ok(AccountInfo {
            earned: rewards::earned(&env, &record, rpt)?,
            balance: record.balance,
            reward_per_token_paid: record.reward_per_token_paid,
            rewards: record.rewards,
        })
    }

    // ── Internal helpers ─────────────────────────────────────────────────────

    /// Guard: revert if the ledger is not yet initialized.
    fn require_initialized(env: &Env) -> Result<(), ContractError> {
        if !storage::is_initialized(env) {
            return Err(ContractError::NotInitialized);
        }
        Ok(())
    }

    /// Guard: revert if `caller` is not the stored owner.
    fn require_owner(env: &Env, caller: &Address) -> Result<(), ContractError> {
        let owner = storage::get_owner(env).ok_or(ContractError::NotInitialized)?;
        if *caller != owner {
            return Err(ContractError::NotAuthorized);
        }
        Ok(())
    }

    /// Move `amount` of `token` between two addresses, surfacing any
    /// collaborator failure as `TransferFailed`.
    fn transfer(
        env: &Env,
        token: &Address,
        from: &Address,
        to: &Address,
        amount: i128,
    ) -> Result<(), ContractError> {
        match token::Client::new(env, token).try_transfer(from, to, &amount) {
            Ok(Ok(())) => Ok(()),
            _ => Err(ContractError::TransferFailed),
        }
    }

    /// Decrement a checkpointed balance, persist, and send the tokens back.
    fn withdraw_checkpointed(
        env: &Env,
        staker: &Address,
        state: &mut RewardState,
        account: &mut AccountRecord,
        amount: i128,
    ) -> Result<(), ContractError> {
        if account.balance < amount {
            return Err(ContractError::InsufficientBalance);
        }

        account.balance = account.balance.saturating_sub(amount);
        state.total_supply = state.total_supply.saturating_sub(amount);

        storage::set_account(env, staker, account);
        storage::set_reward_state(env, state);

        // A failed transfer reverts the writes above along with the call.
        let stake_token = storage::get_stake_token(env).ok_or(ContractError::NotInitialized)?;
        Self::transfer(env, &stake_token, &env.current_contract_address(), staker, amount)?;

        events::publish_withdrawn(env, staker.clone(), amount, state.total_supply);

        Ok(())
    }

    /// Zero a checkpointed account's rewards and transfer them out.
    fn pay_reward(
        env: &Env,
        staker: &Address,
        account: &mut AccountRecord,
    ) -> Result<i128, ContractError> {
        let reward = account.rewards;
        if reward <= 0 {
            // A zero-balance record with nothing owed carries no state worth
            // a persistent entry.
            if account.balance > 0 {
                storage::set_account(env, staker, account);
            }
            return Ok(0);
        }

        account.rewards = 0;
        storage::set_account(env, staker, account);

        let reward_token = storage::get_reward_token(env).ok_or(ContractError::NotInitialized)?;
        Self::transfer(env, &reward_token, &env.current_contract_address(), staker, reward)?;

        events::publish_reward_paid(env, staker.clone(), reward);

        Ok(reward)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────


#[cfg(test)]
mod test_ownership;
