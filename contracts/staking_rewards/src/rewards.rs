use soroban_sdk::{contracttype, Env, I256};

use crate::errors::ContractError;

/// Fixed-point scaling factor for the reward-per-token accumulator.
///
/// `reward_per_token_stored` and every account's `reward_per_token_paid` are
/// expressed in units of `1 / PRECISION` reward per staked unit.
pub const PRECISION: i128 = 1_000_000_000_000_000_000;

// ── State ───────────────────────────────────────────────────────────────────

/// Global emission and accrual state of the ledger.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RewardState {
    /// Reward units emitted per second for the current period.
    pub reward_rate: i128,
    /// Timestamp at which the current emission period ends.
    pub finish_at: u64,
    /// Timestamp of the last global accrual update.
    pub updated_at: u64,
    /// Cumulative reward per staked unit, scaled by `PRECISION`.
    pub reward_per_token_stored: i128,
    /// Length in seconds of the next funded period.
    pub duration: u64,
    /// Sum of every account balance.
    pub total_supply: i128,
}

/// Per-account staking position. An account that never staked reads as
/// `AccountRecord::default()`.
#[contracttype]
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AccountRecord {
    pub balance: i128,
    /// Snapshot of `reward_per_token_stored` at the last checkpoint.
    pub reward_per_token_paid: i128,
    /// Accrued, unclaimed reward.
    pub rewards: i128,
}

// ── Fixed-point helpers ─────────────────────────────────────────────────────

/// `a × b × c / d` with a 256-bit intermediate, truncating once at the end.
///
/// Operands are non-negative and `d > 0`. At both call sites the product
/// stays below 2^255: two full-width factors times one, or one full-width
/// factor times a `u64` duration times `PRECISION`.
fn mul_mul_div(env: &Env, a: i128, b: i128, c: i128, d: i128) -> Result<i128, ContractError> {
    I256::from_i128(env, a)
        .mul(&I256::from_i128(env, b))
        .mul(&I256::from_i128(env, c))
        .div(&I256::from_i128(env, d))
        .to_i128()
        .ok_or(ContractError::MathOverflow)
}

// ── Core reward engine ──────────────────────────────────────────────────────

/// `min(now, finish_at)`: rewards stop accruing once the period ends.
pub fn last_time_reward_applicable(now: u64, finish_at: u64) -> u64 {
    now.min(finish_at)
}

/// Project the reward-per-token accumulator to `now` without mutating state.
///
/// ```text
/// rpt = stored + reward_rate × (min(now, finish_at) − updated_at) × PRECISION / total_supply
/// ```
///
/// With nothing staked the stored value is returned unchanged; emission over
/// a zero-supply interval is never credited to anyone.
pub fn reward_per_token(env: &Env, state: &RewardState, now: u64) -> Result<i128, ContractError> {
    if state.total_supply <= 0 {
        return Ok(state.reward_per_token_stored);
    }

    let applicable = last_time_reward_applicable(now, state.finish_at);
    let elapsed = applicable.saturating_sub(state.updated_at);

    let delta = mul_mul_div(
        env,
        state.reward_rate,
        elapsed as i128,
        PRECISION,
        state.total_supply,
    )?;

    state
        .reward_per_token_stored
        .checked_add(delta)
        .ok_or(ContractError::MathOverflow)
}

/// Total claimable reward for `account` given the accumulator value `rpt`.
///
/// ```text
/// earned = balance × (rpt − reward_per_token_paid) / PRECISION + rewards
/// ```
pub fn earned(env: &Env, account: &AccountRecord, rpt: i128) -> Result<i128, ContractError> {
    let rpt_delta = rpt
        .checked_sub(account.reward_per_token_paid)
        .ok_or(ContractError::MathOverflow)?;
    let pending = mul_mul_div(env, account.balance, rpt_delta, 1, PRECISION)?;

    account
        .rewards
        .checked_add(pending)
        .ok_or(ContractError::MathOverflow)
}

/// Bring the global state, and optionally one account, up to date as of
/// `now`. Must run before any change to `total_supply`, an account balance,
/// or the emission parameters.
pub fn checkpoint(
    env: &Env,
    state: &mut RewardState,
    account: Option<&mut AccountRecord>,
    now: u64,
) -> Result<(), ContractError> {
    state.reward_per_token_stored = reward_per_token(env, state, now)?;
    state.updated_at = last_time_reward_applicable(now, state.finish_at);

    if let Some(account) = account {
        account.rewards = earned(env, account, state.reward_per_token_stored)?;
        account.reward_per_token_paid = state.reward_per_token_stored;
    }
    Ok(())
}

/// Emission rate for a period funded with `amount` at `now`.
///
/// While a period is still running, the reward not yet emitted at the old
/// rate is rolled into the new one and the combined sum is spread over a
/// fresh `duration` window.
pub fn next_reward_rate(state: &RewardState, amount: i128, now: u64) -> Result<i128, ContractError> {
    if state.duration == 0 {
        return Err(ContractError::DurationNotSet);
    }

    let total = if now >= state.finish_at {
        amount
    } else {
        ((state.finish_at - now) as i128)
            .checked_mul(state.reward_rate)
            .and_then(|remaining| amount.checked_add(remaining))
            .ok_or(ContractError::MathOverflow)?
    };

    Ok(total / state.duration as i128)
}

// ── Unit tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;

    const ONE_WEEK: u64 = 604_800;

    fn active(rate: i128, updated_at: u64, finish_at: u64, total_supply: i128) -> RewardState {
        RewardState {
            reward_rate: rate,
            finish_at,
            updated_at,
            reward_per_token_stored: 0,
            duration: finish_at - updated_at,
            total_supply,
        }
    }

    #[test]
    fn rpt_unchanged_when_no_stakers() {
        let env = Env::default();
        let mut state = active(100, 0, 1_000, 0);
        state.reward_per_token_stored = 500;
        assert_eq!(reward_per_token(&env, &state, 600), Ok(500));
    }

    #[test]
    fn rpt_accumulates_correctly() {
        // 10/s × 100 s × PRECISION / 1_000 staked = PRECISION
        let env = Env::default();
        let state = active(10, 0, 1_000, 1_000);
        assert_eq!(reward_per_token(&env, &state, 100), Ok(PRECISION));
    }

    #[test]
    fn rpt_stops_at_finish() {
        let env = Env::default();
        let state = active(10, 0, 100, 1_000);
        assert_eq!(
            reward_per_token(&env, &state, 100),
            reward_per_token(&env, &state, 5_000)
        );
    }

    #[test]
    fn last_time_is_min_of_now_and_finish() {
        assert_eq!(last_time_reward_applicable(50, 100), 50);
        assert_eq!(last_time_reward_applicable(150, 100), 100);
    }

    #[test]
    fn earned_only_counts_delta_since_snapshot() {
        let env = Env::default();
        let account = AccountRecord {
            balance: 500,
            reward_per_token_paid: PRECISION,
            rewards: 50,
        };
        assert_eq!(earned(&env, &account, PRECISION), Ok(50));
        assert_eq!(earned(&env, &account, 2 * PRECISION), Ok(550));
    }

    #[test]
    fn earned_truncates_after_multiplying() {
        // 3 × (PRECISION / 2) / PRECISION = 1.5 → 1
        let env = Env::default();
        let account = AccountRecord {
            balance: 3,
            ..Default::default()
        };
        assert_eq!(earned(&env, &account, PRECISION / 2), Ok(1));
    }

    #[test]
    fn checkpoint_advances_updated_at_even_without_supply() {
        let env = Env::default();
        let mut state = active(10, 0, 1_000, 0);
        checkpoint(&env, &mut state, None, 400).unwrap();
        assert_eq!(state.updated_at, 400);
        assert_eq!(state.reward_per_token_stored, 0);

        // Time after finish is clamped.
        checkpoint(&env, &mut state, None, 9_000).unwrap();
        assert_eq!(state.updated_at, 1_000);
    }

    #[test]
    fn checkpoint_accrues_on_prior_balance() {
        let env = Env::default();
        let mut state = active(10, 0, 1_000, 1_000);
        let mut account = AccountRecord {
            balance: 1_000,
            ..Default::default()
        };

        checkpoint(&env, &mut state, Some(&mut account), 100).unwrap();

        assert_eq!(account.rewards, 1_000);
        assert_eq!(account.reward_per_token_paid, state.reward_per_token_stored);

        // A second checkpoint at the same instant adds nothing.
        checkpoint(&env, &mut state, Some(&mut account), 100).unwrap();
        assert_eq!(account.rewards, 1_000);
    }

    #[test]
    fn next_rate_fresh_period() {
        let state = RewardState {
            duration: ONE_WEEK,
            ..Default::default()
        };
        assert_eq!(
            next_reward_rate(&state, 100 * PRECISION, 10),
            Ok(100 * PRECISION / ONE_WEEK as i128)
        );
    }

    #[test]
    fn next_rate_rolls_over_remaining() {
        // 400 s left at 7/s → 2_800 unemitted, plus 1_000 new, over 1_000 s.
        let mut state = active(7, 0, 1_000, 1);
        state.duration = 1_000;
        assert_eq!(next_reward_rate(&state, 1_000, 600), Ok(3));
    }

    #[test]
    fn next_rate_zero_duration_fails() {
        let state = RewardState::default();
        assert_eq!(
            next_reward_rate(&state, 1_000, 0),
            Err(ContractError::DurationNotSet)
        );
    }

    #[test]
    fn full_week_at_eighteen_decimals_is_exact() {
        // 1_000 tokens over a week to 5 staked tokens: the intermediate
        // rate × elapsed × PRECISION is ~1e39, past i128::MAX.
        let env = Env::default();
        let rate = 1_000 * PRECISION / ONE_WEEK as i128;
        let mut state = active(rate, 0, ONE_WEEK, 5 * PRECISION);
        let mut account = AccountRecord {
            balance: 5 * PRECISION,
            ..Default::default()
        };

        checkpoint(&env, &mut state, Some(&mut account), ONE_WEEK).unwrap();

        // Truncation in the accumulator costs at most balance / PRECISION units.
        let emitted = rate * ONE_WEEK as i128;
        assert!(emitted - account.rewards <= 5, "rewards {}", account.rewards);
        assert!(account.rewards <= emitted);
        assert!(emitted > 999 * PRECISION);
    }

    #[test]
    fn accumulator_past_i128_is_an_error() {
        let env = Env::default();
        let state = active(i128::MAX / 2, 0, 1_000, 1);
        assert_eq!(
            reward_per_token(&env, &state, 1_000),
            Err(ContractError::MathOverflow)
        );
    }
}
