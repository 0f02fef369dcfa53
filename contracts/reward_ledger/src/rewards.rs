use crate::ContractError;

/// Fixed-point scaling factor for the reward-per-token accumulator.
///
/// Stellar assets carry 7 decimals, so a stake of one whole token is `10^7`
/// units. Scaling by `10^18` keeps sub-unit precision in the accumulator for
/// stakes up to roughly `10^20` units before the per-interval step truncates
/// to zero.
pub const PRECISION: i128 = 1_000_000_000_000_000_000;

// ── Emission ────────────────────────────────────────────────────────────────

/// Reward emitted over `elapsed` seconds by a pool of `reward_pool` units
/// spread across `reward_duration` seconds.
///
/// ```text
/// emission = floor(elapsed × reward_pool / reward_duration)
/// ```
///
/// The rate is kept as the rational `reward_pool / reward_duration` so that a
/// pool smaller than its duration (e.g. 1 000 units over a day) still emits.
/// Any fraction of a unit left over at a checkpoint is dropped, never
/// rounded up.
pub fn emission(
    elapsed: u64,
    reward_pool: i128,
    reward_duration: u64,
) -> Result<i128, ContractError> {
    if elapsed == 0 || reward_duration == 0 || reward_pool <= 0 {
        return Ok(0);
    }

    let emitted = i128::from(elapsed)
        .checked_mul(reward_pool)
        .ok_or(ContractError::ArithmeticOverflow)?;

    Ok(emitted / i128::from(reward_duration))
}

/// Whole seconds the pool needs to emit `emitted` units.
///
/// ```text
/// time = ceil(emitted × reward_duration / reward_pool)
/// ```
///
/// For `emitted = emission(elapsed, ..)` this never exceeds `elapsed`, and the
/// time left over is worth less than one unit, so a checkpoint can carry it
/// forward instead of discarding it.
pub fn emission_time(
    emitted: i128,
    reward_pool: i128,
    reward_duration: u64,
) -> Result<u64, ContractError> {
    if emitted <= 0 || reward_pool <= 0 {
        return Ok(0);
    }

    let scaled = emitted
        .checked_mul(i128::from(reward_duration))
        .ok_or(ContractError::ArithmeticOverflow)?
        .checked_add(reward_pool - 1)
        .ok_or(ContractError::ArithmeticOverflow)?;

    u64::try_from(scaled / reward_pool).map_err(|_| ContractError::ArithmeticOverflow)
}

// ── Accumulator ─────────────────────────────────────────────────────────────

/// Advance the global reward-per-token accumulator by one interval.
///
/// ```text
/// Δrpt    = floor(emission × PRECISION / total_staked)
/// new_rpt = stored_rpt + Δrpt
/// ```
///
/// When `total_staked` is zero the accumulator is left unchanged: with no
/// stakers there is nobody to distribute to, and dividing by zero is avoided.
pub fn compute_reward_per_token(
    stored: i128,
    emission: i128,
    total_staked: i128,
) -> Result<i128, ContractError> {
    if total_staked <= 0 || emission <= 0 {
        return Ok(stored);
    }

    let delta = emission
        .checked_mul(PRECISION)
        .ok_or(ContractError::ArithmeticOverflow)?
        / total_staked;

    stored
        .checked_add(delta)
        .ok_or(ContractError::ArithmeticOverflow)
}

/// Reward owed to a single account.
///
/// ```text
/// earned = staked × (current_rpt − rpt_paid) / PRECISION + reward_debt
/// ```
///
/// `current_rpt − rpt_paid` isolates what accumulated since the account's
/// last checkpoint, so previously folded reward is never counted twice.
pub fn earned(
    staked: i128,
    current_rpt: i128,
    rpt_paid: i128,
    reward_debt: i128,
) -> Result<i128, ContractError> {
    let delta_rpt = current_rpt
        .checked_sub(rpt_paid)
        .ok_or(ContractError::ArithmeticOverflow)?;

    let fresh = staked
        .checked_mul(delta_rpt)
        .ok_or(ContractError::ArithmeticOverflow)?
        / PRECISION;

    reward_debt
        .checked_add(fresh)
        .ok_or(ContractError::ArithmeticOverflow)
}

// ── Unit tests ──────────────────────────────────────────────────────────────
// Pure math, no Soroban environment.
