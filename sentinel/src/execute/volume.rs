//! VolumeLimiter handlers.
//!
//! Admission control over USD-denominated volume: a per-transaction
//! ceiling, then lazily-reset hourly and daily windows. Crossing the alert
//! threshold emits an alert attribute; crossing the auto-pause threshold
//! flips a one-way pause flag and retroactively refuses the admission,
//! while the accounting deliberately keeps the attempt.

use cosmwasm_std::{
    Binary, DepsMut, Env, MessageInfo, Response, Storage, Timestamp, Uint128, Uint256,
};

use crate::error::ContractError;
use crate::hash::{bytes32_to_hex, parse_bytes32};
use crate::msg::VolumeLimitsMsg;
use crate::state::{
    TokenVolumeConfig, VolumeLimits, VolumeWindow, CONFIG, DAILY_USAGE, DAILY_WINDOW,
    GLOBAL_LIMITS, HOURLY_USAGE, HOURLY_WINDOW, USD_PRECISION, VOLUME_CONTROLS, VOLUME_TOKENS,
};

use super::guardian::ensure_not_paused;

/// Execute handler for admitting a transfer by notional value (executor
/// only). The response carries `allowed` and `usd_value` attributes; a
/// ceiling rejection is a clean refusal, not an error, and writes nothing.
pub fn execute_admit_transfer(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    token: Binary,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.executor && info.sender != config.admin {
        return Err(ContractError::UnauthorizedExecutor);
    }
    ensure_not_paused(deps.storage)?;

    let mut controls = VOLUME_CONTROLS.load(deps.storage)?;
    if controls.paused {
        return Err(ContractError::VolumeLimiterPaused);
    }

    let token_bytes = parse_bytes32(&token)?;
    let token_config = load_supported_token(deps.storage, &token_bytes)?;
    let usd_value = compute_usd_value(&token_config, amount)?;

    let limits = token_config
        .custom_limits
        .unwrap_or(GLOBAL_LIMITS.load(deps.storage)?);

    let base = Response::new()
        .add_attribute("method", "admit_transfer")
        .add_attribute("token", bytes32_to_hex(&token_bytes))
        .add_attribute("amount", amount.to_string())
        .add_attribute("usd_value", usd_value.to_string());

    // Per-transaction ceiling: hard reject, nothing accounted.
    if exceeds(usd_value, limits.max_transfer_usd) {
        return Ok(base
            .add_attribute("allowed", "false")
            .add_attribute("reason", "max_transfer"));
    }

    let mut hourly = rolled_window(
        HOURLY_USAGE.load(deps.storage)?,
        env.block.time,
        HOURLY_WINDOW,
    );
    if exceeds(hourly.volume_usd + usd_value, limits.hourly_limit_usd) {
        return Ok(base
            .add_attribute("allowed", "false")
            .add_attribute("reason", "hourly_limit"));
    }

    let mut daily = rolled_window(
        DAILY_USAGE.load(deps.storage)?,
        env.block.time,
        DAILY_WINDOW,
    );
    if exceeds(daily.volume_usd + usd_value, limits.daily_limit_usd) {
        return Ok(base
            .add_attribute("allowed", "false")
            .add_attribute("reason", "daily_limit"));
    }

    // Admitted: account in both windows before evaluating thresholds.
    hourly.volume_usd += usd_value;
    hourly.tx_count += 1;
    HOURLY_USAGE.save(deps.storage, &hourly)?;

    daily.volume_usd += usd_value;
    daily.tx_count += 1;
    DAILY_USAGE.save(deps.storage, &daily)?;

    let hourly_alert = usage_reaches(
        hourly.volume_usd,
        limits.hourly_limit_usd,
        controls.alert_threshold_bps,
    );
    let daily_alert = usage_reaches(
        daily.volume_usd,
        limits.daily_limit_usd,
        controls.alert_threshold_bps,
    );
    let auto_pause = usage_reaches(
        hourly.volume_usd,
        limits.hourly_limit_usd,
        controls.auto_pause_threshold_bps,
    ) || usage_reaches(
        daily.volume_usd,
        limits.daily_limit_usd,
        controls.auto_pause_threshold_bps,
    );

    let mut response = base;
    if hourly_alert || daily_alert {
        response = response.add_attribute(
            "volume_alert",
            if hourly_alert { "hourly" } else { "daily" },
        );
    }

    if auto_pause {
        // One-way: only an administrative resume clears this. The attempt
        // stays accounted, but the caller must not proceed.
        controls.paused = true;
        VOLUME_CONTROLS.save(deps.storage, &controls)?;
        return Ok(response
            .add_attribute("allowed", "false")
            .add_attribute("reason", "auto_pause")
            .add_attribute("auto_paused", "true"));
    }

    Ok(response.add_attribute("allowed", "true"))
}

/// Execute handler for registering a token for admission.
pub fn execute_register_token(
    deps: DepsMut,
    info: MessageInfo,
    token: Binary,
    usd_price: Uint128,
    decimals: u8,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    if decimals > 38 {
        return Err(ContractError::InvalidDecimals { decimals });
    }

    let token_bytes = parse_bytes32(&token)?;
    let token_config = TokenVolumeConfig {
        supported: true,
        usd_price,
        decimals,
        custom_limits: None,
    };
    VOLUME_TOKENS.save(deps.storage, token_bytes.as_slice(), &token_config)?;

    Ok(Response::new()
        .add_attribute("method", "register_token")
        .add_attribute("token", bytes32_to_hex(&token_bytes))
        .add_attribute("usd_price", usd_price.to_string())
        .add_attribute("decimals", decimals.to_string()))
}

/// Execute handler for a price update (oracle or admin).
///
/// The price is used verbatim; staleness is the oracle's problem by
/// documented trust assumption.
pub fn execute_update_token_price(
    deps: DepsMut,
    info: MessageInfo,
    token: Binary,
    usd_price: Uint128,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.oracle && info.sender != config.admin {
        return Err(ContractError::UnauthorizedOracle);
    }

    let token_bytes = parse_bytes32(&token)?;
    let mut token_config = load_supported_token(deps.storage, &token_bytes)?;
    token_config.usd_price = usd_price;
    VOLUME_TOKENS.save(deps.storage, token_bytes.as_slice(), &token_config)?;

    Ok(Response::new()
        .add_attribute("method", "update_token_price")
        .add_attribute("token", bytes32_to_hex(&token_bytes))
        .add_attribute("usd_price", usd_price.to_string()))
}

/// Execute handler for setting or clearing a token's ceiling override.
pub fn execute_set_token_limits(
    deps: DepsMut,
    info: MessageInfo,
    token: Binary,
    limits: Option<VolumeLimitsMsg>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    let token_bytes = parse_bytes32(&token)?;
    let mut token_config = load_supported_token(deps.storage, &token_bytes)?;

    let override_set = limits.is_some();
    token_config.custom_limits = limits.map(|l| VolumeLimits {
        max_transfer_usd: l.max_transfer_usd,
        hourly_limit_usd: l.hourly_limit_usd,
        daily_limit_usd: l.daily_limit_usd,
    });
    VOLUME_TOKENS.save(deps.storage, token_bytes.as_slice(), &token_config)?;

    Ok(Response::new()
        .add_attribute("method", "set_token_limits")
        .add_attribute("token", bytes32_to_hex(&token_bytes))
        .add_attribute("override", override_set.to_string()))
}

/// Execute handler for updating the global ceilings.
pub fn execute_update_global_limits(
    deps: DepsMut,
    info: MessageInfo,
    max_transfer_usd: Option<Uint128>,
    hourly_limit_usd: Option<Uint128>,
    daily_limit_usd: Option<Uint128>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    let mut limits = GLOBAL_LIMITS.load(deps.storage)?;
    if let Some(max_transfer) = max_transfer_usd {
        limits.max_transfer_usd = max_transfer;
    }
    if let Some(hourly) = hourly_limit_usd {
        limits.hourly_limit_usd = hourly;
    }
    if let Some(daily) = daily_limit_usd {
        limits.daily_limit_usd = daily;
    }
    GLOBAL_LIMITS.save(deps.storage, &limits)?;

    Ok(Response::new()
        .add_attribute("method", "update_global_limits")
        .add_attribute("max_transfer_usd", limits.max_transfer_usd.to_string())
        .add_attribute("hourly_limit_usd", limits.hourly_limit_usd.to_string())
        .add_attribute("daily_limit_usd", limits.daily_limit_usd.to_string()))
}

/// Execute handler for updating alert/auto-pause thresholds.
pub fn execute_update_volume_thresholds(
    deps: DepsMut,
    info: MessageInfo,
    alert_bps: Option<u32>,
    auto_pause_bps: Option<u32>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    let mut controls = VOLUME_CONTROLS.load(deps.storage)?;
    if let Some(bps) = alert_bps {
        if bps > 10_000 {
            return Err(ContractError::InvalidThresholdBps { bps });
        }
        controls.alert_threshold_bps = bps;
    }
    if let Some(bps) = auto_pause_bps {
        if bps > 10_000 {
            return Err(ContractError::InvalidThresholdBps { bps });
        }
        controls.auto_pause_threshold_bps = bps;
    }
    if controls.alert_threshold_bps > controls.auto_pause_threshold_bps {
        return Err(ContractError::ThresholdOrdering);
    }
    VOLUME_CONTROLS.save(deps.storage, &controls)?;

    Ok(Response::new()
        .add_attribute("method", "update_volume_thresholds")
        .add_attribute("alert_bps", controls.alert_threshold_bps.to_string())
        .add_attribute(
            "auto_pause_bps",
            controls.auto_pause_threshold_bps.to_string(),
        ))
}

/// Execute handler for clearing the limiter's auto-pause flag.
pub fn execute_resume_volume(
    deps: DepsMut,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    let mut controls = VOLUME_CONTROLS.load(deps.storage)?;
    controls.paused = false;
    VOLUME_CONTROLS.save(deps.storage, &controls)?;

    Ok(Response::new().add_attribute("method", "resume_volume"))
}

// ============================================================================
// Window and Value Helpers
// ============================================================================

/// Lazy window roll: once the current time passes window-start + length,
/// the window restarts at zero. Read and write paths share this so any two
/// observers of the same instant agree on the arithmetic.
pub fn rolled_window(window: VolumeWindow, now: Timestamp, length: u64) -> VolumeWindow {
    if now.seconds() >= window.window_start.seconds() + length {
        VolumeWindow {
            volume_usd: Uint128::zero(),
            window_start: now,
            tx_count: 0,
        }
    } else {
        window
    }
}

/// USD value = normalize(amount, decimals -> 18) * price / 1e18, computed
/// in 256 bits so large amounts surface as a typed overflow error instead
/// of silently wrapping.
pub fn compute_usd_value(
    token_config: &TokenVolumeConfig,
    amount: Uint128,
) -> Result<Uint128, ContractError> {
    if amount.is_zero() {
        return Err(ContractError::InvalidAmount {
            reason: "amount must be greater than zero".to_string(),
        });
    }

    let normalized = if token_config.decimals <= 18 {
        let factor = Uint256::from(10u128.pow((18 - token_config.decimals) as u32));
        Uint256::from(amount)
            .checked_mul(factor)
            .map_err(|_| ContractError::ValueOverflow)?
    } else {
        let divisor = Uint256::from(10u128.pow((token_config.decimals - 18) as u32));
        Uint256::from(amount) / divisor
    };

    let value = normalized
        .checked_mul(Uint256::from(token_config.usd_price))
        .map_err(|_| ContractError::ValueOverflow)?
        / Uint256::from(USD_PRECISION);

    Uint128::try_from(value).map_err(|_| ContractError::ValueOverflow)
}

/// Ceiling comparison with zero meaning unlimited.
pub fn exceeds(value: Uint128, limit: Uint128) -> bool {
    !limit.is_zero() && value > limit
}

/// Whether used/limit meets a basis-point threshold. Cross-multiplied in
/// 256 bits; an unlimited ceiling never alerts or pauses.
pub fn usage_reaches(used: Uint128, limit: Uint128, threshold_bps: u32) -> bool {
    if limit.is_zero() {
        return false;
    }
    Uint256::from(used) * Uint256::from(10_000u128)
        >= Uint256::from(limit) * Uint256::from(threshold_bps as u128)
}

/// Load a token's config, rejecting unknown or disabled tokens.
pub fn load_supported_token(
    storage: &dyn Storage,
    token: &[u8; 32],
) -> Result<TokenVolumeConfig, ContractError> {
    let token_config = VOLUME_TOKENS
        .may_load(storage, token.as_slice())?
        .ok_or_else(|| ContractError::TokenNotSupported {
            token: bytes32_to_hex(token),
        })?;
    if !token_config.supported {
        return Err(ContractError::TokenNotSupported {
            token: bytes32_to_hex(token),
        });
    }
    Ok(token_config)
}
