//! Admin operations handlers.
//!
//! This module handles:
//! - Admin transfer (propose/accept/cancel, 7-day timelock)
//! - Collaborator role re-pointing (executor, adjudicator, oracle)
//! - Challenge economics configuration

use cosmwasm_std::{DepsMut, Env, MessageInfo, Response, Uint128};

use crate::error::ContractError;
use crate::state::{
    PendingAdmin, ADMIN_TIMELOCK_DURATION, CONFIG, MAX_CHALLENGE_PERIOD, MIN_CHALLENGE_PERIOD,
    PENDING_ADMIN,
};

// ============================================================================
// Admin Transfer
// ============================================================================

/// Propose a new admin (starts timelock).
pub fn execute_propose_admin(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    new_admin: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    let new_admin_addr = deps.api.addr_validate(&new_admin)?;
    let pending = PendingAdmin {
        new_address: new_admin_addr.clone(),
        execute_after: env.block.time.plus_seconds(ADMIN_TIMELOCK_DURATION),
    };
    PENDING_ADMIN.save(deps.storage, &pending)?;

    Ok(Response::new()
        .add_attribute("method", "propose_admin")
        .add_attribute("new_admin", new_admin_addr.to_string())
        .add_attribute("execute_after", pending.execute_after.seconds().to_string()))
}

/// Accept pending admin role (after timelock).
pub fn execute_accept_admin(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let pending = PENDING_ADMIN
        .may_load(deps.storage)?
        .ok_or(ContractError::NoPendingAdmin)?;

    if info.sender != pending.new_address {
        return Err(ContractError::UnauthorizedPendingAdmin);
    }

    if env.block.time < pending.execute_after {
        let remaining = pending.execute_after.seconds() - env.block.time.seconds();
        return Err(ContractError::TimelockNotExpired {
            remaining_seconds: remaining,
        });
    }

    let mut config = CONFIG.load(deps.storage)?;
    config.admin = pending.new_address.clone();
    CONFIG.save(deps.storage, &config)?;
    PENDING_ADMIN.remove(deps.storage);

    Ok(Response::new()
        .add_attribute("method", "accept_admin")
        .add_attribute("new_admin", pending.new_address.to_string()))
}

/// Cancel pending admin proposal.
pub fn execute_cancel_admin_proposal(
    deps: DepsMut,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    PENDING_ADMIN.remove(deps.storage);

    Ok(Response::new().add_attribute("method", "cancel_admin_proposal"))
}

// ============================================================================
// Roles & Economics
// ============================================================================

/// Re-point collaborator addresses (admin only).
pub fn execute_update_roles(
    deps: DepsMut,
    info: MessageInfo,
    executor: Option<String>,
    adjudicator: Option<String>,
    oracle: Option<String>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    if let Some(executor) = executor {
        config.executor = deps.api.addr_validate(&executor)?;
    }
    if let Some(adjudicator) = adjudicator {
        config.adjudicator = deps.api.addr_validate(&adjudicator)?;
    }
    if let Some(oracle) = oracle {
        config.oracle = deps.api.addr_validate(&oracle)?;
    }
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "update_roles")
        .add_attribute("executor", config.executor.to_string())
        .add_attribute("adjudicator", config.adjudicator.to_string())
        .add_attribute("oracle", config.oracle.to_string()))
}

/// Update challenge economics (admin only).
pub fn execute_update_security_config(
    deps: DepsMut,
    info: MessageInfo,
    challenge_period: Option<u64>,
    min_challenge_bond: Option<Uint128>,
    challenger_reward: Option<Uint128>,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    if let Some(period) = challenge_period {
        if !(MIN_CHALLENGE_PERIOD..=MAX_CHALLENGE_PERIOD).contains(&period) {
            return Err(ContractError::InvalidChallengePeriod {
                min: MIN_CHALLENGE_PERIOD,
                max: MAX_CHALLENGE_PERIOD,
            });
        }
        config.challenge_period = period;
    }
    if let Some(bond) = min_challenge_bond {
        config.min_challenge_bond = bond;
    }
    if let Some(reward) = challenger_reward {
        config.challenger_reward = reward;
    }
    CONFIG.save(deps.storage, &config)?;

    Ok(Response::new()
        .add_attribute("method", "update_security_config")
        .add_attribute("challenge_period", config.challenge_period.to_string())
        .add_attribute("min_challenge_bond", config.min_challenge_bond.to_string())
        .add_attribute("challenger_reward", config.challenger_reward.to_string()))
}
