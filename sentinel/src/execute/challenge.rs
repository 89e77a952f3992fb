//! ChallengeVerifier handlers.
//!
//! Implements the optimistic-verification state machine:
//! `Pending -> {Approved, Challenged}`, `Approved -> Executed`,
//! `Challenged -> {Approved, Refunded}`, `{Pending, Challenged} -> Cancelled`.
//! Terminal states never transition again, and no request ever moves by
//! time alone: every change is an explicit, attributable call.

use cosmwasm_std::{
    BankMsg, Binary, Coin, CosmosMsg, DepsMut, Env, MessageInfo, Response, Storage, Uint128,
};

use crate::error::ContractError;
use crate::hash::{bytes32_to_hex, parse_bytes32};
use crate::msg::TransferRequest;
use crate::state::{
    BridgeRequest, Challenge, Config, RequestStatus, BLACKLIST, CHALLENGES, CONFIG, REQUESTS,
    STATS,
};

use super::guardian::ensure_not_paused;

/// Execute handler for submitting a claimed transfer (executor only).
pub fn execute_submit_request(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    request: TransferRequest,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.executor && info.sender != config.admin {
        return Err(ContractError::UnauthorizedExecutor);
    }
    ensure_not_paused(deps.storage)?;

    let request_id = parse_bytes32(&request.request_id)?;
    let sender = parse_bytes32(&request.sender)?;
    let recipient = parse_bytes32(&request.recipient)?;
    let token = parse_bytes32(&request.token)?;

    if request.amount.is_zero() {
        return Err(ContractError::InvalidAmount {
            reason: "amount must be greater than zero".to_string(),
        });
    }

    for account in [&sender, &recipient] {
        let key = bytes32_to_hex(account);
        if BLACKLIST
            .may_load(deps.storage, &key)?
            .unwrap_or(false)
        {
            return Err(ContractError::AccountBlacklisted { account: key });
        }
    }

    if REQUESTS.has(deps.storage, request_id.as_slice()) {
        return Err(ContractError::RequestAlreadyExists);
    }

    let challenge_deadline = env.block.time.plus_seconds(config.challenge_period);
    let record = BridgeRequest {
        sender,
        recipient,
        token,
        amount: request.amount,
        src_chain_id: request.src_chain_id,
        dest_chain_id: request.dest_chain_id,
        submitted_at: env.block.time,
        challenge_deadline,
        status: RequestStatus::Pending,
    };
    REQUESTS.save(deps.storage, request_id.as_slice(), &record)?;

    let mut stats = STATS.load(deps.storage)?;
    stats.total_requests += 1;
    STATS.save(deps.storage, &stats)?;

    Ok(Response::new()
        .add_attribute("method", "submit_request")
        .add_attribute("request_id", bytes32_to_hex(&request_id))
        .add_attribute("sender", bytes32_to_hex(&sender))
        .add_attribute("amount", request.amount.to_string())
        .add_attribute("src_chain_id", request.src_chain_id.to_string())
        .add_attribute("dest_chain_id", request.dest_chain_id.to_string())
        .add_attribute(
            "challenge_deadline",
            challenge_deadline.seconds().to_string(),
        ))
}

/// Execute handler for disputing a pending request.
///
/// The attached native funds in the bond denom become the bond; it is
/// forfeited on a losing challenge and returned with a reward on a
/// winning one. A request can only ever be challenged once.
pub fn execute_challenge_request(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    request_id: Binary,
    reason: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    let id = parse_bytes32(&request_id)?;

    let mut request = REQUESTS
        .may_load(deps.storage, id.as_slice())?
        .ok_or(ContractError::RequestNotFound)?;

    if request.status != RequestStatus::Pending {
        return Err(ContractError::RequestNotPending {
            status: request.status.as_str().to_string(),
        });
    }
    if env.block.time >= request.challenge_deadline {
        return Err(ContractError::ChallengeWindowClosed {
            deadline: request.challenge_deadline.seconds(),
        });
    }

    let bond = info
        .funds
        .iter()
        .find(|c| c.denom == config.bond_denom)
        .map(|c| c.amount)
        .unwrap_or(Uint128::zero());
    if bond < config.min_challenge_bond {
        return Err(ContractError::InsufficientBond {
            got: bond,
            required: config.min_challenge_bond,
        });
    }

    request.status = RequestStatus::Challenged;
    REQUESTS.save(deps.storage, id.as_slice(), &request)?;

    let challenge = Challenge {
        challenger: info.sender.clone(),
        bond,
        reason: reason.clone(),
        challenged_at: env.block.time,
        resolved: false,
    };
    CHALLENGES.save(deps.storage, id.as_slice(), &challenge)?;

    let mut stats = STATS.load(deps.storage)?;
    stats.total_challenges += 1;
    STATS.save(deps.storage, &stats)?;

    Ok(Response::new()
        .add_attribute("method", "challenge_request")
        .add_attribute("request_id", bytes32_to_hex(&id))
        .add_attribute("challenger", info.sender.to_string())
        .add_attribute("bond", bond.to_string())
        .add_attribute("reason", reason))
}

/// Execute handler for optimistic finalization (anyone, at/after deadline).
pub fn execute_approve_request(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    request_id: Binary,
) -> Result<Response, ContractError> {
    ensure_not_paused(deps.storage)?;
    let id = parse_bytes32(&request_id)?;

    let mut request = REQUESTS
        .may_load(deps.storage, id.as_slice())?
        .ok_or(ContractError::RequestNotFound)?;

    if request.status != RequestStatus::Pending {
        return Err(ContractError::RequestNotPending {
            status: request.status.as_str().to_string(),
        });
    }
    if env.block.time < request.challenge_deadline {
        return Err(ContractError::ChallengeWindowOpen {
            remaining_seconds: request.challenge_deadline.seconds() - env.block.time.seconds(),
        });
    }

    request.status = RequestStatus::Approved;
    REQUESTS.save(deps.storage, id.as_slice(), &request)?;

    Ok(Response::new()
        .add_attribute("method", "approve_request")
        .add_attribute("request_id", bytes32_to_hex(&id))
        .add_attribute("status", request.status.as_str()))
}

/// Execute handler for resolving a challenge (adjudicator or admin).
pub fn execute_resolve_challenge(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    request_id: Binary,
    fraud_proven: bool,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.adjudicator && info.sender != config.admin {
        return Err(ContractError::UnauthorizedAdjudicator);
    }

    let id = parse_bytes32(&request_id)?;
    let (status, messages) = resolve_challenge_inner(deps.storage, &config, &id, fraud_proven)?;

    Ok(Response::new()
        .add_messages(messages)
        .add_attribute("method", "resolve_challenge")
        .add_attribute("request_id", bytes32_to_hex(&id))
        .add_attribute("fraud_proven", fraud_proven.to_string())
        .add_attribute("status", status))
}

/// Resolve a challenge against a request, shared by the authorized execute
/// handler and the adjudicator's internal best-effort relay.
///
/// Fraud proven: request refunded, challenger receives bond + reward.
/// Not proven: request approved, bond forfeited to the protocol.
pub fn resolve_challenge_inner(
    storage: &mut dyn Storage,
    config: &Config,
    request_id: &[u8; 32],
    fraud_proven: bool,
) -> Result<(&'static str, Vec<CosmosMsg>), ContractError> {
    let mut request = REQUESTS
        .may_load(storage, request_id.as_slice())?
        .ok_or(ContractError::RequestNotFound)?;

    if request.status != RequestStatus::Challenged {
        return Err(ContractError::RequestNotChallenged {
            status: request.status.as_str().to_string(),
        });
    }

    let mut challenge = CHALLENGES
        .may_load(storage, request_id.as_slice())?
        .ok_or(ContractError::ChallengeNotFound)?;
    if challenge.resolved {
        return Err(ContractError::ChallengeAlreadyResolved);
    }

    challenge.resolved = true;
    CHALLENGES.save(storage, request_id.as_slice(), &challenge)?;

    let mut stats = STATS.load(storage)?;
    let mut messages: Vec<CosmosMsg> = vec![];

    if fraud_proven {
        request.status = RequestStatus::Refunded;
        stats.challenges_upheld += 1;

        let payout = challenge.bond + config.challenger_reward;
        messages.push(CosmosMsg::Bank(BankMsg::Send {
            to_address: challenge.challenger.to_string(),
            amount: vec![Coin {
                denom: config.bond_denom.clone(),
                amount: payout,
            }],
        }));
    } else {
        request.status = RequestStatus::Approved;
        stats.challenges_rejected += 1;
        stats.bonds_forfeited += challenge.bond;
    }

    REQUESTS.save(storage, request_id.as_slice(), &request)?;
    STATS.save(storage, &stats)?;

    Ok((request.status.as_str(), messages))
}

/// Execute handler for marking an approved request executed (executor only).
pub fn execute_mark_executed(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    request_id: Binary,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.executor && info.sender != config.admin {
        return Err(ContractError::UnauthorizedExecutor);
    }
    ensure_not_paused(deps.storage)?;

    let id = parse_bytes32(&request_id)?;
    let mut request = REQUESTS
        .may_load(deps.storage, id.as_slice())?
        .ok_or(ContractError::RequestNotFound)?;

    if request.status != RequestStatus::Approved {
        return Err(ContractError::RequestNotApproved {
            status: request.status.as_str().to_string(),
        });
    }

    request.status = RequestStatus::Executed;
    REQUESTS.save(deps.storage, id.as_slice(), &request)?;

    Ok(Response::new()
        .add_attribute("method", "mark_executed")
        .add_attribute("request_id", bytes32_to_hex(&id)))
}

/// Execute handler for administrative cancellation.
///
/// Cancelling a challenged request refunds the challenger's bond without
/// reward: cancellation is not a loss for an as-yet-unresolved challenger.
pub fn execute_cancel_request(
    deps: DepsMut,
    _env: Env,
    info: MessageInfo,
    request_id: Binary,
    reason: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    let id = parse_bytes32(&request_id)?;
    let mut request = REQUESTS
        .may_load(deps.storage, id.as_slice())?
        .ok_or(ContractError::RequestNotFound)?;

    let mut messages: Vec<CosmosMsg> = vec![];
    match request.status {
        RequestStatus::Pending => {}
        RequestStatus::Challenged => {
            let mut challenge = CHALLENGES
                .may_load(deps.storage, id.as_slice())?
                .ok_or(ContractError::ChallengeNotFound)?;
            if !challenge.resolved {
                challenge.resolved = true;
                CHALLENGES.save(deps.storage, id.as_slice(), &challenge)?;
                messages.push(CosmosMsg::Bank(BankMsg::Send {
                    to_address: challenge.challenger.to_string(),
                    amount: vec![Coin {
                        denom: config.bond_denom.clone(),
                        amount: challenge.bond,
                    }],
                }));
            }
        }
        _ => {
            return Err(ContractError::RequestNotCancellable {
                status: request.status.as_str().to_string(),
            });
        }
    }

    request.status = RequestStatus::Cancelled;
    REQUESTS.save(deps.storage, id.as_slice(), &request)?;

    Ok(Response::new()
        .add_messages(messages)
        .add_attribute("method", "cancel_request")
        .add_attribute("request_id", bytes32_to_hex(&id))
        .add_attribute("reason", reason))
}
