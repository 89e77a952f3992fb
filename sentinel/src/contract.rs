//! Sentinel Security Core - Entry Points
//!
//! Defense-in-depth verification pipeline for cross-chain transfers. The
//! implementation is modularized into:
//! - `execute/` - Execute message handlers, one module per component
//! - `query` - Query message handlers
//!
//! # Transfer Flow
//! 1. The bridge executor admits the transfer by notional value (`AdmitTransfer`)
//! 2. The executor submits the request, starting the challenge clock (`SubmitRequest`)
//! 3. MPC signatures are verified and the nonce consumed (`VerifyTransfer`)
//! 4. Unchallenged requests finalize optimistically (`ApproveRequest`), then
//!    the executor releases funds and reports back (`MarkExecuted`)
//! 5. A disputed request is challenged under bond, adjudicated via fraud
//!    proofs, and resolved to refund or approval
//!
//! # Security
//! - Threshold signature quorum with versioned, self-rotating signer sets
//! - Optimistic verification with economic bonding and fraud adjudication
//! - USD volume ceilings with alerting and one-way auto-pause
//! - Guardian council: instant single-guardian pause, quorum governance

use cosmwasm_std::{
    entry_point, to_json_binary, Binary, Deps, DepsMut, Env, MessageInfo, Reply, Response,
    StdResult, Uint128,
};
use cw2::set_contract_version;

use crate::error::ContractError;
use crate::execute::{
    execute_accept_admin, execute_add_signer, execute_admit_transfer, execute_approve_proposal,
    execute_approve_request, execute_cancel_admin_proposal, execute_cancel_proposal,
    execute_cancel_request, execute_challenge_request, execute_emergency_pause,
    execute_execute_proposal, execute_invalidate_nonce, execute_mark_executed,
    execute_owner_add_guardian, execute_owner_remove_guardian,
    execute_owner_update_guardian_threshold, execute_propose, execute_propose_admin,
    execute_register_token, execute_remove_signer, execute_resolve_challenge,
    execute_resume_volume, execute_rotate_signers, execute_set_chain_token,
    execute_set_token_limits, execute_submit_proof, execute_submit_request,
    execute_update_global_limits, execute_update_roles, execute_update_security_config,
    execute_update_signer_threshold, execute_update_token_price,
    execute_update_volume_thresholds, execute_verify_proof, execute_verify_transfer,
    parse_signer_list, validate_set_shape, EXECUTOR_RELAY_REPLY_ID,
};
use crate::msg::{ExecuteMsg, InstantiateMsg, MigrateMsg, QueryMsg};
use crate::query::{
    query_chain_token, query_challenge, query_check_transfer, query_config, query_fraud_stats,
    query_guardians, query_is_blacklisted, query_nonce_used, query_pause_state,
    query_pending_admin, query_proof, query_proposal, query_proposals, query_request,
    query_requests, query_security_stats, query_signer_set, query_transfer_hash,
    query_validate_signatures, query_volume_token, query_volume_usage,
};
use crate::state::{
    Config, PauseState, SecurityStats, SignerSet, VolumeControls, VolumeLimits, VolumeWindow,
    CONFIG, CONTRACT_NAME, CONTRACT_VERSION, CURRENT_SET_VERSION, DAILY_USAGE,
    DEFAULT_ALERT_THRESHOLD_BPS, DEFAULT_AUTO_PAUSE_THRESHOLD_BPS, DEFAULT_CHALLENGE_PERIOD,
    FRAUD_COUNT, GLOBAL_LIMITS, GUARDIANS, GUARDIAN_COUNT, GUARDIAN_THRESHOLD, HOURLY_USAGE,
    LAST_ROTATION, MAX_CHALLENGE_PERIOD, MIN_CHALLENGE_PERIOD, MIN_GUARDIANS, NEXT_PROPOSAL_ID,
    PAUSE_STATE, SIGNER_SETS, STATS, VOLUME_CONTROLS,
};

// ============================================================================
// Instantiate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn instantiate(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    msg: InstantiateMsg,
) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;

    let admin = deps.api.addr_validate(&msg.admin)?;
    let executor = deps.api.addr_validate(&msg.executor)?;
    let adjudicator = deps.api.addr_validate(&msg.adjudicator)?;
    let oracle = deps.api.addr_validate(&msg.oracle)?;

    let challenge_period = msg.challenge_period.unwrap_or(DEFAULT_CHALLENGE_PERIOD);
    if !(MIN_CHALLENGE_PERIOD..=MAX_CHALLENGE_PERIOD).contains(&challenge_period) {
        return Err(ContractError::InvalidChallengePeriod {
            min: MIN_CHALLENGE_PERIOD,
            max: MAX_CHALLENGE_PERIOD,
        });
    }

    let config = Config {
        admin,
        executor,
        adjudicator,
        oracle,
        bond_denom: msg.bond_denom,
        challenge_period,
        min_challenge_bond: msg.min_challenge_bond,
        challenger_reward: msg.challenger_reward,
    };
    CONFIG.save(deps.storage, &config)?;

    // Initial signer set (version 1); its activation starts the rotation
    // cooldown clock.
    let signers = parse_signer_list(&msg.signers)?;
    validate_set_shape(signers.len(), msg.signer_threshold)?;
    let signer_count = signers.len();
    let set = SignerSet {
        version: 1,
        signers,
        threshold: msg.signer_threshold,
        activated_at: env.block.time,
    };
    SIGNER_SETS.save(deps.storage, 1, &set)?;
    CURRENT_SET_VERSION.save(deps.storage, &1)?;
    LAST_ROTATION.save(deps.storage, &env.block.time)?;

    // Guardian roster
    if (msg.guardians.len() as u32) < MIN_GUARDIANS {
        return Err(ContractError::TooFewGuardians { min: MIN_GUARDIANS });
    }
    let mut guardian_count = 0u32;
    for guardian_str in &msg.guardians {
        let guardian = deps.api.addr_validate(guardian_str)?;
        if GUARDIANS.may_load(deps.storage, &guardian)?.unwrap_or(false) {
            return Err(ContractError::GuardianAlreadyRegistered);
        }
        GUARDIANS.save(deps.storage, &guardian, &true)?;
        guardian_count += 1;
    }
    GUARDIAN_COUNT.save(deps.storage, &guardian_count)?;

    if msg.guardian_threshold == 0 || msg.guardian_threshold > guardian_count {
        return Err(ContractError::ThresholdExceedsGuardians {
            threshold: msg.guardian_threshold,
            guardians: guardian_count,
        });
    }
    GUARDIAN_THRESHOLD.save(deps.storage, &msg.guardian_threshold)?;

    PAUSE_STATE.save(
        deps.storage,
        &PauseState {
            paused: false,
            triggered_by: None,
            paused_at: None,
        },
    )?;
    NEXT_PROPOSAL_ID.save(deps.storage, &1u64)?;

    // Volume limiter
    GLOBAL_LIMITS.save(
        deps.storage,
        &VolumeLimits {
            max_transfer_usd: msg.max_transfer_usd,
            hourly_limit_usd: msg.hourly_limit_usd,
            daily_limit_usd: msg.daily_limit_usd,
        },
    )?;
    let empty_window = VolumeWindow {
        volume_usd: Uint128::zero(),
        window_start: env.block.time,
        tx_count: 0,
    };
    HOURLY_USAGE.save(deps.storage, &empty_window)?;
    DAILY_USAGE.save(deps.storage, &empty_window)?;
    VOLUME_CONTROLS.save(
        deps.storage,
        &VolumeControls {
            alert_threshold_bps: DEFAULT_ALERT_THRESHOLD_BPS,
            auto_pause_threshold_bps: DEFAULT_AUTO_PAUSE_THRESHOLD_BPS,
            paused: false,
        },
    )?;

    FRAUD_COUNT.save(deps.storage, &0u64)?;
    STATS.save(
        deps.storage,
        &SecurityStats {
            total_requests: 0,
            total_challenges: 0,
            challenges_upheld: 0,
            challenges_rejected: 0,
            bonds_forfeited: Uint128::zero(),
        },
    )?;

    Ok(Response::new()
        .add_attribute("method", "instantiate")
        .add_attribute("admin", config.admin)
        .add_attribute("executor", config.executor)
        .add_attribute("signer_count", signer_count.to_string())
        .add_attribute("signer_threshold", msg.signer_threshold.to_string())
        .add_attribute("guardian_count", guardian_count.to_string())
        .add_attribute("guardian_threshold", msg.guardian_threshold.to_string())
        .add_attribute("challenge_period", challenge_period.to_string()))
}

// ============================================================================
// Execute
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        // Signature validator
        ExecuteMsg::VerifyTransfer {
            message,
            signatures,
        } => execute_verify_transfer(deps, env, info, message, signatures),
        ExecuteMsg::RotateSigners {
            signers,
            threshold,
            signatures,
        } => execute_rotate_signers(deps, env, info, signers, threshold, signatures),
        ExecuteMsg::AddSigner { signer } => execute_add_signer(deps, info, signer),
        ExecuteMsg::RemoveSigner { signer } => execute_remove_signer(deps, info, signer),
        ExecuteMsg::UpdateSignerThreshold { threshold } => {
            execute_update_signer_threshold(deps, info, threshold)
        }
        ExecuteMsg::InvalidateNonce { nonce } => execute_invalidate_nonce(deps, info, nonce),

        // Challenge verifier
        ExecuteMsg::SubmitRequest { request } => execute_submit_request(deps, env, info, request),
        ExecuteMsg::ChallengeRequest { request_id, reason } => {
            execute_challenge_request(deps, env, info, request_id, reason)
        }
        ExecuteMsg::ApproveRequest { request_id } => {
            execute_approve_request(deps, env, info, request_id)
        }
        ExecuteMsg::ResolveChallenge {
            request_id,
            fraud_proven,
        } => execute_resolve_challenge(deps, env, info, request_id, fraud_proven),
        ExecuteMsg::MarkExecuted { request_id } => {
            execute_mark_executed(deps, env, info, request_id)
        }
        ExecuteMsg::CancelRequest { request_id, reason } => {
            execute_cancel_request(deps, env, info, request_id, reason)
        }

        // Fraud adjudicator
        ExecuteMsg::SubmitProof {
            request_id,
            kind,
            payload,
        } => execute_submit_proof(deps, env, info, request_id, kind, payload),
        ExecuteMsg::VerifyProof {
            request_id,
            payload,
        } => execute_verify_proof(deps, env, info, request_id, payload),
        ExecuteMsg::SetChainToken {
            chain_id,
            token,
            authorized,
        } => execute_set_chain_token(deps, info, chain_id, token, authorized),

        // Volume limiter
        ExecuteMsg::AdmitTransfer { token, amount } => {
            execute_admit_transfer(deps, env, info, token, amount)
        }
        ExecuteMsg::RegisterToken {
            token,
            usd_price,
            decimals,
        } => execute_register_token(deps, info, token, usd_price, decimals),
        ExecuteMsg::UpdateTokenPrice { token, usd_price } => {
            execute_update_token_price(deps, info, token, usd_price)
        }
        ExecuteMsg::SetTokenLimits { token, limits } => {
            execute_set_token_limits(deps, info, token, limits)
        }
        ExecuteMsg::UpdateGlobalLimits {
            max_transfer_usd,
            hourly_limit_usd,
            daily_limit_usd,
        } => execute_update_global_limits(
            deps,
            info,
            max_transfer_usd,
            hourly_limit_usd,
            daily_limit_usd,
        ),
        ExecuteMsg::UpdateVolumeThresholds {
            alert_bps,
            auto_pause_bps,
        } => execute_update_volume_thresholds(deps, info, alert_bps, auto_pause_bps),
        ExecuteMsg::ResumeVolume {} => execute_resume_volume(deps, info),

        // Guardian council
        ExecuteMsg::EmergencyPause {} => execute_emergency_pause(deps, env, info),
        ExecuteMsg::Propose { action } => execute_propose(deps, env, info, action),
        ExecuteMsg::ApproveProposal { proposal_id } => {
            execute_approve_proposal(deps, env, info, proposal_id)
        }
        ExecuteMsg::ExecuteProposal { proposal_id } => {
            execute_execute_proposal(deps, env, info, proposal_id)
        }
        ExecuteMsg::CancelProposal { proposal_id } => {
            execute_cancel_proposal(deps, env, info, proposal_id)
        }
        ExecuteMsg::OwnerAddGuardian { address } => {
            execute_owner_add_guardian(deps, info, address)
        }
        ExecuteMsg::OwnerRemoveGuardian { address } => {
            execute_owner_remove_guardian(deps, info, address)
        }
        ExecuteMsg::OwnerUpdateGuardianThreshold { threshold } => {
            execute_owner_update_guardian_threshold(deps, info, threshold)
        }

        // Admin operations
        ExecuteMsg::ProposeAdmin { new_admin } => execute_propose_admin(deps, env, info, new_admin),
        ExecuteMsg::AcceptAdmin {} => execute_accept_admin(deps, env, info),
        ExecuteMsg::CancelAdminProposal {} => execute_cancel_admin_proposal(deps, info),
        ExecuteMsg::UpdateRoles {
            executor,
            adjudicator,
            oracle,
        } => execute_update_roles(deps, info, executor, adjudicator, oracle),
        ExecuteMsg::UpdateSecurityConfig {
            challenge_period,
            min_challenge_bond,
            challenger_reward,
        } => execute_update_security_config(
            deps,
            info,
            challenge_period,
            min_challenge_bond,
            challenger_reward,
        ),
    }
}

// ============================================================================
// Query
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn query(deps: Deps, env: Env, msg: QueryMsg) -> StdResult<Binary> {
    match msg {
        QueryMsg::Config {} => to_json_binary(&query_config(deps)?),
        QueryMsg::PauseState {} => to_json_binary(&query_pause_state(deps)?),
        QueryMsg::SecurityStats {} => to_json_binary(&query_security_stats(deps)?),
        QueryMsg::PendingAdmin {} => to_json_binary(&query_pending_admin(deps)?),

        QueryMsg::SignerSet { version } => to_json_binary(&query_signer_set(deps, version)?),
        QueryMsg::NonceUsed { sender, nonce } => {
            to_json_binary(&query_nonce_used(deps, sender, nonce)?)
        }
        QueryMsg::ValidateSignatures {
            message,
            signatures,
        } => to_json_binary(&query_validate_signatures(deps, env, message, signatures)?),
        QueryMsg::TransferHash { message } => to_json_binary(&query_transfer_hash(message)?),

        QueryMsg::Request { request_id } => to_json_binary(&query_request(deps, env, request_id)?),
        QueryMsg::Requests { start_after, limit } => {
            to_json_binary(&query_requests(deps, env, start_after, limit)?)
        }
        QueryMsg::Challenge { request_id } => to_json_binary(&query_challenge(deps, request_id)?),

        QueryMsg::Proof { request_id } => to_json_binary(&query_proof(deps, request_id)?),
        QueryMsg::FraudStats {} => to_json_binary(&query_fraud_stats(deps)?),
        QueryMsg::ChainToken { chain_id, token } => {
            to_json_binary(&query_chain_token(deps, chain_id, token)?)
        }

        QueryMsg::VolumeUsage {} => to_json_binary(&query_volume_usage(deps, env)?),
        QueryMsg::CheckTransfer { token, amount } => {
            to_json_binary(&query_check_transfer(deps, env, token, amount)?)
        }
        QueryMsg::VolumeToken { token } => to_json_binary(&query_volume_token(deps, token)?),

        QueryMsg::Guardians {} => to_json_binary(&query_guardians(deps)?),
        QueryMsg::Proposal { proposal_id } => to_json_binary(&query_proposal(deps, proposal_id)?),
        QueryMsg::Proposals { start_after, limit } => {
            to_json_binary(&query_proposals(deps, start_after, limit)?)
        }
        QueryMsg::IsBlacklisted { address } => {
            to_json_binary(&query_is_blacklisted(deps, address)?)
        }
    }
}

// ============================================================================
// Reply
// ============================================================================

/// Handle replies from best-effort executor relays. The relay uses
/// reply-on-error, so landing here means the call failed; the failure is
/// recorded and the transaction continues - guardian pause state stays
/// authoritative regardless of the executor's reachability.
#[cfg_attr(not(feature = "library"), entry_point)]
pub fn reply(_deps: DepsMut, _env: Env, msg: Reply) -> Result<Response, ContractError> {
    match msg.id {
        EXECUTOR_RELAY_REPLY_ID => {
            let error = msg
                .result
                .into_result()
                .err()
                .unwrap_or_else(|| "unknown".to_string());
            Ok(Response::new()
                .add_attribute("method", "reply")
                .add_attribute("executor_relay", "failed")
                .add_attribute("error", error))
        }
        id => Err(ContractError::UnknownReplyId { id }),
    }
}

// ============================================================================
// Migrate
// ============================================================================

#[cfg_attr(not(feature = "library"), entry_point)]
pub fn migrate(deps: DepsMut, _env: Env, _msg: MigrateMsg) -> Result<Response, ContractError> {
    set_contract_version(deps.storage, CONTRACT_NAME, CONTRACT_VERSION)?;
    Ok(Response::new()
        .add_attribute("action", "migrate")
        .add_attribute("version", CONTRACT_VERSION))
}
