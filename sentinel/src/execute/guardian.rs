//! GuardianCouncil handlers.
//!
//! Two authorization paths by design: any single guardian can pause the
//! whole system immediately (speed over consensus for defense), while
//! every other privileged change runs through a propose/approve/execute
//! quorum. Pause/unpause is relayed to the bridge executor best-effort;
//! the council's own flag stays authoritative even if the relay fails.

use cosmwasm_std::{
    to_json_binary, Addr, CosmosMsg, DepsMut, Env, MessageInfo, Response, StdResult, Storage,
    SubMsg, WasmMsg,
};

use crate::error::ContractError;
use crate::msg::ExecutorRelayMsg;
use crate::state::{
    PauseState, Proposal, ProposalAction, ProposalStatus, BLACKLIST, CONFIG, GUARDIANS,
    GUARDIAN_COUNT, GUARDIAN_THRESHOLD, MIN_GUARDIANS, NEXT_PROPOSAL_ID, PAUSE_STATE,
    PROPOSALS, PROPOSAL_APPROVALS, PROPOSAL_TTL,
};

/// Reply id for the best-effort executor pause/unpause relay
pub const EXECUTOR_RELAY_REPLY_ID: u64 = 1;

/// Reject forward-path operations while the system is paused.
pub fn ensure_not_paused(storage: &dyn Storage) -> Result<(), ContractError> {
    let pause = PAUSE_STATE.load(storage)?;
    if pause.paused {
        return Err(ContractError::SystemPaused);
    }
    Ok(())
}

fn ensure_guardian(storage: &dyn Storage, sender: &Addr) -> Result<(), ContractError> {
    let is_guardian = GUARDIANS.may_load(storage, sender)?.unwrap_or(false);
    if !is_guardian {
        return Err(ContractError::NotGuardian);
    }
    Ok(())
}

/// Build the best-effort pause/unpause relay submessage. Failure lands in
/// the reply handler as attributes instead of aborting the transaction.
fn relay_to_executor(executor: &Addr, msg: &ExecutorRelayMsg) -> StdResult<SubMsg> {
    Ok(SubMsg::reply_on_error(
        WasmMsg::Execute {
            contract_addr: executor.to_string(),
            msg: to_json_binary(msg)?,
            funds: vec![],
        },
        EXECUTOR_RELAY_REPLY_ID,
    ))
}

// ============================================================================
// Emergency Pause
// ============================================================================

/// Execute handler for the single-guardian emergency pause.
pub fn execute_emergency_pause(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
) -> Result<Response, ContractError> {
    ensure_guardian(deps.storage, &info.sender)?;

    let pause = PAUSE_STATE.load(deps.storage)?;
    if pause.paused {
        return Err(ContractError::AlreadyPaused);
    }

    PAUSE_STATE.save(
        deps.storage,
        &PauseState {
            paused: true,
            triggered_by: Some(info.sender.clone()),
            paused_at: Some(env.block.time),
        },
    )?;

    let config = CONFIG.load(deps.storage)?;
    let relay = relay_to_executor(&config.executor, &ExecutorRelayMsg::Pause {})?;

    Ok(Response::new()
        .add_submessage(relay)
        .add_attribute("method", "emergency_pause")
        .add_attribute("triggered_by", info.sender.to_string())
        .add_attribute("paused_at", env.block.time.seconds().to_string()))
}

// ============================================================================
// Quorum Governance
// ============================================================================

/// Execute handler for opening a proposal (guardian only).
///
/// The proposer's approval is counted immediately; with a threshold of 1
/// the proposal is born executable.
pub fn execute_propose(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    action: ProposalAction,
) -> Result<Response, ContractError> {
    ensure_guardian(deps.storage, &info.sender)?;
    validate_action(deps.as_ref().api, &action)?;

    let id = NEXT_PROPOSAL_ID.load(deps.storage)?;
    NEXT_PROPOSAL_ID.save(deps.storage, &(id + 1))?;

    let threshold = GUARDIAN_THRESHOLD.load(deps.storage)?;
    let status = if threshold <= 1 {
        ProposalStatus::Approved
    } else {
        ProposalStatus::Pending
    };

    let proposal = Proposal {
        id,
        action: action.clone(),
        proposer: info.sender.clone(),
        approvals: 1,
        created_at: env.block.time,
        expires_at: env.block.time.plus_seconds(PROPOSAL_TTL),
        status,
    };
    PROPOSALS.save(deps.storage, id, &proposal)?;
    PROPOSAL_APPROVALS.save(deps.storage, (id, &info.sender), &true)?;

    Ok(Response::new()
        .add_attribute("method", "propose")
        .add_attribute("proposal_id", id.to_string())
        .add_attribute("action", action.as_str())
        .add_attribute("proposer", info.sender.to_string())
        .add_attribute("status", proposal.status.as_str()))
}

/// Execute handler for approving a pending proposal (once per guardian).
pub fn execute_approve_proposal(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    proposal_id: u64,
) -> Result<Response, ContractError> {
    ensure_guardian(deps.storage, &info.sender)?;

    let mut proposal = load_live_proposal(deps.storage, &env, proposal_id)?;
    if proposal.status != ProposalStatus::Pending {
        return Err(ContractError::ProposalNotPending {
            status: proposal.status.as_str().to_string(),
        });
    }

    if PROPOSAL_APPROVALS.has(deps.storage, (proposal_id, &info.sender)) {
        return Err(ContractError::AlreadyApproved);
    }
    PROPOSAL_APPROVALS.save(deps.storage, (proposal_id, &info.sender), &true)?;

    proposal.approvals += 1;
    let threshold = GUARDIAN_THRESHOLD.load(deps.storage)?;
    if proposal.approvals >= threshold {
        proposal.status = ProposalStatus::Approved;
    }
    PROPOSALS.save(deps.storage, proposal_id, &proposal)?;

    Ok(Response::new()
        .add_attribute("method", "approve_proposal")
        .add_attribute("proposal_id", proposal_id.to_string())
        .add_attribute("approvals", proposal.approvals.to_string())
        .add_attribute("threshold", threshold.to_string())
        .add_attribute("status", proposal.status.as_str()))
}

/// Execute handler for executing an approved proposal (guardian only).
pub fn execute_execute_proposal(
    mut deps: DepsMut,
    env: Env,
    info: MessageInfo,
    proposal_id: u64,
) -> Result<Response, ContractError> {
    ensure_guardian(deps.storage, &info.sender)?;

    let mut proposal = load_live_proposal(deps.storage, &env, proposal_id)?;
    if proposal.status != ProposalStatus::Approved {
        return Err(ContractError::ProposalNotExecutable {
            status: proposal.status.as_str().to_string(),
        });
    }

    let action = proposal.action.clone();
    let (messages, submessages) = dispatch_action(deps.branch(), &action)?;

    proposal.status = ProposalStatus::Executed;
    PROPOSALS.save(deps.storage, proposal_id, &proposal)?;

    Ok(Response::new()
        .add_messages(messages)
        .add_submessages(submessages)
        .add_attribute("method", "execute_proposal")
        .add_attribute("proposal_id", proposal_id.to_string())
        .add_attribute("action", action.as_str())
        .add_attribute("executed_by", info.sender.to_string()))
}

/// Execute handler for cancelling a proposal (proposer or admin).
pub fn execute_cancel_proposal(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    proposal_id: u64,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;

    let mut proposal = load_live_proposal(deps.storage, &env, proposal_id)?;
    if info.sender != proposal.proposer && info.sender != config.admin {
        return Err(ContractError::UnauthorizedProposalCancel);
    }

    match proposal.status {
        ProposalStatus::Pending | ProposalStatus::Approved => {}
        _ => {
            return Err(ContractError::ProposalNotExecutable {
                status: proposal.status.as_str().to_string(),
            });
        }
    }

    proposal.status = ProposalStatus::Cancelled;
    PROPOSALS.save(deps.storage, proposal_id, &proposal)?;

    Ok(Response::new()
        .add_attribute("method", "cancel_proposal")
        .add_attribute("proposal_id", proposal_id.to_string())
        .add_attribute("cancelled_by", info.sender.to_string()))
}

// ============================================================================
// Owner Bypass (bootstrap/recovery)
// ============================================================================

/// Direct guardian add, admin only. Deliberate quorum bypass for initial
/// bootstrap and emergency recovery; everything else goes through
/// proposals.
pub fn execute_owner_add_guardian(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    let guardian = deps.api.addr_validate(&address)?;
    add_guardian(deps.storage, &guardian)?;

    Ok(Response::new()
        .add_attribute("method", "owner_add_guardian")
        .add_attribute("guardian", address))
}

/// Direct guardian removal, admin only (quorum bypass).
pub fn execute_owner_remove_guardian(
    deps: DepsMut,
    info: MessageInfo,
    address: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    let guardian = deps.api.addr_validate(&address)?;
    remove_guardian(deps.storage, &guardian)?;

    Ok(Response::new()
        .add_attribute("method", "owner_remove_guardian")
        .add_attribute("guardian", address))
}

/// Direct threshold update, admin only (quorum bypass).
pub fn execute_owner_update_guardian_threshold(
    deps: DepsMut,
    info: MessageInfo,
    threshold: u32,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    set_guardian_threshold(deps.storage, threshold)?;

    Ok(Response::new()
        .add_attribute("method", "owner_update_guardian_threshold")
        .add_attribute("threshold", threshold.to_string()))
}

// ============================================================================
// Action Dispatch and Roster Helpers
// ============================================================================

/// Shallow validation at proposal time; roster invariants are re-checked
/// at execution against the roster of that moment.
fn validate_action(api: &dyn cosmwasm_std::Api, action: &ProposalAction) -> Result<(), ContractError> {
    match action {
        ProposalAction::Unpause {} => Ok(()),
        ProposalAction::Blacklist { address } | ProposalAction::Whitelist { address } => {
            if address.is_empty() {
                return Err(ContractError::InvalidProposal {
                    reason: "address must not be empty".to_string(),
                });
            }
            Ok(())
        }
        ProposalAction::UpdateConfig { target, .. } | ProposalAction::Recover { target, .. } => {
            api.addr_validate(target)?;
            Ok(())
        }
        ProposalAction::AddGuardian { address } | ProposalAction::RemoveGuardian { address } => {
            api.addr_validate(address)?;
            Ok(())
        }
        ProposalAction::UpdateGuardianThreshold { threshold } => {
            if *threshold == 0 {
                return Err(ContractError::InvalidProposal {
                    reason: "threshold must be at least 1".to_string(),
                });
            }
            Ok(())
        }
    }
}

fn dispatch_action(
    deps: DepsMut,
    action: &ProposalAction,
) -> Result<(Vec<CosmosMsg>, Vec<SubMsg>), ContractError> {
    let mut messages: Vec<CosmosMsg> = vec![];
    let mut submessages: Vec<SubMsg> = vec![];

    match action {
        ProposalAction::Unpause {} => {
            PAUSE_STATE.save(
                deps.storage,
                &PauseState {
                    paused: false,
                    triggered_by: None,
                    paused_at: None,
                },
            )?;
            let config = CONFIG.load(deps.storage)?;
            submessages.push(relay_to_executor(
                &config.executor,
                &ExecutorRelayMsg::Unpause {},
            )?);
        }
        ProposalAction::Blacklist { address } => {
            BLACKLIST.save(deps.storage, &normalize_key(address), &true)?;
        }
        ProposalAction::Whitelist { address } => {
            BLACKLIST.remove(deps.storage, &normalize_key(address));
        }
        ProposalAction::UpdateConfig { target, payload }
        | ProposalAction::Recover { target, payload } => {
            // Opaque call: the payload is whatever the target expects. This
            // is a real call, not best-effort - a failing target aborts the
            // execution and leaves the proposal approved for retry.
            messages.push(CosmosMsg::Wasm(WasmMsg::Execute {
                contract_addr: target.clone(),
                msg: payload.clone(),
                funds: vec![],
            }));
        }
        ProposalAction::AddGuardian { address } => {
            let guardian = deps.api.addr_validate(address)?;
            add_guardian(deps.storage, &guardian)?;
        }
        ProposalAction::RemoveGuardian { address } => {
            let guardian = deps.api.addr_validate(address)?;
            remove_guardian(deps.storage, &guardian)?;
        }
        ProposalAction::UpdateGuardianThreshold { threshold } => {
            set_guardian_threshold(deps.storage, *threshold)?;
        }
    }

    Ok((messages, submessages))
}

/// Blacklist keys are compared case-insensitively so hex-encoded values
/// match regardless of casing.
pub fn normalize_key(address: &str) -> String {
    address.to_lowercase()
}

fn add_guardian(storage: &mut dyn Storage, guardian: &Addr) -> Result<(), ContractError> {
    if GUARDIANS.may_load(storage, guardian)?.unwrap_or(false) {
        return Err(ContractError::GuardianAlreadyRegistered);
    }
    GUARDIANS.save(storage, guardian, &true)?;
    let count = GUARDIAN_COUNT.load(storage)? + 1;
    GUARDIAN_COUNT.save(storage, &count)?;
    Ok(())
}

fn remove_guardian(storage: &mut dyn Storage, guardian: &Addr) -> Result<(), ContractError> {
    if !GUARDIANS.may_load(storage, guardian)?.unwrap_or(false) {
        return Err(ContractError::GuardianNotRegistered);
    }

    let count = GUARDIAN_COUNT.load(storage)?;
    if count <= MIN_GUARDIANS {
        return Err(ContractError::TooFewGuardians { min: MIN_GUARDIANS });
    }
    let threshold = GUARDIAN_THRESHOLD.load(storage)?;
    if threshold > count - 1 {
        return Err(ContractError::ThresholdExceedsGuardians {
            threshold,
            guardians: count - 1,
        });
    }

    GUARDIANS.remove(storage, guardian);
    GUARDIAN_COUNT.save(storage, &(count - 1))?;
    Ok(())
}

fn set_guardian_threshold(storage: &mut dyn Storage, threshold: u32) -> Result<(), ContractError> {
    let count = GUARDIAN_COUNT.load(storage)?;
    if threshold == 0 || threshold > count {
        return Err(ContractError::ThresholdExceedsGuardians {
            threshold,
            guardians: count,
        });
    }
    GUARDIAN_THRESHOLD.save(storage, &threshold)?;
    Ok(())
}

/// Load a proposal, lazily marking it expired when its deadline passed.
fn load_live_proposal(
    storage: &mut dyn Storage,
    env: &Env,
    proposal_id: u64,
) -> Result<Proposal, ContractError> {
    let mut proposal = PROPOSALS
        .may_load(storage, proposal_id)?
        .ok_or(ContractError::ProposalNotFound { proposal_id })?;

    let live = matches!(
        proposal.status,
        ProposalStatus::Pending | ProposalStatus::Approved
    );
    if live && env.block.time >= proposal.expires_at {
        proposal.status = ProposalStatus::Expired;
        PROPOSALS.save(storage, proposal_id, &proposal)?;
        return Err(ContractError::ProposalExpired {
            expiry: proposal.expires_at.seconds(),
        });
    }

    Ok(proposal)
}
