//! Query handlers for the Sentinel security core.

use cosmwasm_std::{Binary, Deps, Env, Order, StdError, StdResult, Uint128};
use cw_storage_plus::Bound;

use crate::execute::{
    compute_usd_value, exceeds, load_supported_token, normalize_key, rolled_window,
    validate_transfer_signatures,
};
use crate::hash::{bytes20_to_hex, parse_bytes32, transfer_digest};
use crate::msg::{
    ChainTokenResponse, ChallengeResponse, CheckTransferResponse, ConfigResponse,
    FraudStatsResponse, GuardiansResponse, IsBlacklistedResponse, NonceUsedResponse,
    PauseStateResponse, PendingAdminResponse, ProofResponse, ProposalResponse, ProposalsResponse,
    RequestResponse, RequestsResponse, SecurityStatsResponse, SignerSetResponse, TransferHashResponse,
    TransferMessage, ValidationResponse, VolumeLimitsMsg, VolumeTokenResponse, VolumeUsageResponse,
    WindowUsage,
};
use crate::state::{
    BridgeRequest, VolumeWindow, BLACKLIST, CHAIN_TOKENS, CHALLENGES, CONFIG, CURRENT_SET_VERSION,
    DAILY_USAGE, DAILY_WINDOW, FRAUD_COUNT, GLOBAL_LIMITS, GUARDIANS, GUARDIAN_THRESHOLD,
    HOURLY_USAGE, HOURLY_WINDOW, PAUSE_STATE, PENDING_ADMIN, PROOFS, PROPOSALS, REQUESTS,
    SIGNER_SETS, STATS, USED_NONCES, VOLUME_CONTROLS, VOLUME_TOKENS,
};

const DEFAULT_LIMIT: u32 = 10;
const MAX_LIMIT: u32 = 30;

// ============================================================================
// Core Queries
// ============================================================================

/// Query contract configuration.
pub fn query_config(deps: Deps) -> StdResult<ConfigResponse> {
    let config = CONFIG.load(deps.storage)?;
    Ok(ConfigResponse {
        admin: config.admin,
        executor: config.executor,
        adjudicator: config.adjudicator,
        oracle: config.oracle,
        bond_denom: config.bond_denom,
        challenge_period: config.challenge_period,
        min_challenge_bond: config.min_challenge_bond,
        challenger_reward: config.challenger_reward,
    })
}

/// Query the system-wide pause state.
pub fn query_pause_state(deps: Deps) -> StdResult<PauseStateResponse> {
    let pause = PAUSE_STATE.load(deps.storage)?;
    Ok(PauseStateResponse {
        paused: pause.paused,
        triggered_by: pause.triggered_by,
        paused_at: pause.paused_at,
    })
}

/// Query core statistics.
pub fn query_security_stats(deps: Deps) -> StdResult<SecurityStatsResponse> {
    let stats = STATS.load(deps.storage)?;
    Ok(SecurityStatsResponse {
        total_requests: stats.total_requests,
        total_challenges: stats.total_challenges,
        challenges_upheld: stats.challenges_upheld,
        challenges_rejected: stats.challenges_rejected,
        bonds_forfeited: stats.bonds_forfeited,
    })
}

/// Query pending admin proposal details.
pub fn query_pending_admin(deps: Deps) -> StdResult<Option<PendingAdminResponse>> {
    let pending = PENDING_ADMIN.may_load(deps.storage)?;
    Ok(pending.map(|p| PendingAdminResponse {
        new_address: p.new_address,
        execute_after: p.execute_after,
    }))
}

// ============================================================================
// Signature Validator Queries
// ============================================================================

/// Query a signer set snapshot (current if version omitted).
pub fn query_signer_set(deps: Deps, version: Option<u64>) -> StdResult<SignerSetResponse> {
    let current = CURRENT_SET_VERSION.load(deps.storage)?;
    let version = version.unwrap_or(current);
    let set = SIGNER_SETS
        .may_load(deps.storage, version)?
        .ok_or_else(|| StdError::not_found(format!("signer set version {version}")))?;

    Ok(SignerSetResponse {
        version: set.version,
        signers: set.signers.iter().map(bytes20_to_hex).collect(),
        threshold: set.threshold,
        activated_at: set.activated_at,
        is_current: version == current,
    })
}

/// Query whether a sender-scoped nonce is consumed.
pub fn query_nonce_used(deps: Deps, sender: Binary, nonce: u64) -> StdResult<NonceUsedResponse> {
    let sender = parse_bytes32(&sender).map_err(into_std)?;
    let used = USED_NONCES
        .may_load(deps.storage, (sender.as_slice(), nonce))?
        .unwrap_or(false);
    Ok(NonceUsedResponse { nonce, used })
}

/// Read-only signature validation: the same check as VerifyTransfer, with
/// failures folded into a structured result instead of errors.
pub fn query_validate_signatures(
    deps: Deps,
    env: Env,
    message: TransferMessage,
    signatures: Vec<Binary>,
) -> StdResult<ValidationResponse> {
    let version = CURRENT_SET_VERSION.load(deps.storage)?;
    let threshold = SIGNER_SETS.load(deps.storage, version)?.threshold;

    match validate_transfer_signatures(deps, &env, &message, &signatures) {
        Ok(unique_signers) => Ok(ValidationResponse {
            valid: true,
            reason: None,
            unique_signers,
            threshold,
        }),
        Err(err) => Ok(ValidationResponse {
            valid: false,
            reason: Some(err.to_string()),
            unique_signers: 0,
            threshold,
        }),
    }
}

/// Compute the canonical transfer digest.
pub fn query_transfer_hash(message: TransferMessage) -> StdResult<TransferHashResponse> {
    let digest = transfer_digest(&message).map_err(into_std)?;
    Ok(TransferHashResponse {
        hash: Binary::from(digest.to_vec()),
    })
}

// ============================================================================
// Challenge Verifier Queries
// ============================================================================

fn request_response(
    request_id: &[u8],
    request: BridgeRequest,
    env: &Env,
) -> RequestResponse {
    let remaining = request
        .challenge_deadline
        .seconds()
        .saturating_sub(env.block.time.seconds());
    RequestResponse {
        request_id: Binary::from(request_id.to_vec()),
        sender: Binary::from(request.sender.to_vec()),
        recipient: Binary::from(request.recipient.to_vec()),
        token: Binary::from(request.token.to_vec()),
        amount: request.amount,
        src_chain_id: request.src_chain_id,
        dest_chain_id: request.dest_chain_id,
        submitted_at: request.submitted_at,
        challenge_deadline: request.challenge_deadline,
        status: request.status,
        challenge_window_remaining: remaining,
    }
}

/// Query a bridge request by id.
pub fn query_request(deps: Deps, env: Env, request_id: Binary) -> StdResult<RequestResponse> {
    let id = parse_bytes32(&request_id).map_err(into_std)?;
    let request = REQUESTS.load(deps.storage, id.as_slice())?;
    Ok(request_response(id.as_slice(), request, &env))
}

/// Query paginated list of requests.
pub fn query_requests(
    deps: Deps,
    env: Env,
    start_after: Option<Binary>,
    limit: Option<u32>,
) -> StdResult<RequestsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(|id| Bound::ExclusiveRaw(id.to_vec()));

    let requests: Vec<RequestResponse> = REQUESTS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| {
            let (key, request) = item?;
            Ok(request_response(&key, request, &env))
        })
        .collect::<StdResult<Vec<_>>>()?;

    Ok(RequestsResponse { requests })
}

/// Query the challenge for a request, if any.
pub fn query_challenge(deps: Deps, request_id: Binary) -> StdResult<Option<ChallengeResponse>> {
    let id = parse_bytes32(&request_id).map_err(into_std)?;
    let challenge = CHALLENGES.may_load(deps.storage, id.as_slice())?;
    Ok(challenge.map(|c| ChallengeResponse {
        request_id,
        challenger: c.challenger,
        bond: c.bond,
        reason: c.reason,
        challenged_at: c.challenged_at,
        resolved: c.resolved,
    }))
}

// ============================================================================
// Fraud Adjudicator Queries
// ============================================================================

/// Query the proof record for a request, if any.
pub fn query_proof(deps: Deps, request_id: Binary) -> StdResult<Option<ProofResponse>> {
    let id = parse_bytes32(&request_id).map_err(into_std)?;
    let proof = PROOFS.may_load(deps.storage, id.as_slice())?;
    Ok(proof.map(|p| ProofResponse {
        request_id,
        submitter: p.submitter,
        kind: p.kind,
        commitment: Binary::from(p.commitment.to_vec()),
        submitted_at: p.submitted_at,
        verified: p.verified,
        fraud_proven: p.fraud_proven,
    }))
}

/// Query the global proven-fraud counter.
pub fn query_fraud_stats(deps: Deps) -> StdResult<FraudStatsResponse> {
    Ok(FraudStatsResponse {
        fraud_count: FRAUD_COUNT.load(deps.storage)?,
    })
}

/// Query whether a token is authorized for a chain.
pub fn query_chain_token(
    deps: Deps,
    chain_id: u64,
    token: Binary,
) -> StdResult<ChainTokenResponse> {
    let token_bytes = parse_bytes32(&token).map_err(into_std)?;
    let authorized = CHAIN_TOKENS
        .may_load(deps.storage, (chain_id, token_bytes.as_slice()))?
        .unwrap_or(false);
    Ok(ChainTokenResponse {
        chain_id,
        token,
        authorized,
    })
}

// ============================================================================
// Volume Limiter Queries
// ============================================================================

fn window_usage(window: VolumeWindow, env: &Env, length: u64, limit: Uint128) -> WindowUsage {
    let rolled = rolled_window(window, env.block.time, length);
    let remaining = if limit.is_zero() {
        Uint128::zero()
    } else {
        limit.saturating_sub(rolled.volume_usd)
    };
    WindowUsage {
        window_start: rolled.window_start,
        used_usd: rolled.volume_usd,
        limit_usd: limit,
        remaining_usd: remaining,
        tx_count: rolled.tx_count,
    }
}

/// Query both windows with lazily-evaluated usage.
pub fn query_volume_usage(deps: Deps, env: Env) -> StdResult<VolumeUsageResponse> {
    let limits = GLOBAL_LIMITS.load(deps.storage)?;
    let controls = VOLUME_CONTROLS.load(deps.storage)?;

    Ok(VolumeUsageResponse {
        hourly: window_usage(
            HOURLY_USAGE.load(deps.storage)?,
            &env,
            HOURLY_WINDOW,
            limits.hourly_limit_usd,
        ),
        daily: window_usage(
            DAILY_USAGE.load(deps.storage)?,
            &env,
            DAILY_WINDOW,
            limits.daily_limit_usd,
        ),
        paused: controls.paused,
    })
}

/// Pre-flight admission check: same arithmetic as AdmitTransfer, zero
/// writes, refusals folded into the structured result.
pub fn query_check_transfer(
    deps: Deps,
    env: Env,
    token: Binary,
    amount: Uint128,
) -> StdResult<CheckTransferResponse> {
    let refused = |reason: &str, usd_value: Uint128| CheckTransferResponse {
        allowed: false,
        usd_value,
        reason: Some(reason.to_string()),
    };

    let controls = VOLUME_CONTROLS.load(deps.storage)?;
    if controls.paused {
        return Ok(refused("volume_paused", Uint128::zero()));
    }

    let token_bytes = match parse_bytes32(&token) {
        Ok(bytes) => bytes,
        Err(err) => return Err(into_std(err)),
    };
    let token_config = match load_supported_token(deps.storage, &token_bytes) {
        Ok(config) => config,
        Err(_) => return Ok(refused("token_not_supported", Uint128::zero())),
    };
    let usd_value = match compute_usd_value(&token_config, amount) {
        Ok(value) => value,
        Err(err) => return Ok(refused(&err.to_string(), Uint128::zero())),
    };

    let limits = match token_config.custom_limits {
        Some(limits) => limits,
        None => GLOBAL_LIMITS.load(deps.storage)?,
    };

    if exceeds(usd_value, limits.max_transfer_usd) {
        return Ok(refused("max_transfer", usd_value));
    }

    let hourly = rolled_window(HOURLY_USAGE.load(deps.storage)?, env.block.time, HOURLY_WINDOW);
    if exceeds(hourly.volume_usd + usd_value, limits.hourly_limit_usd) {
        return Ok(refused("hourly_limit", usd_value));
    }

    let daily = rolled_window(DAILY_USAGE.load(deps.storage)?, env.block.time, DAILY_WINDOW);
    if exceeds(daily.volume_usd + usd_value, limits.daily_limit_usd) {
        return Ok(refused("daily_limit", usd_value));
    }

    Ok(CheckTransferResponse {
        allowed: true,
        usd_value,
        reason: None,
    })
}

/// Query a token's admission parameters.
pub fn query_volume_token(deps: Deps, token: Binary) -> StdResult<VolumeTokenResponse> {
    let token_bytes = parse_bytes32(&token).map_err(into_std)?;
    let config = VOLUME_TOKENS.load(deps.storage, token_bytes.as_slice())?;
    Ok(VolumeTokenResponse {
        token,
        supported: config.supported,
        usd_price: config.usd_price,
        decimals: config.decimals,
        custom_limits: config.custom_limits.map(|l| VolumeLimitsMsg {
            max_transfer_usd: l.max_transfer_usd,
            hourly_limit_usd: l.hourly_limit_usd,
            daily_limit_usd: l.daily_limit_usd,
        }),
    })
}

// ============================================================================
// Guardian Council Queries
// ============================================================================

/// Query the guardian roster and threshold.
pub fn query_guardians(deps: Deps) -> StdResult<GuardiansResponse> {
    let guardians: Vec<_> = GUARDIANS
        .keys(deps.storage, None, None, Order::Ascending)
        .collect::<StdResult<Vec<_>>>()?;
    Ok(GuardiansResponse {
        guardians,
        threshold: GUARDIAN_THRESHOLD.load(deps.storage)?,
    })
}

/// Query a proposal by id.
pub fn query_proposal(deps: Deps, proposal_id: u64) -> StdResult<ProposalResponse> {
    let proposal = PROPOSALS.load(deps.storage, proposal_id)?;
    let threshold = GUARDIAN_THRESHOLD.load(deps.storage)?;
    Ok(proposal_response(proposal, threshold))
}

/// Query paginated list of proposals.
pub fn query_proposals(
    deps: Deps,
    start_after: Option<u64>,
    limit: Option<u32>,
) -> StdResult<ProposalsResponse> {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT) as usize;
    let start = start_after.map(Bound::exclusive);
    let threshold = GUARDIAN_THRESHOLD.load(deps.storage)?;

    let proposals: Vec<ProposalResponse> = PROPOSALS
        .range(deps.storage, start, None, Order::Ascending)
        .take(limit)
        .map(|item| {
            let (_, proposal) = item?;
            Ok(proposal_response(proposal, threshold))
        })
        .collect::<StdResult<Vec<_>>>()?;

    Ok(ProposalsResponse { proposals })
}

fn proposal_response(proposal: crate::state::Proposal, threshold: u32) -> ProposalResponse {
    ProposalResponse {
        id: proposal.id,
        action: proposal.action,
        proposer: proposal.proposer,
        approvals: proposal.approvals,
        threshold,
        created_at: proposal.created_at,
        expires_at: proposal.expires_at,
        status: proposal.status,
    }
}

/// Query whether an address is blacklisted.
pub fn query_is_blacklisted(deps: Deps, address: String) -> StdResult<IsBlacklistedResponse> {
    let blacklisted = BLACKLIST
        .may_load(deps.storage, &normalize_key(&address))?
        .unwrap_or(false);
    Ok(IsBlacklistedResponse {
        address,
        blacklisted,
    })
}

// ============================================================================
// Helpers
// ============================================================================

fn into_std(err: crate::error::ContractError) -> StdError {
    StdError::generic_err(err.to_string())
}
