//! FraudAdjudicator handlers.
//!
//! Accepts one structured fraud claim per request, bound by a keccak
//! commitment at submission, and verifies it later against the exact
//! committed bytes. A proven verdict is relayed to the challenge verifier
//! best-effort: a relay failure is recorded, never propagated, so the
//! adjudicator cannot be wedged by the state of the challenge.
//!
//! The double-spend and replay arms check structural presence of the
//! evidence only; inclusion verification against a state root is the
//! extension point documented in DESIGN.md.

use cosmwasm_std::{from_json, Binary, Deps, DepsMut, Env, MessageInfo, Response};

use crate::error::ContractError;
use crate::hash::{bytes32_to_hex, keccak256, parse_bytes32};
use crate::msg::{
    DoubleSpendProof, InvalidAmountProof, InvalidSignatureProof, InvalidTokenProof, ReplayProof,
};
use crate::state::{
    FraudKind, ProofRecord, CHAIN_TOKENS, CONFIG, FRAUD_COUNT, PROOFS, PROOF_TTL, REQUESTS,
    USED_NONCES,
};

use super::challenge::resolve_challenge_inner;
use super::signer::validate_transfer_signatures;

/// Execute handler for submitting a fraud proof (one slot per request).
///
/// Only the payload's keccak commitment is stored; the submitter must
/// re-present the identical bytes at verification time.
pub fn execute_submit_proof(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    request_id: Binary,
    kind: FraudKind,
    payload: Binary,
) -> Result<Response, ContractError> {
    let id = parse_bytes32(&request_id)?;

    if !REQUESTS.has(deps.storage, id.as_slice()) {
        return Err(ContractError::RequestNotFound);
    }
    if PROOFS.has(deps.storage, id.as_slice()) {
        return Err(ContractError::ProofAlreadySubmitted);
    }
    if payload.is_empty() {
        return Err(ContractError::EmptyProofPayload);
    }

    let commitment = keccak256(payload.as_slice());
    let record = ProofRecord {
        submitter: info.sender.clone(),
        kind: kind.clone(),
        commitment,
        submitted_at: env.block.time,
        verified: false,
        fraud_proven: false,
    };
    PROOFS.save(deps.storage, id.as_slice(), &record)?;

    Ok(Response::new()
        .add_attribute("method", "submit_proof")
        .add_attribute("request_id", bytes32_to_hex(&id))
        .add_attribute("kind", kind.as_str())
        .add_attribute("submitter", info.sender.to_string())
        .add_attribute("commitment", bytes32_to_hex(&commitment)))
}

/// Execute handler for verifying a submitted proof.
///
/// Re-verification returns the cached verdict without re-dispatching, so
/// the fraud counter and the challenge resolution can never double-apply.
pub fn execute_verify_proof(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    request_id: Binary,
    payload: Binary,
) -> Result<Response, ContractError> {
    let id = parse_bytes32(&request_id)?;

    let mut record = PROOFS
        .may_load(deps.storage, id.as_slice())?
        .ok_or(ContractError::ProofNotFound)?;

    if record.verified {
        return Ok(Response::new()
            .add_attribute("method", "verify_proof")
            .add_attribute("request_id", bytes32_to_hex(&id))
            .add_attribute("kind", record.kind.as_str())
            .add_attribute("fraud_proven", record.fraud_proven.to_string())
            .add_attribute("cached", "true"));
    }

    let expiry = record.submitted_at.seconds() + PROOF_TTL;
    if env.block.time.seconds() > expiry {
        return Err(ContractError::ProofExpired { expiry });
    }

    // The commitment binds the verdict to the exact bytes submitted:
    // any altered payload is rejected before dispatch, regardless of kind.
    if keccak256(payload.as_slice()) != record.commitment {
        return Err(ContractError::CommitmentMismatch);
    }

    let fraud_proven = match record.kind {
        FraudKind::InvalidSignature => verify_invalid_signature(deps.as_ref(), &env, &id, &payload)?,
        FraudKind::DoubleSpend => verify_double_spend(&payload)?,
        FraudKind::InvalidAmount => verify_invalid_amount(&payload)?,
        FraudKind::InvalidToken => verify_invalid_token(deps.as_ref(), &payload)?,
        FraudKind::Replay => verify_replay(deps.as_ref(), &payload)?,
    };

    record.verified = true;
    record.fraud_proven = fraud_proven;
    PROOFS.save(deps.storage, id.as_slice(), &record)?;

    let mut response = Response::new()
        .add_attribute("method", "verify_proof")
        .add_attribute("request_id", bytes32_to_hex(&id))
        .add_attribute("kind", record.kind.as_str())
        .add_attribute("fraud_proven", fraud_proven.to_string());

    if fraud_proven {
        let count = FRAUD_COUNT.load(deps.storage)? + 1;
        FRAUD_COUNT.save(deps.storage, &count)?;
        response = response.add_attribute("fraud_count", count.to_string());

        // Best-effort relay of the verdict; a failure (no challenge open,
        // already resolved) is logged and the verdict stands.
        let config = CONFIG.load(deps.storage)?;
        match resolve_challenge_inner(deps.storage, &config, &id, true) {
            Ok((status, messages)) => {
                response = response
                    .add_messages(messages)
                    .add_attribute("challenge_resolution", status);
            }
            Err(err) => {
                response = response
                    .add_attribute("challenge_resolution", "skipped")
                    .add_attribute("relay_error", err.to_string());
            }
        }
    }

    Ok(response)
}

/// Execute handler for the per-chain authorized-token registry.
pub fn execute_set_chain_token(
    deps: DepsMut,
    info: MessageInfo,
    chain_id: u64,
    token: Binary,
    authorized: bool,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    let token_bytes = parse_bytes32(&token)?;
    if authorized {
        CHAIN_TOKENS.save(deps.storage, (chain_id, token_bytes.as_slice()), &true)?;
    } else {
        CHAIN_TOKENS.remove(deps.storage, (chain_id, token_bytes.as_slice()));
    }

    Ok(Response::new()
        .add_attribute("method", "set_chain_token")
        .add_attribute("chain_id", chain_id.to_string())
        .add_attribute("token", bytes32_to_hex(&token_bytes))
        .add_attribute("authorized", authorized.to_string()))
}

// ============================================================================
// Kind Dispatch
// ============================================================================

/// Invalid-signature: fraud if the embedded message does not belong to the
/// disputed request, or the read-only signature check fails. A check that
/// errors internally counts as fraud too - the conservative reading.
fn verify_invalid_signature(
    deps: Deps,
    env: &Env,
    request_id: &[u8; 32],
    payload: &Binary,
) -> Result<bool, ContractError> {
    let proof: InvalidSignatureProof = decode_payload(payload, FraudKind::InvalidSignature)?;

    let embedded_id = match parse_bytes32(&proof.message.request_id) {
        Ok(id) => id,
        Err(_) => return Ok(true),
    };
    if &embedded_id != request_id {
        return Ok(true);
    }

    match validate_transfer_signatures(deps, env, &proof.message, &proof.signatures) {
        Ok(_) => Ok(false),
        Err(_) => Ok(true),
    }
}

/// Double-spend: two distinct transaction references spending the same
/// input, with structural evidence attached. Identical references are not
/// a double-spend and are rejected outright.
fn verify_double_spend(payload: &Binary) -> Result<bool, ContractError> {
    let proof: DoubleSpendProof = decode_payload(payload, FraudKind::DoubleSpend)?;

    if proof.first_tx == proof.second_tx {
        return Err(ContractError::IdenticalTransactionRefs);
    }

    Ok(proof.inputs_match
        && !proof.first_tx.is_empty()
        && !proof.second_tx.is_empty()
        && !proof.proof_data.is_empty())
}

/// Invalid-amount: fraud iff source, target, and expected amounts are not
/// all equal.
fn verify_invalid_amount(payload: &Binary) -> Result<bool, ContractError> {
    let proof: InvalidAmountProof = decode_payload(payload, FraudKind::InvalidAmount)?;

    let consistent = proof.source_amount == proof.target_amount
        && proof.target_amount == proof.expected_amount;
    Ok(!consistent)
}

/// Invalid-token: fraud iff the token is not on the authorized list for
/// the claimed chain.
fn verify_invalid_token(deps: Deps, payload: &Binary) -> Result<bool, ContractError> {
    let proof: InvalidTokenProof = decode_payload(payload, FraudKind::InvalidToken)?;
    let token = parse_bytes32(&proof.token)?;

    let authorized = CHAIN_TOKENS
        .may_load(deps.storage, (proof.chain_id, token.as_slice()))?
        .unwrap_or(false);
    Ok(!authorized)
}

/// Replay: fraud iff the nonce is already consumed and a non-empty prior
/// transaction reference with evidence accompanies the claim.
fn verify_replay(deps: Deps, payload: &Binary) -> Result<bool, ContractError> {
    let proof: ReplayProof = decode_payload(payload, FraudKind::Replay)?;
    let sender = parse_bytes32(&proof.sender)?;

    let used = USED_NONCES
        .may_load(deps.storage, (sender.as_slice(), proof.nonce))?
        .unwrap_or(false);
    Ok(used && !proof.prior_tx.is_empty() && !proof.proof_data.is_empty())
}

fn decode_payload<T: serde::de::DeserializeOwned>(
    payload: &Binary,
    kind: FraudKind,
) -> Result<T, ContractError> {
    from_json(payload).map_err(|_| ContractError::MalformedProof {
        kind: kind.as_str().to_string(),
    })
}
