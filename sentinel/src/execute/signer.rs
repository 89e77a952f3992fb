//! SignatureValidator handlers.
//!
//! Verifies that a quorum of the current signer set attests a transfer
//! message, owns signer-set rotation, and tracks per-sender nonce
//! consumption for replay protection.

use cosmwasm_std::{Api, Binary, Deps, DepsMut, Env, MessageInfo, Response};

use crate::error::ContractError;
use crate::hash::{
    bytes20_to_hex, bytes32_to_hex, compute_rotation_digest, encode_local_account, hex_to_bytes20,
    keccak256, parse_bytes32, transfer_digest,
};
use crate::msg::TransferMessage;
use crate::state::{
    SignerSet, CONFIG, CURRENT_SET_VERSION, LAST_ROTATION, MIN_SIGNERS, ROTATION_COOLDOWN,
    SIGNER_SETS, USED_NONCES,
};

use super::guardian::ensure_not_paused;

/// Recover the 20-byte signer address from a 65-byte (r ‖ s ‖ v) signature
/// over the given digest. Accepts v as 0/1 or 27/28.
pub fn recover_signer(
    api: &dyn Api,
    digest: &[u8; 32],
    signature: &[u8],
) -> Result<[u8; 20], ContractError> {
    if signature.len() != 65 {
        return Err(ContractError::InvalidSignatureLength {
            got: signature.len(),
        });
    }

    let v = signature[64];
    let recovery_param = if v >= 27 { v - 27 } else { v };
    if recovery_param > 1 {
        return Err(ContractError::InvalidSignature);
    }

    let pubkey = api
        .secp256k1_recover_pubkey(digest, &signature[0..64], recovery_param)
        .map_err(|_| ContractError::InvalidSignature)?;

    // Uncompressed SEC1 pubkey: skip the 0x04 tag, keccak the 64-byte body
    let hash = keccak256(&pubkey[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..32]);
    Ok(address)
}

/// Count unique current-set members among the recovered signers of a
/// digest, erroring if the count misses the given threshold.
fn count_quorum(
    api: &dyn Api,
    digest: &[u8; 32],
    signatures: &[Binary],
    set: &SignerSet,
    threshold: u32,
) -> Result<u32, ContractError> {
    if (signatures.len() as u32) < threshold {
        return Err(ContractError::InsufficientSignatures {
            got: signatures.len() as u32,
            required: threshold,
        });
    }

    let mut seen: Vec<[u8; 20]> = Vec::with_capacity(signatures.len());
    for signature in signatures {
        let signer = recover_signer(api, digest, signature.as_slice())?;
        // Non-members and duplicate recoveries are discarded, not errors:
        // each set member may count once.
        if !set.signers.contains(&signer) || seen.contains(&signer) {
            continue;
        }
        seen.push(signer);
    }

    let valid = seen.len() as u32;
    if valid < threshold {
        return Err(ContractError::ThresholdNotMet {
            valid,
            required: threshold,
        });
    }
    Ok(valid)
}

/// Full signature check for a transfer message, without consuming state.
///
/// Preconditions in order: message not expired, nonce unused by the
/// sender, enough signatures supplied, unique valid recoveries meet the
/// current threshold. Returns the unique valid-signer count.
pub fn validate_transfer_signatures(
    deps: Deps,
    env: &Env,
    message: &TransferMessage,
    signatures: &[Binary],
) -> Result<u32, ContractError> {
    if env.block.time.seconds() > message.expiry {
        return Err(ContractError::MessageExpired {
            expiry: message.expiry,
        });
    }

    let sender = parse_bytes32(&message.sender)?;
    let used = USED_NONCES
        .may_load(deps.storage, (sender.as_slice(), message.nonce))?
        .unwrap_or(false);
    if used {
        return Err(ContractError::NonceAlreadyUsed {
            nonce: message.nonce,
        });
    }

    let version = CURRENT_SET_VERSION.load(deps.storage)?;
    let set = SIGNER_SETS.load(deps.storage, version)?;

    let digest = transfer_digest(message)?;
    count_quorum(deps.api, &digest, signatures, &set, set.threshold)
}

/// Execute handler for verifying a transfer attestation (executor only).
///
/// The mutating variant: on success the sender's nonce is consumed, so an
/// identical second call fails with a replay error.
pub fn execute_verify_transfer(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    message: TransferMessage,
    signatures: Vec<Binary>,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.executor && info.sender != config.admin {
        return Err(ContractError::UnauthorizedExecutor);
    }
    ensure_not_paused(deps.storage)?;

    let valid_signers = validate_transfer_signatures(deps.as_ref(), &env, &message, &signatures)?;

    let sender = parse_bytes32(&message.sender)?;
    USED_NONCES.save(deps.storage, (sender.as_slice(), message.nonce), &true)?;

    let request_id = parse_bytes32(&message.request_id)?;
    let version = CURRENT_SET_VERSION.load(deps.storage)?;

    Ok(Response::new()
        .add_attribute("method", "verify_transfer")
        .add_attribute("request_id", bytes32_to_hex(&request_id))
        .add_attribute("sender", bytes32_to_hex(&sender))
        .add_attribute("nonce", message.nonce.to_string())
        .add_attribute("valid_signers", valid_signers.to_string())
        .add_attribute("set_version", version.to_string()))
}

/// Execute handler for wholesale signer-set rotation.
///
/// Rotation is self-authorizing: it needs threshold-many current-set
/// signatures over the rotation digest, not an owner's say-so. A cooldown
/// bounds how often the set can churn.
pub fn execute_rotate_signers(
    deps: DepsMut,
    env: Env,
    _info: MessageInfo,
    signers: Vec<String>,
    threshold: u32,
    signatures: Vec<Binary>,
) -> Result<Response, ContractError> {
    let last_rotation = LAST_ROTATION.load(deps.storage)?;
    let cooldown_end = last_rotation.seconds() + ROTATION_COOLDOWN;
    if env.block.time.seconds() < cooldown_end {
        return Err(ContractError::RotationCooldownActive {
            remaining_seconds: cooldown_end - env.block.time.seconds(),
        });
    }

    let new_signers = parse_signer_list(&signers)?;
    validate_set_shape(new_signers.len(), threshold)?;

    let version = CURRENT_SET_VERSION.load(deps.storage)?;
    let current = SIGNER_SETS.load(deps.storage, version)?;
    let next_version = version + 1;

    let digest = compute_rotation_digest(next_version, threshold, &new_signers);
    let valid_signers = count_quorum(
        deps.api,
        &digest,
        &signatures,
        &current,
        current.threshold,
    )?;

    let new_set = SignerSet {
        version: next_version,
        signers: new_signers,
        threshold,
        activated_at: env.block.time,
    };
    SIGNER_SETS.save(deps.storage, next_version, &new_set)?;
    CURRENT_SET_VERSION.save(deps.storage, &next_version)?;
    LAST_ROTATION.save(deps.storage, &env.block.time)?;

    Ok(Response::new()
        .add_attribute("method", "rotate_signers")
        .add_attribute("new_version", next_version.to_string())
        .add_attribute("signer_count", new_set.signers.len().to_string())
        .add_attribute("threshold", threshold.to_string())
        .add_attribute("authorizing_signers", valid_signers.to_string()))
}

/// Execute handler for adding a signer to the current set in place.
pub fn execute_add_signer(
    deps: DepsMut,
    info: MessageInfo,
    signer: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    let address = hex_to_bytes20(&signer)?;
    let version = CURRENT_SET_VERSION.load(deps.storage)?;
    let mut set = SIGNER_SETS.load(deps.storage, version)?;

    if set.signers.contains(&address) {
        return Err(ContractError::SignerAlreadyRegistered);
    }
    set.signers.push(address);
    SIGNER_SETS.save(deps.storage, version, &set)?;

    Ok(Response::new()
        .add_attribute("method", "add_signer")
        .add_attribute("signer", bytes20_to_hex(&address))
        .add_attribute("set_version", version.to_string())
        .add_attribute("signer_count", set.signers.len().to_string()))
}

/// Execute handler for removing a signer from the current set in place.
pub fn execute_remove_signer(
    deps: DepsMut,
    info: MessageInfo,
    signer: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    let address = hex_to_bytes20(&signer)?;
    let version = CURRENT_SET_VERSION.load(deps.storage)?;
    let mut set = SIGNER_SETS.load(deps.storage, version)?;

    let position = set
        .signers
        .iter()
        .position(|s| s == &address)
        .ok_or(ContractError::SignerNotRegistered)?;

    if set.signers.len() - 1 < MIN_SIGNERS {
        return Err(ContractError::TooFewSigners { min: MIN_SIGNERS });
    }
    let remaining = (set.signers.len() - 1) as u32;
    if set.threshold > remaining {
        return Err(ContractError::ThresholdExceedsSigners {
            threshold: set.threshold,
            signers: remaining,
        });
    }

    set.signers.remove(position);
    SIGNER_SETS.save(deps.storage, version, &set)?;

    Ok(Response::new()
        .add_attribute("method", "remove_signer")
        .add_attribute("signer", bytes20_to_hex(&address))
        .add_attribute("set_version", version.to_string())
        .add_attribute("signer_count", set.signers.len().to_string()))
}

/// Execute handler for updating the current set's threshold.
pub fn execute_update_signer_threshold(
    deps: DepsMut,
    info: MessageInfo,
    threshold: u32,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.admin {
        return Err(ContractError::Unauthorized);
    }

    let version = CURRENT_SET_VERSION.load(deps.storage)?;
    let mut set = SIGNER_SETS.load(deps.storage, version)?;

    validate_set_shape(set.signers.len(), threshold)?;
    set.threshold = threshold;
    SIGNER_SETS.save(deps.storage, version, &set)?;

    Ok(Response::new()
        .add_attribute("method", "update_signer_threshold")
        .add_attribute("set_version", version.to_string())
        .add_attribute("threshold", threshold.to_string()))
}

/// Execute handler for pre-emptively burning one of the caller's nonces.
///
/// The caller's local address is canonicalized to its 32-byte universal
/// form, so the burn covers exactly the nonces that verify against it.
pub fn execute_invalidate_nonce(
    deps: DepsMut,
    info: MessageInfo,
    nonce: u64,
) -> Result<Response, ContractError> {
    let sender = encode_local_account(deps.as_ref(), &info.sender)?;

    let used = USED_NONCES
        .may_load(deps.storage, (sender.as_slice(), nonce))?
        .unwrap_or(false);
    if used {
        return Err(ContractError::NonceAlreadyUsed { nonce });
    }
    USED_NONCES.save(deps.storage, (sender.as_slice(), nonce), &true)?;

    Ok(Response::new()
        .add_attribute("method", "invalidate_nonce")
        .add_attribute("sender", bytes32_to_hex(&sender))
        .add_attribute("nonce", nonce.to_string()))
}

// ============================================================================
// Helpers
// ============================================================================

/// Parse hex signer addresses, rejecting duplicates.
pub fn parse_signer_list(signers: &[String]) -> Result<Vec<[u8; 20]>, ContractError> {
    let mut parsed: Vec<[u8; 20]> = Vec::with_capacity(signers.len());
    for signer in signers {
        let address = hex_to_bytes20(signer)?;
        if parsed.contains(&address) {
            return Err(ContractError::DuplicateSigner);
        }
        parsed.push(address);
    }
    Ok(parsed)
}

/// Enforce `|signers| >= MIN_SIGNERS` and `1 <= threshold <= |signers|`.
pub fn validate_set_shape(signer_count: usize, threshold: u32) -> Result<(), ContractError> {
    if signer_count < MIN_SIGNERS {
        return Err(ContractError::TooFewSigners { min: MIN_SIGNERS });
    }
    if threshold == 0 || threshold as usize > signer_count {
        return Err(ContractError::InvalidThreshold {
            signers: signer_count as u32,
        });
    }
    Ok(())
}
