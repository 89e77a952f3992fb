//! Canonical hash computation for the Sentinel security core.
//!
//! All digests use keccak256 over a fixed 32-byte-slot layout with a
//! leading domain separator, so two messages with identical fields always
//! hash identically and digests from different contexts can never collide.

use cosmwasm_std::{Addr, Binary, Deps, StdResult};
use tiny_keccak::{Hasher, Keccak};

use crate::error::ContractError;
use crate::msg::TransferMessage;

/// Domain tag for transfer message digests
const TRANSFER_DOMAIN: &[u8] = b"sentinel/transfer/v1";

/// Domain tag for signer rotation digests
const ROTATION_DOMAIN: &[u8] = b"sentinel/rotation/v1";

/// Compute keccak256 hash of arbitrary data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Compute the canonical digest of a transfer message.
///
/// # Byte layout (320 bytes total)
/// - Slot 0: keccak256 of the transfer domain tag
/// - Slots 1-4: request_id, sender, recipient, token (32 bytes each)
/// - Slot 5: amount (uint256, big-endian, left-padded)
/// - Slots 6-9: src_chain_id, dest_chain_id, nonce, expiry (left-padded)
#[allow(clippy::too_many_arguments)]
pub fn compute_transfer_digest(
    request_id: &[u8; 32],
    sender: &[u8; 32],
    recipient: &[u8; 32],
    token: &[u8; 32],
    amount: u128,
    src_chain_id: u64,
    dest_chain_id: u64,
    nonce: u64,
    expiry: u64,
) -> [u8; 32] {
    let mut data = [0u8; 320];

    data[0..32].copy_from_slice(&keccak256(TRANSFER_DOMAIN));
    data[32..64].copy_from_slice(request_id);
    data[64..96].copy_from_slice(sender);
    data[96..128].copy_from_slice(recipient);
    data[128..160].copy_from_slice(token);

    // u128 amount left-padded to 32 bytes, big-endian
    data[160 + 16..192].copy_from_slice(&amount.to_be_bytes());

    // u64 values left-padded to 32 bytes, big-endian
    data[192 + 24..224].copy_from_slice(&src_chain_id.to_be_bytes());
    data[224 + 24..256].copy_from_slice(&dest_chain_id.to_be_bytes());
    data[256 + 24..288].copy_from_slice(&nonce.to_be_bytes());
    data[288 + 24..320].copy_from_slice(&expiry.to_be_bytes());

    keccak256(&data)
}

/// Parse and hash a transfer message in one step.
pub fn transfer_digest(message: &TransferMessage) -> Result<[u8; 32], ContractError> {
    let request_id = parse_bytes32(&message.request_id)?;
    let sender = parse_bytes32(&message.sender)?;
    let recipient = parse_bytes32(&message.recipient)?;
    let token = parse_bytes32(&message.token)?;

    Ok(compute_transfer_digest(
        &request_id,
        &sender,
        &recipient,
        &token,
        message.amount.u128(),
        message.src_chain_id,
        message.dest_chain_id,
        message.nonce,
        message.expiry,
    ))
}

/// Compute the digest a signer-set rotation must be signed over.
///
/// Binds the next version number, the new threshold, and the exact new
/// member list, so a rotation authorization cannot be replayed for a
/// different set or a later version.
///
/// # Byte layout
/// - Slot 0: keccak256 of the rotation domain tag
/// - Slot 1: next version (left-padded)
/// - Slot 2: new threshold (left-padded)
/// - Slot 3: member count (left-padded)
/// - Slots 4..: each signer address left-padded to 32 bytes, in order
pub fn compute_rotation_digest(
    next_version: u64,
    threshold: u32,
    signers: &[[u8; 20]],
) -> [u8; 32] {
    let mut data = vec![0u8; 128 + signers.len() * 32];

    data[0..32].copy_from_slice(&keccak256(ROTATION_DOMAIN));
    data[32 + 24..64].copy_from_slice(&next_version.to_be_bytes());
    data[64 + 28..96].copy_from_slice(&threshold.to_be_bytes());
    data[96 + 24..128].copy_from_slice(&(signers.len() as u64).to_be_bytes());

    for (i, signer) in signers.iter().enumerate() {
        let start = 128 + i * 32;
        data[start + 12..start + 32].copy_from_slice(signer);
    }

    keccak256(&data)
}

/// Parse a Binary that must be exactly 32 bytes.
pub fn parse_bytes32(value: &Binary) -> Result<[u8; 32], ContractError> {
    value
        .to_vec()
        .try_into()
        .map_err(|_| ContractError::InvalidValueLength { got: value.len() })
}

/// Encode a local address as a 32-byte universal value, matching how
/// cross-chain accounts are represented: canonical forms up to 32 bytes
/// are left-padded, longer ones are keccak-hashed.
pub fn encode_local_account(deps: Deps, addr: &Addr) -> StdResult<[u8; 32]> {
    let canonical = deps.api.addr_canonicalize(addr.as_str())?;
    let bytes = canonical.as_slice();

    if bytes.len() > 32 {
        return Ok(keccak256(bytes));
    }

    let mut result = [0u8; 32];
    let start = 32 - bytes.len();
    result[start..].copy_from_slice(bytes);

    Ok(result)
}

/// Convert a 32-byte value to hex string (for attributes and blacklist keys)
pub fn bytes32_to_hex(bytes: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Convert a 20-byte signer address to hex string
pub fn bytes20_to_hex(bytes: &[u8; 20]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Parse hex string (with or without 0x prefix) to a 20-byte signer address
pub fn hex_to_bytes20(value: &str) -> Result<[u8; 20], ContractError> {
    let stripped = value.strip_prefix("0x").unwrap_or(value);
    let decoded = hex::decode(stripped).map_err(|_| ContractError::InvalidHex {
        reason: format!("not valid hex: {value}"),
    })?;
    decoded
        .try_into()
        .map_err(|_| ContractError::InvalidHex {
            reason: format!("expected 20 bytes: {value}"),
        })
}
