//! Error types for the Sentinel security core.

use cosmwasm_std::{StdError, Uint128};
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ContractError {
    #[error("{0}")]
    Std(#[from] StdError),

    // ========================================================================
    // Authorization Errors
    // ========================================================================

    #[error("Unauthorized: only admin can perform this action")]
    Unauthorized,

    #[error("Unauthorized: only the bridge executor can perform this action")]
    UnauthorizedExecutor,

    #[error("Unauthorized: only the adjudicator can resolve challenges")]
    UnauthorizedAdjudicator,

    #[error("Unauthorized: only the price oracle can update prices")]
    UnauthorizedOracle,

    #[error("Unauthorized: caller is not a guardian")]
    NotGuardian,

    #[error("Unauthorized: only pending admin can accept")]
    UnauthorizedPendingAdmin,

    #[error("Unauthorized: only the proposer or admin can cancel a proposal")]
    UnauthorizedProposalCancel,

    // ========================================================================
    // Admin Errors
    // ========================================================================

    #[error("No pending admin change")]
    NoPendingAdmin,

    #[error("Timelock not expired: {remaining_seconds} seconds remaining")]
    TimelockNotExpired { remaining_seconds: u64 },

    // ========================================================================
    // Pause Errors
    // ========================================================================

    #[error("System is paused")]
    SystemPaused,

    #[error("System is already paused")]
    AlreadyPaused,

    #[error("Volume limiter is paused")]
    VolumeLimiterPaused,

    // ========================================================================
    // Signature Validator Errors
    // ========================================================================

    #[error("Message expired at {expiry}")]
    MessageExpired { expiry: u64 },

    #[error("Nonce already used: {nonce}")]
    NonceAlreadyUsed { nonce: u64 },

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Invalid signature length: expected 65 bytes, got {got}")]
    InvalidSignatureLength { got: usize },

    #[error("Insufficient signatures: got {got}, need {required}")]
    InsufficientSignatures { got: u32, required: u32 },

    #[error("Signature threshold not met: {valid} unique valid signers, need {required}")]
    ThresholdNotMet { valid: u32, required: u32 },

    #[error("Signer already registered")]
    SignerAlreadyRegistered,

    #[error("Signer not registered")]
    SignerNotRegistered,

    #[error("Duplicate signer in set")]
    DuplicateSigner,

    #[error("Signer set cannot shrink below {min} members")]
    TooFewSigners { min: usize },

    #[error("Invalid threshold: must be between 1 and {signers}")]
    InvalidThreshold { signers: u32 },

    #[error("Threshold {threshold} would exceed remaining signer count {signers}")]
    ThresholdExceedsSigners { threshold: u32, signers: u32 },

    #[error("Rotation cooldown active: {remaining_seconds} seconds remaining")]
    RotationCooldownActive { remaining_seconds: u64 },

    // ========================================================================
    // Challenge Verifier Errors
    // ========================================================================

    #[error("Request already exists")]
    RequestAlreadyExists,

    #[error("Request not found")]
    RequestNotFound,

    #[error("Request is not pending: status is {status}")]
    RequestNotPending { status: String },

    #[error("Request is not challenged: status is {status}")]
    RequestNotChallenged { status: String },

    #[error("Request is not approved: status is {status}")]
    RequestNotApproved { status: String },

    #[error("Request cannot be cancelled: status is {status}")]
    RequestNotCancellable { status: String },

    #[error("Challenge window closed at {deadline}")]
    ChallengeWindowClosed { deadline: u64 },

    #[error("Challenge window still open: {remaining_seconds} seconds remaining")]
    ChallengeWindowOpen { remaining_seconds: u64 },

    #[error("Challenge already resolved")]
    ChallengeAlreadyResolved,

    #[error("Challenge not found")]
    ChallengeNotFound,

    #[error("Insufficient bond: got {got}, need {required}")]
    InsufficientBond { got: Uint128, required: Uint128 },

    #[error("Account is blacklisted: {account}")]
    AccountBlacklisted { account: String },

    // ========================================================================
    // Fraud Adjudicator Errors
    // ========================================================================

    #[error("Proof already submitted for this request")]
    ProofAlreadySubmitted,

    #[error("Proof not found")]
    ProofNotFound,

    #[error("Proof expired at {expiry}")]
    ProofExpired { expiry: u64 },

    #[error("Proof payload does not match stored commitment")]
    CommitmentMismatch,

    #[error("Proof payload is empty")]
    EmptyProofPayload,

    #[error("Proof payload is malformed for kind {kind}")]
    MalformedProof { kind: String },

    #[error("Identical transaction references do not constitute a double-spend")]
    IdenticalTransactionRefs,

    // ========================================================================
    // Volume Limiter Errors
    // ========================================================================

    #[error("Token not supported: {token}")]
    TokenNotSupported { token: String },

    #[error("Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("USD value overflow")]
    ValueOverflow,

    #[error("Invalid decimals: {decimals} exceeds maximum of 38")]
    InvalidDecimals { decimals: u8 },

    #[error("Invalid threshold bps: {bps} exceeds 10000")]
    InvalidThresholdBps { bps: u32 },

    #[error("Alert threshold must not exceed auto-pause threshold")]
    ThresholdOrdering,

    // ========================================================================
    // Guardian Council Errors
    // ========================================================================

    #[error("Guardian already registered")]
    GuardianAlreadyRegistered,

    #[error("Guardian not registered")]
    GuardianNotRegistered,

    #[error("Guardian roster cannot shrink below {min} members")]
    TooFewGuardians { min: u32 },

    #[error("Threshold {threshold} would exceed remaining guardian count {guardians}")]
    ThresholdExceedsGuardians { threshold: u32, guardians: u32 },

    #[error("Proposal not found: {proposal_id}")]
    ProposalNotFound { proposal_id: u64 },

    #[error("Proposal is not pending: status is {status}")]
    ProposalNotPending { status: String },

    #[error("Proposal is not executable: status is {status}")]
    ProposalNotExecutable { status: String },

    #[error("Proposal expired at {expiry}")]
    ProposalExpired { expiry: u64 },

    #[error("Already approved this proposal")]
    AlreadyApproved,

    #[error("Invalid proposal: {reason}")]
    InvalidProposal { reason: String },

    // ========================================================================
    // Validation Errors
    // ========================================================================

    #[error("Invalid value length: expected 32 bytes, got {got}")]
    InvalidValueLength { got: usize },

    #[error("Invalid hex value: {reason}")]
    InvalidHex { reason: String },

    #[error("Invalid challenge period: must be between {min} and {max} seconds")]
    InvalidChallengePeriod { min: u64, max: u64 },

    #[error("Unknown reply id: {id}")]
    UnknownReplyId { id: u64 },
}
