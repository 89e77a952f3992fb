//! Message types for the Sentinel security core.

use cosmwasm_schema::{cw_serde, QueryResponses};
use cosmwasm_std::{Addr, Binary, Timestamp, Uint128};

use crate::state::{FraudKind, ProposalAction, ProposalStatus, RequestStatus};

// ============================================================================
// Shared Value Types
// ============================================================================

/// A transfer attestation message signed by the MPC signer set.
///
/// Account, token, and request identifiers are 32-byte universal values.
#[cw_serde]
pub struct TransferMessage {
    /// Request identifier (32 bytes)
    pub request_id: Binary,
    /// Sender account on the source chain (32 bytes)
    pub sender: Binary,
    /// Recipient account on the target chain (32 bytes)
    pub recipient: Binary,
    /// Token identifier (32 bytes)
    pub token: Binary,
    /// Transfer amount in the token's smallest unit
    pub amount: Uint128,
    /// Source chain id
    pub src_chain_id: u64,
    /// Target chain id
    pub dest_chain_id: u64,
    /// Sender-scoped single-use nonce
    pub nonce: u64,
    /// Unix expiry in seconds
    pub expiry: u64,
}

/// A claimed transfer submitted to the challenge verifier.
#[cw_serde]
pub struct TransferRequest {
    /// Request identifier (32 bytes)
    pub request_id: Binary,
    /// Sender account on the source chain (32 bytes)
    pub sender: Binary,
    /// Recipient account on the target chain (32 bytes)
    pub recipient: Binary,
    /// Token identifier (32 bytes)
    pub token: Binary,
    /// Transfer amount in the token's smallest unit
    pub amount: Uint128,
    /// Source chain id
    pub src_chain_id: u64,
    /// Target chain id
    pub dest_chain_id: u64,
}

/// USD ceilings passed in messages (1e18-scaled; zero = unlimited)
#[cw_serde]
pub struct VolumeLimitsMsg {
    pub max_transfer_usd: Uint128,
    pub hourly_limit_usd: Uint128,
    pub daily_limit_usd: Uint128,
}

// ============================================================================
// Fraud Proof Payloads
// ============================================================================
//
// A proof payload is the JSON encoding of one of these structures; only its
// keccak commitment is stored at submission, and verification must present
// the identical bytes.

/// Payload for `FraudKind::InvalidSignature`
#[cw_serde]
pub struct InvalidSignatureProof {
    /// The transfer message the disputed request claims was attested
    pub message: TransferMessage,
    /// The signatures said to attest it (65 bytes each)
    pub signatures: Vec<Binary>,
}

/// Payload for `FraudKind::DoubleSpend`
#[cw_serde]
pub struct DoubleSpendProof {
    /// First transaction reference
    pub first_tx: Binary,
    /// Second, distinct transaction reference
    pub second_tx: Binary,
    /// Whether both transactions spend the same input
    pub inputs_match: bool,
    /// Structural evidence bytes (inclusion data; see DESIGN.md)
    pub proof_data: Binary,
}

/// Payload for `FraudKind::InvalidAmount`
#[cw_serde]
pub struct InvalidAmountProof {
    pub source_amount: Uint128,
    pub target_amount: Uint128,
    pub expected_amount: Uint128,
}

/// Payload for `FraudKind::InvalidToken`
#[cw_serde]
pub struct InvalidTokenProof {
    pub chain_id: u64,
    /// Token identifier (32 bytes)
    pub token: Binary,
}

/// Payload for `FraudKind::Replay`
#[cw_serde]
pub struct ReplayProof {
    /// Sender account the nonce is scoped to (32 bytes)
    pub sender: Binary,
    pub nonce: u64,
    /// Reference to the prior transaction that consumed the nonce
    pub prior_tx: Binary,
    /// Structural evidence bytes (inclusion data; see DESIGN.md)
    pub proof_data: Binary,
}

// ============================================================================
// Executor Relay
// ============================================================================

/// Opaque pause/unpause call relayed to the bridge executor, best-effort.
#[cw_serde]
pub enum ExecutorRelayMsg {
    Pause {},
    Unpause {},
}

// ============================================================================
// Instantiate & Migrate
// ============================================================================

/// Migrate message
#[cw_serde]
pub struct MigrateMsg {}

/// Instantiate message
#[cw_serde]
pub struct InstantiateMsg {
    /// Admin address for contract management
    pub admin: String,
    /// Bridge executor address
    pub executor: String,
    /// External adjudicator address
    pub adjudicator: String,
    /// Price oracle address
    pub oracle: String,
    /// Initial signer set (20-byte hex addresses)
    pub signers: Vec<String>,
    /// Signature quorum for the initial set
    pub signer_threshold: u32,
    /// Initial guardian roster
    pub guardians: Vec<String>,
    /// Approval quorum for guardian proposals
    pub guardian_threshold: u32,
    /// Native denom used for challenge bonds
    pub bond_denom: String,
    /// Minimum challenger bond
    pub min_challenge_bond: Uint128,
    /// Fixed reward paid on a winning challenge
    pub challenger_reward: Uint128,
    /// Challenge window in seconds (default: 6 hours)
    pub challenge_period: Option<u64>,
    /// Global USD ceiling per transfer (1e18-scaled; zero = unlimited)
    pub max_transfer_usd: Uint128,
    /// Global hourly USD ceiling (1e18-scaled; zero = unlimited)
    pub hourly_limit_usd: Uint128,
    /// Global daily USD ceiling (1e18-scaled; zero = unlimited)
    pub daily_limit_usd: Uint128,
}

// ============================================================================
// Execute Messages
// ============================================================================

/// Execute messages
#[cw_serde]
pub enum ExecuteMsg {
    // ========================================================================
    // Signature Validator
    // ========================================================================
    /// Verify a quorum of signer-set signatures over a transfer message and
    /// consume the sender's nonce.
    ///
    /// Authorization: Executor only
    VerifyTransfer {
        message: TransferMessage,
        /// 65-byte (r ‖ s ‖ v) signatures
        signatures: Vec<Binary>,
    },

    /// Replace the signer set wholesale with a new version.
    ///
    /// Authorization: Anyone; the rotation is self-authorizing via
    /// threshold-many current-set signatures over the rotation digest.
    RotateSigners {
        /// New signer set (20-byte hex addresses)
        signers: Vec<String>,
        /// New signature quorum
        threshold: u32,
        /// Current-set signatures over the rotation digest
        signatures: Vec<Binary>,
    },

    /// Add a signer to the current set in place.
    ///
    /// Authorization: Admin only
    AddSigner { signer: String },

    /// Remove a signer from the current set in place.
    ///
    /// Authorization: Admin only
    RemoveSigner { signer: String },

    /// Update the signature quorum of the current set.
    ///
    /// Authorization: Admin only
    UpdateSignerThreshold { threshold: u32 },

    /// Pre-emptively burn one of the caller's own nonces.
    ///
    /// Authorization: Anyone (scoped to the caller's universal encoding)
    InvalidateNonce { nonce: u64 },

    // ========================================================================
    // Challenge Verifier
    // ========================================================================
    /// Submit a claimed transfer and start its challenge window.
    ///
    /// Authorization: Executor only
    SubmitRequest { request: TransferRequest },

    /// Dispute a pending request before its deadline. The attached native
    /// funds in the bond denom become the challenger's bond.
    ///
    /// Authorization: Anyone
    ChallengeRequest {
        /// Request identifier (32 bytes)
        request_id: Binary,
        /// Free-text reason
        reason: String,
    },

    /// Finalize an unchallenged request at/after its deadline.
    ///
    /// Authorization: Anyone (optimistic-path finalization)
    ApproveRequest { request_id: Binary },

    /// Resolve a challenge with an adjudicated verdict.
    ///
    /// Authorization: Adjudicator or admin
    ResolveChallenge {
        request_id: Binary,
        fraud_proven: bool,
    },

    /// Mark an approved request as executed by the bridge.
    ///
    /// Authorization: Executor only
    MarkExecuted { request_id: Binary },

    /// Administratively cancel a pending or challenged request. An
    /// unresolved challenger's bond is refunded.
    ///
    /// Authorization: Admin only
    CancelRequest { request_id: Binary, reason: String },

    // ========================================================================
    // Fraud Adjudicator
    // ========================================================================
    /// Submit a fraud proof against a request (one slot per request).
    /// Only the payload's keccak commitment is stored.
    ///
    /// Authorization: Anyone
    SubmitProof {
        request_id: Binary,
        kind: FraudKind,
        /// JSON encoding of the kind's payload structure
        payload: Binary,
    },

    /// Verify a submitted proof against its commitment and record the
    /// verdict. A proven verdict resolves the challenge best-effort.
    ///
    /// Authorization: Anyone
    VerifyProof { request_id: Binary, payload: Binary },

    /// Authorize or revoke a token for a chain (invalid-token adjudication).
    ///
    /// Authorization: Admin only
    SetChainToken {
        chain_id: u64,
        /// Token identifier (32 bytes)
        token: Binary,
        authorized: bool,
    },

    // ========================================================================
    // Volume Limiter
    // ========================================================================
    /// Admit a transfer against the USD volume ceilings, accumulating the
    /// windows on success. The response reports `allowed` and `usd_value`.
    ///
    /// Authorization: Executor only
    AdmitTransfer {
        /// Token identifier (32 bytes)
        token: Binary,
        amount: Uint128,
    },

    /// Register a token for admission.
    ///
    /// Authorization: Admin only
    RegisterToken {
        /// Token identifier (32 bytes)
        token: Binary,
        /// USD price per whole token, 1e18-scaled
        usd_price: Uint128,
        decimals: u8,
    },

    /// Update a token's USD price.
    ///
    /// Authorization: Oracle or admin
    UpdateTokenPrice { token: Binary, usd_price: Uint128 },

    /// Set or clear a token's ceiling override.
    ///
    /// Authorization: Admin only
    SetTokenLimits {
        token: Binary,
        limits: Option<VolumeLimitsMsg>,
    },

    /// Update the global ceilings.
    ///
    /// Authorization: Admin only
    UpdateGlobalLimits {
        max_transfer_usd: Option<Uint128>,
        hourly_limit_usd: Option<Uint128>,
        daily_limit_usd: Option<Uint128>,
    },

    /// Update alert/auto-pause thresholds (basis points).
    ///
    /// Authorization: Admin only
    UpdateVolumeThresholds {
        alert_bps: Option<u32>,
        auto_pause_bps: Option<u32>,
    },

    /// Clear the limiter's one-way auto-pause flag.
    ///
    /// Authorization: Admin only
    ResumeVolume {},

    // ========================================================================
    // Guardian Council
    // ========================================================================
    /// Pause the whole system immediately. Deliberately non-quorum: speed
    /// over consensus for defense.
    ///
    /// Authorization: Any single guardian
    EmergencyPause {},

    /// Open a governance proposal; the proposer's approval is counted.
    ///
    /// Authorization: Guardian only
    Propose { action: ProposalAction },

    /// Approve a pending proposal (once per guardian).
    ///
    /// Authorization: Guardian only
    ApproveProposal { proposal_id: u64 },

    /// Execute an approved proposal.
    ///
    /// Authorization: Guardian only
    ExecuteProposal { proposal_id: u64 },

    /// Cancel a proposal before execution.
    ///
    /// Authorization: Proposer or admin
    CancelProposal { proposal_id: u64 },

    /// Direct guardian add, skipping quorum. Bootstrap/recovery path.
    ///
    /// Authorization: Admin only
    OwnerAddGuardian { address: String },

    /// Direct guardian removal, skipping quorum. Bootstrap/recovery path.
    ///
    /// Authorization: Admin only
    OwnerRemoveGuardian { address: String },

    /// Direct threshold update, skipping quorum. Bootstrap/recovery path.
    ///
    /// Authorization: Admin only
    OwnerUpdateGuardianThreshold { threshold: u32 },

    // ========================================================================
    // Admin Operations
    // ========================================================================
    /// Initiate 7-day timelock for admin transfer
    ProposeAdmin { new_admin: String },

    /// Complete admin transfer after timelock
    AcceptAdmin {},

    /// Cancel pending admin change
    CancelAdminProposal {},

    /// Re-point collaborator addresses.
    ///
    /// Authorization: Admin only
    UpdateRoles {
        executor: Option<String>,
        adjudicator: Option<String>,
        oracle: Option<String>,
    },

    /// Update challenge economics.
    ///
    /// Authorization: Admin only
    UpdateSecurityConfig {
        challenge_period: Option<u64>,
        min_challenge_bond: Option<Uint128>,
        challenger_reward: Option<Uint128>,
    },
}

// ============================================================================
// Query Messages
// ============================================================================

/// Query messages
#[cw_serde]
#[derive(QueryResponses)]
pub enum QueryMsg {
    /// Returns contract configuration
    #[returns(ConfigResponse)]
    Config {},

    /// Returns the system-wide pause state
    #[returns(PauseStateResponse)]
    PauseState {},

    /// Returns core statistics
    #[returns(SecurityStatsResponse)]
    SecurityStats {},

    /// Returns pending admin proposal details
    #[returns(Option<PendingAdminResponse>)]
    PendingAdmin {},

    // ========================================================================
    // Signature Validator
    // ========================================================================
    /// Returns a signer set snapshot (current if version omitted)
    #[returns(SignerSetResponse)]
    SignerSet { version: Option<u64> },

    /// Check whether a sender-scoped nonce is consumed
    #[returns(NonceUsedResponse)]
    NonceUsed { sender: Binary, nonce: u64 },

    /// Read-only signature check; same semantics as VerifyTransfer but
    /// consumes nothing
    #[returns(ValidationResponse)]
    ValidateSignatures {
        message: TransferMessage,
        signatures: Vec<Binary>,
    },

    /// Compute the canonical transfer digest without storing anything
    #[returns(TransferHashResponse)]
    TransferHash { message: TransferMessage },

    // ========================================================================
    // Challenge Verifier
    // ========================================================================
    /// Returns a bridge request by id
    #[returns(RequestResponse)]
    Request { request_id: Binary },

    /// List requests with cursor-based pagination
    #[returns(RequestsResponse)]
    Requests {
        start_after: Option<Binary>,
        limit: Option<u32>,
    },

    /// Returns the challenge for a request, if any
    #[returns(Option<ChallengeResponse>)]
    Challenge { request_id: Binary },

    // ========================================================================
    // Fraud Adjudicator
    // ========================================================================
    /// Returns the proof record for a request, if any
    #[returns(Option<ProofResponse>)]
    Proof { request_id: Binary },

    /// Returns the global proven-fraud counter
    #[returns(FraudStatsResponse)]
    FraudStats {},

    /// Check whether a token is authorized for a chain
    #[returns(ChainTokenResponse)]
    ChainToken { chain_id: u64, token: Binary },

    // ========================================================================
    // Volume Limiter
    // ========================================================================
    /// Returns both windows with lazily-evaluated usage and remaining room
    #[returns(VolumeUsageResponse)]
    VolumeUsage {},

    /// Pre-flight admission check; same arithmetic as AdmitTransfer with
    /// zero writes
    #[returns(CheckTransferResponse)]
    CheckTransfer { token: Binary, amount: Uint128 },

    /// Returns a token's admission parameters
    #[returns(VolumeTokenResponse)]
    VolumeToken { token: Binary },

    // ========================================================================
    // Guardian Council
    // ========================================================================
    /// Returns the guardian roster and threshold
    #[returns(GuardiansResponse)]
    Guardians {},

    /// Returns a proposal by id
    #[returns(ProposalResponse)]
    Proposal { proposal_id: u64 },

    /// List proposals with cursor-based pagination
    #[returns(ProposalsResponse)]
    Proposals {
        start_after: Option<u64>,
        limit: Option<u32>,
    },

    /// Check whether an address is blacklisted
    #[returns(IsBlacklistedResponse)]
    IsBlacklisted { address: String },
}

// ============================================================================
// Response Types - Core
// ============================================================================

#[cw_serde]
pub struct ConfigResponse {
    pub admin: Addr,
    pub executor: Addr,
    pub adjudicator: Addr,
    pub oracle: Addr,
    pub bond_denom: String,
    pub challenge_period: u64,
    pub min_challenge_bond: Uint128,
    pub challenger_reward: Uint128,
}

#[cw_serde]
pub struct PauseStateResponse {
    pub paused: bool,
    pub triggered_by: Option<Addr>,
    pub paused_at: Option<Timestamp>,
}

#[cw_serde]
pub struct SecurityStatsResponse {
    pub total_requests: u64,
    pub total_challenges: u64,
    pub challenges_upheld: u64,
    pub challenges_rejected: u64,
    pub bonds_forfeited: Uint128,
}

#[cw_serde]
pub struct PendingAdminResponse {
    pub new_address: Addr,
    pub execute_after: Timestamp,
}

// ============================================================================
// Response Types - Signature Validator
// ============================================================================

#[cw_serde]
pub struct SignerSetResponse {
    pub version: u64,
    /// Signer identities as 20-byte hex addresses
    pub signers: Vec<String>,
    pub threshold: u32,
    pub activated_at: Timestamp,
    /// Whether this snapshot is the current set
    pub is_current: bool,
}

#[cw_serde]
pub struct NonceUsedResponse {
    pub nonce: u64,
    pub used: bool,
}

#[cw_serde]
pub struct ValidationResponse {
    pub valid: bool,
    /// Failure classification when invalid
    pub reason: Option<String>,
    /// Unique valid-signer recoveries counted
    pub unique_signers: u32,
    pub threshold: u32,
}

#[cw_serde]
pub struct TransferHashResponse {
    pub hash: Binary,
}

// ============================================================================
// Response Types - Challenge Verifier
// ============================================================================

#[cw_serde]
pub struct RequestResponse {
    pub request_id: Binary,
    pub sender: Binary,
    pub recipient: Binary,
    pub token: Binary,
    pub amount: Uint128,
    pub src_chain_id: u64,
    pub dest_chain_id: u64,
    pub submitted_at: Timestamp,
    pub challenge_deadline: Timestamp,
    pub status: RequestStatus,
    /// Seconds left in the challenge window (0 once closed)
    pub challenge_window_remaining: u64,
}

#[cw_serde]
pub struct RequestsResponse {
    pub requests: Vec<RequestResponse>,
}

#[cw_serde]
pub struct ChallengeResponse {
    pub request_id: Binary,
    pub challenger: Addr,
    pub bond: Uint128,
    pub reason: String,
    pub challenged_at: Timestamp,
    pub resolved: bool,
}

// ============================================================================
// Response Types - Fraud Adjudicator
// ============================================================================

#[cw_serde]
pub struct ProofResponse {
    pub request_id: Binary,
    pub submitter: Addr,
    pub kind: FraudKind,
    /// keccak256 commitment of the payload
    pub commitment: Binary,
    pub submitted_at: Timestamp,
    pub verified: bool,
    pub fraud_proven: bool,
}

#[cw_serde]
pub struct FraudStatsResponse {
    pub fraud_count: u64,
}

#[cw_serde]
pub struct ChainTokenResponse {
    pub chain_id: u64,
    pub token: Binary,
    pub authorized: bool,
}

// ============================================================================
// Response Types - Volume Limiter
// ============================================================================

#[cw_serde]
pub struct WindowUsage {
    /// Block time the current window started
    pub window_start: Timestamp,
    /// Accumulated USD value (zero if the window has lapsed)
    pub used_usd: Uint128,
    /// Applicable global ceiling (zero = unlimited)
    pub limit_usd: Uint128,
    /// Remaining capacity under the ceiling
    pub remaining_usd: Uint128,
    /// Transfers accounted in the current window
    pub tx_count: u64,
}

#[cw_serde]
pub struct VolumeUsageResponse {
    pub hourly: WindowUsage,
    pub daily: WindowUsage,
    /// Whether the limiter has auto-paused
    pub paused: bool,
}

#[cw_serde]
pub struct CheckTransferResponse {
    pub allowed: bool,
    pub usd_value: Uint128,
    /// Rejection classification when not allowed
    pub reason: Option<String>,
}

#[cw_serde]
pub struct VolumeTokenResponse {
    pub token: Binary,
    pub supported: bool,
    pub usd_price: Uint128,
    pub decimals: u8,
    pub custom_limits: Option<VolumeLimitsMsg>,
}

// ============================================================================
// Response Types - Guardian Council
// ============================================================================

#[cw_serde]
pub struct GuardiansResponse {
    pub guardians: Vec<Addr>,
    pub threshold: u32,
}

#[cw_serde]
pub struct ProposalResponse {
    pub id: u64,
    pub action: ProposalAction,
    pub proposer: Addr,
    pub approvals: u32,
    pub threshold: u32,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub status: ProposalStatus,
}

#[cw_serde]
pub struct ProposalsResponse {
    pub proposals: Vec<ProposalResponse>,
}

#[cw_serde]
pub struct IsBlacklistedResponse {
    pub address: String,
    pub blacklisted: bool,
}
