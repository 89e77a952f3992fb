//! State definitions for the Sentinel security core.
//!
//! Each component owns its own keyed storage; cross-component references
//! go through opaque identifiers (request id, sender value, set version,
//! proposal id), never shared records.

use cosmwasm_schema::cw_serde;
use cosmwasm_std::{Addr, Binary, Timestamp, Uint128};
use cw_storage_plus::{Item, Map};

// ============================================================================
// Core Configuration
// ============================================================================

/// Contract configuration and role registry
#[cw_serde]
pub struct Config {
    /// Admin address for contract management and bootstrap/recovery bypass
    pub admin: Addr,
    /// Bridge executor authorized to submit, verify, and finalize transfers
    pub executor: Addr,
    /// External adjudication identity allowed to resolve challenges
    pub adjudicator: Addr,
    /// Price feed identity allowed to update token USD prices
    pub oracle: Addr,
    /// Native denom used for challenge bonds and rewards
    pub bond_denom: String,
    /// Challenge window length in seconds
    pub challenge_period: u64,
    /// Minimum bond a challenger must deposit
    pub min_challenge_bond: Uint128,
    /// Fixed reward paid on a winning challenge, on top of the bond
    pub challenger_reward: Uint128,
}

/// Pending admin change proposal
#[cw_serde]
pub struct PendingAdmin {
    /// Proposed new admin address
    pub new_address: Addr,
    /// Block time when the change can be executed
    pub execute_after: Timestamp,
}

/// Core statistics
#[cw_serde]
pub struct SecurityStats {
    /// Total requests ever submitted
    pub total_requests: u64,
    /// Total challenges ever opened
    pub total_challenges: u64,
    /// Challenges resolved with fraud proven
    pub challenges_upheld: u64,
    /// Challenges resolved without fraud proven
    pub challenges_rejected: u64,
    /// Bond value forfeited by losing challengers
    pub bonds_forfeited: Uint128,
}

// ============================================================================
// Signature Validator
// ============================================================================

/// Versioned signer set snapshot
///
/// Snapshots are append-only: incremental add/remove mutates the current
/// snapshot in place, while a full rotation always stamps a new version.
/// Historical versions stay readable for verification against older sets.
#[cw_serde]
pub struct SignerSet {
    /// Monotonic version counter, starting at 1
    pub version: u64,
    /// Signer identities (20-byte recovered addresses)
    pub signers: Vec<[u8; 20]>,
    /// Number of unique valid signatures required
    pub threshold: u32,
    /// Block time this version became current
    pub activated_at: Timestamp,
}

// ============================================================================
// Challenge Verifier
// ============================================================================

/// Lifecycle of a bridge request
#[cw_serde]
pub enum RequestStatus {
    /// Inside the challenge window, not yet disputed
    Pending,
    /// Finalized optimistically or after a failed challenge
    Approved,
    /// Disputed; awaiting adjudication
    Challenged,
    /// Funds released by the executor (terminal)
    Executed,
    /// Challenge upheld; transfer refunded (terminal)
    Refunded,
    /// Administratively cancelled (terminal)
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Challenged => "challenged",
            RequestStatus::Executed => "executed",
            RequestStatus::Refunded => "refunded",
            RequestStatus::Cancelled => "cancelled",
        }
    }
}

/// Bridge request record (keyed by 32-byte request id)
#[cw_serde]
pub struct BridgeRequest {
    /// Sender account on the source chain (32 bytes)
    pub sender: [u8; 32],
    /// Recipient account on the target chain (32 bytes)
    pub recipient: [u8; 32],
    /// Token identifier (32 bytes)
    pub token: [u8; 32],
    /// Transfer amount in the token's smallest unit
    pub amount: Uint128,
    /// Source chain id
    pub src_chain_id: u64,
    /// Target chain id
    pub dest_chain_id: u64,
    /// Block time of submission
    pub submitted_at: Timestamp,
    /// End of the challenge window
    pub challenge_deadline: Timestamp,
    /// Current lifecycle state
    pub status: RequestStatus,
}

/// Challenge record, one-to-one with a challenged request
#[cw_serde]
pub struct Challenge {
    /// Who opened the challenge
    pub challenger: Addr,
    /// Bond deposited in the configured bond denom
    pub bond: Uint128,
    /// Free-text reason supplied by the challenger
    pub reason: String,
    /// Block time the challenge was opened
    pub challenged_at: Timestamp,
    /// Whether the challenge has been adjudicated
    pub resolved: bool,
}

// ============================================================================
// Fraud Adjudicator
// ============================================================================

/// Fraud claim classification
#[cw_serde]
pub enum FraudKind {
    /// Embedded transfer fails signature verification
    InvalidSignature,
    /// Same input spent in two distinct transactions
    DoubleSpend,
    /// Source, target, and expected amounts disagree
    InvalidAmount,
    /// Token not authorized for the claimed chain
    InvalidToken,
    /// Nonce already consumed by a prior transaction
    Replay,
}

impl FraudKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FraudKind::InvalidSignature => "invalid_signature",
            FraudKind::DoubleSpend => "double_spend",
            FraudKind::InvalidAmount => "invalid_amount",
            FraudKind::InvalidToken => "invalid_token",
            FraudKind::Replay => "replay",
        }
    }
}

/// Fraud proof record (keyed by disputed request id)
///
/// Only the keccak commitment of the payload is stored; verification must
/// re-present the exact committed bytes or it is rejected.
#[cw_serde]
pub struct ProofRecord {
    /// Who submitted the proof
    pub submitter: Addr,
    /// Claimed fraud kind
    pub kind: FraudKind,
    /// keccak256 of the full proof payload
    pub commitment: [u8; 32],
    /// Block time of submission
    pub submitted_at: Timestamp,
    /// Whether verification has run
    pub verified: bool,
    /// Verdict, meaningful once verified
    pub fraud_proven: bool,
}

// ============================================================================
// Volume Limiter
// ============================================================================

/// USD-denominated volume ceilings (1e18-scaled; zero = unlimited)
#[cw_serde]
pub struct VolumeLimits {
    /// Maximum USD value per single transfer
    pub max_transfer_usd: Uint128,
    /// Maximum accumulated USD value per hourly window
    pub hourly_limit_usd: Uint128,
    /// Maximum accumulated USD value per daily window
    pub daily_limit_usd: Uint128,
}

/// Per-token admission parameters
#[cw_serde]
pub struct TokenVolumeConfig {
    /// Whether the token may be admitted at all
    pub supported: bool,
    /// USD price per whole token, 1e18-scaled, supplied by the oracle
    pub usd_price: Uint128,
    /// Token decimal precision on its source chain
    pub decimals: u8,
    /// Per-token override of the global ceilings
    pub custom_limits: Option<VolumeLimits>,
}

/// Sliding volume window; reset is lazy, computed on access
#[cw_serde]
pub struct VolumeWindow {
    /// Accumulated USD value in the current window
    pub volume_usd: Uint128,
    /// Block time the current window started
    pub window_start: Timestamp,
    /// Transfers accounted in the current window
    pub tx_count: u64,
}

/// Alerting and auto-pause controls for the limiter
#[cw_serde]
pub struct VolumeControls {
    /// Usage fraction (basis points) at which an alert fires
    pub alert_threshold_bps: u32,
    /// Usage fraction (basis points) at which the limiter self-pauses
    pub auto_pause_threshold_bps: u32,
    /// One-way pause flag; cleared only by administrative resume
    pub paused: bool,
}

// ============================================================================
// Guardian Council
// ============================================================================

/// System-wide pause flag with attribution
#[cw_serde]
pub struct PauseState {
    pub paused: bool,
    /// Guardian that triggered the pause, if paused
    pub triggered_by: Option<Addr>,
    /// Block time the pause was triggered, if paused
    pub paused_at: Option<Timestamp>,
}

/// Governance action carried by a proposal
#[cw_serde]
pub enum ProposalAction {
    /// Clear the system-wide pause flag
    Unpause {},
    /// Flag an address (local or hex-encoded cross-chain value)
    Blacklist { address: String },
    /// Clear a blacklist flag
    Whitelist { address: String },
    /// Opaque configuration call against a target contract
    UpdateConfig { target: String, payload: Binary },
    /// Opaque recovery call against a target contract
    Recover { target: String, payload: Binary },
    /// Add a guardian to the roster
    AddGuardian { address: String },
    /// Remove a guardian from the roster
    RemoveGuardian { address: String },
    /// Update the approval threshold
    UpdateGuardianThreshold { threshold: u32 },
}

impl ProposalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalAction::Unpause {} => "unpause",
            ProposalAction::Blacklist { .. } => "blacklist",
            ProposalAction::Whitelist { .. } => "whitelist",
            ProposalAction::UpdateConfig { .. } => "update_config",
            ProposalAction::Recover { .. } => "recover",
            ProposalAction::AddGuardian { .. } => "add_guardian",
            ProposalAction::RemoveGuardian { .. } => "remove_guardian",
            ProposalAction::UpdateGuardianThreshold { .. } => "update_threshold",
        }
    }
}

/// Proposal lifecycle
#[cw_serde]
pub enum ProposalStatus {
    Pending,
    Approved,
    Executed,
    Cancelled,
    Expired,
}

impl ProposalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStatus::Pending => "pending",
            ProposalStatus::Approved => "approved",
            ProposalStatus::Executed => "executed",
            ProposalStatus::Cancelled => "cancelled",
            ProposalStatus::Expired => "expired",
        }
    }
}

/// Governance proposal (keyed by id)
#[cw_serde]
pub struct Proposal {
    pub id: u64,
    pub action: ProposalAction,
    pub proposer: Addr,
    /// Approval count; the proposer's approval is counted at creation
    pub approvals: u32,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    pub status: ProposalStatus,
}

// ============================================================================
// Constants
// ============================================================================

/// Contract name for cw2 migration info
pub const CONTRACT_NAME: &str = "crates.io:bridge-sentinel";

/// Contract version for cw2 migration info
pub const CONTRACT_VERSION: &str = "0.1.0";

/// Default challenge window: 6 hours
pub const DEFAULT_CHALLENGE_PERIOD: u64 = 21_600;

/// Allowed challenge window range (1 hour to 7 days)
pub const MIN_CHALLENGE_PERIOD: u64 = 3_600;
pub const MAX_CHALLENGE_PERIOD: u64 = 604_800;

/// Fraud proofs expire this long after submission (7 days)
pub const PROOF_TTL: u64 = 604_800;

/// Minimum interval between signer-set rotations (24 hours)
pub const ROTATION_COOLDOWN: u64 = 86_400;

/// Proposals expire this long after creation (7 days)
pub const PROPOSAL_TTL: u64 = 604_800;

/// 7 days in seconds for admin change timelock
pub const ADMIN_TIMELOCK_DURATION: u64 = 604_800;

/// Signer set may never shrink below this
pub const MIN_SIGNERS: usize = 1;

/// Guardian roster may never shrink below this
pub const MIN_GUARDIANS: u32 = 3;

/// Volume window lengths in seconds
pub const HOURLY_WINDOW: u64 = 3_600;
pub const DAILY_WINDOW: u64 = 86_400;

/// Default usage thresholds in basis points
pub const DEFAULT_ALERT_THRESHOLD_BPS: u32 = 8_000;
pub const DEFAULT_AUTO_PAUSE_THRESHOLD_BPS: u32 = 9_500;

/// Fixed-point scale for USD prices and values
pub const USD_PRECISION: u128 = 1_000_000_000_000_000_000;

// ============================================================================
// Core State Storage
// ============================================================================

/// Primary config storage
pub const CONFIG: Item<Config> = Item::new("config");

/// Pending admin proposal (if any)
pub const PENDING_ADMIN: Item<PendingAdmin> = Item::new("pending_admin");

/// Core statistics
pub const STATS: Item<SecurityStats> = Item::new("stats");

// ============================================================================
// Signature Validator State
// ============================================================================

/// Append-only signer set snapshots
/// Key: version, Value: SignerSet
pub const SIGNER_SETS: Map<u64, SignerSet> = Map::new("signer_sets");

/// Version of the currently active signer set
pub const CURRENT_SET_VERSION: Item<u64> = Item::new("current_set_version");

/// Block time of the last wholesale rotation (v1 activation counts)
pub const LAST_ROTATION: Item<Timestamp> = Item::new("last_rotation");

/// Consumed nonces per sender
/// Key: (sender value as &[u8], nonce), Value: true if consumed
pub const USED_NONCES: Map<(&[u8], u64), bool> = Map::new("used_nonces");

// ============================================================================
// Challenge Verifier State
// ============================================================================

/// Bridge requests indexed by 32-byte request id
pub const REQUESTS: Map<&[u8], BridgeRequest> = Map::new("requests");

/// Challenges indexed by 32-byte request id
pub const CHALLENGES: Map<&[u8], Challenge> = Map::new("challenges");

// ============================================================================
// Fraud Adjudicator State
// ============================================================================

/// Fraud proofs indexed by 32-byte request id (one slot per request)
pub const PROOFS: Map<&[u8], ProofRecord> = Map::new("proofs");

/// Global count of proven fraud verdicts
pub const FRAUD_COUNT: Item<u64> = Item::new("fraud_count");

/// Tokens authorized per chain, for invalid-token adjudication
/// Key: (chain id, token value as &[u8]), Value: true if authorized
pub const CHAIN_TOKENS: Map<(u64, &[u8]), bool> = Map::new("chain_tokens");

// ============================================================================
// Volume Limiter State
// ============================================================================

/// Global USD ceilings (applied when a token has no override)
pub const GLOBAL_LIMITS: Item<VolumeLimits> = Item::new("global_limits");

/// Per-token admission parameters
/// Key: 32-byte token value as &[u8], Value: TokenVolumeConfig
pub const VOLUME_TOKENS: Map<&[u8], TokenVolumeConfig> = Map::new("volume_tokens");

/// Hourly accumulation window
pub const HOURLY_USAGE: Item<VolumeWindow> = Item::new("hourly_usage");

/// Daily accumulation window
pub const DAILY_USAGE: Item<VolumeWindow> = Item::new("daily_usage");

/// Alert/auto-pause thresholds and the limiter pause flag
pub const VOLUME_CONTROLS: Item<VolumeControls> = Item::new("volume_controls");

// ============================================================================
// Guardian Council State
// ============================================================================

/// Guardian roster
/// Key: guardian address, Value: whether active
pub const GUARDIANS: Map<&Addr, bool> = Map::new("guardians");

/// Number of active guardians
pub const GUARDIAN_COUNT: Item<u32> = Item::new("guardian_count");

/// Approvals required for a proposal to become executable
pub const GUARDIAN_THRESHOLD: Item<u32> = Item::new("guardian_threshold");

/// System-wide pause flag
pub const PAUSE_STATE: Item<PauseState> = Item::new("pause_state");

/// Governance proposals indexed by id
pub const PROPOSALS: Map<u64, Proposal> = Map::new("proposals");

/// Next proposal id to assign
pub const NEXT_PROPOSAL_ID: Item<u64> = Item::new("next_proposal_id");

/// Per-guardian approval markers
/// Key: (proposal id, guardian address), Value: true if approved
pub const PROPOSAL_APPROVALS: Map<(u64, &Addr), bool> = Map::new("proposal_approvals");

/// Blacklisted address flags
/// Key: normalized address string, Value: true if blacklisted
pub const BLACKLIST: Map<&str, bool> = Map::new("blacklist");
