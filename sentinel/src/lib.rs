//! Sentinel - Defense-in-Depth Security Core for Cross-Chain Transfers
//!
//! This contract decides, under adversarial conditions, whether a claimed
//! transfer from a source chain may be honored on a target chain. Token
//! custody and transfer execution belong to the bridge executor, which
//! calls into this core at each step of a transfer.
//!
//! # Components
//! - Signature validation: threshold quorum over a versioned signer set,
//!   with per-sender nonce replay protection and self-authorizing rotation
//! - Challenge verification: optimistic state machine with economic bonding
//! - Fraud adjudication: commitment-bound structured proofs per claim kind
//! - Volume limiting: USD ceilings with lazy windows and one-way auto-pause
//! - Guardian council: instant single-guardian pause, quorum governance

pub mod contract;
pub mod error;
mod execute;
pub mod hash;
pub mod msg;
mod query;
pub mod state;

pub use crate::error::ContractError;
pub use crate::hash::{compute_transfer_digest, keccak256};
