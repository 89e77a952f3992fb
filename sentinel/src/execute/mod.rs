//! Execute handlers for the Sentinel security core.
//!
//! One module per component, plus admin operations:
//! - `signer` - SignatureValidator: quorum verification, rotation, nonces
//! - `challenge` - ChallengeVerifier: request lifecycle state machine
//! - `fraud` - FraudAdjudicator: proof submission and verdict dispatch
//! - `volume` - VolumeLimiter: USD ceilings, windows, auto-pause
//! - `guardian` - GuardianCouncil: emergency pause and quorum governance
//! - `admin` - Admin transfer, role re-pointing, challenge economics

mod admin;
mod challenge;
mod fraud;
mod guardian;
mod signer;
mod volume;

pub use admin::*;
pub use challenge::*;
pub use fraud::*;
pub use guardian::*;
pub use signer::*;
pub use volume::*;
