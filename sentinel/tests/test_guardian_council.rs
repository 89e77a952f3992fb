//! GuardianCouncil integration tests.
//!
//! Covers the two authorization paths:
//! - Single-guardian emergency pause (with best-effort executor relay)
//! - Quorum governance: propose/approve/execute, expiry, cancellation,
//!   roster changes under invariants, owner bypass operations
//! Plus the admin-transfer timelock.

use cosmwasm_std::{Addr, Binary, Uint128};
use cw_multi_test::{App, ContractWrapper, Executor};

use sentinel::msg::{
    ExecuteMsg, GuardiansResponse, InstantiateMsg, IsBlacklistedResponse, PauseStateResponse,
    ProposalResponse, QueryMsg, TransferRequest,
};
use sentinel::state::{ProposalAction, ProposalStatus};

// ============================================================================
// Test Setup
// ============================================================================

fn contract_sentinel() -> Box<dyn cw_multi_test::Contract<cosmwasm_std::Empty>> {
    let contract = ContractWrapper::new(
        sentinel::contract::execute,
        sentinel::contract::instantiate,
        sentinel::contract::query,
    )
    .with_reply(sentinel::contract::reply);
    Box::new(contract)
}

struct TestEnv {
    app: App,
    contract_addr: Addr,
    admin: Addr,
    executor: Addr,
    guardians: Vec<Addr>,
}

/// Five guardians, threshold 3 (scenario D shape).
fn setup() -> TestEnv {
    let mut app = App::default();
    let admin = Addr::unchecked("terra1admin");
    let executor = Addr::unchecked("terra1executor");
    let guardians: Vec<Addr> = (1..=5)
        .map(|i| Addr::unchecked(format!("terra1guard{i}")))
        .collect();

    let code_id = app.store_code(contract_sentinel());
    let contract_addr = app
        .instantiate_contract(
            code_id,
            admin.clone(),
            &InstantiateMsg {
                admin: admin.to_string(),
                executor: executor.to_string(),
                adjudicator: "terra1adjudicator".to_string(),
                oracle: "terra1oracle".to_string(),
                signers: vec![format!("0x{}", "11".repeat(20))],
                signer_threshold: 1,
                guardians: guardians.iter().map(|g| g.to_string()).collect(),
                guardian_threshold: 3,
                bond_denom: "uluna".to_string(),
                min_challenge_bond: Uint128::new(1_000_000),
                challenger_reward: Uint128::new(500_000),
                challenge_period: None,
                max_transfer_usd: Uint128::zero(),
                hourly_limit_usd: Uint128::zero(),
                daily_limit_usd: Uint128::zero(),
            },
            &[],
            "sentinel",
            Some(admin.to_string()),
        )
        .unwrap();

    TestEnv {
        app,
        contract_addr,
        admin,
        executor,
        guardians,
    }
}

fn pause_state(env: &TestEnv) -> PauseStateResponse {
    env.app
        .wrap()
        .query_wasm_smart(&env.contract_addr, &QueryMsg::PauseState {})
        .unwrap()
}

fn propose(env: &mut TestEnv, proposer: usize, action: ProposalAction) -> u64 {
    let response = env
        .app
        .execute_contract(
            env.guardians[proposer].clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::Propose { action },
            &[],
        )
        .unwrap();
    response
        .events
        .iter()
        .filter(|event| event.ty == "wasm")
        .flat_map(|event| event.attributes.iter())
        .find(|attr| attr.key == "proposal_id")
        .map(|attr| attr.value.parse().unwrap())
        .unwrap()
}

fn approve(env: &mut TestEnv, approver: usize, proposal_id: u64) {
    env.app
        .execute_contract(
            env.guardians[approver].clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ApproveProposal { proposal_id },
            &[],
        )
        .unwrap();
}

fn execute_proposal(env: &mut TestEnv, executor_idx: usize, proposal_id: u64) {
    env.app
        .execute_contract(
            env.guardians[executor_idx].clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ExecuteProposal { proposal_id },
            &[],
        )
        .unwrap();
}

fn query_proposal(env: &TestEnv, proposal_id: u64) -> ProposalResponse {
    env.app
        .wrap()
        .query_wasm_smart(&env.contract_addr, &QueryMsg::Proposal { proposal_id })
        .unwrap()
}

fn submit_request(env: &mut TestEnv, id_byte: u8) -> anyhow::Result<cw_multi_test::AppResponse> {
    env.app.execute_contract(
        env.executor.clone(),
        env.contract_addr.clone(),
        &ExecuteMsg::SubmitRequest {
            request: TransferRequest {
                request_id: Binary::from([id_byte; 32].to_vec()),
                sender: Binary::from([0xAAu8; 32].to_vec()),
                recipient: Binary::from([0xBBu8; 32].to_vec()),
                token: Binary::from([0xCCu8; 32].to_vec()),
                amount: Uint128::new(100),
                src_chain_id: 56,
                dest_chain_id: 1,
            },
        },
        &[],
    )
}

// ============================================================================
// Emergency Pause
// ============================================================================

#[test]
fn test_single_guardian_pauses_immediately() {
    let mut env = setup();

    // The executor relay target is not a contract here; the relay fails
    // and is logged, but the pause itself must succeed regardless.
    env.app
        .execute_contract(
            env.guardians[0].clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::EmergencyPause {},
            &[],
        )
        .unwrap();

    let state = pause_state(&env);
    assert!(state.paused);
    assert_eq!(state.triggered_by, Some(env.guardians[0].clone()));

    // Forward path is blocked
    let err = submit_request(&mut env, 0x01)
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("System is paused"));

    // Pausing again is rejected
    let err = env
        .app
        .execute_contract(
            env.guardians[1].clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::EmergencyPause {},
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("already paused"));
}

#[test]
fn test_pause_requires_guardian() {
    let mut env = setup();

    let err = env
        .app
        .execute_contract(
            env.admin.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::EmergencyPause {},
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("not a guardian"));
}

#[test]
fn test_unpause_requires_quorum() {
    let mut env = setup();
    env.app
        .execute_contract(
            env.guardians[0].clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::EmergencyPause {},
            &[],
        )
        .unwrap();

    let proposal_id = propose(&mut env, 0, ProposalAction::Unpause {});
    approve(&mut env, 1, proposal_id);
    approve(&mut env, 2, proposal_id);
    execute_proposal(&mut env, 0, proposal_id);

    assert!(!pause_state(&env).paused);
    submit_request(&mut env, 0x01).unwrap();
}

// ============================================================================
// Quorum Governance
// ============================================================================

/// Scenario: 3-of-5 council; proposer auto-approves, two more approvals
/// make the proposal executable; execution flags the address; re-execution
/// hits a terminal-state error.
#[test]
fn test_blacklist_proposal_lifecycle() {
    let mut env = setup();

    let proposal_id = propose(
        &mut env,
        0,
        ProposalAction::Blacklist {
            address: "addrx".to_string(),
        },
    );
    assert_eq!(query_proposal(&env, proposal_id).approvals, 1);

    // Not executable below threshold
    approve(&mut env, 1, proposal_id);
    let err = env
        .app
        .execute_contract(
            env.guardians[0].clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ExecuteProposal { proposal_id },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("not executable"));

    approve(&mut env, 2, proposal_id);
    assert_eq!(
        query_proposal(&env, proposal_id).status,
        ProposalStatus::Approved
    );

    execute_proposal(&mut env, 4, proposal_id);

    let flagged: IsBlacklistedResponse = env
        .app
        .wrap()
        .query_wasm_smart(
            &env.contract_addr,
            &QueryMsg::IsBlacklisted {
                address: "addrx".to_string(),
            },
        )
        .unwrap();
    assert!(flagged.blacklisted);
    assert_eq!(
        query_proposal(&env, proposal_id).status,
        ProposalStatus::Executed
    );

    // Executed is terminal
    let err = env
        .app
        .execute_contract(
            env.guardians[0].clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ExecuteProposal { proposal_id },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("not executable"));
}

#[test]
fn test_blacklisted_sender_is_refused_at_submission() {
    let mut env = setup();

    // Blacklist the hex form of the request sender value
    let sender_hex = format!("0x{}", "aa".repeat(32));
    let proposal_id = propose(
        &mut env,
        0,
        ProposalAction::Blacklist {
            address: sender_hex,
        },
    );
    approve(&mut env, 1, proposal_id);
    approve(&mut env, 2, proposal_id);
    execute_proposal(&mut env, 0, proposal_id);

    let err = submit_request(&mut env, 0x01)
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("blacklisted"));

    // Whitelisting lifts the refusal
    let proposal_id = propose(
        &mut env,
        0,
        ProposalAction::Whitelist {
            address: format!("0x{}", "aa".repeat(32)),
        },
    );
    approve(&mut env, 1, proposal_id);
    approve(&mut env, 2, proposal_id);
    execute_proposal(&mut env, 0, proposal_id);

    submit_request(&mut env, 0x01).unwrap();
}

#[test]
fn test_each_guardian_approves_at_most_once() {
    let mut env = setup();
    let proposal_id = propose(&mut env, 0, ProposalAction::Unpause {});

    // The proposer's approval was auto-counted
    let err = env
        .app
        .execute_contract(
            env.guardians[0].clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ApproveProposal { proposal_id },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("Already approved"));

    approve(&mut env, 1, proposal_id);
    let err = env
        .app
        .execute_contract(
            env.guardians[1].clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ApproveProposal { proposal_id },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("Already approved"));
}

#[test]
fn test_proposals_require_guardian_role() {
    let mut env = setup();

    let err = env
        .app
        .execute_contract(
            Addr::unchecked("terra1stranger"),
            env.contract_addr.clone(),
            &ExecuteMsg::Propose {
                action: ProposalAction::Unpause {},
            },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("not a guardian"));
}

#[test]
fn test_expired_proposal_never_executes() {
    let mut env = setup();
    let proposal_id = propose(&mut env, 0, ProposalAction::Unpause {});
    approve(&mut env, 1, proposal_id);
    approve(&mut env, 2, proposal_id);

    env.app.update_block(|block| {
        block.time = block.time.plus_seconds(604_801);
    });

    let err = env
        .app
        .execute_contract(
            env.guardians[0].clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ExecuteProposal { proposal_id },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("expired"));
    assert_eq!(
        query_proposal(&env, proposal_id).status,
        ProposalStatus::Expired
    );
}

#[test]
fn test_cancelled_proposal_never_executes() {
    let mut env = setup();
    let proposal_id = propose(&mut env, 0, ProposalAction::Unpause {});
    approve(&mut env, 1, proposal_id);
    approve(&mut env, 2, proposal_id);

    // Only the proposer or admin may cancel
    let err = env
        .app
        .execute_contract(
            env.guardians[3].clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::CancelProposal { proposal_id },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("proposer or admin"));

    env.app
        .execute_contract(
            env.guardians[0].clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::CancelProposal { proposal_id },
            &[],
        )
        .unwrap();

    let err = env
        .app
        .execute_contract(
            env.guardians[1].clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ExecuteProposal { proposal_id },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("not executable"));
}

// ============================================================================
// Roster Changes
// ============================================================================

#[test]
fn test_roster_changes_through_quorum() {
    let mut env = setup();

    // Add a sixth guardian
    let proposal_id = propose(
        &mut env,
        0,
        ProposalAction::AddGuardian {
            address: "terra1guard6".to_string(),
        },
    );
    approve(&mut env, 1, proposal_id);
    approve(&mut env, 2, proposal_id);
    execute_proposal(&mut env, 0, proposal_id);

    let roster: GuardiansResponse = env
        .app
        .wrap()
        .query_wasm_smart(&env.contract_addr, &QueryMsg::Guardians {})
        .unwrap();
    assert_eq!(roster.guardians.len(), 6);

    // The new guardian can participate right away
    let proposal_id = propose(
        &mut env,
        0,
        ProposalAction::UpdateGuardianThreshold { threshold: 4 },
    );
    approve(&mut env, 1, proposal_id);
    env.app
        .execute_contract(
            Addr::unchecked("terra1guard6"),
            env.contract_addr.clone(),
            &ExecuteMsg::ApproveProposal { proposal_id },
            &[],
        )
        .unwrap();
    execute_proposal(&mut env, 0, proposal_id);

    let roster: GuardiansResponse = env
        .app
        .wrap()
        .query_wasm_smart(&env.contract_addr, &QueryMsg::Guardians {})
        .unwrap();
    assert_eq!(roster.threshold, 4);
}

#[test]
fn test_threshold_proposal_rejects_invalid_value_at_execution() {
    let mut env = setup();

    let proposal_id = propose(
        &mut env,
        0,
        ProposalAction::UpdateGuardianThreshold { threshold: 9 },
    );
    approve(&mut env, 1, proposal_id);
    approve(&mut env, 2, proposal_id);

    let err = env
        .app
        .execute_contract(
            env.guardians[0].clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ExecuteProposal { proposal_id },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("exceed remaining guardian count"));
}

// ============================================================================
// Owner Bypass
// ============================================================================

#[test]
fn test_owner_bypass_operations() {
    let mut env = setup();

    env.app
        .execute_contract(
            env.admin.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::OwnerAddGuardian {
                address: "terra1guard6".to_string(),
            },
            &[],
        )
        .unwrap();
    env.app
        .execute_contract(
            env.admin.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::OwnerUpdateGuardianThreshold { threshold: 4 },
            &[],
        )
        .unwrap();
    env.app
        .execute_contract(
            env.admin.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::OwnerRemoveGuardian {
                address: "terra1guard6".to_string(),
            },
            &[],
        )
        .unwrap();

    let roster: GuardiansResponse = env
        .app
        .wrap()
        .query_wasm_smart(&env.contract_addr, &QueryMsg::Guardians {})
        .unwrap();
    assert_eq!(roster.guardians.len(), 5);
    assert_eq!(roster.threshold, 4);

    // Strictly owner-only
    let err = env
        .app
        .execute_contract(
            env.guardians[0].clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::OwnerAddGuardian {
                address: "terra1guard7".to_string(),
            },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("only admin"));
}

#[test]
fn test_roster_never_shrinks_below_minimum() {
    let mut env = setup();

    // Lower the threshold so removals are not blocked by it
    env.app
        .execute_contract(
            env.admin.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::OwnerUpdateGuardianThreshold { threshold: 1 },
            &[],
        )
        .unwrap();

    for i in 4..=5 {
        env.app
            .execute_contract(
                env.admin.clone(),
                env.contract_addr.clone(),
                &ExecuteMsg::OwnerRemoveGuardian {
                    address: format!("terra1guard{i}"),
                },
                &[],
            )
            .unwrap();
    }

    // Three guardians left: the floor
    let err = env
        .app
        .execute_contract(
            env.admin.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::OwnerRemoveGuardian {
                address: "terra1guard3".to_string(),
            },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("cannot shrink below"));
}

// ============================================================================
// Admin Transfer
// ============================================================================

#[test]
fn test_admin_transfer_timelock() {
    let mut env = setup();
    let new_admin = Addr::unchecked("terra1newadmin");

    env.app
        .execute_contract(
            env.admin.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ProposeAdmin {
                new_admin: new_admin.to_string(),
            },
            &[],
        )
        .unwrap();

    // Timelock still running
    let err = env
        .app
        .execute_contract(
            new_admin.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::AcceptAdmin {},
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("Timelock not expired"));

    env.app.update_block(|block| {
        block.time = block.time.plus_seconds(604_801);
    });
    env.app
        .execute_contract(
            new_admin.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::AcceptAdmin {},
            &[],
        )
        .unwrap();

    // The new admin now holds the owner powers
    env.app
        .execute_contract(
            new_admin,
            env.contract_addr.clone(),
            &ExecuteMsg::OwnerAddGuardian {
                address: "terra1guard6".to_string(),
            },
            &[],
        )
        .unwrap();
}
