//! ChallengeVerifier integration tests.
//!
//! Covers the full optimistic-verification lifecycle:
//! - Submit -> optimistic approve -> executed
//! - Challenge under bond, adjudicated refund (bond + reward)
//! - Failed challenge (bond forfeited)
//! - Administrative cancellation with bond refund
//! - Terminal-state closure and authorization edges

use cosmwasm_std::{coins, Addr, Binary, Uint128};
use cw_multi_test::{App, ContractWrapper, Executor};

use sentinel::msg::{
    ChallengeResponse, ExecuteMsg, InstantiateMsg, QueryMsg, RequestResponse,
    SecurityStatsResponse, TransferRequest,
};
use sentinel::state::RequestStatus;

// ============================================================================
// Test Setup
// ============================================================================

const BOND: u128 = 1_000_000;
const REWARD: u128 = 500_000;
const CHALLENGE_PERIOD: u64 = 21_600; // 6 hours

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
    adjudicator: Addr,
    challenger: Addr,
}

fn setup() -> TestEnv {
    let mut app = App::default();
    let admin = Addr::unchecked("terra1admin");
    let executor = Addr::unchecked("terra1executor");
    let adjudicator = Addr::unchecked("terra1adjudicator");
    let challenger = Addr::unchecked("terra1challenger");

    app.init_modules(|router, _, storage| {
        router
            .bank
            .init_balance(storage, &admin, coins(10_000_000_000, "uluna"))
            .unwrap();
        router
            .bank
            .init_balance(storage, &challenger, coins(10_000_000_000, "uluna"))
            .unwrap();
    });

    let code_id = app.store_code(contract_sentinel());
    let contract_addr = app
        .instantiate_contract(
            code_id,
            admin.clone(),
            &InstantiateMsg {
                admin: admin.to_string(),
                executor: executor.to_string(),
                adjudicator: adjudicator.to_string(),
                oracle: "terra1oracle".to_string(),
                signers: vec![format!("0x{}", "11".repeat(20))],
                signer_threshold: 1,
                guardians: vec![
                    "terra1guard1".to_string(),
                    "terra1guard2".to_string(),
                    "terra1guard3".to_string(),
                ],
                guardian_threshold: 2,
                bond_denom: "uluna".to_string(),
                min_challenge_bond: Uint128::new(BOND),
                challenger_reward: Uint128::new(REWARD),
                challenge_period: Some(CHALLENGE_PERIOD),
                max_transfer_usd: Uint128::zero(),
                hourly_limit_usd: Uint128::zero(),
                daily_limit_usd: Uint128::zero(),
            },
            // Seed the reward pool so winning challengers can be paid
            &coins(100_000_000, "uluna"),
            "sentinel",
            Some(admin.to_string()),
        )
        .unwrap();

    TestEnv {
        app,
        contract_addr,
        admin,
        executor,
        adjudicator,
        challenger,
    }
}

fn make_request(id_byte: u8) -> TransferRequest {
    TransferRequest {
        request_id: Binary::from([id_byte; 32].to_vec()),
        sender: Binary::from([0xAAu8; 32].to_vec()),
        recipient: Binary::from([0xBBu8; 32].to_vec()),
        token: Binary::from([0xCCu8; 32].to_vec()),
        amount: Uint128::new(100),
        src_chain_id: 56,
        dest_chain_id: 1,
    }
}

fn submit(env: &mut TestEnv, id_byte: u8) {
    env.app
        .execute_contract(
            env.executor.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::SubmitRequest {
                request: make_request(id_byte),
            },
            &[],
        )
        .unwrap();
}

fn query_status(env: &TestEnv, id_byte: u8) -> RequestStatus {
    let response: RequestResponse = env
        .app
        .wrap()
        .query_wasm_smart(
            &env.contract_addr,
            &QueryMsg::Request {
                request_id: Binary::from([id_byte; 32].to_vec()),
            },
        )
        .unwrap();
    response.status
}

fn balance(env: &TestEnv, addr: &Addr) -> u128 {
    env.app
        .wrap()
        .query_balance(addr, "uluna")
        .unwrap()
        .amount
        .u128()
}

// ============================================================================
// Submission
// ============================================================================

#[test]
fn test_submit_starts_challenge_window() {
    let mut env = setup();
    let submitted_at = env.app.block_info().time.seconds();
    submit(&mut env, 0x01);

    let response: RequestResponse = env
        .app
        .wrap()
        .query_wasm_smart(
            &env.contract_addr,
            &QueryMsg::Request {
                request_id: Binary::from([0x01u8; 32].to_vec()),
            },
        )
        .unwrap();
    assert_eq!(response.status, RequestStatus::Pending);
    assert_eq!(
        response.challenge_deadline.seconds(),
        submitted_at + CHALLENGE_PERIOD
    );
    assert_eq!(response.challenge_window_remaining, CHALLENGE_PERIOD);

    let stats: SecurityStatsResponse = env
        .app
        .wrap()
        .query_wasm_smart(&env.contract_addr, &QueryMsg::SecurityStats {})
        .unwrap();
    assert_eq!(stats.total_requests, 1);
}

#[test]
fn test_submit_rejects_duplicate_id() {
    let mut env = setup();
    submit(&mut env, 0x01);

    let err = env
        .app
        .execute_contract(
            env.executor.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::SubmitRequest {
                request: make_request(0x01),
            },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("already exists"));
}

#[test]
fn test_submit_rejects_non_executor_and_zero_amount() {
    let mut env = setup();

    let err = env
        .app
        .execute_contract(
            Addr::unchecked("terra1stranger"),
            env.contract_addr.clone(),
            &ExecuteMsg::SubmitRequest {
                request: make_request(0x01),
            },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("bridge executor"));

    let mut request = make_request(0x02);
    request.amount = Uint128::zero();
    let err = env
        .app
        .execute_contract(
            env.executor.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::SubmitRequest { request },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("greater than zero"));
}

// ============================================================================
// Optimistic Path
// ============================================================================

#[test]
fn test_optimistic_approve_and_execute() {
    let mut env = setup();
    submit(&mut env, 0x01);

    // Too early: the window is still open
    let err = env
        .app
        .execute_contract(
            Addr::unchecked("terra1anyone"),
            env.contract_addr.clone(),
            &ExecuteMsg::ApproveRequest {
                request_id: Binary::from([0x01u8; 32].to_vec()),
            },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("still open"));

    // No auto-transition at the deadline: state stays Pending until the call
    env.app.update_block(|block| {
        block.time = block.time.plus_seconds(CHALLENGE_PERIOD);
    });
    assert_eq!(query_status(&env, 0x01), RequestStatus::Pending);

    env.app
        .execute_contract(
            Addr::unchecked("terra1anyone"),
            env.contract_addr.clone(),
            &ExecuteMsg::ApproveRequest {
                request_id: Binary::from([0x01u8; 32].to_vec()),
            },
            &[],
        )
        .unwrap();
    assert_eq!(query_status(&env, 0x01), RequestStatus::Approved);

    env.app
        .execute_contract(
            env.executor.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::MarkExecuted {
                request_id: Binary::from([0x01u8; 32].to_vec()),
            },
            &[],
        )
        .unwrap();
    assert_eq!(query_status(&env, 0x01), RequestStatus::Executed);

    // Executed is terminal: a second call is rejected
    let err = env
        .app
        .execute_contract(
            env.executor.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::MarkExecuted {
                request_id: Binary::from([0x01u8; 32].to_vec()),
            },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("not approved"));
}

// ============================================================================
// Challenge Path
// ============================================================================

#[test]
fn test_challenge_requires_bond_and_open_window() {
    let mut env = setup();
    submit(&mut env, 0x01);

    // Bond below the minimum
    let err = env
        .app
        .execute_contract(
            env.challenger.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ChallengeRequest {
                request_id: Binary::from([0x01u8; 32].to_vec()),
                reason: "bad".to_string(),
            },
            &coins(BOND - 1, "uluna"),
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("Insufficient bond"));

    // Window closed
    submit(&mut env, 0x02);
    env.app.update_block(|block| {
        block.time = block.time.plus_seconds(CHALLENGE_PERIOD);
    });
    let err = env
        .app
        .execute_contract(
            env.challenger.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ChallengeRequest {
                request_id: Binary::from([0x02u8; 32].to_vec()),
                reason: "bad".to_string(),
            },
            &coins(BOND, "uluna"),
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("window closed"));
}

/// Scenario: submit; challenge at t+5h under a 6h window; a proven verdict
/// refunds the transfer and pays the challenger bond + reward.
#[test]
fn test_winning_challenge_pays_bond_plus_reward() {
    let mut env = setup();
    submit(&mut env, 0x01);

    env.app.update_block(|block| {
        block.time = block.time.plus_seconds(5 * 3_600);
    });

    let before = balance(&env, &env.challenger);
    env.app
        .execute_contract(
            env.challenger.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ChallengeRequest {
                request_id: Binary::from([0x01u8; 32].to_vec()),
                reason: "double spend on source chain".to_string(),
            },
            &coins(BOND, "uluna"),
        )
        .unwrap();
    assert_eq!(query_status(&env, 0x01), RequestStatus::Challenged);
    assert_eq!(balance(&env, &env.challenger), before - BOND);

    let challenge: Option<ChallengeResponse> = env
        .app
        .wrap()
        .query_wasm_smart(
            &env.contract_addr,
            &QueryMsg::Challenge {
                request_id: Binary::from([0x01u8; 32].to_vec()),
            },
        )
        .unwrap();
    let challenge = challenge.unwrap();
    assert_eq!(challenge.bond, Uint128::new(BOND));
    assert!(!challenge.resolved);

    env.app
        .execute_contract(
            env.adjudicator.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ResolveChallenge {
                request_id: Binary::from([0x01u8; 32].to_vec()),
                fraud_proven: true,
            },
            &[],
        )
        .unwrap();

    assert_eq!(query_status(&env, 0x01), RequestStatus::Refunded);
    assert_eq!(balance(&env, &env.challenger), before + REWARD);

    let stats: SecurityStatsResponse = env
        .app
        .wrap()
        .query_wasm_smart(&env.contract_addr, &QueryMsg::SecurityStats {})
        .unwrap();
    assert_eq!(stats.challenges_upheld, 1);
}

#[test]
fn test_losing_challenge_forfeits_bond() {
    let mut env = setup();
    submit(&mut env, 0x01);

    let before = balance(&env, &env.challenger);
    env.app
        .execute_contract(
            env.challenger.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ChallengeRequest {
                request_id: Binary::from([0x01u8; 32].to_vec()),
                reason: "spurious".to_string(),
            },
            &coins(BOND, "uluna"),
        )
        .unwrap();

    env.app
        .execute_contract(
            env.adjudicator.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ResolveChallenge {
                request_id: Binary::from([0x01u8; 32].to_vec()),
                fraud_proven: false,
            },
            &[],
        )
        .unwrap();

    // Challenge failed: request approved, bond kept by the protocol
    assert_eq!(query_status(&env, 0x01), RequestStatus::Approved);
    assert_eq!(balance(&env, &env.challenger), before - BOND);

    let stats: SecurityStatsResponse = env
        .app
        .wrap()
        .query_wasm_smart(&env.contract_addr, &QueryMsg::SecurityStats {})
        .unwrap();
    assert_eq!(stats.challenges_rejected, 1);
    assert_eq!(stats.bonds_forfeited, Uint128::new(BOND));
}

#[test]
fn test_resolve_requires_adjudicator_and_is_single_shot() {
    let mut env = setup();
    submit(&mut env, 0x01);
    env.app
        .execute_contract(
            env.challenger.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ChallengeRequest {
                request_id: Binary::from([0x01u8; 32].to_vec()),
                reason: "bad".to_string(),
            },
            &coins(BOND, "uluna"),
        )
        .unwrap();

    let err = env
        .app
        .execute_contract(
            Addr::unchecked("terra1stranger"),
            env.contract_addr.clone(),
            &ExecuteMsg::ResolveChallenge {
                request_id: Binary::from([0x01u8; 32].to_vec()),
                fraud_proven: true,
            },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("adjudicator"));

    env.app
        .execute_contract(
            env.adjudicator.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ResolveChallenge {
                request_id: Binary::from([0x01u8; 32].to_vec()),
                fraud_proven: true,
            },
            &[],
        )
        .unwrap();

    // Already refunded: no re-resolution
    let err = env
        .app
        .execute_contract(
            env.adjudicator.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ResolveChallenge {
                request_id: Binary::from([0x01u8; 32].to_vec()),
                fraud_proven: false,
            },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("not challenged"));
}

#[test]
fn test_challenged_request_cannot_be_optimistically_approved() {
    let mut env = setup();
    submit(&mut env, 0x01);
    env.app
        .execute_contract(
            env.challenger.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ChallengeRequest {
                request_id: Binary::from([0x01u8; 32].to_vec()),
                reason: "bad".to_string(),
            },
            &coins(BOND, "uluna"),
        )
        .unwrap();

    env.app.update_block(|block| {
        block.time = block.time.plus_seconds(CHALLENGE_PERIOD);
    });

    let err = env
        .app
        .execute_contract(
            Addr::unchecked("terra1anyone"),
            env.contract_addr.clone(),
            &ExecuteMsg::ApproveRequest {
                request_id: Binary::from([0x01u8; 32].to_vec()),
            },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("not pending"));
}

// ============================================================================
// Cancellation
// ============================================================================

#[test]
fn test_cancel_pending_request() {
    let mut env = setup();
    submit(&mut env, 0x01);

    env.app
        .execute_contract(
            env.admin.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::CancelRequest {
                request_id: Binary::from([0x01u8; 32].to_vec()),
                reason: "operator error".to_string(),
            },
            &[],
        )
        .unwrap();
    assert_eq!(query_status(&env, 0x01), RequestStatus::Cancelled);

    // Terminal: nothing moves a cancelled request
    env.app.update_block(|block| {
        block.time = block.time.plus_seconds(CHALLENGE_PERIOD);
    });
    let err = env
        .app
        .execute_contract(
            Addr::unchecked("terra1anyone"),
            env.contract_addr.clone(),
            &ExecuteMsg::ApproveRequest {
                request_id: Binary::from([0x01u8; 32].to_vec()),
            },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("not pending"));
}

#[test]
fn test_cancel_challenged_request_refunds_bond() {
    let mut env = setup();
    submit(&mut env, 0x01);

    let before = balance(&env, &env.challenger);
    env.app
        .execute_contract(
            env.challenger.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::ChallengeRequest {
                request_id: Binary::from([0x01u8; 32].to_vec()),
                reason: "bad".to_string(),
            },
            &coins(BOND, "uluna"),
        )
        .unwrap();

    env.app
        .execute_contract(
            env.admin.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::CancelRequest {
                request_id: Binary::from([0x01u8; 32].to_vec()),
                reason: "request withdrawn".to_string(),
            },
            &[],
        )
        .unwrap();

    // Bond returned without reward: the challenger lost nothing
    assert_eq!(query_status(&env, 0x01), RequestStatus::Cancelled);
    assert_eq!(balance(&env, &env.challenger), before);
}

#[test]
fn test_cancel_rejects_terminal_states_and_non_admin() {
    let mut env = setup();
    submit(&mut env, 0x01);

    let err = env
        .app
        .execute_contract(
            env.executor.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::CancelRequest {
                request_id: Binary::from([0x01u8; 32].to_vec()),
                reason: "nope".to_string(),
            },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("only admin"));

    env.app.update_block(|block| {
        block.time = block.time.plus_seconds(CHALLENGE_PERIOD);
    });
    env.app
        .execute_contract(
            Addr::unchecked("terra1anyone"),
            env.contract_addr.clone(),
            &ExecuteMsg::ApproveRequest {
                request_id: Binary::from([0x01u8; 32].to_vec()),
            },
            &[],
        )
        .unwrap();

    // Approved is not cancellable
    let err = env
        .app
        .execute_contract(
            env.admin.clone(),
            env.contract_addr.clone(),
            &ExecuteMsg::CancelRequest {
                request_id: Binary::from([0x01u8; 32].to_vec()),
                reason: "too late".to_string(),
            },
            &[],
        )
        .unwrap_err()
        .root_cause()
        .to_string();
    assert!(err.contains("cannot be cancelled"));
}
