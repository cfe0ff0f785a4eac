//! Integration tests for the governance engine: queue, approvals,
//! timelock, dispatch, and the emergency fast path.

use ember_governance::{
    GovernanceEngine, GovernanceError, TransactionPayload, TransactionStatus, MAX_SIGNERS,
};
use ember_presale::{PresaleError, PresaleState, UNITS_PER_TOKEN};
use ember_shared_types::Address;
use ember_token::{TokenError, TokenLedger};

fn dummy_address(seed: u8) -> Address {
    Address([seed; 32])
}

const NOW: i64 = 1_700_000_000;
const COOLDOWN: i64 = 1_800;

struct Harness {
    engine: GovernanceEngine,
    token: TokenLedger,
    presale: PresaleState,
    signers: [Address; 3],
}

/// Engine with a 2-of-3 roster, both targets wired, and both components
/// handed over to the engine.
fn harness() -> Harness {
    let _ = env_logger::builder().is_test(true).try_init();
    let admin = dummy_address(1);
    let engine_addr = dummy_address(2);
    let signers = [dummy_address(10), dummy_address(11), dummy_address(12)];
    let mut engine =
        GovernanceEngine::new(engine_addr, admin, signers.to_vec(), 2, COOLDOWN).unwrap();
    engine.configure_token_target(&admin).unwrap();
    engine.configure_presale_target(&admin).unwrap();

    let mut token = TokenLedger::new(admin);
    token.hand_over_authority(&admin, engine_addr).unwrap();

    let mut presale = PresaleState::new(admin, UNITS_PER_TOKEN, 0, 0).unwrap();
    presale.set_governance(&admin, engine_addr).unwrap();

    Harness {
        engine,
        token,
        presale,
        signers,
    }
}

/// Queue a payload from the first signer and approve it with two.
fn queue_and_approve(h: &mut Harness, payload: TransactionPayload) -> u64 {
    let id = h.engine.queue(NOW, h.signers[0], payload).unwrap();
    h.engine.approve(h.signers[0], id).unwrap();
    h.engine.approve(h.signers[1], id).unwrap();
    id
}

#[test]
fn roster_validation() {
    let addr = dummy_address(2);
    let admin = dummy_address(1);
    let s = |n: u8| dummy_address(n);

    let dup = vec![s(10), s(10)];
    assert!(matches!(
        GovernanceEngine::new(addr, admin, dup, 1, COOLDOWN).unwrap_err(),
        GovernanceError::DuplicateSigners
    ));

    let oversized: Vec<Address> = (0..=MAX_SIGNERS as u8).map(|n| s(100 + n)).collect();
    assert!(matches!(
        GovernanceEngine::new(addr, admin, oversized, 1, COOLDOWN).unwrap_err(),
        GovernanceError::TooManySigners
    ));

    let three = vec![s(10), s(11), s(12)];
    assert!(matches!(
        GovernanceEngine::new(addr, admin, three.clone(), 0, COOLDOWN).unwrap_err(),
        GovernanceError::InvalidRequiredApprovals
    ));
    assert!(matches!(
        GovernanceEngine::new(addr, admin, three.clone(), 4, COOLDOWN).unwrap_err(),
        GovernanceError::InvalidRequiredApprovals
    ));
    assert!(matches!(
        GovernanceEngine::new(addr, admin, three.clone(), 2, 1_799).unwrap_err(),
        GovernanceError::InvalidCooldownPeriod
    ));
    assert!(matches!(
        GovernanceEngine::new(addr, admin, three.clone(), 2, 2_592_001).unwrap_err(),
        GovernanceError::InvalidCooldownPeriod
    ));

    // 1-of-n is a legal configuration.
    GovernanceEngine::new(addr, admin, three, 1, COOLDOWN).unwrap();
}

#[test]
fn queue_requires_signer_and_configured_target() {
    let mut h = harness();
    let outsider = dummy_address(50);
    assert!(matches!(
        h.engine
            .queue(NOW, outsider, TransactionPayload::Unpause)
            .unwrap_err(),
        GovernanceError::Unauthorized
    ));

    // A fresh engine with no wiring refuses component payloads but still
    // accepts self-targeted ones.
    let admin = dummy_address(1);
    let signers = vec![dummy_address(10)];
    let mut unwired =
        GovernanceEngine::new(dummy_address(2), admin, signers, 1, COOLDOWN).unwrap();
    assert!(matches!(
        unwired
            .queue(NOW, dummy_address(10), TransactionPayload::Unpause)
            .unwrap_err(),
        GovernanceError::TargetNotConfigured
    ));
    assert!(matches!(
        unwired
            .queue(
                NOW,
                dummy_address(10),
                TransactionPayload::WithdrawToTreasury { amount: 1 }
            )
            .unwrap_err(),
        GovernanceError::TargetNotConfigured
    ));
    unwired
        .queue(
            NOW,
            dummy_address(10),
            TransactionPayload::SetCooldownPeriod { seconds: 3_600 },
        )
        .unwrap();
}

#[test]
fn target_wiring_is_one_shot() {
    let mut h = harness();
    let admin = dummy_address(1);
    assert!(matches!(
        h.engine.configure_token_target(&admin).unwrap_err(),
        GovernanceError::TargetAlreadyConfigured
    ));
    assert!(matches!(
        h.engine.configure_presale_target(&dummy_address(50)).unwrap_err(),
        GovernanceError::Unauthorized
    ));
}

#[test]
fn transaction_ids_are_monotonic_from_one() {
    let mut h = harness();
    let first = h
        .engine
        .queue(NOW, h.signers[0], TransactionPayload::Unpause)
        .unwrap();
    let second = h
        .engine
        .queue(
            NOW,
            h.signers[1],
            TransactionPayload::SetWhitelist {
                account: dummy_address(20),
                value: true,
            },
        )
        .unwrap();
    assert_eq!(first, 1);
    assert_eq!(second, 2);
}

#[test]
fn approve_validations_in_order() {
    let mut h = harness();
    let id = h
        .engine
        .queue(NOW, h.signers[0], TransactionPayload::Unpause)
        .unwrap();

    assert!(matches!(
        h.engine.approve(dummy_address(50), id).unwrap_err(),
        GovernanceError::Unauthorized
    ));
    assert!(matches!(
        h.engine.approve(h.signers[0], 99).unwrap_err(),
        GovernanceError::TransactionNotFound
    ));
    h.engine.approve(h.signers[0], id).unwrap();
    assert!(matches!(
        h.engine.approve(h.signers[0], id).unwrap_err(),
        GovernanceError::AlreadyApproved
    ));
    // The initiator got no free approval.
    assert_eq!(h.engine.transaction(id).unwrap().approval_count(), 1);
}

#[test]
fn execute_requires_threshold_regardless_of_cooldown() {
    let mut h = harness();
    let id = h
        .engine
        .queue(NOW, h.signers[0], TransactionPayload::Unpause)
        .unwrap();
    h.engine.approve(h.signers[0], id).unwrap();

    let far_future = NOW + 10 * COOLDOWN;
    assert!(matches!(
        h.engine
            .execute(far_future, id, &mut h.token, &mut h.presale)
            .unwrap_err(),
        GovernanceError::InsufficientApprovals
    ));
}

#[test]
fn execute_respects_cooldown_deadline() {
    let mut h = harness();
    let id = queue_and_approve(
        &mut h,
        TransactionPayload::SetWhitelist {
            account: dummy_address(20),
            value: true,
        },
    );

    assert!(matches!(
        h.engine
            .execute(NOW + COOLDOWN - 1, id, &mut h.token, &mut h.presale)
            .unwrap_err(),
        GovernanceError::CooldownNotElapsed
    ));
    // The deadline itself is executable.
    h.engine
        .execute(NOW + COOLDOWN, id, &mut h.token, &mut h.presale)
        .unwrap();
    assert!(h.token.policy().is_whitelisted(&dummy_address(20)));
}

#[test]
fn queued_blacklist_lands_and_blocks_mint() {
    let mut h = harness();
    let target = dummy_address(20);
    let id = queue_and_approve(
        &mut h,
        TransactionPayload::SetBlacklist {
            account: target,
            value: true,
        },
    );
    h.engine
        .execute(NOW + COOLDOWN, id, &mut h.token, &mut h.presale)
        .unwrap();

    let engine_addr = h.engine.address();
    assert!(matches!(
        h.token.mint(&engine_addr, target, 100).unwrap_err(),
        TokenError::Blacklisted
    ));
}

#[test]
fn transactions_execute_exactly_once() {
    let mut h = harness();
    let id = queue_and_approve(
        &mut h,
        TransactionPayload::SetRestricted {
            account: dummy_address(20),
            value: true,
        },
    );
    h.engine
        .execute(NOW + COOLDOWN, id, &mut h.token, &mut h.presale)
        .unwrap();
    assert_eq!(
        h.engine.transaction(id).unwrap().status,
        TransactionStatus::Executed
    );

    assert!(matches!(
        h.engine
            .execute(NOW + COOLDOWN + 1, id, &mut h.token, &mut h.presale)
            .unwrap_err(),
        GovernanceError::TransactionNotPending
    ));
    // Late approvals bounce too.
    assert!(matches!(
        h.engine.approve(h.signers[2], id).unwrap_err(),
        GovernanceError::TransactionNotPending
    ));
}

#[test]
fn self_targeted_payloads_revalidate_at_execution() {
    let mut h = harness();

    // A threshold above the roster queues fine but refuses to execute,
    // and the transaction stays pending.
    let bad = queue_and_approve(&mut h, TransactionPayload::SetRequiredApprovals { required: 5 });
    assert!(matches!(
        h.engine
            .execute(NOW + COOLDOWN, bad, &mut h.token, &mut h.presale)
            .unwrap_err(),
        GovernanceError::InvalidRequiredApprovals
    ));
    assert_eq!(
        h.engine.transaction(bad).unwrap().status,
        TransactionStatus::Pending
    );

    let good = queue_and_approve(&mut h, TransactionPayload::SetRequiredApprovals { required: 3 });
    h.engine
        .execute(NOW + COOLDOWN, good, &mut h.token, &mut h.presale)
        .unwrap();
    assert_eq!(h.engine.required_approvals(), 3);
}

#[test]
fn cooldown_change_applies_to_later_queues() {
    let mut h = harness();
    let id = queue_and_approve(&mut h, TransactionPayload::SetCooldownPeriod { seconds: 3_600 });
    h.engine
        .execute(NOW + COOLDOWN, id, &mut h.token, &mut h.presale)
        .unwrap();
    assert_eq!(h.engine.cooldown_period(), 3_600);

    let later = NOW + COOLDOWN;
    let next = h
        .engine
        .queue(later, h.signers[0], TransactionPayload::Unpause)
        .unwrap();
    assert_eq!(h.engine.transaction(next).unwrap().execute_after, later + 3_600);
}

#[test]
fn failed_dispatch_leaves_transaction_retryable() {
    let admin = dummy_address(1);
    let engine_addr = dummy_address(2);
    let signers = [dummy_address(10), dummy_address(11)];
    let mut engine =
        GovernanceEngine::new(engine_addr, admin, signers.to_vec(), 2, COOLDOWN).unwrap();
    engine.configure_token_target(&admin).unwrap();
    engine.configure_presale_target(&admin).unwrap();
    let mut token = TokenLedger::new(admin);
    token.hand_over_authority(&admin, engine_addr).unwrap();

    // Fund the vault and set the treasury, but deliberately leave the
    // presale under its deploy admin.
    let pay = dummy_address(40);
    let mut presale = PresaleState::new(admin, UNITS_PER_TOKEN, 0, 0).unwrap();
    presale.allow_payment_token(&admin, pay).unwrap();
    presale.start(&admin).unwrap();
    presale
        .buy(dummy_address(41), pay, 500_000, token.policy(), token.is_paused())
        .unwrap();
    presale.set_treasury_address(&admin, dummy_address(30)).unwrap();

    let id = engine
        .queue(
            NOW,
            signers[0],
            TransactionPayload::WithdrawToTreasury { amount: 200_000 },
        )
        .unwrap();
    engine.approve(signers[0], id).unwrap();
    engine.approve(signers[1], id).unwrap();

    let err = engine
        .execute(NOW + COOLDOWN, id, &mut token, &mut presale)
        .unwrap_err();
    assert!(matches!(err, GovernanceError::Presale(PresaleError::Unauthorized)));
    assert_eq!(
        engine.transaction(id).unwrap().status,
        TransactionStatus::Pending
    );
    assert_eq!(presale.vault_balance(), 500_000);

    // Fix the wiring and retry the same transaction.
    presale.set_governance(&admin, engine_addr).unwrap();
    engine
        .execute(NOW + COOLDOWN + 10, id, &mut token, &mut presale)
        .unwrap();
    assert_eq!(presale.vault_balance(), 300_000);
    assert_eq!(
        engine.transaction(id).unwrap().status,
        TransactionStatus::Executed
    );
}

#[test]
fn zero_address_payload_rejected_at_execution() {
    let mut h = harness();
    let id = queue_and_approve(
        &mut h,
        TransactionPayload::SetLiquidityPool {
            pool: Address::ZERO,
            value: true,
        },
    );
    assert!(matches!(
        h.engine
            .execute(NOW + COOLDOWN, id, &mut h.token, &mut h.presale)
            .unwrap_err(),
        GovernanceError::Token(TokenError::InvalidAddress)
    ));
    assert_eq!(
        h.engine.transaction(id).unwrap().status,
        TransactionStatus::Pending
    );
}

#[test]
fn emergency_pause_fast_path_and_queued_unpause() {
    let mut h = harness();
    let engine_addr = h.engine.address();
    let user = dummy_address(20);
    let other = dummy_address(21);
    h.token.mint(&engine_addr, user, 500).unwrap();

    assert!(matches!(
        h.engine
            .emergency_pause(&dummy_address(50), &mut h.token)
            .unwrap_err(),
        GovernanceError::Unauthorized
    ));

    // Any single signer pauses immediately, no queue, no cooldown.
    h.engine.emergency_pause(&h.signers[2], &mut h.token).unwrap();
    assert!(h.token.is_paused());
    assert!(matches!(
        h.token.transfer(NOW, user, other, 10).unwrap_err(),
        TokenError::EmergencyPaused
    ));

    // Lifting the pause takes the full queue path.
    let id = queue_and_approve(&mut h, TransactionPayload::Unpause);
    h.engine
        .execute(NOW + COOLDOWN, id, &mut h.token, &mut h.presale)
        .unwrap();
    assert!(!h.token.is_paused());
    h.token.transfer(NOW + COOLDOWN, user, other, 10).unwrap();
}

#[test]
fn queued_treasury_address_lands_on_ledger() {
    let mut h = harness();
    let treasury = dummy_address(30);
    let id = queue_and_approve(
        &mut h,
        TransactionPayload::SetTreasuryAddress { address: treasury },
    );
    h.engine
        .execute(NOW + COOLDOWN, id, &mut h.token, &mut h.presale)
        .unwrap();
    assert_eq!(h.token.treasury_address(), Some(treasury));
}

#[test]
fn treasury_withdrawal_through_the_queue() {
    let admin = dummy_address(1);
    let engine_addr = dummy_address(2);
    let signers = [dummy_address(10), dummy_address(11)];
    let mut engine =
        GovernanceEngine::new(engine_addr, admin, signers.to_vec(), 2, COOLDOWN).unwrap();
    engine.configure_token_target(&admin).unwrap();
    engine.configure_presale_target(&admin).unwrap();
    let mut token = TokenLedger::new(admin);
    token.hand_over_authority(&admin, engine_addr).unwrap();

    // Fund the vault and set the treasury before handing the presale over.
    let pay = dummy_address(40);
    let buyer = dummy_address(41);
    let mut presale = PresaleState::new(admin, UNITS_PER_TOKEN, 0, 0).unwrap();
    presale.allow_payment_token(&admin, pay).unwrap();
    presale.start(&admin).unwrap();
    presale
        .buy(buyer, pay, 500_000, token.policy(), token.is_paused())
        .unwrap();
    presale.set_treasury_address(&admin, dummy_address(30)).unwrap();
    presale.set_governance(&admin, engine_addr).unwrap();

    let withdraw = engine
        .queue(
            NOW,
            signers[0],
            TransactionPayload::WithdrawToTreasury { amount: 200_000 },
        )
        .unwrap();
    engine.approve(signers[0], withdraw).unwrap();
    engine.approve(signers[1], withdraw).unwrap();
    engine
        .execute(NOW + COOLDOWN, withdraw, &mut token, &mut presale)
        .unwrap();
    assert_eq!(presale.vault_balance(), 300_000);
}
