//! End-to-end tests of the escrow lifecycle against the in-memory services.
//!
//! Each test builds a fresh world: a settlement ledger, a receipt registry
//! with one minted TDT owned by `owner`, a deposit record for that TDT, and
//! an engine with a fee divisor of 20. Tests cover request, cancel, provide,
//! and the price read, plus atomicity of failed operations.

use turbomint_escrow::EscrowEngine;
use turbomint_ledgers::{
    DepositParameterSource, DepositTerms, InMemoryReceiptRegistry, InMemorySettlementLedger,
    ReceiptRegistry, SettlementLedger, StaticDepositParameters,
};
use turbomint_types::*;

type Engine =
    EscrowEngine<InMemoryReceiptRegistry, InMemorySettlementLedger, StaticDepositParameters>;

const FEE_DIVISOR: u64 = 20;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Test world: engine plus the accounts and TDT the tests act on.
struct World {
    engine: Engine,
    owner: AccountId,
    user: AccountId,
    tdt: TdtId,
}

impl World {
    fn new() -> Self {
        Self::with_terms(DepositTerms::standard(ONE_TBTC))
    }

    fn with_terms(terms: DepositTerms) -> Self {
        init_tracing();

        let tbtc_token = AccountId::random();
        let rebate_token = AccountId::random();
        let tdt_token = AccountId::random();
        let config =
            EngineConfig::new(tbtc_token, rebate_token, tdt_token).with_fee_divisor(FEE_DIVISOR);

        let owner = AccountId::random();
        let user = AccountId::random();
        let deposit = AccountId::random();
        let tdt = TdtId::from_deposit(deposit);

        let mut registry = InMemoryReceiptRegistry::new(tdt_token);
        registry.mint(owner, tdt).expect("mint TDT");
        let mut deposits = StaticDepositParameters::new();
        deposits.insert(tdt, terms);

        let engine = Engine::new(
            AccountId::random(),
            config,
            registry,
            InMemorySettlementLedger::new(tbtc_token),
            deposits,
        )
        .expect("engine construction");

        Self {
            engine,
            owner,
            user,
            tdt,
        }
    }

    fn escrow(&self) -> AccountId {
        self.engine.address()
    }

    fn approve_tdt(&mut self) {
        let escrow = self.escrow();
        self.engine
            .approve_tdt(self.owner, escrow, self.tdt)
            .expect("approve TDT");
    }

    fn request(&mut self) {
        self.approve_tdt();
        self.engine
            .request(self.owner, self.tdt)
            .expect("request should succeed");
    }

    /// Mint `amount` TBTC to the user and approve the engine for `allowance`.
    fn fund_user(&mut self, amount: Amount, allowance: Amount) {
        let escrow = self.escrow();
        self.engine
            .mint_settlement(self.user, amount)
            .expect("mint TBTC");
        self.engine
            .approve_settlement(self.user, escrow, allowance)
            .expect("approve TBTC");
    }

    fn owner_of_tdt(&self) -> AccountId {
        self.engine
            .registry()
            .owner_of(self.tdt)
            .expect("TDT exists")
    }

    fn tbtc(&self, account: AccountId) -> Amount {
        self.engine.ledger().balance_of(account)
    }
}

// =============================================================================
// request
// =============================================================================

#[test]
fn request_transfers_tdt_to_engine() {
    let mut w = World::new();
    w.request();

    assert_eq!(w.owner_of_tdt(), w.escrow());
    assert_eq!(w.engine.order(w.tdt).map(|o| o.requester), Some(w.owner));
    w.engine.audit_custody().unwrap();
}

#[test]
fn request_reverts_if_tdt_not_approved() {
    let mut w = World::new();
    let err = w.engine.request(w.owner, w.tdt).unwrap_err();

    assert!(matches!(err, TurbomintError::TransferNotAuthorized { .. }));
    assert!(format!("{err}").contains("transfer caller is not owner nor approved"));
    assert_eq!(w.owner_of_tdt(), w.owner);
    assert!(!w.engine.is_open(w.tdt));
}

#[test]
fn request_by_non_owner_reverts() {
    let mut w = World::new();
    w.approve_tdt();
    // Engine is approved, but the user is not the owner.
    let err = w.engine.request(w.user, w.tdt).unwrap_err();
    assert!(matches!(err, TurbomintError::TransferNotAuthorized { .. }));
    assert!(!w.engine.is_open(w.tdt));
}

#[test]
fn request_with_operator_approval_works() {
    let mut w = World::new();
    let escrow = w.escrow();
    w.engine.set_tdt_operator(w.owner, escrow, true).unwrap();
    w.engine.request(w.owner, w.tdt).unwrap();
    assert_eq!(w.owner_of_tdt(), escrow);
}

#[test]
fn request_on_unminted_tdt_passes_registry_error_through() {
    let mut w = World::new();
    let never_minted = TdtId::from_u64(235_243);

    let err = w.engine.request(w.owner, never_minted).unwrap_err();

    assert_eq!(err, TurbomintError::NonexistentToken(never_minted));
    assert!(!w.engine.is_open(never_minted));
    assert_eq!(w.engine.open_orders(), 0);
    w.engine.audit_custody().unwrap();
}

#[test]
fn engine_cannot_request_as_itself() {
    let mut w = World::new();
    let escrow = w.escrow();
    let err = w.engine.request(escrow, w.tdt).unwrap_err();

    assert_eq!(err, TurbomintError::EngineAsCaller(escrow));
    assert_eq!(err.category(), ErrorCategory::NotPermitted);
    assert!(!w.engine.is_open(w.tdt));
    assert_eq!(w.owner_of_tdt(), w.owner);
}

#[test]
fn duplicate_request_reverts() {
    let mut w = World::new();
    w.request();
    let err = w.engine.request(w.owner, w.tdt).unwrap_err();
    assert_eq!(err, TurbomintError::OrderAlreadyOpen(w.tdt));
    assert_eq!(w.engine.open_orders(), 1);
}

// =============================================================================
// cancel
// =============================================================================

#[test]
fn cancel_transfers_tdt_back_to_original_owner() {
    let mut w = World::new();
    w.request();
    let receipt = w.engine.cancel(w.owner, w.tdt).unwrap();

    assert_eq!(receipt.receipt_type, ReceiptType::OrderCancelled);
    assert_eq!(w.owner_of_tdt(), w.owner);
    assert!(!w.engine.is_open(w.tdt));
    assert_eq!(w.engine.open_orders(), 0);
}

#[test]
fn cancel_reverts_without_open_order() {
    let mut w = World::new();
    let missing = TdtId::from_u64(235_243);
    let err = w.engine.cancel(w.owner, missing).unwrap_err();

    assert_eq!(err, TurbomintError::NoOpenOrder(missing));
    assert!(format!("{err}").contains("No open order for the given TDT id"));
}

#[test]
fn cancel_reverts_if_caller_is_not_original_holder() {
    let mut w = World::new();
    w.request();
    let err = w.engine.cancel(w.user, w.tdt).unwrap_err();

    assert_eq!(
        err,
        TurbomintError::NotOrderOwner {
            requester: w.owner,
            caller: w.user
        }
    );
    assert_eq!(err.category(), ErrorCategory::NotPermitted);
    assert!(w.engine.is_open(w.tdt));
    assert_eq!(w.owner_of_tdt(), w.escrow());
}

#[test]
fn request_again_after_cancel() {
    let mut w = World::new();
    w.request();
    w.engine.cancel(w.owner, w.tdt).unwrap();
    w.request();
    assert!(w.engine.is_open(w.tdt));
    assert_eq!(w.owner_of_tdt(), w.escrow());
}

// =============================================================================
// amount_due
// =============================================================================

#[test]
fn amount_due_matches_formula() {
    let w = World::new();
    let lot_size = w.engine.deposits().lot_size(w.tdt).unwrap();
    let signer_fee = w.engine.deposits().signer_fee(w.tdt).unwrap();
    let fill_fee = lot_size / Amount::from(FEE_DIVISOR);

    assert_eq!(
        w.engine.amount_due(w.tdt).unwrap(),
        lot_size - signer_fee - fill_fee
    );
}

#[test]
fn amount_due_reference_values() {
    let w = World::with_terms(DepositTerms::new(10_000, 100));
    let quote = w.engine.quote(w.tdt).unwrap();
    assert_eq!(quote.fill_fee, 500);
    assert_eq!(quote.amount_due, 9_400);
}

#[test]
fn amount_due_does_not_need_open_order() {
    let mut w = World::with_terms(DepositTerms::new(10_000, 100));
    assert!(!w.engine.is_open(w.tdt));
    assert_eq!(w.engine.amount_due(w.tdt).unwrap(), 9_400);

    w.request();
    assert_eq!(w.engine.amount_due(w.tdt).unwrap(), 9_400);
}

#[test]
fn amount_due_underflow_is_an_error() {
    let w = World::with_terms(DepositTerms::new(100, 96));
    assert!(matches!(
        w.engine.amount_due(w.tdt),
        Err(TurbomintError::PricingUnderflow { .. })
    ));
}

#[test]
fn amount_due_unknown_deposit() {
    let w = World::new();
    let other = TdtId::random();
    assert_eq!(
        w.engine.amount_due(other).unwrap_err(),
        TurbomintError::UnknownDeposit(other)
    );
}

// =============================================================================
// provide
// =============================================================================

#[test]
fn provide_pays_requester_and_delivers_tdt() {
    let mut w = World::new();
    w.engine.burn_settlement(w.owner).unwrap();
    w.request();

    let due = w.engine.amount_due(w.tdt).unwrap();
    w.fund_user(due, due);

    let receipt = w.engine.provide(w.user, w.tdt).unwrap();

    assert_eq!(w.tbtc(w.owner), due);
    assert_eq!(w.tbtc(w.user), 0);
    assert_eq!(w.tbtc(w.escrow()), 0);
    assert_eq!(w.owner_of_tdt(), w.user);
    assert!(!w.engine.is_open(w.tdt));

    assert_eq!(receipt.receipt_type, ReceiptType::OrderFilled);
    assert_eq!(receipt.requester, w.owner);
    assert_eq!(receipt.counterparty, Some(w.user));
    assert_eq!(receipt.amount, Some(due));
}

#[test]
fn provide_uses_price_at_fill_time() {
    let mut w = World::with_terms(DepositTerms::new(10_000, 100));
    w.request();
    w.engine
        .deposits_mut()
        .insert(w.tdt, DepositTerms::new(20_000, 100));

    let due = w.engine.amount_due(w.tdt).unwrap();
    assert_eq!(due, 20_000 - 100 - 1_000);
    w.fund_user(due, due);
    w.engine.provide(w.user, w.tdt).unwrap();
    assert_eq!(w.tbtc(w.owner), due);
}

#[test]
fn provide_reverts_without_open_order() {
    let mut w = World::new();
    let missing = TdtId::from_u64(454_654);
    let err = w.engine.provide(w.user, missing).unwrap_err();
    assert_eq!(err, TurbomintError::NoOpenOrder(missing));
    assert_eq!(err.category(), ErrorCategory::NothingToDo);
}

#[test]
fn provide_reverts_with_insufficient_allowance() {
    let mut w = World::new();
    w.request();
    let due = w.engine.amount_due(w.tdt).unwrap();
    w.fund_user(due, 0);

    let err = w.engine.provide(w.user, w.tdt).unwrap_err();

    assert!(matches!(err, TurbomintError::InsufficientAllowance { .. }));
    assert!(format!("{err}").contains("transfer amount exceeds allowance"));
    assert!(w.engine.is_open(w.tdt));
    assert_eq!(w.owner_of_tdt(), w.escrow());
    assert_eq!(w.tbtc(w.user), due);
    assert_eq!(w.tbtc(w.owner), 0);
}

#[test]
fn provide_reverts_with_partial_allowance() {
    let mut w = World::new();
    w.request();
    let due = w.engine.amount_due(w.tdt).unwrap();
    w.fund_user(due, due - 1);

    let err = w.engine.provide(w.user, w.tdt).unwrap_err();
    assert_eq!(
        err,
        TurbomintError::InsufficientAllowance {
            needed: due,
            allowed: due - 1
        }
    );
    assert!(w.engine.is_open(w.tdt));
}

#[test]
fn provide_reverts_with_insufficient_balance() {
    let mut w = World::new();
    w.request();
    let due = w.engine.amount_due(w.tdt).unwrap();
    w.fund_user(due - 1, due);

    let err = w.engine.provide(w.user, w.tdt).unwrap_err();
    assert!(matches!(err, TurbomintError::InsufficientBalance { .. }));
    assert_eq!(err.category(), ErrorCategory::Funds);
    assert!(w.engine.is_open(w.tdt));
    assert_eq!(w.tbtc(w.user), due - 1);
    assert_eq!(w.engine.ledger().allowance(w.user, w.escrow()), due);
}

#[test]
fn provide_reverts_on_pricing_underflow() {
    let mut w = World::with_terms(DepositTerms::new(100, 99));
    w.request();
    w.fund_user(1_000, 1_000);

    let err = w.engine.provide(w.user, w.tdt).unwrap_err();
    assert!(matches!(err, TurbomintError::PricingUnderflow { .. }));
    assert!(w.engine.is_open(w.tdt));
    assert_eq!(w.tbtc(w.user), 1_000);
}

#[test]
fn second_filler_sees_no_open_order() {
    let mut w = World::new();
    w.request();
    let due = w.engine.amount_due(w.tdt).unwrap();
    w.fund_user(due, due);

    let late = AccountId::random();
    let escrow = w.escrow();
    w.engine.mint_settlement(late, due).unwrap();
    w.engine.approve_settlement(late, escrow, due).unwrap();

    w.engine.provide(w.user, w.tdt).unwrap();
    let err = w.engine.provide(late, w.tdt).unwrap_err();

    assert_eq!(err, TurbomintError::NoOpenOrder(w.tdt));
    assert_eq!(w.tbtc(late), due);
    assert_eq!(w.owner_of_tdt(), w.user);
}

#[test]
fn cancel_after_fill_sees_no_open_order() {
    let mut w = World::new();
    w.request();
    let due = w.engine.amount_due(w.tdt).unwrap();
    w.fund_user(due, due);
    w.engine.provide(w.user, w.tdt).unwrap();

    let err = w.engine.cancel(w.owner, w.tdt).unwrap_err();
    assert_eq!(err, TurbomintError::NoOpenOrder(w.tdt));
    assert_eq!(w.owner_of_tdt(), w.user);
}

#[test]
fn requester_can_fill_own_order() {
    let mut w = World::new();
    w.request();
    let due = w.engine.amount_due(w.tdt).unwrap();
    let escrow = w.escrow();
    w.engine.mint_settlement(w.owner, due).unwrap();
    w.engine.approve_settlement(w.owner, escrow, due).unwrap();

    w.engine.provide(w.owner, w.tdt).unwrap();
    assert_eq!(w.owner_of_tdt(), w.owner);
    assert_eq!(w.tbtc(w.owner), due);
}

#[test]
fn engine_cannot_fill_its_own_escrow_at_zero_price() {
    // 100 - 95 - 100/20 == 0, so no payment step can fail.
    let mut w = World::with_terms(DepositTerms::new(100, 95));
    w.request();
    assert_eq!(w.engine.amount_due(w.tdt).unwrap(), 0);
    let escrow = w.escrow();

    let err = w.engine.provide(escrow, w.tdt).unwrap_err();

    assert_eq!(err, TurbomintError::EngineAsCaller(escrow));
    assert!(w.engine.is_open(w.tdt));
    assert_eq!(w.owner_of_tdt(), escrow);
    w.engine.audit_custody().unwrap();
    w.engine
        .audit_holdings(w.engine.registry().tokens_of(escrow).collect::<Vec<_>>())
        .unwrap();

    // The requester can still take it back.
    w.engine.cancel(w.owner, w.tdt).unwrap();
    assert_eq!(w.owner_of_tdt(), w.owner);
}

#[test]
fn escrowed_tdt_cannot_be_moved_through_public_api() {
    let mut w = World::new();
    w.request();
    let escrow = w.escrow();
    let thief = AccountId::random();

    assert_eq!(
        w.engine.approve_tdt(escrow, thief, w.tdt).unwrap_err(),
        TurbomintError::EngineAsCaller(escrow)
    );
    assert_eq!(
        w.engine.set_tdt_operator(escrow, thief, true).unwrap_err(),
        TurbomintError::EngineAsCaller(escrow)
    );
    assert_eq!(
        w.engine.approve_tdt(w.owner, thief, w.tdt).unwrap_err(),
        TurbomintError::ApprovalNotAllowed(w.tdt)
    );
    assert_eq!(
        w.engine.cancel(thief, w.tdt).unwrap_err(),
        TurbomintError::NotOrderOwner {
            requester: w.owner,
            caller: thief
        }
    );

    assert_eq!(w.owner_of_tdt(), escrow);
    assert!(w.engine.is_open(w.tdt));
    w.engine.audit_custody().unwrap();
}

// =============================================================================
// Invariants across many orders
// =============================================================================

#[test]
fn custody_and_supply_hold_across_mixed_lifecycle() {
    let mut w = World::new();
    let escrow = w.escrow();
    let supply_before = w.engine.ledger().total_supply();

    let holders: Vec<(AccountId, TdtId)> = (0..6)
        .map(|_| (AccountId::random(), TdtId::random()))
        .collect();
    for (holder, tdt) in &holders {
        w.engine.mint_tdt(*holder, *tdt).unwrap();
        w.engine
            .deposits_mut()
            .insert(*tdt, DepositTerms::standard(ONE_TBTC / 100));
        w.engine.approve_tdt(*holder, escrow, *tdt).unwrap();
        w.engine.request(*holder, *tdt).unwrap();
    }
    assert_eq!(w.engine.open_orders(), 6);
    w.engine.audit_custody().unwrap();

    let filler = AccountId::random();
    let mut paid = 0;
    for (i, (holder, tdt)) in holders.iter().enumerate() {
        if i % 2 == 0 {
            w.engine.cancel(*holder, *tdt).unwrap();
        } else {
            let due = w.engine.amount_due(*tdt).unwrap();
            w.engine.mint_settlement(filler, due).unwrap();
            w.engine.approve_settlement(filler, escrow, due).unwrap();
            w.engine.provide(filler, *tdt).unwrap();
            assert_eq!(w.tbtc(*holder), due);
            paid += due;
        }
        w.engine.audit_custody().unwrap();
        w.engine
            .audit_holdings(w.engine.registry().tokens_of(escrow).collect::<Vec<_>>())
            .unwrap();
    }

    assert_eq!(w.engine.open_orders(), 0);
    assert_eq!(w.tbtc(escrow), 0);
    assert_eq!(w.engine.ledger().total_supply(), supply_before + paid);
    assert_eq!(w.engine.registry().tokens_of(filler).count(), 3);
}

#[test]
fn receipts_are_distinct_and_serializable() {
    let mut w = World::new();
    w.approve_tdt();
    let opened = w.engine.request(w.owner, w.tdt).unwrap();
    let closed = w.engine.cancel(w.owner, w.tdt).unwrap();

    assert_ne!(opened.tx_id, closed.tx_id);
    assert_ne!(opened.digest(), closed.digest());

    let json = serde_json::to_string(&closed).unwrap();
    let back: Receipt = serde_json::from_str(&json).unwrap();
    assert_eq!(back, closed);
}

#[test]
fn engine_from_json_config() {
    init_tracing();
    let tbtc_token = AccountId::random();
    let tdt_token = AccountId::random();
    let json = serde_json::json!({
        "settlement_token": tbtc_token,
        "rebate_token": AccountId::random(),
        "receipt_token": tdt_token,
        "fee_divisor": 50,
    })
    .to_string();

    let config = EngineConfig::from_json(&json).unwrap();
    let engine = Engine::new(
        AccountId::random(),
        config,
        InMemoryReceiptRegistry::new(tdt_token),
        InMemorySettlementLedger::new(tbtc_token),
        StaticDepositParameters::new(),
    )
    .unwrap();
    assert_eq!(engine.config().fee_divisor, 50);
    assert_eq!(engine.registry().address(), tdt_token);
    assert_eq!(engine.ledger().address(), tbtc_token);
}
