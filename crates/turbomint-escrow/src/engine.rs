//! The escrow engine.
//!
//! Owns the order store and the collaborator services, and exposes the
//! three state transitions plus the price read:
//!
//! 1. `request`: take custody of a TDT and open an order
//! 2. `cancel`: requester takes the TDT back, order closes
//! 3. `provide`: filler pays the amount due to the requester and receives
//!    the TDT, order closes
//! 4. `amount_due` / `quote`: what a filler would pay right now
//!
//! Each transition runs inside one begin/commit/rollback boundary (see
//! `custody.rs`). A failed transition leaves the order store, registry, and
//! ledger exactly as they were.

use turbomint_ledgers::{DepositParameterSource, ReceiptRegistry, SettlementLedger, Transactional};
use turbomint_types::{
    constants, display_tbtc, AccountId, Amount, EngineConfig, EscrowOrder, Receipt, Result,
    TdtId, TurbomintError, TxId,
};

use crate::order_store::OrderStore;
use crate::pricing::{self, Quote};

/// Instant-liquidity escrow for deposit-receipt tokens.
pub struct EscrowEngine<R, L, P> {
    /// The engine's own custody account.
    pub(crate) address: AccountId,
    pub(crate) config: EngineConfig,
    pub(crate) orders: OrderStore,
    pub(crate) registry: R,
    pub(crate) ledger: L,
    pub(crate) deposits: P,
}

impl<R, L, P> EscrowEngine<R, L, P>
where
    R: ReceiptRegistry + Transactional,
    L: SettlementLedger + Transactional,
    P: DepositParameterSource,
{
    /// Build an engine holding custody at `address`.
    ///
    /// # Errors
    /// `Configuration` if the config is invalid, if `address` is zero or
    /// collides with a service handle, or if the services' addresses do not
    /// match the handles in `config`.
    pub fn new(
        address: AccountId,
        config: EngineConfig,
        registry: R,
        ledger: L,
        deposits: P,
    ) -> Result<Self> {
        config.validate()?;

        if address.is_zero() {
            return Err(TurbomintError::Configuration(
                "engine address must not be the zero address".to_string(),
            ));
        }
        if [config.settlement_token, config.rebate_token, config.receipt_token].contains(&address) {
            return Err(TurbomintError::Configuration(format!(
                "engine address {address} collides with a token handle"
            )));
        }
        if registry.address() != config.receipt_token {
            return Err(TurbomintError::Configuration(format!(
                "receipt registry lives at {}, config says {}",
                registry.address(),
                config.receipt_token
            )));
        }
        if ledger.address() != config.settlement_token {
            return Err(TurbomintError::Configuration(format!(
                "settlement ledger lives at {}, config says {}",
                ledger.address(),
                config.settlement_token
            )));
        }

        tracing::info!(
            engine = constants::ENGINE_NAME,
            version = constants::VERSION,
            address = %address,
            fee_divisor = config.fee_divisor,
            fill_fee_percent = config.fill_fee_percent(),
            "escrow engine constructed"
        );

        Ok(Self {
            address,
            config,
            orders: OrderStore::new(),
            registry,
            ledger,
            deposits,
        })
    }

    /// Put `tdt_id` into escrow on behalf of `caller`.
    ///
    /// The caller must have approved the engine on the receipt registry.
    ///
    /// # Errors
    /// `EngineAsCaller` if `caller` is the engine itself; `OrderAlreadyOpen`
    /// if `tdt_id` is already escrowed; registry errors
    /// (`TransferNotAuthorized`, `NonexistentToken`) are passed through.
    pub fn request(&mut self, caller: AccountId, tdt_id: TdtId) -> Result<Receipt> {
        self.ensure_outside_caller(caller)?;
        let tx_id = TxId::new();
        self.atomically("request", tx_id, |engine| {
            engine.orders.open(tdt_id, caller)?;
            engine.take_custody(caller, tdt_id)
        })?;

        tracing::info!(
            %tx_id,
            tdt_id = %tdt_id,
            requester = %caller,
            open_orders = self.orders.len(),
            "order requested"
        );
        Ok(Receipt::requested(tx_id, tdt_id, caller))
    }

    /// Return an escrowed TDT to its requester and close the order.
    ///
    /// # Errors
    /// `NoOpenOrder` if nothing is open for `tdt_id`, `NotOrderOwner` if
    /// `caller` is not the requester.
    pub fn cancel(&mut self, caller: AccountId, tdt_id: TdtId) -> Result<Receipt> {
        let tx_id = TxId::new();
        let order = self.atomically("cancel", tx_id, |engine| {
            let order = engine.orders.require(tdt_id)?;
            if !order.is_owned_by(caller) {
                return Err(TurbomintError::NotOrderOwner {
                    requester: order.requester,
                    caller,
                });
            }
            engine.orders.close(tdt_id)?;
            engine.release_custody(order.requester, tdt_id)?;
            Ok(order)
        })?;

        tracing::info!(
            %tx_id,
            tdt_id = %tdt_id,
            requester = %order.requester,
            "order cancelled"
        );
        Ok(Receipt::cancelled(tx_id, tdt_id, order.requester))
    }

    /// Fill the open order for `tdt_id`: `caller` pays the amount due to the
    /// requester and receives the TDT.
    ///
    /// The caller must have approved the engine for at least the amount due
    /// on the settlement ledger.
    ///
    /// # Errors
    /// `EngineAsCaller` if `caller` is the engine itself; `NoOpenOrder` if
    /// nothing is open for `tdt_id`; pricing errors (`PricingUnderflow`,
    /// `UnknownDeposit`); ledger errors (`InsufficientAllowance`,
    /// `InsufficientBalance`) are passed through.
    pub fn provide(&mut self, caller: AccountId, tdt_id: TdtId) -> Result<Receipt> {
        self.ensure_outside_caller(caller)?;
        let tx_id = TxId::new();
        let (order, quote) = self.atomically("provide", tx_id, |engine| {
            let order = engine.orders.close(tdt_id)?;
            let quote = engine.quote(tdt_id)?;
            engine.collect_payment(caller, quote.amount_due)?;
            engine.pay_out(order.requester, quote.amount_due)?;
            engine.release_custody(caller, tdt_id)?;
            Ok((order, quote))
        })?;

        tracing::info!(
            %tx_id,
            tdt_id = %tdt_id,
            requester = %order.requester,
            filler = %caller,
            amount = %display_tbtc(quote.amount_due),
            fill_fee = %display_tbtc(quote.fill_fee),
            "order filled"
        );
        Ok(Receipt::filled(
            tx_id,
            tdt_id,
            order.requester,
            caller,
            quote.amount_due,
        ))
    }

    /// Settlement tokens a filler must pay for `tdt_id`.
    ///
    /// A pure price read: it does not look at the order store, so it can be
    /// quoted before an order is opened.
    ///
    /// # Errors
    /// `UnknownDeposit` when the parameter source has no record,
    /// `PricingUnderflow` when the fees exceed the lot.
    pub fn amount_due(&self, tdt_id: TdtId) -> Result<Amount> {
        Ok(self.quote(tdt_id)?.amount_due)
    }

    /// Full price breakdown for filling `tdt_id`.
    pub fn quote(&self, tdt_id: TdtId) -> Result<Quote> {
        let quote = pricing::quote_deposit(&self.deposits, tdt_id, self.config.fee_divisor)?;
        tracing::debug!(
            tdt_id = %tdt_id,
            lot_size = quote.lot_size,
            signer_fee = quote.signer_fee,
            fill_fee = quote.fill_fee,
            amount_due = quote.amount_due,
            "quoted fill"
        );
        Ok(quote)
    }
}

impl<R, L, P> EscrowEngine<R, L, P> {
    /// The engine's custody account.
    #[must_use]
    pub fn address(&self) -> AccountId {
        self.address
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The open order for `tdt_id`, if any.
    #[must_use]
    pub fn order(&self, tdt_id: TdtId) -> Option<EscrowOrder> {
        self.orders.get(tdt_id)
    }

    #[must_use]
    pub fn is_open(&self, tdt_id: TdtId) -> bool {
        self.orders.is_open(tdt_id)
    }

    /// Number of open orders.
    #[must_use]
    pub fn open_orders(&self) -> usize {
        self.orders.len()
    }

    #[must_use]
    pub fn orders(&self) -> &OrderStore {
        &self.orders
    }

    /// Read-only view of the receipt registry. Outside accounts act on it
    /// through the engine's pass-throughs, never as the engine.
    #[must_use]
    pub fn registry(&self) -> &R {
        &self.registry
    }

    #[must_use]
    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    #[must_use]
    pub fn deposits(&self) -> &P {
        &self.deposits
    }

    /// Deposit parameters are read at fill time and never carry custody,
    /// so hosts may update them freely.
    pub fn deposits_mut(&mut self) -> &mut P {
        &mut self.deposits
    }

    /// Refuse to let the engine's own custody account act from outside.
    ///
    /// The engine moving its own TDTs or funds on a caller's behalf could
    /// close an order while keeping the TDT, or release one with no order.
    pub(crate) fn ensure_outside_caller(&self, caller: AccountId) -> Result<()> {
        if caller == self.address {
            tracing::warn!(caller = %caller, "engine custody account used as caller");
            return Err(TurbomintError::EngineAsCaller(caller));
        }
        Ok(())
    }
}
