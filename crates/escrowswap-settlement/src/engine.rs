//! The settlement engine.
//!
//! Each operation runs against a staged copy of the ledger and escrow
//! store. The copy replaces the live state only when the operation
//! succeeds and supply conservation still holds, so a failed call has no
//! effect at all.
//!
//! Staging clones the whole ledger and escrow store, and the commit check
//! re-sums every tracked asset, so each operation is linear in total
//! state. That fits the in-memory model; a store backed by persistent
//! accounts would want a write journal with undo instead.

use escrowswap_pricing::{cancellation_premium, dst_amount_owed, rate_bump, scaled_estimate, split};
use escrowswap_registry::ResolverGate;
use escrowswap_types::{
    Address, AssetKind, CancelReceipt, EngineConfig, EscrowSwapError, ExecutionContext,
    FillReceipt, LedgerAsset, MintId, OrderHash, OrderTerms, Result, SettlementEvent,
    escrow_address, order_hash,
};
use serde::{Deserialize, Serialize};

use crate::escrow::{EscrowRecord, EscrowStore};
use crate::ledger::Ledger;

/// The asset a maker actually hands over at `create`, as the host reports
/// it: the mint of the deposited tokens and the caller's native flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDeposit {
    pub mint: MintId,
    pub is_native: bool,
}

impl SourceDeposit {
    #[must_use]
    pub fn native() -> Self {
        Self {
            mint: MintId::NATIVE,
            is_native: true,
        }
    }

    #[must_use]
    pub fn token(mint: MintId) -> Self {
        Self {
            mint,
            is_native: false,
        }
    }
}

/// Accounts a resolver names when acting on an existing escrow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscrowAccounts {
    pub maker: Address,
    /// The maker's payout receiver; part of the order hash.
    pub receiver: Address,
    /// The escrow the caller claims these terms belong to.
    pub escrow: Address,
}

#[derive(Debug, Clone, Default)]
struct State {
    ledger: Ledger,
    escrows: EscrowStore,
    /// Events emitted by the operation in flight.
    pending: Vec<SettlementEvent>,
}

/// Settlement engine over an in-memory ledger.
pub struct SettlementEngine<G: ResolverGate> {
    config: EngineConfig,
    gate: G,
    state: State,
    events: Vec<SettlementEvent>,
}

impl<G: ResolverGate> SettlementEngine<G> {
    /// Create an engine with empty state.
    ///
    /// # Errors
    /// Returns `Configuration` if `config` does not validate.
    pub fn new(config: EngineConfig, gate: G) -> Result<Self> {
        config.validate()?;
        tracing::info!(
            program = %config.program_id.short(),
            rent = config.escrow_rent_lamports,
            "settlement engine initialized"
        );
        Ok(Self {
            config,
            gate,
            state: State::default(),
            events: Vec::new(),
        })
    }

    // -----------------------------------------------------------------
    // External flows
    // -----------------------------------------------------------------

    /// Credit an external deposit to `owner`.
    pub fn deposit(&mut self, owner: Address, asset: LedgerAsset, amount: u64) -> Result<()> {
        let mut staged = self.state.clone();
        staged.ledger.deposit(owner, asset, amount)?;
        self.commit(staged)
    }

    /// Remove `amount` from `owner` to outside the ledger.
    pub fn withdraw(&mut self, owner: Address, asset: LedgerAsset, amount: u64) -> Result<()> {
        let mut staged = self.state.clone();
        staged.ledger.withdraw(owner, asset, amount)?;
        self.commit(staged)
    }

    // -----------------------------------------------------------------
    // Order operations
    // -----------------------------------------------------------------

    /// Open an escrow for `terms` and deposit the source amount.
    ///
    /// The caller is the maker. Charges the maker the configured rent in
    /// lamports plus `src_amount` of the source asset (native sources are
    /// wrapped into custody). Returns the escrow address.
    ///
    /// # Errors
    /// - `InvalidOrderTerms` / `OrderExpired` / `MissingAccount` from validation
    /// - `InvalidOrderTerms` if the cancellation premium cap exceeds the rent
    /// - `AssetKindMismatch` if the deposit disagrees with `terms.src_asset`
    /// - `EscrowAlreadyExists` if the address is taken
    /// - `InsufficientFunds` if the maker cannot cover rent and source
    pub fn create(
        &mut self,
        ctx: &ExecutionContext,
        terms: &OrderTerms,
        receiver: Address,
        deposit: SourceDeposit,
    ) -> Result<Address> {
        let mut staged = self.state.clone();
        let escrow = staged.create(&self.config, ctx, terms, receiver, deposit)?;
        self.commit(staged)?;
        Ok(escrow)
    }

    /// Fill `amount` of the escrow's source at the current auction rate.
    ///
    /// The caller is the taker and must be an authorized resolver.
    ///
    /// # Errors
    /// - `ResolverNotAuthorized` if the gate rejects the caller
    /// - `TermsMismatch` if `terms` do not re-derive `accounts.escrow`
    /// - `EscrowNotFound` if the escrow is already closed
    /// - `OrderExpired` at or after expiration
    /// - `ZeroAmount` for an empty fill
    /// - `InsufficientEscrowBalance` if `amount` exceeds the unfilled balance
    /// - `InsufficientFunds` if the taker cannot pay
    pub fn fill(
        &mut self,
        ctx: &ExecutionContext,
        accounts: &EscrowAccounts,
        terms: &OrderTerms,
        amount: u64,
    ) -> Result<FillReceipt> {
        self.authorize(&ctx.caller)?;
        let mut staged = self.state.clone();
        let receipt = staged.fill(&self.config, ctx, accounts, terms, amount)?;
        self.commit(staged)?;
        Ok(receipt)
    }

    /// Maker cancellation: return the residual source and the rent.
    ///
    /// Allowed at any time and free of charge.
    ///
    /// # Errors
    /// - `EscrowNotFound` if the caller has no open escrow for `order_hash`
    /// - `NotMaker` if the order exists but belongs to another maker
    /// - `AssetKindMismatch` if `src_asset_is_native` disagrees with the record
    pub fn cancel(
        &mut self,
        ctx: &ExecutionContext,
        order_hash: &OrderHash,
        src_asset_is_native: bool,
    ) -> Result<CancelReceipt> {
        let mut staged = self.state.clone();
        let receipt = staged.cancel(&self.config, ctx, order_hash, src_asset_is_native)?;
        self.commit(staged)?;
        Ok(receipt)
    }

    /// Resolver cancellation of an expired order for a premium.
    ///
    /// The residual source goes back to the maker. The resolver is paid
    /// `min(premium, reward_limit)` lamports out of the escrow's reclaimable
    /// lamports (its rent, plus the residual if the source is native) and
    /// the maker receives the rest.
    ///
    /// # Errors
    /// - `ResolverNotAuthorized` if the gate rejects the caller
    /// - `TermsMismatch` / `EscrowNotFound` as for [`Self::fill`]
    /// - `NoCancellationPremium` if the order has no premium cap
    /// - `CancellationNotStarted` before expiration
    /// - `ArithmeticUnderflow` if the reward exceeds the reclaimable lamports;
    ///   unreachable for escrows opened by [`Self::create`], which caps the
    ///   premium at the rent
    pub fn cancel_by_resolver(
        &mut self,
        ctx: &ExecutionContext,
        accounts: &EscrowAccounts,
        terms: &OrderTerms,
        reward_limit: u64,
    ) -> Result<CancelReceipt> {
        self.authorize(&ctx.caller)?;
        let mut staged = self.state.clone();
        let receipt = staged.cancel_by_resolver(&self.config, ctx, accounts, terms, reward_limit)?;
        self.commit(staged)?;
        Ok(receipt)
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    #[must_use]
    pub fn escrow(&self, address: &Address) -> Option<&EscrowRecord> {
        self.state.escrows.get(address)
    }

    #[must_use]
    pub fn escrows(&self) -> &EscrowStore {
        &self.state.escrows
    }

    /// Where `maker`'s escrow for `order_hash` lives.
    #[must_use]
    pub fn escrow_address(&self, maker: &Address, order_hash: &OrderHash) -> Address {
        escrow_address(&self.config.program_id, maker, order_hash)
    }

    #[must_use]
    pub fn ledger(&self) -> &Ledger {
        &self.state.ledger
    }

    #[must_use]
    pub fn balance(&self, owner: &Address, asset: LedgerAsset) -> u64 {
        self.state.ledger.balance(owner, asset)
    }

    /// Append-only log of committed events.
    #[must_use]
    pub fn events(&self) -> &[SettlementEvent] {
        &self.events
    }

    pub fn verify_supply(&self, asset: LedgerAsset) -> Result<()> {
        self.state.ledger.verify_supply(asset)
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn gate(&self) -> &G {
        &self.gate
    }

    /// Registry administration happens outside the engine; this hands the
    /// owner back its gate.
    pub fn gate_mut(&mut self) -> &mut G {
        &mut self.gate
    }

    fn authorize(&self, caller: &Address) -> Result<()> {
        if self.gate.is_authorized(caller) {
            Ok(())
        } else {
            tracing::warn!(caller = %caller.short(), "rejected: resolver not authorized");
            Err(EscrowSwapError::ResolverNotAuthorized(*caller))
        }
    }

    fn commit(&mut self, mut staged: State) -> Result<()> {
        if let Err(err) = staged.ledger.verify_all() {
            tracing::error!(error = %err, "supply conservation violated, operation discarded");
            return Err(err);
        }
        self.events.append(&mut staged.pending);
        self.state = staged;
        Ok(())
    }
}

impl State {
    fn create(
        &mut self,
        config: &EngineConfig,
        ctx: &ExecutionContext,
        terms: &OrderTerms,
        receiver: Address,
        deposit: SourceDeposit,
    ) -> Result<Address> {
        terms.validate(ctx.now, config.max_auction_points)?;
        if terms.fee.max_cancellation_premium > config.escrow_rent_lamports {
            return Err(EscrowSwapError::InvalidOrderTerms {
                reason: format!(
                    "cancellation premium cap {} exceeds escrow rent {}",
                    terms.fee.max_cancellation_premium, config.escrow_rent_lamports
                ),
            });
        }
        let deposited = AssetKind::from_deposit(deposit.mint, deposit.is_native)?;
        if deposited != terms.src_asset {
            return Err(EscrowSwapError::AssetKindMismatch {
                reason: format!("deposited {deposited}, terms declare {}", terms.src_asset),
            });
        }

        let maker = ctx.caller;
        let hash = order_hash(terms, &receiver);
        let escrow = escrow_address(&config.program_id, &maker, &hash);

        self.escrows.insert(EscrowRecord {
            address: escrow,
            maker,
            receiver,
            order_hash: hash,
            src_asset: terms.src_asset,
            dst_asset: terms.dst_asset,
            original_src_amount: terms.src_amount,
            balance: terms.src_amount,
            rent_lamports: config.escrow_rent_lamports,
            created_at: ctx.now,
        })?;

        self.ledger
            .transfer(maker, escrow, LedgerAsset::Lamports, config.escrow_rent_lamports)?;
        match terms.src_asset {
            AssetKind::Native => {
                self.ledger
                    .transfer(maker, escrow, LedgerAsset::Lamports, terms.src_amount)?;
                self.ledger.wrap_native(escrow, terms.src_amount)?;
            }
            AssetKind::Fungible(mint) => {
                self.ledger
                    .transfer(maker, escrow, LedgerAsset::Token(mint.mint()), terms.src_amount)?;
            }
        }

        tracing::info!(
            order = %hash,
            escrow = %escrow.short(),
            maker = %maker.short(),
            src_asset = %terms.src_asset,
            src_amount = terms.src_amount,
            expiration = terms.expiration_time,
            "escrow created"
        );
        self.pending.push(SettlementEvent::EscrowCreated {
            order_hash: hash,
            escrow,
            maker,
            src_asset: terms.src_asset,
            src_amount: terms.src_amount,
            expiration_time: terms.expiration_time,
        });
        Ok(escrow)
    }

    fn fill(
        &mut self,
        config: &EngineConfig,
        ctx: &ExecutionContext,
        accounts: &EscrowAccounts,
        terms: &OrderTerms,
        amount: u64,
    ) -> Result<FillReceipt> {
        let hash = self.bind(config, accounts, terms)?;
        if terms.is_expired(ctx.now) {
            return Err(EscrowSwapError::OrderExpired {
                expiration: terms.expiration_time,
                now: ctx.now,
            });
        }
        if amount == 0 {
            return Err(EscrowSwapError::ZeroAmount);
        }
        let escrow = accounts.escrow;
        let taker = ctx.caller;

        let record = self.escrows.get_mut(&escrow)?;
        let original = record.original_src_amount;
        let remaining = record.consume(amount)?;

        let bump = rate_bump(ctx.now, &terms.auction);
        let dst_amount = dst_amount_owed(terms.min_dst_amount, original, amount, bump)?;
        let estimate = scaled_estimate(terms.estimated_dst_amount, original, amount)?;
        let fees = split(
            dst_amount,
            terms.fee.protocol_fee,
            terms.fee.integrator_fee,
            terms.fee.surplus_percentage,
            estimate,
        )?;
        tracing::debug!(
            order = %hash,
            rate_bump = bump,
            dst_amount,
            estimate,
            protocol_fee = fees.protocol_fee,
            surplus_fee = fees.surplus_fee,
            integrator_fee = fees.integrator_fee,
            "fill priced"
        );

        self.ledger.transfer(
            escrow,
            taker,
            LedgerAsset::Token(terms.src_asset.mint()),
            amount,
        )?;
        let payment = terms.dst_asset.payment_asset();
        self.ledger
            .transfer(taker, accounts.receiver, payment, fees.maker_amount)?;
        self.pay_fee(
            taker,
            terms.fee.protocol_dst_account,
            "protocol_dst_account",
            payment,
            fees.protocol_fee,
        )?;
        self.pay_fee(
            taker,
            terms.fee.integrator_dst_account,
            "integrator_dst_account",
            payment,
            fees.integrator_fee,
        )?;

        tracing::info!(
            order = %hash,
            escrow = %escrow.short(),
            taker = %taker.short(),
            src_filled = amount,
            dst_amount,
            remaining,
            "escrow filled"
        );
        self.pending.push(SettlementEvent::EscrowFilled {
            order_hash: hash,
            escrow,
            taker,
            src_filled: amount,
            dst_amount,
            protocol_fee: fees.protocol_fee,
            integrator_fee: fees.integrator_fee,
            maker_amount: fees.maker_amount,
            remaining,
        });

        let closed = remaining == 0;
        if closed {
            let record = self.escrows.remove(&escrow)?;
            let rent = record.rent_lamports;
            self.ledger
                .transfer(escrow, record.maker, LedgerAsset::Lamports, rent)?;
            tracing::info!(order = %hash, escrow = %escrow.short(), rent, "escrow closed");
            self.pending.push(SettlementEvent::EscrowClosed {
                order_hash: hash,
                escrow,
                rent_refunded: rent,
            });
        }

        Ok(FillReceipt {
            order_hash: hash,
            escrow,
            src_filled: amount,
            rate_bump: bump,
            dst_amount,
            protocol_fee: fees.protocol_fee,
            surplus_fee: fees.surplus_fee,
            integrator_fee: fees.integrator_fee,
            maker_amount: fees.maker_amount,
            remaining,
            closed,
        })
    }

    fn cancel(
        &mut self,
        config: &EngineConfig,
        ctx: &ExecutionContext,
        order_hash: &OrderHash,
        src_asset_is_native: bool,
    ) -> Result<CancelReceipt> {
        let maker = ctx.caller;
        let escrow = escrow_address(&config.program_id, &maker, order_hash);
        let Some(record) = self.escrows.get(&escrow) else {
            if self.escrows.has_order(order_hash) {
                return Err(EscrowSwapError::NotMaker { caller: maker });
            }
            return Err(EscrowSwapError::EscrowNotFound(escrow));
        };
        if record.src_asset.is_native() != src_asset_is_native {
            return Err(EscrowSwapError::AssetKindMismatch {
                reason: format!(
                    "escrow holds {}, caller passed native={src_asset_is_native}",
                    record.src_asset
                ),
            });
        }

        let record = self.escrows.remove(&escrow)?;
        let returned = self.release_residual(&record)?;
        let lamports = reclaimable(&record, returned)?;
        self.ledger
            .transfer(escrow, maker, LedgerAsset::Lamports, lamports)?;

        tracing::info!(
            order = %order_hash,
            escrow = %escrow.short(),
            returned,
            lamports,
            "escrow cancelled by maker"
        );
        self.pending.push(SettlementEvent::EscrowCancelled {
            order_hash: *order_hash,
            escrow,
            maker,
            returned,
        });
        Ok(CancelReceipt {
            order_hash: *order_hash,
            escrow,
            returned,
            resolver_reward: 0,
            maker_lamports: lamports,
        })
    }

    fn cancel_by_resolver(
        &mut self,
        config: &EngineConfig,
        ctx: &ExecutionContext,
        accounts: &EscrowAccounts,
        terms: &OrderTerms,
        reward_limit: u64,
    ) -> Result<CancelReceipt> {
        let hash = self.bind(config, accounts, terms)?;
        if terms.fee.max_cancellation_premium == 0 {
            return Err(EscrowSwapError::NoCancellationPremium);
        }
        if ctx.now < terms.expiration_time {
            return Err(EscrowSwapError::CancellationNotStarted {
                expiration: terms.expiration_time,
                now: ctx.now,
            });
        }
        let escrow = accounts.escrow;
        let resolver = ctx.caller;

        let record = self.escrows.remove(&escrow)?;
        let returned = self.release_residual(&record)?;

        let premium = cancellation_premium(
            ctx.now,
            terms.expiration_time,
            terms.cancellation_auction_duration,
            terms.fee.max_cancellation_premium,
        );
        let reward = premium.min(reward_limit);
        if reward < premium {
            tracing::warn!(order = %hash, premium, reward_limit, "premium capped by reward limit");
        }
        let pool = reclaimable(&record, returned)?;
        let maker_lamports = pool
            .checked_sub(reward)
            .ok_or(EscrowSwapError::ArithmeticUnderflow {
                context: "cancellation reward",
            })?;
        self.ledger
            .transfer(escrow, resolver, LedgerAsset::Lamports, reward)?;
        self.ledger
            .transfer(escrow, record.maker, LedgerAsset::Lamports, maker_lamports)?;

        tracing::info!(
            order = %hash,
            escrow = %escrow.short(),
            resolver = %resolver.short(),
            returned,
            reward,
            maker_lamports,
            "escrow cancelled by resolver"
        );
        self.pending.push(SettlementEvent::EscrowCancelledByResolver {
            order_hash: hash,
            escrow,
            resolver,
            returned,
            resolver_reward: reward,
            maker_lamports,
        });
        Ok(CancelReceipt {
            order_hash: hash,
            escrow,
            returned,
            resolver_reward: reward,
            maker_lamports,
        })
    }

    /// Re-derive the order hash and check it against the named escrow.
    fn bind(
        &self,
        config: &EngineConfig,
        accounts: &EscrowAccounts,
        terms: &OrderTerms,
    ) -> Result<OrderHash> {
        let hash = order_hash(terms, &accounts.receiver);
        let derived = escrow_address(&config.program_id, &accounts.maker, &hash);
        if derived != accounts.escrow {
            return Err(EscrowSwapError::TermsMismatch {
                address: accounts.escrow,
            });
        }
        let record = self
            .escrows
            .get(&accounts.escrow)
            .ok_or(EscrowSwapError::EscrowNotFound(accounts.escrow))?;
        if record.order_hash != hash {
            return Err(EscrowSwapError::TermsMismatch {
                address: accounts.escrow,
            });
        }
        Ok(hash)
    }

    /// Hand the residual source back to the maker. Native residual is
    /// unwrapped into the escrow's lamports, which the caller distributes.
    fn release_residual(&mut self, record: &EscrowRecord) -> Result<u64> {
        let residual = record.balance;
        match record.src_asset {
            AssetKind::Native => self.ledger.unwrap_native(record.address, residual)?,
            AssetKind::Fungible(mint) => self.ledger.transfer(
                record.address,
                record.maker,
                LedgerAsset::Token(mint.mint()),
                residual,
            )?,
        }
        Ok(residual)
    }

    fn pay_fee(
        &mut self,
        payer: Address,
        recipient: Option<Address>,
        account: &'static str,
        asset: LedgerAsset,
        amount: u64,
    ) -> Result<()> {
        if amount == 0 {
            return Ok(());
        }
        let recipient = recipient.ok_or(EscrowSwapError::MissingAccount { account })?;
        self.ledger.transfer(payer, recipient, asset, amount)
    }
}

/// Lamports a closing escrow hands back: its rent, plus the unwrapped
/// residual when the source is native.
fn reclaimable(record: &EscrowRecord, residual: u64) -> Result<u64> {
    match record.src_asset {
        AssetKind::Native => record
            .rent_lamports
            .checked_add(residual)
            .ok_or(EscrowSwapError::ArithmeticOverflow {
                context: "reclaimable lamports",
            }),
        AssetKind::Fungible(_) => Ok(record.rent_lamports),
    }
}
