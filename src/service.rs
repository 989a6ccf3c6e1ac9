/*
 * Swap engine that sequences balance checks, approval, pricing and submission
 */

use chrono::Utc;
use ethers::types::U256;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use crate::{
    config::{Config, EngineConfig},
    dex::{swap_call_parameters, SwapOptions, TradeBuilder},
    execution::{ApprovalManager, SubmitMode, TransactionSubmitter},
    metrics::SwapMetrics,
    models::{Asset, Result, SwapError, SwapOutcome, SwapRequest, TransactionState},
    rpc::{ChainClient, SignerClient},
    tokens::TokenReader,
    utils::to_raw_amount,
};

pub struct SwapEngine<C: ?Sized> {
    client: Arc<C>,
    config: EngineConfig,
    tokens: TokenReader<C>,
    trades: TradeBuilder<C>,
    approvals: ApprovalManager<C>,
    submitter: Arc<TransactionSubmitter<C>>,
    metrics: Arc<SwapMetrics>,
}

impl SwapEngine<dyn ChainClient> {
    /// Resolves the network, connects the signer and verifies its chain id.
    pub async fn connect(config: &Config, metrics: Arc<SwapMetrics>) -> Result<Self> {
        let engine_config = config.engine_config()?;
        info!(chain_id = engine_config.chain_id, rpc_url = %engine_config.rpc_url, "Initializing swap engine");

        let client: Arc<dyn ChainClient> = Arc::new(
            SignerClient::new(
                &engine_config.rpc_url,
                engine_config.chain_id,
                config.chain.private_key.expose(),
            )
            .await?,
        );

        Ok(Self::new(client, engine_config, metrics))
    }
}

impl<C: ChainClient + ?Sized> SwapEngine<C> {
    pub fn new(client: Arc<C>, config: EngineConfig, metrics: Arc<SwapMetrics>) -> Self {
        Self::build(client, config, metrics, None)
    }

    /// Abandons pending receipt waits, for approvals and swaps alike, once
    /// `true` is published on `cancel`.
    #[must_use]
    pub fn with_cancellation(self, cancel: watch::Receiver<bool>) -> Self {
        Self::build(self.client, self.config, self.metrics, Some(cancel))
    }

    fn build(
        client: Arc<C>,
        config: EngineConfig,
        metrics: Arc<SwapMetrics>,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Self {
        let submitter =
            TransactionSubmitter::new(client.clone(), config.settings.receipt, metrics.clone());
        let submitter = Arc::new(match cancel {
            Some(cancel) => submitter.with_cancellation(cancel),
            None => submitter,
        });

        Self {
            tokens: TokenReader::new(client.clone()),
            trades: TradeBuilder::new(
                client.clone(),
                config.pool_factory,
                config.quoter,
                config.wrapped_native,
            ),
            approvals: ApprovalManager::new(client.clone(), submitter.clone(), config.settings.approval),
            submitter,
            client,
            config,
            metrics,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Signer's human-readable balance of `asset`.
    pub async fn balance(&self, asset: Asset) -> Result<Decimal> {
        let token = self.tokens.token(asset).await?;
        self.tokens.balance(self.client.address(), &token).await
    }

    /// Runs one swap request to a terminal state, or to a preview when
    /// `preview_only` is set. Insufficient balance and a failed approval are
    /// reported as states; missing pools and failed quotes as errors.
    pub async fn execute_swap(&self, request: SwapRequest) -> Result<SwapOutcome> {
        let result = self.run_swap(request).await;

        match &result {
            Ok(SwapOutcome::State { state }) => self.metrics.record_swap(&state.to_string()),
            Ok(SwapOutcome::Preview { .. }) => self.metrics.record_swap("Preview"),
            Err(e) => {
                warn!(error = %e, "Swap request failed");
                self.metrics.record_swap("Error");
            }
        }

        result
    }

    async fn run_swap(&self, request: SwapRequest) -> Result<SwapOutcome> {
        let (token_in, token_out) = tokio::try_join!(
            self.tokens.token(request.token_in),
            self.tokens.token(request.token_out),
        )?;

        let owner = self.client.address();
        let balance = self.tokens.raw_balance(owner, &token_in.asset).await?;

        let amount = if request.amount <= Decimal::ZERO {
            info!(%balance, token = %token_in.asset, "Sweeping full balance");
            balance
        } else {
            let requested = to_raw_amount(request.amount, token_in.decimals)?;
            if balance < requested {
                info!(%balance, %requested, token = %token_in.asset, "Insufficient balance");
                return Ok(TransactionState::Rejected.into());
            }
            requested
        };

        if amount.is_zero() {
            info!(token = %token_in.asset, "Nothing to swap");
            return Ok(TransactionState::Rejected.into());
        }

        if request.need_approval && !token_in.asset.is_native() {
            let approval = self
                .approvals
                .ensure_approval(&token_in, self.config.swap_router, amount, request.approval_max)
                .await;
            self.metrics.record_approval(approval);

            if approval != TransactionState::Sent {
                warn!(state = %approval, token = %token_in.asset, "Approval did not complete, swap skipped");
                return Ok(TransactionState::Failed.into());
            }
        }

        let pool = self.trades.resolve_pool(&token_in, &token_out).await?;
        let trade = self.trades.build_trade_raw(pool, token_in, token_out, amount).await?;

        if request.preview_only {
            let preview = self.trades.preview_trade(trade).await?;
            info!(
                estimated_output = %preview.estimated_output,
                price_impact_percent = %preview.price_impact_percent,
                "Trade preview"
            );
            return Ok(preview.into());
        }

        let options = SwapOptions {
            slippage_bps: self.config.settings.slippage_bps,
            deadline: self.deadline()?,
            recipient: owner,
        };
        let call = swap_call_parameters(
            &trade,
            self.config.swap_router,
            self.config.wrapped_native,
            &options,
        );

        info!(trade = %trade, deadline = %options.deadline, "Submitting swap");
        let state = self.submitter.submit(call, SubmitMode::AwaitReceipt).await;
        info!(state = %state, "Swap finished");

        Ok(state.into())
    }

    fn deadline(&self) -> Result<U256> {
        let deadline = Utc::now().timestamp() + self.config.settings.deadline_secs;
        u64::try_from(deadline)
            .map(U256::from)
            .map_err(|_| SwapError::CalculationError(format!("Invalid deadline {deadline}")))
    }
}
