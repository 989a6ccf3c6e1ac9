/*
 * Prometheus counters for swaps, approvals and submissions
 */

use crate::execution::SubmitMode;
use crate::models::{Result, TransactionState};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

pub struct SwapMetrics {
    registry: Registry,
    swaps: IntCounterVec,
    approvals: IntCounterVec,
    submissions: IntCounterVec,
}

impl SwapMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let swaps = IntCounterVec::new(
            Opts::new("swap_outcomes_total", "Swap requests by terminal state"),
            &["outcome"],
        )?;
        let approvals = IntCounterVec::new(
            Opts::new("approvals_total", "Approval checks by resulting state"),
            &["state"],
        )?;
        let submissions = IntCounterVec::new(
            Opts::new("submissions_total", "Transaction submissions by mode and state"),
            &["mode", "state"],
        )?;

        registry.register(Box::new(swaps.clone()))?;
        registry.register(Box::new(approvals.clone()))?;
        registry.register(Box::new(submissions.clone()))?;

        Ok(Self {
            registry,
            swaps,
            approvals,
            submissions,
        })
    }

    pub fn record_swap(&self, outcome: &str) {
        self.swaps.with_label_values(&[outcome]).inc();
    }

    pub fn record_approval(&self, state: TransactionState) {
        self.approvals
            .with_label_values(&[state.to_string().as_str()])
            .inc();
    }

    pub fn record_submission(&self, mode: SubmitMode, state: TransactionState) {
        self.submissions
            .with_label_values(&[mode.label(), state.to_string().as_str()])
            .inc();
    }

    /// Text exposition format.
    pub fn render(&self) -> Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
