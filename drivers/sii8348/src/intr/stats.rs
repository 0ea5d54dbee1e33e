//! Interrupt statistics tracking
//!
//! Per-group dispatch counts plus the protocol abort counters. Counters are
//! diagnostic only, nothing is blocked when a threshold is crossed except
//! the DDC FIFO reset done by the error handler.

use log::info;

use super::{InterruptGroup, DISPATCH_ORDER, GROUP_COUNT};
#[cfg(feature = "hdcp")]
use crate::hdcp::HdcpErrors;

/// Interrupt statistics collector
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IsrStats {
    /// Per-group handler invocations
    pub counts: [u64; GROUP_COUNT],
    /// Dispatch passes started
    pub total_passes: u64,
    /// Passes cut short by a bus error
    pub aborted_passes: u64,
    /// DDC aborts since the last DDC FIFO reset
    pub ddc_aborts: u32,
    pub ddc_abort_total: u64,
    pub msc_aborts: u32,
    pub cmd_aborts: u32,
    #[cfg(feature = "hdcp")]
    pub hdcp: HdcpErrors,
}

impl IsrStats {
    pub const fn new() -> Self {
        Self {
            counts: [0; GROUP_COUNT],
            total_passes: 0,
            aborted_passes: 0,
            ddc_aborts: 0,
            ddc_abort_total: 0,
            msc_aborts: 0,
            cmd_aborts: 0,
            #[cfg(feature = "hdcp")]
            hdcp: HdcpErrors::new(),
        }
    }

    /// Record a handler invocation for `group`
    pub fn record(&mut self, group: InterruptGroup) {
        self.counts[group.index()] += 1;
    }

    pub fn get_count(&self, group: InterruptGroup) -> u64 {
        self.counts[group.index()]
    }

    /// Count a DDC abort. Returns true once the count passes `threshold`,
    /// restarting the count.
    pub fn record_ddc_abort(&mut self, threshold: u32) -> bool {
        self.ddc_abort_total += 1;
        self.ddc_aborts += 1;
        if self.ddc_aborts > threshold {
            self.ddc_aborts = 0;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Dump statistics to the log
    pub fn dump(&self) {
        info!("intr: === MHL interrupt statistics ===");
        info!("intr: passes {} aborted {}", self.total_passes, self.aborted_passes);
        for group in DISPATCH_ORDER {
            let count = self.get_count(*group);
            if count > 0 {
                info!("intr:   {}: {}", group.name(), count);
            }
        }
        info!(
            "intr: ddc aborts {} (total {}) msc aborts {} cmd aborts {}",
            self.ddc_aborts, self.ddc_abort_total, self.msc_aborts, self.cmd_aborts
        );
        #[cfg(feature = "hdcp")]
        info!(
            "intr: hdcp errors bksv {} reneg {} link {} suspend {}",
            self.hdcp.bksv, self.hdcp.renegotiation, self.hdcp.link, self.hdcp.suspend
        );
    }
}
