//! Interrupt dispatch
//!
//! Every interrupt group has a mask register, a status register and a
//! handler. One dispatch pass walks the groups in [`DISPATCH_ORDER`], which
//! is also the priority order when several groups are pending.
//!
//! Handlers report what they already cleared through [`IsrOutcome`]:
//! - `Cleared(bits)`: dispatcher clears the remaining masked status bits
//! - `Handled`: dispatcher must not touch the status register

pub mod handlers;
pub mod stats;

use log::{debug, error};

use crate::edid::parser::EdidParser;
use crate::error::Result;
use crate::hal::{Platform, RegAddr, RegisterBus};
use crate::notify::InterruptInfo;
use crate::regs::{self, Intr4};
use crate::Sii8348;

/// Hardware interrupt groups.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InterruptGroup {
    /// INTR4: RGND, MHL_EST, disconnect
    Disc,
    /// MDT_INT_0: hardware write burst
    G2wb,
    /// CBUS_INT_0: MSC transactions
    Msc,
    /// CBUS_INT_1: MSC/DDC aborts
    Merr,
    /// TPI_INTR_ST0: HDCP authentication
    Hdcp,
    /// INTR3: DDC/EDID
    Edid,
    /// TPI_INTR_ST1: HDCP BKSV fetch
    Hdcp2,
    /// INTR1: RSEN
    Intr1,
}

pub const GROUP_COUNT: usize = 8;

#[cfg(feature = "hdcp")]
pub const DISPATCH_ORDER: &[InterruptGroup] = &[
    InterruptGroup::Disc,
    InterruptGroup::G2wb,
    InterruptGroup::Msc,
    InterruptGroup::Merr,
    InterruptGroup::Hdcp,
    InterruptGroup::Edid,
    InterruptGroup::Hdcp2,
    InterruptGroup::Intr1,
];

#[cfg(not(feature = "hdcp"))]
pub const DISPATCH_ORDER: &[InterruptGroup] = &[
    InterruptGroup::Disc,
    InterruptGroup::G2wb,
    InterruptGroup::Msc,
    InterruptGroup::Merr,
    InterruptGroup::Edid,
    InterruptGroup::Intr1,
];

/// Register pair backing one group.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GroupRegs {
    pub mask: RegAddr,
    pub status: RegAddr,
}

impl InterruptGroup {
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            InterruptGroup::Disc => "DISC",
            InterruptGroup::G2wb => "G2WB",
            InterruptGroup::Msc => "MSC",
            InterruptGroup::Merr => "MERR",
            InterruptGroup::Hdcp => "HDCP",
            InterruptGroup::Edid => "EDID",
            InterruptGroup::Hdcp2 => "HDCP2",
            InterruptGroup::Intr1 => "INTR1",
        }
    }

    pub const fn regs(self) -> GroupRegs {
        let (mask, status) = match self {
            InterruptGroup::Disc => (regs::INTR4_MASK, regs::INTR4),
            InterruptGroup::G2wb => (regs::MDT_INT_0_MASK, regs::MDT_INT_0),
            InterruptGroup::Msc => (regs::CBUS_INT_0_MASK, regs::CBUS_INT_0),
            InterruptGroup::Merr => (regs::CBUS_INT_1_MASK, regs::CBUS_INT_1),
            InterruptGroup::Hdcp => (regs::TPI_INTR_ST0_ENABLE, regs::TPI_INTR_ST0),
            InterruptGroup::Edid => (regs::INTR3_MASK, regs::INTR3),
            InterruptGroup::Hdcp2 => (regs::TPI_INTR_ST1_ENABLE, regs::TPI_INTR_ST1),
            InterruptGroup::Intr1 => (regs::INTR1_MASK, regs::INTR1),
        };
        GroupRegs { mask, status }
    }
}

/// What a handler did with its status bits.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IsrOutcome {
    /// These bits are already cleared, dispatcher clears the rest
    Cleared(u8),
    /// Status fully handled, dispatcher writes nothing
    Handled,
}

/// Currently enabled mask of every group.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct IntrTable {
    masks: [u8; GROUP_COUNT],
}

impl IntrTable {
    pub const fn new() -> Self {
        Self {
            masks: [0; GROUP_COUNT],
        }
    }

    pub fn mask(&self, group: InterruptGroup) -> u8 {
        self.masks[group.index()]
    }

    fn set(&mut self, group: InterruptGroup, mask: u8) {
        self.masks[group.index()] = mask;
    }
}

impl<B: RegisterBus, P: Platform, E: EdidParser> Sii8348<B, P, E> {
    /// Program `mask` into a group's mask register and remember it.
    pub(crate) fn enable_intr(&mut self, group: InterruptGroup, mask: u8) -> Result<()> {
        self.write_reg(group.regs().mask, mask)?;
        self.intr.set(group, mask);
        Ok(())
    }

    pub fn intr_mask(&self, group: InterruptGroup) -> u8 {
        self.intr.mask(group)
    }

    /// Clear every status register and leave only RGND detection enabled.
    pub(crate) fn clear_and_disable_on_disconnect(&mut self) -> Result<()> {
        for group in DISPATCH_ORDER {
            self.write_reg(group.regs().status, 0xFF)?;
            if *group == InterruptGroup::Disc {
                self.enable_intr(*group, Intr4::RGND_DETECTION.bits())?;
            } else {
                self.enable_intr(*group, 0)?;
            }
        }
        Ok(())
    }

    /// Top-level interrupt entry: one pass over all enabled groups.
    ///
    /// A bus error ends the pass immediately, later groups are not scanned.
    pub fn device_isr(&mut self, info: &mut InterruptInfo) -> Result<()> {
        self.stats.total_passes += 1;
        match self.dispatch_pass(info) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.stats.aborted_passes += 1;
                error!("intr: dispatch aborted: {}", e);
                Err(e)
            }
        }
    }

    fn dispatch_pass(&mut self, info: &mut InterruptInfo) -> Result<()> {
        for group in DISPATCH_ORDER {
            let group = *group;
            // handlers may change masks, always use the current one
            let mask = self.intr.mask(group);
            if mask == 0 {
                continue;
            }

            let regs = group.regs();
            let status = self.read_reg(regs.status)? & mask;
            if status == 0 {
                continue;
            }

            debug!("intr: {} status {:02X}", group.name(), status);
            self.stats.record(group);

            if let IsrOutcome::Cleared(done) = self.service(group, status, info)? {
                let rest = status & !done;
                if rest != 0 {
                    self.write_reg(regs.status, rest)?;
                }
            }
        }
        Ok(())
    }

    fn service(&mut self, group: InterruptGroup, status: u8, info: &mut InterruptInfo) -> Result<IsrOutcome> {
        match group {
            InterruptGroup::Disc => self.disc_isr(status, info),
            InterruptGroup::G2wb => self.g2wb_isr(status, info),
            InterruptGroup::Msc => self.msc_isr(status, info),
            InterruptGroup::Merr => self.merr_isr(status, info),
            InterruptGroup::Edid => self.edid_isr(status, info),
            InterruptGroup::Intr1 => self.intr1_isr(status),
            #[cfg(feature = "hdcp")]
            InterruptGroup::Hdcp => self.hdcp_isr(status),
            #[cfg(feature = "hdcp")]
            InterruptGroup::Hdcp2 => self.hdcp2_isr(status),
            #[cfg(not(feature = "hdcp"))]
            InterruptGroup::Hdcp | InterruptGroup::Hdcp2 => Ok(IsrOutcome::Cleared(0)),
        }
    }
}
