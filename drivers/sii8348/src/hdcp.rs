//! HDCP authentication sequencing
//!
//! The TPI block runs the HDCP 1.x protocol itself. The driver only arms
//! the two TPI interrupt groups, waits for the BKSV fetch, raises the
//! protection level and reacts to link status changes.

use log::{debug, info, warn};

use crate::config::{HDCP_BKSV_POLL_LIMIT, HDCP_BKSV_SETTLE_MS, HDCP_ERROR_THRESHOLD, HDCP_RPTR_CTS_DELAY_MS};
use crate::edid::parser::EdidParser;
use crate::error::Result;
use crate::hal::{Platform, RegisterBus};
use crate::intr::{InterruptGroup, IsrOutcome};
use crate::regs::{self, hdcp, sys_ctrl, TpiIntrSt0, TpiIntrSt1};
use crate::Sii8348;

/// HDCP authentication progress.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HdcpState {
    Stopped,
    /// TMDS on, waiting for the sink BKSV
    WaitingBksv,
    /// Protection level raised, engine authenticating
    Authenticating,
    Authenticated,
    /// Sink asked for renegotiation, output muted
    Renegotiating,
}

/// Error counters, diagnostic only.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct HdcpErrors {
    pub bksv: u32,
    pub renegotiation: u32,
    pub link: u32,
    pub suspend: u32,
}

impl HdcpErrors {
    pub const fn new() -> Self {
        Self {
            bksv: 0,
            renegotiation: 0,
            link: 0,
            suspend: 0,
        }
    }

    pub fn over_threshold(&self) -> bool {
        self.bksv > HDCP_ERROR_THRESHOLD
            || self.renegotiation > HDCP_ERROR_THRESHOLD
            || self.link > HDCP_ERROR_THRESHOLD
            || self.suspend > HDCP_ERROR_THRESHOLD
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct HdcpSession {
    pub(crate) state: HdcpState,
}

impl HdcpSession {
    pub const fn new() -> Self {
        Self {
            state: HdcpState::Stopped,
        }
    }

    pub fn state(&self) -> HdcpState {
        self.state
    }
}

pub const HDCP_MASK: TpiIntrSt0 = TpiIntrSt0::HDCP_AUTH_STATUS_CHANGE.union(TpiIntrSt0::HDCP_SECURITY_CHANGE);
pub const HDCP2_MASK: TpiIntrSt1 = TpiIntrSt1::BKSV_DONE.union(TpiIntrSt1::BKSV_ERR);

impl<B: RegisterBus, P: Platform, E: EdidParser> Sii8348<B, P, E> {
    pub fn hdcp_state(&self) -> HdcpState {
        self.hdcp.state
    }

    pub(crate) fn clear_hdcp_status(&mut self) -> Result<()> {
        self.write_reg(regs::TPI_INTR_ST0, 0xFF)?;
        self.write_reg(regs::TPI_INTR_ST1, 0xFF)
    }

    /// Mute, then turn TMDS on with the HDCP interrupts armed.
    pub(crate) fn start_hdcp(&mut self) -> Result<()> {
        info!("hdcp: start");
        self.power_down_output()?;
        let packed = self.packed_pixel_mode();
        self.video_state = self.video_state.on_mute(packed);

        let errors = self.stats.hdcp;
        if errors.over_threshold() {
            warn!(
                "hdcp: many errors, bksv {} reneg {} link {} suspend {}",
                errors.bksv, errors.renegotiation, errors.link, errors.suspend
            );
        }

        if !self.hpd_asserted()? {
            debug!("hdcp: no HPD, not starting");
            return Ok(());
        }

        self.enable_intr(InterruptGroup::Hdcp, HDCP_MASK.bits())?;
        self.enable_intr(InterruptGroup::Hdcp2, HDCP2_MASK.bits())?;
        // let the sink settle before TMDS comes up
        self.platform.delay_ms(HDCP_BKSV_SETTLE_MS);
        self.modify_reg(
            regs::TPI_SYSTEM_CONTROL,
            sys_ctrl::TMDS_OUTPUT_CONTROL_MASK,
            sys_ctrl::TMDS_OUTPUT_CONTROL_ACTIVE,
        )?;
        self.hdcp.state = HdcpState::WaitingBksv;
        Ok(())
    }

    fn hdcp_authenticated(&mut self) -> Result<()> {
        info!("hdcp: link secure");
        self.hdcp.state = HdcpState::Authenticated;
        self.unmute_video()
    }

    /// TPI_INTR_ST0: authentication and link security changes.
    pub(crate) fn hdcp_isr(&mut self, status: u8) -> Result<IsrOutcome> {
        let events = TpiIntrSt0::from_bits_truncate(status);
        let query = self.read_reg(regs::TPI_HDCP_QUERY)?;
        debug!("hdcp: status {:02X} query {:02X}", status, query);

        if events.contains(TpiIntrSt0::HDCP_SECURITY_CHANGE) {
            match query & hdcp::LINK_STATUS_MASK {
                hdcp::LINK_STATUS_NORMAL => self.hdcp_authenticated()?,
                hdcp::LINK_STATUS_LINK_LOST => {
                    warn!("hdcp: link lost");
                    self.stats.hdcp.link += 1;
                    self.start_hdcp()?;
                }
                hdcp::LINK_STATUS_RENEGOTIATION_REQ => {
                    warn!("hdcp: renegotiation requested");
                    self.stats.hdcp.renegotiation += 1;
                    self.modify_reg(
                        regs::TPI_SYSTEM_CONTROL,
                        sys_ctrl::AV_MUTE_MASK,
                        sys_ctrl::AV_MUTE_MUTED,
                    )?;
                    self.write_reg(regs::TPI_HDCP_CONTROL, 0)?;
                    let packed = self.packed_pixel_mode();
                    self.video_state = self.video_state.on_mute(packed);
                    self.hdcp.state = HdcpState::Renegotiating;
                }
                _ => {
                    warn!("hdcp: link suspended");
                    self.stats.hdcp.suspend += 1;
                    self.start_hdcp()?;
                }
            }
        } else if events.contains(TpiIntrSt0::HDCP_AUTH_STATUS_CHANGE) {
            let protection = query & (hdcp::LOCAL_LINK_PROTECTION | hdcp::LINK_PROTECTION_MASK);
            if protection == hdcp::LINK_PROTECTION_NONE {
                warn!("hdcp: authentication lost");
                self.stats.hdcp.link += 1;
                self.start_hdcp()?;
            } else {
                self.hdcp_authenticated()?;
            }
        }

        Ok(IsrOutcome::Cleared(0))
    }

    /// TPI_INTR_ST1: BKSV fetch finished or failed.
    pub(crate) fn hdcp2_isr(&mut self, status: u8) -> Result<IsrOutcome> {
        let events = TpiIntrSt1::from_bits_truncate(status);
        let query = self.read_reg(regs::TPI_HDCP_QUERY)?;
        debug!("hdcp: st1 {:02X} query {:02X}", status, query);

        if events.contains(TpiIntrSt1::BKSV_DONE) {
            if query & hdcp::PROTECTION_TYPE_MASK == hdcp::PROTECTION_TYPE_HDCP {
                self.begin_authentication()?;
            }
        } else if events.contains(TpiIntrSt1::BKSV_ERR) {
            warn!("hdcp: BKSV error");
            self.stats.hdcp.bksv += 1;
            self.start_hdcp()?;
        }

        Ok(IsrOutcome::Cleared(0))
    }

    fn begin_authentication(&mut self) -> Result<()> {
        // query data is only valid once the engine leaves the fetch state
        let mut engine = self.read_reg(regs::TPI_HW_DBG6)? & hdcp::HW_DBG6_STATE_MASK;
        let mut polls = 1;
        while engine == hdcp::HW_DBG6_BKSV_FETCH && polls < HDCP_BKSV_POLL_LIMIT {
            engine = self.read_reg(regs::TPI_HW_DBG6)? & hdcp::HW_DBG6_STATE_MASK;
            polls += 1;
        }
        if engine == hdcp::HW_DBG6_BKSV_FETCH {
            warn!("hdcp: BKSV fetch did not settle after {} polls", polls);
            return Ok(());
        }
        if engine < hdcp::HW_DBG6_BKSV_FETCH {
            debug!("hdcp: engine restarted, waiting for next BKSV_DONE");
            return Ok(());
        }

        let query = self.read_reg(regs::TPI_HDCP_QUERY)?;
        if query & hdcp::REPEATER != 0 {
            info!("hdcp: repeater downstream");
            self.platform.delay_ms(HDCP_RPTR_CTS_DELAY_MS);
        }
        self.write_reg(regs::TPI_HDCP_CONTROL, hdcp::CONTROL_PROTLEVEL_MAX)?;
        self.hdcp.state = HdcpState::Authenticating;
        Ok(())
    }
}
