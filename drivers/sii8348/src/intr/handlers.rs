//! Per-group interrupt handlers
//!
//! Each handler receives the masked status byte of its group and reports
//! through [`IsrOutcome`] which bits it already cleared.

use log::{debug, error, info, warn};

use super::{InterruptGroup, IsrOutcome};
use crate::config::VBUS_SETTLE_MS;
use crate::edid::parser::EdidParser;
use crate::error::Result;
use crate::hal::{Platform, RegisterBus};
use crate::mhl::{rchg, status as mhl_status, SCRATCHPAD_SIZE};
use crate::notify::{DrvIntrFlags, InterruptInfo};
use crate::regs::{self, CbusInt0, CbusInt1, Intr1, Intr3, Intr4};
use crate::state::LinkEvent;
use crate::Sii8348;

/// Discovery interrupts armed once an RGND reading has been taken.
pub const DISC_CONNECTED_MASK: Intr4 = Intr4::MHL_EST
    .union(Intr4::NON_MHL_EST)
    .union(Intr4::CBUS_LKOUT)
    .union(Intr4::CBUS_DISCONNECT)
    .union(Intr4::RGND_DETECTION)
    .union(Intr4::VBUS_CHG);

pub const MERR_MASK: CbusInt1 = CbusInt1::DDC_ABRT
    .union(CbusInt1::MSC_ABORT_RCVD)
    .union(CbusInt1::CMD_ABORT);

pub const MSC_MASK: CbusInt0 = CbusInt0::MT_DONE
    .union(CbusInt0::HPD_RCVD)
    .union(CbusInt0::WRITE_STAT)
    .union(CbusInt0::MSC_MSG)
    .union(CbusInt0::WRITE_BURST)
    .union(CbusInt0::SET_INT)
    .union(CbusInt0::MT_DONE_NACK);

pub const EDID_MASK: Intr3 = Intr3::DDC_CMD_DONE.union(Intr3::DDC_FIFO_FULL);

impl<B: RegisterBus, P: Platform, E: EdidParser> Sii8348<B, P, E> {
    /// INTR4: RGND, MHL_EST and disconnect.
    pub(crate) fn disc_isr(&mut self, status: u8, info: &mut InterruptInfo) -> Result<IsrOutcome> {
        let events = Intr4::from_bits_truncate(status);

        if events.intersects(Intr4::CBUS_DISCONNECT | Intr4::NON_MHL_EST) {
            error!("mhl: CBUS disconnect or USB ({:?})", events);
            info.flags.insert(DrvIntrFlags::DISCONNECT);
            self.disconnect_mhl(true)?;
            self.switch_to_d3(false)?;
            // every status register was cleared by the disconnect
            return Ok(IsrOutcome::Cleared(0xFF));
        }

        if events.contains(Intr4::RGND_DETECTION) {
            let rgnd = self.read_reg(regs::DISC_STAT2)? & regs::RGND_MASK;
            if rgnd == regs::RGND_1K {
                info!("mhl: cable impedance 1k, MHL device");
                self.rgnd_wake()?;
                self.link_event(LinkEvent::Rgnd);
            } else {
                debug!("mhl: RGND {:02X}, not an MHL device", rgnd);
            }
            self.enable_intr(InterruptGroup::Disc, DISC_CONNECTED_MASK.bits())?;
            self.enable_intr(InterruptGroup::Merr, MERR_MASK.bits())?;
            self.enable_intr(InterruptGroup::Msc, MSC_MASK.bits())?;
            self.enable_intr(InterruptGroup::Intr1, Intr1::RSEN_CHG.bits())?;
        } else if events.contains(Intr4::MHL_EST) {
            info!("mhl: MHL_EST, MHL connection");
            self.init_regs()?;
            self.link_event(LinkEvent::MhlEstablished);
            info.flags.insert(DrvIntrFlags::CONNECT);
        }

        Ok(IsrOutcome::Cleared(0))
    }

    /// Power the chip back up after a 1k RGND reading and start discovery.
    fn rgnd_wake(&mut self) -> Result<()> {
        self.write_reg(regs::DISC_CTRL1, regs::DISC_CTRL1_RGND_SETUP)?;
        self.write_reg(
            regs::INT_CTRL,
            regs::int_ctrl::POLARITY_LEVEL_LOW | regs::int_ctrl::OPEN_DRAIN,
        )?;
        self.tmds_configure()?;
        self.power_up()?;
        self.read_chip_id()?;
        self.write_reg(regs::INTR4_MASK, 0x00)?;
        self.write_reg(
            regs::DISC_CTRL1,
            regs::DISC_CTRL1_DEFAULT | regs::disc::CTRL1_MHL_DISCOVERY_ENABLE,
        )?;
        self.write_reg(
            regs::MHLTX_CTL1,
            regs::mhltx::CTL1_TX_TERM_MODE_OFF | regs::mhltx::CTL1_DISC_OVRIDE_ON,
        )?;
        self.restore_discovery_defaults()?;
        // wake pulse then discovery
        self.write_reg(
            regs::DISC_CTRL9,
            regs::disc::CTRL9_WAKE_DRVFLT | regs::disc::CTRL9_DISC_PULSE_PROCEED,
        )?;
        self.platform.set_vbus(true);
        self.platform.delay_ms(VBUS_SETTLE_MS);
        Ok(())
    }

    /// MDT_INT_0: hardware write burst received.
    pub(crate) fn g2wb_isr(&mut self, _status: u8, info: &mut InterruptInfo) -> Result<IsrOutcome> {
        let err = self.read_reg(regs::MDT_INT_1)?;
        if err != 0 {
            self.write_reg(regs::MDT_INT_1, err)?;
            warn!("cbus: MDT error {:02X}", err);
            return Ok(IsrOutcome::Cleared(0));
        }

        // length byte followed by the scratchpad image
        let mut fifo = [0u8; SCRATCHPAD_SIZE + 1];
        self.read_reg_block(regs::MDT_RCV_READ_PORT, &mut fifo)?;
        debug!("cbus: write burst, length byte {}", fifo[0]);
        self.write_burst_data.copy_from_slice(&fifo[1..]);
        info.write_burst = self.write_burst_data;
        info.flags.insert(DrvIntrFlags::WRITE_BURST);

        self.write_reg(
            regs::MDT_RCV_CONTROL,
            regs::mdt_rcv::RFIFO_CLR_CUR_CLEAR | regs::mdt_rcv::RCV_EN_ENABLE,
        )?;
        Ok(IsrOutcome::Cleared(0))
    }

    /// CBUS_INT_0: MSC traffic. Clears its own status bits.
    pub(crate) fn msc_isr(&mut self, status: u8, info: &mut InterruptInfo) -> Result<IsrOutcome> {
        let events = CbusInt0::from_bits_truncate(status);

        let others = status & !CbusInt0::HPD_RCVD.bits();
        if others != 0 {
            self.write_reg(regs::CBUS_INT_0, others)?;
        }

        if events.contains(CbusInt0::HPD_RCVD) {
            self.handle_hpd_change(info)?;
        }

        if events.contains(CbusInt0::MT_DONE) {
            let data = self.read_reg(regs::PRI_RD_DATA_1ST)?;
            debug!("cbus: MSC done, data {:02X}", data);
            info.msc_done(data);
            self.enable_gen2_write_burst()?;
        }

        if events.contains(CbusInt0::MT_DONE_NACK) {
            warn!("cbus: MSC done with NACK");
            info.flags.insert(DrvIntrFlags::MSC_NAK);
        }

        if events.contains(CbusInt0::WRITE_STAT) {
            self.read_reg_block(regs::WRITE_STAT_0, &mut info.write_stat)?;
            if info.write_stat[0] & mhl_status::DCAP_RDY != 0 {
                info!("cbus: peer DCAP_RDY");
                self.enable_intr(InterruptGroup::Edid, EDID_MASK.bits())?;
                self.link_event(LinkEvent::DcapReady);
            }
            info.flags.insert(DrvIntrFlags::WRITE_STAT);
        }

        if events.contains(CbusInt0::MSC_MSG) {
            self.read_reg_block(regs::MSC_MR_MSC_MSG_RCVD_1ST_DATA, &mut info.msc_msg)?;
            debug!("cbus: MSC_MSG {:02X} {:02X}", info.msc_msg[0], info.msc_msg[1]);
            info.flags.insert(DrvIntrFlags::MSC_RECVD);
        }

        if events.contains(CbusInt0::SET_INT) {
            self.handle_set_int(info)?;
        }

        Ok(IsrOutcome::Handled)
    }

    fn handle_hpd_change(&mut self, info: &mut InterruptInfo) -> Result<()> {
        let mut cbus_status = self.read_reg(regs::CBUS_STATUS)?;
        let mut hpd = cbus_status & regs::cbus_status::HPD;

        if (self.cbus_status ^ cbus_status) & regs::cbus_status::HPD != 0 {
            self.write_reg(regs::CBUS_INT_0, CbusInt0::HPD_RCVD.bits())?;
        } else {
            // level did not move, a transition was missed
            warn!("cbus: missed HPD change, keeping HPD_RCVD pending");
            hpd ^= regs::cbus_status::HPD;
            cbus_status ^= regs::cbus_status::HPD;
        }

        info.flags.insert(DrvIntrFlags::HPD_CHANGE);
        info.hpd_status = hpd;

        if hpd == 0 {
            info!("cbus: HPD low");
            self.cursor.block = 0;
            self.disable_gen2_write_burst()?;
            self.ready_for_mdt = false;
            self.edid.reset();
        } else {
            info!("cbus: HPD high");
        }
        self.video.ready = true;

        self.stop_video()?;
        self.cbus_status = cbus_status;
        Ok(())
    }

    fn handle_set_int(&mut self, info: &mut InterruptInfo) -> Result<()> {
        info.flags.insert(DrvIntrFlags::SET_INT);
        self.read_reg_block(regs::SET_INT_0, &mut info.int_msg)?;
        self.write_reg_block(regs::SET_INT_0, &info.int_msg)?;

        if info.int_msg[1] & rchg::EDID_CHG != 0 {
            info!("cbus: EDID change");
            self.modify_reg(regs::TPI_INFO_FSEL, regs::info_fsel::RPT, 0)?;
            self.stop_video()?;
            self.set_hw_tpi_mode(false)?;
            self.set_hw_tpi_mode(true)?;
            #[cfg(feature = "hdcp")]
            self.clear_hdcp_status()?;
        } else if info.int_msg[0] & rchg::DSCR_CHG != 0 {
            if self.gen2_write_burst {
                debug!("cbus: DSCR_CHG while MDT active, ignored");
            } else {
                let mut pad = [0u8; SCRATCHPAD_SIZE];
                self.read_reg_block(regs::MHL_SCRPAD_0, &mut pad)?;
                self.write_burst_data = pad;
                info.write_burst = pad;
                debug!("cbus: scratchpad updated");
            }
        } else if info.int_msg[0] & rchg::DCAP_CHG != 0 {
            info!("cbus: peer DCAP_CHG");
        }
        Ok(())
    }

    /// CBUS_INT_1: DDC and MSC aborts.
    pub(crate) fn merr_isr(&mut self, status: u8, info: &mut InterruptInfo) -> Result<IsrOutcome> {
        let events = CbusInt1::from_bits_truncate(status);

        if events.contains(CbusInt1::DDC_ABRT) {
            let reason = self.read_reg(regs::CBUS_DDC_ABORT_INT)?;
            warn!("cbus: DDC abort, reason {:02X}", reason);
            if reason & regs::ddc_abort::PEER_ABORT != 0 {
                warn!("cbus: DDC aborted by peer");
            }
            if self.stats.record_ddc_abort(self.config.ddc_abort_threshold) {
                error!("cbus: too many DDC aborts, resetting DDC FIFO");
                self.reset_ddc_fifo()?;
            }
        }

        if events.contains(CbusInt1::MSC_ABORT_RCVD) {
            info.flags.insert(DrvIntrFlags::CBUS_ABORT);
            let reason = self.read_reg(regs::MSC_RCV_ERROR)?;
            self.stats.msc_aborts += 1;
            warn!("cbus: MSC receive abort, reason {:02X}", reason);
            self.log_abort_reason(reason);
            if self.stats.msc_aborts > self.config.msc_abort_threshold {
                error!("cbus: {} MSC receive aborts", self.stats.msc_aborts);
            }
        }

        if events.contains(CbusInt1::CMD_ABORT) {
            info.flags.insert(DrvIntrFlags::CBUS_ABORT);
            let reason = self.read_reg(regs::MSC_MT_ABORT_INT)?;
            self.write_reg(regs::MSC_MT_ABORT_INT, reason)?;
            self.stats.cmd_aborts += 1;
            warn!("cbus: MSC send abort, reason {:02X}", reason);
            self.log_abort_reason(reason);
        }

        Ok(IsrOutcome::Cleared(0))
    }

    fn log_abort_reason(&self, reason: u8) {
        use regs::mt_abort::*;

        if reason & MAX_FAIL != 0 {
            warn!("cbus:   retry threshold exceeded");
        }
        if reason & PROTO_ERR != 0 {
            warn!("cbus:   protocol error");
        }
        if reason & TIMEOUT != 0 {
            warn!("cbus:   translation layer timeout");
        }
        if reason & UNDEF_CMD != 0 {
            warn!("cbus:   undefined opcode");
        }
        if reason & PEER_ABORT != 0 {
            warn!("cbus:   peer sent an abort");
        }
    }

    /// INTR1: RSEN change, logged only.
    pub(crate) fn intr1_isr(&mut self, status: u8) -> Result<IsrOutcome> {
        if Intr1::from_bits_truncate(status).contains(Intr1::RSEN_CHG) {
            let sys_stat = self.read_reg(regs::SYS_STAT)?;
            if sys_stat & regs::sys_stat::RSEN != 0 {
                info!("mhl: RSEN high");
            } else {
                info!("mhl: RSEN low");
            }
        }
        Ok(IsrOutcome::Cleared(0))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::intr::DISPATCH_ORDER;
    use crate::mhl::status::DCAP_RDY;
    use crate::state::LinkState;
    use crate::testing::{harness, PlatformEvent};

    fn run_isr<B: RegisterBus, P: Platform, E: EdidParser>(dev: &mut Sii8348<B, P, E>) -> InterruptInfo {
        let mut info = InterruptInfo::new();
        dev.device_isr(&mut info).unwrap();
        info
    }

    #[test]
    fn test_rgnd_1k_wakes_chip_and_arms_interrupts() {
        let mut dev = harness();
        dev.enable_intr(InterruptGroup::Disc, Intr4::RGND_DETECTION.bits()).unwrap();
        dev.bus.set(regs::INTR4, Intr4::RGND_DETECTION.bits());
        dev.bus.set(regs::DISC_STAT2, 0x02);
        dev.bus.clear_log();

        let info = run_isr(&mut dev);
        assert!(info.flags.is_empty());

        assert_eq!(dev.platform.events(), &[PlatformEvent::Vbus(true), PlatformEvent::Delay(100)]);
        assert_eq!(dev.bus.writes_to(regs::DISC_CTRL1)[0], 0x25);
        assert_eq!(dev.bus.writes_to(regs::SYS_CTRL1), vec![regs::sys_ctrl1::POWER_UP]);
        assert_eq!(dev.link_state(), LinkState::Discovery);

        // DISC, then MSC, then RSEN are re-armed in that order
        let disc = dev.bus.last_write_index(regs::INTR4_MASK).unwrap();
        let msc = dev.bus.last_write_index(regs::CBUS_INT_0_MASK).unwrap();
        let rsen = dev.bus.last_write_index(regs::INTR1_MASK).unwrap();
        assert!(disc < msc && msc < rsen);
        assert_eq!(dev.intr_mask(InterruptGroup::Disc), DISC_CONNECTED_MASK.bits());
        assert_eq!(dev.intr_mask(InterruptGroup::Msc), MSC_MASK.bits());
        assert_eq!(dev.intr_mask(InterruptGroup::Merr), MERR_MASK.bits());
        assert_eq!(dev.intr_mask(InterruptGroup::Intr1), Intr1::RSEN_CHG.bits());
        // the dispatcher clears the RGND bit
        assert_eq!(dev.bus.writes_to(regs::INTR4), vec![Intr4::RGND_DETECTION.bits()]);
    }

    #[test]
    fn test_rgnd_other_impedance_only_arms_interrupts() {
        let mut dev = harness();
        dev.enable_intr(InterruptGroup::Disc, Intr4::RGND_DETECTION.bits()).unwrap();
        dev.bus.set(regs::INTR4, Intr4::RGND_DETECTION.bits());
        dev.bus.set(regs::DISC_STAT2, 0x01);

        run_isr(&mut dev);

        assert!(dev.platform.events().is_empty());
        assert_eq!(dev.link_state(), LinkState::D3);
        assert_eq!(dev.intr_mask(InterruptGroup::Msc), MSC_MASK.bits());
    }

    #[test]
    fn test_mhl_est_raises_connect() {
        let mut dev = harness();
        dev.link = LinkState::Discovery;
        dev.chip.device_id = 0x8348;
        dev.enable_intr(InterruptGroup::Disc, DISC_CONNECTED_MASK.bits()).unwrap();
        dev.bus.set(regs::INTR4, Intr4::MHL_EST.bits());

        let info = run_isr(&mut dev);

        assert!(info.has(DrvIntrFlags::CONNECT));
        assert_eq!(dev.link_state(), LinkState::Established);
        assert_eq!(dev.bus.get(regs::DPD), regs::DPD_MHL_ON);
        assert_eq!(dev.bus.get(regs::DEVICE_CAP_0.add(0x0B)), 0x83);
    }

    #[test]
    fn test_cbus_disconnect_enters_d3_with_only_discovery_enabled() {
        let mut dev = harness();
        dev.link = LinkState::Connected;
        for group in DISPATCH_ORDER {
            dev.enable_intr(*group, 0xFF).unwrap();
        }
        dev.bus.set(regs::INTR4, Intr4::CBUS_DISCONNECT.bits());
        dev.bus.set(regs::DPD, 0x17);
        dev.bus.clear_log();

        let info = run_isr(&mut dev);

        assert!(info.has(DrvIntrFlags::DISCONNECT));
        assert_eq!(dev.link_state(), LinkState::D3);
        for group in DISPATCH_ORDER {
            let expected = if *group == InterruptGroup::Disc {
                Intr4::RGND_DETECTION.bits()
            } else {
                0
            };
            assert_eq!(dev.intr_mask(*group), expected);
        }
        // master power bit dropped, VBUS off
        assert_eq!(dev.bus.get(regs::DPD) & regs::dpd::MASTER_POWER_CTRL, 0);
        assert_eq!(dev.platform.events()[0], PlatformEvent::Vbus(false));
        // status written once with 0xFF by the disconnect, never by the dispatcher
        assert_eq!(dev.bus.writes_to(regs::INTR4), vec![0xFF]);
        assert_eq!(dev.cbus_status, 0);
    }

    #[test]
    fn test_mt_done_nack_sets_nak_only() {
        let mut dev = harness();
        dev.enable_intr(InterruptGroup::Msc, MSC_MASK.bits()).unwrap();
        dev.bus.set(regs::CBUS_INT_0, CbusInt0::MT_DONE_NACK.bits());

        let info = run_isr(&mut dev);

        assert!(info.has(DrvIntrFlags::MSC_NAK));
        assert!(!info.has(DrvIntrFlags::MSC_DONE));
    }

    #[test]
    fn test_mt_done_reports_reply_byte() {
        let mut dev = harness();
        dev.enable_intr(InterruptGroup::Msc, MSC_MASK.bits()).unwrap();
        dev.bus.set(regs::CBUS_INT_0, CbusInt0::MT_DONE.bits());
        dev.bus.set(regs::PRI_RD_DATA_1ST, 0x5A);

        let info = run_isr(&mut dev);

        assert!(info.has(DrvIntrFlags::MSC_DONE));
        assert_eq!(info.msc_done_data, 0x5A);
    }

    #[test]
    fn test_hpd_rising_is_acknowledged() {
        let mut dev = harness();
        dev.enable_intr(InterruptGroup::Msc, MSC_MASK.bits()).unwrap();
        dev.bus.set(regs::CBUS_INT_0, CbusInt0::HPD_RCVD.bits());
        dev.bus.set(regs::CBUS_STATUS, regs::cbus_status::HPD | 0x01);
        dev.bus.clear_log();

        let info = run_isr(&mut dev);

        assert!(info.has(DrvIntrFlags::HPD_CHANGE));
        assert_eq!(info.hpd_status, regs::cbus_status::HPD);
        assert_eq!(dev.bus.writes_to(regs::CBUS_INT_0), vec![CbusInt0::HPD_RCVD.bits()]);
        assert_eq!(dev.cbus_status, regs::cbus_status::HPD | 0x01);
        // video is stopped on every HPD change
        assert!(!dev.bus.writes_to(regs::TPI_SYSTEM_CONTROL).is_empty());
    }

    #[test]
    fn test_missed_hpd_change_is_inverted_and_left_pending() {
        let mut dev = harness();
        dev.cbus_status = regs::cbus_status::HPD;
        dev.ready_for_mdt = true;
        dev.enable_intr(InterruptGroup::Msc, MSC_MASK.bits()).unwrap();
        dev.bus.set(regs::CBUS_INT_0, CbusInt0::HPD_RCVD.bits());
        dev.bus.set(regs::CBUS_STATUS, regs::cbus_status::HPD);
        dev.bus.clear_log();

        let info = run_isr(&mut dev);

        // level unchanged means a low pulse was missed
        assert_eq!(info.hpd_status, 0);
        assert!(dev.bus.writes_to(regs::CBUS_INT_0).is_empty());
        assert_eq!(dev.cbus_status, 0);
        assert!(!dev.ready_for_mdt);
        assert_eq!(dev.cursor.block, 0);
        assert_eq!(dev.sink().resets, 1);
    }

    #[test]
    fn test_write_stat_dcap_rdy_enables_edid_group() {
        let mut dev = harness();
        dev.link = LinkState::Established;
        dev.enable_intr(InterruptGroup::Msc, MSC_MASK.bits()).unwrap();
        dev.bus.set(regs::CBUS_INT_0, CbusInt0::WRITE_STAT.bits());
        dev.bus.set(regs::WRITE_STAT_0, DCAP_RDY);
        dev.bus.set(regs::WRITE_STAT_0.add(1), 0x0B);

        let info = run_isr(&mut dev);

        assert!(info.has(DrvIntrFlags::WRITE_STAT));
        assert_eq!(info.write_stat[0], DCAP_RDY);
        assert_eq!(info.write_stat[1], 0x0B);
        assert_eq!(dev.intr_mask(InterruptGroup::Edid), EDID_MASK.bits());
        assert_eq!(dev.link_state(), LinkState::Connected);
    }

    #[test]
    fn test_msc_msg_payload() {
        let mut dev = harness();
        dev.enable_intr(InterruptGroup::Msc, MSC_MASK.bits()).unwrap();
        dev.bus.set(regs::CBUS_INT_0, CbusInt0::MSC_MSG.bits());
        dev.bus.set(regs::MSC_MR_MSC_MSG_RCVD_1ST_DATA, 0x10);
        dev.bus.set(regs::MSC_MR_MSC_MSG_RCVD_1ST_DATA.add(1), 0x44);

        let info = run_isr(&mut dev);

        assert!(info.has(DrvIntrFlags::MSC_RECVD));
        assert_eq!(info.msc_msg, [0x10, 0x44]);
    }

    #[test]
    fn test_set_int_dscr_chg_copies_scratchpad() {
        let mut dev = harness();
        dev.enable_intr(InterruptGroup::Msc, MSC_MASK.bits()).unwrap();
        dev.bus.set(regs::CBUS_INT_0, CbusInt0::SET_INT.bits());
        dev.bus.set(regs::SET_INT_0, rchg::DSCR_CHG);
        for i in 0..16u8 {
            dev.bus.set(regs::MHL_SCRPAD_0.add(i), 0xA0 + i);
        }

        let info = run_isr(&mut dev);

        assert!(info.has(DrvIntrFlags::SET_INT));
        assert_eq!(info.int_msg[0], rchg::DSCR_CHG);
        // interrupt bytes are written back to acknowledge
        assert_eq!(dev.bus.writes_to(regs::SET_INT_0), vec![rchg::DSCR_CHG]);
        let mut pad = [0u8; 4];
        dev.scratch_pad(2, &mut pad).unwrap();
        assert_eq!(pad, [0xA2, 0xA3, 0xA4, 0xA5]);
    }

    #[test]
    fn test_set_int_edid_chg_toggles_tpi_mode() {
        let mut dev = harness();
        dev.enable_intr(InterruptGroup::Msc, MSC_MASK.bits()).unwrap();
        dev.bus.set(regs::CBUS_INT_0, CbusInt0::SET_INT.bits());
        dev.bus.set(regs::SET_INT_0.add(1), rchg::EDID_CHG);
        dev.bus.set(regs::TPI_INFO_FSEL, 0xC2);

        run_isr(&mut dev);

        assert_eq!(dev.bus.get(regs::TPI_INFO_FSEL) & regs::info_fsel::RPT, 0);
        let sel = dev.bus.writes_to(regs::TPI_SEL);
        assert_eq!(
            sel,
            vec![regs::tpi_sel::SW_TPI_EN_NON_HW_TPI, regs::tpi_sel::SW_TPI_EN_HW_TPI]
        );
    }

    #[test]
    fn test_g2wb_copies_payload() {
        let mut dev = harness();
        dev.enable_intr(InterruptGroup::G2wb, regs::MdtInt0::RXFIFO_DATA_RDY.bits()).unwrap();
        dev.bus.set(regs::MDT_INT_0, regs::MdtInt0::RXFIFO_DATA_RDY.bits());
        let mut fifo = [0u8; 17];
        fifo[0] = 16;
        for i in 0..16u8 {
            fifo[i as usize + 1] = i;
        }
        dev.bus.push_block(regs::MDT_RCV_READ_PORT, &fifo);

        let info = run_isr(&mut dev);

        assert!(info.has(DrvIntrFlags::WRITE_BURST));
        assert_eq!(info.write_burst[15], 15);
        assert_eq!(
            dev.bus.writes_to(regs::MDT_RCV_CONTROL),
            vec![regs::mdt_rcv::RFIFO_CLR_CUR_CLEAR | regs::mdt_rcv::RCV_EN_ENABLE]
        );
    }

    #[test]
    fn test_g2wb_error_is_acknowledged() {
        let mut dev = harness();
        dev.enable_intr(InterruptGroup::G2wb, regs::MdtInt0::RXFIFO_DATA_RDY.bits()).unwrap();
        dev.bus.set(regs::MDT_INT_0, regs::MdtInt0::RXFIFO_DATA_RDY.bits());
        dev.bus.set(regs::MDT_INT_1, 0x04);

        let info = run_isr(&mut dev);

        assert!(!info.has(DrvIntrFlags::WRITE_BURST));
        assert_eq!(dev.bus.writes_to(regs::MDT_INT_1), vec![0x04]);
    }

    #[test]
    fn test_merr_counts_aborts() {
        let mut dev = harness();
        dev.enable_intr(InterruptGroup::Merr, MERR_MASK.bits()).unwrap();
        dev.bus.set(regs::CBUS_INT_1, (CbusInt1::MSC_ABORT_RCVD | CbusInt1::CMD_ABORT).bits());
        dev.bus.set(regs::MSC_MT_ABORT_INT, regs::mt_abort::TIMEOUT);

        let info = run_isr(&mut dev);

        assert!(info.has(DrvIntrFlags::CBUS_ABORT));
        assert_eq!(dev.stats().msc_aborts, 1);
        assert_eq!(dev.stats().cmd_aborts, 1);
        assert_eq!(dev.bus.writes_to(regs::MSC_MT_ABORT_INT), vec![regs::mt_abort::TIMEOUT]);
    }

    #[test]
    fn test_ddc_abort_threshold_resets_fifo() {
        let mut dev = harness();
        dev.enable_intr(InterruptGroup::Merr, MERR_MASK.bits()).unwrap();

        for _ in 0..10 {
            dev.bus.set(regs::CBUS_INT_1, CbusInt1::DDC_ABRT.bits());
            run_isr(&mut dev);
        }
        assert!(dev.bus.writes_to(regs::DDC_CMD).is_empty());

        dev.bus.set(regs::CBUS_INT_1, CbusInt1::DDC_ABRT.bits());
        run_isr(&mut dev);
        assert_eq!(dev.bus.get(regs::DDC_CMD) & regs::ddc::CMD_MASK, regs::ddc::CMD_CLEAR_FIFO);
        assert_eq!(dev.stats().ddc_aborts, 0);
    }
}
