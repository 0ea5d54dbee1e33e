//! Power, reset and connection lifecycle
//!
//! The chip idles in D3 with only RGND detection armed. An RGND reading
//! wakes it through discovery, MHL_EST runs `init_regs`, and any
//! disconnect drops it back to D3.

use log::{debug, error, info};

use crate::config::CBUS_FLOAT_MS;
use crate::device::ChipId;
use crate::edid::parser::EdidParser;
use crate::error::{MhlError, Result};
use crate::hal::{Platform, RegAddr, RegisterBus};
use crate::mhl::local_devcap;
use crate::regs::{self, charge_pump, disc, dpd, int_ctrl, mhltx, power_state, srst, tmds_cctrl, tpi_sel};
use crate::state::{LinkEvent, VideoState};
use crate::Sii8348;

pub const DEVICE_ID_8348: u16 = 0x8348;
pub const DEVICE_ID_8346: u16 = 0x8346;

/// TPI audio/video defaults written once MHL is established.
const TPI_DEFAULTS: &[(RegAddr, u8)] = &[
    (regs::TPI_AUDIO_0B, 0x00),
    (regs::TPI_AUDIO_1F, 0x80),
    (regs::TPI_AUDIO_20, 0x80),
    (regs::TPI_AUDIO_21, 0x00),
    (regs::TPI_AUDIO_22, 0x00),
    (regs::TPI_AUDIO_23, 0x00),
    (regs::TPI_AUDIO_25, 0x0B),
];

const MHLTX_DEFAULTS: &[(RegAddr, u8)] = &[
    (regs::MHLTX_CTL2, regs::MHLTX_CTL2_DEFVAL),
    (regs::MHLTX_CTL3, regs::MHLTX_CTL3_DEFVAL),
    (regs::MHLTX_CTL4, regs::MHLTX_CTL4_DEFVAL),
    (regs::MHLTX_CTL6, regs::MHLTX_CTL6_DEFVAL),
    (regs::MHLTX_CTL7, regs::MHLTX_CTL7_DEFVAL),
    (regs::MHLTX_CTL8, regs::MHLTX_CTL8_DEFVAL),
];

impl<B: RegisterBus, P: Platform, E: EdidParser> Sii8348<B, P, E> {
    /// Reset the chip, identify it and park it in D3.
    pub fn chip_initialize(&mut self) -> Result<ChipId> {
        let config = self.config;
        self.select_video_mode(config.video_mode);
        self.select_audio_mode(config.audio_mode);
        self.board_reset(config.reset_period_ms, config.reset_delay_ms);

        self.write_reg(regs::INT_CTRL, int_ctrl::POLARITY_LEVEL_LOW | int_ctrl::OPEN_DRAIN)?;
        self.tmds_configure()?;
        self.power_up()?;
        self.write_reg(regs::INTR4_MASK, 0x00)?;
        self.write_reg(
            regs::DISC_CTRL1,
            regs::DISC_CTRL1_DEFAULT | disc::CTRL1_MHL_DISCOVERY_ENABLE,
        )?;

        let chip = self.read_chip_id()?;
        if chip.device_id != DEVICE_ID_8348 && chip.device_id != DEVICE_ID_8346 {
            error!("mhl: SiI8348 not found, id {:04X}", chip.device_id);
            return Err(MhlError::UnknownDevice(chip.device_id));
        }
        info!(
            "mhl: found SiI{:04X} rev {:X}.{:X}",
            chip.device_id,
            chip.rev >> 4,
            chip.rev & 0x0F
        );

        self.disconnect_mhl(true)?;
        self.switch_to_d3(false)?;
        self.clear_vendor_infoframe();
        Ok(chip)
    }

    pub fn shutdown(&mut self) {
        if self.platform.reset_on_exit_requested() {
            let config = self.config;
            self.board_reset(config.reset_period_ms, config.reset_delay_ms);
            info!("mhl: hardware reset on exit");
        }
    }

    /// Pulse the reset line: high, low for `period_ms`, then high and wait.
    pub(crate) fn board_reset(&mut self, period_ms: u32, delay_ms: u32) {
        self.platform.set_reset_pin(true);
        self.platform.delay_ms(period_ms);
        self.platform.set_reset_pin(false);
        self.platform.delay_ms(period_ms);
        self.platform.set_reset_pin(true);
        self.platform.delay_ms(delay_ms);
    }

    pub(crate) fn read_chip_id(&mut self) -> Result<ChipId> {
        let rev = self.read_reg(regs::DEV_REV)?;
        let hi = self.read_reg(regs::DEV_IDH)?;
        let lo = self.read_reg(regs::DEV_IDL)?;
        self.chip = ChipId {
            device_id: u16::from_be_bytes([hi, lo]),
            rev,
        };
        debug!("mhl: device id {:04X} rev {:02X}", self.chip.device_id, rev);
        Ok(self.chip)
    }

    /// Soft reset, analog power and TMDS/MHL transmitter defaults.
    pub(crate) fn tmds_configure(&mut self) -> Result<()> {
        self.write_reg(regs::SRST, regs::SRST_ALL)?;
        self.write_reg(regs::SRST, srst::MHL_FIFO_AUTO_RST)?;
        self.write_reg(regs::DPD, regs::DPD_ALL_ON)?;
        self.write_reg(regs::TMDS_CCTRL, tmds_cctrl::TMDS_OE | tmds_cctrl::SEL_BGR)?;
        self.write_reg(regs::USB_CHARGE_PUMP_MHL, charge_pump::MHL_DEFAULT)?;
        self.write_reg(regs::USB_CHARGE_PUMP, charge_pump::DEFAULT)?;
        self.write_reg(regs::DISC_CTRL3, disc::CTRL3_DEFAULT)?;
        self.write_reg(regs::MHLTX_CTL1, mhltx::CTL1_DISC_OVRIDE_ON)?;
        for (addr, value) in MHLTX_DEFAULTS {
            self.write_reg(*addr, *value)?;
        }
        Ok(())
    }

    pub(crate) fn power_up(&mut self) -> Result<()> {
        self.write_reg(regs::SYS_CTRL1, regs::sys_ctrl1::POWER_UP)
    }

    pub(crate) fn restore_discovery_defaults(&mut self) -> Result<()> {
        self.write_reg(regs::DISC_CTRL2, regs::DISC_CTRL2_DEFVAL)?;
        self.write_reg(regs::DISC_CTRL4, regs::DISC_CTRL4_DEFVAL)?;
        self.write_reg(regs::DISC_CTRL5, regs::DISC_CTRL5_DEFVAL)
    }

    /// Register setup once MHL is established.
    pub(crate) fn init_regs(&mut self) -> Result<()> {
        debug!("mhl: init_regs");
        self.video.ready = true;
        self.video.path_enabled = false;
        self.ready_for_mdt = false;

        self.write_reg(
            regs::DISC_CTRL9,
            disc::CTRL9_WAKE_DRVFLT | disc::CTRL9_CBUS_LOW_TO_DISCONNECT | disc::CTRL9_DISC_PULSE_PROCEED,
        )?;
        self.modify_reg(regs::TPI_SEL, tpi_sel::SW_TPI_EN_MASK, tpi_sel::SW_TPI_EN_HW_TPI)?;
        #[cfg(feature = "hdcp")]
        self.write_reg(regs::TPI_HDCP_CONTROL, 0)?;
        self.write_reg(regs::TPI_HW_OPT3, regs::TPI_HW_OPT3_MHL)?;
        self.write_reg(
            regs::MHLTX_CTL1,
            mhltx::CTL1_TX_TERM_MODE_100DIFF | mhltx::CTL1_DISC_OVRIDE_ON,
        )?;
        self.write_reg(regs::DISC_CTRL8, regs::DISC_CTRL8_MHL)?;
        #[cfg(feature = "hdcp")]
        self.write_reg(regs::TPI_HDCP_TIMER_1_SEC, regs::HDCP_TIMER_1_SEC_VAL)?;

        let caps = local_devcap(self.chip.device_id);
        self.write_reg_block(regs::DEVICE_CAP_0, &caps)?;

        // MDT transmit and receive both start disabled
        self.write_reg(regs::MDT_XMIT_TIMEOUT, regs::MDT_TIMEOUT_VAL)?;
        self.write_reg(regs::MDT_XMIT_CONTROL, regs::MDT_XMIT_CONTROL_VAL)?;
        self.write_reg(regs::MDT_XFIFO_STAT, 0x00)?;
        self.write_reg(regs::MDT_RCV_TIMEOUT, regs::MDT_TIMEOUT_VAL)?;
        self.write_reg(regs::LINK_CHECK_HIGH_LIMIT, regs::LINK_CHECK_HIGH_LIMIT_DEFVAL)?;
        self.write_reg(regs::LINK_XMIT_BIT_TIME, regs::LINK_XMIT_BIT_TIME_DEFVAL)?;
        self.disable_gen2_write_burst()?;
        self.ready_for_mdt = false;

        self.write_reg(regs::DPD, regs::DPD_MHL_ON)?;
        for (addr, value) in TPI_DEFAULTS {
            self.write_reg(*addr, *value)?;
        }
        self.write_reg(regs::TPI_POWER_STATE_CTRL, power_state::D0)?;
        // HDMI output stays off until video starts
        self.write_reg(regs::TPI_SYSTEM_CONTROL, 0x00)?;
        #[cfg(feature = "hdcp")]
        self.write_reg(regs::TPI_HDCP_CONTROL, regs::hdcp::CONTROL_PROTLEVEL_MAX)?;
        Ok(())
    }

    /// Tear down the MHL link: termination off, discovery defaults back.
    pub(crate) fn disconnect_mhl(&mut self, clear_interrupts: bool) -> Result<()> {
        info!("mhl: disconnect");
        self.write_reg(
            regs::MHLTX_CTL1,
            mhltx::CTL1_TX_TERM_MODE_OFF | mhltx::CTL1_DISC_OVRIDE_ON,
        )?;
        self.restore_discovery_defaults()?;
        if clear_interrupts {
            self.clear_and_disable_on_disconnect()?;
        }

        self.cbus_status = 0;
        self.ready_for_mdt = false;
        self.gen2_write_burst = false;
        self.restart_edid_read();
        self.video_state = VideoState::Stopped;
        Ok(())
    }

    /// Drop VBUS, wait for CBUS to float, then power the core down.
    pub(crate) fn switch_to_d3(&mut self, clear_interrupts: bool) -> Result<()> {
        debug!("mhl: switch to D3");
        self.platform.set_vbus(false);
        self.platform.delay_ms(CBUS_FLOAT_MS);

        if clear_interrupts {
            self.clear_and_disable_on_disconnect()?;
        }
        self.modify_reg(
            regs::DISC_CTRL4,
            disc::CTRL4_USB_OVERRIDE_VALUE,
            disc::CTRL4_USB_OVERRIDE_VALUE,
        )?;
        self.modify_reg(
            regs::DISC_CTRL6,
            disc::CTRL6_USB_D_OVERRIDE_ON,
            disc::CTRL6_USB_D_OVERRIDE_ON,
        )?;
        self.modify_reg(regs::DPD, dpd::MASTER_POWER_CTRL, 0x00)?;
        self.link_event(LinkEvent::Disconnect);
        Ok(())
    }

    /// Disconnect and enter D3 with every interrupt cleared.
    pub fn force_switch_to_d3(&mut self) -> Result<()> {
        self.disconnect_mhl(true)?;
        self.switch_to_d3(true)
    }
}
