//! SiI8348 register map
//!
//! Registers are addressed by `(page, offset)`. The page value is the
//! logical page id handed to the [`RegisterBus`](crate::hal::RegisterBus)
//! shim, which maps it onto the chip's I2C slave addresses.
//!
//! Interrupt status registers have a matching `bitflags` type so handlers
//! can test bits by name.

use bitflags::bitflags;

use crate::hal::RegAddr;

pub const PAGE_L0: u8 = 0x72;
pub const PAGE_L1: u8 = 0x7A;
pub const PAGE_2: u8 = 0x92;
pub const PAGE_3: u8 = 0x9A;
pub const PAGE_TPI: u8 = 0x62;
pub const PAGE_CBUS: u8 = 0xC8;

const fn l0(offset: u8) -> RegAddr {
    RegAddr::new(PAGE_L0, offset)
}

const fn l1(offset: u8) -> RegAddr {
    RegAddr::new(PAGE_L1, offset)
}

const fn p2(offset: u8) -> RegAddr {
    RegAddr::new(PAGE_2, offset)
}

const fn p3(offset: u8) -> RegAddr {
    RegAddr::new(PAGE_3, offset)
}

const fn tpi(offset: u8) -> RegAddr {
    RegAddr::new(PAGE_TPI, offset)
}

const fn cbus(offset: u8) -> RegAddr {
    RegAddr::new(PAGE_CBUS, offset)
}

// ---------------------------------------------------------------------------
// Page L0: identity, reset, power, legacy interrupts, DDC master
// ---------------------------------------------------------------------------

pub const DEV_IDL: RegAddr = l0(0x02);
pub const DEV_IDH: RegAddr = l0(0x03);
pub const DEV_REV: RegAddr = l0(0x04);
pub const SRST: RegAddr = l0(0x05);
pub const SYS_CTRL1: RegAddr = l0(0x08);
pub const SYS_STAT: RegAddr = l0(0x09);
pub const HRESL: RegAddr = l0(0x3A);
pub const HRESH: RegAddr = l0(0x3B);
pub const VRESL: RegAddr = l0(0x3C);
pub const VRESH: RegAddr = l0(0x3E);
pub const DPD: RegAddr = l0(0x3D);
pub const VID_MODE: RegAddr = l0(0x4A);
pub const INTR1: RegAddr = l0(0x71);
pub const INTR3: RegAddr = l0(0x73);
pub const INTR1_MASK: RegAddr = l0(0x75);
pub const INTR3_MASK: RegAddr = l0(0x77);
pub const INT_CTRL: RegAddr = l0(0x79);
pub const TMDS_CCTRL: RegAddr = l0(0x80);
pub const USB_CHARGE_PUMP: RegAddr = l0(0xF8);
pub const USB_CHARGE_PUMP_MHL: RegAddr = l0(0xF7);

pub const DDC_MANUAL: RegAddr = l0(0xEC);
pub const DDC_ADDR: RegAddr = l0(0xED);
pub const DDC_SEGM: RegAddr = l0(0xEE);
pub const DDC_OFFSET: RegAddr = l0(0xEF);
pub const DDC_DIN_CNT1: RegAddr = l0(0xF0);
pub const DDC_DIN_CNT2: RegAddr = l0(0xF1);
pub const DDC_STATUS: RegAddr = l0(0xF2);
pub const DDC_CMD: RegAddr = l0(0xF3);
pub const DDC_DATA: RegAddr = l0(0xF4);

/// EDID slave address on the downstream DDC bus.
pub const DDC_EDID_SLAVE: u8 = 0xA0;

// Audio clocking helpers live on page L1.
pub const L1_AUDIO_CTS: RegAddr = l1(0x21);
pub const L1_AUDIO_N: RegAddr = l1(0x24);

// ---------------------------------------------------------------------------
// Page 2 / 3: MHL TX analog and discovery
// ---------------------------------------------------------------------------

pub const TXMZ_CTRL2: RegAddr = p2(0x01);

pub const DISC_CTRL1: RegAddr = p3(0x10);
pub const DISC_CTRL2: RegAddr = p3(0x11);
pub const DISC_CTRL3: RegAddr = p3(0x12);
pub const DISC_CTRL4: RegAddr = p3(0x13);
pub const DISC_CTRL5: RegAddr = p3(0x14);
pub const DISC_CTRL6: RegAddr = p3(0x15);
pub const DISC_CTRL7: RegAddr = p3(0x16);
pub const DISC_CTRL8: RegAddr = p3(0x17);
pub const DISC_CTRL9: RegAddr = p3(0x18);
pub const DISC_STAT1: RegAddr = p3(0x1B);
pub const DISC_STAT2: RegAddr = p3(0x1C);
pub const INTR4: RegAddr = p3(0x21);
pub const INTR4_MASK: RegAddr = p3(0x22);
pub const MHLTX_CTL1: RegAddr = p3(0x30);
pub const MHLTX_CTL2: RegAddr = p3(0x31);
pub const MHLTX_CTL3: RegAddr = p3(0x32);
pub const MHLTX_CTL4: RegAddr = p3(0x33);
pub const MHLTX_CTL6: RegAddr = p3(0x35);
pub const MHLTX_CTL7: RegAddr = p3(0x36);
pub const MHLTX_CTL8: RegAddr = p3(0x37);

pub const DISC_CTRL2_DEFVAL: u8 = 0xA5;
pub const DISC_CTRL4_DEFVAL: u8 = 0x8C;
pub const DISC_CTRL5_DEFVAL: u8 = 0x57;
pub const MHLTX_CTL2_DEFVAL: u8 = 0x3C;
pub const MHLTX_CTL3_DEFVAL: u8 = 0x40;
pub const MHLTX_CTL4_DEFVAL: u8 = 0x04;
pub const MHLTX_CTL6_DEFVAL: u8 = 0xBC;
pub const MHLTX_CTL7_DEFVAL: u8 = 0x03;
pub const MHLTX_CTL8_DEFVAL: u8 = 0x0A;
pub const VID_MODE_DEFVAL: u8 = 0x00;

/// DISC_CTRL1 value written right after a valid RGND reading.
pub const DISC_CTRL1_RGND_SETUP: u8 = 0x25;
pub const DISC_CTRL1_DEFAULT: u8 = 0x26;
/// TPI_HW_OPT3 value used once MHL is established.
pub const TPI_HW_OPT3_MHL: u8 = 0x76;
pub const DISC_CTRL8_MHL: u8 = 0x03;
pub const DPD_ALL_ON: u8 = 0x1F;
pub const DPD_MHL_ON: u8 = 0x17;
pub const SRST_ALL: u8 = 0x9F;

/// RGND impedance code reporting a 1k ohm MHL sink.
pub const RGND_1K: u8 = 0x02;
pub const RGND_MASK: u8 = 0x03;

pub mod srst {
    pub const MHL_FIFO_AUTO_RST: u8 = 0x80;
    pub const AUDIO_FIFO_RST_MASK: u8 = 0x02;
    pub const AUDIO_FIFO_RST_SET: u8 = 0x02;
    pub const AUDIO_FIFO_RST_CLR: u8 = 0x00;
}

pub mod sys_ctrl1 {
    /// Power up TMDS core, keep HDMI mode selected.
    pub const POWER_UP: u8 = 0x31;
}

pub mod sys_stat {
    pub const RSEN: u8 = 0x04;
}

pub mod dpd {
    pub const MASTER_POWER_CTRL: u8 = 0x01;
}

pub mod int_ctrl {
    pub const POLARITY_LEVEL_LOW: u8 = 0x02;
    pub const OPEN_DRAIN: u8 = 0x04;
}

pub mod tmds_cctrl {
    pub const SEL_BGR: u8 = 0x20;
    pub const TMDS_OE: u8 = 0x10;
}

pub mod charge_pump {
    pub const DEFAULT: u8 = 0x8C;
    pub const MHL_DEFAULT: u8 = 0x02;
}

pub mod vid_mode {
    pub const M1080P_ENABLE: u8 = 0x10;
    pub const M1080P_DISABLE: u8 = 0x00;
}

pub mod ddc {
    pub const STATUS_NO_ACK: u8 = 0x20;
    pub const CMD_MASK: u8 = 0x0F;
    pub const CMD_ENHANCED_READ_NO_ACK: u8 = 0x04;
    pub const CMD_CLEAR_FIFO: u8 = 0x09;
    /// Bytes moved per DDC batch.
    pub const BATCH_LEN: u8 = 0x10;
}

pub mod disc {
    pub const CTRL1_MHL_DISCOVERY_ENABLE: u8 = 0x01;
    pub const CTRL1_STROBE_OFF: u8 = 0x02;
    pub const CTRL3_DEFAULT: u8 = 0x86;
    pub const CTRL4_USB_OVERRIDE_VALUE: u8 = 0x20;
    pub const CTRL6_USB_D_OVERRIDE_ON: u8 = 0x40;
    pub const CTRL9_WAKE_DRVFLT: u8 = 0x10;
    pub const CTRL9_CBUS_LOW_TO_DISCONNECT: u8 = 0x08;
    pub const CTRL9_DISC_PULSE_PROCEED: u8 = 0x02;
}

pub mod mhltx {
    pub const CTL1_TX_TERM_MODE_100DIFF: u8 = 0x00;
    pub const CTL1_TX_TERM_MODE_OFF: u8 = 0x03;
    pub const CTL1_DISC_OVRIDE_ON: u8 = 0x10;
    pub const CTL4_CLK_RATIO_MASK: u8 = 0x10;
    pub const CTL4_CLK_RATIO_2X: u8 = 0x10;
    pub const CTL4_CLK_RATIO_3X: u8 = 0x00;
    pub const CTL6_CLK_MASK: u8 = 0x60;
    pub const CTL6_CLK_PP: u8 = 0x20;
    pub const CTL6_CLK_NPP: u8 = 0x40;
}

// ---------------------------------------------------------------------------
// TPI page: HDMI output, info-frames, audio, HDCP
// ---------------------------------------------------------------------------

pub const TPI_INPUT: RegAddr = tpi(0x09);
pub const TPI_OUTPUT: RegAddr = tpi(0x0A);
pub const TPI_AVI_CHSUM: RegAddr = tpi(0x0C);
pub const TPI_AVI_BYTE13: RegAddr = tpi(0x19);
pub const TPI_SYSTEM_CONTROL: RegAddr = tpi(0x1A);
pub const TPI_POWER_STATE_CTRL: RegAddr = tpi(0x1E);
pub const TPI_AUDIO_0B: RegAddr = tpi(0x0B);
pub const TPI_AUDIO_1F: RegAddr = tpi(0x1F);
pub const TPI_AUDIO_20: RegAddr = tpi(0x20);
pub const TPI_AUDIO_21: RegAddr = tpi(0x21);
pub const TPI_AUDIO_22: RegAddr = tpi(0x22);
pub const TPI_AUDIO_23: RegAddr = tpi(0x23);
pub const TPI_AUDIO_25: RegAddr = tpi(0x25);
pub const TPI_CONFIG1: RegAddr = tpi(0x24);
pub const TPI_CONFIG3: RegAddr = tpi(0x26);
pub const TPI_CONFIG4: RegAddr = tpi(0x27);
pub const TPI_AUDIO_28: RegAddr = tpi(0x28);
pub const TPI_HDCP_QUERY: RegAddr = tpi(0x29);
pub const TPI_HDCP_CONTROL: RegAddr = tpi(0x2A);
pub const TPI_CONFIG2: RegAddr = tpi(0x2B);
pub const TPI_INTR_ST0_ENABLE: RegAddr = tpi(0x3C);
pub const TPI_INTR_ST0: RegAddr = tpi(0x3D);
pub const TPI_INTR_ST1_ENABLE: RegAddr = tpi(0x3E);
pub const TPI_INTR_ST1: RegAddr = tpi(0x3F);
pub const TPI_HDCP_TIMER_1_SEC: RegAddr = tpi(0x79);
pub const TPI_HW_OPT3: RegAddr = tpi(0xBB);
pub const TPI_HW_DBG6: RegAddr = tpi(0xBD);
pub const TPI_INFO_FSEL: RegAddr = tpi(0xBF);
pub const TPI_INFO_BYTE00: RegAddr = tpi(0xC0);
pub const TPI_INFO_BYTE30: RegAddr = tpi(0xDE);
pub const TPI_SEL: RegAddr = tpi(0xC7);

/// Seconds-tick prescaler for the HDCP engine.
pub const HDCP_TIMER_1_SEC_VAL: u8 = 79;
pub const TPI_INFO_FSEL_AUDIO_RPT: u8 = 0xC2;

pub mod tpi_sel {
    pub const SW_TPI_EN_MASK: u8 = 0x80;
    pub const SW_TPI_EN_HW_TPI: u8 = 0x00;
    pub const SW_TPI_EN_NON_HW_TPI: u8 = 0x80;
}

pub mod sys_ctrl {
    pub const TMDS_OUTPUT_CONTROL_MASK: u8 = 0x10;
    pub const TMDS_OUTPUT_CONTROL_ACTIVE: u8 = 0x00;
    pub const TMDS_OUTPUT_CONTROL_POWER_DOWN: u8 = 0x10;
    pub const AV_MUTE_MASK: u8 = 0x08;
    pub const AV_MUTE_MUTED: u8 = 0x08;
    pub const AV_MUTE_NORMAL: u8 = 0x00;
    pub const TMDS_OUTPUT_MODE_DVI: u8 = 0x00;
    pub const TMDS_OUTPUT_MODE_HDMI: u8 = 0x01;
}

pub mod tpi_format {
    pub const RGB: u8 = 0x00;
    pub const YCBCR444: u8 = 0x01;
    pub const YCBCR422: u8 = 0x02;
    pub const INTERNAL_RGB: u8 = 0x03;
}

pub mod info_fsel {
    pub const EN: u8 = 0x80;
    pub const RPT: u8 = 0x40;
    pub const SEL_3D_VSIF: u8 = 0x05;
}

pub mod config3 {
    pub const AUDIO_INTERFACE_I2S: u8 = 0x80;
    pub const LAYOUT_2CH: u8 = 0x00;
    pub const LAYOUT_8CH_MAX: u8 = 0x20;
    pub const MUTE_MASK: u8 = 0x10;
    pub const MUTE_MUTED: u8 = 0x10;
    pub const MUTE_NORMAL: u8 = 0x00;
}

pub mod power_state {
    pub const D0: u8 = 0x00;
}

pub mod hdcp {
    pub const EXTENDED_LINK_STATUS_MASK: u8 = 0x30;
    pub const LINK_STATUS_MASK: u8 = 0x30;
    pub const LINK_STATUS_NORMAL: u8 = 0x00;
    pub const LINK_STATUS_LINK_LOST: u8 = 0x10;
    pub const LINK_STATUS_RENEGOTIATION_REQ: u8 = 0x20;
    pub const LINK_STATUS_LINK_SUSPENDED: u8 = 0x30;
    pub const PROTECTION_TYPE_MASK: u8 = 0x02;
    pub const PROTECTION_TYPE_HDCP: u8 = 0x02;
    pub const LOCAL_LINK_PROTECTION: u8 = 0x80;
    pub const LINK_PROTECTION_MASK: u8 = 0x40;
    pub const LINK_PROTECTION_NONE: u8 = 0x00;
    pub const REPEATER: u8 = 0x08;
    pub const CONTROL_PROTLEVEL_MAX: u8 = 0x01;
    pub const CONTROL_DOUBLE_RI_CHECK: u8 = 0x04;
    pub const HW_DBG6_STATE_MASK: u8 = 0x1F;
    /// HW_DBG6 state while the engine is still fetching the BKSV.
    pub const HW_DBG6_BKSV_FETCH: u8 = 0x02;
}

// ---------------------------------------------------------------------------
// CBUS page: MSC transmit/receive, MDT, devcap, scratchpad
// ---------------------------------------------------------------------------

pub const CBUS_STATUS: RegAddr = cbus(0x0A);
pub const CBUS_INT_0: RegAddr = cbus(0x08);
pub const CBUS_INT_0_MASK: RegAddr = cbus(0x09);
pub const CBUS_INT_1: RegAddr = cbus(0x1E);
pub const CBUS_INT_1_MASK: RegAddr = cbus(0x1F);
pub const CBUS_DDC_ABORT_INT: RegAddr = cbus(0x0C);
pub const MSC_RCV_ERROR: RegAddr = cbus(0x0E);
pub const MSC_COMMAND_START: RegAddr = cbus(0x12);
pub const MSC_CMD_OR_OFFSET: RegAddr = cbus(0x13);
pub const MSC_1ST_TRANSMIT_DATA: RegAddr = cbus(0x14);
pub const MSC_2ND_TRANSMIT_DATA: RegAddr = cbus(0x15);
pub const PRI_RD_DATA_1ST: RegAddr = cbus(0x16);
pub const MSC_MR_MSC_MSG_RCVD_1ST_DATA: RegAddr = cbus(0x18);
pub const MSC_MT_ABORT_INT: RegAddr = cbus(0x0D);
pub const MSC_WRITE_BURST_DATA_LEN: RegAddr = cbus(0x20);
pub const LINK_XMIT_BIT_TIME: RegAddr = cbus(0x34);
pub const LINK_CHECK_HIGH_LIMIT: RegAddr = cbus(0x35);
pub const DEVICE_CAP_0: RegAddr = cbus(0x80);
pub const SET_INT_0: RegAddr = cbus(0xA0);
pub const WRITE_STAT_0: RegAddr = cbus(0xB0);
pub const MHL_SCRPAD_0: RegAddr = cbus(0xC0);
pub const WB_XMIT_DATA_0: RegAddr = cbus(0x60);
pub const MDT_RCV_TIMEOUT: RegAddr = cbus(0x40);
pub const MDT_XMIT_TIMEOUT: RegAddr = cbus(0x41);
pub const MDT_RCV_CONTROL: RegAddr = cbus(0x42);
pub const MDT_RCV_READ_PORT: RegAddr = cbus(0x43);
pub const MDT_XMIT_CONTROL: RegAddr = cbus(0x44);
pub const MDT_XFIFO_STAT: RegAddr = cbus(0x47);
pub const MDT_INT_0: RegAddr = cbus(0x4A);
pub const MDT_INT_0_MASK: RegAddr = cbus(0x4B);
pub const MDT_INT_1: RegAddr = cbus(0x4C);

/// Offset of scratchpad register 0 within the peer's MSC register space.
pub const MHL_SCRPAD_BASE: u8 = 0x40;
pub const LINK_CHECK_HIGH_LIMIT_DEFVAL: u8 = 0x1D;
pub const LINK_XMIT_BIT_TIME_DEFVAL: u8 = 0x1D;
pub const MDT_TIMEOUT_VAL: u8 = 100;
pub const MDT_XMIT_CONTROL_VAL: u8 = 0x03;

pub mod cbus_status {
    pub const HPD: u8 = 0x04;
}

pub mod msc_start {
    pub const PEER_CMD: u8 = 0x01;
    pub const MSC_MSG: u8 = 0x02;
    pub const READ_DEVCAP: u8 = 0x04;
    pub const WRITE_STAT_OR_SET_INT: u8 = 0x08;
    pub const WRITE_BURST: u8 = 0x10;
}

pub mod mdt_rcv {
    pub const RFIFO_CLR_CUR_CLEAR: u8 = 0x04;
    pub const RCV_EN_ENABLE: u8 = 0x01;
    pub const RCV_EN_DISABLE: u8 = 0x00;
}

pub mod mt_abort {
    pub const MAX_FAIL: u8 = 0x01;
    pub const PROTO_ERR: u8 = 0x02;
    pub const TIMEOUT: u8 = 0x04;
    pub const UNDEF_CMD: u8 = 0x08;
    pub const PEER_ABORT: u8 = 0x80;
}

pub mod ddc_abort {
    pub const PEER_ABORT: u8 = 0x80;
}

bitflags! {
    /// INTR4: discovery events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Intr4: u8 {
        const VBUS_CHG = 0x01;
        const MHL_EST = 0x04;
        const NON_MHL_EST = 0x08;
        const CBUS_LKOUT = 0x10;
        const CBUS_DISCONNECT = 0x20;
        const RGND_DETECTION = 0x40;
    }
}

bitflags! {
    /// MDT_INT_0: hardware write-burst receive engine.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct MdtInt0: u8 {
        const RXFIFO_DATA_RDY = 0x01;
    }
}

bitflags! {
    /// CBUS_INT_0: MSC transaction events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CbusInt0: u8 {
        const MT_DONE = 0x02;
        const HPD_RCVD = 0x04;
        const WRITE_STAT = 0x08;
        const MSC_MSG = 0x10;
        const WRITE_BURST = 0x20;
        const SET_INT = 0x40;
        const MT_DONE_NACK = 0x80;
    }
}

bitflags! {
    /// CBUS_INT_1: MSC and DDC abort events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CbusInt1: u8 {
        const DDC_ABRT = 0x04;
        const MSC_ABORT_RCVD = 0x08;
        const CMD_ABORT = 0x40;
    }
}

bitflags! {
    /// INTR3: DDC master events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Intr3: u8 {
        const DDC_FIFO_FULL = 0x02;
        const DDC_CMD_DONE = 0x08;
    }
}

bitflags! {
    /// INTR1: RSEN sense.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Intr1: u8 {
        const RSEN_CHG = 0x20;
    }
}

bitflags! {
    /// TPI_INTR_ST0: HDCP authentication events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TpiIntrSt0: u8 {
        const HDCP_AUTH_STATUS_CHANGE = 0x80;
        const HDCP_SECURITY_CHANGE = 0x20;
    }
}

bitflags! {
    /// TPI_INTR_ST1: BKSV fetch events.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct TpiIntrSt1: u8 {
        const BKSV_ERR = 0x02;
        const BKSV_DONE = 0x04;
    }
}
