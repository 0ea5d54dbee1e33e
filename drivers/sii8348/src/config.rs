//! Driver configuration and timing constants

use crate::video::audio::AudioMode;
use crate::video::timing::VIC_1080P60;

/// VBUS settle time after enabling it during discovery.
pub const VBUS_SETTLE_MS: u32 = 100;
/// CBUS must float this long after VBUS is dropped before entering D3.
pub const CBUS_FLOAT_MS: u32 = 50;
/// Wait between enabling HDCP interrupts and turning TMDS on.
pub const HDCP_BKSV_SETTLE_MS: u32 = 250;
/// Repeater KSV list settle time required by HDCP compliance.
pub const HDCP_RPTR_CTS_DELAY_MS: u32 = 2875;
/// Reset GPIO assert width.
pub const TX_HW_RESET_PERIOD_MS: u32 = 500;
/// Wait after releasing reset before the first register access.
pub const TX_HW_RESET_DELAY_MS: u32 = 500;

pub const DDC_ABORT_THRESHOLD: u32 = 10;
pub const MSC_ABORT_THRESHOLD: u32 = 10;
pub const HDCP_ERROR_THRESHOLD: u32 = 5;

/// Upper bound on HW_DBG6 polls while waiting for the BKSV fetch to settle.
pub const HDCP_BKSV_POLL_LIMIT: u32 = 1000;

/// Board and policy settings for one transmitter instance.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    pub reset_period_ms: u32,
    pub reset_delay_ms: u32,
    /// CEA VIC of the incoming video
    pub video_mode: u8,
    pub audio_mode: AudioMode,
    /// DDC aborts tolerated before the DDC FIFO is reset
    pub ddc_abort_threshold: u32,
    pub msc_abort_threshold: u32,
    /// Hardware write-burst (MDT) receive engine is used
    pub mdt_enabled: bool,
}

impl DriverConfig {
    pub const fn new() -> Self {
        Self {
            reset_period_ms: TX_HW_RESET_PERIOD_MS,
            reset_delay_ms: TX_HW_RESET_DELAY_MS,
            video_mode: VIC_1080P60,
            audio_mode: AudioMode::Khz44Ch2,
            ddc_abort_threshold: DDC_ABORT_THRESHOLD,
            msc_abort_threshold: MSC_ABORT_THRESHOLD,
            mdt_enabled: true,
        }
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig::new()
    }
}
