//! I2S audio input programs

use log::debug;

use crate::edid::parser::EdidParser;
use crate::error::Result;
use crate::hal::{Platform, RegAddr, RegisterBus};
use crate::regs::{self, config3};
use crate::Sii8348;

/// Supported I2S input formats.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AudioMode {
    Khz32Ch2,
    Khz32Ch8,
    Khz44Ch2,
    Khz44Ch8,
    #[default]
    Khz48Ch2,
    Khz48Ch8,
    Khz192Ch2,
    Khz192Ch8,
}

const EIGHT_CHANNELS: u8 = 0x80;

impl AudioMode {
    /// Platform audio code: sample rate in the low bits, bit 7 for 8 channels.
    pub const fn code(self) -> u8 {
        match self {
            AudioMode::Khz32Ch2 => 0x01,
            AudioMode::Khz32Ch8 => EIGHT_CHANNELS | 0x01,
            AudioMode::Khz44Ch2 => 0x02,
            AudioMode::Khz44Ch8 => EIGHT_CHANNELS | 0x02,
            AudioMode::Khz48Ch2 => 0x03,
            AudioMode::Khz48Ch8 => EIGHT_CHANNELS | 0x03,
            AudioMode::Khz192Ch2 => 0x07,
            AudioMode::Khz192Ch8 => EIGHT_CHANNELS | 0x07,
        }
    }

    pub const fn is_multichannel(self) -> bool {
        self.code() & EIGHT_CHANNELS != 0
    }

    /// CEA sample frequency field of the audio info-frame.
    pub const fn sample_frequency(self) -> u8 {
        (self.code() & 0x07) << 2
    }

    /// CEA channel count field, channels minus one.
    pub const fn channel_count(self) -> u8 {
        if self.is_multichannel() {
            0x07
        } else {
            0x01
        }
    }

    /// Register writes that follow the CONFIG3 interface setup.
    fn program(self) -> &'static [(RegAddr, u8)] {
        match self {
            AudioMode::Khz32Ch2 => &[(regs::TPI_CONFIG1, 0x03), (regs::TPI_CONFIG4, 0x09)],
            AudioMode::Khz32Ch8 => &[(regs::TPI_CONFIG1, 0x03), (regs::TPI_CONFIG4, 0x0F)],
            AudioMode::Khz44Ch2 => &[
                (regs::TPI_AUDIO_20, 0x90),
                (regs::TPI_AUDIO_1F, 0x91),
                (regs::TPI_CONFIG1, 0x00),
                (regs::TPI_CONFIG2, 0x02),
                (regs::L1_AUDIO_N, 0x02),
                (regs::TPI_CONFIG4, 0x11),
                (regs::TPI_AUDIO_28, 0x80),
            ],
            AudioMode::Khz44Ch8 => &[(regs::TPI_CONFIG1, 0x00), (regs::TPI_CONFIG4, 0x17)],
            AudioMode::Khz48Ch2 => &[
                (regs::TPI_CONFIG1, 0x02),
                (regs::TPI_CONFIG4, 0x19),
                (regs::L1_AUDIO_CTS, 0x02),
            ],
            AudioMode::Khz48Ch8 => &[(regs::TPI_CONFIG1, 0x02), (regs::TPI_CONFIG4, 0x1F)],
            AudioMode::Khz192Ch2 => &[(regs::TPI_CONFIG1, 0x0E), (regs::TPI_CONFIG4, 0x39)],
            AudioMode::Khz192Ch8 => &[(regs::TPI_CONFIG1, 0x0E), (regs::TPI_CONFIG4, 0x3F)],
        }
    }
}

/// Unknown codes fall back to 48 kHz stereo.
impl From<u8> for AudioMode {
    fn from(code: u8) -> Self {
        match code {
            0x01 => AudioMode::Khz32Ch2,
            0x81 => AudioMode::Khz32Ch8,
            0x02 => AudioMode::Khz44Ch2,
            0x82 => AudioMode::Khz44Ch8,
            0x03 => AudioMode::Khz48Ch2,
            0x83 => AudioMode::Khz48Ch8,
            0x07 => AudioMode::Khz192Ch2,
            0x87 => AudioMode::Khz192Ch8,
            _ => AudioMode::default(),
        }
    }
}

impl<B: RegisterBus, P: Platform, E: EdidParser> Sii8348<B, P, E> {
    /// Program the I2S input for `mode`. Audio stays muted.
    pub(crate) fn configure_audio(&mut self, mode: AudioMode) -> Result<()> {
        let layout = if mode.is_multichannel() {
            config3::LAYOUT_8CH_MAX
        } else {
            config3::LAYOUT_2CH
        };
        self.write_reg(
            regs::TPI_CONFIG3,
            config3::AUDIO_INTERFACE_I2S | layout | config3::MUTE_MUTED,
        )?;
        for (addr, value) in mode.program() {
            self.write_reg(*addr, *value)?;
        }
        debug!("video: audio configured for {:?}", mode);
        Ok(())
    }
}
