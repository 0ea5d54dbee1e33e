//! AVI and audio info-frame payloads
//!
//! Both payloads are plain byte structs block-written into the TPI page, so
//! they derive the zerocopy traits and go to the bus via `as_bytes()`.

use zerocopy::{AsBytes, FromBytes, FromZeroes};

use super::audio::AudioMode;
use super::timing;

/// AVI header bytes (type, version, length) the hardware adds to the checksum.
const AVI_TYPE: u8 = 0x82;
const AVI_VERSION: u8 = 0x02;
const AVI_LENGTH: u8 = 0x0D;

pub const AVI_DATA_LEN: usize = 13;
pub const AUDIO_IF_LEN: usize = 14;
pub const VSIF_LEN: usize = 8;

/// Active format information present, no bar data, no scan info.
const AVI_ACTIVE_FORMAT_VALID: u8 = 0x02;
/// Limited range, no scaling.
const AVI_BYTE3_DEFAULT: u8 = 0x04;

/// Colorimetry ITU601 with 4:3 picture aspect, same as active.
pub const COLORIMETRY_4X3: u8 = 0x18;
/// Colorimetry ITU601 with 16:9 picture aspect, same as active.
pub const COLORIMETRY_16X9: u8 = 0x28;

/// Pixel encoding on the video input or the link.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    Rgb,
    YCbCr422,
    YCbCr444,
    InternalRgb,
}

impl ColorSpace {
    /// AVI Y1:Y0 field.
    pub const fn avi_code(self) -> u8 {
        match self {
            ColorSpace::Rgb => 0,
            ColorSpace::YCbCr422 => 1,
            ColorSpace::YCbCr444 => 2,
            ColorSpace::InternalRgb => 3,
        }
    }

    /// TPI input/output format register value.
    pub const fn tpi_format(self) -> u8 {
        use crate::regs::tpi_format;
        match self {
            ColorSpace::Rgb => tpi_format::RGB,
            ColorSpace::YCbCr422 => tpi_format::YCBCR422,
            ColorSpace::YCbCr444 => tpi_format::YCBCR444,
            ColorSpace::InternalRgb => tpi_format::INTERNAL_RGB,
        }
    }
}

/// Format chosen for the incoming video.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VideoSelection {
    pub vic: u8,
    /// AVI byte 2: colorimetry and picture aspect
    pub colorimetry_aspect: u8,
    pub input: ColorSpace,
    pub output: ColorSpace,
}

impl VideoSelection {
    pub fn for_vic(vic: u8) -> Self {
        let colorimetry_aspect = if timing::is_4x3(vic) {
            COLORIMETRY_4X3
        } else {
            COLORIMETRY_16X9
        };
        Self {
            vic,
            colorimetry_aspect,
            input: ColorSpace::Rgb,
            output: ColorSpace::Rgb,
        }
    }
}

fn sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// AVI info-frame body as laid out from TPI_AVI_CHSUM.
#[derive(AsBytes, FromBytes, FromZeroes, Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct AviPayload {
    pub checksum: u8,
    pub data: [u8; AVI_DATA_LEN],
}

impl AviPayload {
    pub fn build(output: ColorSpace, colorimetry_aspect: u8, vic: u8) -> Self {
        let mut avi = AviPayload::new_zeroed();
        avi.data[0] = (output.avi_code() << 5) | AVI_ACTIVE_FORMAT_VALID;
        avi.data[1] = colorimetry_aspect;
        avi.data[2] = AVI_BYTE3_DEFAULT;
        avi.data[3] = vic;
        avi.checksum = avi.expected_checksum();
        avi
    }

    /// Header bytes, checksum and data must sum to zero.
    pub fn expected_checksum(&self) -> u8 {
        let header = AVI_TYPE.wrapping_add(AVI_VERSION).wrapping_add(AVI_LENGTH);
        0u8.wrapping_sub(header.wrapping_add(sum(&self.data)))
    }
}

/// Complete audio info-frame including its header.
#[derive(AsBytes, FromBytes, FromZeroes, Copy, Clone, Debug, Default, PartialEq, Eq)]
#[repr(C)]
pub struct AudioInfoFrame {
    pub header: [u8; 3],
    pub checksum: u8,
    pub data: [u8; AUDIO_IF_LEN - 4],
}

impl AudioInfoFrame {
    const HEADER: [u8; 3] = [0x84, 0x01, 0x0A];

    pub fn build(mode: AudioMode) -> Self {
        let mut frame = AudioInfoFrame::new_zeroed();
        frame.header = Self::HEADER;
        frame.data[0] = mode.channel_count();
        frame.data[1] = mode.sample_frequency();
        frame.checksum = 0u8.wrapping_sub(sum(frame.as_bytes()));
        frame
    }
}
