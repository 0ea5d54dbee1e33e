//! MHL sideband protocol constants
//!
//! Opcodes, device capability offsets and status/interrupt register bits as
//! defined by the MHL specification. These are a bit-exact contract with
//! the peer sink.

/// MSC command opcodes.
pub mod opcode {
    pub const SET_INT: u8 = 0x60;
    pub const READ_DEVCAP: u8 = 0x61;
    pub const GET_STATE: u8 = 0x62;
    pub const GET_VENDOR_ID: u8 = 0x63;
    pub const SET_HPD: u8 = 0x64;
    pub const CLR_HPD: u8 = 0x65;
    pub const SET_CAP_ID: u8 = 0x66;
    pub const GET_CAP_ID: u8 = 0x67;
    pub const MSC_MSG: u8 = 0x68;
    pub const GET_SC1_ERRORCODE: u8 = 0x69;
    pub const GET_DDC_ERRORCODE: u8 = 0x6A;
    pub const GET_MSC_ERRORCODE: u8 = 0x6B;
    pub const WRITE_BURST: u8 = 0x6C;
    pub const GET_SC3_ERRORCODE: u8 = 0x6D;
    pub const WRITE_STAT: u8 = 0xE0;
    /// Local pseudo-command: read the sink EDID over DDC.
    pub const READ_EDID_BLOCK: u8 = 0xF0;
}

/// Device capability register offsets.
pub mod devcap {
    pub const DEV_STATE: usize = 0x00;
    pub const MHL_VERSION: usize = 0x01;
    pub const DEV_CAT: usize = 0x02;
    pub const ADOPTER_ID_H: usize = 0x03;
    pub const ADOPTER_ID_L: usize = 0x04;
    pub const VID_LINK_MODE: usize = 0x05;
    pub const AUD_LINK_MODE: usize = 0x06;
    pub const VIDEO_TYPE: usize = 0x07;
    pub const LOG_DEV_MAP: usize = 0x08;
    pub const BANDWIDTH: usize = 0x09;
    pub const FEATURE_FLAG: usize = 0x0A;
    pub const DEVICE_ID_H: usize = 0x0B;
    pub const DEVICE_ID_L: usize = 0x0C;
    pub const SCRATCHPAD_SIZE: usize = 0x0D;
    pub const INT_STAT_SIZE: usize = 0x0E;
    pub const RESERVED: usize = 0x0F;

    pub const SIZE: usize = 16;

    pub const VID_LINK_SUPP_RGB444: u8 = 0x01;
    pub const VID_LINK_SUPP_YCBCR444: u8 = 0x02;
    pub const VID_LINK_SUPP_YCBCR422: u8 = 0x04;
    pub const VID_LINK_SUPP_PPIXEL: u8 = 0x08;
    pub const VID_LINK_SUPP_ISLANDS: u8 = 0x10;

    pub const LD_VIDEO: u8 = 0x02;
    pub const LD_AUDIO: u8 = 0x04;
    pub const LD_MEDIA: u8 = 0x08;
    pub const LD_GUI: u8 = 0x80;

    pub const FEATURE_RCP: u8 = 0x01;
    pub const FEATURE_RAP: u8 = 0x02;
    pub const FEATURE_SP: u8 = 0x04;

    pub const DEV_TYPE_SOURCE: u8 = 0x02;
}

/// MHL status registers written with WRITE_STAT.
pub mod status {
    pub const CONNECTED_RDY: u8 = 0x30;
    pub const LINK_MODE: u8 = 0x31;

    pub const DCAP_RDY: u8 = 0x01;

    pub const CLK_MODE_PACKED_PIXEL: u8 = 0x02;
    pub const CLK_MODE_NORMAL: u8 = 0x03;
    pub const PATH_ENABLED: u8 = 0x08;
}

/// MHL interrupt registers written with SET_INT.
pub mod rchg {
    pub const RCHANGE_INT: u8 = 0x20;
    pub const DCHANGE_INT: u8 = 0x21;

    /// `int_msg[0]` bits
    pub const DCAP_CHG: u8 = 0x01;
    pub const DSCR_CHG: u8 = 0x02;
    pub const REQ_WRT: u8 = 0x04;
    pub const GRT_WRT: u8 = 0x08;

    /// `int_msg[1]` bits
    pub const EDID_CHG: u8 = 0x02;
}

pub const MHL_VERSION: u8 = 0x20;
pub const SILICON_IMAGE_ADOPTER_ID: u16 = 322;
pub const SCRATCHPAD_SIZE: usize = 16;
pub const INT_STAT_SIZE: u8 = 0x33;
pub const BANDWIDTH: u8 = 0x0F;

/// Local video link capabilities advertised in DEVCAP.
pub const LOCAL_VID_LINK_MODE: u8 = devcap::VID_LINK_SUPP_RGB444
    | devcap::VID_LINK_SUPP_YCBCR444
    | devcap::VID_LINK_SUPP_YCBCR422
    | devcap::VID_LINK_SUPP_PPIXEL
    | devcap::VID_LINK_SUPP_ISLANDS;

pub const LOCAL_AUD_LINK_MODE: u8 = 0x03;
pub const LOCAL_LOG_DEV_MAP: u8 = devcap::LD_AUDIO | devcap::LD_VIDEO | devcap::LD_MEDIA | devcap::LD_GUI;
pub const LOCAL_FEATURE_FLAG: u8 = devcap::FEATURE_RCP | devcap::FEATURE_RAP | devcap::FEATURE_SP;

/// Build the local device capability block for the given chip id.
pub fn local_devcap(device_id: u16) -> [u8; devcap::SIZE] {
    let mut caps = [0u8; devcap::SIZE];
    caps[devcap::DEV_STATE] = 0x00;
    caps[devcap::MHL_VERSION] = MHL_VERSION;
    caps[devcap::DEV_CAT] = devcap::DEV_TYPE_SOURCE;
    caps[devcap::ADOPTER_ID_H] = (SILICON_IMAGE_ADOPTER_ID >> 8) as u8;
    caps[devcap::ADOPTER_ID_L] = SILICON_IMAGE_ADOPTER_ID as u8;
    caps[devcap::VID_LINK_MODE] = LOCAL_VID_LINK_MODE;
    caps[devcap::AUD_LINK_MODE] = LOCAL_AUD_LINK_MODE;
    caps[devcap::VIDEO_TYPE] = 0x00;
    caps[devcap::LOG_DEV_MAP] = LOCAL_LOG_DEV_MAP;
    caps[devcap::BANDWIDTH] = BANDWIDTH;
    caps[devcap::FEATURE_FLAG] = LOCAL_FEATURE_FLAG;
    caps[devcap::DEVICE_ID_H] = (device_id >> 8) as u8;
    caps[devcap::DEVICE_ID_L] = device_id as u8;
    caps[devcap::SCRATCHPAD_SIZE] = SCRATCHPAD_SIZE as u8;
    caps[devcap::INT_STAT_SIZE] = INT_STAT_SIZE;
    caps[devcap::RESERVED] = 0x00;
    caps
}
