//! Upward notifications produced by one interrupt dispatch pass

use bitflags::bitflags;

use crate::mhl::SCRATCHPAD_SIZE;

bitflags! {
    /// Events observed during one dispatch pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct DrvIntrFlags: u16 {
        /// Downstream HPD level changed, see `hpd_status`
        const HPD_CHANGE = 1 << 0;
        /// MSC command (or EDID read) completed, see `msc_done_data`
        const MSC_DONE = 1 << 1;
        /// MSC command completed with a NACK from the peer
        const MSC_NAK = 1 << 2;
        /// Peer wrote our status registers, see `write_stat`
        const WRITE_STAT = 1 << 3;
        /// MSC_MSG received, see `msc_msg`
        const MSC_RECVD = 1 << 4;
        /// Peer set our interrupt registers, see `int_msg`
        const SET_INT = 1 << 5;
        /// MSC transfer aborted
        const CBUS_ABORT = 1 << 6;
        /// Link lost, chip is back in D3
        const DISCONNECT = 1 << 7;
        /// MHL established, capability exchange may start
        const CONNECT = 1 << 8;
        /// Hardware write-burst payload arrived, see `write_burst`
        const WRITE_BURST = 1 << 9;
    }
}

/// `msc_done_data` value reporting a failed EDID read.
pub const EDID_READ_ERROR: u8 = 1;
/// `msc_done_data` value reporting a complete EDID read.
pub const EDID_READ_OK: u8 = 0;

/// Out-parameter filled by [`Sii8348::device_isr`](crate::Sii8348::device_isr).
///
/// Only the fields whose flag is set carry meaningful data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterruptInfo {
    pub flags: DrvIntrFlags,
    pub hpd_status: u8,
    pub msc_done_data: u8,
    pub write_stat: [u8; 3],
    pub msc_msg: [u8; 2],
    pub int_msg: [u8; 4],
    pub write_burst: [u8; SCRATCHPAD_SIZE],
}

impl InterruptInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report a finished MSC transaction with its reply byte.
    pub fn msc_done(&mut self, data: u8) {
        self.flags.insert(DrvIntrFlags::MSC_DONE);
        self.msc_done_data = data;
    }

    pub fn has(&self, flag: DrvIntrFlags) -> bool {
        self.flags.contains(flag)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_msc_done_sets_flag_and_payload() {
        let mut info = InterruptInfo::new();
        assert!(info.flags.is_empty());
        info.msc_done(EDID_READ_ERROR);
        assert!(info.has(DrvIntrFlags::MSC_DONE));
        assert!(!info.has(DrvIntrFlags::MSC_NAK));
        assert_eq!(info.msc_done_data, 1);
    }
}
