//! Transmitter instance and shared handle
//!
//! [`Sii8348`] owns every piece of mutable driver state: interrupt masks,
//! the EDID read cursor, video/HDCP session data and the cached CBUS status.
//! [`MhlTx`] wraps it in a spin lock so the interrupt thread and the
//! inbound command API never interleave.

use log::{debug, info};
use spin::Mutex;

use crate::config::DriverConfig;
use crate::edid::parser::EdidParser;
use crate::edid::{EdidBuffer, EdidCursor};
use crate::error::Result;
use crate::hal::{Platform, RegAddr, RegisterBus};
use crate::intr::stats::IsrStats;
use crate::intr::IntrTable;
use crate::mhl::{devcap, SCRATCHPAD_SIZE};
use crate::notify::InterruptInfo;
use crate::state::{EdidReadState, LinkEvent, LinkState, VideoState};
use crate::video::VideoContext;

#[cfg(feature = "hdcp")]
use crate::hdcp::HdcpSession;

/// Identity read back from the chip.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChipId {
    pub device_id: u16,
    pub rev: u8,
}

/// One SiI8348 transmitter.
pub struct Sii8348<B: RegisterBus, P: Platform, E: EdidParser> {
    pub(crate) bus: B,
    pub(crate) platform: P,
    pub(crate) edid: E,
    pub(crate) config: DriverConfig,
    pub(crate) intr: IntrTable,
    pub(crate) stats: IsrStats,
    pub(crate) chip: ChipId,
    pub(crate) link: LinkState,
    pub(crate) video_state: VideoState,
    pub(crate) edid_read: EdidReadState,
    pub(crate) cursor: EdidCursor,
    pub(crate) edid_data: EdidBuffer,
    /// Last CBUS_STATUS value seen by the MSC handler
    pub(crate) cbus_status: u8,
    /// Upstream EDID exposed, hardware write burst may run
    pub(crate) ready_for_mdt: bool,
    pub(crate) gen2_write_burst: bool,
    pub(crate) write_burst_data: [u8; SCRATCHPAD_SIZE],
    /// Peer DEVCAP as read by the calling layer
    pub(crate) peer_devcap: [u8; devcap::SIZE],
    /// MHL LINK_MODE status chosen by the last video setup
    pub(crate) link_mode: u8,
    pub(crate) video: VideoContext,
    #[cfg(feature = "hdcp")]
    pub(crate) hdcp: HdcpSession,
}

impl<B: RegisterBus, P: Platform, E: EdidParser> Sii8348<B, P, E> {
    pub fn new(bus: B, platform: P, edid: E, config: DriverConfig) -> Self {
        Self {
            bus,
            platform,
            edid,
            video: VideoContext::new(&config),
            config,
            intr: IntrTable::new(),
            stats: IsrStats::new(),
            chip: ChipId::default(),
            link: LinkState::D3,
            video_state: VideoState::Stopped,
            edid_read: EdidReadState::Idle,
            cursor: EdidCursor::new(),
            edid_data: EdidBuffer::new(),
            cbus_status: 0,
            ready_for_mdt: false,
            gen2_write_burst: false,
            write_burst_data: [0; SCRATCHPAD_SIZE],
            peer_devcap: [0; devcap::SIZE],
            link_mode: 0,
            #[cfg(feature = "hdcp")]
            hdcp: HdcpSession::new(),
        }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn chip_id(&self) -> ChipId {
        self.chip
    }

    pub fn link_state(&self) -> LinkState {
        self.link
    }

    pub fn video_state(&self) -> VideoState {
        self.video_state
    }

    pub fn edid_read_state(&self) -> EdidReadState {
        self.edid_read
    }

    pub fn stats(&self) -> &IsrStats {
        &self.stats
    }

    /// Current `(block, batch, fifo_block)` of the EDID read cursor.
    pub fn edid_cursor(&self) -> EdidCursor {
        self.cursor
    }

    /// MHL LINK_MODE value chosen by the last video setup, see
    /// [`Sii8348::link_mode_request`].
    pub fn link_mode(&self) -> u8 {
        self.link_mode
    }

    pub fn sink(&self) -> &E {
        &self.edid
    }

    /// Store the peer DEVCAP block read by the calling layer.
    pub fn set_peer_devcap(&mut self, caps: &[u8; devcap::SIZE]) {
        self.peer_devcap = *caps;
        debug!(
            "mhl: peer devcap dev_cat {:02X} vid_link_mode {:02X}",
            caps[devcap::DEV_CAT],
            caps[devcap::VID_LINK_MODE]
        );
    }

    pub fn peer_devcap(&self) -> &[u8; devcap::SIZE] {
        &self.peer_devcap
    }

    /// Release the owned collaborators.
    pub fn into_parts(self) -> (B, P, E) {
        (self.bus, self.platform, self.edid)
    }

    pub(crate) fn read_reg(&mut self, addr: RegAddr) -> Result<u8> {
        Ok(self.bus.read(addr)?)
    }

    pub(crate) fn write_reg(&mut self, addr: RegAddr, value: u8) -> Result<()> {
        Ok(self.bus.write(addr, value)?)
    }

    pub(crate) fn modify_reg(&mut self, addr: RegAddr, mask: u8, value: u8) -> Result<()> {
        Ok(self.bus.modify(addr, mask, value)?)
    }

    pub(crate) fn read_reg_block(&mut self, addr: RegAddr, buf: &mut [u8]) -> Result<()> {
        Ok(self.bus.read_block(addr, buf)?)
    }

    pub(crate) fn write_reg_block(&mut self, addr: RegAddr, data: &[u8]) -> Result<()> {
        Ok(self.bus.write_block(addr, data)?)
    }

    pub(crate) fn link_event(&mut self, event: LinkEvent) {
        match self.link.on(event) {
            Some(next) => {
                if next != self.link {
                    info!("mhl: link {} -> {}", self.link, next);
                }
                self.link = next;
            }
            None => debug!("mhl: {:?} ignored in state {}", event, self.link),
        }
    }
}

/// Spin-locked transmitter shared by the interrupt thread and callers.
pub struct MhlTx<B: RegisterBus, P: Platform, E: EdidParser> {
    inner: Mutex<Sii8348<B, P, E>>,
}

impl<B: RegisterBus, P: Platform, E: EdidParser> MhlTx<B, P, E> {
    pub fn new(dev: Sii8348<B, P, E>) -> Self {
        Self {
            inner: Mutex::new(dev),
        }
    }

    /// Run one dispatch pass for an asserted interrupt line.
    ///
    /// The report is returned even when the pass aborts on a bus fault:
    /// handlers that ran before the fault have already acknowledged their
    /// status bits, so their events are only reachable through it.
    pub fn isr(&self) -> (InterruptInfo, Result<()>) {
        let mut info = InterruptInfo::new();
        let res = self.inner.lock().device_isr(&mut info);
        (info, res)
    }

    /// Exclusive access for inbound commands.
    pub fn with<R>(&self, f: impl FnOnce(&mut Sii8348<B, P, E>) -> R) -> R {
        let mut dev = self.inner.lock();
        f(&mut dev)
    }
}
