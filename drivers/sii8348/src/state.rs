//! Explicit connection, video and EDID read states
//!
//! Every transition goes through a transition function. Events that make
//! no sense in the current state return `None` and leave the state alone.

use core::fmt;

/// Connection lifecycle of the MHL link.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LinkState {
    /// Chip powered down, waiting for an RGND measurement
    D3,
    /// Valid RGND seen, VBUS on, discovery pulses running
    Discovery,
    /// MHL_EST received, registers initialized
    Established,
    /// Peer reported DCAP_RDY, capability exchange possible
    Connected,
}

/// Inputs of the [`LinkState`] machine.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LinkEvent {
    Rgnd,
    MhlEstablished,
    DcapReady,
    Disconnect,
}

impl LinkState {
    pub fn on(self, event: LinkEvent) -> Option<LinkState> {
        use LinkEvent::*;
        use LinkState::*;

        match (self, event) {
            (_, Disconnect) => Some(D3),
            (D3, Rgnd) | (Discovery, Rgnd) => Some(Discovery),
            (Discovery, MhlEstablished) | (Established, MhlEstablished) => Some(Established),
            (Established, DcapReady) | (Connected, DcapReady) => Some(Connected),
            _ => None,
        }
    }

    pub fn is_powered(self) -> bool {
        self != LinkState::D3
    }
}

impl fmt::Display for LinkState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            LinkState::D3 => "D3",
            LinkState::Discovery => "discovery",
            LinkState::Established => "established",
            LinkState::Connected => "connected",
        };
        f.write_str(name)
    }
}

/// Output video pipeline state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VideoState {
    /// TMDS powered down, AV muted
    Stopped,
    /// Link clock mode and AVI payload chosen, output still muted
    ParamsResolved { packed_pixel: bool },
    /// Info-frames sent, AV unmuted
    Unmuted,
}

impl VideoState {
    pub fn on_stop(self) -> VideoState {
        VideoState::Stopped
    }

    pub fn on_params(self, packed_pixel: bool) -> VideoState {
        VideoState::ParamsResolved { packed_pixel }
    }

    /// Output muted again while the link parameters stay valid.
    pub fn on_mute(self, packed_pixel: bool) -> VideoState {
        match self {
            VideoState::Unmuted => VideoState::ParamsResolved { packed_pixel },
            other => other,
        }
    }

    pub fn on_unmute(self) -> Option<VideoState> {
        match self {
            VideoState::ParamsResolved { .. } | VideoState::Unmuted => Some(VideoState::Unmuted),
            VideoState::Stopped => None,
        }
    }
}

/// Progress of the downstream EDID read.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum EdidReadState {
    Idle,
    /// DDC read of one 16-byte batch is in flight
    BatchRequested { block: u8, batch: u8 },
    /// All blocks assembled
    Complete { blocks: u8 },
    /// Read abandoned, reported upward with an error payload
    Failed,
}

impl EdidReadState {
    pub fn is_busy(self) -> bool {
        matches!(self, EdidReadState::BatchRequested { .. })
    }
}
