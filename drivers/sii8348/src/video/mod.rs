//! Video output sequencer
//!
//! Output goes Stopped -> ParamsResolved -> Unmuted. `start_video` always
//! passes through a full stop first; with the `hdcp` feature the unmute is
//! deferred until authentication succeeds.

pub mod audio;
pub mod infoframe;
pub mod timing;

use log::{debug, error, info, warn};

use self::audio::AudioMode;
use self::infoframe::{AudioInfoFrame, AviPayload, ColorSpace, VideoSelection, VSIF_LEN};
use crate::cbus::CbusRequest;
use crate::config::DriverConfig;
use crate::edid::parser::EdidParser;
use crate::error::{MhlError, Result};
use crate::hal::{Platform, RegisterBus};
use crate::mhl::{devcap, status as mhl_status, LOCAL_VID_LINK_MODE};
use crate::regs::{self, info_fsel, mhltx, srst, sys_ctrl, tpi_sel, vid_mode};
use crate::Sii8348;
use zerocopy::AsBytes;

#[cfg(feature = "hdcp")]
use crate::intr::InterruptGroup;

/// Video and info-frame session data.
#[derive(Clone, Debug)]
pub struct VideoContext {
    /// Output may be (re)started
    pub(crate) ready: bool,
    /// Upstream requested the video path
    pub(crate) path_enabled: bool,
    pub(crate) valid_vsif: bool,
    pub(crate) valid_3d: bool,
    pub(crate) vsif: [u8; VSIF_LEN],
    pub(crate) selection: VideoSelection,
    pub(crate) audio_mode: AudioMode,
    pub(crate) audio_if: AudioInfoFrame,
    pub(crate) avi: AviPayload,
}

impl VideoContext {
    pub fn new(config: &DriverConfig) -> Self {
        Self {
            ready: false,
            path_enabled: false,
            valid_vsif: false,
            valid_3d: false,
            vsif: [0; VSIF_LEN],
            selection: VideoSelection::for_vic(config.video_mode),
            audio_mode: config.audio_mode,
            audio_if: AudioInfoFrame::build(config.audio_mode),
            avi: AviPayload::default(),
        }
    }

    pub fn selection(&self) -> VideoSelection {
        self.selection
    }

    pub fn avi(&self) -> &AviPayload {
        &self.avi
    }
}

impl<B: RegisterBus, P: Platform, E: EdidParser> Sii8348<B, P, E> {
    pub fn video(&self) -> &VideoContext {
        &self.video
    }

    pub fn select_video_mode(&mut self, vic: u8) {
        self.video.selection = VideoSelection::for_vic(vic);
        info!("video: mode VIC {}", vic);
    }

    pub fn select_audio_mode(&mut self, mode: AudioMode) {
        self.video.audio_mode = mode;
        self.video.audio_if = AudioInfoFrame::build(mode);
        info!("video: audio {:?}", mode);
    }

    /// Store a vendor-specific info-frame to send on the next unmute.
    pub fn set_vendor_infoframe(&mut self, frame: &[u8; VSIF_LEN], three_d: bool) {
        self.video.vsif = *frame;
        self.video.valid_vsif = true;
        self.video.valid_3d = three_d;
    }

    pub fn clear_vendor_infoframe(&mut self) {
        self.video.vsif = [0; VSIF_LEN];
        self.video.valid_vsif = false;
        self.video.valid_3d = false;
    }

    /// Horizontal total measured on the video input.
    pub fn incoming_h_total(&mut self) -> Result<u16> {
        let lo = self.read_reg(regs::HRESL)?;
        let hi = self.read_reg(regs::HRESH)?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    /// Vertical total measured on the video input.
    pub fn incoming_v_total(&mut self) -> Result<u16> {
        let lo = self.read_reg(regs::VRESL)?;
        let hi = self.read_reg(regs::VRESH)?;
        Ok(u16::from_be_bytes([hi, lo]))
    }

    pub fn set_hw_tpi_mode(&mut self, hw: bool) -> Result<()> {
        let mode = if hw {
            tpi_sel::SW_TPI_EN_HW_TPI
        } else {
            tpi_sel::SW_TPI_EN_NON_HW_TPI
        };
        self.modify_reg(regs::TPI_SEL, tpi_sel::SW_TPI_EN_MASK, mode)
    }

    /// Power down TMDS and mute.
    pub fn stop_video(&mut self) -> Result<()> {
        self.power_down_output()?;
        self.video_state = self.video_state.on_stop();
        debug!("video: stopped");
        Ok(())
    }

    /// TMDS off and AV muted, link parameters kept.
    pub(crate) fn power_down_output(&mut self) -> Result<()> {
        #[cfg(feature = "hdcp")]
        {
            self.enable_intr(InterruptGroup::Hdcp, 0)?;
            self.enable_intr(InterruptGroup::Hdcp2, 0)?;
        }

        let mode = if self.edid.sink_is_hdmi() {
            sys_ctrl::TMDS_OUTPUT_MODE_HDMI
        } else {
            sys_ctrl::TMDS_OUTPUT_MODE_DVI
        };
        self.write_reg(
            regs::TPI_SYSTEM_CONTROL,
            sys_ctrl::TMDS_OUTPUT_CONTROL_POWER_DOWN | sys_ctrl::AV_MUTE_MUTED | mode,
        )?;

        #[cfg(feature = "hdcp")]
        {
            self.write_reg(regs::TPI_HDCP_CONTROL, 0)?;
            self.clear_hdcp_status()?;
            self.hdcp.state = crate::hdcp::HdcpState::Stopped;
        }
        Ok(())
    }

    /// Stop, resolve link parameters, then unmute (or authenticate first).
    pub fn start_video(&mut self) -> Result<()> {
        self.stop_video()?;
        if let Err(e) = self.set_hdmi_params() {
            error!("video: {}", e);
            return Err(e);
        }

        #[cfg(feature = "hdcp")]
        self.start_hdcp()?;
        #[cfg(not(feature = "hdcp"))]
        self.unmute_video()?;
        Ok(())
    }

    /// WRITE_STAT announcing the current LINK_MODE to the peer.
    pub fn link_mode_request(&self) -> CbusRequest {
        CbusRequest::write_stat(mhl_status::LINK_MODE, self.link_mode)
    }

    pub(crate) fn packed_pixel_mode(&self) -> bool {
        self.link_mode & mhl_status::CLK_MODE_NORMAL == mhl_status::CLK_MODE_PACKED_PIXEL
    }

    fn packed_pixel_available(&self) -> bool {
        LOCAL_VID_LINK_MODE & devcap::VID_LINK_SUPP_PPIXEL != 0
            && self.peer_devcap[devcap::VID_LINK_MODE] & devcap::VID_LINK_SUPP_PPIXEL != 0
    }

    fn incoming_pixel_clock(&mut self) -> Result<u32> {
        let vic = self.video.selection.vic;
        if vic != 0 {
            return Ok(timing::pixel_clock_for_vic(vic));
        }
        let h = self.incoming_h_total()?;
        let v = self.incoming_v_total()?;
        debug!("video: incoming totals {}x{}", h, v);
        Ok(timing::pixel_clock_from_totals(h, v))
    }

    /// Pick normal or packed pixel mode and build the AVI payload.
    ///
    /// The chosen LINK_MODE is not sent to the peer from here; the caller
    /// issues [`Sii8348::link_mode_request`] once video is set up.
    pub(crate) fn set_hdmi_params(&mut self) -> Result<()> {
        let pixel_clock = self.incoming_pixel_clock()? * timing::FRAME_PACKING_RATIO;
        if pixel_clock == 0 {
            warn!("video: unknown pixel clock");
        }

        let peer_pp = self.packed_pixel_available();
        let packed_pixel = if timing::qualify_pixel_clock(pixel_clock, 24, peer_pp) {
            false
        } else if !self.edid.sink_supports_ycbcr422() {
            return Err(MhlError::UnsupportedVideoMode("sink lacks YCbCr 4:2:2"));
        } else if timing::qualify_pixel_clock(pixel_clock, 16, peer_pp) {
            true
        } else {
            return Err(MhlError::UnsupportedVideoMode("pixel clock too high"));
        };

        let mut selection = self.video.selection;
        if packed_pixel {
            if !peer_pp {
                return Err(MhlError::UnsupportedVideoMode("packed pixel unavailable"));
            }
            self.link_mode = mhl_status::PATH_ENABLED | mhl_status::CLK_MODE_PACKED_PIXEL;
            selection.output = ColorSpace::YCbCr422;
            self.write_reg(regs::VID_MODE, regs::VID_MODE_DEFVAL | vid_mode::M1080P_ENABLE)?;
            self.modify_reg(regs::MHLTX_CTL4, mhltx::CTL4_CLK_RATIO_MASK, mhltx::CTL4_CLK_RATIO_2X)?;
            self.modify_reg(regs::MHLTX_CTL6, mhltx::CTL6_CLK_MASK, mhltx::CTL6_CLK_PP)?;
        } else {
            self.link_mode = mhl_status::PATH_ENABLED | mhl_status::CLK_MODE_NORMAL;
            selection.output = ColorSpace::Rgb;
            self.write_reg(regs::VID_MODE, regs::VID_MODE_DEFVAL | vid_mode::M1080P_DISABLE)?;
            self.modify_reg(regs::MHLTX_CTL4, mhltx::CTL4_CLK_RATIO_MASK, mhltx::CTL4_CLK_RATIO_3X)?;
            self.modify_reg(regs::MHLTX_CTL6, mhltx::CTL6_CLK_MASK, mhltx::CTL6_CLK_NPP)?;
        }
        info!(
            "video: pixel clock {} Hz, {} mode",
            pixel_clock,
            if packed_pixel { "packed pixel" } else { "normal" }
        );

        self.write_reg(regs::TPI_INPUT, selection.input.tpi_format())?;
        self.write_reg(regs::TPI_OUTPUT, selection.output.tpi_format())?;

        self.video.avi = AviPayload::build(selection.output, selection.colorimetry_aspect, selection.vic);
        self.video.selection = selection;
        self.video_state = self.video_state.on_params(packed_pixel);
        Ok(())
    }

    /// Enable TMDS, send info-frames and unmute audio.
    pub(crate) fn unmute_video(&mut self) -> Result<()> {
        self.write_reg(regs::TPI_SYSTEM_CONTROL, sys_ctrl::TMDS_OUTPUT_MODE_HDMI)?;

        let avi = self.video.avi;
        self.write_reg_block(regs::TPI_AVI_CHSUM, avi.as_bytes())?;
        // the last AVI byte latches the frame
        self.write_reg(regs::TPI_AVI_BYTE13, 0x00)?;

        if self.video.valid_vsif && self.video.valid_3d {
            self.write_reg(
                regs::TPI_INFO_FSEL,
                info_fsel::EN | info_fsel::RPT | info_fsel::SEL_3D_VSIF,
            )?;
            let vsif = self.video.vsif;
            self.write_reg_block(regs::TPI_INFO_BYTE00, &vsif)?;
            self.write_reg(regs::TPI_INFO_BYTE30, 0x00)?;
            debug!("video: 3D VSIF sent");
        }

        let mode = self.video.audio_mode;
        self.configure_audio(mode)?;
        self.modify_reg(
            regs::TPI_CONFIG3,
            regs::config3::MUTE_MASK,
            regs::config3::MUTE_NORMAL,
        )?;
        self.write_reg(regs::TPI_INFO_FSEL, regs::TPI_INFO_FSEL_AUDIO_RPT)?;
        let audio_if = self.video.audio_if;
        self.write_reg_block(regs::TPI_INFO_BYTE00, audio_if.as_bytes())?;

        self.modify_reg(regs::SRST, srst::AUDIO_FIFO_RST_MASK, srst::AUDIO_FIFO_RST_SET)?;
        self.modify_reg(regs::SRST, srst::AUDIO_FIFO_RST_MASK, srst::AUDIO_FIFO_RST_CLR)?;

        self.video.ready = true;
        match self.video_state.on_unmute() {
            Some(next) => self.video_state = next,
            None => warn!("video: unmute without resolved parameters"),
        }
        info!("video: unmuted");
        Ok(())
    }

    pub fn enable_video_path(&mut self) -> Result<()> {
        self.video.path_enabled = true;
        self.start_video()
    }

    pub fn disable_video_path(&mut self) -> Result<()> {
        if self.output_running()? {
            self.stop_video()?;
            self.video.path_enabled = false;
        }
        Ok(())
    }

    /// Upstream content stopped, path stays enabled.
    pub fn content_off(&mut self) -> Result<()> {
        if self.output_running()? {
            self.stop_video()?;
        }
        Ok(())
    }

    /// Restart output that was stopped by `content_off`.
    pub fn content_on(&mut self) -> Result<()> {
        if !self.video.ready {
            return Ok(());
        }
        let stopped = sys_ctrl::TMDS_OUTPUT_CONTROL_POWER_DOWN | sys_ctrl::AV_MUTE_MUTED;
        let ctrl = self.read_reg(regs::TPI_SYSTEM_CONTROL)?;
        if ctrl & stopped == stopped {
            self.start_video()?;
        }
        Ok(())
    }

    fn output_running(&mut self) -> Result<bool> {
        if !self.video.ready {
            return Ok(false);
        }
        let ctrl = self.read_reg(regs::TPI_SYSTEM_CONTROL)?;
        Ok(ctrl & sys_ctrl::AV_MUTE_MASK == sys_ctrl::AV_MUTE_NORMAL)
    }
}
