//! CBUS command encoder
//!
//! Turns a logical sideband request into the register writes that make the
//! MSC engine transmit it. Completion is reported later by the MSC handler
//! (`MSC_DONE`, `MSC_NAK`, `CBUS_ABORT`).

use heapless::Vec;
use log::{debug, error, info};

use crate::edid::parser::EdidParser;
use crate::error::{MhlError, Result};
use crate::hal::{Platform, RegisterBus};
use crate::intr::InterruptGroup;
use crate::mhl::{opcode, SCRATCHPAD_SIZE};
use crate::regs::{self, MdtInt0};
use crate::Sii8348;

/// Payload of a WRITE_BURST request.
pub type BurstPayload = Vec<u8, SCRATCHPAD_SIZE>;

/// How the encoder treats a command code.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CbusCommand {
    SetInt,
    WriteStat,
    ReadDevcap,
    ReadEdidBlock,
    /// Simple peer command sent with its opcode and one data byte
    Peer(u8),
    MscMsg,
    WriteBurst,
    Unknown(u8),
}

impl From<u8> for CbusCommand {
    fn from(code: u8) -> Self {
        match code {
            opcode::SET_INT => CbusCommand::SetInt,
            opcode::WRITE_STAT => CbusCommand::WriteStat,
            opcode::READ_DEVCAP => CbusCommand::ReadDevcap,
            opcode::READ_EDID_BLOCK => CbusCommand::ReadEdidBlock,
            opcode::GET_STATE
            | opcode::GET_VENDOR_ID
            | opcode::SET_HPD
            | opcode::CLR_HPD
            | opcode::GET_SC1_ERRORCODE
            | opcode::GET_DDC_ERRORCODE
            | opcode::GET_MSC_ERRORCODE
            | opcode::GET_SC3_ERRORCODE => CbusCommand::Peer(code),
            opcode::MSC_MSG => CbusCommand::MscMsg,
            opcode::WRITE_BURST => CbusCommand::WriteBurst,
            other => CbusCommand::Unknown(other),
        }
    }
}

/// One sideband transaction, consumed by [`Sii8348::send_cbus_command`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CbusRequest {
    pub command: u8,
    /// Target register (SET_INT, WRITE_STAT, READ_DEVCAP)
    pub reg: u8,
    pub reg_data: u8,
    /// Sub-command and data of an MSC_MSG
    pub msg_data: [u8; 2],
    /// Scratchpad offset of a WRITE_BURST
    pub burst_offset: u8,
    pub payload: BurstPayload,
}

impl CbusRequest {
    pub fn new(command: u8) -> Self {
        Self {
            command,
            reg: 0,
            reg_data: 0,
            msg_data: [0; 2],
            burst_offset: 0,
            payload: BurstPayload::new(),
        }
    }

    pub fn set_int(reg: u8, data: u8) -> Self {
        Self {
            reg,
            reg_data: data,
            ..Self::new(opcode::SET_INT)
        }
    }

    pub fn write_stat(reg: u8, data: u8) -> Self {
        Self {
            reg,
            reg_data: data,
            ..Self::new(opcode::WRITE_STAT)
        }
    }

    pub fn read_devcap(offset: u8) -> Self {
        Self {
            reg: offset,
            ..Self::new(opcode::READ_DEVCAP)
        }
    }

    pub fn read_edid_block() -> Self {
        Self::new(opcode::READ_EDID_BLOCK)
    }

    pub fn peer(command: u8, data: u8) -> Self {
        Self {
            reg_data: data,
            ..Self::new(command)
        }
    }

    pub fn msc_msg(sub_command: u8, data: u8) -> Self {
        Self {
            msg_data: [sub_command, data],
            ..Self::new(opcode::MSC_MSG)
        }
    }

    /// WRITE_BURST of `data` at scratchpad `offset`.
    pub fn write_burst(offset: u8, data: &[u8]) -> Result<Self> {
        if data.is_empty() || offset as usize + data.len() > SCRATCHPAD_SIZE {
            return Err(MhlError::OutOfRange);
        }
        let payload = BurstPayload::from_slice(data).map_err(|_| MhlError::OutOfRange)?;
        Ok(Self {
            burst_offset: offset,
            payload,
            ..Self::new(opcode::WRITE_BURST)
        })
    }
}

impl<B: RegisterBus, P: Platform, E: EdidParser> Sii8348<B, P, E> {
    /// Encode and start one sideband command.
    ///
    /// Hardware write burst stays disabled until the next MSC_DONE.
    pub fn send_cbus_command(&mut self, req: &CbusRequest) -> Result<()> {
        self.disable_gen2_write_burst()?;

        let start = match CbusCommand::from(req.command) {
            CbusCommand::SetInt | CbusCommand::WriteStat => {
                debug!("cbus: {:02X} reg {:02X} data {:02X}", req.command, req.reg, req.reg_data);
                self.write_reg(regs::MSC_CMD_OR_OFFSET, req.reg)?;
                self.write_reg(regs::MSC_1ST_TRANSMIT_DATA, req.reg_data)?;
                regs::msc_start::WRITE_STAT_OR_SET_INT
            }
            CbusCommand::ReadDevcap => {
                debug!("cbus: READ_DEVCAP {:02X}", req.reg);
                self.write_reg(regs::MSC_CMD_OR_OFFSET, req.reg)?;
                self.write_reg(regs::MSC_1ST_TRANSMIT_DATA, req.reg_data)?;
                regs::msc_start::READ_DEVCAP
            }
            CbusCommand::ReadEdidBlock => {
                info!("cbus: reading sink EDID");
                self.restart_edid_read();
                return self.issue_edid_read_request(0, 0);
            }
            CbusCommand::Peer(cmd) => {
                debug!("cbus: peer command {:02X} data {:02X}", cmd, req.reg_data);
                self.write_reg(regs::MSC_CMD_OR_OFFSET, cmd)?;
                self.write_reg(regs::MSC_1ST_TRANSMIT_DATA, req.reg_data)?;
                regs::msc_start::PEER_CMD
            }
            CbusCommand::MscMsg => {
                debug!("cbus: MSC_MSG {:02X} {:02X}", req.msg_data[0], req.msg_data[1]);
                let block = [req.command, req.msg_data[0], req.msg_data[1]];
                self.write_reg_block(regs::MSC_CMD_OR_OFFSET, &block)?;
                regs::msc_start::MSC_MSG
            }
            CbusCommand::WriteBurst => {
                let len = req.payload.len();
                if len == 0 {
                    return Err(MhlError::OutOfRange);
                }
                debug!("cbus: WRITE_BURST offset {:02X} length {}", req.burst_offset, len);
                self.write_reg(
                    regs::MSC_CMD_OR_OFFSET,
                    req.burst_offset.wrapping_add(regs::MHL_SCRPAD_BASE),
                )?;
                self.write_reg(regs::MSC_WRITE_BURST_DATA_LEN, (len - 1) as u8)?;
                self.write_reg_block(regs::WB_XMIT_DATA_0, &req.payload)?;
                regs::msc_start::WRITE_BURST
            }
            CbusCommand::Unknown(code) => {
                error!("cbus: unsupported command {:02X}", code);
                return Err(MhlError::UnsupportedCommand(code));
            }
        };

        self.write_reg(regs::MSC_COMMAND_START, start)
    }

    /// Hand the MDT receive engine back to hardware, once the upstream
    /// EDID has been exposed.
    pub(crate) fn enable_gen2_write_burst(&mut self) -> Result<()> {
        if !self.config.mdt_enabled || !self.ready_for_mdt {
            return Ok(());
        }
        self.write_reg(regs::MDT_RCV_TIMEOUT, regs::MDT_TIMEOUT_VAL)?;
        self.write_reg(regs::MDT_RCV_CONTROL, regs::mdt_rcv::RCV_EN_ENABLE)?;
        self.enable_intr(InterruptGroup::G2wb, MdtInt0::RXFIFO_DATA_RDY.bits())?;
        self.gen2_write_burst = true;
        Ok(())
    }

    /// Fall back to legacy WRITE_BURST handling.
    pub(crate) fn disable_gen2_write_burst(&mut self) -> Result<()> {
        if !self.config.mdt_enabled {
            return Ok(());
        }
        self.write_reg(regs::MDT_RCV_CONTROL, regs::mdt_rcv::RCV_EN_DISABLE)?;
        self.enable_intr(InterruptGroup::G2wb, 0)?;
        self.gen2_write_burst = false;
        Ok(())
    }

    /// Copy `data.len()` bytes of the cached scratchpad starting at `start`.
    pub fn scratch_pad(&self, start: usize, data: &mut [u8]) -> Result<()> {
        let end = start.checked_add(data.len()).ok_or(MhlError::OutOfRange)?;
        if end > SCRATCHPAD_SIZE {
            return Err(MhlError::OutOfRange);
        }
        data.copy_from_slice(&self.write_burst_data[start..end]);
        Ok(())
    }
}
