//! Downstream EDID reader
//!
//! The sink EDID is fetched over DDC in 16-byte batches, eight batches per
//! 128-byte block. Each batch completes with a DDC_CMD_DONE interrupt; the
//! handler stores the batch and issues the next one until block 0 and all
//! declared extension blocks have been read. The outcome is reported
//! upward as a completed MSC command (`msc_done_data` 0 or 1).

pub mod parser;

use log::{debug, error, info, warn};

use crate::error::{EdidError, MhlError, Result};
use crate::hal::{Platform, RegisterBus};
use crate::intr::{InterruptGroup, IsrOutcome};
use crate::notify::{InterruptInfo, EDID_READ_ERROR, EDID_READ_OK};
use crate::regs::{self, Intr3};
use crate::state::EdidReadState;
use crate::Sii8348;

use self::parser::EdidParser;

pub const EDID_BLOCK_SIZE: usize = 128;
pub const EDID_BATCH_SIZE: usize = regs::ddc::BATCH_LEN as usize;
pub const BATCHES_PER_BLOCK: u8 = (EDID_BLOCK_SIZE / EDID_BATCH_SIZE) as u8;
/// Base block plus up to three extensions.
pub const EDID_MAX_BLOCKS: usize = 4;

/// Assembled EDID image.
pub type EdidBuffer = heapless::Vec<u8, { EDID_BLOCK_SIZE * EDID_MAX_BLOCKS }>;

/// Position of the block read and of the upward block read-out.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EdidCursor {
    /// Block currently being read
    pub block: u8,
    /// Batch of `block` currently in flight, 0..=7
    pub batch: u8,
    /// Next block handed out by `edid_fifo_next_block`
    pub fifo_block: u8,
}

impl EdidCursor {
    pub const fn new() -> Self {
        Self {
            block: 0,
            batch: 0,
            fifo_block: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn data_offset(&self) -> usize {
        EDID_BLOCK_SIZE * self.block as usize + EDID_BATCH_SIZE * self.batch as usize
    }
}

/// DDC offset of `batch` inside `block`. Odd blocks live in the upper
/// half of their segment.
fn ddc_offset(block: u8, batch: u8) -> u8 {
    let base = if block % 2 == 0 { 0x00 } else { 0x80 };
    base + batch * EDID_BATCH_SIZE as u8
}

impl<B: RegisterBus, P: Platform, E: EdidParser> Sii8348<B, P, E> {
    pub(crate) fn hpd_asserted(&mut self) -> Result<bool> {
        Ok(self.read_reg(regs::CBUS_STATUS)? & regs::cbus_status::HPD != 0)
    }

    /// Forget any partial read and start again from block 0.
    pub(crate) fn restart_edid_read(&mut self) {
        self.cursor.reset();
        self.edid_data.clear();
        self.edid_read = EdidReadState::Idle;
    }

    /// Request one batch, provided the sink still asserts HPD.
    pub fn issue_edid_read_request(&mut self, block: u8, batch: u8) -> Result<()> {
        if !self.hpd_asserted()? {
            info!("edid: no HPD for block {} batch {}", block, batch);
            return Err(MhlError::NoHpd);
        }
        debug!(
            "edid: request block {} batch {} (fifo block {})",
            block, batch, self.cursor.fifo_block
        );
        self.cursor.block = block;
        self.cursor.batch = batch;
        self.reset_ddc_fifo()?;
        self.issue_batch_read(block, batch)?;
        self.edid_read = EdidReadState::BatchRequested { block, batch };
        Ok(())
    }

    /// Clear a pending NACK and flush the DDC FIFO.
    pub(crate) fn reset_ddc_fifo(&mut self) -> Result<()> {
        let ddc_status = self.read_reg(regs::DDC_STATUS)?;
        self.modify_reg(
            regs::TPI_SEL,
            regs::tpi_sel::SW_TPI_EN_MASK,
            regs::tpi_sel::SW_TPI_EN_NON_HW_TPI,
        )?;
        self.clear_ddc_nack(ddc_status)?;
        self.modify_reg(regs::DDC_CMD, regs::ddc::CMD_MASK, regs::ddc::CMD_CLEAR_FIFO)?;
        self.modify_reg(
            regs::TPI_SEL,
            regs::tpi_sel::SW_TPI_EN_MASK,
            regs::tpi_sel::SW_TPI_EN_HW_TPI,
        )
    }

    fn clear_ddc_nack(&mut self, ddc_status: u8) -> Result<()> {
        if ddc_status & regs::ddc::STATUS_NO_ACK != 0 {
            warn!("edid: clearing DDC NACK status");
            self.write_reg(regs::DDC_STATUS, ddc_status & !regs::ddc::STATUS_NO_ACK)?;
        }
        Ok(())
    }

    /// Program the DDC master for one 16-byte batch. The chip stays in
    /// software TPI mode until the read is over.
    fn issue_batch_read(&mut self, block: u8, batch: u8) -> Result<()> {
        let ddc_status = self.read_reg(regs::DDC_STATUS)?;
        self.modify_reg(
            regs::TPI_SEL,
            regs::tpi_sel::SW_TPI_EN_MASK,
            regs::tpi_sel::SW_TPI_EN_NON_HW_TPI,
        )?;
        self.clear_ddc_nack(ddc_status)?;
        self.modify_reg(regs::DDC_CMD, regs::ddc::CMD_MASK, regs::ddc::CMD_CLEAR_FIFO)?;

        self.write_reg(regs::DDC_SEGM, block / 2)?;
        self.write_reg(regs::DDC_ADDR, regs::DDC_EDID_SLAVE)?;
        self.write_reg(regs::DDC_OFFSET, ddc_offset(block, batch))?;
        self.write_reg(regs::DDC_DIN_CNT1, regs::ddc::BATCH_LEN)?;
        self.write_reg(regs::DDC_DIN_CNT2, 0x00)?;
        self.write_reg(regs::DDC_CMD, regs::ddc::CMD_ENHANCED_READ_NO_ACK)
    }

    /// Restart at block 0, or report failure when even that cannot be issued.
    fn restart_or_fail(&mut self, info: &mut InterruptInfo) -> Result<()> {
        self.restart_edid_read();
        match self.issue_edid_read_request(0, 0) {
            Ok(()) => Ok(()),
            Err(MhlError::NoHpd) => {
                self.fail_edid_read(info);
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    fn fail_edid_read(&mut self, info: &mut InterruptInfo) {
        error!("edid: read failed");
        self.edid_read = EdidReadState::Failed;
        info.msc_done(EDID_READ_ERROR);
    }

    /// INTR3: one DDC batch finished.
    pub(crate) fn edid_isr(&mut self, status: u8, info: &mut InterruptInfo) -> Result<IsrOutcome> {
        let events = Intr3::from_bits_truncate(status);
        if !events.contains(Intr3::DDC_CMD_DONE) {
            return Ok(IsrOutcome::Cleared(status));
        }

        let ddc_status = self.read_reg(regs::DDC_STATUS)?;
        if ddc_status & regs::ddc::STATUS_NO_ACK != 0 {
            warn!(
                "edid: NACK at block {} batch {}, restarting",
                self.cursor.block, self.cursor.batch
            );
            self.restart_or_fail(info)?;
            return Ok(IsrOutcome::Cleared(status));
        }

        if !events.contains(Intr3::DDC_FIFO_FULL) {
            // done without data
            debug!("edid: DDC done without FIFO full, ignored");
            self.reset_ddc_fifo()?;
            self.write_reg(regs::INTR3, 0x0F)?;
            return Ok(IsrOutcome::Handled);
        }

        match self.store_batch() {
            Ok(()) => {}
            Err(MhlError::OutOfRange) => {
                self.write_reg(regs::INTR3, status)?;
                self.restart_or_fail(info)?;
                return Ok(IsrOutcome::Handled);
            }
            Err(e) => return Err(e),
        }
        self.write_reg(regs::INTR3, Intr3::DDC_FIFO_FULL.bits())?;

        if self.cursor.batch + 1 < BATCHES_PER_BLOCK {
            let (block, batch) = (self.cursor.block, self.cursor.batch + 1);
            self.cursor.batch = batch;
            self.reset_ddc_fifo()?;
            self.issue_batch_read(block, batch)?;
            self.edid_read = EdidReadState::BatchRequested { block, batch };
        } else {
            self.block_complete(info)?;
        }

        Ok(IsrOutcome::Cleared(status))
    }

    fn store_batch(&mut self) -> Result<()> {
        let mut batch = [0u8; EDID_BATCH_SIZE];
        for byte in batch.iter_mut() {
            *byte = self.read_reg(regs::DDC_DATA)?;
        }
        debug!(
            "edid: block {} batch {}: {:02X?}",
            self.cursor.block, self.cursor.batch, batch
        );

        let offset = self.cursor.data_offset();
        self.edid_data.truncate(offset);
        if self.edid_data.len() != offset {
            error!("edid: batch out of sequence at offset {}", offset);
            return Err(MhlError::OutOfRange);
        }
        self.edid_data
            .extend_from_slice(&batch)
            .map_err(|_| MhlError::OutOfRange)
    }

    /// Hand the finished block to the parser and move to the next one.
    fn block_complete(&mut self, info: &mut InterruptInfo) -> Result<()> {
        let block = self.cursor.block;
        info!("edid: block {} complete", block);

        match self.parse_current_block() {
            Err(MhlError::Edid(EdidError::NoHpd)) | Err(MhlError::NoHpd) => {
                warn!("edid: HPD lost after block {}", block);
                self.restart_edid_read();
                self.reset_ddc_fifo()?;
                self.fail_edid_read(info);
            }
            Err(MhlError::Edid(e)) => {
                error!("edid: block {} rejected: {}", block, e);
                self.reset_ddc_fifo()?;
                self.restart_or_fail(info)?;
            }
            Err(e) => return Err(e),
            Ok(extensions) => {
                let extensions = extensions.min((EDID_MAX_BLOCKS - 1) as u8);
                if block < extensions {
                    let next = block + 1;
                    if let Err(e) = self.issue_edid_read_request(next, 0) {
                        if e != MhlError::NoHpd {
                            return Err(e);
                        }
                        self.fail_edid_read(info);
                    }
                } else {
                    info!("edid: all {} block(s) read", block + 1);
                    self.edid_read = EdidReadState::Complete { blocks: block + 1 };
                    info.msc_done(EDID_READ_OK);
                }
            }
        }
        Ok(())
    }

    fn parse_current_block(&mut self) -> Result<u8> {
        if !self.hpd_asserted()? {
            return Err(MhlError::NoHpd);
        }
        let start = EDID_BLOCK_SIZE * self.cursor.block as usize;
        let data = self
            .edid_data
            .get(start..start + EDID_BLOCK_SIZE)
            .ok_or(MhlError::NoEdidBlock)?;
        let mut block = [0u8; EDID_BLOCK_SIZE];
        block.copy_from_slice(data);
        Ok(self.edid.parse_block(self.cursor.block, &block)?)
    }

    /// Copy the next assembled block to `buf`.
    ///
    /// The block is consumed even when HPD has dropped meanwhile; the
    /// caller then gets `NoHpd`.
    pub fn edid_fifo_next_block(&mut self, buf: &mut [u8; EDID_BLOCK_SIZE]) -> Result<()> {
        let start = EDID_BLOCK_SIZE * self.cursor.fifo_block as usize;
        let data = self
            .edid_data
            .get(start..start + EDID_BLOCK_SIZE)
            .ok_or(MhlError::NoEdidBlock)?;
        buf.copy_from_slice(data);
        self.cursor.fifo_block += 1;
        debug!("edid: handed out block {}", self.cursor.fifo_block - 1);

        if self.hpd_asserted()? {
            Ok(())
        } else {
            info!("edid: no HPD after block read-out");
            Err(MhlError::NoHpd)
        }
    }

    /// Assembled EDID bytes read so far.
    pub fn edid_data(&self) -> &[u8] {
        &self.edid_data
    }

    /// Expose the EDID upstream: no more DDC traffic, hardware write burst
    /// may run from now on.
    ///
    /// `edid` must hold whole blocks, at most as many as were read from
    /// the sink.
    pub fn set_upstream_edid(&mut self, edid: &[u8]) -> Result<()> {
        if !self.hpd_asserted()? {
            return Err(MhlError::NoHpd);
        }
        if edid.is_empty()
            || edid.len() % EDID_BLOCK_SIZE != 0
            || edid.len() > self.edid_data.len()
        {
            error!(
                "edid: upstream EDID of {} bytes, {} read from sink",
                edid.len(),
                self.edid_data.len()
            );
            return Err(MhlError::OutOfRange);
        }
        info!("edid: exposing {} block EDID upstream", edid.len() / EDID_BLOCK_SIZE);
        self.enable_intr(InterruptGroup::Edid, 0)?;
        self.ready_for_mdt = true;
        self.enable_gen2_write_burst()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cbus::CbusRequest;
    use crate::intr::handlers::EDID_MASK;
    use crate::notify::DrvIntrFlags;
    use crate::regs::Intr1;
    use crate::MhlTx;
    use crate::testing::{harness, test_edid_block, MockBus, MockPlatform, StubSink};

    type Dev = Sii8348<MockBus, MockPlatform, StubSink>;

    fn connected() -> Dev {
        let mut dev = harness();
        dev.bus.set(regs::CBUS_STATUS, regs::cbus_status::HPD);
        dev.enable_intr(InterruptGroup::Edid, EDID_MASK.bits()).unwrap();
        dev
    }

    /// Complete the batch in flight with `data`.
    fn finish_batch(dev: &mut Dev, data: &[u8]) -> InterruptInfo {
        dev.bus.push_reads(regs::DDC_DATA, data);
        dev.bus.set(regs::INTR3, (Intr3::DDC_CMD_DONE | Intr3::DDC_FIFO_FULL).bits());
        let mut info = InterruptInfo::new();
        dev.device_isr(&mut info).unwrap();
        info
    }

    fn finish_block(dev: &mut Dev, block: &[u8; EDID_BLOCK_SIZE]) -> InterruptInfo {
        let mut info = InterruptInfo::new();
        for batch in block.chunks(EDID_BATCH_SIZE) {
            info = finish_batch(dev, batch);
        }
        info
    }

    #[test]
    fn test_batch_offsets() {
        assert_eq!(ddc_offset(0, 0), 0x00);
        assert_eq!(ddc_offset(0, 7), 0x70);
        assert_eq!(ddc_offset(1, 0), 0x80);
        assert_eq!(ddc_offset(3, 2), 0xA0);
    }

    #[test]
    fn test_read_request_programs_ddc() {
        let mut dev = connected();
        dev.send_cbus_command(&CbusRequest::read_edid_block()).unwrap();

        assert_eq!(dev.bus.get(regs::DDC_SEGM), 0);
        assert_eq!(dev.bus.get(regs::DDC_ADDR), 0xA0);
        assert_eq!(dev.bus.get(regs::DDC_OFFSET), 0);
        assert_eq!(dev.bus.get(regs::DDC_DIN_CNT1), 0x10);
        assert_eq!(dev.bus.get(regs::DDC_CMD), regs::ddc::CMD_ENHANCED_READ_NO_ACK);
        assert_eq!(
            dev.edid_read_state(),
            EdidReadState::BatchRequested { block: 0, batch: 0 }
        );
        // software TPI mode during the read
        assert_eq!(dev.bus.get(regs::TPI_SEL), regs::tpi_sel::SW_TPI_EN_NON_HW_TPI);
    }

    #[test]
    fn test_eight_batches_assemble_one_block() {
        let mut dev = connected();
        dev.send_cbus_command(&CbusRequest::read_edid_block()).unwrap();

        let block: [u8; EDID_BLOCK_SIZE] = core::array::from_fn(|i| i as u8);
        let mut offsets = Vec::new();
        let mut info = InterruptInfo::new();
        for (i, batch) in block.chunks(EDID_BATCH_SIZE).enumerate() {
            assert_eq!(dev.edid_cursor().batch as usize, i);
            info = finish_batch(&mut dev, batch);
            if i < 7 {
                offsets.push(dev.bus.get(regs::DDC_OFFSET));
                assert!(!info.has(DrvIntrFlags::MSC_DONE));
            }
        }

        assert_eq!(offsets, vec![0x10, 0x20, 0x30, 0x40, 0x50, 0x60, 0x70]);
        assert_eq!(dev.edid_data(), &block[..]);
        assert!(info.has(DrvIntrFlags::MSC_DONE));
        assert_eq!(info.msc_done_data, EDID_READ_OK);
        assert_eq!(dev.edid_read_state(), EdidReadState::Complete { blocks: 1 });
        assert_eq!(dev.sink().parsed, vec![0]);
    }

    #[test]
    fn test_extension_blocks_follow_base_block() {
        let mut dev = connected();
        dev.edid.extensions = 1;
        dev.send_cbus_command(&CbusRequest::read_edid_block()).unwrap();

        let base = test_edid_block(1);
        let info = finish_block(&mut dev, &base);
        assert!(!info.has(DrvIntrFlags::MSC_DONE));
        assert_eq!(dev.edid_cursor().block, 1);
        assert_eq!(dev.bus.get(regs::DDC_SEGM), 0);
        assert_eq!(dev.bus.get(regs::DDC_OFFSET), 0x80);

        let ext = [0x02u8; EDID_BLOCK_SIZE];
        let info = finish_block(&mut dev, &ext);
        assert_eq!(info.msc_done_data, EDID_READ_OK);
        assert_eq!(dev.edid_data().len(), 2 * EDID_BLOCK_SIZE);
        assert_eq!(dev.edid_read_state(), EdidReadState::Complete { blocks: 2 });

        let mut out = [0u8; EDID_BLOCK_SIZE];
        dev.edid_fifo_next_block(&mut out).unwrap();
        assert_eq!(out, base);
        dev.edid_fifo_next_block(&mut out).unwrap();
        assert_eq!(out, ext);
        assert_eq!(dev.edid_fifo_next_block(&mut out).unwrap_err(), MhlError::NoEdidBlock);
    }

    #[test]
    fn test_nack_restarts_from_block_zero() {
        let mut dev = connected();
        dev.edid.extensions = 1;
        dev.send_cbus_command(&CbusRequest::read_edid_block()).unwrap();
        finish_block(&mut dev, &test_edid_block(1));
        finish_batch(&mut dev, &[0; 16]);
        finish_batch(&mut dev, &[0; 16]);
        assert_eq!((dev.edid_cursor().block, dev.edid_cursor().batch), (1, 2));

        dev.bus.set(regs::DDC_STATUS, regs::ddc::STATUS_NO_ACK);
        dev.bus.set(regs::INTR3, Intr3::DDC_CMD_DONE.bits());
        let mut info = InterruptInfo::new();
        dev.device_isr(&mut info).unwrap();

        assert!(!info.has(DrvIntrFlags::MSC_DONE));
        assert_eq!(dev.edid_cursor(), EdidCursor::new());
        assert!(dev.edid_data().is_empty());
        assert_eq!(dev.bus.get(regs::DDC_OFFSET), 0);
        assert_eq!(dev.bus.get(regs::DDC_SEGM), 0);
        assert_eq!(dev.bus.get(regs::DDC_STATUS) & regs::ddc::STATUS_NO_ACK, 0);
        assert_eq!(
            dev.edid_read_state(),
            EdidReadState::BatchRequested { block: 0, batch: 0 }
        );
    }

    #[test]
    fn test_nack_without_hpd_reports_error() {
        let mut dev = connected();
        dev.send_cbus_command(&CbusRequest::read_edid_block()).unwrap();
        dev.bus.set(regs::CBUS_STATUS, 0);
        dev.bus.set(regs::DDC_STATUS, regs::ddc::STATUS_NO_ACK);
        dev.bus.set(regs::INTR3, Intr3::DDC_CMD_DONE.bits());

        let mut info = InterruptInfo::new();
        dev.device_isr(&mut info).unwrap();

        assert!(info.has(DrvIntrFlags::MSC_DONE));
        assert_eq!(info.msc_done_data, EDID_READ_ERROR);
        assert_eq!(dev.edid_read_state(), EdidReadState::Failed);
    }

    #[test]
    fn test_hpd_loss_at_block_end_reports_error() {
        let mut dev = connected();
        dev.send_cbus_command(&CbusRequest::read_edid_block()).unwrap();
        let block = test_edid_block(0);
        for batch in block.chunks(EDID_BATCH_SIZE).take(7) {
            finish_batch(&mut dev, batch);
        }
        dev.bus.set(regs::CBUS_STATUS, 0);
        let info = finish_batch(&mut dev, &block[112..]);

        assert_eq!(info.msc_done_data, EDID_READ_ERROR);
        assert_eq!(dev.edid_cursor(), EdidCursor::new());
        assert!(dev.sink().parsed.is_empty());
    }

    #[test]
    fn test_parser_rejection_restarts_read() {
        let mut dev = connected();
        dev.edid.fail_with = Some(EdidError::BadHeader);
        dev.send_cbus_command(&CbusRequest::read_edid_block()).unwrap();

        let info = finish_block(&mut dev, &[0xAA; EDID_BLOCK_SIZE]);

        assert!(!info.has(DrvIntrFlags::MSC_DONE));
        assert_eq!(
            dev.edid_read_state(),
            EdidReadState::BatchRequested { block: 0, batch: 0 }
        );
        assert!(dev.edid_data().is_empty());
    }

    #[test]
    fn test_spurious_done_is_ignored() {
        let mut dev = connected();
        dev.send_cbus_command(&CbusRequest::read_edid_block()).unwrap();
        dev.bus.set(regs::INTR3, Intr3::DDC_CMD_DONE.bits());
        dev.bus.clear_log();

        let mut info = InterruptInfo::new();
        dev.device_isr(&mut info).unwrap();

        assert!(info.flags.is_empty());
        assert_eq!(dev.bus.read_count(regs::DDC_DATA), 0);
        assert_eq!(dev.bus.writes_to(regs::INTR3), vec![0x0F]);
        assert_eq!(dev.edid_cursor().batch, 0);
    }

    #[test]
    fn test_fifo_read_out_reports_lost_hpd() {
        let mut dev = connected();
        dev.send_cbus_command(&CbusRequest::read_edid_block()).unwrap();
        finish_block(&mut dev, &test_edid_block(0));
        dev.bus.set(regs::CBUS_STATUS, 0);

        let mut out = [0u8; EDID_BLOCK_SIZE];
        assert_eq!(dev.edid_fifo_next_block(&mut out).unwrap_err(), MhlError::NoHpd);
        // block still handed out
        assert_eq!(out[1], 0xFF);
        assert_eq!(dev.edid_cursor().fifo_block, 1);
    }

    #[test]
    fn test_mid_block_nack_restarts_from_block_zero() {
        let mut dev = connected();
        dev.send_cbus_command(&CbusRequest::read_edid_block()).unwrap();
        let block = test_edid_block(0);
        for batch in block.chunks(EDID_BATCH_SIZE).take(4) {
            finish_batch(&mut dev, batch);
        }
        assert_eq!((dev.edid_cursor().block, dev.edid_cursor().batch), (0, 4));
        assert_eq!(dev.edid_data().len(), 4 * EDID_BATCH_SIZE);

        dev.bus.set(regs::DDC_STATUS, regs::ddc::STATUS_NO_ACK);
        dev.bus.set(regs::INTR3, Intr3::DDC_CMD_DONE.bits());
        let mut info = InterruptInfo::new();
        dev.device_isr(&mut info).unwrap();

        assert!(!info.has(DrvIntrFlags::MSC_DONE));
        assert_eq!(dev.edid_cursor(), EdidCursor::new());
        assert!(dev.edid_data().is_empty());
        assert_eq!(dev.bus.get(regs::DDC_OFFSET), 0);
        assert_eq!(
            dev.edid_read_state(),
            EdidReadState::BatchRequested { block: 0, batch: 0 }
        );

        // the restarted read assembles a clean block
        let info = finish_block(&mut dev, &block);
        assert_eq!(info.msc_done_data, EDID_READ_OK);
        assert_eq!(dev.edid_data(), &block[..]);
    }

    #[test]
    fn test_read_completion_survives_later_bus_fault() {
        let mut dev = connected();
        dev.enable_intr(InterruptGroup::Intr1, Intr1::RSEN_CHG.bits()).unwrap();
        dev.send_cbus_command(&CbusRequest::read_edid_block()).unwrap();
        let block = test_edid_block(0);
        for batch in block.chunks(EDID_BATCH_SIZE).take(7) {
            finish_batch(&mut dev, batch);
        }
        dev.bus.fail_reads(regs::INTR1);
        dev.bus.push_reads(regs::DDC_DATA, &block[112..]);
        dev.bus.set(regs::INTR3, (Intr3::DDC_CMD_DONE | Intr3::DDC_FIFO_FULL).bits());
        let tx = MhlTx::new(dev);

        let (info, res) = tx.isr();

        assert!(matches!(res, Err(MhlError::Bus(_))));
        assert!(info.has(DrvIntrFlags::MSC_DONE));
        assert_eq!(info.msc_done_data, EDID_READ_OK);
        tx.with(|dev| {
            assert_eq!(dev.edid_read_state(), EdidReadState::Complete { blocks: 1 });
        });
    }

    #[test]
    fn test_out_of_sequence_batch_restarts_and_clears_status() {
        let mut dev = connected();
        dev.send_cbus_command(&CbusRequest::read_edid_block()).unwrap();
        finish_batch(&mut dev, &[0x11; EDID_BATCH_SIZE]);
        // buffer lost behind the cursor's back
        dev.edid_data.clear();
        dev.bus.clear_log();

        let info = finish_batch(&mut dev, &[0x22; EDID_BATCH_SIZE]);

        assert!(!info.has(DrvIntrFlags::MSC_DONE));
        assert_eq!(
            dev.bus.writes_to(regs::INTR3),
            vec![(Intr3::DDC_CMD_DONE | Intr3::DDC_FIFO_FULL).bits()]
        );
        assert_eq!(dev.edid_cursor(), EdidCursor::new());
        assert!(dev.edid_data().is_empty());
        assert_eq!(
            dev.edid_read_state(),
            EdidReadState::BatchRequested { block: 0, batch: 0 }
        );
    }

    #[test]
    fn test_upstream_edid_enables_write_burst_engine() {
        let mut dev = connected();
        dev.send_cbus_command(&CbusRequest::read_edid_block()).unwrap();
        finish_block(&mut dev, &test_edid_block(0));
        dev.set_upstream_edid(&test_edid_block(0)).unwrap();

        assert_eq!(dev.intr_mask(InterruptGroup::Edid), 0);
        assert!(dev.ready_for_mdt);
        assert!(dev.gen2_write_burst);
        assert_eq!(dev.bus.get(regs::MDT_RCV_TIMEOUT), regs::MDT_TIMEOUT_VAL);
    }

    #[test]
    fn test_upstream_edid_needs_hpd() {
        let mut dev = harness();
        assert_eq!(dev.set_upstream_edid(&[]).unwrap_err(), MhlError::NoHpd);
        assert!(!dev.ready_for_mdt);
    }

    #[test]
    fn test_upstream_edid_must_be_whole_read_blocks() {
        let mut dev = connected();
        dev.send_cbus_command(&CbusRequest::read_edid_block()).unwrap();
        finish_block(&mut dev, &test_edid_block(0));

        assert_eq!(dev.set_upstream_edid(&[]).unwrap_err(), MhlError::OutOfRange);
        assert_eq!(dev.set_upstream_edid(&[0u8; 100]).unwrap_err(), MhlError::OutOfRange);
        // more blocks than the sink provided
        let two = [0u8; 2 * EDID_BLOCK_SIZE];
        assert_eq!(dev.set_upstream_edid(&two).unwrap_err(), MhlError::OutOfRange);
        assert!(!dev.ready_for_mdt);
        assert_ne!(dev.intr_mask(InterruptGroup::Edid), 0);
    }
}
