//! Recording test doubles for the hardware seams

use std::collections::{HashMap, HashSet, VecDeque};
use std::vec::Vec;

use crate::config::DriverConfig;
use crate::edid::parser::EdidParser;
use crate::edid::EDID_BLOCK_SIZE;
use crate::error::EdidError;
use crate::hal::{BusError, Platform, RegAddr, RegisterBus};
use crate::Sii8348;

/// Errno handed back for injected read faults.
pub const EIO: i32 = -5;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Access {
    Read(RegAddr),
    Write(RegAddr, u8),
}

/// Register file with a full access log.
///
/// Reads return queued values first, then the register file. Block reads
/// take a queued block if one exists, else read consecutive registers.
#[derive(Debug, Default)]
pub struct MockBus {
    regs: HashMap<RegAddr, u8>,
    reads: HashMap<RegAddr, VecDeque<u8>>,
    blocks: HashMap<RegAddr, VecDeque<Vec<u8>>>,
    failing: HashSet<RegAddr>,
    log: Vec<Access>,
    writes: Vec<(RegAddr, u8)>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset a register without logging.
    pub fn set(&mut self, addr: RegAddr, value: u8) {
        self.regs.insert(addr, value);
    }

    pub fn get(&self, addr: RegAddr) -> u8 {
        self.regs.get(&addr).copied().unwrap_or(0)
    }

    /// Values returned by the next reads of `addr`, in order.
    pub fn push_reads(&mut self, addr: RegAddr, values: &[u8]) {
        self.reads.entry(addr).or_default().extend(values.iter().copied());
    }

    /// Data returned by the next block read starting at `addr`.
    pub fn push_block(&mut self, addr: RegAddr, data: &[u8]) {
        self.blocks.entry(addr).or_default().push_back(data.to_vec());
    }

    pub fn fail_reads(&mut self, addr: RegAddr) {
        self.failing.insert(addr);
    }

    pub fn read_count(&self, addr: RegAddr) -> usize {
        self.log.iter().filter(|a| **a == Access::Read(addr)).count()
    }

    /// Position of the first read of `addr` in the access log.
    pub fn first_read_index(&self, addr: RegAddr) -> Option<usize> {
        self.log.iter().position(|a| *a == Access::Read(addr))
    }

    /// Position of the last write to `addr` in the access log.
    pub fn last_write_index(&self, addr: RegAddr) -> Option<usize> {
        self.log
            .iter()
            .rposition(|a| matches!(a, Access::Write(w, _) if *w == addr))
    }

    pub fn writes(&self) -> &[(RegAddr, u8)] {
        &self.writes
    }

    pub fn writes_to(&self, addr: RegAddr) -> Vec<u8> {
        self.writes
            .iter()
            .filter(|(a, _)| *a == addr)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Writes logged after the last write to `addr`.
    pub fn writes_after(&self, addr: RegAddr) -> Vec<(RegAddr, u8)> {
        let start = self
            .writes
            .iter()
            .rposition(|(a, _)| *a == addr)
            .map_or(0, |i| i + 1);
        self.writes[start..].to_vec()
    }

    /// Forget logged accesses, keep register contents and queues.
    pub fn clear_log(&mut self) {
        self.log.clear();
        self.writes.clear();
    }
}

impl RegisterBus for MockBus {
    fn read(&mut self, addr: RegAddr) -> Result<u8, BusError> {
        self.log.push(Access::Read(addr));
        if self.failing.contains(&addr) {
            return Err(BusError(EIO));
        }
        if let Some(value) = self.reads.get_mut(&addr).and_then(|q| q.pop_front()) {
            return Ok(value);
        }
        Ok(self.get(addr))
    }

    fn write(&mut self, addr: RegAddr, value: u8) -> Result<(), BusError> {
        self.log.push(Access::Write(addr, value));
        self.writes.push((addr, value));
        self.regs.insert(addr, value);
        Ok(())
    }

    fn read_block(&mut self, addr: RegAddr, buf: &mut [u8]) -> Result<(), BusError> {
        if let Some(block) = self.blocks.get_mut(&addr).and_then(|q| q.pop_front()) {
            self.log.push(Access::Read(addr));
            let n = block.len().min(buf.len());
            buf[..n].copy_from_slice(&block[..n]);
            return Ok(());
        }
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = self.read(addr.add(i as u8))?;
        }
        Ok(())
    }

    fn write_block(&mut self, addr: RegAddr, data: &[u8]) -> Result<(), BusError> {
        for (i, byte) in data.iter().enumerate() {
            self.write(addr.add(i as u8), *byte)?;
        }
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlatformEvent {
    Vbus(bool),
    Reset(bool),
    Delay(u32),
}

/// Records board signal changes and delays.
#[derive(Debug, Default)]
pub struct MockPlatform {
    events: Vec<PlatformEvent>,
    pub reset_on_exit: bool,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[PlatformEvent] {
        &self.events
    }
}

impl Platform for MockPlatform {
    fn set_vbus(&mut self, on: bool) {
        self.events.push(PlatformEvent::Vbus(on));
    }

    fn set_reset_pin(&mut self, high: bool) {
        self.events.push(PlatformEvent::Reset(high));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.events.push(PlatformEvent::Delay(ms));
    }

    fn reset_on_exit_requested(&self) -> bool {
        self.reset_on_exit
    }
}

/// Sink parser with scripted answers.
#[derive(Debug, Default)]
pub struct StubSink {
    pub extensions: u8,
    pub hdmi: bool,
    pub ycbcr422: bool,
    pub resets: u32,
    /// Blocks accepted so far
    pub parsed: Vec<u8>,
    pub fail_with: Option<EdidError>,
}

impl EdidParser for StubSink {
    fn parse_block(&mut self, block: u8, _data: &[u8; EDID_BLOCK_SIZE]) -> Result<u8, EdidError> {
        if let Some(e) = self.fail_with {
            return Err(e);
        }
        self.parsed.push(block);
        Ok(self.extensions)
    }

    fn sink_is_hdmi(&self) -> bool {
        self.hdmi
    }

    fn sink_supports_ycbcr422(&self) -> bool {
        self.ycbcr422
    }

    fn reset(&mut self) {
        self.resets += 1;
        self.parsed.clear();
    }
}

pub fn harness() -> Sii8348<MockBus, MockPlatform, StubSink> {
    Sii8348::new(
        MockBus::new(),
        MockPlatform::new(),
        StubSink::default(),
        DriverConfig::new(),
    )
}

/// Valid base block declaring `extensions` extension blocks.
pub fn test_edid_block(extensions: u8) -> [u8; EDID_BLOCK_SIZE] {
    let mut block = [0u8; EDID_BLOCK_SIZE];
    block[..8].copy_from_slice(&[0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00]);
    // manufacturer and product bytes
    block[8..12].copy_from_slice(&[0x4C, 0x2D, 0x34, 0x12]);
    block[18] = 1;
    block[19] = 3;
    block[126] = extensions;
    let sum = block[..127].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
    block[127] = 0u8.wrapping_sub(sum);
    block
}
