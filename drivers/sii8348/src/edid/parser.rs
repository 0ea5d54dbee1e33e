//! Sink EDID parsing
//!
//! The reader hands every completed block to an [`EdidParser`]. The parser
//! decides how many extension blocks follow and caches the few sink
//! properties the video path needs.

use log::{debug, info, warn};

use super::{EDID_BLOCK_SIZE, EDID_MAX_BLOCKS};
use crate::error::EdidError;

/// Sink capability decoder fed block by block.
pub trait EdidParser {
    /// Parse block `block` and return the extension count declared by the
    /// base block.
    fn parse_block(&mut self, block: u8, data: &[u8; EDID_BLOCK_SIZE]) -> Result<u8, EdidError>;

    /// Sink carries an HDMI vendor-specific data block.
    fn sink_is_hdmi(&self) -> bool;

    /// Sink accepts YCbCr 4:2:2 input.
    fn sink_supports_ycbcr422(&self) -> bool;

    /// Forget everything learnt about the sink.
    fn reset(&mut self);
}

const EDID_HEADER: [u8; 8] = [0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00];
const EXTENSION_COUNT: usize = 126;

const CEA_EXTENSION_TAG: u8 = 0x02;
const CEA_YCBCR422: u8 = 0x10;
const CEA_DATA_BLOCK_START: usize = 4;
const CEA_TAG_VENDOR_SPECIFIC: u8 = 3;
/// IEEE OUI 00-0C-03, least significant byte first
const HDMI_OUI: [u8; 3] = [0x03, 0x0C, 0x00];

fn checksum(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// CEA-861 aware parser.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CeaEdid {
    extensions: u8,
    hdmi: bool,
    ycbcr422: bool,
}

impl CeaEdid {
    pub const fn new() -> Self {
        Self {
            extensions: 0,
            hdmi: false,
            ycbcr422: false,
        }
    }

    pub fn extensions(&self) -> u8 {
        self.extensions
    }

    fn parse_base(&mut self, data: &[u8; EDID_BLOCK_SIZE]) -> Result<(), EdidError> {
        if data[..EDID_HEADER.len()] != EDID_HEADER {
            return Err(EdidError::BadHeader);
        }
        let declared = data[EXTENSION_COUNT];
        let kept = declared.min((EDID_MAX_BLOCKS - 1) as u8);
        if kept != declared {
            warn!("edid: sink declares {} extensions, reading {}", declared, kept);
        }
        self.extensions = kept;
        debug!("edid: base block, {} extension(s)", kept);
        Ok(())
    }

    fn parse_cea(&mut self, data: &[u8; EDID_BLOCK_SIZE]) {
        if data[3] & CEA_YCBCR422 != 0 {
            self.ycbcr422 = true;
        }

        // data block collection ends where the DTDs start
        let end = (data[2] as usize).min(EDID_BLOCK_SIZE - 1);
        let mut pos = CEA_DATA_BLOCK_START;
        while pos < end {
            let header = data[pos];
            let tag = header >> 5;
            let len = (header & 0x1F) as usize;
            let payload = pos + 1;
            if tag == CEA_TAG_VENDOR_SPECIFIC
                && len >= HDMI_OUI.len()
                && payload + HDMI_OUI.len() <= end
                && data[payload..payload + HDMI_OUI.len()] == HDMI_OUI
            {
                self.hdmi = true;
            }
            pos = payload + len;
        }
        info!("edid: CEA block, hdmi {} ycbcr422 {}", self.hdmi, self.ycbcr422);
    }
}

impl EdidParser for CeaEdid {
    fn parse_block(&mut self, block: u8, data: &[u8; EDID_BLOCK_SIZE]) -> Result<u8, EdidError> {
        if block as usize >= EDID_MAX_BLOCKS {
            return Err(EdidError::UnsupportedBlock(block));
        }
        if checksum(data) != 0 {
            return Err(EdidError::BadChecksum(block));
        }

        if block == 0 {
            self.parse_base(data)?;
        } else if data[0] == CEA_EXTENSION_TAG {
            self.parse_cea(data);
        } else {
            debug!("edid: skipping extension tag {:02X}", data[0]);
        }
        Ok(self.extensions)
    }

    fn sink_is_hdmi(&self) -> bool {
        self.hdmi
    }

    fn sink_supports_ycbcr422(&self) -> bool {
        self.ycbcr422
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::test_edid_block;

    fn seal(block: &mut [u8; EDID_BLOCK_SIZE]) {
        block[EDID_BLOCK_SIZE - 1] = 0;
        block[EDID_BLOCK_SIZE - 1] = 0u8.wrapping_sub(checksum(block));
    }

    fn cea_block(flags: u8, data_blocks: &[u8]) -> [u8; EDID_BLOCK_SIZE] {
        let mut block = [0u8; EDID_BLOCK_SIZE];
        block[0] = CEA_EXTENSION_TAG;
        block[1] = 3;
        block[2] = (CEA_DATA_BLOCK_START + data_blocks.len()) as u8;
        block[3] = flags;
        block[CEA_DATA_BLOCK_START..CEA_DATA_BLOCK_START + data_blocks.len()]
            .copy_from_slice(data_blocks);
        seal(&mut block);
        block
    }

    #[test]
    fn test_base_block_extension_count() {
        let mut edid = CeaEdid::new();
        assert_eq!(edid.parse_block(0, &test_edid_block(1)), Ok(1));
        assert_eq!(edid.extensions(), 1);
    }

    #[test]
    fn test_extension_count_is_capped() {
        let mut edid = CeaEdid::new();
        assert_eq!(edid.parse_block(0, &test_edid_block(7)), Ok(3));
    }

    #[test]
    fn test_bad_header_and_checksum() {
        let mut edid = CeaEdid::new();
        let mut block = test_edid_block(0);
        block[0] = 0x01;
        seal(&mut block);
        assert_eq!(edid.parse_block(0, &block), Err(EdidError::BadHeader));

        let mut block = test_edid_block(0);
        block[20] ^= 0xFF;
        assert_eq!(edid.parse_block(0, &block), Err(EdidError::BadChecksum(0)));
    }

    #[test]
    fn test_cea_flags_and_hdmi_vsdb() {
        let mut edid = CeaEdid::new();
        edid.parse_block(0, &test_edid_block(1)).unwrap();

        // audio data block, then VSDB with the HDMI OUI and a physical address
        let blocks = [0x23, 0x09, 0x07, 0x07, 0x65, 0x03, 0x0C, 0x00, 0x10, 0x00];
        let ext = cea_block(CEA_YCBCR422, &blocks);
        assert_eq!(edid.parse_block(1, &ext), Ok(1));
        assert!(edid.sink_is_hdmi());
        assert!(edid.sink_supports_ycbcr422());

        edid.reset();
        assert!(!edid.sink_is_hdmi());
        assert_eq!(edid.extensions(), 0);
    }

    #[test]
    fn test_dvi_sink_without_vsdb() {
        let mut edid = CeaEdid::new();
        edid.parse_block(0, &test_edid_block(1)).unwrap();
        // vendor block with a foreign OUI
        let ext = cea_block(0, &[0x63, 0x1A, 0x2B, 0x3C]);
        edid.parse_block(1, &ext).unwrap();
        assert!(!edid.sink_is_hdmi());
        assert!(!edid.sink_supports_ycbcr422());
    }

    #[test]
    fn test_block_index_past_buffer() {
        let mut edid = CeaEdid::new();
        assert_eq!(
            edid.parse_block(4, &[0u8; EDID_BLOCK_SIZE]),
            Err(EdidError::UnsupportedBlock(4))
        );
    }
}
