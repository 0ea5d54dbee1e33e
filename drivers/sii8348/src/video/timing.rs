//! Pixel clock sources and MHL link qualification

pub const VIC_640X480P60: u8 = 1;
pub const VIC_480P60_4X3: u8 = 2;
pub const VIC_480P60_16X9: u8 = 3;
pub const VIC_720P60: u8 = 4;
pub const VIC_1080I60: u8 = 5;
pub const VIC_480I60_4X3: u8 = 6;
pub const VIC_480I60_16X9: u8 = 7;
pub const VIC_1080P60: u8 = 16;
pub const VIC_576P50_4X3: u8 = 17;
pub const VIC_576P50_16X9: u8 = 18;
pub const VIC_720P50: u8 = 19;
pub const VIC_1080I50: u8 = 20;
pub const VIC_576I50_4X3: u8 = 21;
pub const VIC_576I50_16X9: u8 = 22;
pub const VIC_1080P50: u8 = 31;
pub const VIC_1080P24: u8 = 32;
pub const VIC_1080P25: u8 = 33;
pub const VIC_1080P30: u8 = 34;

/// Link clock limit of a normal (24 bpp) MHL link.
pub const MAX_LINK_CLOCK_HZ: u64 = 225_000_000;
/// Link clock limit in packed pixel mode.
pub const MAX_PACKED_LINK_CLOCK_HZ: u64 = 300_000_000;

/// Frame packing multiplier. 3D frame packing is not supported.
pub const FRAME_PACKING_RATIO: u32 = 1;

/// One CEA-861 format.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Timing {
    pub vic: u8,
    pub h_total: u16,
    pub v_total: u16,
    pub pixel_clock: u32,
    pub name: &'static str,
}

const fn t(vic: u8, h_total: u16, v_total: u16, pixel_clock: u32, name: &'static str) -> Timing {
    Timing {
        vic,
        h_total,
        v_total,
        pixel_clock,
        name,
    }
}

/// CEA-861 formats up to VIC 34. Where two formats share totals the
/// faster one comes first so a totals lookup never under-estimates.
pub static CEA_TIMINGS: &[Timing] = &[
    t(1, 800, 525, 25_175_000, "640x480p60"),
    t(2, 858, 525, 27_000_000, "480p60"),
    t(3, 858, 525, 27_000_000, "480p60"),
    t(4, 1650, 750, 74_250_000, "720p60"),
    t(16, 2200, 1125, 148_500_000, "1080p60"),
    t(5, 2200, 1125, 74_250_000, "1080i60"),
    t(6, 1716, 525, 27_000_000, "480i60"),
    t(7, 1716, 525, 27_000_000, "480i60"),
    t(8, 1716, 262, 27_000_000, "240p60"),
    t(9, 1716, 262, 27_000_000, "240p60"),
    t(10, 3432, 525, 54_000_000, "2880x480i60"),
    t(11, 3432, 525, 54_000_000, "2880x480i60"),
    t(12, 3432, 262, 54_000_000, "2880x240p60"),
    t(13, 3432, 262, 54_000_000, "2880x240p60"),
    t(14, 1716, 525, 54_000_000, "1440x480p60"),
    t(15, 1716, 525, 54_000_000, "1440x480p60"),
    t(17, 864, 625, 27_000_000, "576p50"),
    t(18, 864, 625, 27_000_000, "576p50"),
    t(19, 1980, 750, 74_250_000, "720p50"),
    t(31, 2640, 1125, 148_500_000, "1080p50"),
    t(20, 2640, 1125, 74_250_000, "1080i50"),
    t(21, 1728, 625, 27_000_000, "576i50"),
    t(22, 1728, 625, 27_000_000, "576i50"),
    t(23, 1728, 312, 27_000_000, "288p50"),
    t(24, 1728, 312, 27_000_000, "288p50"),
    t(25, 3456, 625, 54_000_000, "2880x576i50"),
    t(26, 3456, 625, 54_000_000, "2880x576i50"),
    t(27, 3456, 312, 54_000_000, "2880x288p50"),
    t(28, 3456, 312, 54_000_000, "2880x288p50"),
    t(29, 1728, 625, 54_000_000, "1440x576p50"),
    t(30, 1728, 625, 54_000_000, "1440x576p50"),
    t(32, 2750, 1125, 74_250_000, "1080p24"),
    t(33, 2640, 1125, 74_250_000, "1080p25"),
    t(34, 2200, 1125, 74_250_000, "1080p30"),
];

pub fn timing_for_vic(vic: u8) -> Option<&'static Timing> {
    CEA_TIMINGS.iter().find(|t| t.vic == vic)
}

/// Pixel clock in Hz of a CEA VIC, 0 when unknown.
pub fn pixel_clock_for_vic(vic: u8) -> u32 {
    timing_for_vic(vic).map_or(0, |t| t.pixel_clock)
}

/// Pixel clock in Hz inferred from measured totals, 0 when unknown.
pub fn pixel_clock_from_totals(h_total: u16, v_total: u16) -> u32 {
    CEA_TIMINGS
        .iter()
        .find(|t| t.h_total == h_total && t.v_total == v_total)
        .map_or(0, |t| t.pixel_clock)
}

/// 4:3 formats; everything else is sent as 16:9.
pub fn is_4x3(vic: u8) -> bool {
    matches!(
        vic,
        VIC_640X480P60 | VIC_480P60_4X3 | VIC_480I60_4X3 | VIC_576P50_4X3 | VIC_576I50_4X3
    )
}

/// Whether `pixel_clock` fits the link at `bits_per_pixel` (24 or 16).
/// Packed pixel (16 bpp) gets the higher limit only if the peer accepts it.
pub fn qualify_pixel_clock(pixel_clock: u32, bits_per_pixel: u32, peer_packed_pixel: bool) -> bool {
    let link_clock = u64::from(pixel_clock) * u64::from(bits_per_pixel) / 8;
    let limit = if bits_per_pixel == 16 && peer_packed_pixel {
        MAX_PACKED_LINK_CLOCK_HZ
    } else {
        MAX_LINK_CLOCK_HZ
    };
    link_clock <= limit
}
