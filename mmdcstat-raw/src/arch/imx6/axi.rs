//! AXI bus master IDs for i.MX 6Dual/6Quad
//!
//! The MMDC profiling block only counts transactions whose AXI ID matches the
//! filter programmed into MADPCR1: bits selected by the mask must equal the
//! configured ID, unselected bits are ignored. An all-zero filter counts
//! everything.
//!
//! To monitor AXI IDs 0xA100 through 0xA1FF, program id = 0xA100 and
//! mask = 0xFF00.
//!
//! ## References
//!
//! - i.MX 6Dual/6Quad Applications Processor Reference Manual
//! - Table 43-8: i.MX 6Dual/6Quad AXI ID

use crate::register::{check_width, RegisterLayout, Result};

/// Width of an AXI ID as seen by the MMDC
pub const AXI_ID_WIDTH: u32 = 14;

/// Bit offset of the mask field in MADPCR1
pub const PRF_AXI_ID_MASK_SHIFT: u32 = 16;

/// Bit offset of the ID field in MADPCR1
pub const PRF_AXI_ID_SHIFT: u32 = 0;

/// Profiling filter (MADPCR1 layout)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AxiFilter {
    pub id: u16,
    pub mask: u16,
}

impl AxiFilter {
    /// Matches every transaction.
    pub const UNFILTERED: Self = Self { id: 0, mask: 0 };

    pub const fn new(id: u16, mask: u16) -> Self {
        Self { id, mask }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.mask == 0
    }

    /// Whether a transaction tagged with `axi_id` is counted under this filter
    pub fn matches(&self, axi_id: u16) -> bool {
        (axi_id ^ self.id) & self.mask == 0
    }
}

impl RegisterLayout for AxiFilter {
    fn to_register_value(&self) -> u32 {
        ((self.mask as u32) << PRF_AXI_ID_MASK_SHIFT) | ((self.id as u32) << PRF_AXI_ID_SHIFT)
    }

    fn from_register_value(value: u32) -> Self {
        Self {
            id: ((value >> PRF_AXI_ID_SHIFT) & 0xFFFF) as u16,
            mask: ((value >> PRF_AXI_ID_MASK_SHIFT) & 0xFFFF) as u16,
        }
    }

    fn validate(&self) -> Result<()> {
        check_width("PRF_AXI_ID", self.id as u32, AXI_ID_WIDTH)?;
        check_width("PRF_AXI_ID_MASK", self.mask as u32, AXI_ID_WIDTH)
    }
}

/// A named AXI bus master
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxiMaster {
    pub name: &'static str,
    pub filter: AxiFilter,
}

const fn master(name: &'static str, mask: u16, id: u16) -> AxiMaster {
    AxiMaster {
        name,
        filter: AxiFilter::new(id, mask),
    }
}

/// Known bus masters, as (name, mask, id)
pub const AXI_MASTERS: [AxiMaster; 36] = [
    master("arm-s0", 0b11100000000111, 0b00000000000000),
    master("arm-s1", 0b11100000000111, 0b00000000000001),
    master("ipu1", 0b11111111100111, 0b00000000000100),
    master("ipu1-0", 0b11111111111111, 0b00000000000100),
    master("ipu1-1", 0b11111111111111, 0b00000000001100),
    master("ipu1-2", 0b11111111111111, 0b00000000010100),
    master("ipu1-3", 0b11111111111111, 0b00000000011100),
    master("ipu2", 0b11111111100111, 0b00000000000101),
    master("ipu2-0", 0b11111111111111, 0b00000000000101),
    master("ipu2-1", 0b11111111111111, 0b00000000001101),
    master("ipu2-2", 0b11111111111111, 0b00000000010101),
    master("ipu2-3", 0b11111111111111, 0b00000000011101),
    master("gpu3d-a", 0b11110000111111, 0b00000000000010),
    master("gpu2d-a", 0b11110000111111, 0b00000000001010),
    master("vdoa", 0b11111100111111, 0b00000000010010),
    master("openvg", 0b11110000111111, 0b00000000100010),
    master("hdmi", 0b11111111111111, 0b00000100011010),
    master("sdma-brst", 0b11111111111111, 0b00000101011010),
    master("sdma-per", 0b11111111111111, 0b00000110011010),
    master("caam", 0b00001111111111, 0b00000000011010),
    master("usb", 0b11001111111111, 0b00000001011010),
    master("enet", 0b11111111111111, 0b00000010011010),
    master("hsi", 0b11111111111111, 0b00000011011010),
    master("usdhc1", 0b11111111111111, 0b00000111011010),
    master("gpu3d-b", 0b11110000111111, 0b00000000000011),
    // Listed as a second gpu3d-b in the reference manual
    master("gpu2d-b", 0b11110000111111, 0b00000000001011),
    master("vpu-prime", 0b11110000111111, 0b00000000010011),
    master("pcie", 0b11100000111111, 0b00000000011011),
    master("dap", 0b11111111111111, 0b00000000100011),
    master("apbh-dma", 0b11111111111111, 0b00000010100011),
    master("bch40", 0b00001111111111, 0b00000001100011),
    master("sata", 0b11111111111111, 0b00000011100011),
    master("mlb150", 0b11111111111111, 0b00000100100011),
    master("usdhc2", 0b11111111111111, 0b00000101100011),
    master("usdhc3", 0b11111111111111, 0b00000110100011),
    master("usdhc4", 0b11111111111111, 0b00000111100011),
];

/// Find a bus master by exact, case-sensitive name
pub fn find(name: &str) -> Option<&'static AxiMaster> {
    AXI_MASTERS.iter().find(|m| m.name == name)
}

/// Filter for the named bus master, or [`AxiFilter::UNFILTERED`] if unknown
pub fn lookup(name: &str) -> AxiFilter {
    find(name).map(|m| m.filter).unwrap_or(AxiFilter::UNFILTERED)
}

/// Names of all known bus masters, in table order
pub fn names() -> impl Iterator<Item = &'static str> {
    AXI_MASTERS.iter().map(|m| m.name)
}
