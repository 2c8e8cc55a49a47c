// saturn-vdp2-rs/src/core/tilemap/mod.rs

//! Tilemap geometry and data source
//!
//! The tile source is opaque to the loader: it only exposes geometry plus
//! three raw buffers (cell bytes, map words and palette colours).

pub mod memory;

pub use memory::{Coord, MemoryTilemap};

/// Size of one character (tile) in cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CharSize {
    /// 8x8 pixels
    #[default]
    OneByOne,
    /// 16x16 pixels (2x2 cells)
    TwoByTwo,
}

/// Colour format of cell data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// 4-bit palette index
    Paletted16,
    /// 8-bit palette index
    #[default]
    Paletted256,
    /// 15-bit direct colour
    Rgb555,
}

impl ColorMode {
    /// Number of palette entries the format needs, if any
    pub fn palette_len(self) -> Option<usize> {
        match self {
            ColorMode::Paletted16 => Some(16),
            ColorMode::Paletted256 => Some(256),
            ColorMode::Rgb555 => None,
        }
    }
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorMode::Paletted16 => write!(f, "16 colour palette"),
            ColorMode::Paletted256 => write!(f, "256 colour palette"),
            ColorMode::Rgb555 => write!(f, "RGB555"),
        }
    }
}

/// Number of pages grouped in one plane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaneSize {
    #[default]
    OneByOne,
    TwoByOne,
    TwoByTwo,
}

impl PlaneSize {
    /// Left shift applied to a page size to get the plane size
    pub fn page_shift(self) -> u32 {
        match self {
            PlaneSize::OneByOne => 0,
            PlaneSize::TwoByOne => 1,
            PlaneSize::TwoByTwo => 2,
        }
    }
}

/// Pattern name data encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapMode {
    /// Two words per map entry
    TwoWord,
    /// One word per entry, 10-bit character number
    OneWord10Bit,
    /// One word per entry, 12-bit character number
    #[default]
    OneWord12Bit,
}

impl MapMode {
    pub fn is_one_word(self) -> bool {
        !matches!(self, MapMode::TwoWord)
    }

    /// 16-bit words per map entry
    pub fn entry_words(self) -> usize {
        if self.is_one_word() {
            1
        } else {
            2
        }
    }
}

/// Geometry of a tilemap, copied into the layer on load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TilemapInfo {
    /// Width in tiles
    pub map_width: u16,
    /// Height in tiles
    pub map_height: u16,
    pub char_size: CharSize,
    pub color_mode: ColorMode,
    pub plane_size: PlaneSize,
    pub map_mode: MapMode,
    /// Total size of the cell data in bytes
    pub cell_byte_size: u32,
}

impl TilemapInfo {
    /// Number of map entries
    pub fn map_entries(&self) -> usize {
        self.map_width as usize * self.map_height as usize
    }

    /// Bytes of map data in VRAM
    pub fn map_byte_size(&self) -> u32 {
        let size = (self.map_width as u32 * self.map_height as u32) << 1;
        if self.map_mode.is_one_word() {
            size
        } else {
            size << 1
        }
    }

    /// Tiles along one edge of a page
    pub fn page_dim(&self) -> u16 {
        match self.char_size {
            CharSize::OneByOne => 64,
            CharSize::TwoByTwo => 32,
        }
    }

    /// Map entries in one page
    pub fn page_entries(&self) -> usize {
        let dim = self.page_dim() as usize;
        dim * dim
    }

    /// Bytes of one page in VRAM
    pub fn page_byte_size(&self) -> u32 {
        let mut size = 0x800;
        if self.char_size == CharSize::OneByOne {
            size <<= 2;
        }
        if !self.map_mode.is_one_word() {
            size <<= 1;
        }
        size
    }

    /// Bytes of one plane in VRAM; also the alignment map data needs
    pub fn plane_byte_size(&self) -> u32 {
        self.page_byte_size() << self.plane_size.page_shift()
    }
}

/// Source of tile, map and palette data
pub trait Tilemap {
    /// Geometry of the data
    fn info(&self) -> TilemapInfo;

    /// Raw cell bytes
    fn cell_data(&self) -> &[u8];

    /// Raw map words; two-word entries are stored high word first
    fn map_data(&self) -> &[u16];

    /// Palette colours (RGB555), absent for direct colour data
    fn palette_data(&self) -> Option<&[u16]>;
}
