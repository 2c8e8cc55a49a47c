// saturn-vdp2-rs/src/core/palette.rs

//! Colour RAM palette slots
//!
//! The loader only needs to find a free slot of a given format, mark it used
//! or free, and write colour entries into it. `Cram` is an in-memory colour RAM
//! (2048 entries, 16-bit colour mode) that implements that contract.

use crate::core::tilemap::ColorMode;
use log::{debug, warn};

/// Address of colour RAM on the SH-2 bus
pub const CRAM_BASE: u32 = 0x25F0_0000;

/// Colour entries in 16-bit / 2048 colour mode
pub const CRAM_ENTRIES: usize = 2048;

/// Reference to a palette slot owned by the palette collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    mode: ColorMode,
    id: u8,
}

impl Palette {
    pub fn new(mode: ColorMode, id: u8) -> Self {
        Self { mode, id }
    }

    /// Slot index, counted in slots of this palette's format
    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn mode(&self) -> ColorMode {
        self.mode
    }
}

/// Palette collaborator
pub trait PaletteBanks {
    /// Find a free slot for the format
    fn free_bank(&self, mode: ColorMode) -> Option<u8>;

    /// Mark a slot used or free
    fn set_bank_used(&mut self, id: u8, mode: ColorMode, used: bool);

    /// Write colours into the slot
    fn load(&mut self, palette: &Palette, colors: &[u16]);

    /// Bus address of the slot's first entry
    fn data_address(&self, palette: &Palette) -> u32;
}

/// In-memory colour RAM
pub struct Cram {
    colors: Vec<u16>,
    /// One bit per 16 colour bank
    used: u128,
}

impl Cram {
    pub fn new() -> Self {
        Self {
            colors: vec![0; CRAM_ENTRIES],
            used: 0,
        }
    }

    /// Number of 16 colour banks a slot of `mode` covers
    fn span(mode: ColorMode) -> u32 {
        match mode {
            ColorMode::Paletted256 => 16,
            _ => 1,
        }
    }

    fn slot_mask(id: u8, mode: ColorMode) -> Option<u128> {
        let span = Self::span(mode);
        let first = id as u32 * span;
        if first + span > 128 {
            return None;
        }
        Some(((1u128 << span) - 1) << first)
    }

    /// Whether a slot is in use
    pub fn is_used(&self, id: u8, mode: ColorMode) -> bool {
        Self::slot_mask(id, mode).map_or(false, |mask| self.used & mask != 0)
    }

    /// Colour entries of a slot
    pub fn colors(&self, palette: &Palette) -> &[u16] {
        let len = palette.mode().palette_len().unwrap_or(0);
        let start = palette.id() as usize * len;
        &self.colors[start.min(CRAM_ENTRIES)..(start + len).min(CRAM_ENTRIES)]
    }
}

impl Default for Cram {
    fn default() -> Self {
        Self::new()
    }
}

impl PaletteBanks for Cram {
    fn free_bank(&self, mode: ColorMode) -> Option<u8> {
        let slots = 128 / Self::span(mode);
        match mode {
            ColorMode::Rgb555 => None,
            _ => (0..slots as u8).find(|&id| !self.is_used(id, mode)),
        }
    }

    fn set_bank_used(&mut self, id: u8, mode: ColorMode, used: bool) {
        let Some(mask) = Self::slot_mask(id, mode) else {
            warn!("Slot de paleta inválido: {} ({})", id, mode);
            return;
        };
        if used {
            self.used |= mask;
        } else {
            self.used &= !mask;
        }
        debug!("CRAM slot {} ({}) usado = {}", id, mode, used);
    }

    fn load(&mut self, palette: &Palette, colors: &[u16]) {
        let Some(len) = palette.mode().palette_len() else {
            return;
        };
        let start = palette.id() as usize * len;
        if start >= CRAM_ENTRIES {
            warn!("Paleta {} ({}) fora da CRAM", palette.id(), palette.mode());
            return;
        }
        let count = colors.len().min(len).min(CRAM_ENTRIES - start);
        self.colors[start..start + count].copy_from_slice(&colors[..count]);
    }

    fn data_address(&self, palette: &Palette) -> u32 {
        let len = palette.mode().palette_len().unwrap_or(0) as u32;
        CRAM_BASE + palette.id() as u32 * len * 2
    }
}
