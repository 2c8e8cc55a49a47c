// saturn-vdp2-rs/src/core/scroll/mod.rs

//! Scroll screens (background layers)
//!
//! Four normal scrolls (NBG0-NBG3) and one rotating scroll (RBG0). Each layer
//! is a plain value describing its identity; the session keeps the runtime
//! state of every layer in a `LayerState`.

pub mod color;
pub mod layout;
pub mod rotation;
pub mod sprite;

pub use color::{opacity_ratio, ColorCalcMode, ColorOffset, Fxp, OpacityChange};
pub use layout::{cell_offset, default_plane_layout, palette_offset, PlaneLayout};
pub use rotation::{CoefficientTable, RotationMode};
pub use sprite::{ColorCondition, SpriteBank};

pub use crate::core::vram::LayerRole;

use crate::core::palette::Palette;
use crate::core::tilemap::TilemapInfo;
use bitflags::bitflags;

bitflags! {
    /// One bit per screen, as the display registers expect them
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ScreenFlags: u16 {
        const NBG0 = 1 << 0;
        const NBG1 = 1 << 1;
        const NBG2 = 1 << 2;
        const NBG3 = 1 << 3;
        const RBG0 = 1 << 4;
        const SPRITE = 1 << 6;
    }
}

/// Scroll screen identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Nbg0,
    Nbg1,
    Nbg2,
    Nbg3,
    Rbg0,
}

/// Fixed description of a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerSpec {
    pub layer: Layer,
    /// Screen number used by the register interface
    pub screen_id: i16,
    /// Bit of the layer in every display-wide mask
    pub flag: ScreenFlags,
    pub role: LayerRole,
}

impl Layer {
    pub const ALL: [Layer; 5] = [Layer::Nbg0, Layer::Nbg1, Layer::Nbg2, Layer::Nbg3, Layer::Rbg0];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn spec(self) -> LayerSpec {
        let (screen_id, flag, role) = match self {
            Layer::Nbg0 => (1, ScreenFlags::NBG0, LayerRole::Normal),
            Layer::Nbg1 => (0, ScreenFlags::NBG1, LayerRole::Normal),
            Layer::Nbg2 => (3, ScreenFlags::NBG2, LayerRole::Normal),
            Layer::Nbg3 => (2, ScreenFlags::NBG3, LayerRole::Normal),
            Layer::Rbg0 => (5, ScreenFlags::RBG0, LayerRole::Rotation),
        };
        LayerSpec {
            layer: self,
            screen_id,
            flag,
            role,
        }
    }

    pub fn screen_id(self) -> i16 {
        self.spec().screen_id
    }

    pub fn flag(self) -> ScreenFlags {
        self.spec().flag
    }

    pub fn role(self) -> LayerRole {
        self.spec().role
    }

    /// Only NBG0 and NBG1 have line scroll tables
    pub fn has_line_scroll(self) -> bool {
        matches!(self, Layer::Nbg0 | Layer::Nbg1)
    }

    /// Only NBG0 and NBG1 can be scaled
    pub fn has_scaling(self) -> bool {
        matches!(self, Layer::Nbg0 | Layer::Nbg1)
    }
}

impl std::fmt::Display for Layer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Layer::Nbg0 => write!(f, "NBG0"),
            Layer::Nbg1 => write!(f, "NBG1"),
            Layer::Nbg2 => write!(f, "NBG2"),
            Layer::Nbg3 => write!(f, "NBG3"),
            Layer::Rbg0 => write!(f, "RBG0"),
        }
    }
}

/// Display priority; higher layers draw on top
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Layer0 = 0,
    Layer1 = 1,
    Layer2 = 2,
    Layer3 = 3,
    Layer4 = 4,
    Layer5 = 5,
    Layer6 = 6,
    Layer7 = 7,
}

/// Colour offset a screen applies at the end of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OffsetChannel {
    #[default]
    NoOffset,
    OffsetA,
    OffsetB,
}

/// Runtime state of one layer
#[derive(Debug, Clone, Default)]
pub struct LayerState {
    /// Start of cell data in VRAM, `None` while unallocated
    pub cell_address: Option<u32>,
    /// Start of map data in VRAM, `None` while unallocated
    pub map_address: Option<u32>,
    /// Bytes reserved at `cell_address`
    pub cell_alloc_size: Option<u32>,
    /// Bytes reserved at `map_address`
    pub map_alloc_size: Option<u32>,
    /// Line scroll table (NBG0/NBG1) or coefficient table (RBG0)
    pub table_address: Option<u32>,
    pub palette: Option<Palette>,
    pub info: TilemapInfo,
}

impl LayerState {
    /// Returns the layer to the unallocated state, handing back its palette
    pub fn clear(&mut self) -> Option<(Palette, TilemapInfo)> {
        let released = self.palette.take().map(|palette| (palette, self.info));
        *self = LayerState::default();
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tilemap::ColorMode;

    #[test]
    fn test_layer_specs() {
        assert_eq!(Layer::Nbg0.screen_id(), 1);
        assert_eq!(Layer::Nbg3.screen_id(), 2);
        assert!(Layer::Nbg1.has_scaling());
        assert!(!Layer::Nbg2.has_scaling());
        assert_eq!(Layer::Rbg0.role(), LayerRole::Rotation);
        assert_eq!(Layer::Nbg2.role(), LayerRole::Normal);

        let all = Layer::ALL.iter().fold(ScreenFlags::empty(), |acc, l| acc | l.flag());
        assert_eq!(all.bits(), 0x1F);
    }

    #[test]
    fn test_layer_state_clear() {
        let mut state = LayerState {
            cell_address: Some(0x25E4_0000),
            map_address: Some(0x25E6_0000),
            palette: Some(Palette::new(ColorMode::Paletted16, 3)),
            ..Default::default()
        };

        let released = state.clear();
        assert_eq!(released.map(|(p, _)| p.id()), Some(3));
        assert!(state.cell_address.is_none());
        assert!(state.map_address.is_none());
        assert!(state.palette.is_none());
    }
}
