// saturn-vdp2-rs/src/core/registers.rs

//! VDP2 display register interface
//!
//! One trait method per hardware operation. Each write may refuse the
//! configuration it is given. `RegisterFile` keeps a mirror of the last value
//! written to every register and applies the cycle-pattern rule for direct
//! colour screens, which makes it usable headless and in tests.

use crate::core::scroll::{
    CoefficientTable, ColorCondition, ColorOffset, Fxp, Layer, OffsetChannel, Priority, ScreenFlags, SpriteBank,
};
use crate::core::tilemap::{CharSize, ColorMode, MapMode, PlaneSize};
use log::debug;

/// A register write the hardware refused
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterReject {
    pub register: &'static str,
    pub reason: String,
}

impl RegisterReject {
    pub fn new(register: &'static str, reason: impl Into<String>) -> Self {
        Self {
            register,
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for RegisterReject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.register, self.reason)
    }
}

impl std::error::Error for RegisterReject {}

/// Result of a register write
pub type RegisterResult = Result<(), RegisterReject>;

/// Write-only register operations used by the session
pub trait Vdp2Registers {
    /// Push the enable mask and commit the matching cycle pattern
    fn auto_display(&mut self, enabled: ScreenFlags) -> RegisterResult;

    fn set_priority(&mut self, layer: Layer, priority: Priority) -> RegisterResult;

    fn set_char_format(&mut self, layer: Layer, color_mode: ColorMode, char_size: CharSize) -> RegisterResult;

    /// Cell base, palette base (if any) and map entry encoding
    fn set_page(&mut self, layer: Layer, cell_address: u32, palette_address: Option<u32>, map_mode: MapMode) -> RegisterResult;

    fn set_plane_size(&mut self, layer: Layer, plane_size: PlaneSize) -> RegisterResult;

    /// Addresses of the four planes (only the first is used by RBG0)
    fn set_map(&mut self, layer: Layer, planes: [u32; 4]) -> RegisterResult;

    /// 4x4 plane grid of the rotation screen
    fn set_rotation_map16(&mut self, grid: &[[u8; 4]; 4]) -> RegisterResult;

    fn set_color_rate(&mut self, layer: Layer, rate: u8) -> RegisterResult;

    fn color_calc_on(&mut self, screens: ScreenFlags) -> RegisterResult;

    /// Push both colour offset masks
    fn color_offset_use(&mut self, offset_a: ScreenFlags, offset_b: ScreenFlags) -> RegisterResult;

    /// Screens whose zero pixels are drawn opaque
    fn scroll_transparent(&mut self, screens: ScreenFlags) -> RegisterResult;

    fn set_color_offset(&mut self, channel: OffsetChannel, offset: ColorOffset) -> RegisterResult;

    fn set_color_calc_mode(&mut self, value: u16) -> RegisterResult;

    fn set_coefficient_table(&mut self, table: CoefficientTable) -> RegisterResult;

    /// Scroll position in 16.16 pixels (normal scrolls only)
    fn set_scroll_position(&mut self, layer: Layer, x: Fxp, y: Fxp) -> RegisterResult;

    /// Scaling factors in 16.16 (NBG0 and NBG1 only)
    fn set_scroll_scale(&mut self, layer: Layer, x: Fxp, y: Fxp) -> RegisterResult;

    fn set_sprite_color_rate(&mut self, bank: SpriteBank, rate: u8) -> RegisterResult;

    fn set_sprite_priority(&mut self, bank: SpriteBank, priority: Priority) -> RegisterResult;

    /// Which sprite priorities get colour calculation
    fn set_sprite_color_condition(&mut self, condition: ColorCondition, test: Priority) -> RegisterResult;

    /// Single back screen colour stored at `table_address`
    fn set_back_color(&mut self, table_address: u32, color: u16) -> RegisterResult;
}

/// Page setup of one screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSetup {
    pub cell_address: u32,
    pub palette_address: Option<u32>,
    pub map_mode: MapMode,
}

/// Mirror of the display registers
#[derive(Debug, Clone, Default)]
pub struct RegisterFile {
    pub enabled: ScreenFlags,
    pub priority: [Option<Priority>; 5],
    pub char_format: [Option<(ColorMode, CharSize)>; 5],
    pub page: [Option<PageSetup>; 5],
    pub plane_size: [PlaneSize; 5],
    pub map: [[u32; 4]; 5],
    pub rotation_map16: [[u8; 4]; 4],
    pub color_rate: [u8; 5],
    pub color_calc: ScreenFlags,
    pub offset_a: ScreenFlags,
    pub offset_b: ScreenFlags,
    pub transparent: ScreenFlags,
    pub color_offset_a: ColorOffset,
    pub color_offset_b: ColorOffset,
    pub color_calc_mode: u16,
    pub coefficient_table: CoefficientTable,
    pub position: [(Fxp, Fxp); 5],
    pub scale: [(Fxp, Fxp); 5],
    pub sprite_color_rate: [u8; 8],
    pub sprite_priority: [Option<Priority>; 8],
    pub sprite_color_condition: Option<(ColorCondition, Priority)>,
    /// Back screen table address and colour
    pub back_color: Option<(u32, u16)>,
    /// Successful writes so far
    pub writes: usize,
}

impl RegisterFile {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_rgb(&self, layer: Layer) -> bool {
        matches!(self.char_format[layer.index()], Some((ColorMode::Rgb555, _)))
    }

    /// NBG0 in direct colour steals the cycles of NBG2, and NBG1 those of NBG3
    fn check_cycle_pattern(&self, enabled: ScreenFlags) -> RegisterResult {
        let conflicts = [(Layer::Nbg0, Layer::Nbg2), (Layer::Nbg1, Layer::Nbg3)];
        for (wide, starved) in conflicts {
            if enabled.contains(wide.flag() | starved.flag()) && self.is_rgb(wide) {
                return Err(RegisterReject::new(
                    "auto_display",
                    format!("invalid cycle pattern: {} in RGB mode with {}", wide, starved),
                ));
            }
        }
        Ok(())
    }

    fn wrote(&mut self, register: &str) -> RegisterResult {
        self.writes += 1;
        debug!("Registrador {} programado", register);
        Ok(())
    }

    fn wrote_screen(&mut self, register: &str, screen_id: i16) -> RegisterResult {
        self.writes += 1;
        debug!("Registrador {} programado (tela {})", register, screen_id);
        Ok(())
    }
}

impl Vdp2Registers for RegisterFile {
    fn auto_display(&mut self, enabled: ScreenFlags) -> RegisterResult {
        self.check_cycle_pattern(enabled)?;
        self.enabled = enabled;
        self.wrote("auto_display")
    }

    fn set_priority(&mut self, layer: Layer, priority: Priority) -> RegisterResult {
        self.priority[layer.index()] = Some(priority);
        self.wrote_screen("priority", layer.screen_id())
    }

    fn set_char_format(&mut self, layer: Layer, color_mode: ColorMode, char_size: CharSize) -> RegisterResult {
        if matches!(layer, Layer::Nbg2 | Layer::Nbg3) && color_mode == ColorMode::Rgb555 {
            return Err(RegisterReject::new("char_format", format!("{} has no RGB mode", layer)));
        }
        self.char_format[layer.index()] = Some((color_mode, char_size));
        self.wrote_screen("char_format", layer.screen_id())
    }

    fn set_page(&mut self, layer: Layer, cell_address: u32, palette_address: Option<u32>, map_mode: MapMode) -> RegisterResult {
        self.page[layer.index()] = Some(PageSetup {
            cell_address,
            palette_address,
            map_mode,
        });
        self.wrote_screen("page", layer.screen_id())
    }

    fn set_plane_size(&mut self, layer: Layer, plane_size: PlaneSize) -> RegisterResult {
        self.plane_size[layer.index()] = plane_size;
        self.wrote_screen("plane_size", layer.screen_id())
    }

    fn set_map(&mut self, layer: Layer, planes: [u32; 4]) -> RegisterResult {
        self.map[layer.index()] = planes;
        self.wrote_screen("map", layer.screen_id())
    }

    fn set_rotation_map16(&mut self, grid: &[[u8; 4]; 4]) -> RegisterResult {
        self.rotation_map16 = *grid;
        self.wrote("rotation_map16")
    }

    fn set_color_rate(&mut self, layer: Layer, rate: u8) -> RegisterResult {
        if rate > 31 {
            return Err(RegisterReject::new("color_rate", format!("rate {} out of range", rate)));
        }
        self.color_rate[layer.index()] = rate;
        self.wrote_screen("color_rate", layer.screen_id())
    }

    fn color_calc_on(&mut self, screens: ScreenFlags) -> RegisterResult {
        self.color_calc = screens;
        self.wrote("color_calc_on")
    }

    fn color_offset_use(&mut self, offset_a: ScreenFlags, offset_b: ScreenFlags) -> RegisterResult {
        self.offset_a = offset_a;
        self.offset_b = offset_b;
        self.wrote("color_offset_use")
    }

    fn scroll_transparent(&mut self, screens: ScreenFlags) -> RegisterResult {
        self.transparent = screens;
        self.wrote("scroll_transparent")
    }

    fn set_color_offset(&mut self, channel: OffsetChannel, offset: ColorOffset) -> RegisterResult {
        match channel {
            OffsetChannel::OffsetA => self.color_offset_a = offset,
            OffsetChannel::OffsetB => self.color_offset_b = offset,
            OffsetChannel::NoOffset => {
                return Err(RegisterReject::new("color_offset", "no offset register selected"));
            }
        }
        self.wrote("color_offset")
    }

    fn set_color_calc_mode(&mut self, value: u16) -> RegisterResult {
        self.color_calc_mode = value;
        self.wrote("color_calc_mode")
    }

    fn set_coefficient_table(&mut self, table: CoefficientTable) -> RegisterResult {
        self.coefficient_table = table;
        self.wrote("coefficient_table")
    }

    fn set_scroll_position(&mut self, layer: Layer, x: Fxp, y: Fxp) -> RegisterResult {
        if layer == Layer::Rbg0 {
            return Err(RegisterReject::new("scroll_position", "RBG0 is positioned by its rotation parameters"));
        }
        self.position[layer.index()] = (x, y);
        self.wrote_screen("scroll_position", layer.screen_id())
    }

    fn set_scroll_scale(&mut self, layer: Layer, x: Fxp, y: Fxp) -> RegisterResult {
        if !layer.has_scaling() {
            return Err(RegisterReject::new("scroll_scale", format!("{} has no scaling", layer)));
        }
        self.scale[layer.index()] = (x, y);
        self.wrote_screen("scroll_scale", layer.screen_id())
    }

    fn set_sprite_color_rate(&mut self, bank: SpriteBank, rate: u8) -> RegisterResult {
        if rate > 31 {
            return Err(RegisterReject::new("color_rate", format!("rate {} out of range", rate)));
        }
        self.sprite_color_rate[bank.index()] = rate;
        self.wrote_screen("color_rate", bank.screen_id())
    }

    fn set_sprite_priority(&mut self, bank: SpriteBank, priority: Priority) -> RegisterResult {
        self.sprite_priority[bank.index()] = Some(priority);
        self.wrote_screen("priority", bank.screen_id())
    }

    fn set_sprite_color_condition(&mut self, condition: ColorCondition, test: Priority) -> RegisterResult {
        self.sprite_color_condition = Some((condition, test));
        self.wrote("sprite_color_condition")
    }

    fn set_back_color(&mut self, table_address: u32, color: u16) -> RegisterResult {
        self.back_color = Some((table_address, color));
        self.wrote("back_color")
    }
}
