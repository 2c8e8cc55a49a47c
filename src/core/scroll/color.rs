// saturn-vdp2-rs/src/core/scroll/color.rs

//! Colour calculation helpers: opacity ratios, colour offsets and the
//! calculation mode shared by every screen.

use num_traits::clamp;
use std::ops::{AddAssign, SubAssign};

/// 16.16 fixed point value
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Fxp(i32);

impl Fxp {
    pub const ZERO: Fxp = Fxp(0);
    pub const ONE: Fxp = Fxp(0x1_0000);

    pub const fn from_raw(raw: i32) -> Self {
        Fxp(raw)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }
}

impl From<f32> for Fxp {
    fn from(value: f32) -> Self {
        let scaled = clamp(value * 65536.0, i32::MIN as f32, i32::MAX as f32);
        Fxp(scaled as i32)
    }
}

/// Effect of an opacity value on a screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpacityChange {
    /// Negative opacity: nothing happens
    Unchanged,
    /// Fully opaque: blending off
    Opaque,
    /// Blending on with this colour rate (0-31)
    Blend(u8),
}

/// Maps an opacity to one of the 32 hardware colour rates.
///
/// The rate counts transparency steps, so 0.0 gives 31 and values just below
/// 1.0 give 0.
pub fn opacity_ratio(opacity: Fxp) -> OpacityChange {
    let raw = opacity.raw();
    if raw < 0 {
        OpacityChange::Unchanged
    } else if raw >= Fxp::ONE.raw() {
        OpacityChange::Opaque
    } else {
        OpacityChange::Blend(31 - (raw >> 11) as u8)
    }
}

/// Colour offset value; each channel is kept in -255..=255
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorOffset {
    pub red: i16,
    pub green: i16,
    pub blue: i16,
}

impl ColorOffset {
    pub const LIMIT: i16 = 255;

    pub fn new(red: i16, green: i16, blue: i16) -> Self {
        Self {
            red: clamp(red, -Self::LIMIT, Self::LIMIT),
            green: clamp(green, -Self::LIMIT, Self::LIMIT),
            blue: clamp(blue, -Self::LIMIT, Self::LIMIT),
        }
    }

    /// Expands a 15-bit colour into an offset (5 bits per channel, scaled to 8)
    pub fn from_rgb555(color: u16) -> Self {
        let red = (color & 0x1F) << 3;
        let green = ((color >> 5) & 0x1F) << 3;
        let blue = ((color >> 10) & 0x1F) << 3;
        Self::new(red as i16, green as i16, blue as i16)
    }

    /// Register encoding: 9-bit two's complement per channel
    pub fn register_values(&self) -> [u16; 3] {
        [self.red, self.green, self.blue].map(|c| (c as u16) & 0x1FF)
    }
}

impl AddAssign for ColorOffset {
    fn add_assign(&mut self, rhs: Self) {
        *self = Self::new(self.red + rhs.red, self.green + rhs.green, self.blue + rhs.blue);
    }
}

impl SubAssign for ColorOffset {
    fn sub_assign(&mut self, rhs: Self) {
        *self = Self::new(self.red - rhs.red, self.green - rhs.green, self.blue - rhs.blue);
    }
}

/// How screens with colour calculation on are mixed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorCalcMode {
    /// Ratio taken from the top screen
    #[default]
    RatiosTop,
    /// Ratio taken from the screen below the top one
    Ratios2nd,
    /// Plain addition
    Addition,
}

impl ColorCalcMode {
    /// Extended colour calculation bit
    pub const EXTEND: u16 = 0x400;

    pub fn register_value(self, extend: bool) -> u16 {
        let mode = match self {
            ColorCalcMode::RatiosTop => 0,
            ColorCalcMode::Ratios2nd => 0x200,
            ColorCalcMode::Addition => 0x100,
        };
        if extend {
            mode | Self::EXTEND
        } else {
            mode
        }
    }
}
