// saturn-vdp2-rs/src/core/vdp2/mod.rs

//! VDP2 session
//!
//! Owns everything the scroll screens share: the four VRAM bank arenas, the
//! state of the five layers, the display-wide screen masks, a VRAM image and
//! the three external collaborators (registers, palettes, fatal sink).
//! Loading lives in `loader`, per-screen display settings in `screen`.

pub mod loader;
pub mod screen;

use crate::core::config::Vdp2Config;
use crate::core::error::{Vdp2Error, Vdp2Result};
use crate::core::fatal::{FatalSink, LogSink};
use crate::core::palette::{Cram, PaletteBanks};
use crate::core::registers::{RegisterFile, RegisterResult, Vdp2Registers};
use crate::core::scroll::{CoefficientTable, Layer, LayerState, RotationMode, ScreenFlags};
use crate::core::tilemap::ColorMode;
use crate::core::vram::{BankArena, Vram};
use log::info;

/// Palette slot the text overlay keeps for its font
const OVERLAY_PALETTE: u8 = 0;

/// VDP2 allocation and configuration session
pub struct Vdp2<R = RegisterFile, P = Cram, S = LogSink> {
    config: Vdp2Config,
    arena: BankArena,
    layers: [LayerState; 5],
    /// Screens shown
    enabled: ScreenFlags,
    /// Screens with colour calculation on
    color_calc: ScreenFlags,
    offset_a: ScreenFlags,
    offset_b: ScreenFlags,
    /// Screens with transparent pixels turned off
    transparent: ScreenFlags,
    rotation_mode: RotationMode,
    vram: Vram,
    registers: R,
    palettes: P,
    sink: S,
}

impl Vdp2 {
    /// Session with the in-memory register file and colour RAM
    pub fn new(config: Vdp2Config) -> Self {
        Self::with_parts(config, RegisterFile::new(), Cram::new(), LogSink)
    }
}

impl<R: Vdp2Registers, P: PaletteBanks, S: FatalSink> Vdp2<R, P, S> {
    /// Session over caller-supplied collaborators
    pub fn with_parts(config: Vdp2Config, registers: R, mut palettes: P, sink: S) -> Self {
        let (enabled, offsets) = if config.reserve_overlay {
            palettes.set_bank_used(OVERLAY_PALETTE, ColorMode::Paletted16, true);
            (ScreenFlags::NBG3 | ScreenFlags::SPRITE, ScreenFlags::NBG3)
        } else {
            (ScreenFlags::SPRITE, ScreenFlags::empty())
        };

        info!(
            "Sessão VDP2 criada (overlay: {}, VRAM em {:08X})",
            config.reserve_overlay, config.vram_base
        );

        Self {
            arena: BankArena::new(&config),
            layers: Default::default(),
            enabled,
            color_calc: enabled,
            offset_a: offsets,
            offset_b: offsets,
            transparent: ScreenFlags::empty(),
            rotation_mode: RotationMode::OneAxis,
            vram: Vram::new(config.vram_base),
            config,
            registers,
            palettes,
            sink,
        }
    }

    pub fn config(&self) -> &Vdp2Config {
        &self.config
    }

    pub fn arena(&self) -> &BankArena {
        &self.arena
    }

    /// Direct access to the arena, for manual placement
    pub fn arena_mut(&mut self) -> &mut BankArena {
        &mut self.arena
    }

    pub fn vram(&self) -> &Vram {
        &self.vram
    }

    pub fn registers(&self) -> &R {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut R {
        &mut self.registers
    }

    pub fn palettes(&self) -> &P {
        &self.palettes
    }

    pub fn palettes_mut(&mut self) -> &mut P {
        &mut self.palettes
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn layer_state(&self, layer: Layer) -> &LayerState {
        &self.layers[layer.index()]
    }

    pub fn enabled_screens(&self) -> ScreenFlags {
        self.enabled
    }

    pub fn color_calc_screens(&self) -> ScreenFlags {
        self.color_calc
    }

    pub fn offset_a_screens(&self) -> ScreenFlags {
        self.offset_a
    }

    pub fn offset_b_screens(&self) -> ScreenFlags {
        self.offset_b
    }

    pub fn transparent_screens(&self) -> ScreenFlags {
        self.transparent
    }

    pub fn rotation_mode(&self) -> RotationMode {
        self.rotation_mode
    }

    /// Releases every layer's VRAM and palette and empties the banks.
    ///
    /// Only call between scenes, with no layer being displayed. The overlay
    /// palette and its bank cycle stay reserved.
    pub fn reset(&mut self) -> Vdp2Result<()> {
        for state in self.layers.iter_mut() {
            if let Some((palette, _)) = state.clear() {
                self.palettes.set_bank_used(palette.id(), palette.mode(), false);
            }
        }

        self.arena.reset();
        self.rotation_mode = RotationMode::OneAxis;

        info!("VRAM liberada: todos os bancos no estado inicial");

        self.push(|regs| regs.set_coefficient_table(CoefficientTable::Off))
    }

    /// Hands the error to the fatal sink and returns it
    fn fail<T>(&mut self, err: Vdp2Error) -> Vdp2Result<T> {
        self.sink.report(&err.to_string());
        Err(err)
    }

    /// Runs one register write, escalating a refusal
    fn push<F>(&mut self, write: F) -> Vdp2Result<()>
    where
        F: FnOnce(&mut R) -> RegisterResult,
    {
        match write(&mut self.registers) {
            Ok(()) => Ok(()),
            Err(reject) => self.fail(reject.into()),
        }
    }
}
