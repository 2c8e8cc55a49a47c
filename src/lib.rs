// Ponto de entrada da biblioteca.
// Alocador de VRAM e carregador de tilemaps para as telas de scroll do VDP2 do Saturn.

// Módulos principais do projeto.
pub mod core;

// Re-exportações para facilitar o uso.
pub use core::config::Vdp2Config;
pub use core::error::{DataKind, ErrorKind, Vdp2Error, Vdp2Result};
pub use core::fatal::{FatalSink, LogSink, RecordingSink};
pub use core::palette::{Cram, Palette, PaletteBanks};
pub use core::registers::{RegisterFile, RegisterReject, Vdp2Registers};
pub use core::scroll::{
    ColorCalcMode, ColorCondition, ColorOffset, Fxp, Layer, LayerRole, OffsetChannel, Priority, RotationMode,
    ScreenFlags, SpriteBank,
};
pub use core::tilemap::{CharSize, ColorMode, MapMode, MemoryTilemap, PlaneSize, Tilemap, TilemapInfo};
pub use core::vdp2::Vdp2;
pub use core::vram::{BankArena, VramBank};

/// Versão da biblioteca.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Função conveniente para criar uma sessão com os colaboradores em memória.
pub fn create_session() -> Vdp2 {
    Vdp2::new(Vdp2Config::default())
}
