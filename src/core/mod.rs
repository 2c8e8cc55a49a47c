//! Núcleo do VDP2: bancos de VRAM, telas de scroll e os colaboradores externos
//! (paleta, registradores e relatório de falhas fatais).

pub mod config;
pub mod error;
pub mod fatal;
pub mod palette;
pub mod registers;
pub mod scroll;
pub mod tilemap;
pub mod vdp2;
pub mod vram;
