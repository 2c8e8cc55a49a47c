//! Modos de rotação do RBG0 e tabela de coeficientes.

use crate::core::tilemap::{CharSize, MapMode, TilemapInfo};
use crate::core::vram::{VramBank, MAX_BANK_CYCLES};

/// Quantos eixos de rotação o RBG0 usa
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationMode {
    /// Rotação só no plano da tela; sem tabela de coeficientes
    #[default]
    OneAxis,
    /// Coeficiente por linha
    TwoAxis,
    /// Coeficiente por pixel (perspectiva)
    ThreeAxis,
}

/// Estado da tabela de coeficientes como o registrador a recebe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoefficientTable {
    #[default]
    Off,
    /// Um coeficiente por linha
    Line { address: u32, fixed: bool },
    /// Um coeficiente por pixel
    Dot { address: u32, fixed: bool },
}

impl CoefficientTable {
    /// Bit de leitura por pixel
    pub const K_DOT: u16 = 0x20;
    /// Bit de tabela fixa (pré-calculada)
    pub const K_FIX: u16 = 0x40;

    pub fn address(&self) -> Option<u32> {
        match *self {
            CoefficientTable::Off => None,
            CoefficientTable::Line { address, .. } | CoefficientTable::Dot { address, .. } => Some(address),
        }
    }

    /// Flags do registrador de controle da tabela
    pub fn control_bits(&self) -> u16 {
        match *self {
            CoefficientTable::Off => 0,
            CoefficientTable::Line { fixed, .. } => {
                if fixed {
                    Self::K_FIX
                } else {
                    0
                }
            }
            CoefficientTable::Dot { fixed, .. } => {
                let bits = Self::K_DOT;
                if fixed {
                    bits | Self::K_FIX
                } else {
                    bits
                }
            }
        }
    }
}

/// Pedido de VRAM para a tabela de coeficientes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableRequest {
    pub size: u32,
    pub boundary: u32,
    pub bank: VramBank,
    pub cycles: u8,
}

/// Tabela atualizada a cada vblank (só a parte do quadro atual)
pub const VBLANK_TABLE_SIZE: u32 = 0x2000;
/// Tabela estática completa
pub const FIXED_TABLE_SIZE: u32 = 0x1_8000;
/// A tabela sempre começa no início do banco
pub const TABLE_BOUNDARY: u32 = 0x2_0000;

impl RotationMode {
    /// Memória que o modo precisa, se precisar
    pub fn table_request(self, vblank: bool) -> Option<TableRequest> {
        let cycles = match self {
            RotationMode::OneAxis => return None,
            RotationMode::TwoAxis => 0,
            RotationMode::ThreeAxis => MAX_BANK_CYCLES,
        };

        Some(TableRequest {
            size: if vblank { VBLANK_TABLE_SIZE } else { FIXED_TABLE_SIZE },
            boundary: TABLE_BOUNDARY,
            bank: VramBank::B0,
            cycles,
        })
    }

    /// Valor da tabela para um endereço já alocado
    pub fn coefficient_table(self, address: u32, vblank: bool) -> CoefficientTable {
        let fixed = !vblank;
        match self {
            RotationMode::OneAxis => CoefficientTable::Off,
            RotationMode::TwoAxis => CoefficientTable::Line { address, fixed },
            RotationMode::ThreeAxis => CoefficientTable::Dot { address, fixed },
        }
    }
}

impl std::fmt::Display for RotationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RotationMode::OneAxis => write!(f, "1 eixo"),
            RotationMode::TwoAxis => write!(f, "2 eixos"),
            RotationMode::ThreeAxis => write!(f, "3 eixos"),
        }
    }
}

/// Converte índices de plano da grade 4x4 em números de mapa.
///
/// Cada índice é multiplicado pelo tamanho do plano em blocos de 0x800 bytes.
/// Índices além dos planos carregados não são verificados.
pub fn rotation_plane_grid(info: &TilemapInfo, layout: &[[u8; 4]; 4]) -> [[u8; 4]; 4] {
    let mut size: u8 = if info.char_size == CharSize::OneByOne { 4 } else { 1 };
    if info.map_mode == MapMode::TwoWord {
        size <<= 1;
    }
    size <<= info.plane_size.page_shift();

    layout.map(|row| row.map(|index| index.wrapping_mul(size)))
}
