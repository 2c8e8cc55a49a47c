//! Escolha automática de banco para células e mapas.
//! As ordens de preferência deixam A0 por último para as telas normais,
//! porque é o primeiro banco que o RBG0 tenta tomar inteiro.

use crate::core::tilemap::{ColorMode, TilemapInfo};
use crate::core::vram::{BankArena, VramBank, MAX_BANK_CYCLES, MIN_BOUNDARY};
use log::debug;

/// Papel da tela no pedido de alocação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayerRole {
    /// NBG0-NBG3: dividem bancos entre si
    #[default]
    Normal,
    /// RBG0: precisa de um banco exclusivo
    Rotation,
}

/// Ordem de bancos do RBG0
const ROTATION_ORDER: [VramBank; 4] = [VramBank::A0, VramBank::A1, VramBank::B0, VramBank::B1];

/// Ordem de bancos para células de telas normais
const NORMAL_CELL_ORDER: [VramBank; 4] = [VramBank::B0, VramBank::A1, VramBank::A0, VramBank::B1];

/// Ordem de bancos para mapas de telas normais
const NORMAL_MAP_ORDER: [VramBank; 4] = [VramBank::B1, VramBank::A1, VramBank::B0, VramBank::A0];

/// Ciclos de mapa por tela normal
const NORMAL_MAP_CYCLES: u8 = 1;

/// Ciclos que a leitura de células consome, pela profundidade de cor
pub fn cell_cycles(color_mode: ColorMode) -> u8 {
    match color_mode {
        ColorMode::Paletted16 => 1,
        ColorMode::Paletted256 => 2,
        ColorMode::Rgb555 => 4,
    }
}

/// Tamanho e alinhamento do mapa de um tilemap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapAllocation {
    pub size: u32,
    pub boundary: u32,
}

/// Calcula tamanho e alinhamento do mapa; o alinhamento é o tamanho de um plano
pub fn map_allocation(info: &TilemapInfo) -> MapAllocation {
    MapAllocation {
        size: info.map_byte_size(),
        boundary: info.plane_byte_size(),
    }
}

fn first_fit(arena: &mut BankArena, order: &[VramBank], size: u32, boundary: u32, cycles: u8) -> Option<u32> {
    order
        .iter()
        .find_map(|&bank| arena.allocate(size, boundary, bank, cycles))
}

/// Reserva espaço para as células do tilemap
pub fn auto_allocate_cell(arena: &mut BankArena, info: &TilemapInfo, role: LayerRole) -> Option<u32> {
    let (order, cycles) = match role {
        LayerRole::Rotation => (&ROTATION_ORDER, MAX_BANK_CYCLES),
        LayerRole::Normal => (&NORMAL_CELL_ORDER, cell_cycles(info.color_mode)),
    };

    let address = first_fit(arena, order, info.cell_byte_size, MIN_BOUNDARY, cycles);
    if let Some(address) = address {
        debug!("Células ({:?}) em {:08X}", role, address);
    }
    address
}

/// Reserva espaço para o mapa do tilemap
pub fn auto_allocate_map(arena: &mut BankArena, info: &TilemapInfo, role: LayerRole) -> Option<u32> {
    let request = map_allocation(info);
    let (order, cycles) = match role {
        LayerRole::Rotation => (&ROTATION_ORDER, MAX_BANK_CYCLES),
        LayerRole::Normal => (&NORMAL_MAP_ORDER, NORMAL_MAP_CYCLES),
    };

    let address = first_fit(arena, order, request.size, request.boundary, cycles);
    if let Some(address) = address {
        debug!("Mapa ({:?}) em {:08X}", role, address);
    }
    address
}
