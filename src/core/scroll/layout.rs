//! Layout de planos e offsets aplicados aos dados de mapa.
//! Tudo aqui é função pura da geometria do tilemap.

use crate::core::tilemap::{CharSize, MapMode, PlaneSize, TilemapInfo};

/// Índices de plano da grade 2x2 de uma tela normal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaneLayout(pub [u8; 4]);

impl PlaneLayout {
    /// |0|0|
    /// |0|0|
    pub const SINGLE: PlaneLayout = PlaneLayout([0, 0, 0, 0]);
    /// |0|1|
    /// |0|1|
    pub const HORIZONTAL: PlaneLayout = PlaneLayout([0, 1, 0, 1]);
    /// |0|0|
    /// |1|1|
    pub const VERTICAL: PlaneLayout = PlaneLayout([0, 0, 1, 1]);
    /// |0|1|
    /// |2|3|
    pub const QUAD: PlaneLayout = PlaneLayout([0, 1, 2, 3]);
}

/// Largura e altura (em tiles) que um plano comporta
pub fn plane_capacity(char_size: CharSize, plane_size: PlaneSize) -> (u16, u16) {
    let (mut x, mut y) = (32u16, 32u16);

    if char_size == CharSize::OneByOne {
        x <<= 1;
        y <<= 1;
    }

    match plane_size {
        PlaneSize::TwoByTwo => {
            x <<= 1;
            y <<= 1;
        }
        PlaneSize::TwoByOne => x <<= 1,
        PlaneSize::OneByOne => {}
    }

    (x, y)
}

/// Escolhe o layout padrão dos 4 planos conforme o tamanho do mapa
pub fn default_plane_layout(map_width: u16, map_height: u16, char_size: CharSize, plane_size: PlaneSize) -> PlaneLayout {
    let (plane_x, plane_y) = plane_capacity(char_size, plane_size);

    match (map_width > plane_x, map_height > plane_y) {
        (true, true) => PlaneLayout::QUAD,
        (true, false) => PlaneLayout::HORIZONTAL,
        (false, true) => PlaneLayout::VERTICAL,
        (false, false) => PlaneLayout::SINGLE,
    }
}

/// Offset de página (bytes) a partir do início do mapa
pub fn page_offset(info: &TilemapInfo, index: u8) -> u32 {
    info.page_byte_size() * index as u32
}

/// Offset de plano (bytes) a partir do início do mapa
pub fn plane_offset(info: &TilemapInfo, index: u8) -> u32 {
    info.plane_byte_size() * index as u32
}

/// Offset a somar ao mapa quando as células não começam no início de um banco.
///
/// `cell_address` precisa estar alinhado a 32 bytes.
pub fn cell_offset(info: &TilemapInfo, cell_address: u32, vram_base: u32) -> u32 {
    let relative = cell_address.wrapping_sub(vram_base);
    let two_by_two = info.char_size == CharSize::TwoByTwo;

    match info.map_mode {
        MapMode::TwoWord => relative >> 5,
        MapMode::OneWord10Bit => {
            if two_by_two {
                (relative & 0x1FFFF) >> 7
            } else {
                (relative & 0x7FFF) >> 5
            }
        }
        MapMode::OneWord12Bit => {
            if two_by_two {
                relative >> 7
            } else {
                (relative & 0x1FFFF) >> 5
            }
        }
    }
}

/// Número de paleta já posicionado para entrar numa entrada de mapa
pub fn palette_offset(map_mode: MapMode, palette_id: u8) -> u32 {
    if map_mode.is_one_word() {
        (palette_id as u32) << 12
    } else {
        (palette_id as u32) << 20
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_with_doubled_plane() {
        // Tiles 16x16 com planos 2x2: cada plano comporta 64x64
        let single = default_plane_layout(64, 64, CharSize::TwoByTwo, PlaneSize::TwoByTwo);
        assert_eq!(single, PlaneLayout::SINGLE);

        let wide = default_plane_layout(128, 64, CharSize::TwoByTwo, PlaneSize::TwoByTwo);
        assert_eq!(wide, PlaneLayout::HORIZONTAL);
    }

    #[test]
    fn test_default_layout_all_patterns() {
        assert_eq!(default_plane_layout(64, 64, CharSize::OneByOne, PlaneSize::OneByOne), PlaneLayout::SINGLE);
        assert_eq!(default_plane_layout(65, 64, CharSize::OneByOne, PlaneSize::OneByOne), PlaneLayout::HORIZONTAL);
        assert_eq!(default_plane_layout(64, 128, CharSize::OneByOne, PlaneSize::OneByOne), PlaneLayout::VERTICAL);
        assert_eq!(default_plane_layout(128, 128, CharSize::OneByOne, PlaneSize::TwoByOne), PlaneLayout::VERTICAL);
        assert_eq!(default_plane_layout(33, 33, CharSize::TwoByTwo, PlaneSize::OneByOne), PlaneLayout::QUAD);
    }

    #[test]
    fn test_cell_offset_two_word() {
        let info = TilemapInfo {
            map_mode: MapMode::TwoWord,
            ..Default::default()
        };
        let base = 0x25E0_0000;
        assert_eq!(cell_offset(&info, base + 0x4_1000, base), 0x4_1000 >> 5);
    }

    #[test]
    fn test_cell_offset_one_word() {
        let base = 0x25E0_0000;
        let mut info = TilemapInfo {
            map_mode: MapMode::OneWord10Bit,
            char_size: CharSize::OneByOne,
            ..Default::default()
        };
        assert_eq!(cell_offset(&info, base + 0x4_8020, base), (0x4_8020 & 0x7FFF) >> 5);

        info.char_size = CharSize::TwoByTwo;
        assert_eq!(cell_offset(&info, base + 0x4_8080, base), (0x4_8080 & 0x1FFFF) >> 7);

        info.map_mode = MapMode::OneWord12Bit;
        assert_eq!(cell_offset(&info, base + 0x4_8080, base), 0x4_8080 >> 7);

        info.char_size = CharSize::OneByOne;
        assert_eq!(cell_offset(&info, base + 0x4_8020, base), (0x4_8020 & 0x1FFFF) >> 5);
    }

    #[test]
    fn test_palette_offset() {
        assert_eq!(palette_offset(MapMode::OneWord12Bit, 3), 0x3000);
        assert_eq!(palette_offset(MapMode::TwoWord, 3), 0x30_0000);
    }

    #[test]
    fn test_plane_offsets() {
        let info = TilemapInfo {
            char_size: CharSize::OneByOne,
            plane_size: PlaneSize::TwoByOne,
            ..Default::default()
        };
        assert_eq!(page_offset(&info, 1), 0x2000);
        assert_eq!(plane_offset(&info, 1), 0x4000);
        assert_eq!(plane_offset(&info, 3), 0xC000);
    }
}
