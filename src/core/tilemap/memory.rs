//! Tilemap mantido inteiramente em memória de trabalho.
//! Inclui os utilitários de página usados por quem monta mapas em tempo de execução.

use crate::core::tilemap::{Tilemap, TilemapInfo};
use log::warn;

/// Coordenada de tile dentro de uma página
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Coord {
    pub x: u16,
    pub y: u16,
}

impl Coord {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Tilemap com buffers próprios
#[derive(Debug, Clone, Default)]
pub struct MemoryTilemap {
    info: TilemapInfo,
    cells: Vec<u8>,
    map: Vec<u16>,
    palette: Option<Vec<u16>>,
}

impl MemoryTilemap {
    /// Cria um tilemap a partir de buffers já formatados para o VDP2
    pub fn new(info: TilemapInfo, cells: Vec<u8>, map: Vec<u16>, palette: Option<Vec<u16>>) -> Self {
        Self {
            info,
            cells,
            map,
            palette,
        }
    }

    /// Cria um tilemap vazio com `pages` páginas de mapa zeradas
    pub fn blank(mut info: TilemapInfo, pages: u8) -> Self {
        let pages = pages.max(1);
        let dim = info.page_dim();
        info.map_width = dim;
        info.map_height = dim * pages as u16;

        let words = info.page_entries() * info.map_mode.entry_words() * pages as usize;
        let palette = info.color_mode.palette_len().map(|len| vec![0; len]);

        Self {
            cells: vec![0; info.cell_byte_size as usize],
            map: vec![0; words],
            palette,
            info,
        }
    }

    /// Número de páginas completas de mapa
    pub fn pages(&self) -> usize {
        let page_words = self.info.page_entries() * self.info.map_mode.entry_words();
        self.map.len() / page_words
    }

    /// Índice (em palavras) da entrada `coord` da página `page`
    pub fn page_index(&self, page: u8, coord: Coord) -> usize {
        let dim = self.info.page_dim() as usize;
        let entry = page as usize * self.info.page_entries() + coord.x as usize + dim * coord.y as usize;
        entry * self.info.map_mode.entry_words()
    }

    /// Acesso mutável ao mapa
    pub fn map_mut(&mut self) -> &mut [u16] {
        &mut self.map
    }

    /// Acesso mutável às células
    pub fn cells_mut(&mut self) -> &mut [u8] {
        &mut self.cells
    }

    /// Zera todas as entradas de uma página
    pub fn clear_page(&mut self, page: u8) {
        if page as usize >= self.pages() {
            return;
        }
        let start = self.page_index(page, Coord::default());
        let len = self.info.page_entries() * self.info.map_mode.entry_words();
        self.map[start..start + len].fill(0);
    }

    /// Copia uma região retangular entre duas páginas.
    ///
    /// A região é recortada para caber nos limites da página de destino.
    pub fn copy_map(&mut self, source_page: u8, top_left: Coord, bot_right: Coord, dest_page: u8, dest: Coord) {
        let pages = self.pages();
        if source_page as usize >= pages || dest_page as usize >= pages {
            return;
        }

        let last = self.info.page_dim() - 1;
        if top_left.x > last || top_left.y > last || dest.x > last || dest.y > last {
            return;
        }

        let mut bot_right = Coord::new(bot_right.x.min(last), bot_right.y.min(last));
        if bot_right.x < top_left.x || bot_right.y < top_left.y {
            return;
        }

        // Recorta para o destino
        let width = bot_right.x - top_left.x;
        let height = bot_right.y - top_left.y;
        if dest.x + width > last {
            bot_right.x -= dest.x + width - last;
        }
        if dest.y + height > last {
            bot_right.y -= dest.y + height - last;
        }

        let words = self.info.map_mode.entry_words();
        let row_words = (bot_right.x - top_left.x + 1) as usize * words;

        for row in 0..=(bot_right.y - top_left.y) {
            let src = self.page_index(source_page, Coord::new(top_left.x, top_left.y + row));
            let dst = self.page_index(dest_page, Coord::new(dest.x, dest.y + row));
            self.map.copy_within(src..src + row_words, dst);
        }
    }

    /// Aplica offset de célula e de paleta a todo o mapa.
    ///
    /// Para quem transfere o mapa por conta própria (DMA); não usar junto com
    /// o carregamento da sessão, que já aplica os dois offsets.
    pub fn apply_offsets(&mut self, cell_offset: u32, palette_offset: u32) {
        if self.info.map_mode.is_one_word() {
            for word in self.map.iter_mut() {
                *word = word.wrapping_add(cell_offset as u16) | palette_offset as u16;
            }
            return;
        }

        match bytemuck::try_cast_slice_mut::<u16, [u16; 2]>(&mut self.map) {
            Ok(entries) => {
                for entry in entries.iter_mut() {
                    let value = ((entry[0] as u32) << 16 | entry[1] as u32).wrapping_add(cell_offset) | palette_offset;
                    entry[0] = (value >> 16) as u16;
                    entry[1] = value as u16;
                }
            }
            Err(e) => warn!("Mapa de duas palavras com tamanho ímpar: {:?}", e),
        }
    }
}

impl Tilemap for MemoryTilemap {
    fn info(&self) -> TilemapInfo {
        self.info
    }

    fn cell_data(&self) -> &[u8] {
        &self.cells
    }

    fn map_data(&self) -> &[u16] {
        &self.map
    }

    fn palette_data(&self) -> Option<&[u16]> {
        self.palette.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tilemap::{CharSize, MapMode};

    fn small_map(map_mode: MapMode) -> MemoryTilemap {
        let info = TilemapInfo {
            char_size: CharSize::TwoByTwo,
            map_mode,
            cell_byte_size: 0x100,
            ..Default::default()
        };
        MemoryTilemap::blank(info, 2)
    }

    #[test]
    fn test_blank_geometry() {
        let map = small_map(MapMode::OneWord12Bit);
        assert_eq!(map.info().map_width, 32);
        assert_eq!(map.info().map_height, 64);
        assert_eq!(map.pages(), 2);
        assert_eq!(map.map_data().len(), 2048);
        assert_eq!(map.palette_data().map(|p| p.len()), Some(256));
    }

    #[test]
    fn test_copy_map_crops_to_page() {
        let mut map = small_map(MapMode::OneWord12Bit);
        for (i, word) in map.map_mut()[..1024].iter_mut().enumerate() {
            *word = i as u16;
        }

        map.copy_map(0, Coord::new(0, 0), Coord::new(3, 1), 1, Coord::new(30, 5));

        // Só duas colunas cabem a partir de x = 30
        let at = map.page_index(1, Coord::new(30, 5));
        assert_eq!(map.map_data()[at], 0);
        assert_eq!(map.map_data()[at + 1], 1);
        assert_eq!(map.map_data()[map.page_index(1, Coord::new(31, 6))], 33);
        assert_eq!(map.map_data()[map.page_index(1, Coord::new(29, 5))], 0);
    }

    #[test]
    fn test_clear_page() {
        let mut map = small_map(MapMode::TwoWord);
        map.map_mut().fill(7);
        map.clear_page(1);

        let second = map.page_index(1, Coord::default());
        assert!(map.map_data()[second..].iter().all(|&w| w == 0));
        assert!(map.map_data()[..second].iter().all(|&w| w == 7));
    }

    #[test]
    fn test_apply_offsets_two_word() {
        let mut map = small_map(MapMode::TwoWord);
        map.map_mut()[0] = 0x0000;
        map.map_mut()[1] = 0xFFFF;
        map.apply_offsets(1, 3 << 20);

        assert_eq!(map.map_data()[0], 0x0031);
        assert_eq!(map.map_data()[1], 0x0000);
    }

    #[test]
    fn test_apply_offsets_one_word() {
        let mut map = small_map(MapMode::OneWord10Bit);
        map.map_mut()[0] = 0x0010;
        map.apply_offsets(0x20, 2 << 12);
        assert_eq!(map.map_data()[0], 0x2030);
    }
}
