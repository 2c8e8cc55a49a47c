//! Carga de tilemaps nas telas de scroll.
//! Resolve endereços e paleta, transfere células e mapa para a VRAM e
//! programa os registradores da tela.

use crate::core::error::{DataKind, Vdp2Error, Vdp2Result};
use crate::core::fatal::FatalSink;
use crate::core::palette::{Palette, PaletteBanks};
use crate::core::registers::Vdp2Registers;
use crate::core::scroll::{default_plane_layout, layout, Layer, LayerRole, PlaneLayout};
use crate::core::tilemap::{Tilemap, TilemapInfo};
use crate::core::vdp2::Vdp2;
use crate::core::vram::{auto_allocate_cell, auto_allocate_map};
use log::{debug, info, trace, warn};

impl<R: Vdp2Registers, P: PaletteBanks, S: FatalSink> Vdp2<R, P, S> {
    /// Carrega um tilemap na tela.
    ///
    /// Endereços ainda não definidos são alocados automaticamente; endereços
    /// definidos à mão são validados contra o tamanho registrado. Qualquer
    /// falha é relatada ao sink fatal e interrompe a carga sem desfazer os
    /// passos anteriores. Não liga a exibição da tela.
    pub fn load_tilemap<T: Tilemap + ?Sized>(&mut self, layer: Layer, tilemap: &T) -> Vdp2Result<()> {
        let info = tilemap.info();
        self.layers[layer.index()].info = info;

        let map_address = self.resolve_map(layer, &info)?;
        let cell_address = self.resolve_cells(layer, &info)?;
        let palette = self.resolve_palette(layer, &info, tilemap.palette_data())?;

        let plane_layout = match layer.role() {
            LayerRole::Normal => Some(default_plane_layout(
                info.map_width,
                info.map_height,
                info.char_size,
                info.plane_size,
            )),
            LayerRole::Rotation => None,
        };

        let cell_offset = layout::cell_offset(&info, cell_address, self.config.vram_base);
        let palette_offset = layout::palette_offset(info.map_mode, palette.map_or(0, |p| p.id()));

        self.check_region(layer, DataKind::Cell, cell_address, info.cell_byte_size)?;
        self.check_region(layer, DataKind::Map, map_address, info.map_byte_size())?;

        self.transfer_cells(&info, tilemap.cell_data(), cell_address);
        self.transfer_map(&info, tilemap.map_data(), map_address, cell_offset, palette_offset);

        self.program_layer(layer, &info, plane_layout)?;

        info!(
            "{} carregado: {}x{} tiles, células em {:08X}, mapa em {:08X}",
            layer, info.map_width, info.map_height, cell_address, map_address
        );
        Ok(())
    }

    fn resolve_map(&mut self, layer: Layer, info: &TilemapInfo) -> Vdp2Result<u32> {
        let required = info.map_byte_size();
        let state = &self.layers[layer.index()];

        match state.map_address {
            Some(address) => {
                let allocated = state.map_alloc_size.unwrap_or(0);
                if allocated < required {
                    return self.fail(Vdp2Error::AllocationTooSmall {
                        layer,
                        data: DataKind::Map,
                        required,
                        allocated,
                    });
                }
                Ok(address)
            }
            None => match auto_allocate_map(&mut self.arena, info, layer.role()) {
                Some(address) => {
                    let state = &mut self.layers[layer.index()];
                    state.map_address = Some(address);
                    state.map_alloc_size = Some(required);
                    Ok(address)
                }
                None => self.fail(Vdp2Error::VramExhausted {
                    layer,
                    data: DataKind::Map,
                }),
            },
        }
    }

    fn resolve_cells(&mut self, layer: Layer, info: &TilemapInfo) -> Vdp2Result<u32> {
        let required = info.cell_byte_size;
        let state = &self.layers[layer.index()];

        match state.cell_address {
            Some(address) => {
                let allocated = state.cell_alloc_size.unwrap_or(0);
                if allocated < required {
                    return self.fail(Vdp2Error::AllocationTooSmall {
                        layer,
                        data: DataKind::Cell,
                        required,
                        allocated,
                    });
                }
                Ok(address)
            }
            None => match auto_allocate_cell(&mut self.arena, info, layer.role()) {
                Some(address) => {
                    let state = &mut self.layers[layer.index()];
                    state.cell_address = Some(address);
                    state.cell_alloc_size = Some(required);
                    Ok(address)
                }
                None => self.fail(Vdp2Error::VramExhausted {
                    layer,
                    data: DataKind::Cell,
                }),
            },
        }
    }

    /// Garante um slot de paleta do formato certo e grava as cores nele
    fn resolve_palette(&mut self, layer: Layer, info: &TilemapInfo, colors: Option<&[u16]>) -> Vdp2Result<Option<Palette>> {
        let mode = info.color_mode;
        let current = self.layers[layer.index()].palette;

        // Slot de outro formato (ou cor direta) não serve mais
        if let Some(palette) = current.filter(|p| p.mode() != mode) {
            self.palettes.set_bank_used(palette.id(), palette.mode(), false);
            self.layers[layer.index()].palette = None;
        }

        let Some(len) = mode.palette_len() else {
            return Ok(None);
        };

        let palette = match self.layers[layer.index()].palette {
            Some(palette) => palette,
            None => {
                let Some(id) = self.palettes.free_bank(mode) else {
                    return self.fail(Vdp2Error::NoPaletteAvailable { layer, mode });
                };
                self.palettes.set_bank_used(id, mode, true);
                let palette = Palette::new(mode, id);
                self.layers[layer.index()].palette = Some(palette);
                palette
            }
        };

        let colors = colors.unwrap_or(&[]);
        if colors.len() < len {
            warn!("{}: paleta com {} de {} cores", layer, colors.len(), len);
        }
        self.palettes.load(&palette, &colors[..colors.len().min(len)]);

        Ok(Some(palette))
    }

    /// Regiões definidas à mão podem passar do fim da VRAM
    fn check_region(&mut self, layer: Layer, data: DataKind, address: u32, len: u32) -> Vdp2Result<()> {
        if self.vram.contains(address, len as usize) {
            return Ok(());
        }
        self.fail(Vdp2Error::OutsideVram {
            layer,
            data,
            address,
            len,
        })
    }

    fn transfer_cells(&mut self, info: &TilemapInfo, cells: &[u8], address: u32) {
        let len = info.cell_byte_size as usize;
        if cells.len() < len {
            warn!("Dados de célula curtos: {} de {} bytes", cells.len(), len);
        }
        let cells = &cells[..cells.len().min(len)];
        trace!("Células: {:#X} bytes para {:08X}", cells.len(), address);
        self.vram.write_bytes(address, cells);
    }

    /// Copia o mapa somando o offset de célula e marcando a paleta em cada entrada
    fn transfer_map(&mut self, info: &TilemapInfo, map: &[u16], address: u32, cell_offset: u32, palette_offset: u32) {
        let entries = info.map_entries();

        if info.map_mode.is_one_word() {
            if map.len() < entries {
                warn!("Mapa curto: {} de {} entradas", map.len(), entries);
            }
            for (i, &word) in map.iter().take(entries).enumerate() {
                let value = word.wrapping_add(cell_offset as u16) | palette_offset as u16;
                self.vram.write_word(address + (i as u32) * 2, value);
            }
            trace!("Mapa: {} entradas de 1 palavra para {:08X}", entries.min(map.len()), address);
            return;
        }

        let even = &map[..map.len() & !1];
        let pairs: &[[u16; 2]] = match bytemuck::try_cast_slice(even) {
            Ok(pairs) => pairs,
            Err(e) => {
                warn!("Mapa de duas palavras inválido: {:?}", e);
                return;
            }
        };
        if pairs.len() < entries {
            warn!("Mapa curto: {} de {} entradas", pairs.len(), entries);
        }
        for (i, pair) in pairs.iter().take(entries).enumerate() {
            let entry = ((pair[0] as u32) << 16 | pair[1] as u32).wrapping_add(cell_offset) | palette_offset;
            self.vram.write_long(address + (i as u32) * 4, entry);
        }
        trace!("Mapa: {} entradas de 2 palavras para {:08X}", entries.min(pairs.len()), address);
    }

    /// Formato de caractere, página, tamanho de plano e endereços dos planos
    fn program_layer(&mut self, layer: Layer, info: &TilemapInfo, plane_layout: Option<PlaneLayout>) -> Vdp2Result<()> {
        let state = &self.layers[layer.index()];
        let cell_address = state.cell_address.unwrap_or(self.config.vram_base);
        let map_address = state.map_address.unwrap_or(self.config.vram_base);
        let palette_address = state.palette.map(|p| self.palettes.data_address(&p));

        let planes = match plane_layout {
            Some(PlaneLayout(indices)) => indices.map(|index| map_address + layout::plane_offset(info, index)),
            None => [map_address; 4],
        };

        self.push(|regs| regs.set_char_format(layer, info.color_mode, info.char_size))?;
        self.push(|regs| regs.set_page(layer, cell_address, palette_address, info.map_mode))?;
        self.push(|regs| regs.set_plane_size(layer, info.plane_size))?;
        self.push(|regs| regs.set_map(layer, planes))?;

        debug!("{}: planos {:08X?}", layer, planes);
        Ok(())
    }

    /// Define à mão a região de células da tela; não verifica alinhamento nem ciclos
    pub fn set_cell_address(&mut self, layer: Layer, address: u32, size: u32) -> u32 {
        let state = &mut self.layers[layer.index()];
        state.cell_address = Some(address);
        state.cell_alloc_size = Some(size);
        address
    }

    /// Define à mão a região de mapa da tela; não verifica alinhamento nem ciclos
    pub fn set_map_address(&mut self, layer: Layer, address: u32, size: u32) -> u32 {
        let state = &mut self.layers[layer.index()];
        state.map_address = Some(address);
        state.map_alloc_size = Some(size);
        address
    }

    pub fn cell_address(&self, layer: Layer) -> Option<u32> {
        self.layers[layer.index()].cell_address
    }

    pub fn map_address(&self, layer: Layer) -> Option<u32> {
        self.layers[layer.index()].map_address
    }

    pub fn palette(&self, layer: Layer) -> Option<Palette> {
        self.layers[layer.index()].palette
    }

    pub fn info(&self, layer: Layer) -> TilemapInfo {
        self.layers[layer.index()].info
    }

    /// Endereço da página `index` do mapa, `None` sem mapa alocado
    pub fn page_address(&self, layer: Layer, index: u8) -> Option<u32> {
        let state = &self.layers[layer.index()];
        state.map_address.map(|map| map + layout::page_offset(&state.info, index))
    }

    /// Endereço do plano `index` do mapa; igual ao de página com planos 1x1
    pub fn plane_address(&self, layer: Layer, index: u8) -> Option<u32> {
        let state = &self.layers[layer.index()];
        state.map_address.map(|map| map + layout::plane_offset(&state.info, index))
    }

    /// Offset de célula que a carga soma ao mapa
    pub fn cell_offset(&self, layer: Layer) -> Option<u32> {
        let state = &self.layers[layer.index()];
        state
            .cell_address
            .map(|cells| layout::cell_offset(&state.info, cells, self.config.vram_base))
    }

    /// Bits de paleta para uma entrada de mapa desta tela
    pub fn palette_offset(&self, layer: Layer, palette_id: u8) -> u32 {
        layout::palette_offset(self.layers[layer.index()].info.map_mode, palette_id)
    }

    /// Troca o layout dos 4 planos (o RBG0 só usa o primeiro)
    pub fn set_map_layout(&mut self, layer: Layer, a: u8, b: u8, c: u8, d: u8) -> Vdp2Result<()> {
        let planes = [a, b, c, d].map(|index| self.plane_address(layer, index));
        let [Some(pa), Some(pb), Some(pc), Some(pd)] = planes else {
            warn!("{}: layout de planos sem mapa alocado", layer);
            return Ok(());
        };

        let planes = match layer.role() {
            LayerRole::Normal => [pa, pb, pc, pd],
            LayerRole::Rotation => [pa; 4],
        };
        self.push(|regs| regs.set_map(layer, planes))
    }

    /// Endereço da tabela de line scroll (só NBG0 e NBG1)
    pub fn set_line_scroll_address(&mut self, layer: Layer, address: u32) -> bool {
        if !layer.has_line_scroll() {
            warn!("{} não tem tabela de line scroll", layer);
            return false;
        }
        self.layers[layer.index()].table_address = Some(address);
        true
    }

    pub fn line_scroll_address(&self, layer: Layer) -> Option<u32> {
        if layer.has_line_scroll() {
            self.layers[layer.index()].table_address
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::config::Vdp2Config;
    use crate::core::error::{DataKind, Vdp2Error};
    use crate::core::fatal::RecordingSink;
    use crate::core::palette::Cram;
    use crate::core::registers::RegisterFile;
    use crate::core::scroll::Layer;
    use crate::core::tilemap::{CharSize, ColorMode, MapMode, MemoryTilemap, PlaneSize, TilemapInfo};
    use crate::core::vdp2::Vdp2;
    use crate::core::vram::{VramBank, VRAM_BASE, VRAM_SIZE};

    fn recording() -> Vdp2<RegisterFile, Cram, RecordingSink> {
        Vdp2::with_parts(Vdp2Config::default(), RegisterFile::new(), Cram::new(), RecordingSink::new())
    }

    fn small_info() -> TilemapInfo {
        TilemapInfo {
            map_width: 64,
            map_height: 64,
            char_size: CharSize::OneByOne,
            color_mode: ColorMode::Paletted16,
            plane_size: PlaneSize::OneByOne,
            map_mode: MapMode::OneWord12Bit,
            cell_byte_size: 0x800,
        }
    }

    fn small_map() -> MemoryTilemap {
        let info = small_info();
        MemoryTilemap::new(info, vec![0xAA; 0x800], vec![7; info.map_entries()], Some(vec![0; 16]))
    }

    fn wide_map() -> MemoryTilemap {
        let info = TilemapInfo {
            map_width: 128,
            map_height: 64,
            char_size: CharSize::TwoByTwo,
            color_mode: ColorMode::Paletted16,
            plane_size: PlaneSize::TwoByTwo,
            map_mode: MapMode::OneWord10Bit,
            cell_byte_size: 0x1000,
        };
        let map = vec![0; info.map_entries()];
        MemoryTilemap::new(info, vec![0; 0x1000], map, Some(vec![0; 16]))
    }

    #[test]
    fn test_default_layout_programs_planes() {
        let mut vdp2 = Vdp2::new(Vdp2Config::default());
        vdp2.load_tilemap(Layer::Nbg2, &wide_map()).unwrap();

        let map = vdp2.map_address(Layer::Nbg2).unwrap();
        // Plano 2x2 com tiles 16x16 e 1 palavra: 0x2000 bytes
        let plane = 0x2000;
        assert_eq!(vdp2.plane_address(Layer::Nbg2, 1), Some(map + plane));
        assert_eq!(vdp2.page_address(Layer::Nbg2, 1), Some(map + 0x800));
        assert_eq!(vdp2.registers().map[Layer::Nbg2.index()], [map, map + plane, map, map + plane]);
    }

    #[test]
    fn test_manual_layout() {
        let mut vdp2 = Vdp2::new(Vdp2Config::default());
        vdp2.load_tilemap(Layer::Nbg2, &wide_map()).unwrap();
        let map = vdp2.map_address(Layer::Nbg2).unwrap();

        vdp2.set_map_layout(Layer::Nbg2, 1, 0, 1, 0).unwrap();
        assert_eq!(vdp2.registers().map[Layer::Nbg2.index()][0], map + 0x2000);
        assert_eq!(vdp2.registers().map[Layer::Nbg2.index()][1], map);
    }

    #[test]
    fn test_queries_without_allocation() {
        let mut vdp2 = Vdp2::new(Vdp2Config::default());
        assert!(vdp2.page_address(Layer::Nbg0, 0).is_none());
        assert!(vdp2.plane_address(Layer::Nbg0, 0).is_none());
        assert!(vdp2.cell_offset(Layer::Nbg0).is_none());

        let writes = vdp2.registers().writes;
        vdp2.set_map_layout(Layer::Nbg0, 0, 1, 2, 3).unwrap();
        assert_eq!(vdp2.registers().writes, writes);
    }

    #[test]
    fn test_manual_cell_address() {
        let mut vdp2 = Vdp2::new(Vdp2Config::default());
        let base = vdp2.config().bank_base(VramBank::A1);
        assert_eq!(vdp2.set_cell_address(Layer::Nbg3, base + 0x80, 0x1000), base + 0x80);

        vdp2.load_tilemap(Layer::Nbg3, &wide_map()).unwrap();
        assert_eq!(vdp2.cell_address(Layer::Nbg3), Some(base + 0x80));
        // 1 palavra, modo 10 bits, tiles 2x2: ((A1 + 0x80) & 0x1FFFF) >> 7
        assert_eq!(vdp2.cell_offset(Layer::Nbg3), Some(1));
        assert_eq!(vdp2.palette_offset(Layer::Nbg3, 2), 0x2000);
        // Células não passaram pelo alocador
        assert_eq!(vdp2.arena().get_available(VramBank::A1), vdp2.arena().capacity(VramBank::A1));
    }

    #[test]
    fn test_map_past_vram_end_is_fatal() {
        let mut vdp2 = recording();
        let end = VRAM_BASE + VRAM_SIZE as u32;
        // 64x64 de 1 palavra ocupa 0x2000 bytes; só 0x1000 restam
        vdp2.set_map_address(Layer::Nbg0, end - 0x1000, 0x2000);

        let err = vdp2.load_tilemap(Layer::Nbg0, &small_map()).unwrap_err();
        assert_eq!(
            err,
            Vdp2Error::OutsideVram {
                layer: Layer::Nbg0,
                data: DataKind::Map,
                address: end - 0x1000,
                len: 0x2000,
            }
        );
        assert_eq!(vdp2.sink().messages.len(), 1);
        assert!(vdp2.sink().last().unwrap().contains("outside VRAM"));
        // Nada foi escrito
        assert_eq!(vdp2.vram().read_word(end - 0x1000), 0);
    }

    #[test]
    fn test_cells_past_vram_end_is_fatal() {
        let mut vdp2 = recording();
        vdp2.set_cell_address(Layer::Nbg1, VRAM_BASE - 0x100, 0x800);

        let err = vdp2.load_tilemap(Layer::Nbg1, &small_map()).unwrap_err();
        assert!(matches!(
            err,
            Vdp2Error::OutsideVram {
                data: DataKind::Cell,
                ..
            }
        ));
        assert_eq!(vdp2.sink().messages.len(), 1);
    }

    #[test]
    fn test_short_buffers_partial_transfer() {
        let mut vdp2 = recording();
        let source = MemoryTilemap::new(small_info(), vec![0xAA; 0x10], vec![7; 3], None);

        vdp2.load_tilemap(Layer::Nbg2, &source).unwrap();
        assert!(vdp2.sink().messages.is_empty());

        let cells = vdp2.cell_address(Layer::Nbg2).unwrap();
        assert_eq!(vdp2.vram().slice(cells + 0xE, 4), Some(&[0xAA, 0xAA, 0, 0][..]));

        let map = vdp2.map_address(Layer::Nbg2).unwrap();
        let offset = vdp2.cell_offset(Layer::Nbg2).unwrap() as u16;
        let palette = vdp2.palette_offset(Layer::Nbg2, vdp2.palette(Layer::Nbg2).unwrap().id()) as u16;
        assert_eq!(vdp2.vram().read_word(map + 4), (7 + offset) | palette);
        assert_eq!(vdp2.vram().read_word(map + 6), 0);
    }

    #[test]
    fn test_line_scroll_only_nbg0_nbg1() {
        let mut vdp2 = Vdp2::new(Vdp2Config::default());
        assert!(vdp2.set_line_scroll_address(Layer::Nbg1, 0x25E7_F000));
        assert_eq!(vdp2.line_scroll_address(Layer::Nbg1), Some(0x25E7_F000));
        assert!(!vdp2.set_line_scroll_address(Layer::Nbg2, 0x25E7_F000));
        assert!(vdp2.line_scroll_address(Layer::Nbg2).is_none());
    }
}
