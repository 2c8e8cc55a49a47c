//! Ajustes de exibição por tela e globais.
//! Cada operação altera um bit da máscara correspondente e reenvia a máscara
//! inteira ao registrador.

use crate::core::error::{DataKind, Vdp2Error, Vdp2Result};
use crate::core::fatal::FatalSink;
use crate::core::palette::PaletteBanks;
use crate::core::registers::Vdp2Registers;
use crate::core::scroll::rotation::rotation_plane_grid;
use crate::core::scroll::{
    opacity_ratio, ColorCalcMode, ColorCondition, ColorOffset, Fxp, Layer, OffsetChannel, OpacityChange, Priority,
    RotationMode, ScreenFlags, SpriteBank,
};
use crate::core::vdp2::Vdp2;
use crate::core::vram::VramBank;
use log::{debug, info, warn};

/// Última palavra do banco A1, onde fica a cor de fundo
const BACK_COLOR_OFFSET: u32 = 0x1_FFFE;

impl<R: Vdp2Registers, P: PaletteBanks, S: FatalSink> Vdp2<R, P, S> {
    /// Liga a exibição da tela; falha se o padrão de ciclos resultante for inválido
    pub fn scroll_enable(&mut self, layer: Layer) -> Vdp2Result<()> {
        self.enabled.insert(layer.flag());
        let enabled = self.enabled;
        self.push(|regs| regs.auto_display(enabled))
    }

    /// Desliga a exibição da tela
    pub fn scroll_disable(&mut self, layer: Layer) -> Vdp2Result<()> {
        self.enabled.remove(layer.flag());
        let enabled = self.enabled;
        self.push(|regs| regs.auto_display(enabled))
    }

    /// Prioridade de exibição; empates são resolvidos pelo hardware
    pub fn set_priority(&mut self, layer: Layer, priority: Priority) -> Vdp2Result<()> {
        self.push(|regs| regs.set_priority(layer, priority))
    }

    /// Opacidade de 0.0 a 1.0, arredondada para baixo numa das 32 taxas.
    ///
    /// 1.0 ou mais desliga o cálculo de cor da tela; valores negativos não
    /// mudam nada.
    pub fn set_opacity(&mut self, layer: Layer, opacity: Fxp) -> Vdp2Result<()> {
        match opacity_ratio(opacity) {
            OpacityChange::Unchanged => return Ok(()),
            OpacityChange::Opaque => self.color_calc.remove(layer.flag()),
            OpacityChange::Blend(rate) => {
                self.push(|regs| regs.set_color_rate(layer, rate))?;
                self.color_calc.insert(layer.flag());
            }
        }
        let screens = self.color_calc;
        self.push(|regs| regs.color_calc_on(screens))
    }

    /// Escolhe o offset de cor da tela (A, B ou nenhum)
    pub fn use_color_offset(&mut self, layer: Layer, channel: OffsetChannel) -> Vdp2Result<()> {
        let flag = layer.flag();
        match channel {
            OffsetChannel::OffsetA => {
                self.offset_a.insert(flag);
                self.offset_b.remove(flag);
            }
            OffsetChannel::OffsetB => {
                self.offset_b.insert(flag);
                self.offset_a.remove(flag);
            }
            OffsetChannel::NoOffset => {
                self.offset_a.remove(flag);
                self.offset_b.remove(flag);
            }
        }
        let (a, b) = (self.offset_a, self.offset_b);
        self.push(|regs| regs.color_offset_use(a, b))
    }

    /// Pixels de índice 0 voltam a ser transparentes (padrão)
    pub fn transparent_enable(&mut self, layer: Layer) -> Vdp2Result<()> {
        self.transparent.remove(layer.flag());
        let screens = self.transparent;
        self.push(|regs| regs.scroll_transparent(screens))
    }

    /// Pixels de índice 0 passam a usar a cor 0 da paleta (ou preto)
    pub fn transparent_disable(&mut self, layer: Layer) -> Vdp2Result<()> {
        self.transparent.insert(layer.flag());
        let screens = self.transparent;
        self.push(|regs| regs.scroll_transparent(screens))
    }

    /// Valor do offset de cor A
    pub fn set_color_offset_a(&mut self, offset: ColorOffset) -> Vdp2Result<()> {
        self.push(|regs| regs.set_color_offset(OffsetChannel::OffsetA, offset))
    }

    /// Valor do offset de cor B
    pub fn set_color_offset_b(&mut self, offset: ColorOffset) -> Vdp2Result<()> {
        self.push(|regs| regs.set_color_offset(OffsetChannel::OffsetB, offset))
    }

    /// Modo de cálculo de cor de todas as telas
    pub fn set_color_calc_mode(&mut self, mode: ColorCalcMode, extend: bool) -> Vdp2Result<()> {
        let value = mode.register_value(extend);
        self.push(|regs| regs.set_color_calc_mode(value))
    }

    /// Modo de rotação do RBG0; chamar antes de carregar o RBG0.
    ///
    /// Dois e três eixos reservam a tabela de coeficientes em B0. A memória de
    /// uma tabela anterior só volta no reset global.
    pub fn set_rotation_mode(&mut self, mode: RotationMode, vblank: bool) -> Vdp2Result<()> {
        let table = match mode.table_request(vblank) {
            Some(request) => {
                let Some(address) = self
                    .arena
                    .allocate(request.size, request.boundary, request.bank, request.cycles)
                else {
                    return self.fail(Vdp2Error::VramExhausted {
                        layer: Layer::Rbg0,
                        data: DataKind::CoefficientTable,
                    });
                };
                self.layers[Layer::Rbg0.index()].table_address = Some(address);
                mode.coefficient_table(address, vblank)
            }
            None => {
                self.layers[Layer::Rbg0.index()].table_address = None;
                mode.coefficient_table(0, vblank)
            }
        };

        self.rotation_mode = mode;
        info!("RBG0: rotação em {}", mode);
        self.push(|regs| regs.set_coefficient_table(table))
    }

    /// Endereço da tabela de coeficientes do RBG0
    pub fn coefficient_table_address(&self) -> Option<u32> {
        self.layers[Layer::Rbg0.index()].table_address
    }

    /// Grade 4x4 de planos do RBG0, em índices de plano.
    ///
    /// O RBG0 carrega com um único plano; usar depois da carga para mapas com
    /// vários planos. Índices além dos planos carregados não são verificados.
    pub fn set_rotation_planes(&mut self, layout: &[[u8; 4]; 4]) -> Vdp2Result<()> {
        let grid = rotation_plane_grid(&self.layers[Layer::Rbg0.index()].info, layout);
        debug!("RBG0: grade de planos {:?}", grid);
        self.push(|regs| regs.set_rotation_map16(&grid))
    }

    /// Posição de scroll de uma tela normal, em pixels 16.16
    pub fn set_position(&mut self, layer: Layer, x: Fxp, y: Fxp) -> Vdp2Result<()> {
        self.push(|regs| regs.set_scroll_position(layer, x, y))
    }

    /// Escala do NBG0 ou NBG1; as outras telas recusam
    pub fn set_scale(&mut self, layer: Layer, x: Fxp, y: Fxp) -> Vdp2Result<()> {
        self.push(|regs| regs.set_scroll_scale(layer, x, y))
    }

    /// Liga o cálculo de cor da camada de sprites
    pub fn sprite_color_calc_on(&mut self) -> Vdp2Result<()> {
        self.color_calc.insert(ScreenFlags::SPRITE);
        let screens = self.color_calc;
        self.push(|regs| regs.color_calc_on(screens))
    }

    pub fn sprite_color_calc_off(&mut self) -> Vdp2Result<()> {
        self.color_calc.remove(ScreenFlags::SPRITE);
        let screens = self.color_calc;
        self.push(|regs| regs.color_calc_on(screens))
    }

    /// Opacidade de um banco de taxa de cor dos sprites.
    ///
    /// Fora de 0.0..=1.0 nada muda. 1.0 vira a taxa 0, a mais opaca; sprites
    /// totalmente opacos saem pela condição de cor. Não liga o cálculo de cor.
    pub fn set_sprite_opacity(&mut self, opacity: Fxp, bank: SpriteBank) -> Vdp2Result<()> {
        let rate = match opacity_ratio(opacity) {
            OpacityChange::Blend(rate) => rate,
            OpacityChange::Opaque if opacity == Fxp::ONE => 0,
            _ => {
                warn!("{}: opacidade {:?} ignorada", bank, opacity);
                return Ok(());
            }
        };
        self.push(|regs| regs.set_sprite_color_rate(bank, rate))
    }

    /// Prioridade guardada num banco de prioridade dos sprites
    pub fn set_sprite_priority(&mut self, priority: Priority, bank: SpriteBank) -> Vdp2Result<()> {
        self.push(|regs| regs.set_sprite_priority(bank, priority))
    }

    /// Só sprites cuja prioridade satisfaz a condição recebem cálculo de cor
    pub fn set_sprite_color_condition(&mut self, condition: ColorCondition, test: Priority) -> Vdp2Result<()> {
        self.push(|regs| regs.set_sprite_color_condition(condition, test))
    }

    /// Cor única da tela de fundo (RGB555), gravada no fim do banco A1.
    ///
    /// A palavra não é reservada no alocador.
    pub fn set_back_color(&mut self, color: u16) -> Vdp2Result<()> {
        let address = self.config.bank_base(VramBank::A1) + BACK_COLOR_OFFSET;
        self.vram.write_word(address, color);
        self.push(|regs| regs.set_back_color(address, color))
    }
}

#[cfg(test)]
mod tests {
    use crate::core::config::Vdp2Config;
    use crate::core::error::ErrorKind;
    use crate::core::fatal::RecordingSink;
    use crate::core::palette::Cram;
    use crate::core::registers::RegisterFile;
    use crate::core::scroll::{
        CoefficientTable, ColorCalcMode, ColorCondition, ColorOffset, Fxp, Layer, Priority, RotationMode, ScreenFlags,
        SpriteBank,
    };
    use crate::core::tilemap::{CharSize, ColorMode, MapMode, MemoryTilemap, PlaneSize, TilemapInfo};
    use crate::core::vdp2::Vdp2;
    use crate::core::vram::VramBank;

    #[test]
    fn test_two_axis_table_keeps_cycles() {
        let mut vdp2 = Vdp2::new(Vdp2Config::default());
        vdp2.set_rotation_mode(RotationMode::TwoAxis, false).unwrap();

        let address = vdp2.coefficient_table_address().unwrap();
        assert_eq!(vdp2.arena().bank_of(address), Some(VramBank::B0));
        assert_eq!(vdp2.arena().cycles_used(VramBank::B0), 0);
        assert_eq!(vdp2.arena().get_available(VramBank::B0), 0x8000);
        assert_eq!(
            vdp2.registers().coefficient_table,
            CoefficientTable::Line { address, fixed: true }
        );

        vdp2.set_rotation_mode(RotationMode::OneAxis, true).unwrap();
        assert!(vdp2.coefficient_table_address().is_none());
        assert_eq!(vdp2.registers().coefficient_table, CoefficientTable::Off);
    }

    #[test]
    fn test_rotation_planes_scaled() {
        let mut vdp2 = Vdp2::new(Vdp2Config::default());
        let info = TilemapInfo {
            map_width: 64,
            map_height: 64,
            char_size: CharSize::OneByOne,
            color_mode: ColorMode::Paletted16,
            plane_size: PlaneSize::OneByOne,
            map_mode: MapMode::OneWord12Bit,
            cell_byte_size: 0x400,
        };
        let source = MemoryTilemap::new(info, vec![0; 0x400], vec![0; 4096], Some(vec![0; 16]));
        vdp2.load_tilemap(Layer::Rbg0, &source).unwrap();

        let layout = [[0, 1, 2, 3]; 4];
        vdp2.set_rotation_planes(&layout).unwrap();
        assert_eq!(vdp2.registers().rotation_map16[0], [0, 4, 8, 12]);
    }

    #[test]
    fn test_global_color_settings() {
        let mut vdp2 = Vdp2::new(Vdp2Config::default());
        let mut offset = ColorOffset::new(-40, 0, 40);
        offset += ColorOffset::new(-300, 0, 0);
        vdp2.set_color_offset_a(offset).unwrap();
        vdp2.set_color_offset_b(ColorOffset::from_rgb555(0x001F)).unwrap();
        vdp2.set_color_calc_mode(ColorCalcMode::Addition, true).unwrap();

        assert_eq!(vdp2.registers().color_offset_a.red, -255);
        assert_eq!(vdp2.registers().color_offset_b.red, 248);
        assert_eq!(vdp2.registers().color_calc_mode, 0x500);
    }

    #[test]
    fn test_sprite_color_calc_toggle() {
        let mut vdp2 = Vdp2::new(Vdp2Config::default());
        vdp2.sprite_color_calc_off().unwrap();
        assert_eq!(vdp2.registers().color_calc, ScreenFlags::NBG3);

        vdp2.sprite_color_calc_on().unwrap();
        assert_eq!(vdp2.registers().color_calc, ScreenFlags::NBG3 | ScreenFlags::SPRITE);
    }

    #[test]
    fn test_sprite_opacity_banks() {
        let mut vdp2 = Vdp2::new(Vdp2Config::default());
        vdp2.set_sprite_opacity(Fxp::from(0.5), SpriteBank::Bank3).unwrap();
        assert_eq!(vdp2.registers().sprite_color_rate[3], 15);

        vdp2.set_sprite_opacity(Fxp::ONE, SpriteBank::Bank0).unwrap();
        assert_eq!(vdp2.registers().sprite_color_rate[0], 0);

        let writes = vdp2.registers().writes;
        vdp2.set_sprite_opacity(Fxp::from(1.5), SpriteBank::Bank3).unwrap();
        vdp2.set_sprite_opacity(Fxp::from(-0.5), SpriteBank::Bank3).unwrap();
        assert_eq!(vdp2.registers().writes, writes);
        assert_eq!(vdp2.registers().sprite_color_rate[3], 15);
        // O cálculo de cor da camada não muda
        assert!(vdp2.color_calc_screens().contains(ScreenFlags::SPRITE));
    }

    #[test]
    fn test_sprite_priority_and_condition() {
        let mut vdp2 = Vdp2::new(Vdp2Config::default());
        vdp2.set_sprite_priority(Priority::Layer3, SpriteBank::Bank0).unwrap();
        vdp2.set_sprite_priority(Priority::Layer4, SpriteBank::Bank1).unwrap();
        vdp2.set_sprite_color_condition(ColorCondition::PriorityEquals, Priority::Layer4)
            .unwrap();

        assert_eq!(vdp2.registers().sprite_priority[0], Some(Priority::Layer3));
        assert_eq!(vdp2.registers().sprite_priority[1], Some(Priority::Layer4));
        assert_eq!(
            vdp2.registers().sprite_color_condition,
            Some((ColorCondition::PriorityEquals, Priority::Layer4))
        );
    }

    #[test]
    fn test_position_and_scale() {
        let mut vdp2 = Vdp2::with_parts(Vdp2Config::default(), RegisterFile::new(), Cram::new(), RecordingSink::new());
        vdp2.set_position(Layer::Nbg2, Fxp::from(16.0), Fxp::from(-8.0)).unwrap();
        vdp2.set_scale(Layer::Nbg0, Fxp::from(2.0), Fxp::ONE).unwrap();

        assert_eq!(
            vdp2.registers().position[Layer::Nbg2.index()],
            (Fxp::from_raw(16 << 16), Fxp::from_raw(-8 << 16))
        );
        assert_eq!(vdp2.registers().scale[Layer::Nbg0.index()], (Fxp::from_raw(2 << 16), Fxp::ONE));

        let err = vdp2.set_scale(Layer::Nbg3, Fxp::ONE, Fxp::ONE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Hardware);
        assert!(vdp2.sink().last().unwrap().contains("NBG3 has no scaling"));
    }

    #[test]
    fn test_back_color_written_to_a1_end() {
        let mut vdp2 = Vdp2::new(Vdp2Config::default());
        vdp2.set_back_color(0x801F).unwrap();

        let address = vdp2.config().bank_base(VramBank::A1) + 0x1_FFFE;
        assert_eq!(address, 0x25E3_FFFE);
        assert_eq!(vdp2.vram().read_word(address), 0x801F);
        assert_eq!(vdp2.registers().back_color, Some((address, 0x801F)));
    }
}
