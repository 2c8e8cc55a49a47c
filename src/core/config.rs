//! Configuração fixa da sessão VDP2.
//! Definida na criação da sessão e nunca alterada depois.

use crate::core::vram::{VramBank, BANK_SIZE, VRAM_BASE};

/// Parâmetros fixos do layout da VRAM e das reservas do overlay de texto
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vdp2Config {
    /// Endereço do início do banco A0
    pub vram_base: u32,
    /// Capacidade em bytes de cada banco (A0, A1, B0, B1)
    pub bank_capacity: [u32; 4],
    /// Reserva recursos para o overlay de texto (NBG3)
    pub reserve_overlay: bool,
    /// Banco onde o overlay mantém sua fonte e mapa
    pub overlay_bank: VramBank,
    /// Ciclos fixados permanentemente no banco do overlay
    pub overlay_cycles: u8,
}

impl Default for Vdp2Config {
    fn default() -> Self {
        Self {
            vram_base: VRAM_BASE,
            // O topo de B1 fica fora do alocador: tabela de rotação e fonte ASCII
            bank_capacity: [BANK_SIZE, BANK_SIZE, BANK_SIZE, 0x18000],
            reserve_overlay: true,
            overlay_bank: VramBank::B1,
            overlay_cycles: 1,
        }
    }
}

impl Vdp2Config {
    /// Configuração sem overlay de texto: todos os bancos começam livres
    pub fn without_overlay() -> Self {
        Self {
            reserve_overlay: false,
            ..Self::default()
        }
    }

    /// Ciclos que o banco já tem ocupados logo após um reset
    pub fn baseline_cycles(&self, bank: VramBank) -> u8 {
        if self.reserve_overlay && bank == self.overlay_bank {
            self.overlay_cycles
        } else {
            0
        }
    }

    /// Endereço base de um banco
    pub fn bank_base(&self, bank: VramBank) -> u32 {
        self.vram_base + BANK_SIZE * bank.index() as u32
    }

    /// Capacidade de um banco, limitada ao tamanho físico
    pub fn bank_capacity(&self, bank: VramBank) -> u32 {
        self.bank_capacity[bank.index()].min(BANK_SIZE)
    }
}
