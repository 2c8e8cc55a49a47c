//! Memória de vídeo do VDP2.
//! Quatro bancos de 128KB (A0, A1, B0, B1), cada um com orçamento próprio
//! de bytes e de ciclos de acesso por pixel.

pub mod bank;
pub mod placement;

// Re-exportações para facilitar o uso
pub use bank::BankArena;
pub use placement::{auto_allocate_cell, auto_allocate_map, cell_cycles, map_allocation, LayerRole, MapAllocation};

use log::warn;

/// Endereço do banco A0 no barramento do SH-2
pub const VRAM_BASE: u32 = 0x25E0_0000;

/// Tamanho total da VRAM (512KB)
pub const VRAM_SIZE: usize = 0x8_0000;

/// Tamanho físico de cada banco
pub const BANK_SIZE: u32 = 0x2_0000;

/// Ciclos de acesso por banco em uma varredura
pub const MAX_BANK_CYCLES: u8 = 8;

/// Menor alinhamento aceito para qualquer dado do VDP2
pub const MIN_BOUNDARY: u32 = 32;

/// Bancos de VRAM disponíveis para alocação
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VramBank {
    A0 = 0,
    A1 = 1,
    B0 = 2,
    B1 = 3,
}

impl VramBank {
    /// Todos os bancos, na ordem dos índices
    pub const ALL: [VramBank; 4] = [VramBank::A0, VramBank::A1, VramBank::B0, VramBank::B1];

    pub fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for VramBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VramBank::A0 => write!(f, "A0"),
            VramBank::A1 => write!(f, "A1"),
            VramBank::B0 => write!(f, "B0"),
            VramBank::B1 => write!(f, "B1"),
        }
    }
}

/// Imagem da VRAM como o SH-2 a vê (big-endian)
pub struct Vram {
    base: u32,
    data: Vec<u8>,
}

impl Vram {
    /// Cria uma VRAM zerada
    pub fn new(base: u32) -> Self {
        Self {
            base,
            data: vec![0; VRAM_SIZE],
        }
    }

    fn offset(&self, addr: u32, len: usize) -> Option<usize> {
        let offset = addr.checked_sub(self.base)? as usize;
        if offset.checked_add(len)? <= self.data.len() {
            Some(offset)
        } else {
            None
        }
    }

    /// Verdadeiro se `[addr, addr + len)` cabe inteiro na VRAM
    pub fn contains(&self, addr: u32, len: usize) -> bool {
        self.offset(addr, len).is_some()
    }

    /// Copia bytes a partir de `addr`; retorna false se sair da VRAM
    pub fn write_bytes(&mut self, addr: u32, bytes: &[u8]) -> bool {
        match self.offset(addr, bytes.len()) {
            Some(offset) => {
                self.data[offset..offset + bytes.len()].copy_from_slice(bytes);
                true
            }
            None => {
                warn!("Escrita fora da VRAM: {:08X} (+{:X})", addr, bytes.len());
                false
            }
        }
    }

    /// Escreve uma palavra (16-bit)
    pub fn write_word(&mut self, addr: u32, value: u16) -> bool {
        self.write_bytes(addr, &value.to_be_bytes())
    }

    /// Escreve uma palavra longa (32-bit)
    pub fn write_long(&mut self, addr: u32, value: u32) -> bool {
        self.write_bytes(addr, &value.to_be_bytes())
    }

    /// Lê uma palavra (16-bit); 0xFFFF fora da VRAM
    pub fn read_word(&self, addr: u32) -> u16 {
        match self.offset(addr, 2) {
            Some(offset) => u16::from_be_bytes([self.data[offset], self.data[offset + 1]]),
            None => 0xFFFF,
        }
    }

    /// Lê uma palavra longa (32-bit); 0xFFFFFFFF fora da VRAM
    pub fn read_long(&self, addr: u32) -> u32 {
        match self.offset(addr, 4) {
            Some(offset) => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(&self.data[offset..offset + 4]);
                u32::from_be_bytes(raw)
            }
            None => 0xFFFF_FFFF,
        }
    }

    /// Fatia de `len` bytes a partir de `addr`
    pub fn slice(&self, addr: u32, len: usize) -> Option<&[u8]> {
        self.offset(addr, len).map(|offset| &self.data[offset..offset + len])
    }
}
