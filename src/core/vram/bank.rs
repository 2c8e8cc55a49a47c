//! Alocador linear (bump) por banco de VRAM.
//! Não há lista livre: a memória só volta inteira, no reset global.

use crate::core::config::Vdp2Config;
use crate::core::vram::{VramBank, MAX_BANK_CYCLES, MIN_BOUNDARY};
use log::{debug, warn};

/// Estado de um banco
#[derive(Debug, Clone, Copy)]
struct BankState {
    base: u32,
    top: u32,
    current: u32,
    cycles: u8,
    baseline: u8,
}

impl BankState {
    fn reset(&mut self) {
        self.current = self.base;
        self.cycles = self.baseline;
    }
}

/// Arena dos quatro bancos de VRAM
#[derive(Debug, Clone)]
pub struct BankArena {
    banks: [BankState; 4],
}

impl BankArena {
    /// Cria a arena a partir do layout da configuração
    pub fn new(config: &Vdp2Config) -> Self {
        let banks = VramBank::ALL.map(|bank| {
            let base = config.bank_base(bank);
            let baseline = config.baseline_cycles(bank).min(MAX_BANK_CYCLES);
            BankState {
                base,
                top: base + config.bank_capacity(bank),
                current: base,
                cycles: baseline,
                baseline,
            }
        });
        Self { banks }
    }

    /// Bytes livres no banco (não considera ciclos)
    pub fn get_available(&self, bank: VramBank) -> u32 {
        let state = &self.banks[bank.index()];
        state.top - state.current
    }

    /// Capacidade fixa do banco
    pub fn capacity(&self, bank: VramBank) -> u32 {
        let state = &self.banks[bank.index()];
        state.top - state.base
    }

    /// Endereço base do banco
    pub fn base(&self, bank: VramBank) -> u32 {
        self.banks[bank.index()].base
    }

    pub fn cycles_used(&self, bank: VramBank) -> u8 {
        self.banks[bank.index()].cycles
    }

    pub fn cycles_available(&self, bank: VramBank) -> u8 {
        MAX_BANK_CYCLES - self.banks[bank.index()].cycles
    }

    /// Banco que contém `addr`, se algum
    pub fn bank_of(&self, addr: u32) -> Option<VramBank> {
        VramBank::ALL
            .into_iter()
            .find(|bank| {
                let state = &self.banks[bank.index()];
                addr >= state.base && addr < state.top
            })
    }

    /// Aloca `size` bytes alinhados a `boundary` no banco, reservando `cycles`.
    ///
    /// Retorna `None` se faltar espaço ou ciclos; nesse caso o banco não muda.
    /// O preenchimento usado para alinhar fica inacessível até o reset.
    pub fn allocate(&mut self, size: u32, boundary: u32, bank: VramBank, cycles: u8) -> Option<u32> {
        if !boundary.is_power_of_two() || boundary < MIN_BOUNDARY {
            warn!("Alinhamento inválido para VRAM: {:#X}", boundary);
            return None;
        }

        let state = &mut self.banks[bank.index()];

        let misalign = state.current & (boundary - 1);
        let padding = if misalign != 0 { boundary - misalign } else { 0 };

        let end = state.current.checked_add(padding)?.checked_add(size)?;
        if end > state.top {
            return None;
        }

        if state.cycles as u32 + cycles as u32 > MAX_BANK_CYCLES as u32 {
            return None;
        }

        let address = state.current + padding;
        state.current = end;
        state.cycles += cycles;

        debug!(
            "VRAM {}: {:#X} bytes em {:08X} ({} ciclos, total {})",
            bank, size, address, cycles, state.cycles
        );

        Some(address)
    }

    /// Devolve todos os bancos à capacidade inicial
    pub fn reset(&mut self) {
        for state in self.banks.iter_mut() {
            state.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arena() -> BankArena {
        BankArena::new(&Vdp2Config::default())
    }

    #[test]
    fn test_sequential_allocations_do_not_overlap() {
        let mut arena = arena();
        let sizes = [0x40, 0x1000, 0x20, 0x800];
        let mut previous_end = 0;

        for size in sizes {
            let addr = arena.allocate(size, 32, VramBank::A1, 1).unwrap();
            assert!(addr >= previous_end);
            assert_eq!(addr % 32, 0);
            previous_end = addr + size;
        }

        assert_eq!(arena.cycles_used(VramBank::A1), 4);
        assert_eq!(arena.get_available(VramBank::A1), 0x20000 - (previous_end - 0x25E2_0000));
    }

    #[test]
    fn test_alignment_padding_is_consumed() {
        let mut arena = arena();
        let first = arena.allocate(0x20, 32, VramBank::A0, 0).unwrap();
        let second = arena.allocate(0x100, 0x2000, VramBank::A0, 0).unwrap();

        assert_eq!(first, 0x25E0_0000);
        assert_eq!(second, 0x25E0_2000);
        assert_eq!(arena.get_available(VramBank::A0), 0x20000 - 0x2100);
    }

    #[test]
    fn test_size_exhaustion_leaves_bank_untouched() {
        let mut arena = arena();
        arena.allocate(0x1F000, 32, VramBank::B0, 2).unwrap();
        let available = arena.get_available(VramBank::B0);

        assert!(arena.allocate(0x2000, 32, VramBank::B0, 1).is_none());
        assert_eq!(arena.get_available(VramBank::B0), available);
        assert_eq!(arena.cycles_used(VramBank::B0), 2);
    }

    #[test]
    fn test_cycle_budget_exhaustion() {
        let mut arena = arena();
        assert!(arena.allocate(0x100, 32, VramBank::A0, 4).is_some());
        assert!(arena.allocate(0x100, 32, VramBank::A0, 4).is_some());
        let available = arena.get_available(VramBank::A0);

        // Há espaço de sobra, mas não há ciclos
        assert!(arena.allocate(0x20, 32, VramBank::A0, 1).is_none());
        assert_eq!(arena.get_available(VramBank::A0), available);
        assert!(arena.allocate(0x20, 32, VramBank::A0, 0).is_some());
    }

    #[test]
    fn test_overlay_bank_reserves_one_cycle() {
        let mut arena = arena();
        assert_eq!(arena.cycles_used(VramBank::B1), 1);
        assert!(arena.allocate(0x20, 32, VramBank::B1, 8).is_none());
        assert!(arena.allocate(0x20, 32, VramBank::B1, 7).is_some());
    }

    #[test]
    fn test_invalid_boundary() {
        let mut arena = arena();
        assert!(arena.allocate(0x20, 48, VramBank::A0, 0).is_none());
        assert!(arena.allocate(0x20, 16, VramBank::A0, 0).is_none());
        assert_eq!(arena.get_available(VramBank::A0), 0x20000);
    }

    #[test]
    fn test_reset_restores_capacity() {
        let mut arena = arena();
        arena.allocate(0x8000, 32, VramBank::A0, 8).unwrap();
        arena.allocate(0x8000, 32, VramBank::B1, 2).unwrap();
        arena.reset();

        for bank in VramBank::ALL {
            assert_eq!(arena.get_available(bank), arena.capacity(bank));
        }
        assert_eq!(arena.cycles_used(VramBank::A0), 0);
        assert_eq!(arena.cycles_used(VramBank::B1), 1);
    }

    #[test]
    fn test_bank_of() {
        let arena = arena();
        assert_eq!(arena.bank_of(0x25E0_0000), Some(VramBank::A0));
        assert_eq!(arena.bank_of(0x25E4_1234), Some(VramBank::B0));
        // Topo reservado de B1 fica fora do alocador
        assert_eq!(arena.bank_of(0x25E7_8000), None);
        assert_eq!(arena.bank_of(0x25DF_FFFF), None);
    }
}
