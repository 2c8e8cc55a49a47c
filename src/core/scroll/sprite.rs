//! Camada de sprites vista pelo VDP2.
//! Os sprites vêm do framebuffer do VDP1; aqui só se escolhem os bancos de
//! taxa de cor e de prioridade que cada sprite referencia, e a condição de
//! cálculo de cor.

/// Um dos 8 registradores de taxa de cor ou de prioridade dos sprites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SpriteBank {
    #[default]
    Bank0,
    Bank1,
    Bank2,
    Bank3,
    Bank4,
    Bank5,
    Bank6,
    Bank7,
}

impl SpriteBank {
    pub const ALL: [SpriteBank; 8] = [
        SpriteBank::Bank0,
        SpriteBank::Bank1,
        SpriteBank::Bank2,
        SpriteBank::Bank3,
        SpriteBank::Bank4,
        SpriteBank::Bank5,
        SpriteBank::Bank6,
        SpriteBank::Bank7,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Número de tela usado pela interface de registradores (pares trocados)
    pub fn screen_id(self) -> i16 {
        match self {
            SpriteBank::Bank0 => -7,
            SpriteBank::Bank1 => -8,
            SpriteBank::Bank2 => -5,
            SpriteBank::Bank3 => -6,
            SpriteBank::Bank4 => -3,
            SpriteBank::Bank5 => -4,
            SpriteBank::Bank6 => -1,
            SpriteBank::Bank7 => -2,
        }
    }
}

impl std::fmt::Display for SpriteBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SPR{}", self.index())
    }
}

/// Quando o cálculo de cor se aplica a um sprite, comparando sua prioridade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorCondition {
    /// Prioridade menor ou igual ao valor de teste
    PriorityLessThan,
    PriorityEquals,
    /// Prioridade maior ou igual ao valor de teste
    PriorityGreaterThan,
}

impl ColorCondition {
    pub fn register_value(self) -> u16 {
        match self {
            ColorCondition::PriorityLessThan => 0,
            ColorCondition::PriorityEquals => 1,
            ColorCondition::PriorityGreaterThan => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_screen_ids() {
        assert_eq!(SpriteBank::Bank0.screen_id(), -7);
        assert_eq!(SpriteBank::Bank1.screen_id(), -8);
        assert_eq!(SpriteBank::Bank7.screen_id(), -2);

        let mut ids: Vec<i16> = SpriteBank::ALL.iter().map(|b| b.screen_id()).collect();
        ids.sort();
        assert_eq!(ids, (-8..=-1).collect::<Vec<_>>());
    }

    #[test]
    fn test_condition_values() {
        assert_eq!(ColorCondition::PriorityLessThan.register_value(), 0);
        assert_eq!(ColorCondition::PriorityEquals.register_value(), 1);
        assert_eq!(ColorCondition::PriorityGreaterThan.register_value(), 2);
        assert_eq!(SpriteBank::Bank3.to_string(), "SPR3");
    }
}
