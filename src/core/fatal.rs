//! Relatório de falhas fatais.
//! A sessão entrega aqui toda falha de carga ou configuração antes de abortar
//! a operação.

use log::error;

/// Destino das falhas fatais
pub trait FatalSink {
    /// Recebe a mensagem legível da falha
    fn report(&mut self, message: &str);
}

/// Sink padrão: registra com `error!` (ou entra em pânico com `halt-on-fatal`)
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl FatalSink for LogSink {
    fn report(&mut self, message: &str) {
        cfg_if::cfg_if! {
            if #[cfg(feature = "halt-on-fatal")] {
                panic!("VDP2: {}", message);
            } else {
                error!("VDP2: {}", message);
            }
        }
    }
}

/// Sink que guarda as mensagens, para testes e ferramentas
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    pub messages: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<&str> {
        self.messages.last().map(String::as_str)
    }
}

impl FatalSink for RecordingSink {
    fn report(&mut self, message: &str) {
        error!("VDP2: {}", message);
        self.messages.push(message.to_string());
    }
}
