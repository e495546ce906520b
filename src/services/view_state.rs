// src/services/view_state.rs

use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

/// Senha de uma leitura em andamento. Gerações crescem na ordem de emissão.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
pub struct ViewSnapshot<T> {
    pub phase: LoadPhase,
    pub data: T,
    pub generation: u64,
}

struct Slot<T> {
    issued: u64,
    applied: u64,
    phase: LoadPhase,
    data: T,
}

/// Cópia em memória da lista de uma tela (painel, contas a pagar).
///
/// Uma resposta só é aplicada se for mais nova que a última aplicada:
/// vence quem foi *pedido* por último, não quem chegou por último.
/// Resposta obsoleta é descartada em silêncio.
#[derive(Clone)]
pub struct ViewState<T> {
    slot: Arc<RwLock<Slot<T>>>,
}

impl<T: Clone + Default> Default for ViewState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Default> ViewState<T> {
    pub fn new() -> Self {
        Self {
            slot: Arc::new(RwLock::new(Slot {
                issued: 0,
                applied: 0,
                phase: LoadPhase::Idle,
                data: T::default(),
            })),
        }
    }

    pub async fn begin(&self) -> Ticket {
        let mut slot = self.slot.write().await;
        slot.issued += 1;
        slot.phase = LoadPhase::Loading;
        Ticket(slot.issued)
    }

    /// Aplica o resultado de uma leitura. Retorna `false` se ela ficou obsoleta.
    pub async fn complete(&self, ticket: Ticket, data: T) -> bool {
        let mut slot = self.slot.write().await;
        if ticket.0 <= slot.applied {
            return false;
        }
        slot.applied = ticket.0;
        slot.data = data;
        if ticket.0 == slot.issued {
            slot.phase = LoadPhase::Loaded;
        }
        true
    }

    /// Falha de leitura: a lista anterior continua valendo.
    /// Só a leitura mais recente pode marcar a tela como falha.
    pub async fn fail(&self, ticket: Ticket, error: String) -> bool {
        let mut slot = self.slot.write().await;
        if ticket.0 != slot.issued || ticket.0 <= slot.applied {
            return false;
        }
        slot.phase = LoadPhase::Failed(error);
        true
    }

    /// Ajuste local depois de uma mutação (ex.: remover a conta paga).
    ///
    /// Conta como escrita nova: leituras que já estavam em voo ficam obsoletas.
    /// Não faz nada se a tela nunca carregou.
    pub async fn reconcile<F>(&self, update: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let mut slot = self.slot.write().await;
        if slot.applied == 0 {
            return false;
        }
        slot.issued += 1;
        slot.applied = slot.issued;
        update(&mut slot.data);
        slot.phase = LoadPhase::Loaded;
        true
    }

    pub async fn current(&self) -> T {
        self.slot.read().await.data.clone()
    }

    pub async fn snapshot(&self) -> ViewSnapshot<T> {
        let slot = self.slot.read().await;
        ViewSnapshot {
            phase: slot.phase.clone(),
            data: slot.data.clone(),
            generation: slot.applied,
        }
    }
}
