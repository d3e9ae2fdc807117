use tracing::debug;

use crate::{labels, CharacterId, SkillNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAssistWindow {
    pub char_id: CharacterId,
    pub expires_tick: u64,
}

/// Quick-assist availability. A triggering action arms the next character
/// in roster order; that character's quick-assist action consumes it.
#[derive(Debug, Clone)]
pub struct QuickAssistSystem {
    order: Vec<CharacterId>,
    window_ticks: u64,
    armed: Option<QuickAssistWindow>,
    triggered: u32,
    consumed: u32,
}

impl QuickAssistSystem {
    pub fn new(order: Vec<CharacterId>, window_ticks: u64) -> Self {
        Self {
            order,
            window_ticks,
            armed: None,
            triggered: 0,
            consumed: 0,
        }
    }

    pub fn update(&mut self, tick: u64, node: &SkillNode) {
        if self.armed.is_some_and(|w| w.expires_tick <= tick) {
            self.armed = None;
        }
        if node.has_label(labels::QUICK_ASSIST)
            && self.armed.is_some_and(|w| w.char_id == node.char_id())
        {
            self.armed = None;
            self.consumed += 1;
            debug!(target: "zsim::preload", tick, char_id = %node.char_id(), "quick assist consumed");
        }
        if node.has_label(labels::TRIGGER_QUICK_ASSIST) {
            if let Some(next) = self.next_after(node.char_id()) {
                self.armed = Some(QuickAssistWindow {
                    char_id: next,
                    expires_tick: tick + self.window_ticks,
                });
                self.triggered += 1;
                debug!(target: "zsim::preload", tick, char_id = %next, "quick assist armed");
            }
        }
    }

    pub fn is_ready(&self, char_id: CharacterId, tick: u64) -> bool {
        self.armed
            .is_some_and(|w| w.char_id == char_id && w.expires_tick > tick)
    }

    pub fn armed(&self) -> Option<QuickAssistWindow> {
        self.armed
    }

    pub fn triggered(&self) -> u32 {
        self.triggered
    }

    pub fn consumed(&self) -> u32 {
        self.consumed
    }

    fn next_after(&self, char_id: CharacterId) -> Option<CharacterId> {
        if self.order.len() < 2 {
            return None;
        }
        let pos = self.order.iter().position(|&c| c == char_id)?;
        Some(self.order[(pos + 1) % self.order.len()])
    }
}
