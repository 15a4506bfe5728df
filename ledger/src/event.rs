//! Events emitted by the ledger for subscribers.

use rayls_types::{Principal, TokenAmount};

/// Ledger events that observers can subscribe to via the [`EventBus`].
///
/// `Transfer` covers every supply movement: a null `from` marks freshly
/// minted supply (including the genesis credit) and a null `to` marks
/// burned supply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TokenEvent {
    /// Tokens moved between principals, were minted, or were burned.
    Transfer {
        from: Principal,
        to: Principal,
        amount: TokenAmount,
    },
    /// An owner set a spender's allowance to an absolute amount.
    Approval {
        owner: Principal,
        spender: Principal,
        amount: TokenAmount,
    },
}

/// Synchronous fan-out event bus for ledger events.
///
/// Listeners are invoked inline on the emitting thread; keep handlers fast
/// to avoid stalling operation processing.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&TokenEvent) + Send + Sync>>,
}

// Listeners are opaque closures; report only how many are registered.
impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&TokenEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &TokenEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    fn test_principal(n: u8) -> Principal {
        Principal::new([n; 20])
    }

    #[test]
    fn emit_calls_all_listeners() {
        let counter = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let c1 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        }));

        let c2 = Arc::clone(&counter);
        bus.subscribe(Box::new(move |_| {
            c2.fetch_add(10, Ordering::SeqCst);
        }));

        let event = TokenEvent::Transfer {
            from: test_principal(1),
            to: test_principal(2),
            amount: TokenAmount::new(100),
        };
        bus.emit(&event);

        assert_eq!(counter.load(Ordering::SeqCst), 11);
    }

    #[test]
    fn emit_with_no_listeners_is_noop() {
        let bus = EventBus::new();
        let event = TokenEvent::Approval {
            owner: test_principal(1),
            spender: test_principal(2),
            amount: TokenAmount::ZERO,
        };
        bus.emit(&event); // should not panic
    }

    #[test]
    fn listener_receives_correct_event_variant() {
        let saw_transfer = Arc::new(AtomicUsize::new(0));
        let saw_approval = Arc::new(AtomicUsize::new(0));
        let mut bus = EventBus::new();

        let st = Arc::clone(&saw_transfer);
        let sa = Arc::clone(&saw_approval);
        bus.subscribe(Box::new(move |event| match event {
            TokenEvent::Transfer { .. } => {
                st.fetch_add(1, Ordering::SeqCst);
            }
            TokenEvent::Approval { .. } => {
                sa.fetch_add(1, Ordering::SeqCst);
            }
        }));

        bus.emit(&TokenEvent::Transfer {
            from: test_principal(1),
            to: test_principal(2),
            amount: TokenAmount::new(1),
        });
        bus.emit(&TokenEvent::Approval {
            owner: test_principal(1),
            spender: test_principal(3),
            amount: TokenAmount::new(2),
        });

        assert_eq!(saw_transfer.load(Ordering::SeqCst), 1);
        assert_eq!(saw_approval.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn default_creates_empty_bus() {
        let bus = EventBus::default();
        assert!(bus.listeners.is_empty());
    }
}
