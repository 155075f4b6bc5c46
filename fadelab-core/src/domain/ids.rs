use serde::{Deserialize, Serialize};
use std::fmt;

/// Sequential order ID, unique within one paper book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SIM-{}", self.0)
    }
}

/// Monotonic generator for order IDs.
#[derive(Debug, Default)]
pub struct IdGen {
    next: u64,
}

impl IdGen {
    pub fn next_order(&mut self) -> OrderId {
        let id = OrderId(self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_sequential() {
        let mut gen = IdGen::default();
        assert_eq!(gen.next_order(), OrderId(0));
        assert_eq!(gen.next_order(), OrderId(1));
        assert_eq!(gen.next_order(), OrderId(2));
    }

    #[test]
    fn id_display_is_prefixed() {
        assert_eq!(OrderId(7).to_string(), "SIM-7");
    }
}
