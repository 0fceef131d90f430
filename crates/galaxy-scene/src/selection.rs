//! The memory currently shown in the modal.

use galaxy_core::Memory;

/// Holds at most one selected memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySelection {
    selected: Option<Memory>,
}

impl MemorySelection {
    /// Select a memory, replacing any previous selection.
    pub fn select(&mut self, memory: Memory) {
        self.selected = Some(memory);
    }

    /// Clear the selection, returning what was shown.
    pub fn close(&mut self) -> Option<Memory> {
        self.selected.take()
    }

    pub fn current(&self) -> Option<&Memory> {
        self.selected.as_ref()
    }

    pub fn is_open(&self) -> bool {
        self.selected.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_replaces_and_close_clears() {
        let mut selection = MemorySelection::default();
        assert!(!selection.is_open());

        selection.select(Memory::new("a.jpeg", "first"));
        selection.select(Memory::new("b.jpeg", "second"));
        assert_eq!(selection.current().map(|m| m.message.as_str()), Some("second"));

        assert_eq!(selection.close(), Some(Memory::new("b.jpeg", "second")));
        assert_eq!(selection.current(), None);
        assert_eq!(selection.close(), None);
    }
}
