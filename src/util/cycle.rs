// SPDX-License-Identifier: GPL-3.0-or-later
/// An ordered, non-empty list with a cursor that wraps back to the start after the last entry.
///
/// The list is fixed once created; only the cursor moves.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Cycle<T> {
    items: Vec<T>,
    index: usize,
}

impl<T> Cycle<T> {
    /// Create a cycle positioned at the first item. Returns `None` for an empty list.
    pub(crate) fn new(items: Vec<T>) -> Option<Self> {
        if items.is_empty() {
            None
        } else {
            Some(Self { items, index: 0 })
        }
    }

    pub(crate) fn current(&self) -> &T {
        &self.items[self.index]
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    /// Move to the next item, wrapping to the first after the last.
    pub(crate) fn advance(&mut self) -> &T {
        self.index = (self.index + 1) % self.items.len();
        self.current()
    }
}

#[cfg(test)]
mod test {
    use super::Cycle;

    #[test]
    fn empty() {
        assert!(Cycle::<u8>::new(Vec::new()).is_none());
    }

    #[test]
    fn wraps() {
        let mut cycle = Cycle::new(vec!['a', 'b', 'c']).unwrap();
        assert_eq!(*cycle.current(), 'a');
        assert_eq!(*cycle.advance(), 'b');
        assert_eq!(*cycle.advance(), 'c');
        assert_eq!(*cycle.advance(), 'a');
        assert_eq!(cycle.index(), 0);
    }

    #[test]
    fn full_lap_returns_to_start() {
        let mut cycle = Cycle::new((0..7).collect::<Vec<_>>()).unwrap();
        cycle.advance();
        cycle.advance();
        for _ in 0..cycle.len() {
            cycle.advance();
        }
        assert_eq!(cycle.index(), 2);
    }

    #[test]
    fn single_item() {
        let mut cycle = Cycle::new(vec![42]).unwrap();
        assert_eq!(*cycle.advance(), 42);
        assert_eq!(cycle.index(), 0);
    }
}
