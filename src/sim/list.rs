//! Streamed object list
//!
//! Insertion-ordered storage for streamed world objects with a persistent
//! cursor for sweep-and-cull traversal. Entries live in a slot arena and are
//! linked by index; freed slots are recycled through a free list, so append,
//! removal at the cursor and in-place replacement are all O(1) and the cursor
//! can never dangle.
//!
//! Typical sweep:
//! ```ignore
//! list.reset_pointer();
//! for _ in 0..list.len() {
//!     if list.get_current_node()?.expired(t) {
//!         list.remove_current_node()?;
//!     } else {
//!         list.advance_node()?;
//!     }
//! }
//! ```

use super::error::{Result, SimError};

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Ordered list with a wrapping cursor
#[derive(Debug, Clone)]
pub struct StreamedList<T> {
    slots: Vec<Option<Entry<T>>>,
    free_list: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    cursor: Option<usize>,
    len: usize,
}

impl<T> Default for StreamedList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StreamedList<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            head: None,
            tail: None,
            cursor: None,
            len: 0,
        }
    }

    /// Number of live entries
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append at the tail. The cursor only moves if the list was empty.
    pub fn push(&mut self, value: T) {
        let index = self.alloc(Entry {
            value,
            prev: self.tail,
            next: None,
        });

        match self.tail {
            Some(tail) => self.entry_mut(tail).next = Some(index),
            None => {
                self.head = Some(index);
                self.cursor = Some(index);
            }
        }
        self.tail = Some(index);
        self.len += 1;
    }

    /// Return the entry at the cursor, then advance (wrapping tail -> head)
    pub fn next_node(&mut self) -> Result<&T> {
        let current = self.cursor.ok_or(SimError::EmptyList { op: "next_node" })?;
        self.cursor = self.successor(current);
        Ok(&self.entry(current).value)
    }

    /// Move the cursor back to the first entry
    pub fn reset_pointer(&mut self) {
        self.cursor = self.head;
    }

    pub fn get_current_node(&self) -> Result<&T> {
        let current = self.cursor.ok_or(SimError::EmptyList {
            op: "get_current_node",
        })?;
        Ok(&self.entry(current).value)
    }

    pub fn get_current_node_mut(&mut self) -> Result<&mut T> {
        let current = self.cursor.ok_or(SimError::EmptyList {
            op: "get_current_node_mut",
        })?;
        Ok(&mut self.entry_mut(current).value)
    }

    /// Advance the cursor without reading (wrapping tail -> head)
    pub fn advance_node(&mut self) -> Result<()> {
        let current = self.cursor.ok_or(SimError::EmptyList { op: "advance_node" })?;
        self.cursor = self.successor(current);
        Ok(())
    }

    /// Remove the first entry (FIFO eviction)
    ///
    /// A cursor sitting on the head moves to the new head.
    pub fn pop(&mut self) -> Result<T> {
        let head = self.head.ok_or(SimError::EmptyList { op: "pop" })?;
        let (value, next) = self.unlink(head);
        if self.cursor == Some(head) {
            self.cursor = next;
        }
        Ok(value)
    }

    /// Remove the entry at the cursor and move the cursor to its successor
    ///
    /// Removing the tail wraps the cursor to the head; emptying the list
    /// clears it.
    pub fn remove_current_node(&mut self) -> Result<T> {
        let current = self.cursor.ok_or(SimError::EmptyList {
            op: "remove_current_node",
        })?;
        let (value, next) = self.unlink(current);
        self.cursor = next.or(self.head);
        Ok(value)
    }

    /// Swap a new value into the cursor's position, returning the old one
    ///
    /// Length, neighbours and the cursor are unchanged.
    pub fn replace_node(&mut self, value: T) -> Result<T> {
        let current = self.cursor.ok_or(SimError::EmptyList { op: "replace_node" })?;
        Ok(std::mem::replace(&mut self.entry_mut(current).value, value))
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_list.clear();
        self.head = None;
        self.tail = None;
        self.cursor = None;
        self.len = 0;
    }

    /// Front-to-back traversal that leaves the cursor alone
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            next: self.head,
            remaining: self.len,
        }
    }

    fn alloc(&mut self, entry: Entry<T>) -> usize {
        if let Some(index) = self.free_list.pop() {
            self.slots[index] = Some(entry);
            index
        } else {
            self.slots.push(Some(entry));
            self.slots.len() - 1
        }
    }

    /// Detach a live slot, returning its value and former successor
    fn unlink(&mut self, index: usize) -> (T, Option<usize>) {
        let Some(entry) = self.slots[index].take() else {
            unreachable!("unlink of free slot {index}");
        };

        match entry.prev {
            Some(prev) => self.entry_mut(prev).next = entry.next,
            None => self.head = entry.next,
        }
        match entry.next {
            Some(next) => self.entry_mut(next).prev = entry.prev,
            None => self.tail = entry.prev,
        }

        self.free_list.push(index);
        self.len -= 1;
        (entry.value, entry.next)
    }

    #[inline]
    fn successor(&self, index: usize) -> Option<usize> {
        self.entry(index).next.or(self.head)
    }

    #[inline]
    fn entry(&self, index: usize) -> &Entry<T> {
        match &self.slots[index] {
            Some(entry) => entry,
            None => unreachable!("link to free slot {index}"),
        }
    }

    #[inline]
    fn entry_mut(&mut self, index: usize) -> &mut Entry<T> {
        match &mut self.slots[index] {
            Some(entry) => entry,
            None => unreachable!("link to free slot {index}"),
        }
    }

    #[cfg(test)]
    fn cursor_is_valid(&self) -> bool {
        match self.cursor {
            None => self.len == 0,
            Some(index) => self.len > 0 && matches!(self.slots.get(index), Some(Some(_))),
        }
    }
}

/// Borrowing front-to-back iterator
pub struct Iter<'a, T> {
    list: &'a StreamedList<T>,
    next: Option<usize>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let index = self.next?;
        let entry = self.list.entry(index);
        self.next = entry.next;
        self.remaining -= 1;
        Some(&entry.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a StreamedList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Iter<'a, T> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn list_of(values: &[u32]) -> StreamedList<u32> {
        let mut list = StreamedList::new();
        for &v in values {
            list.push(v);
        }
        list
    }

    fn contents(list: &StreamedList<u32>) -> Vec<u32> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_push_keeps_insertion_order() {
        let list = list_of(&[1, 2, 3]);
        assert_eq!(list.len(), 3);
        assert_eq!(contents(&list), vec![1, 2, 3]);
        assert_eq!(*list.get_current_node().unwrap(), 1);
    }

    #[test]
    fn test_next_node_wraps_and_resumes() {
        let mut list = list_of(&[1, 2, 3]);
        assert_eq!(*list.next_node().unwrap(), 1);
        assert_eq!(*list.next_node().unwrap(), 2);

        // A second pass picks up where the first stopped
        let seen: Vec<u32> = (0..3).map(|_| *list.next_node().unwrap()).collect();
        assert_eq!(seen, vec![3, 1, 2]);

        list.reset_pointer();
        assert_eq!(*list.next_node().unwrap(), 1);
    }

    #[test]
    fn test_empty_list_reports_precondition() {
        let mut list: StreamedList<u32> = StreamedList::new();
        assert!(matches!(
            list.next_node(),
            Err(SimError::EmptyList { op: "next_node" })
        ));
        assert!(list.get_current_node().is_err());
        assert!(list.advance_node().is_err());
        assert!(list.pop().is_err());
        assert!(list.remove_current_node().is_err());
        assert!(list.replace_node(7).is_err());
        assert_eq!(list.len(), 0);
    }

    #[test]
    fn test_remove_head_moves_cursor_to_new_head() {
        let mut list = list_of(&[1, 2, 3]);
        assert_eq!(list.remove_current_node().unwrap(), 1);
        assert_eq!(*list.get_current_node().unwrap(), 2);
        assert_eq!(contents(&list), vec![2, 3]);
    }

    #[test]
    fn test_remove_middle_moves_cursor_forward() {
        let mut list = list_of(&[1, 2, 3]);
        list.advance_node().unwrap();
        assert_eq!(list.remove_current_node().unwrap(), 2);
        assert_eq!(*list.get_current_node().unwrap(), 3);
        assert_eq!(contents(&list), vec![1, 3]);
    }

    #[test]
    fn test_remove_tail_wraps_cursor() {
        let mut list = list_of(&[1, 2, 3]);
        list.advance_node().unwrap();
        list.advance_node().unwrap();
        assert_eq!(list.remove_current_node().unwrap(), 3);
        assert_eq!(*list.get_current_node().unwrap(), 1);

        // Tail link must be repaired so pushes land after 2
        list.push(4);
        assert_eq!(contents(&list), vec![1, 2, 4]);
    }

    #[test]
    fn test_remove_last_entry_clears_cursor() {
        let mut list = list_of(&[9]);
        assert_eq!(list.remove_current_node().unwrap(), 9);
        assert!(list.is_empty());
        assert!(list.get_current_node().is_err());

        list.push(5);
        assert_eq!(*list.get_current_node().unwrap(), 5);
    }

    #[test]
    fn test_pop_keeps_cursor_elsewhere() {
        let mut list = list_of(&[1, 2, 3]);
        list.advance_node().unwrap();
        list.advance_node().unwrap();
        assert_eq!(list.pop().unwrap(), 1);
        assert_eq!(*list.get_current_node().unwrap(), 3);
    }

    #[test]
    fn test_sweep_and_cull() {
        let mut list = list_of(&[1, 2, 3, 4, 5, 6]);
        list.reset_pointer();
        for _ in 0..list.len() {
            if *list.get_current_node().unwrap() % 2 == 0 {
                list.remove_current_node().unwrap();
            } else {
                list.advance_node().unwrap();
            }
        }
        assert_eq!(contents(&list), vec![1, 3, 5]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let mut list = list_of(&[1, 2, 3]);
        list.advance_node().unwrap();
        assert_eq!(list.replace_node(20).unwrap(), 2);
        assert_eq!(list.len(), 3);
        assert_eq!(*list.get_current_node().unwrap(), 20);
        assert_eq!(contents(&list), vec![1, 20, 3]);
    }

    #[test]
    fn test_freed_slots_are_reused() {
        let mut list = list_of(&[1, 2, 3]);
        list.pop().unwrap();
        list.pop().unwrap();
        list.push(4);
        list.push(5);
        assert_eq!(list.slots.len(), 3);
        assert_eq!(contents(&list), vec![3, 4, 5]);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Push(u32),
        Next,
        Advance,
        Remove,
        Pop,
        Replace(u32),
        Reset,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => any::<u32>().prop_map(Op::Push),
            1 => Just(Op::Next),
            1 => Just(Op::Advance),
            2 => Just(Op::Remove),
            1 => Just(Op::Pop),
            1 => any::<u32>().prop_map(Op::Replace),
            1 => Just(Op::Reset),
        ]
    }

    /// Reference model: a Vec plus a cursor position
    #[derive(Default)]
    struct Model {
        items: Vec<u32>,
        pos: Option<usize>,
    }

    impl Model {
        fn step(&mut self, op: &Op) {
            let len = self.items.len();
            match *op {
                Op::Push(v) => {
                    self.items.push(v);
                    if len == 0 {
                        self.pos = Some(0);
                    }
                }
                Op::Next | Op::Advance => {
                    if let Some(p) = self.pos {
                        self.pos = Some((p + 1) % len);
                    }
                }
                Op::Remove => {
                    if let Some(p) = self.pos {
                        self.items.remove(p);
                        let left = self.items.len();
                        self.pos = (left > 0).then(|| if p < left { p } else { 0 });
                    }
                }
                Op::Pop => {
                    if let Some(p) = self.pos {
                        self.items.remove(0);
                        let left = self.items.len();
                        self.pos = (left > 0).then(|| p.saturating_sub(1));
                    }
                }
                Op::Replace(v) => {
                    if let Some(p) = self.pos {
                        self.items[p] = v;
                    }
                }
                Op::Reset => {
                    self.pos = (len > 0).then_some(0);
                }
            }
        }
    }

    fn apply(list: &mut StreamedList<u32>, op: &Op) {
        let was_empty = list.is_empty();
        let outcome = match *op {
            Op::Push(v) => {
                list.push(v);
                Ok(())
            }
            Op::Next => list.next_node().map(|_| ()),
            Op::Advance => list.advance_node(),
            Op::Remove => list.remove_current_node().map(|_| ()),
            Op::Pop => list.pop().map(|_| ()),
            Op::Replace(v) => list.replace_node(v).map(|_| ()),
            Op::Reset => {
                list.reset_pointer();
                Ok(())
            }
        };
        // Only empty-list misuse may fail
        assert_eq!(outcome.is_err(), was_empty && !matches!(op, Op::Push(_) | Op::Reset));
    }

    proptest! {
        #[test]
        fn prop_cursor_always_valid(ops in prop::collection::vec(op_strategy(), 0..200)) {
            let mut list = StreamedList::new();
            let mut model = Model::default();
            for op in &ops {
                apply(&mut list, op);
                model.step(op);

                prop_assert!(list.cursor_is_valid());
                prop_assert_eq!(list.len(), model.items.len());
                prop_assert_eq!(contents(&list), model.items.clone());
                match model.pos {
                    Some(p) => prop_assert_eq!(*list.get_current_node().unwrap(), model.items[p]),
                    None => prop_assert!(list.get_current_node().is_err()),
                }
            }
        }

        #[test]
        fn prop_full_sweep_visits_each_once(values in prop::collection::vec(any::<u32>(), 1..64), spin in 0usize..64) {
            let mut list = list_of(&values);
            for _ in 0..spin {
                list.advance_node().unwrap();
            }
            list.reset_pointer();
            let seen: Vec<u32> = (0..list.len()).map(|_| *list.next_node().unwrap()).collect();
            prop_assert_eq!(seen, values);
        }

        #[test]
        fn prop_replace_preserves_ordinal(values in prop::collection::vec(any::<u32>(), 1..64), at in any::<prop::sample::Index>()) {
            let mut list = list_of(&values);
            let ordinal = at.index(values.len());
            list.reset_pointer();
            for _ in 0..ordinal {
                list.advance_node().unwrap();
            }
            list.replace_node(u32::MAX).unwrap();
            prop_assert_eq!(list.len(), values.len());

            let mut expected = values.clone();
            expected[ordinal] = u32::MAX;
            list.reset_pointer();
            let seen: Vec<u32> = (0..list.len()).map(|_| *list.next_node().unwrap()).collect();
            prop_assert_eq!(seen, expected);
        }
    }
}
