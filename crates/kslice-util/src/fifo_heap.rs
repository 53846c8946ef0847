use std::collections::BTreeSet;

/// Priority queue that pops the smallest item first, breaking ties by insertion order.
#[derive(Clone, Debug)]
pub struct FifoHeap<T> {
    seq: usize,
    heap: BTreeSet<(T, usize)>,
}

impl<T: Ord> Default for FifoHeap<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Ord> FifoHeap<T> {
    pub fn new() -> Self {
        FifoHeap {
            seq: usize::MIN,
            heap: BTreeSet::new(),
        }
    }

    pub fn push(&mut self, val: T) {
        self.seq = self.seq.wrapping_add(1);
        self.heap.insert((val, self.seq));
    }

    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop_first().map(|(val, _)| val)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

impl<T: Ord> Extend<T> for FifoHeap<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for i in iter {
            self.push(i);
        }
    }
}

impl<T: Ord> FromIterator<T> for FifoHeap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut ret = FifoHeap::new();
        ret.extend(iter);
        ret
    }
}
