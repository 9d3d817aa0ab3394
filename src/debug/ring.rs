/// Fixed-capacity circular buffer. Pre-allocated, no heap allocs after init.
pub struct RingBuffer<T> {
    buf: Vec<T>,
    capacity: usize,
    head: usize,
    len: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// `capacity` must be non-zero.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            buf: vec![T::default(); capacity],
            capacity,
            head: 0,
            len: 0,
        }
    }

    pub fn push(&mut self, value: T) {
        self.buf[self.head] = value;
        self.head = (self.head + 1) % self.capacity;
        if self.len < self.capacity {
            self.len += 1;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        let start = if self.len < self.capacity {
            0
        } else {
            self.head
        };
        let cap = self.capacity;
        let len = self.len;
        (0..len).map(move |i| &self.buf[(start + i) % cap])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_and_keeps_newest() {
        let mut ring = RingBuffer::new(3);
        for v in 1..=5u32 {
            ring.push(v);
        }
        assert_eq!(ring.len(), 3);
        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![3, 4, 5]);
    }

    #[test]
    fn partial_fill_in_order() {
        let mut ring = RingBuffer::new(4);
        assert!(ring.is_empty());
        ring.push(1.5f64);
        ring.push(2.5);
        assert_eq!(ring.iter().copied().collect::<Vec<_>>(), vec![1.5, 2.5]);
    }
}
