use std::fmt;

/// Fixed-capacity ring that overwrites its oldest element once full.
#[derive(Clone)]
pub struct CircularBuffer<T> {
    buffer: Vec<T>,
    write_pos: usize,
    capacity: usize,
}

impl<T> CircularBuffer<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
            write_pos: 0,
            capacity,
        }
    }

    /// Appends `item`, returning the evicted oldest element when full.
    pub fn push(&mut self, item: T) -> Option<T> {
        if self.capacity == 0 {
            return Some(item);
        }
        let evicted = if self.buffer.len() < self.capacity {
            self.buffer.push(item);
            None
        } else {
            Some(std::mem::replace(&mut self.buffer[self.write_pos], item))
        };
        self.write_pos = (self.write_pos + 1) % self.capacity;
        evicted
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
        self.write_pos = 0;
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> {
        let head = if self.buffer.len() < self.capacity {
            0
        } else {
            self.write_pos
        };

        self.buffer[head..].iter().chain(&self.buffer[..head])
    }

    pub fn last(&self) -> Option<&T> {
        self.iter().next_back()
    }

    pub fn as_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }
}

impl<T: fmt::Debug> fmt::Debug for CircularBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_push_order_before_wrapping() {
        let mut buf = CircularBuffer::new(4);
        for i in 0..3 {
            assert_eq!(buf.push(i), None);
        }
        assert_eq!(buf.as_vec(), vec![0, 1, 2]);
        assert_eq!(buf.last(), Some(&2));
    }

    #[test]
    fn overwrites_oldest_when_full() {
        let mut buf = CircularBuffer::new(3);
        for i in 0..3 {
            buf.push(i);
        }
        assert_eq!(buf.push(3), Some(0));
        assert_eq!(buf.push(4), Some(1));
        assert_eq!(buf.as_vec(), vec![2, 3, 4]);
        assert_eq!(buf.len(), 3);
    }

    #[test]
    fn clear_resets_write_position() {
        let mut buf = CircularBuffer::new(2);
        buf.push('a');
        buf.push('b');
        buf.push('c');
        buf.clear();
        assert!(buf.is_empty());
        buf.push('d');
        assert_eq!(buf.as_vec(), vec!['d']);
    }

    #[test]
    fn zero_capacity_rejects_everything() {
        let mut buf = CircularBuffer::new(0);
        assert_eq!(buf.push(1), Some(1));
        assert!(buf.is_empty());
    }
}
