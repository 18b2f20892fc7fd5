use crate::Price;

/// Fixed-capacity FIFO buffer.
///
/// Pushing past capacity evicts the oldest value. The most recent value can
/// be swapped in place, which is how indicators repaint the current bar
/// without advancing their window. Both operations are O(1).
///
/// ```
/// use quantedge_ta::RingBuffer;
///
/// let mut rb = RingBuffer::new(3);
/// rb.push(1.0);
/// rb.push(2.0);
/// rb.push(3.0);
/// assert_eq!(rb.push(4.0), Some(1.0));
/// assert_eq!(rb.values().collect::<Vec<_>>(), vec![2.0, 3.0, 4.0]);
/// ```
#[derive(Clone, Debug)]
pub struct RingBuffer<T = Price> {
    buffer: Vec<T>,
    head: usize,
    tail: usize,
    len: usize,
    capacity: usize,
}

impl<T: Copy + Default> RingBuffer<T> {
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be positive");

        Self {
            buffer: vec![T::default(); capacity],
            head: 0,
            tail: 0,
            len: 0,
            capacity,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Appends `value`, returning the evicted oldest value once full.
    #[inline]
    pub fn push(&mut self, value: T) -> Option<T> {
        if self.is_full() {
            let old = self.buffer[self.head];

            self.buffer[self.head] = value;

            self.tail = self.head;
            self.head += 1;
            if self.head == self.capacity {
                self.head = 0;
            }

            Some(old)
        } else {
            self.buffer[self.len] = value;
            self.tail = self.len;
            self.len += 1;

            None
        }
    }

    /// Swaps the most recent value for `value`, returning the old one.
    ///
    /// On an empty buffer this behaves like [`push`](Self::push) and returns
    /// `T::default()`.
    #[inline]
    pub fn replace(&mut self, value: T) -> T {
        if self.is_empty() {
            self.push(value);
            return T::default();
        }

        let old = self.buffer[self.tail];

        self.buffer[self.tail] = value;

        old
    }

    /// Pushes on a new bar, replaces on a repaint.
    ///
    /// Returns the value that left the window: the evicted oldest value on
    /// push, the previous latest value on replace.
    #[inline]
    pub fn update(&mut self, value: T, is_next_bar: bool) -> Option<T> {
        if is_next_bar || self.is_empty() {
            self.push(value)
        } else {
            Some(self.replace(value))
        }
    }

    #[inline]
    #[must_use]
    pub fn oldest(&self) -> Option<T> {
        (!self.is_empty()).then(|| self.buffer[self.head])
    }

    #[inline]
    #[must_use]
    pub fn newest(&self) -> Option<T> {
        (!self.is_empty()).then(|| self.buffer[self.tail])
    }

    /// Buffered values, oldest first.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = T> + '_ {
        let (front, back) = if self.is_full() {
            (&self.buffer[self.head..], &self.buffer[..self.head])
        } else {
            (&self.buffer[..self.len], &self.buffer[..0])
        };

        front.iter().chain(back).copied()
    }
}
