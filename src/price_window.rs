use crate::{Price, RingBuffer};

/// Rolling window over a scalar stream with an incrementally maintained sum.
///
/// Callers decide bar boundaries: `update(price, true)` pushes a new value,
/// `update(price, false)` repaints the latest one.
///
/// Two degenerate states are tracked exactly, outside the running sums: a
/// window holding only zeros has a sum of exactly `0`, and a window holding
/// one repeated value is reported by [`flat_value`](Self::flat_value).
#[derive(Clone, Debug)]
pub(crate) struct PriceWindow<const SUM_OF_SQUARES: bool = false> {
    buffer: RingBuffer,
    /// Running sum of values in the window. Maintained incrementally via
    /// add/subtract, may accumulate FP rounding drift over very long runs,
    /// but negligible for typical window sizes on financial data.
    sum: Price,
    sum_of_squares: f64,
    /// Values in the window that are not `0`.
    nonzero: usize,
    /// Length of the run of equal values ending at the newest one.
    run: usize,
    /// Newest committed value and its run, as of the last bar boundary.
    anchor: Option<(Price, usize)>,
}

pub(crate) type PriceWindowWithSumOfSquares = PriceWindow<true>;

impl PriceWindow {
    pub fn new(size: usize) -> Self {
        Self {
            buffer: RingBuffer::new(size),
            sum: 0.0,
            sum_of_squares: 0.0,
            nonzero: 0,
            run: 0,
            anchor: None,
        }
    }
}

impl PriceWindow<true> {
    pub fn with_sum_of_squares(size: usize) -> Self {
        Self {
            buffer: RingBuffer::new(size),
            sum: 0.0,
            sum_of_squares: 0.0,
            nonzero: 0,
            run: 0,
            anchor: None,
        }
    }
}

impl<const SUM_OF_SQUARES: bool> PriceWindow<SUM_OF_SQUARES> {
    #[inline]
    pub fn update(&mut self, price: Price, is_next_bar: bool) {
        if is_next_bar || self.buffer.is_empty() {
            self.anchor = self.buffer.newest().map(|newest| (newest, self.run));
        }
        self.run = match self.anchor {
            Some((newest, run)) if newest == price => run + 1,
            _ => 1,
        };

        if let Some(old_price) = self.buffer.update(price, is_next_bar) {
            self.sum -= old_price;
            if SUM_OF_SQUARES {
                self.sum_of_squares -= old_price * old_price;
            }
            if old_price != 0.0 {
                self.nonzero -= 1;
            }
        }

        self.sum += price;
        if SUM_OF_SQUARES {
            self.sum_of_squares += price * price;
        }
        if price != 0.0 {
            self.nonzero += 1;
        }

        // All zeros: drop whatever rounding residue the sums carried.
        if self.nonzero == 0 {
            self.sum = 0.0;
            self.sum_of_squares = 0.0;
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.buffer.is_full()
    }

    #[inline]
    pub fn sum(&self) -> Option<Price> {
        self.is_ready().then_some(self.sum)
    }

    #[inline]
    pub fn sum_of_squares(&self) -> Option<Price> {
        assert!(SUM_OF_SQUARES, "sum_of_squares requires PriceWindow<true>");
        self.is_ready().then_some(self.sum_of_squares)
    }

    /// The repeated value, once the window is full of one value.
    #[inline]
    pub fn flat_value(&self) -> Option<Price> {
        (self.is_ready() && self.run >= self.buffer.capacity())
            .then(|| self.buffer.newest())
            .flatten()
    }

    /// Highest value, once the window is full.
    pub fn max(&self) -> Option<Price> {
        self.is_ready()
            .then(|| self.buffer.values().fold(f64::NEG_INFINITY, f64::max))
    }

    /// Lowest value, once the window is full.
    pub fn min(&self) -> Option<Price> {
        self.is_ready()
            .then(|| self.buffer.values().fold(f64::INFINITY, f64::min))
    }

    #[inline]
    pub fn oldest(&self) -> Option<Price> {
        self.buffer.oldest()
    }

    #[inline]
    pub fn values(&self) -> impl DoubleEndedIterator<Item = Price> + '_ {
        self.buffer.values()
    }
}
