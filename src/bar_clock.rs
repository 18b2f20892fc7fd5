use std::fmt::Display;

use crate::{Bar, Error, Ohlcv, Price, Result, Timestamp};

/// Bar boundary detection shared by all indicators.
///
/// Remembers the current bar and the last bar of the previous timeframe.
/// Repaints replace the current bar; `previous` only moves on advance.
#[derive(Clone, Debug, Default)]
pub(crate) struct BarClock {
    last_open_time: Option<Timestamp>,
    current: Option<Bar>,
    previous: Option<Bar>,
}

impl BarClock {
    /// Records `ohlcv` and returns `true` when it opens a new bar, `false`
    /// when it repaints the current one.
    ///
    /// An earlier `open_time` is rejected and leaves the clock untouched.
    /// `owner` names the indicator in the error.
    #[inline]
    pub fn advance(&mut self, ohlcv: &impl Ohlcv, owner: &impl Display) -> Result<bool> {
        let open_time = ohlcv.open_time();

        if let Some(last) = self.last_open_time.filter(|&last| open_time < last) {
            return Err(Error::ordering(owner, last, open_time));
        }

        let is_next_bar = self.last_open_time.is_none_or(|t| t < open_time);

        if is_next_bar {
            self.previous = self.current;
            self.last_open_time = Some(open_time);
        }
        self.current = Some(Bar::from_ohlcv(ohlcv));

        Ok(is_next_bar)
    }

    #[inline]
    pub fn previous(&self) -> Option<&Bar> {
        self.previous.as_ref()
    }

    #[inline]
    pub fn prev_close(&self) -> Option<Price> {
        self.previous.map(|bar| bar.close)
    }
}
