use time::{OffsetDateTime, UtcOffset};

/// Source of "now" in the user's local offset.
#[derive(Debug, Clone, Copy)]
pub struct Clock {
    offset: UtcOffset,
}

impl Clock {
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }

    #[cfg(test)]
    pub fn utc() -> Self {
        Self::new(UtcOffset::UTC)
    }

    pub fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::offset;

    #[test]
    fn now_carries_configured_offset() {
        let clock = Clock::new(offset!(-5));
        assert_eq!(clock.now().offset(), offset!(-5));
        assert_eq!(Clock::utc().now().offset(), UtcOffset::UTC);
    }
}
