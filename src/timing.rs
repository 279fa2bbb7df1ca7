use fugit::{HertzU32, NanosDurationU32};

/// Bit timing in pulse generator compare ticks.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Timing {
    /// Timer period of one bit.
    pub period: u16,
    /// High time of a zero bit.
    pub zero: u16,
    /// High time of a one bit.
    pub one: u16,
}

impl Timing {
    /// WS2811 tick counts for a 12 MHz timer clock: 2.5 us bit, 0.5 us
    /// zero, 1.25 us one (the nominal 1.2 us rounded up a tick).
    pub const WS2811: Timing = Timing {
        period: 30,
        zero: 6,
        one: 15,
    };

    /// WS2812 tick counts for a 12 MHz timer clock: 1.25 us bit, 0.33 us
    /// zero, 0.75 us one (the nominal 0.7 us rounded up a tick).
    pub const WS2812: Timing = Timing {
        period: 15,
        zero: 4,
        one: 9,
    };

    pub const fn new(period: u16, zero: u16, one: u16) -> Self {
        Self { period, zero, one }
    }

    /// Converts nanosecond timings to ticks of a timer running at `clock`,
    /// rounding to the nearest tick.
    pub fn from_clock(
        clock: HertzU32,
        period: NanosDurationU32,
        zero: NanosDurationU32,
        one: NanosDurationU32,
    ) -> Self {
        let ticks = |d: NanosDurationU32| {
            let t = (u64::from(d.ticks()) * u64::from(clock.to_Hz()) + 500_000_000)
                / 1_000_000_000;
            t.min(u64::from(u16::MAX)) as u16
        };
        Self::new(ticks(period), ticks(zero), ticks(one))
    }

    pub fn ws2811(clock: HertzU32) -> Self {
        Self::from_clock(
            clock,
            NanosDurationU32::from_ticks(2500),
            NanosDurationU32::from_ticks(500),
            NanosDurationU32::from_ticks(1200),
        )
    }

    pub fn ws2812(clock: HertzU32) -> Self {
        Self::from_clock(
            clock,
            NanosDurationU32::from_ticks(1250),
            NanosDurationU32::from_ticks(350),
            NanosDurationU32::from_ticks(700),
        )
    }
}

impl Default for Timing {
    fn default() -> Self {
        Timing::WS2812
    }
}
