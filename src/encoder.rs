use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use smart_leds::RGB8;

use crate::{Error, Timing};

/// Samples needed for one LED: three channels of eight bits.
pub const SAMPLES_PER_LED: usize = 24;

const LANE: usize = 8;

/// Order the color channels go out on the wire. Blue is always the last
/// lane; the order only swaps the first two.
#[derive(Clone, Copy, Debug, Eq, PartialEq, FromPrimitive)]
#[repr(u8)]
pub enum ChannelOrder {
    Grb = 1,
    Rgb = 2,
}

impl Default for ChannelOrder {
    fn default() -> Self {
        ChannelOrder::Grb
    }
}

impl ChannelOrder {
    fn lanes(self, color: RGB8) -> [u8; 3] {
        match self {
            ChannelOrder::Grb => [color.g, color.r, color.b],
            ChannelOrder::Rgb => [color.r, color.g, color.b],
        }
    }

    fn color(self, lanes: [u8; 3]) -> RGB8 {
        match self {
            ChannelOrder::Grb => RGB8::new(lanes[1], lanes[0], lanes[2]),
            ChannelOrder::Rgb => RGB8::new(lanes[0], lanes[1], lanes[2]),
        }
    }
}

impl TryFrom<u8> for ChannelOrder {
    type Error = Error;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        ChannelOrder::from_u8(raw).ok_or(Error::UnknownChannelOrder(raw))
    }
}

pub fn encode(order: ChannelOrder, color: RGB8, timing: Timing) -> [u16; SAMPLES_PER_LED] {
    let mut samples = [0u16; SAMPLES_PER_LED];
    encode_into(&mut samples, order, color, timing);
    samples
}

/// Writes the 24 samples for one LED. Bit `i` (MSB first) of the three
/// lanes lands at `i`, `i + 8` and `i + 16`.
pub fn encode_into(
    samples: &mut [u16; SAMPLES_PER_LED],
    order: ChannelOrder,
    color: RGB8,
    timing: Timing,
) {
    let mut lanes = order.lanes(color);
    for bit in 0..LANE {
        for (lane, data) in lanes.iter_mut().enumerate() {
            samples[lane * LANE + bit] = if (*data & 0x80) == 0 {
                timing.zero
            } else {
                timing.one
            };
            *data <<= 1;
        }
    }
}

/// Inverse of [`encode`]. Returns `None` unless `samples` holds exactly one
/// LED of zero and one widths.
pub fn decode(samples: &[u16], order: ChannelOrder, timing: Timing) -> Option<RGB8> {
    if samples.len() != SAMPLES_PER_LED {
        return None;
    }
    let mut lanes = [0u8; 3];
    for (lane, data) in lanes.iter_mut().enumerate() {
        for &sample in &samples[lane * LANE..(lane + 1) * LANE] {
            *data <<= 1;
            if sample == timing.one {
                *data |= 1;
            } else if sample != timing.zero {
                return None;
            }
        }
    }
    Some(order.color(lanes))
}
