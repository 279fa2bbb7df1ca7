//! Double-buffered WS281x LED strip driver.
//!
//! Pixels are encoded into timer compare values ("samples") and streamed to
//! a PWM channel by DMA, so the CPU is idle while a frame goes out. Colors
//! are written into a staging buffer; [`Ws281x::commit`] hands them over to
//! the transmission engine, which restarts from the transfer-complete
//! interrupt whenever a newer frame is waiting.
//!
//! ```ignore
//! static LEDS: Ws281x<Tim3Ch1, Dma1Stream4> = Ws281x::new();
//!
//! #[interrupt]
//! fn DMA1_STREAM4() {
//!     LEDS.on_interrupt();
//! }
//!
//! LEDS.init()?;
//! LEDS.configure(Config::new(pwm, dma, 60).with_timing(Timing::WS2812))?;
//! LEDS.set_pixel(0, 255, 0, 0)?;
//! LEDS.commit().await;
//! ```
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod driver;
mod encoder;
mod engine;
mod error;
mod frame;
mod hw;
#[cfg(test)]
mod testing;
mod timing;

pub use driver::{Config, LedOrder, State, Ws281x, DEFAULT_RESET_PADDING};
pub use encoder::{decode, encode, encode_into, ChannelOrder, SAMPLES_PER_LED};
pub use engine::{Action, Engine, Event, Phase};
pub use error::{Error, Result};
pub use frame::FrameBuffers;
pub use hw::{PulseGenerator, SampleStream, StreamMode};
pub use timing::Timing;
