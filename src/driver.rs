use alloc::vec::Vec;
use core::cell::RefCell;

use atomic_polyfill::{AtomicU32, Ordering};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use log::{debug, info, trace, warn};
use smart_leds::{SmartLedsWrite, RGB8};

use crate::hw::MAX_CHANNEL;
use crate::{
    decode, encode, Action, ChannelOrder, Engine, Error, Event, FrameBuffers, Phase,
    PulseGenerator, Result, SampleStream, Timing,
};

/// Low samples appended to every frame (the latch/reset period).
pub const DEFAULT_RESET_PADDING: usize = 50;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum LedOrder {
    /// One channel order for the whole strip.
    Strip(ChannelOrder),
    /// One channel order per LED; must hold exactly `led_count` entries.
    PerLed(Vec<ChannelOrder>),
}

impl LedOrder {
    fn get(&self, index: usize) -> ChannelOrder {
        match self {
            LedOrder::Strip(order) => *order,
            LedOrder::PerLed(orders) => orders.get(index).copied().unwrap_or_default(),
        }
    }
}

impl Default for LedOrder {
    fn default() -> Self {
        LedOrder::Strip(ChannelOrder::default())
    }
}

pub struct Config<P, S> {
    pub led_count: usize,
    pub order: LedOrder,
    pub timing: Timing,
    pub reset_padding: usize,
    /// Request channel the stream is routed to (0..=7).
    pub channel: u8,
    pub generator: P,
    pub stream: S,
}

impl<P, S> Config<P, S> {
    pub fn new(generator: P, stream: S, led_count: usize) -> Self {
        Self {
            led_count,
            order: LedOrder::default(),
            timing: Timing::default(),
            reset_padding: DEFAULT_RESET_PADDING,
            channel: 0,
            generator,
            stream,
        }
    }

    pub fn with_order(self, order: LedOrder) -> Self {
        Self { order, ..self }
    }

    pub fn with_timing(self, timing: Timing) -> Self {
        Self { timing, ..self }
    }

    pub fn with_reset_padding(self, reset_padding: usize) -> Self {
        Self {
            reset_padding,
            ..self
        }
    }

    pub fn with_channel(self, channel: u8) -> Self {
        Self { channel, ..self }
    }
}

impl<P: PulseGenerator, S> Config<P, S> {
    fn validate(&self) -> Result<()> {
        if self.led_count == 0 {
            warn!("strip without LEDs");
            return Err(Error::InvalidConfig);
        }

        if let LedOrder::PerLed(orders) = &self.order {
            if orders.len() != self.led_count {
                warn!(
                    "{} channel orders for {} LEDs",
                    orders.len(),
                    self.led_count
                );
                return Err(Error::InvalidConfig);
            }
        }

        if self.channel > MAX_CHANNEL {
            warn!("stream channel {} out of range", self.channel);
            return Err(Error::InvalidConfig);
        }

        let max_duty = self.generator.get_max_duty();
        if self.timing.zero > max_duty || self.timing.one > max_duty {
            warn!("{:?} exceeds max duty {}", self.timing, max_duty);
            return Err(Error::InvalidConfig);
        }

        if self.timing.zero == self.timing.one {
            warn!("zero and one widths are both {}", self.timing.zero);
            return Err(Error::InvalidConfig);
        }

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    Uninit,
    Stop,
    Active,
}

struct Strip<P, S> {
    engine: Engine<P, S>,
    order: LedOrder,
    timing: Timing,
}

impl<P, S> Strip<P, S>
where
    P: PulseGenerator,
    S: SampleStream,
{
    fn set_pixel(&mut self, index: usize, color: RGB8) -> Result<()> {
        if index >= self.engine.frames().led_count() {
            warn!("LED {} out of range", index);
            return Err(Error::OutOfRange);
        }
        let samples = encode(self.order.get(index), color, self.timing);
        self.engine.set_pixel(index, &samples)
    }

    fn pixel(&self, index: usize) -> Result<RGB8> {
        let samples = self.engine.frames().staged_pixel(index)?;
        decode(samples, self.order.get(index), self.timing).ok_or(Error::Undecodable)
    }
}

enum Inner<P, S> {
    Uninit,
    Stop,
    Active(Strip<P, S>),
}

/// WS281x strip driver shared between application code and the DMA
/// transfer-complete interrupt.
pub struct Ws281x<P, S> {
    inner: Mutex<CriticalSectionRawMutex, RefCell<Inner<P, S>>>,
    frame_consumed: Signal<CriticalSectionRawMutex, ()>,
    frames_sent: AtomicU32,
}

impl<P, S> Ws281x<P, S> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Inner::Uninit)),
            frame_consumed: Signal::new(),
            frames_sent: AtomicU32::new(0),
        }
    }

    fn with_inner<R>(&self, f: impl FnOnce(&mut Inner<P, S>) -> R) -> R {
        self.inner.lock(|inner| f(&mut inner.borrow_mut()))
    }

    pub fn state(&self) -> State {
        self.with_inner(|inner| match inner {
            Inner::Uninit => State::Uninit,
            Inner::Stop => State::Stop,
            Inner::Active(_) => State::Active,
        })
    }

    /// Frames fully streamed out since the driver was created.
    pub fn frames_sent(&self) -> u32 {
        self.frames_sent.load(Ordering::Relaxed)
    }

    pub fn init(&self) -> Result<()> {
        self.with_inner(|inner| match inner {
            Inner::Uninit | Inner::Stop => {
                *inner = Inner::Stop;
                Ok(())
            }
            Inner::Active(_) => Err(Error::InvalidState),
        })
    }
}

impl<P, S> Default for Ws281x<P, S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P, S> Ws281x<P, S>
where
    P: PulseGenerator,
    S: SampleStream,
{
    fn with_strip<R>(&self, f: impl FnOnce(&mut Strip<P, S>) -> Result<R>) -> Result<R> {
        self.with_inner(|inner| match inner {
            Inner::Active(strip) => f(strip),
            _ => Err(Error::InvalidState),
        })
    }

    /// Allocates the frame buffers and programs the hardware. A strip that
    /// is already active is stopped first and its hardware dropped.
    pub fn configure(&self, config: Config<P, S>) -> Result<()> {
        if self.stop()?.is_some() {
            debug!("reconfiguring, previous strip released");
        }

        config.validate()?;
        let frames =
            FrameBuffers::new(config.led_count, config.reset_padding, config.timing.zero)
                .inspect_err(|_| warn!("no memory for {} LEDs", config.led_count))?;
        let frame_len = frames.frame_len();
        let engine = Engine::new(
            config.generator,
            config.stream,
            frames,
            config.timing,
            config.channel,
        )?;
        let strip = Strip {
            engine,
            order: config.order,
            timing: config.timing,
        };

        self.with_inner(|inner| match inner {
            Inner::Stop => {
                *inner = Inner::Active(strip);
                Ok(())
            }
            _ => Err(Error::InvalidState),
        })?;

        info!(
            "strip configured: {} LEDs, {} samples per frame",
            config.led_count, frame_len
        );
        Ok(())
    }

    /// Deactivates the strip. A running transmission is cut short and a
    /// pending frame is discarded; a task blocked in [`Ws281x::commit`]
    /// returns. Gives back the hardware if the strip was active.
    pub fn stop(&self) -> Result<Option<(P, S)>> {
        let halted = self.with_inner(|inner| match core::mem::replace(inner, Inner::Stop) {
            Inner::Uninit => {
                *inner = Inner::Uninit;
                Err(Error::InvalidState)
            }
            Inner::Stop => Ok(None),
            Inner::Active(mut strip) => {
                let action = strip.engine.handle(Event::Halt);
                Ok(Some((strip.engine, action)))
            }
        })?;

        let Some((engine, action)) = halted else {
            return Ok(None);
        };
        if action == Action::Discard {
            self.frame_consumed.signal(());
        }
        info!("strip stopped");
        Ok(Some(engine.release()))
    }

    pub fn set_pixel(&self, index: usize, red: u8, green: u8, blue: u8) -> Result<()> {
        self.with_strip(|strip| strip.set_pixel(index, RGB8::new(red, green, blue)))
    }

    /// Color last written to `index`, read back from staging.
    pub fn pixel(&self, index: usize) -> Result<RGB8> {
        self.with_strip(|strip| strip.pixel(index))
    }

    pub fn fill(&self, red: u8, green: u8, blue: u8) -> Result<()> {
        self.with_strip(|strip| {
            for index in 0..strip.engine.frames().led_count() {
                strip.set_pixel(index, RGB8::new(red, green, blue))?;
            }
            Ok(())
        })
    }

    pub fn clear(&self) -> Result<()> {
        self.fill(0, 0, 0)
    }

    pub fn led_count(&self) -> Result<usize> {
        self.with_strip(|strip| Ok(strip.engine.frames().led_count()))
    }

    pub fn phase(&self) -> Result<Phase> {
        self.with_strip(|strip| Ok(strip.engine.phase()))
    }

    pub fn with_frames<R>(&self, f: impl FnOnce(&FrameBuffers) -> R) -> Result<R> {
        self.with_strip(|strip| Ok(f(strip.engine.frames())))
    }

    /// Makes the staged colors the next frame.
    ///
    /// With the engine idle the frame is copied and sent right away. While a
    /// frame is streaming the new one is queued and the transfer-complete
    /// interrupt restarts with it. If a queued frame has not been picked up
    /// yet, waits until it has. Does nothing unless the strip is active.
    pub async fn commit(&self) {
        loop {
            let action = self.with_inner(|inner| match inner {
                Inner::Active(strip) => {
                    let action = strip.engine.handle(Event::Commit);
                    if action == Action::Block {
                        self.frame_consumed.reset();
                    }
                    Some(action)
                }
                _ => None,
            });

            match action {
                Some(Action::Block) => self.frame_consumed.wait().await,
                _ => return,
            }
        }
    }

    pub fn commit_blocking(&self) {
        embassy_futures::block_on(self.commit())
    }

    /// Transfer-complete handler. Call from the stream's interrupt once the
    /// whole frame has been handed to the timer.
    pub fn on_transfer_complete(&self) {
        self.finish_frame(|_| true)
    }

    /// Stream interrupt handler: checks and clears the transfer-complete
    /// flag, then runs [`Ws281x::on_transfer_complete`] if it was set.
    pub fn on_interrupt(&self) {
        self.finish_frame(|engine| engine.take_transfer_complete())
    }

    fn finish_frame(&self, raised: impl FnOnce(&mut Engine<P, S>) -> bool) {
        let action = self.with_inner(|inner| match inner {
            Inner::Active(strip) => {
                if raised(&mut strip.engine) {
                    strip.engine.handle(Event::TransferComplete)
                } else {
                    Action::None
                }
            }
            _ => Action::None,
        });

        match action {
            Action::Stop => {
                self.frames_sent.fetch_add(1, Ordering::Relaxed);
            }
            Action::Restart => {
                self.frames_sent.fetch_add(1, Ordering::Relaxed);
                trace!("restarted with pending frame");
                self.frame_consumed.signal(());
            }
            _ => {}
        }
    }
}

impl<P, S> SmartLedsWrite for &Ws281x<P, S>
where
    P: PulseGenerator,
    S: SampleStream,
{
    type Error = Error;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<()>
    where
        T: Iterator<Item = I>,
        I: Into<Self::Color>,
    {
        for (index, color) in iterator.enumerate() {
            let color = color.into();
            self.set_pixel(index, color.r, color.g, color.b)?;
        }
        self.commit_blocking();
        Ok(())
    }
}

impl<P, S> SmartLedsWrite for Ws281x<P, S>
where
    P: PulseGenerator,
    S: SampleStream,
{
    type Error = Error;
    type Color = RGB8;

    fn write<T, I>(&mut self, iterator: T) -> Result<()>
    where
        T: Iterator<Item = I>,
        I: Into<Self::Color>,
    {
        SmartLedsWrite::write(&mut &*self, iterator)
    }
}
