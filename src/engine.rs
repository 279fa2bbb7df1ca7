use log::trace;

use crate::encoder::SAMPLES_PER_LED;
use crate::hw::MAX_CHANNEL;
use crate::{Error, FrameBuffers, PulseGenerator, Result, SampleStream, StreamMode, Timing};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Phase {
    Idle,
    Transmitting,
    /// Transmitting, with a committed frame waiting in staging.
    RestartPending,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Event {
    Commit,
    TransferComplete,
    Halt,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Action {
    None,
    /// Copy staging to active and start streaming.
    Start,
    Stop,
    /// Stop, copy staging to active, start again.
    Restart,
    /// A frame is already pending; the caller has to wait for it to be
    /// picked up.
    Block,
    /// Stop and drop the pending frame.
    Discard,
}

impl Phase {
    pub fn step(self, event: Event) -> (Phase, Action) {
        match (self, event) {
            (Phase::Idle, Event::Commit) => (Phase::Transmitting, Action::Start),
            (Phase::Transmitting, Event::Commit) => (Phase::RestartPending, Action::None),
            (Phase::RestartPending, Event::Commit) => (Phase::RestartPending, Action::Block),

            (Phase::Idle, Event::TransferComplete) => (Phase::Idle, Action::None),
            (Phase::Transmitting, Event::TransferComplete) => (Phase::Idle, Action::Stop),
            (Phase::RestartPending, Event::TransferComplete) => {
                (Phase::Transmitting, Action::Restart)
            }

            (Phase::Idle, Event::Halt) => (Phase::Idle, Action::None),
            (Phase::Transmitting, Event::Halt) => (Phase::Idle, Action::Stop),
            (Phase::RestartPending, Event::Halt) => (Phase::Idle, Action::Discard),
        }
    }

    pub fn is_transmitting(self) -> bool {
        self != Phase::Idle
    }

    pub fn update_pending(self) -> bool {
        self == Phase::RestartPending
    }
}

/// Owns the hardware and both frame buffers. Every method must be called
/// with the transfer-complete interrupt masked out, e.g. inside the
/// driver's critical section.
pub struct Engine<P, S> {
    generator: P,
    stream: S,
    frames: FrameBuffers,
    mode: StreamMode,
    phase: Phase,
}

impl<P, S> Engine<P, S>
where
    P: PulseGenerator,
    S: SampleStream,
{
    /// Programs the stream and timer for `frames`, leaving the output low
    /// and the counter stopped. Fails with `InvalidConfig` for a stream
    /// channel above 7, before touching the hardware.
    pub fn new(
        mut generator: P,
        mut stream: S,
        frames: FrameBuffers,
        timing: Timing,
        channel: u8,
    ) -> Result<Self> {
        if channel > MAX_CHANNEL {
            return Err(Error::InvalidConfig);
        }
        let mode = StreamMode::frame_transfer(channel);

        stream.disable();
        stream.set_mode(mode);
        stream.set_memory(frames.active());

        generator.set_period(timing.period);
        generator.set_duty(0);
        generator.enable();
        generator.stop_counting();

        Ok(Self {
            generator,
            stream,
            frames,
            mode,
            phase: Phase::Idle,
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn frames(&self) -> &FrameBuffers {
        &self.frames
    }

    pub fn set_pixel(&mut self, index: usize, samples: &[u16; SAMPLES_PER_LED]) -> Result<()> {
        self.frames.set_pixel(index, samples)
    }

    pub fn take_transfer_complete(&mut self) -> bool {
        self.stream.take_transfer_complete()
    }

    fn start(&mut self) {
        self.stream.set_memory(self.frames.active());
        self.stream.set_mode(self.mode);
        self.generator.reload();
        self.stream.enable();
        self.generator.start_counting();
    }

    fn stop(&mut self) {
        self.generator.stop_counting();
        self.stream.disable();
    }

    pub fn handle(&mut self, event: Event) -> Action {
        let (phase, action) = self.phase.step(event);
        match action {
            Action::None | Action::Block => {}
            Action::Start => {
                self.frames.copy_staging_to_active();
                self.start();
            }
            Action::Stop => self.stop(),
            Action::Restart => {
                self.stop();
                self.frames.copy_staging_to_active();
                self.start();
            }
            Action::Discard => {
                trace!("dropping pending frame");
                self.stop();
            }
        }
        self.phase = phase;
        action
    }

    /// Stops any transmission, disables the output and hands the hardware
    /// back.
    pub fn release(mut self) -> (P, S) {
        self.handle(Event::Halt);
        self.generator.disable();
        (self.generator, self.stream)
    }
}
