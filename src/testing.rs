//! Recording stand-ins for the timer and DMA stream.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use embedded_hal::PwmPin;

use crate::{PulseGenerator, SampleStream, StreamMode};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Call {
    SetPeriod(u16),
    SetDuty(u16),
    OutputEnable,
    OutputDisable,
    Reload,
    StartCounting,
    StopCounting,
    SetMemory(usize),
    SetMode(u32),
    StreamEnable,
    StreamDisable,
}

#[derive(Default)]
pub struct Bus {
    pub calls: Vec<Call>,
    pub memory: Vec<u16>,
    pub sent: Vec<Vec<u16>>,
    pub transfer_complete: bool,
    pub counting: bool,
    pub streaming: bool,
    pub output: bool,
}

pub type Probe = Rc<RefCell<Bus>>;

pub struct FakePwm {
    bus: Probe,
    duty: u16,
    max_duty: u16,
}

pub struct FakeStream {
    bus: Probe,
}

pub fn hardware() -> (FakePwm, FakeStream, Probe) {
    hardware_with_max_duty(u16::MAX)
}

pub fn hardware_with_max_duty(max_duty: u16) -> (FakePwm, FakeStream, Probe) {
    let bus = Probe::default();
    let pwm = FakePwm {
        bus: bus.clone(),
        duty: 0,
        max_duty,
    };
    let stream = FakeStream { bus: bus.clone() };
    (pwm, stream, bus)
}

impl FakePwm {
    fn record(&self, call: Call) {
        self.bus.borrow_mut().calls.push(call);
    }
}

impl PwmPin for FakePwm {
    type Duty = u16;

    fn disable(&mut self) {
        self.record(Call::OutputDisable);
        self.bus.borrow_mut().output = false;
    }

    fn enable(&mut self) {
        self.record(Call::OutputEnable);
        self.bus.borrow_mut().output = true;
    }

    fn get_duty(&self) -> u16 {
        self.duty
    }

    fn get_max_duty(&self) -> u16 {
        self.max_duty
    }

    fn set_duty(&mut self, duty: u16) {
        self.record(Call::SetDuty(duty));
        self.duty = duty;
    }
}

impl PulseGenerator for FakePwm {
    fn set_period(&mut self, ticks: u16) {
        self.record(Call::SetPeriod(ticks));
    }

    fn reload(&mut self) {
        self.record(Call::Reload);
    }

    fn start_counting(&mut self) {
        self.record(Call::StartCounting);
        self.bus.borrow_mut().counting = true;
    }

    fn stop_counting(&mut self) {
        self.record(Call::StopCounting);
        self.bus.borrow_mut().counting = false;
    }
}

impl SampleStream for FakeStream {
    fn set_memory(&mut self, samples: &[u16]) {
        let mut bus = self.bus.borrow_mut();
        bus.calls.push(Call::SetMemory(samples.len()));
        bus.memory = samples.to_vec();
    }

    fn set_mode(&mut self, mode: StreamMode) {
        self.bus.borrow_mut().calls.push(Call::SetMode(mode.into()));
    }

    fn enable(&mut self) {
        let mut bus = self.bus.borrow_mut();
        bus.calls.push(Call::StreamEnable);
        bus.streaming = true;
        let frame = bus.memory.clone();
        bus.sent.push(frame);
    }

    fn disable(&mut self) {
        let mut bus = self.bus.borrow_mut();
        bus.calls.push(Call::StreamDisable);
        bus.streaming = false;
    }

    fn take_transfer_complete(&mut self) -> bool {
        core::mem::take(&mut self.bus.borrow_mut().transfer_complete)
    }
}
