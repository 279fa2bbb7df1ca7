use bitfield_struct::bitfield;
use embedded_hal::PwmPin;

/// Timer channel driving the data line. The duty (compare) register is fed
/// one sample per bit period by a [`SampleStream`].
pub trait PulseGenerator: PwmPin<Duty = u16> {
    fn set_period(&mut self, ticks: u16);

    /// Forces an update event so the preloaded compare value takes effect
    /// before counting starts. Returns once the update has been applied.
    fn reload(&mut self);

    fn start_counting(&mut self);

    fn stop_counting(&mut self);
}

/// DMA stream copying samples into the generator's compare register.
pub trait SampleStream {
    /// Points the stream at `samples`. The stream may read the memory until
    /// [`SampleStream::disable`] returns.
    fn set_memory(&mut self, samples: &[u16]);

    fn set_mode(&mut self, mode: StreamMode);

    fn enable(&mut self);

    fn disable(&mut self);

    /// Returns and clears the transfer-complete flag.
    fn take_transfer_complete(&mut self) -> bool;
}

pub const MEMORY_TO_PERIPHERAL: u8 = 0b01;
pub const HALF_WORD: u8 = 0b01;
pub const PRIORITY_VERY_HIGH: u8 = 0b11;
pub const MAX_CHANNEL: u8 = 7;

/// Stream configuration, laid out like an STM32 DMA stream control register.
#[bitfield(u32)]
pub struct StreamMode {
    pub enable: bool,
    pub direct_mode_error_irq: bool,
    pub transfer_error_irq: bool,
    pub half_transfer_irq: bool,
    pub transfer_complete_irq: bool,
    pub peripheral_flow_control: bool,
    #[bits(2)]
    pub direction: u8,
    pub circular: bool,
    pub peripheral_increment: bool,
    pub memory_increment: bool,
    #[bits(2)]
    pub peripheral_size: u8,
    #[bits(2)]
    pub memory_size: u8,
    pub peripheral_increment_offset: bool,
    #[bits(2)]
    pub priority: u8,
    pub double_buffer: bool,
    pub current_target: bool,
    _reserved0: bool,
    #[bits(2)]
    pub peripheral_burst: u8,
    #[bits(2)]
    pub memory_burst: u8,
    #[bits(3)]
    pub channel: u8,
    #[bits(4)]
    _reserved1: u8,
}

impl StreamMode {
    /// One-shot half-word transfer of a frame into the compare register,
    /// interrupting on completion.
    pub fn frame_transfer(channel: u8) -> Self {
        StreamMode::new()
            .with_transfer_complete_irq(true)
            .with_direction(MEMORY_TO_PERIPHERAL)
            .with_memory_increment(true)
            .with_peripheral_size(HALF_WORD)
            .with_memory_size(HALF_WORD)
            .with_priority(PRIORITY_VERY_HIGH)
            .with_channel(channel)
    }
}
