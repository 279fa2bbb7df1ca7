use alloc::vec::Vec;

use crate::encoder::SAMPLES_PER_LED;
use crate::{Error, Result};

/// The two sample buffers of a strip. Application code writes `staging`;
/// the stream only ever reads `active`.
pub struct FrameBuffers {
    active: Vec<u16>,
    staging: Vec<u16>,
    led_count: usize,
}

impl FrameBuffers {
    /// Allocates both buffers with every LED black and the trailing
    /// `reset_padding` samples held low.
    pub fn new(led_count: usize, reset_padding: usize, zero: u16) -> Result<Self> {
        let body = led_count
            .checked_mul(SAMPLES_PER_LED)
            .ok_or(Error::AllocationFailure)?;
        let len = body
            .checked_add(reset_padding)
            .ok_or(Error::AllocationFailure)?;

        let mut active = Vec::new();
        active.try_reserve_exact(len)?;
        let mut staging = Vec::new();
        staging.try_reserve_exact(len)?;

        for buf in [&mut active, &mut staging] {
            buf.resize(body, zero);
            buf.resize(len, 0);
        }

        Ok(Self {
            active,
            staging,
            led_count,
        })
    }

    pub fn led_count(&self) -> usize {
        self.led_count
    }

    pub fn frame_len(&self) -> usize {
        self.active.len()
    }

    pub fn active(&self) -> &[u16] {
        &self.active
    }

    pub fn staging(&self) -> &[u16] {
        &self.staging
    }

    fn check(&self, index: usize) -> Result<usize> {
        if index >= self.led_count {
            return Err(Error::OutOfRange);
        }
        Ok(index * SAMPLES_PER_LED)
    }

    pub fn set_pixel(&mut self, index: usize, samples: &[u16; SAMPLES_PER_LED]) -> Result<()> {
        let offset = self.check(index)?;
        self.staging[offset..offset + SAMPLES_PER_LED].copy_from_slice(samples);
        Ok(())
    }

    pub fn staged_pixel(&self, index: usize) -> Result<&[u16]> {
        let offset = self.check(index)?;
        Ok(&self.staging[offset..offset + SAMPLES_PER_LED])
    }

    pub fn active_pixel(&self, index: usize) -> Result<&[u16]> {
        let offset = self.check(index)?;
        Ok(&self.active[offset..offset + SAMPLES_PER_LED])
    }

    /// Copies the LED samples of staging into active. The reset padding is
    /// never rewritten. Must not run while the stream reads `active`.
    pub fn copy_staging_to_active(&mut self) {
        let body = self.led_count * SAMPLES_PER_LED;
        self.active[..body].copy_from_slice(&self.staging[..body]);
    }
}
