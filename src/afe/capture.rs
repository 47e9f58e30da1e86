// Licensed under the Apache-2.0 license

//! FIFO capture.
//!
//! While running, every FIFO_RDY rising edge drains one packet from the
//! chip into the sample ring as tagged 32-bit frames:
//!
//! ```text
//! [0x000000 | FrameStart] [pointer | FifoPointer] [word | FifoWord] * (pointer + 1)
//! ```
//!
//! A pointer of 0xFF means the FIFO is empty and only the two header
//! frames are written.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

use crate::afe::afe4950::{notifier_error, Afe4950, Error};
use crate::afe::common::{
    CaptureStatus, DeviceState, Page, FIFO_DATA_REGISTER, FIFO_POINTER_REGISTER,
};
use crate::afe::traits::{Edge, EdgeNotifier};
use crate::common::Logger;
use crate::frame::{Tag, TaggedFrame};

impl<SPI, RST, D, IRQ, const N: usize, L> Afe4950<'_, SPI, RST, D, IRQ, N, L>
where
    SPI: SpiDevice,
    RST: OutputPin,
    D: DelayNs,
    IRQ: EdgeNotifier,
    L: Logger,
{
    /// Re-arm the FIFO and start listening for FIFO_RDY.
    ///
    /// Does nothing if capture is already running. A device whose
    /// validation failed may still be started.
    ///
    /// # Errors
    ///
    /// [`Error::NotConfigured`] before the first `configure`, otherwise a
    /// bus or notifier failure.
    pub fn start(&mut self) -> Result<(), Error<SPI::Error>> {
        if self.capture == CaptureStatus::Running {
            return Ok(());
        }
        if matches!(
            self.state,
            DeviceState::Unconfigured | DeviceState::Configuring
        ) {
            return Err(Error::NotConfigured);
        }
        if self.state == DeviceState::ValidationFailed {
            self.logger
                .error(format_args!("starting capture on an unvalidated device"));
        }

        self.rearm_fifo()?;
        self.fifo_ready.arm(Edge::Rising).map_err(notifier_error)?;
        self.capture = CaptureStatus::Running;
        self.logger.debug(format_args!("capture started"));
        Ok(())
    }

    /// Stop listening for FIFO_RDY. Safe to call when already stopped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Notifier`] if the notification cannot be disarmed.
    pub fn stop(&mut self) -> Result<(), Error<SPI::Error>> {
        if self.capture == CaptureStatus::Stopped {
            return Ok(());
        }
        self.fifo_ready.disarm().map_err(notifier_error)?;
        self.capture = CaptureStatus::Stopped;
        self.logger.debug(format_args!("capture stopped"));
        Ok(())
    }

    /// FIFO_RDY handler: drain one packet into the sample ring.
    ///
    /// Returns the number of frames pushed, zero when capture is stopped.
    /// Further notifications are masked until the drain completes. Nothing
    /// is logged from here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spi`] if a transaction fails; frames already pushed
    /// stay in the ring.
    pub fn on_fifo_ready(&mut self) -> Result<usize, Error<SPI::Error>> {
        if self.capture != CaptureStatus::Running {
            return Ok(0);
        }

        self.fifo_ready.mask();
        let drained = self.drain_fifo();
        self.fifo_ready.unmask();
        drained
    }

    fn drain_fifo(&mut self) -> Result<usize, Error<SPI::Error>> {
        debug_assert_eq!(self.regs.control().page(), Page::Page0);

        let pointer = self
            .regs
            .read_register(FIFO_POINTER_REGISTER)
            .map_err(Error::Spi)?
            & 0xFF;
        // 0xFF wraps to zero words.
        let words = (pointer + 1) & 0xFF;

        self.producer.push_frame(TaggedFrame::new(0, Tag::FrameStart));
        self.producer
            .push_frame(TaggedFrame::new(pointer, Tag::FifoPointer));

        for _ in 0..words {
            let word = self
                .regs
                .read_register(FIFO_DATA_REGISTER)
                .map_err(Error::Spi)?;
            self.producer.push_frame(TaggedFrame::new(word, Tag::FifoWord));
        }

        Ok(2 + words as usize)
    }
}
