// Licensed under the Apache-2.0 license

//! The AFE4950 driver object.
//!
//! It owns the hardware handles (SPI device, reset line, delay, FIFO_RDY
//! notifier) and the producer half of the sample ring. The lifecycle
//! operations live in `lifecycle.rs`, the capture state machine in
//! `capture.rs`.
//!
//! ```rust,ignore
//! static mut RING: RingBuffer<DEFAULT_RING_CAPACITY> = RingBuffer::new();
//!
//! let (producer, mut consumer) = unsafe { (*core::ptr::addr_of_mut!(RING)).split() };
//! let config = Afe4950ConfigBuilder::new()
//!     .page0(&PAGE0_REGISTERS)
//!     .page1(&PAGE1_REGISTERS)
//!     .build();
//!
//! let mut afe = Afe4950::new(spi, reset, delay, fifo_rdy, producer, config);
//! if afe.configure()?.passed() {
//!     afe.start()?;
//! }
//! // FIFO_RDY interrupt handler: afe.on_fifo_ready()
//! // Main loop: consumer.read_frame()
//! ```

use embedded_hal::digital::{self, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::afe::common::{Afe4950Config, CaptureStatus, DeviceState};
use crate::afe::protocol::{ControlRegisters, RegisterInterface};
use crate::afe::traits::EdgeNotifier;
use crate::common::{Logger, NoOpLogger};
use crate::ring_buffer::Producer;

/// Driver errors. `E` is the SPI device's error type.
#[derive(Debug)]
pub enum Error<E> {
    /// A register transaction failed.
    Spi(E),
    /// Driving the reset line failed.
    Pin(digital::ErrorKind),
    /// Arming or disarming the FIFO-ready notification failed.
    Notifier(digital::ErrorKind),
    /// The operation needs capture to be stopped.
    CaptureRunning,
    /// Capture was requested before any configuration pass.
    NotConfigured,
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Spi(e) => write!(f, "SPI transaction failed: {e:?}"),
            Error::Pin(kind) => write!(f, "reset line failed: {kind:?}"),
            Error::Notifier(kind) => write!(f, "FIFO-ready notifier failed: {kind:?}"),
            Error::CaptureRunning => f.write_str("capture is running"),
            Error::NotConfigured => f.write_str("device has not been configured"),
        }
    }
}

pub(crate) fn pin_error<P: digital::Error, E>(err: P) -> Error<E> {
    Error::Pin(err.kind())
}

pub(crate) fn notifier_error<N: digital::Error, E>(err: N) -> Error<E> {
    Error::Notifier(err.kind())
}

pub struct Afe4950<'a, SPI, RST, D, IRQ, const N: usize, L: Logger = NoOpLogger> {
    pub(crate) regs: RegisterInterface<SPI>,
    pub(crate) reset: RST,
    pub(crate) delay: D,
    pub(crate) fifo_ready: IRQ,
    pub(crate) producer: Producer<'a, N>,
    pub(crate) config: Afe4950Config<'a>,
    pub(crate) state: DeviceState,
    pub(crate) capture: CaptureStatus,
    pub(crate) logger: L,
}

impl<'a, SPI, RST, D, IRQ, const N: usize> Afe4950<'a, SPI, RST, D, IRQ, N, NoOpLogger>
where
    SPI: SpiDevice,
    RST: OutputPin,
    IRQ: EdgeNotifier,
{
    /// Take ownership of the bus, the reset line and the FIFO_RDY
    /// notifier. Nothing is sent to the chip until
    /// [`configure`](Self::configure).
    pub fn new(
        spi: SPI,
        reset: RST,
        delay: D,
        fifo_ready: IRQ,
        producer: Producer<'a, N>,
        config: Afe4950Config<'a>,
    ) -> Self {
        Self::with_logger(spi, reset, delay, fifo_ready, producer, config, NoOpLogger)
    }
}

impl<'a, SPI, RST, D, IRQ, const N: usize, L> Afe4950<'a, SPI, RST, D, IRQ, N, L>
where
    SPI: SpiDevice,
    RST: OutputPin,
    IRQ: EdgeNotifier,
    L: Logger,
{
    #[allow(clippy::too_many_arguments)]
    pub fn with_logger(
        spi: SPI,
        reset: RST,
        delay: D,
        fifo_ready: IRQ,
        producer: Producer<'a, N>,
        config: Afe4950Config<'a>,
        logger: L,
    ) -> Self {
        Self {
            regs: RegisterInterface::new(spi),
            reset,
            delay,
            fifo_ready,
            producer,
            config,
            state: DeviceState::Unconfigured,
            capture: CaptureStatus::Stopped,
            logger,
        }
    }

    #[must_use]
    pub fn state(&self) -> DeviceState {
        self.state
    }

    #[must_use]
    pub fn capture_status(&self) -> CaptureStatus {
        self.capture
    }

    #[must_use]
    pub fn control(&self) -> &ControlRegisters {
        self.regs.control()
    }

    #[must_use]
    pub fn config(&self) -> &Afe4950Config<'a> {
        &self.config
    }

    /// Give the hardware back. Capture should be stopped first, otherwise
    /// the notification stays armed.
    pub fn release(self) -> (SPI, RST, D, IRQ, Producer<'a, N>) {
        (
            self.regs.release(),
            self.reset,
            self.delay,
            self.fifo_ready,
            self.producer,
        )
    }
}
