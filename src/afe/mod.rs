// Licensed under the Apache-2.0 license

//! AFE4950 analog front end over SPI.

pub mod afe4950;
mod capture;
pub mod common;
mod lifecycle;
#[cfg(test)]
mod mock;
pub mod protocol;
pub mod traits;
pub mod validation;

pub use afe4950::{Afe4950, Error};
pub use common::{
    Afe4950Config, Afe4950ConfigBuilder, CaptureStatus, DeviceState, Mode, Page, Register,
    SPI_FREQUENCY, SPI_MODE,
};
pub use protocol::{ControlRegisters, RegisterInterface};
pub use traits::{Edge, EdgeNotifier};
pub use validation::{Mismatch, ValidationReport};
