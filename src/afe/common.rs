// Licensed under the Apache-2.0 license

//! Common types and constants for the AFE4950 driver modules.
//!
//! This module provides the register model, the control-register
//! encodings and the driver configuration shared by the protocol,
//! lifecycle and capture code.

use fugit::{HertzU32, MicrosDurationU32, MillisDurationU32};

/// Largest value a register holds.
pub const REGISTER_DATA_MASK: u32 = 0x00FF_FFFF;

/// Read/write-mode select register. Not readable over the bus.
pub const MODE_REGISTER: u8 = 0x00;
/// Page select register.
pub const PAGE_REGISTER: u8 = 0x01;

/// Bit 0 of [`MODE_REGISTER`]: subsequent transactions are reads.
pub const MODE_READ_BIT: u32 = 1 << 0;
/// Bit 0 of [`PAGE_REGISTER`]: page 1 is selected.
pub const PAGE_SELECT_BIT: u32 = 1 << 0;

/// [`MODE_REGISTER`] command: clear every register except the page-1 set.
pub const SOFTWARE_RESET_CMD: u32 = 0x00_0008;
/// [`MODE_REGISTER`] command: normal operation, timing counter restarted.
pub const NORMAL_OPERATION_CMD: u32 = 0x00_0002;
/// [`MODE_REGISTER`] command: enable the FIFO write path.
pub const FIFO_ENABLE_CMD: u32 = 0x00_0040;

/// FIFO write-pointer register (page 0). Low byte holds the pointer.
pub const FIFO_POINTER_REGISTER: u8 = 0x6D;
/// FIFO data register (page 0). Each read pops one FIFO word.
pub const FIFO_DATA_REGISTER: u8 = 0xFF;

/// FIFO configuration written last during configuration: watermark at
/// 54 words, FIFO enabled.
pub const DEFAULT_FIFO_CONFIG: Register = Register::new(0x1D, 0xE0_0140);

/// Page-0 addresses that do not echo the written value on read.
pub const DEFAULT_WRITE_ONLY: [u8; 6] = [0x28, 0x30, 0x6D, 0xAE, 0xBC, 0x9A];

/// SPI settings the AFE4950 expects: mode 0, MSB first.
pub const SPI_MODE: embedded_hal::spi::Mode = embedded_hal::spi::MODE_0;
/// SPI clock used by the reference acquisition board.
pub const SPI_FREQUENCY: HertzU32 = HertzU32::from_raw(4_000_000);

/// One device register: an 8-bit address and a 24-bit value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Register {
    pub address: u8,
    pub data: u32,
}

impl Register {
    /// Bits above 23 of `data` are dropped.
    #[must_use]
    pub const fn new(address: u8, data: u32) -> Self {
        Self {
            address,
            data: data & REGISTER_DATA_MASK,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Page {
    Page0,
    Page1,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Mode {
    Write,
    Read,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureStatus {
    Stopped,
    Running,
}

/// Where the device is in its configuration pass.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceState {
    Unconfigured,
    Configuring,
    Validated,
    ValidationFailed,
}

/// Everything `configure` needs besides the hardware handles.
///
/// The register tables are opaque input: one chip setup, pre-split by page.
#[derive(Copy, Clone, Debug)]
pub struct Afe4950Config<'a> {
    pub page0: &'a [Register],
    pub page1: &'a [Register],
    pub write_only: &'a [u8],
    pub fifo_config: Register,
    pub reset_pulse: MicrosDurationU32,
    pub boot_time: MillisDurationU32,
    pub soft_reset_time: MillisDurationU32,
}

impl Afe4950Config<'_> {
    /// Whether `address` on page 0 is skipped during read-back.
    #[must_use]
    pub fn is_write_only(&self, address: u8) -> bool {
        self.write_only.contains(&address)
    }
}

pub struct Afe4950ConfigBuilder<'a> {
    page0: &'a [Register],
    page1: &'a [Register],
    write_only: &'a [u8],
    fifo_config: Register,
    reset_pulse: MicrosDurationU32,
    boot_time: MillisDurationU32,
    soft_reset_time: MillisDurationU32,
}

impl Default for Afe4950ConfigBuilder<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> Afe4950ConfigBuilder<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            page0: &[],
            page1: &[],
            write_only: &DEFAULT_WRITE_ONLY,
            fifo_config: DEFAULT_FIFO_CONFIG,
            reset_pulse: MicrosDurationU32::micros(50),
            boot_time: MillisDurationU32::millis(1000),
            soft_reset_time: MillisDurationU32::millis(1000),
        }
    }
    #[must_use]
    pub fn page0(mut self, registers: &'a [Register]) -> Self {
        self.page0 = registers;
        self
    }
    #[must_use]
    pub fn page1(mut self, registers: &'a [Register]) -> Self {
        self.page1 = registers;
        self
    }
    #[must_use]
    pub fn write_only(mut self, addresses: &'a [u8]) -> Self {
        self.write_only = addresses;
        self
    }
    #[must_use]
    pub fn fifo_config(mut self, register: Register) -> Self {
        self.fifo_config = register;
        self
    }
    #[must_use]
    pub fn reset_pulse(mut self, pulse: MicrosDurationU32) -> Self {
        self.reset_pulse = pulse;
        self
    }
    #[must_use]
    pub fn boot_time(mut self, wait: MillisDurationU32) -> Self {
        self.boot_time = wait;
        self
    }
    #[must_use]
    pub fn soft_reset_time(mut self, wait: MillisDurationU32) -> Self {
        self.soft_reset_time = wait;
        self
    }
    #[must_use]
    pub fn build(self) -> Afe4950Config<'a> {
        Afe4950Config {
            page0: self.page0,
            page1: self.page1,
            write_only: self.write_only,
            fifo_config: self.fifo_config,
            reset_pulse: self.reset_pulse,
            boot_time: self.boot_time,
            soft_reset_time: self.soft_reset_time,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_masks_to_24_bits() {
        let reg = Register::new(0x10, 0xAB12_3456);
        assert_eq!(reg.data, 0x12_3456);
    }

    #[test]
    fn test_builder_defaults() {
        let config = Afe4950ConfigBuilder::new().build();
        assert_eq!(config.fifo_config, Register::new(0x1D, 0xE00140));
        assert_eq!(config.reset_pulse.to_micros(), 50);
        assert_eq!(config.boot_time.to_millis(), 1000);
        assert_eq!(config.soft_reset_time.to_millis(), 1000);
        for address in [0x28, 0x30, 0x6D, 0xAE, 0xBC, 0x9A] {
            assert!(config.is_write_only(address));
        }
        assert!(!config.is_write_only(0x1D));
    }

    #[test]
    fn test_builder_overrides() {
        static PAGE0: [Register; 1] = [Register::new(0x02, 0x01)];
        let config = Afe4950ConfigBuilder::new()
            .page0(&PAGE0)
            .write_only(&[])
            .boot_time(MillisDurationU32::millis(5))
            .build();
        assert_eq!(config.page0.len(), 1);
        assert!(config.page1.is_empty());
        assert!(!config.is_write_only(0x6D));
        assert_eq!(config.boot_time.to_millis(), 5);
    }
}
