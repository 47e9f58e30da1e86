// Licensed under the Apache-2.0 license

//! AFE4950 register access protocol.
//!
//! Every register transaction is four bytes inside one chip-select frame:
//! the address byte, then 24 bits of data MSB first. Whether those 24 bits
//! are written or clocked back out depends on bit 0 of register 0x00, and
//! which physical register an address hits depends on bit 0 of register
//! 0x01. Neither control register can be read back reliably, so the
//! driver mirrors both in [`ControlRegisters`] and keeps the mirrors equal
//! to the last value it actually wrote: a mirror only changes after the
//! transaction carrying the new value succeeded.
//!
//! Rules enforced here:
//! - a write while the chip is in read mode first switches it to write mode;
//! - a read while the chip is in write mode first switches it to read mode;
//! - register 0x00 is never read over the bus; its mirror is returned.
//!
//! Page selection is left to the caller, which knows which table an
//! address came from.

use embedded_hal::spi::SpiDevice;

use crate::afe::common::{
    Mode, Page, Register, MODE_READ_BIT, MODE_REGISTER, PAGE_REGISTER, PAGE_SELECT_BIT,
};

/// Mirrors of the mode and page control registers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlRegisters {
    mode: Register,
    page: Register,
}

impl Default for ControlRegisters {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlRegisters {
    /// Power-on state: write mode, page 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            mode: Register::new(MODE_REGISTER, 0),
            page: Register::new(PAGE_REGISTER, 0),
        }
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        if self.mode.data & MODE_READ_BIT != 0 {
            Mode::Read
        } else {
            Mode::Write
        }
    }

    #[must_use]
    pub fn page(&self) -> Page {
        if self.page.data & PAGE_SELECT_BIT != 0 {
            Page::Page1
        } else {
            Page::Page0
        }
    }

    #[must_use]
    pub const fn mode_register(&self) -> Register {
        self.mode
    }

    #[must_use]
    pub const fn page_register(&self) -> Register {
        self.page
    }

    /// Forget both mirrors; the hardware reset state is all zeros.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    fn with_mode(&self, mode: Mode) -> Register {
        let data = match mode {
            Mode::Write => self.mode.data & !MODE_READ_BIT,
            Mode::Read => self.mode.data | MODE_READ_BIT,
        };
        Register::new(MODE_REGISTER, data)
    }

    fn with_page(&self, page: Page) -> Register {
        let data = match page {
            Page::Page0 => self.page.data & !PAGE_SELECT_BIT,
            Page::Page1 => self.page.data | PAGE_SELECT_BIT,
        };
        Register::new(PAGE_REGISTER, data)
    }

    /// Update the matching mirror if `reg` is a control register.
    fn record(&mut self, reg: Register) {
        match reg.address {
            MODE_REGISTER => self.mode = reg,
            PAGE_REGISTER => self.page = reg,
            _ => {}
        }
    }
}

/// Register-level access to an AFE4950 on an SPI device.
pub struct RegisterInterface<SPI> {
    spi: SPI,
    ctrl: ControlRegisters,
}

impl<SPI: SpiDevice> RegisterInterface<SPI> {
    pub fn new(spi: SPI) -> Self {
        Self {
            spi,
            ctrl: ControlRegisters::new(),
        }
    }

    #[must_use]
    pub fn control(&self) -> &ControlRegisters {
        &self.ctrl
    }

    /// Reset the mirrors after the chip itself was reset.
    pub fn forget_control_state(&mut self) {
        self.ctrl.clear();
    }

    pub fn release(self) -> SPI {
        self.spi
    }

    /// Select the register page subsequent addresses resolve against.
    ///
    /// # Errors
    ///
    /// Returns the SPI error if a transaction fails.
    pub fn switch_page(&mut self, page: Page) -> Result<(), SPI::Error> {
        let reg = self.ctrl.with_page(page);
        self.write_register(reg)
    }

    /// Flip the chip between read and write transactions.
    ///
    /// Goes straight to the bus: routing through `write_register` would
    /// itself try to fix up the mode.
    ///
    /// # Errors
    ///
    /// Returns the SPI error if the transaction fails.
    pub fn switch_mode(&mut self, mode: Mode) -> Result<(), SPI::Error> {
        let reg = self.ctrl.with_mode(mode);
        self.bus_write(reg)?;
        self.ctrl.record(reg);
        Ok(())
    }

    /// # Errors
    ///
    /// Returns the SPI error if a transaction fails.
    pub fn write_register(&mut self, reg: Register) -> Result<(), SPI::Error> {
        if self.ctrl.mode() == Mode::Read {
            self.switch_mode(Mode::Write)?;
        }
        self.bus_write(reg)?;
        self.ctrl.record(reg);
        Ok(())
    }

    /// Read a register on the currently selected page.
    ///
    /// # Errors
    ///
    /// Returns the SPI error if a transaction fails.
    pub fn read_register(&mut self, address: u8) -> Result<u32, SPI::Error> {
        if self.ctrl.mode() != Mode::Read {
            self.switch_mode(Mode::Read)?;
        }
        self.bus_read(address)
    }

    fn bus_write(&mut self, reg: Register) -> Result<(), SPI::Error> {
        let [_, msb, mid, lsb] = reg.data.to_be_bytes();
        self.spi.write(&[reg.address, msb, mid, lsb])
    }

    fn bus_read(&mut self, address: u8) -> Result<u32, SPI::Error> {
        // Issuing a transaction to 0x00 would overwrite the mode bits, so
        // the mirror stands in for the hardware value.
        // TODO: confirm against the AFE4950 datasheet whether 0x00 has a
        // real read path before relying on anything but the mirror.
        if address == MODE_REGISTER {
            return Ok(self.ctrl.mode.data);
        }
        debug_assert_eq!(self.ctrl.mode(), Mode::Read);

        let mut frame = [address, 0x00, 0x00, 0x00];
        self.spi.transfer_in_place(&mut frame)?;
        let [_, msb, mid, lsb] = frame;
        Ok(u32::from_be_bytes([0, msb, mid, lsb]))
    }
}
