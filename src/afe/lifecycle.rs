// Licensed under the Apache-2.0 license

//! Bringing the AFE4950 into a known configuration.
//!
//! `configure` runs the whole sequence once:
//!
//! 1. hardware reset through RESETZ, then software reset;
//! 2. page-0 table, then page-1 table;
//! 3. FIFO re-arm, with the FIFO configuration register written last;
//! 4. read-back of every table entry plus the FIFO configuration.
//!
//! A failed read-back is reported, not raised: the caller decides whether
//! to retry, give up or capture anyway.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiDevice;

use crate::afe::afe4950::{pin_error, Afe4950, Error};
use crate::afe::common::{
    CaptureStatus, DeviceState, Page, Register, FIFO_ENABLE_CMD, MODE_REGISTER,
    NORMAL_OPERATION_CMD, SOFTWARE_RESET_CMD,
};
use crate::afe::traits::EdgeNotifier;
use crate::afe::validation::ValidationReport;
use crate::common::Logger;

impl<SPI, RST, D, IRQ, const N: usize, L> Afe4950<'_, SPI, RST, D, IRQ, N, L>
where
    SPI: SpiDevice,
    RST: OutputPin,
    D: DelayNs,
    IRQ: EdgeNotifier,
    L: Logger,
{
    /// Reset, program and validate the device.
    ///
    /// `Ok` carries the read-back report; check
    /// [`ValidationReport::passed`] before trusting the samples.
    ///
    /// # Errors
    ///
    /// [`Error::CaptureRunning`] if capture is active, otherwise any bus or
    /// pin failure. On error the device is left `Unconfigured`.
    pub fn configure(&mut self) -> Result<ValidationReport, Error<SPI::Error>> {
        if self.capture == CaptureStatus::Running {
            return Err(Error::CaptureRunning);
        }
        self.state = DeviceState::Configuring;

        match self.run_configuration() {
            Ok(report) => {
                self.state = if report.passed() {
                    DeviceState::Validated
                } else {
                    DeviceState::ValidationFailed
                };
                self.logger.debug(format_args!(
                    "configuration checked {} registers, {} mismatched",
                    report.checked(),
                    report.mismatch_count()
                ));
                Ok(report)
            }
            Err(err) => {
                self.state = DeviceState::Unconfigured;
                self.logger.error(format_args!("configuration aborted"));
                Err(err)
            }
        }
    }

    fn run_configuration(&mut self) -> Result<ValidationReport, Error<SPI::Error>> {
        // RESETZ idles high.
        self.reset.set_high().map_err(pin_error)?;
        self.delay.delay_ms(1);

        self.reset()?;
        self.software_reset()?;

        let page0 = self.config.page0;
        let page1 = self.config.page1;
        self.write_table(Page::Page0, page0)?;
        self.write_table(Page::Page1, page1)?;

        self.fifo_config()?;
        self.validate_registers()
    }

    fn write_table(&mut self, page: Page, table: &[Register]) -> Result<(), Error<SPI::Error>> {
        self.logger.debug(format_args!(
            "writing {} registers to {:?}",
            table.len(),
            page
        ));
        self.regs.switch_page(page).map_err(Error::Spi)?;
        for reg in table {
            self.regs.write_register(*reg).map_err(Error::Spi)?;
        }
        Ok(())
    }

    /// Pulse RESETZ low and wait for the chip to boot.
    ///
    /// Both control registers are back at zero afterwards, so the mirrors
    /// are cleared too.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Pin`] if the reset line cannot be driven.
    pub fn reset(&mut self) -> Result<(), Error<SPI::Error>> {
        self.reset.set_low().map_err(pin_error)?;
        self.delay.delay_us(self.config.reset_pulse.to_micros());
        self.reset.set_high().map_err(pin_error)?;
        self.delay.delay_ms(self.config.boot_time.to_millis());

        self.regs.forget_control_state();
        self.logger.debug(format_args!("hardware reset done"));
        Ok(())
    }

    /// Clear every register except the page-1 set, then return to normal
    /// operation on page 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spi`] if a transaction fails.
    pub fn software_reset(&mut self) -> Result<(), Error<SPI::Error>> {
        self.regs
            .write_register(Register::new(MODE_REGISTER, SOFTWARE_RESET_CMD))
            .map_err(Error::Spi)?;
        self.delay.delay_ms(self.config.soft_reset_time.to_millis());

        self.regs.switch_page(Page::Page0).map_err(Error::Spi)?;
        self.regs
            .write_register(Register::new(MODE_REGISTER, NORMAL_OPERATION_CMD))
            .map_err(Error::Spi)
    }

    /// Restart the FIFO write path: select page 0, issue the normal
    /// operation and FIFO enable commands.
    pub(crate) fn rearm_fifo(&mut self) -> Result<(), Error<SPI::Error>> {
        self.regs.switch_page(Page::Page0).map_err(Error::Spi)?;
        self.regs
            .write_register(Register::new(MODE_REGISTER, NORMAL_OPERATION_CMD))
            .map_err(Error::Spi)?;
        self.regs
            .write_register(Register::new(MODE_REGISTER, FIFO_ENABLE_CMD))
            .map_err(Error::Spi)
    }

    /// Re-arm the FIFO and program its configuration register.
    ///
    /// The configuration register must be the last write of the sequence.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spi`] if a transaction fails.
    pub fn fifo_config(&mut self) -> Result<(), Error<SPI::Error>> {
        self.rearm_fifo()?;
        let fifo_config = self.config.fifo_config;
        self.regs.write_register(fifo_config).map_err(Error::Spi)
    }

    /// Read back both tables and the FIFO configuration register.
    ///
    /// Page-0 addresses listed as write-only are skipped. Leaves the chip
    /// on page 0 in read mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Spi`] if a transaction fails. Mismatches are not
    /// errors; they are collected in the report.
    pub fn validate_registers(&mut self) -> Result<ValidationReport, Error<SPI::Error>> {
        let mut report = ValidationReport::new();

        let page1 = self.config.page1;
        self.regs.switch_page(Page::Page1).map_err(Error::Spi)?;
        for reg in page1 {
            self.check(&mut report, Page::Page1, *reg)?;
        }

        let page0 = self.config.page0;
        self.regs.switch_page(Page::Page0).map_err(Error::Spi)?;
        for reg in page0 {
            if self.config.is_write_only(reg.address) {
                continue;
            }
            self.check(&mut report, Page::Page0, *reg)?;
        }

        let fifo_config = self.config.fifo_config;
        self.check(&mut report, Page::Page0, fifo_config)?;

        Ok(report)
    }

    fn check(
        &mut self,
        report: &mut ValidationReport,
        page: Page,
        reg: Register,
    ) -> Result<(), Error<SPI::Error>> {
        let actual = self.regs.read_register(reg.address).map_err(Error::Spi)?;
        if !report.record(page, reg.address, reg.data, actual) {
            self.logger.error(format_args!(
                "{:?} register {:#04x}: wrote {:#08x}, read {:#08x}",
                page, reg.address, reg.data, actual
            ));
        }
        Ok(())
    }
}
