// Licensed under the Apache-2.0 license

//! Logging hooks shared by the driver modules.
//!
//! Drivers take a `L: Logger` type parameter defaulting to [`NoOpLogger`], so
//! a build that never logs pays nothing for it.

use core::fmt;

/// Sink for driver diagnostics.
pub trait Logger {
    fn debug(&mut self, args: fmt::Arguments<'_>);
    fn error(&mut self, args: fmt::Arguments<'_>);
}

/// Logger that discards everything.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoOpLogger;

impl Logger for NoOpLogger {
    fn debug(&mut self, _args: fmt::Arguments<'_>) {}
    fn error(&mut self, _args: fmt::Arguments<'_>) {}
}

/// Logger that writes one line per message to an `embedded_io::Write` sink,
/// typically a UART.
///
/// Write errors are dropped: a failing console must not take the driver down.
pub struct WriterLogger<W: embedded_io::Write> {
    writer: W,
}

impl<W: embedded_io::Write> WriterLogger<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: embedded_io::Write> Logger for WriterLogger<W> {
    fn debug(&mut self, args: fmt::Arguments<'_>) {
        let _ = write!(self.writer, "[afe] {args}\r\n");
    }

    fn error(&mut self, args: fmt::Arguments<'_>) {
        let _ = write!(self.writer, "[afe] error: {args}\r\n");
    }
}

/// Logger that forwards to the `defmt` global logger.
#[cfg(feature = "defmt")]
#[derive(Copy, Clone, Debug, Default)]
pub struct DefmtLogger;

#[cfg(feature = "defmt")]
impl Logger for DefmtLogger {
    fn debug(&mut self, args: fmt::Arguments<'_>) {
        defmt::debug!("{}", defmt::Display2Format(&args));
    }

    fn error(&mut self, args: fmt::Arguments<'_>) {
        defmt::error!("{}", defmt::Display2Format(&args));
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    struct VecWriter(Vec<u8>);

    impl embedded_io::ErrorType for VecWriter {
        type Error = core::convert::Infallible;
    }

    impl embedded_io::Write for VecWriter {
        fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    #[test]
    fn test_writer_logger_formats_lines() {
        let mut logger = WriterLogger::new(VecWriter(Vec::new()));
        logger.debug(format_args!("page {}", 1));
        logger.error(format_args!("register {:#04x}", 0x1d));

        let out = logger.into_inner().0;
        assert_eq!(
            std::str::from_utf8(&out).unwrap(),
            "[afe] page 1\r\n[afe] error: register 0x1d\r\n"
        );
    }
}
