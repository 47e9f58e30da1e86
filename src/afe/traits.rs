// Licensed under the Apache-2.0 license

//! Platform hooks the driver needs beyond `embedded-hal`.
//!
//! SPI, the reset line and delays come straight from `embedded-hal` 1.0.
//! What it has no trait for is edge-triggered notification: arming an
//! interrupt on the FIFO_RDY line and tearing it down again. Platforms
//! implement [`EdgeNotifier`] for that; their interrupt handler then calls
//! [`Afe4950::on_fifo_ready`](crate::afe::Afe4950::on_fifo_ready) on the
//! driver instance it owns.

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
}

/// Edge-triggered notification on one input line.
///
/// Arming and disarming must be repeatable any number of times.
///
/// # Examples
///
/// ```rust,ignore
/// struct ExtiLine<'d> { pin: Input<'d>, }
///
/// impl EdgeNotifier for ExtiLine<'_> {
///     type Error = core::convert::Infallible;
///
///     fn arm(&mut self, edge: Edge) -> Result<(), Self::Error> {
///         self.pin.listen(match edge {
///             Edge::Rising => Event::RisingEdge,
///             Edge::Falling => Event::FallingEdge,
///         });
///         Ok(())
///     }
///
///     fn disarm(&mut self) -> Result<(), Self::Error> {
///         self.pin.unlisten();
///         Ok(())
///     }
/// }
/// ```
pub trait EdgeNotifier {
    type Error: embedded_hal::digital::Error;

    /// Start delivering notifications on `edge`.
    fn arm(&mut self, edge: Edge) -> Result<(), Self::Error>;

    /// Stop delivering notifications.
    fn disarm(&mut self) -> Result<(), Self::Error>;

    /// Hold back delivery while a notification is being handled.
    ///
    /// Only platforms whose edge interrupts can nest need to override this.
    fn mask(&mut self) {}

    /// Undo [`mask`](Self::mask).
    fn unmask(&mut self) {}
}
