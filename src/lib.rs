// Licensed under the Apache-2.0 license

//! Driver kit for the TI AFE4950 ECG/PPG analog front end.
//!
//! The crate is split the same way the data flows:
//!
//! - [`afe`]: register access protocol, device lifecycle and the FIFO
//!   capture controller, all written against `embedded-hal` 1.0 traits.
//! - [`ring_buffer`]: the single-producer/single-consumer byte ring that
//!   decouples the FIFO-ready handler from the application.
//! - [`frame`]: the 4-byte tagged frame the capture path emits and the
//!   consumer parses.
//! - [`common`]: logging hooks shared by the modules above.

// Enforce Copilot coding guidelines - prevent panic-prone patterns in production code only
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::indexing_slicing))]
#![cfg_attr(not(test), warn(clippy::expect_used))]
#![cfg_attr(not(test), no_std)]
pub mod afe;
pub mod common;
pub mod frame;
pub mod ring_buffer;

pub use afe::{Afe4950, Afe4950Config, Afe4950ConfigBuilder, Error};
pub use frame::{Tag, TaggedFrame};
pub use ring_buffer::{Consumer, Producer, RingBuffer};
