// Licensed under the Apache-2.0 license

//! Tagged sample frames.
//!
//! Every value the capture path hands to the consumer travels as a 4-byte
//! record: a 24-bit payload, least-significant byte first, followed by a
//! tag byte naming what the payload is. One FIFO drain produces
//!
//! ```text
//! [0x000000 | FrameStart] [pointer | FifoPointer] [word | FifoWord] x (pointer + 1) mod 256
//! ```

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// Size of one frame on the wire.
pub const FRAME_SIZE: usize = 4;

/// Frames emitted ahead of the FIFO words in every drain.
pub const HEADER_FRAMES: usize = 2;

/// Semantic role of a frame payload.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Tag {
    /// Start of a drain; payload is always zero.
    FrameStart = 0x02,
    /// Snapshot of the FIFO write pointer that sized the drain.
    FifoPointer = 0x03,
    /// One word read out of the FIFO.
    FifoWord = 0x05,
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        match raw {
            0x02 => Ok(Self::FrameStart),
            0x03 => Ok(Self::FifoPointer),
            0x05 => Ok(Self::FifoWord),
            other => Err(other),
        }
    }
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout, Unaligned,
)]
#[repr(C)]
pub struct TaggedFrame {
    payload: [u8; 3],
    tag: u8,
}

impl TaggedFrame {
    /// Build a frame; bits above 23 of `value` are dropped.
    #[must_use]
    pub const fn new(value: u32, tag: Tag) -> Self {
        let [lsb, mid, msb, _] = value.to_le_bytes();
        Self {
            payload: [lsb, mid, msb],
            tag: tag as u8,
        }
    }

    #[must_use]
    pub const fn value(&self) -> u32 {
        let [lsb, mid, msb] = self.payload;
        u32::from_le_bytes([lsb, mid, msb, 0])
    }

    /// The tag, or `None` if the byte is not one this driver emits
    /// (a misaligned stream after an overflow shows up here).
    #[must_use]
    pub fn tag(&self) -> Option<Tag> {
        Tag::try_from(self.tag).ok()
    }

    #[must_use]
    pub const fn raw_tag(&self) -> u8 {
        self.tag
    }

    #[must_use]
    pub fn to_bytes(self) -> [u8; FRAME_SIZE] {
        zerocopy::transmute!(self)
    }

    #[must_use]
    pub fn from_bytes(bytes: [u8; FRAME_SIZE]) -> Self {
        zerocopy::transmute!(bytes)
    }
}

/// View a byte stream of whole frames as frames, without copying.
///
/// Returns `None` if `bytes` is not a multiple of [`FRAME_SIZE`].
#[must_use]
pub fn frames(bytes: &[u8]) -> Option<&[TaggedFrame]> {
    <[TaggedFrame]>::ref_from_bytes(bytes).ok()
}

/// Bytes produced by one drain for a given FIFO pointer snapshot.
#[must_use]
pub const fn packet_len(fifo_pointer: u8) -> usize {
    let words = fifo_pointer.wrapping_add(1) as usize;
    (HEADER_FRAMES + words) * FRAME_SIZE
}
