// Licensed under the Apache-2.0 license

//! Fixed-capacity byte ring shared between the FIFO-ready handler and the
//! application.
//!
//! ## Design
//!
//! - One producer ([`Producer`], owned by the capture path) and one consumer
//!   ([`Consumer`], owned by the application), obtained once through
//!   [`RingBuffer::split`].
//! - Indices and storage are atomics, so neither side ever takes a lock or
//!   waits on the other.
//! - `head` and `tail` are counters that run up to the largest multiple of
//!   `N` a `usize` holds before wrapping; the slot is the counter modulo
//!   `N`. The ring is empty when `head == tail`. One slot is always
//!   left unused, so a ring of `N` slots holds at most `N - 1` bytes.
//! - Pushing into a full ring discards the oldest byte. The producer moves
//!   `tail` forward with a compare-exchange; the consumer claims each byte
//!   with a compare-exchange on the same counter and retries if the
//!   producer got there first. Comparing whole counters rather than slot
//!   positions means a producer that laps the ring while the consumer is
//!   mid-claim still makes the claim fail.
//!
//! ## Usage
//!
//! ```
//! use afe4950_ddk::ring_buffer::RingBuffer;
//!
//! let mut ring: RingBuffer<8> = RingBuffer::new();
//! let (mut producer, mut consumer) = ring.split();
//!
//! producer.push(0xAB);
//! assert_eq!(consumer.available_bytes(), 1);
//! assert_eq!(consumer.read_byte(), Ok(0xAB));
//! assert!(consumer.read_byte().is_err());
//! ```

use core::convert::Infallible;
use core::sync::atomic::{AtomicU8, AtomicUsize, Ordering};

use crate::frame::{TaggedFrame, FRAME_SIZE};

/// Ring size for 20 packets of 224 bytes (FIFO pointer 0x35).
pub const DEFAULT_RING_CAPACITY: usize = 4480;

pub struct RingBuffer<const N: usize> {
    storage: [AtomicU8; N],
    head: AtomicUsize,
    tail: AtomicUsize,
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RingBuffer<N> {
    const MIN_CAPACITY: () = assert!(N >= 2, "ring buffer needs at least two slots");
    /// Counters wrap here, so every slot keeps the same counter residue.
    const WRAP: usize = N * (usize::MAX / N);

    /// Create an empty ring. Usable in a `static`.
    #[must_use]
    pub const fn new() -> Self {
        let () = Self::MIN_CAPACITY;
        Self {
            storage: [const { AtomicU8::new(0) }; N],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    /// Hand out the producer and consumer halves.
    ///
    /// Borrowing `self` mutably guarantees there is exactly one of each.
    pub fn split(&mut self) -> (Producer<'_, N>, Consumer<'_, N>) {
        let ring: &Self = self;
        (Producer { ring }, Consumer { ring })
    }

    /// Number of slots, including the one that is never filled.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Bytes currently stored.
    #[must_use]
    pub fn size(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        Self::distance(head, tail)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.load(Ordering::Acquire) == self.tail.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.size() >= N - 1
    }

    const fn next(counter: usize) -> usize {
        if counter + 1 == Self::WRAP {
            0
        } else {
            counter + 1
        }
    }

    const fn distance(head: usize, tail: usize) -> usize {
        if head >= tail {
            head - tail
        } else {
            Self::WRAP - tail + head
        }
    }

    fn slot(&self, counter: usize) -> Option<&AtomicU8> {
        self.storage.get(counter % N)
    }

    fn push(&self, byte: u8) {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if Self::distance(head, tail) >= N - 1 {
            // Full. If the consumer popped in the meantime the exchange
            // fails and there is room anyway.
            let _ = self.tail.compare_exchange(
                tail,
                Self::next(tail),
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }
        if let Some(slot) = self.slot(head) {
            slot.store(byte, Ordering::Relaxed);
        }
        self.head.store(Self::next(head), Ordering::Release);
    }

    /// Oldest byte and the `tail` it was read at, without consuming it.
    fn peek(&self) -> Option<(usize, u8)> {
        let tail = self.tail.load(Ordering::Acquire);
        if tail == self.head.load(Ordering::Acquire) {
            return None;
        }
        let byte = self.slot(tail)?.load(Ordering::Relaxed);
        Some((tail, byte))
    }

    /// Consume the byte `peek` saw at `tail`. Fails if the producer has
    /// moved `tail` since, however far.
    fn claim(&self, tail: usize) -> bool {
        self.tail
            .compare_exchange(tail, Self::next(tail), Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn pop(&self) -> Option<u8> {
        loop {
            let (tail, byte) = self.peek()?;
            // A failed claim means the producer overwrote this byte.
            if self.claim(tail) {
                return Some(byte);
            }
        }
    }

    fn clear(&self) {
        let head = self.head.load(Ordering::Acquire);
        self.tail.store(head, Ordering::Release);
    }
}

/// Writing half of a [`RingBuffer`]. Never blocks and never fails.
pub struct Producer<'a, const N: usize> {
    ring: &'a RingBuffer<N>,
}

impl<const N: usize> Producer<'_, N> {
    /// Append a byte, discarding the oldest one if the ring is full.
    pub fn push(&mut self, byte: u8) {
        self.ring.push(byte);
    }

    pub fn push_frame(&mut self, frame: TaggedFrame) {
        for byte in frame.to_bytes() {
            self.ring.push(byte);
        }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.ring.size()
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }
}

impl<const N: usize> embedded_io::ErrorType for Producer<'_, N> {
    type Error = Infallible;
}

impl<const N: usize> embedded_io::Write for Producer<'_, N> {
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        for &byte in buf {
            self.ring.push(byte);
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Reading half of a [`RingBuffer`].
///
/// Reads are non-blocking: `nb::Error::WouldBlock` means there is not
/// enough data yet, and nothing was consumed.
pub struct Consumer<'a, const N: usize> {
    ring: &'a RingBuffer<N>,
}

impl<const N: usize> Consumer<'_, N> {
    #[must_use]
    pub fn available_bytes(&self) -> usize {
        self.ring.size()
    }

    /// Pop the oldest byte.
    pub fn read_byte(&mut self) -> nb::Result<u8, Infallible> {
        self.ring.pop().ok_or(nb::Error::WouldBlock)
    }

    /// Fill `dst` completely or consume nothing.
    ///
    /// The producer only ever adds bytes, so once enough are available
    /// every pop below succeeds.
    pub fn read_bytes(&mut self, dst: &mut [u8]) -> nb::Result<(), Infallible> {
        if self.ring.size() < dst.len() {
            return Err(nb::Error::WouldBlock);
        }
        for slot in dst.iter_mut() {
            if let Some(byte) = self.ring.pop() {
                *slot = byte;
            }
        }
        Ok(())
    }

    /// Pop one whole frame, or nothing.
    pub fn read_frame(&mut self) -> nb::Result<TaggedFrame, Infallible> {
        let mut bytes = [0u8; FRAME_SIZE];
        self.read_bytes(&mut bytes)?;
        Ok(TaggedFrame::from_bytes(bytes))
    }

    /// Drop everything currently buffered.
    ///
    /// Only the consumer's index moves; `head` belongs to the producer,
    /// which may be pushing at the same time.
    pub fn clear(&mut self) {
        self.ring.clear();
    }

    #[must_use]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }
}
