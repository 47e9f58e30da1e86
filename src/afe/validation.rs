// Licensed under the Apache-2.0 license

//! Result of reading the configuration back from the device.

use heapless::Vec;

use crate::afe::common::Page;

/// Mismatches kept in a report; further ones are only counted.
pub const MAX_REPORTED_MISMATCHES: usize = 16;

/// One register whose read-back differs from the configured value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mismatch {
    pub page: Page,
    pub address: u8,
    pub expected: u32,
    pub actual: u32,
}

/// Outcome of a full read-back pass.
///
/// Every register is checked even after the first mismatch.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationReport {
    checked: usize,
    mismatch_count: usize,
    mismatches: Vec<Mismatch, MAX_REPORTED_MISMATCHES>,
}

impl ValidationReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&mut self, page: Page, address: u8, expected: u32, actual: u32) -> bool {
        self.checked += 1;
        if expected == actual {
            return true;
        }
        self.mismatch_count += 1;
        // Past capacity the mismatch is counted but not stored.
        let _ = self.mismatches.push(Mismatch {
            page,
            address,
            expected,
            actual,
        });
        false
    }

    /// True when every register read back as configured.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatch_count == 0
    }

    /// Registers compared.
    #[must_use]
    pub fn checked(&self) -> usize {
        self.checked
    }

    /// Total mismatches, including ones not stored.
    #[must_use]
    pub fn mismatch_count(&self) -> usize {
        self.mismatch_count
    }

    #[must_use]
    pub fn mismatches(&self) -> &[Mismatch] {
        &self.mismatches
    }
}
