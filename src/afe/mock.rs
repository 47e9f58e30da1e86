// Licensed under the Apache-2.0 license

//! Test doubles for the AFE4950 and the board around it.
//!
//! Each mock is a cheap handle over shared state, so a test can move one
//! copy into the driver and keep another to inspect what happened.

use core::convert::Infallible;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::{self, Operation, SpiDevice};

use crate::afe::common::{
    Page, DEFAULT_WRITE_ONLY, FIFO_DATA_REGISTER, FIFO_POINTER_REGISTER, MODE_READ_BIT,
    MODE_REGISTER, PAGE_REGISTER, PAGE_SELECT_BIT, REGISTER_DATA_MASK, SOFTWARE_RESET_CMD,
};
use crate::afe::traits::{Edge, EdgeNotifier};

/// What the simulated chip saw, one entry per register transaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BusEvent {
    Write(u8, u32),
    Read(u8, u32),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MockSpiError;

impl spi::Error for MockSpiError {
    fn kind(&self) -> spi::ErrorKind {
        spi::ErrorKind::Other
    }
}

struct State {
    mode: u32,
    page: u32,
    page0: HashMap<u8, u32>,
    page1: HashMap<u8, u32>,
    write_only: HashSet<u8>,
    corrupt: Option<(Page, u8)>,
    fifo_pointer: u32,
    next_fifo_word: u32,
    fail_after: Option<usize>,
    frames: Vec<[u8; 4]>,
    events: Vec<BusEvent>,
}

impl State {
    fn current_page(&self) -> Page {
        if self.page & PAGE_SELECT_BIT != 0 {
            Page::Page1
        } else {
            Page::Page0
        }
    }

    fn bank(&mut self, page: Page) -> &mut HashMap<u8, u32> {
        match page {
            Page::Page0 => &mut self.page0,
            Page::Page1 => &mut self.page1,
        }
    }

    fn read(&mut self, address: u8) -> u32 {
        let page = self.current_page();
        match (page, address) {
            (Page::Page0, FIFO_POINTER_REGISTER) => self.fifo_pointer,
            (Page::Page0, FIFO_DATA_REGISTER) => {
                let word = self.next_fifo_word;
                self.next_fifo_word = (word + 1) & REGISTER_DATA_MASK;
                word
            }
            (Page::Page0, addr) if self.write_only.contains(&addr) => 0,
            (page, addr) => {
                let value = self.bank(page).get(&addr).copied().unwrap_or(0);
                if self.corrupt == Some((page, addr)) {
                    value ^ 0x1
                } else {
                    value
                }
            }
        }
    }

    fn exchange(&mut self, frame: [u8; 4]) -> Result<[u8; 4], MockSpiError> {
        if self.fail_after == Some(self.frames.len()) {
            return Err(MockSpiError);
        }
        self.frames.push(frame);

        let [address, msb, mid, lsb] = frame;
        let data = u32::from_be_bytes([0, msb, mid, lsb]);

        // The mode register is always written, even in read mode.
        if address == MODE_REGISTER {
            self.mode = data;
            if data & SOFTWARE_RESET_CMD != 0 {
                self.page0.clear();
            }
            self.events.push(BusEvent::Write(address, data));
            return Ok([0; 4]);
        }

        if self.mode & MODE_READ_BIT != 0 {
            let value = self.read(address);
            self.events.push(BusEvent::Read(address, value));
            let [_, msb, mid, lsb] = value.to_be_bytes();
            return Ok([address, msb, mid, lsb]);
        }

        if address == PAGE_REGISTER {
            self.page = data;
        } else {
            let page = self.current_page();
            self.bank(page).insert(address, data);
        }
        self.events.push(BusEvent::Write(address, data));
        Ok([0; 4])
    }
}

/// Register-level model of the chip: two register banks, mode and page
/// control, a FIFO that counts up, and optional fault injection.
#[derive(Clone)]
pub struct SimulatedAfe {
    state: Rc<RefCell<State>>,
}

impl SimulatedAfe {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                mode: 0,
                page: 0,
                page0: HashMap::new(),
                page1: HashMap::new(),
                write_only: DEFAULT_WRITE_ONLY.into_iter().collect(),
                corrupt: None,
                fifo_pointer: 0,
                next_fifo_word: 0,
                fail_after: None,
                frames: Vec::new(),
                events: Vec::new(),
            })),
        }
    }

    pub fn spi(&self) -> MockSpi {
        MockSpi {
            state: Rc::clone(&self.state),
        }
    }

    pub fn preload(&self, page: Page, address: u8, value: u32) {
        self.state.borrow_mut().bank(page).insert(address, value);
    }

    pub fn value(&self, page: Page, address: u8) -> Option<u32> {
        self.state.borrow_mut().bank(page).get(&address).copied()
    }

    /// Make reads of one register come back with bit 0 flipped.
    pub fn corrupt(&self, page: Page, address: u8) {
        self.state.borrow_mut().corrupt = Some((page, address));
    }

    pub fn set_fifo_pointer(&self, pointer: u32) {
        self.state.borrow_mut().fifo_pointer = pointer;
    }

    /// Fail the transaction after `count` successful ones.
    pub fn fail_after(&self, count: usize) {
        self.state.borrow_mut().fail_after = Some(count);
    }

    pub fn mode_register(&self) -> u32 {
        self.state.borrow().mode
    }

    pub fn page(&self) -> Page {
        self.state.borrow().current_page()
    }

    pub fn frames(&self) -> Vec<[u8; 4]> {
        self.state.borrow().frames.clone()
    }

    pub fn events(&self) -> Vec<BusEvent> {
        self.state.borrow().events.clone()
    }

    pub fn clear_events(&self) {
        let mut state = self.state.borrow_mut();
        state.events.clear();
        state.frames.clear();
    }
}

pub struct MockSpi {
    state: Rc<RefCell<State>>,
}

impl spi::ErrorType for MockSpi {
    type Error = MockSpiError;
}

impl SpiDevice for MockSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Self::Error> {
        let mut state = self.state.borrow_mut();
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    let frame: [u8; 4] = (*bytes).try_into().map_err(|_| MockSpiError)?;
                    state.exchange(frame)?;
                }
                Operation::TransferInPlace(bytes) => {
                    let frame: [u8; 4] = (&**bytes).try_into().map_err(|_| MockSpiError)?;
                    let reply = state.exchange(frame)?;
                    bytes.copy_from_slice(&reply);
                }
                _ => return Err(MockSpiError),
            }
        }
        Ok(())
    }
}

/// Output pin that records every level it is driven to.
#[derive(Clone, Default)]
pub struct MockPin {
    levels: Rc<RefCell<Vec<bool>>>,
}

impl MockPin {
    pub fn levels(&self) -> Vec<bool> {
        self.levels.borrow().clone()
    }
}

impl embedded_hal::digital::ErrorType for MockPin {
    type Error = Infallible;
}

impl OutputPin for MockPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.levels.borrow_mut().push(true);
        Ok(())
    }
}

/// Delay that returns immediately and records the requested waits in
/// nanoseconds.
#[derive(Clone, Default)]
pub struct MockDelay {
    waits: Rc<RefCell<Vec<u64>>>,
}

impl MockDelay {
    pub fn waits(&self) -> Vec<u64> {
        self.waits.borrow().clone()
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.waits.borrow_mut().push(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.waits.borrow_mut().push(u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.waits.borrow_mut().push(u64::from(ms) * 1_000_000);
    }
}

#[derive(Debug, Default)]
pub struct NotifierLog {
    pub armed: Option<Edge>,
    pub arm_calls: usize,
    pub disarm_calls: usize,
    pub mask_calls: usize,
    pub unmask_calls: usize,
}

#[derive(Clone, Default)]
pub struct MockNotifier {
    log: Rc<RefCell<NotifierLog>>,
}

impl MockNotifier {
    pub fn log(&self) -> std::cell::Ref<'_, NotifierLog> {
        self.log.borrow()
    }
}

impl EdgeNotifier for MockNotifier {
    type Error = Infallible;

    fn arm(&mut self, edge: Edge) -> Result<(), Self::Error> {
        let mut log = self.log.borrow_mut();
        log.armed = Some(edge);
        log.arm_calls += 1;
        Ok(())
    }

    fn disarm(&mut self) -> Result<(), Self::Error> {
        let mut log = self.log.borrow_mut();
        log.armed = None;
        log.disarm_calls += 1;
        Ok(())
    }

    fn mask(&mut self) {
        self.log.borrow_mut().mask_calls += 1;
    }

    fn unmask(&mut self) {
        self.log.borrow_mut().unmask_calls += 1;
    }
}
