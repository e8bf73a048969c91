//! # Tower motor bus interface
//!
//! The four tower motors are driven by a single controller on an addressed, point-to-point bus.
//! This module defines the exact byte frames the controller understands, the [`MotorBus`]
//! transport abstraction, and [`SimBus`], an in-memory transport used when no hardware is fitted.
//!
//! Frames:
//!
//! - Command: `[cmd]`
//! - Absolute position, one per tower: `[tower_address, step_count: i32 BE]`
//! - Increment, all towers at once: `[NEXT, nw: i16 BE, ne: i16 BE, sw: i16 BE, se: i16 BE]`
//! - Progress: a one byte read, the reply is a percentage where values above 100 are unknown.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::{cell::RefCell, rc::Rc};

use byteorder::{BigEndian, ByteOrder};
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Default bus address of the motor controller.
pub const DEFAULT_MOTOR_ADDRESS: u16 = 0x08;

/// Address bytes of the towers in absolute position frames, in NW, NE, SW, SE order.
pub const TOWER_ADDRESSES: [u8; NUM_TOWERS] = [b'1', b'2', b'3', b'4'];

/// Number of towers on the bus.
pub const NUM_TOWERS: usize = 4;

/// Length of an absolute position frame.
pub const POSITION_FRAME_LEN: usize = 5;

/// Length of an increment frame.
pub const INCREMENT_FRAME_LEN: usize = 9;

/// Largest step delta, either way, one increment frame carries for a tower.
pub const INCREMENT_MAX: i32 = i16::MAX as i32;

/// Progress value meaning the motion is complete.
pub const PROGRESS_DONE: u8 = 100;

/// Progress value reported while a motion is running or the controller gave no useful answer.
pub const PROGRESS_IN_PROGRESS: u8 = 50;

/// Reply value the progress buffer is primed with, anything at or above this is unknown.
pub const PROGRESS_UNKNOWN: u8 = 101;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Commands understood by the motor controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotorCmd {
    /// Disable position limits so the towers can be homed by hand.
    Calibrate,

    /// Return to normal limited operation.
    Normal,

    /// The last absolute positions sent are where the towers already are.
    Preset,

    /// The last absolute positions sent are a destination to drive to.
    Dest,

    /// Header of an increment frame.
    Next,
}

/// Decoded reply to a progress query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    /// A valid percentage, 0 - 100.
    Percent(u8),

    /// A reserved value was returned.
    Unknown(u8),

    /// The controller returned no data.
    NoReply,
}

/// Errors which can occur on the motor bus.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("Could not open the bus: {0}")]
    OpenFailed(String),

    #[error("Could not select device 0x{0:02x}: {1}")]
    AddressFailed(u16, String),

    #[error("Transfer to device 0x{0:02x} failed: {1}")]
    TransferFailed(u16, String),

    #[error("Only {1} of {2} bytes were written to device 0x{0:02x}")]
    ShortWrite(u16, usize, usize),
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A blocking transport to the motor controller.
///
/// Calls do not return until the transfer is complete or has failed.
pub trait MotorBus {
    /// Write a whole frame to the device at `address`.
    fn write(&mut self, address: u16, frame: &[u8]) -> Result<(), BusError>;

    /// Read into `buf` from the device at `address`, returning the number of bytes read.
    fn read(&mut self, address: u16, buf: &mut [u8]) -> Result<usize, BusError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// In-memory motor bus which records every frame written to it.
///
/// Clones share the same record, so a test can keep one handle while the control core owns
/// another.
#[derive(Debug, Default, Clone)]
pub struct SimBus {
    record: Rc<RefCell<SimBusRecord>>,
}

#[derive(Debug, Default)]
struct SimBusRecord {
    /// Frames written so far, with the address they were written to.
    frames: Vec<(u16, Vec<u8>)>,

    /// Byte returned by progress reads, `None` for an empty reply.
    progress_reply: Option<u8>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MotorCmd {
    /// The byte sent on the bus for this command.
    pub fn as_byte(self) -> u8 {
        match self {
            MotorCmd::Calibrate => b'c',
            MotorCmd::Normal => b'n',
            MotorCmd::Preset => b'p',
            MotorCmd::Dest => b'd',
            MotorCmd::Next => b'i',
        }
    }
}

impl Progress {
    /// Decode the bytes returned by a progress read.
    pub fn from_reply(reply: &[u8]) -> Self {
        match reply.first() {
            None => Progress::NoReply,
            Some(&p) if p < PROGRESS_UNKNOWN => Progress::Percent(p),
            Some(&p) => Progress::Unknown(p),
        }
    }

    /// Percentage complete, treating anything but a valid reply as still in progress.
    pub fn percent(self) -> u8 {
        match self {
            Progress::Percent(p) => p,
            Progress::Unknown(_) | Progress::NoReply => PROGRESS_IN_PROGRESS,
        }
    }
}

impl SimBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get every frame written so far with its address.
    pub fn frames(&self) -> Vec<(u16, Vec<u8>)> {
        self.record.borrow().frames.clone()
    }

    /// Get only the frame payloads, in the order they were written.
    pub fn payloads(&self) -> Vec<Vec<u8>> {
        self.record
            .borrow()
            .frames
            .iter()
            .map(|(_, f)| f.clone())
            .collect()
    }

    /// Forget all recorded frames.
    pub fn clear(&self) {
        self.record.borrow_mut().frames.clear();
    }

    /// Set the byte returned by progress reads.
    pub fn set_progress_reply(&self, reply: Option<u8>) {
        self.record.borrow_mut().progress_reply = reply;
    }
}

impl MotorBus for SimBus {
    fn write(&mut self, address: u16, frame: &[u8]) -> Result<(), BusError> {
        self.record
            .borrow_mut()
            .frames
            .push((address, frame.to_vec()));
        Ok(())
    }

    fn read(&mut self, _address: u16, buf: &mut [u8]) -> Result<usize, BusError> {
        match (self.record.borrow().progress_reply, buf.first_mut()) {
            (Some(p), Some(b)) => {
                *b = p;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Build a single byte command frame.
pub fn command_frame(cmd: MotorCmd) -> [u8; 1] {
    [cmd.as_byte()]
}

/// Build an absolute position frame for one tower.
pub fn position_frame(tower_address: u8, step_count: i32) -> [u8; POSITION_FRAME_LEN] {
    let mut frame = [0u8; POSITION_FRAME_LEN];
    frame[0] = tower_address;
    BigEndian::write_i32(&mut frame[1..], step_count);
    frame
}

/// Build an increment frame carrying the step deltas of all four towers.
///
/// Deltas which do not fit in 16 bits are saturated and a warning logged.
pub fn increment_frame(deltas: [i32; NUM_TOWERS]) -> [u8; INCREMENT_FRAME_LEN] {
    let mut frame = [0u8; INCREMENT_FRAME_LEN];
    frame[0] = MotorCmd::Next.as_byte();

    for (i, &delta) in deltas.iter().enumerate() {
        let clamped = delta.max(i16::MIN as i32).min(i16::MAX as i32) as i16;
        if clamped as i32 != delta {
            warn!(
                "Step delta {} for tower {} does not fit an increment frame, sending {}",
                delta, i, clamped
            );
        }

        BigEndian::write_i16(&mut frame[1 + 2 * i..3 + 2 * i], clamped);
    }

    frame
}
