//! # I2C motor bus
//!
//! [`MotorBus`] implementation over the Raspberry Pi's I2C peripheral.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use rppal::i2c::I2c;

use super::motor::{BusError, MotorBus};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

pub struct I2cBus {
    i2c: I2c,

    /// Address the peripheral is currently pointed at.
    selected: Option<u16>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl I2cBus {
    /// Open the given I2C bus (1 on most Raspberry Pi models).
    pub fn new(bus: u8) -> Result<Self, BusError> {
        let i2c = I2c::with_bus(bus).map_err(|e| BusError::OpenFailed(e.to_string()))?;

        Ok(Self {
            i2c,
            selected: None,
        })
    }

    fn select(&mut self, address: u16) -> Result<(), BusError> {
        if self.selected != Some(address) {
            self.i2c
                .set_slave_address(address)
                .map_err(|e| BusError::AddressFailed(address, e.to_string()))?;
            self.selected = Some(address);
        }
        Ok(())
    }
}

impl MotorBus for I2cBus {
    fn write(&mut self, address: u16, frame: &[u8]) -> Result<(), BusError> {
        self.select(address)?;

        let written = self
            .i2c
            .write(frame)
            .map_err(|e| BusError::TransferFailed(address, e.to_string()))?;

        if written != frame.len() {
            return Err(BusError::ShortWrite(address, written, frame.len()));
        }

        Ok(())
    }

    fn read(&mut self, address: u16, buf: &mut [u8]) -> Result<usize, BusError> {
        self.select(address)?;

        self.i2c
            .read(buf)
            .map_err(|e| BusError::TransferFailed(address, e.to_string()))
    }
}
