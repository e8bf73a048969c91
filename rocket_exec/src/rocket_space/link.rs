//! Link to the tower motor controller

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::motor::{
    command_frame, increment_frame, position_frame, MotorBus, MotorCmd, Progress, SimBus,
    DEFAULT_MOTOR_ADDRESS, INCREMENT_MAX, NUM_TOWERS, PROGRESS_UNKNOWN,
};
use log::{trace, warn};

use super::Tower;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Sends frames to the motor controller over a [`MotorBus`].
///
/// When the link is disabled nothing is written to or read from the bus.
pub struct MotorLink {
    bus: Box<dyn MotorBus>,
    address: u16,
    enabled: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MotorLink {
    pub fn new(bus: Box<dyn MotorBus>, address: u16, enabled: bool) -> Self {
        Self {
            bus,
            address,
            enabled,
        }
    }

    /// A link with no hardware behind it.
    pub fn disabled() -> Self {
        Self::new(Box::new(SimBus::new()), DEFAULT_MOTOR_ADDRESS, false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Send a single command byte.
    pub fn send_command(&mut self, cmd: MotorCmd) {
        trace!("Motor command {:?}", cmd);
        self.write(&command_frame(cmd));
    }

    /// Send the committed step count of every tower as absolute positions.
    pub fn send_positions(&mut self, towers: &[Tower; NUM_TOWERS]) {
        for tower in towers.iter() {
            self.send_position(tower.address, tower.step_count);
        }
    }

    /// Send an absolute step count to the tower at `address`.
    pub fn send_position(&mut self, address: u8, step_count: i32) {
        trace!("Motor position {}={}", address as char, step_count);
        self.write(&position_frame(address, step_count));
    }

    /// Send the step deltas of all four towers.
    ///
    /// Deltas larger than one frame can carry are spread over as many frames as needed, so the
    /// controller always ends up moving by the full amount.
    pub fn send_increments(&mut self, deltas: [i32; NUM_TOWERS]) {
        trace!("Motor increments {:?}", deltas);

        let mut remaining = deltas;
        loop {
            let mut chunk = [0i32; NUM_TOWERS];
            for (c, r) in chunk.iter_mut().zip(remaining.iter_mut()) {
                *c = (*r).max(-INCREMENT_MAX).min(INCREMENT_MAX);
                *r -= *c;
            }

            self.write(&increment_frame(chunk));

            if remaining.iter().all(|&r| r == 0) {
                break;
            }
        }
    }

    /// Read the raw status byte from the controller.
    ///
    /// A failed or empty read gives [`PROGRESS_UNKNOWN`].
    pub fn read_status(&mut self) -> u8 {
        if !self.enabled {
            return PROGRESS_UNKNOWN;
        }

        let mut buf = [PROGRESS_UNKNOWN];
        match self.bus.read(self.address, &mut buf) {
            Ok(1) => buf[0],
            Ok(_) => PROGRESS_UNKNOWN,
            Err(e) => {
                warn!("Motor status read failed: {}", e);
                PROGRESS_UNKNOWN
            }
        }
    }

    /// Poll the controller for the progress of the current motion, in percent.
    pub fn query_progress(&mut self) -> u8 {
        Progress::from_reply(&[self.read_status()]).percent()
    }

    fn write(&mut self, frame: &[u8]) {
        if !self.enabled {
            return;
        }

        if let Err(e) = self.bus.write(self.address, frame) {
            warn!("Motor bus write failed: {}", e);
        }
    }
}

impl Default for MotorLink {
    fn default() -> Self {
        Self::disabled()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use byteorder::{BigEndian, ByteOrder};
    use comms_if::eqpt::motor::{PROGRESS_DONE, PROGRESS_IN_PROGRESS};

    #[test]
    fn test_disabled_sends_nothing() {
        let bus = SimBus::new();
        let mut link = MotorLink::new(Box::new(bus.clone()), 0x08, false);

        link.send_command(MotorCmd::Preset);
        link.send_increments([1, 2, 3, 4]);
        assert!(bus.frames().is_empty());
    }

    #[test]
    fn test_enabled() {
        let bus = SimBus::new();
        let mut link = MotorLink::new(Box::new(bus.clone()), 0x10, true);

        link.send_command(MotorCmd::Dest);
        link.send_increments([1, 0, 0, -1]);

        let frames = bus.frames();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0], (0x10, vec![b'd']));
        assert_eq!(frames[1].1.len(), 9);
    }

    #[test]
    fn test_large_increments_split() {
        let bus = SimBus::new();
        let mut link = MotorLink::new(Box::new(bus.clone()), 0x08, true);

        link.send_increments([40_000, 0, 0, -70_000]);

        let payloads = bus.payloads();
        assert_eq!(payloads.len(), 3);
        assert_eq!(payloads[0], increment_frame([32_767, 0, 0, -32_767]).to_vec());

        // Whatever the split, the controller moves by the full delta
        let mut total = [0i32; NUM_TOWERS];
        for p in payloads.iter() {
            assert_eq!(p[0], b'i');
            for (i, t) in total.iter_mut().enumerate() {
                *t += BigEndian::read_i16(&p[1 + 2 * i..3 + 2 * i]) as i32;
            }
        }
        assert_eq!(total, [40_000, 0, 0, -70_000]);
    }

    #[test]
    fn test_zero_increments_one_frame() {
        let bus = SimBus::new();
        let mut link = MotorLink::new(Box::new(bus.clone()), 0x08, true);

        link.send_increments([0; NUM_TOWERS]);
        assert_eq!(bus.payloads(), vec![increment_frame([0; NUM_TOWERS]).to_vec()]);
    }

    #[test]
    fn test_send_position() {
        let bus = SimBus::new();
        let mut link = MotorLink::new(Box::new(bus.clone()), 0x08, true);

        link.send_position(b'3', -2);
        assert_eq!(bus.payloads(), vec![position_frame(b'3', -2).to_vec()]);
    }

    #[test]
    fn test_progress() {
        let bus = SimBus::new();
        let mut link = MotorLink::new(Box::new(bus.clone()), 0x08, true);

        // No reply reads as still moving
        assert_eq!(link.query_progress(), PROGRESS_IN_PROGRESS);

        bus.set_progress_reply(Some(PROGRESS_DONE));
        assert_eq!(link.query_progress(), PROGRESS_DONE);

        bus.set_progress_reply(Some(200));
        assert_eq!(link.query_progress(), PROGRESS_IN_PROGRESS);
        assert_eq!(link.read_status(), 200);
    }
}
