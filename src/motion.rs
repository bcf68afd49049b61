extern crate rppal;

use rppal::i2c::I2c;

use crate::result;

const MPU_ADDR: u16 = 0x68;

const PWR_MGMT_1: u8 = 0x6B;
const ACCEL_CONFIG: u8 = 0x1C;
const ACCEL_XOUT_H: u8 = 0x3B;

const ACCEL_RANGE_8G: u8 = 0x10;

// Tuned on the desk unit; raw counts at the +/-8g range.
const ACCEL_KNOCK_THRESHOLD: i32 = 15000;
const GYRO_DOOR_THRESHOLD: i32 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ImuSample {
    pub ax: i16,
    pub ay: i16,
    pub az: i16,
    pub gx: i16,
    pub gy: i16,
    pub gz: i16,
}

impl ImuSample {
    /// accel xyz, temperature, gyro xyz: 14 big-endian bytes from 0x3B.
    pub fn from_registers(raw: &[u8; 14]) -> ImuSample {
        let word = |i: usize| i16::from_be_bytes([raw[i], raw[i + 1]]);
        return ImuSample{
            ax: word(0),
            ay: word(2),
            az: word(4),
            gx: word(8),
            gy: word(10),
            gz: word(12),
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEvent {
    None,
    Knock,
    Door,
}

/// A door swing rotates the unit sideways; a knock is a sharp jolt normal to
/// the desk. Rotation wins when both show up.
pub fn classify(sample: &ImuSample) -> MotionEvent {
    if (sample.gx as i32).abs() > GYRO_DOOR_THRESHOLD || (sample.gy as i32).abs() > GYRO_DOOR_THRESHOLD {
        return MotionEvent::Door;
    }
    if (sample.az as i32).abs() > ACCEL_KNOCK_THRESHOLD {
        return MotionEvent::Knock;
    }
    return MotionEvent::None;
}

pub struct Mpu6050 {
    i2c: I2c,
}

impl Mpu6050 {
    pub fn new(bus: u8) -> result::SeoulDashResult<Mpu6050> {
        let mut i2c = I2c::with_bus(bus)?;
        i2c.set_slave_address(MPU_ADDR)?;

        // Out of sleep mode.
        i2c.smbus_write_byte(PWR_MGMT_1, 0x00)?;
        i2c.smbus_write_byte(ACCEL_CONFIG, ACCEL_RANGE_8G)?;

        debug!("MPU-6050 ready on i2c bus {}", bus);
        return Ok(Mpu6050{ i2c: i2c });
    }

    pub fn read_sample(&mut self) -> result::SeoulDashResult<ImuSample> {
        let mut raw = [0u8; 14];
        self.i2c.write_read(&[ACCEL_XOUT_H], &mut raw)?;
        return Ok(ImuSample::from_registers(&raw));
    }

    pub fn poll(&mut self) -> result::SeoulDashResult<MotionEvent> {
        return Ok(classify(&self.read_sample()?));
    }
}
