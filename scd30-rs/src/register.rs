use bitfield_struct::bitfield;
use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

use crate::{Error, device::Scd30};

/// Default 7-bit I2C address of the SCD30.
pub const SCD30_DEFAULT_ADDRESS: u8 = 0x61;

#[repr(u16)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// 16-bit command codes understood by the SCD30, sent MSB first.
pub(crate) enum Command {
    /// Start continuous measurement, argument is the ambient pressure in mbar (0 disables).
    StartContinuousMeasurement = 0x0010,
    StopContinuousMeasurement = 0x0104,
    MeasurementInterval = 0x4600,
    GetDataReady = 0x0202,
    ReadMeasurement = 0x0300,
    SelfCalibration = 0x5306,
    ForcedRecalibration = 0x5204,
    TemperatureOffset = 0x5403,
    AltitudeCompensation = 0x5102,
    FirmwareVersion = 0xD100,
    SoftReset = 0xD304,
}

impl Command {
    pub(crate) const fn to_be_bytes(self) -> [u8; 2] {
        (self as u16).to_be_bytes()
    }

    /// Returns the time in microseconds the sensor needs after this command
    /// before the next transfer is valid.
    pub(crate) fn settle_time(self) -> u32 {
        match self {
            Command::SoftReset => 100_000,
            Command::SelfCalibration => 10_000,
            // datasheet minimum is 3 ms, 5 ms leaves margin before reads
            _ => 5_000,
        }
    }
}

/// A 16-bit word the SCD30 returns when its command is sent without an argument.
pub(crate) trait Scd30Register: Sized {
    const COMMAND: Command;

    fn from_word(word: u16) -> Self;

    fn read<T: I2c<SevenBitAddress>, D: DelayNs>(
        scd: &mut Scd30<T, D>,
    ) -> Result<Self, Error<T::Error>> {
        scd.read_word(Self::COMMAND).map(Self::from_word)
    }
}

/// A register that is written by sending its command with a word argument.
pub(crate) trait Scd30Setting: Scd30Register {
    fn into_word(self) -> u16;

    /// Whether the value lies within the range the sensor accepts.
    fn is_valid(&self) -> bool {
        true
    }

    fn write<T: I2c<SevenBitAddress>, D: DelayNs>(
        self,
        scd: &mut Scd30<T, D>,
    ) -> Result<(), Error<T::Error>> {
        if !self.is_valid() {
            return Err(Error::InvalidArgument);
        }
        scd.write_command(Self::COMMAND, Some(self.into_word()))
    }
}

#[bitfield(u16)]
/// Data-ready status word, bit 0 is set while a new measurement is staged.
pub(crate) struct DataReady {
    pub ready: bool,
    #[bits(15)]
    __: u16,
}

impl Scd30Register for DataReady {
    const COMMAND: Command = Command::GetDataReady;

    fn from_word(word: u16) -> Self {
        Self::from_bits(word)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Interval in seconds between two internal measurements.
pub(crate) struct MeasurementInterval(pub u16);

impl MeasurementInterval {
    pub(crate) const MIN: u16 = 2;
    pub(crate) const MAX: u16 = 1800;
}

impl Scd30Register for MeasurementInterval {
    const COMMAND: Command = Command::MeasurementInterval;

    fn from_word(word: u16) -> Self {
        Self(word)
    }
}

impl Scd30Setting for MeasurementInterval {
    fn into_word(self) -> u16 {
        self.0
    }

    fn is_valid(&self) -> bool {
        (Self::MIN..=Self::MAX).contains(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Ambient pressure in mbar passed along with the start of continuous measurement.
///
/// A value of `0` disables pressure compensation.
pub(crate) struct AmbientPressure(pub u16);

impl AmbientPressure {
    pub(crate) const DISABLED: u16 = 0;
    pub(crate) const MIN: u16 = 700;
    pub(crate) const MAX: u16 = 1400;
}

impl Scd30Register for AmbientPressure {
    const COMMAND: Command = Command::StartContinuousMeasurement;

    fn from_word(word: u16) -> Self {
        Self(word)
    }
}

impl Scd30Setting for AmbientPressure {
    fn into_word(self) -> u16 {
        self.0
    }

    fn is_valid(&self) -> bool {
        self.0 == Self::DISABLED || (Self::MIN..=Self::MAX).contains(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Height above sea level in meters.
pub(crate) struct AltitudeCompensation(pub u16);

impl AltitudeCompensation {
    pub(crate) const MAX: u16 = 3000;
}

impl Scd30Register for AltitudeCompensation {
    const COMMAND: Command = Command::AltitudeCompensation;

    fn from_word(word: u16) -> Self {
        Self(word)
    }
}

impl Scd30Setting for AltitudeCompensation {
    fn into_word(self) -> u16 {
        self.0
    }

    fn is_valid(&self) -> bool {
        self.0 <= Self::MAX
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Temperature offset in ticks of 0.01 degrees Celsius.
pub(crate) struct TemperatureOffset(u16);

impl TemperatureOffset {
    const TICKS_PER_DEGREE: f32 = 100.0;
    pub(crate) const MAX_CELSIUS: f32 = u16::MAX as f32 / Self::TICKS_PER_DEGREE;

    /// Converts an offset in Celsius, rounding to the nearest 0.01 degree.
    pub(crate) fn from_celsius(celsius: f32) -> Option<Self> {
        (0.0..=Self::MAX_CELSIUS)
            .contains(&celsius)
            .then(|| Self((celsius * Self::TICKS_PER_DEGREE + 0.5) as u16))
    }

    pub(crate) fn celsius(&self) -> f32 {
        self.0 as f32 / Self::TICKS_PER_DEGREE
    }
}

impl Scd30Register for TemperatureOffset {
    const COMMAND: Command = Command::TemperatureOffset;

    fn from_word(word: u16) -> Self {
        Self(word)
    }
}

impl Scd30Setting for TemperatureOffset {
    fn into_word(self) -> u16 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// CO2 concentration in ppm of a reference source used for forced recalibration.
pub(crate) struct ForcedRecalibration(pub u16);

impl ForcedRecalibration {
    pub(crate) const MIN: u16 = 400;
    pub(crate) const MAX: u16 = 2000;
}

impl Scd30Register for ForcedRecalibration {
    const COMMAND: Command = Command::ForcedRecalibration;

    fn from_word(word: u16) -> Self {
        Self(word)
    }
}

impl Scd30Setting for ForcedRecalibration {
    fn into_word(self) -> u16 {
        self.0
    }

    fn is_valid(&self) -> bool {
        (Self::MIN..=Self::MAX).contains(&self.0)
    }
}

#[bitfield(u16)]
/// Automatic self-calibration state word.
pub(crate) struct SelfCalibration {
    pub enabled: bool,
    #[bits(15)]
    __: u16,
}

impl Scd30Register for SelfCalibration {
    const COMMAND: Command = Command::SelfCalibration;

    fn from_word(word: u16) -> Self {
        Self::from_bits(word)
    }
}

impl Scd30Setting for SelfCalibration {
    fn into_word(self) -> u16 {
        self.into_bits()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Firmware version reported by the sensor.
pub struct FirmwareVersion(u16);

impl FirmwareVersion {
    /// Major version number.
    pub fn major(&self) -> u8 {
        self.0.to_be_bytes()[0]
    }

    /// Minor version number.
    pub fn minor(&self) -> u8 {
        self.0.to_be_bytes()[1]
    }
}

impl Scd30Register for FirmwareVersion {
    const COMMAND: Command = Command::FirmwareVersion;

    fn from_word(word: u16) -> Self {
        Self(word)
    }
}
