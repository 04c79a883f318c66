#[derive(Debug, PartialEq, Eq)]
/// Represents errors that can occur while interacting with the SCD30 sensor.
pub enum Error<E> {
    /// An error occurred while communicating with the I2C bus.
    I2c(E),
    /// A word received from the sensor failed its CRC check.
    Crc,
    /// A configuration value was outside the range accepted by the sensor.
    /// No transfer is issued when this is returned.
    InvalidArgument,
    /// A measurement was requested without a data-ready flag observed since the last read.
    NotReady,
}

impl<E> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::I2c(e)
    }
}
