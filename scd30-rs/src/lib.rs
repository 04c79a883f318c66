#![no_std]
#![deny(missing_docs)]
//! # SCD30 - Driver for the Sensirion SCD30 CO2, Temperature and Humidity Sensor
//! This crate provides a driver for the SCD30 sensor over the `embedded-hal` I2C traits.
//!
//! The sensor measures continuously at a configurable interval. Poll
//! [`Scd30::is_data_available`] and read the staged values with
//! [`Scd30::read_measurement`]:
//!
//! ```no_run
//! # fn run<T: embedded_hal::i2c::I2c, D: embedded_hal::delay::DelayNs>(i2c: T, delay: D) -> Result<(), scd30::Error<T::Error>> {
//! let mut scd = scd30::Scd30Builder::default()
//!     .with_measurement_interval(2)
//!     .build(i2c, delay)?;
//! if scd.is_data_available()? {
//!     let m = scd.read_measurement()?;
//!     let _ = (m.co2(), m.celsius(), m.percentage());
//! }
//! # Ok(())
//! # }
//! ```
mod crc;
mod device;
mod error;
mod measurement;
mod register;

pub use device::{Scd30, Scd30Builder};
pub use crc::crc8;
pub use error::Error;
pub use measurement::Measurement;
pub use register::{FirmwareVersion, SCD30_DEFAULT_ADDRESS};
