use embedded_hal::{
    delay::DelayNs,
    i2c::{I2c, SevenBitAddress},
};

use crate::{
    Error, Measurement, crc,
    register::{
        AltitudeCompensation, AmbientPressure, Command, DataReady, FirmwareVersion,
        ForcedRecalibration, MeasurementInterval, SCD30_DEFAULT_ADDRESS, Scd30Register,
        Scd30Setting, SelfCalibration, TemperatureOffset,
    },
};

/// Represents the SCD30 sensor.
///
/// The driver owns the bus handle and the delay provider for its lifetime.
/// Pass `&mut` references to share a bus with other devices; get them back
/// with [`Scd30::release`].
pub struct Scd30<I2C, D> {
    pub(crate) i2c: I2C,
    pub(crate) delay: D,
    pub(crate) address: u8,
    /// Microseconds the sensor still needs after the last command.
    settle_us: u32,
    /// Data-ready flag observed since the last measurement read.
    data_ready: bool,
    latest: Option<Measurement>,
}

#[derive(Debug)]
/// Builder for a SCD30 sensor.
pub struct Scd30Builder {
    pub(crate) address: u8,
    pub(crate) interval: u16,
    pub(crate) pressure: u16,
    pub(crate) reset: bool,
}

impl Default for Scd30Builder {
    fn default() -> Self {
        Self {
            address: SCD30_DEFAULT_ADDRESS,
            interval: MeasurementInterval::MIN,
            pressure: AmbientPressure::DISABLED,
            reset: false,
        }
    }
}

impl Scd30Builder {
    /// Set the I2C address of the SCD30 sensor.
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Set the interval between measurements in seconds (2-1800).
    pub fn with_measurement_interval(mut self, seconds: u16) -> Self {
        self.interval = seconds;
        self
    }

    /// Set the ambient pressure compensation in mbar (700-1400, or 0 to disable).
    pub fn with_ambient_pressure(mut self, mbar: u16) -> Self {
        self.pressure = mbar;
        self
    }

    /// Perform a soft reset before configuring the sensor.
    pub fn with_soft_reset(mut self, reset: bool) -> Self {
        self.reset = reset;
        self
    }

    /// Build the SCD30 sensor and start continuous measurement.
    ///
    /// The configuration is validated before any transfer is issued.
    pub fn build<T: I2c<SevenBitAddress>, D: DelayNs>(
        self,
        i2c: T,
        delay: D,
    ) -> Result<Scd30<T, D>, Error<T::Error>> {
        let interval = MeasurementInterval(self.interval);
        let pressure = AmbientPressure(self.pressure);
        if !interval.is_valid() || !pressure.is_valid() {
            return Err(Error::InvalidArgument);
        }
        let mut dev = Scd30::new(i2c, delay).with_address(self.address);
        if self.reset {
            dev.reset()?;
        }
        interval.write(&mut dev)?;
        pressure.write(&mut dev)?;
        Ok(dev)
    }
}

impl<I2C, D> Scd30<I2C, D> {
    /// Bind a sensor at the default address. No transfer is issued.
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            address: SCD30_DEFAULT_ADDRESS,
            settle_us: 0,
            data_ready: false,
            latest: None,
        }
    }

    /// Use a non-default I2C address.
    pub fn with_address(mut self, address: u8) -> Self {
        self.address = address;
        self
    }

    /// Get the address of the device.
    pub fn get_address(&self) -> u8 {
        self.address
    }

    /// The last measurement read successfully, if any.
    pub fn latest(&self) -> Option<Measurement> {
        self.latest
    }

    /// Release the bus and the delay provider.
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<T: I2c<SevenBitAddress>, D: DelayNs> Scd30<T, D> {
    /// Check whether a new measurement is staged in the sensor.
    ///
    /// The sensor's ready flag is not consumed; this can be polled freely.
    pub fn is_data_available(&mut self) -> Result<bool, Error<T::Error>> {
        let status = DataReady::read(self)?;
        self.data_ready = status.ready();
        Ok(self.data_ready)
    }

    /// Read the staged measurement.
    ///
    /// Fails with [`Error::NotReady`] unless [`Scd30::is_data_available`] reported
    /// new data since the last read. Reading consumes the sensor's ready flag.
    pub fn read_measurement(&mut self) -> Result<Measurement, Error<T::Error>> {
        if !self.data_ready {
            return Err(Error::NotReady);
        }
        self.write_command(Command::ReadMeasurement, None)?;
        let mut buf = [0u8; Measurement::LEN];
        self.read_raw(&mut buf)?;
        self.data_ready = false;
        let measurement = Measurement::decode(&buf).ok_or_else(|| {
            log::warn!("SCD30 0x{:02x}: measurement failed CRC", self.address);
            Error::Crc
        })?;
        self.latest = Some(measurement);
        Ok(measurement)
    }

    /// Poll the data-ready flag and read the measurement if one is staged.
    pub fn try_read_measurement(&mut self) -> Result<Option<Measurement>, Error<T::Error>> {
        if self.is_data_available()? {
            self.read_measurement().map(Some)
        } else {
            Ok(None)
        }
    }

    /// Start continuous measurement with optional ambient pressure compensation.
    ///
    /// # Parameters:
    /// - `mbar`: ambient pressure in mbar (700-1400), or 0 to disable compensation.
    pub fn start_continuous_measurement(&mut self, mbar: u16) -> Result<(), Error<T::Error>> {
        AmbientPressure(mbar).write(self)
    }

    /// Stop continuous measurement.
    ///
    /// Any staged measurement is discarded by the sensor.
    pub fn stop_continuous_measurement(&mut self) -> Result<(), Error<T::Error>> {
        self.write_command(Command::StopContinuousMeasurement, None)?;
        self.data_ready = false;
        Ok(())
    }

    /// Set the ambient pressure in mbar (700-1400, or 0 to disable compensation).
    ///
    /// This restarts continuous measurement with the new pressure.
    pub fn set_ambient_pressure(&mut self, mbar: u16) -> Result<(), Error<T::Error>> {
        self.start_continuous_measurement(mbar)
    }

    /// Get the ambient pressure compensation in mbar.
    pub fn ambient_pressure(&mut self) -> Result<u16, Error<T::Error>> {
        AmbientPressure::read(self).map(|p| p.0)
    }

    /// Set the interval between measurements in seconds (2-1800).
    ///
    /// The value is persisted by the sensor across resets.
    pub fn set_measurement_interval(&mut self, seconds: u16) -> Result<(), Error<T::Error>> {
        MeasurementInterval(seconds).write(self)
    }

    /// Get the interval between measurements in seconds.
    pub fn measurement_interval(&mut self) -> Result<u16, Error<T::Error>> {
        MeasurementInterval::read(self).map(|i| i.0)
    }

    /// Set the altitude above sea level in meters (0-3000).
    pub fn set_altitude_compensation(&mut self, meters: u16) -> Result<(), Error<T::Error>> {
        AltitudeCompensation(meters).write(self)
    }

    /// Get the altitude compensation in meters.
    pub fn altitude_compensation(&mut self) -> Result<u16, Error<T::Error>> {
        AltitudeCompensation::read(self).map(|a| a.0)
    }

    /// Set the temperature offset in degrees Celsius (0-655.35, resolution 0.01).
    pub fn set_temperature_offset(&mut self, celsius: f32) -> Result<(), Error<T::Error>> {
        TemperatureOffset::from_celsius(celsius)
            .ok_or(Error::InvalidArgument)?
            .write(self)
    }

    /// Get the temperature offset in degrees Celsius.
    pub fn temperature_offset(&mut self) -> Result<f32, Error<T::Error>> {
        TemperatureOffset::read(self).map(|t| t.celsius())
    }

    /// Enable or disable automatic self-calibration.
    pub fn set_self_calibration(&mut self, enabled: bool) -> Result<(), Error<T::Error>> {
        SelfCalibration::new().with_enabled(enabled).write(self)
    }

    /// Get the automatic self-calibration state.
    pub fn self_calibration_enabled(&mut self) -> Result<bool, Error<T::Error>> {
        SelfCalibration::read(self).map(|s| s.enabled())
    }

    /// Set the CO2 concentration of a reference source in ppm (400-2000).
    ///
    /// This overrides any calibration done by automatic self-calibration.
    pub fn set_forced_recalibration_reference(&mut self, ppm: u16) -> Result<(), Error<T::Error>> {
        ForcedRecalibration(ppm).write(self)
    }

    /// Get the forced recalibration reference in ppm.
    pub fn forced_recalibration_reference(&mut self) -> Result<u16, Error<T::Error>> {
        ForcedRecalibration::read(self).map(|f| f.0)
    }

    /// Get the firmware version of the sensor.
    pub fn firmware_version(&mut self) -> Result<FirmwareVersion, Error<T::Error>> {
        FirmwareVersion::read(self)
    }

    /// Perform a soft reset of the SCD30 sensor.
    ///
    /// Persisted settings (interval, offsets, calibration) survive the reset.
    pub fn reset(&mut self) -> Result<(), Error<T::Error>> {
        self.write_command(Command::SoftReset, None)?;
        self.data_ready = false;
        Ok(())
    }

    /// Send a command, with its argument and CRC if given.
    pub(crate) fn write_command(
        &mut self,
        command: Command,
        argument: Option<u16>,
    ) -> Result<(), Error<T::Error>> {
        self.settle();
        let [c0, c1] = command.to_be_bytes();
        match argument {
            Some(word) => {
                let [a0, a1, crc] = crc::encode_word(word);
                self.i2c.write(self.address, &[c0, c1, a0, a1, crc])?;
            }
            None => self.i2c.write(self.address, &[c0, c1])?,
        }
        log::debug!(
            "SCD30 0x{:02x}: sent {command:?} ({:?})",
            self.address,
            argument
        );
        self.settle_us = command.settle_time();
        Ok(())
    }

    /// Send a command and read back the single word it returns.
    pub(crate) fn read_word(&mut self, command: Command) -> Result<u16, Error<T::Error>> {
        self.write_command(command, None)?;
        let mut buf = [0u8; 3];
        self.read_raw(&mut buf)?;
        crc::decode_word(&buf).ok_or_else(|| {
            log::warn!("SCD30 0x{:02x}: {command:?} failed CRC", self.address);
            Error::Crc
        })
    }

    // The SCD30 does not support repeated start: the read is a separate transfer.
    fn read_raw(&mut self, buf: &mut [u8]) -> Result<(), Error<T::Error>> {
        self.settle();
        self.i2c.read(self.address, buf)?;
        Ok(())
    }

    fn settle(&mut self) {
        if self.settle_us > 0 {
            self.delay.delay_us(self.settle_us);
            self.settle_us = 0;
        }
    }
}
