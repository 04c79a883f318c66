use std::time::{Duration, Instant};

use clap::Parser;
use embedded_hal::{delay::DelayNs, i2c::I2c};
use linux_embedded_hal::{Delay, I2cdev};
use scd30::{SCD30_DEFAULT_ADDRESS, Scd30, Scd30Builder};

/// Poll a SCD30 CO2 sensor and log its measurements
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to I2C bus (e.g., /dev/i2c-1)
    #[arg(short, long)]
    path: String,
    /// I2C address of the sensor (e.g., 0x61)
    #[arg(short, long, default_value_t = SCD30_DEFAULT_ADDRESS, value_parser = parse_address)]
    address: u8,
    /// Measurement interval in seconds (2-1800)
    #[arg(short, long, default_value_t = 2)]
    interval: u16,
    /// Ambient pressure in mbar (700-1400), 0 disables compensation
    #[arg(long, default_value_t = 0)]
    pressure: u16,
    /// Altitude above sea level in meters (0-3000)
    #[arg(long)]
    altitude: Option<u16>,
    /// Temperature offset in degrees Celsius
    #[arg(long)]
    temperature_offset: Option<f32>,
    /// Enable or disable automatic self-calibration
    #[arg(long)]
    self_calibration: Option<bool>,
    /// CO2 concentration of a reference source in ppm (400-2000)
    #[arg(long)]
    forced_recalibration: Option<u16>,
    /// Soft reset the sensor before configuring it
    #[arg(long, default_value_t = false)]
    reset: bool,
    /// Period between data-ready polls in milliseconds
    #[arg(long, default_value_t = 500)]
    poll_ms: u64,
    /// Stop after this many measurements
    #[arg(short, long)]
    count: Option<usize>,
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid address {s}: {e}"))
}

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    log::info!("Arguments: {args:#?}");
    init(args);
}

fn init(args: Args) {
    println!("[CO2] Opening bus: {}", args.path);
    // Open the I2C bus
    let i2c = I2cdev::new(&args.path).expect("Failed to open I2C device");
    let mut scd = match Scd30Builder::default()
        .with_address(args.address)
        .with_measurement_interval(args.interval)
        .with_ambient_pressure(args.pressure)
        .with_soft_reset(args.reset)
        .build(i2c, Delay)
    {
        Ok(scd) => scd,
        Err(e) => {
            log::error!("[CO2] Sensor 0x{:02x}: Could not start: {e:?}", args.address);
            return;
        }
    };
    println!("[CO2] Device found at address {:02x}", scd.get_address());
    configure(&mut scd, &args);
    report(&mut scd);

    let period = Duration::from_millis(args.poll_ms);
    let mut readings = 0;
    loop {
        let start = Instant::now();
        match scd.try_read_measurement() {
            Ok(Some(m)) => {
                readings += 1;
                log::info!(
                    "[CO2] Sensor 0x{:02x}: {:.1} ppm, {:.2} C, {:.1} %RH",
                    scd.get_address(),
                    m.co2(),
                    m.celsius(),
                    m.percentage()
                );
            }
            Ok(None) => log::debug!("[CO2] Sensor 0x{:02x}: No data", scd.get_address()),
            Err(e) => log::warn!(
                "[CO2] Sensor 0x{:02x}: Error reading: {e:?}",
                scd.get_address()
            ),
        }
        if args.count.is_some_and(|count| readings >= count) {
            break;
        }
        if start.elapsed() < period {
            std::thread::sleep(period - start.elapsed());
        }
    }
    log::info!("[CO2] Read {readings} measurements.");
}

/// Apply the optional tuning knobs. Failures are logged and skipped.
fn configure<T: I2c, D: DelayNs>(scd: &mut Scd30<T, D>, args: &Args) {
    let addr = scd.get_address();
    if let Some(offset) = args.temperature_offset {
        if let Err(e) = scd.set_temperature_offset(offset) {
            log::warn!("[CO2] Sensor 0x{addr:02x}: Could not set temperature offset: {e:?}");
        }
    }
    if let Some(altitude) = args.altitude {
        if let Err(e) = scd.set_altitude_compensation(altitude) {
            log::warn!("[CO2] Sensor 0x{addr:02x}: Could not set altitude: {e:?}");
        }
    }
    if let Some(enabled) = args.self_calibration {
        if let Err(e) = scd.set_self_calibration(enabled) {
            log::warn!("[CO2] Sensor 0x{addr:02x}: Could not set self-calibration: {e:?}");
        }
    }
    if let Some(ppm) = args.forced_recalibration {
        if let Err(e) = scd.set_forced_recalibration_reference(ppm) {
            log::warn!("[CO2] Sensor 0x{addr:02x}: Could not set recalibration reference: {e:?}");
        }
    }
}

/// Print the sensor's current configuration.
fn report<T: I2c, D: DelayNs>(scd: &mut Scd30<T, D>) {
    match scd.firmware_version() {
        Ok(v) => println!("[CO2] Firmware version: {}.{}", v.major(), v.minor()),
        Err(e) => log::warn!("[CO2] Could not read firmware version: {e:?}"),
    }
    match scd.measurement_interval() {
        Ok(s) => println!("[CO2] Measurement interval: {s} s"),
        Err(e) => log::warn!("[CO2] Could not read measurement interval: {e:?}"),
    }
    match scd.temperature_offset() {
        Ok(c) => println!("[CO2] Temperature offset: {c:.2} C"),
        Err(e) => log::warn!("[CO2] Could not read temperature offset: {e:?}"),
    }
    match scd.altitude_compensation() {
        Ok(m) => println!("[CO2] Altitude: {m} m"),
        Err(e) => log::warn!("[CO2] Could not read altitude: {e:?}"),
    }
    match scd.self_calibration_enabled() {
        Ok(b) => println!("[CO2] Self-calibration enabled: {b}"),
        Err(e) => log::warn!("[CO2] Could not read self-calibration: {e:?}"),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn address_formats() {
        assert_eq!(parse_address("0x61"), Ok(0x61));
        assert_eq!(parse_address("97"), Ok(0x61));
        assert!(parse_address("0x100").is_err());
    }

    #[test]
    fn defaults() {
        let args = Args::parse_from(["co2-tester", "--path", "/dev/i2c-1"]);
        assert_eq!(args.address, SCD30_DEFAULT_ADDRESS);
        assert_eq!(args.interval, 2);
        assert_eq!(args.pressure, 0);
        assert_eq!(args.poll_ms, 500);
        assert!(args.count.is_none());
    }
}
