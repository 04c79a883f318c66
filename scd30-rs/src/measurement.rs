use crate::crc;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
/// One reading of CO2 concentration, temperature and relative humidity.
///
/// All three values come from a single block read, so they always belong to
/// the same internal measurement of the sensor.
pub struct Measurement {
    co2: f32,
    temperature: f32,
    humidity: f32,
}

impl Measurement {
    /// Length of the measurement block: three floats, each sent as two words
    /// followed by a CRC byte.
    pub(crate) const LEN: usize = 18;

    /// Decodes the measurement block, returning `None` if any word fails its CRC.
    pub(crate) fn decode(buf: &[u8; Self::LEN]) -> Option<Self> {
        let mut words = [0u16; 6];
        for (word, chunk) in words.iter_mut().zip(buf.chunks_exact(3)) {
            *word = crc::decode_word(chunk)?;
        }
        let float = |msw: u16, lsw: u16| f32::from_bits(((msw as u32) << 16) | lsw as u32);
        Some(Self {
            co2: float(words[0], words[1]),
            temperature: float(words[2], words[3]),
            humidity: float(words[4], words[5]),
        })
    }

    /// CO2 concentration in parts per million.
    pub fn co2(&self) -> f32 {
        self.co2
    }

    /// Temperature in degrees Celsius.
    pub fn celsius(&self) -> f32 {
        self.temperature
    }

    /// Relative humidity in percent (0-100).
    pub fn percentage(&self) -> f32 {
        self.humidity
    }
}

#[cfg(test)]
mod test {
    use super::Measurement;

    const BLOCK: [u8; Measurement::LEN] = [
        0x43, 0xDB, 0xCB, 0x8A, 0x3D, 0xC5, // 439.08 ppm
        0x41, 0xC6, 0x1D, 0x66, 0x66, 0x93, // 24.8 C
        0x42, 0x48, 0x55, 0x00, 0x00, 0x81, // 50 %
    ];

    #[test]
    fn decode_known_block() {
        let m = Measurement::decode(&BLOCK).unwrap();
        assert!((m.co2() - 439.08).abs() < 0.01);
        assert!((m.celsius() - 24.8).abs() < 0.01);
        assert_eq!(m.percentage(), 50.0);
    }

    #[test]
    fn any_corrupted_byte_is_rejected() {
        for idx in 0..Measurement::LEN {
            for mask in [0x01, 0x80, 0xFF] {
                let mut buf = BLOCK;
                buf[idx] ^= mask;
                assert!(
                    Measurement::decode(&buf).is_none(),
                    "byte {idx} ^ {mask:#04x} accepted"
                );
            }
        }
    }
}
