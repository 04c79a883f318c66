use crc_any::CRCu8;

const CRC8_POLYNOMIAL: u8 = 0x31; // x^8 + x^5 + x^4 + 1
const CRC8_INIT: u8 = 0xFF;

/// Computes the CRC-8 the SCD30 appends to every 16-bit word on the bus.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = CRCu8::create_crc(CRC8_POLYNOMIAL, 8, CRC8_INIT, 0x00, false);
    crc.digest(data);
    crc.get_crc()
}

/// Serializes a word MSB first followed by its CRC.
pub(crate) fn encode_word(word: u16) -> [u8; 3] {
    let [msb, lsb] = word.to_be_bytes();
    [msb, lsb, crc8(&[msb, lsb])]
}

/// Parses a `[msb, lsb, crc]` chunk, returning `None` if the CRC does not match.
pub(crate) fn decode_word(chunk: &[u8]) -> Option<u16> {
    let &[msb, lsb, crc] = chunk else {
        return None;
    };
    (crc8(&[msb, lsb]) == crc).then_some(u16::from_be_bytes([msb, lsb]))
}
