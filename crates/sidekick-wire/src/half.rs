//! Compact 16-bit float codec used by the capture device
//!
//! Each value travels as two bytes. The first byte on the wire is treated as
//! the high-order byte by the device, but the bytes are assembled into the
//! integer in little-endian order (`first | second << 8`). The exponent
//! re-bias follows the device, including its quirk for normal values with a
//! zero mantissa: those come out with the low ten bits of the single
//! precision mantissa set.
//!
//! [`decode_half`] is total over all 65536 inputs and never fails.

/// Decode one encoded value from its two wire bytes.
pub fn decode_half(ho: u8, lo: u8) -> f32 {
    let int_val = u32::from_le_bytes([ho, lo, 0, 0]);

    let sign = (int_val & 0x8000) << 16;
    let mut mant = int_val & 0x03FF;
    let mut exp = int_val & 0x7C00;

    if exp == 0x7C00 {
        // Infinity / NaN
        exp = 0x3FC00;
    } else if exp != 0 {
        exp += 0x1C000;
        if mant == 0 && exp > 0x1C400 {
            return f32::from_bits(sign | (exp << 13) | 0x3FF);
        }
    } else if mant != 0 {
        // Subnormal: shift until the implicit bit shows up
        exp = 0x1C400;
        loop {
            mant <<= 1;
            exp -= 0x400;
            if mant & 0x400 != 0 {
                break;
            }
        }
        mant &= 0x3FF;
    }

    f32::from_bits(sign | ((exp | mant) << 13))
}

/// Decode a value from a 2-byte chunk in wire order
#[inline]
pub fn decode_pair(pair: [u8; 2]) -> f32 {
    decode_half(pair[0], pair[1])
}

/// Encode a value as IEEE binary16, round to nearest even.
///
/// This is the sender side used by packet builders and simulators. The
/// result goes on the wire as `to_le_bytes()`.
pub fn encode_half(value: f32) -> u16 {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exp = ((bits >> 23) & 0xFF) as i32;
    let mant = bits & 0x007F_FFFF;

    if exp == 0xFF {
        let nan = if mant != 0 { 0x0200 } else { 0 };
        return sign | 0x7C00 | nan;
    }

    let half_exp = exp - 127 + 15;
    if half_exp >= 0x1F {
        return sign | 0x7C00;
    }

    if half_exp <= 0 {
        if half_exp < -10 {
            return sign;
        }
        let m = mant | 0x0080_0000;
        let shift = (14 - half_exp) as u32;
        let truncated = m >> shift;
        let rem = m & ((1 << shift) - 1);
        let halfway = 1 << (shift - 1);
        let mut rounded = truncated;
        if rem > halfway || (rem == halfway && truncated & 1 != 0) {
            rounded += 1;
        }
        return sign | rounded as u16;
    }

    let mut h = ((half_exp as u32) << 10) | (mant >> 13);
    let rem = mant & 0x1FFF;
    if rem > 0x1000 || (rem == 0x1000 && h & 1 != 0) {
        // A carry out of the mantissa bumps the exponent, up to infinity
        h += 1;
    }
    sign | h as u16
}

/// Encode a value into its two wire bytes
#[inline]
pub fn encode_pair(value: f32) -> [u8; 2] {
    encode_half(value).to_le_bytes()
}
