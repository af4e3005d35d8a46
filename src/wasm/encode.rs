//! Primitive encoders of the WebAssembly binary format.
//!
//! All encoders append to the provided buffer.

/// Appends `value` as an unsigned LEB128 integer.
pub fn unsigned(buf: &mut Vec<u8>, mut value: u32) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Appends `value` as a signed LEB128 integer.
pub fn signed(buf: &mut Vec<u8>, mut value: i32) {
    loop {
        #[allow(clippy::cast_sign_loss)]
        let byte = (value & 0x7f) as u8;
        // Arithmetic shift, so the sign is kept.
        value >>= 7;
        let sign_bit_clear = byte & 0x40 == 0;
        if (value == 0 && sign_bit_clear) || (value == -1 && !sign_bit_clear) {
            buf.push(byte);
            return;
        }
        buf.push(byte | 0x80);
    }
}

/// Appends the IEEE-754 bits of `value`, little-endian.
pub fn f32(buf: &mut Vec<u8>, value: f32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

/// Appends a length-prefixed UTF-8 name.
pub fn name(buf: &mut Vec<u8>, name: &str) {
    len(buf, name.len());
    buf.extend_from_slice(name.as_bytes());
}

/// Appends a vector: the element count followed by each encoded element.
pub fn vec<T>(buf: &mut Vec<u8>, items: &[T], mut f: impl FnMut(&mut Vec<u8>, &T)) {
    len(buf, items.len());
    for item in items {
        f(buf, item);
    }
}

/// Appends a section: its id, the payload's byte length and the payload.
pub fn section(buf: &mut Vec<u8>, id: u8, payload: &[u8]) {
    buf.push(id);
    len(buf, payload.len());
    buf.extend_from_slice(payload);
}

/// Appends a length, which the format limits to 32 bits.
pub fn len(buf: &mut Vec<u8>, len: usize) {
    unsigned(buf, u32::try_from(len).expect("length exceeds the format's limit"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn encoded(f: impl FnOnce(&mut Vec<u8>)) -> Vec<u8> {
        let mut buf = Vec::new();
        f(&mut buf);
        buf
    }

    #[test]
    fn test_unsigned_leb128() {
        let cases: &[(u32, &[u8])] = &[
            (0, &[0x00]),
            (1, &[0x01]),
            (127, &[0x7f]),
            (128, &[0x80, 0x01]),
            (300, &[0xac, 0x02]),
            (624_485, &[0xe5, 0x8e, 0x26]),
            (u32::MAX, &[0xff, 0xff, 0xff, 0xff, 0x0f]),
        ];
        for &(value, expected) in cases {
            assert_eq!(encoded(|b| unsigned(b, value)), expected, "{value}");
        }
    }

    #[test]
    fn test_signed_leb128() {
        let cases: &[(i32, &[u8])] = &[
            (0, &[0x00]),
            (1, &[0x01]),
            (-1, &[0x7f]),
            (63, &[0x3f]),
            // 64 needs a second byte, since bit 6 would read as the sign.
            (64, &[0xc0, 0x00]),
            (-64, &[0x40]),
            (-65, &[0xbf, 0x7f]),
            (100, &[0xe4, 0x00]),
            (-123_456, &[0xc0, 0xbb, 0x78]),
            (i32::MAX, &[0xff, 0xff, 0xff, 0xff, 0x07]),
            (i32::MIN, &[0x80, 0x80, 0x80, 0x80, 0x78]),
        ];
        for &(value, expected) in cases {
            assert_eq!(encoded(|b| signed(b, value)), expected, "{value}");
        }
    }

    #[test]
    fn test_f32() {
        assert_eq!(encoded(|b| f32(b, 1.0)), [0x00, 0x00, 0x80, 0x3f]);
        assert_eq!(encoded(|b| f32(b, -2.5)), [0x00, 0x00, 0x20, 0xc0]);
        assert_eq!(encoded(|b| f32(b, 0.0)), [0x00; 4]);
    }

    #[test]
    fn test_name() {
        assert_eq!(encoded(|b| name(b, "run")), [3, b'r', b'u', b'n']);
        assert_eq!(encoded(|b| name(b, "")), [0]);
        // The prefix counts bytes, not characters.
        assert_eq!(encoded(|b| name(b, "é")), [2, 0xc3, 0xa9]);
    }

    #[test]
    fn test_section_length_matches_payload() {
        let payload = vec![0xaa; 200];
        let buf = encoded(|b| section(b, 10, &payload));
        assert_eq!(buf[0], 10);
        assert_eq!(&buf[1..3], [0xc8, 0x01]);
        assert_eq!(buf.len(), 3 + payload.len());
    }

    #[test]
    fn test_vec() {
        let buf = encoded(|b| vec(b, &[1u32, 200], |b, &x| unsigned(b, x)));
        assert_eq!(buf, [2, 0x01, 0xc8, 0x01]);
    }
}
