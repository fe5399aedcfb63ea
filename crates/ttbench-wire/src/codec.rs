//! Big-endian integer access and the MessagePack scalar encodings used by
//! IPROTO requests.

use bytes::{Buf, BufMut};

/// Marker of a MessagePack uint8.
pub const MP_UINT8: u8 = 0xCC;
/// Marker of a MessagePack uint16.
pub const MP_UINT16: u8 = 0xCD;
/// Marker of a MessagePack uint32. Every IPROTO frame starts with it.
pub const MP_UINT32: u8 = 0xCE;
/// Marker of a MessagePack uint64.
pub const MP_UINT64: u8 = 0xCF;

/// Base of a MessagePack fixarray (up to 15 elements).
pub const MP_FIXARRAY: u8 = 0x90;
/// Marker of a MessagePack array16.
pub const MP_ARRAY16: u8 = 0xDC;
/// Marker of a MessagePack array32.
pub const MP_ARRAY32: u8 = 0xDD;

/// Width of the `0xCE`-prefixed size field at the start of every frame.
pub const SIZE_FIELD_LEN: usize = 5;

/// Reads a big-endian u32 from the first four bytes of `buf`.
///
/// # Panics
///
/// Panics if `buf` is shorter than four bytes.
pub fn get_u32_be(mut buf: &[u8]) -> u32 {
    buf.get_u32()
}

/// Overwrites the first four bytes of `buf` with `value` in big-endian order.
///
/// # Panics
///
/// Panics if `buf` is shorter than four bytes.
pub fn put_u32_be(buf: &mut [u8], value: u32) {
    buf[..4].copy_from_slice(&value.to_be_bytes());
}

/// Returns the number of bytes the minimal MessagePack encoding of `value`
/// takes.
pub fn sizeof_uint(value: u64) -> usize {
    if value <= 0x7f {
        1
    } else if value <= 0xff {
        2
    } else if value <= 0xffff {
        3
    } else if value <= 0xffff_ffff {
        5
    } else {
        9
    }
}

/// Appends the minimal MessagePack encoding of `value`.
pub fn encode_uint(out: &mut impl BufMut, value: u64) {
    if value <= 0x7f {
        out.put_u8(value as u8);
    } else if value <= 0xff {
        out.put_u8(MP_UINT8);
        out.put_u8(value as u8);
    } else if value <= 0xffff {
        out.put_u8(MP_UINT16);
        out.put_u16(value as u16);
    } else if value <= 0xffff_ffff {
        out.put_u8(MP_UINT32);
        out.put_u32(value as u32);
    } else {
        out.put_u8(MP_UINT64);
        out.put_u64(value);
    }
}

/// Returns the size of a MessagePack array header for `len` elements.
pub fn sizeof_array(len: u32) -> usize {
    if len <= 15 {
        1
    } else if len <= 0xffff {
        3
    } else {
        5
    }
}

/// Appends a MessagePack array header for `len` elements.
pub fn encode_array(out: &mut impl BufMut, len: u32) {
    if len <= 15 {
        out.put_u8(MP_FIXARRAY | len as u8);
    } else if len <= 0xffff {
        out.put_u8(MP_ARRAY16);
        out.put_u16(len as u16);
    } else {
        out.put_u8(MP_ARRAY32);
        out.put_u32(len);
    }
}

#[cfg(test)]
mod codec_tests {
    use super::*;

    fn encoded_uint(value: u64) -> Vec<u8> {
        let mut out = Vec::new();
        encode_uint(&mut out, value);
        out
    }

    #[test]
    fn uint_widths_follow_msgpack_boundaries() {
        assert_eq!(encoded_uint(0), vec![0x00]);
        assert_eq!(encoded_uint(0x7f), vec![0x7f]);
        assert_eq!(encoded_uint(0x80), vec![0xcc, 0x80]);
        assert_eq!(encoded_uint(512), vec![0xcd, 0x02, 0x00]);
        assert_eq!(encoded_uint(0xffff_ffff), vec![0xce, 0xff, 0xff, 0xff, 0xff]);
        assert_eq!(
            encoded_uint(0x1_0000_0000),
            vec![0xcf, 0, 0, 0, 1, 0, 0, 0, 0]
        );
    }

    #[test]
    fn sizeof_uint_matches_encoding() {
        for value in [0, 1, 0x7f, 0x80, 0xff, 0x100, 0xffff, 0x10000, u32::MAX as u64, u64::MAX] {
            assert_eq!(sizeof_uint(value), encoded_uint(value).len(), "value {value}");
        }
    }

    #[test]
    fn array_headers() {
        let mut out = Vec::new();
        encode_array(&mut out, 3);
        encode_array(&mut out, 16);
        encode_array(&mut out, 0x10000);
        assert_eq!(
            out,
            vec![0x93, 0xdc, 0x00, 0x10, 0xdd, 0x00, 0x01, 0x00, 0x00]
        );
        assert_eq!(sizeof_array(3), 1);
        assert_eq!(sizeof_array(16), 3);
        assert_eq!(sizeof_array(0x10000), 5);
    }

    #[test]
    fn u32_patch_in_place() {
        let mut buf = [0xce, 0, 0, 0, 6, 0x82];
        assert_eq!(get_u32_be(&buf[1..]), 6);
        put_u32_be(&mut buf[1..], 0x0102_0304);
        assert_eq!(buf, [0xce, 1, 2, 3, 4, 0x82]);
    }
}
