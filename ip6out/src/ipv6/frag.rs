#![allow(missing_docs)]

use byteorder::{ByteOrder, NetworkEndian};

use super::IpProtocol;

/// A constant that defines the fixed byte length of the fragment header.
pub const FRAG_HEADER_LEN: usize = 8;

/// RFC8200 - Sec. 4.5
#[derive(Clone, Copy, Debug)]
pub struct FragHeader<T> {
    buf: T,
}

impl<T: AsRef<[u8]>> FragHeader<T> {
    #[inline]
    pub fn new(buf: T) -> Result<Self, T> {
        if buf.as_ref().len() >= FRAG_HEADER_LEN {
            Ok(Self { buf })
        } else {
            Err(buf)
        }
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf.as_ref()[0..FRAG_HEADER_LEN]
    }

    #[inline]
    pub fn next_header(&self) -> IpProtocol {
        self.buf.as_ref()[0].into()
    }

    /// Fragment offset in 8-byte units.
    #[inline]
    pub fn frag_off(&self) -> u16 {
        NetworkEndian::read_u16(&self.buf.as_ref()[2..4]) >> 3
    }

    /// true: more frags
    /// false: last frag
    #[inline]
    pub fn m_flag(&self) -> bool {
        (NetworkEndian::read_u16(&self.buf.as_ref()[2..4]) & 1) == 1
    }

    #[inline]
    pub fn ident(&self) -> u32 {
        NetworkEndian::read_u32(&self.buf.as_ref()[4..8])
    }
}

impl<T: AsMut<[u8]>> FragHeader<T> {
    #[inline]
    pub fn set_next_header(&mut self, value: IpProtocol) {
        self.buf.as_mut()[0] = value.into();
    }

    /// Zero the reserved byte and the two reserved bits.
    #[inline]
    pub fn clear_reserved(&mut self) {
        let data = self.buf.as_mut();
        data[1] = 0;
        let raw = NetworkEndian::read_u16(&data[2..4]);
        NetworkEndian::write_u16(&mut data[2..4], raw & 0xfff9);
    }

    #[inline]
    pub fn set_frag_off(&mut self, value: u16) {
        assert!(value <= 0x1fff);
        let data = &mut self.buf.as_mut()[2..4];
        let m_flag = NetworkEndian::read_u16(data) & 1;
        NetworkEndian::write_u16(data, value << 3 | m_flag);
    }

    #[inline]
    pub fn set_m_flag(&mut self, value: bool) {
        let data = &mut self.buf.as_mut()[2..4];
        let raw = NetworkEndian::read_u16(data) & !1;
        NetworkEndian::write_u16(data, raw | u16::from(value));
    }

    #[inline]
    pub fn set_ident(&mut self, value: u32) {
        NetworkEndian::write_u32(&mut self.buf.as_mut()[4..8], value);
    }
}
