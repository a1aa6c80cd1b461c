use super::IpProtocol;

const PAD1: u8 = 0;

/// Home Address destination option (RFC 6275).
pub const IPV6_TLV_HAO: u8 = 0xc9;

/// The `(next_header, hdr_ext_len)` prefix shared by the hop-by-hop, routing
/// and destination options headers.
#[derive(Clone, Copy, Debug)]
pub struct Ipv6OptHeader<T> {
    buf: T,
}

impl<T: AsRef<[u8]>> Ipv6OptHeader<T> {
    /// Wrap `buf`, failing if the two byte prefix is not present.
    #[inline]
    pub fn new(buf: T) -> Result<Self, T> {
        if buf.as_ref().len() >= 2 {
            Ok(Self { buf })
        } else {
            Err(buf)
        }
    }

    /// The type of the header that follows this one.
    #[inline]
    pub fn next_header(&self) -> IpProtocol {
        self.buf.as_ref()[0].into()
    }

    /// The raw length field, in 8-byte units not counting the first 8 bytes.
    #[inline]
    pub fn hdr_ext_len(&self) -> u8 {
        self.buf.as_ref()[1]
    }

    /// Total header length in bytes.
    #[inline]
    pub fn header_len(&self) -> usize {
        (usize::from(self.hdr_ext_len()) + 1) * 8
    }

    /// The TLV option area, if the whole header is inside the buffer.
    #[inline]
    pub fn option_bytes(&self) -> Option<&[u8]> {
        self.buf.as_ref().get(2..self.header_len())
    }
}

/// A single TLV option.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TlvOption<'a> {
    offset: usize,
    option_type: u8,
    data: &'a [u8],
}

impl<'a> TlvOption<'a> {
    /// Offset of the option from the start of the option area.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The option type byte.
    #[inline]
    pub fn option_type(&self) -> u8 {
        self.option_type
    }

    /// The option data, empty for Pad1.
    #[inline]
    pub fn option_data(&self) -> &'a [u8] {
        self.data
    }
}

/// Iterate over the TLV options of a hop-by-hop or destination options
/// header.
///
/// Iteration stops at the first option that runs past the option area and
/// [`TlvOptionIter::valid`] turns false.
#[derive(Clone, Debug)]
pub struct TlvOptionIter<'a> {
    buf: &'a [u8],
    offset: usize,
    valid: bool,
}

impl<'a> TlvOptionIter<'a> {
    /// Iterate over `buf`, the option area following the two byte prefix.
    #[inline]
    pub fn from_option_bytes(buf: &'a [u8]) -> TlvOptionIter<'a> {
        Self {
            buf,
            offset: 0,
            valid: true,
        }
    }

    /// Whether every option consumed so far was well formed.
    #[inline]
    pub fn valid(&self) -> bool {
        self.valid
    }
}

impl<'a> Iterator for TlvOptionIter<'a> {
    type Item = TlvOption<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let buf = self.buf;
        let rest = &buf[self.offset..];
        if !self.valid || rest.is_empty() {
            return None;
        }

        let option_type = rest[0];
        let opt_len = if option_type == PAD1 {
            1
        } else if rest.len() < 2 {
            self.valid = false;
            return None;
        } else {
            usize::from(rest[1]) + 2
        };
        if opt_len > rest.len() {
            self.valid = false;
            return None;
        }

        let opt = TlvOption {
            offset: self.offset,
            option_type,
            data: &rest[opt_len.min(2)..opt_len],
        };
        self.offset += opt_len;
        Some(opt)
    }
}

/// Search the options header at `offset` of `nh` for an option of type
/// `opt_type` and return the option's offset within `nh`.
///
/// `nh` starts at the network header. A header or option area that runs past
/// `nh` yields `None`.
pub fn find_tlv(nh: &[u8], offset: usize, opt_type: u8) -> Option<usize> {
    let hdr = Ipv6OptHeader::new(nh.get(offset..)?).ok()?;
    TlvOptionIter::from_option_bytes(hdr.option_bytes()?)
        .find(|opt| opt.option_type() == opt_type)
        .map(|opt| offset + 2 + opt.offset())
}
