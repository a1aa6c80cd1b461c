use crate::net::Route;
use crate::EtherType;

/// Per-packet metadata written by the send path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PktMeta {
    /// Fragment identifier in network byte order. All zero means unset.
    pub frag_id: [u8; 4],
    /// Offset of the next-header byte that later stages may patch,
    /// relative to the network header.
    pub nhoff: u16,
    /// Link-layer protocol tag.
    pub protocol: EtherType,
}

impl Default for PktMeta {
    fn default() -> Self {
        Self {
            frag_id: [0; 4],
            nhoff: 0,
            protocol: EtherType::from(0),
        }
    }
}

impl PktMeta {
    /// The fragment identifier in host byte order, if one was set.
    #[inline]
    pub fn frag_id(&self) -> Option<u32> {
        match u32::from_be_bytes(self.frag_id) {
            0 => None,
            id => Some(id),
        }
    }
}

/// The PktBuf trait.
///
/// A packet buffer has a linear part that ends at the tail and an optional
/// paged part after it. Offsets are relative to the start of the data unless
/// stated otherwise.
pub trait PktBuf {
    /// Total length of the packet data, linear and paged.
    fn len(&self) -> usize;

    /// Whether the packet holds no data.
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Offset of the network header.
    fn network_offset(&self) -> usize;

    /// The linear bytes from the network header to the tail.
    fn network_header(&self) -> &[u8];

    /// The mutable linear bytes from the network header to the tail.
    fn network_header_mut(&mut self) -> &mut [u8];

    /// Return `scratch.len()` bytes starting at `offset`.
    ///
    /// A range inside the linear part is returned in place. Otherwise the
    /// bytes are copied into `scratch`. `None` means the range runs past the
    /// end of the packet.
    fn header_pointer<'a>(&'a self, offset: usize, scratch: &'a mut [u8]) -> Option<&'a [u8]>;

    /// The packet metadata.
    fn meta(&self) -> &PktMeta;

    /// The mutable packet metadata.
    fn meta_mut(&mut self) -> &mut PktMeta;

    /// The route resolved for this packet.
    fn dst(&self) -> Option<&Route>;
}

impl<T: PktBuf + ?Sized> PktBuf for &mut T {
    #[inline]
    fn len(&self) -> usize {
        (**self).len()
    }

    #[inline]
    fn network_offset(&self) -> usize {
        (**self).network_offset()
    }

    #[inline]
    fn network_header(&self) -> &[u8] {
        (**self).network_header()
    }

    #[inline]
    fn network_header_mut(&mut self) -> &mut [u8] {
        (**self).network_header_mut()
    }

    #[inline]
    fn header_pointer<'a>(&'a self, offset: usize, scratch: &'a mut [u8]) -> Option<&'a [u8]> {
        (**self).header_pointer(offset, scratch)
    }

    #[inline]
    fn meta(&self) -> &PktMeta {
        (**self).meta()
    }

    #[inline]
    fn meta_mut(&mut self) -> &mut PktMeta {
        (**self).meta_mut()
    }

    #[inline]
    fn dst(&self) -> Option<&Route> {
        (**self).dst()
    }
}
