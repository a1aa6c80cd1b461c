use bytes::{Bytes, BytesMut};

use crate::net::Route;
use crate::traits::{PktBuf, PktMeta};

/// A packet buffer with a linear head and a list of paged fragments.
///
/// The linear head ends at the tail. The fragments hold payload that is only
/// reachable through [`PktBuf::header_pointer`].
#[derive(Debug, Default)]
pub struct PktBuffer {
    head: BytesMut,
    frags: Vec<Bytes>,
    frags_len: usize,
    network_offset: usize,
    meta: PktMeta,
    dst: Option<Route>,
}

impl PktBuffer {
    /// Create a buffer whose linear part is a copy of `data`, with the network
    /// header at offset 0.
    #[inline]
    pub fn new(data: &[u8]) -> Self {
        Self::from_bytes(BytesMut::from(data))
    }

    /// Create a buffer that takes over `head` as its linear part.
    #[inline]
    pub fn from_bytes(head: BytesMut) -> Self {
        Self {
            head,
            ..Default::default()
        }
    }

    /// Append a paged fragment after the tail.
    #[inline]
    pub fn push_frag(&mut self, frag: Bytes) {
        self.frags_len += frag.len();
        self.frags.push(frag);
    }

    /// Set the network header offset.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is past the tail.
    #[inline]
    pub fn set_network_offset(&mut self, offset: usize) {
        assert!(offset <= self.head.len());
        self.network_offset = offset;
    }

    /// Attach the resolved route.
    #[inline]
    pub fn set_dst(&mut self, route: Route) {
        self.dst = Some(route);
    }

    /// Length of the linear part.
    #[inline]
    pub fn linear_len(&self) -> usize {
        self.head.len()
    }

    /// The whole linear part.
    #[inline]
    pub fn linear(&self) -> &[u8] {
        &self.head[..]
    }

    /// Copy `dst.len()` bytes starting at `offset` into `dst`, crossing from
    /// the linear part into the fragments as needed.
    fn copy_bits(&self, mut offset: usize, dst: &mut [u8]) -> bool {
        if offset + dst.len() > self.len() {
            return false;
        }

        let mut copied = 0;
        for seg in std::iter::once(&self.head[..]).chain(self.frags.iter().map(|f| &f[..])) {
            if copied == dst.len() {
                break;
            }
            if offset >= seg.len() {
                offset -= seg.len();
                continue;
            }
            let n = (seg.len() - offset).min(dst.len() - copied);
            dst[copied..copied + n].copy_from_slice(&seg[offset..offset + n]);
            copied += n;
            offset = 0;
        }
        copied == dst.len()
    }
}

impl PktBuf for PktBuffer {
    #[inline]
    fn len(&self) -> usize {
        self.head.len() + self.frags_len
    }

    #[inline]
    fn network_offset(&self) -> usize {
        self.network_offset
    }

    #[inline]
    fn network_header(&self) -> &[u8] {
        &self.head[self.network_offset..]
    }

    #[inline]
    fn network_header_mut(&mut self) -> &mut [u8] {
        &mut self.head[self.network_offset..]
    }

    fn header_pointer<'a>(&'a self, offset: usize, scratch: &'a mut [u8]) -> Option<&'a [u8]> {
        let end = offset.checked_add(scratch.len())?;
        if end <= self.head.len() {
            return Some(&self.head[offset..end]);
        }
        if self.copy_bits(offset, scratch) {
            Some(scratch)
        } else {
            None
        }
    }

    #[inline]
    fn meta(&self) -> &PktMeta {
        &self.meta
    }

    #[inline]
    fn meta_mut(&mut self) -> &mut PktMeta {
        &mut self.meta
    }

    #[inline]
    fn dst(&self) -> Option<&Route> {
        self.dst.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paged() -> PktBuffer {
        let head: Vec<u8> = (0..16).collect();
        let mut pkt = PktBuffer::new(&head);
        pkt.push_frag(Bytes::from((16..24).collect::<Vec<u8>>()));
        pkt.push_frag(Bytes::from((24..40).collect::<Vec<u8>>()));
        pkt
    }

    #[test]
    fn test_lengths() {
        let mut pkt = paged();
        assert_eq!(pkt.len(), 40);
        assert_eq!(pkt.linear_len(), 16);

        pkt.set_network_offset(4);
        assert_eq!(pkt.network_header().len(), 12);
        assert_eq!(pkt.network_header()[0], 4);

        pkt.network_header_mut()[0] = 0xff;
        assert_eq!(pkt.linear()[4], 0xff);
    }

    #[test]
    fn test_header_pointer_linear() {
        let pkt = paged();
        let mut scratch = [0; 4];
        let data = pkt.header_pointer(2, &mut scratch).unwrap();
        assert_eq!(data, &[2, 3, 4, 5]);
    }

    #[test]
    fn test_header_pointer_across_frags() {
        let pkt = paged();
        let mut scratch = [0; 20];
        let data = pkt.header_pointer(12, &mut scratch).unwrap();
        assert_eq!(data, &(12..32).collect::<Vec<u8>>()[..]);

        let mut scratch = [0; 8];
        let data = pkt.header_pointer(32, &mut scratch).unwrap();
        assert_eq!(data, &(32..40).collect::<Vec<u8>>()[..]);
    }

    #[test]
    fn test_header_pointer_out_of_range() {
        let pkt = paged();
        let mut scratch = [0; 8];
        assert!(pkt.header_pointer(33, &mut scratch).is_none());
        assert!(pkt.header_pointer(usize::MAX, &mut scratch).is_none());
    }

    #[test]
    fn test_through_mut_ref() {
        fn meta_of<B: PktBuf>(mut buf: B) -> PktMeta {
            buf.meta_mut().nhoff = 6;
            *buf.meta()
        }

        let mut pkt = paged();
        assert_eq!(meta_of(&mut pkt).nhoff, 6);
        assert_eq!(pkt.meta().nhoff, 6);
        assert_eq!(pkt.meta().frag_id(), None);
    }
}
