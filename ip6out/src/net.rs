use std::net::Ipv6Addr;
use std::sync::Arc;

use byteorder::{ByteOrder, NetworkEndian};
use log::debug;

use crate::error::{Error, Result};
use crate::ident::{fragment_ident, IdentAllocator, IdentBuckets, IdentKey};
use crate::ipv6::{FragHeader, SADDR_OFFSET};
use crate::traits::PktBuf;

/// How the proxy identifier path is keyed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProxyKeying {
    /// The proxy path hashes with the namespace key.
    #[default]
    Shared,
    /// The proxy path hashes with its own key, so its identifiers cannot be
    /// correlated with the ones from the regular path.
    Independent,
}

/// Configuration of a network namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NetConfig {
    proxy_keying: ProxyKeying,
    ident_buckets: usize,
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            proxy_keying: ProxyKeying::Shared,
            ident_buckets: 2048,
        }
    }
}

impl NetConfig {
    /// Select the keying of the proxy identifier path.
    pub fn proxy_keying(mut self, keying: ProxyKeying) -> Self {
        self.proxy_keying = keying;
        self
    }

    /// Set the number of identifier buckets, rounded up to a power of two.
    ///
    /// # Panics
    ///
    /// Panics if `n` is 0 or rounds up past `u32::MAX`.
    pub fn ident_buckets(mut self, n: usize) -> Self {
        assert!(n > 0 && n <= (1 << 31));
        self.ident_buckets = n.next_power_of_two();
        self
    }

    /// The keying of the proxy identifier path.
    pub fn get_proxy_keying(&self) -> ProxyKeying {
        self.proxy_keying
    }

    /// The number of identifier buckets.
    pub fn get_ident_buckets(&self) -> usize {
        self.ident_buckets
    }
}

/// An output network device.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetDevice {
    /// Interface name.
    pub name: String,
    /// Interface index.
    pub ifindex: u32,
    /// Link MTU.
    pub mtu: u32,
}

/// A resolved route.
#[derive(Clone, Debug)]
pub struct Route {
    dev: Arc<NetDevice>,
    src: Ipv6Addr,
    dst: Ipv6Addr,
}

impl Route {
    /// Create a route through `dev` from `src` to `dst`.
    pub fn new(dev: Arc<NetDevice>, src: Ipv6Addr, dst: Ipv6Addr) -> Self {
        Self { dev, src, dst }
    }

    /// The output device.
    #[inline]
    pub fn dev(&self) -> &Arc<NetDevice> {
        &self.dev
    }

    /// Source address of the route.
    #[inline]
    pub fn src(&self) -> &Ipv6Addr {
        &self.src
    }

    /// Destination address of the route.
    #[inline]
    pub fn dst(&self) -> &Ipv6Addr {
        &self.dst
    }
}

/// A network namespace: the identifier keys and counters shared by all
/// flows sent from it.
#[derive(Debug)]
pub struct Net {
    config: NetConfig,
    ident_key: IdentKey,
    proxy_ident_key: IdentKey,
    idents: Box<dyn IdentAllocator>,
}

impl Default for Net {
    fn default() -> Self {
        Self::new(NetConfig::default())
    }
}

impl Net {
    /// Create a namespace with hashed identifier buckets.
    pub fn new(config: NetConfig) -> Self {
        let idents = IdentBuckets::new(config.get_ident_buckets());
        Self::with_allocator(config, idents)
    }

    /// Create a namespace that reserves identifiers from `idents`.
    pub fn with_allocator<A: IdentAllocator + 'static>(config: NetConfig, idents: A) -> Self {
        Self {
            config,
            ident_key: IdentKey::zeroed(),
            proxy_ident_key: IdentKey::zeroed(),
            idents: Box::new(idents),
        }
    }

    /// The namespace configuration.
    #[inline]
    pub fn config(&self) -> &NetConfig {
        &self.config
    }

    /// The key used by [`Net::select_ident`].
    #[inline]
    pub fn ident_key(&self) -> &IdentKey {
        &self.ident_key
    }

    /// The key used by [`Net::proxy_select_ident`].
    #[inline]
    pub fn proxy_ident_key(&self) -> &IdentKey {
        match self.config.proxy_keying {
            ProxyKeying::Shared => &self.ident_key,
            ProxyKeying::Independent => &self.proxy_ident_key,
        }
    }

    /// Select the fragment identifier for the flow from `src` to `dst`.
    #[inline]
    pub fn select_ident(&self, dst: &Ipv6Addr, src: &Ipv6Addr) -> u32 {
        fragment_ident(&self.ident_key, &*self.idents, dst, src)
    }

    /// Select the fragment identifier for packets following `route` and
    /// write it into `fhdr`.
    pub fn select_frag_ident<T: AsMut<[u8]>>(&self, fhdr: &mut FragHeader<T>, route: &Route) -> u32 {
        let id = self.select_ident(route.dst(), route.src());
        fhdr.set_ident(id);
        id
    }

    /// Select a fragment identifier from the addresses in the IPv6 header of
    /// `buf` and store it in the packet metadata.
    ///
    /// This serves senders that hand over large datagrams for segmentation
    /// without choosing an identifier themselves. The network header must be
    /// set. If the addresses cannot be read the metadata is left untouched.
    pub fn proxy_select_ident<B: PktBuf + ?Sized>(&self, buf: &mut B) -> Result<u32> {
        let offset = buf.network_offset() + SADDR_OFFSET;
        let mut scratch = [0u8; 32];
        let (src, dst) = match buf.header_pointer(offset, &mut scratch) {
            Some(addrs) => {
                let mut src = [0u8; 16];
                let mut dst = [0u8; 16];
                src.copy_from_slice(&addrs[..16]);
                dst.copy_from_slice(&addrs[16..32]);
                (Ipv6Addr::from(src), Ipv6Addr::from(dst))
            }
            None => {
                debug!("proxy ident: addresses not available at offset {}", offset);
                return Err(Error::BufferUnavailable { offset, len: 32 });
            }
        };

        let id = fragment_ident(self.proxy_ident_key(), &*self.idents, &dst, &src);
        NetworkEndian::write_u32(&mut buf.meta_mut().frag_id, id);
        Ok(id)
    }
}
