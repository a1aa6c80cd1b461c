//! IPv6 fragment identifier selection.
//!
//! Identifiers are drawn from a table of hashed counters. The bucket is
//! picked by a keyed hash of the destination and source addresses, so an
//! observer without the key cannot tell which counter a flow uses, and flows
//! that do not share a bucket do not see each other's identifiers advance.

use std::fmt;
use std::hash::Hasher;
use std::net::Ipv6Addr;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::time::Instant;

use log::debug;
use rand::rngs::OsRng;
use rand::{Rng, RngCore};
use siphasher::sip::SipHasher24;

/// A 128-bit SipHash key that fills itself with random bytes on first use.
///
/// The check for the all-zero key and the fill are not one atomic step.
/// Callers racing on a fresh key may each draw their own random words and
/// the key ends up with either draw, or one word of each. No lock guards
/// the fill.
#[derive(Debug, Default)]
pub struct IdentKey {
    k0: AtomicU64,
    k1: AtomicU64,
}

impl IdentKey {
    /// An all-zero key, to be filled on first use.
    pub const fn zeroed() -> Self {
        Self {
            k0: AtomicU64::new(0),
            k1: AtomicU64::new(0),
        }
    }

    /// A key with fixed words.
    pub const fn from_keys(k0: u64, k1: u64) -> Self {
        Self {
            k0: AtomicU64::new(k0),
            k1: AtomicU64::new(k1),
        }
    }

    /// Whether the key has not been filled yet.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.load() == (0, 0)
    }

    #[inline]
    fn load(&self) -> (u64, u64) {
        (
            self.k0.load(Ordering::Relaxed),
            self.k1.load(Ordering::Relaxed),
        )
    }

    /// Return the key words, filling the key from the OS random source if it
    /// is still all zero.
    pub fn get_or_init(&self) -> (u64, u64) {
        let keys = self.load();
        if keys != (0, 0) {
            return keys;
        }

        let k0 = OsRng.next_u64();
        let k1 = OsRng.next_u64();
        // Each word is only installed over zero; a racing writer may win
        // either word.
        let _ = self
            .k0
            .compare_exchange(0, k0, Ordering::Relaxed, Ordering::Relaxed);
        let _ = self
            .k1
            .compare_exchange(0, k1, Ordering::Relaxed, Ordering::Relaxed);
        debug!("generated fragment identifier key");
        self.load()
    }

    /// SipHash-2-4 of `data` under this key.
    pub fn hash(&self, data: &[u8]) -> u64 {
        let (k0, k1) = self.get_or_init();
        let mut hasher = SipHasher24::new_with_keys(k0, k1);
        hasher.write(data);
        hasher.finish()
    }
}

/// Hands out identifiers for a hash bucket.
pub trait IdentAllocator: fmt::Debug + Send + Sync {
    /// Reserve `count` consecutive identifiers for the bucket selected by
    /// `hash` and return the first one.
    fn reserve(&self, hash: u32, count: u32) -> u32;
}

/// A table of identifier counters indexed by hash.
///
/// When a bucket is used again after being idle, the counter jumps forward
/// by a random amount below the idle time in milliseconds. Sampling the
/// identifiers of one flow then says little about how many packets other
/// flows in the bucket sent.
pub struct IdentBuckets {
    idents: Box<[AtomicU32]>,
    tstamps: Box<[AtomicU32]>,
    mask: u32,
    epoch: Instant,
}

impl IdentBuckets {
    /// Create a table of `n` buckets with random initial counters.
    ///
    /// # Panics
    ///
    /// Panics if `n` is not a power of two or does not fit in a `u32`.
    pub fn new(n: usize) -> Self {
        assert!(n.is_power_of_two() && n <= (1 << 31));
        let mut rng = rand::thread_rng();
        Self {
            idents: (0..n).map(|_| AtomicU32::new(rng.gen())).collect(),
            tstamps: (0..n).map(|_| AtomicU32::new(0)).collect(),
            mask: (n - 1) as u32,
            epoch: Instant::now(),
        }
    }

    /// The number of buckets.
    pub fn len(&self) -> usize {
        self.idents.len()
    }

    /// Always false, a table holds at least one bucket.
    pub fn is_empty(&self) -> bool {
        self.idents.is_empty()
    }

    #[inline]
    fn now(&self) -> u32 {
        self.epoch.elapsed().as_millis() as u32
    }
}

impl fmt::Debug for IdentBuckets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentBuckets")
            .field("buckets", &self.idents.len())
            .finish()
    }
}

impl IdentAllocator for IdentBuckets {
    fn reserve(&self, hash: u32, count: u32) -> u32 {
        let bucket = (hash & self.mask) as usize;
        let p_id = &self.idents[bucket];
        let p_tstamp = &self.tstamps[bucket];

        let old = p_tstamp.load(Ordering::Relaxed);
        let now = self.now();
        let mut delta = 0;
        if old != now
            && p_tstamp
                .compare_exchange(old, now, Ordering::Relaxed, Ordering::Relaxed)
                .is_ok()
        {
            delta = rand::thread_rng().gen_range(0..now.wrapping_sub(old));
        }

        p_id.fetch_add(count.wrapping_add(delta), Ordering::Relaxed)
            .wrapping_add(delta)
    }
}

/// Select the fragment identifier for the flow from `src` to `dst`.
///
/// The result is never 0, which marks an unset identifier. A reservation of
/// 0 is replaced by `1 << 31` instead of drawing again.
pub fn fragment_ident(
    key: &IdentKey,
    idents: &dyn IdentAllocator,
    dst: &Ipv6Addr,
    src: &Ipv6Addr,
) -> u32 {
    let mut combined = [0u8; 32];
    combined[..16].copy_from_slice(&dst.octets());
    combined[16..].copy_from_slice(&src.octets());

    let hash = key.hash(&combined) as u32;
    match idents.reserve(hash, 1) {
        0 => 1 << 31,
        id => id,
    }
}
