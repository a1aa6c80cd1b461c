#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

//! Provide the IPv6 send-path pieces that sit right before transmission:
//! fragment identifier selection, fragment header placement and local output.

#[macro_use]
mod macros;

mod error;
pub use error::{Error, Result};

mod traits;
pub use traits::{PktBuf, PktMeta};

mod pbuf;
pub use pbuf::PktBuffer;

mod net;
pub use net::{Net, NetConfig, NetDevice, ProxyKeying, Route};

pub mod ident;

pub mod ipv6;

pub mod output;
pub use output::{Ip6Output, Status};

enum_sim! {
    /// An enum-like type for the link-layer protocol tag of a packet.
    pub struct EtherType (u16) {
        /// The packet carries IPv4.
        IPV4 = 0x0800,

        /// The packet carries ARP.
        ARP = 0x0806,

        /// The packet carries IPv6.
        IPV6 = 0x86dd,
    }
}
