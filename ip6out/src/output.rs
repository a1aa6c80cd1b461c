//! Local output of IPv6 packets.
//!
//! [`Ip6Output`] finishes a locally generated packet, runs the `LOCAL_OUT`
//! hook point and hands accepted packets to the transmission path.

use std::fmt;
use std::sync::Arc;

use log::trace;

use crate::error::{Error, Result};
use crate::ipv6::{Ipv6Header, IPV6_HEADER_LEN, IPV6_MAXPLEN, NEXTHDR_OFFSET};
use crate::net::{Net, NetDevice};
use crate::traits::PktBuf;
use crate::EtherType;

enum_sim! {
    /// Outcome of a send-path step that did not fail.
    pub struct Status (i32) {
        /// The packet was consumed: sent, stolen or queued.
        SUCCESS = 0,

        /// The hooks accepted the packet and the caller should transmit it.
        CONTINUE = 1,

        /// The packet was sent but the device reported congestion.
        CONGESTED = 2,
    }
}

enum_sim! {
    /// Protocol family of a hook.
    pub struct NfProto (u8) {
        /// Hooks shared by IPv4 and IPv6.
        INET = 1,

        /// IPv4 hooks.
        IPV4 = 2,

        /// ARP hooks.
        ARP = 3,

        /// IPv6 hooks.
        IPV6 = 10,
    }
}

enum_sim! {
    /// Hook point on the packet path.
    pub struct NfHook (u8) {
        /// Before routing of received packets.
        PRE_ROUTING = 0,

        /// Received packets for the local host.
        LOCAL_IN = 1,

        /// Forwarded packets.
        FORWARD = 2,

        /// Locally generated packets.
        LOCAL_OUT = 3,

        /// Packets about to leave.
        POST_ROUTING = 4,
    }
}

/// The continuation handed to the hook chain. Calling it sends the packet.
pub type OkFn<'a, B> = &'a dyn Fn(&Net, &mut B) -> Result<Status>;

/// A hook chain.
pub trait NfHooks<B> {
    /// Run the hooks registered for `pf` at `hook` on `buf`.
    ///
    /// Returns [`Status::CONTINUE`] when the caller should go on and call
    /// `okfn` itself. Any other status means the chain took care of the
    /// packet.
    #[allow(clippy::too_many_arguments)]
    fn run(
        &self,
        pf: NfProto,
        hook: NfHook,
        net: &Net,
        buf: &mut B,
        indev: Option<&NetDevice>,
        outdev: Option<&NetDevice>,
        okfn: OkFn<'_, B>,
    ) -> Result<Status>;
}

/// The transmission path of a route.
pub trait DstOutput<B> {
    /// Send `buf`.
    fn output(&self, net: &Net, buf: &mut B) -> Result<Status>;
}

impl<B, F> DstOutput<B> for F
where
    F: Fn(&Net, &mut B) -> Result<Status>,
{
    #[inline]
    fn output(&self, net: &Net, buf: &mut B) -> Result<Status> {
        self(net, buf)
    }
}

/// Verdict of a single hook.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NfVerdict {
    /// Pass the packet to the next hook.
    Accept,
    /// Drop the packet.
    Drop,
    /// The hook took the packet over.
    Stolen,
    /// The hook queued the packet for later reinjection.
    Queue,
}

/// What a hook function sees besides the packet.
pub struct HookState<'a, B> {
    /// Protocol family.
    pub pf: NfProto,
    /// Hook point.
    pub hook: NfHook,
    /// Namespace of the packet.
    pub net: &'a Net,
    /// Input device.
    pub indev: Option<&'a NetDevice>,
    /// Output device.
    pub outdev: Option<&'a NetDevice>,
    /// Sends the packet. A hook that calls it returns [`NfVerdict::Stolen`].
    pub okfn: OkFn<'a, B>,
}

impl<B> fmt::Debug for HookState<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookState")
            .field("pf", &self.pf)
            .field("hook", &self.hook)
            .field("indev", &self.indev)
            .field("outdev", &self.outdev)
            .finish()
    }
}

type HookFn<B> = Box<dyn Fn(&HookState<'_, B>, &mut B) -> NfVerdict + Send + Sync>;

struct HookEntry<B> {
    pf: NfProto,
    hook: NfHook,
    priority: i32,
    func: HookFn<B>,
}

/// A chain of hook functions run in ascending priority order.
pub struct HookList<B> {
    entries: Vec<HookEntry<B>>,
}

impl<B> Default for HookList<B> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<B> fmt::Debug for HookList<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookList")
            .field("entries", &self.entries.len())
            .finish()
    }
}

impl<B> HookList<B> {
    /// Create an empty chain. It accepts every packet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `func` for `pf` at `hook`. Hooks with equal priority run in
    /// registration order.
    pub fn register<F>(&mut self, pf: NfProto, hook: NfHook, priority: i32, func: F)
    where
        F: Fn(&HookState<'_, B>, &mut B) -> NfVerdict + Send + Sync + 'static,
    {
        let pos = self.entries.partition_point(|e| e.priority <= priority);
        self.entries.insert(
            pos,
            HookEntry {
                pf,
                hook,
                priority,
                func: Box::new(func),
            },
        );
    }

    /// Number of registered hooks.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no hook is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<B> NfHooks<B> for HookList<B> {
    #[allow(clippy::too_many_arguments)]
    fn run(
        &self,
        pf: NfProto,
        hook: NfHook,
        net: &Net,
        buf: &mut B,
        indev: Option<&NetDevice>,
        outdev: Option<&NetDevice>,
        okfn: OkFn<'_, B>,
    ) -> Result<Status> {
        let state = HookState {
            pf,
            hook,
            net,
            indev,
            outdev,
            okfn,
        };

        for entry in self
            .entries
            .iter()
            .filter(|e| e.pf == pf && e.hook == hook)
        {
            match (entry.func)(&state, buf) {
                NfVerdict::Accept => {}
                NfVerdict::Drop => {
                    trace!("{}/{}: dropped by hook at priority {}", pf, hook, entry.priority);
                    return Err(Error::Dropped);
                }
                verdict @ (NfVerdict::Stolen | NfVerdict::Queue) => {
                    trace!("{}/{}: {:?} at priority {}", pf, hook, verdict, entry.priority);
                    return Ok(Status::SUCCESS);
                }
            }
        }
        Ok(Status::CONTINUE)
    }
}

/// The local output path: payload length fixup, `LOCAL_OUT` hooks and
/// transmission.
pub struct Ip6Output<H, O> {
    hooks: H,
    output: O,
}

impl<H, O> fmt::Debug for Ip6Output<H, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ip6Output").finish_non_exhaustive()
    }
}

impl<H, O> Ip6Output<H, O> {
    /// Create the output path from a hook chain and a transmission path.
    pub fn new(hooks: H, output: O) -> Self {
        Self { hooks, output }
    }

    /// The hook chain.
    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    /// The mutable hook chain.
    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }

    /// Finish the IPv6 header of `buf` and run the `LOCAL_OUT` hooks.
    ///
    /// A payload too long for the length field is marked with length 0, as
    /// a jumbogram would be. Returns [`Status::CONTINUE`] when the hooks
    /// accepted the packet without sending it.
    pub fn local_out_finalize<B: PktBuf>(&self, net: &Net, buf: &mut B) -> Result<Status>
    where
        H: NfHooks<B>,
        O: DstOutput<B>,
    {
        let outdev = buf
            .dst()
            .map(|rt| Arc::clone(rt.dev()))
            .ok_or(Error::NoRoute)?;
        let network_offset = buf.network_offset();

        let mut len = (buf.len() - network_offset).saturating_sub(IPV6_HEADER_LEN);
        if len > IPV6_MAXPLEN {
            len = 0;
        }
        match Ipv6Header::new(buf.network_header_mut()) {
            Ok(mut hdr) => hdr.set_payload_len(len as u16),
            Err(_) => {
                return Err(Error::BufferUnavailable {
                    offset: network_offset,
                    len: IPV6_HEADER_LEN,
                })
            }
        }

        let meta = buf.meta_mut();
        meta.nhoff = NEXTHDR_OFFSET as u16;
        meta.protocol = EtherType::IPV6;

        let okfn = |net: &Net, buf: &mut B| self.dst_output(net, buf);
        self.hooks.run(
            NfProto::IPV6,
            NfHook::LOCAL_OUT,
            net,
            buf,
            None,
            Some(&*outdev),
            &okfn,
        )
    }

    /// Finish `buf`, run the `LOCAL_OUT` hooks and send it if they accept.
    ///
    /// Everything other than acceptance is returned as is. The caller owns
    /// the packet afterwards either way.
    pub fn local_out<B: PktBuf>(&self, net: &Net, buf: &mut B) -> Result<Status>
    where
        H: NfHooks<B>,
        O: DstOutput<B>,
    {
        match self.local_out_finalize(net, buf)? {
            Status::CONTINUE => self.dst_output(net, buf),
            status => Ok(status),
        }
    }

    fn dst_output<B: PktBuf>(&self, net: &Net, buf: &mut B) -> Result<Status>
    where
        O: DstOutput<B>,
    {
        trace!("transmitting {} bytes", buf.len());
        self.output.output(net, buf)
    }
}
