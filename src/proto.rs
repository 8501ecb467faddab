//! Protobuf bindings for the dnstap schema.
//!
//! Mirrors `dnstap.proto` from <https://github.com/dnstap/dnstap.pb>. Only the
//! fields needed to describe a DNS transaction are kept; unknown fields (such
//! as `policy`) are skipped by the decoder.
#![allow(clippy::derive_partial_eq_without_eq)]

use strum_macros::Display;

/// The outer envelope of every dnstap payload.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Dnstap {
    /// DNS server identity.
    #[prost(bytes = "vec", optional, tag = "1")]
    pub identity: Option<Vec<u8>>,

    /// DNS server version.
    #[prost(bytes = "vec", optional, tag = "2")]
    pub version: Option<Vec<u8>>,

    /// Extra data for this payload.
    #[prost(bytes = "vec", optional, tag = "3")]
    pub extra: Option<Vec<u8>>,

    #[prost(message, optional, tag = "14")]
    pub message: Option<Message>,

    #[prost(enumeration = "dnstap::Type", required, tag = "15")]
    pub r#type: i32,
}

pub mod dnstap {
    use strum_macros::Display;

    /// Identifies which field below is filled in.
    #[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Type {
        #[strum(serialize = "MESSAGE")]
        Message = 1,
    }
}

/// The network protocol family of a socket.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SocketFamily {
    /// IPv4 (RFC 791).
    #[strum(serialize = "INET")]
    Inet = 1,

    /// IPv6 (RFC 2460).
    #[strum(serialize = "INET6")]
    Inet6 = 2,
}

/// The transport protocol of a socket.
#[derive(Clone, Copy, Debug, Display, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SocketProtocol {
    #[strum(serialize = "UDP")]
    Udp = 1,

    #[strum(serialize = "TCP")]
    Tcp = 2,

    /// DNS over TLS (RFC 7858).
    #[strum(serialize = "DOT")]
    Dot = 3,

    /// DNS over HTTPS (RFC 8484).
    #[strum(serialize = "DOH")]
    Doh = 4,

    #[strum(serialize = "DNSCryptUDP")]
    DnsCryptUdp = 5,

    #[strum(serialize = "DNSCryptTCP")]
    DnsCryptTcp = 6,

    /// DNS over QUIC (RFC 9250).
    #[strum(serialize = "DOQ")]
    Doq = 7,
}

/// A wire-format DNS message together with its transport metadata.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Message {
    #[prost(enumeration = "message::Type", required, tag = "1")]
    pub r#type: i32,

    #[prost(enumeration = "SocketFamily", optional, tag = "2")]
    pub socket_family: Option<i32>,

    #[prost(enumeration = "SocketProtocol", optional, tag = "3")]
    pub socket_protocol: Option<i32>,

    /// The initiator's address, 4 or 16 bytes.
    #[prost(bytes = "vec", optional, tag = "4")]
    pub query_address: Option<Vec<u8>>,

    /// The responder's address, 4 or 16 bytes.
    #[prost(bytes = "vec", optional, tag = "5")]
    pub response_address: Option<Vec<u8>>,

    #[prost(uint32, optional, tag = "6")]
    pub query_port: Option<u32>,

    #[prost(uint32, optional, tag = "7")]
    pub response_port: Option<u32>,

    #[prost(uint64, optional, tag = "8")]
    pub query_time_sec: Option<u64>,

    #[prost(fixed32, optional, tag = "9")]
    pub query_time_nsec: Option<u32>,

    /// The initiator's original wire-format DNS query message.
    #[prost(bytes = "vec", optional, tag = "10")]
    pub query_message: Option<Vec<u8>>,

    /// The "zone" or "bailiwick" of the query, as a wire-format name.
    #[prost(bytes = "vec", optional, tag = "11")]
    pub query_zone: Option<Vec<u8>>,

    #[prost(uint64, optional, tag = "12")]
    pub response_time_sec: Option<u64>,

    #[prost(fixed32, optional, tag = "13")]
    pub response_time_nsec: Option<u32>,

    /// The responder's original wire-format DNS response message.
    #[prost(bytes = "vec", optional, tag = "14")]
    pub response_message: Option<Vec<u8>>,
}

pub mod message {
    use strum_macros::{Display, EnumString};

    /// Where in the resolution chain the message was captured.
    #[derive(Clone, Copy, Debug, Display, EnumString, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Type {
        #[strum(serialize = "AUTH_QUERY")]
        AuthQuery = 1,
        #[strum(serialize = "AUTH_RESPONSE")]
        AuthResponse = 2,
        #[strum(serialize = "RESOLVER_QUERY")]
        ResolverQuery = 3,
        #[strum(serialize = "RESOLVER_RESPONSE")]
        ResolverResponse = 4,
        #[strum(serialize = "CLIENT_QUERY")]
        ClientQuery = 5,
        #[strum(serialize = "CLIENT_RESPONSE")]
        ClientResponse = 6,
        #[strum(serialize = "FORWARDER_QUERY")]
        ForwarderQuery = 7,
        #[strum(serialize = "FORWARDER_RESPONSE")]
        ForwarderResponse = 8,
        #[strum(serialize = "STUB_QUERY")]
        StubQuery = 9,
        #[strum(serialize = "STUB_RESPONSE")]
        StubResponse = 10,
        #[strum(serialize = "TOOL_QUERY")]
        ToolQuery = 11,
        #[strum(serialize = "TOOL_RESPONSE")]
        ToolResponse = 12,
        #[strum(serialize = "UPDATE_QUERY")]
        UpdateQuery = 13,
        #[strum(serialize = "UPDATE_RESPONSE")]
        UpdateResponse = 14,
    }
}
