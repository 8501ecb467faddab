//! Decoding of dnstap envelopes carried in Frame Streams data frames.

use crate::errors::DecodeError;
use crate::proto;
use crate::proto::{SocketFamily, SocketProtocol};
use chrono::{DateTime, TimeZone, Utc};
use prost::Message as _;
use std::convert::TryInto;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

pub use crate::proto::message::Type as MessageType;

const NANOS_PER_SECOND: i64 = 1_000_000_000;
const NANOS_PER_MILLI: u32 = 1_000_000;

/// Whether a dnstap message records a query or a response.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Query,
    Response,
}

impl MessageType {
    /// Collapses the message type into a [`Direction`].
    ///
    /// Only auth, resolver and client messages are understood, everything
    /// else returns `None`.
    pub fn direction(self) -> Option<Direction> {
        match self {
            MessageType::AuthQuery | MessageType::ResolverQuery | MessageType::ClientQuery => {
                Some(Direction::Query)
            }
            MessageType::AuthResponse
            | MessageType::ResolverResponse
            | MessageType::ClientResponse => Some(Direction::Response),
            _ => None,
        }
    }
}

/// A seconds and nanoseconds pair, as recorded by the DNS software.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Timestamp {
    pub sec: u64,
    pub nsec: u32,
}

impl Timestamp {
    fn new(sec: Option<u64>, nsec: Option<u32>) -> Timestamp {
        Timestamp {
            sec: sec.unwrap_or_default(),
            nsec: nsec.unwrap_or_default(),
        }
    }

    /// Milliseconds since the epoch, rounding the nanoseconds half up.
    /// Returns `None` unless the seconds are set.
    pub fn as_millis(&self) -> Option<i64> {
        if self.sec == 0 {
            return None;
        }

        let sec: i64 = self.sec.try_into().ok()?;
        // nsec is not range checked on the wire, so may exceed a second.
        let nanos_per_milli = u64::from(NANOS_PER_MILLI);
        let millis = (u64::from(self.nsec) + nanos_per_milli / 2) / nanos_per_milli;
        let millis: i64 = millis.try_into().ok()?;

        sec.checked_mul(1000)?.checked_add(millis)
    }
}

/// The parts of a dnstap `MESSAGE` frame needed to build an event.
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    pub message_type: MessageType,
    pub direction: Direction,

    pub socket_family: SocketFamily,
    pub socket_protocol: SocketProtocol,

    /// Raw address bytes, 4 or 16 bytes long when well formed.
    pub query_address: Option<Vec<u8>>,
    pub response_address: Option<Vec<u8>>,

    pub query_port: u32,
    pub response_port: u32,

    pub query_time: Timestamp,
    pub response_time: Timestamp,

    /// Wire-format DNS messages. Only the one matching `direction` is used.
    pub query_message: Option<Vec<u8>>,
    pub response_message: Option<Vec<u8>>,
}

impl Envelope {
    /// Decodes a data frame payload.
    ///
    /// Returns `Ok(None)` for well formed frames that do not carry a DNS
    /// message.
    ///
    /// # Errors
    ///
    /// Fails if the payload is not a dnstap protobuf, or the message type is
    /// not one of the auth, resolver or client query/response types.
    pub fn from_slice(buf: &[u8]) -> Result<Option<Envelope>, DecodeError> {
        let dnstap = proto::Dnstap::decode(buf)?;

        match proto::dnstap::Type::from_i32(dnstap.r#type) {
            Some(proto::dnstap::Type::Message) => (),
            None => {
                log::trace!("ignoring dnstap frame of type {}", dnstap.r#type);
                return Ok(None);
            }
        }

        match dnstap.message {
            Some(message) => Envelope::from_message(message).map(Some),
            None => Err(DecodeError::MissingMessage(dnstap.r#type)),
        }
    }

    fn from_message(m: proto::Message) -> Result<Envelope, DecodeError> {
        let message_type = match MessageType::from_i32(m.r#type) {
            Some(t) => t,
            None => return Err(DecodeError::UnknownMessageType(m.r#type)),
        };
        let direction = match message_type.direction() {
            Some(d) => d,
            None => return Err(DecodeError::UnknownMessageType(m.r#type)),
        };

        Ok(Envelope {
            message_type,
            direction,

            socket_family: m
                .socket_family
                .and_then(SocketFamily::from_i32)
                .unwrap_or_default(),
            socket_protocol: m
                .socket_protocol
                .and_then(SocketProtocol::from_i32)
                .unwrap_or_default(),

            query_address: m.query_address,
            response_address: m.response_address,
            query_port: m.query_port.unwrap_or_default(),
            response_port: m.response_port.unwrap_or_default(),

            query_time: Timestamp::new(m.query_time_sec, m.query_time_nsec),
            response_time: Timestamp::new(m.response_time_sec, m.response_time_nsec),

            query_message: m.query_message,
            response_message: m.response_message,
        })
    }

    /// The wire-format DNS message matching this envelope's direction.
    pub fn dns_message(&self) -> Option<&[u8]> {
        match self.direction {
            Direction::Query => self.query_message.as_deref(),
            Direction::Response => self.response_message.as_deref(),
        }
    }

    /// When the DNS software saw the message, falling back to `received` if
    /// it did not record a time.
    pub fn timestamp(&self, received: DateTime<Utc>) -> DateTime<Utc> {
        let time = match self.direction {
            Direction::Query => self.query_time,
            Direction::Response => self.response_time,
        };

        time.as_millis()
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
            .unwrap_or(received)
    }

    /// Nanoseconds between query and response, for responses that carry both
    /// times. May be negative if the clocks disagree.
    pub fn exec_time(&self) -> Option<i64> {
        if self.direction != Direction::Response {
            return None;
        }
        if self.query_time.sec == 0 || self.response_time.sec == 0 {
            return None;
        }

        let query_sec: i64 = self.query_time.sec.try_into().ok()?;
        let response_sec: i64 = self.response_time.sec.try_into().ok()?;
        let sec = response_sec.checked_sub(query_sec)?;
        let nsec = i64::from(self.response_time.nsec) - i64::from(self.query_time.nsec);

        sec.checked_mul(NANOS_PER_SECOND)?.checked_add(nsec)
    }

    pub fn query_ip(&self) -> Option<IpAddr> {
        ip_address(self.query_address.as_deref())
    }

    pub fn response_ip(&self) -> Option<IpAddr> {
        ip_address(self.response_address.as_deref())
    }
}

/// Turns 4 or 16 raw bytes into an address. Any other length is rejected.
pub fn ip_address(bytes: Option<&[u8]>) -> Option<IpAddr> {
    let bytes = bytes?;

    if let Ok(v4) = TryInto::<[u8; 4]>::try_into(bytes) {
        return Some(IpAddr::V4(Ipv4Addr::from(v4)));
    }
    if let Ok(v6) = TryInto::<[u8; 16]>::try_into(bytes) {
        return Some(IpAddr::V6(Ipv6Addr::from(v6)));
    }

    None
}
