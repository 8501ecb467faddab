//! Turns data frames into events.
//!
//! [`Codec`] runs the whole pipeline for one data frame: the dnstap envelope
//! is decoded, its DNS message parsed and summarised, and everything is
//! flattened into an [`Event`]. A frame that fails at any step produces no
//! event, and has no effect on later frames.

use crate::dns::{Parser, WireParser};
use crate::dnstap::{Direction, Envelope};
use crate::errors::DecodeError;
use crate::extract::ParsedDns;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::net::IpAddr;

/// Used as the event source when the peer is not known.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// One data frame, as handed over by the transport.
#[derive(Clone, Debug, PartialEq)]
pub struct RawFrame {
    pub payload: Bytes,

    /// When the frame was read off the connection.
    pub received: DateTime<Utc>,

    /// Host name (or address) of the peer that sent the frame.
    pub remote: Option<String>,
}

impl RawFrame {
    pub fn new(payload: Bytes, received: DateTime<Utc>, remote: Option<String>) -> RawFrame {
        RawFrame {
            payload,
            received,
            remote,
        }
    }
}

/// An event field value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Str(String),
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(i) => i.fmt(f),
            Value::Str(s) => s.fmt(f),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i.into())
    }
}

impl From<u16> for Value {
    fn from(i: u16) -> Self {
        Value::Int(i.into())
    }
}

impl From<usize> for Value {
    fn from(i: usize) -> Self {
        // Sizes and counts are bounded by the frame size.
        Value::Int(i as i64)
    }
}

/// A decoded DNS transaction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Event {
    /// One line summary, e.g. "10.0.0.1 <- example.com. (IN, A) [93.184.216.34]".
    pub message: String,

    /// The DNS message in `dig` style, unless turned off by [`Config`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_message: Option<String>,

    /// Who sent the frame.
    pub source: String,

    pub timestamp: DateTime<Utc>,

    /// The `dnstap_*` fields.
    #[serde(flatten)]
    pub fields: BTreeMap<&'static str, Value>,
}

impl Event {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Leave the `dig` style rendering out of events.
    #[serde(default)]
    pub omit_full_message: bool,
}

/// Decodes data frames into events, using `P` to parse the DNS messages.
///
/// A `Codec` holds no per connection state, so one can be shared by every
/// connection.
#[derive(Clone, Debug)]
pub struct Codec<P = WireParser> {
    config: Config,
    parser: P,
}

impl Codec<WireParser> {
    pub fn new(config: Config) -> Self {
        Codec::with_parser(config, WireParser)
    }
}

impl Default for Codec<WireParser> {
    fn default() -> Self {
        Codec::new(Config::default())
    }
}

impl<P: Parser> Codec<P> {
    pub fn with_parser(config: Config, parser: P) -> Self {
        Codec { config, parser }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Decodes one frame, returning `None` if it does not make an event.
    pub fn decode(&self, frame: &RawFrame) -> Option<Event> {
        match self.try_decode(frame) {
            Ok(event) => event,
            Err(e) => {
                log::debug!("dropping {} byte dnstap frame: {}", frame.payload.len(), e);
                None
            }
        }
    }

    /// Like [`Codec::decode`], but says why a frame was dropped.
    ///
    /// Returns `Ok(None)` for well formed frames that do not carry a DNS
    /// message.
    pub fn try_decode(&self, frame: &RawFrame) -> Result<Option<Event>, DecodeError> {
        let envelope = match Envelope::from_slice(&frame.payload)? {
            Some(envelope) => envelope,
            None => return Ok(None),
        };

        let dns = ParsedDns::extract(&envelope, &self.parser)?;

        let source = frame.remote.as_deref().unwrap_or(UNKNOWN_SOURCE);
        let event = self.normalize(&envelope, &dns, frame.received, source);

        log::trace!("dnstap event {:?}", event);
        Ok(Some(event))
    }

    /// Builds the event for an envelope and its parsed DNS message.
    pub fn normalize(
        &self,
        envelope: &Envelope,
        dns: &ParsedDns,
        received: DateTime<Utc>,
        source: &str,
    ) -> Event {
        let query_ip = envelope.query_ip();
        let response_ip = envelope.response_ip();

        let mut fields: BTreeMap<&'static str, Value> = BTreeMap::new();

        if let Some(exec_time) = envelope.exec_time().filter(|t| *t >= 0) {
            fields.insert("dnstap_exec_time", exec_time.into());
        }

        fields.insert("dnstap_type", envelope.message_type.to_string().into());
        fields.insert("dnstap_sock_family", envelope.socket_family.to_string().into());
        fields.insert("dnstap_sock_proto", envelope.socket_protocol.to_string().into());

        if let Some(ip) = query_ip {
            fields.insert("dnstap_query_addr", ip.to_string().into());
            fields.insert("dnstap_query_port", envelope.query_port.into());
        }
        if let Some(ip) = response_ip {
            fields.insert("dnstap_resp_addr", ip.to_string().into());
            fields.insert("dnstap_resp_port", envelope.response_port.into());
        }

        fields.insert("dnstap_size", dns.size.into());
        fields.insert("dnstap_id", dns.id.into());
        fields.insert("dnstap_flags", dns.flags.clone().into());
        fields.insert("dnstap_rcode", dns.rcode.to_string().into());
        fields.insert("dnstap_opcode", dns.opcode.to_string().into());

        fields.insert("dnstap_qname", dns.qname.clone().into());
        fields.insert("dnstap_qtype", dns.qtype.to_string().into());
        fields.insert("dnstap_qdclass", dns.qclass.to_string().into());

        let counts = &dns.counts;
        fields.insert("dnstap_num_questions", counts.questions.into());
        fields.insert("dnstap_num_answers", counts.answers.into());
        fields.insert("dnstap_num_authorities", counts.authorities.into());
        fields.insert("dnstap_num_additionals", counts.additionals.into());
        fields.insert("dnstap_num_zones", counts.zones.into());
        fields.insert("dnstap_num_prereqs", counts.prereqs.into());
        fields.insert("dnstap_num_updates", counts.updates.into());

        Event {
            message: summary(query_ip, dns),
            full_message: if self.config.omit_full_message {
                None
            } else {
                Some(dns.full_message())
            },
            source: source.to_string(),
            timestamp: envelope.timestamp(received),
            fields,
        }
    }
}

/// The one line summary of a transaction.
///
/// ```text
/// 10.0.0.1 -> example.com. (IN, A)
/// 10.0.0.1 <- example.com. (IN, A) [93.184.216.34]
/// ```
fn summary(query_ip: Option<IpAddr>, dns: &ParsedDns) -> String {
    let addr = query_ip.map(|ip| ip.to_string()).unwrap_or_default();

    match dns.direction {
        Direction::Query => format!("{} -> {}", addr, dns.first_question()),
        Direction::Response => format!(
            "{} <- {} [{}]",
            addr,
            dns.first_question(),
            dns.answers_summary()
        ),
    }
}
