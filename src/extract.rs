//! Pulls the summarised fields out of the DNS message inside an envelope.

use crate::dns::Parser;
use crate::dnstap::{Direction, Envelope};
use crate::errors::DecodeError;
use crate::resource::Resource;
use crate::types::{Class, Message, Opcode, Rcode, Record, Type};
use std::fmt;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr};

/// Number of records in each section of a message.
///
/// Update messages reuse the question, answer and authority sections as the
/// zone, prerequisite and update sections. Those counts are only filled in
/// for messages with the UPDATE opcode, and are zero otherwise.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Counts {
    pub questions: usize,
    pub answers: usize,
    pub authorities: usize,
    pub additionals: usize,
    pub zones: usize,
    pub prereqs: usize,
    pub updates: usize,
}

impl Counts {
    fn new(m: &Message) -> Counts {
        let mut counts = Counts {
            questions: m.questions.len(),
            answers: m.answers.len(),
            authorities: m.authoritys.len(),
            additionals: m.additional_count(),
            ..Default::default()
        };

        if m.opcode == Opcode::Update {
            counts.zones = counts.questions;
            counts.prereqs = counts.answers;
            counts.updates = counts.authorities;
        }

        counts
    }
}

/// The parts of a DNS message that make it into an event.
///
/// Only ever built from a message that parsed and has a question, so every
/// field is always filled in.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedDns {
    pub direction: Direction,

    /// The whole parsed message, used for the full message rendering.
    pub message: Message,

    pub size: usize,
    pub id: u16,
    pub opcode: Opcode,
    pub rcode: Rcode,

    /// Header flags that are set, e.g. "qr rd ra".
    pub flags: String,

    pub counts: Counts,

    /// Name, type and class of the first question.
    pub qname: String,
    pub qtype: Type,
    pub qclass: Class,

    /// Summaries of the answer section, in order.
    pub answers: Vec<Answer>,
}

impl ParsedDns {
    /// Parses the DNS message matching the envelope's direction.
    ///
    /// # Errors
    ///
    /// [`DecodeError::InvalidDns`] if there is no message or it does not
    /// parse, and [`DecodeError::NoQuestion`] if it has no question.
    pub fn extract<P: Parser + ?Sized>(
        envelope: &Envelope,
        parser: &P,
    ) -> Result<ParsedDns, DecodeError> {
        let wire = match envelope.dns_message() {
            Some(wire) => wire,
            None => {
                return Err(DecodeError::InvalidDns(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("{} frame has no DNS message", envelope.message_type),
                )))
            }
        };

        let message = parser.parse(wire).map_err(DecodeError::InvalidDns)?;

        ParsedDns::from_message(envelope.direction, message)
    }

    /// Summarises an already parsed message.
    pub fn from_message(direction: Direction, message: Message) -> Result<ParsedDns, DecodeError> {
        let question = match message.questions.first() {
            Some(q) => q.clone(),
            None => return Err(DecodeError::NoQuestion),
        };

        let answers = message.answers.iter().filter_map(Answer::from_record).collect();

        Ok(ParsedDns {
            direction,
            size: message.size,
            id: message.id,
            opcode: message.opcode,
            rcode: message.rcode,
            flags: message.flags(),
            counts: Counts::new(&message),
            qname: question.name,
            qtype: question.r#type,
            qclass: question.class,
            answers,
            message,
        })
    }

    /// The first question, e.g. "example.com. (IN, A)".
    pub fn first_question(&self) -> String {
        format!("{} ({}, {})", self.qname, self.qclass, self.qtype)
    }

    /// The answer summaries joined by spaces.
    pub fn answers_summary(&self) -> String {
        self.answers
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The message in `dig` style.
    pub fn full_message(&self) -> String {
        self.message.to_string()
    }
}

/// A one word (or so) summary of an answer record.
///
/// Only the record types people usually look for are summarised. Others are
/// left out of the summary altogether.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Answer {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),
    CNAME(String),
    NS(String),
    SRV(String),
    PTR(String),
    MX {
        exchange: String,
        preference: u16,
    },
    SOA {
        host: String,
        admin: String,
        serial: u32,
        refresh: u64,
        retry: u64,
        expire: u64,
        minimum: u64,
    },
}

impl Answer {
    /// Summarises the record, or returns `None` if its type is not
    /// summarised or its target name is missing.
    pub fn from_record(record: &Record) -> Option<Answer> {
        let answer = match &record.resource {
            Resource::A(ip) => Answer::A(*ip),
            Resource::AAAA(ip) => Answer::AAAA(*ip),

            Resource::CNAME(name) => Answer::CNAME(non_empty(name)?),
            Resource::NS(name) => Answer::NS(non_empty(name)?),
            Resource::PTR(name) => Answer::PTR(non_empty(name)?),
            Resource::SRV(srv) => Answer::SRV(non_empty(&srv.name)?),

            Resource::MX(mx) => Answer::MX {
                exchange: non_empty(&mx.exchange)?,
                preference: mx.preference,
            },

            Resource::SOA(soa) => Answer::SOA {
                host: non_empty(&soa.mname)?,
                admin: soa.rname.clone(),
                serial: soa.serial,
                refresh: soa.refresh.as_secs(),
                retry: soa.retry.as_secs(),
                expire: soa.expire.as_secs(),
                minimum: soa.minimum.as_secs(),
            },

            Resource::TXT(_) | Resource::Unknown(_, _) => return None,
        };

        Some(answer)
    }
}

fn non_empty(name: &str) -> Option<String> {
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Answer::A(ip) => ip.fmt(f),
            Answer::AAAA(ip) => ip.fmt(f),

            Answer::CNAME(name) | Answer::NS(name) | Answer::SRV(name) | Answer::PTR(name) => {
                name.fmt(f)
            }

            // "mail.example.com.(10)"
            Answer::MX {
                exchange,
                preference,
            } => write!(f, "{}({})", exchange, preference),

            // "(ns.example.com. admin.example.com. 2021061201 7200 3600 1209600 300)"
            Answer::SOA {
                host,
                admin,
                serial,
                refresh,
                retry,
                expire,
                minimum,
            } => write!(
                f,
                "({} {} {} {} {} {} {})",
                host, admin, serial, refresh, retry, expire, minimum
            ),
        }
    }
}
