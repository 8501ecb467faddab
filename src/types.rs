use crate::resource::Resource;
use std::fmt;
use std::time::Duration;
use strum_macros::EnumString;

/// A parsed DNS Message, as carried inside a dnstap query or response.
///
/// # Examples
///
/// ```rust
/// use rustdnstap::dns::{Parser, WireParser};
///
/// // A query for example.com A.
/// let wire = [
///     0x12, 0x34, 0x01, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
///     0x07, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 0x03, b'c', b'o', b'm', 0x00,
///     0x00, 0x01, 0x00, 0x01,
/// ];
///
/// let m = WireParser.parse(&wire).expect("invalid message");
/// assert_eq!(m.id, 0x1234);
/// assert_eq!(m.questions[0].name, "example.com.");
///
/// println!("{}", m);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Message {
    /// Size of the wire-format message in bytes.
    pub size: usize,

    /// 16-bit identifier assigned by the program that generated the query.
    /// Copied into the corresponding reply.
    pub id: u16,

    /// Recursion Desired.
    pub rd: bool,

    /// Truncation - specifies that this message was truncated.
    pub tc: bool,

    /// Authoritative Answer.
    pub aa: bool,

    /// Specifies kind of query in this message. 0 represents a standard query.
    pub opcode: Opcode,

    /// Specifies whether this message is a query (0), or a response (1).
    pub qr: QR,

    /// Response code.
    pub rcode: Rcode,

    /// Checking Disabled. See [rfc4035].
    ///
    /// [rfc4035]: https://datatracker.ietf.org/doc/html/rfc4035
    pub cd: bool,

    /// Authentic Data. See [rfc4035].
    ///
    /// [rfc4035]: https://datatracker.ietf.org/doc/html/rfc4035
    pub ad: bool,

    /// Z Reserved for future use.
    pub z: bool,

    /// Recursion Available.
    pub ra: bool,

    /// The questions, or the zone section of an update.
    pub questions: Vec<Question>,

    /// The answer records, or the prerequisite section of an update.
    pub answers: Vec<Record>,

    /// The authority records, or the update section of an update.
    pub authoritys: Vec<Record>,

    /// The additional records, excluding any EDNS(0) OPT record.
    pub additionals: Vec<Record>,

    /// Optional EDNS(0) record.
    pub extension: Option<Extension>,
}

impl Message {
    /// Returns the header flags that are set, in `dig` order, e.g. "qr rd ra".
    pub fn flags(&self) -> String {
        let flags = [
            (self.qr.to_bool(), "qr"),
            (self.aa, "aa"),
            (self.tc, "tc"),
            (self.rd, "rd"),
            (self.ra, "ra"),
            (self.ad, "ad"),
            (self.cd, "cd"),
        ];

        flags
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, name)| *name)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Number of records in the additional section, counting the OPT record.
    pub fn additional_count(&self) -> usize {
        self.additionals.len() + self.extension.is_some() as usize
    }
}

/// DNS Question.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Question {
    /// Fully qualified domain name, e.g. "example.com.".
    pub name: String,
    pub r#type: Type,
    pub class: Class,
}

/// Resource Record (RR)
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub name: String,
    pub class: Class,

    /// The number of seconds that the resource record may be cached.
    pub ttl: Duration,

    pub resource: Resource,
}

impl Record {
    pub fn r#type(&self) -> Type {
        self.resource.r#type()
    }
}

/// EDNS(0) extension record as defined in [rfc6891].
///
/// [rfc6891]: https://datatracker.ietf.org/doc/html/rfc6891
#[derive(Clone, Debug, PartialEq)]
pub struct Extension {
    /// Requestor's UDP payload size.
    pub payload_size: u16,

    pub extend_rcode: u8,
    pub version: u8,

    /// DNSSEC OK bit as defined by [rfc3225].
    ///
    /// [rfc3225]: https://datatracker.ietf.org/doc/html/rfc3225
    pub dnssec_ok: bool,
}

impl Default for Extension {
    fn default() -> Self {
        Extension {
            payload_size: 512, // The min valid size.
            extend_rcode: 0,
            version: 0,
            dnssec_ok: false,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumString, PartialEq, Eq)]
pub enum QR {
    Query = 0,
    Response = 1,
}

impl Default for QR {
    fn default() -> Self {
        QR::Query
    }
}

impl QR {
    pub fn from_bool(b: bool) -> QR {
        match b {
            false => QR::Query,
            true => QR::Response,
        }
    }

    pub fn to_bool(self) -> bool {
        match self {
            QR::Query => false,
            QR::Response => true,
        }
    }
}

/// Specifies kind of query in this message. See [rfc1035], [rfc6895] and <https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-5>
///
/// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
/// [rfc6895]: https://datatracker.ietf.org/doc/html/rfc6895
///
/// Unassigned values are kept as `Reserved` and displayed as `RESERVED<n>`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Opcode {
    Query,

    /// Inverse Query (OBSOLETE). See [rfc3425].
    ///
    /// [rfc3425]: https://datatracker.ietf.org/doc/html/rfc3425
    IQuery,

    Status,

    /// See [rfc1996]
    ///
    /// [rfc1996]: https://datatracker.ietf.org/doc/html/rfc1996
    Notify,

    /// See [rfc2136]
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    Update,

    /// DNS Stateful Operations (DSO). See [rfc8490]
    ///
    /// [rfc8490]: https://datatracker.ietf.org/doc/html/rfc8490
    DSO,

    /// 3 and 7-15 remain unassigned. Only the low 4 bits are meaningful.
    Reserved(u8),
}

impl Default for Opcode {
    fn default() -> Self {
        Opcode::Query
    }
}

impl From<u8> for Opcode {
    fn from(value: u8) -> Self {
        match value {
            0 => Opcode::Query,
            1 => Opcode::IQuery,
            2 => Opcode::Status,
            4 => Opcode::Notify,
            5 => Opcode::Update,
            6 => Opcode::DSO,
            n => Opcode::Reserved(n),
        }
    }
}

impl From<Opcode> for u8 {
    fn from(opcode: Opcode) -> Self {
        match opcode {
            Opcode::Query => 0,
            Opcode::IQuery => 1,
            Opcode::Status => 2,
            Opcode::Notify => 4,
            Opcode::Update => 5,
            Opcode::DSO => 6,
            Opcode::Reserved(n) => n,
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Opcode::Query => "QUERY",
            Opcode::IQuery => "IQUERY",
            Opcode::Status => "STATUS",
            Opcode::Notify => "NOTIFY",
            Opcode::Update => "UPDATE",
            Opcode::DSO => "DSO",
            Opcode::Reserved(n) => return f.pad(&format!("RESERVED{}", n)),
        };

        f.pad(name)
    }
}

/// Response Codes.
/// See [rfc1035] and <https://www.iana.org/assignments/dns-parameters/dns-parameters.xhtml#dns-parameters-6>
///
/// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
///
/// Unassigned values are kept as `Reserved` and displayed as `RESERVED<n>`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Rcode {
    NoError,

    FormErr,

    ServFail,

    NXDomain,

    NotImp,

    Refused,

    /// Name Exists when it should not. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    YXDomain,

    /// RR Set Exists when it should not. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    YXRRSet,

    /// RR Set that should exist does not. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    NXRRSet,

    /// Not Authoritative [rfc2136] or Not Authorized [rfc2845].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    /// [rfc2845]: https://datatracker.ietf.org/doc/html/rfc2845
    NotAuth,

    /// Name not contained in zone. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    NotZone,

    /// DSO-TYPE Not Implemented. See [rfc8490].
    ///
    /// [rfc8490]: https://datatracker.ietf.org/doc/html/rfc8490
    DSOTYPENI,

    /// 12-15 are unassigned in the header.
    Reserved(u16),
}

impl Default for Rcode {
    fn default() -> Self {
        Rcode::NoError
    }
}

impl From<u16> for Rcode {
    fn from(value: u16) -> Self {
        match value {
            0 => Rcode::NoError,
            1 => Rcode::FormErr,
            2 => Rcode::ServFail,
            3 => Rcode::NXDomain,
            4 => Rcode::NotImp,
            5 => Rcode::Refused,
            6 => Rcode::YXDomain,
            7 => Rcode::YXRRSet,
            8 => Rcode::NXRRSet,
            9 => Rcode::NotAuth,
            10 => Rcode::NotZone,
            11 => Rcode::DSOTYPENI,
            n => Rcode::Reserved(n),
        }
    }
}

impl From<Rcode> for u16 {
    fn from(rcode: Rcode) -> Self {
        match rcode {
            Rcode::NoError => 0,
            Rcode::FormErr => 1,
            Rcode::ServFail => 2,
            Rcode::NXDomain => 3,
            Rcode::NotImp => 4,
            Rcode::Refused => 5,
            Rcode::YXDomain => 6,
            Rcode::YXRRSet => 7,
            Rcode::NXRRSet => 8,
            Rcode::NotAuth => 9,
            Rcode::NotZone => 10,
            Rcode::DSOTYPENI => 11,
            Rcode::Reserved(n) => n,
        }
    }
}

impl fmt::Display for Rcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rcode::NoError => "NOERROR",
            Rcode::FormErr => "FORMERR",
            Rcode::ServFail => "SERVFAIL",
            Rcode::NXDomain => "NXDOMAIN",
            Rcode::NotImp => "NOTIMP",
            Rcode::Refused => "REFUSED",
            Rcode::YXDomain => "YXDOMAIN",
            Rcode::YXRRSet => "YXRRSET",
            Rcode::NXRRSet => "NXRRSET",
            Rcode::NotAuth => "NOTAUTH",
            Rcode::NotZone => "NOTZONE",
            Rcode::DSOTYPENI => "DSOTYPENI",
            Rcode::Reserved(n) => return f.pad(&format!("RESERVED{}", n)),
        };

        f.pad(name)
    }
}

/// Resource Record Type, for example, A, CNAME or SOA.
///
/// Types without a variant are kept as `Unknown` and displayed in the
/// [rfc3597] `TYPE<n>` form, so records of newer types never fail a parse.
///
/// [rfc3597]: https://datatracker.ietf.org/doc/html/rfc3597
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[allow(clippy::upper_case_acronyms)]
pub enum Type {
    /// IPv4 Address.
    A,
    NS,
    CNAME,
    SOA,

    /// Domain name pointer.
    PTR,

    /// Mail exchange.
    MX,

    /// Text strings.
    TXT,

    /// IPv6 Address.
    AAAA,

    /// Server Selection
    SRV,

    /// EDNS(0) Opt type. See [rfc6891].
    ///
    /// [rfc6891]: https://datatracker.ietf.org/doc/html/rfc6891
    OPT,

    /// Any record type. Only valid as a Question Type.
    ANY,

    Unknown(u16),
}

impl Default for Type {
    fn default() -> Self {
        Type::A
    }
}

impl From<u16> for Type {
    fn from(value: u16) -> Self {
        match value {
            1 => Type::A,
            2 => Type::NS,
            5 => Type::CNAME,
            6 => Type::SOA,
            12 => Type::PTR,
            15 => Type::MX,
            16 => Type::TXT,
            28 => Type::AAAA,
            33 => Type::SRV,
            41 => Type::OPT,
            255 => Type::ANY,
            n => Type::Unknown(n),
        }
    }
}

impl From<Type> for u16 {
    fn from(t: Type) -> Self {
        match t {
            Type::A => 1,
            Type::NS => 2,
            Type::CNAME => 5,
            Type::SOA => 6,
            Type::PTR => 12,
            Type::MX => 15,
            Type::TXT => 16,
            Type::AAAA => 28,
            Type::SRV => 33,
            Type::OPT => 41,
            Type::ANY => 255,
            Type::Unknown(n) => n,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Type::A => "A",
            Type::NS => "NS",
            Type::CNAME => "CNAME",
            Type::SOA => "SOA",
            Type::PTR => "PTR",
            Type::MX => "MX",
            Type::TXT => "TXT",
            Type::AAAA => "AAAA",
            Type::SRV => "SRV",
            Type::OPT => "OPT",
            Type::ANY => "ANY",
            Type::Unknown(n) => return f.pad(&format!("TYPE{}", n)),
        };

        // Pad so widths given in format strings still apply.
        f.pad(name)
    }
}

/// Resource Record Class, for example Internet.
///
/// Classes without a variant, such as the private use range or mDNS's
/// cache-flush bit, are kept as `Unknown` and displayed as `CLASS<n>`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Class {
    /// Reserved per [RFC6895]
    ///
    /// [rfc6895]: https://datatracker.ietf.org/doc/html/rfc6895
    Reserved,

    /// (Default) The Internet (IN), see [rfc1035].
    ///
    /// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
    Internet,

    /// CSNET (CS), obsolete.
    CsNet,

    /// Chaosnet (CH), obsolete LAN protocol created at MIT in the mid-1970s.
    Chaos,

    /// Hesiod (HS), an information service developed by MIT's Project Athena.
    Hesiod,

    /// NONE, used by dynamic updates. See [rfc2136].
    ///
    /// [rfc2136]: https://datatracker.ietf.org/doc/html/rfc2136
    None,

    /// * (ANY) See [rfc1035]
    ///
    /// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
    Any,

    Unknown(u16),
}

impl Default for Class {
    fn default() -> Self {
        Class::Internet
    }
}

impl From<u16> for Class {
    fn from(value: u16) -> Self {
        match value {
            0 => Class::Reserved,
            1 => Class::Internet,
            2 => Class::CsNet,
            3 => Class::Chaos,
            4 => Class::Hesiod,
            254 => Class::None,
            255 => Class::Any,
            n => Class::Unknown(n),
        }
    }
}

impl From<Class> for u16 {
    fn from(class: Class) -> Self {
        match class {
            Class::Reserved => 0,
            Class::Internet => 1,
            Class::CsNet => 2,
            Class::Chaos => 3,
            Class::Hesiod => 4,
            Class::None => 254,
            Class::Any => 255,
            Class::Unknown(n) => n,
        }
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Class::Reserved => "RESERVED0",
            Class::Internet => "IN",
            Class::CsNet => "CS",
            Class::Chaos => "CH",
            Class::Hesiod => "HS",
            Class::None => "NONE",
            Class::Any => "ANY",
            Class::Unknown(n) => return f.pad(&format!("CLASS{}", n)),
        };

        f.pad(name)
    }
}
