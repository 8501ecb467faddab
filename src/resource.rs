//! Resource record data, and how each type is read from the wire.

use crate::bail;
use crate::io::{CursorExt, DNSReadExt, SeekExt};
use crate::types::Type;
use byteorder::{ReadBytesExt, BE};
use std::io;
use std::io::Cursor;
use std::io::Read;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::time::Duration;

// This should be kept in sync with Type.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Debug, PartialEq)]
pub enum Resource {
    A(Ipv4Addr),
    AAAA(Ipv6Addr),

    CNAME(String),
    NS(String),
    PTR(String),

    TXT(TXT),

    MX(MX),
    SOA(SOA),
    SRV(SRV),

    /// Any type this crate does not interpret, with its raw rdata.
    Unknown(u16, Vec<u8>),
}

/// Mail exchange (MX) record data.
#[derive(Clone, Debug, PartialEq)]
pub struct MX {
    pub preference: u16,
    pub exchange: String,
}

/// Start of authority (SOA) record data.
#[derive(Clone, Debug, PartialEq)]
pub struct SOA {
    /// The primary name server for the zone.
    pub mname: String,

    /// The mailbox of the person responsible, in name form (e.g.
    /// "hostmaster.example.com.").
    pub rname: String,

    pub serial: u32,
    pub refresh: Duration,
    pub retry: Duration,
    pub expire: Duration,
    pub minimum: Duration,
}

/// Service location (SRV) record data. See [rfc2782].
///
/// [rfc2782]: https://datatracker.ietf.org/doc/html/rfc2782
#[derive(Clone, Debug, PartialEq)]
pub struct SRV {
    pub priority: u16,
    pub weight: u16,
    pub port: u16,
    pub name: String,
}

/// One or more character strings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TXT(pub Vec<Vec<u8>>);

impl From<&str> for TXT {
    fn from(txt: &str) -> Self {
        TXT(vec![txt.as_bytes().to_vec()])
    }
}

impl Resource {
    pub fn r#type(&self) -> Type {
        match self {
            Resource::A(_) => Type::A,
            Resource::AAAA(_) => Type::AAAA,
            Resource::CNAME(_) => Type::CNAME,
            Resource::NS(_) => Type::NS,
            Resource::PTR(_) => Type::PTR,
            Resource::TXT(_) => Type::TXT,
            Resource::MX(_) => Type::MX,
            Resource::SOA(_) => Type::SOA,
            Resource::SRV(_) => Type::SRV,
            Resource::Unknown(t, _) => Type::from(*t),
        }
    }

    /// Reads the rdata of a record of type `r#type`, whose length field the
    /// cursor is positioned at.
    ///
    /// Names inside rdata may point back into the whole message, so the cursor
    /// given must span the message from its first byte.
    pub(crate) fn parse(cur: &mut Cursor<&[u8]>, r#type: Type) -> io::Result<Resource> {
        let len = cur.read_u16::<BE>()? as usize;
        let start = cur.position() as usize;
        let end = start + len;

        if cur.remaining()? < len as u64 {
            bail!(
                UnexpectedEof,
                "record length {} exceeds the {} remaining bytes",
                len,
                cur.remaining()?
            );
        }

        // Bound reads to this record, while keeping earlier bytes reachable.
        let mut record = cur.sub_cursor(0, end)?;
        record.set_position(start as u64);

        let resource = match r#type {
            Type::A => Resource::A(Ipv4Addr::from(read_array::<4>(&mut record, len)?)),
            Type::AAAA => Resource::AAAA(Ipv6Addr::from(read_array::<16>(&mut record, len)?)),

            Type::CNAME => Resource::CNAME(record.read_qname()?),
            Type::NS => Resource::NS(record.read_qname()?),
            Type::PTR => Resource::PTR(record.read_qname()?),

            Type::MX => Resource::MX(MX {
                preference: record.read_u16::<BE>()?,
                exchange: record.read_qname()?,
            }),

            Type::SOA => Resource::SOA(SOA {
                mname: record.read_qname()?,
                rname: record.read_qname()?,
                serial: record.read_u32::<BE>()?,
                refresh: Duration::from_secs(record.read_u32::<BE>()?.into()),
                retry: Duration::from_secs(record.read_u32::<BE>()?.into()),
                expire: Duration::from_secs(record.read_u32::<BE>()?.into()),
                minimum: Duration::from_secs(record.read_u32::<BE>()?.into()),
            }),

            Type::SRV => Resource::SRV(SRV {
                priority: record.read_u16::<BE>()?,
                weight: record.read_u16::<BE>()?,
                port: record.read_u16::<BE>()?,
                name: record.read_qname()?,
            }),

            Type::TXT => {
                let mut txts = Vec::new();
                while record.remaining()? > 0 {
                    let txt_len = record.read_u8()?;
                    let mut txt = vec![0; txt_len.into()];
                    record.read_exact(&mut txt)?;
                    txts.push(txt);
                }
                Resource::TXT(TXT(txts))
            }

            Type::OPT | Type::ANY | Type::Unknown(_) => {
                let mut data = vec![0; len];
                record.read_exact(&mut data)?;
                Resource::Unknown(r#type.into(), data)
            }
        };

        if record.position() as usize != end {
            bail!(
                InvalidData,
                "{} record data was {} bytes, but its length field said {}",
                r#type,
                record.position() as usize - start,
                len
            );
        }

        cur.set_position(end as u64);
        Ok(resource)
    }
}

fn read_array<const N: usize>(cur: &mut Cursor<&[u8]>, len: usize) -> io::Result<[u8; N]> {
    if len != N {
        bail!(InvalidData, "invalid address length ({}) expected {}", len, N);
    }

    let mut buf = [0; N];
    cur.read_exact(&mut buf)?;
    Ok(buf)
}
