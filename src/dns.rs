//! The DNS wire-format parser.
//!
//! Decoding dnstap only needs a way to turn the captured bytes into a
//! [`Message`], so that capability is expressed as the [`Parser`] trait.
//! [`WireParser`] is the implementation used by default.

use crate::bail;
use crate::io::{DNSReadExt, SeekExt};
use crate::resource::Resource;
use crate::types::*;
use byteorder::{ReadBytesExt, BE};
use std::io;
use std::io::Cursor;
use std::io::Read;
use std::time::Duration;

/// Parses raw DNS wire-format bytes into a structured [`Message`].
///
/// Implementations must be stateless, as one parser is shared by every
/// connection.
pub trait Parser: Send + Sync {
    fn parse(&self, wire: &[u8]) -> io::Result<Message>;
}

/// Parses messages as laid out in [rfc1035] section 4.
///
/// [rfc1035]: https://datatracker.ietf.org/doc/html/rfc1035
#[derive(Default, Clone, Copy, Debug)]
pub struct WireParser;

impl Parser for WireParser {
    fn parse(&self, wire: &[u8]) -> io::Result<Message> {
        Message::from_slice(wire)
    }
}

// A helper class to hold state while the parsing is happening.
pub(crate) struct MessageParser<'a> {
    cur: Cursor<&'a [u8]>,

    m: Message,
}

#[derive(Copy, Clone, PartialEq)]
enum RecordSection {
    Answers,
    Authorities,
    Additionals,
}

impl<'a> MessageParser<'a> {
    fn new(buf: &'a [u8]) -> MessageParser<'a> {
        MessageParser {
            cur: Cursor::new(buf),
            m: Message {
                size: buf.len(),
                ..Default::default()
            },
        }
    }

    /// Consume the MessageParser and returned the resulting Message.
    fn parse(mut self) -> io::Result<Message> {
        self.m.id = self.cur.read_u16::<BE>()?;

        let b = self.cur.read_u8()?;
        self.m.qr = QR::from_bool(0b1000_0000 & b != 0);
        let opcode = (0b0111_1000 & b) >> 3;
        self.m.aa = (0b0000_0100 & b) != 0;
        self.m.tc = (0b0000_0010 & b) != 0;
        self.m.rd = (0b0000_0001 & b) != 0;

        self.m.opcode = Opcode::from(opcode);

        let b = self.cur.read_u8()?;
        self.m.ra = (0b1000_0000 & b) != 0;
        self.m.z = (0b0100_0000 & b) != 0; // Unused
        self.m.ad = (0b0010_0000 & b) != 0;
        self.m.cd = (0b0001_0000 & b) != 0;
        let rcode = 0b0000_1111 & b;

        self.m.rcode = Rcode::from(u16::from(rcode));

        let qd_count = self.cur.read_u16::<BE>()?;
        let an_count = self.cur.read_u16::<BE>()?;
        let ns_count = self.cur.read_u16::<BE>()?;
        let ar_count = self.cur.read_u16::<BE>()?;

        self.read_questions(qd_count)?;
        self.read_records(an_count, RecordSection::Answers)?;
        self.read_records(ns_count, RecordSection::Authorities)?;
        self.read_records(ar_count, RecordSection::Additionals)?;

        if self.cur.remaining()? > 0 {
            bail!(
                InvalidData,
                "finished parsing with {} bytes left over",
                self.cur.remaining()?
            );
        }

        Ok(self.m)
    }

    fn read_questions(&mut self, count: u16) -> io::Result<()> {
        // Counts come off the wire, so don't trust them for allocation.
        self.m.questions.reserve(count.min(16).into());

        for _ in 0..count {
            let name = self.cur.read_qname()?;
            let r#type = self.cur.read_type()?;
            let class = self.cur.read_class()?;

            self.m.questions.push(Question {
                name,
                r#type,
                class,
            });
        }

        Ok(())
    }

    fn read_records(&mut self, count: u16, section: RecordSection) -> io::Result<()> {
        for _ in 0..count {
            let name = self.cur.read_qname()?;
            let r#type = self.cur.read_type()?;

            if section == RecordSection::Additionals && r#type == Type::OPT {
                if self.m.extension.is_some() {
                    bail!(
                        InvalidData,
                        "multiple EDNS(0) extensions. Expected only one."
                    );
                }

                let ext = Extension::parse(&mut self.cur, &name)?;
                self.m.extension = Some(ext);
            } else {
                let class = self.cur.read_class()?;
                let ttl = self.cur.read_u32::<BE>()?;
                let resource = Resource::parse(&mut self.cur, r#type)?;

                let record = Record {
                    name,
                    class,
                    ttl: Duration::from_secs(ttl.into()),
                    resource,
                };

                match section {
                    RecordSection::Answers => self.m.answers.push(record),
                    RecordSection::Authorities => self.m.authoritys.push(record),
                    RecordSection::Additionals => self.m.additionals.push(record),
                }
            }
        }

        Ok(())
    }
}

impl Extension {
    /// Reads the rest of an OPT record, after its name and type.
    fn parse(cur: &mut Cursor<&[u8]>, name: &str) -> io::Result<Extension> {
        if name != "." {
            bail!(
                InvalidData,
                "expected root domain for EDNS(0) extension, got '{}'",
                name
            );
        }

        // The class and ttl fields are repurposed. See rfc6891 section 6.1.2.
        let payload_size = cur.read_u16::<BE>()?;
        let extend_rcode = cur.read_u8()?;
        let version = cur.read_u8()?;
        let b = cur.read_u16::<BE>()?;

        // Options are not interpreted, so skip over them.
        let rd_len = cur.read_u16::<BE>()?;
        if cur.remaining()? < rd_len.into() {
            bail!(UnexpectedEof, "EDNS(0) options longer than the message");
        }
        let mut options = vec![0; rd_len.into()];
        cur.read_exact(&mut options)?;

        Ok(Extension {
            payload_size,
            extend_rcode,
            version,
            dnssec_ok: b & 0b1000_0000_0000_0000 != 0,
        })
    }
}

impl Message {
    /// Parses a wire-format DNS message.
    ///
    /// # Errors
    ///
    /// Returns an io::Error (usually InvalidData or UnexpectedEof) if the
    /// bytes are not exactly one well formed message.
    pub fn from_slice(buf: &[u8]) -> io::Result<Message> {
        MessageParser::new(buf).parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{MX, SOA};
    use crate::testutil::Packet;
    use pretty_assertions::assert_eq;
    use std::net::Ipv4Addr;

    #[test]
    fn test_parse_query() {
        let wire = Packet::query(0x1234, "example.com.", Type::A).build();
        let m = WireParser.parse(&wire).unwrap();

        assert_eq!(m.size, wire.len());
        assert_eq!(m.id, 0x1234);
        assert_eq!(m.qr, QR::Query);
        assert_eq!(m.opcode, Opcode::Query);
        assert!(m.rd);
        assert_eq!(
            m.questions,
            vec![Question {
                name: "example.com.".to_string(),
                r#type: Type::A,
                class: Class::Internet,
            }]
        );
        assert!(m.answers.is_empty());
        assert_eq!(m.flags(), "rd");
    }

    #[test]
    fn test_parse_response() {
        let wire = Packet::response(7, "example.com.", Type::A)
            .answer_a("example.com.", 300, [93, 184, 216, 34])
            .answer_mx("example.com.", 60, 10, "mail.example.com.")
            .authority_soa("example.com.", 3600, "ns.example.com.", "admin.example.com.")
            .edns(1232)
            .build();
        let m = WireParser.parse(&wire).unwrap();

        assert_eq!(m.flags(), "qr rd ra");
        assert_eq!(m.answers.len(), 2);
        assert_eq!(m.answers[0].name, "example.com.");
        assert_eq!(m.answers[0].ttl, Duration::from_secs(300));
        assert_eq!(
            m.answers[0].resource,
            Resource::A(Ipv4Addr::new(93, 184, 216, 34))
        );
        assert_eq!(
            m.answers[1].resource,
            Resource::MX(MX {
                preference: 10,
                exchange: "mail.example.com.".to_string(),
            })
        );
        assert_eq!(
            m.authoritys[0].resource,
            Resource::SOA(SOA {
                mname: "ns.example.com.".to_string(),
                rname: "admin.example.com.".to_string(),
                serial: 2021061201,
                refresh: Duration::from_secs(7200),
                retry: Duration::from_secs(3600),
                expire: Duration::from_secs(1209600),
                minimum: Duration::from_secs(300),
            })
        );
        assert!(m.additionals.is_empty());
        assert_eq!(m.additional_count(), 1);
        assert_eq!(
            m.extension,
            Some(Extension {
                payload_size: 1232,
                ..Default::default()
            })
        );
    }

    #[test]
    fn test_parse_unknown_type() {
        let wire = Packet::response(1, "example.com.", Type::Unknown(65))
            .answer_raw("example.com.", Type::Unknown(65), 300, &[0, 1, 0, 0])
            .build();
        let m = WireParser.parse(&wire).unwrap();

        assert_eq!(m.questions[0].r#type, Type::Unknown(65));
        assert_eq!(m.answers[0].resource, Resource::Unknown(65, vec![0, 1, 0, 0]));
    }

    #[test]
    fn test_parse_short_header() {
        let err = WireParser.parse(&[0x12, 0x34, 0x01]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);

        let err = WireParser.parse(&[]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_parse_trailing_bytes() {
        let mut wire = Packet::query(1, "example.com.", Type::A).build();
        wire.push(0);

        let err = WireParser.parse(&wire).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_parse_truncated_record() {
        let wire = Packet::response(1, "example.com.", Type::A)
            .answer_a("example.com.", 300, [10, 0, 0, 1])
            .build();

        let err = WireParser.parse(&wire[..wire.len() - 2]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_parse_bad_address_length() {
        let wire = Packet::response(1, "example.com.", Type::A)
            .answer_raw("example.com.", Type::A, 300, &[10, 0, 0])
            .build();

        let err = WireParser.parse(&wire).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_parse_unassigned_values() {
        let mut wire = Packet::query(1, "example.com.", Type::A).build();
        wire[2] |= 3 << 3; // Unassigned opcode
        wire[3] |= 12; // Unassigned rcode
        let len = wire.len();
        wire[len - 2..].copy_from_slice(&[0x80, 0x01]); // mDNS unicast-response bit

        let m = WireParser.parse(&wire).unwrap();
        assert_eq!(m.opcode, Opcode::Reserved(3));
        assert_eq!(m.rcode, Rcode::Reserved(12));
        assert_eq!(m.questions[0].class, Class::Unknown(0x8001));

        assert_eq!(m.opcode.to_string(), "RESERVED3");
        assert_eq!(m.rcode.to_string(), "RESERVED12");
        assert_eq!(m.questions[0].class.to_string(), "CLASS32769");
    }
}
