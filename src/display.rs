//! Implements the Display trait for the various types, so they output
//! in `dig` style.
// Refer to https://github.com/tigeli/bind-utils/blob/master/bin/dig/dig.c for reference.

use crate::resource::{MX, SOA, SRV, TXT};
use crate::types::{Message, Opcode, Question, Record};
use crate::Resource;
use std::fmt;
use std::fmt::Write;

/// Displays this message in a format resembling `dig` output.
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_header(f)?;

        // ;; OPT PSEUDOSECTION:
        // ; EDNS: version: 0, flags:; udp: 512
        if let Some(e) = &self.extension {
            writeln!(f)?;
            writeln!(f, ";; OPT PSEUDOSECTION:")?;
            writeln!(
                f,
                "; EDNS: version: {version}, flags:{flags}; udp: {payload_size}",
                version = e.version,
                flags = if e.dnssec_ok { " do" } else { "" },
                payload_size = e.payload_size,
            )?;
        }

        let update = self.opcode == Opcode::Update;

        // Always display the question section, but optionally
        // display the other sections.
        writeln!(f)?;
        if update {
            writeln!(f, ";; ZONE SECTION:")?;
        } else {
            writeln!(f, ";; QUESTION SECTION:")?;
        }
        for question in &self.questions {
            writeln!(f, "{}", question)?;
        }

        let sections = [
            (if update { "PREREQUISITE" } else { "ANSWER" }, &self.answers),
            (if update { "UPDATE" } else { "AUTHORITY" }, &self.authoritys),
            ("ADDITIONAL", &self.additionals),
        ];

        for (name, records) in sections.iter() {
            if records.is_empty() {
                continue;
            }

            writeln!(f)?;
            writeln!(f, ";; {} SECTION:", name)?;
            for record in records.iter() {
                writeln!(f, "{}", record)?;
            }
        }

        Ok(())
    }
}

impl Message {
    fn fmt_header(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(
            f,
            ";; ->>HEADER<<- opcode: {opcode}, status: {rcode}, id: {id}",
            opcode = self.opcode,
            rcode = self.rcode,
            id = self.id,
        )?;

        let flags = self.flags();
        let labels = if self.opcode == Opcode::Update {
            ["ZONE", "PREREQ", "UPDATE"]
        } else {
            ["QUERY", "ANSWER", "AUTHORITY"]
        };

        writeln!(
            f,
            ";; flags:{space}{flags}; {qd}: {qd_count}, {an}: {an_count}, {ns}: {ns_count}, ADDITIONAL: {ar_count}",
            space = if flags.is_empty() { "" } else { " " },
            flags = flags,
            qd = labels[0],
            an = labels[1],
            ns = labels[2],
            qd_count = self.questions.len(),
            an_count = self.answers.len(),
            ns_count = self.authoritys.len(),
            ar_count = self.additional_count(),
        )
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            ";{name:<23} {class:<4} {type}",
            name = self.name,
            class = self.class.to_string(),
            r#type = self.r#type,
        )
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{name:<23} {ttl:>6} {class:<4} {type:<6} {resource}",
            name = self.name,
            ttl = self.ttl.as_secs(),
            class = self.class.to_string(),
            r#type = self.r#type(),
            resource = self.resource,
        )
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::A(ip) => ip.fmt(f),
            Resource::AAAA(ip) => ip.fmt(f),

            Resource::NS(name) => name.fmt(f),
            Resource::CNAME(name) => name.fmt(f),
            Resource::PTR(name) => name.fmt(f),

            Resource::SOA(soa) => soa.fmt(f),
            Resource::TXT(txts) => txts.fmt(f),
            Resource::MX(mx) => mx.fmt(f),
            Resource::SRV(srv) => srv.fmt(f),

            // Generic form from rfc3597 section 5.
            Resource::Unknown(_, data) => {
                write!(f, "\\# {}", data.len())?;
                if !data.is_empty() {
                    f.write_char(' ')?;
                    for b in data {
                        write!(f, "{:02x}", b)?;
                    }
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for MX {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // "10 aspmx.l.google.com."
        write!(
            f,
            "{preference} {exchange}",
            preference = self.preference,
            exchange = self.exchange,
        )
    }
}

impl fmt::Display for SOA {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // "ns1.google.com. dns-admin.google.com. 376337657 900 900 1800 60"
        write!(
            f,
            "{mname} {rname} {serial} {refresh} {retry} {expire} {minimum}",
            mname = self.mname,
            rname = self.rname,
            serial = self.serial,
            refresh = self.refresh.as_secs(),
            retry = self.retry.as_secs(),
            expire = self.expire.as_secs(),
            minimum = self.minimum.as_secs(),
        )
    }
}

impl fmt::Display for SRV {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        // "5 0 389 ldap.google.com."
        write!(
            f,
            "{priority} {weight} {port} {name}",
            priority = self.priority,
            weight = self.weight,
            port = self.port,
            name = self.name,
        )
    }
}

impl fmt::Display for TXT {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, txt) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_char(' ')?;
            }

            f.write_char('"')?;
            for b in txt {
                match *b {
                    b'"' | b'\\' => write!(f, "\\{}", *b as char)?,
                    0x20..=0x7E => f.write_char(*b as char)?,
                    _ => write!(f, "\\{:03}", b)?,
                }
            }
            f.write_char('"')?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::dns::{Parser, WireParser};
    use crate::resource::{Resource, MX, SOA, SRV, TXT};
    use crate::testutil::Packet;
    use crate::types::{Opcode, Type};
    use core::time::Duration;
    use pretty_assertions::assert_eq;

    lazy_static! {
        static ref DISPLAY_TESTS : Vec<(Resource, &'static str)> = {
            vec![
                (
                    Resource::A("172.217.164.100".parse().unwrap()),
                    "172.217.164.100",
                ),
                (
                    Resource::AAAA("2607:f8b0:4005:805::2004".parse().unwrap()),
                    "2607:f8b0:4005:805::2004",
                ),
                (
                    Resource::CNAME("code.l.google.com.".to_string()),
                    "code.l.google.com.",
                ),
                (
                    Resource::NS("ns4.google.com.".to_string()),
                    "ns4.google.com.",
                ),
                (Resource::PTR("dns.google.".to_string()), "dns.google."),
                (
                    Resource::SOA(SOA {
                        mname: "ns1.google.com.".to_string(),
                        rname: "dns-admin.google.com.".to_string(),

                        serial: 379031418,

                        refresh: Duration::from_secs(900),
                        retry: Duration::from_secs(900),
                        expire: Duration::from_secs(1800),
                        minimum: Duration::from_secs(60),
                    }),
                    "ns1.google.com. dns-admin.google.com. 379031418 900 900 1800 60",
                ),
                (
                    Resource::MX(MX {
                        preference: 10,
                        exchange: "aspmx.l.google.com.".to_string(),
                    }),
                    "10 aspmx.l.google.com.",
                ),
                (
                    Resource::SRV(SRV {
                        priority: 5,
                        weight: 0,
                        port: 389,
                        name: "ldap.google.com.".to_string(),
                    }),
                    "5 0 389 ldap.google.com.",
                ),
                (
                    Resource::TXT(TXT::from("v=spf1 include:_spf.google.com ~all")),
                    "\"v=spf1 include:_spf.google.com ~all\"",
                ),
                (
                    Resource::TXT(TXT(vec![b"say \"hi\"".to_vec(), vec![0x07]])),
                    "\"say \\\"hi\\\"\" \"\\007\"",
                ),
                (
                    Resource::Unknown(65, vec![0x00, 0x01, 0xab]),
                    "\\# 3 0001ab",
                ),
                (Resource::Unknown(99, vec![]), "\\# 0"),
            ]
        };
    }

    #[test]
    fn test_display() {
        for (resource, display) in (*DISPLAY_TESTS).iter() {
            assert_eq!(format!("{}", resource), *display);
        }
    }

    #[test]
    fn test_display_message() {
        let wire = Packet::response(7, "example.com.", Type::A)
            .answer_a("example.com.", 300, [93, 184, 216, 34])
            .edns(1232)
            .build();
        let m = WireParser.parse(&wire).unwrap();

        assert_eq!(
            m.to_string(),
            "\
;; ->>HEADER<<- opcode: QUERY, status: NOERROR, id: 7
;; flags: qr rd ra; QUERY: 1, ANSWER: 1, AUTHORITY: 0, ADDITIONAL: 1

;; OPT PSEUDOSECTION:
; EDNS: version: 0, flags:; udp: 1232

;; QUESTION SECTION:
;example.com.            IN   A

;; ANSWER SECTION:
example.com.               300 IN   A      93.184.216.34
"
        );
    }

    #[test]
    fn test_display_update() {
        let wire = Packet::empty(9)
            .opcode(Opcode::Update)
            .question("example.com.", Type::SOA)
            .authority_soa("example.com.", 3600, "ns.example.com.", "admin.example.com.")
            .build();
        let m = WireParser.parse(&wire).unwrap();

        assert_eq!(
            m.to_string(),
            "\
;; ->>HEADER<<- opcode: UPDATE, status: NOERROR, id: 9
;; flags:; ZONE: 1, PREREQ: 0, UPDATE: 1, ADDITIONAL: 0

;; ZONE SECTION:
;example.com.            IN   SOA

;; UPDATE SECTION:
example.com.              3600 IN   SOA    ns.example.com. admin.example.com. 2021061201 7200 3600 1209600 300
"
        );
    }
}
