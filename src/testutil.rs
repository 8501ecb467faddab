//! Builders for the dnstap and DNS payloads used across the unit tests.

use crate::dnstap::MessageType;
use crate::proto;
use crate::types::{Opcode, Rcode, Type};
use prost::Message as _;

/// A dnstap message of the given type, with every optional field unset.
pub fn message(r#type: MessageType) -> proto::Message {
    proto::Message {
        r#type: r#type as i32,
        ..Default::default()
    }
}

/// Wraps the message in a `MESSAGE` envelope and encodes it.
pub fn dnstap(message: proto::Message) -> Vec<u8> {
    proto::Dnstap {
        identity: Some(b"ns1".to_vec()),
        version: Some(b"test".to_vec()),
        message: Some(message),
        r#type: proto::dnstap::Type::Message as i32,
        ..Default::default()
    }
    .encode_to_vec()
}

/// Writes DNS messages by hand, without name compression.
pub struct Packet {
    id: u16,
    flags: [u8; 2],
    questions: Vec<u8>,
    qd_count: u16,
    answers: Vec<u8>,
    an_count: u16,
    authorities: Vec<u8>,
    ns_count: u16,
    additionals: Vec<u8>,
    ar_count: u16,
}

impl Packet {
    /// A header with no sections filled in.
    pub fn empty(id: u16) -> Packet {
        Packet {
            id,
            flags: [0, 0],
            questions: Vec::new(),
            qd_count: 0,
            answers: Vec::new(),
            an_count: 0,
            authorities: Vec::new(),
            ns_count: 0,
            additionals: Vec::new(),
            ar_count: 0,
        }
    }

    /// A recursive query with one IN question.
    pub fn query(id: u16, name: &str, r#type: Type) -> Packet {
        let mut p = Packet::empty(id);
        p.flags = [0b0000_0001, 0];
        p.question(name, r#type)
    }

    /// A recursive response with one IN question, and no records yet.
    pub fn response(id: u16, name: &str, r#type: Type) -> Packet {
        let mut p = Packet::query(id, name, r#type);
        p.flags = [0b1000_0001, 0b1000_0000];
        p
    }

    pub fn question(mut self, name: &str, r#type: Type) -> Packet {
        write_name(&mut self.questions, name);
        self.questions.extend_from_slice(&u16::from(r#type).to_be_bytes());
        self.questions.extend_from_slice(&1_u16.to_be_bytes());
        self.qd_count += 1;
        self
    }

    pub fn opcode(mut self, opcode: Opcode) -> Packet {
        self.flags[0] = (self.flags[0] & 0b1000_0111) | (u8::from(opcode) << 3);
        self
    }

    pub fn rcode(mut self, rcode: Rcode) -> Packet {
        self.flags[1] = (self.flags[1] & 0b1111_0000) | (u16::from(rcode) as u8 & 0x0F);
        self
    }

    pub fn answer_raw(mut self, name: &str, r#type: Type, ttl: u32, rdata: &[u8]) -> Packet {
        write_record(&mut self.answers, name, r#type, ttl, rdata);
        self.an_count += 1;
        self
    }

    pub fn answer_a(self, name: &str, ttl: u32, ip: [u8; 4]) -> Packet {
        self.answer_raw(name, Type::A, ttl, &ip)
    }

    pub fn answer_aaaa(self, name: &str, ttl: u32, ip: [u8; 16]) -> Packet {
        self.answer_raw(name, Type::AAAA, ttl, &ip)
    }

    pub fn answer_cname(self, name: &str, ttl: u32, target: &str) -> Packet {
        let mut rdata = Vec::new();
        write_name(&mut rdata, target);
        self.answer_raw(name, Type::CNAME, ttl, &rdata)
    }

    pub fn answer_mx(self, name: &str, ttl: u32, preference: u16, exchange: &str) -> Packet {
        let mut rdata = preference.to_be_bytes().to_vec();
        write_name(&mut rdata, exchange);
        self.answer_raw(name, Type::MX, ttl, &rdata)
    }

    pub fn answer_soa(mut self, name: &str, ttl: u32, mname: &str, rname: &str) -> Packet {
        write_record(&mut self.answers, name, Type::SOA, ttl, &soa(mname, rname));
        self.an_count += 1;
        self
    }

    pub fn answer_txt(self, name: &str, ttl: u32, txt: &str) -> Packet {
        let mut rdata = vec![txt.len() as u8];
        rdata.extend_from_slice(txt.as_bytes());
        self.answer_raw(name, Type::TXT, ttl, &rdata)
    }

    pub fn authority_soa(mut self, name: &str, ttl: u32, mname: &str, rname: &str) -> Packet {
        write_record(&mut self.authorities, name, Type::SOA, ttl, &soa(mname, rname));
        self.ns_count += 1;
        self
    }

    pub fn additional_a(mut self, name: &str, ttl: u32, ip: [u8; 4]) -> Packet {
        write_record(&mut self.additionals, name, Type::A, ttl, &ip);
        self.ar_count += 1;
        self
    }

    /// Adds an EDNS(0) OPT record advertising `payload_size`.
    pub fn edns(mut self, payload_size: u16) -> Packet {
        self.additionals.push(0); // Root
        self.additionals.extend_from_slice(&u16::from(Type::OPT).to_be_bytes());
        self.additionals.extend_from_slice(&payload_size.to_be_bytes());
        self.additionals.extend_from_slice(&[0, 0, 0, 0]); // ttl
        self.additionals.extend_from_slice(&[0, 0]); // rdlength
        self.ar_count += 1;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(512);
        buf.extend_from_slice(&self.id.to_be_bytes());
        buf.extend_from_slice(&self.flags);
        buf.extend_from_slice(&self.qd_count.to_be_bytes());
        buf.extend_from_slice(&self.an_count.to_be_bytes());
        buf.extend_from_slice(&self.ns_count.to_be_bytes());
        buf.extend_from_slice(&self.ar_count.to_be_bytes());
        buf.extend_from_slice(&self.questions);
        buf.extend_from_slice(&self.answers);
        buf.extend_from_slice(&self.authorities);
        buf.extend_from_slice(&self.additionals);
        buf
    }
}

fn soa(mname: &str, rname: &str) -> Vec<u8> {
    let mut rdata = Vec::new();
    write_name(&mut rdata, mname);
    write_name(&mut rdata, rname);
    for n in &[2021061201_u32, 7200, 3600, 1209600, 300] {
        rdata.extend_from_slice(&n.to_be_bytes());
    }
    rdata
}

fn write_record(buf: &mut Vec<u8>, name: &str, r#type: Type, ttl: u32, rdata: &[u8]) {
    write_name(buf, name);
    buf.extend_from_slice(&u16::from(r#type).to_be_bytes());
    buf.extend_from_slice(&1_u16.to_be_bytes());
    buf.extend_from_slice(&ttl.to_be_bytes());
    buf.extend_from_slice(&(rdata.len() as u16).to_be_bytes());
    buf.extend_from_slice(rdata);
}

fn write_name(buf: &mut Vec<u8>, name: &str) {
    for label in name.split('.').filter(|l| !l.is_empty()) {
        buf.push(label.len() as u8);
        buf.extend_from_slice(label.as_bytes());
    }
    buf.push(0);
}
