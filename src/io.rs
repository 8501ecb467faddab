//! Various traits to help parsing of DNS messages.

use crate::bail;
use crate::types::{Class, Type};
use byteorder::{ReadBytesExt, BE};
use std::fmt::Write;
use std::io;
use std::io::Cursor;
use std::io::SeekFrom;

// Longest a name may be on the wire, per rfc1035 section 3.1.
const MAX_NAME_LEN: usize = 255;

pub fn clamp<T: PartialOrd>(v: T, min: T, max: T) -> T {
    if v < min {
        min
    } else if v > max {
        max
    } else {
        v
    }
}

pub trait SeekExt {
    /// Returns the number of bytes remaining to be consumed.
    /// This is used as a way to check for malformed input.
    fn remaining(&self) -> io::Result<u64>;
}

impl<'a> SeekExt for Cursor<&'a [u8]> {
    fn remaining(&self) -> io::Result<u64> {
        let len = self.get_ref().len() as u64;
        Ok(len.saturating_sub(self.position()))
    }
}

pub trait CursorExt<T> {
    /// Return a cursor that is bounded over the original cursor by start-end.
    ///
    /// The returned cursor contains all values with start <= x < end. It is empty if start >= end.
    fn sub_cursor(&mut self, start: usize, end: usize) -> io::Result<std::io::Cursor<T>>;
}

impl<'a> CursorExt<&'a [u8]> for Cursor<&'a [u8]> {
    fn sub_cursor(&mut self, start: usize, end: usize) -> io::Result<std::io::Cursor<&'a [u8]>> {
        let buf = self.get_ref();

        let start = clamp(start, 0, buf.len());
        let end = clamp(end, start, buf.len());

        Ok(Cursor::new(&buf[start..end]))
    }
}

/// All types that implement `Read` and `Seek` get methods defined
/// in `DNSReadExt` for free.
impl<R: io::Read + ?Sized + io::Seek> DNSReadExt for R {}

/// Extensions to io::Read to add some DNS specific types.
pub trait DNSReadExt: io::Read + io::Seek {
    /// Reads a domain name, following compression pointers.
    ///
    /// The name is returned in its absolute presentation form, e.g.
    /// "example.com.", with the root being ".". Labels are kept as sent (no
    /// puny decoding); bytes outside printable ASCII, and literal dots or
    /// backslashes, are escaped as in zone files.
    ///
    /// # Errors
    ///
    /// Will return a io::Error(InvalidData) if the read domain name is invalid, or
    /// a more general io::Error on any other read failure.
    fn read_qname(&mut self) -> io::Result<String> {
        let mut qname = String::new();
        self.read_labels(&mut qname, 0)?;

        if qname.is_empty() {
            qname.push('.') // Root domain
        }

        Ok(qname)
    }

    #[doc(hidden)]
    fn read_labels(&mut self, qname: &mut String, mut wire_len: usize) -> io::Result<()> {
        let start = self.stream_position()?;

        // Read each label one at a time, to build up the full domain name.
        loop {
            // Length of the next label
            let len = self.read_u8()?;
            if len == 0 {
                return Ok(());
            }

            match len & 0xC0 {
                // No compression
                0x00 => {
                    wire_len += 1 + len as usize;
                    if wire_len > MAX_NAME_LEN {
                        bail!(InvalidData, "name longer than {} bytes", MAX_NAME_LEN);
                    }

                    let mut label = vec![0; len.into()];
                    self.read_exact(&mut label)?;

                    push_label(qname, &label);
                }

                // Compression
                0xC0 => {
                    // Read the 14 bit pointer.
                    let b2 = self.read_u8()? as u16;
                    let ptr = ((len as u16 & !0xC0) << 8 | b2) as u64;

                    // Only jump backwards, so pointers can't loop.
                    if ptr >= start {
                        bail!(
                            InvalidData,
                            "invalid compressed pointer pointing to future bytes"
                        );
                    }

                    // Remember where we are, to carry on after the name.
                    let current = self.stream_position()?;

                    self.seek(SeekFrom::Start(ptr))?;
                    self.read_labels(qname, wire_len)?;
                    self.seek(SeekFrom::Start(current))?;

                    return Ok(());
                }

                // Unknown
                _ => bail!(
                    InvalidData,
                    "unsupported compression type {0:b}",
                    len & 0xC0
                ),
            }
        }
    }

    /// Reads a DNS Type.
    fn read_type(&mut self) -> io::Result<Type> {
        Ok(Type::from(self.read_u16::<BE>()?))
    }

    /// Reads a DNS Class.
    fn read_class(&mut self) -> io::Result<Class> {
        Ok(Class::from(self.read_u16::<BE>()?))
    }
}

/// Appends a label, and its trailing dot, in presentation form.
fn push_label(qname: &mut String, label: &[u8]) {
    for b in label {
        match *b {
            b'.' | b'\\' => {
                qname.push('\\');
                qname.push(*b as char);
            }
            0x21..=0x7E => qname.push(*b as char),
            _ => {
                // Writing to a String can't fail.
                let _ = write!(qname, "\\{:03}", b);
            }
        }
    }
    qname.push('.');
}
