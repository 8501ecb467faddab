//! Decodes [dnstap] records carried over [Frame Streams] into DNS events.
//!
//! The pipeline for one connection is:
//!
//! 1. [`fstrm::Decoder`] splits the byte stream into frames, and says which
//!    control frames need a reply.
//! 2. [`dnstap::Envelope`] decodes a data frame's dnstap protobuf.
//! 3. [`extract::ParsedDns`] parses and summarises the DNS message inside.
//! 4. [`event::Codec`] flattens all of that into an [`event::Event`].
//!
//! Steps 2 to 4 are run together by [`event::Codec::decode`]. With the
//! `server` feature, [`server::serve`] runs the whole thing over TCP.
//!
//! ```rust
//! use rustdnstap::event::{Codec, Config, RawFrame};
//! use rustdnstap::fstrm::{Decoder, Frame};
//!
//! let codec = Codec::new(Config::default());
//! let mut decoder = Decoder::new();
//!
//! # let bytes_from_the_network = [0u8; 0];
//! for frame in decoder.push(&bytes_from_the_network).expect("protocol error") {
//!     match frame {
//!         Frame::Control(control) => {
//!             if let Some(reply) = control.reply() {
//!                 // Write reply.to_bytes() back to the peer.
//!             }
//!         }
//!         Frame::Data(payload) => {
//!             let frame = RawFrame::new(payload, chrono::Utc::now(), None);
//!             if let Some(event) = codec.decode(&frame) {
//!                 println!("{}", event.message);
//!             }
//!         }
//!     }
//! }
//! ```
//!
//! [dnstap]: https://dnstap.info
//! [Frame Streams]: https://github.com/farsightsec/fstrm

mod display;
mod io;

pub mod dns;
pub mod dnstap;
pub mod errors;
pub mod event;
pub mod extract;
pub mod fstrm;
pub mod proto;
pub mod resource;
pub mod types;

#[cfg(feature = "server")]
pub mod server;

#[cfg(test)]
mod testutil;

#[macro_use]
extern crate num_derive;

#[cfg(test)]
#[macro_use]
extern crate lazy_static;

pub use crate::types::*;

// Pull up the various types that should be on the front page of the docs.
#[doc(inline)]
pub use crate::errors::{DecodeError, Error, FstrmError};
#[doc(inline)]
pub use crate::event::{Codec, Config, Event, RawFrame};
#[doc(inline)]
pub use crate::fstrm::{Decoder, Frame};
#[doc(inline)]
pub use crate::resource::Resource;
