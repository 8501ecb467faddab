//! Frame Streams (fstrm) decoding.
//!
//! See <https://github.com/farsightsec/fstrm/>.
//!
//! ```text
//! Data frame:
//!     +---------+---------+
//!     |  Size   |  Data   |
//!     +---------+---------+
//!     | 4 bytes | N bytes |
//!     +---------+---------+
//!
//! Control frame (Size = 0):
//!     +----------+---------+---------+---------+
//!     | 00000000 |  CSize  |  CType  | Fields  |
//!     +----------+---------+---------+---------+
//!     |  4 bytes | 4 bytes | 4 bytes | N bytes |
//!     +----------+---------+---------+---------+
//! ```
//!
//! All integers are big endian. `CSize` counts the `CType` and `Fields` bytes.
//!
//! [`Decoder`] accumulates bytes from one connection and hands back one
//! [`Frame`] per call to [`Decoder::decode`]. A frame is only consumed once it
//! has fully arrived, so the caller can keep appending bytes as they are read.

use crate::errors::FstrmError;
use byteorder::{ByteOrder, BE};
use bytes::{BufMut, Bytes, BytesMut};
use num_traits::FromPrimitive;
use strum_macros::Display;

/// Largest control frame (`CSize`) a peer may send.
pub const CONTROL_FRAME_LENGTH_MAX: u32 = 512;

/// Largest content type carried in a control frame field.
pub const CONTROL_FIELD_CONTENT_TYPE_LENGTH_MAX: u32 = 256;

/// The field type of a content type field within a control frame.
pub const CONTROL_FIELD_CONTENT_TYPE: u32 = 0x01;

const CONTROL_FRAME_MARKER: u32 = 0x0000_0000;

// Size of each of the length, control size and control type words.
const WORD: usize = 4;

/// Control frame types.
#[derive(Copy, Clone, Debug, Display, FromPrimitive, PartialEq, Eq)]
#[repr(u32)]
pub enum ControlType {
    #[strum(serialize = "ACCEPT")]
    Accept = 0x01,

    #[strum(serialize = "START")]
    Start = 0x02,

    #[strum(serialize = "STOP")]
    Stop = 0x03,

    #[strum(serialize = "READY")]
    Ready = 0x04,

    #[strum(serialize = "FINISH")]
    Finish = 0x05,
}

/// A decoded control frame. `fields` holds everything after the control type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlFrame {
    pub control_type: ControlType,
    pub fields: Bytes,
}

impl ControlFrame {
    pub fn new(control_type: ControlType, fields: Bytes) -> ControlFrame {
        ControlFrame {
            control_type,
            fields,
        }
    }

    /// Returns the frame that must be written back to the peer, if any.
    ///
    /// A READY is answered with an ACCEPT carrying the same fields. Every
    /// other control type is silently consumed.
    pub fn reply(&self) -> Option<ControlFrame> {
        match self.control_type {
            ControlType::Ready => Some(ControlFrame::new(
                ControlType::Accept,
                self.fields.clone(),
            )),
            ControlType::Accept | ControlType::Start | ControlType::Stop | ControlType::Finish => {
                None
            }
        }
    }

    /// Writes this control frame, including the leading escape word.
    pub fn encode(&self, buf: &mut BytesMut) {
        let control_size = (WORD + self.fields.len()) as u32;

        buf.reserve(2 * WORD + control_size as usize);
        buf.put_u32(CONTROL_FRAME_MARKER);
        buf.put_u32(control_size);
        buf.put_u32(self.control_type as u32);
        buf.put_slice(&self.fields);
    }

    /// Returns this control frame as a `Bytes` ready to be sent.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        buf.freeze()
    }

    /// Returns the content types advertised in this frame's fields.
    ///
    /// Fields are `type`, `length`, `data` triples. Parsing stops at the first
    /// truncated or oversized field, since the fields are only informational.
    pub fn content_types(&self) -> Vec<Bytes> {
        let mut types = Vec::new();
        let mut rest = self.fields.clone();

        while rest.len() >= 2 * WORD {
            let field_type = BE::read_u32(&rest[..WORD]);
            let len = BE::read_u32(&rest[WORD..2 * WORD]);

            if len > CONTROL_FIELD_CONTENT_TYPE_LENGTH_MAX || rest.len() < 2 * WORD + len as usize {
                break;
            }

            let data = rest.slice(2 * WORD..2 * WORD + len as usize);
            if field_type == CONTROL_FIELD_CONTENT_TYPE {
                types.push(data);
            }

            rest = rest.slice(2 * WORD + len as usize..);
        }

        types
    }
}

/// Writes `payload` as a data frame.
///
/// # Panics
///
/// Panics if `payload` is empty, as a zero length introduces a control
/// frame, or if it is longer than `u32::MAX` bytes.
pub fn encode_data_frame(payload: &[u8], buf: &mut BytesMut) {
    assert!(!payload.is_empty(), "data frames cannot be empty");
    assert!(
        payload.len() <= u32::MAX as usize,
        "data frame of {} bytes is too large",
        payload.len()
    );

    buf.reserve(WORD + payload.len());
    buf.put_u32(payload.len() as u32);
    buf.put_slice(payload);
}

/// A complete frame taken off the stream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Frame {
    /// An opaque, never empty, data frame payload.
    Data(Bytes),

    /// A control frame. Check [`ControlFrame::reply`] for a required answer.
    Control(ControlFrame),
}

/// What the decoder is waiting for. The numbers are the declared lengths.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum State {
    AwaitingLength,
    AwaitingDataPayload(u32),
    AwaitingControlLength,
    AwaitingControlPayload(u32),
}

/// Per connection Frame Streams decoder.
///
/// Bytes are appended with [`Decoder::extend`] and frames taken with
/// [`Decoder::decode`]. Each decode step reads tentatively from the front of
/// the buffer, and only removes bytes once a whole frame is there. On
/// "need more data" nothing is consumed, so the same step is simply tried
/// again after the next read.
#[derive(Debug)]
pub struct Decoder {
    buffer: BytesMut,
    state: State,
}

impl Decoder {
    pub fn new() -> Self {
        Self::with_capacity(64 * 1024)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Decoder {
            buffer: BytesMut::with_capacity(capacity),
            state: State::AwaitingLength,
        }
    }

    /// Appends newly received bytes.
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Decodes at most one frame.
    ///
    /// Returns `Ok(None)` when the buffer does not yet hold a whole frame.
    ///
    /// # Errors
    ///
    /// Returns a [`FstrmError`] on a protocol violation. The connection is
    /// unusable afterwards and should be closed.
    pub fn decode(&mut self) -> Result<Option<Frame>, FstrmError> {
        let available = self.buffer.len();

        if available < WORD {
            self.state = State::AwaitingLength;
            return Ok(None);
        }

        let len = BE::read_u32(&self.buffer[..WORD]);
        log::trace!("received frame size {}", len);

        if len == CONTROL_FRAME_MARKER {
            return self.decode_control();
        }

        let end = WORD + len as usize;
        if available < end {
            self.state = State::AwaitingDataPayload(len);
            return Ok(None);
        }

        let mut frame = self.buffer.split_to(end);
        let payload = frame.split_off(WORD).freeze();
        self.state = State::AwaitingLength;

        log::trace!("received data frame of {} bytes", payload.len());
        Ok(Some(Frame::Data(payload)))
    }

    fn decode_control(&mut self) -> Result<Option<Frame>, FstrmError> {
        let available = self.buffer.len();

        if available < 2 * WORD {
            self.state = State::AwaitingControlLength;
            return Ok(None);
        }

        let control_size = BE::read_u32(&self.buffer[WORD..2 * WORD]);
        log::trace!("received control frame with size {}", control_size);

        if control_size > CONTROL_FRAME_LENGTH_MAX {
            return Err(FstrmError::ControlFrameTooLarge(control_size));
        }
        if (control_size as usize) < WORD {
            return Err(FstrmError::ControlFrameTooShort(control_size));
        }

        let end = 2 * WORD + control_size as usize;
        if available < end {
            self.state = State::AwaitingControlPayload(control_size);
            return Ok(None);
        }

        let code = BE::read_u32(&self.buffer[2 * WORD..3 * WORD]);
        let control_type = match ControlType::from_u32(code) {
            Some(t) => t,
            None => return Err(FstrmError::UnknownControlType(code)),
        };

        let mut frame = self.buffer.split_to(end);
        let fields = frame.split_off(3 * WORD).freeze();
        self.state = State::AwaitingLength;

        log::trace!("received control frame {}", control_type);
        Ok(Some(Frame::Control(ControlFrame::new(control_type, fields))))
    }

    /// Appends `data` and decodes every frame that is now complete.
    pub fn push(&mut self, data: &[u8]) -> Result<Vec<Frame>, FstrmError> {
        self.extend(data);

        let mut frames = Vec::new();
        while let Some(frame) = self.decode()? {
            frames.push(frame);
        }

        Ok(frames)
    }

    /// The state left behind by the last decode step.
    pub fn state(&self) -> State {
        self.state
    }

    /// Number of buffered, not yet decoded, bytes.
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Discards any partial frame, e.g. once the connection has closed.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.state = State::AwaitingLength;
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}
