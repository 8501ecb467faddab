//! A Frame Streams receiver over TCP.
//!
//! Each accepted connection gets its own task and [`Decoder`]. Control frames
//! are answered on the same connection, and data frames are decoded with a
//! shared [`Codec`] and sent on to an event channel.

use crate::dns::Parser;
use crate::errors::Error;
use crate::event::{Codec, Config, Event, RawFrame};
use crate::fstrm::{ControlType, Decoder, Frame};
use chrono::Utc;
use serde::Deserialize;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

/// The usual port for dnstap over TCP.
pub const DEFAULT_PORT: u16 = 6000;

const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,

    /// Most bytes read from a connection at once.
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,

    #[serde(default)]
    pub codec: Config,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT))
}

fn default_read_buffer_size() -> usize {
    DEFAULT_READ_BUFFER_SIZE
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: default_bind(),
            read_buffer_size: default_read_buffer_size(),
            codec: Config::default(),
        }
    }
}

/// Accepts connections until the listener fails, decoding each on its own
/// task.
///
/// Connections end on EOF, on a Frame Streams protocol error, or once `sink`
/// is closed. None of those affect other connections.
pub async fn serve<P>(
    listener: TcpListener,
    codec: Arc<Codec<P>>,
    sink: mpsc::Sender<Event>,
    read_buffer_size: usize,
) -> io::Result<()>
where
    P: Parser + 'static,
{
    log::info!("listening for dnstap on {}", listener.local_addr()?);

    loop {
        let (stream, peer) = listener.accept().await?;
        log::info!("accepted dnstap connection from {}", peer);

        let codec = Arc::clone(&codec);
        let sink = sink.clone();

        tokio::spawn(async move {
            let remote = Some(peer.ip().to_string());

            match handle_connection(stream, remote, &codec, &sink, read_buffer_size).await {
                Ok(()) => log::info!("dnstap connection from {} closed", peer),
                Err(e) => log::warn!("closing dnstap connection from {}: {}", peer, e),
            }
        });
    }
}

/// Reads frames from one connection until it ends.
///
/// READY control frames are answered with an ACCEPT before anything after
/// them is decoded. Each data frame is stamped with the time it was read and
/// `remote`, and becomes at most one event on `sink`.
///
/// # Errors
///
/// Returns an error on any I/O failure or Frame Streams protocol violation,
/// after which the connection should be dropped.
pub async fn handle_connection<S, P>(
    mut stream: S,
    remote: Option<String>,
    codec: &Codec<P>,
    sink: &mpsc::Sender<Event>,
    read_buffer_size: usize,
) -> Result<(), Error>
where
    S: AsyncRead + AsyncWrite + Unpin,
    P: Parser,
{
    let mut decoder = Decoder::new();
    let mut buf = vec![0; read_buffer_size.max(1)];

    loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            if !decoder.is_empty() {
                log::debug!(
                    "discarding {} bytes of partial frame ({:?})",
                    decoder.len(),
                    decoder.state()
                );
            }
            return Ok(());
        }

        let received = Utc::now();
        decoder.extend(&buf[..n]);

        while let Some(frame) = decoder.decode()? {
            match frame {
                Frame::Control(control) => {
                    log::debug!("received {} control frame", control.control_type);

                    if control.control_type == ControlType::Ready {
                        for content_type in control.content_types() {
                            log::debug!(
                                "peer offered content type {}",
                                String::from_utf8_lossy(&content_type)
                            );
                        }
                    }

                    if let Some(reply) = control.reply() {
                        stream.write_all(&reply.to_bytes()).await?;
                        stream.flush().await?;
                    }
                }

                Frame::Data(payload) => {
                    let frame = RawFrame::new(payload, received, remote.clone());

                    if let Some(event) = codec.decode(&frame) {
                        if sink.send(event).await.is_err() {
                            log::debug!("event receiver went away, closing connection");
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
