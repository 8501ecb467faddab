// Listens for dnstap over TCP, and prints each event as a line of JSON.
// listen [--omit-full-message] [bind-address]
use rustdnstap::event::Codec;
use rustdnstap::server::{self, ServerConfig};
use std::env;
use std::net::SocketAddr;
use std::process;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

// A simple type alias so as to DRY.
type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

fn parse_args(args: impl Iterator<Item = String>) -> Result<ServerConfig> {
    let mut config = ServerConfig::default();
    let mut bind = None;

    for arg in args {
        match arg.as_str() {
            "--omit-full-message" => config.codec.omit_full_message = true,

            _ => {
                if arg.starts_with('-') {
                    return Err(format!("Unknown flag: {}", arg).into());
                }
                if bind.is_some() {
                    return Err(format!("Unexpected argument: {}", arg).into());
                }

                bind = Some(parse_bind(&arg)?);
            }
        }
    }

    if let Some(bind) = bind {
        config.bind = bind;
    }

    Ok(config)
}

// Accepts "host:port", or just a port.
fn parse_bind(arg: &str) -> Result<SocketAddr> {
    if let Ok(port) = arg.parse::<u16>() {
        return Ok(SocketAddr::from(([0, 0, 0, 0], port)));
    }

    arg.parse()
        .map_err(|e| format!("Invalid bind address '{}': {}", arg, e).into())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = match parse_args(env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            eprintln!("Usage: listen [--omit-full-message] [bind-address]");
            process::exit(1);
        }
    };

    let listener = TcpListener::bind(config.bind).await?;
    let codec = Arc::new(Codec::new(config.codec.clone()));
    let (tx, mut rx) = mpsc::channel(1024);

    tokio::spawn(async move {
        if let Err(e) = server::serve(listener, codec, tx, config.read_buffer_size).await {
            log::error!("listener failed: {}", e);
        }
    });

    while let Some(event) = rx.recv().await {
        println!("{}", serde_json::to_string(&event)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn args(args: &[&str]) -> impl Iterator<Item = String> {
        args.iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn test_parse_args() {
        let config = parse_args(args(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());

        let config = parse_args(args(&["--omit-full-message", "127.0.0.1:6001"])).unwrap();
        assert!(config.codec.omit_full_message);
        assert_eq!(config.bind, "127.0.0.1:6001".parse().unwrap());

        let config = parse_args(args(&["7000"])).unwrap();
        assert_eq!(config.bind, "0.0.0.0:7000".parse().unwrap());

        assert!(parse_args(args(&["--verbose"])).is_err());
        assert!(parse_args(args(&["6000", "6001"])).is_err());
        assert!(parse_args(args(&["not an address"])).is_err());
    }
}
