#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate rustdnstap;

use rustdnstap::event::{Codec, Config, RawFrame};
use rustdnstap::fstrm::{Decoder, Frame};

// Feeds the input through the decoder in two chunks, and every data frame
// through the codec.
fuzz_target!(|data: &[u8]| {
    let codec = Codec::new(Config::default());
    let mut decoder = Decoder::new();

    let split = data.first().map(|b| *b as usize % (data.len() + 1)).unwrap_or(0);
    let (a, b) = data.split_at(split);

    for chunk in &[a, b] {
        let frames = match decoder.push(chunk) {
            Ok(frames) => frames,
            Err(_) => return,
        };

        for frame in frames {
            if let Frame::Data(payload) = frame {
                let frame = RawFrame::new(payload, chrono::Utc::now(), None);
                let _ = codec.decode(&frame);
            }
        }
    }
});
