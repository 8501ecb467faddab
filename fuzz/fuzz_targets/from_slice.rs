#![no_main]
#[macro_use]
extern crate libfuzzer_sys;
extern crate rustdnstap;

fuzz_target!(|data: &[u8]| {
    #[allow(unused_must_use)]
    {
        rustdnstap::Message::from_slice(data);
    }
});
