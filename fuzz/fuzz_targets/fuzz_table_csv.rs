//! Fuzz target for CSV table parsing.
//!
//! Parsing arbitrary bytes must never panic, and any frame that parses
//! must survive a write and re-read with the same shape.

#![no_main]

use fd_core::table::Frame;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(frame) = Frame::from_reader(data) else {
        return;
    };
    if frame.n_cols() == 0 {
        return;
    }
    let mut buf = Vec::new();
    if frame.to_writer(&mut buf).is_ok() {
        if let Ok(back) = Frame::from_reader(buf.as_slice()) {
            assert_eq!(back.n_cols(), frame.n_cols());
        }
    }
});
