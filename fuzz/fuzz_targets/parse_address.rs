#![no_main]

use std::net::Ipv4Addr;

use ipv4_cardinality::parse_address;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match parse_address(data) {
        Ok(key) => {
            // accepted lines print back to their trimmed form
            let text = std::str::from_utf8(data).unwrap().trim();
            assert_eq!(Ipv4Addr::from(key).to_string(), text);
        }
        Err(_) => {
            if let Ok(text) = std::str::from_utf8(data) {
                assert!(text.trim().parse::<Ipv4Addr>().is_err());
            }
        }
    }
});
