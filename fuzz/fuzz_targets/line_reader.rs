#![no_main]

use ipv4_cardinality::lines::LineReader;
use ipv4_cardinality::Error;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // first byte picks the line length ceiling
    let max_len = usize::from(data[0] % 32);
    let input = &data[1..];

    let mut reader = LineReader::new(input, 4, max_len);
    loop {
        match reader.next_line() {
            Ok(Some(line)) => {
                assert!(line.len() <= max_len);
                assert!(!line.contains(&b'\n'));
            }
            Ok(None) => {
                assert_eq!(reader.bytes_read(), input.len() as u64);
                break;
            }
            Err(Error::LineTooLong { limit, .. }) => {
                assert_eq!(limit, max_len);
                break;
            }
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
});
