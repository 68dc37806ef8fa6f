//! Parsing of a single input line into an [`AddressKey`].
use std::net::{AddrParseError, Ipv4Addr};
use std::str::Utf8Error;

/// IPv4 address in its canonical big-endian numeric form,
/// e.g. `1.2.3.4` is `0x0102_0304`.
pub type AddressKey = u32;

/// Line which could not be parsed as a dotted-decimal IPv4 address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedAddress {
    /// Line is not valid UTF-8
    #[error("line is not valid UTF-8")]
    NotUtf8(#[from] Utf8Error),

    /// Line is not a dotted-decimal IPv4 address
    #[error("invalid IPv4 address")]
    Invalid(#[from] AddrParseError),
}

/// Parse `line` into an [`AddressKey`].
///
/// Surrounding whitespace (including a trailing `\r`) is trimmed. What remains must be
/// exactly four decimal octets in `0..=255` without leading zeros, separated by dots.
/// Anything else, including IPv6 forms and whitespace between octets, is rejected.
#[inline]
pub fn parse_address(line: &[u8]) -> Result<AddressKey, MalformedAddress> {
    let addr: Ipv4Addr = std::str::from_utf8(line)?.trim().parse()?;
    Ok(u32::from(addr))
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("1.2.3.4" => 0x0102_0304; "simple")]
    #[test_case("0.0.0.0" => 0; "all zeros")]
    #[test_case("255.255.255.255" => u32::MAX; "all ones")]
    #[test_case("10.0.0.1" => 0x0a00_0001; "private")]
    #[test_case("  10.0.0.1  " => 0x0a00_0001; "surrounding spaces")]
    #[test_case("\t10.0.0.1\r" => 0x0a00_0001; "tab and carriage return")]
    #[test_case("192.168.100.200" => 0xc0a8_64c8; "three digit octets")]
    fn test_parse_valid(line: &str) -> AddressKey {
        parse_address(line.as_bytes()).unwrap()
    }

    #[test_case(""; "empty")]
    #[test_case("   "; "only whitespace")]
    #[test_case("bad-line"; "garbage")]
    #[test_case("256.1.1.1"; "octet out of range")]
    #[test_case("1.2.3"; "three segments")]
    #[test_case("1.2.3.4.5"; "five segments")]
    #[test_case("1..3.4"; "empty segment")]
    #[test_case("10. 0.0.1"; "inner whitespace")]
    #[test_case("1.2.3.4x"; "trailing garbage")]
    #[test_case("-1.2.3.4"; "negative octet")]
    #[test_case("+1.2.3.4"; "signed octet")]
    #[test_case("01.2.3.4"; "leading zero")]
    #[test_case("::ffff:1.2.3.4"; "ipv4 mapped ipv6")]
    #[test_case("::1"; "ipv6")]
    #[test_case("1.2.3.4/24"; "cidr")]
    #[test_case("1.2.3.4:80"; "with port")]
    fn test_parse_invalid(line: &str) {
        assert!(matches!(
            parse_address(line.as_bytes()),
            Err(MalformedAddress::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_not_utf8() {
        let line = [b'1', b'.', 0xff, b'.', b'3', b'.', b'4'];
        assert!(matches!(
            parse_address(&line),
            Err(MalformedAddress::NotUtf8(_))
        ));
    }

    #[test]
    fn test_trim_equivalence() {
        assert_eq!(
            parse_address(b"  10.0.0.1  "),
            parse_address(b"10.0.0.1")
        );
    }
}
