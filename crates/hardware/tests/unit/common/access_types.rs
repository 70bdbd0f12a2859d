//! Access Type Tests.
//!
//! Verifies trace code mapping and the statistics stream of each access type.

use cachesim_core::common::constants::{TRACE_DATA_LOAD, TRACE_DATA_STORE, TRACE_INST_LOAD};
use cachesim_core::common::{AccessType, Stream};
use rstest::rstest;

#[rstest]
#[case(TRACE_DATA_LOAD, AccessType::Read, Stream::Data)]
#[case(TRACE_DATA_STORE, AccessType::Write, Stream::Data)]
#[case(TRACE_INST_LOAD, AccessType::Fetch, Stream::Instruction)]
fn test_code_mapping(#[case] code: u8, #[case] access: AccessType, #[case] stream: Stream) {
    assert_eq!(AccessType::from_code(code), Some(access));
    assert_eq!(access.code(), code);
    assert_eq!(access.stream(), stream);
}

#[test]
fn test_unknown_codes() {
    assert_eq!(AccessType::from_code(3), None);
    assert_eq!(AccessType::from_code(255), None);
}

#[test]
fn test_only_writes_are_writes() {
    assert!(AccessType::Write.is_write());
    assert!(!AccessType::Read.is_write());
    assert!(!AccessType::Fetch.is_write());
}

#[test]
fn test_stream_display() {
    assert_eq!(Stream::Instruction.to_string(), "instruction");
    assert_eq!(Stream::Data.to_string(), "data");
}
