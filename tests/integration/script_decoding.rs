//! OP_RETURN push decoding tests
//!
//! Every push form must yield the same payload and the marker search must see
//! it regardless of how it was encoded.

use sys_marker_scan::script::{extract_op_return_hex, payload_from_script, MarkerMatcher};

use crate::common::{op_return_script, push};

#[test]
fn test_minimal_push_forms_decode_to_payload() {
    // Direct, PUSHDATA1, PUSHDATA2 and PUSHDATA4 boundaries
    for len in [1usize, 75, 76, 255, 256, 65_535, 65_536] {
        let payload: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        let script = op_return_script(&payload);
        assert_eq!(
            payload_from_script(&script).as_deref(),
            Some(payload.as_slice()),
            "push of {} bytes",
            len
        );
    }
}

#[test]
fn test_non_minimal_pushes_are_accepted() {
    let pushdata1 = [0x6a, 0x4c, 0x03, b's', b'y', b's'];
    let pushdata2 = [0x6a, 0x4d, 0x03, 0x00, b's', b'y', b's'];
    let pushdata4 = [0x6a, 0x4e, 0x03, 0x00, 0x00, 0x00, b's', b'y', b's'];

    for script in [&pushdata1[..], &pushdata2[..], &pushdata4[..]] {
        assert_eq!(payload_from_script(script).as_deref(), Some(&b"sys"[..]));
    }
}

#[test]
fn test_pushes_concatenate_until_non_push_opcode() {
    let mut script = vec![0x6a];
    script.extend(push(&[0xab, 0xcd]));
    script.extend(push(&[0xef]));
    // OP_1 ends the payload
    script.push(0x51);
    script.extend(push(&[0x99]));

    assert_eq!(payload_from_script(&script), Some(vec![0xab, 0xcd, 0xef]));
}

#[test]
fn test_truncated_push_is_undecodable() {
    assert_eq!(payload_from_script(&[0x6a, 0x4c, 0x0a, 0x01, 0x02]), None);
    assert_eq!(payload_from_script(&[0x6a, 0x05, b's', b'y']), None);
}

#[test]
fn test_marker_found_through_hex_script() {
    let matcher = MarkerMatcher::new("sys");
    let mut payload = vec![0u8; 300];
    payload[150..153].copy_from_slice(b"sys");

    let script_hex = hex::encode(op_return_script(&payload));
    let extracted = extract_op_return_hex(None, Some(script_hex.as_str())).unwrap();
    assert!(matcher.matches_hex(&extracted));
}
