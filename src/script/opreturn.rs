//! OP_RETURN payload extraction
//!
//! Two input forms are accepted: the provider's assembly rendering
//! (`OP_RETURN OP_PUSHBYTES_3 737973`) and the raw script hex. Malformed or
//! truncated scripts decode to `None`; nothing here returns an error.

use bitcoin::opcodes::all::{OP_PUSHBYTES_0, OP_RETURN};
use bitcoin::script::{Instruction, Script};
use tracing::debug;

use crate::errors::ScanError;

/// Extract the concatenated OP_RETURN payload as lowercase hex
///
/// The assembly form is tried first; when it yields no hex tokens the raw
/// script is decoded instead.
pub fn extract_op_return_hex(script_asm: Option<&str>, script_hex: Option<&str>) -> Option<String> {
    if let Some(payload) = script_asm.and_then(payload_hex_from_asm) {
        return Some(payload);
    }
    script_hex.and_then(payload_hex_from_script_hex)
}

/// Payload from an assembly string that begins with `OP_RETURN`
///
/// Drops the leading operator token and keeps every remaining token that is
/// valid hex, in order.
pub fn payload_hex_from_asm(asm: &str) -> Option<String> {
    let asm = asm.trim();
    if !asm.starts_with("OP_RETURN") {
        return None;
    }

    let payload: String = asm
        .split_whitespace()
        .skip(1)
        .filter(|token| is_hex_token(token))
        .map(str::to_ascii_lowercase)
        .collect();

    (!payload.is_empty()).then_some(payload)
}

/// Payload from raw script hex
pub fn payload_hex_from_script_hex(script_hex: &str) -> Option<String> {
    let bytes = match hex::decode(script_hex.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            let err = ScanError::DecodeFailure(format!("invalid script hex: {}", e));
            debug!("{}", err);
            return None;
        }
    };
    payload_from_script(&bytes).map(hex::encode)
}

/// Concatenate the push payloads following a leading OP_RETURN
///
/// Accepts direct pushes (1-75) and PUSHDATA1/2/4. Stops at the first
/// non-push opcode or end of script. A push whose declared length runs past
/// the end of the script makes the whole script undecodable.
pub fn payload_from_script(bytes: &[u8]) -> Option<Vec<u8>> {
    if bytes.first() != Some(&OP_RETURN.to_u8()) {
        return None;
    }

    let script = Script::from_bytes(bytes);
    let mut payload = Vec::new();

    for instruction in script.instruction_indices().skip(1) {
        match instruction {
            Ok((index, Instruction::PushBytes(push)))
                if bytes[index] != OP_PUSHBYTES_0.to_u8() =>
            {
                payload.extend_from_slice(push.as_bytes());
            }
            Ok(_) => break,
            Err(e) => {
                let err = ScanError::DecodeFailure(format!("truncated push: {}", e));
                debug!("{}", err);
                return None;
            }
        }
    }

    (!payload.is_empty()).then_some(payload)
}

fn is_hex_token(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_hexdigit())
}
