//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request (Command) Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Payload by Command Type
//! - GET / DELETE:  key_len (4) + key
//! - PUT:           key_len (4) + key + value
//! - PING:          empty
//! - TXN_BEGIN / TXN_COMMIT / TXN_ROLLBACK: txn_len (4) + txn_id
//! - TXN_GET / TXN_DEL: txn_len (4) + txn_id + key_len (4) + key
//! - TXN_PUT:       txn_len (4) + txn_id + key_len (4) + key + value
//!
//! The last field of a PUT-shaped payload (the value) runs to the end of
//! the frame and carries no length prefix of its own.
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```

use std::io::{Read, Write};

use crate::error::{BreezeError, Result};
use super::{Command, Response, Status};

/// Header size: 1 byte command/status + 4 bytes length
pub const HEADER_SIZE: usize = 5;

/// Maximum payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

// =============================================================================
// Field helpers
// =============================================================================

/// Append a length-prefixed string field to a payload
fn put_field(payload: &mut Vec<u8>, field: &str) {
    payload.extend_from_slice(&(field.len() as u32).to_be_bytes());
    payload.extend_from_slice(field.as_bytes());
}

/// Consume a length-prefixed string field from the front of a payload
///
/// Returns the field and the remaining bytes.
fn take_field<'a>(payload: &'a [u8], what: &str) -> Result<(String, &'a [u8])> {
    if payload.len() < 4 {
        return Err(BreezeError::Protocol(format!(
            "{}: missing length prefix",
            what
        )));
    }

    let len = u32::from_be_bytes([payload[0], payload[1], payload[2], payload[3]]) as usize;

    if payload.len() < 4 + len {
        return Err(BreezeError::Protocol(format!(
            "{}: incomplete field (expected {}, got {})",
            what,
            len,
            payload.len() - 4
        )));
    }

    let field = std::str::from_utf8(&payload[4..4 + len])
        .map_err(|_| BreezeError::Protocol(format!("{}: invalid UTF-8", what)))?
        .to_string();

    Ok((field, &payload[4 + len..]))
}

/// Consume the unprefixed tail of a payload as a string field
fn take_rest(payload: &[u8], what: &str) -> Result<String> {
    Ok(std::str::from_utf8(payload)
        .map_err(|_| BreezeError::Protocol(format!("{}: invalid UTF-8", what)))?
        .to_string())
}

// =============================================================================
// Command Encoding/Decoding
// =============================================================================

/// Encode a command to bytes
///
/// Format: cmd_type (1) + payload_len (4) + payload
pub fn encode_command(command: &Command) -> Vec<u8> {
    let cmd_type = command.command_type() as u8;

    // Build payload based on command type
    let mut payload = Vec::new();
    match command {
        Command::Get { key } | Command::Delete { key } => {
            put_field(&mut payload, key);
        }
        Command::Put { key, value } => {
            put_field(&mut payload, key);
            payload.extend_from_slice(value.as_bytes());
        }
        Command::Ping => {}
        Command::TxnBegin { txn_id }
        | Command::TxnCommit { txn_id }
        | Command::TxnRollback { txn_id } => {
            put_field(&mut payload, txn_id);
        }
        Command::TxnGet { txn_id, key } | Command::TxnDelete { txn_id, key } => {
            put_field(&mut payload, txn_id);
            put_field(&mut payload, key);
        }
        Command::TxnPut { txn_id, key, value } => {
            put_field(&mut payload, txn_id);
            put_field(&mut payload, key);
            payload.extend_from_slice(value.as_bytes());
        }
    }

    // Build full message: header + payload
    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(cmd_type);
    message.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    message.extend_from_slice(&payload);

    message
}

/// Decode a command from bytes
pub fn decode_command(bytes: &[u8]) -> Result<Command> {
    if bytes.len() < HEADER_SIZE {
        return Err(BreezeError::Protocol(format!(
            "Incomplete header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    // Parse header
    let cmd_type = bytes[0];
    let payload_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;

    // Validate payload length
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(BreezeError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(BreezeError::Protocol(format!(
            "Incomplete payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    let payload = &bytes[HEADER_SIZE..total_len];

    // Parse command based on type
    match cmd_type {
        0x01 => {
            let (key, _) = take_field(payload, "GET key")?;
            Ok(Command::Get { key })
        }
        0x02 => {
            let (key, rest) = take_field(payload, "PUT key")?;
            let value = take_rest(rest, "PUT value")?;
            Ok(Command::Put { key, value })
        }
        0x03 => {
            let (key, _) = take_field(payload, "DELETE key")?;
            Ok(Command::Delete { key })
        }
        0x04 => {
            if !payload.is_empty() {
                return Err(BreezeError::Protocol(format!(
                    "PING command: unexpected payload of {} bytes",
                    payload.len()
                )));
            }
            Ok(Command::Ping)
        }
        0x10 => {
            let (txn_id, _) = take_field(payload, "TXN_BEGIN txn_id")?;
            Ok(Command::TxnBegin { txn_id })
        }
        0x11 => {
            let (txn_id, rest) = take_field(payload, "TXN_GET txn_id")?;
            let (key, _) = take_field(rest, "TXN_GET key")?;
            Ok(Command::TxnGet { txn_id, key })
        }
        0x12 => {
            let (txn_id, rest) = take_field(payload, "TXN_PUT txn_id")?;
            let (key, rest) = take_field(rest, "TXN_PUT key")?;
            let value = take_rest(rest, "TXN_PUT value")?;
            Ok(Command::TxnPut { txn_id, key, value })
        }
        0x13 => {
            let (txn_id, rest) = take_field(payload, "TXN_DEL txn_id")?;
            let (key, _) = take_field(rest, "TXN_DEL key")?;
            Ok(Command::TxnDelete { txn_id, key })
        }
        0x14 => {
            let (txn_id, _) = take_field(payload, "TXN_COMMIT txn_id")?;
            Ok(Command::TxnCommit { txn_id })
        }
        0x15 => {
            let (txn_id, _) = take_field(payload, "TXN_ROLLBACK txn_id")?;
            Ok(Command::TxnRollback { txn_id })
        }
        _ => Err(BreezeError::Protocol(format!(
            "Unknown command type: 0x{:02x}",
            cmd_type
        ))),
    }
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response to bytes
///
/// Format: status (1) + payload_len (4) + payload
pub fn encode_response(response: &Response) -> Vec<u8> {
    let payload = response.payload.as_deref().unwrap_or(&[]);
    let payload_len = payload.len() as u32;

    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    message.push(response.status as u8);
    message.extend_from_slice(&payload_len.to_be_bytes());
    message.extend_from_slice(payload);

    message
}

/// Decode a response from bytes
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    if bytes.len() < HEADER_SIZE {
        return Err(BreezeError::Protocol(format!(
            "Incomplete response header: expected {} bytes, got {}",
            HEADER_SIZE,
            bytes.len()
        )));
    }

    // Parse header
    let status_byte = bytes[0];
    let payload_len = u32::from_be_bytes([bytes[1], bytes[2], bytes[3], bytes[4]]) as usize;

    // Validate payload length
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(BreezeError::Protocol(format!(
            "Response payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    let total_len = HEADER_SIZE + payload_len;
    if bytes.len() < total_len {
        return Err(BreezeError::Protocol(format!(
            "Incomplete response payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    // Parse status
    let status = match status_byte {
        0x00 => Status::Ok,
        0x01 => Status::NotFound,
        0x02 => Status::Error,
        _ => {
            return Err(BreezeError::Protocol(format!(
                "Unknown response status: 0x{:02x}",
                status_byte
            )))
        }
    };

    // Extract payload
    let payload = if payload_len > 0 {
        Some(bytes[HEADER_SIZE..total_len].to_vec())
    } else {
        None
    };

    Ok(Response { status, payload })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read a complete command from a stream
///
/// Blocks until a complete command is received or an error occurs
pub fn read_command<R: Read>(reader: &mut R) -> Result<Command> {
    let message = read_frame(reader)?;
    decode_command(&message)
}

/// Write a command to a stream
pub fn write_command<W: Write>(writer: &mut W, command: &Command) -> Result<()> {
    let bytes = encode_command(command);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read a complete response from a stream
pub fn read_response<R: Read>(reader: &mut R) -> Result<Response> {
    let message = read_frame(reader)?;
    decode_response(&message)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    let bytes = encode_response(response);
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Read one header + payload frame from a stream
fn read_frame<R: Read>(reader: &mut R) -> Result<Vec<u8>> {
    // Read header first
    let mut header = [0u8; HEADER_SIZE];
    reader.read_exact(&mut header)?;

    // Parse payload length
    let payload_len = u32::from_be_bytes([header[1], header[2], header[3], header[4]]) as usize;

    // Validate payload length
    if payload_len > MAX_PAYLOAD_SIZE as usize {
        return Err(BreezeError::Protocol(format!(
            "Payload too large: {} bytes (max {})",
            payload_len, MAX_PAYLOAD_SIZE
        )));
    }

    // Read payload
    let mut payload = vec![0u8; payload_len];
    if payload_len > 0 {
        reader.read_exact(&mut payload)?;
    }

    // Combine into one message
    let mut full_message = Vec::with_capacity(HEADER_SIZE + payload_len);
    full_message.extend_from_slice(&header);
    full_message.extend_from_slice(&payload);

    Ok(full_message)
}
