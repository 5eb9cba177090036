//! Protocol Module
//!
//! Defines the wire protocol for client-server communication.
//!
//! ## Protocol Format (V1 - Simple Binary)
//!
//! ### Request Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │ Cmd (1)  │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Commands
//! - 0x01: GET           - Payload: key
//! - 0x02: PUT           - Payload: key_len (4) + key + value
//! - 0x03: DEL           - Payload: key
//! - 0x04: PING          - Payload: empty
//! - 0x10: TXN_BEGIN     - Payload: txn_id
//! - 0x11: TXN_GET       - Payload: txn_len (4) + txn_id + key
//! - 0x12: TXN_PUT       - Payload: txn_len (4) + txn_id + key_len (4) + key + value
//! - 0x13: TXN_DEL       - Payload: txn_len (4) + txn_id + key
//! - 0x14: TXN_COMMIT    - Payload: txn_id
//! - 0x15: TXN_ROLLBACK  - Payload: txn_id
//!
//! Keys, values, and transaction ids are UTF-8 strings on the wire.
//!
//! ### Response Format
//! ```text
//! ┌──────────┬──────────┬─────────────────────────────┐
//! │Status(1) │ Len (4)  │         Payload             │
//! └──────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Status Codes
//! - 0x00: OK        - Payload: value (GET) or empty
//! - 0x01: NOT_FOUND - Payload: empty
//! - 0x02: ERROR     - Payload: code_len (1) + code + message
//!
//! The error code (`BREEZE-001`..) is carried verbatim so clients can act
//! on failures without parsing messages; `code_len` is 0 for failures that
//! have no domain code (protocol or I/O errors).

mod command;
mod response;
mod codec;

pub use command::{Command, CommandType};
pub use response::{Response, Status};
pub use codec::{
    decode_command, decode_response, encode_command, encode_response, read_command,
    read_response, write_command, write_response,
};
