//! Response definitions
//!
//! Represents responses to clients.

/// Response status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0x00,
    NotFound = 0x01,
    Error = 0x02,
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code
    pub status: Status,

    /// Optional payload (value for GET, code + message for ERROR)
    pub payload: Option<Vec<u8>>,
}

impl Response {
    /// Create an OK response with optional payload
    pub fn ok(payload: Option<Vec<u8>>) -> Self {
        Self {
            status: Status::Ok,
            payload,
        }
    }

    /// Create a NOT_FOUND response
    pub fn not_found() -> Self {
        Self {
            status: Status::NotFound,
            payload: None,
        }
    }

    /// Create an ERROR response
    ///
    /// The payload carries `code_len (1) + code + message`; a missing code
    /// is encoded as `code_len = 0`.
    pub fn error(code: Option<&str>, message: &str) -> Self {
        let code_bytes = code.unwrap_or("").as_bytes();
        let mut payload = Vec::with_capacity(1 + code_bytes.len() + message.len());
        payload.push(code_bytes.len() as u8);
        payload.extend_from_slice(code_bytes);
        payload.extend_from_slice(message.as_bytes());

        Self {
            status: Status::Error,
            payload: Some(payload),
        }
    }

    /// Split an ERROR payload back into (code, message)
    ///
    /// Returns `None` for non-error responses or malformed payloads.
    pub fn error_parts(&self) -> Option<(Option<String>, String)> {
        if self.status != Status::Error {
            return None;
        }
        let payload = self.payload.as_deref()?;
        let code_len = *payload.first()? as usize;
        if payload.len() < 1 + code_len {
            return None;
        }

        let code = if code_len > 0 {
            Some(String::from_utf8_lossy(&payload[1..1 + code_len]).into_owned())
        } else {
            None
        };
        let message = String::from_utf8_lossy(&payload[1 + code_len..]).into_owned();

        Some((code, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_payload_round_trips_code_and_message() {
        let response = Response::error(Some("BREEZE-003"), "conflict on key [x]");

        let (code, message) = response.error_parts().unwrap();
        assert_eq!(code.as_deref(), Some("BREEZE-003"));
        assert_eq!(message, "conflict on key [x]");
    }

    #[test]
    fn error_without_code_round_trips() {
        let response = Response::error(None, "bad frame");

        let (code, message) = response.error_parts().unwrap();
        assert_eq!(code, None);
        assert_eq!(message, "bad frame");
    }

    #[test]
    fn error_parts_is_none_for_ok() {
        assert_eq!(Response::ok(None).error_parts(), None);
        assert_eq!(Response::not_found().error_parts(), None);
    }
}
