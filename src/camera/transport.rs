//! Request/response channel to the vacuum.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::TransportError;

/// Command requesting the current map payload
pub const GET_MAP_V1: &str = "get_map_v1";

/// Raw response to a device command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportResponse {
    /// Binary payload
    Bytes(Vec<u8>),
    /// Device answered without data
    NoData,
    /// Any non-binary answer (status codes, JSON, ...)
    Other(String),
}

impl TransportResponse {
    /// Payload bytes, if the response carries any
    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            TransportResponse::Bytes(bytes) if !bytes.is_empty() => Some(bytes),
            _ => None,
        }
    }
}

/// Request/response transport addressed by device identifier
pub trait MapTransport: Send + Sync {
    /// Send a parameterless command and wait for the response
    fn send(&self, device_id: &str, command: &str) -> Result<TransportResponse, TransportError>;
}

/// Transport that serves map payloads from files, one per device
#[derive(Clone, Debug, Default)]
pub struct FileTransport {
    files: BTreeMap<String, PathBuf>,
}

impl FileTransport {
    /// Empty transport (every device is unknown)
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `path` for `device_id`
    pub fn with_device(mut self, device_id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.insert(device_id.into(), path.into());
        self
    }
}

impl MapTransport for FileTransport {
    fn send(&self, device_id: &str, command: &str) -> Result<TransportResponse, TransportError> {
        if command != GET_MAP_V1 {
            return Ok(TransportResponse::Other(format!("unsupported command {command}")));
        }
        let path = self
            .files
            .get(device_id)
            .ok_or_else(|| TransportError::UnknownDevice(device_id.to_string()))?;
        let bytes = std::fs::read(path)?;
        log::trace!("Read {} bytes from {}", bytes.len(), path.display());
        if bytes.is_empty() {
            return Ok(TransportResponse::NoData);
        }
        Ok(TransportResponse::Bytes(bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_file_transport_reads_payload() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"rr-payload").unwrap();
        let transport = FileTransport::new().with_device("vac", file.path());

        let response = transport.send("vac", GET_MAP_V1).unwrap();
        assert_eq!(response, TransportResponse::Bytes(b"rr-payload".to_vec()));
    }

    #[test]
    fn test_file_transport_empty_file_is_no_data() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let transport = FileTransport::new().with_device("vac", file.path());
        assert_eq!(
            transport.send("vac", GET_MAP_V1).unwrap(),
            TransportResponse::NoData
        );
    }

    #[test]
    fn test_file_transport_unknown_device() {
        let transport = FileTransport::new();
        assert!(matches!(
            transport.send("ghost", GET_MAP_V1),
            Err(TransportError::UnknownDevice(id)) if id == "ghost"
        ));
    }

    #[test]
    fn test_non_binary_responses_have_no_bytes() {
        assert_eq!(TransportResponse::NoData.into_bytes(), None);
        assert_eq!(TransportResponse::Other("retry".into()).into_bytes(), None);
        assert_eq!(TransportResponse::Bytes(Vec::new()).into_bytes(), None);
        assert_eq!(
            TransportResponse::Bytes(vec![1]).into_bytes(),
            Some(vec![1])
        );
    }
}
