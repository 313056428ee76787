//! Vehicle lookup client
//!
//! Thin blocking HTTP client for the vehicle registry: one GET with the
//! plate as a query parameter, one attempt, no retries. A 404 means the
//! registry has no record for the plate and maps to its own error so
//! callers can show it as a normal outcome rather than a failure.

use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::LookupSettings;

/// Vehicle record returned by the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleInfo {
    pub vin: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    #[serde(rename = "engineCapacity")]
    pub engine_capacity: String,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no vehicle found for plate {0}")]
    NotFound(String),
    #[error("lookup request failed: {0}")]
    Request(String),
    #[error("cannot decode lookup response: {0}")]
    Decode(String),
}

/// Blocking client for the vehicle registry endpoint
pub struct LookupClient {
    http: reqwest::blocking::Client,
    base_url: String,
    path: String,
}

impl LookupClient {
    pub fn new(settings: &LookupSettings) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        let path = if settings.path.starts_with('/') {
            settings.path.clone()
        } else {
            format!("/{}", settings.path)
        };

        Ok(Self {
            http,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            path,
        })
    }

    /// Fetch the vehicle record for a plate. One attempt, no retries.
    pub fn fetch(&self, plate: &str) -> Result<VehicleInfo, LookupError> {
        let url = format!("{}{}", self.base_url, self.path);
        debug!("Looking up plate {} at {}", plate, url);

        let response = self
            .http
            .get(&url)
            .query(&[("plate", plate)])
            .send()
            .map_err(|e| LookupError::Request(e.to_string()))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(LookupError::NotFound(plate.to_string()));
        }
        if !response.status().is_success() {
            return Err(LookupError::Request(format!(
                "server returned status {}",
                response.status()
            )));
        }

        response
            .json::<VehicleInfo>()
            .map_err(|e| LookupError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    fn serve_once(status: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                let response = format!(
                    "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
            }
        });
        format!("http://{}", addr)
    }

    fn client_for(base_url: String) -> LookupClient {
        let settings = LookupSettings {
            base_url,
            ..LookupSettings::default()
        };
        LookupClient::new(&settings).unwrap()
    }

    #[test]
    fn test_vehicle_info_decodes_the_wire_format() {
        let body = r#"{
            "vin": "WBA12345678901234",
            "make": "BMW",
            "model": "X5",
            "year": 2019,
            "engineCapacity": "3.0"
        }"#;

        let info: VehicleInfo = serde_json::from_str(body).unwrap();

        assert_eq!(info.vin, "WBA12345678901234");
        assert_eq!(info.make, "BMW");
        assert_eq!(info.model, "X5");
        assert_eq!(info.year, 2019);
        assert_eq!(info.engine_capacity, "3.0");
    }

    #[test]
    fn test_missing_field_fails_to_decode() {
        let body = r#"{"vin": "WBA12345678901234", "make": "BMW"}"#;

        assert!(serde_json::from_str::<VehicleInfo>(body).is_err());
    }

    #[test]
    fn test_success_decodes_vehicle_info() {
        let base = serve_once(
            "200 OK",
            r#"{"vin":"WBA00000000000000","make":"BMW","model":"X5","year":2019,"engineCapacity":"3.0"}"#,
        );
        let client = client_for(base);

        let info = client.fetch("AA1111BB").unwrap();

        assert_eq!(info.make, "BMW");
        assert_eq!(info.year, 2019);
    }

    #[test]
    fn test_not_found_maps_to_its_own_error() {
        let base = serve_once("404 Not Found", r#"{"detail": "Автомобіль не знайдено"}"#);
        let client = client_for(base);

        let err = client.fetch("AA1111BB").unwrap_err();

        assert!(matches!(err, LookupError::NotFound(_)));
        assert!(err.to_string().contains("AA1111BB"));
    }

    #[test]
    fn test_server_error_maps_to_request_error() {
        let base = serve_once("500 Internal Server Error", "{}");
        let client = client_for(base);

        let err = client.fetch("AA1111BB").unwrap_err();

        assert!(matches!(err, LookupError::Request(_)));
    }
}
