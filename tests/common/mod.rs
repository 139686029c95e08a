//! Shared fixtures for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use redraft::{ClientError, CompletionClient, CompletionRequest, RewriteService, Settings};
use std::io::{Cursor, Write};
use std::sync::{Arc, Mutex};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// Completion client that upper-cases the `<FILE>` body.
///
/// Requests whose file body contains `fail_marker` get a status error instead.
/// Every request is recorded.
pub struct FakeClient {
    fail_marker: Option<String>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl FakeClient {
    pub fn new() -> Self {
        Self {
            fail_marker: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

/// Extract the text between the `<FILE>` markers of a rewrite prompt
pub fn file_body(user_prompt: &str) -> &str {
    let start = user_prompt.find("<FILE>\n").expect("missing <FILE>") + "<FILE>\n".len();
    let end = user_prompt.rfind("\n</FILE>").expect("missing </FILE>");
    &user_prompt[start..end]
}

#[async_trait]
impl CompletionClient for FakeClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String, ClientError> {
        self.requests.lock().unwrap().push(request.clone());

        let body = file_body(&request.messages[1].content);
        if let Some(marker) = &self.fail_marker {
            if body.contains(marker.as_str()) {
                return Err(ClientError::Status {
                    status: 500,
                    body: "simulated failure".to_string(),
                });
            }
        }
        Ok(body.to_uppercase())
    }
}

/// Rewrite service over a shared fake client with default settings
pub fn service(client: Arc<FakeClient>) -> RewriteService {
    RewriteService::new(Some(client), &Settings::default())
}

/// Build a zip archive; names ending in `/` become directory entries
pub fn zip_of(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

/// Set the compression method recorded for the `index`-th entry in the central
/// directory, leaving the data untouched
pub fn with_compression_method(mut bytes: Vec<u8>, index: usize, method: u16) -> Vec<u8> {
    let header = bytes
        .windows(4)
        .enumerate()
        .filter(|(_, w)| *w == b"PK\x01\x02")
        .map(|(offset, _)| offset)
        .nth(index)
        .expect("central directory header");
    bytes[header + 10..header + 12].copy_from_slice(&method.to_le_bytes());
    bytes
}
