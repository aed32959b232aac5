//! Hand-built `multipart/form-data` bodies.
//!
//! The profile image endpoint is picky about the exact bytes, so the body is
//! assembled here rather than through the HTTP client's form helpers.

use std::{fs, path::Path};

use avatrope_types::Result;
use chrono::Utc;

use crate::upload_error;

const CRLF: &str = "\r\n";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    File { filename: String, contents: Vec<u8> },
}

impl FormValue {
    pub fn text(value: impl Into<String>) -> Self {
        FormValue::Text(value.into())
    }

    /// File part named after the basename of `path`.
    pub fn file(path: impl AsRef<Path>, contents: Vec<u8>) -> Self {
        let filename = path
            .as_ref()
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        FormValue::File { filename, contents }
    }

    pub fn read_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read(path)
            .map_err(|err| upload_error(format!("failed to read {:?}: {err}", path)))?;
        Ok(Self::file(path, contents))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

impl FormField {
    pub fn new(name: impl Into<String>, value: FormValue) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MultipartBody {
    boundary: String,
    bytes: Vec<u8>,
}

impl MultipartBody {
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn content_length(&self) -> usize {
        self.bytes.len()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Hex rendering of a Unix timestamp; unique enough within one run.
pub fn boundary_for(epoch: i64) -> String {
    format!("{epoch:x}")
}

pub fn build_multipart_body(fields: &[FormField]) -> MultipartBody {
    encode_multipart(fields, &boundary_for(Utc::now().timestamp()))
}

pub fn encode_multipart(fields: &[FormField], boundary: &str) -> MultipartBody {
    let mut bytes = Vec::new();
    for field in fields {
        let name: String = url::form_urlencoded::byte_serialize(field.name.as_bytes()).collect();
        bytes.extend_from_slice(format!("--{boundary}{CRLF}").as_bytes());
        match &field.value {
            FormValue::File { filename, contents } => {
                let header = format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"{CRLF}\
                     Content-Type: {}{CRLF}{CRLF}",
                    mime_type(filename)
                );
                bytes.extend_from_slice(header.as_bytes());
                bytes.extend_from_slice(contents);
            }
            FormValue::Text(value) => {
                let header = format!("Content-Disposition: form-data; name=\"{name}\"{CRLF}{CRLF}");
                bytes.extend_from_slice(header.as_bytes());
                bytes.extend_from_slice(value.as_bytes());
            }
        }
        bytes.extend_from_slice(CRLF.as_bytes());
    }
    bytes.extend_from_slice(format!("--{boundary}--{CRLF}{CRLF}").as_bytes());
    MultipartBody {
        boundary: boundary.to_string(),
        bytes,
    }
}

pub fn mime_type(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .map(|ext| ext.to_string_lossy());
    match extension.as_deref() {
        Some("jpg") => "image/jpg",
        Some("gif") => "image/gif",
        Some("png") => "image/png",
        _ => "application/octet-stream",
    }
}
