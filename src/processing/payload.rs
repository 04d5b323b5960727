//! # Payload Framing
//!
//! The frame is the self-describing byte sequence that gets embedded. It is
//! independent of any image concern:
//!
//! ```text
//! Text:  "TXT:"  | UTF-8 message
//! File:  "FILE:" | ext_len (u16 BE) | ext (UTF-8, ext_len bytes) | content
//! ```
//!
//! Frames written by older revisions carry no tag at all. Parsing keeps them
//! readable: untagged bytes come back as [`PayloadFrame::Legacy`] text when they
//! are valid UTF-8, and as [`PayloadFrame::Unknown`] raw bytes otherwise.

use std::path::Path;

use crate::error::{Result, StegoError};

/// Tag prefix of a text frame.
pub const TEXT_TAG: &[u8] = b"TXT:";
/// Tag prefix of a file frame.
pub const FILE_TAG: &[u8] = b"FILE:";

/// Size of the big-endian extension length field in a file frame.
const EXT_LEN_FIELD: usize = 2;

/// A typed payload, as built for embedding or recovered from an image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadFrame {
    /// A UTF-8 message.
    Text(String),
    /// A file's extension (e.g. `".png"`, possibly empty) and raw content.
    File { extension: String, content: Vec<u8> },
    /// Untagged data that decoded as UTF-8. Decode only.
    Legacy(String),
    /// Untagged binary data, kept verbatim. Decode only.
    Unknown(Vec<u8>),
}

impl PayloadFrame {
    /// A text payload. Empty messages are rejected.
    pub fn text(message: impl Into<String>) -> Result<Self> {
        let message = message.into();
        if message.is_empty() {
            return Err(StegoError::InvalidInput("message is empty".to_string()));
        }
        Ok(Self::Text(message))
    }

    /// A file payload. The content may be empty; the extension must fit in a u16.
    pub fn file(extension: impl Into<String>, content: Vec<u8>) -> Result<Self> {
        let extension = extension.into();
        check_extension(&extension)?;
        Ok(Self::File { extension, content })
    }

    /// A file payload read from `path`, tagged with the path's extension.
    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read(path)?;
        Ok(Self::file(file_extension(path), content)?)
    }

    /// Short name of the frame kind, for logs and API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::File { .. } => "file",
            Self::Legacy(_) => "legacy",
            Self::Unknown(_) => "unknown",
        }
    }

    /// Serialize into the tagged wire form.
    ///
    /// Only `Text` and `File` frames can be built; the untagged kinds exist
    /// for decoding and yield [`StegoError::InvalidInput`].
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Self::Text(message) => build_text(message),
            Self::File { extension, content } => build_file(extension, content),
            Self::Legacy(_) | Self::Unknown(_) => Err(StegoError::InvalidInput(format!(
                "{} frames are decode-only",
                self.kind()
            ))),
        }
    }
}

/// `TXT:` followed by the UTF-8 message.
pub fn build_text(message: &str) -> Result<Vec<u8>> {
    if message.is_empty() {
        return Err(StegoError::InvalidInput("message is empty".to_string()));
    }

    let mut frame = Vec::with_capacity(TEXT_TAG.len() + message.len());
    frame.extend_from_slice(TEXT_TAG);
    frame.extend_from_slice(message.as_bytes());
    Ok(frame)
}

/// `FILE:`, the extension length as u16 BE, the extension, then the content.
pub fn build_file(extension: &str, content: &[u8]) -> Result<Vec<u8>> {
    let ext_len = check_extension(extension)?;

    let mut frame =
        Vec::with_capacity(FILE_TAG.len() + EXT_LEN_FIELD + extension.len() + content.len());
    frame.extend_from_slice(FILE_TAG);
    frame.extend_from_slice(&ext_len.to_be_bytes());
    frame.extend_from_slice(extension.as_bytes());
    frame.extend_from_slice(content);
    Ok(frame)
}

fn check_extension(extension: &str) -> Result<u16> {
    u16::try_from(extension.len()).map_err(|_| {
        StegoError::InvalidInput(format!(
            "file extension is {} bytes, limit is {}",
            extension.len(),
            u16::MAX
        ))
    })
}

/// Parse recovered bytes into a typed frame.
///
/// Text decoding is lossy and never fails. The only error is a `FILE:` frame
/// whose extension length runs past the end of the data.
pub fn parse(data: &[u8]) -> Result<PayloadFrame> {
    if let Some(body) = data.strip_prefix(TEXT_TAG) {
        return Ok(PayloadFrame::Text(String::from_utf8_lossy(body).into_owned()));
    }

    if let Some(body) = data.strip_prefix(FILE_TAG) {
        if body.len() < EXT_LEN_FIELD {
            return Err(StegoError::MalformedFrame(format!(
                "file frame has {} bytes, extension length needs {}",
                body.len(),
                EXT_LEN_FIELD
            )));
        }

        let ext_len = u16::from_be_bytes([body[0], body[1]]) as usize;
        let rest = &body[EXT_LEN_FIELD..];
        if rest.len() < ext_len {
            return Err(StegoError::MalformedFrame(format!(
                "extension length {} exceeds the {} bytes available",
                ext_len,
                rest.len()
            )));
        }

        let (extension, content) = rest.split_at(ext_len);
        return Ok(PayloadFrame::File {
            extension: String::from_utf8_lossy(extension).into_owned(),
            content: content.to_vec(),
        });
    }

    match std::str::from_utf8(data) {
        Ok(text) => Ok(PayloadFrame::Legacy(text.to_string())),
        Err(_) => Ok(PayloadFrame::Unknown(data.to_vec())),
    }
}

/// Extension of `path` with its leading dot (`"report.pdf"` gives `".pdf"`).
///
/// Returns an empty string when there is none; dotfiles such as `.bashrc`
/// have no extension.
pub fn file_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_dispatch() {
        let bytes = build_text("hello").unwrap();
        assert_eq!(bytes, b"TXT:hello".to_vec());
        assert_eq!(parse(&bytes).unwrap(), PayloadFrame::Text("hello".to_string()));
    }

    #[test]
    fn test_file_dispatch() {
        let bytes = build_file(".bin", &[0x00, 0x01]).unwrap();
        assert_eq!(&bytes[..5], b"FILE:");
        assert_eq!(&bytes[5..7], &[0x00, 0x04]);

        assert_eq!(
            parse(&bytes).unwrap(),
            PayloadFrame::File {
                extension: ".bin".to_string(),
                content: vec![0x00, 0x01],
            }
        );
    }

    #[test]
    fn test_file_with_empty_extension_and_content() {
        let frame = PayloadFrame::file("", Vec::new()).unwrap();
        let bytes = frame.to_bytes().unwrap();

        assert_eq!(bytes, b"FILE:\x00\x00".to_vec());
        assert_eq!(parse(&bytes).unwrap(), frame);
    }

    #[test]
    fn test_empty_text_rejected() {
        assert!(matches!(build_text(""), Err(StegoError::InvalidInput(_))));
        assert!(matches!(PayloadFrame::text(""), Err(StegoError::InvalidInput(_))));
    }

    #[test]
    fn test_oversized_extension_rejected() {
        let extension = ".".repeat(u16::MAX as usize + 1);
        assert!(matches!(
            build_file(&extension, b"data"),
            Err(StegoError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_decode_only_kinds_cannot_be_built() {
        assert!(PayloadFrame::Legacy("x".into()).to_bytes().is_err());
        assert!(PayloadFrame::Unknown(vec![1]).to_bytes().is_err());
    }

    #[test]
    fn test_legacy_fallback() {
        assert_eq!(
            parse(b"plain text, no tag").unwrap(),
            PayloadFrame::Legacy("plain text, no tag".to_string())
        );
    }

    #[test]
    fn test_unknown_fallback_keeps_bytes() {
        let data = vec![0xFF, 0xFE, 0x00, 0x42];
        assert_eq!(parse(&data).unwrap(), PayloadFrame::Unknown(data));
    }

    #[test]
    fn test_text_is_decoded_lossily() {
        let data = b"TXT:ok \xFF done";
        assert_eq!(
            parse(data).unwrap(),
            PayloadFrame::Text("ok \u{FFFD} done".to_string())
        );
    }

    #[test]
    fn test_truncated_file_frame() {
        assert!(matches!(parse(b"FILE:"), Err(StegoError::MalformedFrame(_))));
        assert!(matches!(parse(b"FILE:\x00"), Err(StegoError::MalformedFrame(_))));
        assert!(matches!(
            parse(b"FILE:\x00\x05.pn"),
            Err(StegoError::MalformedFrame(_))
        ));
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension(Path::new("dir/report.pdf")), ".pdf");
        assert_eq!(file_extension(Path::new("archive.tar.gz")), ".gz");
        assert_eq!(file_extension(Path::new("README")), "");
        assert_eq!(file_extension(Path::new(".bashrc")), "");
    }
}
