//! Best-effort text scrape of base64 PDF data URLs.
//!
//! This is a regex pass over the raw bytes, not a PDF parser: compressed
//! content streams, CID fonts and encrypted files yield nothing. Callers treat
//! an error as "no text".

use std::sync::LazyLock;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use regex::bytes::Regex;
use thiserror::Error;

pub const PDF_DATA_URL_PREFIX: &str = "data:application/pdf;base64,";
const MAX_TEXT_CHARS: usize = 15_000;

static PAREN_STRING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\(([^)]+)\)").unwrap());
static TEXT_OBJECT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)BT(.*?)ET").unwrap());
static SHOW_TEXT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)\s*Tj").unwrap());
static STREAM_BODY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)stream(.*?)endstream").unwrap());

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("attachment is not a base64 PDF data URL")]
    NotDataUrl,

    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("payload does not start with a PDF header")]
    NotPdf,

    #[error("no readable text found in PDF")]
    NoText,
}

pub fn is_pdf_data_url(token: &str) -> bool {
    decode_data_url(token).is_ok()
}

/// Scrapes whatever literal strings the PDF carries, whitespace-normalized and
/// capped at 15 000 chars.
pub fn extract_text_from_base64_pdf(token: &str) -> Result<String, PdfError> {
    let bytes = decode_data_url(token)?;
    extract_text_from_pdf_bytes(&bytes)
}

/// Same scrape for a PDF file read from disk or an upload.
pub fn extract_text_from_pdf_bytes(bytes: &[u8]) -> Result<String, PdfError> {
    if !bytes.starts_with(b"%PDF") {
        return Err(PdfError::NotPdf);
    }
    let text = scrape_text(bytes);
    if text.is_empty() {
        Err(PdfError::NoText)
    } else {
        Ok(text)
    }
}

fn decode_data_url(token: &str) -> Result<Vec<u8>, PdfError> {
    let payload = token
        .strip_prefix(PDF_DATA_URL_PREFIX)
        .ok_or(PdfError::NotDataUrl)?;
    let bytes = STANDARD.decode(payload.trim())?;
    if !bytes.starts_with(b"%PDF") {
        return Err(PdfError::NotPdf);
    }
    Ok(bytes)
}

fn scrape_text(bytes: &[u8]) -> String {
    let strategies: [fn(&[u8]) -> Vec<String>; 3] =
        [literal_strings, text_object_strings, stream_strings];
    let fragments = strategies
        .iter()
        .map(|strategy| strategy(bytes))
        .find(|found| !found.is_empty())
        .unwrap_or_default();
    clean_text(&fragments.join(" "))
}

/// Any `( ... )` literal longer than two chars that is not layout noise.
fn literal_strings(bytes: &[u8]) -> Vec<String> {
    PAREN_STRING
        .captures_iter(bytes)
        .map(|c| decode_pdf_string(&c[1]))
        .filter(|s| s.chars().count() > 2 && !is_layout_noise(s))
        .collect()
}

/// `( ... ) Tj` operands inside `BT ... ET` text objects.
fn text_object_strings(bytes: &[u8]) -> Vec<String> {
    TEXT_OBJECT
        .captures_iter(bytes)
        .flat_map(|object| {
            SHOW_TEXT
                .captures_iter(&object[1])
                .map(|c| decode_pdf_string(&c[1]))
                .collect::<Vec<_>>()
        })
        .filter(|s| !s.trim().is_empty())
        .collect()
}

/// Literals found inside uncompressed content streams.
fn stream_strings(bytes: &[u8]) -> Vec<String> {
    STREAM_BODY
        .captures_iter(bytes)
        .flat_map(|body| {
            PAREN_STRING
                .captures_iter(&body[1])
                .map(|c| decode_pdf_string(&c[1]))
                .collect::<Vec<_>>()
        })
        .filter(|s| !s.trim().is_empty())
        .collect()
}

fn is_layout_noise(s: &str) -> bool {
    s.chars()
        .all(|c| c.is_ascii_digit() || c.is_ascii_punctuation() || c.is_whitespace())
}

/// Resolves backslash escapes of a PDF literal string. Octal escapes are kept
/// only when they name printable ASCII.
fn decode_pdf_string(raw: &[u8]) -> String {
    let mut out = Vec::with_capacity(raw.len());
    let mut i = 0;
    while i < raw.len() {
        let b = raw[i];
        if b != b'\\' || i + 1 >= raw.len() {
            out.push(b);
            i += 1;
            continue;
        }

        let next = raw[i + 1];
        i += 2;
        match next {
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'b' | b'f' => {}
            b'(' | b')' | b'\\' => out.push(next),
            b'0'..=b'7' => {
                let mut value = u32::from(next - b'0');
                let mut digits = 1;
                while digits < 3 && i < raw.len() && (b'0'..=b'7').contains(&raw[i]) {
                    value = value * 8 + u32::from(raw[i] - b'0');
                    i += 1;
                    digits += 1;
                }
                if (32..=126).contains(&value) {
                    out.push(value as u8);
                }
            }
            other => out.push(other),
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn clean_text(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    let joined: String = words
        .join(" ")
        .chars()
        .filter(|&c| !c.is_control() && c != char::REPLACEMENT_CHARACTER)
        .collect();
    let trimmed = joined.trim();

    if trimmed.chars().count() > MAX_TEXT_CHARS {
        let mut capped: String = trimmed.chars().take(MAX_TEXT_CHARS).collect();
        capped.push_str("...");
        capped
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn data_url(pdf: &[u8]) -> String {
        format!("{PDF_DATA_URL_PREFIX}{}", STANDARD.encode(pdf))
    }

    #[test]
    fn test_rejects_non_pdf_payloads() {
        assert!(!is_pdf_data_url("document:12"));
        assert!(!is_pdf_data_url(&format!("{PDF_DATA_URL_PREFIX}@@@")));
        assert!(!is_pdf_data_url(&data_url(b"GIF89a")));
        assert!(matches!(
            extract_text_from_base64_pdf(&data_url(b"plain text")),
            Err(PdfError::NotPdf)
        ));
        assert!(is_pdf_data_url(&data_url(b"%PDF-1.4\n%%EOF")));
    }

    #[test]
    fn test_extracts_literal_strings_and_drops_noise() {
        let pdf = b"%PDF-1.4\n1 0 obj\n<< /Title (12.50) >>\nendobj\nBT /F1 12 Tf (Senior   Rust\\nEngineer) Tj ET\n%%EOF";
        let text = extract_text_from_base64_pdf(&data_url(pdf)).unwrap();
        assert_eq!(text, "Senior Rust Engineer");
    }

    #[test]
    fn test_falls_back_to_text_objects() {
        let pdf = b"%PDF-1.4\nBT (42) Tj (ok) Tj ET\n%%EOF";
        let text = extract_text_from_base64_pdf(&data_url(pdf)).unwrap();
        assert_eq!(text, "42 ok");
    }

    #[test]
    fn test_decodes_escapes() {
        assert_eq!(decode_pdf_string(br"\110i \(there\)"), "Hi (there)");
        assert_eq!(decode_pdf_string(br"Caf\351"), "Caf");
        assert_eq!(decode_pdf_string(br"a\\b"), "a\\b");
    }

    #[test]
    fn test_no_text_is_an_error() {
        let pdf = b"%PDF-1.4\n<< /Length 0 >>\n%%EOF";
        assert!(matches!(
            extract_text_from_base64_pdf(&data_url(pdf)),
            Err(PdfError::NoText)
        ));
    }

    #[test]
    fn test_caps_long_text() {
        let long = "word ".repeat(4_000);
        let capped = clean_text(&long);
        assert_eq!(capped.chars().count(), MAX_TEXT_CHARS + 3);
        assert!(capped.ends_with("..."));
    }
}
