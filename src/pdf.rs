//! PDF text extraction
//!
//! Parses a PDF from memory with lopdf and extracts text from the content
//! streams of at most the first [`MAX_PAGES`] pages. Page texts are
//! concatenated in page order with no added separator.

use crate::errors::{AppError, Result};
use lopdf::Document;

/// Pages read from the front of the document; later pages are never touched.
pub const MAX_PAGES: usize = 10;

/// Extract text from a PDF byte stream.
///
/// Fails with [`AppError::Extraction`] when the bytes do not parse as a PDF
/// or when any of the covered pages cannot be read. Deterministic for the
/// same input.
pub fn extract_text(bytes: &[u8]) -> Result<String> {
    let doc = Document::load_mem(bytes)
        .map_err(|e| AppError::Extraction(format!("failed to parse PDF: {}", e)))?;

    let mut text = String::new();
    for (index, page_id) in doc.page_iter().take(MAX_PAGES).enumerate() {
        let content = doc.get_page_content(page_id).map_err(|e| {
            AppError::Extraction(format!("failed to read page {}: {}", index + 1, e))
        })?;
        text.push_str(&page_text(&content));
    }

    Ok(text)
}

/// Extract text from a single page's content stream.
///
/// Walks BT/ET text blocks and collects the text-showing operators
/// (`Tj`, `TJ`, `'`, `"`).
fn page_text(content: &[u8]) -> String {
    let content_str = String::from_utf8_lossy(content);
    let mut text = String::new();
    let mut block = String::new();
    let mut in_text_block = false;

    for line in content_str.lines() {
        let line = line.trim();
        match line {
            "BT" => in_text_block = true,
            "ET" => {
                in_text_block = false;
                if !block.is_empty() {
                    text.push_str(&block);
                    text.push(' ');
                    block.clear();
                }
            }
            _ if in_text_block => {
                if let Some(shown) = operator_text(line) {
                    block.push_str(&shown);
                }
            }
            _ => {}
        }
    }

    text
}

/// Text shown by a single content-stream line, if it ends in a text operator.
fn operator_text(line: &str) -> Option<String> {
    // (text) Tj and the ' / " shorthand forms
    if line.ends_with("Tj") || line.ends_with('\'') || line.ends_with('"') {
        let start = line.find('(')?;
        let end = line.rfind(')')?;
        if start < end {
            return Some(unescape_literal(&line[start + 1..end]));
        }
        return None;
    }

    // [(a) -120 (b)] TJ array form: concatenate the string elements
    if line.ends_with("TJ") {
        let mut shown = String::new();
        let mut current = String::new();
        let mut in_string = false;
        for ch in line.chars() {
            match ch {
                '(' if !in_string => in_string = true,
                ')' if in_string => {
                    in_string = false;
                    shown.push_str(&unescape_literal(&current));
                    current.clear();
                }
                _ if in_string => current.push(ch),
                _ => {}
            }
        }
        if !shown.is_empty() {
            return Some(shown);
        }
    }

    None
}

/// Decode PDF literal-string escapes
fn unescape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('r') => out.push('\r'),
                Some('t') => out.push('\t'),
                Some(c) => out.push(c),
                None => {}
            }
        } else {
            out.push(ch);
        }
    }
    out
}
