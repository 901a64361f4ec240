//! Delimited-file extraction with encoding and delimiter auto-detection.
//!
//! Supply-chain order exports arrive in mixed encodings; the well-known
//! DataCo dataset is Latin-1, and a UTF-8 read of it corrupts every accented
//! byte. Extraction therefore reads raw bytes, detects the encoding, decodes,
//! detects the delimiter from the header line, and only then parses rows.
//!
//! Cells are typed on the way in: empty fields become null markers, numeric
//! fields become numbers, everything else stays text. Date columns stay text
//! until the validator or transformer parses them.

use std::path::Path;

use crate::error::{ExtractError, ExtractResult};
use crate::models::{Cell, Dataset};

/// Result of extracting a source file, with detection metadata.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub dataset: Dataset,
    /// Detected (normalized) encoding label.
    pub encoding: String,
    /// Detected delimiter.
    pub delimiter: char,
}

/// Detect the encoding of raw bytes using chardet.
pub fn detect_encoding(bytes: &[u8]) -> String {
    let (charset, _confidence, _) = chardet::detect(bytes);

    // Normalize charset labels
    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to a string using the given encoding label.
///
/// Unknown labels fall back to windows-1252, which decodes every byte and is
/// a superset of Latin-1 for the range the order files use.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    if encoding.eq_ignore_ascii_case("utf-8") || encoding.eq_ignore_ascii_case("utf8") {
        return String::from_utf8_lossy(bytes).to_string();
    }
    let decoder = encoding_rs::Encoding::for_label(encoding.as_bytes())
        .unwrap_or(encoding_rs::WINDOWS_1252);
    let (decoded, _, _) = decoder.decode(bytes);
    decoded.to_string()
}

/// Detect the delimiter by counting candidates in the header line.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Extract a source file with auto-detection of encoding and delimiter.
pub fn extract_file<P: AsRef<Path>>(path: P) -> ExtractResult<Extraction> {
    let bytes = std::fs::read(path.as_ref()).map_err(|e| ExtractError::Io {
        path: path.as_ref().display().to_string(),
        source: e,
    })?;
    extract_bytes(&bytes)
}

/// Extract raw bytes with auto-detection of encoding and delimiter.
pub fn extract_bytes(bytes: &[u8]) -> ExtractResult<Extraction> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ExtractError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = detect_delimiter(&content);

    let dataset = parse_content(&content, delimiter)?;

    Ok(Extraction {
        dataset,
        encoding,
        delimiter,
    })
}

/// Parse decoded content into a typed dataset with an explicit delimiter.
pub fn parse_content(content: &str, delimiter: char) -> ExtractResult<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(ExtractError::NoHeaders);
    }

    let mut dataset = Dataset::new(headers);

    for record in reader.records() {
        let record = record?;
        if record.iter().all(|f| f.is_empty()) {
            continue;
        }
        let row: Vec<Cell> = record.iter().map(Cell::from_field).collect();
        dataset.push_row(row);
    }

    Ok(dataset)
}
