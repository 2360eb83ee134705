use std::collections::BTreeMap;

use lopdf::{self, content::Content};

use crate::PdfError;

/// A page identifier mirroring `lopdf::ObjectId`: (object number, generation number).
pub type PageId = (u32, u16);

/// A simplified, lopdf-independent representation of a PDF operand.
///
/// Keeps the text walker free of `lopdf::Object` so it can be driven by a
/// mock backend in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum PdfValue {
    Null,
    Bool(bool),
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single content-stream operation (operator + operands).
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

impl ContentOp {
    pub fn new(operator: &str, operands: Vec<PdfValue>) -> Self {
        Self {
            operator: operator.to_string(),
            operands,
        }
    }
}

/// Extract an `f32` from a [`PdfValue`], accepting both `Integer` and `Real`.
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(f) => Some(*f),
        _ => None,
    }
}

/// Convert a `lopdf::Object` operand into a [`PdfValue`].
///
/// Dictionaries, streams and references never carry text in a content
/// stream, so they collapse to `Other`.
pub fn convert_object(obj: &lopdf::Object) -> PdfValue {
    match obj {
        lopdf::Object::Null => PdfValue::Null,
        lopdf::Object::Boolean(b) => PdfValue::Bool(*b),
        lopdf::Object::Integer(i) => PdfValue::Integer(*i),
        lopdf::Object::Real(f) => PdfValue::Real(*f),
        lopdf::Object::Name(n) => PdfValue::Name(n.clone()),
        lopdf::Object::String(s, _) => PdfValue::Str(s.clone()),
        lopdf::Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

/// Best-effort decoding of raw PDF string bytes into a Rust `String`.
///
/// Handles three cases in order:
/// 1. UTF-16BE with BOM (`\xFE\xFF` prefix) -- strips BOM and decodes.
/// 2. Valid UTF-8 -- returned as-is.
/// 3. Fallback to Latin-1 (ISO 8859-1) -- each byte mapped to its Unicode
///    code point.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let code_units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        return String::from_utf16_lossy(&code_units);
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    bytes.iter().map(|&b| b as char).collect()
}

/// Whether the raw file names an `/Encrypt` dictionary anywhere.
fn declares_encryption(data: &[u8]) -> bool {
    const ENCRYPT_KEY: &[u8] = b"/Encrypt";
    data.windows(ENCRYPT_KEY.len()).any(|w| w == ENCRYPT_KEY)
}

/// Abstraction over a PDF parsing backend (currently backed by `lopdf`).
pub trait PdfBackend {
    /// Return a mapping from 1-based page number to [`PageId`].
    fn pages(&self) -> BTreeMap<u32, PageId>;

    /// Return the decompressed content stream bytes for a page.
    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError>;

    /// Decode raw content-stream bytes into a sequence of [`ContentOp`]s.
    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError>;

    /// Decode the bytes of a text-showing operator using whatever encoding
    /// hint the font named `font_name` on `page` provides.
    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String;
}

/// Concrete [`PdfBackend`] implementation backed by [`lopdf::Document`].
pub struct LopdfBackend {
    doc: lopdf::Document,
}

impl LopdfBackend {
    /// Parse a PDF from an in-memory byte slice.
    ///
    /// The caller is expected to have checked the `%PDF-` header already, so
    /// any failure here means a damaged or encrypted container rather than
    /// foreign bytes.
    pub fn load_bytes(data: &[u8]) -> Result<Self, PdfError> {
        let doc = match lopdf::Document::load_mem(data) {
            Ok(doc) => doc,
            // lopdf tries the empty user password while loading and fails
            // when that does not open the file.
            Err(_) if declares_encryption(data) => return Err(PdfError::Encrypted),
            Err(e) => return Err(PdfError::Extraction(e.to_string())),
        };

        if doc.is_encrypted() {
            return Err(PdfError::Encrypted);
        }

        Ok(Self { doc })
    }

    pub fn page_count(&self) -> usize {
        self.doc.get_pages().len()
    }

    /// Read string entries from the trailer's Info dictionary.
    pub fn metadata(&self) -> BTreeMap<String, String> {
        let mut meta = BTreeMap::new();

        let info_ref = match self.doc.trailer.get(b"Info") {
            Ok(obj) => obj,
            Err(_) => return meta,
        };

        let info_dict = match info_ref {
            lopdf::Object::Reference(id) => match self.doc.get_object(*id) {
                Ok(lopdf::Object::Dictionary(d)) => d,
                _ => return meta,
            },
            lopdf::Object::Dictionary(d) => d,
            _ => return meta,
        };

        let keys: &[&[u8]] = &[b"Title", b"Author", b"Creator"];

        for key in keys {
            if let Ok(obj) = info_dict.get(key) {
                let value = match obj {
                    lopdf::Object::String(bytes, _) => decode_text_simple(bytes),
                    lopdf::Object::Name(bytes) => String::from_utf8_lossy(bytes).into_owned(),
                    _ => continue,
                };
                meta.insert(String::from_utf8_lossy(key).into_owned(), value);
            }
        }

        meta
    }

    /// Encoding name declared by a page font (e.g. `"WinAnsiEncoding"`), if any.
    fn font_encoding_name(&self, page: PageId, font_name: &[u8]) -> Option<String> {
        let fonts = self.doc.get_page_fonts(page).ok()?;
        let font_dict = fonts.get(font_name)?;
        let enc_obj = font_dict.get(b"Encoding").ok()?;
        match enc_obj {
            lopdf::Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
            _ => None,
        }
    }
}

impl PdfBackend for LopdfBackend {
    fn pages(&self) -> BTreeMap<u32, PageId> {
        self.doc.get_pages()
    }

    fn page_content(&self, page: PageId) -> Result<Vec<u8>, PdfError> {
        self.doc
            .get_page_content(page)
            .map_err(|e| PdfError::Extraction(format!("cannot get page content: {}", e)))
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>, PdfError> {
        let content = Content::decode(data)
            .map_err(|e| PdfError::Extraction(format!("content stream decode error: {}", e)))?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn decode_text(&self, page: PageId, font_name: &[u8], bytes: &[u8]) -> String {
        // Identity-H / Identity-V fonts use 2-byte CID codes.
        if let Some(enc_name) = self.font_encoding_name(page, font_name) {
            if enc_name.contains("Identity") && bytes.len() >= 2 && bytes.len() % 2 == 0 {
                let code_units: Vec<u16> = bytes
                    .chunks(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                let decoded = String::from_utf16_lossy(&code_units);
                if !decoded.is_empty() && !decoded.chars().all(|c| c == '\u{FFFD}' || c == '\0') {
                    return decoded;
                }
            }
        }

        decode_text_simple(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_text_simple_utf8() {
        assert_eq!(decode_text_simple("Hello, world!".as_bytes()), "Hello, world!");
    }

    #[test]
    fn decode_text_simple_latin1() {
        // 0xE9 is U+00E9 in Latin-1 but not valid standalone UTF-8.
        let input: &[u8] = &[0x63, 0x61, 0x66, 0xE9];
        assert_eq!(decode_text_simple(input), "caf\u{00E9}");
    }

    #[test]
    fn decode_text_simple_utf16be() {
        let input: &[u8] = &[0xFE, 0xFF, 0x00, 0x41, 0x00, 0x42];
        assert_eq!(decode_text_simple(input), "AB");
    }

    #[test]
    fn decode_text_simple_utf16be_odd_trailing_byte() {
        let input: &[u8] = &[0xFE, 0xFF, 0x00, 0x41, 0x00];
        assert_eq!(decode_text_simple(input), "A");
    }

    #[test]
    fn decode_text_simple_empty() {
        assert_eq!(decode_text_simple(&[]), "");
    }

    #[test]
    fn get_number_accepts_integer_and_real() {
        assert_eq!(get_number_from_value(&PdfValue::Integer(-10)), Some(-10.0));
        assert_eq!(get_number_from_value(&PdfValue::Real(2.5)), Some(2.5));
        assert_eq!(get_number_from_value(&PdfValue::Str(b"1".to_vec())), None);
    }

    #[test]
    fn convert_text_operands() {
        assert_eq!(
            convert_object(&lopdf::Object::String(
                b"hello".to_vec(),
                lopdf::StringFormat::Literal,
            )),
            PdfValue::Str(b"hello".to_vec()),
        );
        assert_eq!(
            convert_object(&lopdf::Object::Array(vec![
                lopdf::Object::Integer(1),
                lopdf::Object::Real(2.0),
            ])),
            PdfValue::Array(vec![PdfValue::Integer(1), PdfValue::Real(2.0)]),
        );
    }

    #[test]
    fn convert_reference_is_other() {
        assert_eq!(
            convert_object(&lopdf::Object::Reference((7, 0))),
            PdfValue::Other
        );
    }

    #[test]
    fn declares_encryption_finds_trailer_key() {
        assert!(declares_encryption(b"trailer\n<< /Root 1 0 R /Encrypt 9 0 R >>"));
        assert!(!declares_encryption(b"trailer\n<< /Root 1 0 R >>"));
    }

    #[test]
    fn load_bytes_rejects_garbage_container() {
        let result = LopdfBackend::load_bytes(b"%PDF-1.4\nthis is not a real pdf");
        assert!(matches!(result, Err(PdfError::Extraction(_))));
    }
}
