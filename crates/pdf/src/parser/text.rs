//! Content-stream text recovery.
//!
//! Walks the text operators of a page in stream order and rebuilds plain
//! lines. Only the baseline position is tracked, to decide where a line ends
//! and whether two runs need a separating space; fonts and geometry are not
//! otherwise interpreted.

use super::backend::{get_number_from_value, ContentOp, PageId, PdfBackend, PdfValue};
use crate::PdfError;

/// Two runs whose baselines differ by less than this share a line.
const Y_TOLERANCE: f32 = 1.0;

/// Approximate glyph width as a fraction of the font size.
const APPROX_CHAR_WIDTH_RATIO: f32 = 0.5;

/// Minimum horizontal gap (text space units) before a space is inserted
/// between runs on the same line.
const MIN_WORD_GAP: f32 = 1.5;

/// The identity 2x3 text matrix: [a, b, c, d, tx, ty].
const IDENTITY_MATRIX: [f32; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

#[derive(Debug, Clone)]
struct TextState {
    font_key: Vec<u8>,
    font_size: f32,
    text_matrix: [f32; 6],
    line_matrix: [f32; 6],
    horiz_scale: f32,
    char_spacing: f32,
    word_spacing: f32,
    leading: f32,
}

impl Default for TextState {
    fn default() -> Self {
        Self {
            font_key: Vec::new(),
            font_size: 0.0,
            text_matrix: IDENTITY_MATRIX,
            line_matrix: IDENTITY_MATRIX,
            horiz_scale: 1.0,
            char_spacing: 0.0,
            word_spacing: 0.0,
            leading: 0.0,
        }
    }
}

impl TextState {
    fn x(&self) -> f32 {
        self.text_matrix[4]
    }

    fn y(&self) -> f32 {
        self.text_matrix[5]
    }

    fn advance_x(&mut self, dx: f32) {
        self.text_matrix[4] += dx * self.text_matrix[0];
        self.text_matrix[5] += dx * self.text_matrix[1];
    }

    /// Multiply the line matrix by a translation (Td / TD / T*).
    fn translate_line(&mut self, tx: f32, ty: f32) {
        let new_tx = self.line_matrix[0] * tx + self.line_matrix[2] * ty + self.line_matrix[4];
        let new_ty = self.line_matrix[1] * tx + self.line_matrix[3] * ty + self.line_matrix[5];
        self.line_matrix[4] = new_tx;
        self.line_matrix[5] = new_ty;
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.translate_line(0.0, -self.leading);
    }

    /// Move past `text` using an approximate per-glyph width.
    fn advance_after_show(&mut self, text: &str) {
        let mut total_dx: f32 = 0.0;
        for ch in text.chars() {
            total_dx +=
                self.font_size * APPROX_CHAR_WIDTH_RATIO * self.horiz_scale + self.char_spacing;
            if ch == ' ' {
                total_dx += self.word_spacing;
            }
        }
        self.advance_x(total_dx);
    }
}

/// Accumulates runs into lines.
#[derive(Debug, Default)]
struct PageTextBuilder {
    lines: Vec<String>,
    current: String,
    last_y: Option<f32>,
    end_x: f32,
}

impl PageTextBuilder {
    fn push(&mut self, text: &str, x: f32, y: f32) {
        match self.last_y {
            Some(prev_y) if (y - prev_y).abs() > Y_TOLERANCE => {
                self.lines.push(std::mem::take(&mut self.current));
            }
            Some(_) => {
                let needs_space = x - self.end_x > MIN_WORD_GAP
                    && !self.current.ends_with(char::is_whitespace)
                    && !text.starts_with(char::is_whitespace);
                if needs_space {
                    self.current.push(' ');
                }
            }
            None => {}
        }
        self.current.push_str(text);
        self.last_y = Some(y);
    }

    fn finish(mut self) -> String {
        if !self.current.is_empty() || !self.lines.is_empty() {
            self.lines.push(self.current);
        }
        self.lines.join("\n")
    }
}

/// Recover the plain text of one page.
///
/// Handles `BT`, `Tf`, `Tm`, `Td`, `TD`, `T*`, `TL`, `Tc`, `Tw`, `Tz`, `Tj`,
/// `TJ`, `'` and `"`. Everything else is ignored.
pub fn extract_page_text(backend: &dyn PdfBackend, page_id: PageId) -> Result<String, PdfError> {
    let raw_content = backend.page_content(page_id)?;
    let ops = backend.decode_content(&raw_content)?;
    Ok(text_from_ops(&ops, backend, page_id))
}

fn text_from_ops(ops: &[ContentOp], backend: &dyn PdfBackend, page_id: PageId) -> String {
    let mut state = TextState::default();
    let mut out = PageTextBuilder::default();

    for op in ops {
        let number = |i: usize| op.operands.get(i).and_then(get_number_from_value);

        match op.operator.as_str() {
            "BT" => {
                state.text_matrix = IDENTITY_MATRIX;
                state.line_matrix = IDENTITY_MATRIX;
            }
            "Tf" => {
                if let Some(PdfValue::Name(key)) = op.operands.first() {
                    state.font_key = key.clone();
                }
                state.font_size = number(1).unwrap_or(state.font_size);
            }
            "Tm" => {
                let vals: Vec<f32> = op
                    .operands
                    .iter()
                    .take(6)
                    .filter_map(get_number_from_value)
                    .collect();
                if vals.len() == 6 {
                    state.text_matrix = [vals[0], vals[1], vals[2], vals[3], vals[4], vals[5]];
                    state.line_matrix = state.text_matrix;
                }
            }
            "Td" => {
                if let (Some(tx), Some(ty)) = (number(0), number(1)) {
                    state.translate_line(tx, ty);
                }
            }
            "TD" => {
                if let (Some(tx), Some(ty)) = (number(0), number(1)) {
                    state.leading = -ty;
                    state.translate_line(tx, ty);
                }
            }
            "T*" => state.next_line(),
            "TL" => state.leading = number(0).unwrap_or(state.leading),
            "Tc" => state.char_spacing = number(0).unwrap_or(state.char_spacing),
            "Tw" => state.word_spacing = number(0).unwrap_or(state.word_spacing),
            "Tz" => {
                if let Some(v) = number(0) {
                    state.horiz_scale = v / 100.0;
                }
            }
            "Tj" => {
                if let Some(operand) = op.operands.first() {
                    show_string(operand, backend, page_id, &mut state, &mut out);
                }
            }
            "TJ" => {
                if let Some(PdfValue::Array(arr)) = op.operands.first() {
                    show_array(arr, backend, page_id, &mut state, &mut out);
                }
            }
            "'" => {
                state.next_line();
                if let Some(operand) = op.operands.first() {
                    show_string(operand, backend, page_id, &mut state, &mut out);
                }
            }
            "\"" => {
                if op.operands.len() >= 3 {
                    state.word_spacing = number(0).unwrap_or(state.word_spacing);
                    state.char_spacing = number(1).unwrap_or(state.char_spacing);
                    state.next_line();
                    show_string(&op.operands[2], backend, page_id, &mut state, &mut out);
                }
            }
            _ => {}
        }
    }

    out.finish()
}

fn decode_operand(
    val: &PdfValue,
    backend: &dyn PdfBackend,
    page_id: PageId,
    font_key: &[u8],
) -> String {
    match val {
        PdfValue::Str(bytes) => backend.decode_text(page_id, font_key, bytes),
        _ => String::new(),
    }
}

fn show_string(
    operand: &PdfValue,
    backend: &dyn PdfBackend,
    page_id: PageId,
    state: &mut TextState,
    out: &mut PageTextBuilder,
) {
    let text = decode_operand(operand, backend, page_id, &state.font_key);
    if text.is_empty() {
        return;
    }
    out.push(&text, state.x(), state.y());
    state.advance_after_show(&text);
    out.end_x = state.x();
}

/// `TJ` arrays mix strings with kerning adjustments in thousandths of a
/// text space unit. Large negative adjustments are word gaps.
fn show_array(
    arr: &[PdfValue],
    backend: &dyn PdfBackend,
    page_id: PageId,
    state: &mut TextState,
    out: &mut PageTextBuilder,
) {
    let start_x = state.x();
    let start_y = state.y();
    let mut buf = String::new();

    for elem in arr {
        match elem {
            PdfValue::Str(_) => {
                let fragment = decode_operand(elem, backend, page_id, &state.font_key);
                buf.push_str(&fragment);
                state.advance_after_show(&fragment);
            }
            val => {
                if let Some(adj) = get_number_from_value(val) {
                    let dx = -adj / 1000.0 * state.font_size * state.horiz_scale;
                    let gap_threshold =
                        state.font_size * APPROX_CHAR_WIDTH_RATIO * state.horiz_scale * 0.3;
                    if dx > gap_threshold && !buf.is_empty() && !buf.ends_with(' ') {
                        buf.push(' ');
                    }
                    state.advance_x(dx);
                }
            }
        }
    }

    let text = buf.trim_end();
    if text.is_empty() {
        return;
    }
    out.push(text, start_x, start_y);
    out.end_x = state.x();
}
