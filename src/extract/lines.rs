/// A trimmed, non-empty OCR line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Position among the kept lines; lookahead uses `position + 1`
    pub position: usize,
    /// Zero-based line number in the raw OCR text
    pub source_line: usize,
    pub text: String,
}

/// Splits raw OCR output into trimmed lines, dropping blank ones.
pub fn normalize_lines(raw: &str) -> Vec<Line> {
    raw.lines()
        .enumerate()
        .map(|(source_line, text)| (source_line, text.trim()))
        .filter(|(_, text)| !text.is_empty())
        .enumerate()
        .map(|(position, (source_line, text))| Line {
            position,
            source_line,
            text: text.to_string(),
        })
        .collect()
}
