// Minimal paginated PDF writer for text reports.
//
// Layout follows an A4 page in millimetres: title at (20, 20), body from
// (20, 40) wrapped to 170 mm, continuation pages start at the top margin.
// Only the standard Helvetica fonts are used, so text is limited to what
// WinAnsiEncoding can show.

use chrono::{DateTime, Local};

const PAGE_WIDTH: f64 = 595.28;
const PAGE_HEIGHT: f64 = 841.89;
const PT_PER_MM: f64 = 72.0 / 25.4;

const LEFT_MM: f64 = 20.0;
const TITLE_TOP_MM: f64 = 20.0;
const BODY_TOP_MM: f64 = 40.0;
const CONTINUATION_TOP_MM: f64 = 20.0;
const BOTTOM_MM: f64 = 20.0;

const TITLE_SIZE: f64 = 16.0;
const BODY_SIZE: f64 = 12.0;
const LINE_HEIGHT: f64 = BODY_SIZE * 1.15;

/// Printable width of the body column.
pub const BODY_WIDTH_MM: f64 = 170.0;

// Helvetica advance widths for ' '..='~', in 1/1000 em (Adobe AFM).
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

/// Width of `c` in 1/1000 em. Characters the writer drops have no width;
/// Latin-1 letters are approximated by a digit's advance.
fn glyph_units(c: char) -> u32 {
    match c {
        ' '..='~' => u32::from(HELVETICA_WIDTHS[c as usize - 0x20]),
        '\u{a0}'..='\u{ff}' => 556,
        _ => 0,
    }
}

fn units(text: &str) -> u32 {
    text.chars().map(glyph_units).sum()
}

/// Rendered width of `text` in points at font `size`.
pub fn text_width(text: &str, size: f64) -> f64 {
    f64::from(units(text)) * size / 1000.0
}

/// Splits a word wider than `budget` units into pieces that fit. Every
/// piece holds at least one character.
fn split_word(word: &str, budget: u32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut piece = String::new();
    let mut width = 0;
    for c in word.chars() {
        let w = glyph_units(c);
        if !piece.is_empty() && width + w > budget {
            pieces.push(std::mem::take(&mut piece));
            width = 0;
        }
        piece.push(c);
        width += w;
    }
    pieces.push(piece);
    pieces
}

/// Greedy word wrap by Helvetica advance widths so no line is wider than
/// `max_width` points at font `size`. Blank lines are kept, words wider
/// than a line are split.
pub fn wrap(text: &str, max_width: f64, size: f64) -> Vec<String> {
    let budget = ((max_width * 1000.0 / size).floor() as u32).max(1);
    let space = glyph_units(' ');
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_width = 0;
        for word in paragraph.split_whitespace() {
            let mut word = word.to_string();
            let mut word_width = units(&word);
            if word_width > budget {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                let mut pieces = split_word(&word, budget);
                word = pieces.pop().unwrap_or_default();
                word_width = units(&word);
                lines.extend(pieces);
            }

            if !current.is_empty() && current_width + space + word_width > budget {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_width += space;
            }
            current.push_str(&word);
            current_width += word_width;
        }
        lines.push(current);
    }

    lines
}

pub fn paginate(lines: Vec<String>) -> Vec<Vec<String>> {
    let mut pages = Vec::new();
    let mut remaining = lines.into_iter().peekable();
    let mut capacity = first_page_capacity();

    loop {
        let page: Vec<String> = remaining.by_ref().take(capacity).collect();
        pages.push(page);
        if remaining.peek().is_none() {
            break;
        }
        capacity = continuation_page_capacity();
    }

    pages
}

/// PDF string literal body for `text`. Characters outside Latin-1 (emoji,
/// variation selectors) are dropped.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = false;
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' ' if last_space => continue,
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => out.push_str(&format!("\\{:03o}", c as u32)),
            _ => continue,
        }
        last_space = c == ' ';
    }
    out
}

fn y_from_top(mm: f64) -> f64 {
    PAGE_HEIGHT - mm * PT_PER_MM
}

fn page_content(title: Option<&str>, lines: &[String], top_mm: f64) -> String {
    let x = LEFT_MM * PT_PER_MM;
    let mut content = String::new();

    if let Some(title) = title {
        content.push_str(&format!(
            "BT /F2 {} Tf {:.2} {:.2} Td ({}) Tj ET\n",
            TITLE_SIZE,
            x,
            y_from_top(TITLE_TOP_MM),
            escape(title)
        ));
    }

    content.push_str(&format!(
        "BT /F1 {} Tf {:.2} TL {:.2} {:.2} Td\n",
        BODY_SIZE,
        LINE_HEIGHT,
        x,
        y_from_top(top_mm)
    ));
    for line in lines {
        content.push_str(&format!("({}) Tj T*\n", escape(line)));
    }
    content.push_str("ET\n");
    content
}

struct Writer {
    out: Vec<u8>,
    offsets: Vec<usize>,
}

impl Writer {
    fn object(&mut self, body: &str) {
        self.offsets.push(self.out.len());
        let id = self.offsets.len();
        self.out
            .extend_from_slice(format!("{} 0 obj\n{}\nendobj\n", id, body).as_bytes());
    }
}

/// Renders `title` and the wrapped `body` into a complete PDF file.
pub fn render(title: &str, body: &str, generated_at: DateTime<Local>) -> Vec<u8> {
    let pages = paginate(wrap(body, BODY_WIDTH_MM * PT_PER_MM, BODY_SIZE));
    let page_ids: Vec<usize> = (0..pages.len()).map(|i| 6 + i * 2).collect();

    let mut writer = Writer {
        out: b"%PDF-1.4\n".to_vec(),
        offsets: Vec::new(),
    };

    writer.object("<< /Type /Catalog /Pages 2 0 R >>");
    writer.object(&format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        page_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" "),
        pages.len()
    ));
    writer.object("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>");
    writer.object(
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    );
    writer.object(&format!(
        "<< /Title ({}) /Producer (PhishLens) /CreationDate (D:{}) >>",
        escape(title),
        generated_at.format("%Y%m%d%H%M%S")
    ));

    for (index, lines) in pages.iter().enumerate() {
        let (page_title, top) = if index == 0 {
            (Some(title), BODY_TOP_MM)
        } else {
            (None, CONTINUATION_TOP_MM)
        };
        let content = page_content(page_title, lines, top);

        writer.object(&format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
             /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> /Contents {} 0 R >>",
            PAGE_WIDTH,
            PAGE_HEIGHT,
            page_ids[index] + 1
        ));
        writer.object(&format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ));
    }

    let xref_offset = writer.out.len();
    let count = writer.offsets.len() + 1;
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", count);
    for offset in &writer.offsets {
        xref.push_str(&format!("{:010} 00000 n \n", offset));
    }
    xref.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
        count, xref_offset
    ));
    writer.out.extend_from_slice(xref.as_bytes());
    writer.out
}
