use pdf_writer::{Name, Pdf, Ref};

pub(crate) struct FontEntry {
    pub(crate) pdf_name: String,
    pub(crate) font_ref: Ref,
    pub(crate) widths_1000: Vec<f32>,
}

impl FontEntry {
    /// Width of a single character in 1000-units via the WinAnsi table.
    pub(crate) fn char_width_1000(&self, ch: char) -> f32 {
        let byte = char_to_winansi(ch);
        if byte >= 32 {
            self.widths_1000[(byte - 32) as usize]
        } else {
            0.0
        }
    }

    pub(crate) fn text_width(&self, text: &str, font_size: f32) -> f32 {
        text.chars()
            .map(|ch| self.char_width_1000(ch) * font_size / 1000.0)
            .sum()
    }

    pub(crate) fn space_width(&self, font_size: f32) -> f32 {
        self.char_width_1000(' ') * font_size / 1000.0
    }
}

/// The registered text faces. All output text uses the base-14 Helvetica
/// family, so no font programs are embedded and widths come from the
/// built-in table.
pub(crate) struct Fonts {
    pub(crate) regular: FontEntry,
    pub(crate) bold: FontEntry,
    pub(crate) oblique: FontEntry,
}

impl Fonts {
    pub(crate) fn entries(&self) -> [&FontEntry; 3] {
        [&self.regular, &self.bold, &self.oblique]
    }

    pub(crate) fn select(&self, bold: bool, italic: bool) -> &FontEntry {
        match (bold, italic) {
            (true, _) => &self.bold,
            (false, true) => &self.oblique,
            (false, false) => &self.regular,
        }
    }
}

fn register_face(pdf: &mut Pdf, font_ref: Ref, base_font: &[u8], pdf_name: &str) -> FontEntry {
    pdf.type1_font(font_ref)
        .base_font(Name(base_font))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    FontEntry {
        pdf_name: pdf_name.to_string(),
        font_ref,
        widths_1000: helvetica_widths(),
    }
}

pub(crate) fn register_fonts(pdf: &mut Pdf, alloc: &mut impl FnMut() -> Ref) -> Fonts {
    let regular = register_face(pdf, alloc(), b"Helvetica", "F1");
    let bold = register_face(pdf, alloc(), b"Helvetica-Bold", "F2");
    let oblique = register_face(pdf, alloc(), b"Helvetica-Oblique", "F3");
    Fonts {
        regular,
        bold,
        oblique,
    }
}

/// Map a single Unicode char to its WinAnsi byte, or 0 if unmappable.
pub(crate) fn char_to_winansi(c: char) -> u8 {
    match c as u32 {
        0x0020..=0x007F => c as u8,
        0x00A0..=0x00FF => c as u8,
        0x20AC => 0x80,
        0x201A => 0x82,
        0x0192 => 0x83,
        0x201E => 0x84,
        0x2026 => 0x85,
        0x2020 => 0x86,
        0x2021 => 0x87,
        0x02C6 => 0x88,
        0x2030 => 0x89,
        0x0160 => 0x8A,
        0x2039 => 0x8B,
        0x0152 => 0x8C,
        0x017D => 0x8E,
        0x2018 => 0x91,
        0x2019 => 0x92,
        0x201C => 0x93,
        0x201D => 0x94,
        0x2022 => 0x95,
        0x2013 => 0x96,
        0x2014 => 0x97,
        0x02DC => 0x98,
        0x2122 => 0x99,
        0x0161 => 0x9A,
        0x203A => 0x9B,
        0x0153 => 0x9C,
        0x017E => 0x9E,
        0x0178 => 0x9F,
        _ => 0,
    }
}

/// Convert a UTF-8 string to WinAnsi (Windows-1252) bytes for PDF Str
/// encoding. Unmappable chars are dropped.
pub(crate) fn to_winansi_bytes(s: &str) -> Vec<u8> {
    s.chars()
        .map(char_to_winansi)
        .filter(|&b| b != 0)
        .collect()
}

/// Approximate Helvetica widths at 1000 units/em for WinAnsi chars 32..=255.
fn helvetica_widths() -> Vec<f32> {
    (32u8..=255u8)
        .map(|b| match b {
            32 => 278.0,                          // space
            33..=47 => 333.0,                     // punctuation
            48..=57 => 556.0,                     // digits
            58..=64 => 333.0,                     // more punctuation
            73 | 74 => 278.0,                     // I J (narrow uppercase)
            77 => 833.0,                          // M (wide)
            65..=90 => 667.0,                     // uppercase A-Z (average)
            91..=96 => 333.0,                     // brackets etc.
            102 | 105 | 106 | 108 | 116 => 278.0, // narrow lowercase: f i j l t
            109 | 119 => 833.0,                   // m w (wide)
            97..=122 => 556.0,                    // lowercase a-z (average)
            _ => 556.0,
        })
        .collect()
}

/// Width-table-only font set for layout tests; no PDF objects are written.
#[cfg(test)]
pub(crate) fn test_fonts() -> Fonts {
    let entry = |name: &str, id: i32| FontEntry {
        pdf_name: name.to_string(),
        font_ref: Ref::new(id),
        widths_1000: helvetica_widths(),
    };
    Fonts {
        regular: entry("F1", 901),
        bold: entry("F2", 902),
        oblique: entry("F3", 903),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winansi_remaps_punctuation_range() {
        assert_eq!(char_to_winansi('\u{2019}'), 0x92);
        assert_eq!(char_to_winansi('\u{2013}'), 0x96);
        assert_eq!(char_to_winansi('A'), b'A');
        assert_eq!(char_to_winansi('\u{0400}'), 0);
    }

    #[test]
    fn unmappable_chars_are_dropped() {
        assert_eq!(to_winansi_bytes("a\u{0400}b"), vec![b'a', b'b']);
    }

    #[test]
    fn digit_widths_are_uniform() {
        let widths = helvetica_widths();
        for d in b'0'..=b'9' {
            assert_eq!(widths[(d - 32) as usize], 556.0);
        }
    }
}
