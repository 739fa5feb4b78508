use pdf_writer::{Content, Name, Rect, Str};

use crate::fonts::{to_winansi_bytes, FontEntry, Fonts};
use crate::model::{Alignment, Paragraph};

use super::surface::Surface;

/// Baseline-to-baseline distance as a multiple of the font size.
const LINE_FACTOR: f32 = 1.3;
/// Ascender fraction used to place the first baseline below the cursor.
const ASCENT: f32 = 0.75;

pub(super) fn line_height(font_size: f32) -> f32 {
    font_size * LINE_FACTOR
}

pub(super) fn heading_size(level: usize) -> f32 {
    match level {
        0 => 24.0,
        1 => 20.0,
        2 => 17.0,
        3 => 14.0,
        _ => 12.0,
    }
}

/// Greedy word wrap against the WinAnsi width table. A single word wider
/// than `max_width` gets its own line rather than being broken.
pub(super) fn wrap_text(
    font: &FontEntry,
    text: &str,
    font_size: f32,
    max_width: f32,
) -> Vec<String> {
    let space_w = font.space_width(font_size);
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();
    let mut line_w = 0.0f32;
    for word in text.split_whitespace() {
        let word_w = font.text_width(word, font_size);
        if line.is_empty() {
            line.push_str(word);
            line_w = word_w;
        } else if line_w + space_w + word_w > max_width {
            lines.push(std::mem::take(&mut line));
            line.push_str(word);
            line_w = word_w;
        } else {
            line.push(' ');
            line.push_str(word);
            line_w += space_w + word_w;
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Emit one already-measured line of text at an absolute position.
pub(super) fn show_line(
    content: &mut Content,
    font: &FontEntry,
    font_size: f32,
    x: f32,
    baseline: f32,
    text: &str,
) {
    let bytes = to_winansi_bytes(text);
    if bytes.is_empty() {
        return;
    }
    content.begin_text();
    content.set_font(Name(font.pdf_name.as_bytes()), font_size);
    content.next_line(x, baseline);
    content.show(Str(&bytes));
    content.end_text();
}

/// Draw a single line at the cursor and advance past it. Returns the
/// baseline y used.
fn draw_line_at_cursor(
    surface: &mut Surface,
    font: &FontEntry,
    font_size: f32,
    x: f32,
    text: &str,
) -> f32 {
    let lh = line_height(font_size);
    surface.ensure_room(lh);
    let baseline = surface.cursor() - font_size * ASCENT;
    show_line(surface.content_mut(), font, font_size, x, baseline, text);
    surface.set_cursor(surface.cursor() - lh);
    baseline
}

pub(super) fn render_paragraph(surface: &mut Surface, fonts: &Fonts, para: &Paragraph) {
    let font = fonts.select(para.bold, para.italic);
    let fs = para.font_size;
    if para.space_before > 0.0 && surface.cursor() < surface.top() {
        surface.set_cursor(surface.cursor() - para.space_before);
    }
    let max_width = surface.content_width();
    let left = surface.geom.margin_left;
    for line in wrap_text(font, &para.text, fs, max_width) {
        let x = match para.alignment {
            Alignment::Left => left,
            Alignment::Center => left + (max_width - font.text_width(&line, fs)) / 2.0,
            Alignment::Right => left + max_width - font.text_width(&line, fs),
        };
        draw_line_at_cursor(surface, font, fs, x, &line);
    }
    surface.set_cursor(surface.cursor() - para.space_after);
}

/// Heading with optional destination anchor registered at the heading's top
/// edge. Keeps at least one body line on the same page. Returns the physical
/// page the heading landed on.
pub(super) fn render_heading(
    surface: &mut Surface,
    fonts: &Fonts,
    text: &str,
    level: usize,
    anchor: Option<&str>,
) -> usize {
    let fs = heading_size(level);
    let lh = line_height(fs);
    surface.ensure_room(lh + line_height(10.5));
    if surface.cursor() < surface.top() {
        surface.set_cursor(surface.cursor() - fs * 0.6);
    }
    let page = surface.current_page();
    if let Some(a) = anchor {
        let y = surface.cursor();
        surface.register_destination(a, y);
    }
    let left = surface.geom.margin_left;
    let max_width = surface.content_width();
    for line in wrap_text(&fonts.bold, text, fs, max_width) {
        draw_line_at_cursor(surface, &fonts.bold, fs, left, &line);
    }
    surface.set_cursor(surface.cursor() - fs * 0.5);
    page
}

pub(super) fn render_centered_line(
    surface: &mut Surface,
    font: &FontEntry,
    font_size: f32,
    text: &str,
) {
    let left = surface.geom.margin_left;
    let x = left + (surface.content_width() - font.text_width(text, font_size)) / 2.0;
    draw_line_at_cursor(surface, font, font_size, x, text);
}

/// Leader glyphs that fit in `gap`, floor division, never negative.
pub(super) fn leader_fill_count(gap: f32, glyph_width: f32) -> usize {
    if glyph_width <= 0.0 || gap <= 0.0 {
        0
    } else {
        (gap / glyph_width).floor() as usize
    }
}

/// Shared styling for contents-list entry lines, computed once per list.
pub(super) struct EntryLineStyle {
    pub(super) font_size: f32,
    pub(super) leader: Option<char>,
    /// Width reserved for the widest expected page-number label, so the
    /// title wrap is identical whether the label is resolved or still "?".
    pub(super) number_width: f32,
}

/// One list entry: indented title, optional dot-leader run, right-aligned
/// page label carrying a link to `link_anchor`.
pub(super) fn render_entry_line(
    surface: &mut Surface,
    fonts: &Fonts,
    indent: f32,
    title: &str,
    page_label: &str,
    style: &EntryLineStyle,
    link_anchor: Option<&str>,
) {
    let font = &fonts.regular;
    let fs = style.font_size;
    let left = surface.geom.margin_left + indent;
    let right = surface.geom.page_width - surface.geom.margin_right;
    let spacer = font.space_width(fs);
    let title_max = right - left - style.number_width - spacer * 2.0;

    let lines = wrap_text(font, title, fs, title_max);
    let (last, head) = match lines.split_last() {
        Some((last, head)) => (last.as_str(), head),
        None => ("", &[][..]),
    };
    for line in head {
        draw_line_at_cursor(surface, font, fs, left, line);
    }

    let lh = line_height(fs);
    surface.ensure_room(lh);
    let baseline = surface.cursor() - fs * ASCENT;
    let label_w = font.text_width(page_label, fs);
    let number_x = right - label_w;
    let title_w = font.text_width(last, fs);
    show_line(surface.content_mut(), font, fs, left, baseline, last);

    if let Some(glyph) = style.leader {
        let glyph_w = font.char_width_1000(glyph) * fs / 1000.0;
        let gap = (number_x - spacer) - (left + title_w + spacer);
        let count = leader_fill_count(gap, glyph_w);
        if count > 0 {
            let fill: String = std::iter::repeat_n(glyph, count).collect();
            let fill_x = number_x - spacer - glyph_w * count as f32;
            show_line(surface.content_mut(), font, fs, fill_x, baseline, &fill);
        }
    }
    show_line(surface.content_mut(), font, fs, number_x, baseline, page_label);

    if let Some(anchor) = link_anchor {
        let rect = Rect::new(
            number_x - 1.0,
            baseline - fs * 0.25,
            right + 1.0,
            baseline + fs,
        );
        surface.add_link(rect, anchor);
    }
    surface.set_cursor(surface.cursor() - lh);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leader_count_never_negative() {
        assert_eq!(leader_fill_count(-10.0, 2.8), 0);
        assert_eq!(leader_fill_count(10.0, 0.0), 0);
        assert_eq!(leader_fill_count(10.0, 3.0), 3);
        assert_eq!(leader_fill_count(9.0, 3.0), 3);
        assert_eq!(leader_fill_count(8.9, 3.0), 2);
    }

    #[test]
    fn wrap_keeps_overlong_word_on_own_line() {
        let font = FontEntry {
            pdf_name: "F1".to_string(),
            font_ref: pdf_writer::Ref::new(1),
            widths_1000: (32u8..=255).map(|_| 500.0).collect(),
        };
        // 500/1000 * 10pt = 5pt per char, 40pt max = 8 chars per line
        let lines = wrap_text(&font, "a bb incomprehensible cc", 10.0, 40.0);
        assert_eq!(lines, vec!["a bb", "incomprehensible", "cc"]);
    }
}
