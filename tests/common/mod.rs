use folio_pdf::model::{
    Block, CaptionedBlock, Doctype, Document, EntryKind, Paragraph, Section,
};

pub fn render(doc: &mut Document) -> Vec<u8> {
    folio_pdf::render_document(doc).expect("render failed")
}

pub fn find(haystack: &[u8], needle: &[u8], from: usize) -> Option<usize> {
    if needle.is_empty() || haystack.len() < from + needle.len() {
        return None;
    }
    haystack[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

pub fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    let mut count = 0;
    let mut pos = 0;
    while let Some(i) = find(haystack, needle, pos) {
        count += 1;
        pos = i + needle.len();
    }
    count
}

/// Inflate every FlateDecode stream in the file. Without embedded images the
/// only compressed streams are page contents, so the result is one decoded
/// stream per page, in page order.
pub fn content_streams(pdf: &[u8]) -> Vec<Vec<u8>> {
    let mut streams = Vec::new();
    let mut pos = 0;
    while let Some(start) = find(pdf, b"stream\n", pos) {
        // "endstream" contains "stream"; only accept real stream openers.
        if start >= 3 && &pdf[start - 3..start] == b"end" {
            pos = start + 7;
            continue;
        }
        let data_start = start + 7;
        let Some(end) = find(pdf, b"endstream", data_start) else {
            break;
        };
        let mut data = &pdf[data_start..end];
        if let [rest @ .., b'\n'] = data {
            data = rest;
        }
        if let Ok(decoded) = miniz_oxide::inflate::decompress_to_vec_zlib(data) {
            streams.push(decoded);
        }
        pos = end + 9;
    }
    streams
}

/// Page count from the pages-tree /Count entry.
pub fn page_count(pdf: &[u8]) -> usize {
    let tree = find(pdf, b"/Type /Pages", 0).expect("no pages tree");
    let count_at = find(pdf, b"/Count ", tree).expect("pages tree has no /Count") + 7;
    let digits: String = pdf[count_at..]
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .map(|&b| b as char)
        .collect();
    digits.parse().expect("unparseable /Count")
}

/// Occurrences of `text` as a literal string across all page content
/// streams. Text must not contain characters PDF strings escape.
pub fn shown_count(pdf: &[u8], text: &str) -> usize {
    assert!(!text.contains(['(', ')', '\\']));
    let needle = format!("({text})").into_bytes();
    content_streams(pdf)
        .iter()
        .map(|s| count_occurrences(s, &needle))
        .sum()
}

pub fn shown_on_page(pdf: &[u8], page: usize, text: &str) -> bool {
    let needle = format!("({text})").into_bytes();
    let streams = content_streams(pdf);
    find(&streams[page - 1], &needle, 0).is_some()
}

pub fn has_bookmark(pdf: &[u8], title: &str) -> bool {
    let needle = format!("/Title ({title})").into_bytes();
    find(pdf, &needle, 0).is_some()
}

pub fn figure(caption: &str, title: Option<&str>, anchor: &str) -> Block {
    captioned(EntryKind::Figure, caption, title, anchor)
}

pub fn captioned(kind: EntryKind, caption: &str, title: Option<&str>, anchor: &str) -> Block {
    let mut cb = CaptionedBlock::new(kind);
    cb.caption = Some(caption.to_string());
    cb.title = title.map(str::to_string);
    cb.anchor = Some(anchor.to_string());
    cb.body.push(Paragraph::body("exhibit body"));
    Block::Captioned(cb)
}

pub fn section(level: usize, number: &str, title: &str, anchor: &str) -> Section {
    let mut sect = Section::new(level, title);
    sect.number = number.to_string();
    sect.anchor = Some(anchor.to_string());
    sect
}

/// Article with one section holding two titled figures, LoF enabled.
pub fn article_with_two_figures() -> Document {
    let mut doc = Document::new(Doctype::Article, "Field Notes");
    doc.attrs.set("lof-title", "List of Figures");
    doc.attrs.set("outline", "");
    let mut sect = section(1, "1.", "Observations", "_observations");
    sect.blocks
        .push(Block::Paragraph(Paragraph::body("Opening remarks.")));
    sect.blocks
        .push(figure("Figure 1", Some("Alpha plot"), "fig-alpha"));
    sect.blocks
        .push(figure("Figure 2", Some("Beta plot"), "fig-beta"));
    doc.blocks.push(Block::Section(sect));
    doc
}

/// Book with a contents listing, a figure list, and two chapters.
pub fn book_with_front_matter() -> Document {
    let mut doc = Document::new(Doctype::Book, "The Survey");
    doc.attrs.set("toc-title", "Table of Contents");
    doc.attrs.set("lof-title", "List of Figures");
    doc.attrs.set("outline", "");
    let mut ch1 = section(1, "1.", "Orientation", "_orientation");
    ch1.blocks
        .push(Block::Paragraph(Paragraph::body("Where the survey begins.")));
    ch1.blocks
        .push(figure("Figure 1", Some("Site overview"), "fig-site"));
    let mut ch2 = section(1, "2.", "Findings", "_findings");
    ch2.blocks
        .push(Block::Paragraph(Paragraph::body("What the survey found.")));
    doc.blocks.push(Block::Section(ch1));
    doc.blocks.push(Block::Section(ch2));
    doc
}
