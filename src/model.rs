use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Doctype {
    Article,
    Book,
}

impl Doctype {
    pub fn is_book(self) -> bool {
        matches!(self, Doctype::Book)
    }
}

/// Document attribute map. An attribute can be absent, set blank, or set to a
/// value; several consumers distinguish all three states.
#[derive(Clone, Debug, Default)]
pub struct AttrMap {
    entries: HashMap<String, String>,
}

impl AttrMap {
    pub fn set(&mut self, name: &str, value: &str) {
        self.entries.insert(name.to_string(), value.to_string());
    }

    pub fn unset(&mut self, name: &str) {
        self.entries.remove(name);
    }

    pub fn is_set(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn is_blank(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|v| v.trim().is_empty())
    }

    pub fn value(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(|v| v.as_str())
    }

    /// Value if set and non-blank.
    pub fn non_blank(&self, name: &str) -> Option<&str> {
        self.entries
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    pub fn int(&self, name: &str) -> Option<i32> {
        self.non_blank(name).and_then(|v| v.parse().ok())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

#[derive(Clone, Debug)]
pub struct Paragraph {
    pub text: String,
    pub font_size: f32,
    pub bold: bool,
    pub italic: bool,
    pub alignment: Alignment,
    pub space_before: f32,
    pub space_after: f32,
}

impl Paragraph {
    pub fn body(text: &str) -> Self {
        Paragraph {
            text: text.to_string(),
            font_size: 10.5,
            bold: false,
            italic: false,
            alignment: Alignment::Left,
            space_before: 0.0,
            space_after: 8.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Figure,
    Table,
    Example,
    Listing,
}

impl EntryKind {
    /// Prefix used when numbering captions ("Figure 3", "Table 1", ...).
    pub fn caption_label(self) -> &'static str {
        match self {
            EntryKind::Figure => "Figure",
            EntryKind::Table => "Table",
            EntryKind::Example => "Example",
            EntryKind::Listing => "Listing",
        }
    }
}

/// A captionable content node: figure, table, example, or listing.
///
/// `caption` is the assigned prefix + ordinal ("Figure 3"); an entry without a
/// caption never received a number. `title` is the author-supplied text shown
/// after the caption. Untitled entries are structural only.
#[derive(Clone, Debug)]
pub struct CaptionedBlock {
    pub kind: EntryKind,
    pub title: Option<String>,
    pub caption: Option<String>,
    pub anchor: Option<String>,
    pub body: Vec<Paragraph>,
    pub blocks: Vec<Block>,
}

impl CaptionedBlock {
    pub fn new(kind: EntryKind) -> Self {
        CaptionedBlock {
            kind,
            title: None,
            caption: None,
            anchor: None,
            body: Vec::new(),
            blocks: Vec::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Section {
    pub title: String,
    /// Formatted number prefix ("1.", "2.3."), empty for unnumbered sections.
    pub number: String,
    pub anchor: Option<String>,
    pub level: usize,
    pub part: bool,
    pub toclevels: Option<i32>,
    /// Physical starting page when pre-assigned (synthetic sections carry the
    /// first page of their extent; body sections get theirs recorded during
    /// layout).
    pub start_page: Option<usize>,
    pub blocks: Vec<Block>,
}

impl Section {
    pub fn new(level: usize, title: &str) -> Self {
        Section {
            title: title.to_string(),
            number: String::new(),
            anchor: None,
            level,
            part: false,
            toclevels: None,
            start_page: None,
            blocks: Vec::new(),
        }
    }

    /// Number-prefixed display title for lists and bookmarks.
    pub fn numbered_title(&self) -> String {
        if self.number.is_empty() {
            self.title.clone()
        } else {
            format!("{} {}", self.number, self.title)
        }
    }
}

#[derive(Clone, Debug)]
pub enum Block {
    Section(Section),
    Paragraph(Paragraph),
    Captioned(CaptionedBlock),
    /// Explicit in-document ToC position (toc-placement=macro).
    TocMacro,
    /// Transcluded sub-document; captioned content inside it is captured too.
    SubDocument(Box<Document>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Recto,
    Verso,
}

#[derive(Clone, Debug)]
pub enum ColumnContent {
    None,
    /// Template text; placeholders: {page-number}, {page-count},
    /// {document-title}, {part-title}, {chapter-title}, {section-title}.
    Text(String),
    Image {
        path: PathBuf,
        alt: String,
        height: f32,
    },
}

#[derive(Clone, Debug)]
pub struct PeripheryColumns {
    pub left: ColumnContent,
    pub center: ColumnContent,
    pub right: ColumnContent,
    pub column_rule: bool,
}

impl PeripheryColumns {
    pub fn none() -> Self {
        PeripheryColumns {
            left: ColumnContent::None,
            center: ColumnContent::None,
            right: ColumnContent::None,
            column_rule: false,
        }
    }
}

/// Header/footer column layout per side. `None` disables that periphery on
/// that side entirely.
#[derive(Clone, Debug)]
pub struct RunningContentConfig {
    pub header_recto: Option<PeripheryColumns>,
    pub header_verso: Option<PeripheryColumns>,
    pub footer_recto: Option<PeripheryColumns>,
    pub footer_verso: Option<PeripheryColumns>,
}

impl RunningContentConfig {
    /// Default layout: no header; footer with the page number on the outer
    /// edge and the current chapter (book) or section (article) title on the
    /// inner edge.
    pub fn default_for(doctype: Doctype) -> Self {
        let title_field = if doctype.is_book() {
            "{chapter-title}"
        } else {
            "{section-title}"
        };
        RunningContentConfig {
            header_recto: None,
            header_verso: None,
            footer_recto: Some(PeripheryColumns {
                left: ColumnContent::Text(title_field.to_string()),
                center: ColumnContent::None,
                right: ColumnContent::Text("{page-number}".to_string()),
                column_rule: false,
            }),
            footer_verso: Some(PeripheryColumns {
                left: ColumnContent::Text("{page-number}".to_string()),
                center: ColumnContent::None,
                right: ColumnContent::Text(title_field.to_string()),
                column_rule: false,
            }),
        }
    }

    pub fn disabled() -> Self {
        RunningContentConfig {
            header_recto: None,
            header_verso: None,
            footer_recto: None,
            footer_verso: None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub header_margin: f32,
    pub footer_margin: f32,
}

impl Default for PageGeometry {
    fn default() -> Self {
        // US Letter, 1in body margins, peripheries at 0.5in.
        PageGeometry {
            page_width: 612.0,
            page_height: 792.0,
            margin_top: 72.0,
            margin_bottom: 72.0,
            margin_left: 72.0,
            margin_right: 72.0,
            header_margin: 36.0,
            footer_margin: 36.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Document {
    pub doctype: Doctype,
    pub title: String,
    pub author: Option<String>,
    pub attrs: AttrMap,
    pub geometry: PageGeometry,
    pub running: RunningContentConfig,
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(doctype: Doctype, title: &str) -> Self {
        Document {
            doctype,
            title: title.to_string(),
            author: None,
            attrs: AttrMap::default(),
            geometry: PageGeometry::default(),
            running: RunningContentConfig::default_for(doctype),
            blocks: Vec::new(),
        }
    }

    /// Index of the explicit ToC macro among the top-level blocks, if the
    /// document placed one.
    pub fn toc_macro_index(&self) -> Option<usize> {
        self.blocks
            .iter()
            .position(|b| matches!(b, Block::TocMacro))
    }

    pub fn insert_block(&mut self, index: usize, block: Block) {
        let index = index.min(self.blocks.len());
        self.blocks.insert(index, block);
    }

    /// Remove the first top-level section with the given anchor. Used to tear
    /// down inserted placeholder sections after the bookmark build.
    pub fn remove_section_by_anchor(&mut self, anchor: &str) -> Option<Section> {
        let idx = self.blocks.iter().position(|b| {
            matches!(b, Block::Section(s) if s.anchor.as_deref() == Some(anchor))
        })?;
        match self.blocks.remove(idx) {
            Block::Section(s) => Some(s),
            _ => unreachable!(),
        }
    }

    /// Effective structural recursion depth for contents listings.
    pub fn toclevels(&self) -> i32 {
        self.attrs.int("toclevels").unwrap_or(2)
    }
}
