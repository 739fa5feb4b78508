use std::ops::RangeInclusive;

use crate::model::{Block, Document, EntryKind};

use super::entries::EntryFilter;

/// A physical page plus the descending baseline cursor on it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Position {
    pub page: usize,
    pub cursor: f32,
}

/// The committed page region of one generated list.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageExtent {
    pub from: Position,
    pub to: Position,
}

impl PageExtent {
    pub fn page_range(&self) -> RangeInclusive<usize> {
        self.from.page..=self.to.page
    }

    pub fn covers(&self, page: usize) -> bool {
        self.page_range().contains(&page)
    }

    pub fn page_count(&self) -> usize {
        self.to.page - self.from.page + 1
    }
}

/// Result of one list stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ListOutcome {
    Suppressed,
    Empty,
    Rendered(PageExtent),
}

/// The five generated lists, allocated in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ListKind {
    Contents,
    Figures,
    Tables,
    Examples,
    Listings,
}

impl ListKind {
    pub const ORDER: [ListKind; 5] = [
        ListKind::Contents,
        ListKind::Figures,
        ListKind::Tables,
        ListKind::Examples,
        ListKind::Listings,
    ];

    /// Document attribute holding the list title; unset or blank suppresses
    /// the list.
    pub fn attribute(self) -> &'static str {
        match self {
            ListKind::Contents => "toc-title",
            ListKind::Figures => "lof-title",
            ListKind::Tables => "lot-title",
            ListKind::Examples => "loe-title",
            ListKind::Listings => "lol-title",
        }
    }

    pub fn anchor(self) -> &'static str {
        match self {
            ListKind::Contents => "_toc",
            ListKind::Figures => "_lof",
            ListKind::Tables => "_lot",
            ListKind::Examples => "_loe",
            ListKind::Listings => "_lol",
        }
    }

    pub fn default_title(self) -> &'static str {
        match self {
            ListKind::Contents => "Table of Contents",
            ListKind::Figures => "List of Figures",
            ListKind::Tables => "List of Tables",
            ListKind::Examples => "List of Examples",
            ListKind::Listings => "List of Listings",
        }
    }

    /// Captured content kind this list collects; `None` for the contents
    /// list, whose entries are structural sections.
    pub fn content_kind(self) -> Option<EntryKind> {
        match self {
            ListKind::Contents => None,
            ListKind::Figures => Some(EntryKind::Figure),
            ListKind::Tables => Some(EntryKind::Table),
            ListKind::Examples => Some(EntryKind::Example),
            ListKind::Listings => Some(EntryKind::Listing),
        }
    }
}

/// True when `anchor` belongs to an inserted list placeholder section.
pub(super) fn is_list_anchor(anchor: &str) -> bool {
    ListKind::ORDER.iter().any(|k| k.anchor() == anchor)
}

fn has_sections(blocks: &[Block]) -> bool {
    blocks.iter().any(|b| match b {
        Block::Section(_) => true,
        Block::SubDocument(d) => has_sections(&d.blocks),
        _ => false,
    })
}

/// The three independent suppression conditions: title attribute unset or
/// blank, no captured content of the kind anywhere, or no captured entry
/// ever received a caption (an ordinal). Any one of them suppresses the
/// list entirely.
pub(super) fn is_suppressed(doc: &Document, kind: ListKind) -> bool {
    if doc.attrs.non_blank(kind.attribute()).is_none() {
        return true;
    }
    match kind.content_kind() {
        Some(entry_kind) => {
            let entries = EntryFilter::collect(doc, entry_kind);
            entries.is_empty() || !entries.iter().any(|e| e.caption.is_some())
        }
        None => !has_sections(&doc.blocks),
    }
}
