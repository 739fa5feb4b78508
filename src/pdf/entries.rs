use crate::model::{Block, CaptionedBlock, Document, EntryKind};

/// One captured content node, flattened out of the document tree.
///
/// `nesting_level` is normalized to 2 so captioned content renders at a
/// fixed indent regardless of how deep the node sat in the tree.
#[derive(Clone, Debug)]
pub(super) struct CapturedEntry {
    pub(super) title: Option<String>,
    pub(super) caption: Option<String>,
    pub(super) anchor: Option<String>,
    pub(super) nesting_level: usize,
    pub(super) containing_doc: String,
}

/// Ordered traversal collecting every captioned node of one kind across the
/// whole tree, including transcluded sub-documents.
pub(super) struct EntryFilter;

impl EntryFilter {
    pub(super) fn collect(doc: &Document, kind: EntryKind) -> Vec<CapturedEntry> {
        let mut out = Vec::new();
        Self::walk(&doc.blocks, kind, &doc.title, &mut out);
        out
    }

    fn walk(blocks: &[Block], kind: EntryKind, doc_title: &str, out: &mut Vec<CapturedEntry>) {
        for block in blocks {
            match block {
                Block::Section(sect) => Self::walk(&sect.blocks, kind, doc_title, out),
                Block::Captioned(cb) => {
                    if cb.kind == kind {
                        out.push(Self::capture(cb, doc_title));
                    }
                    Self::walk(&cb.blocks, kind, doc_title, out);
                }
                Block::SubDocument(sub) => Self::walk(&sub.blocks, kind, &sub.title, out),
                Block::Paragraph(_) | Block::TocMacro => {}
            }
        }
    }

    fn capture(cb: &CaptionedBlock, doc_title: &str) -> CapturedEntry {
        // Untitled figures, tables and listings stay structurally meaningful,
        // so an absent title becomes an empty string and downstream presence
        // checks stay uniform. Examples keep a bare None.
        let title = match cb.kind {
            EntryKind::Example => cb.title.clone(),
            _ => Some(cb.title.clone().unwrap_or_default()),
        };
        CapturedEntry {
            title,
            caption: cb.caption.clone(),
            anchor: cb.anchor.clone(),
            nesting_level: 2,
            containing_doc: doc_title.to_string(),
        }
    }
}

impl CapturedEntry {
    /// Display text for the list line: caption prefix plus title.
    pub(super) fn display_title(&self) -> Option<String> {
        let caption = self.caption.as_deref()?;
        let title = self.title.as_deref().unwrap_or("").trim();
        if title.is_empty() {
            return None;
        }
        Some(format!("{}. {}", caption, title))
    }
}
