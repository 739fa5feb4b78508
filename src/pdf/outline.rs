use std::collections::HashMap;

use pdf_writer::writers::Catalog;
use pdf_writer::{Name, Pdf, Ref, TextStr};

use crate::model::{Block, Document, Section};

use super::extent::{ListKind, PageExtent};
use super::surface::Destination;

pub(super) fn roman_upper(n: usize) -> String {
    const VALUES: [(usize, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut n = n;
    let mut out = String::new();
    for (value, glyphs) in VALUES {
        while n >= value {
            out.push_str(glyphs);
            n -= value;
        }
    }
    out
}

pub(super) fn roman_lower(n: usize) -> String {
    roman_upper(n).to_lowercase()
}

/// User-facing label for a physical page. Pages before the body start carry
/// lowercase roman numerals of the physical number; body pages restart at
/// arabic 1. `body_start == 0` means the body position is not known yet, so
/// everything is front matter.
pub(super) fn user_page_label(physical: usize, body_start: usize) -> String {
    if body_start == 0 || physical < body_start {
        roman_lower(physical)
    } else {
        (physical + 1 - body_start).to_string()
    }
}

/// One bookmark node; children nest below it in the reader's panel.
pub(super) struct OutlineNode {
    pub(super) title: String,
    pub(super) anchor: Option<String>,
    pub(super) page: usize,
    pub(super) y: f32,
    pub(super) children: Vec<OutlineNode>,
}

/// Inserts/removes the placeholder sections that represent each generated
/// list and builds the bookmark tree plus catalog navigation entries.
pub(super) struct OutlineSynthesizer;

impl OutlineSynthesizer {
    /// Insert one placeholder section per soon-to-be-allocated list,
    /// immediately after the explicit ToC macro when the document placed
    /// one, otherwise at the front of the tree. Insertion happens before
    /// any dry run so the contents measurement already sees the lines the
    /// committed ink will draw.
    pub(super) fn insert_sections(doc: &mut Document, kinds: &[ListKind]) {
        let mut pos = doc.toc_macro_index().map(|i| i + 1).unwrap_or(0);
        for &kind in kinds {
            let Some(title) = doc.attrs.non_blank(kind.attribute()).map(str::to_string) else {
                continue;
            };
            let mut sect = Section::new(1, &title);
            sect.anchor = Some(kind.anchor().to_string());
            doc.insert_block(pos, Block::Section(sect));
            pos += 1;
        }
    }

    /// Stamp each allocated extent's first page onto its placeholder, once
    /// the allocator has fixed the extents.
    pub(super) fn assign_start_pages(
        doc: &mut Document,
        extents: &HashMap<ListKind, PageExtent>,
    ) {
        for block in &mut doc.blocks {
            let Block::Section(sect) = block else {
                continue;
            };
            let Some(kind) = ListKind::ORDER
                .into_iter()
                .find(|k| sect.anchor.as_deref() == Some(k.anchor()))
            else {
                continue;
            };
            if let Some(extent) = extents.get(&kind) {
                sect.start_page = Some(extent.from.page);
            }
        }
    }

    /// Remove the placeholder sections again. Only called when the merge
    /// attribute carries a value, per the attribute contract.
    pub(super) fn teardown(doc: &mut Document) {
        for kind in ListKind::ORDER {
            doc.remove_section_by_anchor(kind.anchor());
        }
    }

    /// Bookmark tree from the section tree (placeholders included), with a
    /// standalone node appended for any allocated list the walk did not
    /// already cover.
    pub(super) fn build_nodes(
        doc: &Document,
        dests: &HashMap<String, Destination>,
        extents: &HashMap<ListKind, PageExtent>,
        top_y: f32,
    ) -> Vec<OutlineNode> {
        let mut nodes = Vec::new();
        Self::nodes_from_blocks(&doc.blocks, dests, top_y, &mut nodes);
        for kind in ListKind::ORDER {
            let Some(extent) = extents.get(&kind) else {
                continue;
            };
            if Self::contains_anchor(&nodes, kind.anchor()) {
                continue;
            }
            let Some(title) = doc.attrs.non_blank(kind.attribute()) else {
                continue;
            };
            nodes.push(OutlineNode {
                title: title.to_string(),
                anchor: Some(kind.anchor().to_string()),
                page: extent.from.page,
                y: extent.from.cursor,
                children: Vec::new(),
            });
        }
        nodes
    }

    fn contains_anchor(nodes: &[OutlineNode], anchor: &str) -> bool {
        nodes.iter().any(|n| {
            n.anchor.as_deref() == Some(anchor) || Self::contains_anchor(&n.children, anchor)
        })
    }

    fn nodes_from_blocks(
        blocks: &[Block],
        dests: &HashMap<String, Destination>,
        top_y: f32,
        out: &mut Vec<OutlineNode>,
    ) {
        for block in blocks {
            match block {
                Block::Section(sect) => {
                    let resolved = sect
                        .anchor
                        .as_deref()
                        .and_then(|a| dests.get(a))
                        .map(|d| (d.page, d.y))
                        .or_else(|| sect.start_page.map(|p| (p, top_y)));
                    let Some((page, y)) = resolved else {
                        // Unplaced section: no bookmark, but children may
                        // still resolve.
                        Self::nodes_from_blocks(&sect.blocks, dests, top_y, out);
                        continue;
                    };
                    let mut children = Vec::new();
                    Self::nodes_from_blocks(&sect.blocks, dests, top_y, &mut children);
                    out.push(OutlineNode {
                        title: sect.numbered_title(),
                        anchor: sect.anchor.clone(),
                        page,
                        y,
                        children,
                    });
                }
                Block::SubDocument(sub) => {
                    Self::nodes_from_blocks(&sub.blocks, dests, top_y, out)
                }
                _ => {}
            }
        }
    }
}

/// Write the /Outlines dictionary and every item. Returns the root ref.
pub(super) fn write_outline(
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
    nodes: &[OutlineNode],
    page_ids: &[Ref],
) -> Ref {
    let root = alloc();
    if nodes.is_empty() {
        pdf.outline(root);
        return root;
    }
    let (first, last, count) = write_level(pdf, alloc, root, nodes, page_ids);
    pdf.outline(root).first(first).last(last).count(count);
    root
}

fn write_level(
    pdf: &mut Pdf,
    alloc: &mut impl FnMut() -> Ref,
    parent: Ref,
    nodes: &[OutlineNode],
    page_ids: &[Ref],
) -> (Ref, Ref, i32) {
    let ids: Vec<Ref> = nodes.iter().map(|_| alloc()).collect();
    let mut total = nodes.len() as i32;
    for (i, node) in nodes.iter().enumerate() {
        let child_refs = if node.children.is_empty() {
            None
        } else {
            Some(write_level(pdf, alloc, ids[i], &node.children, page_ids))
        };
        let mut item = pdf.outline_item(ids[i]);
        item.title(TextStr(&node.title));
        item.parent(parent);
        if i > 0 {
            item.prev(ids[i - 1]);
        }
        if i + 1 < ids.len() {
            item.next(ids[i + 1]);
        }
        if let Some((first, last, count)) = child_refs {
            item.first(first).last(last).count(count);
            total += count;
        }
        if let Some(&page_ref) = page_ids.get(node.page.saturating_sub(1)) {
            item.dest().page(page_ref).xyz(0.0, node.y + 4.0, None);
        }
    }
    (ids[0], ids[nodes.len() - 1], total)
}

/// /PageLabels number tree: roman front matter from the first page, arabic
/// restarting at the body start. A document whose body starts on page 1
/// degenerates to a single arabic range.
pub(super) fn write_page_labels(catalog: &mut Catalog, body_start_page: usize) {
    let mut labels = catalog.insert(Name(b"PageLabels")).dict();
    let mut nums = labels.insert(Name(b"Nums")).array();
    if body_start_page > 1 {
        nums.item(0);
        nums.push().dict().pair(Name(b"S"), Name(b"r"));
        nums.item(body_start_page as i32 - 1);
        nums.push().dict().pair(Name(b"S"), Name(b"D"));
    } else {
        nums.item(0);
        nums.push().dict().pair(Name(b"S"), Name(b"D"));
    }
}

/// /PageMode from the pdf-page-mode attribute. Fullscreen records where the
/// reader should land when leaving full screen.
pub(super) fn apply_page_mode(catalog: &mut Catalog, value: &str) {
    let mut parts = value.split_whitespace();
    let primary = parts.next().unwrap_or("");
    match primary {
        "none" => {
            catalog.pair(Name(b"PageMode"), Name(b"UseNone"));
        }
        "outline" => {
            catalog.pair(Name(b"PageMode"), Name(b"UseOutlines"));
        }
        "thumbs" => {
            catalog.pair(Name(b"PageMode"), Name(b"UseThumbs"));
        }
        "fullscreen" => {
            catalog.pair(Name(b"PageMode"), Name(b"FullScreen"));
            let secondary = match parts.next() {
                Some("outline") => b"UseOutlines".as_slice(),
                Some("thumbs") => b"UseThumbs".as_slice(),
                _ => b"UseNone".as_slice(),
            };
            catalog.pair(Name(b"NonFullScreenPageMode"), Name(secondary));
        }
        other => {
            log::warn!("unrecognized pdf-page-mode \"{other}\"; catalog left unchanged");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Doctype;

    #[test]
    fn roman_conversion() {
        assert_eq!(roman_lower(1), "i");
        assert_eq!(roman_lower(4), "iv");
        assert_eq!(roman_lower(9), "ix");
        assert_eq!(roman_lower(14), "xiv");
        assert_eq!(roman_lower(38), "xxxviii");
        assert_eq!(roman_upper(1987), "MCMLXXXVII");
    }

    #[test]
    fn page_labels_switch_at_body_start() {
        assert_eq!(user_page_label(1, 5), "i");
        assert_eq!(user_page_label(4, 5), "iv");
        assert_eq!(user_page_label(5, 5), "1");
        assert_eq!(user_page_label(9, 5), "5");
        // body start unknown: everything is front matter
        assert_eq!(user_page_label(3, 0), "iii");
    }

    #[test]
    fn placeholders_insert_after_toc_macro_and_tear_down() {
        use super::super::extent::Position;
        let mut doc = Document::new(Doctype::Book, "T");
        doc.attrs.set("lof-title", "List of Figures");
        doc.blocks.push(Block::Paragraph(
            crate::model::Paragraph::body("preamble"),
        ));
        doc.blocks.push(Block::TocMacro);
        let mut extents = HashMap::new();
        extents.insert(
            ListKind::Figures,
            PageExtent {
                from: Position {
                    page: 2,
                    cursor: 700.0,
                },
                to: Position {
                    page: 2,
                    cursor: 500.0,
                },
            },
        );
        OutlineSynthesizer::insert_sections(&mut doc, &[ListKind::Figures]);
        assert!(matches!(
            &doc.blocks[2],
            Block::Section(s) if s.anchor.as_deref() == Some("_lof") && s.start_page.is_none()
        ));
        OutlineSynthesizer::assign_start_pages(&mut doc, &extents);
        assert!(matches!(
            &doc.blocks[2],
            Block::Section(s) if s.start_page == Some(2)
        ));
        OutlineSynthesizer::teardown(&mut doc);
        assert_eq!(doc.blocks.len(), 2);
    }
}
