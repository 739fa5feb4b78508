use std::ops::RangeInclusive;

use crate::fonts::Fonts;
use crate::model::{Block, Document};

use super::entries::EntryFilter;
use super::extent::{is_list_anchor, ListKind, PageExtent, Position};
use super::layout::{self, EntryLineStyle};
use super::outline::user_page_label;
use super::surface::Surface;

const LIST_FONT_SIZE: f32 = 10.5;
const LEVEL_INDENT: f32 = 14.0;
const LEADER_GLYPH: char = '.';
/// Widest page-number label the layout reserves room for, so a dry run with
/// unresolved "?" labels wraps titles identically to the committed pass.
const WIDEST_LABEL: &str = "xxxviii";

/// Ink routine shared by all five list kinds; variant behavior comes from
/// the `ListKind` descriptor.
pub(super) struct ListRenderer<'a> {
    pub(super) doc: &'a Document,
    pub(super) fonts: &'a Fonts,
    pub(super) kind: ListKind,
    /// Structural recursion depth; negative disables entry lines entirely.
    pub(super) num_levels: i32,
    /// Physical page where arabic numbering restarts; 0 while unknown
    /// (during front-matter allocation the body has not been laid out yet).
    pub(super) body_start_page: usize,
    /// Contents listing includes the inserted list placeholder sections.
    pub(super) merge_lists: bool,
}

impl ListRenderer<'_> {
    /// Emit the list at `start` and report the physical page range spanned.
    /// On a probe surface output is scratch; the caller reads the probe's
    /// final page/cursor to size the extent.
    pub(super) fn ink(&self, surface: &mut Surface, start: Position) -> RangeInclusive<usize> {
        if !surface.is_probe() && surface.save_position() != (start.page, start.cursor) {
            surface.go_to(start.page, start.cursor);
        }
        if let Some(title) = self.doc.attrs.non_blank(self.kind.attribute()) {
            let title = title.to_string();
            layout::render_heading(surface, self.fonts, &title, 2, Some(self.kind.anchor()));
        }
        if self.num_levels >= 0 {
            let style = EntryLineStyle {
                font_size: LIST_FONT_SIZE,
                leader: Some(LEADER_GLYPH),
                number_width: self
                    .fonts
                    .regular
                    .text_width(WIDEST_LABEL, LIST_FONT_SIZE),
            };
            match self.kind.content_kind() {
                Some(entry_kind) => {
                    for entry in EntryFilter::collect(self.doc, entry_kind) {
                        if entry.nesting_level as i32 > self.num_levels {
                            continue;
                        }
                        let Some(display) = entry.display_title() else {
                            continue;
                        };
                        let Some(anchor) = entry.anchor.as_deref() else {
                            log::warn!(
                                "no anchor for \"{}\" ({}); line skipped",
                                display,
                                entry.containing_doc
                            );
                            continue;
                        };
                        let label = self.resolve_label(surface, anchor);
                        let indent = (entry.nesting_level - 1) as f32 * LEVEL_INDENT;
                        layout::render_entry_line(
                            surface,
                            self.fonts,
                            indent,
                            &display,
                            &label,
                            &style,
                            Some(anchor),
                        );
                    }
                }
                None => self.ink_section_level(surface, &style, &self.doc.blocks, self.num_levels),
            }
        }
        start.page..=surface.current_page()
    }

    /// Recursive contents entries. A section's own `toclevels` overrides the
    /// depth limit for its subtree.
    fn ink_section_level(
        &self,
        surface: &mut Surface,
        style: &EntryLineStyle,
        blocks: &[Block],
        level_limit: i32,
    ) {
        for block in blocks {
            let sect = match block {
                Block::Section(s) => s,
                Block::SubDocument(sub) => {
                    self.ink_section_level(surface, style, &sub.blocks, level_limit);
                    continue;
                }
                _ => continue,
            };
            if sect.level as i32 > level_limit {
                continue;
            }
            let anchor = sect.anchor.as_deref();
            if anchor.is_some_and(is_list_anchor) {
                // A contents listing never lists itself; the other list
                // placeholders only appear in merge mode.
                if !self.merge_lists || anchor == Some(ListKind::Contents.anchor()) {
                    continue;
                }
            }
            let display = sect.numbered_title();
            match sect.anchor.as_deref() {
                Some(anchor) => {
                    let label = self.resolve_label(surface, anchor);
                    let indent = sect.level.saturating_sub(1) as f32 * LEVEL_INDENT;
                    layout::render_entry_line(
                        surface,
                        self.fonts,
                        indent,
                        &display,
                        &label,
                        style,
                        Some(anchor),
                    );
                }
                None => {
                    log::warn!("no anchor for section \"{}\"; line skipped", display);
                }
            }
            let child_limit = sect.toclevels.unwrap_or(level_limit);
            self.ink_section_level(surface, style, &sect.blocks, child_limit);
        }
    }

    fn resolve_label(&self, surface: &Surface, anchor: &str) -> String {
        match surface.dest(anchor) {
            Some(d) => user_page_label(d.page, self.body_start_page),
            None => "?".to_string(),
        }
    }
}

/// Dry-run measurement followed by an extent commit into the real surface.
pub(super) struct TwoPassAllocator;

impl TwoPassAllocator {
    pub(super) fn allocate(
        surface: &mut Surface,
        renderer: &ListRenderer,
        break_after: bool,
    ) -> PageExtent {
        let start = Position {
            page: surface.current_page(),
            cursor: surface.cursor(),
        };

        let mut probe = surface.probe();
        renderer.ink(&mut probe, start);
        let measured = Position {
            page: probe.current_page(),
            cursor: probe.cursor(),
        };

        // A trailing empty ink pass must not under-count pages: extend only
        // when the measured end moved past the provisional page, pinning the
        // cursor to the page bottom.
        let mut extent = PageExtent {
            from: start,
            to: start,
        };
        if measured.page > extent.to.page {
            extent.to = Position {
                page: measured.page,
                cursor: surface.bottom(),
            };
        } else {
            extent.to = measured;
        }
        log::debug!(
            "{:?}: measured {} page(s) at {}..={}",
            renderer.kind,
            extent.page_count(),
            extent.from.page,
            extent.to.page,
        );

        if break_after {
            for _ in extent.page_range() {
                surface.new_page();
            }
        } else {
            for _ in extent.page_range().skip(1) {
                surface.new_page();
            }
            surface.set_cursor(extent.to.cursor);
        }

        // The heading destination is pinned now so the contents listing can
        // resolve later lists before their committed ink runs.
        let saved = surface.save_position();
        surface.go_to(extent.from.page, extent.from.cursor);
        surface.register_destination(renderer.kind.anchor(), extent.from.cursor);
        surface.restore_position(saved);

        extent
    }
}
