use std::collections::HashMap;

use pdf_writer::{Content, Rect};

use crate::model::PageGeometry;

/// A resolved anchor destination: physical page plus baseline y.
#[derive(Clone, Copy, Debug)]
pub(super) struct Destination {
    pub(super) page: usize,
    pub(super) y: f32,
}

/// An internal GoTo link region collected during ink.
pub(super) struct LinkAnnotation {
    pub(super) page: usize,
    pub(super) rect: Rect,
    pub(super) anchor: String,
}

/// Paginated output surface.
///
/// Pages hold raw content streams and the cursor is a descending baseline y.
/// A probe fork shares geometry and the destination registry but writes to
/// scratch pages, so a dry run reports page/cursor deltas without touching
/// the real output.
pub(super) struct Surface {
    pub(super) geom: PageGeometry,
    pages: Vec<Content>,
    current: usize,
    cursor: f32,
    probe: bool,
    /// Physical page number of `pages[0]` (1 for the real surface; probes
    /// inherit the page they were forked on).
    first_physical: usize,
    pub(super) dests: HashMap<String, Destination>,
    pub(super) links: Vec<LinkAnnotation>,
}

impl Surface {
    pub(super) fn new(geom: PageGeometry) -> Self {
        let cursor = geom.page_height - geom.margin_top;
        Surface {
            geom,
            pages: vec![Content::new()],
            current: 0,
            cursor,
            probe: false,
            first_physical: 1,
            dests: HashMap::new(),
            links: Vec::new(),
        }
    }

    /// Fork a measurement surface positioned at the current page/cursor.
    pub(super) fn probe(&self) -> Surface {
        Surface {
            geom: self.geom,
            pages: vec![Content::new()],
            current: 0,
            cursor: self.cursor,
            probe: true,
            first_physical: self.current_page(),
            dests: self.dests.clone(),
            links: Vec::new(),
        }
    }

    pub(super) fn is_probe(&self) -> bool {
        self.probe
    }

    pub(super) fn top(&self) -> f32 {
        self.geom.page_height - self.geom.margin_top
    }

    pub(super) fn bottom(&self) -> f32 {
        self.geom.margin_bottom
    }

    pub(super) fn content_width(&self) -> f32 {
        self.geom.page_width - self.geom.margin_left - self.geom.margin_right
    }

    pub(super) fn cursor(&self) -> f32 {
        self.cursor
    }

    pub(super) fn set_cursor(&mut self, cursor: f32) {
        self.cursor = cursor;
    }

    /// 1-based physical page number of the current page.
    pub(super) fn current_page(&self) -> usize {
        self.first_physical + self.current
    }

    /// Physical number of the last page.
    pub(super) fn last_page(&self) -> usize {
        self.first_physical + self.pages.len() - 1
    }

    pub(super) fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Advance to the next page. When the current page is not the last
    /// (committed ink re-walking a pre-allocated extent), this moves into
    /// the existing page instead of appending.
    pub(super) fn new_page(&mut self) {
        if self.current + 1 < self.pages.len() {
            self.current += 1;
        } else {
            self.pages.push(Content::new());
            self.current = self.pages.len() - 1;
        }
        self.cursor = self.top();
    }

    /// Break to a fresh page if fewer than `height` points remain above the
    /// bottom margin. Returns true if a break happened.
    pub(super) fn ensure_room(&mut self, height: f32) -> bool {
        if self.cursor - height < self.bottom() {
            self.new_page();
            true
        } else {
            false
        }
    }

    /// Move to an already-existing (or newly appended) physical page and set
    /// the cursor. Pages between the current end and `page` are created
    /// blank.
    pub(super) fn go_to(&mut self, page: usize, cursor: f32) {
        debug_assert!(page >= self.first_physical);
        while self.last_page() < page {
            self.pages.push(Content::new());
        }
        self.current = page - self.first_physical;
        self.cursor = cursor;
    }

    pub(super) fn save_position(&self) -> (usize, f32) {
        (self.current_page(), self.cursor)
    }

    pub(super) fn restore_position(&mut self, pos: (usize, f32)) {
        self.go_to(pos.0, pos.1);
    }

    pub(super) fn content_mut(&mut self) -> &mut Content {
        &mut self.pages[self.current]
    }

    /// Content stream of an arbitrary physical page, for the stamping pass.
    pub(super) fn page_content_mut(&mut self, page: usize) -> &mut Content {
        &mut self.pages[page - self.first_physical]
    }

    /// Record a named destination at the current page/cursor.
    pub(super) fn register_destination(&mut self, anchor: &str, y: f32) {
        self.dests.insert(
            anchor.to_string(),
            Destination {
                page: self.current_page(),
                y,
            },
        );
    }

    pub(super) fn dest(&self, anchor: &str) -> Option<Destination> {
        self.dests.get(anchor).copied()
    }

    pub(super) fn add_link(&mut self, rect: Rect, anchor: &str) {
        self.links.push(LinkAnnotation {
            page: self.current_page(),
            rect,
            anchor: anchor.to_string(),
        });
    }

    /// Consume the surface for serialization.
    pub(super) fn finish(
        self,
    ) -> (
        Vec<Content>,
        HashMap<String, Destination>,
        Vec<LinkAnnotation>,
    ) {
        (self.pages, self.dests, self.links)
    }
}
