//! Page arithmetic for the blog listing.
//!
//! Pages are 1-based. The page strip shows at most [`MAX_VISIBLE_PAGES`]
//! numbers, centred on the current page where the edges allow it.

use std::ops::{Range, RangeInclusive};

use serde::Serialize;

pub const ITEMS_PER_PAGE: usize = 8;
pub const MAX_VISIBLE_PAGES: usize = 5;

pub const PREVIOUS_LABEL: &str = "‹";
pub const NEXT_LABEL: &str = "›";

/// `ceil(total_items / items_per_page)`; zero items means zero pages.
#[must_use]
pub fn total_pages(total_items: usize, items_per_page: usize) -> usize {
    if items_per_page == 0 {
        return 0;
    }
    total_items.div_ceil(items_per_page)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    Previous,
    Number,
    Next,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageLink {
    pub kind: LinkKind,
    pub label: String,
    pub page: usize,
    pub active: bool,
    pub aria_label: String,
}

impl PageLink {
    fn new(kind: LinkKind, label: String, page: usize, active: bool) -> Self {
        let aria_label = if active {
            format!("Current page, page {page}")
        } else {
            format!("Go to page {page}")
        };
        Self {
            kind,
            label,
            page,
            active,
            aria_label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paginator {
    current_page: usize,
    items_per_page: usize,
    total_items: usize,
}

impl Paginator {
    #[must_use]
    pub fn new(total_items: usize) -> Self {
        Self::with_items_per_page(total_items, ITEMS_PER_PAGE)
    }

    #[must_use]
    pub fn with_items_per_page(total_items: usize, items_per_page: usize) -> Self {
        Self {
            current_page: 1,
            items_per_page: items_per_page.max(1),
            total_items,
        }
    }

    #[must_use]
    pub fn current_page(&self) -> usize {
        self.current_page
    }

    #[must_use]
    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    #[must_use]
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    #[must_use]
    pub fn total_pages(&self) -> usize {
        total_pages(self.total_items, self.items_per_page)
    }

    /// Moves to `page`; out-of-range pages leave the paginator untouched.
    pub fn go_to(&mut self, page: usize) -> bool {
        if page < 1 || page > self.total_pages() {
            return false;
        }
        self.current_page = page;
        true
    }

    /// The filtered set changed: start over on page one.
    pub fn reset(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.current_page = 1;
    }

    /// Updates the item count, keeping the current page when it still exists.
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        let last = self.total_pages().max(1);
        self.current_page = self.current_page.clamp(1, last);
    }

    /// Page numbers to display.
    #[must_use]
    pub fn page_window(&self) -> RangeInclusive<usize> {
        let total = self.total_pages();
        let half = MAX_VISIBLE_PAGES / 2;

        let mut start = self.current_page.saturating_sub(half).max(1);
        let end = total.min(start + MAX_VISIBLE_PAGES - 1);
        if end + 1 - start < MAX_VISIBLE_PAGES {
            start = (end + 1).saturating_sub(MAX_VISIBLE_PAGES).max(1);
        }
        start..=end
    }

    /// Previous, numbered and next links; empty when there is a single page.
    #[must_use]
    pub fn links(&self) -> Vec<PageLink> {
        let total = self.total_pages();
        if total <= 1 {
            return Vec::new();
        }

        let mut links = Vec::with_capacity(MAX_VISIBLE_PAGES + 2);
        if self.current_page > 1 {
            links.push(PageLink::new(
                LinkKind::Previous,
                PREVIOUS_LABEL.to_string(),
                self.current_page - 1,
                false,
            ));
        }
        for page in self.page_window() {
            links.push(PageLink::new(
                LinkKind::Number,
                page.to_string(),
                page,
                page == self.current_page,
            ));
        }
        if self.current_page < total {
            links.push(PageLink::new(
                LinkKind::Next,
                NEXT_LABEL.to_string(),
                self.current_page + 1,
                false,
            ));
        }
        links
    }

    #[must_use]
    pub fn info_text(&self) -> String {
        let total = self.total_pages();
        if total == 0 {
            "No posts found".to_string()
        } else {
            format!(
                "Page {} of {} ({} posts)",
                self.current_page, total, self.total_items
            )
        }
    }

    /// Index range of the items shown; everything when there is at most one page.
    #[must_use]
    pub fn visible_range(&self) -> Range<usize> {
        if self.total_pages() <= 1 {
            return 0..self.total_items;
        }
        let start = (self.current_page - 1) * self.items_per_page;
        let end = (start + self.items_per_page).min(self.total_items);
        start.min(end)..end
    }

    #[must_use]
    pub fn page_items<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.visible_range();
        let end = range.end.min(items.len());
        let start = range.start.min(end);
        &items[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_empty_without_pages() {
        let p = Paginator::new(0);
        assert!(p.page_window().is_empty());
        assert!(p.links().is_empty());
    }

    #[test]
    fn aria_labels() {
        let mut p = Paginator::new(30);
        p.go_to(2);
        let links = p.links();
        let active = links.iter().find(|l| l.active).unwrap();
        assert_eq!(active.aria_label, "Current page, page 2");
        assert_eq!(links[0].aria_label, "Go to page 1");
    }
}
