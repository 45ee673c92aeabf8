//! Previous/next pagination controls for list fragments

use crate::payload::PageMeta;

/// Resolved page numbers for a pagination block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLinks {
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
    pub previous: u64,
    pub next: u64,
}

impl PageLinks {
    /// Links for `meta`, or `None` when everything fits on one page
    pub fn for_meta(meta: &PageMeta) -> Option<Self> {
        if meta.per_page == 0 || meta.total <= meta.per_page {
            return None;
        }
        let total_pages = meta.total.div_ceil(meta.per_page).max(1);
        Some(Self {
            page: meta.page,
            per_page: meta.per_page,
            total_pages,
            previous: meta.page.saturating_sub(1).max(1),
            next: meta.page.saturating_add(1).min(total_pages),
        })
    }

    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Pagination nav issuing `GET endpoint?page=..&per_page=..` into `#target_id`
///
/// Empty when the collection fits on a single page.
pub fn build_pagination(meta: &PageMeta, endpoint: &str, target_id: &str) -> String {
    let Some(links) = PageLinks::for_meta(meta) else {
        return String::new();
    };

    let control = |label: &str, page: u64, enabled: bool| {
        let (item_class, disabled) = if enabled { ("", "") } else { (" disabled", " disabled") };
        format!(
            r##"<li class="page-item{item_class}"><button class="page-link" type="button"{disabled} hx-get="{endpoint}?page={page}&per_page={per_page}" hx-target="#{target_id}" hx-swap="innerHTML">{label}</button></li>"##,
            per_page = links.per_page,
        )
    };

    format!(
        r#"<nav aria-label="Pagination" class="mt-3"><ul class="pagination mb-0">{}<li class="page-item disabled"><span class="page-link">Page {} of {}</span></li>{}</ul></nav>"#,
        control("Previous", links.previous, links.has_previous()),
        links.page,
        links.total_pages,
        control("Next", links.next, links.has_next()),
    )
}
