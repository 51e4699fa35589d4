/// Most page buttons shown at once
pub const MAX_VISIBLE_PAGES: u64 = 5;

/// Number of pages for `records` items, never less than one
pub fn total_pages(records: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 1;
    }
    records.div_ceil(page_size).max(1)
}

/// Up to five page numbers centred on `current`, clamped to `1..=total`
pub fn page_window(current: u64, total: u64) -> Vec<u64> {
    let total = total.max(1);
    let current = current.clamp(1, total);

    if total <= MAX_VISIBLE_PAGES {
        return (1..=total).collect();
    }

    let half = MAX_VISIBLE_PAGES / 2;
    let start = current
        .saturating_sub(half)
        .max(1)
        .min(total - MAX_VISIBLE_PAGES + 1);
    (start..start + MAX_VISIBLE_PAGES).collect()
}
