use std::ops::Range;

use roster_core::ListViewModel;

const MAX_CELL_WIDTH: usize = 24;
const INDEX_WIDTH: usize = 5;

/// Lines to print for the rows in `window`, with status and banners around them.
pub fn render(view: &ListViewModel, window: Range<usize>) -> Vec<String> {
    let mut lines = Vec::new();

    lines.push(title_line(view));
    if let Some(message) = &view.validation_message {
        lines.push(format!("! {message}"));
    }
    if let Some(banner) = &view.error_banner {
        lines.push(format!("[error] {banner}  (r: retry, d: dismiss)"));
    }

    let visible = &view.rows[window.start.min(view.rows.len())..window.end.min(view.rows.len())];
    let widths = column_widths(view, window.clone());
    lines.push(format_row(
        &" ".repeat(INDEX_WIDTH),
        view.columns.iter().copied(),
        &widths,
    ));
    lines.push(
        "-".repeat(INDEX_WIDTH + widths.iter().map(|width| width + 2).sum::<usize>()),
    );
    for (offset, row) in visible.iter().enumerate() {
        let index = format!("{:>width$} ", window.start + offset + 1, width = INDEX_WIDTH - 1);
        lines.push(format_row(
            &index,
            row.cells.iter().map(String::as_str),
            &widths,
        ));
    }

    if let Some(message) = &view.empty_message {
        lines.push(format!("  {message}"));
    } else if view.is_loading {
        lines.push("  Loading...".to_string());
    } else if view.is_fetching_next_page {
        lines.push("  Loading more...".to_string());
    } else if view.is_halted {
        lines.push("  Loading stopped after an error.".to_string());
    } else if !view.has_next_page && window.end >= view.rows.len() && !view.rows.is_empty() {
        lines.push("  (end of list)".to_string());
    }

    lines.push(status_line(view, &window));
    lines
}

fn title_line(view: &ListViewModel) -> String {
    let mut title = view.resource.label().to_string();
    if view.filters.is_empty() {
        title.push_str(" | no filters");
    } else {
        let filters: Vec<String> = view
            .filters
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect();
        title.push_str(" | ");
        title.push_str(&filters.join(", "));
    }
    title.push_str(&format!(" | page size {}", view.page_size));
    title
}

fn status_line(view: &ListViewModel, window: &Range<usize>) -> String {
    let shown = if window.is_empty() {
        "none".to_string()
    } else {
        format!("{}-{}", window.start + 1, window.end)
    };
    let total = view
        .total_count
        .map(format_with_commas)
        .unwrap_or_else(|| "?".to_string());
    let page = match (view.current_page, view.total_pages) {
        (Some(current), Some(total_pages)) => format!("page {current}/{total_pages}"),
        _ => "page -".to_string(),
    };
    format!(
        "Rows {shown} of {} loaded ({total} total) | {page}",
        format_with_commas(view.loaded_count as u64)
    )
}

fn column_widths(view: &ListViewModel, window: Range<usize>) -> Vec<usize> {
    view.columns
        .iter()
        .enumerate()
        .map(|(column, header)| {
            view.rows
                .iter()
                .skip(window.start)
                .take(window.len())
                .filter_map(|row| row.cells.get(column))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect()
}

fn format_row<'a>(prefix: &str, cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let mut line = prefix.to_string();
    for (cell, width) in cells.zip(widths) {
        line.push_str(&fit(cell, *width));
        line.push_str("  ");
    }
    line.trim_end().to_string()
}

fn fit(cell: &str, width: usize) -> String {
    let count = cell.chars().count();
    if count <= width {
        return format!("{cell:<width$}");
    }
    let mut out: String = cell.chars().take(width.saturating_sub(1)).collect();
    out.push('~');
    out
}

fn format_with_commas(value: u64) -> String {
    let mut out = String::new();
    for (i, ch) in value.to_string().chars().rev().enumerate() {
        if i != 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::{ListState, Resource};

    #[test]
    fn formats_commas() {
        assert_eq!(format_with_commas(0), "0");
        assert_eq!(format_with_commas(1_234_567), "1,234,567");
    }

    #[test]
    fn long_cells_are_cut() {
        assert_eq!(fit("abc", 5), "abc  ");
        assert_eq!(fit("abcdef", 4), "abc~");
    }

    #[test]
    fn unmounted_list_shows_header_and_status() {
        let view = ListState::new(Resource::Bills, 20).view();
        let lines = render(&view, 0..0);
        assert_eq!(lines[0], "Bills | no filters | page size 20");
        assert!(lines[1].contains("billNo"));
        assert!(lines[1].contains("createdAt"));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Rows none of 0 loaded (? total) | page -")
        );
    }

    #[test]
    fn banner_and_validation_are_shown() {
        let mut view = ListState::new(Resource::Students, 10).view();
        view.error_banner = Some("Access denied".to_string());
        view.validation_message = Some("year must be a four digit number, got '20x'".to_string());
        let lines = render(&view, 0..0);
        assert_eq!(lines[1], "! year must be a four digit number, got '20x'");
        assert_eq!(lines[2], "[error] Access denied  (r: retry, d: dismiss)");
    }
}
