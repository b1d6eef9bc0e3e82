//! # UI Utilities
//!
//! Table formatting, paging and message helpers shared by the commands.
//!
//! Copyright (c) 2025 Dominic Rodemer. All rights reserved.
//! Licensed under the MIT License.

use std::io::{self, BufRead, IsTerminal, Write};

use owo_colors::OwoColorize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::query::Paginator;

// =============================================================================
// String Utilities
// =============================================================================

/// Truncates to at most `max` display columns, adding an ellipsis if truncated.
pub fn truncate(s: &str, max: usize) -> String {
    if s.width() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w + 1 > max {
            break;
        }
        out.push(c);
        width += w;
    }
    out.push('…');
    out
}

/// Pads to `width` display columns.
pub fn pad(s: &str, width: usize) -> String {
    let fill = width.saturating_sub(s.width());
    format!("{s}{}", " ".repeat(fill))
}

// =============================================================================
// Tables
// =============================================================================

/// Plain-text table with display-width aware columns.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.width()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.width());
                }
            }
        }
        widths
    }

    fn format_line(cells: &[String], widths: &[usize]) -> String {
        let last = widths.len().saturating_sub(1);
        cells
            .iter()
            .zip(widths)
            .enumerate()
            .map(|(i, (cell, w))| if i == last { cell.clone() } else { pad(cell, *w) })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    }

    /// Renders the header line and the rows, without colors.
    pub fn lines(&self) -> Vec<String> {
        let widths = self.widths();
        std::iter::once(Self::format_line(&self.headers, &widths))
            .chain(self.rows.iter().map(|r| Self::format_line(r, &widths)))
            .collect()
    }

    pub fn print(&self) {
        let mut lines = self.lines().into_iter();
        if let Some(header) = lines.next() {
            println!("{}", header.bold());
        }
        for line in lines {
            println!("{line}");
        }
    }
}

/// Prints rows page by page.
///
/// On a terminal the user is prompted between pages; otherwise only the
/// first page is printed.
pub fn print_paged<T>(items: &[T], paginator: Paginator, mut render: impl FnMut(&[T])) -> io::Result<()> {
    let pages = paginator.pages(items);
    let interactive = io::stdout().is_terminal() && io::stdin().is_terminal();
    let total = pages.len();

    for (i, page) in pages.into_iter().enumerate() {
        render(page);
        if i + 1 == total {
            break;
        }
        if !interactive {
            println!(
                "{}",
                format!("({} of {} shown, use --limit -1 for all)", page.len(), items.len()).dimmed()
            );
            break;
        }
        if !prompt_next_page(i + 1, total)? {
            break;
        }
    }
    Ok(())
}

fn prompt_next_page(current: usize, total: usize) -> io::Result<bool> {
    let mut stderr = io::stderr();
    write!(
        stderr,
        "{}",
        format!("-- page {current}/{total}: Enter for more, q to quit -- ").dimmed()
    )?;
    stderr.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(!answer.trim().eq_ignore_ascii_case("q"))
}

// =============================================================================
// Messages
// =============================================================================

/// Prints a success message: `✓ {message}`.
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

/// Prints warnings with yellow prefix.
pub fn print_warnings(warnings: &[String]) {
    for warning in warnings {
        eprintln!("{} {}", "warning:".yellow(), warning);
    }
}

/// Prints a dimmed "nothing here" line.
pub fn print_empty(message: &str) {
    println!("{}", message.dimmed());
}
