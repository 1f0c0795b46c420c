//! # Rendering
//!
//! Turns status envelopes into terminal output. With `--json` the envelope is printed as
//! is, which is the same contract a web UI would consume. Otherwise list items become a
//! plain table on stdout and the status message follows, colored by outcome; failures
//! go to stderr.
//!
//! Column widths are computed with `unicode-width` so names with wide characters line up.

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use shopfront::commands::doctor::SetReport;
use shopfront::commands::repair::RepairReport;
use shopfront::config::ShopConfig;
use shopfront::model::{
    Article, Collection, CollectionProduct, HomepageArticle, Offer, OfferProduct, Product,
    Visibility,
};
use shopfront::status::Envelope;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const MAX_CELL_WIDTH: usize = 40;
const COLUMN_GAP: &str = "  ";

/// One table row per item. Types with no headers render only the status message.
pub trait Row {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

pub fn format_price(minor: u64) -> String {
    format!("{}.{:02}", minor / 100, minor % 100)
}

fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let mut result = String::new();
    let mut current_width = 0;
    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > max_width.saturating_sub(1) {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn pad_to_width(s: &str, width: usize) -> String {
    format!("{}{}", s, " ".repeat(width.saturating_sub(s.width())))
}

/// Renders `items` as an aligned table, or an empty string when there is nothing to show.
pub fn render_table<T: Row>(items: &[T]) -> String {
    let headers = T::headers();
    if headers.is_empty() || items.is_empty() {
        return String::new();
    }

    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|item| {
            item.cells()
                .iter()
                .map(|cell| truncate_to_width(cell, MAX_CELL_WIDTH))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = (0..headers.len())
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| cell.width())
                .chain(std::iter::once(headers[col].width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let format_line = |cells: Vec<&str>| -> String {
        let last = cells.len().saturating_sub(1);
        cells
            .iter()
            .enumerate()
            .map(|(col, cell)| {
                if col == last {
                    cell.to_string()
                } else {
                    pad_to_width(cell, widths[col])
                }
            })
            .collect::<Vec<_>>()
            .join(COLUMN_GAP)
    };

    let mut output = format_line(headers.to_vec());
    output.push('\n');
    for row in &rows {
        output.push_str(&format_line(row.iter().map(String::as_str).collect()));
        output.push('\n');
    }
    output
}

/// Prints the envelope and returns whether it reported success.
pub fn emit<T: Row + Serialize>(envelope: &Envelope<T>, json: bool) -> bool {
    if json {
        match serde_json::to_string_pretty(envelope) {
            Ok(out) => println!("{}", out),
            Err(e) => eprintln!("{}", format!("Failed to encode response: {}", e).red()),
        }
        return envelope.is_success();
    }

    let status = &envelope.status;
    if envelope.is_success() {
        print!("{}", render_table(envelope.items()));
        println!("{}", status.message.green());
    } else {
        eprintln!(
            "{}",
            format!("[{}] {}", status.code.as_u16(), status.message).red()
        );
    }
    envelope.is_success()
}

fn visibility_cell(visibility: Visibility) -> String {
    visibility.to_string()
}

impl Row for Collection {
    fn headers() -> &'static [&'static str] {
        &["#", "ID", "NAME", "PRODUCTS"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.index.to_string(),
            self.id.clone(),
            self.name.clone(),
            self.products.len().to_string(),
        ]
    }
}

impl Row for CollectionProduct {
    fn headers() -> &'static [&'static str] {
        &["#", "ID", "NAME", "PRICE"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.index.to_string(),
            self.id.clone(),
            self.name.clone(),
            format_price(self.price),
        ]
    }
}

impl Row for OfferProduct {
    fn headers() -> &'static [&'static str] {
        &["#", "ID", "NAME", "PRICE"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.index.to_string(),
            self.id.clone(),
            self.name.clone(),
            format_price(self.price),
        ]
    }
}

impl Row for HomepageArticle {
    fn headers() -> &'static [&'static str] {
        &["#", "ID", "TITLE", "VISIBILITY"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.index.to_string(),
            self.id.clone(),
            self.title.clone(),
            visibility_cell(self.visibility),
        ]
    }
}

impl Row for Product {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "PRICE", "POSTER"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.name.clone(),
            format_price(self.price),
            self.poster.clone().unwrap_or_default(),
        ]
    }
}

impl Row for Article {
    fn headers() -> &'static [&'static str] {
        &["ID", "TITLE", "VISIBILITY", "CREATED"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            visibility_cell(self.visibility),
            format_date(&self.created_at),
        ]
    }
}

impl Row for Offer {
    fn headers() -> &'static [&'static str] {
        &["ID", "TITLE", "PRODUCTS"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.clone(),
            self.title.clone(),
            self.products.len().to_string(),
        ]
    }
}

impl Row for SetReport {
    fn headers() -> &'static [&'static str] {
        &["SET", "SIZE", "RENUMBERED"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.owner.clone(),
            self.size.to_string(),
            self.renumbered.to_string(),
        ]
    }
}

impl Row for RepairReport {
    fn headers() -> &'static [&'static str] {
        &[]
    }

    fn cells(&self) -> Vec<String> {
        Vec::new()
    }
}

impl Row for ShopConfig {
    fn headers() -> &'static [&'static str] {
        &[]
    }

    fn cells(&self) -> Vec<String> {
        Vec::new()
    }
}
