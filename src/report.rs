use std::collections::HashMap;
use std::fmt::Write;

use crate::aggregate::{Aggregate, ThinDevice};
use crate::error::Result;
use crate::policy::{self, TierProfile};

/// Separator between aligned text columns.
const COLUMN_GAP: &str = "   ";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Format {
    /// Space-padded columns for terminals.
    #[default]
    Aligned,
    Csv,

    /// CSV with every cell enclosed in double quotes.
    QuotedCsv,
}

/// Which optional columns a report carries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Columns {
    /// Space-separated list of every storage group a device belongs to.
    pub storage_groups: bool,

    /// Legacy written capacity.
    pub written: bool,
}

/// The report as cells, header first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Lays out one row per device, with one trailing column per pool.
    #[must_use]
    pub fn new(
        aggregate: &Aggregate,
        profiles: &HashMap<String, TierProfile>,
        columns: Columns,
    ) -> Self {
        let mut header = vec!["TDEV".to_owned(), "TotalGB".to_owned()];
        if columns.written {
            header.push("WrittenGB".into());
        }
        header.push("AllocGB".into());
        if columns.storage_groups {
            header.push("SGs".into());
        }
        header.extend(
            ["BoundPool", "FastSG", "FastPolicy", "Policy%"].map(String::from),
        );
        header.extend(aggregate.pools().iter().cloned());

        let rows = aggregate
            .devices()
            .map(|device| row(device, aggregate.pools(), profiles, columns))
            .collect();

        Self { header, rows }
    }

    /// All rows, header first, then one per device.
    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        std::iter::once(&self.header)
            .chain(&self.rows)
            .map(Vec::as_slice)
    }

    /// Renders the table, one line per row, header first.
    ///
    /// # Errors
    ///
    /// Fails only if writing to the output [`String`] fails.
    pub fn render(&self, format: Format) -> Result<String> {
        match format {
            Format::Aligned => self.to_aligned(),
            Format::Csv => self.to_csv(|cell| cell.into()),
            Format::QuotedCsv => {
                self.to_csv(|cell| format!("\"{}\"", cell.replace('"', "\"\"")))
            }
        }
    }

    fn to_aligned(&self) -> Result<String> {
        let mut widths = vec![0; self.header.len()];

        for line in self.rows() {
            for (width, cell) in widths.iter_mut().zip(line) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut output = String::default();

        for line in self.rows() {
            let mut text = String::default();

            for (cell, width) in line.iter().zip(&widths) {
                write!(text, "{:<width$}{}", cell, COLUMN_GAP, width = *width)?;
            }

            writeln!(output, "{}", text.trim_end())?;
        }

        Ok(output)
    }

    fn to_csv<F>(&self, quote: F) -> Result<String>
    where
        F: Fn(&str) -> String,
    {
        let mut output = String::default();

        for line in self.rows() {
            let cells = line.iter().map(|cell| quote(cell)).collect::<Vec<_>>();

            writeln!(output, "{}", cells.join(","))?;
        }

        Ok(output)
    }
}

fn row(
    device: &ThinDevice,
    pools: &[String],
    profiles: &HashMap<String, TierProfile>,
    columns: Columns,
) -> Vec<String> {
    let mut row = vec![device.name.clone(), gb(device.total_gb)];

    if columns.written {
        row.push(device.written_gb.map(gb).unwrap_or_default());
    }

    row.push(gb(device.allocated_gb));

    if columns.storage_groups {
        row.push(device.storage_groups.join(" "));
    }

    row.push(device.bound_pool.clone().unwrap_or_default());
    row.push(device.fast_group.clone().unwrap_or_default());

    match &device.fast_policy {
        Some(policy) => {
            row.push(policy.to_string());
            row.push(policy::tier_percentages(policy, profiles));
        }
        None => row.extend([String::new(), String::new()]),
    }

    row.extend(pools.iter().map(|pool| gb(device.allocated_in(pool))));

    row
}

/// Formats a capacity so whole numbers keep their decimal point, e.g.
/// `100.0`, matching how SYMCLI prints them.
fn gb(value: f64) -> String {
    format!("{:?}", value)
}
