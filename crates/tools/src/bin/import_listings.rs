//! Bulk listing import from an Excel workbook.
//!
//! Expected columns (first sheet, header row): title, description, category,
//! price, currency, location, images. `price` is in minor units; `images` is
//! a semicolon-separated list of relative media paths. Rows that fail
//! validation are reported and skipped, not fatal.

use anyhow::{Context, bail};
use calamine::{Data, Reader, open_workbook_auto};
use chrono::Utc;
use clap::Parser;

use vitrina_core::{TenantId, UserId};
use vitrina_infra::repo::listings;
use vitrina_listings::ListingDraft;

#[derive(Debug, Parser)]
#[command(name = "import-listings", about = "Import listings from an .xlsx file")]
struct Args {
    /// Path to the workbook.
    file: std::path::PathBuf,

    /// Tenant the listings belong to.
    #[arg(long)]
    tenant_id: TenantId,

    /// Owner of every imported listing.
    #[arg(long)]
    owner_id: UserId,

    /// Database to insert into.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,

    /// Parse and validate only, insert nothing.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vitrina_observability::init();
    let args = Args::parse();

    let mut workbook = open_workbook_auto(&args.file)
        .with_context(|| format!("open {}", args.file.display()))?;
    let range = workbook
        .worksheet_range_at(0)
        .context("workbook has no sheets")??;

    let mut rows = range.rows();
    let header = rows.next().context("sheet is empty")?;
    let columns = header_index(header)?;

    let pool = vitrina_infra::connect(&args.database_url).await?;
    let mut imported = 0usize;
    let mut skipped = 0usize;

    for (line, row) in rows.enumerate() {
        // Header was row 1, spreadsheet rows are 1-based.
        let line = line + 2;
        let draft = match parse_row(&columns, row) {
            Ok(Some(draft)) => draft,
            Ok(None) => continue,
            Err(e) => {
                tracing::warn!(line, "skipping row: {e}");
                skipped += 1;
                continue;
            }
        };
        if let Err(e) = draft.validate() {
            tracing::warn!(line, "skipping row: {e}");
            skipped += 1;
            continue;
        }

        if !args.dry_run {
            let listing = draft.into_listing(args.tenant_id, args.owner_id, Utc::now());
            listings::insert(&pool, &listing)
                .await
                .with_context(|| format!("insert row {line}"))?;
        }
        imported += 1;
    }

    tracing::info!(imported, skipped, dry_run = args.dry_run, "import finished");
    Ok(())
}

struct Columns {
    title: usize,
    description: usize,
    category: usize,
    price: usize,
    currency: usize,
    location: Option<usize>,
    images: Option<usize>,
}

fn header_index(header: &[Data]) -> anyhow::Result<Columns> {
    let find = |name: &str| {
        header.iter().position(|cell| {
            matches!(cell, Data::String(s) if s.trim().eq_ignore_ascii_case(name))
        })
    };
    let require = |name: &str| {
        find(name).with_context(|| format!("missing required column '{name}'"))
    };

    Ok(Columns {
        title: require("title")?,
        description: require("description")?,
        category: require("category")?,
        price: require("price")?,
        currency: require("currency")?,
        location: find("location"),
        images: find("images"),
    })
}

/// `Ok(None)` for a fully blank row.
fn parse_row(columns: &Columns, row: &[Data]) -> anyhow::Result<Option<ListingDraft>> {
    if row.iter().all(|c| matches!(c, Data::Empty)) {
        return Ok(None);
    }

    let title = string_cell(row, columns.title).context("title")?;
    let description = string_cell(row, columns.description).unwrap_or_default();
    let category = string_cell(row, columns.category).context("category")?;
    let currency = string_cell(row, columns.currency).context("currency")?;
    let price = price_cell(row, columns.price)?;
    let location = columns.location.and_then(|i| string_cell(row, i));
    let images = columns
        .images
        .and_then(|i| string_cell(row, i))
        .map(|s| {
            s.split(';')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    Ok(Some(ListingDraft {
        title,
        description,
        category,
        price,
        currency,
        location,
        images,
    }))
}

fn string_cell(row: &[Data], index: usize) -> Option<String> {
    match row.get(index)? {
        Data::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Data::Int(n) => Some(n.to_string()),
        Data::Float(f) => Some(f.to_string()),
        _ => None,
    }
}

/// Minor units. Spreadsheets hand integers back as floats, so accept both.
fn price_cell(row: &[Data], index: usize) -> anyhow::Result<i64> {
    match row.get(index) {
        Some(Data::Int(n)) => Ok(*n),
        Some(Data::Float(f)) if f.fract() == 0.0 => Ok(*f as i64),
        Some(Data::String(s)) => s.trim().parse().context("price"),
        other => bail!("price cell is not an integer ({other:?})"),
    }
}
