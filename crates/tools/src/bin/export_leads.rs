//! Lead export to an Excel workbook for back-office follow-up.

use anyhow::Context;
use clap::Parser;
use rust_xlsxwriter::Workbook;

use vitrina_core::{PageQuery, TenantId};
use vitrina_infra::repo::leads::{self, LeadFilter};
use vitrina_leads::{LeadFlow, LeadStatus};

#[derive(Debug, Parser)]
#[command(name = "export-leads", about = "Export leads to an .xlsx file")]
struct Args {
    /// Output path.
    #[arg(long, default_value = "leads.xlsx")]
    out: std::path::PathBuf,

    /// Restrict to one tenant.
    #[arg(long)]
    tenant_id: Option<TenantId>,

    /// Restrict to one flow (rent, buy, sell, appraisal, contact).
    #[arg(long)]
    flow: Option<String>,

    /// Restrict to one status (open, submitted, discarded).
    #[arg(long)]
    status: Option<String>,

    /// Database to read from.
    #[arg(long, env = "DATABASE_URL")]
    database_url: String,
}

const HEADER: [&str; 9] = [
    "id", "flow", "status", "name", "email", "phone", "property_id", "created_at", "updated_at",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vitrina_observability::init();
    let args = Args::parse();

    let filter = LeadFilter {
        tenant_id: args.tenant_id,
        flow: args.flow.as_deref().map(LeadFlow::parse).transpose()?,
        status: args.status.as_deref().map(LeadStatus::parse).transpose()?,
    };

    let pool = vitrina_infra::connect(&args.database_url).await?;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    for (col, name) in HEADER.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }

    let mut row: u32 = 1;
    let mut offset = 0i64;
    loop {
        let page = PageQuery {
            limit: Some(100),
            offset: Some(offset),
        };
        let (batch, _total) = leads::list(&pool, &filter, page).await?;
        if batch.is_empty() {
            break;
        }
        offset += batch.len() as i64;

        for lead in &batch {
            sheet.write_string(row, 0, lead.id.to_string())?;
            sheet.write_string(row, 1, lead.flow.as_str())?;
            sheet.write_string(row, 2, lead.status.as_str())?;
            sheet.write_string(row, 3, lead.contact.name.as_deref().unwrap_or_default())?;
            sheet.write_string(row, 4, lead.contact.email.as_deref().unwrap_or_default())?;
            sheet.write_string(row, 5, lead.contact.phone.as_deref().unwrap_or_default())?;
            sheet.write_string(
                row,
                6,
                lead.property_id.map(|p| p.to_string()).unwrap_or_default(),
            )?;
            sheet.write_string(row, 7, lead.created_at.to_rfc3339())?;
            sheet.write_string(row, 8, lead.updated_at.to_rfc3339())?;
            row += 1;
        }
    }

    workbook
        .save(&args.out)
        .with_context(|| format!("write {}", args.out.display()))?;
    tracing::info!(rows = row - 1, out = %args.out.display(), "export finished");
    Ok(())
}
