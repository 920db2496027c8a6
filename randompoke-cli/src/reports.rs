use anyhow::Result;
use clap::ValueEnum;
use colored::Colorize;
use randompoke_core::{
    Gender, GeneratedRecord, GenerationOptions, LoadedOptions, OptionsOrigin,
};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored, human-readable output
    Console,
    /// Pretty-printed JSON
    Json,
    /// Markdown tables
    Markdown,
}

/// One record as printed by every report format.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordLine {
    pub id: u32,
    pub name: String,
    pub summary: String,
    pub sprite: String,
    pub shiny: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl From<&GeneratedRecord> for RecordLine {
    fn from(record: &GeneratedRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            summary: record.summary(),
            sprite: record.sprite_path(),
            shiny: record.shiny,
            nature: record.nature.map(|n| n.label().to_string()),
            gender: record.gender,
            timestamp: record.timestamp.map(|t| t.to_rfc3339()),
        }
    }
}

/// The displayed batch after a `generate` run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub seed: u64,
    pub origin: OptionsOrigin,
    pub share_query: String,
    pub batches_generated: usize,
    pub cursor: usize,
    pub history_len: usize,
    pub vault_len: usize,
    pub records: Vec<RecordLine>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsReport {
    pub origin: OptionsOrigin,
    pub auto_generate: bool,
    pub share_query: String,
    pub options: GenerationOptions,
}

impl From<&LoadedOptions> for OptionsReport {
    fn from(loaded: &LoadedOptions) -> Self {
        Self {
            origin: loaded.origin,
            auto_generate: loaded.auto_generate,
            share_query: loaded.options.to_query(),
            options: loaded.options.clone(),
        }
    }
}

fn origin_label(origin: OptionsOrigin) -> &'static str {
    match origin {
        OptionsOrigin::Url => "query",
        OptionsOrigin::Storage => "saved state",
        OptionsOrigin::Defaults => "defaults",
    }
}

fn write_json<T: Serialize>(out: &mut dyn Write, value: &T) -> Result<()> {
    let json_output = serde_json::to_string_pretty(value)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

fn markdown_table(out: &mut dyn Write, records: &[RecordLine]) -> Result<()> {
    writeln!(out, "| # | Record | Sprite |")?;
    writeln!(out, "|---|--------|--------|")?;
    for (index, record) in records.iter().enumerate() {
        writeln!(
            out,
            "| {} | {} | `{}` |",
            index + 1,
            record.summary,
            record.sprite
        )?;
    }
    Ok(())
}

fn console_line(out: &mut dyn Write, index: usize, record: &RecordLine) -> Result<()> {
    let summary = if record.shiny {
        record.summary.bright_yellow().bold()
    } else {
        record.summary.normal()
    };
    writeln!(out, "{:>3}. {summary}", index + 1)?;
    writeln!(out, "     {}", record.sprite.dimmed())?;
    Ok(())
}

pub fn write_batch_report(
    out: &mut dyn Write,
    format: ReportFormat,
    report: &BatchReport,
) -> Result<()> {
    match format {
        ReportFormat::Json => write_json(out, report)?,
        ReportFormat::Markdown => {
            writeln!(out, "# Randompoke Batch\n")?;
            writeln!(out, "- **Seed**: {}", report.seed)?;
            writeln!(out, "- **Options from**: {}", origin_label(report.origin))?;
            writeln!(out, "- **Share query**: `?{}`", report.share_query)?;
            writeln!(
                out,
                "- **History**: {}/{}",
                report.cursor + 1,
                report.history_len
            )?;
            writeln!(out, "- **Vault**: {} shinies\n", report.vault_len)?;
            if report.records.is_empty() {
                writeln!(out, "_No eligible Pokémon for these options._")?;
            } else {
                markdown_table(out, &report.records)?;
            }
        }
        ReportFormat::Console => {
            writeln!(out, "{}", "🎲 Generated Batch".bright_cyan().bold())?;
            writeln!(out, "{}", "==================".cyan())?;
            if report.records.is_empty() {
                writeln!(out, "{}", "No eligible Pokémon for these options.".yellow())?;
            }
            for (index, record) in report.records.iter().enumerate() {
                console_line(out, index, record)?;
            }
            writeln!(out)?;
            writeln!(
                out,
                "History {}/{} · Vault {} · Seed {}",
                report.cursor + 1,
                report.history_len.max(1),
                report.vault_len,
                report.seed
            )?;
            writeln!(out, "Share: ?{}", report.share_query)?;
        }
    }
    Ok(())
}

pub fn write_vault_report(
    out: &mut dyn Write,
    format: ReportFormat,
    records: &[RecordLine],
) -> Result<()> {
    match format {
        ReportFormat::Json => write_json(out, &records)?,
        ReportFormat::Markdown => {
            writeln!(out, "# Shiny Vault\n")?;
            if records.is_empty() {
                writeln!(out, "_The vault is empty._")?;
            } else {
                markdown_table(out, records)?;
            }
        }
        ReportFormat::Console => {
            writeln!(out, "{}", "✨ Shiny Vault".bright_yellow().bold())?;
            writeln!(out, "{}", "==============".yellow())?;
            if records.is_empty() {
                writeln!(out, "The vault is empty.")?;
            }
            for (index, record) in records.iter().enumerate() {
                console_line(out, index, record)?;
                if let Some(timestamp) = &record.timestamp {
                    writeln!(out, "     Encountered {timestamp}")?;
                }
            }
        }
    }
    Ok(())
}

pub fn write_options_report(
    out: &mut dyn Write,
    format: ReportFormat,
    report: &OptionsReport,
) -> Result<()> {
    match format {
        ReportFormat::Json => write_json(out, report)?,
        ReportFormat::Markdown => {
            writeln!(out, "# Generation Options\n")?;
            writeln!(out, "- **From**: {}", origin_label(report.origin))?;
            writeln!(out, "- **Share query**: `?{}`\n", report.share_query)?;
            writeln!(out, "```json\n{}\n```", serde_json::to_string_pretty(&report.options)?)?;
        }
        ReportFormat::Console => {
            writeln!(out, "{}", "⚙️  Generation Options".bright_cyan().bold())?;
            writeln!(out, "From: {}", origin_label(report.origin).green())?;
            writeln!(out, "Share: ?{}", report.share_query)?;
            writeln!(out, "{}", serde_json::to_string_pretty(&report.options)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: u32, shiny: bool) -> RecordLine {
        RecordLine {
            id,
            name: format!("Mon {id}"),
            summary: format!("Mon {id}"),
            sprite: format!("sprites/normal/mon{id}.webp"),
            shiny,
            nature: None,
            gender: None,
            timestamp: None,
        }
    }

    fn report(records: Vec<RecordLine>) -> BatchReport {
        BatchReport {
            seed: 7,
            origin: OptionsOrigin::Defaults,
            share_query: GenerationOptions::default().to_query(),
            batches_generated: 1,
            cursor: 0,
            history_len: 1,
            vault_len: 0,
            records,
        }
    }

    #[test]
    fn json_batch_report_is_parseable() {
        let mut buf = Vec::new();
        write_batch_report(&mut buf, ReportFormat::Json, &report(vec![line(1, false)])).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["seed"], 7);
        assert_eq!(value["origin"], "defaults");
        assert_eq!(value["records"][0]["sprite"], "sprites/normal/mon1.webp");
    }

    #[test]
    fn markdown_batch_report_lists_records() {
        let mut buf = Vec::new();
        write_batch_report(
            &mut buf,
            ReportFormat::Markdown,
            &report(vec![line(1, false), line(2, true)]),
        )
        .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("# Randompoke Batch"));
        assert!(text.contains("| 2 | Mon 2 | `sprites/normal/mon2.webp` |"));
    }

    #[test]
    fn empty_vault_is_reported() {
        let mut buf = Vec::new();
        write_vault_report(&mut buf, ReportFormat::Markdown, &[]).unwrap();
        assert!(String::from_utf8(buf).unwrap().contains("The vault is empty"));
    }
}
