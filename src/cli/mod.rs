//! Command line front end: creates bookkeepings and reports on them.

pub mod style;

use std::{
    io::{self, Write},
    path::PathBuf,
};

use chrono::NaiveDate;
use tracing::debug;

use crate::config::{Config, ConfigManager};
use crate::core::{
    clock::{Clock, SystemClock},
    document::Document,
    errors::{BookkeepingError, Result},
    services::{InvoiceService, ReportService},
    utils::{app_data_dir, bookkeeping_file_in},
};
use crate::domain::{Amount, Report};
use crate::storage::JsonStorage;
use crate::utils::build_info;

use self::style::CliStyle;

const AMOUNT_WIDTH: usize = 12;

const USAGE: &str = "Usage:
  club_books_cli new <name> [yyyy-mm-dd]             new bookkeeping starting at the date
  club_books_cli report [<file|name> [yyyy-mm-dd]]   balances, debtors and creditors
  club_books_cli invoices [<file|name> [yyyy-mm-dd]] open invoices
  club_books_cli version                             build information

Without a file the last opened bookkeeping is used.";

/// Runs the command named by the process arguments and writes to stdout.
///
/// The configuration is saved again when a command changed it.
pub fn run_cli() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let manager = ConfigManager::new()?;
    let mut config = manager.load()?;
    let loaded = config.clone();
    let style = CliStyle::detect(config.decimal_separator);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&args, &mut config, &style, &SystemClock, &mut out)?;
    if config != loaded {
        manager.save(&config)?;
    }
    Ok(())
}

/// Dispatches `args` to a command. Opening or creating a bookkeeping records
/// it as the last opened one in `config`.
pub fn run(
    args: &[String],
    config: &mut Config,
    style: &CliStyle,
    clock: &dyn Clock,
    out: &mut dyn Write,
) -> Result<()> {
    let command = args.first().map(String::as_str).unwrap_or("help");
    debug!(command, "running command");
    match command {
        "new" => create_bookkeeping(&args[1..], config, clock, out),
        "report" => {
            let (document, date) = open_with_date(&args[1..], config, clock)?;
            let report = ReportService::build(document.tables(), date);
            print_report(&report, style, out)
        }
        "invoices" => {
            let (document, date) = open_with_date(&args[1..], config, clock)?;
            print_invoices(&document, date, style, out)
        }
        "version" => print_version(config, out),
        "help" | "--help" | "-h" => {
            writeln!(out, "{USAGE}")?;
            Ok(())
        }
        other => Err(BookkeepingError::Validation(format!(
            "unknown command `{other}`\n{USAGE}"
        ))),
    }
}

fn create_bookkeeping(
    args: &[String],
    config: &mut Config,
    clock: &dyn Clock,
    out: &mut dyn Write,
) -> Result<()> {
    let name = args
        .first()
        .ok_or_else(|| BookkeepingError::Validation(format!("missing name\n{USAGE}")))?;
    let start_of_period = date_or_today(args.get(1), clock)?;
    let path = bookkeeping_file_in(&app_data_dir(), name);
    if path.exists() {
        return Err(BookkeepingError::Validation(format!(
            "bookkeeping `{}` already exists",
            path.display()
        )));
    }
    let mut document = Document::new(config.new_bookkeeping(name.as_str(), start_of_period));
    document.save_as(&path, Box::new(JsonStorage))?;
    writeln!(out, "Created bookkeeping {name} at {}", path.display())?;
    config.last_opened_bookkeeping = Some(path);
    Ok(())
}

fn open_with_date(
    args: &[String],
    config: &mut Config,
    clock: &dyn Clock,
) -> Result<(Document, NaiveDate)> {
    let path = match args.first() {
        Some(target) => resolve_bookkeeping(target),
        None => config.last_opened_bookkeeping.clone().ok_or_else(|| {
            BookkeepingError::Validation(format!("missing file\n{USAGE}"))
        })?,
    };
    let date = date_or_today(args.get(1), clock)?;
    let document = Document::open(&path, Box::new(JsonStorage))?;
    config.last_opened_bookkeeping = Some(path);
    Ok((document, date))
}

fn date_or_today(text: Option<&String>, clock: &dyn Clock) -> Result<NaiveDate> {
    match text {
        Some(text) => NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map_err(|_| BookkeepingError::Validation(format!("invalid date `{text}`"))),
        None => Ok(clock.today()),
    }
}

/// An existing path is used as is; anything else names a bookkeeping in the data directory.
fn resolve_bookkeeping(target: &str) -> PathBuf {
    let direct = PathBuf::from(target);
    if direct.exists() {
        direct
    } else {
        bookkeeping_file_in(&app_data_dir(), target)
    }
}

fn print_report(report: &Report, style: &CliStyle, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", style.header(&format!("Report as of {}", report.end_date)))?;

    writeln!(out, "{}", style.header("Balance"))?;
    for account in report.assets().into_iter().chain(report.liabilities()) {
        writeln!(
            out,
            "  {:<8} {:<30} {}",
            account.id,
            account.name,
            style.amount(report.normal_balance(account), AMOUNT_WIDTH)
        )?;
    }
    writeln!(
        out,
        "  {:<39} {}",
        "Total assets",
        style.amount(report.total_assets(), AMOUNT_WIDTH)
    )?;
    writeln!(
        out,
        "  {:<39} {}",
        "Total liabilities",
        style.amount(report.total_liabilities(), AMOUNT_WIDTH)
    )?;

    writeln!(out, "{}", style.header("Operations"))?;
    for account in report.revenues().into_iter().chain(report.expenses()) {
        writeln!(
            out,
            "  {:<8} {:<30} {}",
            account.id,
            account.name,
            style.amount(report.normal_balance(account), AMOUNT_WIDTH)
        )?;
    }
    writeln!(
        out,
        "  {:<39} {}",
        "Result of operations",
        style.amount(report.result_of_operations(), AMOUNT_WIDTH)
    )?;

    print_parties(out, style, "Debtors", &report.debtors(), report.total_debtors())?;
    print_parties(out, style, "Creditors", &report.creditors(), report.total_creditors())?;
    Ok(())
}

fn print_parties(
    out: &mut dyn Write,
    style: &CliStyle,
    title: &str,
    parties: &[(&str, Amount)],
    total: Amount,
) -> Result<()> {
    writeln!(out, "{}", style.header(title))?;
    if parties.is_empty() {
        writeln!(out, "  {}", style.muted("none"))?;
        return Ok(());
    }
    for (party_id, amount) in parties {
        writeln!(out, "  {:<39} {}", party_id, style.amount(*amount, AMOUNT_WIDTH))?;
    }
    writeln!(out, "  {:<39} {}", "Total", style.amount(total, AMOUNT_WIDTH))?;
    Ok(())
}

fn print_invoices(
    document: &Document,
    date: NaiveDate,
    style: &CliStyle,
    out: &mut dyn Write,
) -> Result<()> {
    let overviews = InvoiceService::overviews(document.tables(), date, false);
    writeln!(out, "{}", style.header(&format!("Open invoices as of {date}")))?;
    if overviews.is_empty() {
        writeln!(out, "  {}", style.muted("none"))?;
        return Ok(());
    }
    for overview in &overviews {
        writeln!(
            out,
            "  {:<12} {} {:<24} {} {}",
            overview.invoice.id,
            overview.invoice.issue_date,
            overview.party_name,
            style.amount(overview.invoice.amount_to_be_paid, AMOUNT_WIDTH),
            style.amount(overview.remaining(), AMOUNT_WIDTH)
        )?;
    }
    Ok(())
}

fn print_version(config: &Config, out: &mut dyn Write) -> Result<()> {
    let build = build_info::current();
    writeln!(out, "Club Books version {}", build.version)?;
    writeln!(out, "  commit:   {} ({})", build.git_hash, build.git_status)?;
    writeln!(out, "  built:    {} {} {}", build.timestamp, build.target, build.profile)?;
    writeln!(out, "  locale:   {} ({})", config.locale, config.currency)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::FixedClock;

    fn plain() -> CliStyle {
        CliStyle {
            use_color: false,
            decimal_separator: ',',
        }
    }

    fn run_to_string(args: &[&str]) -> Result<String> {
        let args: Vec<String> = args.iter().map(|arg| arg.to_string()).collect();
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        let mut out = Vec::new();
        run(&args, &mut Config::default(), &plain(), &clock, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn version_prints_package_version() {
        let text = run_to_string(&["version"]).unwrap();
        assert!(text.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(matches!(
            run_to_string(&["frobnicate"]),
            Err(BookkeepingError::Validation(_))
        ));
    }

    #[test]
    fn report_requires_a_file_when_none_was_opened() {
        assert!(matches!(
            run_to_string(&["report"]),
            Err(BookkeepingError::Validation(_))
        ));
    }

    #[test]
    fn opening_records_the_last_bookkeeping() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("club.json");
        let mut document = Document::new(Config::default().new_bookkeeping(
            "Schaakclub De Pion",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ));
        document.save_as(&path, Box::new(JsonStorage)).unwrap();

        let mut config = Config::default();
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        let mut out = Vec::new();
        let args = vec!["report".to_string(), path.display().to_string()];
        run(&args, &mut config, &plain(), &clock, &mut out).unwrap();
        assert_eq!(config.last_opened_bookkeeping.as_deref(), Some(path.as_path()));

        let mut again = Vec::new();
        run(&["invoices".to_string()], &mut config, &plain(), &clock, &mut again).unwrap();
        assert!(String::from_utf8(again).unwrap().contains("as of 2024-06-01"));
    }
}
