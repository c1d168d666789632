mod common;

use std::path::Path;

use assert_cmd::Command;
use predicates::{prelude::PredicateBooleanExt, str::contains};
use tempfile::TempDir;

use club_books::{
    config::{Config, ConfigManager},
    core::utils::bookkeeping_file_in,
    storage::JsonStorage,
    Document,
};
use common::{club, create_invoice, date, file_backed_club, pay_invoice};

const BIN_NAME: &str = "club_books_cli";

fn cli(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
    cmd.env("CLUB_BOOKS_HOME", home).env("NO_COLOR", "1");
    cmd
}

#[test]
fn version_prints_build_information() {
    let home = TempDir::new().unwrap();
    cli(home.path())
        .arg("version")
        .assert()
        .success()
        .stdout(contains("Club Books version").and(contains(env!("CARGO_PKG_VERSION"))));
}

#[test]
fn report_lists_debtors_as_of_the_given_date() {
    let (temp, path, mut document) = file_backed_club();
    create_invoice(&mut document, "inv1", "1101", date(2011, 3, 5), 2000);
    pay_invoice(&mut document, "j2", "inv1", date(2011, 5, 10), 1000);

    cli(temp.path())
        .arg("report")
        .arg(&path)
        .arg("2011-12-31")
        .assert()
        .success()
        .stdout(
            contains("Report as of 2011-12-31")
                .and(contains("Debtors"))
                .and(contains("1101"))
                .and(contains("10,00")),
        );
}

#[test]
fn invoices_lists_open_invoices() {
    let (temp, path, mut document) = file_backed_club();
    create_invoice(&mut document, "inv1", "1101", date(2011, 3, 5), 2000);

    cli(temp.path())
        .arg("invoices")
        .arg(&path)
        .arg("2011-12-31")
        .assert()
        .success()
        .stdout(contains("inv1").and(contains("Jan Janssen")).and(contains("20,00")));

    cli(temp.path())
        .arg("invoices")
        .arg(&path)
        .arg("2011-01-01")
        .assert()
        .success()
        .stdout(contains("none"));
}

#[test]
fn bookkeepings_can_be_named_instead_of_located() {
    let home = TempDir::new().unwrap();
    let mut document = club();
    document
        .save_as(
            &bookkeeping_file_in(home.path(), "Schaakclub De Pion"),
            Box::new(JsonStorage),
        )
        .unwrap();
    create_invoice(&mut document, "inv7", "1103", date(2011, 9, 1), 1500);

    cli(home.path())
        .args(["invoices", "Schaakclub De Pion", "2011-12-31"])
        .assert()
        .success()
        .stdout(contains("inv7").and(contains("Klaas Klaassen")));
}

#[test]
fn new_bookkeeping_uses_config_defaults_and_becomes_the_default_target() {
    let home = TempDir::new().unwrap();
    ConfigManager::with_base_dir(home.path().to_path_buf())
        .unwrap()
        .save(&Config {
            currency: "CHF".into(),
            journal_entry_id_format: "Jyyyynnn".into(),
            ..Config::default()
        })
        .unwrap();

    cli(home.path())
        .args(["new", "Schaakclub De Pion", "2025-01-01"])
        .assert()
        .success()
        .stdout(contains("Created bookkeeping Schaakclub De Pion"));

    let path = bookkeeping_file_in(home.path(), "Schaakclub De Pion");
    let document = Document::open(&path, Box::new(JsonStorage)).unwrap();
    let bookkeeping = &document.tables().bookkeeping;
    assert_eq!(bookkeeping.currency, "CHF");
    assert_eq!(bookkeeping.journal_entry_id_format, "Jyyyynnn");
    assert_eq!(bookkeeping.start_of_period, date(2025, 1, 1));

    cli(home.path())
        .arg("report")
        .assert()
        .success()
        .stdout(contains("Report as of"));

    cli(home.path())
        .args(["new", "Schaakclub De Pion"])
        .assert()
        .failure()
        .stderr(contains("already exists"));
}

#[test]
fn invalid_input_fails_with_a_message() {
    let home = TempDir::new().unwrap();
    cli(home.path())
        .arg("report")
        .assert()
        .failure()
        .stderr(contains("missing file"));

    cli(home.path())
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(contains("unknown command"));

    cli(home.path())
        .arg("report")
        .arg(home.path().join("absent.json"))
        .assert()
        .failure()
        .stderr(contains("not found"));

    cli(home.path())
        .args(["report", "club.json", "31-12-2011"])
        .assert()
        .failure()
        .stderr(contains("invalid date"));
}
