//! E2E tests for the irpf command line

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const TAXPAYER: &str = "5f0e7c1a-3b2d-4e8f-9a6b-1c2d3e4f5a6b";

fn store_path(name: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("irpf-cli-{}-{}.json", name, std::process::id()));
    let _ = std::fs::remove_file(&path);
    path
}

fn irpf(store: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_irpf"))
        .arg("--store")
        .arg(store)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn tax_json_output() {
    let store = store_path("tax");
    let output = irpf(
        &store,
        &["tax", "--income", "60000.00", "--deductions", "5000.00", "--json"],
    );
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    assert_eq!(json["calculation_base"], "55000.00");
    assert_eq!(json["tax_due"], "4421.76");
    assert_eq!(json["effective_aliquot"], "7.3696");
}

#[test]
fn tax_with_withholding_shows_refund() {
    let store = store_path("refund");
    let output = irpf(
        &store,
        &["tax", "-i", "60000.00", "-d", "5000.00", "-w", "5000.00"],
    );
    assert!(output.status.success(), "Command failed: {:?}", output);
    let out = stdout(&output);
    assert!(out.contains("R$ 4421.76"));
    assert!(out.contains("Refund"));
}

#[test]
fn cpf_validation_exit_codes() {
    let store = store_path("cpf");

    let valid = irpf(&store, &["cpf", "111.444.777-35"]);
    assert!(valid.status.success());
    assert_eq!(stdout(&valid).trim(), "11144477735");

    let formatted = irpf(&store, &["cpf", "11144477735", "--formatted"]);
    assert_eq!(stdout(&formatted).trim(), "111.444.777-35");

    let repeated = irpf(&store, &["cpf", "111.111.111-11"]);
    assert!(!repeated.status.success());

    let wrong_digit = irpf(&store, &["cpf", "111.444.777-36"]);
    assert!(!wrong_digit.status.success());
}

#[test]
fn declaration_workflow() {
    let store = store_path("workflow");

    let created = irpf(&store, &["new", "--taxpayer", TAXPAYER, "--year", "2024"]);
    assert!(created.status.success(), "Command failed: {:?}", created);
    assert!(stdout(&created).contains("Created declaration 1 for year 2024"));

    // same taxpayer and year twice
    let duplicate = irpf(&store, &["new", "--taxpayer", TAXPAYER, "--year", "2024"]);
    assert!(!duplicate.status.success());

    let income = irpf(
        &store,
        &["income", "add", "1", "--source", "Company A", "--type", "salary", "--value", "60000.00"],
    );
    assert!(income.status.success(), "Command failed: {:?}", income);
    assert!(stdout(&income).contains("Company A"));

    let expense = irpf(
        &store,
        &["expense", "add", "1", "--description", "Hospital", "--type", "health", "--value", "5000.00"],
    );
    assert!(expense.status.success(), "Command failed: {:?}", expense);

    let dependent = irpf(
        &store,
        &["dependent", "add", "1", "--name", "Ana", "--cpf", "753.838.240-22", "--birth-date", "2015-03-10"],
    );
    assert!(dependent.status.success(), "Command failed: {:?}", dependent);

    let calculated = irpf(&store, &["calculate", "1", "--json"]);
    assert!(calculated.status.success(), "Command failed: {:?}", calculated);
    let json: serde_json::Value = serde_json::from_str(&stdout(&calculated)).expect("valid JSON");
    assert_eq!(json["tax_due"], "4421.76");

    let submitted = irpf(&store, &["submit", "1"]);
    assert!(submitted.status.success(), "Command failed: {:?}", submitted);
    assert!(stdout(&submitted).contains("Declaration 1 delivered at"));

    let shown = irpf(&store, &["show", "1", "--json"]);
    assert!(shown.status.success(), "Command failed: {:?}", shown);
    let json: serde_json::Value = serde_json::from_str(&stdout(&shown)).expect("valid JSON");
    assert_eq!(json["status"], "DELIVERED");
    assert!(json["delivery_date"].is_string());

    // delivered declarations are frozen
    let late = irpf(
        &store,
        &["income", "add", "1", "--source", "Company B", "--value", "100"],
    );
    assert!(!late.status.success());
    let resubmit = irpf(&store, &["submit", "1"]);
    assert!(!resubmit.status.success());

    let history = irpf(&store, &["history", "--taxpayer", TAXPAYER, "--json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&history)).expect("valid JSON");
    assert_eq!(json.as_array().map(|a| a.len()), Some(1));

    std::fs::remove_file(&store).unwrap();
}

#[test]
fn submit_without_incomes_fails() {
    let store = store_path("empty");
    irpf(&store, &["new", "--taxpayer", TAXPAYER, "--year", "2023"]);

    let submitted = irpf(&store, &["submit", "1"]);
    assert!(!submitted.status.success());
    assert!(String::from_utf8_lossy(&submitted.stderr).contains("no incomes"));

    std::fs::remove_file(&store).unwrap();
}

#[test]
fn import_incomes_from_csv() {
    let store = store_path("import");
    irpf(&store, &["new", "--taxpayer", TAXPAYER, "--year", "2024"]);

    let imported = irpf(
        &store,
        &["income", "import", "1", "--file", "tests/data/incomes.csv"],
    );
    assert!(imported.status.success(), "Command failed: {:?}", imported);
    let out = stdout(&imported);
    assert!(out.contains("Tenant B"));
    assert!(out.contains("Broker C"));

    let calculated = irpf(&store, &["calculate", "1", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&calculated)).expect("valid JSON");
    assert_eq!(json["total_income"], "60000.00");

    let exported = irpf(&store, &["show", "1", "--csv"]);
    assert!(exported.status.success(), "Command failed: {:?}", exported);
    let expected = std::fs::read_to_string("tests/data/incomes.csv").unwrap();
    assert_eq!(stdout(&exported), expected);

    std::fs::remove_file(&store).unwrap();
}

#[test]
fn schema_brackets_is_valid_json() {
    let store = store_path("schema");
    let output = irpf(&store, &["schema", "brackets"]);
    assert!(output.status.success(), "Command failed: {:?}", output);

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).expect("valid JSON");
    let brackets = json.as_array().expect("array of brackets");
    assert_eq!(brackets.len(), 5);
    assert!(brackets[4]["upper_bound"].is_null());
}
