//! Integration tests: run the verification vectors.
//!
//! Each fixture in tests/fixtures/ has:
//! - case.json: the interfaces to compose, a ledger, a proof table and the
//!   operation under test
//! - expect.json: the expected verdict
//!
//! Verdicts are compared as JSON, so rejection witness ids must match exactly.

use covenant_kernel::transparent::{MemoryLedger, ProofTable, RevealedAggregator};
use covenant_kernel::{Capabilities, Interface, Operation, resolve, verify};
use serde_json::Value;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn field<T: serde::de::DeserializeOwned>(case: &Value, key: &str, name: &str) -> T {
    serde_json::from_value(case[key].clone())
        .unwrap_or_else(|e| panic!("fixture {name}: bad `{key}`: {e}"))
}

fn run_fixture(name: &str) {
    let dir = fixtures_dir().join(name);

    let case_path = dir.join("case.json");
    let expect_path = dir.join("expect.json");

    let case_str = std::fs::read_to_string(&case_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", case_path.display()));
    let expect_str = std::fs::read_to_string(&expect_path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", expect_path.display()));

    let case: Value = serde_json::from_str(&case_str)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", case_path.display()));
    let expected: Value = serde_json::from_str(&expect_str)
        .unwrap_or_else(|e| panic!("failed to parse {}: {e}", expect_path.display()));

    let interfaces: Vec<Interface> = field(&case, "interfaces", name);
    let ledger: MemoryLedger = field(&case, "ledger", name);
    let proofs: ProofTable = field(&case, "proofs", name);
    let operation: Operation = field(&case, "operation", name);

    let effective = resolve(&interfaces)
        .unwrap_or_else(|e| panic!("fixture {name}: composition failed: {e}"));
    assert!(
        effective.warnings.is_empty(),
        "fixture {name}: unexpected warnings {:?}",
        effective.warnings
    );

    let caps = Capabilities::new(&proofs, &RevealedAggregator, &ledger);
    let verdict = verify(&effective, &operation, caps)
        .unwrap_or_else(|e| panic!("fixture {name}: engine defect: {e}"));
    let verdict_json = serde_json::to_value(&verdict).expect("failed to serialize verdict");

    assert_eq!(
        verdict_json,
        expected,
        "\n\nFixture: {name}\n\nGot:\n{}\n\nExpected:\n{}\n",
        serde_json::to_string_pretty(&verdict_json).unwrap(),
        serde_json::to_string_pretty(&expected).unwrap(),
    );
}

#[test]
fn every_fixture_directory_has_a_test() {
    let mut found: Vec<String> = std::fs::read_dir(fixtures_dir())
        .expect("fixtures dir")
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_dir())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    found.sort();
    let mut listed = FIXTURES.to_vec();
    listed.sort();
    assert_eq!(found, listed);
}

const FIXTURES: &[&str] = &[
    "golden_transfer_balanced",
    "golden_issue_within_allowance",
    "golden_burn_with_change",
    "golden_nft_fraction_split",
    "golden_replace_balanced",
    "adversarial_transfer_non_equal_amounts",
    "adversarial_transfer_unknown_allocation",
    "adversarial_genesis_supply_mismatch",
    "adversarial_genesis_insufficient_reserves",
    "adversarial_genesis_missing_reserve_proof",
    "adversarial_issue_exceeds_allowance",
    "adversarial_burn_insufficient_coverage",
    "adversarial_burn_rejected_proof",
    "adversarial_burn_exceeds_issued",
    "adversarial_replace_non_equal_amounts",
    "adversarial_replace_insufficient_coverage",
    "adversarial_replace_exceeds_issued",
    "adversarial_nft_non_equal_values",
    "adversarial_nft_fraction_overflow",
    "adversarial_nft_non_fractional_token",
    "adversarial_nft_engraving_forbidden",
    "adversarial_nft_attachment_type",
];

#[test]
fn golden_transfer_balanced() {
    run_fixture("golden_transfer_balanced");
}

#[test]
fn golden_issue_within_allowance() {
    run_fixture("golden_issue_within_allowance");
}

#[test]
fn golden_burn_with_change() {
    run_fixture("golden_burn_with_change");
}

#[test]
fn golden_nft_fraction_split() {
    run_fixture("golden_nft_fraction_split");
}

#[test]
fn adversarial_transfer_non_equal_amounts() {
    run_fixture("adversarial_transfer_non_equal_amounts");
}

#[test]
fn adversarial_transfer_unknown_allocation() {
    run_fixture("adversarial_transfer_unknown_allocation");
}

#[test]
fn adversarial_genesis_supply_mismatch() {
    run_fixture("adversarial_genesis_supply_mismatch");
}

#[test]
fn adversarial_genesis_insufficient_reserves() {
    run_fixture("adversarial_genesis_insufficient_reserves");
}

#[test]
fn adversarial_genesis_missing_reserve_proof() {
    run_fixture("adversarial_genesis_missing_reserve_proof");
}

#[test]
fn adversarial_issue_exceeds_allowance() {
    run_fixture("adversarial_issue_exceeds_allowance");
}

#[test]
fn adversarial_burn_insufficient_coverage() {
    run_fixture("adversarial_burn_insufficient_coverage");
}

#[test]
fn adversarial_burn_rejected_proof() {
    run_fixture("adversarial_burn_rejected_proof");
}

#[test]
fn adversarial_nft_non_equal_values() {
    run_fixture("adversarial_nft_non_equal_values");
}

#[test]
fn adversarial_nft_fraction_overflow() {
    run_fixture("adversarial_nft_fraction_overflow");
}

#[test]
fn adversarial_nft_non_fractional_token() {
    run_fixture("adversarial_nft_non_fractional_token");
}

#[test]
fn adversarial_nft_engraving_forbidden() {
    run_fixture("adversarial_nft_engraving_forbidden");
}

#[test]
fn adversarial_nft_attachment_type() {
    run_fixture("adversarial_nft_attachment_type");
}

#[test]
fn golden_replace_balanced() {
    run_fixture("golden_replace_balanced");
}

#[test]
fn adversarial_burn_exceeds_issued() {
    run_fixture("adversarial_burn_exceeds_issued");
}

#[test]
fn adversarial_replace_non_equal_amounts() {
    run_fixture("adversarial_replace_non_equal_amounts");
}

#[test]
fn adversarial_replace_insufficient_coverage() {
    run_fixture("adversarial_replace_insufficient_coverage");
}

#[test]
fn adversarial_replace_exceeds_issued() {
    run_fixture("adversarial_replace_exceeds_issued");
}

#[test]
fn verdicts_are_reproducible() {
    for name in FIXTURES {
        let case: Value = serde_json::from_str(
            &std::fs::read_to_string(fixtures_dir().join(name).join("case.json")).unwrap(),
        )
        .unwrap();
        let interfaces: Vec<Interface> = field(&case, "interfaces", name);
        let ledger: MemoryLedger = field(&case, "ledger", name);
        let proofs: ProofTable = field(&case, "proofs", name);
        let operation: Operation = field(&case, "operation", name);

        let first = resolve(&interfaces).unwrap();
        let second = resolve(&interfaces).unwrap();
        assert_eq!(
            first.canonical_bytes().unwrap(),
            second.canonical_bytes().unwrap(),
            "{name}"
        );

        let caps = Capabilities::new(&proofs, &RevealedAggregator, &ledger);
        assert_eq!(
            verify(&first, &operation, caps).unwrap(),
            verify(&second, &operation, caps).unwrap(),
            "{name}"
        );
    }
}
