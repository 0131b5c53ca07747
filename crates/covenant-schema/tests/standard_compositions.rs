//! Integration tests: compose the standard library and verify operations
//! against the resulting interfaces.

use covenant_kernel::transparent::{MemoryLedger, ProofTable, RevealedAggregator};
use covenant_kernel::{
    AllocationRef, Capabilities, CompositionError, EffectiveContractInterface, FieldName,
    Fraction, Interface, OpName, Operation, ResolutionCache, ResolverConfig, StateValue,
    TokenSpec, Verdict, resolve, resolve_with, verify,
};
use covenant_schema::{
    FungibleFeatures, Inflation, StandardInterface, load_into, parse_interface, standard_catalog,
};
use std::sync::Arc;
use StandardInterface::*;

fn compose(members: &[StandardInterface]) -> Result<EffectiveContractInterface, CompositionError> {
    let ifaces: Vec<Interface> = members.iter().map(|m| m.interface().unwrap()).collect();
    resolve(&ifaces)
}

fn field(name: &str) -> FieldName {
    FieldName::new(name).unwrap()
}

fn op(name: &str) -> OpName {
    OpName::new(name).unwrap()
}

fn code(verdict: &Verdict) -> Option<&str> {
    verdict.rejection().map(|r| r.code.as_str())
}

fn check(
    iface: &EffectiveContractInterface,
    operation: &Operation,
    ledger: &MemoryLedger,
    proofs: &ProofTable,
) -> Verdict {
    let caps = Capabilities::new(proofs, &RevealedAggregator, ledger);
    verify(iface, operation, caps).unwrap()
}

#[test]
fn fixed_reservable_asset_has_only_genesis_and_transfer() {
    let effective = compose(&[FungibleAsset, FixedAsset, ReservableAsset]).unwrap();
    let names: Vec<&str> = effective.operation_names().map(|n| n.as_str()).collect();
    assert_eq!(names, ["genesis", "transfer"]);
    assert!(effective.warnings.is_empty(), "{:?}", effective.warnings);

    let genesis = effective.operation("genesis").unwrap();
    assert!(genesis.meta.contains("reserves"));
    assert_eq!(
        genesis.assigns["assetOwner"],
        covenant_kernel::Multiplicity::OneOrMany
    );
}

#[test]
fn inflatable_issue_needs_reservable() {
    let effective = compose(&[FungibleAsset, InflatableAsset, ReservableAsset]).unwrap();
    let issue = effective.operation("issue").unwrap();
    assert!(issue.required);
    assert!(issue.meta.contains("reserves"));
    assert!(issue.declares_error("issueExceedsAllowance"));
    assert!(issue.declares_error("insufficientReserves"));

    let err = compose(&[FungibleAsset, InflatableAsset]).unwrap_err();
    assert!(matches!(
        err,
        CompositionError::UnresolvedAbstract { ref operation, ref declared_by }
            if operation == "issue" && declared_by == "InflatableAsset"
    ));
}

#[test]
fn redeclaring_a_final_operation_fails() {
    let widen = parse_interface(
        "interface LooseTransfer v1\n  timestamp @0\n  transition transfer: override\n    errors: nonEqualAmounts\nend\n",
    )
    .unwrap();
    let ifaces = vec![FungibleAsset.interface().unwrap(), widen];
    assert!(matches!(
        resolve(&ifaces),
        Err(CompositionError::FinalOverrideViolation { ref finalized_by, .. })
            if finalized_by == "FungibleAsset"
    ));
}

#[test]
fn alternative_nft_roots_do_not_compose() {
    assert!(compose(&[UniqueAsset, FractionableAsset]).is_err());
}

#[test]
fn every_preset_with_reserves_resolves_cleanly() {
    let inflations = [
        Inflation::Fixed,
        Inflation::Burnable,
        Inflation::Inflatable,
        Inflation::InflatableBurnable,
        Inflation::Replaceable,
    ];
    for inflation in inflations {
        for renaming in [false, true] {
            let features = FungibleFeatures {
                renaming,
                reserves: true,
                inflation,
            };
            let effective = features
                .resolve()
                .unwrap_or_else(|e| panic!("{features:?}: {e}"));
            assert!(effective.warnings.is_empty(), "{features:?}: {:?}", effective.warnings);
            assert_eq!(effective.operation("rename").is_some(), renaming);
            assert_eq!(effective.operation("issue").is_some(), inflation.is_inflatable());
            assert_eq!(effective.operation("burn").is_some(), inflation.is_burnable());
            assert_eq!(effective.operation("replace").is_some(), inflation.is_replaceable());
        }
    }
}

#[test]
fn inflatable_presets_without_reserves_stay_abstract() {
    let features = FungibleFeatures {
        inflation: Inflation::Inflatable,
        ..FungibleFeatures::none()
    };
    assert!(matches!(
        features.resolve(),
        Err(CompositionError::UnresolvedAbstract { .. })
    ));
    assert!(FungibleFeatures::none().resolve().is_ok());
}

#[test]
fn nft_compositions_resolve() {
    let effective = compose(&[FractionableAsset, EngravableAsset, AttachableAsset]).unwrap();
    assert!(effective.warnings.is_empty(), "{:?}", effective.warnings);
    let genesis = effective.operation("genesis").unwrap();
    assert!(genesis.globals.contains_key("attachments"));
    assert!(genesis.declares_error("invalidAttachmentType"));
    assert!(effective.operation("engrave").is_some());
    assert_eq!(effective.default_operation.as_ref().unwrap(), "transfer");

    assert!(compose(&[UniqueAsset, EngravableAsset]).is_ok());
}

#[test]
fn resolution_is_deterministic() {
    let first = FungibleFeatures::all().resolve().unwrap();
    let second = FungibleFeatures::all().resolve().unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(first.canonical_bytes().unwrap(), second.canonical_bytes().unwrap());

    let without_renaming = FungibleFeatures {
        renaming: false,
        ..FungibleFeatures::all()
    }
    .resolve()
    .unwrap();
    assert_ne!(first.id, without_renaming.id);
}

#[test]
fn denied_warnings_fail_composition() {
    let sloppy = parse_interface(
        "interface Sloppy v1\n  timestamp @0\n  genesis\n    errors: neverDeclared\nend\n",
    )
    .unwrap();
    let lenient = resolve(&[sloppy.clone()]).unwrap();
    assert_eq!(lenient.warnings.len(), 1);

    let strict = ResolverConfig {
        deny_warnings: true,
        ..ResolverConfig::default()
    };
    assert!(matches!(
        resolve_with(&[sloppy], &strict),
        Err(CompositionError::WarningsDenied { count: 1, .. })
    ));
}

#[test]
fn presets_resolve_from_the_catalog_through_the_cache() {
    let catalog = standard_catalog().unwrap();
    let cache = ResolutionCache::default();
    let features = FungibleFeatures::all();
    let first = features.resolve_from(&catalog, &cache).unwrap();
    let second = features.resolve_from(&catalog, &cache).unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.id, features.resolve().unwrap().id);
}

#[test]
fn load_into_registers_every_declaration() {
    let catalog = standard_catalog().unwrap();
    let text = "interface Extra v1\n  timestamp @0\nend\n\ninterface Extra v2\n  timestamp @1\nend\n";
    let registrations = load_into(&catalog, text).unwrap();
    assert_eq!(registrations.len(), 2);
    assert_eq!(catalog.versions("Extra").len(), 2);

    assert!(matches!(
        load_into(&catalog, "interface Broken v1\n  nonsense\nend\n"),
        Err(covenant_kernel::CatalogError::MalformedDeclaration { .. })
    ));
}

// Verification against standard compositions.

fn amounts(ledger: &mut MemoryLedger, op_id: &str, values: &[u64]) {
    for (index, amount) in values.iter().enumerate() {
        ledger.insert(
            AllocationRef::new(op_id, index as u32),
            StateValue::amount(*amount),
        );
    }
}

fn transfer(inputs: &[(&str, u32)], outputs: &[u64]) -> Operation {
    let mut operation = Operation::transition(op("transfer"));
    for (op_id, index) in inputs {
        operation = operation.input(field("assetOwner"), AllocationRef::new(*op_id, *index));
    }
    for amount in outputs {
        operation = operation.assign(field("assetOwner"), StateValue::amount(*amount));
    }
    operation
}

#[test]
fn balanced_and_unbalanced_transfers() {
    let effective = compose(&[FungibleAsset, FixedAsset]).unwrap();
    let mut ledger = MemoryLedger::new();
    amounts(&mut ledger, "g", &[5, 7]);
    let proofs = ProofTable::default();

    let balanced = transfer(&[("g", 0), ("g", 1)], &[5, 7]);
    assert!(check(&effective, &balanced, &ledger, &proofs).is_valid());

    let inflated = transfer(&[("g", 0), ("g", 1)], &[5, 8]);
    let verdict = check(&effective, &inflated, &ledger, &proofs);
    assert_eq!(code(&verdict), Some("nonEqualAmounts"));
    assert_eq!(
        verdict.rejection().unwrap().message,
        "the sum of spent assets doesn't equal to the sum of assets in outputs"
    );
}

#[test]
fn genesis_supply_must_match_allocations() {
    let effective = compose(&[FungibleAsset, FixedAsset]).unwrap();
    let genesis = Operation::genesis()
        .global(field("issuedSupply"), StateValue::amount(100))
        .assign(field("assetOwner"), StateValue::amount(60))
        .assign(field("assetOwner"), StateValue::amount(30));
    let verdict = check(&effective, &genesis, &MemoryLedger::new(), &ProofTable::default());
    assert_eq!(code(&verdict), Some("supplyMismatch"));
}

#[test]
fn issue_within_and_beyond_allowance() {
    let effective = compose(&[FungibleAsset, InflatableAsset, ReservableAsset]).unwrap();
    let proofs = ProofTable::default().with_reserve("vault", 1_000);
    let mut ledger = MemoryLedger::new();

    let genesis = Operation::genesis()
        .global(field("issuedSupply"), StateValue::amount(100))
        .assign(field("assetOwner"), StateValue::amount(100))
        .assign(field("inflationAllowance"), StateValue::amount(50))
        .meta(field("reserves"), "vault");
    assert!(check(&effective, &genesis, &ledger, &proofs).is_valid());
    let outputs = ledger.record("g", &genesis);
    // Assigned values are numbered in field order: assetOwner, then inflationAllowance.
    let allowance = outputs[1].clone();

    let issue = |minted: u64, remaining: u64| {
        Operation::transition(op("issue"))
            .global(field("issuedSupply"), StateValue::amount(minted))
            .input(field("inflationAllowance"), allowance.clone())
            .assign(field("assetOwner"), StateValue::amount(minted))
            .assign(field("inflationAllowance"), StateValue::amount(remaining))
            .meta(field("reserves"), "vault")
    };
    assert!(check(&effective, &issue(30, 20), &ledger, &proofs).is_valid());

    let verdict = check(&effective, &issue(40, 20), &ledger, &proofs);
    assert_eq!(code(&verdict), Some("issueExceedsAllowance"));

    let unbacked = ProofTable::default().with_reserve("vault", 10);
    let verdict = check(&effective, &issue(30, 20), &ledger, &unbacked);
    assert_eq!(code(&verdict), Some("insufficientReserves"));
}

fn fraction(text: &str) -> Fraction {
    Fraction::from_decimal(text).unwrap()
}

fn nft_ledger(fractionable: bool) -> MemoryLedger {
    let mut ledger = MemoryLedger::new();
    let token = TokenSpec {
        fractionable,
        ..TokenSpec::strict(1)
    };
    ledger.push_global(field("tokens"), StateValue::Token(token));
    ledger.insert(AllocationRef::new("g", 0), StateValue::fraction(1, Fraction::UNIT));
    ledger
}

fn nft_transfer(inputs: &[(&str, u32)], outputs: &[&str]) -> Operation {
    let mut operation = Operation::transition(op("transfer"));
    for (op_id, index) in inputs {
        operation = operation.input(field("assetOwner"), AllocationRef::new(*op_id, *index));
    }
    for text in outputs {
        operation = operation.assign(field("assetOwner"), StateValue::fraction(1, fraction(text)));
    }
    operation
}

#[test]
fn fractions_split_within_one_token() {
    let effective = compose(&[FractionableAsset]).unwrap();
    let ledger = nft_ledger(true);

    let split = nft_transfer(&[("g", 0)], &["0.4", "0.6"]);
    assert!(check(&effective, &split, &ledger, &ProofTable::default()).is_valid());
}

#[test]
fn splitting_a_whole_token_beyond_one_overflows() {
    let effective = compose(&[FractionableAsset]).unwrap();
    let ledger = nft_ledger(true);

    let overflow = nft_transfer(&[("g", 0)], &["0.6", "0.5"]);
    let verdict = check(&effective, &overflow, &ledger, &ProofTable::default());
    assert_eq!(code(&verdict), Some("fractionOverflow"));
    assert_eq!(verdict.rejection().unwrap().field, Some(field("assetOwner")));
}

#[test]
fn splitting_a_whole_token_below_one_is_unbalanced() {
    let effective = compose(&[FractionableAsset]).unwrap();
    let ledger = nft_ledger(true);

    let short = nft_transfer(&[("g", 0)], &["0.4", "0.5"]);
    let verdict = check(&effective, &short, &ledger, &ProofTable::default());
    assert_eq!(code(&verdict), Some("nonEqualValues"));
}

#[test]
fn strict_tokens_move_whole() {
    let effective = compose(&[FractionableAsset]).unwrap();
    let ledger = nft_ledger(false);

    let split = nft_transfer(&[("g", 0)], &["0.4", "0.6"]);
    let verdict = check(&effective, &split, &ledger, &ProofTable::default());
    assert_eq!(code(&verdict), Some("nonFractionalToken"));

    let whole_with_empty = nft_transfer(&[("g", 0)], &["1", "0"]);
    assert!(check(&effective, &whole_with_empty, &ledger, &ProofTable::default()).is_valid());
}
