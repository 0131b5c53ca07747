//! Well-known field names and verdict codes.
//!
//! The engine's semantic checks key off these names. An interface that uses
//! them opts into the corresponding check; an interface that does not is
//! only checked structurally.

/// State and meta field names.
pub mod field {
    pub const ASSET_OWNER: &str = "assetOwner";
    pub const ISSUED_SUPPLY: &str = "issuedSupply";
    pub const BURNED_SUPPLY: &str = "burnedSupply";
    pub const REPLACED_SUPPLY: &str = "replacedSupply";
    pub const INFLATION_ALLOWANCE: &str = "inflationAllowance";
    pub const TOKENS: &str = "tokens";
    pub const ENGRAVINGS: &str = "engravings";
    pub const ATTACHMENTS: &str = "attachments";

    /// Meta carrying a reserve proof.
    pub const RESERVES: &str = "reserves";
    /// Meta carrying a burn proof.
    pub const BURN_PROOF: &str = "burnProof";

    /// Globals whose values must be revealed amounts.
    pub const SUPPLY_FIELDS: [&str; 3] = [ISSUED_SUPPLY, BURNED_SUPPLY, REPLACED_SUPPLY];
}

/// Engine-reserved structural codes. Never declared by interfaces.
pub mod structural {
    pub const UNKNOWN_OPERATION: &str = "unknownOperation";
    pub const KIND_MISMATCH: &str = "kindMismatch";
    pub const UNDECLARED_FIELD: &str = "undeclaredField";
    pub const FIELD_KIND_MISMATCH: &str = "fieldKindMismatch";
    pub const UNEXPECTED_FIELD: &str = "unexpectedField";
    pub const OCCURRENCES_MISMATCH: &str = "occurrencesMismatch";
    pub const UNKNOWN_ALLOCATION: &str = "unknownAllocation";
    pub const STATE_TYPE_MISMATCH: &str = "stateTypeMismatch";
}

/// Contract-level codes, declared per operation.
pub mod code {
    pub const NON_EQUAL_AMOUNTS: &str = "nonEqualAmounts";
    pub const NON_EQUAL_VALUES: &str = "nonEqualValues";
    pub const SUPPLY_MISMATCH: &str = "supplyMismatch";
    pub const INSUFFICIENT_COVERAGE: &str = "insufficientCoverage";
    pub const ISSUE_EXCEEDS_ALLOWANCE: &str = "issueExceedsAllowance";
    pub const INSUFFICIENT_RESERVES: &str = "insufficientReserves";
    pub const INVALID_PROOF: &str = "invalidProof";
    pub const FRACTION_OVERFLOW: &str = "fractionOverflow";
    pub const NON_FRACTIONAL_TOKEN: &str = "nonFractionalToken";
    pub const INVALID_ATTACHMENT_TYPE: &str = "invalidAttachmentType";
    pub const NON_ENGRAVABLE_TOKEN: &str = "nonEngravableToken";
}
