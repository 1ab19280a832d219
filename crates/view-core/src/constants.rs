//! Deploy-time protocol constants, named the way
//! `relayer-onsocial/src/constants.rs` names its gas and confirmation
//! constants rather than inlining magic numbers into handlers.

/// Upper bound on any single native-token amount (spec §3, §4.2). Chosen well
/// below `u64::MAX` so intermediate sums in fee/royalty math cannot silently
/// wrap even before the explicit `checked_add` calls run.
pub const MAX_NATIVE_TOKEN_SUPPLY_BASE_UNITS: u64 = 10_000_000_000 * NATIVE_TOKEN_BASE_UNITS_PER_UNIT;

pub const NATIVE_TOKEN_BASE_UNITS_PER_UNIT: u64 = 1_000_000_000;

/// A transaction may not exceed half the block size limit (spec §4.1).
pub const MAX_BLOCK_SIZE_BYTES: u64 = 8_000_000;
pub const MAX_TXN_SIZE_BYTES: u64 = MAX_BLOCK_SIZE_BYTES / 2;

/// Average seconds between blocks, used to translate the maturity interval
/// into a confirmation count (spec §3: "ceil(maturity / block-time)").
pub const BLOCK_TIME_SECONDS: u64 = 60;
pub const BLOCK_REWARD_MATURITY_SECONDS: u64 = 60 * 60 * 3;

pub fn block_reward_maturity_confirmations() -> u64 {
    (BLOCK_REWARD_MATURITY_SECONDS + BLOCK_TIME_SECONDS - 1) / BLOCK_TIME_SECONDS
}

/// Denominator for every basis-point field (founder share, royalties,
/// transfer fees).
pub const BASIS_POINTS_DENOMINATOR: u32 = 10_000;

/// Bancor reserve ratio for the creator-coin bonded curve, expressed as a
/// fraction in (0, 1]. DeSo-style social chains fix this at 1/3.
pub const CREATOR_COIN_RESERVE_RATIO: f64 = 1.0 / 3.0;

/// Allowed diamond levels and their native-token cost in base units.
pub const DIAMOND_LEVELS: [(u8, u64); 6] = [
    (1, 50_000_000),
    (2, 500_000_000),
    (3, 5_000_000_000),
    (4, 50_000_000_000),
    (5, 500_000_000_000),
    (6, 5_000_000_000_000),
];

pub const MIN_DIAMOND_ACTIVATION_HEIGHT: u64 = 0;

/// Flat block-reward schedule (spec §4.1 `baseReward(height)`): the source
/// this spec distills from does not fix a halving schedule, so the core ships
/// a single constant rather than inventing one.
pub const BASE_BLOCK_REWARD_BASE_UNITS: u64 = 50 * NATIVE_TOKEN_BASE_UNITS_PER_UNIT;

pub fn base_reward(_height: u64) -> u64 {
    BASE_BLOCK_REWARD_BASE_UNITS
}

/// Messaging-group key-name length bounds (spec §4.3 "MessagingGroup").
pub const MESSAGING_GROUP_NAME_MIN_LEN: usize = 1;
pub const MESSAGING_GROUP_NAME_MAX_LEN: usize = 32;
pub const MESSAGING_GROUP_NAME_WIRE_WIDTH: usize = 32;
pub const DEFAULT_MESSAGING_GROUP_NAME: &str = "default-key";

/// Default global parameters a fresh view starts with, mirroring the
/// defaults a genesis block would carry.
pub const DEFAULT_EXCHANGE_RATE_CENTS_PER_UNIT: u64 = 100;
pub const DEFAULT_PROFILE_CREATION_FEE_BASE_UNITS: u64 = 0;
pub const DEFAULT_NFT_CREATION_FEE_BASE_UNITS: u64 = 0;
pub const DEFAULT_MAX_NFT_COPIES: u64 = 10_000;
pub const DEFAULT_MIN_FEE_PER_KB_BASE_UNITS: u64 = 1_000;
