use thiserror::Error;

/// Named consensus-rule variants (spec §6 "Error taxonomy on the wire").
///
/// `Display` renders the wire name used for log-based debugging; arithmetic
/// failures are folded in here rather than given their own type, per spec §7
/// ("Arithmetic errors ... treated as rule errors").
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RuleError {
    // -- structural / sizing --
    #[error("txn-too-large")]
    TxnTooLarge,
    #[error("txn-malformed")]
    TxnMalformed,

    // -- inputs / outputs / fees --
    #[error("input-spends-nonexistent-utxo")]
    InputSpendsNonexistentUtxo,
    #[error("input-spends-already-spent-utxo")]
    InputSpendsAlreadySpentUtxo,
    #[error("input-public-key-mismatch")]
    InputPublicKeyMismatch,
    #[error("input-spends-immature-block-reward")]
    InputSpendsImmatureBlockReward,
    #[error("output-amount-invalid")]
    OutputAmountInvalid,
    #[error("input-amount-overflow")]
    InputAmountOverflow,
    #[error("output-amount-overflow")]
    OutputAmountOverflow,
    #[error("total-input-less-than-total-output")]
    TotalInputLessThanTotalOutput,
    #[error("fee-below-minimum")]
    FeeBelowMinimum,
    #[error("block-reward-has-inputs")]
    BlockRewardHasInputs,
    #[error("block-reward-has-signature")]
    BlockRewardHasSignature,
    #[error("block-reward-exceeds-allowed")]
    BlockRewardExceedsAllowed,

    // -- signatures / derived keys --
    #[error("signature-invalid")]
    SignatureInvalid,
    #[error("signature-missing")]
    SignatureMissing,
    #[error("derived-key-not-authorized")]
    DerivedKeyNotAuthorized,
    #[error("derived-key-expired")]
    DerivedKeyExpired,
    #[error("derived-key-revoked")]
    DerivedKeyRevoked,
    #[error("derived-key-owner-signature-required")]
    DerivedKeyOwnerSignatureRequired,

    // -- diamonds --
    #[error("diamond-post-not-found")]
    DiamondPostNotFound,
    #[error("diamond-self-tip")]
    DiamondSelfTip,
    #[error("diamond-level-invalid")]
    DiamondLevelInvalid,
    #[error("diamond-level-not-increasing")]
    DiamondLevelNotIncreasing,
    #[error("diamond-payment-insufficient")]
    DiamondPaymentInsufficient,

    // -- identity / profile --
    #[error("username-taken")]
    UsernameTaken,
    #[error("username-invalid")]
    UsernameInvalid,
    #[error("profile-not-found")]
    ProfileNotFound,
    #[error("profile-fee-not-paid")]
    ProfileFeeNotPaid,
    #[error("nft-creation-fee-not-paid")]
    NftCreationFeeNotPaid,

    // -- creator coin / dao coin --
    #[error("creator-coin-reserve-negative")]
    CreatorCoinReserveNegative,
    #[error("creator-coin-insufficient-balance")]
    CreatorCoinInsufficientBalance,
    #[error("creator-coin-transfer-restricted")]
    CreatorCoinTransferRestricted,
    #[error("creator-coin-founder-bp-invalid")]
    CreatorCoinFounderBpInvalid,
    #[error("dao-coin-minting-disabled")]
    DaoCoinMintingDisabled,
    #[error("dao-coin-insufficient-balance")]
    DaoCoinInsufficientBalance,

    // -- posts / social graph --
    #[error("post-not-found")]
    PostNotFound,
    #[error("post-timestamp-collision")]
    PostTimestampCollision,
    #[error("post-author-mismatch")]
    PostAuthorMismatch,
    #[error("post-already-nft")]
    PostAlreadyNft,
    #[error("post-nft-edit-restricted")]
    PostNftEditRestricted,

    // -- royalties --
    #[error("royalty-sum-exceeds-bound")]
    RoyaltySumExceedsBound,
    #[error("royalty-author-in-additional-map")]
    RoyaltyAuthorInAdditionalMap,

    // -- nft --
    #[error("nft-max-copies-exceeded")]
    NftMaxCopiesExceeded,
    #[error("nft-not-found")]
    NftNotFound,
    #[error("nft-not-for-sale")]
    NftNotForSale,
    #[error("nft-not-owner")]
    NftNotOwner,
    #[error("nft-pending-transfer")]
    NftPendingTransfer,
    #[error("nft-not-pending-transfer")]
    NftNotPendingTransfer,
    #[error("nft-buy-now-with-unlockable")]
    NftBuyNowWithUnlockable,
    #[error("nft-bid-too-low")]
    NftBidTooLow,
    #[error("nft-bid-not-found")]
    NftBidNotFound,
    #[error("nft-serial-already-burned")]
    NftSerialAlreadyBurned,
    #[error("nft-copies-for-sale-exceeds-available")]
    NftCopiesForSaleExceedsAvailable,

    // -- messaging --
    #[error("message-timestamp-collision")]
    MessageTimestampCollision,
    #[error("message-version-invalid")]
    MessageVersionInvalid,
    #[error("messaging-group-name-invalid")]
    MessagingGroupNameInvalid,
    #[error("messaging-group-reserved-name")]
    MessagingGroupReservedName,
    #[error("messaging-group-not-found")]
    MessagingGroupNotFound,

    // -- global params / admin --
    #[error("not-admin")]
    NotAdmin,
    #[error("global-param-out-of-bounds")]
    GlobalParamOutOfBounds,
    #[error("double-mint-burn-txn")]
    DoubleMintBurnTxn,

    // -- block-level --
    #[error("block-parent-mismatch")]
    BlockParentMismatch,
    #[error("block-hash-mismatch")]
    BlockHashMismatch,
}

/// The overlay or undo log is internally inconsistent — spec §7 class 3,
/// fatal. Never returned from a handler; only ever raised by disconnect logic
/// that finds state it cannot possibly have produced itself.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CorruptionError {
    #[error("undo record references a utxo that is already live: {0:?}:{1}")]
    UtxoAlreadyLive(chain_types::Hash256, u32),
    #[error("undo record references an entry this view never produced")]
    UndoEntryMismatch(&'static str),
    #[error("undo log exhausted before all transaction effects were reversed")]
    UndoLogExhausted,
}
