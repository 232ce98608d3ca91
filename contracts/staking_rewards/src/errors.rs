use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    NotAuthorized = 3,
    InvalidAmount = 4,
    InsufficientBalance = 5,
    RewardPeriodActive = 6,
    ZeroRewardRate = 7,
    InsufficientRewardBalance = 8,
    TransferFailed = 9,
    TokensIdentical = 10,
    DurationNotSet = 11,
    NoPendingOwner = 12,
    /// An accrual result does not fit in `i128`.
    MathOverflow = 13,
}
