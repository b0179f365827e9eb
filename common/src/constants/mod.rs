use crate::{Balance, UnsignedGas};

/// Size of Hash type in octets.
pub const HASH_SIZE: usize = 32;

/// Size of validator public key in octets.
pub const PUBLIC_KEY_SIZE: usize = 336;

/// `W_T`: The size of a transfer memo in octets.
pub const TRANSFER_MEMO_SIZE: usize = 128;

/// `Q`: The number of items in the authorizations queue.
pub const AUTH_QUEUE_SIZE: usize = 80;

/// `J`: The maximum sum of dependency items in a work-report.
pub const MAX_REPORT_DEPENDENCIES: usize = 8;

// --- Service Account Balance Requirements

/// `B_I`: The additional minimum balance required per item of elective service state.
pub const MIN_BALANCE_PER_ITEM: Balance = 10;

/// `B_L`: The additional minimum balance required per octet of elective service state.
pub const MIN_BALANCE_PER_OCTET: Balance = 1;

/// `B_S`: The basic minimum balance which all services require.
pub const MIN_BASIC_BALANCE: Balance = 100;

// --- Gas Limits

/// `G_A`: The gas allocated to invoke a work-report's Accumulation logic.
pub const ACCUMULATION_GAS_PER_CORE: UnsignedGas = 10_000_000;
