use crate::UnsignedGas;

/// `V`: The total number of validators.
pub const VALIDATOR_COUNT: usize = 6;

/// `C`: The total number of cores.
pub const CORE_COUNT: usize = 2;

/// `E`: The length of an epoch in timeslots.
pub const EPOCH_LENGTH: usize = 12;

/// `G_T`: The total gas allocated across for all Accumulation.
pub const ACCUMULATION_GAS_ALL_CORES: UnsignedGas = 20_000_000;
