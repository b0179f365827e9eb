use crate::UnsignedGas;

/// `V`: The total number of validators.
pub const VALIDATOR_COUNT: usize = 1_023;

/// `C`: The total number of cores.
pub const CORE_COUNT: usize = 341;

/// `E`: The length of an epoch in timeslots.
pub const EPOCH_LENGTH: usize = 600;

/// `G_T`: The total gas allocated across for all Accumulation.
pub const ACCUMULATION_GAS_ALL_CORES: UnsignedGas = 3_500_000_000;
