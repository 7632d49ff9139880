#![cfg_attr(not(test), no_std)]
#![cfg_attr(not(test), no_main)]
extern crate alloc;

// Shared fixed-point and interest math
pub mod math;

// Lending Protocol modules
pub mod lending;

// Yield Strategy modules
pub mod strategies;
