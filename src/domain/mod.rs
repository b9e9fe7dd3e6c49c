pub mod assembler;
pub mod bill;
pub mod billing;
pub mod errors;
pub mod money;
pub mod ports;
