//! Small collection helpers shared by the compiler crates.

pub mod keyvec;
pub mod peek;
