//! Execution domain - transaction building and submission

pub mod swap_executor;

pub use swap_executor::{Signer, SwapExecutor};
