pub mod types;
pub mod error_catalog;
pub mod error;
pub mod error_map;
pub mod guardrails;
pub mod decimal;
pub mod coin;
pub mod pool;
pub mod swap;
pub mod pricing;
pub mod snapshot;
pub mod ref_golden;

pub use coin::{Coin, RateTable};
pub use decimal::Dec;
pub use error::{MarketError, Result};
pub use error_catalog::MarketErrorCode;
pub use pool::{PoolParameters, VirtualPools};
pub use swap::{apply_spread, convert_via_reference, price_swap, swap_terms, SwapTerms};
