//! Token Swapper Contract
//!
//! Liquidity pool registry, best-route search and swap execution.
//!
//! ## Components
//!
//! - **LiquidityRegistry**: pools per pair and fee tier, hub tokens
//! - **RouteOptimizer**: deterministic best-output route search
//! - **execute_route**: all-or-nothing swap along a route
//! - **codec**: CBOR route encoding for off-path submission
//!
//! Pool reserves are the balances held by pool addresses in the
//! [`TokenLedger`](vaultzap_common::token_ops::TokenLedger); any
//! [`ReserveSource`](vaultzap_common::traits::ReserveSource) can be quoted.

pub mod codec;
pub mod execute;
pub mod optimizer;
pub mod pool;
pub mod quote;

pub use codec::{decode_route, encode_route};
pub use execute::{execute_route, SwapReceipt};
pub use optimizer::{validate_route, RouteOptimizer, RouteQuote};
pub use pool::{order_tokens, pool_address, LiquidityRegistry, Pool};
pub use quote::{get_amount_out, mul_div};
