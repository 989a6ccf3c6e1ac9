/*
 * Uniswap Trader - swap execution service
 * Core library exports and module declarations
 */

pub mod api;
pub mod config;
pub mod contracts;
pub mod dex;
pub mod execution;
pub mod metrics;
pub mod models;
pub mod rpc;
pub mod service;
pub mod tokens;
pub mod utils;

pub use config::Config;
pub use models::*;
pub use service::SwapEngine;
