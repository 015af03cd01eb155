//! Breakout Core: indicators, signal engine, domain types and data providers.
//!
//! This crate contains everything needed to decide whether one symbol shows a
//! breakout "green signal" on its latest bar:
//! - Domain types (bars, validated series, candidates, scan modes)
//! - Moving-average and ADR% indicators
//! - Indicator frame and the causal signal state machine
//! - History provider and candidate source seams, with Yahoo Finance,
//!   TradingView and CSV implementations

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
