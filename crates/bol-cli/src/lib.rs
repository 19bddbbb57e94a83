// Copyright 2026 bol-cli Contributors
// SPDX-License-Identifier: MIT

//! Binus Online command line client.
//!
//! Logs into the portal, lists unread notifications and opens threads on
//! request. The library crate exposes the core modules for integration
//! testing; `main.rs` is a thin shell around [`bootstrap::Bootstrap`].

pub mod bootstrap;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod controller;
pub mod credentials;
pub mod error;
pub mod extraction;
pub mod portal;
pub mod render;
pub mod session;
pub mod transport;
pub mod types;
