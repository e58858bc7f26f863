//! # Core Application Logic
//!
//! This module contains Lingo's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • State (app data)     │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No UI. I/O only in     │
//!                    │  controller effects.    │
//!                    └───────────┬─────────────┘
//!                                │
//!                  ┌─────────────┴─────────────┐
//!                  ▼                           ▼
//!           ┌────────────┐              ┌────────────┐
//!           │    TUI     │              │  Headless  │
//!           │  Adapter   │              │    CLI     │
//!           │ (ratatui)  │              │ (--text)   │
//!           └────────────┘              └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`controller`]: Effect runners and the headless `SessionController`
//! - [`clients`]: Builds service clients from credentials
//! - [`catalog`]: The language list and selection rules
//! - [`credential`]: API key checks
//! - [`config`]: Layered configuration

pub mod action;
pub mod catalog;
pub mod clients;
pub mod config;
pub mod controller;
pub mod credential;
pub mod state;
