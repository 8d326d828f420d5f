//! basics-mcp: a minimal MCP server with ping, sum and calendar tools
//!
//! The server speaks JSON-RPC 2.0 over stdio and exposes three tools:
//!
//! - **`ping`**: echoes text back to verify the server is reachable
//! - **`do_sum` / `do_the_sum`**: adds two numbers
//! - **`getMyCalendarDataByDate`**: lists the meetings on one UTC day from
//!   a Google Calendar
//!
//! # Modules
//!
//! - [`calendar`] — Day window resolution and the calendar provider
//! - [`config`] — Configuration loading and validation
//! - [`error`] — Error types
//! - [`mcp`] — MCP protocol implementation
//! - [`tools`] — Tool registry and handlers

pub mod calendar;
pub mod config;
pub mod error;
pub mod mcp;
pub mod tools;
