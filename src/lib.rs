//! Sous Gateway - voice cooking assistant backend
//!
//! Hosts "Basil", a hands-free cooking companion, behind an externally
//! supplied real-time agent runtime. The gateway owns everything except the
//! audio loop:
//! - Recipe lookups against a third-party recipe data provider
//! - Write-through persistence delegated to the connected client over RPC
//! - Tool activity signals so the client UI can show what the agent is doing
//! - Session continuation, so an interrupted cook resumes mid-recipe
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │          Client (audio + UI + storage)           │
//! └──────────────────────┬──────────────────────────┘
//!                        │ WebSocket session
//! ┌──────────────────────▼──────────────────────────┐
//! │                 Sous Gateway                     │
//! │  Agent  │  Tools  │  Bridge  │  Notify  │ Policy │
//! └──────────────────────┬──────────────────────────┘
//!                        │ HTTPS
//! ┌──────────────────────▼──────────────────────────┐
//! │            Recipe data provider                  │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod agent;
pub mod bridge;
pub mod config;
pub mod error;
pub mod notify;
pub mod persona;
pub mod recipes;
pub mod runtime;
pub mod server;
pub mod session;
pub mod tools;

pub use config::Config;
pub use error::{Error, Result, ToolError};
pub use persona::Persona;
pub use server::Server;
