//! Sofia Gateway - keyword-routed chat widget backend
//!
//! This library provides the pieces behind the Sofia chat widget:
//! - Intent matching against an ordered keyword routing table
//! - Text-to-speech proxying (Google Cloud TTS, ElevenLabs)
//! - The HTTP API the widget talks to
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                 Chat widget                   │
//! └───────────┬──────────────────────┬───────────┘
//!             │ POST /api/chat       │ POST /api/speak
//! ┌───────────▼──────────┐ ┌─────────▼───────────┐
//! │    Intent Matcher    │ │    Speech Proxy     │
//! │  routing profile     │ │  Google │ ElevenLabs│
//! └──────────────────────┘ └─────────────────────┘
//! ```
//!
//! The two paths are independent: the widget decides whether to voice a reply.

pub mod api;
pub mod config;
pub mod error;
pub mod intent;
pub mod speech;

pub use config::Config;
pub use error::{Error, Result};
pub use intent::{IntentMatcher, Reply, RoutingProfile, Selection};
pub use speech::{AudioPayload, SpeechProvider};
