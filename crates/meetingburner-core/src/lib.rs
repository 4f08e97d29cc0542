//! # MeetingBurner Core Library
//!
//! This library provides the core logic for MeetingBurner, which shows how
//! much money a meeting costs while it runs. The CLI binary is a thin
//! layer over the same core, and any other front-end is expected to be too.
//!
//! ## Architecture
//!
//! - **Meeting Engine**: A clock-driven state machine that accrues cost only
//!   while active and requires the caller to periodically invoke `tick()`
//! - **Meeting Timer**: Owns an engine and a tokio task that ticks it
//! - **Equivalences**: Static lookup from accrued cost to a relatable purchase
//! - **Settings**: TOML-based defaults for new meetings and tick cadence
//!
//! ## Key Components
//!
//! - [`MeetingEngine`]: Core cost-accrual state machine
//! - [`MeetingTimer`]: Engine plus background tick source
//! - [`Settings`]: Application configuration management

pub mod currency;
pub mod equivalence;
pub mod error;
pub mod events;
pub mod meeting;
pub mod storage;

pub use currency::{format_currency, format_currency_short, format_rate, Currency};
pub use equivalence::{
    current_equivalence, next_equivalence, progress_to_next, Equivalence, Progress, EQUIVALENCES,
};
pub use error::{ConfigError, CoreError, TransitionError, ValidationError};
pub use events::Event;
pub use meeting::{
    format_time, Clock, CostSample, ManualClock, MeetingConfig, MeetingEngine, MeetingReceipt,
    MeetingSnapshot, MeetingState, MeetingTimer, SystemClock,
};
pub use storage::Settings;
