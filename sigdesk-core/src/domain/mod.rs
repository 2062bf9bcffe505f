//! Domain types for sigdesk.

pub mod candle;
pub mod position;
pub mod signal;
pub mod trade;

pub use candle::{validate_series, Candle, CandleError};
pub use position::{Position, Side};
pub use signal::{Diagnostics, Direction, SignalDecision, Strength, TrendDirection};
pub use trade::{ExitReason, Trade};
