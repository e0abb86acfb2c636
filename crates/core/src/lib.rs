#![forbid(unsafe_code)]

pub mod engine;
pub mod gesture;
pub mod model;
pub mod score;
pub mod time;

pub use engine::{Advance, EngineConfig, EngineError, GameState, Session};
pub use gesture::{CardVisual, Key, Release, SwipeRecognizer};
pub use score::Scoreboard;
pub use time::Clock;
