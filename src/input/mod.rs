//! Raw input decoding
//!
//! Turns sampled GPIO levels into the events the state machines consume:
//! - Encoder phases → signed rotation steps
//! - Button level → debounced press edges
//!
//! Everything here is polled; nothing blocks or reads a clock.

pub mod button;
pub mod encoder;

pub use button::Button;
pub use encoder::{QuadratureDecoder, Rotation, classify_transition};
