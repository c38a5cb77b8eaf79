//! Attentrack Signal Model
//!
//! Defines the data contracts exchanged with the capture and presentation
//! layers:
//! - **Samples:** per-subject feature vectors from the perception layer
//! - **Scores:** smoothed attention/stress/curiosity points
//! - **Participants:** per-slot tracking state and tracking boxes
//! - **Alerts:** debounced raised/recovered events
//! - **Frames:** raw RGBA pixel buffers
//!
//! Scores and tracking boxes use the `[0, 100]` range; boxes are expressed
//! in percent of the frame so they survive resolution changes.

pub mod alert;
pub mod frame;
pub mod participant;
pub mod sample;
pub mod score;

pub use alert::*;
pub use frame::*;
pub use participant::*;
pub use sample::*;
pub use score::*;
