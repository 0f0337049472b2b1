//! Feed pagination and slide coordination: which items exist, which slide is
//! active, which slides deserve a real player, and how raw wheel input turns
//! into single-step transitions.

pub mod session;
pub mod wheel;
pub mod window;

pub use session::{FeedSession, SlideChange, HISTORY_CAP};
pub use wheel::{Step, WheelGate, COOLDOWN_MS, WHEEL_THRESHOLD};
pub use window::{SlideWindow, DEFAULT_WINDOW_RADIUS};
