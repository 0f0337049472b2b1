//! Adaptive playback sessions: pure per-session state and rules in
//! [`session`], the browser backend and session registry in [`web`].

pub mod session;
pub mod web;

pub use session::{
    MediaBackend, PlaybackController, PlaybackState, QualityLevel, SourceKind, AUTO_LEVEL,
};
