mod app;
mod icons;
mod scroller;
mod slide;

pub use app::*;
pub use icons::*;
pub use scroller::*;
pub use slide::*;
