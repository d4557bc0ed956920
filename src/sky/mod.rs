pub mod controller;
pub mod geometry;
pub mod projection;
pub mod renderer;
pub mod view;

pub use controller::ViewportController;
pub use projection::GlobeBackground;
pub use renderer::{Footprint, FootprintRenderer, RaDec};
pub use view::{ViewState, ViewStore};
