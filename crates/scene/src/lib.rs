pub mod bodies;
pub mod camera;
pub mod config;
pub mod orbit;
pub mod picking;
pub mod view;

pub use bodies::*;
pub use camera::*;
pub use config::*;
pub use orbit::*;
pub use picking::*;
pub use view::*;
