pub mod body;
pub mod canvas;
pub mod dots;
pub mod globe;
pub mod graticule;
pub mod planet;
pub mod recording;
pub mod solar;
pub mod svg;

pub use body::*;
pub use canvas::*;
pub use dots::*;
pub use globe::*;
pub use graticule::*;
pub use planet::*;
pub use recording::*;
pub use solar::*;
pub use svg::*;
