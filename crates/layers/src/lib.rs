pub mod markers;
pub mod patterns;
pub mod regions;
pub mod surface;
pub mod symbology;

pub use markers::*;
pub use patterns::*;
pub use regions::*;
pub use surface::*;
pub use symbology::*;
