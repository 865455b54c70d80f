pub mod boundaries;
pub mod destinations;
pub mod features;
pub mod names;
pub mod topojson;

pub use boundaries::*;
pub use destinations::*;
pub use features::*;
pub use names::*;
pub use topojson::*;
