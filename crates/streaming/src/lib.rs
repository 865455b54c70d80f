pub mod guard;
pub mod request;
pub mod residency;
pub mod source;

pub use guard::*;
pub use request::*;
pub use residency::*;
pub use source::*;
