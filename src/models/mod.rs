pub mod category;
pub mod group;
pub mod item;
pub mod request;
pub mod result;

pub use category::*;
pub use group::*;
pub use item::*;
pub use request::*;
pub use result::*;
