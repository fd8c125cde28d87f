pub mod category;
pub mod conditions;
pub mod score;
pub mod twilight;

pub use category::*;
pub use conditions::*;
pub use score::*;
pub use twilight::*;
