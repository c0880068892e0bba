mod category;
mod order;
mod page;
mod product;
mod user;

pub use category::*;
pub use order::*;
pub use page::*;
pub use product::*;
pub use user::*;
