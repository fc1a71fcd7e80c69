mod movement;
mod product;
mod profile;
mod user;

pub use movement::{Movement, MovementKind, MovementRow, NewMovement};
pub use product::{round_price, Product, ProductInput};
pub use profile::{Profile, ProfileName, Role};
pub use user::User;
