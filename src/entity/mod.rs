pub mod cart_items;
pub mod carts;
pub mod items;
pub mod orders;
pub mod users;

pub use cart_items::Entity as CartItems;
pub use carts::Entity as Carts;
pub use items::Entity as Items;
pub use orders::Entity as Orders;
pub use users::Entity as Users;
