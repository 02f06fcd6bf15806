mod error;
mod owner_link;
mod property_cursor;
mod property_owner;

pub use error::ChangeError;
pub use owner_link::{NestedLink, OwnerLink, TopLevelOwner};
pub use property_cursor::PropertyCursor;
pub use property_owner::{PathKey, PropertyComparator, PropertyOwner};
