//! Entity mapping registry.
//!
//! Mapping is two-phase: a [`RegistryBuilder`] collects every entity's
//! declared members and configuration, then [`RegistryBuilder::build`]
//! validates and resolves everything (columns, keys, navigation join
//! columns, projection maps) into an immutable [`EntityRegistry`] that
//! compilers read concurrently without locking.
//!
//! ```ignore
//! let registry = RegistryBuilder::new()
//!     .entity("User", |e| {
//!         e.to_table("sys_user");
//!         e.member("id", ScalarKind::Int).key().auto_increment();
//!         e.member("name", ScalarKind::Text).field("user_name");
//!         e.has_one("company", "Company").has_foreign_key("company_id");
//!         e.has_many("orders", "Order").has_foreign_key("buyer_id");
//!     })
//!     .build()?;
//! ```

mod builder;
mod entity;
mod handler;
mod member;
mod registry;

pub use builder::{EntityBuilder, FieldNaming, MemberBuilder, NavigationBuilder, RegistryBuilder};
pub use entity::EntityMap;
#[cfg(feature = "serde")]
pub use handler::JsonTypeHandler;
pub use handler::{FnTypeHandler, HandlerResult, TypeHandler};
pub use member::{Cardinality, MemberMap, MemberType, Navigation};
pub use registry::EntityRegistry;
