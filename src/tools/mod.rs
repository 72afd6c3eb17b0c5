//! Tool infrastructure — catalog snapshots, visibility filters, access gate,
//! role bindings.
//!
//! The gate decides what each agent sees; it never invokes anything. A
//! denied tool simply does not appear in the resolved catalog, so
//! downstream invocation attempts fail with the runtime's own
//! unknown-tool error and the name is never exposed.

pub mod catalog;
pub mod filter;
pub mod gate;
pub mod roles;

pub use catalog::{ToolCatalog, ToolDescriptor};
pub use filter::{DynamicPredicate, IdentityContext, ToolFilter};
pub use gate::{GateWarning, ResolvedCatalog, ToolAccessGate};
pub use roles::{standard_roles, RoleTable};
