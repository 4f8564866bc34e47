//! Navigation selectors and include descriptors for eager loading.
//!
//! A [`Selector`] names a navigation from one entity to another with both
//! types known at compile time. Specifications store it as an
//! [`ErasedSelector`] inside an [`IncludeDescriptor`], so the evaluator only
//! sees the navigation's types as runtime [`TypeInfo`](crate::entity::TypeInfo).
//!
//! ## Example
//!
//! ```rust,ignore
//! // Eager load orders with their customer and the customer's address
//! let spec = Specification::<Order>::builder()
//!     .include(&order::CUSTOMER)
//!     .then_include(&customer::ADDRESS)
//!     .include(&order::LINES)
//!     .build();
//! ```

mod include;
mod selector;

pub use include::{IncludeDescriptor, IncludeKind};
pub use selector::{ErasedSelector, Selector};
