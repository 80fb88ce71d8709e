//! `forca-core`: domain building blocks for the sales-rep client.
//!
//! This crate contains **pure domain** primitives (no IO, no HTTP, no storage):
//! typed codes, money, quantity coercion and the records exchanged with the
//! backend.

pub mod entity;
pub mod error;
pub mod id;
pub mod money;
pub mod quantity;
pub mod records;
pub mod value_object;

pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{ClientCode, ProductCode, SalesRepId};
pub use money::{Money, parse_price};
pub use quantity::{clamp_quantity, coerce_quantity};
pub use records::{ClientRecord, LoginRequest, ProductRecord, SalesRep};
pub use value_object::ValueObject;
