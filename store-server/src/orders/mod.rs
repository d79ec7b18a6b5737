//! Order domain
//!
//! - [`model`] - the Order entity, enums and the status state machine
//! - [`normalize`] - lenient line-item ingestion (legacy alias coercion)
//! - [`pricing`] - pure pricing engine over integer cents
//! - [`store`] - the OrderStore contract and conditional-update outcomes
//! - [`memory`] - in-memory reference store
//! - [`service`] - creation / reconciliation / query / administration

pub mod memory;
pub mod model;
pub mod normalize;
pub mod pricing;
pub mod service;
pub mod store;

pub use memory::MemoryOrderStore;
pub use model::{LineItem, Order, OrderFilter, OrderStatus, PaymentMethod, PaymentStatus};
pub use service::{CheckoutConfig, CreateOrderRequest, CreatedOrder, OrderService};
pub use store::{MarkPaidOutcome, OrderStore, RepoError, RepoResult, TransitionOutcome};
