//! Core dataflow primitives for reactive property access
//!
//! These primitives are independent of the property tree. The store and the
//! accessors are built from them.
//!
//! # Core Components
//!
//! - **[`Relay`]** - Synchronous event fan-out to listeners and streams
//! - **[`Subscription`]** - Listener registration, detached on drop
//! - **[`Computed`]** - Lazily cached derived value invalidated by a relay
//!
//! # Architecture Principles
//!
//! 1. **Explicit Dependencies** - A Computed names the relay that invalidates it
//! 2. **Event-Source Naming** - Relays follow `{source}_{event}_relay` pattern
//! 3. **Lazy Recompute** - Invalidation only marks stale; `get` recomputes
//! 4. **Chaining** - Every invalidation is re-emitted for dependent values

pub mod relay;
pub mod computed;

pub use relay::{Relay, Subscription};
pub use computed::Computed;
