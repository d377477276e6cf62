//! Framework adapters for sprite icons.
//!
//! Each adapter wraps a symbol id and a `mount` callback into a renderable
//! icon. The Rust render model mirrors the JavaScript adapter modules shipped
//! to the browser, which generated modules import by export type.

pub mod component;
pub mod export;
pub mod preact;
pub mod react;
pub mod traits;
pub mod vanilla;
pub mod vue;

pub use component::{IconComponent, SvgElement};
pub use export::ExportType;
pub use preact::PreactAdapter;
pub use react::ReactAdapter;
pub use traits::{AdapterError, FrameworkAdapter, Mount};
pub use vanilla::VanillaAdapter;
pub use vue::VueAdapter;
