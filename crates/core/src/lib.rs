//! pm-panel core: the client-side pipeline of the admin panel
//!
//! Every exchange with the backend runs through three steps composed by
//! [`Panel`]: [`Panel::prepare_request`] attaches credentials and resolves the
//! target URL, [`Panel::render_response`] turns a JSON payload into the HTML
//! fragment that gets swapped into the page, and [`Panel::on_request_complete`]
//! reacts to login and authorization outcomes. Page access goes through the
//! [`Page`] port and persistence through the [`KeyValueStore`] port, so the
//! whole pipeline runs against in-memory doubles in tests.

pub mod config;
pub mod error;
pub mod hooks;
pub mod page;
pub mod payload;
pub mod pipeline;
pub mod refresh;
pub mod render;
pub mod request;
pub mod session;
pub mod store;

pub use config::{FrontendRoutes, PanelSettings};
pub use error::{PanelError, PanelResult, StoreError};
pub use hooks::CompletionOutcome;
pub use page::{MemoryPage, Navigation, Page, SwapTarget};
pub use pipeline::Panel;
pub use refresh::{RefreshEntry, RefreshQueue};
pub use render::{Effect, Rendered, Renderer, SwapDecision, TransportResponse};
pub use request::{PreparedRequest, RequestDescriptor};
pub use session::SessionContext;
pub use store::{FileStore, KeyValueStore, MemoryStore};
