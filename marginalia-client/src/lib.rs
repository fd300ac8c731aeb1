mod anchor;
pub use anchor::{offset_of, position_of, Anchor, Freshness, Position, Range, SelectionSnapshot};

mod config;
pub use config::{Config, COMMENTS_DIR_VAR, EXTENSION_VAR};

mod document;
pub use document::{Cell, CellId, Document, DocumentPath, Notebook, OpenDocuments, TextDocument};

pub mod factories;

mod factory;
pub use factory::{LiveRegion, TargetFactory};

mod forest;
pub use forest::Forest;

mod identity;
pub use identity::{Awareness, IdentityProvider, SessionIdentity, StaticAwareness};

mod manager;
pub use manager::{Binding, ModelChanged, ModelManager};

mod model;
pub use model::{Change, CommentModel, NewComment, Origin, TargetSource};

mod panel;
pub use panel::{CommentPanel, PanelAction, PanelEntry};

mod registry;
pub use registry::CommentRegistry;

mod store;
pub use store::{FsStore, MemoryStore, Store};

pub mod api {
    pub use marginalia_api::*;
}
