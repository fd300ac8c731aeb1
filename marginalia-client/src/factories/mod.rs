//! Built-in factories, one per kind of region hosts can comment on

mod cell;
pub use cell::{CellFactory, CellTarget};

mod cell_selection;
pub use cell_selection::{CellSelectionFactory, CellSelectionTarget};

mod document;
pub use document::DocumentFactory;

mod text_selection;
pub use text_selection::TextSelectionFactory;
