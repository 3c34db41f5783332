//! Core module - catalog, search, cart and export

pub mod cart;
pub mod catalog;
pub mod config;
pub mod docnum;
pub mod export;
pub mod matcher;
pub mod number;
pub mod session;
pub mod shortid;

pub use cart::{AddOutcome, Cart, CartError, CartItem};
pub use catalog::{Catalog, CatalogError, CatalogRow, CatalogSource, ColumnNames, CsvSource, WorkbookSource};
pub use config::Config;
pub use export::{ExportError, ExportRequest, ExportedDocument, TemplateLayout, Totals};
pub use matcher::{Match, MatchOrigin};
pub use session::{Session, SessionError};
pub use shortid::ShortIdIndex;
