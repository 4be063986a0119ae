//! Internal domain modules for the Stockbook core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod asset;
pub mod cursor;
pub mod error;
pub mod export;
pub mod record;
pub mod session;
pub mod settings;
pub mod storage;
pub mod thumbnail;

#[doc(inline)]
pub use asset::AssetManager;
#[doc(inline)]
pub use cursor::NavigationCursor;
#[doc(inline)]
pub use error::{Result, StockbookError};
#[doc(inline)]
pub use export::{ExportEngine, ExportError, ExportFormat, RecordRenderer};
#[doc(inline)]
pub use record::{Record, RecordFields};
#[doc(inline)]
pub use session::Session;
#[doc(inline)]
pub use settings::StoreSettings;
#[doc(inline)]
pub use storage::RecordStore;
#[doc(inline)]
pub use thumbnail::Preview;
