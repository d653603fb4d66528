pub mod download;
pub mod list;
pub mod types;
pub mod upload;

pub use types::*;

pub use download::download_file;
pub use list::list_json;
pub use upload::upload_file;
