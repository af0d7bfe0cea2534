//! Output generation: article pages and the JSON news index.
//!
//! # Submodules
//!
//! - [`html`]: Renders drafts into static HTML documents and writes them
//! - [`indexes`]: The in-memory section → category → paths accumulator
//! - [`json`]: Writes the accumulated index for the site front page
//!
//! # Output Structure
//!
//! ```text
//! public_root/
//! ├── data/
//! │   └── news_index.json
//! └── noticias/
//!     ├── espana/politica/2025-05-06-titular.html
//!     └── humor/
//!         ├── satira/2025-05-06-titular.html
//!         └── images/titular.png
//! ```

pub mod html;
pub mod indexes;
pub mod json;
