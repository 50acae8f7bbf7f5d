//! gwfmt CLI - command-line interface library
//!
//! # Binary Usage
//!
//! ```bash
//! # Format drafts into ./out
//! gwfmt format draft.docx notes.txt --output out/
//!
//! # Start from the default style and tweak it
//! gwfmt config init my-style.json
//! gwfmt format draft.docx --config my-style.json
//! ```

pub mod app;

pub use app::{config_init_command, config_show_command, format_command, run_cli};
