//! Template substitution engine
//!
//! Templates are plain strings containing `%column%` or `%column:transformation%`
//! tokens. Rendering resolves each token against a spreadsheet row; validation of
//! token syntax is a separate, explicit step so rendering itself never fails.

mod render;
mod token;
mod transform;

pub use render::{DEFAULT_ACCOUNT_MAX_LEN, render, render_with_limit};
pub use token::{ScanResult, Token, TokenError, scan_tokens};
pub use transform::Transformation;
