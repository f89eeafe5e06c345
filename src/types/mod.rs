//! Shared registry types.
//!
//! | Module  | Purpose                                   |
//! |---------|-------------------------------------------|
//! | `error` | Store errors and swallowed diagnostics    |
//! | `path`  | Owned key path used as navigator state    |

mod error;
mod path;

pub use error::{Diagnostic, Diagnostics, RegistryError};
pub use path::KeyPath;
