//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use proyectar::prelude::*;
//! ```

pub use crate::error::{ProyectarError, Result};
pub use crate::force::{ForceScheme, ForceSchemeReport};
pub use crate::primitives::{Matrix, Vector};
pub use crate::projection::{Lamp, Lsp, Plmp};
pub use crate::tsne::Tsne;
