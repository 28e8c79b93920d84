//! Proyectar: multidimensional projection library in pure Rust.
//!
//! Proyectar computes low-dimensional (typically 2-D) visual layouts of
//! high-dimensional point sets for exploratory visualization. Two iterative,
//! convergence-driven engines form the core — Force Scheme (stress
//! majorization) and t-SNE (neighbor-probability embedding with per-point
//! kernel calibration) — alongside three closed-form projectors (LAMP, LSP,
//! PLMP) that place points in a single deterministic pass from a set of
//! anchor positions.
//!
//! # Quick Start
//!
//! ```
//! use proyectar::prelude::*;
//!
//! // Four points that should form a unit square.
//! let y0 = Matrix::from_vec(4, 2, vec![
//!     0.0, 0.0,
//!     0.9, 0.1,
//!     1.1, 0.9,
//!     0.1, 1.1,
//! ]).unwrap();
//!
//! let sqrt2 = std::f64::consts::SQRT_2;
//! let d = Matrix::from_vec(4, 4, vec![
//!     0.0,   1.0,   sqrt2, 1.0,
//!     1.0,   0.0,   1.0,   sqrt2,
//!     sqrt2, 1.0,   0.0,   1.0,
//!     1.0,   sqrt2, 1.0,   0.0,
//! ]).unwrap();
//!
//! let fs = ForceScheme::new().with_random_state(42).with_max_iter(100);
//! let layout = fs.project(&y0, &d).unwrap();
//! assert_eq!(layout.shape(), (4, 2));
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Core Vector and Matrix types
//! - [`numeric`]: Overflow-safe distance computations
//! - [`scheduler`]: Randomized visit ordering for the iterative engines
//! - [`force`]: Force Scheme stress-majorization engine
//! - [`tsne`]: t-SNE neighbor-probability embedding engine
//! - [`projection`]: Closed-form projectors (LAMP, LSP, PLMP)

pub mod error;
pub mod force;
pub mod numeric;
pub mod prelude;
pub mod primitives;
pub mod projection;
pub mod scheduler;
pub mod tsne;

pub use error::{ProyectarError, Result};
