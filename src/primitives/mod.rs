//! Core compute primitives (Vector, Matrix).
//!
//! These types provide the shared coordinate-matrix / distance-matrix
//! representation all projection methods operate on.

mod matrix;
mod vector;

pub use matrix::Matrix;
pub use vector::Vector;
