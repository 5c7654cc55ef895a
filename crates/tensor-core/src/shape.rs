// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Fixed-capacity tensor shape descriptors.

use crate::TensorError;
use std::fmt;

/// Maximum number of dimensions a [`Shape`] can hold.
///
/// The planner's descriptor reserves exactly this many per-axis slots, so
/// the bound is part of the planning contract, not just an implementation
/// convenience.
pub const MAX_RANK: usize = 8;

/// Describes the dimensionality of a tensor operand.
///
/// Dimensions live in a fixed inline array — constructing, copying, and
/// querying a shape never allocates. Shapes are immutable once created.
///
/// # Examples
/// ```
/// use tensor_core::Shape;
/// let s = Shape::new(&[2, 3, 4]).unwrap();
/// assert_eq!(s.rank(), 3);
/// assert_eq!(s.num_elements(), 24);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<i64>", into = "Vec<i64>")]
pub struct Shape {
    dims: [i64; MAX_RANK],
    rank: usize,
}

impl Shape {
    /// Creates a new shape from the given dimensions.
    ///
    /// Fails when the rank exceeds [`MAX_RANK`] or any dimension is
    /// negative. Zero-sized dimensions are allowed (empty tensors).
    pub fn new(dims: &[i64]) -> Result<Self, TensorError> {
        if dims.len() > MAX_RANK {
            return Err(TensorError::RankExceeded {
                rank: dims.len(),
                max: MAX_RANK,
            });
        }
        let mut stored = [0i64; MAX_RANK];
        for (i, &d) in dims.iter().enumerate() {
            if d < 0 {
                return Err(TensorError::NegativeDim { index: i, value: d });
            }
            stored[i] = d;
        }
        Ok(Self {
            dims: stored,
            rank: dims.len(),
        })
    }

    /// Creates a scalar shape (rank 0).
    pub fn scalar() -> Self {
        Self {
            dims: [0; MAX_RANK],
            rank: 0,
        }
    }

    /// Creates a 1-D shape.
    ///
    /// # Panics
    /// Panics if `len` is negative.
    pub fn vector(len: i64) -> Self {
        assert!(len >= 0, "vector length must be non-negative");
        let mut dims = [0; MAX_RANK];
        dims[0] = len;
        Self { dims, rank: 1 }
    }

    /// Creates a 2-D shape (matrix).
    ///
    /// # Panics
    /// Panics if either dimension is negative.
    pub fn matrix(rows: i64, cols: i64) -> Self {
        assert!(rows >= 0 && cols >= 0, "matrix dims must be non-negative");
        let mut dims = [0; MAX_RANK];
        dims[0] = rows;
        dims[1] = cols;
        Self { dims, rank: 2 }
    }

    /// Returns the number of dimensions (rank).
    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Returns the dimensions as a slice.
    pub fn dims(&self) -> &[i64] {
        &self.dims[..self.rank]
    }

    /// Returns the size of a specific dimension, or `None` if out of bounds.
    pub fn dim(&self, index: usize) -> Option<i64> {
        self.dims().get(index).copied()
    }

    /// Returns the total number of elements.
    ///
    /// For a scalar shape (rank 0), returns 1.
    pub fn num_elements(&self) -> i64 {
        self.dims().iter().product()
    }

    /// Returns `true` if any dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.dims().iter().any(|&d| d == 0)
    }

    /// Computes the memory footprint in bytes for a given [`crate::DType`].
    pub fn size_bytes(&self, dtype: super::DType) -> i64 {
        self.num_elements() * dtype.size_bytes() as i64
    }

    /// Computes row-major (C-order) element strides for this shape.
    ///
    /// Only the first [`Shape::rank`] entries of the returned array are
    /// meaningful.
    pub fn strides(&self) -> [i64; MAX_RANK] {
        let mut strides = [0i64; MAX_RANK];
        if self.rank == 0 {
            return strides;
        }
        strides[self.rank - 1] = 1;
        for i in (0..self.rank - 1).rev() {
            strides[i] = strides[i + 1] * self.dims[i + 1];
        }
        strides
    }

    /// Returns the product of dimensions strictly before `axis`.
    pub fn outer_extent(&self, axis: usize) -> i64 {
        self.dims()[..axis].iter().product()
    }

    /// Returns the product of dimensions strictly after `axis`.
    pub fn inner_extent(&self, axis: usize) -> i64 {
        self.dims()[axis + 1..].iter().product()
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.dims().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{d}")?;
        }
        write!(f, "]")
    }
}

impl TryFrom<Vec<i64>> for Shape {
    type Error = TensorError;

    fn try_from(dims: Vec<i64>) -> Result<Self, Self::Error> {
        Shape::new(&dims)
    }
}

impl From<Shape> for Vec<i64> {
    fn from(shape: Shape) -> Self {
        shape.dims().to_vec()
    }
}
