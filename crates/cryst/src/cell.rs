use std::fmt::Display;

use approx::AbsDiffEq;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

/// A periodic cell. The rows of `lattice` are the lattice vectors in Å
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Cell {
    pub lattice: Matrix3<f64>,
}

impl Cell {
    pub fn new(lattice: Matrix3<f64>) -> Self {
        Self { lattice }
    }

    /// Build the cell described by the lengths `a`, `b`, and `c` (Å) and the
    /// angles `alpha`, `beta`, and `gamma` (degrees). `a` lies along x and `b`
    /// in the xy plane. Returns `None` if the parameters do not describe a
    /// cell with positive volume.
    pub fn from_parameters(
        a: f64,
        b: f64,
        c: f64,
        alpha: f64,
        beta: f64,
        gamma: f64,
    ) -> Option<Self> {
        if a <= 0.0 || b <= 0.0 || c <= 0.0 {
            return None;
        }
        let (ca, cb) = (alpha.to_radians().cos(), beta.to_radians().cos());
        let (sg, cg) = gamma.to_radians().sin_cos();
        if sg.abs() < 1e-8 {
            return None;
        }
        let cx = c * cb;
        let cy = c * (ca - cb * cg) / sg;
        let cz2 = c * c - cx * cx - cy * cy;
        if cz2 <= 1e-12 {
            return None;
        }
        #[rustfmt::skip]
        let lattice = Matrix3::new(
            a,      0.0,    0.0,
            b * cg, b * sg, 0.0,
            cx,     cy,     cz2.sqrt(),
        );
        Some(Self { lattice })
    }

    /// the `i`th lattice vector
    pub fn vector(&self, i: usize) -> Vector3<f64> {
        self.lattice.row(i).transpose()
    }

    /// the lattice vectors as plain arrays
    pub fn rows(&self) -> [[f64; 3]; 3] {
        [0, 1, 2].map(|i| {
            let r = self.lattice.row(i);
            [r[0], r[1], r[2]]
        })
    }

    pub fn volume(&self) -> f64 {
        self.lattice.determinant().abs()
    }

    /// convert the fractional coordinates `frac` to Cartesian coordinates
    pub fn to_cartesian(&self, frac: &Vector3<f64>) -> Vector3<f64> {
        self.lattice.transpose() * frac
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.abs_diff_eq(other, Self::default_epsilon())
    }
}

impl AbsDiffEq for Cell {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        1e-8
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.lattice.abs_diff_eq(&other.lattice, epsilon)
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in self.lattice.row_iter() {
            writeln!(f, "{:15.10}{:15.10}{:15.10}", row[0], row[1], row[2])?;
        }
        Ok(())
    }
}
