use serde::{Deserialize, Serialize};

use crate::plugin::BuildError;

/// A Monkhorst-Pack mesh of k-points along each reciprocal lattice vector
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KpointMesh(pub [usize; 3]);

impl Default for KpointMesh {
    fn default() -> Self {
        Self([4, 4, 4])
    }
}

/// high-symmetry points of the tetragonal Brillouin zone in fractional
/// reciprocal coordinates. when several points coincide after projecting out
/// a non-periodic direction, the first one names the result
pub const HIGH_SYMMETRY: [(&str, [f64; 3]); 6] = [
    ("G", [0.0, 0.0, 0.0]),
    ("X", [0.0, 0.5, 0.0]),
    ("M", [0.5, 0.5, 0.0]),
    ("Z", [0.0, 0.0, 0.5]),
    ("R", [0.0, 0.5, 0.5]),
    ("A", [0.5, 0.5, 0.5]),
];

/// the band-structure path used for every example: (from, to, points)
pub const STANDARD_PATH: [(&str, &str, usize); 7] = [
    ("G", "X", 21),
    ("X", "R", 31),
    ("R", "Z", 21),
    ("Z", "G", 31),
    ("G", "M", 31),
    ("M", "A", 31),
    ("A", "Z", 31),
];

/// An explicit list of k-points along straight segments between
/// high-symmetry points
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BandPath {
    pub points: Vec<[f64; 3]>,

    /// the index into `points` of each labeled high-symmetry point
    pub labels: Vec<(usize, String)>,
}

fn point(label: &str) -> Result<[f64; 3], BuildError> {
    HIGH_SYMMETRY
        .iter()
        .find(|(l, _)| *l == label)
        .map(|(_, p)| *p)
        .ok_or_else(|| BuildError::UnknownPoint(label.to_owned()))
}

fn name(p: &[f64; 3]) -> &'static str {
    HIGH_SYMMETRY
        .iter()
        .find(|(_, q)| q == p)
        .map(|(l, _)| *l)
        .unwrap_or("?")
}

impl BandPath {
    /// Build the path through `segments`, each contributing its point count
    /// including both ends. A segment starting where the last one ended does
    /// not repeat the shared point. Along directions where `pbc` is false
    /// every point is projected onto the periodic plane, and segments that
    /// collapse to a single point are dropped
    pub fn new(
        segments: &[(&str, &str, usize)],
        pbc: [bool; 3],
    ) -> Result<Self, BuildError> {
        let project = |mut p: [f64; 3]| {
            for (x, periodic) in p.iter_mut().zip(pbc) {
                if !periodic {
                    *x = 0.0;
                }
            }
            p
        };
        let mut points: Vec<[f64; 3]> = Vec::new();
        let mut labels = Vec::new();
        for &(from, to, n) in segments {
            let (a, b) = (project(point(from)?), project(point(to)?));
            if a == b || n < 2 {
                continue;
            }
            let start = if points.last() == Some(&a) {
                1
            } else {
                labels.push((points.len(), name(&a).to_owned()));
                0
            };
            for i in start..n {
                let t = i as f64 / (n - 1) as f64;
                points.push([0usize, 1, 2].map(|k| a[k] + (b[k] - a[k]) * t));
            }
            labels.push((points.len() - 1, name(&b).to_owned()));
        }
        Ok(Self { points, labels })
    }

    /// [STANDARD_PATH] for a structure with periodicity `pbc`
    pub fn standard(pbc: [bool; 3]) -> Self {
        Self::new(&STANDARD_PATH, pbc)
            .expect("STANDARD_PATH only uses known points")
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn labels(path: &BandPath) -> Vec<(usize, &str)> {
        path.labels.iter().map(|(i, l)| (*i, l.as_str())).collect()
    }

    #[test]
    fn bulk() {
        let got = BandPath::standard([true; 3]);
        assert_eq!(got.points.len(), 191);
        assert_eq!(
            labels(&got),
            vec![
                (0, "G"),
                (20, "X"),
                (50, "R"),
                (70, "Z"),
                (100, "G"),
                (130, "M"),
                (160, "A"),
                (190, "Z"),
            ]
        );
        assert_abs_diff_eq!(got.points[10][1], 0.25, epsilon = 1e-12);
        assert_eq!(got.points[190], [0.0, 0.0, 0.5]);
    }

    #[test]
    fn monolayer() {
        let got = BandPath::standard([true, true, false]);
        assert_eq!(got.points.len(), 101);
        assert_eq!(
            labels(&got),
            vec![(0, "G"), (20, "X"), (40, "G"), (70, "M"), (100, "G")]
        );
        assert!(got.points.iter().all(|p| p[2] == 0.0));
    }

    #[test]
    fn discontinuous() {
        let got = BandPath::new(&[("G", "X", 3), ("M", "G", 3)], [true; 3])
            .unwrap();
        assert_eq!(got.points.len(), 6);
        assert_eq!(labels(&got), vec![(0, "G"), (2, "X"), (3, "M"), (5, "G")]);
    }

    #[test]
    fn unknown_point() {
        let got = BandPath::new(&[("G", "K", 3)], [true; 3]);
        assert!(matches!(got, Err(BuildError::UnknownPoint(p)) if p == "K"));
    }
}
