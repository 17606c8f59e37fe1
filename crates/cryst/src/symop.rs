use std::str::FromStr;

use nalgebra::{Matrix3, Vector3};

/// A crystallographic symmetry operation acting on fractional coordinates,
/// parsed from the Jones-faithful notation used in CIF files (`-x+1/2,y,z`)
#[derive(Debug, Clone, PartialEq)]
pub struct SymOp {
    pub rot: Matrix3<f64>,
    pub trans: Vector3<f64>,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid symmetry operation `{0}`")]
pub struct SymOpError(pub String);

impl SymOp {
    pub fn identity() -> Self {
        Self {
            rot: Matrix3::identity(),
            trans: Vector3::zeros(),
        }
    }

    /// apply `self` to `frac` and wrap the result back into the unit cell
    pub fn apply(&self, frac: &Vector3<f64>) -> Vector3<f64> {
        (self.rot * frac + self.trans).map(wrap)
    }
}

/// wrap `v` into [0, 1), folding values within rounding distance of 1 onto 0
pub fn wrap(v: f64) -> f64 {
    let w = v.rem_euclid(1.0);
    if 1.0 - w < 1e-8 { 0.0 } else { w }
}

fn parse_number(s: &str) -> Option<f64> {
    match s.split_once('/') {
        Some((n, d)) => {
            let d: f64 = d.parse().ok()?;
            if d == 0.0 {
                return None;
            }
            Some(n.parse::<f64>().ok()? / d)
        }
        None => s.parse().ok(),
    }
}

/// parse one comma-separated component like `-x+1/2` into its row of the
/// rotation matrix and its translation
fn parse_component(s: &str) -> Option<([f64; 3], f64)> {
    let s: String = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    if s.is_empty() {
        return None;
    }
    let mut terms = Vec::new();
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if (c == '+' || c == '-') && i > start {
            terms.push(&s[start..i]);
            start = i;
        }
    }
    terms.push(&s[start..]);

    let mut row = [0.0; 3];
    let mut trans = 0.0;
    for term in terms {
        let (sign, rest) = match term.strip_prefix('-') {
            Some(rest) => (-1.0, rest),
            None => (1.0, term.strip_prefix('+').unwrap_or(term)),
        };
        let axis = match rest.chars().last()? {
            'x' => Some(0),
            'y' => Some(1),
            'z' => Some(2),
            _ => None,
        };
        match axis {
            Some(axis) => {
                let coeff = rest[..rest.len() - 1].trim_end_matches('*');
                let coeff = if coeff.is_empty() {
                    1.0
                } else {
                    parse_number(coeff)?
                };
                row[axis] += sign * coeff;
            }
            None => trans += sign * parse_number(rest)?,
        }
    }
    Some((row, trans))
}

impl FromStr for SymOp {
    type Err = SymOpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || SymOpError(s.to_owned());
        let parts: Vec<_> = s.split(',').collect();
        if parts.len() != 3 {
            return Err(err());
        }
        let mut rot = Matrix3::zeros();
        let mut trans = Vector3::zeros();
        for (i, part) in parts.into_iter().enumerate() {
            let (row, t) = parse_component(part).ok_or_else(err)?;
            for (j, r) in row.into_iter().enumerate() {
                rot[(i, j)] = r;
            }
            trans[i] = t;
        }
        Ok(Self { rot, trans })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    use super::*;

    #[test]
    fn identity() {
        let got: SymOp = "x, y, z".parse().unwrap();
        assert_eq!(got, SymOp::identity());
    }

    #[test]
    fn rutile_op() {
        let op: SymOp = "-x+1/2,y+1/2,-z+1/2".parse().unwrap();
        #[rustfmt::skip]
        let want = Matrix3::new(
            -1.0, 0.0, 0.0,
            0.0, 1.0, 0.0,
            0.0, 0.0, -1.0,
        );
        assert_eq!(op.rot, want);
        assert_eq!(op.trans, Vector3::new(0.5, 0.5, 0.5));
        let got = op.apply(&Vector3::new(0.3053, 0.3053, 0.0));
        assert_abs_diff_eq!(
            got,
            Vector3::new(0.1947, 0.8053, 0.5),
            epsilon = 1e-10
        );
    }

    #[test]
    fn hexagonal_op() {
        let op: SymOp = "-y, x-y, z+0.5".parse().unwrap();
        let got = op.apply(&Vector3::new(1.0 / 3.0, 2.0 / 3.0, 0.75));
        assert_abs_diff_eq!(
            got,
            Vector3::new(1.0 / 3.0, 2.0 / 3.0, 0.25),
            epsilon = 1e-10
        );
    }

    #[test]
    fn leading_constant() {
        let op: SymOp = "1/2+X,1/2-Y,Z".parse().unwrap();
        assert_eq!(op.trans, Vector3::new(0.5, 0.5, 0.0));
        assert_eq!(op.rot[(1, 1)], -1.0);
    }

    #[test_case("x,y"; "too few")]
    #[test_case("x,y,w"; "bad axis")]
    #[test_case("x,y,z+1/0"; "zero denominator")]
    #[test_case("x,,z"; "empty component")]
    fn invalid(s: &str) {
        assert_eq!(s.parse::<SymOp>(), Err(SymOpError(s.to_owned())));
    }

    #[test]
    fn wraps_into_cell() {
        assert_eq!(wrap(-0.25), 0.75);
        assert_eq!(wrap(1.0), 0.0);
        assert_eq!(wrap(1.0 - 1e-12), 0.0);
        assert_eq!(wrap(2.5), 0.5);
    }
}
