use std::{collections::BTreeMap, fmt::Display};

use approx::AbsDiffEq;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::{cell::Cell, element};

/// A single atomic site in fractional coordinates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub atomic_number: usize,

    /// the site label from the source file, like `Ti1`
    pub label: String,

    pub frac: Vector3<f64>,
}

impl PartialEq for Site {
    fn eq(&self, other: &Self) -> bool {
        self.abs_diff_eq(other, Self::default_epsilon())
    }
}

impl AbsDiffEq for Site {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        1e-8
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.atomic_number == other.atomic_number
            && self.frac.abs_diff_eq(&other.frac, epsilon)
    }
}

impl Site {
    pub fn new(
        atomic_number: usize,
        label: impl Into<String>,
        frac: Vector3<f64>,
    ) -> Self {
        Self {
            atomic_number,
            label: label.into(),
            frac,
        }
    }

    pub fn symbol(&self) -> &'static str {
        element::symbol(self.atomic_number)
    }
}

/// A periodic structure: a cell, the sites inside it, and whether it repeats
/// along each of the three lattice vectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    pub cell: Cell,
    pub sites: Vec<Site>,
    pub pbc: [bool; 3],
}

impl Structure {
    /// construct a fully periodic structure
    pub fn new(cell: Cell, sites: Vec<Site>) -> Self {
        Self {
            cell,
            sites,
            pbc: [true; 3],
        }
    }

    pub fn set_pbc(&mut self, pbc: [bool; 3]) {
        self.pbc = pbc;
    }

    /// the distinct element symbols in order of first appearance
    pub fn kinds(&self) -> Vec<&'static str> {
        let mut ret = Vec::new();
        for site in &self.sites {
            let s = site.symbol();
            if !ret.contains(&s) {
                ret.push(s);
            }
        }
        ret
    }

    /// Hill formula of the whole cell: carbon first, then hydrogen, then the
    /// rest alphabetically, or everything alphabetically if there is no
    /// carbon. Counts of one are left off
    pub fn formula(&self) -> String {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for site in &self.sites {
            *counts.entry(site.symbol()).or_default() += 1;
        }
        let mut order = Vec::with_capacity(counts.len());
        if counts.contains_key("C") {
            order.push("C");
            if counts.contains_key("H") {
                order.push("H");
            }
        }
        for &k in counts.keys() {
            if !order.contains(&k) {
                order.push(k);
            }
        }
        let mut ret = String::new();
        for k in order {
            ret.push_str(k);
            match counts[k] {
                1 => {}
                n => ret.push_str(&n.to_string()),
            }
        }
        ret
    }

    /// Cartesian positions of the sites in Å
    pub fn cartesian(&self) -> Vec<Vector3<f64>> {
        self.sites
            .iter()
            .map(|s| self.cell.to_cartesian(&s.frac))
            .collect()
    }
}

impl Display for Structure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "cell:")?;
        write!(f, "{}", self.cell)?;
        writeln!(f, "pbc: {:?}", self.pbc)?;
        writeln!(f, "sites:")?;
        for site in &self.sites {
            writeln!(
                f,
                "{:5}{:15.10}{:15.10}{:15.10}",
                site.symbol(),
                site.frac.x,
                site.frac.y,
                site.frac.z,
            )?;
        }
        Ok(())
    }
}
