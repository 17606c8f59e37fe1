/// element symbols indexed by atomic number, with a dummy "X" at index 0
pub const NUMBER_TO_SYMBOL: [&str; 95] = [
    "X", "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg",
    "Al", "Si", "P", "S", "Cl", "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn",
    "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As", "Se", "Br", "Kr", "Rb",
    "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm",
    "Sm", "Eu", "Gd", "Tb", "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta",
    "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl", "Pb", "Bi", "Po", "At",
    "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu",
];

fn titlecase(s: &str) -> String {
    let mut cs = s.chars();
    let Some(first) = cs.next() else {
        return String::new();
    };
    let mut ret = first.to_uppercase().to_string();
    for c in cs {
        ret.extend(c.to_lowercase());
    }
    ret
}

/// look up the atomic number of `s`, ignoring case. the dummy symbol "X" is
/// not a valid element
pub fn symbol_to_number(s: &str) -> Option<usize> {
    let s = titlecase(s);
    NUMBER_TO_SYMBOL
        .iter()
        .skip(1)
        .position(|&x| x == s)
        .map(|i| i + 1)
}

/// the symbol for `atomic_number`. panics for numbers outside the table
pub fn symbol(atomic_number: usize) -> &'static str {
    NUMBER_TO_SYMBOL[atomic_number]
}

/// Extract the element from a CIF site label or type symbol like `Ti1`,
/// `O2a`, or `Ti4+`. Two-letter symbols are preferred over one-letter ones so
/// that `Co1` is cobalt rather than carbon.
pub fn element_from_label(label: &str) -> Option<usize> {
    let letters: String =
        label.chars().take_while(char::is_ascii_alphabetic).collect();
    if letters.len() >= 2 {
        if let Some(n) = symbol_to_number(&letters[..2]) {
            return Some(n);
        }
    }
    letters.get(..1).and_then(symbol_to_number)
}
