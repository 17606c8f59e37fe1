//! A small reader for the subset of CIF needed to build a [Structure]: the
//! first data block's cell parameters, its atom-site loop, and its symmetry
//! operations.

use std::{collections::HashMap, str::FromStr, sync::OnceLock};

use nalgebra::Vector3;
use regex::Regex;

use crate::{
    cell::Cell,
    element::{element_from_label, symbol},
    structure::{Site, Structure},
    symop::{SymOp, SymOpError},
};

#[cfg(test)]
mod tests;

/// fractional distance below which two symmetry images are the same site
const DUPLICATE_TOL: f64 = 1e-4;

const SYMOP_TAGS: [&str; 2] =
    ["_symmetry_equiv_pos_as_xyz", "_space_group_symop_operation_xyz"];

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum CifError {
    #[error("no data block found")]
    NoDataBlock,

    #[error("missing required tag `{0}`")]
    MissingTag(&'static str),

    #[error("failed to parse `{value}` for `{tag}` as a number")]
    Number { tag: String, value: String },

    #[error("cell parameters do not describe a valid cell")]
    InvalidCell,

    #[error("no atom sites found")]
    NoSites,

    #[error("unrecognized element for site `{0}`")]
    UnknownElement(String),

    #[error("loop on line {line} has {values} values for {tags} tags")]
    RaggedLoop {
        line: usize,
        values: usize,
        tags: usize,
    },

    #[error("unterminated {0} starting on line {1}")]
    Unterminated(&'static str, usize),

    #[error("unexpected value `{value}` on line {line}")]
    UnexpectedValue { value: String, line: usize },

    #[error(transparent)]
    SymOp(#[from] SymOpError),
}

#[derive(Debug, PartialEq)]
enum Token {
    Data(String),
    Loop,
    Tag(String),
    Value(String),
}

/// split `s` into tokens paired with their 1-based line numbers
fn tokenize(s: &str) -> Result<Vec<(usize, Token)>, CifError> {
    let mut ret = Vec::new();
    let mut lines = s.lines().enumerate().map(|(i, l)| (i + 1, l));
    while let Some((lineno, line)) = lines.next() {
        if let Some(first) = line.strip_prefix(';') {
            let mut text = vec![first];
            loop {
                let Some((_, line)) = lines.next() else {
                    return Err(CifError::Unterminated("text field", lineno));
                };
                if line.starts_with(';') {
                    break;
                }
                text.push(line);
            }
            let text = text.join("\n").trim().to_owned();
            ret.push((lineno, Token::Value(text)));
            continue;
        }
        let mut rest = line.trim_start();
        while !rest.is_empty() {
            if rest.starts_with('#') {
                break;
            }
            let (word, tail) = if let Some(q) =
                rest.chars().next().filter(|&c| c == '\'' || c == '"')
            {
                // a quote only closes when followed by whitespace or the end
                // of the line
                let body = &rest[1..];
                let end = body
                    .char_indices()
                    .find(|&(i, c)| {
                        c == q
                            && body[i + 1..]
                                .chars()
                                .next()
                                .is_none_or(char::is_whitespace)
                    })
                    .map(|(i, _)| i)
                    .ok_or(CifError::Unterminated("quoted value", lineno))?;
                ret.push((lineno, Token::Value(body[..end].to_owned())));
                rest = body[end + 1..].trim_start();
                continue;
            } else {
                rest.split_once(char::is_whitespace).unwrap_or((rest, ""))
            };
            let lower = word.to_ascii_lowercase();
            let token = if lower == "loop_" {
                Token::Loop
            } else if let Some(name) = lower.strip_prefix("data_") {
                Token::Data(name.to_owned())
            } else if word.starts_with('_') {
                Token::Tag(lower)
            } else {
                Token::Value(word.to_owned())
            };
            ret.push((lineno, token));
            rest = tail.trim_start();
        }
    }
    Ok(ret)
}

#[derive(Debug, Default)]
struct Table {
    tags: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn column(&self, tag: &str) -> Option<usize> {
        self.tags.iter().position(|t| t == tag)
    }
}

#[derive(Debug, Default)]
struct Block {
    items: HashMap<String, String>,
    loops: Vec<Table>,
}

impl Block {
    /// the loop containing `tag` and the column index of `tag` within it
    fn find_loop(&self, tag: &str) -> Option<(&Table, usize)> {
        self.loops
            .iter()
            .find_map(|l| l.column(tag).map(|col| (l, col)))
    }

    fn number(&self, tag: &'static str) -> Result<f64, CifError> {
        let value = self.items.get(tag).ok_or(CifError::MissingTag(tag))?;
        parse_number(tag, value)
    }
}

/// read the first data block out of `tokens`
fn read_block(tokens: Vec<(usize, Token)>) -> Result<Block, CifError> {
    let mut tokens = tokens
        .into_iter()
        .skip_while(|(_, t)| !matches!(t, Token::Data(_)));
    let Some((_, Token::Data(name))) = tokens.next() else {
        return Err(CifError::NoDataBlock);
    };
    log::trace!("reading data block `{name}`");
    let mut tokens = tokens
        .take_while(|(_, t)| !matches!(t, Token::Data(_)))
        .peekable();
    let mut block = Block::default();
    while let Some((line, token)) = tokens.next() {
        match token {
            Token::Tag(tag) => {
                let value = match tokens
                    .next_if(|(_, t)| matches!(t, Token::Value(_)))
                {
                    Some((_, Token::Value(v))) => v,
                    _ => String::from("?"),
                };
                block.items.insert(tag, value);
            }
            Token::Loop => {
                let mut table = Table::default();
                while let Some((_, Token::Tag(tag))) =
                    tokens.next_if(|(_, t)| matches!(t, Token::Tag(_)))
                {
                    table.tags.push(tag);
                }
                let mut values = Vec::new();
                while let Some((_, Token::Value(v))) =
                    tokens.next_if(|(_, t)| matches!(t, Token::Value(_)))
                {
                    values.push(v);
                }
                if table.tags.is_empty()
                    || values.len() % table.tags.len() != 0
                {
                    return Err(CifError::RaggedLoop {
                        line,
                        values: values.len(),
                        tags: table.tags.len(),
                    });
                }
                table.rows = values
                    .chunks(table.tags.len())
                    .map(<[String]>::to_vec)
                    .collect();
                block.loops.push(table);
            }
            Token::Value(value) => {
                return Err(CifError::UnexpectedValue { value, line });
            }
            Token::Data(_) => unreachable!("stopped at the next data block"),
        }
    }
    Ok(block)
}

/// `?` and `.` mark unknown and inapplicable values
fn is_null(value: &str) -> bool {
    value == "?" || value == "."
}

/// parse a CIF number, discarding any standard uncertainty like `4.59(3)`
fn parse_number(tag: &str, value: &str) -> Result<f64, CifError> {
    static NUMBER: OnceLock<Regex> = OnceLock::new();
    let re = NUMBER.get_or_init(|| {
        Regex::new(r"^([+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)(?:\(\d+\))?$")
            .unwrap()
    });
    re.captures(value)
        .and_then(|c| c[1].parse().ok())
        .ok_or_else(|| CifError::Number {
            tag: tag.to_owned(),
            value: value.to_owned(),
        })
}

fn symops(block: &Block) -> Result<Vec<SymOp>, CifError> {
    for tag in SYMOP_TAGS {
        if let Some((table, col)) = block.find_loop(tag) {
            return table
                .rows
                .iter()
                .map(|row| row[col].parse::<SymOp>().map_err(CifError::from))
                .collect();
        }
        if let Some(op) = block.items.get(tag) {
            return Ok(vec![op.parse::<SymOp>()?]);
        }
    }
    Ok(vec![SymOp::identity()])
}

/// wrapped fractional distance between `a` and `b` is within [DUPLICATE_TOL]
fn same_site(a: &Vector3<f64>, b: &Vector3<f64>) -> bool {
    (a - b)
        .iter()
        .all(|d| (d - d.round()).abs() < DUPLICATE_TOL)
}

/// Parse the contents of a CIF file into a [Structure]. The asymmetric unit is
/// expanded with the file's symmetry operations. The result is fully periodic
pub fn parse(s: &str) -> Result<Structure, CifError> {
    let block = read_block(tokenize(s)?)?;

    let cell = Cell::from_parameters(
        block.number("_cell_length_a")?,
        block.number("_cell_length_b")?,
        block.number("_cell_length_c")?,
        block.number("_cell_angle_alpha")?,
        block.number("_cell_angle_beta")?,
        block.number("_cell_angle_gamma")?,
    )
    .ok_or(CifError::InvalidCell)?;

    let Some((table, x)) = block.find_loop("_atom_site_fract_x") else {
        return Err(CifError::NoSites);
    };
    let y = table
        .column("_atom_site_fract_y")
        .ok_or(CifError::MissingTag("_atom_site_fract_y"))?;
    let z = table
        .column("_atom_site_fract_z")
        .ok_or(CifError::MissingTag("_atom_site_fract_z"))?;
    let label = table.column("_atom_site_label");
    let type_symbol = table.column("_atom_site_type_symbol");
    if label.is_none() && type_symbol.is_none() {
        return Err(CifError::MissingTag("_atom_site_label"));
    }

    let ops = symops(&block)?;
    let mut sites: Vec<Site> = Vec::new();
    for row in &table.rows {
        let name = label.map(|i| row[i].as_str());
        let element = type_symbol
            .map(|i| row[i].as_str())
            .filter(|s| !is_null(s))
            .or(name)
            .and_then(element_from_label)
            .ok_or_else(|| {
                CifError::UnknownElement(
                    name.or(type_symbol.map(|i| row[i].as_str()))
                        .unwrap_or_default()
                        .to_owned(),
                )
            })?;
        let frac = Vector3::new(
            parse_number("_atom_site_fract_x", &row[x])?,
            parse_number("_atom_site_fract_y", &row[y])?,
            parse_number("_atom_site_fract_z", &row[z])?,
        );
        let name = name.unwrap_or(symbol(element));
        for op in &ops {
            let image = op.apply(&frac);
            if !sites.iter().any(|s| same_site(&s.frac, &image)) {
                sites.push(Site::new(element, name, image));
            }
        }
    }
    if sites.is_empty() {
        return Err(CifError::NoSites);
    }
    log::debug!(
        "read {} sites from {} symmetry operations",
        sites.len(),
        ops.len()
    );

    Ok(Structure::new(cell, sites))
}

impl FromStr for Structure {
    type Err = CifError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
