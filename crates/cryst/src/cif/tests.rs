use std::fs::read_to_string;

use approx::assert_abs_diff_eq;
use insta::assert_snapshot;
use nalgebra::Vector3;
use test_case::test_case;

use super::*;

fn load(name: &str) -> Structure {
    let path = format!("testfiles/{name}");
    read_to_string(&path).unwrap().parse().unwrap()
}

#[test]
fn rutile() {
    let got = load("TiO2.cif");
    assert_eq!(got.sites.len(), 6);
    assert_eq!(got.kinds(), vec!["Ti", "O"]);
    assert_eq!(got.formula(), "O4Ti2");
    assert_eq!(got.pbc, [true; 3]);
    assert_abs_diff_eq!(
        got.cell.volume(),
        4.5937 * 4.5937 * 2.9587,
        epsilon = 1e-10
    );
    let want = [
        Site::new(22, "Ti1", Vector3::new(0.0, 0.0, 0.0)),
        Site::new(22, "Ti1", Vector3::new(0.5, 0.5, 0.5)),
        Site::new(8, "O1", Vector3::new(0.3053, 0.3053, 0.0)),
        Site::new(8, "O1", Vector3::new(0.6947, 0.6947, 0.0)),
        Site::new(8, "O1", Vector3::new(0.1947, 0.8053, 0.5)),
        Site::new(8, "O1", Vector3::new(0.8053, 0.1947, 0.5)),
    ];
    for (g, w) in got.sites.iter().zip(want.iter()) {
        assert_abs_diff_eq!(g, w, epsilon = 1e-10);
        assert_eq!(g.label, w.label);
    }
}

#[test]
fn monolayer() {
    let got = load("MoS2_ML.cif");
    assert_eq!(got.formula(), "MoS2");
    assert_snapshot!(got.to_string(), @r"
    cell:
       3.1900000000   0.0000000000   0.0000000000
      -1.5950000000   2.7626210381   0.0000000000
       0.0000000000   0.0000000000  20.0000000000
    pbc: [true, true, true]
    sites:
    Mo      0.3333330000   0.6666670000   0.5000000000
    S       0.6666670000   0.3333330000   0.4215000000
    S       0.6666670000   0.3333330000   0.5785000000
    ");
}

#[test]
fn text_fields_and_comments() {
    let s = "
data_test # a comment
_publ_section_title
;
 A multi-line
 title with data_ and loop_ inside
;
_cell_length_a 2.0 _cell_length_b 2.0 _cell_length_c 2.0
_cell_angle_alpha 90 _cell_angle_beta 90 _cell_angle_gamma 90
loop_
_atom_site_type_symbol _atom_site_fract_x _atom_site_fract_y _atom_site_fract_z
Fe 0 0 0 Fe 0.5 0.5 0.5
data_second
_cell_length_a 9.0
";
    let got = parse(s).unwrap();
    assert_eq!(got.formula(), "Fe2");
    assert_eq!(got.sites[1].label, "Fe");
    assert_abs_diff_eq!(got.cell.volume(), 8.0, epsilon = 1e-10);
}

#[test]
fn hill_order_with_carbon() {
    let s = "data_ch
_cell_length_a 5 _cell_length_b 5 _cell_length_c 5
_cell_angle_alpha 90 _cell_angle_beta 90 _cell_angle_gamma 90
loop_
_atom_site_label _atom_site_fract_x _atom_site_fract_y _atom_site_fract_z
O1 0.5 0.5 0.5
H1 0.1 0.0 0.0
C1 0.0 0.0 0.0
H2 0.0 0.1 0.0
N1 0.2 0.2 0.2
";
    assert_eq!(parse(s).unwrap().formula(), "CH2NO");
}

const CELL: &str = "
_cell_length_a 2 _cell_length_b 2 _cell_length_c 2
_cell_angle_alpha 90 _cell_angle_beta 90 _cell_angle_gamma 90
";

#[test_case("", CifError::NoDataBlock; "empty")]
#[test_case("data_x\n_cell_length_a 2\n", CifError::MissingTag("_cell_length_b"); "missing tag")]
#[test_case("data_x\n_cell_length_a abc\n", CifError::Number {
    tag: "_cell_length_a".into(),
    value: "abc".into(),
}; "bad number")]
#[test_case("data_x\nloop_\n_a\n_b\n1 2 3\n", CifError::RaggedLoop {
    line: 2,
    values: 3,
    tags: 2,
}; "ragged loop")]
#[test_case("data_x\n;\nnever closed\n", CifError::Unterminated("text field", 2); "text field")]
#[test_case("data_x\n_title 'open\n", CifError::Unterminated("quoted value", 2); "quote")]
#[test_case("data_x\n_a 1 2\n", CifError::UnexpectedValue {
    value: "2".into(),
    line: 2,
}; "stray value")]
fn invalid(s: &str, want: CifError) {
    assert_eq!(parse(s), Err(want));
}

#[test]
fn no_sites() {
    let s = format!("data_x{CELL}");
    assert_eq!(parse(&s), Err(CifError::NoSites));
}

#[test]
fn unknown_element() {
    let s = format!(
        "data_x{CELL}loop_
_atom_site_label _atom_site_fract_x _atom_site_fract_y _atom_site_fract_z
Qq1 0 0 0
"
    );
    assert_eq!(parse(&s), Err(CifError::UnknownElement("Qq1".into())));
}

#[test]
fn bad_symop() {
    let s = format!(
        "data_x{CELL}_symmetry_equiv_pos_as_xyz 'x,y'
loop_
_atom_site_label _atom_site_fract_x _atom_site_fract_y _atom_site_fract_z
H1 0 0 0
"
    );
    assert_eq!(parse(&s), Err(CifError::SymOp(SymOpError("x,y".into()))));
}
