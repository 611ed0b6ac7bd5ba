use bindery_dom::layout::{Cell, MAX_GRID_INDEX, grid_extent};
use bindery_dom::{Options, ToolkitError};

fn opts(pairs: &[(&str, &str)]) -> Options {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn cell_defaults_to_origin() {
    let cell = Cell::from_options(&Options::new()).unwrap();
    assert_eq!(cell, Cell { column: 0, row: 0, columnspan: 1, rowspan: 1 });
    assert_eq!(cell.extent(), (1, 1));
}

#[test]
fn extent_covers_spans() {
    let cells = [
        opts(&[("column", "0"), ("row", "0")]),
        opts(&[("column", "2"), ("row", "1"), ("rowspan", "3")]),
        opts(&[("column", "1"), ("columnspan", "4")]),
    ];
    assert_eq!(grid_extent(&cells), (5, 4));
}

#[test]
fn garbage_is_ignored() {
    let cells = [opts(&[("column", "x"), ("columnspan", "0")])];
    assert_eq!(grid_extent(&cells), (1, 1));
}

#[test]
fn empty_grid() {
    assert_eq!(grid_extent(&Vec::<Options>::new()), (0, 0));
}

#[test]
fn indices_above_the_limit_are_rejected() {
    let at_limit = opts(&[("column", "10000"), ("columnspan", "10000")]);
    let cell = Cell::from_options(&at_limit).unwrap();
    assert_eq!(cell.extent(), (2 * MAX_GRID_INDEX, 1));

    for value in ["10001", "18446744073709551615", "99999999999999999999999"] {
        match Cell::from_options(&opts(&[("column", value)])) {
            Err(ToolkitError::GridIndex { option, value: v }) => {
                assert_eq!(option, "column");
                assert_eq!(v, value);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
    assert!(Cell::from_options(&opts(&[("rowspan", "20000000")])).is_err());
}

#[test]
fn extent_saturates() {
    let cell = Cell { column: usize::MAX, row: 0, columnspan: 1, rowspan: 1 };
    assert_eq!(cell.extent(), (usize::MAX, 1));
}

#[test]
fn out_of_range_cells_do_not_widen_the_grid() {
    let cells = [opts(&[("column", "2")]), opts(&[("column", "50000")])];
    assert_eq!(grid_extent(&cells), (3, 1));
}
