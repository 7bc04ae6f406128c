//! Tests for formula evaluation against a host sheet

use gridcalc::prelude::*;
use gridcalc::{
    column_to_index, evaluate_formula, index_to_column, is_formula, parse_range,
    supported_functions, NoCells,
};
use pretty_assertions::assert_eq;

fn sheet_with(cells: &[(&str, &str)]) -> Sheet {
    let mut sheet = Sheet::new("Sheet1");
    for (address, raw) in cells {
        sheet.set_input(address, raw).unwrap();
    }
    sheet
}

fn eval(sheet: &Sheet, formula: &str) -> Value {
    evaluate_formula(formula, sheet, None)
}

/// Test basic formula evaluation without cell references
#[test]
fn test_evaluate_simple_formulas() {
    assert_eq!(evaluate_formula("=1+2*3", &NoCells, None), Value::Number(9.0));
    assert_eq!(
        evaluate_formula("=\"Hello \"&\"World\"", &NoCells, None),
        Value::text("Hello World")
    );
    assert_eq!(evaluate_formula("=5>3", &NoCells, None), Value::Number(1.0));
    assert_eq!(evaluate_formula("=-12.5", &NoCells, None), Value::Number(-12.5));
}

/// Test the documented function examples
#[test]
fn test_function_examples() {
    let cases: &[(&str, Value)] = &[
        ("=SUM(1,2,3)", Value::Number(6.0)),
        ("=AVERAGE(2,4)", Value::Number(3.0)),
        ("=COUNT(1,\"x\",2)", Value::Number(2.0)),
        ("=COUNTA(1,\"\",\"x\")", Value::Number(2.0)),
        ("=IF(1>0,\"yes\",\"no\")", Value::text("yes")),
        ("=IF(0,\"yes\",\"no\")", Value::text("no")),
        ("=ROUND(3.14159,2)", Value::Number(3.14)),
        ("=ROUNDUP(3.141,2)", Value::Number(3.15)),
        ("=ROUNDDOWN(3.149,2)", Value::Number(3.14)),
        ("=UNKNOWNFN()", Value::text("#NAME?")),
        ("=5/0", Value::Number(0.0)),
        ("=2+3*4", Value::Number(20.0)),
        ("=STDEV(1,2,3,4)", Value::Number(1.2909944487358056)),
        ("=VAR(5)", Value::Number(0.0)),
        ("=PMT(0,10,1000)", Value::Number(-100.0)),
        ("=PROPER(\"hello world\")", Value::text("Hello World")),
        ("=SUBSTITUTE(\"a.b.c\",\".\",\"/\")", Value::text("a/b/c")),
        ("=MONTH(\"2024-07-04\")", Value::Number(7.0)),
    ];

    for (formula, expected) in cases {
        assert_eq!(&evaluate_formula(formula, &NoCells, None), expected, "{}", formula);
    }
}

/// Test formula evaluation with cell references
#[test]
fn test_evaluate_with_cell_references() {
    let sheet = sheet_with(&[("A1", "10"), ("A2", "20"), ("A3", "30"), ("B1", "5")]);

    assert_eq!(eval(&sheet, "=A1"), Value::Number(10.0));
    assert_eq!(eval(&sheet, "=A1+A2"), Value::Number(30.0));
    assert_eq!(eval(&sheet, "=A1*B1"), Value::Number(50.0));
    assert_eq!(eval(&sheet, "=SUM(A1:A3)"), Value::Number(60.0));
    assert_eq!(eval(&sheet, "=AVERAGE(A3:A1)"), Value::Number(20.0));
    assert_eq!(eval(&sheet, "=MAX(A1:B3)"), Value::Number(30.0));
    assert_eq!(eval(&sheet, "=Z99"), Value::Number(0.0));
}

/// Formula cells reference other formula cells transitively
#[test]
fn test_cross_cell_formulas() {
    let sheet = sheet_with(&[
        ("A1", "3"),
        ("A2", "=A1*2"),
        ("A3", "=A2+A1"),
        ("B1", "=SUM(A1:A3)"),
        ("B2", "=IF(B1>10,\"big\",\"small\")"),
        ("B3", "=UPPER(B2)&\"!\""),
    ]);

    assert_eq!(eval(&sheet, "=A3"), Value::Number(9.0));
    assert_eq!(eval(&sheet, "=B1"), Value::Number(18.0));
    assert_eq!(eval(&sheet, "=B3"), Value::text("BIG!"));
}

/// A1 depends on B1 and B1 depends on A1
#[test]
fn test_mutual_reference_terminates_with_cycle() {
    let mut sheet = sheet_with(&[("A1", "=B1"), ("B1", "=A1")]);

    assert_eq!(eval(&sheet, "=A1"), Value::text("#CYCLE!"));
    assert_eq!(eval(&sheet, "=SUM(A1:B1)"), Value::text("#CYCLE!"));

    let stats = sheet.calculate();
    assert_eq!(stats.cycles, 2);
    assert_eq!(sheet.value("A1").unwrap(), Value::text("#CYCLE!"));
    assert_eq!(sheet.value("B1").unwrap(), Value::text("#CYCLE!"));
}

/// Long loops are caught as well as two-cell ones
#[test]
fn test_long_cycle() {
    let mut cells: Vec<(String, String)> = (1..50)
        .map(|i| (format!("A{}", i), format!("=A{}+1", i + 1)))
        .collect();
    cells.push(("A50".into(), "=A1".into()));
    let refs: Vec<(&str, &str)> = cells.iter().map(|(a, f)| (a.as_str(), f.as_str())).collect();
    let sheet = sheet_with(&refs);

    assert_eq!(eval(&sheet, "=A25"), Value::text("#CYCLE!"));
}

/// `A1` through `A{count}` each hold `formula(next)`; the cell after the last holds `1`
fn chained_sheet(count: usize, formula: impl Fn(usize) -> String) -> Sheet {
    let mut sheet = Sheet::new("Sheet1");
    for i in 1..=count {
        sheet.set_input(&format!("A{}", i), &formula(i + 1)).unwrap();
    }
    sheet.set_input(&format!("A{}", count + 1), "1").unwrap();
    sheet
}

/// Deeply nested formulas chained across cells stop with a sentinel instead
/// of exhausting a 2 MB worker stack
#[test]
fn test_deep_nesting_across_cells_on_small_stack() {
    let handle = std::thread::Builder::new()
        .stack_size(2 * 1024 * 1024)
        .spawn(|| {
            let nested = |next: usize| {
                format!("={}A{}{}", "ABS(".repeat(60), next, ")".repeat(60))
            };
            let mut deep = chained_sheet(127, nested);
            let stats = deep.calculate();

            let mut bare = chained_sheet(128, |next| format!("=A{}", next));
            let top = eval(&bare, "=A1");
            bare.calculate();

            (
                stats,
                deep.value("A1").unwrap(),
                deep.value("A127").unwrap(),
                top,
                bare.value("A1").unwrap(),
            )
        })
        .unwrap();
    let (stats, deep_top, deep_last, bare_top, bare_calculated) = handle.join().unwrap();

    assert_eq!(stats.formula_count, 127);
    assert!(stats.cycles > 0);
    assert_eq!(deep_top, Value::text("#CYCLE!"));
    assert_eq!(deep_last, Value::Number(1.0));
    assert_eq!(bare_top, Value::Number(1.0));
    assert_eq!(bare_calculated, Value::Number(1.0));
}

/// Cells sharing a dependency do not re-evaluate it per path
#[test]
fn test_doubling_chain_calculates() {
    let mut sheet = chained_sheet(40, |next| format!("=A{}+A{}", next, next));
    let stats = sheet.calculate();
    assert_eq!(stats.errors, 0);
    assert_eq!(sheet.value("A1").unwrap(), Value::Number(1099511627776.0));
    assert_eq!(sheet.value("A40").unwrap(), Value::Number(2.0));
}

/// References past column XFD or the last row are errors, not text
#[test]
fn test_reference_outside_grid() {
    let mut sheet = sheet_with(&[
        ("A1", "=XFE1+1"),
        ("A2", "=A1048577"),
        ("A3", "=XFD1048576+1"),
    ]);
    let stats = sheet.calculate();
    assert_eq!(stats.errors, 2);
    assert_eq!(sheet.value("A1").unwrap(), Value::text("#ERROR!"));
    assert_eq!(sheet.value("A2").unwrap(), Value::text("#ERROR!"));
    assert_eq!(sheet.value("A3").unwrap(), Value::Number(1.0));
}

/// A referenced cell that fails does not poison the caller
#[test]
fn test_referenced_error_is_a_value() {
    let sheet = sheet_with(&[("A1", "=SUM(1,"), ("A2", "=A1&\"?\"")]);
    assert_eq!(eval(&sheet, "=A2"), Value::text("#ERROR!?"));
}

/// Precedence mode is opt-in
#[test]
fn test_arithmetic_modes() {
    let sheet = sheet_with(&[("A1", "2"), ("A2", "3"), ("A3", "4")]);
    let compatible = Evaluator::default();
    let precedence = Evaluator::new(EvaluatorOptions::with_precedence());

    assert_eq!(
        compatible.evaluate("=A1+A2*A3", &sheet, None),
        Value::Number(20.0)
    );
    assert_eq!(
        precedence.evaluate("=A1+A2*A3", &sheet, None),
        Value::Number(14.0)
    );
}

/// Documented placeholder behavior
#[test]
fn test_simplified_functions() {
    let sheet = sheet_with(&[
        ("A1", "apple"),
        ("A2", "pear"),
        ("A3", "apple"),
        ("B1", "1"),
        ("B2", "2"),
        ("B3", "3"),
    ]);

    assert_eq!(eval(&sheet, "=VLOOKUP(\"pear\",A1:B3,2,0)"), Value::text("pear"));
    assert_eq!(eval(&sheet, "=COUNTIF(A1:A3,\"apple\")"), Value::Number(2.0));
    assert_eq!(eval(&sheet, "=SUMIF(A1:A3,\"apple\",B1:B3)"), Value::Number(6.0));
    assert_eq!(eval(&sheet, "=AVERAGEIF(B1:B3,\">1\")"), Value::Number(2.0));
}

#[test]
fn test_reference_helpers() {
    for s in ["A", "Z", "AA", "AZ", "BA", "ZZ"] {
        assert_eq!(index_to_column(column_to_index(s).unwrap()), s);
    }
    for i in [0, 25, 26, 51, 52, 701] {
        assert_eq!(column_to_index(&index_to_column(i)).unwrap(), i);
    }

    let forward: Vec<_> = parse_range("A1:B2").unwrap().cells().collect();
    let backward: Vec<_> = parse_range("B2:A1").unwrap().cells().collect();
    assert_eq!(forward, backward);
    assert_eq!(
        forward,
        vec![
            CellCoordinate::new(0, 0),
            CellCoordinate::new(1, 0),
            CellCoordinate::new(0, 1),
            CellCoordinate::new(1, 1),
        ]
    );
}

#[test]
fn test_host_helpers() {
    assert!(is_formula("=A1"));
    assert!(!is_formula("A1"));

    let names = supported_functions();
    assert!(names.windows(2).all(|w| w[0] < w[1]));
    assert!(names.contains(&"VLOOKUP"));
}

#[test]
fn test_csv_sheet_calculation() {
    let data = "Item,Qty,Price,Total\nPen,3,1.5,=B2*C2\nBook,2,12,=B3*C3\n,,,=SUM(D2:D3)\n";
    let mut sheet = CsvReader::read(data.as_bytes(), &CsvReadOptions::default()).unwrap();

    let stats = sheet.calculate();
    assert_eq!(stats.formula_count, 3);
    assert_eq!(stats.errors, 0);

    let mut out = Vec::new();
    CsvWriter::write(&sheet, &mut out, &CsvWriteOptions::default()).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "Item,Qty,Price,Total\nPen,3,1.5,4.5\nBook,2,12,24\n,,,28.5\n"
    );
}

#[test]
fn test_csv_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.csv");
    let output = dir.path().join("output.csv");
    std::fs::write(&input, "1,2,=A1+B1\n=C1*10,x,=A2&B2\n").unwrap();

    let mut sheet = CsvReader::read_file(&input, &CsvReadOptions::default()).unwrap();
    assert_eq!(sheet.formula("C1").unwrap(), Some("=A1+B1"));
    sheet.calculate();

    let options = CsvWriteOptions {
        write_formulas: true,
        ..Default::default()
    };
    CsvWriter::write_file(&sheet, &output, &options).unwrap();
    let reloaded = CsvReader::read_file(&output, &CsvReadOptions::default()).unwrap();
    assert_eq!(reloaded.formula("B2").unwrap(), None);
    assert_eq!(reloaded.formula("C2").unwrap(), Some("=A2&B2"));

    CsvWriter::write_file(&sheet, &output, &CsvWriteOptions::default()).unwrap();
    assert_eq!(std::fs::read_to_string(&output).unwrap(), "1,2,3\n30,x,30x\n");
}
