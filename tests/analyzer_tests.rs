mod common;

use common::{analyze, wain};
use wlp4c::analyzer::{SemanticVisitor, Type};
use wlp4c::error::{DeclarationError, ResolutionError, TypeError};
use wlp4c::grammar::Symbol;
use wlp4c::{Error, ErrorKind, Stage};

fn failure(source: &str) -> Error {
    let err = analyze(source).unwrap_err();
    assert_eq!(err.stage, Stage::Processing, "{err}");
    err.error
}

fn type_error(source: &str) -> TypeError {
    match failure(source) {
        Error::Type(e) => e,
        other => panic!("expected a type error, got {other:?}"),
    }
}

fn declaration_error(source: &str) -> DeclarationError {
    match failure(source) {
        Error::Declaration(e) => e,
        other => panic!("expected a declaration error, got {other:?}"),
    }
}

fn resolution_error(source: &str) -> ResolutionError {
    match failure(source) {
        Error::Resolution(e) => e,
        other => panic!("expected a resolution error, got {other:?}"),
    }
}

#[test]
fn well_typed_pointer_program() {
    let source = wain(
        "int* p = NULL; int* q = NULL; int n = 0;
         p = new int[b];
         q = p + 1;
         q = 1 + q;
         q = q - 1;
         n = q - p;
         n = *p;
         *p = n * 3 / 2 % 5;
         (n) = 4;
         p = &n;
         p = &(*q);
         if (p < q) { println(n); } else { n = 1; }
         while (p != NULL) { p = NULL; }
         delete [] q;",
    );
    analyze(&source).unwrap();
}

#[test]
fn expression_types_are_recorded() {
    let (root, _) = analyze(&wain("int* p = NULL; p = p + 1;")).unwrap();
    let statement = root.find(Symbol::Statement).unwrap();

    let lvalue = statement.child(Symbol::Lvalue, 1).unwrap();
    let expr = statement.child(Symbol::Expr, 1).unwrap();
    assert_eq!(lvalue.ty, Some(Type::IntPtr));
    assert_eq!(expr.ty, Some(Type::IntPtr));
    assert_eq!(expr.child(Symbol::Term, 1).unwrap().ty, Some(Type::Int));
    assert_eq!(statement.ty, None);
}

#[test]
fn reanalysis_is_idempotent() {
    let source = "int f(int* p, int n) { return *(p + n); }
                  int wain(int* a, int b) { return f(a, b - 1); }";
    let (mut root, program) = analyze(source).unwrap();
    let annotated = root.clone();

    let again = SemanticVisitor::new().visit_program(&mut root).unwrap();
    assert_eq!(root, annotated);
    assert_eq!(again, program);
}

#[test]
fn procedures_may_call_later_procedures() {
    let source = "int f(int x) { return g(x, x); }
                  int g(int x, int y) { return x + y; }
                  int wain(int a, int b) { return f(a); }";
    let (_, program) = analyze(source).unwrap();

    assert_eq!(program.len(), 3);
    assert_eq!(program.get("g").unwrap().signature, [Type::Int, Type::Int]);
    assert_eq!(program.entry().unwrap().name, "wain");
}

#[test]
fn procedure_table_listing() {
    let source = "int f(int* p, int q) { int r = 1; return q; }
                  int wain(int* a, int b) { int* c = NULL; return 0; }";
    let (_, program) = analyze(source).unwrap();

    insta::assert_snapshot!(program.to_string(), @r"
    f(int*, int)
      int* p
      int q
      int r
    wain(int*, int)
      int* a
      int b
      int* c
    ");
}

#[test]
fn duplicate_declarations() {
    assert_eq!(
        declaration_error(&wain("int x = 1; int x = 2;")),
        DeclarationError::DuplicateVariable("x".into())
    );
    assert_eq!(
        declaration_error(&wain("int a = 1;")),
        DeclarationError::DuplicateVariable("a".into())
    );
    assert_eq!(
        declaration_error(
            "int f() { return 1; } int f() { return 2; } int wain(int a, int b) { return 0; }"
        ),
        DeclarationError::DuplicateProcedure("f".into())
    );
}

#[test]
fn initializer_must_match_declared_type() {
    assert_eq!(
        declaration_error(&wain("int* p = NULL; int x = NULL;")),
        DeclarationError::Initializer {
            name: "x".into(),
            ty: Type::Int
        }
    );
    assert_eq!(
        declaration_error(&wain("int x = 1; int* p = 5;")),
        DeclarationError::Initializer {
            name: "p".into(),
            ty: Type::IntPtr
        }
    );
}

#[test]
fn newest_bad_initializer_is_reported() {
    assert_eq!(
        declaration_error(&wain("int x = NULL; int* p = 5;")),
        DeclarationError::Initializer {
            name: "p".into(),
            ty: Type::IntPtr
        }
    );
}

#[test]
fn unresolved_names() {
    assert_eq!(
        resolution_error(&wain("println(z);")),
        ResolutionError::UndeclaredVariable("z".into())
    );
    assert_eq!(
        resolution_error(&wain("a = g();")),
        ResolutionError::UndeclaredProcedure("g".into())
    );
}

#[test]
fn calling_a_variable() {
    let source = "int f() { return 1; }
                  int wain(int a, int b) { int f = 2; return f(); }";
    assert_eq!(
        resolution_error(source),
        ResolutionError::CallOnVariable("f".into())
    );
}

#[test]
fn arity_is_checked_before_argument_types() {
    let f = "int f(int x, int y) { return x; }";
    assert_eq!(
        type_error(&format!("{f} int wain(int a, int b) {{ return f(1, 2, 3); }}")),
        TypeError::ArgumentCount {
            callee: "f".into(),
            expected: 2,
            found: 3
        }
    );
    assert_eq!(
        type_error(&format!("{f} int wain(int a, int b) {{ return f(a); }}")),
        TypeError::ArgumentCount {
            callee: "f".into(),
            expected: 2,
            found: 1
        }
    );
    assert_eq!(
        type_error(&format!("{f} int wain(int* a, int b) {{ return f(b, a); }}")),
        TypeError::ArgumentType {
            callee: "f".into(),
            position: 2,
            expected: Type::Int,
            found: Type::IntPtr
        }
    );
}

#[test]
fn operator_operand_types() {
    let cases = [
        ("int* p = NULL; p = &p;", TypeError::AddressOf(Type::IntPtr)),
        ("println(*a);", TypeError::Dereference(Type::Int)),
        ("*a = 1;", TypeError::Dereference(Type::Int)),
        (
            "int* p = NULL; println(p * 2);",
            TypeError::Multiplicative {
                op: Symbol::Star,
                left: Type::IntPtr,
                right: Type::Int,
            },
        ),
        (
            "int* p = NULL; println(7 % p);",
            TypeError::Multiplicative {
                op: Symbol::Pct,
                left: Type::Int,
                right: Type::IntPtr,
            },
        ),
        (
            "int* p = NULL; p = 1 - p;",
            TypeError::Additive {
                op: Symbol::Minus,
                left: Type::Int,
                right: Type::IntPtr,
            },
        ),
        (
            "int* p = NULL; p = p + p;",
            TypeError::Additive {
                op: Symbol::Plus,
                left: Type::IntPtr,
                right: Type::IntPtr,
            },
        ),
        (
            "int* p = NULL; p = new int[p];",
            TypeError::Allocation(Type::IntPtr),
        ),
    ];

    for (body, expected) in cases {
        assert_eq!(type_error(&wain(body)), expected, "{body}");
    }
}

#[test]
fn statement_types() {
    let cases = [
        (
            "int* p = NULL; p = 1;",
            TypeError::Assignment {
                left: Type::IntPtr,
                right: Type::Int,
            },
        ),
        ("int* p = NULL; println(p);", TypeError::Println(Type::IntPtr)),
        ("delete [] a;", TypeError::Delete(Type::Int)),
        (
            "int* p = NULL; if (p == 1) { } else { }",
            TypeError::Test {
                op: Symbol::Eq,
                left: Type::IntPtr,
                right: Type::Int,
            },
        ),
        (
            "int* p = NULL; while (a >= p) { }",
            TypeError::Test {
                op: Symbol::Ge,
                left: Type::Int,
                right: Type::IntPtr,
            },
        ),
    ];

    for (body, expected) in cases {
        assert_eq!(type_error(&wain(body)), expected, "{body}");
    }
}

#[test]
fn procedures_return_int() {
    let source = "int f(int* p) { return p; } int wain(int a, int b) { return 0; }";
    assert_eq!(
        type_error(source),
        TypeError::Return {
            procedure: "f".into(),
            found: Type::IntPtr
        }
    );
    assert_eq!(
        type_error("int wain(int* a, int b) { return a; }"),
        TypeError::Return {
            procedure: "wain".into(),
            found: Type::IntPtr
        }
    );
}

#[test]
fn entry_second_parameter_is_int() {
    assert_eq!(
        type_error("int wain(int a, int* b) { return 0; }"),
        TypeError::EntryParameter(Type::IntPtr)
    );
}

#[test]
fn literals_must_fit_a_word() {
    assert_eq!(failure(&wain("println(2147483648);")).kind(), ErrorKind::Range);
    assert_eq!(failure(&wain("int x = 99999999999;")).kind(), ErrorKind::Range);
    analyze(&wain("println(2147483647);")).unwrap();
}

#[test]
fn diagnostic_names_the_stage() {
    let err = analyze(&wain("int x = 1; int x = 2;")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Declaration);
    assert_eq!(
        err.to_string(),
        "ERROR in processing: duplicate variable declaration: x"
    );
}

#[test]
fn long_procedure_bodies() {
    let dcls = (0..2000)
        .map(|i| format!("int v{i} = {i}; "))
        .collect::<String>();
    let body = "a = a + 1; ".repeat(5000);
    let source = format!("int wain(int a, int b) {{ {dcls} {body} return a; }}");

    let (_, program) = analyze(&source).unwrap();
    assert_eq!(program.entry().unwrap().symbols.len(), 2002);

    let listing = common::lines(&common::compile(&source));
    assert_eq!(listing.iter().filter(|line| *line == "sw $3, 8($29)").count(), 5000);

    let bad = format!("int wain(int a, int b) {{ {dcls} {body} a = NULL; return a; }}");
    assert_eq!(
        type_error(&bad),
        TypeError::Assignment {
            left: Type::Int,
            right: Type::IntPtr
        }
    );
}
