use luna_frontend::parse;
use luna_ir::module::Stmt;

use crate::entry_point::{find_entry_point, EntryPointError};
use crate::{compile, Compilation, SignatureError};

fn compile_source(source: &str) -> Result<Compilation, SignatureError> {
    let tree = parse("main", source).unwrap();
    compile(&tree)
}

fn compile_ok(source: &str) -> Compilation {
    compile_source(source).unwrap()
}

/// Wraps `body` in `type Program` / `fun main(): int`.
fn program(body: &str) -> String {
    let mut source = "type Program\n  fun main(): int\n".to_owned();
    for line in body.lines() {
        source.push_str("    ");
        source.push_str(line);
        source.push('\n');
    }
    source
}

fn errors(source: &str) -> Vec<String> {
    compile_ok(source)
        .errors
        .iter()
        .map(ToString::to_string)
        .collect()
}

fn main_statements(compilation: &Compilation) -> &[Stmt] {
    let main = find_entry_point(&compilation.module).unwrap();
    &compilation.module.symbols.funcs[main].statements
}

#[test]
fn let_then_return() {
    let compilation = compile_ok(&program("let x = 5\nreturn x"));

    assert!(compilation.errors.is_empty());
    insta::assert_snapshot!(compilation.module.dump(), @r###"
    module main
    type Program
      static fun main(): int
        let x: int = 5
        return x
    "###);
}

#[test]
fn assigning_let_is_an_error() {
    let compilation = compile_ok(&program("let x = 5\nx = 6\nreturn x"));

    let messages: Vec<_> = compilation.errors.iter().map(ToString::to_string).collect();
    assert_eq!(
        messages,
        ["Variable x can't be modified because declared with 'let'"]
    );

    let token = compilation.errors[0].token.as_ref().unwrap();
    assert_eq!(&*token.line, "    x = 6");
    assert_eq!(token.column, 4);

    // the assignment is dropped
    assert!(matches!(
        main_statements(&compilation),
        [Stmt::Declaration(_), Stmt::Return(Some(_))]
    ));
}

#[test]
fn assigning_var_checks_the_type() {
    assert!(errors(&program("var s = \"a\"\ns = \"b\"\nreturn 0")).is_empty());
    assert_eq!(
        errors(&program("var s = \"a\"\ns = 1\nreturn 0")),
        ["Can't assign a value of type int to variable s of type string"]
    );
}

#[test]
fn assigning_an_argument_is_an_error() {
    let source = "type A\n  fun f(a: int)\n    a = 1\n";
    assert_eq!(errors(source), ["Argument a can't be modified"]);
}

#[test]
fn non_bool_condition_drops_the_whole_if() {
    let compilation = compile_ok(&program("if 1\n  return 2\nreturn 0"));

    let messages: Vec<_> = compilation.errors.iter().map(ToString::to_string).collect();
    assert_eq!(messages, ["If condition must be of type bool, not int"]);
    assert!(matches!(
        main_statements(&compilation),
        [Stmt::Return(Some(_))]
    ));
}

#[test]
fn branch_locals_are_not_visible_after_branch() {
    assert_eq!(
        errors(&program("if 1 < 2\n  let y = 1\nreturn y")),
        ["Could not resolve y"]
    );
}

#[test]
fn names_are_unique_across_the_function() {
    let body = "\
let x = 1
if x < 2
  let x = 2
else
  let y = 3
let y = 4
return x";

    assert_eq!(
        errors(&program(body)),
        [
            "Variable with name x already declared",
            "Variable with name y already declared",
        ]
    );

    let source = "type A\n  fun f(a: int): int\n    let a = 1\n    return a\n";
    assert_eq!(errors(source), ["Variable with name a already declared"]);
}

#[test]
fn errors_are_collected_per_statement() {
    let body = "return \"s\"\nlet a = b\nfoo()\nreturn 1";

    assert_eq!(
        errors(&program(body)),
        [
            "Function must return a value of type int, not string",
            "Could not resolve b",
            "Could not resolve foo",
        ]
    );
}

#[test]
fn calls_resolve_across_types() {
    let source = "\
type Math
  fun add(a: int, b: int): int
    return a + b
type Program
  fun main(): int
    Console.writeLine(\"sum %d\", Math.add(1, 2))
    helper()
    let ok = Math.add(1, 2) < 4
    return 0
  fun helper()
    return
";

    let compilation = compile_ok(source);

    assert!(compilation.errors.is_empty(), "{:?}", compilation.errors);
    insta::assert_snapshot!(compilation.module.dump(), @r###"
    module main
    type Math
      static fun add(a: int, b: int): int
        return a + b
    type Program
      static fun main(): int
        Console.writeLine("sum %d", Math.add(1, 2))
        Program.helper()
        let ok: bool = Math.add(1, 2) < 4
        return 0
      static fun helper()
        return
    "###);
}

#[test]
fn call_arguments_are_checked() {
    let source = "\
type Math
  fun add(a: int, b: int): int
    return a + b
type Program
  fun main()
    Console.writeLine()
    Console.writeLine(1)
    Console.writeLine(\"%s %d\", \"a\", 1)
    Math.add(1)
    Math.add(1, \"2\")
";

    assert_eq!(
        errors(source),
        [
            "Function writeLine takes 1 arguments, but 0 were given",
            "Argument 1 of writeLine must be of type string, not int",
            "Function add takes 2 arguments, but 1 were given",
            "Argument 2 of add must be of type int, not string",
        ]
    );
}

#[test]
fn symbols_are_used_the_way_they_were_declared() {
    let body = "\
let x = 1
x()
let m = main
Console()
Console.foo()
let c = Console.out
let d = Console
let e = x.foo
x
main() = 1
return x";

    assert_eq!(
        errors(&program(body)),
        [
            "x is not a function",
            "main is not a variable",
            "Console is a type and can't be invoked as a function",
            "Type Console has no function named 'foo'",
            "Type Console has no field named 'out'",
            "Member access expected after type Console",
            "x has no members",
            "Assign operator expected",
            "Result of calling main can't be assigned to",
        ]
    );
}

#[test]
fn locals_need_a_value() {
    let body = "let v = Console.writeLine(\"a\")\nlet u\nreturn 0";

    assert_eq!(
        errors(&program(body)),
        [
            "Expression doesn't produce a value",
            "Could not determine type for variable u",
        ]
    );
}

#[test]
fn return_matches_the_signature() {
    let source = "type A\n  fun f()\n    return 1\n  fun g(): string\n    return\n";

    assert_eq!(
        errors(source),
        [
            "Function doesn't return a value",
            "Function must return a value of type string",
        ]
    );
}

#[test]
fn unknown_argument_type() {
    let error = compile_source("type A\n  fun f(x: Foo)\n").unwrap_err();

    assert_eq!(error.to_string(), "Could not resolve type Foo");
    let SignatureError::UnknownType(token) = error else {
        panic!("expected an unknown type");
    };
    assert_eq!(token.column, 11);
}

#[test]
fn signature_errors() {
    let message = |source: &str| compile_source(source).unwrap_err().to_string();

    assert_eq!(
        message("type A\n  fun f()\n  fun f()\n"),
        "Function with name f already declared on type A"
    );
    assert_eq!(
        message("type A\ntype B\ntype A\n"),
        "Type with name A already declared"
    );
    assert_eq!(
        message("type int\n"),
        "Type int is built in and can't be redeclared"
    );
    assert_eq!(
        message("type A\n  fun f(a: int, a: string)\n"),
        "Argument with name a already declared"
    );
    assert_eq!(
        message("type A\n  fun f(): B\n"),
        "Could not resolve type B"
    );
}

#[test]
fn same_function_name_on_different_types() {
    let source = "type A\n  fun f()\ntype B\n  fun f()\n    A.f()\n";
    assert!(errors(source).is_empty());
}

#[test]
fn static_keyword_is_accepted() {
    let compilation = compile_ok("type A\n  static fun main()\n  fun other()\n");

    let funcs = &compilation.module.symbols.funcs;
    assert!(compilation.module.user_funcs().all(|func| funcs[func].is_static));
}

#[test]
fn entry_point_lookup() {
    let entry_point = |source: &str| find_entry_point(&compile_ok(source).module);

    assert_eq!(
        entry_point("type A\n  fun f()\n"),
        Err(EntryPointError::Missing)
    );

    let compilation = compile_ok("type A\n  fun f()\ntype B\n  fun main()\ntype C\n  fun main(): int\n    return 0\n");
    let main = find_entry_point(&compilation.module).unwrap();
    let owner = compilation.module.symbols.funcs[main].owner;
    assert_eq!(compilation.module.type_name(owner), "B");
}

#[test]
fn entry_point_may_return_any_type() {
    let compilation = compile_ok("type A\n  fun main(): string\n    return \"done\"\n");

    assert!(compilation.errors.is_empty());
    assert!(find_entry_point(&compilation.module).is_ok());
}

#[test]
fn entry_point_arguments_are_reported() {
    let compilation = compile_ok("type A\n  fun main(a: int)\ntype B\n  fun main(b: int)\n");

    let messages: Vec<_> = compilation.errors.iter().map(ToString::to_string).collect();
    assert_eq!(messages, ["Entry point A.main can't take arguments"]);

    let token = compilation.errors[0].token.as_ref().unwrap();
    assert_eq!((token.line_number, token.column), (2, 6));

    // the module is still complete
    assert!(find_entry_point(&compilation.module).is_ok());
}
