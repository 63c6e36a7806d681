use luna_backend::CodegenError;
use luna_diagnostic::{Diagnostic, PlainDiagnosticEmitter};
use luna_middle::entry_point::EntryPointError;

use crate::compiler::{Compiler, Emit};
use crate::{CompilerError, CompilerResult};

fn compile(source: &str) -> (CompilerResult<String>, Vec<Diagnostic>) {
    let mut compiler = Compiler::new(vec![]);
    let result = compiler.compile_source("test_source", source);
    (result, compiler.diagnostics)
}

fn test_compiles(source: &str, should_compile: bool) {
    let (result, _) = compile(source);

    match (result, should_compile) {
        (Err(_), true) => panic!("failed to compile: {source:?}"),
        (Ok(_), false) => panic!("unexpectedly compiled: {source:?}"),
        _ => {}
    }
}

fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
    diagnostics
        .iter()
        .map(|diagnostic| diagnostic.message.as_str())
        .collect()
}

#[test]
fn return_local() {
    test_compiles("type Program\n  fun main(): int\n    let x = 5\n    return x\n", true);
}

#[test]
fn write_line() {
    test_compiles("type Program\n  fun main()\n    Console.writeLine(\"hi\")\n", true);
}

#[test]
fn windows_newlines() {
    test_compiles("type Program\r\n  fun main(): int\r\n    return 0\r\n", true);
}

#[test]
fn empty_bodies() {
    test_compiles("type Program\n  fun main()\n  fun other()\n", true);
}

#[test]
fn main_may_return_a_string() {
    test_compiles("type Program\n  fun main(): string\n    return \"done\"\n", true);
}

#[test]
fn main_with_arguments() {
    let (result, diagnostics) = compile("type Program\n  fun main(a: int)\n");

    assert!(matches!(result, Err(CompilerError::HadErrors)));
    assert_eq!(
        messages(&diagnostics),
        ["Entry point Program.main can't take arguments"]
    );
}

#[test]
fn tabs_are_rejected() {
    test_compiles("type Program\n\tfun main()\n", false);
}

#[test]
fn missing_function_name() {
    test_compiles("type Program\n  fun (): int\n", false);
}

#[test]
fn unknown_return_type() {
    test_compiles("type Program\n  fun main(): float\n", false);
}

#[test]
fn non_bool_condition() {
    test_compiles("type Program\n  fun main(): int\n    if 1\n      return 1\n    return 0\n", false);
}

#[test]
fn immutable_local() {
    let (result, diagnostics) =
        compile("type Program\n  fun main(): int\n    let x = 5\n    x = 6\n    return x\n");

    assert!(matches!(result, Err(CompilerError::HadErrors)));
    assert_eq!(diagnostics.len(), 1);
    insta::assert_snapshot!(diagnostics[0].to_plain_string(), @r###"
    Variable x can't be modified because declared with 'let'
        x = 6
        ^
    "###);
}

#[test]
fn every_bad_statement_is_reported() {
    let source = "\
type Program
  fun main(): int
    let a = b
    let c = 1
    c = 2
    return \"no\"
";
    let (result, diagnostics) = compile(source);

    assert!(matches!(result, Err(CompilerError::HadErrors)));
    assert_eq!(
        messages(&diagnostics),
        [
            "Could not resolve b",
            "Variable c can't be modified because declared with 'let'",
            "Function must return a value of type int, not string",
        ]
    );
}

#[test]
fn syntax_errors_stop_the_pipeline() {
    let (result, diagnostics) = compile("type Program\n  fun main(\n  fun f(\n");

    assert!(matches!(result, Err(CompilerError::HadErrors)));
    assert_eq!(diagnostics.len(), 1);
}

#[test]
fn lexer_errors_are_reported() {
    let (result, diagnostics) = compile("type Program\n  fun main()\n    let s = \"abc\n");

    assert!(matches!(result, Err(CompilerError::HadErrors)));
    assert_eq!(messages(&diagnostics), ["Unterminated string literal"]);
}

#[test]
fn missing_entry_point() {
    let (result, diagnostics) = compile("type Program\n  fun start()\n");

    assert!(diagnostics.is_empty());
    let Err(CompilerError::Codegen(error)) = result else {
        panic!("expected a codegen error");
    };
    assert_eq!(error, CodegenError::EntryPoint(EntryPointError::Missing));
}

#[test]
fn emit_stops_at_each_stage() {
    let source = "type Program\n  fun main(): int\n    return 1 + 2\n";
    let mut compiler = Compiler::new(vec![]);

    let tokens = compiler.emit("dir/hello.luna", source, Emit::Tokens).unwrap();
    assert_eq!(tokens.lines().count(), luna_frontend::lex(source).unwrap().len());
    assert!(tokens.starts_with("Token { kind: Keyword(Type), text: \"type\""), "{tokens}");
    assert!(tokens.ends_with('\n'));

    let syntax = compiler.emit("dir/hello.luna", source, Emit::Syntax).unwrap();
    assert!(syntax.starts_with("SyntaxTree hello\n"), "{syntax}");

    let module = compiler.emit("dir/hello.luna", source, Emit::Module).unwrap();
    insta::assert_snapshot!(module, @r###"
    module hello
    type Program
      static fun main(): int
        return 1 + 2
    "###);

    let cpp = compiler.emit("dir/hello.luna", source, Emit::Cpp).unwrap();
    assert!(cpp.contains("int Program::main() {\n    return 1 + 2;\n}\n"));

    assert!(compiler.diagnostics.is_empty());
}

#[test]
fn module_stage_still_reports_body_errors() {
    let mut compiler = Compiler::new(vec![]);
    let result = compiler.emit(
        "test_source",
        "type Program\n  fun main()\n    foo()\n",
        Emit::Module,
    );

    assert!(matches!(result, Err(CompilerError::HadErrors)));
    assert_eq!(messages(&compiler.diagnostics), ["Could not resolve foo"]);
}

#[test]
fn plain_diagnostics() {
    let mut compiler = Compiler::new(PlainDiagnosticEmitter::new(vec![]));
    let result = compiler.compile_source("test_source", "type Program\n  fun main()\n    nope\n");
    assert!(result.is_err());

    let output = String::from_utf8(compiler.diagnostics.into_inner()).unwrap();
    insta::assert_snapshot!(output.trim_end(), @r###"
    Could not resolve nope
        nope
        ^^^^
    "###);
}
