use luna_diagnostic::IntoDiagnostic;
use luna_frontend::parse;
use luna_middle::compile;
use luna_middle::entry_point::EntryPointError;

use crate::cpp::PRELUDE;
use crate::{generate, CodegenError, CodegenResult};

fn generate_source(source: &str) -> CodegenResult<String> {
    let tree = parse("main", source).unwrap();
    let compilation = compile(&tree).unwrap();
    generate(&compilation.module)
}

/// Everything after the fixed prelude, which is the same for every program.
fn generate_user_code(source: &str) -> String {
    let output = generate_source(source).unwrap();
    output.strip_prefix(PRELUDE).unwrap().trim().to_owned()
}

#[test]
fn let_then_return() {
    let output = generate_source("type Program\n  fun main(): int\n    let x = 5\n    return x\n");

    insta::assert_snapshot!(output.unwrap().trim_end(), @r###"
    #include <cstdio>
    #include <cstdarg>

    class Console {
    public:
        static void writeLine(const char* msg, ...) {
            va_list args;
            va_start(args, msg);
            vfprintf(stdout, msg, args);
            va_end(args);
            fprintf(stdout, "\n");
        }
    };

    class Program {
    public:
        static int main();
    };

    int Program::main() {
        int x = 5;
        return x;
    }

    int main() {
        return Program::main();
    }
    "###);
}

#[test]
fn main_without_return_type() {
    let output = generate_user_code("type Program\n  fun main()\n    Console.writeLine(\"hi\")\n");

    insta::assert_snapshot!(output, @r###"
    class Program {
    public:
        static void main();
    };

    void Program::main() {
        Console::writeLine("hi");
    }

    int main() {
        Program::main();
        return 0;
    }
    "###);
}

#[test]
fn statements_and_expressions() {
    let source = "\
type Math
  fun max(a: int, b: int): int
    if a > b
      return a
    else
      return b
  fun half(a: int): int
    return (a + 1) / 2
type Program
  fun main(): int
    var greeting = \"hello %s\"
    greeting = \"bye %s\"
    let big = Math.max(3, 4) > 3
    if big
      Console.writeLine(greeting, \"world\")
    return Math.half(7)
";

    insta::assert_snapshot!(generate_user_code(source), @r###"
    class Math {
    public:
        static int max(int a, int b);
        static int half(int a);
    };

    class Program {
    public:
        static int main();
    };

    int Math::max(int a, int b) {
        if (a > b) {
            return a;
        } else {
            return b;
        }
    }

    int Math::half(int a) {
        return (a + 1) / 2;
    }

    int Program::main() {
        const char* greeting = "hello %s";
        greeting = "bye %s";
        bool big = Math::max(3, 4) > 3;
        if (big) {
            Console::writeLine(greeting, "world");
        }
        return Math::half(7);
    }

    int main() {
        return Program::main();
    }
    "###);
}

#[test]
fn earlier_types_call_later_types() {
    let source = "\
type Program
  fun main()
    Greeter.greet(\"you\")
type Greeter
  fun greet(name: string)
    Console.writeLine(\"hello %s\", name)
";

    insta::assert_snapshot!(generate_user_code(source), @r###"
    class Program {
    public:
        static void main();
    };

    class Greeter {
    public:
        static void greet(const char* name);
    };

    void Program::main() {
        Greeter::greet("you");
    }

    void Greeter::greet(const char* name) {
        Console::writeLine("hello %s", name);
    }

    int main() {
        Program::main();
        return 0;
    }
    "###);
}

#[test]
fn rejected_statements_are_not_emitted() {
    let tree = parse("main", "type Program\n  fun main(): int\n    let x = 5\n    x = 6\n    return x\n").unwrap();
    let compilation = compile(&tree).unwrap();
    assert_eq!(compilation.errors.len(), 1);

    let output = generate(&compilation.module).unwrap();
    assert!(output.contains("int x = 5;"));
    assert!(!output.contains("x = 6"));
}

#[test]
fn missing_entry_point() {
    let error = generate_source("type Program\n  fun start(): int\n    return 0\n").unwrap_err();

    assert_eq!(error, CodegenError::EntryPoint(EntryPointError::Missing));
    assert_eq!(
        error.into_diagnostic().to_plain_string(),
        "Could not find entry point 'main'"
    );
}

#[test]
fn main_returning_a_string() {
    let output = generate_user_code("type Program\n  fun main(): string\n    return \"done\"\n");

    insta::assert_snapshot!(output, @r###"
    class Program {
    public:
        static const char* main();
    };

    const char* Program::main() {
        return "done";
    }

    int main() {
        Program::main();
        return 0;
    }
    "###);
}
