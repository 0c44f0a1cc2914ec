//! Language and symbol-kind vocabularies recognized in query patterns.

/// Resolve a language name or alias to its canonical Linguist name.
///
/// Matching is case-insensitive. Canonical names are accepted in their
/// lowercase form with spaces replaced by `-`, e.g. `objective-c`.
/// Returns None for words that are not a language.
pub fn language_by_alias(alias: &str) -> Option<&'static str> {
    let lower = alias.to_lowercase();
    let language = match lower.as_str() {
        "bash" | "sh" | "shell" | "shell-script" | "zsh" => "Shell",
        "c" => "C",
        "c#" | "csharp" | "cake" | "cakescript" => "C#",
        "c++" | "cpp" => "C++",
        "clojure" => "Clojure",
        "cmake" => "CMake",
        "coffeescript" | "coffee" | "coffee-script" => "CoffeeScript",
        "css" => "CSS",
        "cuda" => "Cuda",
        "dart" => "Dart",
        "dockerfile" | "containerfile" => "Dockerfile",
        "elixir" => "Elixir",
        "elm" => "Elm",
        "erlang" => "Erlang",
        "f#" | "fsharp" => "F#",
        "fortran" => "Fortran",
        "go" | "golang" => "Go",
        "graphql" => "GraphQL",
        "groovy" => "Groovy",
        "haskell" => "Haskell",
        "hcl" | "terraform" => "HCL",
        "html" | "xhtml" => "HTML",
        "java" => "Java",
        "javascript" | "js" | "node" => "JavaScript",
        "json" | "geojson" | "jsonl" | "topojson" => "JSON",
        "julia" => "Julia",
        "kotlin" => "Kotlin",
        "lua" => "Lua",
        "makefile" | "make" | "bsdmake" | "mf" => "Makefile",
        "markdown" | "md" | "pandoc" => "Markdown",
        "nix" | "nixos" => "Nix",
        "objective-c" | "obj-c" | "objc" | "objectivec" => "Objective-C",
        "ocaml" => "OCaml",
        "perl" | "cperl" => "Perl",
        "php" | "inc" => "PHP",
        "powershell" | "posh" | "pwsh" => "PowerShell",
        "protocol-buffer" | "protobuf" | "protocol-buffers" => "Protocol Buffer",
        "python" | "python3" | "rusthon" => "Python",
        "r" | "rscript" | "splus" => "R",
        "ruby" | "jruby" | "macruby" | "rake" | "rb" | "rbx" => "Ruby",
        "rust" | "rs" => "Rust",
        "sass" => "Sass",
        "scala" => "Scala",
        "scss" => "SCSS",
        "sql" => "SQL",
        "starlark" | "bazel" | "bzl" => "Starlark",
        "svelte" => "Svelte",
        "swift" => "Swift",
        "text" | "fundamental" | "plain-text" => "Text",
        "toml" => "TOML",
        "tsx" => "TSX",
        "typescript" | "ts" => "TypeScript",
        "vue" => "Vue",
        "xml" | "rss" | "xsd" | "wsdl" => "XML",
        "yaml" | "yml" => "YAML",
        "zig" => "Zig",
        _ => return None,
    };
    Some(language)
}

/// Resolve a symbol-kind word to the kind used in `select:symbol.<kind>`.
pub fn symbol_kind_by_alias(alias: &str) -> Option<&'static str> {
    let lower = alias.to_lowercase();
    let kind = match lower.as_str() {
        "function" | "func" | "fn" => "function",
        "method" => "method",
        "class" => "class",
        "struct" => "struct",
        "interface" => "interface",
        "enum" => "enum",
        "module" | "mod" => "module",
        "namespace" => "namespace",
        "package" => "package",
        "property" => "property",
        "field" => "field",
        "constructor" => "constructor",
        "variable" | "var" => "variable",
        "constant" | "const" => "constant",
        "typeparameter" | "type-parameter" => "type-parameter",
        _ => return None,
    };
    Some(kind)
}
