//! Builtin-name table and external-FQN derivation, ported from the
//! original call analyzer's `_generate_external_fqn`.

/// Names that resolve to `builtins.{name}` rather than `external.{name}`
/// when they appear as a bare (non-dotted) callee.
pub const BUILTINS: &[&str] = &[
    "dict", "list", "set", "tuple", "frozenset", "str", "int", "float", "bool", "bytes", "bytearray", "object", "type", "super", "len",
    "range", "enumerate", "zip", "map", "filter", "sorted", "reversed", "min", "max", "sum", "abs", "all", "any", "iter", "next", "repr",
    "hash", "print", "input", "open", "format", "getattr", "setattr", "hasattr", "delattr", "isinstance", "issubclass", "callable", "id",
    "vars", "dir", "globals", "locals", "eval", "exec", "compile", "chr", "ord", "bin", "hex", "oct", "round", "pow", "divmod", "complex",
    "staticmethod", "classmethod", "property", "memoryview", "slice", "Exception", "BaseException", "ValueError", "TypeError", "KeyError",
    "IndexError", "AttributeError", "RuntimeError", "StopIteration", "AssertionError", "ImportError", "ModuleNotFoundError", "OSError",
    "IOError", "FileNotFoundError", "PermissionError", "TimeoutError",
];

/// `dict` → `("builtins.dict", "builtins")`, `os.path.join` →
/// `("os.path.join", "os.path")`, an unknown bare name → `("external.foo",
/// "external")`.
pub fn external_fqn(name: &str) -> (String, String) {
    if !name.contains('.') {
        return if BUILTINS.contains(&name) {
            (format!("builtins.{name}"), "builtins".to_string())
        } else {
            (format!("external.{name}"), "external".to_string())
        };
    }
    let parts: Vec<&str> = name.split('.').collect();
    let module_path = parts[..parts.len() - 1].join(".");
    (name.to_string(), module_path)
}
