use crate::ast::go::{Decl, DeclKeyword, File, GenDecl, ImportSpec, Spec};
use crate::ast::Decor;
use tracing::debug;

/// Import `path`, optionally under `alias`, unless the file already does.
///
/// The import is appended to the first import declaration, which is created
/// right after the package clause when the file has none. Returns whether
/// the file changed.
pub fn ensure_import(file: &mut File, alias: Option<&str>, path: &str) -> bool {
    if file.imports().any(|import| import.path == path) {
        debug!(path, "import already present");
        return false;
    }

    let spec = Spec::Import(ImportSpec { name: alias.map(str::to_string), path: path.to_string(), decor: Decor::default() });
    let existing = file.decls.iter_mut().find_map(|decl| match decl {
        Decl::Gen(gen_decl) if gen_decl.keyword == DeclKeyword::Import => Some(gen_decl),
        _ => None,
    });
    match existing {
        Some(gen_decl) => {
            gen_decl.specs.push(spec);
            gen_decl.grouped = true;
        }
        None => file.decls.insert(0, Decl::Gen(GenDecl::new(DeclKeyword::Import, vec![spec]))),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate::{Generator, GoGenerator};
    use crate::parser::{GoParser, Parser};

    fn mutate(source: &str, alias: Option<&str>, path: &str) -> (bool, String) {
        let mut file = GoParser::new().parse(source).unwrap();
        let changed = ensure_import(&mut file, alias, path);
        (changed, GoGenerator::new().generate(&file))
    }

    #[test]
    fn test_appends_to_existing_group() {
        let (changed, out) = mutate("package types\n\nimport (\n\t\"fmt\"\n)\n", Some("sdk"), "github.com/cosmos/cosmos-sdk/types");
        assert!(changed);
        assert_eq!(out, "package types\n\nimport (\n\t\"fmt\"\n\tsdk \"github.com/cosmos/cosmos-sdk/types\"\n)\n");
    }

    #[test]
    fn test_existing_import_left_alone() {
        let source = "package types\n\nimport (\n\t\"fmt\"\n)\n";
        let (changed, out) = mutate(source, None, "fmt");
        assert!(!changed);
        assert_eq!(out, source);
    }

    #[test]
    fn test_single_import_becomes_grouped() {
        let (_, out) = mutate("package blog\n\nimport \"encoding/json\"\n", None, "context");
        assert_eq!(out, "package blog\n\nimport (\n\t\"encoding/json\"\n\t\"context\"\n)\n");
    }

    #[test]
    fn test_creates_declaration_when_missing() {
        let (changed, out) = mutate("package types\n\nfunc Validate() error {\n\treturn nil\n}\n", None, "fmt");
        assert!(changed);
        assert_eq!(out, "package types\n\nimport (\n\t\"fmt\"\n)\n\nfunc Validate() error {\n\treturn nil\n}\n");
    }
}
