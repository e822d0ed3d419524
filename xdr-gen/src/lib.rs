//! Resolver, recursion analyzer, runtime contract and C emitters: the
//! back half of the pipeline, consuming the `xdr-ast` tree and symbol
//! table and producing a header/source pair.

pub mod emit;
pub mod error;
pub mod recursion;
pub mod resolve;
pub mod runtime;

pub use emit::{generate, Generated};
pub use error::{CompileError, CycleError, ReferenceError};

/// Parses, resolves and emits in one call: the single entry point
/// `xdrgen generate` drives.
pub fn compile(src: &str, guard: &str, emit_rpc: bool) -> Result<Generated, CompileError> {
    let (idl, symtab) = xdr_ast::parse(src).map_err(|e| match e {
        xdr_ast::CrateError::Parse(e) => CompileError::Syntax(e),
        xdr_ast::CrateError::Symbol(e) => CompileError::Symbol(e),
    })?;
    generate(&idl, &symtab, guard, emit_rpc)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_emits_header_and_source_for_a_simple_struct() {
        let out = compile("struct point { uint32 x; uint32 y; };", "POINT_H", false).unwrap();
        assert!(out.header.contains("typedef struct point {"));
        assert!(out.source.contains("int marshall_point("));
        assert!(out.source.contains("void dump_point("));
    }

    #[test]
    fn compile_surfaces_a_syntax_error() {
        let err = compile("struct {", "G", false).unwrap_err();
        assert!(matches!(err, CompileError::Syntax(_)));
    }

    #[test]
    fn compile_surfaces_an_unresolved_reference() {
        let err = compile("struct s { bogus_t v; };", "G", false).unwrap_err();
        assert!(matches!(err, CompileError::Reference(_)));
    }

    #[test]
    fn compile_with_rpc_emits_program_scaffolding() {
        let out = compile(
            "program FILESVC {
                version FILESVC_V1 {
                    void READ(uint32) = 1;
                } = 1;
            } = 100000;",
            "G",
            true,
        )
        .unwrap();
        assert!(out.header.contains("FILESVC_V1_dispatch_call"));
        assert!(out.source.contains("FILESVC_V1_proc_names"));
    }
}
