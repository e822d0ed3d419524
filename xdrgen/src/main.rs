#![forbid(unused_must_use)]

use std::fs;
use std::path::PathBuf;

use clap::Parser;

#[derive(clap::Parser)]
#[command(name = "xdrgen", about = "Compiles the RPC IDL dialect to a C header/source pair")]
struct CommandWithFlags {
    /// Reduce logging to just warnings and errors.
    #[arg(long, global = true)]
    quiet: bool,

    /// Turn on debug output. Noisy!
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Parses, resolves and emits the header/source pair for one IDL file.
    Generate(GenerateOptions),
    /// Parses and resolves an IDL file, printing the resolved tree. Does
    /// not emit C; useful for inspecting what the resolver produced.
    DumpAst(CheckOptions),
    /// Parses and resolves an IDL file and reports success or the first
    /// error, without writing any output.
    Check(CheckOptions),
}

#[derive(clap::Args)]
struct GenerateOptions {
    /// Path to the `.x` IDL source file.
    input: PathBuf,

    /// Path to write the generated source to.
    source: PathBuf,

    /// Path to write the generated header to.
    header: PathBuf,

    /// Include-guard macro name. Defaults to the header file's stem,
    /// upper-cased, with `_H` appended.
    #[arg(long)]
    guard: Option<String>,

    /// Also emit the RPC program/version/procedure scaffolding (spec.md
    /// §4.7). Off by default: most IDL files only describe wire types.
    #[arg(long)]
    rpc: bool,
}

#[derive(clap::Args)]
struct CheckOptions {
    /// Path to the `.x` IDL source file.
    input: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let command_with_flags = CommandWithFlags::parse();
    configure_tracing(&command_with_flags);

    match command_with_flags.command {
        Command::Generate(opts) => generate_command(opts)?,
        Command::DumpAst(opts) => dump_ast_command(opts)?,
        Command::Check(opts) => check_command(opts)?,
    }

    Ok(())
}

fn generate_command(opts: GenerateOptions) -> anyhow::Result<()> {
    let src = fs::read_to_string(&opts.input)?;
    let guard = opts.guard.unwrap_or_else(|| default_guard(&opts.header));
    let generated = xdr_gen::compile(&src, &guard, opts.rpc)?;
    fs::write(&opts.header, generated.header)?;
    fs::write(&opts.source, generated.source)?;
    tracing::info!(header = %opts.header.display(), source = %opts.source.display(), "wrote generated files");
    Ok(())
}

fn default_guard(header: &std::path::Path) -> String {
    let stem = header.file_stem().and_then(|s| s.to_str()).unwrap_or("GENERATED");
    format!("{}_H", stem.to_uppercase().replace(['-', '.'], "_"))
}

fn dump_ast_command(opts: CheckOptions) -> anyhow::Result<()> {
    let src = fs::read_to_string(&opts.input)?;
    let (idl, symtab) = xdr_ast::parse(&src)?;
    let resolved = xdr_gen::resolve::resolve(&idl, &symtab)?;
    print_idl(&resolved);
    Ok(())
}

/// A debug aid, not part of the generated C output: walks the resolved
/// tree and prints one line per declaration, using `dump_utils::Indent`
/// the same way `pdbtool dump` indents nested PDB records.
fn print_idl(idl: &xdr_ast::ast::IdlFile) {
    use dump_utils::indent;

    for c in &idl.consts {
        println!("{}const {} = {};", indent(0), c.name, c.value);
    }
    for e in &idl.enums {
        println!("{}enum {} {{", indent(0), e.name);
        for entry in &e.entries {
            println!("{}{} = {},", indent(4), entry.name, entry.value);
        }
        println!("{}}}", indent(0));
    }
    for t in &idl.typedefs {
        println!("{}typedef {} -> {};", indent(0), t.name, describe_type(&t.ty));
    }
    for s in &idl.structs {
        println!("{}struct {}{} {{", indent(0), s.name, if s.linkedlist { " (linkedlist)" } else { "" });
        for m in &s.members {
            println!("{}{}: {}", indent(4), m.name, describe_type(&m.ty));
        }
        println!("{}}}", indent(0));
    }
    for u in &idl.unions {
        println!(
            "{}union {}{} switch ({}: {}) {{",
            indent(0),
            u.name,
            if u.opaque { " (opaque)" } else { "" },
            u.pivot.name,
            describe_type(&u.pivot.ty)
        );
        for c in u.cases.iter().chain(u.default_case.iter()) {
            match &c.body {
                Some(b) => println!("{}case {}: {}: {}", indent(4), c.label, b.name, describe_type(&b.ty)),
                None => println!("{}case {}: void", indent(4), c.label),
            }
        }
        println!("{}}}", indent(0));
    }
    for p in &idl.programs {
        println!("{}program {} = {} {{", indent(0), p.name, p.id);
        for v in &p.versions {
            println!("{}version {} = {}", indent(4), v.name, v.id);
            for f in &v.functions {
                println!(
                    "{}{} {}({}) = {};",
                    indent(8),
                    describe_type(&f.reply_type),
                    f.name,
                    describe_type(&f.call_type),
                    f.id
                );
            }
        }
        println!("{}}}", indent(0));
    }
}

fn describe_type(ty: &xdr_ast::ast::TypeDescriptor) -> String {
    let mut s = ty.name.clone();
    if ty.is_optional() {
        s = format!("{s}*");
    }
    if ty.vector {
        s = format!("{s}<{}>", ty.vector_bound.as_deref().unwrap_or(""));
    }
    if ty.array {
        s = format!("{s}[{}]", ty.array_size.as_deref().unwrap_or(""));
    }
    if ty.is_zerocopy() {
        s = format!("zerocopy {s}");
    }
    s
}

fn check_command(opts: CheckOptions) -> anyhow::Result<()> {
    let src = fs::read_to_string(&opts.input)?;
    match xdr_gen::compile(&src, "CHECK_H", false) {
        Ok(_) => {
            println!("{}: ok", opts.input.display());
            Ok(())
        }
        Err(e) => {
            anyhow::bail!("{}: {e}", opts.input.display());
        }
    }
}

fn configure_tracing(args: &CommandWithFlags) {
    use tracing_subscriber::filter::LevelFilter;

    let max_level = if args.quiet {
        LevelFilter::WARN
    } else if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    tracing_subscriber::fmt().with_max_level(max_level).init();
}
