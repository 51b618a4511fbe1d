mod cli;

use std::fs;
use std::io::{self, BufWriter};
use std::path::Path;
use std::process;

use clap::Parser;
use heck::ToPascalCase;
use tm_lang::{CompileResult, Compiler, TypeTable};
use toolman::generators::{Generator, GolangGenerator, JavaGenerator, TypescriptGenerator};

use cli::{Cli, Target};

fn main() {
    let cli = Cli::parse();

    let mut compiler = Compiler::new();
    let result = match compiler.compile(&cli.input) {
        Ok(result) => result,
        Err(fatal) => {
            eprintln!("{fatal}");
            process::exit(2);
        }
    };
    if !result.is_success() {
        for error in &result.errors {
            eprintln!("{}", error.render());
        }
        process::exit(1);
    }

    let stem = result
        .document
        .source
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("types")
        .to_string();
    let (generator, file_name): (Box<dyn Generator>, String) = match cli.target {
        Target::Go => (Box::new(GolangGenerator), format!("{stem}.go")),
        Target::Ts => (Box::new(TypescriptGenerator), format!("{stem}.ts")),
        Target::Java => (
            Box::new(JavaGenerator),
            format!("{}.java", stem.to_pascal_case()),
        ),
    };

    if let Err(err) = emit(
        generator.as_ref(),
        &cli.out,
        &file_name,
        &result,
        compiler.types(),
    ) {
        eprintln!("failed to write {}: {}", file_name, err);
        process::exit(2);
    }
}

fn emit(
    generator: &dyn Generator,
    out_dir: &Path,
    file_name: &str,
    result: &CompileResult,
    types: &TypeTable,
) -> io::Result<()> {
    fs::create_dir_all(out_dir)?;
    let file = fs::File::create(out_dir.join(file_name))?;
    let mut out = BufWriter::new(file);
    generator.generate(&mut out, &result.document, types)
}
