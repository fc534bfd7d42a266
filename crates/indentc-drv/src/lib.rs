//! indentc-drv — the compiler driver.
//!
//! This is the ambient stack the language specification places "out of
//! scope" for the core lexer/parser/code-generator: argument parsing, file
//! I/O, and wiring the three compiler stages together into one `run` call.
//! Unlike a multi-file, incremental compiler driver, this one has no
//! `Session` object — a single invocation reads one source file, runs the
//! pipeline once, and writes one output. There is nothing to incrementally
//! rebuild and nothing to cache between runs.
//!
//! Argument parsing is hand-rolled against `std::env::args()` rather than
//! built on a parsing crate, matching how the driver this was modeled on
//! turns its own CLI surface into a `Config` by hand.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Compilation mode, selected by one of three mutually exclusive flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Lex, parse, and emit assembly. The default when no mode flag is given.
    Compile,
    /// Lex and parse only, then pretty-print the AST. No assembly is emitted.
    DumpAst,
    /// Reserved; rejected at dispatch with a clear "not implemented" error.
    Interpret,
}

/// Parsed command-line configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub input: PathBuf,
    /// `None` or `Some("-")` both mean "write to standard output."
    pub output: Option<PathBuf>,
    pub mode: Mode,
    pub verbose: bool,
}

impl Config {
    /// Parses a driver invocation's arguments (excluding argv[0]).
    ///
    /// Exactly one of `--compile`/`-c`, `--dump-ast`/`-a`, `--interpret`/`-i`
    /// may be given; omitting all three defaults to `--compile`. `-o`/
    /// `--output` takes the following argument as the output path; `-o -`
    /// (or simply omitting `-o`) means standard output.
    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Config> {
        let mut input: Option<PathBuf> = None;
        let mut output: Option<PathBuf> = None;
        let mut mode: Option<Mode> = None;
        let mut verbose = false;

        let mut iter = args.into_iter();
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "-c" | "--compile" => set_mode(&mut mode, Mode::Compile)?,
                "-a" | "--dump-ast" => set_mode(&mut mode, Mode::DumpAst)?,
                "-i" | "--interpret" => set_mode(&mut mode, Mode::Interpret)?,
                "--verbose" => verbose = true,
                "-o" | "--output" => {
                    let path = iter
                        .next()
                        .context("-o/--output requires a path argument")?;
                    output = Some(PathBuf::from(path));
                }
                other if other.starts_with('-') && other != "-" => {
                    bail!("unrecognized option '{other}'");
                }
                other => {
                    if input.is_some() {
                        bail!("unexpected extra positional argument '{other}'");
                    }
                    input = Some(PathBuf::from(other));
                }
            }
        }

        let input = input.context("missing required input file argument")?;
        Ok(Config {
            input,
            output,
            mode: mode.unwrap_or(Mode::Compile),
            verbose,
        })
    }
}

fn set_mode(slot: &mut Option<Mode>, mode: Mode) -> Result<()> {
    if let Some(existing) = slot {
        bail!(
            "conflicting mode flags: {existing:?} and {mode:?} are mutually exclusive",
        );
    }
    *slot = Some(mode);
    Ok(())
}

/// Runs one compile invocation end to end: reads `config.input`, lexes,
/// parses, and (depending on `config.mode`) either dumps the AST or lowers
/// to assembly, then writes the result to `config.output` (or stdout).
pub fn run(config: &Config) -> Result<()> {
    if config.verbose {
        eprintln!("reading {}", config.input.display());
    }

    if config.mode == Mode::Interpret {
        bail!("interpret mode is not implemented");
    }

    let source = std::fs::read_to_string(&config.input)
        .with_context(|| format!("failed to read {}", config.input.display()))?;

    if config.verbose {
        eprintln!("lexing {}", config.input.display());
    }
    let tokens = indentc_lex::Lexer::tokenize(&source)
        .map_err(|e| anyhow::anyhow!("{}: {e}", config.input.display()))?;

    if config.verbose {
        eprintln!("parsing {}", config.input.display());
    }
    let arena = bumpalo::Bump::new();
    let mut strings = indentc_util::StringTable::new(&arena);
    let program = indentc_par::Parser::parse(tokens, &mut strings)
        .map_err(|e| anyhow::anyhow!("{}: {e}", config.input.display()))?;

    let output_text = match config.mode {
        Mode::DumpAst => indentc_par::dump::dump_program(&program, &strings),
        Mode::Compile => {
            if config.verbose {
                eprintln!("generating code for {}", config.input.display());
            }
            indentc_gen::generate(program, &strings)
                .map_err(|e| anyhow::anyhow!("{}: {e}", config.input.display()))?
        }
        Mode::Interpret => unreachable!("handled above"),
    };

    write_output(config.output.as_deref(), &output_text)
}

fn write_output(path: Option<&std::path::Path>, text: &str) -> Result<()> {
    match path {
        None => {
            print!("{text}");
            Ok(())
        }
        Some(p) if p.as_os_str() == "-" => {
            print!("{text}");
            Ok(())
        }
        Some(p) => {
            let mut file = std::fs::File::create(p)
                .with_context(|| format!("failed to create {}", p.display()))?;
            file.write_all(text.as_bytes())
                .with_context(|| format!("failed to write {}", p.display()))?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_to_compile_mode() {
        let config = Config::parse(args(&["in.ind"])).unwrap();
        assert_eq!(config.mode, Mode::Compile);
        assert_eq!(config.input, PathBuf::from("in.ind"));
        assert!(config.output.is_none());
    }

    #[test]
    fn parses_dump_ast_and_output_path() {
        let config = Config::parse(args(&["-a", "in.ind", "-o", "out.txt"])).unwrap();
        assert_eq!(config.mode, Mode::DumpAst);
        assert_eq!(config.output, Some(PathBuf::from("out.txt")));
    }

    #[test]
    fn rejects_conflicting_mode_flags() {
        let err = Config::parse(args(&["-a", "-c", "in.ind"])).unwrap_err();
        assert!(err.to_string().contains("mutually exclusive"));
    }

    #[test]
    fn requires_an_input_file() {
        let err = Config::parse(args(&["-c"])).unwrap_err();
        assert!(err.to_string().contains("missing required input file"));
    }

    #[test]
    fn interpret_mode_fails_fast() {
        let config = Config::parse(args(&["-i", "in.ind"])).unwrap();
        assert_eq!(config.mode, Mode::Interpret);
    }
}
