//! `rdf-canon`: Rewrites RDF files in a deterministic, diff-friendly form.
//!
//! Reads Turtle, N-Triples, TriG, N-Quads, RDF/XML or JSON-LD and writes
//! sorted Turtle, RDF/XML or JSON-LD.
//! Works on a single file (stdin/stdout style) or on a whole directory tree.
//!
//! **Usage:**
//! ```text
//! rdf-canon -s onto.ttl [-t onto.sorted.ttl] [options]
//! rdf-canon --source-directory src/ --target-directory out/ [options]
//! ```
//!
//! Logs go to stderr; set `RUST_LOG=rdf_canon=debug` for pipeline detail.

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::Parser;
use rdf_canon::{
    infer_base_iri, read_document, write_document, IriRewrite, ShortIriPreference, SourceFormat,
    StringDataTypeOption, TargetFormat, WriterOptions,
};
use regex::Regex;
use walkdir::WalkDir;

/// Format RDF files deterministically.
///
/// Every long option also answers to the short alias in brackets.
#[derive(Parser, Debug, Default)]
#[command(
    name = "rdf-canon",
    version,
    disable_version_flag = true,
    about = "Write RDF in a deterministic, diff-friendly form"
)]
struct Args {
    /// Input file.
    #[arg(short = 's', long, conflicts_with = "source_directory")]
    source: Option<PathBuf>,

    /// Output file (default: stdout).
    #[arg(short = 't', long, requires = "source")]
    target: Option<PathBuf>,

    /// Input directory, searched recursively [sd].
    #[arg(long, visible_alias = "sd", requires = "target_directory")]
    source_directory: Option<PathBuf>,

    /// Regex selecting input files by their path relative to the source directory [sdp].
    #[arg(
        long,
        visible_alias = "sdp",
        default_value = r"\.(ttl|nt|trig|nq|rdf|owl|jsonld)$"
    )]
    source_directory_pattern: String,

    /// Output directory for directory mode [td].
    #[arg(long, visible_alias = "td")]
    target_directory: Option<PathBuf>,

    /// Replacement for the source pattern giving each output path
    /// (default: input path with the target format's extension) [tdp].
    #[arg(long, visible_alias = "tdp")]
    target_directory_pattern: Option<String>,

    /// Input syntax: turtle, ntriples, trig, nquads, rdf-xml or json-ld
    /// (default: from the file extension) [sfmt].
    #[arg(long, visible_alias = "sfmt", value_parser = SourceFormat::from_str)]
    source_format: Option<SourceFormat>,

    /// Output syntax: turtle, rdf-xml or json-ld (default: from the target
    /// extension, else turtle) [tfmt].
    #[arg(long, visible_alias = "tfmt", value_parser = TargetFormat::from_str)]
    target_format: Option<TargetFormat>,

    /// Base IRI for relative IRIs in the output [bi].
    #[arg(long, visible_alias = "bi")]
    base_iri: Option<String>,

    /// Use the ontology IRI as base IRI when none is given [ibi].
    #[arg(long, visible_alias = "ibi")]
    infer_base_iri: bool,

    /// Preferred short IRI form: prefix or base-iri [sip].
    #[arg(long, visible_alias = "sip", value_parser = ShortIriPreference::from_str)]
    short_iri_priority: Option<ShortIriPreference>,

    /// Regex applied to every IRI (first match only) [ip].
    #[arg(long, visible_alias = "ip", requires = "iri_replacement")]
    iri_pattern: Option<String>,

    /// Replacement for --iri-pattern; `$1` refers to capture groups [ir].
    #[arg(long, visible_alias = "ir", requires = "iri_pattern")]
    iri_replacement: Option<String>,

    /// Declare namespaces as XML entities in RDF/XML output [dtd].
    #[arg(long, visible_alias = "dtd")]
    use_dtd_subset: bool,

    /// Write singly-referenced blank nodes and lists inline [ibn].
    #[arg(long, visible_alias = "ibn")]
    inline_blank_nodes: bool,

    /// Comment written before the content, repeatable [lc].
    #[arg(long, visible_alias = "lc")]
    leading_comment: Vec<String>,

    /// Comment written after the content, repeatable [tc].
    #[arg(long, visible_alias = "tc")]
    trailing_comment: Vec<String>,

    /// Plain string typing: explicit or implicit [sdt].
    #[arg(long, visible_alias = "sdt", value_parser = StringDataTypeOption::from_str)]
    string_data_typing: Option<StringDataTypeOption>,

    /// Language tag given to every string that has none [osl, udl].
    #[arg(
        long,
        visible_aliases = ["osl", "use-default-language", "udl"]
    )]
    override_string_language: Option<String>,

    /// Indent unit: a number of spaces, `tab`, or literal whitespace.
    #[arg(short = 'i', long, value_parser = parse_indent)]
    indent: Option<String>,

    /// Line end: lf, crlf or cr [ln].
    #[arg(long, visible_alias = "ln", value_parser = parse_line_end)]
    line_end: Option<String>,

    /// Declare no default xmlns namespace in RDF/XML output [oxn].
    #[arg(long, visible_alias = "oxn")]
    omit_xmlns_namespace: bool,

    /// Drop `rdf:type owl:NamedIndividual` statements [sni].
    #[arg(long, visible_alias = "sni")]
    suppress_named_individuals: bool,

    /// TOML file with writer options; flags override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print version.
    #[arg(short = 'v', long, action = clap::ArgAction::Version)]
    version: Option<bool>,
}

fn parse_indent(value: &str) -> std::result::Result<String, String> {
    match value {
        "tab" | "\\t" => Ok("\t".to_owned()),
        n if !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()) => {
            let width: u8 = n
                .parse()
                .map_err(|_| format!("indent width {n} is larger than {}", u8::MAX))?;
            Ok(" ".repeat(usize::from(width)))
        }
        other => Ok(other.to_owned()),
    }
}

fn parse_line_end(value: &str) -> std::result::Result<String, String> {
    Ok(match value.to_ascii_lowercase().as_str() {
        "lf" | "\\n" | "unix" => "\n",
        "crlf" | "\\r\\n" | "windows" => "\r\n",
        "cr" | "\\r" => "\r",
        other => return Err(format!("unknown line end '{other}' (expected lf, crlf or cr)")),
    }
    .to_owned())
}

/// The writer options from `--config`, with every explicit flag applied.
fn writer_options(args: &Args) -> Result<WriterOptions> {
    let mut options = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("Failed to parse writer options in {}", path.display()))?
        }
        None => WriterOptions::default(),
    };

    if let Some(base) = &args.base_iri {
        options.base_iri = Some(base.clone());
    }
    if let Some(preference) = args.short_iri_priority {
        options.short_iri_preference = preference;
    }
    if let Some(typing) = args.string_data_typing {
        options.string_data_type = typing;
    }
    if let Some(language) = &args.override_string_language {
        options.override_string_language = Some(language.clone());
    }
    if let Some(indent) = &args.indent {
        options.indent.clone_from(indent);
    }
    if let Some(line_end) = &args.line_end {
        options.line_end.clone_from(line_end);
    }
    if !args.leading_comment.is_empty() {
        options.leading_comments.clone_from(&args.leading_comment);
    }
    if !args.trailing_comment.is_empty() {
        options.trailing_comments.clone_from(&args.trailing_comment);
    }
    options.use_dtd_subset |= args.use_dtd_subset;
    options.inline_blank_nodes |= args.inline_blank_nodes;
    options.suppress_named_individuals |= args.suppress_named_individuals;
    options.omit_xmlns_namespace |= args.omit_xmlns_namespace;
    Ok(options)
}

fn target_format(args: &Args, target: Option<&Path>) -> TargetFormat {
    args.target_format
        .or_else(|| {
            let extension = target?.extension()?.to_str()?.to_ascii_lowercase();
            match extension.as_str() {
                "ttl" => Some(TargetFormat::Turtle),
                "rdf" | "owl" | "xml" => Some(TargetFormat::RdfXml),
                "jsonld" | "json" => Some(TargetFormat::JsonLd),
                _ => None,
            }
        })
        .unwrap_or_default()
}

/// Formats one file into `sink`.
fn format_file<W: Write>(
    args: &Args,
    options: &WriterOptions,
    rewrite: Option<&IriRewrite>,
    source: &Path,
    format: TargetFormat,
    sink: W,
) -> Result<()> {
    let mut document = read_document(source, args.source_format)
        .with_context(|| format!("Failed to read RDF from {}", source.display()))?;

    let mut options = options.clone();
    if let Some(rewrite) = rewrite {
        rewrite.apply_document(&mut document);
        options.base_iri = options.base_iri.as_deref().map(|base| rewrite.apply(base));
    }
    if args.infer_base_iri && options.base_iri.is_none() {
        options.base_iri = infer_base_iri(&document.statements);
        if let Some(base) = &options.base_iri {
            tracing::info!(%base, "inferred base IRI");
        }
    }

    let mut sink = write_document(sink, format, &options, &document)
        .with_context(|| format!("Failed to write {format} for {}", source.display()))?;
    sink.flush().context("Failed to flush output")?;
    Ok(())
}

fn run_file(
    args: &Args,
    options: &WriterOptions,
    rewrite: Option<&IriRewrite>,
    source: &Path,
) -> Result<()> {
    let format = target_format(args, args.target.as_deref());
    match &args.target {
        Some(target) => {
            let file = File::create(target)
                .with_context(|| format!("Failed to create {}", target.display()))?;
            format_file(args, options, rewrite, source, format, BufWriter::new(file))?;
            tracing::info!(source = %source.display(), target = %target.display(), "formatted");
        }
        None => {
            let stdout = io::stdout();
            format_file(args, options, rewrite, source, format, stdout.lock())?;
        }
    }
    Ok(())
}

/// The output path for `relative`, an input path under the source directory.
fn target_path(
    relative: &str,
    pattern: &Regex,
    replacement: Option<&str>,
    format: TargetFormat,
) -> PathBuf {
    match replacement {
        Some(replacement) => PathBuf::from(pattern.replace(relative, replacement).into_owned()),
        None => Path::new(relative).with_extension(format.extension()),
    }
}

fn run_directory(
    args: &Args,
    options: &WriterOptions,
    rewrite: Option<&IriRewrite>,
    source_directory: &Path,
    target_directory: &Path,
) -> Result<()> {
    let pattern = Regex::new(&args.source_directory_pattern).with_context(|| {
        format!("Invalid --source-directory-pattern '{}'", args.source_directory_pattern)
    })?;
    let format = args.target_format.unwrap_or_default();

    let mut count = 0usize;
    for entry in WalkDir::new(source_directory).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {}", source_directory.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(source_directory)
            .with_context(|| format!("{} is outside the source directory", entry.path().display()))?;
        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if !pattern.is_match(&relative) {
            continue;
        }

        let target = target_directory.join(target_path(
            &relative,
            &pattern,
            args.target_directory_pattern.as_deref(),
            format,
        ));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        let file = File::create(&target)
            .with_context(|| format!("Failed to create {}", target.display()))?;
        format_file(args, options, rewrite, entry.path(), format, BufWriter::new(file))?;
        tracing::info!(source = %relative, target = %target.display(), "formatted");
        count += 1;
    }
    tracing::info!(files = count, "directory formatted");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let options = writer_options(&args)?;
    options.validate().context("Invalid writer options")?;
    let rewrite = match (&args.iri_pattern, &args.iri_replacement) {
        (Some(pattern), Some(replacement)) => Some(
            IriRewrite::new(pattern, replacement.as_str())
                .with_context(|| format!("Invalid --iri-pattern '{pattern}'"))?,
        ),
        _ => None,
    };

    match (&args.source, &args.source_directory, &args.target_directory) {
        (Some(source), _, _) => run_file(&args, &options, rewrite.as_ref(), source),
        (None, Some(source_directory), Some(target_directory)) => run_directory(
            &args,
            &options,
            rewrite.as_ref(),
            source_directory,
            target_directory,
        ),
        _ => bail!("Give --source, or --source-directory with --target-directory"),
    }
}
