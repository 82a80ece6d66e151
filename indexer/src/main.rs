use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ngram_core::persist::write_index;
use ngram_core::{build, BuildStats, Document, GeneratorConfig, IndexFormat};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build the n-gram search index of a generated site", long_about = None)]
struct Cli {
    /// Site base directory holding config/generator.toml
    #[arg(long, short = 'd', default_value = ".")]
    directory: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index rendered documents ({path, title, body} records in JSON/JSONL)
    Build {
        /// Input path (file or directory); defaults to <directory>/temporary/documents
        #[arg(long)]
        input: Option<PathBuf>,
        /// Output directory; defaults to <directory>/generated
        #[arg(long)]
        output: Option<PathBuf>,
        /// Index file format: binary, json or toml (overrides the config file)
        #[arg(long)]
        format: Option<IndexFormat>,
        /// Gram length (overrides the config file)
        #[arg(long)]
        n: Option<usize>,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { input, output, format, n } => {
            let mut config = GeneratorConfig::load(&cli.directory)?;
            if let Some(format) = format {
                config.indexes.file.format = format;
            }
            if let Some(n) = n {
                config.indexes.n = n;
            }
            let input = input.unwrap_or_else(|| GeneratorConfig::documents_dir(&cli.directory));
            let output = output.unwrap_or_else(|| GeneratorConfig::generated_dir(&cli.directory));
            build_index(&config, &input, &output)
        }
    }
}

fn build_index(config: &GeneratorConfig, input: &Path, output: &Path) -> Result<()> {
    if !config.indexes.enabled {
        tracing::info!("indexing disabled, skipped");
        return Ok(());
    }
    config.indexes.validate()?;

    let mut docs = load_documents(input)?;
    docs.sort_by(|a, b| a.path.cmp(&b.path));
    tracing::info!(num_docs = docs.len(), input = %input.display(), "loaded documents");

    let index = build(&docs, &config.indexes)?;
    let path = write_index(&index, config.indexes.format(), output)
        .with_context(|| format!("writing index to {}", output.display()))?;

    let stats = BuildStats::of(docs.len(), &index);
    tracing::info!(
        path = %path.display(),
        documents = stats.documents,
        grams = stats.grams,
        postings = stats.postings,
        "index build complete"
    );
    Ok(())
}

fn load_documents(input: &Path) -> Result<Vec<Document>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    } else {
        anyhow::bail!("input {} does not exist", input.display());
    }

    let mut docs = Vec::new();
    for file in files {
        let loaded = if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            load_jsonl(&file)
        } else {
            load_json(&file)
        };
        docs.extend(loaded.with_context(|| format!("reading documents from {}", file.display()))?);
    }
    for doc in docs.iter_mut() {
        doc.body = normalize_body(&doc.body);
    }
    Ok(docs)
}

fn load_jsonl(file: &Path) -> Result<Vec<Document>> {
    let reader = BufReader::new(File::open(file)?);
    let mut docs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        docs.push(serde_json::from_str(&line)?);
    }
    Ok(docs)
}

fn load_json(file: &Path) -> Result<Vec<Document>> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let docs = match json {
        serde_json::Value::Array(arr) => {
            arr.into_iter().map(serde_json::from_value).collect::<Result<Vec<Document>, _>>()?
        }
        serde_json::Value::Object(_) => vec![serde_json::from_value(json)?],
        _ => Vec::new(),
    };
    Ok(docs)
}

/// Trim every line, drop blank ones and glue the rest together.
fn normalize_body(body: &str) -> String {
    body.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ngram_core::persist::read_index;
    use std::fs;

    #[test]
    fn body_lines_are_flattened() {
        assert_eq!(normalize_body("  Hello \n\n\t world\n"), "Helloworld");
        assert_eq!(normalize_body(""), "");
    }

    #[test]
    fn loads_json_jsonl_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::write(
            dir.path().join("pages.json"),
            r#"[{"path": "a.html", "title": "A", "body": "alpha"}, {"path": "b.html", "title": "B", "body": "beta"}]"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("nested/one.json"),
            r#"{"path": "c.html", "title": "C", "body": "gamma\n  delta"}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("nested/more.jsonl"),
            "{\"path\": \"d.html\", \"title\": \"D\", \"body\": \"\"}\n\n",
        )
        .unwrap();
        fs::write(dir.path().join("ignored.txt"), "not a document").unwrap();

        let mut docs = load_documents(dir.path()).unwrap();
        docs.sort_by(|a, b| a.path.cmp(&b.path));
        let paths: Vec<&str> = docs.iter().map(|d| d.path.as_str()).collect();
        assert_eq!(paths, vec!["a.html", "b.html", "c.html", "d.html"]);
        assert_eq!(docs[2].body, "gammadelta");
    }

    #[test]
    fn missing_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_documents(&dir.path().join("nope")).is_err());
    }

    #[test]
    fn build_writes_configured_format() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("docs.jsonl");
        fs::write(&input, "{\"path\": \"a\", \"title\": \"Go\", \"body\": \"Golang basics\"}\n").unwrap();
        let output = dir.path().join("generated");

        let mut config = GeneratorConfig::default();
        config.indexes.file.format = IndexFormat::Binary;
        build_index(&config, &input, &output).unwrap();

        let index = read_index(IndexFormat::Binary, &output.join("indexes.bin")).unwrap();
        assert_eq!(index.get("Go").unwrap()[0].point, 3);
    }

    #[test]
    fn disabled_indexing_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("generated");
        let mut config = GeneratorConfig::default();
        config.indexes.enabled = false;
        build_index(&config, &dir.path().join("missing"), &output).unwrap();
        assert!(!output.exists());
    }

    #[test]
    fn duplicate_paths_abort_the_build() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("docs.jsonl");
        fs::write(
            &input,
            "{\"path\": \"a\", \"title\": \"x\", \"body\": \"yy\"}\n{\"path\": \"a\", \"title\": \"z\", \"body\": \"ww\"}\n",
        )
        .unwrap();
        let output = dir.path().join("generated");
        assert!(build_index(&GeneratorConfig::default(), &input, &output).is_err());
        assert!(!output.join("indexes.json").exists());
    }
}
