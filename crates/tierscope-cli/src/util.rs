use std::{
    fs::File,
    io::{self, BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use tierscope_analysis::{
    diagnostics::{Diagnostic, Severity},
    schema::{SchemaConfig, SchemaFile},
    table::ResponseSet,
};

/// Buffered JSON output file.
#[derive(Debug)]
pub struct Output {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl Output {
    pub fn open(path: PathBuf) -> anyhow::Result<Self> {
        let file = File::create(&path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        Ok(Output {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn write_json<T>(&mut self, value: T) -> anyhow::Result<()>
    where
        T: serde::Serialize,
    {
        let path = self.path.display();
        serde_json::to_writer_pretty(&mut self.writer, &value)
            .with_context(|| format!("Failed to write JSON to {path}"))?;
        writeln!(self.writer)
            .with_context(|| format!("Failed to write newline after JSON to {path}"))?;
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush output to {path}"))?;
        Ok(())
    }
}

pub fn read_json_file<T, P>(file_kind: &str, path: P) -> anyhow::Result<T>
where
    T: serde::de::DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("Failed to open {} file: {}", file_kind, path.display()))?;

    let reader = io::BufReader::new(file);
    let value = serde_json::from_reader(reader).with_context(|| {
        format!(
            "Failed to parse {} JSON file: {}",
            file_kind,
            path.display()
        )
    })?;

    Ok(value)
}

/// Read and validate a survey schema file
///
/// Every integrity issue is logged before the error is returned, so a single
/// run reports all of them.
///
/// # Errors
///
/// Returns error if the file cannot be opened or parsed, or fails validation
pub fn read_schema_file<P>(path: P) -> anyhow::Result<SchemaConfig>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let file = read_json_file::<SchemaFile, _>("schema", path)?;
    SchemaConfig::new(file)
        .inspect_err(|error| {
            for issue in &error.issues {
                tracing::error!("{issue}");
            }
        })
        .with_context(|| format!("Invalid schema file: {}", path.display()))
}

/// Read response sheets from a JSON file
///
/// # Errors
///
/// Returns error if file cannot be opened or parsed
pub fn read_responses_file<P>(path: P) -> anyhow::Result<ResponseSet>
where
    P: AsRef<Path>,
{
    read_json_file("responses", path)
}

/// Log diagnostics at a level matching their severity
pub fn log_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        match diagnostic.severity() {
            Severity::Warning => tracing::warn!(
                stage = %diagnostic.stage,
                group = %diagnostic.group,
                "{}",
                diagnostic.kind
            ),
            Severity::Info => tracing::info!(
                stage = %diagnostic.stage,
                group = %diagnostic.group,
                "{}",
                diagnostic.kind
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_output_writes_pretty_json_line() {
        let path = std::env::temp_dir().join(format!("tierscope-output-{}.json", std::process::id()));
        Output::open(path.clone())
            .unwrap()
            .write_json(serde_json::json!({"tier": "Strategic", "n": 3}))
            .unwrap();
        let written = fs::read_to_string(&path).unwrap();
        fs::remove_file(&path).unwrap();

        assert!(written.ends_with("}\n"));
        let value = serde_json::from_str::<serde_json::Value>(&written).unwrap();
        assert_eq!(value["tier"], "Strategic");
        assert_eq!(value["n"], 3);
    }

    #[test]
    fn test_output_reports_uncreatable_path() {
        let path = std::env::temp_dir()
            .join("tierscope-missing-dir")
            .join("out.json");
        let error = Output::open(path).unwrap_err();
        assert!(error.to_string().starts_with("Failed to create output file"));
    }
}
