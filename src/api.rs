//! MCP-DSL processing API.
//!
//! Pure functions for running the pipeline on in-memory content. This
//! module contains no I/O, CLI handling, or process exits; a host
//! front-end picks an [`OutputFormat`], calls [`process`], and decides
//! what to do with the text. All inputs and outputs are structured for
//! easy testing.

use std::error::Error;
use std::fmt;

use crate::decompiler::decompile;
use crate::diagnostics::Diagnostic;
use crate::parser::parse_source;
use crate::tokenizer::tokenize;

#[derive(Debug, Clone, PartialEq)]
pub enum OutputFormat {
    /// Phase 1: the token stream with spans.
    TokenStream,
    /// Phase 2: the AST as JSON.
    AstJson,
    /// Phase 4a: compiled messages and artefacts.
    CompiledJson,
    CompiledJsonPretty,
    /// Compile, then decompile back to canonical DSL text.
    Dsl,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "token-stream" => Ok(OutputFormat::TokenStream),
            "ast-json" => Ok(OutputFormat::AstJson),
            "compiled-json" => Ok(OutputFormat::CompiledJson),
            "compiled-json-pretty" => Ok(OutputFormat::CompiledJsonPretty),
            "dsl" => Ok(OutputFormat::Dsl),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProcessArgs {
    pub content: String,
    pub source_path: String,
    pub format: OutputFormat,
}

#[derive(Debug)]
pub enum ProcessError {
    /// Error-severity diagnostics suppressed the output.
    Compilation(Vec<Diagnostic>),
    Serialization(String),
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Compilation(diagnostics) => {
                let rendered: Vec<String> =
                    diagnostics.iter().map(|d| d.to_string()).collect();
                write!(f, "Compilation failed:\n{}", rendered.join("\n"))
            }
            ProcessError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl Error for ProcessError {}

/// Main processing function - pure, no I/O or side effects.
pub fn process(args: ProcessArgs) -> Result<String, ProcessError> {
    match args.format {
        OutputFormat::TokenStream => process_token_stream(&args.content, &args.source_path),
        OutputFormat::AstJson => process_ast_json(&args.content, &args.source_path),
        OutputFormat::CompiledJson => process_compiled(&args.content, false),
        OutputFormat::CompiledJsonPretty => process_compiled(&args.content, true),
        OutputFormat::Dsl => process_dsl(&args.content),
    }
}

fn process_token_stream(content: &str, source_path: &str) -> Result<String, ProcessError> {
    let (tokens, diagnostics) = tokenize(content);

    let result = serde_json::json!({
        "source": source_path,
        "tokens": tokens,
        "diagnostics": diagnostics,
    });

    serde_json::to_string_pretty(&result)
        .map_err(|e| ProcessError::Serialization(e.to_string()))
}

fn process_ast_json(content: &str, source_path: &str) -> Result<String, ProcessError> {
    let (document, diagnostics) = parse_source(content);

    let result = serde_json::json!({
        "source": source_path,
        "document": document,
        "diagnostics": diagnostics,
    });

    serde_json::to_string_pretty(&result)
        .map_err(|e| ProcessError::Serialization(e.to_string()))
}

fn process_compiled(content: &str, pretty: bool) -> Result<String, ProcessError> {
    let (result, diagnostics) = crate::compile_source(content);
    let result = result.ok_or(ProcessError::Compilation(diagnostics))?;

    let serialized = if pretty {
        serde_json::to_string_pretty(&result)
    } else {
        serde_json::to_string(&result)
    };
    serialized.map_err(|e| ProcessError::Serialization(e.to_string()))
}

fn process_dsl(content: &str) -> Result<String, ProcessError> {
    let (result, diagnostics) = crate::compile_source(content);
    let result = result.ok_or(ProcessError::Compilation(diagnostics))?;
    let (text, _) = decompile(&result);
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parsing() {
        assert_eq!(
            "token-stream".parse::<OutputFormat>().unwrap(),
            OutputFormat::TokenStream
        );
        assert_eq!(
            "compiled-json".parse::<OutputFormat>().unwrap(),
            OutputFormat::CompiledJson
        );
        assert!("invalid-format".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_process_token_stream() {
        let args = ProcessArgs {
            content: "> ping#2".to_string(),
            source_path: "test.mcpdsl".to_string(),
            format: OutputFormat::TokenStream,
        };

        let result = process(args).unwrap();
        assert!(result.contains("tokens"));
        assert!(result.contains("test.mcpdsl"));
    }

    #[test]
    fn test_process_compiled() {
        let args = ProcessArgs {
            content: "> ping#2".to_string(),
            source_path: "test.mcpdsl".to_string(),
            format: OutputFormat::CompiledJson,
        };

        let result = process(args).unwrap();
        assert!(result.contains("\"method\":\"ping\""));
    }

    #[test]
    fn test_errors_suppress_output() {
        let args = ProcessArgs {
            content: "> ping#-2".to_string(),
            source_path: "test.mcpdsl".to_string(),
            format: OutputFormat::CompiledJson,
        };

        let result = process(args);
        assert!(matches!(result, Err(ProcessError::Compilation(_))));
    }

    #[test]
    fn test_process_dsl_round() {
        let args = ProcessArgs {
            content: "! initialized".to_string(),
            source_path: "test.mcpdsl".to_string(),
            format: OutputFormat::Dsl,
        };

        let result = process(args).unwrap();
        assert_eq!(result, "! initialized\n");
    }

    #[test]
    fn test_process_ast_json() {
        let args = ProcessArgs {
            content: "R main { uri:\"file:///x\" }".to_string(),
            source_path: "test.mcpdsl".to_string(),
            format: OutputFormat::AstJson,
        };

        let result = process(args).unwrap();
        assert!(result.contains("document"));
        assert!(result.contains("Resource"));
    }
}
