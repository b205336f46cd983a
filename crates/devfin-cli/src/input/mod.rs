pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Read typed input from `--input <path>` or, failing that, piped stdin.
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
    context: &str,
) -> Result<T, Box<dyn std::error::Error>> {
    if let Some(path) = path {
        file::read_document(path)
    } else if let Some(data) = stdin::read_stdin()? {
        // Piped JSON always opens with a brace; anything else is YAML
        let format = if data.starts_with('{') {
            file::DocumentFormat::Json
        } else {
            file::DocumentFormat::Yaml
        };
        file::parse_document(&data, format)
            .map_err(|e| format!("Failed to parse stdin: {e}").into())
    } else {
        Err(format!("--input <file.json|file.yaml> or stdin required for {context}").into())
    }
}
