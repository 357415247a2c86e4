pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Request from `--input <file>` when given, else from piped stdin. None
/// means the caller should build the request from flags.
pub fn read_input<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some(path) => file::read_json(path).map(Some),
        None => stdin::read_stdin(),
    }
}
