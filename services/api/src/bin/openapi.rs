//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI 3.0 document of the REST surface to a file
//! (`openapi.json` unless a path is given as the first argument).

use api_lib::web::rest::ApiDoc;
use std::path::Path;
use utoipa::OpenApi;

fn write_spec(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let spec_json = ApiDoc::openapi().to_pretty_json()?;
    std::fs::write(path, spec_json)?;
    println!("✅ OpenAPI specification generated at {}", path.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "openapi.json".to_string());
    write_spec(Path::new(&path))
}
