//! Loading and writing allocation table files.
//!
//! A path of `-` means stdin for input and stdout for output.

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use log::{debug, info};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use crate::atf::AtfFile;

/// Path that selects stdin or stdout
pub const STDIO_PATH: &str = "-";

pub fn is_stdio(path: &Path) -> bool {
    path == Path::new(STDIO_PATH)
}

/// Load and validate an allocation table from a file, or stdin for `-`
pub fn load_atf(path: &Path) -> Result<AtfFile> {
    if is_stdio(path) {
        debug!("Reading allocation table from stdin");
        return read_atf(io::stdin().lock());
    }

    info!("Loading allocation table from: {:?}", path);
    let file = File::open(path).wrap_err_with(|| format!("Failed to open input file '{}'", path.display()))?;
    read_atf(file).wrap_err_with(|| format!("Failed to load allocation table '{}'", path.display()))
}

/// Parse and validate an allocation table from any reader
pub fn read_atf<R: Read>(mut reader: R) -> Result<AtfFile> {
    let mut content = String::new();
    reader.read_to_string(&mut content).wrap_err("Failed to read allocation table")?;
    if content.trim().is_empty() {
        return Err(eyre!("allocation table is empty"));
    }

    let atf: AtfFile = serde_yaml::from_str(&content).wrap_err("Failed to parse allocation table")?;
    atf.validate()?;

    debug!(
        "Parsed allocation table for {} with {} allocations",
        atf.superblock,
        atf.allocations.len()
    );
    Ok(atf)
}

/// Serialize an allocation table to YAML
pub fn to_yaml(atf: &AtfFile) -> Result<String> {
    serde_yaml::to_string(atf).wrap_err("Failed to serialize allocation table")
}

/// Write bytes to a file (truncating it), or stdout for `-`
pub fn write_output(path: &Path, content: &[u8]) -> Result<()> {
    if is_stdio(path) {
        let mut stdout = io::stdout().lock();
        stdout.write_all(content).wrap_err("Failed to write to stdout")?;
        return stdout.flush().wrap_err("Failed to flush stdout");
    }

    std::fs::write(path, content)
        .wrap_err_with(|| format!("Failed to write output file '{}'", path.display()))?;
    info!("Wrote {} bytes to {:?}", content.len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TABLE: &str = r#"
name: lab
superBlock: 10.42.0.0/24
allocations:
  - cidr: 10.42.0.0/26
    description: routers
"#;

    #[test]
    fn test_load_atf_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(temp_file, "{}", TABLE).unwrap();

        let atf = load_atf(temp_file.path()).unwrap();
        assert_eq!(atf.name.as_deref(), Some("lab"));
        assert_eq!(atf.allocations[0].description, "routers");
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_atf(Path::new("/nonexistent/atf.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to open input file"));
    }

    #[test]
    fn test_read_empty_and_invalid() {
        assert!(read_atf("".as_bytes()).is_err());
        assert!(read_atf("allocations: []".as_bytes()).is_err());
        assert!(read_atf("name: \"\"\nsuperBlock: 10.0.0.0/8\n".as_bytes()).is_err());
    }

    #[test]
    fn test_write_and_reload() {
        let atf = read_atf(TABLE.as_bytes()).unwrap();
        let temp_file = NamedTempFile::new().unwrap();

        write_output(temp_file.path(), to_yaml(&atf).unwrap().as_bytes()).unwrap();
        let reloaded = load_atf(temp_file.path()).unwrap();
        assert_eq!(atf, reloaded);
    }

    #[test]
    fn test_is_stdio() {
        assert!(is_stdio(Path::new("-")));
        assert!(!is_stdio(Path::new("atf.yaml")));
    }
}
