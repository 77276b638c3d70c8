//! Container handle: bytes plus the catalog parsed from them

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::catalog::SampleCatalog;
use crate::error::ParseError;
use crate::extract::{AudioBuffer, extract, extract_many};
use crate::parser::parse_container;

/// A parsed KORF container
///
/// The bytes are never mutated after parsing, so extraction can run from any
/// number of threads over a shared reference.
#[derive(Debug, Clone)]
pub struct Container {
    data: Vec<u8>,
    catalog: SampleCatalog,
}

impl Container {
    /// Parse a container from owned bytes
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ParseError> {
        let catalog = parse_container(&data)?;
        Ok(Self { data, catalog })
    }

    /// Read and parse a container file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        debug!("Read {} bytes from {}", data.len(), path.display());
        Self::from_bytes(data)
    }

    /// The sample catalog
    pub fn catalog(&self) -> &SampleCatalog {
        &self.catalog
    }

    /// Raw container bytes
    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    /// Extract the audio of the entry at `index`
    pub fn extract(&self, index: usize) -> Result<AudioBuffer, ParseError> {
        let entry = self
            .catalog
            .get(index)
            .ok_or(ParseError::UnknownIndex(index))?;
        extract(&self.data, entry)
    }

    /// Extract several entries in parallel, in the order given
    pub fn extract_many(&self, indices: &[usize]) -> Result<Vec<AudioBuffer>, ParseError> {
        extract_many(&self.data, &self.catalog, indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::ContainerWriter;

    fn container() -> Container {
        let mut writer = ContainerWriter::new();
        writer.add_sample("Kick_01", 44_100, &[10, -10]);
        writer.add_sample("Bass C2", 22_050, &[1, 2, 3]);
        Container::from_bytes(writer.to_bytes()).unwrap()
    }

    #[test]
    fn test_extract_by_index() {
        let c = container();
        assert_eq!(c.catalog().len(), 2);
        assert_eq!(c.extract(1).unwrap().samples, vec![1, 2, 3]);
        assert!(matches!(c.extract(2), Err(ParseError::UnknownIndex(2))));
    }

    #[test]
    fn test_open_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("USER01.PCM");
        fs::write(&path, container().bytes()).unwrap();

        let c = Container::open(&path).unwrap();
        assert_eq!(c.catalog().get(0).unwrap().name, "Kick_01");
        assert_eq!(c.extract_many(&[1, 0]).unwrap()[1].samples, vec![10, -10]);
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Container::open(dir.path().join("missing.PCM")),
            Err(ParseError::Io(_))
        ));
    }
}
