//! OPC (ZIP) container handling.
//!
//! A package is read fully into memory as an ordered list of parts.
//! Rebuilds never touch the source: `with_document_xml` yields a new
//! package, and `save` places output atomically via a temporary file.

use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::detect::{CORE_PART, MAIN_PART};
use crate::error::{Error, Result};

/// An in-memory copy of a word-document package.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    parts: Vec<(String, Vec<u8>)>,
}

impl DocxPackage {
    /// Open a package from a file path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Open a package from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if !data.starts_with(b"PK\x03\x04") {
            return Err(Error::UnknownFormat);
        }

        let mut archive = ZipArchive::new(Cursor::new(data)).map_err(|_| Error::UnknownFormat)?;
        let mut parts = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            if entry.is_dir() {
                continue;
            }
            let mut content = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut content)?;
            parts.push((entry.name().to_string(), content));
        }

        let package = Self { parts };
        if package.part(MAIN_PART).is_none() {
            return Err(Error::MissingPart(MAIN_PART.to_string()));
        }

        Ok(package)
    }

    /// Open a package from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(&data)
    }

    /// Get a part's raw bytes by name.
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .find(|(part_name, _)| part_name == name)
            .map(|(_, content)| content.as_slice())
    }

    /// The main document part decoded as UTF-8.
    pub fn document_xml(&self) -> Result<String> {
        let bytes = self
            .part(MAIN_PART)
            .ok_or_else(|| Error::MissingPart(MAIN_PART.to_string()))?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    /// The styles part decoded as UTF-8, if present.
    pub fn styles_xml(&self) -> Option<String> {
        self.part("word/styles.xml")
            .and_then(|bytes| String::from_utf8(bytes.to_vec()).ok())
    }

    /// The core-properties part decoded as UTF-8, if present.
    pub fn core_xml(&self) -> Option<String> {
        self.part(CORE_PART)
            .and_then(|bytes| String::from_utf8(bytes.to_vec()).ok())
    }

    /// A new package with the main document part replaced and every
    /// other part byte-identical. The source package is not mutated.
    pub fn with_document_xml(&self, xml: &str) -> DocxPackage {
        let parts = self
            .parts
            .iter()
            .map(|(name, content)| {
                if name == MAIN_PART {
                    (name.clone(), xml.as_bytes().to_vec())
                } else {
                    (name.clone(), content.clone())
                }
            })
            .collect();
        DocxPackage { parts }
    }

    /// Serialize to a fresh ZIP container.
    ///
    /// Entry metadata is fixed so identical part contents produce
    /// byte-identical archives.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let cursor = Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(cursor);
        self.write_parts(&mut writer)?;
        Ok(writer.finish()?.into_inner())
    }

    /// Write the package to a destination path atomically.
    ///
    /// The archive is serialized to a named temporary file in the
    /// destination directory and renamed into place, so a failed write
    /// never leaves a partial container behind.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;

        {
            let mut writer = ZipWriter::new(tmp.as_file_mut());
            self.write_parts(&mut writer)?;
            writer.finish()?;
        }

        tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    fn write_parts<W: Write + Seek>(&self, writer: &mut ZipWriter<W>) -> Result<()> {
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        for (name, content) in &self.parts {
            writer.start_file(name.clone(), options)?;
            writer.write_all(content)?;
        }
        Ok(())
    }

    /// Number of parts in the package.
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Iterate part names in archive order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_package(parts: &[(&str, &str)]) -> Vec<u8> {
        let cursor = Cursor::new(Vec::new());
        let mut writer = ZipWriter::new(cursor);
        for (name, content) in parts {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn sample_bytes() -> Vec<u8> {
        make_package(&[
            ("[Content_Types].xml", "<Types/>"),
            ("word/document.xml", "<w:document><w:body/></w:document>"),
            ("word/styles.xml", "<w:styles/>"),
        ])
    }

    #[test]
    fn test_open_and_read_parts() {
        let package = DocxPackage::from_bytes(&sample_bytes()).unwrap();
        assert_eq!(package.part_count(), 3);
        assert!(package.document_xml().unwrap().contains("w:body"));
        assert_eq!(package.styles_xml().as_deref(), Some("<w:styles/>"));
        assert!(package.core_xml().is_none());
    }

    #[test]
    fn test_missing_main_part() {
        let data = make_package(&[("[Content_Types].xml", "<Types/>")]);
        let result = DocxPackage::from_bytes(&data);
        assert!(matches!(result, Err(Error::MissingPart(_))));
    }

    #[test]
    fn test_not_a_zip() {
        let result = DocxPackage::from_bytes(b"plain text");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_replace_document_preserves_other_parts() {
        let package = DocxPackage::from_bytes(&sample_bytes()).unwrap();
        let replaced = package.with_document_xml("<w:document/>");

        assert_eq!(replaced.document_xml().unwrap(), "<w:document/>");
        assert_eq!(replaced.part("word/styles.xml"), package.part("word/styles.xml"));
        // Source untouched
        assert!(package.document_xml().unwrap().contains("w:body"));
    }

    #[test]
    fn test_roundtrip_is_deterministic() {
        let package = DocxPackage::from_bytes(&sample_bytes()).unwrap();
        let first = package.to_bytes().unwrap();
        let second = package.to_bytes().unwrap();
        assert_eq!(first, second);

        let reopened = DocxPackage::from_bytes(&first).unwrap();
        assert_eq!(reopened.part_count(), package.part_count());
        assert_eq!(reopened.document_xml().unwrap(), package.document_xml().unwrap());
    }

    #[test]
    fn test_save_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        let package = DocxPackage::from_bytes(&sample_bytes()).unwrap();
        package.save(&path).unwrap();

        let reopened = DocxPackage::open(&path).unwrap();
        assert!(reopened.document_xml().unwrap().contains("w:body"));
    }
}
