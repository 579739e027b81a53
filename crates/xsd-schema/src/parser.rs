//! Parser entry points

use crate::config::ParserConfig;
use crate::context::ParsingContext;
use crate::extractor::DefinitionExtractor;
use crate::meta::{self, meta_schema};
use crate::{xml, Error, Result};
use roxmltree::{Document, Node, ParsingOptions};
use std::path::Path;
use tracing::{debug, info, info_span, trace};
use xsd_ir::{Schema, UNKNOWN_DOCUMENT};

/// Parses XML Schema documents into resolved [`Schema`]s
///
/// A parser holds configuration only; every call runs an independent parse.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a parser with the given configuration
    #[must_use]
    pub fn new(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parser configuration
    #[must_use]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a schema document held in memory
    pub fn parse_str(&self, xml: &str) -> Result<Schema> {
        let doc = self.load(xml, UNKNOWN_DOCUMENT)?;
        self.parse_document(&doc, None)
    }

    /// Read and parse a schema file
    ///
    /// Locations in errors and entities refer to the file by its path.
    pub fn parse_path(&self, path: &Path) -> Result<Schema> {
        let document = path.display().to_string();
        let text = self.read(path, &document)?;
        let doc = self.load(&text, &document)?;
        self.parse_document(&doc, Some(&document))
    }

    /// Parse the first schema embedded in a host document, such as the
    /// `types` section of a WSDL file
    pub fn parse_embedded_str(&self, xml: &str) -> Result<Schema> {
        let doc = self.load(xml, UNKNOWN_DOCUMENT)?;
        self.parse_embedded(&doc, None)
    }

    /// Read a host document and parse the first schema embedded in it
    pub fn parse_embedded_path(&self, path: &Path) -> Result<Schema> {
        let document = path.display().to_string();
        let text = self.read(path, &document)?;
        let doc = self.load(&text, &document)?;
        self.parse_embedded(&doc, Some(&document))
    }

    fn parse_embedded(&self, doc: &Document<'_>, uri: Option<&str>) -> Result<Schema> {
        let root = doc.root_element();
        let schema = root
            .descendants()
            .find(|node| xml::is_xs(*node, "schema"))
            .ok_or_else(|| {
                Error::invalid_document(
                    "No XML Schema 'schema' element found in document",
                    xml::location(root, uri.unwrap_or(UNKNOWN_DOCUMENT)),
                )
            })?;
        debug!("Found embedded schema at {}", xml::node_path(schema));
        self.parse_fragment(schema, uri)
    }

    /// Parse a schema whose root is the document element of `doc`
    ///
    /// `uri` identifies the document in locations; `[unknown]` when absent.
    pub fn parse_document(&self, doc: &Document<'_>, uri: Option<&str>) -> Result<Schema> {
        self.parse_fragment(doc.root_element(), uri)
    }

    /// Parse a schema rooted at `root`, which may sit anywhere in its document
    pub fn parse_fragment(&self, root: Node<'_, '_>, uri: Option<&str>) -> Result<Schema> {
        let document = uri.unwrap_or(UNKNOWN_DOCUMENT);
        let span = info_span!("parse_schema", document);
        let _guard = span.enter();

        if self.config.validate_structure {
            meta_schema()?.validate(root, document)?;
            debug!("Structural validation passed");
        } else {
            meta::check_root(root, document)?;
        }

        let definitions = DefinitionExtractor::new(document).extract(root)?;
        debug!(
            types = definitions.types.len(),
            root_elements = definitions.root_elements.len(),
            "Extracted definitions"
        );

        let schema = ParsingContext::new(document, definitions).resolve()?;
        info!(
            types = schema.types().len(),
            root_elements = schema.root_elements().len(),
            "Parsed schema"
        );
        Ok(schema)
    }

    fn read(&self, path: &Path, document: &str) -> Result<String> {
        trace!("Loading schema from file: {:?}", path);

        let size = std::fs::metadata(path)
            .map_err(|e| Error::load(document, e.to_string()))?
            .len();
        if usize::try_from(size).map_or(true, |size| size > self.config.max_document_size) {
            return Err(self.too_large(document, size));
        }

        std::fs::read_to_string(path).map_err(|e| Error::load(document, e.to_string()))
    }

    fn load<'input>(&self, xml: &'input str, document: &str) -> Result<Document<'input>> {
        if xml.len() > self.config.max_document_size {
            return Err(self.too_large(document, xml.len() as u64));
        }

        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        Document::parse_with_options(xml, options).map_err(|e| Error::load(document, e.to_string()))
    }

    fn too_large(&self, document: &str, size: u64) -> Error {
        Error::load(
            document,
            format!(
                "Document of {size} bytes exceeds the limit of {} bytes",
                self.config.max_document_size
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use xsd_ir::EntityName;

    const LIBRARY: &str = r#"<?xml version="1.0"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" xmlns:lib="urn:library" targetNamespace="urn:library">
  <xs:complexType name="Book">
    <xs:sequence>
      <xs:element name="title" type="xs:string"/>
      <xs:element name="sequel" type="lib:Book" minOccurs="0"/>
    </xs:sequence>
  </xs:complexType>
  <xs:element name="book" type="lib:Book"/>
</xs:schema>"#;

    #[test]
    fn test_parse_str() {
        let schema = Parser::default().parse_str(LIBRARY).unwrap();

        let book = schema.type_named(&EntityName::qualified("urn:library", "Book")).unwrap();
        assert!(Arc::ptr_eq(&book.members()[1].ty().unwrap(), book));
        assert_eq!(book.location().unwrap().document, UNKNOWN_DOCUMENT);
        assert_eq!(book.location().unwrap().line, 3);
    }

    #[test]
    fn test_not_well_formed() {
        match Parser::default().parse_str("<xs:schema") {
            Err(Error::Load { document, .. }) => assert_eq!(document, UNKNOWN_DOCUMENT),
            other => panic!("Expected Load error, got {other:?}"),
        }
    }

    #[test]
    fn test_size_limit() {
        let parser = Parser::new(ParserConfig {
            max_document_size: 16,
            ..ParserConfig::default()
        });

        match parser.parse_str(LIBRARY) {
            Err(Error::Load { message, .. }) => assert!(message.contains("exceeds the limit of 16 bytes")),
            other => panic!("Expected Load error, got {other:?}"),
        }
    }

    #[test]
    fn test_validation_can_be_disabled() {
        let xml = r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema" targetNamespace="urn:x">
  <xs:complexType name="T"><xs:sequence><xs:element name="a" minOccurs="lots"/></xs:sequence></xs:complexType>
</xs:schema>"#;

        assert!(matches!(
            Parser::default().parse_str(xml),
            Err(Error::InvalidDocument { .. })
        ));

        let lenient = Parser::new(ParserConfig {
            validate_structure: false,
            ..ParserConfig::default()
        });
        assert!(matches!(
            lenient.parse_str(xml),
            Err(Error::InvalidElementDefinition { .. })
        ));
    }

    #[test]
    fn test_root_is_checked_without_validation() {
        let lenient = Parser::new(ParserConfig {
            validate_structure: false,
            ..ParserConfig::default()
        });

        assert!(matches!(
            lenient.parse_str("<definitions/>"),
            Err(Error::InvalidDocument { .. })
        ));
    }

    #[test]
    fn test_parse_embedded() {
        let wsdl = format!(
            r#"<wsdl:definitions xmlns:wsdl="http://schemas.xmlsoap.org/wsdl/">
  <wsdl:types>
{}
  </wsdl:types>
</wsdl:definitions>"#,
            LIBRARY.trim_start_matches(r#"<?xml version="1.0"?>"#)
        );

        let schema = Parser::default().parse_embedded_str(&wsdl).unwrap();
        assert_eq!(schema.types().len(), 1);
        let book = schema.type_named(&EntityName::qualified("urn:library", "Book")).unwrap();
        assert_eq!(
            book.location().unwrap().path,
            "/wsdl:definitions/wsdl:types/xs:schema/xs:complexType"
        );

        match Parser::default().parse_embedded_str("<definitions/>") {
            Err(Error::InvalidDocument { message, .. }) => assert!(message.contains("No XML Schema")),
            other => panic!("Expected InvalidDocument error, got {other:?}"),
        }
    }
}
