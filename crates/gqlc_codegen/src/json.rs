//! JSON output: the compiled document itself, tab indented.

use crate::CodegenError;
use gqlc_compiler::CompiledDocument;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;

pub struct JsonGenerator<'a> {
    document: &'a CompiledDocument,
}

impl<'a> JsonGenerator<'a> {
    pub fn new(document: &'a CompiledDocument) -> Self {
        Self { document }
    }

    pub fn generate(&self) -> Result<String, CodegenError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.document.serialize(&mut serializer)?;

        // serde_json only writes valid UTF-8.
        let mut output = String::from_utf8_lossy(&buf).into_owned();
        output.push('\n');
        Ok(output)
    }
}
