use std::io::{self, Write};

use tm_lang::{Document, EnumType, StructType, TypeTable};

/// A target-language code generator over a resolved document.
///
/// `generate` drives the hooks in document order; an implementation emits
/// one struct or enum per call and uses the surrounding hooks for file
/// headers, footers and section separators.
pub trait Generator {
    fn before_generate_document(
        &self,
        _out: &mut dyn Write,
        _document: &Document,
        _types: &TypeTable,
    ) -> io::Result<()> {
        Ok(())
    }

    fn after_generate_document(
        &self,
        _out: &mut dyn Write,
        _document: &Document,
        _types: &TypeTable,
    ) -> io::Result<()> {
        Ok(())
    }

    fn before_generate_struct(
        &self,
        _out: &mut dyn Write,
        _document: &Document,
        _types: &TypeTable,
    ) -> io::Result<()> {
        Ok(())
    }

    fn after_generate_struct(
        &self,
        _out: &mut dyn Write,
        _document: &Document,
        _types: &TypeTable,
    ) -> io::Result<()> {
        Ok(())
    }

    fn before_generate_enum(
        &self,
        _out: &mut dyn Write,
        _document: &Document,
        _types: &TypeTable,
    ) -> io::Result<()> {
        Ok(())
    }

    fn after_generate_enum(
        &self,
        _out: &mut dyn Write,
        _document: &Document,
        _types: &TypeTable,
    ) -> io::Result<()> {
        Ok(())
    }

    fn generate_struct(
        &self,
        out: &mut dyn Write,
        struct_type: &StructType,
        types: &TypeTable,
    ) -> io::Result<()>;

    fn generate_enum(
        &self,
        out: &mut dyn Write,
        enum_type: &EnumType,
        types: &TypeTable,
    ) -> io::Result<()>;

    fn generate(
        &self,
        out: &mut dyn Write,
        document: &Document,
        types: &TypeTable,
    ) -> io::Result<()> {
        self.before_generate_document(out, document, types)?;
        self.before_generate_struct(out, document, types)?;
        for struct_ref in document.struct_types.iter().copied() {
            self.generate_struct(out, struct_ref.get(types), types)?;
        }
        self.after_generate_struct(out, document, types)?;
        self.before_generate_enum(out, document, types)?;
        for enum_ref in document.enum_types.iter().copied() {
            self.generate_enum(out, enum_ref.get(types), types)?;
        }
        self.after_generate_enum(out, document, types)?;
        self.after_generate_document(out, document, types)?;
        out.flush()
    }
}

/// The source file's stem, used for package and wrapper names.
pub(crate) fn document_stem(document: &Document) -> String {
    document
        .source
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("types")
        .to_string()
}
