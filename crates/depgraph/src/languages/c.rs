//! C: header-include resolution.

use super::include::{self, IncludeResolver};
use crate::context::ResolverContext;
use crate::error::ParseError;
use crate::import::Import;
use crate::path::AbsolutePath;
use crate::reader::ContentReader;
use crate::registry::{ImportResolver, LanguageModule, Maturity};

pub struct CModule;

impl LanguageModule for CModule {
    fn name(&self) -> &'static str {
        "C"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".c", ".h"]
    }

    fn maturity(&self) -> Maturity {
        Maturity::Basic
    }

    fn new_resolver<'a>(
        &self,
        ctx: &'a ResolverContext,
        reader: &'a dyn ContentReader,
    ) -> Box<dyn ImportResolver + 'a> {
        Box::new(IncludeResolver {
            ctx,
            reader,
            header_extensions: &[".h"],
        })
    }

    fn is_test_file(&self, path: &AbsolutePath, _reader: &dyn ContentReader) -> bool {
        include::is_test_file(path)
    }
}

pub fn parse_imports(source: &str) -> Result<Vec<Import>, ParseError> {
    include::parse_includes(source)
}
