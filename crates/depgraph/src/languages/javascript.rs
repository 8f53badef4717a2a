//! JavaScript: same scanner and relative-path resolution as TypeScript,
//! with the JS extension set.

use super::typescript::{self, ModuleResolver};
use crate::context::ResolverContext;
use crate::error::ParseError;
use crate::import::Import;
use crate::path::AbsolutePath;
use crate::reader::ContentReader;
use crate::registry::{ImportResolver, LanguageModule, Maturity};

pub struct JavaScriptModule;

impl LanguageModule for JavaScriptModule {
    fn name(&self) -> &'static str {
        "JavaScript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".js", ".jsx"]
    }

    fn maturity(&self) -> Maturity {
        Maturity::Basic
    }

    fn new_resolver<'a>(
        &self,
        ctx: &'a ResolverContext,
        reader: &'a dyn ContentReader,
    ) -> Box<dyn ImportResolver + 'a> {
        Box::new(ModuleResolver {
            ctx,
            reader,
            candidate_extensions: typescript::JS_EXTENSIONS,
        })
    }

    fn is_test_file(&self, path: &AbsolutePath, _reader: &dyn ContentReader) -> bool {
        typescript::is_test_file(path)
    }
}

pub fn parse_imports(source: &str) -> Result<Vec<Import>, ParseError> {
    typescript::parse_imports(source)
}
