//! C++: header-include resolution over the full header extension set.

use super::include::{self, IncludeResolver};
use crate::context::ResolverContext;
use crate::error::ParseError;
use crate::import::Import;
use crate::path::AbsolutePath;
use crate::reader::ContentReader;
use crate::registry::{ImportResolver, LanguageModule, Maturity};

pub struct CppModule;

impl LanguageModule for CppModule {
    fn name(&self) -> &'static str {
        "C++"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".cc", ".cpp", ".cxx", ".hpp", ".hh", ".hxx"]
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
            header_extensions: &[".h", ".hh", ".hpp", ".hxx"],
        })
    }

    fn is_test_file(&self, path: &AbsolutePath, _reader: &dyn ContentReader) -> bool {
        include::is_test_file(path)
    }
}

pub fn parse_imports(source: &str) -> Result<Vec<Import>, ParseError> {
    include::parse_includes(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::MemoryReader;

    fn p(s: &str) -> AbsolutePath {
        AbsolutePath::from_clean(s)
    }

    #[test]
    fn resolves_extensionless_includes_against_headers() {
        let reader = MemoryReader::new()
            .with("/p/src/main.cpp", "#include \"../include/lib\"\n")
            .with("/p/include/lib.hpp", "#pragma once\n");
        let files = vec![p("/p/include/lib.hpp"), p("/p/src/main.cpp")];
        let ctx = ResolverContext::build(&files);
        let mut resolver = CppModule.new_resolver(&ctx, &reader);

        let deps = resolver
            .resolve_project_imports(&p("/p/src/main.cpp"), ".cpp")
            .unwrap();
        assert_eq!(deps, vec![p("/p/include/lib.hpp")]);
    }
}
