use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;

/// Parser collaborator. Implementations parse a full script source and
/// expose the number of top-level program statements; the count is the
/// lightweight artifact timed trials record to defeat dead-code
/// elimination.
pub trait ScriptParser {
    fn parse(&self, source: &str) -> usize;
}

/// Production parser backed by oxc.
#[derive(Debug, Default)]
pub struct OxcParser;

impl ScriptParser for OxcParser {
    fn parse(&self, source: &str) -> usize {
        let allocator = Allocator::default();
        let source_type = SourceType::default().with_typescript(false);
        let result = Parser::new(&allocator, source, source_type).parse();
        result.program.body.len()
    }
}

/// Parser stub with a fixed statement count, for orchestration tests.
#[cfg(test)]
pub(crate) struct FixedCountParser {
    pub count: usize,
    pub parsed: std::cell::RefCell<Vec<usize>>,
}

#[cfg(test)]
impl FixedCountParser {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            parsed: std::cell::RefCell::new(Vec::new()),
        }
    }
}

#[cfg(test)]
impl ScriptParser for FixedCountParser {
    fn parse(&self, source: &str) -> usize {
        self.parsed.borrow_mut().push(source.len());
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_top_level_statements() {
        let parser = OxcParser;
        let count = parser.parse("var a = 1;\nfunction f() { return a; }\nf();");
        assert_eq!(count, 3);
    }

    #[test]
    fn empty_source_has_no_statements() {
        assert_eq!(OxcParser.parse(""), 0);
    }
}
