//! Member paths such as `Address.Lines[2].Text`.
//!
//! Member names are dot-joined; collection indices attach to the preceding
//! segment without a separator.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Member(String), // .Name
    Index(usize),   // [2]
}

#[derive(Debug, PartialEq, Eq)]
pub enum PathError {
    InvalidSyntax(String),
}

/// Append `label` to `path`. Labels starting with `[` are subscripts.
pub fn combine(path: &str, label: &str) -> String {
    if path.is_empty() {
        label.to_string()
    } else if label.starts_with('[') {
        format!("{path}{label}")
    } else {
        format!("{path}.{label}")
    }
}

/// Subscript label for a collection index.
pub fn index_label(index: usize) -> String {
    format!("[{index}]")
}

pub fn parse(input: &str) -> Result<Vec<Segment>, PathError> {
    Parser::new(input).parse()
}

/// `Items[3].Name` → `Items.Name`. Unparseable paths are returned unchanged.
pub fn without_indices(path: &str) -> String {
    match parse(path) {
        Ok(segments) => segments
            .into_iter()
            .filter_map(|s| match s {
                Segment::Member(name) => Some(name),
                Segment::Index(_) => None,
            })
            .collect::<Vec<_>>()
            .join("."),
        Err(_) => path.to_string(),
    }
}

/// True when `path` names `parent` itself or something beneath it.
pub fn is_same_or_child_of(path: &str, parent: &str) -> bool {
    path == parent
        || path
            .strip_prefix(parent)
            .is_some_and(|rest| rest.starts_with('.') || rest.starts_with('['))
}

struct Parser<'a> {
    s: &'a str,
    i: usize,
}

impl<'a> Parser<'a> {
    fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    fn parse(&mut self) -> Result<Vec<Segment>, PathError> {
        let mut segments = Vec::new();
        if self.eof() {
            return Ok(segments);
        }
        if self.peek_char() != Some('[') {
            segments.push(Segment::Member(self.parse_name()?));
        }
        while !self.eof() {
            if self.consume_char('.') {
                segments.push(Segment::Member(self.parse_name()?));
                continue;
            }
            if self.consume_char('[') {
                segments.push(Segment::Index(self.parse_index()?));
                self.expect(']')?;
                continue;
            }
            return Err(PathError::InvalidSyntax(format!("unexpected character at {}", self.i)));
        }
        Ok(segments)
    }

    fn parse_name(&mut self) -> Result<String, PathError> {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c == '.' || c == '[' {
                break;
            }
            self.i += c.len_utf8();
        }
        if self.i == start {
            return Err(PathError::InvalidSyntax("member name expected".into()));
        }
        Ok(self.s[start..self.i].to_string())
    }

    fn parse_index(&mut self) -> Result<usize, PathError> {
        let start = self.i;
        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.i += 1;
            } else {
                break;
            }
        }
        if self.i == start {
            return Err(PathError::InvalidSyntax("expected index".into()));
        }
        self.s[start..self.i]
            .parse::<usize>()
            .map_err(|_| PathError::InvalidSyntax("bad index".into()))
    }

    fn expect(&mut self, c: char) -> Result<(), PathError> {
        if self.consume_char(c) {
            Ok(())
        } else {
            Err(PathError::InvalidSyntax(format!("expected '{}'", c)))
        }
    }

    fn consume_char(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.i += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.s[self.i..].chars().next()
    }

    fn eof(&self) -> bool {
        self.i >= self.s.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn combine_dots_members_and_glues_subscripts() {
        assert_eq!(combine("", "Address"), "Address");
        assert_eq!(combine("Address", "Lines"), "Address.Lines");
        assert_eq!(combine("Address.Lines", &index_label(2)), "Address.Lines[2]");
        assert_eq!(combine("", &index_label(0)), "[0]");
    }

    #[test]
    fn parses_members_and_indices() {
        assert_eq!(
            parse("Address.Lines[2].Text").unwrap(),
            vec![
                Segment::Member("Address".into()),
                Segment::Member("Lines".into()),
                Segment::Index(2),
                Segment::Member("Text".into()),
            ]
        );
        assert_eq!(parse("").unwrap(), vec![]);
        assert!(parse("Lines[x]").is_err());
        assert!(parse("a..b").is_err());
    }

    #[test]
    fn strips_indices() {
        assert_eq!(without_indices("Items[3].Name"), "Items.Name");
        assert_eq!(without_indices("[0][1].Name"), "Name");
        assert_eq!(without_indices("Lines[x]"), "Lines[x]");
        assert_eq!(without_indices("Name"), "Name");
    }

    #[test]
    fn child_paths() {
        assert!(is_same_or_child_of("Address.Street", "Address"));
        assert!(is_same_or_child_of("Address", "Address"));
        assert!(is_same_or_child_of("Lines[1]", "Lines"));
        assert!(!is_same_or_child_of("AddressBook", "Address"));
    }
}
