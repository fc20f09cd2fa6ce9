//! Pattern compiler: one clause line → `(obj, verb, arg)`.

/// A compiled clause. `arg` is kept verbatim and expanded at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulePattern {
    pub obj: String,
    pub verb: String,
    pub arg: String,
}

fn is_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Split off the first blank-delimited token.
fn next_token(s: &str) -> (&str, &str) {
    let s = s.trim_start_matches(is_blank);
    match s.find(is_blank) {
        Some(end) => (&s[..end], &s[end..]),
        None => (s, ""),
    }
}

impl RulePattern {
    /// Compile a pattern line. Returns `None` if the object, verb or argument
    /// is missing.
    pub fn compile(line: &str) -> Option<Self> {
        let (obj, rest) = next_token(line);
        let (verb, rest) = next_token(rest);
        let arg = rest.trim_start_matches(is_blank);

        if obj.is_empty() || verb.is_empty() || arg.is_empty() {
            return None;
        }
        Some(Self {
            obj: obj.to_string(),
            verb: verb.to_string(),
            arg: arg.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_three_fields() {
        let p = RulePattern::compile("type is text").unwrap();
        assert_eq!(p.obj, "type");
        assert_eq!(p.verb, "is");
        assert_eq!(p.arg, "text");
    }

    #[test]
    fn argument_keeps_internal_whitespace() {
        let p = RulePattern::compile("plumb\t start  echo   'a  b'").unwrap();
        assert_eq!(p.obj, "plumb");
        assert_eq!(p.verb, "start");
        assert_eq!(p.arg, "echo   'a  b'");
    }

    #[test]
    fn missing_argument_fails() {
        assert_eq!(RulePattern::compile("type is"), None);
        assert_eq!(RulePattern::compile("type is \t "), None);
        assert_eq!(RulePattern::compile("type"), None);
    }
}
