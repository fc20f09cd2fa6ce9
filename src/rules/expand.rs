//! Variable expansion for rule arguments and assignment values.
//!
//! One left-to-right pass:
//! - Outside quotes, `\X` yields `X` literally, whatever `X` is.
//! - A pair of `'` quotes suspends `$` substitution; the quotes are dropped.
//!   Inside them a backslash is kept along with the character it escapes,
//!   so `'\.c$'` reaches a regex untouched.
//! - `$name` and `${name}` are replaced by the variable's value (empty when
//!   unbound). A `$` not followed by a name is kept as is.

use std::iter::Peekable;
use std::str::Chars;

use crate::error::ExpandError;
use crate::rules::vars::VarTable;

/// Characters allowed in a variable name.
pub fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Expand `raw` against `vars`.
pub fn expand(raw: &str, vars: &VarTable) -> Result<String, ExpandError> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match c {
            '\\' if quoted => {
                out.push('\\');
                // An escaped quote does not close the quoted run.
                out.extend(chars.next());
            }
            // A trailing backslash has nothing to escape and is kept.
            '\\' => out.push(chars.next().unwrap_or('\\')),
            '\'' => quoted = !quoted,
            '$' if !quoted => substitute(&mut chars, vars, &mut out)?,
            _ => out.push(c),
        }
    }

    if quoted {
        return Err(ExpandError::UnterminatedQuote);
    }
    Ok(out)
}

/// Handle the text following an unquoted `$`.
fn substitute(
    chars: &mut Peekable<Chars<'_>>,
    vars: &VarTable,
    out: &mut String,
) -> Result<(), ExpandError> {
    if chars.next_if_eq(&'{').is_some() {
        let mut name = String::new();
        loop {
            match chars.next() {
                Some('}') => break,
                Some(c) if is_name_char(c) => name.push(c),
                Some(c) => return Err(ExpandError::InvalidNameChar(c)),
                None => return Err(ExpandError::UnterminatedBrace),
            }
        }
        if name.is_empty() {
            return Err(ExpandError::EmptyName);
        }
        out.push_str(vars.value(&name));
        return Ok(());
    }

    let mut name = String::new();
    while let Some(c) = chars.next_if(|c| is_name_char(*c)) {
        name.push(c);
    }
    if name.is_empty() {
        out.push('$');
    } else {
        out.push_str(vars.value(&name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> VarTable {
        pairs.iter().copied().collect()
    }

    #[test]
    fn escaped_dollar_is_literal() {
        assert_eq!(expand("a\\$b", &VarTable::new()).unwrap(), "a$b");
    }

    #[test]
    fn substitutes_bare_and_braced_names() {
        let v = vars(&[("x", "1"), ("file", "notes")]);
        assert_eq!(expand("$x", &v).unwrap(), "1");
        assert_eq!(expand("${file}.txt", &v).unwrap(), "notes.txt");
        assert_eq!(expand("$file.txt", &v).unwrap(), "notes.txt");
        assert_eq!(expand("<$x$x>", &v).unwrap(), "<11>");
    }

    #[test]
    fn unbound_variables_expand_empty() {
        assert_eq!(expand("${y}", &VarTable::new()).unwrap(), "");
        assert_eq!(expand("a$nope-b", &VarTable::new()).unwrap(), "a-b");
    }

    #[test]
    fn quotes_suspend_substitution() {
        let v = vars(&[("x", "1")]);
        assert_eq!(expand("'$x'", &v).unwrap(), "$x");
        assert_eq!(expand("'a b' $x", &v).unwrap(), "a b 1");
    }

    #[test]
    fn escaped_quote_and_backslash() {
        let v = VarTable::new();
        assert_eq!(expand("it\\'s", &v).unwrap(), "it's");
        assert_eq!(expand("a\\\\b", &v).unwrap(), "a\\b");
        assert_eq!(expand("end\\", &v).unwrap(), "end\\");
    }

    #[test]
    fn backslashes_survive_inside_quotes() {
        let v = vars(&[("x", "1")]);
        assert_eq!(expand(r"'\d+'", &v).unwrap(), r"\d+");
        assert_eq!(expand(r"'^[0-9]+\.c$'", &v).unwrap(), r"^[0-9]+\.c$");
        assert_eq!(expand(r"'\$x' $x", &v).unwrap(), r"\$x 1");
        assert_eq!(expand(r"'it\'s'", &v).unwrap(), r"it\'s");
        assert_eq!(expand(r"'a\\b'", &v).unwrap(), r"a\\b");
    }

    #[test]
    fn lone_dollar_passes_through() {
        let v = VarTable::new();
        assert_eq!(expand("$", &v).unwrap(), "$");
        assert_eq!(expand("cost: $ 5", &v).unwrap(), "cost: $ 5");
        assert_eq!(expand("^foo$", &v).unwrap(), "^foo$");
    }

    #[test]
    fn unterminated_quote_fails() {
        assert_eq!(
            expand("'abc", &VarTable::new()),
            Err(ExpandError::UnterminatedQuote)
        );
    }

    #[test]
    fn bad_braces_fail() {
        let v = VarTable::new();
        assert_eq!(expand("${}", &v), Err(ExpandError::EmptyName));
        assert_eq!(expand("${abc", &v), Err(ExpandError::UnterminatedBrace));
        assert_eq!(expand("${a b}", &v), Err(ExpandError::InvalidNameChar(' ')));
    }

    #[test]
    fn idempotent_once_resolved() {
        let v = vars(&[("dir", "/usr/glenda"), ("f", "lib")]);
        let once = expand("cd $dir && ls ${f}/x", &v).unwrap();
        assert_eq!(expand(&once, &v).unwrap(), once);
    }

    #[test]
    fn preserves_multibyte_text() {
        let v = vars(&[("who", "Zoë")]);
        assert_eq!(expand("héllo $who ☺", &v).unwrap(), "héllo Zoë ☺");
    }
}
