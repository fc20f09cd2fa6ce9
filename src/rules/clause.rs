//! Clause evaluation.
//!
//! A [`RulePattern`] is resolved into a closed [`Clause`] variant before it
//! runs, so every supported `(obj, verb)` pair is an arm of one match and
//! everything else is a [`ClauseError`].

use regex::Regex;
use tokio::fs;
use tracing::{debug, error};

use crate::actions::{ActionExecutor, resolve_path};
use crate::error::ClauseError;
use crate::rules::expand::expand;
use crate::rules::pattern::RulePattern;
use crate::rules::vars::VarTable;

/// Message variables a clause can test or rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Arg,
    Data,
    Dst,
    Src,
    Type,
    Wdir,
}

impl Field {
    fn parse(obj: &str) -> Option<Self> {
        Some(match obj {
            "arg" => Self::Arg,
            "data" => Self::Data,
            "dst" => Self::Dst,
            "src" => Self::Src,
            "type" => Self::Type,
            "wdir" => Self::Wdir,
            _ => return None,
        })
    }

    /// Name of the variable backing this field.
    pub fn var_name(self) -> &'static str {
        match self {
            Self::Arg => "arg",
            Self::Data => "data",
            Self::Dst => "dst",
            Self::Src => "src",
            Self::Type => "type",
            Self::Wdir => "wdir",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldVerb {
    Is,
    IsNot,
    Set,
    Matches,
    IsFile,
    IsDir,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlumbVerb {
    Start,
    To,
}

/// A resolved `(obj, verb)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clause {
    Field(Field, FieldVerb),
    Plumb(PlumbVerb),
}

impl Clause {
    pub fn resolve(obj: &str, verb: &str) -> Result<Self, ClauseError> {
        let unknown_verb = || ClauseError::UnknownVerb {
            obj: obj.to_string(),
            verb: verb.to_string(),
        };

        if obj == "plumb" {
            let verb = match verb {
                "start" => PlumbVerb::Start,
                "to" => PlumbVerb::To,
                _ => return Err(unknown_verb()),
            };
            return Ok(Self::Plumb(verb));
        }

        let field = Field::parse(obj).ok_or_else(|| ClauseError::UnknownObject(obj.to_string()))?;
        let verb = match verb {
            "is" => FieldVerb::Is,
            "isn't" => FieldVerb::IsNot,
            "set" => FieldVerb::Set,
            "matches" => FieldVerb::Matches,
            "isfile" => FieldVerb::IsFile,
            "isdir" => FieldVerb::IsDir,
            _ => return Err(unknown_verb()),
        };
        Ok(Self::Field(field, verb))
    }
}

/// Evaluate one clause against `vars`, applying its side effects.
///
/// The argument is expanded first. `plumb` clauses are always true once they
/// resolve, whatever happens to the action they trigger.
pub async fn evaluate(
    pattern: &RulePattern,
    vars: &mut VarTable,
    actions: &dyn ActionExecutor,
) -> Result<bool, ClauseError> {
    let arg = expand(&pattern.arg, vars)?;

    match Clause::resolve(&pattern.obj, &pattern.verb)? {
        Clause::Field(field, verb) => eval_field(field, verb, arg, vars).await,
        Clause::Plumb(verb) => {
            eval_plumb(verb, &arg, vars, actions).await;
            Ok(true)
        }
    }
}

async fn eval_field(
    field: Field,
    verb: FieldVerb,
    arg: String,
    vars: &mut VarTable,
) -> Result<bool, ClauseError> {
    let name = field.var_name();

    match verb {
        FieldVerb::Is => Ok(arg == vars.value(name)),
        FieldVerb::IsNot => Ok(arg != vars.value(name)),
        FieldVerb::Set => {
            vars.set(name, arg);
            Ok(true)
        }
        FieldVerb::Matches => {
            let re = Regex::new(&arg).map_err(|source| ClauseError::InvalidRegex {
                pattern: arg.clone(),
                source,
            })?;
            let groups: Vec<String> = match re.captures(vars.value(name)) {
                Some(caps) => caps
                    .iter()
                    .map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
                    .collect(),
                None => return Ok(false),
            };
            for (i, group) in groups.into_iter().enumerate() {
                vars.set(i.to_string(), group);
            }
            Ok(true)
        }
        FieldVerb::IsFile | FieldVerb::IsDir => {
            if arg.is_empty() {
                return Ok(false);
            }
            let path = resolve_path(&arg, vars.value("wdir"));
            let meta = match fs::metadata(&path).await {
                Ok(meta) => meta,
                Err(e) => {
                    // Not finding the path is an ordinary false.
                    debug!(path = %path.display(), error = %e, "stat failed");
                    return Ok(false);
                }
            };
            let kind_matches = match verb {
                FieldVerb::IsFile => meta.is_file(),
                _ => meta.is_dir(),
            };
            if kind_matches {
                vars.set(name, path.to_string_lossy());
            }
            Ok(kind_matches)
        }
    }
}

async fn eval_plumb(verb: PlumbVerb, arg: &str, vars: &VarTable, actions: &dyn ActionExecutor) {
    match verb {
        PlumbVerb::Start => {
            if let Err(e) = actions.spawn(arg, vars).await {
                error!(error = %e, "plumb start failed");
            }
        }
        PlumbVerb::To => {
            let path = resolve_path(arg, vars.value("wdir"));
            if let Err(e) = actions.append(&path, vars.value("arg")).await {
                error!(error = %e, "plumb to failed");
            }
        }
    }
}
