use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum VarError {
    #[error("unexpected character at offset {0} in '{1}'")]
    Lex(usize, String),

    #[error("syntax error in '{0}': {1}")]
    Syntax(String, String),

    #[error("unknown variable '{0}'")]
    Unknown(String),

    #[error("unknown function '{0}'")]
    UnknownFunction(String),

    #[error("function {0} takes {1} argument(s)")]
    Arity(String, usize),

    #[error("variables depend on each other in a cycle: {0}")]
    Cycle(String),

    #[error("variable '{0}': {1}")]
    Definition(String, String),

    #[error("template is not valid XML: {0}")]
    Xml(String),

    #[error("placeholder at offset {0} is not closed")]
    Placeholder(usize),

    #[error("placeholder '${{{0}}}' evaluates to {1}")]
    NotFinite(String, f64),
}
