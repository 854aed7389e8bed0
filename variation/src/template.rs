use std::collections::HashMap;
use log::*;
use crate::error::VarError;
use crate::expr::{self, Expr};

#[derive(Debug, Clone, PartialEq)]
pub enum VarKind {
    Uniform { min :f64, max :f64 },
    Normal { mu :f64, sd :f64 },
    Choice(Vec<f64>),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDef {
    pub id :String,
    pub kind :VarKind,
}

#[derive(Debug, Clone, PartialEq)]
enum Part {
    Text(String),
    Placeholder(String, Expr),
}

/// Input document with the `<vars>` block removed and `${...}`
/// placeholders split out.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub vars :Vec<VarDef>,
    parts :Vec<Part>,
}

fn attr(node :&roxmltree::Node, id :&str, key :&str) -> Result<f64, VarError> {
    let v = node.attribute(key)
        .ok_or_else(|| VarError::Definition(id.to_string(), format!("missing attribute '{}'", key)))?;
    v.trim().parse::<f64>()
        .map_err(|_| VarError::Definition(id.to_string(), format!("'{}' is not a number", v)))
}

fn parse_var(node :&roxmltree::Node) -> Result<VarDef, VarError> {
    let id = node.attribute("id")
        .ok_or_else(|| VarError::Definition("?".to_string(), "missing attribute 'id'".to_string()))?
        .to_string();
    let kind = match node.attribute("type").unwrap_or("expr") {
        "uniform" => {
            let (min, max) = (attr(node, &id, "min")?, attr(node, &id, "max")?);
            if min > max {
                return Err(VarError::Definition(id, "min is larger than max".to_string()));
            }
            VarKind::Uniform { min, max }
        },
        "normal" => {
            let (mu, sd) = (attr(node, &id, "mu")?, attr(node, &id, "sd")?);
            if !(sd >= 0.0) {
                return Err(VarError::Definition(id, "sd must not be negative".to_string()));
            }
            VarKind::Normal { mu, sd }
        },
        "choice" => {
            let text = node.attribute("values").unwrap_or("");
            let values = text.split(|c :char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .map(|s| s.parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|_| VarError::Definition(id.clone(), format!("bad values '{}'", text)))?;
            if values.is_empty() {
                return Err(VarError::Definition(id, "no values to choose from".to_string()));
            }
            VarKind::Choice(values)
        },
        "expr" => {
            let src = node.attribute("value")
                .ok_or_else(|| VarError::Definition(id.clone(), "missing attribute 'value'".to_string()))?;
            VarKind::Expr(expr::parse(src)?)
        },
        other => return Err(VarError::Definition(id, format!("unknown type '{}'", other))),
    };
    Ok(VarDef { id, kind })
}

/// Byte range covering the element, its indentation and the line break after it.
fn line_range(text :&str, range :std::ops::Range<usize>) -> std::ops::Range<usize> {
    let before = &text[..range.start];
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let start = if before[line_start..].trim().is_empty() { line_start } else { range.start };
    let end = if text[range.end..].starts_with('\n') { range.end + 1 } else { range.end };
    start..end
}

fn split_placeholders(text :&str) -> Result<Vec<Part>, VarError> {
    let mut parts = Vec::new();
    let mut rest = 0;
    while let Some(i) = text[rest..].find("${") {
        let open = rest + i;
        let close = text[open..].find('}').map(|j| open + j)
            .ok_or(VarError::Placeholder(open))?;
        if open > rest {
            parts.push(Part::Text(text[rest..open].to_string()));
        }
        let src = text[open + 2..close].trim();
        parts.push(Part::Placeholder(src.to_string(), expr::parse(src)?));
        rest = close + 1;
    }
    if rest < text.len() {
        parts.push(Part::Text(text[rest..].to_string()));
    }
    Ok(parts)
}

pub fn parse_template(text :&str) -> Result<Template, VarError> {
    let doc = roxmltree::Document::parse(text).map_err(|e| VarError::Xml(e.to_string()))?;
    let mut vars :Vec<VarDef> = Vec::new();
    let mut body = text.to_string();

    if let Some(block) = doc.descendants().find(|n| n.has_tag_name("vars")) {
        for v in block.children().filter(|c| c.is_element()) {
            if !v.has_tag_name("var") {
                warn!("Ignoring <{}> in <vars>", v.tag_name().name());
                continue;
            }
            let def = parse_var(&v)?;
            if vars.iter().any(|d| d.id == def.id) {
                return Err(VarError::Definition(def.id, "defined twice".to_string()));
            }
            vars.push(def);
        }
        body.replace_range(line_range(text, block.range()), "");
    } else {
        warn!("Template has no <vars> block");
    }
    debug!("Template defines {} variables", vars.len());

    Ok(Template { vars, parts: split_placeholders(&body)? })
}

/// Numbers as written into the document: at most 6 decimals, no trailing zeros.
pub fn format_value(x :f64) -> String {
    let s = format!("{:.6}", x);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

impl Template {
    pub fn render(&self, values :&HashMap<String, f64>) -> Result<String, VarError> {
        let mut out = String::new();
        for p in &self.parts {
            match p {
                Part::Text(t) => out.push_str(t),
                Part::Placeholder(src, e) => {
                    let x = e.eval(values)?;
                    if !x.is_finite() {
                        return Err(VarError::NotFinite(src.clone(), x));
                    }
                    out.push_str(&format_value(x));
                },
            }
        }
        Ok(out)
    }
}
