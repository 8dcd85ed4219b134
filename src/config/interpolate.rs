//! Eager `${...}` interpolation.
//!
//! Supported expressions:
//! - `${a.b}`: absolute key reference
//! - `${.x}`, `${..x}`: reference relative to the containing node
//! - `${oc.env:VAR}`, `${oc.env:VAR,default}`: environment variable
//!
//! A string made of a single interpolation takes the referenced node's type.
//! Anything else is rendered to a string. `\${` escapes a literal `${`.

use crate::config::overrides::render_scalar;
use crate::config::tree;
use crate::error::{Error, Result};
use serde_yaml::{Mapping, Value};

const ENV_RESOLVER: &str = "oc.env";

#[derive(Debug, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Expr(String),
}

/// Resolve every interpolation in `root`, returning a plain tree.
pub fn resolve(root: &Value) -> Result<Value> {
    let mut resolver = Resolver {
        root,
        visiting: Vec::new(),
    };
    resolver.node(root, &mut Vec::new())
}

struct Resolver<'a> {
    root: &'a Value,
    visiting: Vec<String>,
}

impl Resolver<'_> {
    fn node(&mut self, node: &Value, path: &mut Vec<String>) -> Result<Value> {
        match node {
            Value::Mapping(map) => {
                let mut out = Mapping::with_capacity(map.len());
                for (key, value) in map {
                    path.push(tree::key_component(key));
                    let resolved = self.node(value, path);
                    path.pop();
                    out.insert(key.clone(), resolved?);
                }
                Ok(Value::Mapping(out))
            }
            Value::Sequence(seq) => {
                let mut out = Vec::with_capacity(seq.len());
                for (index, value) in seq.iter().enumerate() {
                    path.push(index.to_string());
                    let resolved = self.node(value, path);
                    path.pop();
                    out.push(resolved?);
                }
                Ok(Value::Sequence(out))
            }
            Value::String(s) if s.contains("${") => self.string(s, path),
            Value::Tagged(tagged) => {
                let mut tagged = tagged.as_ref().clone();
                tagged.value = self.node(&tagged.value, path)?;
                Ok(Value::Tagged(Box::new(tagged)))
            }
            other => Ok(other.clone()),
        }
    }

    fn string(&mut self, s: &str, path: &mut Vec<String>) -> Result<Value> {
        let pieces = split_template(s).map_err(|reason| Error::ConfigInterpolation {
            key: path.join("."),
            expr: s.to_string(),
            reason,
        })?;

        if let [Piece::Expr(expr)] = pieces.as_slice() {
            return self.expr(expr, path);
        }

        let mut out = String::new();
        for piece in pieces {
            match piece {
                Piece::Literal(text) => out.push_str(&text),
                Piece::Expr(expr) => {
                    let value = self.expr(&expr, path)?;
                    if matches!(value, Value::Mapping(_) | Value::Sequence(_)) {
                        return Err(Error::ConfigInterpolation {
                            key: path.join("."),
                            expr,
                            reason: "cannot embed a mapping or list in a string".to_string(),
                        });
                    }
                    out.push_str(&render_scalar(&value));
                }
            }
        }
        Ok(Value::String(out))
    }

    fn expr(&mut self, expr: &str, path: &mut Vec<String>) -> Result<Value> {
        // Nested interpolations are expanded first, as text.
        let expanded;
        let expr = if expr.contains("${") {
            expanded = render_scalar(&self.string(expr, path)?);
            expanded.as_str()
        } else {
            expr
        }
        .trim();

        let fail = |reason: String| Error::ConfigInterpolation {
            key: path.join("."),
            expr: expr.to_string(),
            reason,
        };

        if let Some((resolver, args)) = expr.split_once(':') {
            if resolver.trim() != ENV_RESOLVER {
                return Err(fail(format!("unknown resolver '{}'", resolver.trim())));
            }
            return env_lookup(args).map_err(fail);
        }

        let target = reference_path(expr, path).map_err(fail)?;
        let target_key = target.join(".");
        if self.visiting.contains(&target_key) {
            return Err(fail(format!("reference cycle through '{target_key}'")));
        }
        let node = tree::get_path(self.root, &target)
            .ok_or_else(|| fail(format!("key '{target_key}' not found")))?;

        self.visiting.push(target_key);
        let mut target = target;
        let resolved = self.node(node, &mut target);
        self.visiting.pop();
        resolved
    }
}

/// Absolute path components for a reference expression.
fn reference_path(expr: &str, current: &[String]) -> std::result::Result<Vec<String>, String> {
    if expr.is_empty() {
        return Err("empty reference".to_string());
    }

    let dots = expr.chars().take_while(|c| *c == '.').count();
    let rest = &expr[dots..];
    let mut base: Vec<String> = Vec::new();
    if dots > 0 {
        // One dot is the containing node; each extra dot goes one level up.
        let depth = current
            .len()
            .checked_sub(dots)
            .ok_or_else(|| format!("relative reference '{expr}' escapes the root"))?;
        base.extend_from_slice(&current[..depth]);
    }

    if !rest.is_empty() {
        for part in rest.split('.') {
            if part.is_empty() {
                return Err(format!("malformed reference '{expr}'"));
            }
            base.push(part.to_string());
        }
    }
    Ok(base)
}

fn env_lookup(args: &str) -> std::result::Result<Value, String> {
    let (name, default) = match args.split_once(',') {
        Some((name, default)) => (name.trim(), Some(unquote(default.trim()))),
        None => (args.trim(), None),
    };
    if name.is_empty() {
        return Err("environment variable name is empty".to_string());
    }

    match (std::env::var(name), default) {
        (Ok(value), _) => Ok(Value::String(value)),
        (Err(_), Some("null")) => Ok(Value::Null),
        (Err(_), Some(default)) => Ok(Value::String(default.to_string())),
        (Err(_), None) => Err(format!("environment variable '{name}' is not set")),
    }
}

fn unquote(s: &str) -> &str {
    for quote in ['\'', '"'] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}

fn split_template(s: &str) -> std::result::Result<Vec<Piece>, String> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut rest = s;

    while let Some(start) = rest.find("${") {
        if rest[..start].ends_with('\\') {
            literal.push_str(&rest[..start - 1]);
            literal.push_str("${");
            rest = &rest[start + 2..];
            continue;
        }
        literal.push_str(&rest[..start]);

        let body = &rest[start + 2..];
        let mut depth = 1usize;
        let mut end = None;
        let mut chars = body.char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            match c {
                '$' if chars.peek().is_some_and(|(_, next)| *next == '{') => {
                    chars.next();
                    depth += 1;
                }
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        end = Some(i);
                        break;
                    }
                }
                _ => {}
            }
        }
        let end = end.ok_or_else(|| "unterminated interpolation".to_string())?;

        if !literal.is_empty() {
            pieces.push(Piece::Literal(std::mem::take(&mut literal)));
        }
        pieces.push(Piece::Expr(body[..end].to_string()));
        rest = &body[end + 1..];
    }

    literal.push_str(rest);
    if !literal.is_empty() || pieces.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    Ok(pieces)
}
