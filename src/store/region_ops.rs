use serde_json::Value;

use super::GeometryStore;
use crate::error::{RegionError, Result};
use crate::region::{Operator, Region, Token};
use crate::surface::{Halfspace, SurfaceId};

/// Parse stack entry: a bare surface awaits its sign token.
enum Operand {
    Surface(SurfaceId),
    Region(Region),
}

impl GeometryStore {
    /// Verifies every surface a region references is owned by this store.
    ///
    /// # Errors
    ///
    /// Returns an error on the first surface minted by a different store.
    pub fn check_region_surfaces(&self, region: &Region) -> Result<()> {
        for id in region.surfaces() {
            self.surface(*id)?;
        }
        Ok(())
    }

    /// Renders a region's postfix stream as a token list.
    ///
    /// Tokens are surface names, the halfspace signs `+`/`-` and the
    /// operators `&`, `|`, `~`. This is the canonical round-trippable
    /// textual form; [`Self::region_from_postfix`] parses it back.
    ///
    /// # Errors
    ///
    /// Returns an error if the region references a surface not owned by
    /// this store.
    pub fn region_to_postfix(&self, region: &Region) -> Result<Vec<String>> {
        region
            .tokens()
            .iter()
            .map(|token| match token {
                Token::Surface(id) => self.surface(*id).map(|s| s.name().to_owned()),
                Token::Sign(sign) => Ok(sign.symbol().to_string()),
                Token::Op(op) => Ok(op.symbol().to_string()),
            })
            .collect()
    }

    /// Renders a region as a single whitespace-joined postfix string.
    ///
    /// # Errors
    ///
    /// As [`Self::region_to_postfix`].
    pub fn region_postfix_string(&self, region: &Region) -> Result<String> {
        Ok(self.region_to_postfix(region)?.join(" "))
    }

    /// Parses a postfix token stream back into a region.
    ///
    /// An empty stream yields the empty region.
    ///
    /// # Errors
    ///
    /// Returns an error if a surface name is unknown, an operator lacks
    /// operands, or the stream does not reduce to exactly one region.
    pub fn region_from_postfix<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Region> {
        if tokens.is_empty() {
            return Ok(Region::empty());
        }
        let mut stack: Vec<Operand> = Vec::new();
        for token in tokens {
            let token = token.as_ref();
            match token {
                "+" | "-" => {
                    let sign = if token == "+" {
                        Halfspace::Positive
                    } else {
                        Halfspace::Negative
                    };
                    match stack.pop() {
                        Some(Operand::Surface(id)) => {
                            stack.push(Operand::Region(Region::halfspace(id, sign)));
                        }
                        _ => {
                            return Err(RegionError::MissingOperand {
                                token: token.into(),
                            }
                            .into())
                        }
                    }
                }
                "&" | "|" => {
                    let right = stack.pop();
                    let left = stack.pop();
                    match (left, right) {
                        (Some(Operand::Region(l)), Some(Operand::Region(r))) => {
                            let combined = if token == "&" { l.and(&r)? } else { l.or(&r)? };
                            stack.push(Operand::Region(combined));
                        }
                        _ => {
                            return Err(RegionError::MissingOperand {
                                token: token.into(),
                            }
                            .into())
                        }
                    }
                }
                "~" => match stack.pop() {
                    Some(Operand::Region(r)) => {
                        stack.push(Operand::Region(r.complement()?));
                    }
                    _ => {
                        return Err(RegionError::MissingOperand {
                            token: token.into(),
                        }
                        .into())
                    }
                },
                name => stack.push(Operand::Surface(self.surface_named(name)?)),
            }
        }
        if stack.len() != 1 {
            return Err(RegionError::DanglingOperands { count: stack.len() }.into());
        }
        match stack.pop() {
            Some(Operand::Region(region)) => Ok(region),
            _ => Err(RegionError::DanglingOperands { count: 1 }.into()),
        }
    }

    /// Rebuilds the nested infix form of a region as a JSON tree.
    ///
    /// Halfspace leaves render as `"<sign><surface>"` strings, binary
    /// nodes as `[left, op, right]` arrays with brackets elided across
    /// runs of one associative operator, and complements as `["~", ...]`
    /// merged into the operand's bracket when it already has one. The top
    /// level is always an array.
    ///
    /// # Errors
    ///
    /// Returns an error if the region references a surface not owned by
    /// this store or its postfix stream is malformed.
    pub fn region_to_infix(&self, region: &Region) -> Result<Value> {
        let tokens = region.tokens();
        // Each entry carries the operator of an unwrapped run, if the
        // value was left unbracketed for a same-kind consumer.
        let mut stack: Vec<(Value, Option<Operator>)> = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::Surface(id) => {
                    let name = self.surface(*id)?.name().to_owned();
                    stack.push((Value::String(name), None));
                }
                Token::Sign(sign) => {
                    let (value, _) = stack
                        .pop()
                        .ok_or_else(|| missing(sign.symbol()))?;
                    let name = value.as_str().ok_or_else(|| missing(sign.symbol()))?;
                    stack.push((Value::String(format!("{}{name}", sign.symbol())), None));
                }
                Token::Op(Operator::Complement) => {
                    let (value, _) = stack.pop().ok_or_else(|| missing('~'))?;
                    let elements = match value {
                        Value::Array(items) => {
                            let mut merged = vec![Value::String("~".into())];
                            merged.extend(items);
                            merged
                        }
                        other => vec![Value::String("~".into()), other],
                    };
                    stack.push((Value::Array(elements), None));
                }
                Token::Op(op) => {
                    let (right, right_run) = stack.pop().ok_or_else(|| missing(op.symbol()))?;
                    let (left, left_run) = stack.pop().ok_or_else(|| missing(op.symbol()))?;
                    let mut elements = Vec::new();
                    splice(&mut elements, left, left_run, *op);
                    elements.push(Value::String(op.symbol().to_string()));
                    splice(&mut elements, right, right_run, *op);
                    // Leave the node unwrapped when the next operator in
                    // the stream is the same kind: runs of one associative
                    // operator share a single bracket.
                    let run = (next_operator(tokens, i + 1) == Some(*op)).then_some(*op);
                    stack.push((Value::Array(elements), run));
                }
            }
        }
        match stack.pop() {
            None => Ok(Value::Array(Vec::new())),
            Some((Value::Array(items), _)) if stack.is_empty() => Ok(Value::Array(items)),
            Some((leaf, _)) if stack.is_empty() => Ok(Value::Array(vec![leaf])),
            Some(_) => Err(RegionError::DanglingOperands {
                count: stack.len() + 1,
            }
            .into()),
        }
    }
}

fn missing(symbol: char) -> crate::error::CsgError {
    RegionError::MissingOperand {
        token: symbol.to_string(),
    }
    .into()
}

/// Appends an operand, flattening it when it is an unwrapped run of the
/// consuming operator.
fn splice(elements: &mut Vec<Value>, value: Value, run: Option<Operator>, op: Operator) {
    match value {
        Value::Array(items) if run == Some(op) => elements.extend(items),
        other => elements.push(other),
    }
}

fn next_operator(tokens: &[Token], from: usize) -> Option<Operator> {
    tokens[from..].iter().find_map(|token| {
        if let Token::Op(op) = token {
            Some(*op)
        } else {
            None
        }
    })
}
