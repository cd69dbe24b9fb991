//! Closure Expression Parser

use closures::*;
use pbrt_core::geometry::*;
use pbrt_core::pbrt::*;
use pbrt_core::spectrum::*;
use pest::iterators::*;
use pest::Parser;
use std::result::Result;

/// The `pest` parser generated from a grammar.
#[derive(Parser)]
#[grammar = "parser/grammar.pest"]
struct ClosureExprParser;

/// A parsed closure argument before it is matched against a schema.
#[derive(Clone, Debug)]
enum Arg {
    Null,
    Number { value: Float, integral: bool },
    Color(Spectrum),
    Vector(Vector3f),
    String(String),
    Closure(ClosureTree),
}

impl Arg {
    /// Returns a short description used in errors.
    fn describe(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Number { integral: true, .. } => "int",
            Self::Number { .. } => "float",
            Self::Color(_) => "color",
            Self::Vector(_) => "vector",
            Self::String(_) => "string",
            Self::Closure(_) => "closure color",
        }
    }

    /// Converts the argument to a parameter value of the given type.
    ///
    /// * `ty` - Expected type.
    fn into_param(self, ty: ParamType) -> Option<ParamValue> {
        match (ty, self) {
            (ParamType::Float, Self::Number { value, .. }) => Some(ParamValue::Float(value)),
            (ParamType::Int, Self::Number { value, integral: true }) => Some(ParamValue::Int(value as Int)),
            (ParamType::Color, Self::Number { value, .. }) => Some(ParamValue::Color(Spectrum::new(value))),
            (ParamType::Color, Self::Color(c)) => Some(ParamValue::Color(c)),
            (ParamType::Vector, Self::Vector(v)) => Some(ParamValue::Vector(v)),
            (ParamType::String, Self::String(s)) => Some(ParamValue::String(s)),
            (ParamType::Closure, Self::Null) => Some(ParamValue::Closure(None)),
            (ParamType::Closure, Self::Closure(t)) => Some(ParamValue::Closure(Some(Box::new(t)))),
            _ => None,
        }
    }
}

/// Parses a closure expression into a tree and type-checks every closure
/// call against the registry.
///
/// * `registry` - Closure registry.
/// * `src`      - The expression.
pub fn parse_closure_expr(registry: &ClosureRegistry, src: &str) -> Result<ClosureTree, String> {
    let mut pairs = ClosureExprParser::parse(Rule::closure_expr, src)
        .map_err(|err| format!("Error parsing closure expression. {}", err))?;
    let closure_expr = next_pair(&mut pairs)?;
    let expr = next_pair(&mut closure_expr.into_inner())?;
    parse_expr(registry, expr)
}

/// Returns the next token pair.
///
/// * `pairs` - The token pairs.
fn next_pair<'a>(pairs: &mut Pairs<'a, Rule>) -> Result<Pair<'a, Rule>, String> {
    pairs.next().ok_or_else(|| String::from("Unexpected end of expression"))
}

/// Parse an `expr` rule into the sum of its terms.
///
/// * `registry` - Closure registry.
/// * `pair`     - The `expr` token pair.
fn parse_expr(registry: &ClosureRegistry, pair: Pair<'_, Rule>) -> Result<ClosureTree, String> {
    let mut terms = Vec::new();
    for term in pair.into_inner() {
        terms.push(parse_term(registry, term)?);
    }
    ClosureTree::sum(terms).ok_or_else(|| String::from("Empty expression"))
}

/// Parse a `term` rule. A term is exactly one closure tinted by any number
/// of colours and numbers.
///
/// * `registry` - Closure registry.
/// * `pair`     - The `term` token pair.
fn parse_term(registry: &ClosureRegistry, pair: Pair<'_, Rule>) -> Result<ClosureTree, String> {
    let text = pair.as_str().trim().to_string();
    let mut tint: Option<Spectrum> = None;
    let mut closure: Option<ClosureTree> = None;

    for factor in pair.into_inner() {
        let inner = next_pair(&mut factor.into_inner())?;
        match inner.as_rule() {
            Rule::color | Rule::number => {
                let c = match inner.as_rule() {
                    Rule::color => parse_color(inner)?,
                    _ => Spectrum::new(parse_number(&inner)?.0),
                };
                tint = Some(tint.map_or(c, |t| t * c));
            }
            Rule::group | Rule::call => {
                if closure.is_some() {
                    return Err(format!("Product of two closures in '{}'", text));
                }
                closure = Some(match inner.as_rule() {
                    Rule::group => parse_expr(registry, next_pair(&mut inner.into_inner())?)?,
                    _ => parse_call(registry, inner)?,
                });
            }
            rule => return Err(format!("Unexpected {:?} in '{}'", rule, text)),
        }
    }

    match (closure, tint) {
        (Some(closure), Some(tint)) => Ok(ClosureTree::mul(tint, closure)),
        (Some(closure), None) => Ok(closure),
        (None, _) => Err(format!("Term '{}' has no closure", text)),
    }
}

/// Parse a `call` rule into a closure component.
///
/// * `registry` - Closure registry.
/// * `pair`     - The `call` token pair.
fn parse_call(registry: &ClosureRegistry, pair: Pair<'_, Rule>) -> Result<ClosureTree, String> {
    let mut inner_rules = pair.into_inner();
    let name = next_pair(&mut inner_rules)?.as_str();
    let desc = registry
        .get_by_name(name)
        .ok_or_else(|| format!("Unknown closure '{}'", name))?;

    let mut args = Vec::new();
    for arg in inner_rules {
        args.push(parse_arg(registry, arg)?);
    }
    if args.len() != desc.params.len() {
        return Err(format!(
            "Closure '{}' expects {} arguments, got {}",
            name,
            desc.params.len(),
            args.len()
        ));
    }

    let mut params = Vec::with_capacity(args.len());
    for (arg, param) in args.into_iter().zip(desc.params.iter()) {
        let found = arg.describe();
        let value = arg.into_param(param.ty).ok_or_else(|| {
            format!(
                "Closure '{}' parameter '{}' expects {}, got {}",
                name, param.name, param.ty, found
            )
        })?;
        params.push(value);
    }
    desc.check_params(&params).map_err(|e| e.to_string())?;

    debug!("Parsed closure {} with {} parameters", name, params.len());
    Ok(ClosureTree::component(desc.id, Spectrum::new(1.0), params))
}

/// Parse an `arg` rule.
///
/// * `registry` - Closure registry.
/// * `pair`     - The `arg` token pair.
fn parse_arg(registry: &ClosureRegistry, pair: Pair<'_, Rule>) -> Result<Arg, String> {
    let inner = next_pair(&mut pair.into_inner())?;
    match inner.as_rule() {
        Rule::null => Ok(Arg::Null),
        Rule::vector => parse_vector(inner).map(Arg::Vector),
        Rule::string => Ok(Arg::String(next_pair(&mut inner.into_inner())?.as_str().to_string())),
        Rule::value => {
            let v = next_pair(&mut inner.into_inner())?;
            match v.as_rule() {
                Rule::color => parse_color(v).map(Arg::Color),
                _ => parse_number(&v).map(|(value, integral)| Arg::Number { value, integral }),
            }
        }
        Rule::expr => parse_expr(registry, inner).map(Arg::Closure),
        rule => Err(format!("Unexpected {:?} argument", rule)),
    }
}

/// Parse a `number` rule. Returns the value and whether it was written as an
/// integer.
///
/// * `pair` - The `number` token pair.
fn parse_number(pair: &Pair<'_, Rule>) -> Result<(Float, bool), String> {
    let s = pair.as_str();
    let value = s
        .parse::<Float>()
        .map_err(|e| format!("Invalid number '{}'. {}", s, e))?;
    let integral = !s.contains(['.', 'e', 'E']);
    Ok((value, integral))
}

/// Parses the 1 or 3 numbers of a `color` or `vector` rule.
///
/// * `pair` - The token pair.
fn parse_triple(pair: Pair<'_, Rule>) -> Result<[Float; 3], String> {
    let text = pair.as_str().to_string();
    let mut values = Vec::with_capacity(3);
    for p in pair.into_inner() {
        values.push(parse_number(&p)?.0);
    }
    match values[..] {
        [v] => Ok([v, v, v]),
        [x, y, z] => Ok([x, y, z]),
        _ => Err(format!("Expected 1 or 3 components in '{}'", text)),
    }
}

/// Parse a `color` rule.
///
/// * `pair` - The `color` token pair.
fn parse_color(pair: Pair<'_, Rule>) -> Result<Spectrum, String> {
    parse_triple(pair).map(|rgb| Spectrum::from_rgb(&rgb))
}

/// Parse a `vector` rule.
///
/// * `pair` - The `vector` token pair.
fn parse_vector(pair: Pair<'_, Rule>) -> Result<Vector3f, String> {
    parse_triple(pair).map(|[x, y, z]| Vector3f::new(x, y, z))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(src: &str) -> Result<ClosureTree, String> {
        parse_closure_expr(&ClosureRegistry::with_builtin_closures(), src)
    }

    #[test]
    fn sum_of_tinted_closures() {
        let tree = parse("0.5 * diffuse(vector(0, 0, 1)) + color(1, 0, 0) * 2 * as_sheen(vector(0, 1, 0))")
            .expect("tree");
        match tree {
            ClosureTree::Add { a, b } => {
                assert!(matches!(*a, ClosureTree::Mul { weight, .. } if weight == Spectrum::new(0.5)));
                assert!(matches!(*b, ClosureTree::Mul { weight, .. } if weight == Spectrum::rgb(2.0, 0.0, 0.0)));
            }
            _ => panic!("expected a sum"),
        }
    }

    #[test]
    fn numbers_coerce_to_schema() {
        let tree = parse("oren_nayar(vector(0, 0, 1), 1)").expect("tree");
        match tree {
            ClosureTree::Component(c) => {
                assert_eq!(c.id, ClosureId::OrenNayar);
                assert_eq!(c.params[1], ParamValue::Float(1.0));
            }
            _ => panic!("expected a component"),
        }
    }

    #[test]
    fn layered_substrate() {
        let tree = parse(
            "as_alsurface_layer(0.5 * diffuse(vector(0,0,1)), 1, vector(0,0,1), vector(0), color(1), 0.1, 0, 0, 1.5, color(0.9), color(0.1))",
        )
        .expect("tree");
        match tree {
            ClosureTree::Component(c) => {
                assert_eq!(c.id, ClosureId::AlSurfaceLayer);
                assert_eq!(c.params[1], ParamValue::Int(1));
                assert!(c.substrate().is_some());
                assert_eq!(tree_components(&c), 2);
            }
            _ => panic!("expected a component"),
        }
    }

    fn tree_components(c: &ClosureComponent) -> usize {
        ClosureTree::Component(c.clone()).num_components()
    }

    #[test]
    fn null_substrate() {
        let tree = parse(
            "as_alsurface_layer(null, 0, vector(0,0,1), vector(0), color(1), 0.1, 0, 0, 1.5, color(0.9), color(0.1))",
        )
        .expect("tree");
        assert_eq!(tree.num_components(), 1);
    }

    #[test]
    fn type_errors() {
        assert!(parse("diffuse(1)").unwrap_err().contains("parameter 'N' expects vector"));
        assert!(parse("diffuse()").unwrap_err().contains("expects 1 arguments"));
        assert!(parse("lambert(vector(0,0,1))").unwrap_err().contains("Unknown closure"));
        assert!(parse("0.5 * 2").unwrap_err().contains("has no closure"));
        assert!(parse("emission() * emission()").unwrap_err().contains("Product of two closures"));
        assert!(parse("emission(").is_err());
    }

    #[test]
    fn comments_and_groups() {
        let tree = parse("2 * (emission() + background()) # lamp").expect("tree");
        assert_eq!(tree.num_components(), 2);
        assert_eq!(process_background_tree(&tree), Spectrum::new(2.0));
    }
}
