use crate::ast::go::{BasicLit, CompositeLit, Expr, UnaryOp};

/// Key of a `Key: value` element when it is a plain identifier
pub fn key_as_identifier(expr: &Expr) -> Option<&str> {
    match expr {
        Expr::KeyValue { key, .. } => key.as_ident(),
        _ => None,
    }
}

/// Value of a `Key: value` element when it is a basic literal.
///
/// A signed number such as `-1` is a unary expression and does not match.
pub fn value_as_basic_literal(expr: &Expr) -> Option<&BasicLit> {
    match expr {
        Expr::KeyValue { value, .. } => match value.as_ref() {
            Expr::BasicLit(lit) => Some(lit),
            _ => None,
        },
        _ => None,
    }
}

/// Value of a `Key: value` element when it is `T{...}` or `&T{...}`
pub fn value_as_composite_literal(expr: &Expr) -> Option<&CompositeLit> {
    match expr {
        Expr::KeyValue { value, .. } => composite_literal(value),
        _ => None,
    }
}

pub fn value_as_composite_literal_mut(expr: &mut Expr) -> Option<&mut CompositeLit> {
    match expr {
        Expr::KeyValue { value, .. } => composite_literal_mut(value),
        _ => None,
    }
}

/// `T{...}` or `&T{...}`
pub fn composite_literal(expr: &Expr) -> Option<&CompositeLit> {
    match expr {
        Expr::CompositeLit(lit) => Some(lit),
        Expr::Unary { op: UnaryOp::And, x } => composite_literal(x),
        _ => None,
    }
}

pub fn composite_literal_mut(expr: &mut Expr) -> Option<&mut CompositeLit> {
    match expr {
        Expr::CompositeLit(lit) => Some(lit),
        Expr::Unary { op: UnaryOp::And, x } => composite_literal_mut(x),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::{identifier, key_value, string, Builder, Structure};

    #[test]
    fn test_key_as_identifier() {
        assert_eq!(key_as_identifier(&key_value("desc", "valid genesis state")), Some("desc"));
        let selector_key = Expr::key_value(identifier("types.Key"), string("x"));
        assert_eq!(key_as_identifier(&selector_key), None);
        assert_eq!(key_as_identifier(&string("desc")), None);
    }

    #[test]
    fn test_value_as_basic_literal() {
        let pair = key_value("desc", "valid genesis state");
        assert_eq!(value_as_basic_literal(&pair).and_then(BasicLit::unquoted).as_deref(), Some("valid genesis state"));

        let negative = Expr::key_value(Expr::ident("n"), Expr::Unary { op: UnaryOp::Neg, x: Box::new(crate::build::int(1)) });
        assert!(value_as_basic_literal(&negative).is_none());
        assert_eq!(value_as_basic_literal(&key_value("n", 1)).map(|lit| lit.value.as_str()), Some("1"));
        assert!(value_as_basic_literal(&key_value("valid", true)).is_none());
    }

    #[test]
    fn test_value_as_composite_literal_through_address() {
        let mut pair = Expr::key_value(Expr::ident("genState"), Structure::named("types.GenesisState").address_of());
        assert!(value_as_composite_literal(&pair).is_some());

        let lit = value_as_composite_literal_mut(&mut pair).unwrap();
        lit.push(key_value("PostCount", 2));
        assert_eq!(value_as_composite_literal(&pair).map(|lit| lit.elts.len()), Some(1));
        assert!(value_as_composite_literal(&key_value("x", Structure::anonymous().build())).is_some());
    }
}
