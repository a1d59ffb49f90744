//! Naming strategies between declared field names and external keys

use std::fmt;

use serde::{Deserialize, Serialize};

/// Conversion direction of a naming strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Declared field name → input/output key
    Outbound,
    /// Input key → declared field name
    Inbound,
}

/// Converts names between the declared and the external convention
pub trait NamingStrategy: Send + Sync + fmt::Debug {
    fn convert(&self, name: &str, direction: Direction) -> String;
}

/// Keys are the declared names
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNaming;

impl NamingStrategy for IdentityNaming {
    fn convert(&self, name: &str, _direction: Direction) -> String {
        name.to_string()
    }
}

/// External keys are camelCase, declared names snake_case
#[derive(Debug, Clone, Copy, Default)]
pub struct CamelCaseNaming;

impl NamingStrategy for CamelCaseNaming {
    fn convert(&self, name: &str, direction: Direction) -> String {
        match direction {
            Direction::Outbound => to_camel_case(name),
            Direction::Inbound => to_snake_case(name),
        }
    }
}

/// External keys are snake_case, declared names camelCase
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCaseNaming;

impl NamingStrategy for SnakeCaseNaming {
    fn convert(&self, name: &str, direction: Direction) -> String {
        match direction {
            Direction::Outbound => to_snake_case(name),
            Direction::Inbound => to_camel_case(name),
        }
    }
}

/// Built-in naming conventions, selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingConvention {
    #[default]
    Identity,
    Camel,
    Snake,
}

impl NamingConvention {
    pub fn strategy(&self) -> std::sync::Arc<dyn NamingStrategy> {
        match self {
            NamingConvention::Identity => std::sync::Arc::new(IdentityNaming),
            NamingConvention::Camel => std::sync::Arc::new(CamelCaseNaming),
            NamingConvention::Snake => std::sync::Arc::new(SnakeCaseNaming),
        }
    }
}

/// `createdAt` / `HTTPStatus` / `created-at` → `created_at` / `http_status` / `created_at`
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c == '-' || c == ' ' || c == '_' {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }
        if c.is_uppercase() {
            let prev = if i > 0 { chars.get(i - 1) } else { None };
            let next = chars.get(i + 1);
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }

    out
}

/// `created_at` / `created-at` → `createdAt`
pub fn to_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;

    for c in name.chars() {
        if c == '_' || c == '-' || c == ' ' {
            upper_next = !out.is_empty();
            continue;
        }
        if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_snake_case() {
        assert_eq!(to_snake_case("createdAt"), "created_at");
        assert_eq!(to_snake_case("emailAddress"), "email_address");
        assert_eq!(to_snake_case("HTTPStatus"), "http_status");
        assert_eq!(to_snake_case("line2Total"), "line2_total");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("kebab-case"), "kebab_case");
        assert_eq!(to_snake_case("id"), "id");
    }

    #[test]
    fn test_to_camel_case() {
        assert_eq!(to_camel_case("created_at"), "createdAt");
        assert_eq!(to_camel_case("email_address"), "emailAddress");
        assert_eq!(to_camel_case("_private"), "private");
        assert_eq!(to_camel_case("alreadyCamel"), "alreadyCamel");
    }

    #[test]
    fn test_strategy_directions() {
        let snake = SnakeCaseNaming;
        assert_eq!(snake.convert("createdAt", Direction::Outbound), "created_at");
        assert_eq!(snake.convert("created_at", Direction::Inbound), "createdAt");

        let camel = CamelCaseNaming;
        assert_eq!(camel.convert("created_at", Direction::Outbound), "createdAt");
        assert_eq!(camel.convert("createdAt", Direction::Inbound), "created_at");

        assert_eq!(IdentityNaming.convert("x_Y", Direction::Inbound), "x_Y");
    }
}
