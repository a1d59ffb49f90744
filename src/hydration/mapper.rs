//! Input key resolution

use serde_json::{Map, Value};

use crate::context::{Context, Direction};
use crate::metadata::FieldMeta;

/// Where a field's value was looked up, and what was found there
#[derive(Debug, Clone, PartialEq)]
pub struct Mapped<'a> {
    /// Effective input key, reported in missing-key errors
    pub key: String,
    pub value: Option<&'a Value>,
}

/// Resolves which input key feeds each field.
///
/// A `source_key` wins; when it contains dots and no key with that exact name exists,
/// it is followed as a path through nested maps. Without a `source_key` the field
/// name is converted with the naming strategy (outbound). If that key is absent, any
/// input key whose inbound conversion yields the field name is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mapper;

impl Mapper {
    /// Input key a field is read from
    pub fn input_key(field: &FieldMeta, ctx: &Context) -> String {
        match &field.source_key {
            Some(key) => key.clone(),
            None => ctx.naming().convert(&field.name, Direction::Outbound),
        }
    }

    pub fn resolve<'a>(
        field: &FieldMeta,
        input: &'a Map<String, Value>,
        ctx: &Context,
    ) -> Mapped<'a> {
        let key = Self::input_key(field, ctx);

        if field.source_key.is_some() {
            let value = input.get(&key).or_else(|| lookup_path(input, &key));
            return Mapped { key, value };
        }

        let value = input.get(&key).or_else(|| {
            input
                .iter()
                .find(|(candidate, _)| {
                    ctx.naming().convert(candidate, Direction::Inbound) == field.name
                })
                .map(|(_, value)| value)
        });
        Mapped { key, value }
    }
}

fn lookup_path<'a>(input: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    if !path.contains('.') {
        return None;
    }
    let mut segments = path.split('.');
    let mut current = input.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CamelCaseNaming;
    use crate::metadata::TypeDescriptor;
    use serde_json::json;

    fn input(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("test input must be an object"),
        }
    }

    #[test]
    fn test_source_key_wins() {
        let field = FieldMeta::new("email", TypeDescriptor::string()).map_from("email_address");
        let data = input(json!({ "email": "wrong@x.io", "email_address": "ada@x.io" }));
        let mapped = Mapper::resolve(&field, &data, &Context::default());
        assert_eq!(mapped.key, "email_address");
        assert_eq!(mapped.value, Some(&json!("ada@x.io")));
    }

    #[test]
    fn test_dotted_source_key() {
        let field =
            FieldMeta::new("email", TypeDescriptor::string()).map_from("profile.contact.email");
        let data = input(json!({ "profile": { "contact": { "email": "ada@x.io" } } }));
        let mapped = Mapper::resolve(&field, &data, &Context::default());
        assert_eq!(mapped.value, Some(&json!("ada@x.io")));

        let exact = input(json!({ "profile.contact.email": "flat@x.io" }));
        assert_eq!(
            Mapper::resolve(&field, &exact, &Context::default()).value,
            Some(&json!("flat@x.io"))
        );

        let missing = input(json!({ "profile": { "contact": "none" } }));
        assert_eq!(Mapper::resolve(&field, &missing, &Context::default()).value, None);
    }

    #[test]
    fn test_naming_strategy_and_inbound_fallback() {
        let field = FieldMeta::new("created_at", TypeDescriptor::datetime());
        let ctx = Context::default().with_naming(CamelCaseNaming);

        let camel = input(json!({ "createdAt": "2024-01-01T00:00:00Z" }));
        let mapped = Mapper::resolve(&field, &camel, &ctx);
        assert_eq!(mapped.key, "createdAt");
        assert!(mapped.value.is_some());

        // "CreatedAt" is not the outbound key but converts back to the field name
        let pascal = input(json!({ "CreatedAt": "2024-01-01T00:00:00Z" }));
        assert!(Mapper::resolve(&field, &pascal, &ctx).value.is_some());

        let absent = input(json!({ "updatedAt": "2024-01-01T00:00:00Z" }));
        let mapped = Mapper::resolve(&field, &absent, &ctx);
        assert_eq!(mapped.key, "createdAt");
        assert!(mapped.value.is_none());
    }
}
