//! Decoding that keeps duplicate mapping keys
//!
//! `serde_json::Value` keeps only the last of two equal keys, which would
//! hide a second definition of the same entity. [`Decoded`] keeps every
//! key of a mapping in file order so the engine can report the duplicate.

use std::fmt;
use std::marker::PhantomData;

use agentcfg_core::Section;
use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::Value;

/// A decoded node whose mapping entries are all kept
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<V> {
    /// A mapping, in file order, duplicate keys included
    Mapping(Vec<(String, V)>),
    /// Anything that is not a mapping
    Other(Value),
}

impl Decoded<Value> {
    /// View this node as one section of a combined document.
    pub fn into_section(self) -> Section {
        match self {
            Decoded::Mapping(entries) => Section::Entries(entries),
            Decoded::Other(value) => Section::Value(value),
        }
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Decoded<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DecodedVisitor(PhantomData))
    }
}

struct DecodedVisitor<V>(PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for DecodedVisitor<V> {
    type Value = Decoded<V>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a configuration value")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, V>()? {
            entries.push((key, value));
        }
        Ok(Decoded::Mapping(entries))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element::<Value>()? {
            items.push(item);
        }
        Ok(Decoded::Other(Value::Array(items)))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Self::Value, E> {
        Ok(Decoded::Other(Value::Bool(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(Decoded::Other(Value::from(v)))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Decoded::Other(Value::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(Decoded::Other(Value::from(v)))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(Decoded::Other(Value::String(v.to_string())))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Decoded::Other(Value::Null))
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Decoded::Other(Value::Null))
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        Decoded::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_json_duplicates_are_kept() {
        let decoded: Decoded<Value> =
            serde_json::from_str(r#"{"m": {"provider": "a"}, "m": {"provider": "b"}}"#).unwrap();
        assert_eq!(
            decoded,
            Decoded::Mapping(vec![
                ("m".to_string(), json!({"provider": "a"})),
                ("m".to_string(), json!({"provider": "b"})),
            ])
        );
    }

    #[test]
    fn test_yaml_duplicates_are_kept() {
        let decoded: Decoded<Value> =
            serde_yaml::from_str("m:\n  provider: a\nm:\n  provider: b\n").unwrap();
        match decoded {
            Decoded::Mapping(entries) => assert_eq!(entries.len(), 2),
            other => panic!("expected a mapping, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_sections() {
        let decoded: Decoded<Decoded<Value>> = serde_json::from_str(
            r#"{"version": "1.0", "models": {"m": {}, "m": {}}}"#,
        )
        .unwrap();
        let Decoded::Mapping(sections) = decoded else {
            panic!("expected a mapping");
        };
        assert_eq!(sections[0].1, Decoded::Other(json!("1.0")));
        assert!(matches!(&sections[1].1, Decoded::Mapping(e) if e.len() == 2));
    }

    #[test]
    fn test_non_mapping_is_other() {
        let decoded: Decoded<Value> = serde_yaml::from_str("- a\n- b\n").unwrap();
        assert_eq!(decoded, Decoded::Other(json!(["a", "b"])));
    }
}
