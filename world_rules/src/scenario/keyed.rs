//! Serde adapter for id-keyed tables that must keep declaration order.
//!
//! Scenario files write rules as `id -> body` maps, but the engine evaluates
//! them in the order the author declared them. Entries are collected into a
//! `Vec` while the map is visited, with the key copied into the entry. A plain
//! list of entries carrying their own ids is accepted too.

use serde::de::{MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

/// Entries that know their own map key.
pub trait Keyed {
    fn key(&self) -> &str;
    fn set_key(&mut self, key: String);
}

pub fn serialize<S, T>(entries: &[T], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize + Keyed,
{
    serializer.collect_map(entries.iter().map(|entry| (entry.key(), entry)))
}

pub fn deserialize<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Keyed,
{
    deserializer.deserialize_any(KeyedVisitor(PhantomData))
}

struct KeyedVisitor<T>(PhantomData<T>);

impl<'de, T> Visitor<'de> for KeyedVisitor<T>
where
    T: Deserialize<'de> + Keyed,
{
    type Value = Vec<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a table of id to entry, or a list of entries with ids")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, mut entry)) = map.next_entry::<String, T>()? {
            entry.set_key(key);
            entries.push(entry);
        }
        Ok(entries)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut entries = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(entry) = seq.next_element::<T>()? {
            entries.push(entry);
        }
        Ok(entries)
    }
}
