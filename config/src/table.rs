//! Nested key/value tables.
//!
//! The interface boundary to the declarative-config parser: the compiler and
//! the generator registry only ever see [`Table`] values, never the file
//! format they came from. Entries keep insertion order, which is the order
//! spawn entries and properties are compiled in.

use reflect::Float3;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Table(Table),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    entries: Vec<(String, Value)>,
}

impl Table {
    pub fn new() -> Self {
        Table::default()
    }

    pub fn insert(&mut self, key: &str, value: Value) {
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value,
            None => self.entries.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn sub_table(&self, key: &str) -> Option<&Table> {
        match self.get(key) {
            Some(Value::Table(t)) => Some(t),
            _ => None,
        }
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::Int(i)) => *i != 0,
            _ => default,
        }
    }

    pub fn get_int(&self, key: &str, default: i32) -> i32 {
        match self.get(key) {
            Some(Value::Int(i)) => *i as i32,
            Some(Value::Float(f)) => *f as i32,
            _ => default,
        }
    }

    pub fn get_float(&self, key: &str, default: f32) -> f32 {
        match self.get(key) {
            Some(Value::Float(f)) => *f as f32,
            Some(Value::Int(i)) => *i as f32,
            _ => default,
        }
    }

    pub fn get_string(&self, key: &str, default: &str) -> String {
        match self.get(key) {
            Some(Value::Str(s)) => s.clone(),
            _ => default.to_string(),
        }
    }

    /// A three-component vector written as a list of numbers. Short or
    /// non-numeric lists fall back to the default.
    pub fn get_float3(&self, key: &str, default: Float3) -> Float3 {
        let list = match self.get(key) {
            Some(Value::List(l)) => l,
            _ => return default,
        };
        let mut out = [0.0f32; 3];
        if list.len() < 3 {
            return default;
        }
        for (slot, v) in out.iter_mut().zip(list.iter()) {
            *slot = match v {
                Value::Float(f) => *f as f32,
                Value::Int(i) => *i as f32,
                _ => return default,
            };
        }
        Float3::from(out)
    }

    /// The string-valued entries of this table, in order. This is how a
    /// spawn entry's `properties` block is consumed.
    pub fn string_entries(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| match v {
                Value::Str(s) => Some((k.clone(), s.clone())),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_and_coercions() {
        let mut t = Table::new();
        t.insert("count", Value::Int(3));
        t.insert("size", Value::Float(2.5));
        t.insert("ground", Value::Bool(true));

        assert_eq!(t.get_int("count", 1), 3);
        assert_eq!(t.get_int("missing", 1), 1);
        assert_eq!(t.get_float("count", 0.0), 3.0);
        assert_eq!(t.get_float("size", 0.0), 2.5);
        assert!(t.get_bool("ground", false));
        assert!(!t.get_bool("water", false));
    }

    #[test]
    fn float3_needs_three_numbers() {
        let mut t = Table::new();
        t.insert(
            "color",
            Value::List(vec![Value::Float(1.0), Value::Float(0.5), Value::Int(0)]),
        );
        t.insert("short", Value::List(vec![Value::Float(1.0)]));

        let d = Float3::new(1.0, 1.0, 0.8);
        assert_eq!(t.get_float3("color", d), Float3::new(1.0, 0.5, 0.0));
        assert_eq!(t.get_float3("short", d), d);
        assert_eq!(t.get_float3("missing", d), d);
    }

    #[test]
    fn insertion_order_is_kept() {
        let mut t = Table::new();
        t.insert("b", Value::Int(1));
        t.insert("a", Value::Int(2));
        let keys: Vec<&str> = t.keys().collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
