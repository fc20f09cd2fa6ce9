//! Per-evaluation variable table.

use std::collections::HashMap;

use crate::message::Message;

/// Name → value mapping used while one message is evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarTable {
    vars: HashMap<String, String>,
}

impl VarTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a table from a message: its attributes, then the five scalar
    /// fields (`data`, `dst`, `src`, `type`, `wdir`), which win over an
    /// attribute of the same name.
    pub fn from_message(msg: &Message) -> Self {
        let mut table = Self::new();
        for attr in &msg.attr {
            table.set(&attr.key, &attr.value);
        }
        table.set("data", &msg.data);
        table.set("dst", &msg.dst);
        table.set("src", &msg.src);
        table.set("type", &msg.kind);
        table.set("wdir", &msg.wdir);
        table
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Value of `name`, or the empty string when unbound.
    pub fn value(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for VarTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (k, v) in iter {
            table.set(k, v);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Attribute;

    #[test]
    fn seeds_scalar_fields_and_attributes() {
        let msg = Message {
            attr: vec![
                Attribute {
                    key: "addr".into(),
                    value: "12".into(),
                },
                Attribute {
                    key: "type".into(),
                    value: "spoofed".into(),
                },
            ],
            data: "hello".into(),
            dst: "edit".into(),
            src: "plumb".into(),
            kind: "text".into(),
            wdir: "/tmp".into(),
        };
        let table = VarTable::from_message(&msg);
        assert_eq!(table.get("data"), Some("hello"));
        assert_eq!(table.get("addr"), Some("12"));
        assert_eq!(table.get("type"), Some("text"));
        assert_eq!(table.get("wdir"), Some("/tmp"));
        assert!(!table.contains("arg"));
    }

    #[test]
    fn unbound_value_is_empty() {
        let table = VarTable::new();
        assert_eq!(table.value("missing"), "");
        assert_eq!(table.get("missing"), None);
    }
}
