use std::collections::HashMap;

/// Name aliasing for effect classes and generator kinds. Aliases chain
/// (`a -> b -> c`) and resolution follows the chain to its end.
#[derive(Debug, Default, Clone)]
pub struct AliasList {
    aliases: HashMap<String, String>,
}

impl AliasList {
    pub fn new() -> Self {
        AliasList::default()
    }

    pub fn clear(&mut self) {
        self.aliases.clear();
    }

    pub fn load<I>(&mut self, entries: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.aliases.extend(entries);
    }

    /// Follow the alias chain from `name` to a concrete name. A name with no
    /// alias resolves to itself. Cycles terminate at the first repeat.
    pub fn resolve(&self, name: &str) -> String {
        let mut seen: Vec<&str> = Vec::new();
        let mut cur = name;
        while let Some(next) = self.aliases.get(cur) {
            if seen.contains(&next.as_str()) {
                break;
            }
            seen.push(cur);
            cur = next;
        }
        cur.to_string()
    }

    /// Reverse lookup: the alias that maps to `name`, or `name` itself.
    pub fn find_alias(&self, name: &str) -> String {
        self.aliases
            .iter()
            .find(|(_, v)| v.as_str() == name)
            .map(|(k, _)| k.clone())
            .unwrap_or_else(|| name.to_string())
    }
}
