use std::fmt;

/// A target artifact's final on-disk name, split into base name and extension.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FileName {
    pub base_name: String,
    /// Either empty, or the extension with or without its leading dot.
    pub extension: String,
}

impl FileName {
    pub fn new(base_name: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            extension: extension.into(),
        }
    }

    /// Splits on the last dot of the final path element, keeping the dot
    /// with the extension (`"checksums.txt"` -> `"checksums"`, `".txt"`).
    pub fn parse(s: &str) -> Self {
        let last = s.rsplit('/').next().unwrap_or(s);
        match last.rfind('.') {
            Some(idx) => {
                let split = s.len() - last.len() + idx;
                Self::new(&s[..split], &s[split..])
            }
            None => Self::new(s, ""),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.base_name.is_empty() && self.extension.is_empty()
    }
}

impl fmt::Display for FileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.extension.is_empty() {
            return f.write_str(&self.base_name);
        }
        let joiner = if self.extension.starts_with('.') { "" } else { "." };
        write!(f, "{}{}{}", self.base_name, joiner, self.extension)
    }
}
