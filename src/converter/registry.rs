use super::Converter;
use crate::errors::{Error, Result};

/// Factory that yields a fresh converter instance per classification match.
pub type ConverterFactory = Box<dyn Fn() -> Box<dyn Converter> + Send + Sync>;

/// Maps format tokens to converter factories.
///
/// Registration happens once at process start; the registry is then shared
/// immutably (single writer, then many readers). Enumeration order is
/// insertion order, which doubles as the classification tie-break when more
/// than one token appears in a type label.
#[derive(Default)]
pub struct ConverterRegistry {
    entries: Vec<(String, ConverterFactory)>,
}

impl ConverterRegistry {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Installs a factory under a format token. Re-registering an existing
    /// token replaces its factory in place (last registration wins) without
    /// changing the token's position in enumeration order.
    pub fn register<F>(&mut self, token: &str, factory: F)
    where
        F: Fn() -> Box<dyn Converter> + Send + Sync + 'static,
    {
        let token = token.to_lowercase();
        if let Some(entry) = self.entries.iter_mut().find(|(t, _)| *t == token) {
            entry.1 = Box::new(factory);
        } else {
            self.entries.push((token, Box::new(factory)));
        }
    }

    /// Returns a fresh converter for the token.
    pub fn create(&self, token: &str) -> Result<Box<dyn Converter>> {
        let token = token.to_lowercase();
        self.entries
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, factory)| factory())
            .ok_or_else(|| Error::unknown_format(token))
    }

    /// Registered tokens in insertion order.
    pub fn known_formats(&self) -> Vec<&str> {
        self.entries.iter().map(|(t, _)| t.as_str()).collect()
    }

    /// First registered token contained in the (lowercased) type label.
    ///
    /// Substring matching is inherently ambiguous when two tokens both occur
    /// in the label; insertion order is the documented, arbitrary tie-break.
    pub fn match_label(&self, label: &str) -> Option<&str> {
        let label = label.to_lowercase();
        self.entries
            .iter()
            .map(|(t, _)| t.as_str())
            .find(|token| label.contains(*token))
    }
}
