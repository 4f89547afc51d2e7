//! Personality registry — the fixed table of persona name → system prompt.
//!
//! The registry is injected configuration: deployments (and tests) construct
//! it explicitly instead of relying on hardcoded module state. Lookups are
//! case-insensitive; canonical names are lowercase.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// A chat personality: a name plus the prompt that seeds its behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct Persona {
    pub name: String,
    pub prompt: String,
}

impl Persona {
    pub fn new(name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            name: name.into().to_ascii_lowercase(),
            prompt: prompt.into(),
        }
    }
}

/// Registry of available personalities.
///
/// `guidance` is a shared narrative-style suffix appended to every persona
/// prompt when composing the system instruction.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
    guidance: String,
}

impl PersonaRegistry {
    pub fn new(personas: Vec<Persona>, guidance: impl Into<String>) -> Self {
        let personas = personas
            .into_iter()
            .map(|p| Persona::new(p.name, p.prompt))
            .collect();
        Self {
            personas,
            guidance: guidance.into(),
        }
    }

    /// The built-in default personas.
    pub fn builtin(guidance: impl Into<String>) -> Self {
        Self::new(
            vec![
                Persona::new(
                    "daniel",
                    "You are Daniel, a 40 year old man who is knowledgeable, smart, and has \
                     a fun personality. Your revenge stories are focused more on real life \
                     or in person revenge.",
                ),
                Persona::new(
                    "harry",
                    "You are Harry, a 25 year old man who is a streamer who is knowledgeable, \
                     smart, enthusiastic, and curious. Your revenge stories are focused more \
                     on online internet revenge.",
                ),
                Persona::new(
                    "jessica",
                    "You are Jessica, a 30 year old female who is caring, empathetic, a good \
                     listener and provide thoughtful responses. Your revenge stories are \
                     focused more on real life or in person revenge.",
                ),
            ],
            guidance,
        )
    }

    /// Load personas from a JSON file: an array of `{name, prompt}` objects.
    pub fn from_json_file(path: &Path, guidance: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::PersonaFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let personas: Vec<Persona> =
            serde_json::from_str(&raw).map_err(|e| ConfigError::PersonaFile {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        Ok(Self::new(personas, guidance))
    }

    /// Build the registry from the environment: `PERSONA_CONFIG` optionally
    /// points at a JSON persona file, `PERSONA_GUIDANCE` supplies the shared
    /// suffix (empty when unset).
    pub fn from_env() -> Result<Self, ConfigError> {
        let guidance = std::env::var("PERSONA_GUIDANCE").unwrap_or_default();
        match std::env::var("PERSONA_CONFIG") {
            Ok(path) => Self::from_json_file(Path::new(&path), guidance),
            Err(_) => Ok(Self::builtin(guidance)),
        }
    }

    /// Case-insensitive lookup.
    pub fn find(&self, name: &str) -> Option<&Persona> {
        self.personas
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }

    /// The composed system instruction for a persona: its prompt plus the
    /// shared guidance suffix.
    pub fn system_instruction(&self, persona: &Persona) -> String {
        format!("{}{}", persona.prompt, self.guidance)
    }

    /// Canonical names of all registered personas.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.personas.iter().map(|p| p.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn find_is_case_insensitive() {
        let registry = PersonaRegistry::builtin("");
        assert_eq!(registry.find("daniel").unwrap().name, "daniel");
        assert_eq!(registry.find("DANIEL").unwrap().name, "daniel");
        assert_eq!(registry.find("Harry").unwrap().name, "harry");
        assert!(registry.find("martha").is_none());
    }

    #[test]
    fn names_are_canonicalized_to_lowercase() {
        let registry = PersonaRegistry::new(vec![Persona::new("Mixed", "prompt")], "");
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["mixed"]);
        assert!(registry.find("mIxEd").is_some());
    }

    #[test]
    fn system_instruction_appends_guidance() {
        let registry = PersonaRegistry::new(
            vec![Persona::new("solo", "Base prompt.")],
            " Shared guidance.",
        );
        let persona = registry.find("solo").unwrap();
        assert_eq!(
            registry.system_instruction(persona),
            "Base prompt. Shared guidance."
        );
    }

    #[test]
    fn from_json_file_loads_personas() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "Alice", "prompt": "You are Alice."}}]"#
        )
        .unwrap();

        let registry = PersonaRegistry::from_json_file(file.path(), "").unwrap();
        assert_eq!(registry.find("alice").unwrap().prompt, "You are Alice.");
    }

    #[test]
    fn from_json_file_rejects_bad_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let err = PersonaRegistry::from_json_file(file.path(), "").unwrap_err();
        assert!(matches!(err, ConfigError::PersonaFile { .. }));
    }
}
