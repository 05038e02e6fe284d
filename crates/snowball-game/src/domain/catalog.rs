//! Scenario catalog: the read-only content every round is dealt from.

use std::fmt::Write as _;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use snowball_core::error::DomainError;
use snowball_core::rng::DeterministicRng;
use thiserror::Error;

const BUILTIN_CATALOG: &str = include_str!("../../catalog/default.yaml");

/// One scene the narrator describes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Short label used in logs.
    pub name: String,
    /// Whether the correct response is to throw.
    pub requires_reaction: bool,
    /// How long the players have before the timer reports a timeout.
    pub timeout_ms: u32,
    /// Narration that sets the scene.
    pub prompt: String,
    /// Narration when the players respond correctly.
    pub success_text: String,
    /// Narration when they get it wrong.
    pub failure_text: String,
}

/// A scenario reference as stored in the session stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealtScenario {
    /// Position in the catalog.
    pub index: usize,
    /// Copied from the scenario so judging never needs the catalog.
    pub requires_reaction: bool,
}

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog file could not be read.
    #[error("failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog file is not valid YAML for the expected shape.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] serde_yaml::Error),

    /// The catalog contains no scenarios.
    #[error("catalog has no scenarios")]
    Empty,

    /// The catalog has more scenarios than an index draw can address.
    #[error("catalog has {0} scenarios, more than can be dealt")]
    TooLarge(usize),

    /// A scenario is missing one of its narration fields.
    #[error("scenario '{name}' has an empty {field}")]
    MissingText {
        /// Scenario name (or its position when the name is blank).
        name: String,
        /// The empty field.
        field: &'static str,
    },

    /// A scenario has a zero timeout.
    #[error("scenario '{0}' has a zero timeout")]
    ZeroTimeout(String),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    scenarios: Vec<Scenario>,
}

/// Validated, immutable list of scenarios plus a digest of its content.
#[derive(Debug, Clone)]
pub struct ScenarioCatalog {
    scenarios: Vec<Scenario>,
    digest: String,
}

impl ScenarioCatalog {
    /// Builds a catalog from scenarios, validating each entry.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the list is empty or too large, or any
    /// scenario has a blank narration field or a zero timeout.
    pub fn new(scenarios: Vec<Scenario>) -> Result<Self, CatalogError> {
        if scenarios.is_empty() {
            return Err(CatalogError::Empty);
        }
        if u32::try_from(scenarios.len()).is_err() {
            return Err(CatalogError::TooLarge(scenarios.len()));
        }
        for (position, scenario) in scenarios.iter().enumerate() {
            validate(position, scenario)?;
        }
        let digest = digest_of(&scenarios);
        Ok(Self { scenarios, digest })
    }

    /// Parses a catalog from YAML of the form `scenarios: [...]`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` on malformed YAML, or any validation error
    /// from [`ScenarioCatalog::new`].
    pub fn from_yaml_str(source: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(source)?;
        Self::new(file.scenarios)
    }

    /// Reads and parses a YAML catalog file.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Io` if the file cannot be read, otherwise as
    /// [`ScenarioCatalog::from_yaml_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&source)
    }

    /// The catalog compiled into the crate.
    ///
    /// # Errors
    ///
    /// Only if the bundled YAML is broken, which the tests guard against.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_CATALOG)
    }

    /// Number of scenarios.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Always false for a validated catalog.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Hex SHA-256 of the catalog content.
    #[must_use]
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Looks up a scenario by index.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Scenario> {
        self.scenarios.get(index)
    }

    /// Looks up a dealt scenario.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the index is outside the catalog,
    /// which means the session was recorded against different content.
    pub fn scenario(&self, dealt: DealtScenario) -> Result<&Scenario, DomainError> {
        self.get(dealt.index).ok_or_else(|| {
            DomainError::Validation(format!(
                "scenario index {} is outside the catalog of {}",
                dealt.index,
                self.len()
            ))
        })
    }

    /// The scenario every game opens with.
    #[must_use]
    pub fn opening(&self) -> DealtScenario {
        self.deal(0)
    }

    /// Draws the next scenario uniformly over the whole catalog. The scenario
    /// just played may come up again.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the RNG cannot produce an index.
    pub fn draw(&self, rng: &mut dyn DeterministicRng) -> Result<DealtScenario, DomainError> {
        let index = rng.next_index(self.len()).ok_or_else(|| {
            DomainError::Infrastructure("rng could not draw a scenario index".to_owned())
        })?;
        Ok(self.deal(index))
    }

    fn deal(&self, index: usize) -> DealtScenario {
        DealtScenario {
            index,
            requires_reaction: self.scenarios[index].requires_reaction,
        }
    }
}

fn validate(position: usize, scenario: &Scenario) -> Result<(), CatalogError> {
    let name = if scenario.name.trim().is_empty() {
        format!("#{position}")
    } else {
        scenario.name.clone()
    };
    let fields = [
        ("prompt", &scenario.prompt),
        ("success_text", &scenario.success_text),
        ("failure_text", &scenario.failure_text),
    ];
    for (field, text) in fields {
        if text.trim().is_empty() {
            return Err(CatalogError::MissingText { name, field });
        }
    }
    if scenario.timeout_ms == 0 {
        return Err(CatalogError::ZeroTimeout(name));
    }
    Ok(())
}

fn digest_of(scenarios: &[Scenario]) -> String {
    let mut hasher = Sha256::new();
    for scenario in scenarios {
        let texts = [
            &scenario.name,
            &scenario.prompt,
            &scenario.success_text,
            &scenario.failure_text,
        ];
        for text in texts {
            hasher.update(text.as_bytes());
            hasher.update([0u8]);
        }
        hasher.update([u8::from(scenario.requires_reaction)]);
        hasher.update(scenario.timeout_ms.to_le_bytes());
    }
    hasher
        .finalize()
        .iter()
        .fold(String::with_capacity(64), |mut hex, byte| {
            let _ = write!(hex, "{byte:02x}");
            hex
        })
}
