//! Process-wide registry of embed kinds
//!
//! Custom block embeds (the page-break marker first among them) must be
//! registered before an engine accepts them. Registration is
//! register-if-absent: repeating it is harmless and reports that the kind
//! was already known.

use std::collections::BTreeMap;
use std::sync::{OnceLock, PoisonError, RwLock};

pub const PAGE_BREAK: &str = "page-break";
pub const IMAGE: &str = "image";
pub const VIDEO: &str = "video";

/// Description of an embed kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedSpec {
    /// Registry key, e.g. `page-break`
    pub name: &'static str,
    /// Markup tag used when the embed is exported
    pub tag: &'static str,
    /// CSS class carried by the exported element
    pub class: &'static str,
}

/// Outcome of a registration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Inserted,
    AlreadyRegistered,
}

#[derive(Debug, Default)]
pub struct EmbedRegistry {
    specs: RwLock<BTreeMap<&'static str, EmbedSpec>>,
}

static GLOBAL: OnceLock<EmbedRegistry> = OnceLock::new();

impl EmbedRegistry {
    /// Empty registry, without the built-in kinds
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, initialised once with the built-in kinds
    pub fn global() -> &'static EmbedRegistry {
        GLOBAL.get_or_init(|| {
            let registry = EmbedRegistry::new();
            registry.register_builtins();
            registry
        })
    }

    /// Register page-break, image and video
    pub fn register_builtins(&self) {
        for spec in [
            EmbedSpec {
                name: PAGE_BREAK,
                tag: "div",
                class: "page-break",
            },
            EmbedSpec {
                name: IMAGE,
                tag: "img",
                class: "embed-image",
            },
            EmbedSpec {
                name: VIDEO,
                tag: "p",
                class: "embed-video",
            },
        ] {
            self.register_if_absent(spec);
        }
    }

    /// Insert a spec unless one with the same name exists. An existing
    /// registration is never overwritten.
    pub fn register_if_absent(&self, spec: EmbedSpec) -> Registration {
        let mut specs = self.specs.write().unwrap_or_else(PoisonError::into_inner);
        if specs.contains_key(spec.name) {
            return Registration::AlreadyRegistered;
        }
        specs.insert(spec.name, spec);
        Registration::Inserted
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.specs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<EmbedSpec> {
        self.specs
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.specs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
