//! The flattened, access-scoped entity graph for one evaluation.

use std::sync::OnceLock;

use chainwave_model::{
    ChainBinding, Instrument, InstrumentId, InstrumentKind, LibraryContent, Program, ProgramId,
    ProgramType,
};

use crate::digest::{
    ChordMarkovDigest, ChordProgressionDigest, MemeDigest, SequenceStyleDigest,
};
use crate::store::AccessScope;

/// The flattened set of entities reachable from a collection of chain
/// bindings, as of one evaluation. Immutable once built.
///
/// Digest slots are lazily initialized and live exactly as long as the
/// Ingest; they are never re-validated against the source library, so their
/// staleness is bounded by the Ingest's own cache TTL.
#[derive(Debug)]
pub struct Ingest {
    cache_key: String,
    content: LibraryContent,
    meme_digest: OnceLock<MemeDigest>,
    progression_digest: OnceLock<ChordProgressionDigest>,
    markov_digest: OnceLock<ChordMarkovDigest>,
    style_digest: OnceLock<SequenceStyleDigest>,
}

impl Ingest {
    /// Deterministic cache key for a scope and binding set: the scope's
    /// canonical form joined with the sorted binding identifiers, so
    /// binding order and duplication never change the key.
    pub fn cache_key(scope: &AccessScope, bindings: &[ChainBinding]) -> String {
        let mut keys: Vec<(u8, u64)> = bindings.iter().map(ChainBinding::sort_key).collect();
        keys.sort_unstable();
        keys.dedup();
        let ids: Vec<String> = keys
            .iter()
            .map(|(kind, id)| {
                let tag = match kind {
                    0 => 'L',
                    1 => 'P',
                    _ => 'I',
                };
                format!("{tag}{id}")
            })
            .collect();
        format!("{}|{}", scope.canonical(), ids.join(","))
    }

    /// Builds an Ingest from already-loaded content.
    pub fn from_content(
        scope: &AccessScope,
        bindings: &[ChainBinding],
        content: LibraryContent,
    ) -> Self {
        Self {
            cache_key: Self::cache_key(scope, bindings),
            content,
            meme_digest: OnceLock::new(),
            progression_digest: OnceLock::new(),
            markov_digest: OnceLock::new(),
            style_digest: OnceLock::new(),
        }
    }

    /// The key this Ingest is cached under.
    pub fn key(&self) -> &str {
        &self.cache_key
    }

    /// All programs in scope.
    pub fn programs(&self) -> &[Program] {
        &self.content.programs
    }

    /// All instruments in scope.
    pub fn instruments(&self) -> &[Instrument] {
        &self.content.instruments
    }

    /// Programs filling one role.
    pub fn programs_of_type(&self, program_type: ProgramType) -> Vec<&Program> {
        self.content
            .programs
            .iter()
            .filter(|p| p.program_type == program_type)
            .collect()
    }

    /// Instruments of one sonic family.
    pub fn instruments_of_kind(&self, kind: InstrumentKind) -> Vec<&Instrument> {
        self.content
            .instruments
            .iter()
            .filter(|i| i.kind == kind)
            .collect()
    }

    /// Resolves a program by id.
    pub fn program(&self, id: ProgramId) -> Option<&Program> {
        self.content.programs.iter().find(|p| p.id == id)
    }

    /// Resolves an instrument by id.
    pub fn instrument(&self, id: InstrumentId) -> Option<&Instrument> {
        self.content.instruments.iter().find(|i| i.id == id)
    }

    /// Content hash fingerprint: blake3 over the canonical JSON of all
    /// contained entities.
    ///
    /// Always recomputed rather than cached so it reflects the absolute
    /// latest `updated_at` stamps of the contained entities.
    pub fn hash_of(&self) -> String {
        let canonical = serde_json::to_string(&self.content)
            .unwrap_or_else(|_| String::from("unserializable"));
        blake3::hash(canonical.as_bytes()).to_hex().to_string()
    }

    /// Meme usage histogram; computed once per Ingest.
    pub fn memes_of(&self) -> &MemeDigest {
        self.meme_digest
            .get_or_init(|| MemeDigest::compute(&self.content))
    }

    /// Chord progression statistics; computed once per Ingest.
    pub fn chord_progression_of(&self) -> &ChordProgressionDigest {
        self.progression_digest
            .get_or_init(|| ChordProgressionDigest::compute(&self.content))
    }

    /// Chord transition (Markov) counts; computed once per Ingest.
    pub fn chord_markov_of(&self) -> &ChordMarkovDigest {
        self.markov_digest
            .get_or_init(|| ChordMarkovDigest::compute(&self.content))
    }

    /// Sequence tempo/density statistics; computed once per Ingest.
    pub fn sequence_style_of(&self) -> &SequenceStyleDigest {
        self.style_digest
            .get_or_init(|| SequenceStyleDigest::compute(&self.content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainwave_model::{ChainBinding, InstrumentId, LibraryId, ProgramId};

    fn scope() -> AccessScope {
        AccessScope::new("account-1")
    }

    #[test]
    fn cache_key_is_order_insensitive() {
        let a = Ingest::cache_key(
            &scope(),
            &[
                ChainBinding::library(LibraryId(2)),
                ChainBinding::program(ProgramId(7)),
                ChainBinding::instrument(InstrumentId(3)),
            ],
        );
        let b = Ingest::cache_key(
            &scope(),
            &[
                ChainBinding::instrument(InstrumentId(3)),
                ChainBinding::library(LibraryId(2)),
                ChainBinding::program(ProgramId(7)),
            ],
        );
        assert_eq!(a, b);
        assert_eq!(a, "account-1|L2,P7,I3");
    }

    #[test]
    fn cache_key_differs_by_scope() {
        let bindings = [ChainBinding::library(LibraryId(1))];
        let a = Ingest::cache_key(&AccessScope::new("a"), &bindings);
        let b = Ingest::cache_key(&AccessScope::new("b"), &bindings);
        assert_ne!(a, b);
    }

    #[test]
    fn hash_reflects_content_updates() {
        let bindings = [ChainBinding::library(LibraryId(1))];
        let mut content = LibraryContent::default();
        content.libraries.push(chainwave_model::Library {
            id: LibraryId(1),
            name: "L".into(),
            updated_at: 0,
        });
        let before = Ingest::from_content(&scope(), &bindings, content.clone()).hash_of();
        content.libraries[0].updated_at = 99;
        let after = Ingest::from_content(&scope(), &bindings, content).hash_of();
        assert_ne!(before, after);
    }
}
