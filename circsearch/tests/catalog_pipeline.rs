//! End-to-end tests: source file on disk → Tantivy index on disk.
//!
//! Component behavior is covered by the inline `#[cfg(test)]` modules. These
//! tests check what a caller of the facade observes:
//!
//! 1. Document counts in the presence of noise and broken trailing blocks
//! 2. Stored field values and the phonetic fingerprint
//! 3. Truncation between runs
//! 4. Startup errors and the malformed-record policy

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use circsearch::ingest::PhoneticFingerprinter;
use circsearch::prelude::*;
use circsearch::{TextNormalizer, fields};
use tantivy::collector::{Count, TopDocs};
use tantivy::query::{AllQuery, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::{Index, TantivyDocument, Term};

// ═══════════════════════════════════════════════════════════════════════════
// Test helpers
// ═══════════════════════════════════════════════════════════════════════════

const GATSBY: &str = r#"<item id="1"><title><value>The Great Gatsby</value></title><isbn><value>123</value></isbn></item>"#;

struct Fixture {
    _dir: tempfile::TempDir,
    source: PathBuf,
    index: PathBuf,
}

fn fixture(source: &str) -> Fixture {
    let dir = tempfile::tempdir().expect("tempdir");
    let source_path = dir.path().join("records.xml");
    std::fs::write(&source_path, source).expect("write source");
    let index = dir.path().join("index");
    Fixture {
        source: source_path,
        index,
        _dir: dir,
    }
}

fn build(fixture: &Fixture) -> IngestStats {
    CatalogIndexBuilder::new(&fixture.source, &fixture.index)
        .build()
        .expect("build index")
}

fn block(id: u32, title: &str) -> String {
    format!(
        "<item id=\"{id}\">\n  <copies><value>{id}</value></copies>\n  <url><value>https://catalog.example/{id}</value></url>\n  <id><value>{id}</value></id>\n  <title><value>{title}</value></title>\n  <isbn><value>978{id}</value></isbn>\n</item>\n"
    )
}

/// Stored documents in index order, as `field -> value` lookups.
fn stored_documents(index_dir: &Path) -> Vec<Vec<(String, String)>> {
    let index = Index::open_in_dir(index_dir).expect("open index");
    let schema = index.schema();
    let searcher = index.reader().expect("reader").searcher();
    let mut hits = searcher
        .search(&AllQuery, &TopDocs::with_limit(1_000))
        .expect("search");
    hits.sort_by_key(|(_, address)| *address);

    hits.into_iter()
        .map(|(_, address)| {
            let doc: TantivyDocument = searcher.doc(address).expect("doc");
            schema
                .fields()
                .map(|(field, entry)| {
                    let value = doc
                        .get_first(field)
                        .and_then(|v| v.as_str())
                        .unwrap_or_default()
                        .to_owned();
                    (entry.name().to_owned(), value)
                })
                .collect()
        })
        .collect()
}

fn value<'a>(doc: &'a [(String, String)], name: &str) -> &'a str {
    doc.iter()
        .find(|(field, _)| field == name)
        .map_or("", |(_, value)| value.as_str())
}

fn term_hits(index_dir: &Path, field_name: &str, text: &str) -> usize {
    let index = Index::open_in_dir(index_dir).expect("open index");
    let field = index.schema().get_field(field_name).expect("field");
    let query = TermQuery::new(
        Term::from_field_text(field, text),
        IndexRecordOption::Basic,
    );
    index
        .reader()
        .expect("reader")
        .searcher()
        .search(&query, &Count)
        .expect("search")
}

// ═══════════════════════════════════════════════════════════════════════════
// Document counts
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn document_count_ignores_noise() {
    let source = format!(
        "<?xml version=\"1.0\"?>\n<export generated=\"today\">\n{}random line\n\n{}<!-- comment -->\n{}</export>\n",
        block(1, "Dune"),
        block(2, "Emma"),
        block(3, "Ulysses"),
    );
    let fixture = fixture(&source);
    let stats = build(&fixture);
    assert_eq!(stats.units, 3);
    assert_eq!(stats.documents, 3);
    assert_eq!(stored_documents(&fixture.index).len(), 3);
}

#[test]
fn unterminated_trailing_block_adds_nothing() {
    let source = format!("{}{}<item id=\"3\">\n  <title><value>Lost", block(1, "Dune"), block(2, "Emma"));
    let fixture = fixture(&source);
    let stats = build(&fixture);
    assert_eq!(stats.documents, 2);
    assert_eq!(stats.dropped_fragments, 1);

    let docs = stored_documents(&fixture.index);
    let titles: Vec<&str> = docs.iter().map(|d| value(d, fields::TITLE)).collect();
    assert_eq!(titles, vec!["Dune", "Emma"]);
}

#[test]
fn consecutive_blocks_keep_file_order() {
    let source = format!("{}{}", block(10, "First"), block(20, "Second"));
    let fixture = fixture(&source);
    build(&fixture);
    let docs = stored_documents(&fixture.index);
    let ids: Vec<&str> = docs.iter().map(|d| value(d, fields::ID)).collect();
    assert_eq!(ids, vec!["10", "20"]);
}

#[test]
fn empty_source_produces_empty_index() {
    let fixture = fixture("nothing to see\n");
    let stats = build(&fixture);
    assert_eq!(stats.documents, 0);
    assert!(stored_documents(&fixture.index).is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// Field values
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn gatsby_record_is_indexed() {
    let fixture = fixture(&format!("{GATSBY}\n"));
    build(&fixture);

    let docs = stored_documents(&fixture.index);
    assert_eq!(docs.len(), 1);
    let doc = &docs[0];
    assert_eq!(value(doc, fields::TITLE), "The Great Gatsby");
    assert_eq!(value(doc, fields::ISBN), "123");
    assert_eq!(value(doc, fields::ID), "");
    assert_eq!(value(doc, fields::URL), "");
    assert_eq!(value(doc, fields::COPIES), "");

    let fingerprinter = PhoneticFingerprinter::new();
    let normalizer = TextNormalizer::english();
    let phonetic: Vec<&str> = value(doc, fields::PHONETIC).split(' ').collect();
    for word in ["Great", "Gatsby"] {
        let (primary, _) = fingerprinter.encode_token(word);
        assert!(phonetic.contains(&primary.as_str()), "code for {word}");
        let (stem_primary, _) = fingerprinter.encode_token(&normalizer.stem(word));
        assert!(phonetic.contains(&stem_primary.as_str()), "code for stem of {word}");
    }
    let without_the = fingerprinter.fingerprint(&normalizer.normalize("Great Gatsby"));
    assert_eq!(value(doc, fields::PHONETIC), without_the);
}

#[test]
fn block_without_title_has_empty_title_and_phonetic() {
    let fixture = fixture("<item id=\"4\">\n<isbn><value>42</value></isbn>\n</item>\n");
    build(&fixture);
    let docs = stored_documents(&fixture.index);
    assert_eq!(value(&docs[0], fields::TITLE), "");
    assert_eq!(value(&docs[0], fields::PHONETIC), "");
    assert_eq!(value(&docs[0], fields::ISBN), "42");
}

#[test]
fn title_is_searchable_by_stem_and_phonetic_code() {
    let fixture = fixture(&block(1, "Running Horses"));
    build(&fixture);

    assert_eq!(term_hits(&fixture.index, fields::TITLE, "hors"), 1);
    assert_eq!(term_hits(&fixture.index, fields::TITLE, "Horses"), 0);

    let (code, _) = PhoneticFingerprinter::new().encode_token("Horses");
    assert_eq!(term_hits(&fixture.index, fields::PHONETIC, &code), 1);
}

// ═══════════════════════════════════════════════════════════════════════════
// Index lifecycle
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn second_run_replaces_first() {
    let fixture = fixture(&format!("{}{}", block(1, "Dune"), block(2, "Emma")));
    build(&fixture);

    std::fs::write(&fixture.source, block(3, "Ulysses")).expect("rewrite source");
    let stats = build(&fixture);
    assert_eq!(stats.documents, 1);

    let docs = stored_documents(&fixture.index);
    assert_eq!(docs.len(), 1);
    assert_eq!(value(&docs[0], fields::TITLE), "Ulysses");
}

#[test]
fn missing_source_leaves_existing_index_alone() {
    let fixture = fixture(&block(1, "Dune"));
    build(&fixture);

    let err = CatalogIndexBuilder::new(fixture.source.with_extension("missing"), &fixture.index)
        .build()
        .expect_err("missing source");
    assert!(matches!(err, IngestError::SourceMissing { .. }));
    assert!(err.is_startup());
    assert_eq!(stored_documents(&fixture.index).len(), 1);
}

#[test]
fn index_path_holding_the_source_is_rejected() {
    let fixture = fixture(&block(1, "Dune"));
    let catalog = fixture.source.parent().expect("parent").to_path_buf();
    std::fs::write(catalog.join("notes.txt"), "keep me").expect("write notes");

    let err = CatalogIndexBuilder::new(&fixture.source, &catalog)
        .build()
        .expect_err("index path contains source");
    assert!(matches!(err, IngestError::InvalidConfig { ref field, .. } if field == "index_path"));
    assert!(fixture.source.exists());
    assert!(catalog.join("notes.txt").exists());
}

#[test]
fn foreign_directory_is_not_cleared() {
    let fixture = fixture(&block(1, "Dune"));
    std::fs::create_dir_all(&fixture.index).expect("mkdir");
    std::fs::write(fixture.index.join("notes.txt"), "keep me").expect("write notes");

    let err = CatalogIndexBuilder::new(&fixture.source, &fixture.index)
        .build()
        .expect_err("not an index");
    assert!(matches!(err, IngestError::IndexOpen { .. }));
    assert!(fixture.index.join("notes.txt").exists());
}

#[test]
fn record_opening_on_closing_line_is_kept() {
    let source = "<item id=\"1\">\n<id><value>1</value></id>\n</item><item id=\"2\">\n<id><value>2</value></id>\n</item>\n";
    let fixture = fixture(source);
    let stats = build(&fixture);
    assert_eq!(stats.documents, 2);
    assert_eq!(stats.dropped_fragments, 0);
    let docs = stored_documents(&fixture.index);
    let ids: Vec<&str> = docs.iter().map(|d| value(d, fields::ID)).collect();
    assert_eq!(ids, vec!["1", "2"]);
}

#[test]
fn malformed_block_aborts_by_default() {
    let source = format!("{}<item id=\"2\"><title><value>Broken</title></item>\n", block(1, "Dune"));
    let fixture = fixture(&source);
    let err = CatalogIndexBuilder::new(&fixture.source, &fixture.index)
        .build()
        .expect_err("malformed");
    assert!(matches!(err, IngestError::MalformedRecord { line: 8, .. }));
}

#[test]
fn malformed_block_is_skipped_on_request() {
    let source = format!(
        "{}<item id=\"2\"><title><value>Broken</title></item>\n{}",
        block(1, "Dune"),
        block(3, "Emma")
    );
    let fixture = fixture(&source);
    let stats = CatalogIndexBuilder::new(&fixture.source, &fixture.index)
        .skip_malformed_records(true)
        .build()
        .expect("build");
    assert_eq!(stats.documents, 2);
    assert_eq!(stats.skipped_units, 1);
    assert_eq!(stored_documents(&fixture.index).len(), 2);
}

#[test]
fn progress_callback_sees_every_unit() {
    let source: String = (1..=5).map(|n| block(n, "Title")).collect();
    let fixture = fixture(&source);
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    CatalogIndexBuilder::new(&fixture.source, &fixture.index)
        .with_progress(move |p: IngestProgress| sink.lock().expect("lock").push(p.documents))
        .build()
        .expect("build");
    assert_eq!(*seen.lock().expect("lock"), vec![1, 2, 3, 4, 5, 5]);
}

#[test]
fn config_file_drives_builder() {
    let fixture = fixture(&block(1, "Dune"));
    let toml = format!(
        "source_path = {:?}\nindex_path = {:?}\n",
        fixture.source.display().to_string(),
        fixture.index.display().to_string(),
    );
    let config = IngestConfig::from_toml_str(&toml).expect("config");
    let stats = CatalogIndexBuilder::with_config(config).build().expect("build");
    assert_eq!(stats.documents, 1);
    assert_eq!(stats.index_doc_count, 1);
}
