use std::path::PathBuf;

use lexcanon_engine::config::{LexiconPolicy, MisspellingPolicy};
use lexcanon_engine::error::DiagnosticKind;
use lexcanon_engine::{run, Lexicon, NodeKey, PartOfSpeech, Report};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn run_fixture(name: &str) -> Report {
    init_logging();
    run(&fixture(name), None, &LexiconPolicy::default()).unwrap()
}

/// The lexicon a published report would produce: suggested text where there
/// is one, original text otherwise.
fn republish(report: &Report) -> String {
    report
        .rows
        .iter()
        .map(|r| format!("{}\t{}\n", r.word, r.suggested.as_deref().unwrap_or(&r.original)))
        .collect()
}

// -------------------------------------------------------------------------
// Conjugation completeness
// -------------------------------------------------------------------------

#[test]
fn missing_conjugation_tags_root_only() {
    let report = run_fixture("family.tsv");

    let end = report.row("END").unwrap();
    assert_eq!(end.tag_string(), "Missing Conjugation: ENDETH");
    assert!(end.suggested.is_none());

    for word in ["ENDS", "ENDED", "ENDING", "ENDETH"] {
        let row = report.row(word).unwrap();
        assert!(row.tags.is_empty(), "{word} should carry no tags: {:?}", row.tags);
        assert!(row.suggested.is_none());
    }

    assert_eq!(report.warnings.len(), 1);
    assert_eq!(report.warnings[0].kind, DiagnosticKind::Consistency);
}

// -------------------------------------------------------------------------
// Alt-spelling consolidation
// -------------------------------------------------------------------------

#[test]
fn alt_spellings_share_canonical_definition() {
    let report = run_fixture("family.tsv");

    let cat = report.row("CAT").unwrap();
    let kat = report.row("KAT").unwrap();
    assert_eq!(cat.suggested.as_deref(), Some("A small feline, also KAT [n]"));
    assert_eq!(kat.suggested.as_deref(), Some("A small feline, also CAT [n]"));
    assert_eq!(cat.tag_string(), "Autosuggestion");
    assert_eq!(kat.tag_string(), "Autosuggestion");

    let suggestions: Vec<_> = report.autosuggestions().map(|(w, _, _)| w).collect();
    assert_eq!(suggestions, vec!["CAT", "KAT"]);
}

#[test]
fn rows_follow_input_order() {
    let report = run_fixture("family.tsv");
    let words: Vec<&str> = report.rows.iter().map(|r| r.word.as_str()).collect();
    assert_eq!(
        words,
        vec!["END", "ENDS", "ENDED", "ENDING", "ENDETH", "FINISH", "CAT", "KAT", "FELINE", "SMALL"]
    );
}

#[test]
fn republished_output_is_a_fixed_point() {
    let first = run_fixture("family.tsv");
    assert_eq!(first.summary.changed_rows, 2);

    let second = run(&republish(&first), None, &LexiconPolicy::default()).unwrap();
    assert_eq!(second.summary.changed_rows, 0);
    assert_eq!(second.autosuggestions().count(), 0);
}

#[test]
fn origin_dominates_length_and_special_origin_is_kept() {
    let report = run_fixture("origins.tsv");

    assert_eq!(
        report.row("COLOR").unwrap().suggested.as_deref(),
        Some("(Latin) A hue, also COLLOR, COLOUR [n]")
    );
    assert_eq!(
        report.row("COLOUR").unwrap().suggested.as_deref(),
        Some("(Latin) A hue, also COLLOR, COLOR [n]")
    );
    assert_eq!(
        report.row("COLLOR").unwrap().suggested.as_deref(),
        Some("(archaic) A hue, also COLOR, COLOUR [n]")
    );

    let second = run(&republish(&report), None, &LexiconPolicy::default()).unwrap();
    assert_eq!(second.summary.changed_rows, 0);
}

#[test]
fn plurality_weights_come_from_policy() {
    let policy = LexiconPolicy::from_toml(
        "[plurality]\norigin_weight = 1000\nlength_weight = 1\nspecial_origins = []\n",
    )
    .unwrap();
    let report = run(&fixture("origins.tsv"), None, &policy).unwrap();
    // archaic now votes; one archaic vs one Latin, first seen wins
    assert_eq!(
        report.row("COLOUR").unwrap().suggested.as_deref(),
        Some("(archaic) A hue, also COLLOR, COLOR [n]")
    );
}

// -------------------------------------------------------------------------
// Reserved nodes
// -------------------------------------------------------------------------

#[test]
fn multi_sense_root_is_reserved_with_its_component() {
    let report = run_fixture("multi_sense.tsv");

    let bank = report.row("BANK").unwrap();
    assert_eq!(bank.tag_string(), "MultiPOSDef Root");
    assert!(bank.suggested.is_none());

    // reachable from a reserved node, so left as authored
    let banke = report.row("BANKE").unwrap();
    assert_eq!(banke.tag_string(), "MultiPOSDef Root");
    assert!(banke.suggested.is_none());

    assert_eq!(report.summary.reserved_nodes, 2);
    assert_eq!(report.row("RIVER").unwrap().tags.len(), 0);
}

// -------------------------------------------------------------------------
// Prior revision
// -------------------------------------------------------------------------

#[test]
fn flipped_root_status_is_a_warning() {
    let report = run(
        &fixture("current_flipped.tsv"),
        Some(&fixture("prior_flipped.tsv")),
        &LexiconPolicy::default(),
    )
    .unwrap();

    assert_eq!(report.row("ENDS").unwrap().tag_string(), "Root Status Changed");
    assert!(report.row("END").unwrap().tags.is_empty());
}

// -------------------------------------------------------------------------
// Policy
// -------------------------------------------------------------------------

#[test]
fn strict_rejects_and_draft_tags_misspellings() {
    let input = "CAT\tA smal feline [n]\nFELINE\tCatlike. [adj]\n";

    let err = run(input, None, &LexiconPolicy::default()).unwrap_err();
    assert_eq!(err.diagnostics().len(), 1);
    assert_eq!(err.diagnostics()[0].kind, DiagnosticKind::Misspelling);

    let draft = LexiconPolicy::default().with_misspelling_policy(MisspellingPolicy::Draft);
    let report = run(input, None, &draft).unwrap();
    assert_eq!(report.row("CAT").unwrap().tag_string(), "Misspelling: SMAL");
}

#[test]
fn fatal_diagnostics_span_the_whole_lexicon() {
    let input = "\
CAT\tA Feline, also DOGG [n]
KAT\tCAT, A Feline [n]
EMU\tA Bird [noun]
OWL\tOWL, A Bird [n]
";
    let err = Lexicon::build(input, None, &LexiconPolicy::default()).unwrap_err();
    let kinds: Vec<DiagnosticKind> = err.diagnostics().iter().map(|d| d.kind).collect();
    assert_eq!(
        kinds,
        vec![
            DiagnosticKind::Reference,
            DiagnosticKind::Structural,
            DiagnosticKind::Structural,
            DiagnosticKind::Reference,
        ]
    );
}

// -------------------------------------------------------------------------
// Intermediate roots and exempt words
// -------------------------------------------------------------------------

#[test]
fn intermediate_root_renders_unchanged() {
    let report = run_fixture("intermediate.tsv");

    let walkings = report.row("WALKINGS").unwrap();
    assert_eq!(walkings.original, "WALKING, WALK, to stroll [v]");
    assert!(walkings.suggested.is_none());
    assert!(walkings.tags.is_empty(), "{:?}", walkings.tags);

    // WALKINGS is listed under WALK, so the final root is complete
    assert!(report.row("WALK").unwrap().tags.is_empty());
    assert_eq!(report.summary.changed_rows, 0);
    assert!(report.warnings.is_empty());

    let second = run(&republish(&report), None, &LexiconPolicy::default()).unwrap();
    assert_eq!(second.rows, report.rows);
}

#[test]
fn intermediate_root_joins_the_final_root_group() {
    init_logging();
    let mut lexicon = Lexicon::build(&fixture("intermediate.tsv"), None, &LexiconPolicy::default()).unwrap();
    assert!(lexicon.graph().index_of(&NodeKey::new("WALKING", PartOfSpeech::Verb)).is_none());

    let resolution = lexicon.consolidate().unwrap();
    let group = resolution.group_for(&NodeKey::new("WALK", PartOfSpeech::Verb)).unwrap();
    assert_eq!(group.definition, "to stroll");
}

#[test]
fn exempt_word_without_root_sense_gets_fallback_node() {
    init_logging();
    let policy = LexiconPolicy::default();
    assert!(policy.exceptions.is_exempt("LOSEN"));

    let lexicon = Lexicon::build(&fixture("exempt.tsv"), None, &policy).unwrap();
    assert!(lexicon.graph().index_of(&NodeKey::new("LOSE", PartOfSpeech::Adjective)).is_some());

    let report = run(&fixture("exempt.tsv"), None, &policy).unwrap();
    let losen = report.row("LOSEN").unwrap();
    assert!(losen.suggested.is_none());
    assert!(losen.tags.is_empty(), "{:?}", losen.tags);
    assert!(report.row("LOSE").unwrap().tags.is_empty());
    assert_eq!(report.summary.changed_rows, 0);
}

#[test]
fn same_word_without_exemption_is_a_reference_error() {
    let mut policy = LexiconPolicy::default();
    policy.exceptions.root_words.clear();

    let err = run(&fixture("exempt.tsv"), None, &policy).unwrap_err();
    assert_eq!(err.diagnostics().len(), 1);
    let diagnostic = &err.diagnostics()[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::Reference);
    assert_eq!(diagnostic.word, "LOSEN");
    assert!(diagnostic.message.contains("root word definition not found"), "{}", diagnostic.message);
}
