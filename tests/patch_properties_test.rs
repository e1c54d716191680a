use anyhow::Result;
use regex::Regex;
use std::path::Path;
use text_patcher::{
    apply_all, BlockRule, Document, MemoryStorage, PatchConfig, PatchEngine, RegexRule, RuleSet,
};

const TABS_PAGE: &str = r#"// header comment
type Tab = 'summary' | 'risks' | 'tips' | 'history' | 'feed';

export function Page() {
  return (
    <main>
      <nav>
        <button data-tab="summary">Summary</button>
        <button data-tab="risks">
          Risks
        </button>
        <button data-tab="tips">
          Tips
        </button>
        <button data-tab="history">
          History
        </button>
        <button data-tab="feed">
          Feed
        </button>
      </nav>
      {tab === 'summary' && (
        <section className="summary">overview text</section>
      )}
      {tab === 'risks' && (
        <section className="risks">
          {risks.map((r) => (
            <p>{r}</p>
          ))}
        </section>
      )}
      {tab === 'tips' && (
        <section className="tips">tips</section>
      )}
      {tab === 'history' && (
        <section className="history">history</section>
      )}
      {tab === 'feed' && (
        <section className="feed">feed</section>
      )}
    </main>
  );
}
"#;

fn trigger_rule(tab: &str) -> BlockRule {
    let contains = Regex::new(&format!(r#"^<button data-tab="{}">"#, tab)).unwrap();
    BlockRule::new(format!("remove-{}-trigger", tab), "<button", "</button>", contains)
}

fn panel_rule(tab: &str) -> RegexRule {
    RegexRule::from_pattern(
        format!("remove-{}-panel", tab),
        &format!(r"\n {{6}}\{{tab === '{}' && \(.*?\n {{6}}\)\}}", tab),
        "",
    )
    .unwrap()
}

fn four_tab_rules() -> RuleSet {
    let mut rules = RuleSet::new();
    for tab in ["risks", "tips", "history", "feed"] {
        rules.push(trigger_rule(tab));
        rules.push(panel_rule(tab));
    }
    rules
}

#[test]
fn test_four_trigger_panel_pairs_removed_and_one_retained() {
    let mut document = Document::new("Page.tsx", TABS_PAGE);
    let outcomes = apply_all(&mut document, &four_tab_rules());

    assert_eq!(outcomes.len(), 8);
    assert!(outcomes.iter().all(|o| o.matches == 1), "{:?}", outcomes);

    let patched = document.content();
    for tab in ["risks", "tips", "history", "feed"] {
        assert!(!patched.contains(&format!("data-tab=\"{}\"", tab)));
        assert!(!patched.contains(&format!("{{tab === '{}' && (", tab)));
    }
    assert!(patched.contains("<button data-tab=\"summary\">Summary</button>"));
    assert!(patched.contains(
        "      {tab === 'summary' && (\n        <section className=\"summary\">overview text</section>\n      )}\n    </main>"
    ));
    assert!(patched.contains("<button data-tab=\"summary\">Summary</button>\n      </nav>"));
}

#[test]
fn test_union_narrowed_to_two_in_original_order() {
    let rule = RegexRule::from_pattern(
        "narrow",
        r"type Tab = 'summary' \| 'risks' \| 'tips' \| 'history' \| 'feed';",
        "type Tab = 'summary' | 'feed';",
    )
    .unwrap();

    let mut document = Document::new("Page.tsx", TABS_PAGE);
    apply_all(&mut document, &RuleSet::new().with(rule));

    let before: Vec<&str> = TABS_PAGE.lines().collect();
    let after: Vec<&str> = document.content().lines().collect();

    assert_eq!(before.len(), after.len());
    for (index, (old, new)) in before.iter().zip(&after).enumerate() {
        if index == 1 {
            assert_eq!(*new, "type Tab = 'summary' | 'feed';");
        } else {
            assert_eq!(old, new, "line {} changed", index + 1);
        }
    }
}

#[test]
fn test_reapplying_rules_changes_nothing() {
    let rules = four_tab_rules();

    let mut document = Document::new("Page.tsx", TABS_PAGE);
    apply_all(&mut document, &rules);
    let once = document.content().to_string();

    let outcomes = apply_all(&mut document, &rules);

    assert!(outcomes.iter().all(|o| o.matches == 0));
    assert_eq!(document.content(), once);
}

#[test]
fn test_rule_order_is_observable() {
    // The second rule looks for text only the first one writes.
    let rename = || RegexRule::from_pattern("rename", r"data-tab=\x22risks\x22", r#"data-tab="legacy""#).unwrap();
    let drop_legacy = || trigger_rule("legacy");

    let mut forward = Document::new("Page.tsx", TABS_PAGE);
    let outcomes = apply_all(&mut forward, &RuleSet::new().with(rename()).with(drop_legacy()));
    assert_eq!(outcomes[1].matches, 1);
    assert!(!forward.content().contains("Risks"));

    let mut backward = Document::new("Page.tsx", TABS_PAGE);
    let outcomes = apply_all(&mut backward, &RuleSet::new().with(drop_legacy()).with(rename()));
    assert_eq!(outcomes[0].matches, 0);
    assert!(backward.content().contains("data-tab=\"legacy\""));
}

#[test]
fn test_lazy_span_keeps_adjacent_twin_block() {
    let text = "<Card>\n  <h2>First</h2>\n</Card>\n<Card>\n  <h2>Second</h2>\n</Card>\n";
    let rule = RegexRule::from_pattern("drop-first", r"<Card>\s*<h2>First</h2>.*?</Card>\n", "").unwrap();

    let mut document = Document::new("cards.tsx", text);
    apply_all(&mut document, &RuleSet::new().with(rule));

    assert_eq!(document.content(), "<Card>\n  <h2>Second</h2>\n</Card>\n");
}

#[test]
fn test_no_match_is_byte_identical() {
    let rules = RuleSet::new()
        .with(RegexRule::from_pattern("absent", r"<aside>.*?</aside>", "").unwrap())
        .with(trigger_rule("settings"));

    let mut document = Document::new("Page.tsx", TABS_PAGE);
    let outcomes = apply_all(&mut document, &rules);

    assert!(outcomes.iter().all(|o| o.matches == 0));
    assert_eq!(document.content().as_bytes(), TABS_PAGE.as_bytes());
}

#[test]
fn test_unrelated_content_is_preserved_verbatim() {
    let mut document = Document::new("Page.tsx", TABS_PAGE);
    apply_all(&mut document, &four_tab_rules());
    let patched = document.content();

    // Everything before the first removed trigger and after the last removed
    // panel is untouched.
    let head_end = TABS_PAGE.find("\n        <button data-tab=\"risks\">").unwrap();
    let tail_start = TABS_PAGE.find("\n    </main>").unwrap();

    assert!(patched.starts_with(&TABS_PAGE[..head_end]));
    assert!(patched.ends_with(&TABS_PAGE[tail_start..]));
}

#[test]
fn test_engine_with_rule_file() -> Result<()> {
    let rule_file = r#"
[patch]
name = "page-tabs"

[target]
path = "Page.tsx"

[[rules]]
name = "narrow"
kind = "regex"
pattern = '''type Tab = 'summary' \| 'risks' \| 'tips' \| 'history' \| 'feed';'''
replacement = "type Tab = 'summary';"

[[rules]]
name = "remove-risks-trigger"
kind = "block"
open = "<button"
close = "</button>"
contains = '''^<button data-tab="risks">'''
"#;

    let config = PatchConfig::from_toml_str(rule_file)?;
    let storage = MemoryStorage::new().with_file("Page.tsx", TABS_PAGE);
    let engine = PatchEngine::new(storage);

    let report = engine.run(Path::new("Page.tsx"), &config.compile_rules()?)?;

    assert!(report.written);
    assert_eq!(report.applied_rules(), 2);
    let patched = engine.storage().get("Page.tsx").unwrap();
    assert!(patched.contains("type Tab = 'summary';"));
    assert!(!patched.contains("data-tab=\"risks\""));
    Ok(())
}
