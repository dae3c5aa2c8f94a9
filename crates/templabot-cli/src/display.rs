//! Terminal rendering for predicted templates and loaded artifacts.

use std::fmt::Write;

use serde_json::Value;
use templabot_ai::{ArtifactPaths, Artifacts, Classify, DecodeLabel, Vectorize};
use templabot_core::TemplateView;

/// Top-level template fields shown above the JSON, in order.
const SUMMARY_FIELDS: &[&str] = &["category", "language"];

// ── Public API ──

/// Render a predicted template as a card: title, summary, components, JSON.
pub fn template_card(view: &TemplateView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", view.name);

    for &field in SUMMARY_FIELDS {
        if let Some(value) = view.body.get(field).and_then(Value::as_str) {
            let _ = writeln!(out, "  {:<12} {}", field, value);
        }
    }

    if let Some(components) = view.body.get("components").and_then(Value::as_array) {
        let _ = writeln!(out, "Components");
        for component in components {
            let kind = component.get("type").and_then(Value::as_str).unwrap_or("?");
            match component.get("text").and_then(Value::as_str) {
                Some(text) => {
                    let _ = writeln!(out, "  {:<12} {}", kind, text);
                }
                None => {
                    let _ = writeln!(out, "  {kind}");
                }
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", view.pretty());
    out
}

/// Render shapes, class names and consistency warnings of loaded artifacts.
pub fn artifact_report(paths: &ArtifactPaths, artifacts: &Artifacts) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Paths");
    let _ = writeln!(out, "  {:<12} {}", "vectorizer", paths.vectorizer.display());
    let _ = writeln!(out, "  {:<12} {}", "classifier", paths.classifier.display());
    let _ = writeln!(out, "  {:<12} {}", "labels", paths.labels.display());

    let _ = writeln!(out, "Vectorizer");
    let _ = writeln!(out, "  {:<12} {}", "features", artifacts.vectorizer.dim());

    let _ = writeln!(out, "Classifier");
    let _ = writeln!(out, "  {:<12} {}", "backend", artifacts.classifier.backend());
    let _ = writeln!(out, "  {:<12} {}", "inputs", dim(artifacts.classifier.input_dim()));
    let _ = writeln!(out, "  {:<12} {}", "classes", dim(artifacts.classifier.num_classes()));

    let _ = writeln!(out, "Labels ({})", artifacts.decoder.num_classes());
    for (i, label) in artifacts.decoder.classes() {
        let name = match TemplateView::parse(label) {
            Ok(view) => view.name,
            Err(e) => format!("<unreadable: {e}>"),
        };
        let _ = writeln!(out, "  {i:>4}  {name}");
    }

    let warnings = artifacts.consistency_warnings();
    if !warnings.is_empty() {
        let _ = writeln!(out, "Warnings");
        for w in warnings {
            let _ = writeln!(out, "  {w}");
        }
    }
    out
}

fn dim(n: usize) -> String {
    if n == 0 { "dynamic".to_string() } else { n.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use templabot_ai::ArtifactStore;

    fn demo_models() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("models")
    }

    #[test]
    fn card_shows_title_summary_and_components() {
        let view = TemplateView::parse(
            r#"{"name":"order_confirmation","category":"UTILITY","language":"en_US","components":[{"type":"BODY","text":"Hi {{1}}"},{"type":"BUTTONS"}]}"#,
        )
        .unwrap();
        let card = template_card(&view);
        assert!(card.starts_with("=== order_confirmation ==="));
        assert!(card.contains("category     UTILITY"));
        assert!(card.contains("BODY         Hi {{1}}"));
        assert!(card.contains("  BUTTONS\n"));
        assert!(card.contains("\"name\": \"order_confirmation\""));
    }

    #[test]
    fn card_without_components() {
        let view = TemplateView::parse(r#"{"name":"bare"}"#).unwrap();
        let card = template_card(&view);
        assert!(!card.contains("Components"));
    }

    #[test]
    fn report_lists_demo_classes() {
        let paths = ArtifactPaths::in_dir(&demo_models());
        let artifacts = ArtifactStore::new(paths.clone()).load_all().unwrap();
        let report = artifact_report(&paths, &artifacts);
        assert!(report.contains("backend      dense"));
        assert!(report.contains("order_confirmation"));
        assert!(report.contains("Labels (5)"));
        assert!(!report.contains("Warnings"));
    }
}
