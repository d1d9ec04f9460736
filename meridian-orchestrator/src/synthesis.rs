// ABOUTME: Pure synthesis function over fanned-out backend results
// ABOUTME: Deterministic by construction (no I/O) so synthesis is unit-testable without mocking backends

use meridian_core::types::{Citation, CitationKind, Confidence};
use meridian_graph::SearchHit;

use crate::fanout::{EssResults, GraphResults, VectorResults};
use crate::types::{SynthesizedAnswer, Timings};

const VECTOR_CHUNK_TRUNCATE: usize = 500;
const EVIDENCE_SCORE_THRESHOLD: f32 = 0.7;

#[must_use]
pub fn synthesize(vector: &VectorResults, graph: &GraphResults, ess: &EssResults) -> SynthesizedAnswer {
    let mut systems_used = Vec::new();
    let mut fallback_chain = Vec::new();
    let mut citations = Vec::new();

    let graph_facts: Vec<&meridian_graph::Fact> = graph
        .hits
        .iter()
        .filter_map(|h| match h {
            SearchHit::Fact(f) => Some(f),
            SearchHit::Entity(_) => None,
        })
        .collect();

    let ess_attempted = ess.elapsed.is_some();
    let ess_failed = ess_attempted && !ess.answer.as_ref().is_some_and(|a| !a.trim().is_empty());

    let text = if let Some(answer) = ess.answer.as_ref().filter(|a| !a.trim().is_empty()) {
        systems_used.push("ess");
        if ess.degraded {
            fallback_chain.push("ess_simple_chat");
        }
        for title in &ess.source_titles {
            citations.push(Citation::new(CitationKind::Ess, title.clone(), title.clone()));
        }

        let mut text = answer.clone();
        if !graph_facts.is_empty() {
            text.push_str("\n\nRelationship Context:\n");
            for fact in graph_facts.iter().take(2) {
                text.push_str(&format!("- {}\n", fact.statement));
                citations.push(Citation::new(CitationKind::Graph, "graph", fact.id.clone()));
            }
            systems_used.push("graph");
        }

        let evidence_hits: Vec<&meridian_rag::Hit> = vector.hits.iter().filter(|h| h.score >= EVIDENCE_SCORE_THRESHOLD).take(2).collect();
        if !evidence_hits.is_empty() {
            text.push_str("\n\nEvidence:\n");
            for hit in &evidence_hits {
                text.push_str(&format!("- {}\n", truncate(&hit.content, VECTOR_CHUNK_TRUNCATE)));
                citations.push(Citation::new(CitationKind::Vector, hit.document_source.clone(), hit.chunk_id.clone()).with_score(hit.score));
            }
            systems_used.push("vector");
        }
        text
    } else if let Some(top_hit) = vector.hits.first() {
        if ess_attempted {
            fallback_chain.push("ess_attempted");
        }
        if ess_failed {
            fallback_chain.push("ess_failed");
        }
        fallback_chain.push("vector_primary");
        systems_used.push("vector");
        citations.push(Citation::new(CitationKind::Vector, top_hit.document_source.clone(), top_hit.chunk_id.clone()).with_score(top_hit.score));
        let mut text = truncate(&top_hit.content, VECTOR_CHUNK_TRUNCATE);
        if !graph_facts.is_empty() {
            text.push_str("\n\nRelationship Context:\n");
            for fact in graph_facts.iter().take(2) {
                text.push_str(&format!("- {}\n", fact.statement));
                citations.push(Citation::new(CitationKind::Graph, "graph", fact.id.clone()));
            }
            systems_used.push("graph");
            fallback_chain.push("graph_synthesis_added");
        }
        text
    } else if !graph_facts.is_empty() {
        if ess_attempted {
            fallback_chain.push("ess_attempted");
        }
        if ess_failed {
            fallback_chain.push("ess_failed");
        }
        fallback_chain.push("graph_primary");
        systems_used.push("graph");
        let mut text = String::from("Knowledge graph results:\n");
        for fact in graph_facts.iter().take(3) {
            text.push_str(&format!("- {}\n", fact.statement));
            citations.push(Citation::new(CitationKind::Graph, "graph", fact.id.clone()));
        }
        text
    } else {
        if ess_attempted {
            fallback_chain.push("ess_attempted");
        }
        if ess_failed {
            fallback_chain.push("ess_failed");
        }
        fallback_chain.push("no_results");
        "No results were found for this query.".to_string()
    };

    let confidence = confidence_for(ess, vector, graph);

    SynthesizedAnswer {
        text,
        citations,
        systems_used,
        confidence,
        fallback_chain,
        timings: Timings {
            vector: vector.elapsed,
            graph: graph.elapsed,
            ess: ess.elapsed,
            total: Default::default(),
        },
    }
}

fn confidence_for(ess: &EssResults, vector: &VectorResults, graph: &GraphResults) -> Confidence {
    let ess_ok = ess.answer.as_ref().is_some_and(|a| !a.trim().is_empty()) && !ess.degraded;
    let vector_ok = !vector.hits.is_empty();
    let graph_ok = !graph.hits.is_empty();

    if ess_ok && (vector_ok || graph_ok) {
        Confidence::VeryHigh
    } else if ess_ok {
        Confidence::High
    } else if vector_ok {
        Confidence::Medium
    } else if graph_ok {
        Confidence::Low
    } else {
        Confidence::None
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(max_chars).collect();
        format!("{truncated}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::types::Embedding;
    use meridian_graph::Fact;
    use meridian_rag::Hit;
    use std::collections::HashMap;

    fn hit(score: f32) -> Hit {
        Hit {
            chunk_id: "chunk-1".to_string(),
            document_id: "doc-1".to_string(),
            content: "some evidence text".to_string(),
            score,
            document_title: "Doc".to_string(),
            document_source: "doc.md".to_string(),
            metadata: HashMap::new(),
        }
    }

    fn fact(statement: &str) -> Fact {
        Fact::new("acme", statement, vec![])
    }

    #[test]
    fn ess_answer_drives_very_high_confidence_with_vector_support() {
        let vector = VectorResults {
            hits: vec![hit(0.9)],
            elapsed: None,
        };
        let graph = GraphResults::default();
        let ess = EssResults {
            answer: Some("the answer".to_string()),
            source_titles: vec!["Doc".to_string()],
            degraded: false,
            elapsed: None,
        };
        let result = synthesize(&vector, &graph, &ess);
        assert_eq!(result.confidence, Confidence::VeryHigh);
        assert!(result.text.starts_with("the answer"));
        assert!(result.text.contains("Evidence"));
        assert!(result.systems_used.contains(&"ess"));
        assert!(result.systems_used.contains(&"vector"));
    }

    #[test]
    fn vector_only_yields_medium_confidence() {
        let vector = VectorResults {
            hits: vec![hit(0.6)],
            elapsed: None,
        };
        let result = synthesize(&vector, &GraphResults::default(), &EssResults::default());
        assert_eq!(result.confidence, Confidence::Medium);
        assert!(result.systems_used.contains(&"vector"));
    }

    #[test]
    fn graph_only_yields_low_confidence_with_templated_summary() {
        let graph = GraphResults {
            hits: vec![SearchHit::Fact(fact("Acme uses Rust"))],
            top_entity_relationships: vec![],
            elapsed: None,
        };
        let result = synthesize(&VectorResults::default(), &graph, &EssResults::default());
        assert_eq!(result.confidence, Confidence::Low);
        assert!(result.text.starts_with("Knowledge graph results"));
    }

    #[test]
    fn nothing_found_yields_no_results_notice() {
        let result = synthesize(&VectorResults::default(), &GraphResults::default(), &EssResults::default());
        assert_eq!(result.confidence, Confidence::None);
        assert_eq!(result.text, "No results were found for this query.");
    }

    #[test]
    fn ess_failure_records_vector_and_graph_fallback_stages() {
        let vector = VectorResults {
            hits: vec![hit(0.6)],
            elapsed: None,
        };
        let graph = GraphResults {
            hits: vec![SearchHit::Fact(fact("Acme uses Rust"))],
            top_entity_relationships: vec![],
            elapsed: None,
        };
        let ess = EssResults {
            answer: None,
            source_titles: vec![],
            degraded: false,
            elapsed: Some(std::time::Duration::from_millis(10)),
        };
        let result = synthesize(&vector, &graph, &ess);
        assert_eq!(
            result.fallback_chain,
            vec!["ess_attempted", "ess_failed", "vector_primary", "graph_synthesis_added"]
        );
        assert!(result.systems_used.contains(&"vector"));
        assert!(result.systems_used.contains(&"graph"));
    }

    #[test]
    fn degraded_ess_answer_does_not_count_toward_very_high_confidence() {
        let ess = EssResults {
            answer: Some("fallback answer".to_string()),
            source_titles: vec![],
            degraded: true,
            elapsed: None,
        };
        let vector = VectorResults {
            hits: vec![hit(0.6)],
            elapsed: None,
        };
        let result = synthesize(&vector, &GraphResults::default(), &ess);
        assert_eq!(result.confidence, Confidence::Medium);
        assert_eq!(result.fallback_chain, vec!["ess_simple_chat"]);
    }
}
