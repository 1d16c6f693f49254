//! The two query operations over a published [`InferenceContext`].
//!
//! Both are pure functions of `(ctx, input, k)`: no shared state is written,
//! so a caller may abandon a call at any point.

use arxivist_core::{Recommendation, SubjectPrediction, top_k_indices};
use tracing::debug;

use crate::bootstrap::InferenceContext;
use crate::QueryError;

/// Top-`k` subjects for a passage, highest probability first.
///
/// Selection happens before the unknown-label filter, so fewer than `k`
/// predictions come back when `[UNK]` ranks inside the top `k`. Scores are the
/// raw classifier probabilities.
pub fn classify(
    ctx: &InferenceContext,
    text: &str,
    k: usize,
) -> Result<Vec<SubjectPrediction>, QueryError> {
    reject_degenerate(text, k)?;

    let probs = ctx
        .classifier
        .predict(&ctx.input_key, text)
        .map_err(QueryError::Inference)?;
    if probs.len() != ctx.labels.len() {
        return Err(QueryError::Inference(anyhow::anyhow!(
            "classifier produced {} scores for {} labels",
            probs.len(),
            ctx.labels.len()
        )));
    }

    let predictions: Vec<SubjectPrediction> = top_k_indices(&probs, k)
        .into_iter()
        .filter_map(|i| {
            ctx.labels.subject(i).map(|label| SubjectPrediction {
                label: label.to_string(),
                score: probs[i],
            })
        })
        .collect();

    debug!(k, returned = predictions.len(), "classified passage");
    Ok(predictions)
}

/// Top-`k` corpus titles by cosine similarity to the query.
///
/// Returns `min(k, N)` titles, ties broken by corpus order.
pub fn recommend(
    ctx: &InferenceContext,
    query: &str,
    k: usize,
) -> Result<Vec<Recommendation>, QueryError> {
    reject_degenerate(query, k)?;

    let query_vec = ctx.encoder.encode(query).map_err(QueryError::Inference)?;
    if query_vec.len() != ctx.embeddings.dim() {
        return Err(QueryError::Inference(anyhow::anyhow!(
            "encoder produced a {}-dim query vector for a {}-dim corpus",
            query_vec.len(),
            ctx.embeddings.dim()
        )));
    }
    let scores = ctx.embeddings.cosine_scores(&query_vec);

    let recommendations: Vec<Recommendation> = top_k_indices(&scores, k)
        .into_iter()
        .map(|i| Recommendation {
            title: ctx.titles[i].clone(),
            score: scores[i],
        })
        .collect();

    debug!(k, returned = recommendations.len(), "ranked titles");
    Ok(recommendations)
}

fn reject_degenerate(text: &str, k: usize) -> Result<(), QueryError> {
    if text.is_empty() {
        return Err(QueryError::InvalidArgument("input text is empty".into()));
    }
    if k == 0 {
        return Err(QueryError::InvalidArgument("k must be at least 1".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{LookupEncoder, context};

    fn corpus(encoder: LookupEncoder) -> InferenceContext {
        context(
            &["[UNK]", "physics", "math"],
            vec![0.5, 0.3, 0.2],
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]],
            &["A", "B", "C"],
            encoder,
        )
    }

    fn scored_corpus() -> InferenceContext {
        corpus(
            LookupEncoder::new(2)
                .with("east", vec![1.0, 0.0])
                .with("nowhere", vec![0.0, 0.0])
                .with("west", vec![-1.0, 0.0]),
        )
    }

    #[test]
    fn unknown_filtered_after_truncation() {
        // [UNK] takes a top-3 slot, so only two subjects come back for k=3.
        let ctx = scored_corpus();
        let got = classify(&ctx, "a passage about forces", 3).unwrap();
        assert_eq!(
            got,
            vec![
                SubjectPrediction {
                    label: "physics".into(),
                    score: 0.3
                },
                SubjectPrediction {
                    label: "math".into(),
                    score: 0.2
                },
            ]
        );
    }

    #[test]
    fn unknown_at_top_with_k1_returns_nothing() {
        let ctx = scored_corpus();
        assert!(classify(&ctx, "a passage", 1).unwrap().is_empty());
    }

    #[test]
    fn classify_ties_prefer_vocabulary_order() {
        let ctx = context(
            &["b", "a", "c", "[UNK]"],
            vec![0.25, 0.25, 0.25, 0.25],
            vec![vec![1.0]],
            &["only"],
            LookupEncoder::new(1),
        );
        let labels: Vec<String> = classify(&ctx, "tie", 4)
            .unwrap()
            .into_iter()
            .map(|p| p.label)
            .collect();
        assert_eq!(labels, vec!["b", "a", "c"]);
    }

    #[test]
    fn classify_never_exceeds_k_and_is_descending() {
        let probs: Vec<f32> = (0..40).map(|i| ((i * 7) % 40) as f32 / 40.0).collect();
        let vocab: Vec<String> = (0..40)
            .map(|i| if i % 9 == 0 { "[UNK]".to_string() } else { format!("l{i}") })
            .collect();
        let vocab_refs: Vec<&str> = vocab.iter().map(String::as_str).collect();
        let ctx = context(&vocab_refs, probs, vec![vec![1.0]], &["t"], LookupEncoder::new(1));

        for k in 1..=30 {
            let got = classify(&ctx, "some text", k).unwrap();
            assert!(got.len() <= k);
            assert!(got.iter().all(|p| p.label != "[UNK]"));
            assert!(got.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }

    #[test]
    fn classify_rejects_misaligned_output() {
        let ctx = context(
            &["a", "b"],
            vec![0.1, 0.2, 0.7],
            vec![vec![1.0]],
            &["t"],
            LookupEncoder::new(1),
        );
        assert!(matches!(
            classify(&ctx, "text", 2),
            Err(QueryError::Inference(_))
        ));
    }

    #[test]
    fn recommend_scenario() {
        let ctx = scored_corpus();
        let got = recommend(&ctx, "east", 2).unwrap();
        assert_eq!(got.len(), 2);
        assert_eq!(got[0].title, "A");
        assert!((got[0].score - 1.0).abs() < 1e-6);
        assert_eq!(got[1].title, "C");
        assert!((got[1].score - 0.70710677).abs() < 1e-5);
    }

    #[test]
    fn recommend_k_equal_n_returns_every_title_once() {
        let ctx = scored_corpus();
        let got = recommend(&ctx, "east", 3).unwrap();
        let mut titles: Vec<&str> = got.iter().map(|r| r.title.as_str()).collect();
        titles.sort_unstable();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }

    #[test]
    fn recommend_k_above_n_returns_n() {
        let ctx = scored_corpus();
        assert_eq!(recommend(&ctx, "east", 30).unwrap().len(), 3);
    }

    #[test]
    fn recommend_scores_bounded_and_descending() {
        let ctx = scored_corpus();
        let got = recommend(&ctx, "west", 3).unwrap();
        assert!(got.iter().all(|r| (-1.0..=1.0).contains(&r.score)));
        assert!(got.windows(2).all(|w| w[0].score >= w[1].score));
        assert_eq!(got[2].title, "A");
        assert!((got[2].score + 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_query_vector_ties_in_corpus_order() {
        let ctx = scored_corpus();
        let got = recommend(&ctx, "nowhere", 3).unwrap();
        let titles: Vec<&str> = got.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
        assert!(got.iter().all(|r| r.score == 0.0));
    }

    #[test]
    fn repeated_queries_are_identical() {
        let ctx = scored_corpus();
        assert_eq!(
            classify(&ctx, "same text", 3).unwrap(),
            classify(&ctx, "same text", 3).unwrap()
        );
        assert_eq!(
            recommend(&ctx, "east", 3).unwrap(),
            recommend(&ctx, "east", 3).unwrap()
        );
    }

    #[test]
    fn degenerate_inputs_are_invalid_arguments() {
        let ctx = scored_corpus();
        assert!(matches!(
            classify(&ctx, "", 3),
            Err(QueryError::InvalidArgument(_))
        ));
        assert!(matches!(
            classify(&ctx, "text", 0),
            Err(QueryError::InvalidArgument(_))
        ));
        assert!(matches!(
            recommend(&ctx, "", 3),
            Err(QueryError::InvalidArgument(_))
        ));
        assert!(matches!(
            recommend(&ctx, "east", 0),
            Err(QueryError::InvalidArgument(_))
        ));
    }

    #[test]
    fn whitespace_passage_is_still_classified() {
        let ctx = scored_corpus();
        assert_eq!(classify(&ctx, "   ", 3).unwrap().len(), 2);
    }

    #[test]
    fn undeclared_encoder_width_is_checked_per_query() {
        let ctx = corpus(
            LookupEncoder::undeclared()
                .with("east", vec![1.0, 0.0])
                .with("too wide", vec![1.0, 0.0, 0.0]),
        );
        assert_eq!(recommend(&ctx, "east", 1).unwrap()[0].title, "A");
        assert!(matches!(
            recommend(&ctx, "too wide", 1),
            Err(QueryError::Inference(_))
        ));
    }

    #[test]
    fn encoder_failure_is_inference_error() {
        let ctx = scored_corpus();
        let err = recommend(&ctx, "unseen query", 2).unwrap_err();
        assert!(matches!(err, QueryError::Inference(_)));
        // The context still serves other queries.
        assert_eq!(recommend(&ctx, "east", 1).unwrap()[0].title, "A");
    }
}
