//! Answer-span decoding from start/end logits.
//!
//! Positions outside the context are excluded from both distributions. The
//! CLS position takes part in the softmax normaliser but can never be chosen.
//! A span (i, j) scores `p_start(i) * p_end(j)` for `i <= j < i + max_answer_len`.

/// Winning span, as token positions into the encoded sequence (inclusive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanScore {
    pub start: usize,
    pub end: usize,
    pub score: f64,
}

/// Softmax over the positions where `include` is true; excluded positions get 0.
pub fn masked_softmax(logits: &[f32], include: &[bool]) -> Vec<f64> {
    let max = logits
        .iter()
        .zip(include)
        .filter(|&(_, &keep)| keep)
        .map(|(&l, _)| l as f64)
        .fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return vec![0.0; logits.len()];
    }

    let exps: Vec<f64> = logits
        .iter()
        .zip(include)
        .map(|(&l, &keep)| if keep { (l as f64 - max).exp() } else { 0.0 })
        .collect();
    let sum: f64 = exps.iter().sum();
    if sum <= 0.0 {
        return vec![0.0; logits.len()];
    }
    exps.into_iter().map(|e| e / sum).collect()
}

/// Pick the highest-scoring answer span among `context_mask` positions.
pub fn best_span(
    start_logits: &[f32],
    end_logits: &[f32],
    context_mask: &[bool],
    cls_index: Option<usize>,
    max_answer_len: usize,
) -> Option<SpanScore> {
    let len = start_logits.len();
    if len == 0 || end_logits.len() != len || context_mask.len() != len || max_answer_len == 0 {
        return None;
    }

    let mut include = context_mask.to_vec();
    if let Some(cls) = cls_index.filter(|&cls| cls < len) {
        include[cls] = true;
    }

    let mut p_start = masked_softmax(start_logits, &include);
    let mut p_end = masked_softmax(end_logits, &include);
    if let Some(cls) = cls_index.filter(|&cls| cls < len && !context_mask[cls]) {
        p_start[cls] = 0.0;
        p_end[cls] = 0.0;
    }

    let mut best: Option<SpanScore> = None;
    for start in (0..len).filter(|&i| context_mask[i]) {
        let last = (start + max_answer_len).min(len);
        for end in (start..last).filter(|&j| context_mask[j]) {
            let score = p_start[start] * p_end[end];
            if best.map_or(true, |b| score > b.score) {
                best = Some(SpanScore { start, end, score });
            }
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_softmax_ignores_excluded_positions() {
        let probs = masked_softmax(&[100.0, 0.0, 0.0], &[false, true, true]);
        assert_eq!(probs[0], 0.0);
        assert!((probs[1] - 0.5).abs() < 1e-12);
        assert!((probs[1] + probs[2] - 1.0).abs() < 1e-12);
        assert_eq!(masked_softmax(&[1.0], &[false]), vec![0.0]);
    }

    #[test]
    fn test_best_span_prefers_peak_logits() {
        // [CLS] q [SEP] c0 c1 c2 [SEP]
        let mask = [false, false, false, true, true, true, false];
        let start = [0.0, 9.0, 0.0, 1.0, 5.0, 1.0, 0.0];
        let end = [0.0, 9.0, 0.0, 1.0, 1.0, 5.0, 0.0];
        let span = best_span(&start, &end, &mask, Some(0), 15).unwrap();
        assert_eq!((span.start, span.end), (4, 5));
        assert!(span.score > 0.0 && span.score < 1.0);
    }

    #[test]
    fn test_best_span_respects_max_answer_len_and_order() {
        let mask = [false, true, true, true];
        let start = [0.0, 0.0, 0.0, 8.0];
        let end = [0.0, 8.0, 0.0, 0.0];
        // end before start is never allowed
        let span = best_span(&start, &end, &mask, Some(0), 1).unwrap();
        assert_eq!(span.start, span.end);
    }

    #[test]
    fn test_cls_mass_lowers_score_but_is_never_selected() {
        let mask = [false, true];
        let with_cls = best_span(&[10.0, 0.0], &[10.0, 0.0], &mask, Some(0), 15).unwrap();
        let without_cls = best_span(&[10.0, 0.0], &[10.0, 0.0], &mask, None, 15).unwrap();
        assert_eq!(with_cls.start, 1);
        assert!(with_cls.score < 0.001);
        assert!((without_cls.score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_best_span_without_context() {
        assert!(best_span(&[1.0, 1.0], &[1.0, 1.0], &[false, false], Some(0), 15).is_none());
        assert!(best_span(&[], &[], &[], None, 15).is_none());
    }
}
