//! Step evaluation
//!
//! A [`StepEvaluator`] grades a learner's written working for a question and
//! produces hints. The default [`KeywordEvaluator`] is a rule-based scorer:
//! topic keywords and numbers from the question that reappear in the steps
//! earn points, and two points make an answer correct.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum score for an answer to count as correct
pub const CORRECT_SCORE_THRESHOLD: u32 = 2;

/// Trimmed working at least this long earns one point
pub const DETAILED_STEPS_MIN_CHARS: usize = 40;

static NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"-?\d+(\.\d+)?").expect("number pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    SignError,
    ExpansionError,
    AlgebraIsolationError,
    ConceptualError,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::SignError => "SIGN_ERROR",
            ErrorType::ExpansionError => "EXPANSION_ERROR",
            ErrorType::AlgebraIsolationError => "ALGEBRA_ISOLATION_ERROR",
            ErrorType::ConceptualError => "CONCEPTUAL_ERROR",
        }
    }

    /// Message stored alongside the error log row
    pub fn describe(&self) -> &'static str {
        match self {
            ErrorType::SignError => "A sign was flipped while rearranging terms.",
            ErrorType::ExpansionError => "A product or power was expanded incorrectly.",
            ErrorType::AlgebraIsolationError => "The unknown was not isolated correctly.",
            ErrorType::ConceptualError => "The working applies the wrong idea for this question.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HintSet {
    pub conceptual_nudge: String,
    pub strategy_hint: String,
    pub step_correction: String,
}

/// Hints plus a worked solution for a question, independent of any answer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionHints {
    pub conceptual_nudge: String,
    pub strategy_hint: String,
    pub step_correction: String,
    pub complete_solution: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepEvaluation {
    pub is_correct: bool,
    pub error_type: Option<ErrorType>,
    pub hints: HintSet,
    pub complete_solution: String,
}

pub trait StepEvaluator: Send + Sync {
    fn evaluate(&self, question_prompt: &str, student_steps: &str) -> StepEvaluation;

    fn question_hints(&self, question_prompt: &str) -> QuestionHints;
}

// ==================== Keyword evaluator ====================

#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordEvaluator;

impl KeywordEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Points earned by `student_steps` for `question_prompt`
    pub fn score(&self, question_prompt: &str, student_steps: &str) -> u32 {
        let steps_lower = student_steps.to_lowercase();

        let keyword_hits = topic_keywords(question_prompt)
            .into_iter()
            .filter(|kw| steps_lower.contains(kw))
            .count() as u32;

        let number_hits = NUMBER_RE
            .find_iter(question_prompt)
            .filter(|m| student_steps.contains(m.as_str()))
            .count() as u32;

        let detail = u32::from(student_steps.trim().chars().count() >= DETAILED_STEPS_MIN_CHARS);

        keyword_hits + number_hits + detail
    }
}

impl StepEvaluator for KeywordEvaluator {
    fn evaluate(&self, question_prompt: &str, student_steps: &str) -> StepEvaluation {
        let score = self.score(question_prompt, student_steps);

        StepEvaluation {
            is_correct: score >= CORRECT_SCORE_THRESHOLD,
            error_type: None,
            hints: HintSet {
                conceptual_nudge: "Focus on the main concept of the question and explain each important step in words, not just calculations.".to_string(),
                strategy_hint: "Identify what is given, what you need to prove or find, then outline the sequence of algebraic or conceptual steps that bridge the two.".to_string(),
                step_correction: "Check that every transformation you make is valid (especially signs, expansions and use of formulas) and that your final statement actually answers the question.".to_string(),
            },
            complete_solution: "Answers are graded by keyword matching, so treat the correctness flag as a rough guide and always double-check your reasoning.".to_string(),
        }
    }

    fn question_hints(&self, question_prompt: &str) -> QuestionHints {
        let lower = question_prompt.to_lowercase();

        if lower.contains("continuity") || lower.contains("differentiab") {
            return QuestionHints {
                conceptual_nudge: "Think about how limits from the left and right at a point compare to the function value there, and how derivatives relate to the slope of the curve.".to_string(),
                strategy_hint: "First check continuity by computing the left-hand and right-hand limits and comparing them with f(a). Then, if needed, compute derivatives from the definition or using standard rules.".to_string(),
                step_correction: "Write down lim(x→a-) f(x), lim(x→a+) f(x) and f(a) explicitly, simplify each, and only then decide continuity and differentiability.".to_string(),
                complete_solution: "Outline: 1) Determine f(a). 2) Compute left-hand and right-hand limits at a. 3) Compare the three values to decide continuity. 4) If continuous, compute derivatives from the left and right at a and compare to decide differentiability.".to_string(),
            };
        }

        if lower.contains("matrix") || lower.contains("matrices") {
            return QuestionHints {
                conceptual_nudge: "Recall the basic operations on matrices and which of them are defined for the given orders.".to_string(),
                strategy_hint: "Check the order of each matrix, then apply the appropriate algebraic rule (like AB ≠ BA in general, or |AB| = |A||B| for square matrices) step by step.".to_string(),
                step_correction: "Write the matrices out in full, carefully perform the row or column operations, and double-check each entry you compute.".to_string(),
                complete_solution: "Start by writing down the shapes of the matrices. Perform the required operations explicitly, use determinant or inverse formulas where needed, and simplify the final matrix or scalar result.".to_string(),
            };
        }

        QuestionHints {
            conceptual_nudge: "Identify which topic this question belongs to and recall the key definitions involved.".to_string(),
            strategy_hint: "Restate the question in your own words, list the given information, then plan a short route from what is given to what must be shown or computed.".to_string(),
            step_correction: "Look at your last non-trivial step and check whether you applied the right formula or algebra rule; if anything seems like a guess, recompute it slowly.".to_string(),
            complete_solution: "A full worked solution is not available for this question. Use your textbook or class notes to write a clean step-by-step answer once you are confident in your reasoning.".to_string(),
        }
    }
}

fn topic_keywords(question_prompt: &str) -> Vec<&'static str> {
    let q = question_prompt.to_lowercase();
    let mut keywords = Vec::new();

    if q.contains("reflexive") || q.contains("symmetric") || q.contains("transitive") {
        keywords.extend(["reflexive", "symmetric", "transitive", "equivalence"]);
    }
    if q.contains("matrix") || q.contains("matrices") {
        keywords.extend(["determinant", "inverse", "transpose", "identity", "row", "column"]);
    }
    if q.contains("continuity") || q.contains("continuous") {
        keywords.extend([
            "limit",
            "left-hand limit",
            "right-hand limit",
            "continuous",
            "discontinuous",
        ]);
    }
    if q.contains("differentiab") {
        keywords.extend(["derivative", "differentiable", "dy/dx", "slope"]);
    }
    if q.contains("inverse trigonometric") || q.contains("tan⁻¹") || q.contains("sin⁻¹") {
        keywords.extend(["principal value", "range", "domain", "identity"]);
    }

    keywords
}
