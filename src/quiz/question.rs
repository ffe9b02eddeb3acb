//! Question generation
//!
//! Builds one multiple-choice question for a category and level. Operands come
//! from [`level_params`]; the extended word-problem categories draw their own
//! small ranges. Each question carries exactly [`CHOICE_COUNT`] distinct
//! choices, one of which is the answer.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::level::{LevelParams, level_params};
use super::{Category, Value};
use crate::consts::CHOICE_COUNT;

/// Largest whole-unit offset tried for a distractor
pub const DISTRACTOR_SPREAD: i64 = 3;

/// Random draws before the distractor loop falls back to counting upward
pub const MAX_DISTRACTOR_ATTEMPTS: u32 = 64;

/// One quiz question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub category: Category,
    /// Prompt shown to the player (without the trailing "= ?")
    pub prompt: String,
    pub answer: Value,
    /// Presentation order; always contains `answer`
    pub choices: Vec<Value>,
    /// Optional explanation shown under the prompt
    pub hint: Option<String>,
}

impl Question {
    pub fn is_correct(&self, choice: Value) -> bool {
        choice == self.answer
    }

    /// Index of the correct choice
    pub fn answer_index(&self) -> Option<usize> {
        self.choices.iter().position(|c| *c == self.answer)
    }
}

/// Generate a question for `category` at `level`
pub fn generate_question<R: Rng + ?Sized>(category: Category, level: u32, rng: &mut R) -> Question {
    let params = level_params(level, category);
    let (prompt, answer, hint) = match category {
        Category::Addition => addition(params, rng),
        Category::Subtraction => subtraction(params, rng),
        Category::Multiplication => multiplication(params, rng),
        Category::Division => division(params, rng),
        Category::Geometry => geometry(params, rng),
        Category::Fractions => fractions(rng),
        Category::Time => time(rng),
        Category::Units => units(rng),
        Category::Decimals => decimals(rng),
    };
    let choices = build_choices(answer, rng);

    Question {
        category,
        prompt,
        answer,
        choices,
        hint,
    }
}

type Generated = (String, Value, Option<String>);

fn operand<R: Rng + ?Sized>(params: LevelParams, rng: &mut R) -> i64 {
    rng.random_range(params.min..=params.max)
}

fn addition<R: Rng + ?Sized>(params: LevelParams, rng: &mut R) -> Generated {
    let a = operand(params, rng);
    let b = operand(params, rng);
    (format!("{a} + {b}"), Value::whole(a + b), None)
}

fn subtraction<R: Rng + ?Sized>(params: LevelParams, rng: &mut R) -> Generated {
    let mut a = operand(params, rng);
    let mut b = operand(params, rng);
    if a < b {
        std::mem::swap(&mut a, &mut b);
    }
    (format!("{a} - {b}"), Value::whole(a - b), None)
}

fn multiplication<R: Rng + ?Sized>(params: LevelParams, rng: &mut R) -> Generated {
    let a = operand(params, rng);
    let b = operand(params, rng);
    (format!("{a} × {b}"), Value::whole(a * b), None)
}

/// Built backwards from divisor and quotient so there is never a remainder
fn division<R: Rng + ?Sized>(params: LevelParams, rng: &mut R) -> Generated {
    let divisor = operand(params, rng);
    let quotient = operand(params, rng);
    let dividend = divisor * quotient;
    (format!("{dividend} ÷ {divisor}"), Value::whole(quotient), None)
}

fn geometry<R: Rng + ?Sized>(params: LevelParams, rng: &mut R) -> Generated {
    let a = operand(params, rng);
    let b = operand(params, rng);
    match rng.random_range(0..3) {
        0 => (
            format!("What is the area of a square with {a}cm sides (cm²)?"),
            Value::whole(a * a),
            Some("Square area = side × side".to_string()),
        ),
        1 => (
            format!("What is the area of a {a}cm by {b}cm rectangle (cm²)?"),
            Value::whole(a * b),
            Some("Rectangle area = width × height".to_string()),
        ),
        _ => (
            // Rounded down so the answer stays whole
            format!("What is the area of a triangle with base {a}cm and height {b}cm (cm², rounded down)?"),
            Value::whole(a * b / 2),
            Some("Triangle area = base × height ÷ 2".to_string()),
        ),
    }
}

/// Same-denominator fractions; the answer is the resulting numerator
fn fractions<R: Rng + ?Sized>(rng: &mut R) -> Generated {
    let denom = rng.random_range(2..=9);
    let mut n1 = rng.random_range(1..denom);
    let mut n2 = rng.random_range(1..denom);
    let hint = Some(format!(
        "Same denominator: only the numerators change. Answer with the numerator over {denom}."
    ));
    if rng.random_bool(0.5) {
        (format!("{n1}/{denom} + {n2}/{denom}"), Value::whole(n1 + n2), hint)
    } else {
        if n1 < n2 {
            std::mem::swap(&mut n1, &mut n2);
        }
        (format!("{n1}/{denom} - {n2}/{denom}"), Value::whole(n1 - n2), hint)
    }
}

fn clock<R: Rng + ?Sized>(rng: &mut R) -> (i64, i64) {
    (rng.random_range(1..=12), rng.random_range(0..60))
}

fn time<R: Rng + ?Sized>(rng: &mut R) -> Generated {
    let hint = Some("1 hour = 60 minutes".to_string());
    if rng.random_bool(0.5) {
        let (h, m) = clock(rng);
        (
            format!("How many minutes is {h} h {m} min?"),
            Value::whole(h * 60 + m),
            hint,
        )
    } else {
        let (h1, m1) = clock(rng);
        let (h2, m2) = clock(rng);
        let t1 = h1 * 60 + m1;
        let t2 = h2 * 60 + m2;
        // Earlier time first
        let ((sh, sm), (eh, em)) = if t1 < t2 { ((h1, m1), (h2, m2)) } else { ((h2, m2), (h1, m1)) };
        (
            format!("How many minutes from {sh}:{sm:02} to {eh}:{em:02}?"),
            Value::whole((t1 - t2).abs()),
            hint,
        )
    }
}

fn units<R: Rng + ?Sized>(rng: &mut R) -> Generated {
    if rng.random_bool(0.5) {
        let cm = rng.random_range(1..=1000);
        (
            format!("How many whole metres are in {cm}cm?"),
            Value::whole(cm / 100),
            Some("1m = 100cm".to_string()),
        )
    } else {
        let g = rng.random_range(1..=1000);
        (
            format!("How many whole kilograms are in {g}g?"),
            Value::whole(g / 1000),
            Some("1kg = 1000g".to_string()),
        )
    }
}

fn decimals<R: Rng + ?Sized>(rng: &mut R) -> Generated {
    let a = Value::from_tenths(rng.random_range(0..=100));
    let b = Value::from_tenths(rng.random_range(0..=100));
    let hint = Some("Line up the decimal points".to_string());
    if rng.random_bool(0.5) {
        (
            format!("{a} + {b}"),
            Value::from_tenths(a.tenths() + b.tenths()),
            hint,
        )
    } else {
        let (hi, lo) = if a < b { (b, a) } else { (a, b) };
        (
            format!("{hi} - {lo}"),
            Value::from_tenths(hi.tenths() - lo.tenths()),
            hint,
        )
    }
}

/// Answer plus three distinct distractors, shuffled
///
/// Distractors sit within ±[`DISTRACTOR_SPREAD`] whole units of the answer.
/// A non-positive candidate is folded to the positive side of the answer.
/// Small answers can starve the random window, so after
/// [`MAX_DISTRACTOR_ATTEMPTS`] draws the remainder is filled with
/// `answer + 1`, `answer + 2`, ...
pub fn build_choices<R: Rng + ?Sized>(answer: Value, rng: &mut R) -> Vec<Value> {
    let mut choices = Vec::with_capacity(CHOICE_COUNT);
    choices.push(answer);

    let mut attempts = 0;
    while choices.len() < CHOICE_COUNT && attempts < MAX_DISTRACTOR_ATTEMPTS {
        attempts += 1;
        let delta = rng.random_range(-DISTRACTOR_SPREAD..=DISTRACTOR_SPREAD);
        let mut wrong = answer.offset(delta);
        if !wrong.is_positive() {
            wrong = answer.offset(delta.abs() + 1);
        }
        if wrong != answer && !choices.contains(&wrong) {
            choices.push(wrong);
        }
    }

    if choices.len() < CHOICE_COUNT {
        log::debug!("Distractor draws exhausted for answer {answer}, filling upward");
        let mut step = 1;
        while choices.len() < CHOICE_COUNT {
            let wrong = answer.offset(step);
            if !choices.contains(&wrong) {
                choices.push(wrong);
            }
            step += 1;
        }
    }

    choices.shuffle(rng);
    choices
}
