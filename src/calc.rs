//! Arithmetic evaluation for math-style queries.
//!
//! Word operators are normalized ("5 plus 5" -> "5+5"), multiple
//! expressions in one query are split and answered together, and the
//! expressions themselves go through a small shunting-yard evaluator.

use regex::Regex;
use std::sync::LazyLock;

static OPERATOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[+\-*/^]|\b(plus|minus|times|divided by|multiplied by|squared|cubed)\b")
        .expect("Invalid regex: OPERATOR_RE")
});
static CALC_COMMAND_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(calculate|compute|solve)\s+.+").expect("Invalid regex: CALC_COMMAND_RE")
});
static INTRO_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"what is|calculate|compute|solve").expect("Invalid regex: INTRO_RE")
});
static SYMBOL_SPACING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*([+\-*/^()])\s*").expect("Invalid regex: SYMBOL_SPACING_RE")
});
static PART_SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\s,;]+|\band\b").expect("Invalid regex: PART_SPLIT_RE")
});
static WORD_OPS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\s*\bdivided\s+by\b\s*", "/"),
        (r"\s*\bmultiplied\s+by\b\s*", "*"),
        (r"\s*\bplus\b\s*", "+"),
        (r"\s*\bminus\b\s*", "-"),
        (r"\s*\btimes\b\s*", "*"),
        (r"\s*\bsquared\b", "^2"),
        (r"\s*\bcubed\b", "^3"),
    ]
    .into_iter()
    .map(|(pattern, repl)| {
        (
            Regex::new(pattern).expect("Invalid regex: WORD_OPS"),
            repl,
        )
    })
    .collect()
});

/// A query is mathematical when it mixes digits with operators, or opens
/// with an explicit calculation command.
pub fn is_math_query(query: &str) -> bool {
    let clean = query.to_lowercase();
    let has_numbers = clean.chars().any(|c| c.is_ascii_digit());
    let has_operators = OPERATOR_RE.is_match(&clean);

    (has_numbers && has_operators) || CALC_COMMAND_RE.is_match(&clean)
}

/// Evaluate every expression found in the query; `None` when nothing
/// evaluates.
pub fn calculate(query: &str) -> Option<String> {
    let mut cleaned = INTRO_RE.replace_all(&query.to_lowercase(), "").to_string();

    for (pattern, repl) in WORD_OPS.iter() {
        cleaned = pattern.replace_all(&cleaned, *repl).to_string();
    }

    cleaned = SYMBOL_SPACING_RE.replace_all(&cleaned, "$1").to_string();

    let mut results: Vec<(String, f64)> = Vec::new();
    for part in PART_SPLIT_RE.split(&cleaned) {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some(value) = evaluate(part) {
            results.push((part.to_string(), value));
        }
    }

    match results.len() {
        0 => None,
        1 => Some(format!("The answer is {}", format_number(results[0].1))),
        _ => {
            let mut response = "Here are the answers:\n\n".to_string();
            for (expr, value) in &results {
                response.push_str(&format!("\u{2022} {} = **{}**\n", expr, format_number(*value)));
            }
            Some(response)
        }
    }
}

fn format_number(value: f64) -> String {
    if value.fract().abs() < f64::EPSILON {
        format!("{}", value as i64)
    } else {
        format!("{:.4}", value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Op(char),
    LParen,
    RParen,
}

fn tokenize_expr(expr: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = expr.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '0'..='9' | '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let number: f64 = chars[start..i].iter().collect::<String>().parse().ok()?;
                tokens.push(Token::Number(number));
                continue;
            }
            '+' | '*' | '/' | '^' => tokens.push(Token::Op(c)),
            '-' => {
                // Unary minus folds into the following number
                let unary = matches!(
                    tokens.last(),
                    None | Some(Token::Op(_)) | Some(Token::LParen)
                );
                if unary {
                    let start = i + 1;
                    let mut end = start;
                    while end < chars.len() && (chars[end].is_ascii_digit() || chars[end] == '.') {
                        end += 1;
                    }
                    if end == start {
                        return None;
                    }
                    let number: f64 =
                        chars[start..end].iter().collect::<String>().parse().ok()?;
                    tokens.push(Token::Number(-number));
                    i = end;
                    continue;
                }
                tokens.push(Token::Op(c));
            }
            '(' => tokens.push(Token::LParen),
            ')' => tokens.push(Token::RParen),
            c if c.is_whitespace() => {}
            _ => return None,
        }
        i += 1;
    }

    if tokens.iter().any(|t| matches!(t, Token::Number(_))) {
        Some(tokens)
    } else {
        None
    }
}

fn precedence(op: char) -> u8 {
    match op {
        '^' => 3,
        '*' | '/' => 2,
        _ => 1,
    }
}

/// Shunting-yard evaluation; `None` for malformed or non-finite results.
fn evaluate(expr: &str) -> Option<f64> {
    let tokens = tokenize_expr(expr)?;

    let mut output: Vec<f64> = Vec::new();
    let mut ops: Vec<Token> = Vec::new();

    fn apply(output: &mut Vec<f64>, op: char) -> Option<()> {
        let right = output.pop()?;
        let left = output.pop()?;
        let value = match op {
            '+' => left + right,
            '-' => left - right,
            '*' => left * right,
            '/' => left / right,
            '^' => left.powf(right),
            _ => return None,
        };
        output.push(value);
        Some(())
    }

    for token in tokens {
        match token {
            Token::Number(n) => output.push(n),
            Token::Op(op) => {
                while let Some(Token::Op(top)) = ops.last() {
                    let top = *top;
                    // '^' is right-associative
                    let pop = if op == '^' {
                        precedence(top) > precedence(op)
                    } else {
                        precedence(top) >= precedence(op)
                    };
                    if !pop {
                        break;
                    }
                    ops.pop();
                    apply(&mut output, top)?;
                }
                ops.push(Token::Op(op));
            }
            Token::LParen => ops.push(Token::LParen),
            Token::RParen => {
                loop {
                    match ops.pop() {
                        Some(Token::Op(op)) => apply(&mut output, op)?,
                        Some(Token::LParen) => break,
                        _ => return None,
                    }
                }
            }
        }
    }

    while let Some(token) = ops.pop() {
        match token {
            Token::Op(op) => apply(&mut output, op)?,
            _ => return None,
        }
    }

    if output.len() != 1 {
        return None;
    }
    let result = output[0];
    if result.is_finite() {
        Some(result)
    } else {
        None
    }
}
