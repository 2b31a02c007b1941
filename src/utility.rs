//! Small tool requests: time, date, coin, dice, random numbers, and
//! spell-backwards. Handled entirely locally, before retrieval or search.

use chrono::Local;
use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use crate::models::{EngineResponse, ResponseCategory};

static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"time|clock").expect("Invalid regex: TIME_RE"));
static TIME_24H_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"24.*hour|military").expect("Invalid regex: TIME_24H_RE"));
static TIME_MODIFIER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"24.*hour|military|12.*hour|standard").expect("Invalid regex: TIME_MODIFIER_RE")
});
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"date|year|month|day").expect("Invalid regex: DATE_RE"));
static COIN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"flip.*coin|coin.*toss|heads.*tails|flip again").expect("Invalid regex: COIN_RE")
});
static DICE_N_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"roll.*d(\d+)").expect("Invalid regex: DICE_N_RE"));
static DICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"roll.*dice|roll.*die|roll again").expect("Invalid regex: DICE_RE")
});
static RNG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"random number").expect("Invalid regex: RNG_RE"));
static RNG_RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)\s*(?:to|and|-)\s*(\d+)|between\s+(\d+)\s+and\s+(\d+)")
        .expect("Invalid regex: RNG_RANGE_RE")
});
static SPELL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"spell.*backwards?|reverse").expect("Invalid regex: SPELL_RE")
});
static SPELL_STRIP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"spell|backwards?|reverse|word|phrase|say|tell me how to")
        .expect("Invalid regex: SPELL_STRIP_RE")
});

/// Handles utility-style requests; returns `None` for anything else.
#[derive(Debug, Default)]
pub struct UtilityResponder;

impl UtilityResponder {
    pub fn new() -> Self {
        Self
    }

    pub fn respond(
        &self,
        query: &str,
        last_category: Option<ResponseCategory>,
    ) -> Option<EngineResponse> {
        let q = query.trim().to_lowercase();
        let mut rng = rand::thread_rng();

        // Time, including format follow-ups after a TIME answer
        let time_follow_up =
            last_category == Some(ResponseCategory::Time) && TIME_MODIFIER_RE.is_match(&q);
        if TIME_RE.is_match(&q) || time_follow_up {
            let now = Local::now();
            let time_str = if TIME_24H_RE.is_match(&q) {
                now.format("%H:%M").to_string()
            } else {
                now.format("%-I:%M %p").to_string()
            };
            debug!("Utility: time");
            return Some(EngineResponse::new(
                format!("The current time is **{}**.", time_str),
                &["System Clock"],
                ResponseCategory::Time,
            ));
        }

        if DATE_RE.is_match(&q) {
            let date_str = Local::now().format("%A, %B %-d, %Y").to_string();
            return Some(EngineResponse::new(
                format!("Today is **{}**.", date_str),
                &["System Clock"],
                ResponseCategory::Date,
            ));
        }

        if COIN_RE.is_match(&q) {
            let result = if rng.gen_bool(0.5) { "Heads" } else { "Tails" };
            return Some(EngineResponse::new(
                format!("It's **{}**!", result),
                &["Random Number Generator"],
                ResponseCategory::Coin,
            ));
        }

        if let Some(caps) = DICE_N_RE.captures(&q) {
            if let Ok(sides) = caps[1].parse::<u32>() {
                if sides > 0 {
                    let result = rng.gen_range(1..=sides);
                    return Some(EngineResponse::new(
                        format!("Rolling a d{}... **{}**!", sides, result),
                        &["Dice Roller"],
                        ResponseCategory::Dice,
                    ));
                }
            }
        }

        if DICE_RE.is_match(&q) {
            let result = rng.gen_range(1..=6);
            return Some(EngineResponse::new(
                format!("Rolling a die... **{}**!", result),
                &["Dice Roller"],
                ResponseCategory::Dice,
            ));
        }

        if RNG_RE.is_match(&q) {
            let (mut min, mut max) = (1u64, 100u64);
            if let Some(caps) = RNG_RANGE_RE.captures(&q) {
                let low = caps.get(1).or(caps.get(3)).and_then(|m| m.as_str().parse().ok());
                let high = caps.get(2).or(caps.get(4)).and_then(|m| m.as_str().parse().ok());
                if let (Some(a), Some(b)) = (low, high) {
                    min = a;
                    max = b;
                }
            }
            if min > max {
                std::mem::swap(&mut min, &mut max);
            }
            let result = rng.gen_range(min..=max);
            return Some(EngineResponse::new(
                format!("Here's a random number between {} and {}: **{}**", min, max, result),
                &["Random Number Generator"],
                ResponseCategory::Rng,
            ));
        }

        if SPELL_RE.is_match(&q) {
            let clean = SPELL_STRIP_RE.replace_all(&q, "").trim().to_string();
            let reversed: String = clean.chars().rev().collect();
            return Some(EngineResponse::new(
                format!("\"{}\" spelled backwards is **\"{}\"**.", clean, reversed),
                &["String Processor"],
                ResponseCategory::Spell,
            ));
        }

        None
    }

    /// Varied canned follow-up offered after substantial answers.
    pub fn follow_up_question(&self, topic: &str) -> String {
        let mut rng = rand::thread_rng();
        let starters = [
            "Does that make sense to you?".to_string(),
            format!("Have you explored {} before?", topic),
            "Would you like more specific details on any part of that?".to_string(),
            "What are your thoughts on this approach?".to_string(),
            "Shall I dig deeper into the history of this?".to_string(),
        ];
        starters
            .choose(&mut rng)
            .cloned()
            .unwrap_or_else(|| starters[0].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_request() {
        let utility = UtilityResponder::new();
        let response = utility.respond("what time is it", None).unwrap();
        assert_eq!(response.category, ResponseCategory::Time);
        assert!(response.text.contains("The current time is"));
        assert_eq!(response.sources, vec!["System Clock".to_string()]);
    }

    #[test]
    fn test_time_format_follow_up() {
        let utility = UtilityResponder::new();
        let response = utility
            .respond("in 24 hour format", Some(ResponseCategory::Time))
            .unwrap();
        assert_eq!(response.category, ResponseCategory::Time);
    }

    #[test]
    fn test_date_request() {
        let utility = UtilityResponder::new();
        let response = utility.respond("what is the date today", None).unwrap();
        assert_eq!(response.category, ResponseCategory::Date);
        assert!(response.text.starts_with("Today is"));
    }

    #[test]
    fn test_coin_flip() {
        let utility = UtilityResponder::new();
        let response = utility.respond("flip a coin", None).unwrap();
        assert_eq!(response.category, ResponseCategory::Coin);
        assert!(response.text.contains("Heads") || response.text.contains("Tails"));
    }

    #[test]
    fn test_dice_with_sides() {
        let utility = UtilityResponder::new();
        let response = utility.respond("roll a d20", None).unwrap();
        assert_eq!(response.category, ResponseCategory::Dice);
        assert!(response.text.contains("d20"));
    }

    #[test]
    fn test_plain_dice_roll() {
        let utility = UtilityResponder::new();
        let response = utility.respond("roll a dice", None).unwrap();
        assert_eq!(response.category, ResponseCategory::Dice);
    }

    #[test]
    fn test_random_number_in_range() {
        let utility = UtilityResponder::new();
        let response = utility
            .respond("give me a random number between 5 and 9", None)
            .unwrap();
        assert_eq!(response.category, ResponseCategory::Rng);
        assert!(response.text.contains("between 5 and 9"));
    }

    #[test]
    fn test_spell_backwards() {
        let utility = UtilityResponder::new();
        let response = utility.respond("spell banana backwards", None).unwrap();
        assert_eq!(response.category, ResponseCategory::Spell);
        assert!(response.text.contains("\"ananab\""));
        assert!(response.text.contains("\"banana\""));
    }

    #[test]
    fn test_non_utility_returns_none() {
        let utility = UtilityResponder::new();
        assert!(utility.respond("what is photosynthesis", None).is_none());
    }
}
