//! Intent rule bank.
//!
//! Each rule is an independent pattern test over the raw or lowercased
//! query, paired with a hand-assigned confidence reflecting rule
//! specificity. Any number of rules may fire for a single query; no rule
//! "wins" here.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use crate::calc::is_math_query;
use crate::models::ResponseCategory;

/// Detected intent category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentKind {
    Greeting,
    Farewell,
    Gratitude,
    Casual,
    PersonalSharing,
    Question,
    HowTo,
    WhyCause,
    Definition,
    Comparison,
    List,
    Creative,
    Brainstorm,
    Paraphrase,
    Translate,
    Correction,
    Explain,
    Confusion,
    Summarize,
    Analysis,
    Recommendation,
    Opinion,
    Confirmation,
    Negation,
    Math,
    Code,
    Calculation,
    Meta,
    FollowUp,
    ToneAdjust,
    Expand,
    Simplify,
    StepByStep,
    Troubleshoot,
    Historical,
    Future,
    Verification,
    Utility,
    General,
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Input handed to every rule predicate.
pub(crate) struct RuleInput<'a> {
    /// Original query with casing preserved.
    pub raw: &'a str,
    /// Trimmed, lowercased query.
    pub lower: &'a str,
    /// Category of the previous turn's output, for follow-up modifiers.
    pub last_category: Option<ResponseCategory>,
}

/// One declarative rule: predicate, tag, confidence.
pub(crate) struct IntentRule {
    pub kind: IntentKind,
    pub confidence: f32,
    pub test: fn(&RuleInput) -> bool,
}

macro_rules! rule_regex {
    ($name:ident, $pattern:expr) => {
        static $name: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new($pattern).expect(concat!("Invalid regex: ", stringify!($name)))
        });
    };
}

rule_regex!(
    GREETING_RE,
    r"^(hi|hello|hey|greetings|howdy|sup|yo|good (morning|afternoon|evening)|hola|bonjour)\b"
);
rule_regex!(
    FAREWELL_RE,
    r"^(bye|goodbye|see you|farewell|take care|later|cya|so long|good night)\b"
);
rule_regex!(GRATITUDE_RE, r"\b(thank|thanks|thx|appreciate|grateful|cheers)\b");
rule_regex!(
    CASUAL_RE,
    r"^(how are you|how.*(it|things|life).*going|what.*\bup\b|good day|nice to meet|who.*you|tell me about yourself)"
);
rule_regex!(CASUAL_ENTITY_GUARD_RE, r"who (is|are|was|were) (the |a |an )?[A-Z]");
rule_regex!(
    COMPLIMENT_RE,
    r"(you.*(cool|awesome|smart|helpful|funny|great)|good job|well done)"
);
rule_regex!(
    PERSONAL_RE,
    r"^i (really |just )?(love|like|hate|dislike|enjoy|prefer|think|feel|believe|am)\b"
);
rule_regex!(QUESTION_RE, r"^(what|who|where|when|which)\s");
rule_regex!(HOW_TO_RE, r"^how (do|can|to|should|would)\s|how to\s|way to\s");
rule_regex!(WHY_RE, r"^why\s|what (causes|caused|makes|reason)");
rule_regex!(
    DEFINITION_RE,
    r"what (is|are|was|were) (the )?(definition|meaning) of|\bdefine\b|what does .*mean|meaning of"
);
rule_regex!(
    COMPARISON_RE,
    r"\bcompare\b|difference between|\bversus\b|\bvs\.?\b|better than|worse than|similar to|distinguish"
);
rule_regex!(
    LIST_RE,
    r"\blist\b|name .*all|what are (the|some)|give me .*examples|types of|kinds of|categories"
);
rule_regex!(CREATIVE_VERB_RE, r"\b(write|create|make|generate|compose|prepare)\b");
rule_regex!(
    CREATIVE_FORM_RE,
    r"\b(story|essay|article|poem|letter|email|script|speech|lyrics)\b"
);
rule_regex!(MAKE_ME_RE, r"make (me )?a (story|essay|poem|recipe|plan)");
rule_regex!(
    BRAINSTORM_RE,
    r"brainstorm|ideas for|suggest|come up with|think of|inspiration|options for"
);
rule_regex!(
    PARAPHRASE_RE,
    r"rephrase|paraphrase|reword|say .*different|put .*different|another way|rewrite|word it differently"
);
rule_regex!(
    TRANSLATE_RE,
    r"\btranslate\b|\btranslation\b|in .*language|how do you say .*in"
);
rule_regex!(
    CORRECTION_RE,
    r"\bcorrect\b|\bfix\b|grammar|spelling|mistake|\berror\b|\bwrong\b|proofread|\bedit\b"
);
rule_regex!(
    EXPLAIN_RE,
    r"\bexplain\b|\bdescribe\b|tell .*about|\bdefine\b|clarify|elaborate|break down|walk .*through|help me understand"
);
rule_regex!(CONFUSION_SHORT_RE, r"^(huh|what\??|eh\??)$");
rule_regex!(
    CONFUSION_RE,
    r"what (do|did) you (mean|say)|i don't (get|understand)|confused|what are you doing|make sense"
);
rule_regex!(
    SUMMARIZE_RE,
    r"summari[sz]e|sum up|\bsummary\b|\bbrief\b|short version|tldr|condense|digest|overview|main points"
);
rule_regex!(
    ANALYSIS_RE,
    r"analy[sz]e|analysis|examine|evaluate|assess|\breview\b|pros and cons|benefits of"
);
rule_regex!(
    RECOMMENDATION_RE,
    r"recommend|suggestion|should i|what .*best|advice|tips|which .*choose|good .*for"
);
rule_regex!(
    OPINION_RE,
    r"what .*think|your opinion|do you (like|prefer)|thoughts on|believe"
);
rule_regex!(OPINION_GUARD_RE, r"what (do|does) \w+ think");
rule_regex!(
    CONFIRMATION_RE,
    r"^(yes|yeah|yep|sure)\b|^(absolutely|correct|right|i do|please|go ahead)$"
);
rule_regex!(NEGATION_RE, r"^(no|nope|nah)\b|^(not really|i don't|wrong|stop|cancel)$");
rule_regex!(
    CALCULATION_RE,
    r"calculate|compute|figure out|work out|how (much|many)|solve"
);
rule_regex!(CALCULATION_OPERAND_RE, r"\d|plus|minus|times|divided");
rule_regex!(FOLLOWUP_IT_RE, r"what about it|tell me more about it");
rule_regex!(
    TONE_ADJUST_RE,
    r"make .*more|make .*less|convert .*to|change .*tone|more formal|less formal|casual|professional|wittier|funnier"
);
rule_regex!(
    EXPAND_RE,
    r"\bexpand\b|elaborate|more detail|tell me more|go deeper|longer version|make it longer|continue"
);
rule_regex!(
    SIMPLIFY_RE,
    r"simplify|simpler|easier|eli5|explain like|dumb .*down|\bbasic\b|too complex"
);
rule_regex!(
    STEP_RE,
    r"step by step|\bsteps\b|instructions|\bguide\b|tutorial|how .*process|procedure for"
);
rule_regex!(
    TROUBLESHOOT_RE,
    r"troubleshoot|problem|issue|not working|help .*fix|debug|\berror\b|\bfail\b"
);
rule_regex!(
    HISTORICAL_RE,
    r"history of|historical|in the past|back then|ancient|origin|biography|life of"
);
rule_regex!(
    FUTURE_RE,
    r"\bfuture\b|will .*be|predict|forecast|what .*happen|upcoming|trends"
);
rule_regex!(
    VERIFICATION_RE,
    r"is (it|this|that) (true|correct|right)|verify|confirm|fact check|are you sure"
);
rule_regex!(TIME_MODIFIER_RE, r"24.*hour|military|12.*hour|standard");
rule_regex!(ROLL_AGAIN_RE, r"again|another|one more|roll|flip");
rule_regex!(
    SHORT_ACK_RE,
    r"^(cool|nice|awesome|great|ok|okay|wow|sweet|good|thanks|thank you|thx|understood|got it)!?$"
);
rule_regex!(UTILITY_TIME_RE, r"time|date|clock|year|month|day is it");
rule_regex!(UTILITY_TIME_CUE_RE, r"what|current|tell me");
rule_regex!(
    UTILITY_RANDOM_RE,
    r"random number|pick a number|roll a dice|roll a die|roll d\d+|flip a coin|coin toss|heads or tails"
);
rule_regex!(UTILITY_SPELL_RE, r"spell .*backwards?|reverse .*word|backwards? spelling");

// Helper banks shared with the dispatch pipeline.

rule_regex!(META_IDENTITY_RE, r"^((who|what) (are|is) (you|recall)|your name|tell me about (yourself|you|recall)|introduce yourself)");
rule_regex!(
    META_CAPABILITY_RE,
    r"^(can you (help|assist|do|make|create|write|code|answer|explain|tell|show|teach)|are you (able|capable)|do you (know|understand|have|support|offer|provide|code|program)|will you|could you)"
);
rule_regex!(
    META_PURPOSE_RE,
    r"what can you do|what are you (for|good at|capable of)|what (is|are) your (purpose|function|capabilities|features|abilities)|how do you work|what do you do|what version"
);
rule_regex!(PERSONAL_STATEMENT_RE, r"^i (love|like|think|feel|am|really|just|want|don't)");
rule_regex!(SEARCH_WH_RE, r"^(what|who) (is|are|was|were)\s+(?:a |an |the )?(\w+)");
rule_regex!(SEARCH_WHERE_WHEN_RE, r"^(where (is|are|was|were)|when (did|was|were|is)|why (is|are|was|were|did|do|does))");
rule_regex!(SEARCH_HOW_RE, r"^how (does|do|did|is|are)\s+(\w+)");
rule_regex!(SEARCH_TELL_RE, r"^(tell me about|explain|describe|define)\s+(\w+)");
rule_regex!(SEARCH_FACTS_RE, r"^(facts about|information on|details about)");
rule_regex!(MULTIWORD_PROPER_RE, r"\b[A-Z][a-z]+(\s+[A-Z][a-z]+)+\b");
rule_regex!(CODE_START_RE, r"^code (a|an|the|something|me)\b");
rule_regex!(
    CODE_WRITE_RE,
    r"^(write|create|make|generate|build) (a |an |the |some )?(code|program|script|function|class)\b"
);
rule_regex!(
    CODE_LANG_RE,
    r"^(write|create|make|generate).*(in|using|with) (python|javascript|java|c\+\+|ruby|php)"
);
rule_regex!(CODE_MISC_RE, r"code.*(generator|calculator|converter|function)|write.*code.*for");
rule_regex!(
    FOLLOWUP_WORD_RE,
    r"\b(it|that|this|longer|shorter|more|detail|elaborate|continue|again|summari[sz]e|summary)\b"
);

/// Identity and capability questions about the assistant itself.
pub fn is_meta_query(query: &str) -> bool {
    let q = query.trim().to_lowercase();
    META_IDENTITY_RE.is_match(&q) || META_CAPABILITY_RE.is_match(&q) || META_PURPOSE_RE.is_match(&q)
}

/// Questions that call for external knowledge rather than conversation.
pub fn is_search_query(query: &str) -> bool {
    if is_meta_query(query) {
        return false;
    }
    let q = query.trim().to_lowercase();
    if PERSONAL_STATEMENT_RE.is_match(&q) {
        return false;
    }

    if let Some(caps) = SEARCH_WH_RE.captures(&q) {
        if let Some(subject) = caps.get(3) {
            if !matches!(subject.as_str(), "you" | "your" | "recall") {
                return true;
            }
        }
    }
    if SEARCH_WHERE_WHEN_RE.is_match(&q) {
        return true;
    }
    if let Some(caps) = SEARCH_HOW_RE.captures(&q) {
        if let Some(subject) = caps.get(2) {
            if !matches!(subject.as_str(), "you" | "this" | "recall") {
                return true;
            }
        }
    }
    if let Some(caps) = SEARCH_TELL_RE.captures(&q) {
        if let Some(subject) = caps.get(2) {
            if !matches!(subject.as_str(), "yourself" | "you" | "recall") {
                return true;
            }
        }
    }
    if SEARCH_FACTS_RE.is_match(&q) {
        return true;
    }

    // Multi-word proper nouns usually name an external entity
    MULTIWORD_PROPER_RE.is_match(query)
}

/// Requests to produce program code.
pub fn is_coding_request(query: &str) -> bool {
    let q = query.trim().to_lowercase();
    CODE_START_RE.is_match(&q)
        || CODE_WRITE_RE.is_match(&q)
        || CODE_LANG_RE.is_match(&q)
        || CODE_MISC_RE.is_match(&q)
}

/// Short inputs that only make sense relative to the previous turn.
pub fn is_contextual_follow_up(query: &str) -> bool {
    FOLLOWUP_WORD_RE.is_match(&query.to_lowercase())
}

fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// The full rule bank, evaluated independently and in no particular order.
pub(crate) static RULES: &[IntentRule] = &[
    IntentRule {
        kind: IntentKind::Greeting,
        confidence: 0.95,
        test: |i| GREETING_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Farewell,
        confidence: 0.95,
        test: |i| FAREWELL_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Gratitude,
        confidence: 0.95,
        test: |i| GRATITUDE_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Casual,
        confidence: 0.92,
        test: |i| CASUAL_RE.is_match(i.lower) && !CASUAL_ENTITY_GUARD_RE.is_match(i.raw),
    },
    IntentRule {
        kind: IntentKind::Casual,
        confidence: 0.9,
        test: |i| COMPLIMENT_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::PersonalSharing,
        confidence: 0.9,
        test: |i| PERSONAL_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Question,
        confidence: 0.9,
        test: |i| QUESTION_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::HowTo,
        confidence: 0.92,
        test: |i| HOW_TO_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::WhyCause,
        confidence: 0.9,
        test: |i| WHY_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Definition,
        confidence: 0.95,
        test: |i| DEFINITION_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Comparison,
        confidence: 0.9,
        test: |i| COMPARISON_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::List,
        confidence: 0.88,
        test: |i| LIST_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Creative,
        confidence: 0.9,
        test: |i| CREATIVE_VERB_RE.is_match(i.lower) && CREATIVE_FORM_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Creative,
        confidence: 0.9,
        test: |i| MAKE_ME_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Brainstorm,
        confidence: 0.85,
        test: |i| BRAINSTORM_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Paraphrase,
        confidence: 0.95,
        test: |i| PARAPHRASE_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Translate,
        confidence: 0.92,
        test: |i| TRANSLATE_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Correction,
        confidence: 0.88,
        test: |i| CORRECTION_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Explain,
        confidence: 0.85,
        test: |i| EXPLAIN_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Confusion,
        confidence: 0.99,
        test: |i| CONFUSION_SHORT_RE.is_match(i.lower) || CONFUSION_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Explain,
        confidence: 0.6,
        test: |i| i.lower.contains("what is") && word_count(i.lower) > 3,
    },
    IntentRule {
        kind: IntentKind::Summarize,
        confidence: 0.95,
        test: |i| SUMMARIZE_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Analysis,
        confidence: 0.88,
        test: |i| ANALYSIS_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Recommendation,
        confidence: 0.87,
        test: |i| RECOMMENDATION_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Opinion,
        confidence: 0.82,
        test: |i| OPINION_RE.is_match(i.lower) && !OPINION_GUARD_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Confirmation,
        confidence: 0.95,
        test: |i| CONFIRMATION_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Negation,
        confidence: 0.95,
        test: |i| NEGATION_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Math,
        confidence: 0.95,
        test: |i| is_math_query(i.lower),
    },
    IntentRule {
        kind: IntentKind::Code,
        confidence: 0.9,
        test: |i| is_coding_request(i.lower),
    },
    IntentRule {
        kind: IntentKind::Calculation,
        confidence: 0.88,
        test: |i| CALCULATION_RE.is_match(i.lower) && CALCULATION_OPERAND_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Meta,
        confidence: 0.9,
        test: |i| is_meta_query(i.lower),
    },
    IntentRule {
        kind: IntentKind::FollowUp,
        confidence: 0.8,
        test: |i| is_contextual_follow_up(i.lower),
    },
    IntentRule {
        kind: IntentKind::FollowUp,
        confidence: 0.85,
        test: |i| FOLLOWUP_IT_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::ToneAdjust,
        confidence: 0.85,
        test: |i| TONE_ADJUST_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Expand,
        confidence: 0.95,
        test: |i| EXPAND_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Simplify,
        confidence: 0.9,
        test: |i| SIMPLIFY_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::StepByStep,
        confidence: 0.87,
        test: |i| STEP_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Troubleshoot,
        confidence: 0.85,
        test: |i| TROUBLESHOOT_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Historical,
        confidence: 0.83,
        test: |i| HISTORICAL_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Future,
        confidence: 0.8,
        test: |i| FUTURE_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Verification,
        confidence: 0.85,
        test: |i| VERIFICATION_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Utility,
        confidence: 0.99,
        test: |i| {
            i.last_category == Some(ResponseCategory::Time) && TIME_MODIFIER_RE.is_match(i.lower)
        },
    },
    IntentRule {
        kind: IntentKind::Utility,
        confidence: 0.99,
        test: |i| {
            matches!(
                i.last_category,
                Some(ResponseCategory::Dice) | Some(ResponseCategory::Coin)
            ) && ROLL_AGAIN_RE.is_match(i.lower)
        },
    },
    IntentRule {
        kind: IntentKind::Casual,
        confidence: 1.0,
        test: |i| SHORT_ACK_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Utility,
        confidence: 0.96,
        test: |i| UTILITY_TIME_RE.is_match(i.lower) && UTILITY_TIME_CUE_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Utility,
        confidence: 0.96,
        test: |i| UTILITY_RANDOM_RE.is_match(i.lower),
    },
    IntentRule {
        kind: IntentKind::Utility,
        confidence: 0.96,
        test: |i| UTILITY_SPELL_RE.is_match(i.lower),
    },
];
