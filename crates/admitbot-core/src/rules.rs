//! Ordered keyword rules that pick a canned answer for a question.
//!
//! The table in [`ANSWER_RULES`] is evaluated top to bottom against the
//! lower-cased question and the first matching rule wins. Order carries
//! precedence: the `hostel fee` rule sits above the generic `hostel` rule,
//! and `hostel` sits above the generic `fees` rule, so a question that
//! mentions both is answered by the more specific template.

/// Answer returned when no rule matches.
pub const FALLBACK_ANSWER: &str =
    "I don't have specific information about that. Please contact the college directly.";

/// Condition a lower-cased question must satisfy for a rule to fire.
#[derive(Debug, Clone, Copy)]
pub enum Predicate {
    /// Every keyword must appear as a substring.
    All(&'static [&'static str]),
    /// At least one keyword must appear as a substring.
    Any(&'static [&'static str]),
}

impl Predicate {
    pub fn matches(&self, question_lower: &str) -> bool {
        match self {
            Predicate::All(words) => words.iter().all(|w| question_lower.contains(w)),
            Predicate::Any(words) => words.iter().any(|w| question_lower.contains(w)),
        }
    }
}

/// A (predicate, response) pair.
#[derive(Debug, Clone, Copy)]
pub struct AnswerRule {
    /// Short identifier, used in logs.
    pub name: &'static str,
    pub predicate: Predicate,
    pub answer: &'static str,
}

pub const ANSWER_RULES: &[AnswerRule] = &[
    AnswerRule {
        name: "hostel_fee",
        predicate: Predicate::All(&["hostel", "fee"]),
        answer: "The hostel fee for the academic year 2024 is $1200 per semester. This includes accommodation and basic amenities.",
    },
    AnswerRule {
        name: "hostel_rules",
        predicate: Predicate::All(&["hostel", "rule"]),
        answer: "Hostel rules include: Students must return before 9:00 PM, no visitors in rooms, maintain cleanliness, and follow cafeteria timings. For detailed rules, contact the hostel warden at +1-555-123-4570.",
    },
    AnswerRule {
        name: "hostel",
        predicate: Predicate::Any(&["hostel"]),
        answer: "Hostel information: Fee is $1200 per semester, curfew at 9:00 PM, contact hostel warden at +1-555-123-4570 for more details.",
    },
    AnswerRule {
        name: "admission",
        predicate: Predicate::Any(&["admission", "apply"]),
        answer: "Admission process: 1) Online application, 2) Document verification, 3) Entrance exam/Interview, 4) Merit list, 5) Fee payment. Contact admissions at +1-555-123-4568 or admissions@college.edu.",
    },
    AnswerRule {
        name: "documents",
        predicate: Predicate::Any(&["document", "required"]),
        answer: "Required documents: 10th/12th mark sheets, transfer certificate, character certificate, ID proof, photographs. Application fee is $50.",
    },
    AnswerRule {
        name: "courses",
        predicate: Predicate::Any(&["course", "program"]),
        answer: "We offer Engineering (CSE: $8000/sem, ME: $7500/sem, EE: $7800/sem), Business (BBA: $6500/sem, MBA: $12000/sem), Arts (BA: $5500/sem), and Computer Applications (BCA: $7000/sem, MCA: $10000/sem).",
    },
    AnswerRule {
        name: "fees",
        predicate: Predicate::Any(&["fee", "cost"]),
        answer: "Course fees range from $5500-$12000 per semester. Additional fees: Lab fee $500, Library fee $200, Sports fee $300, Development fee $1000. Hostel fee is $1200 per semester.",
    },
    AnswerRule {
        name: "contact",
        predicate: Predicate::Any(&["contact", "phone", "email"]),
        answer: "Main office: +1-555-123-4567, info@college.edu. Admissions: +1-555-123-4568, admissions@college.edu. Student services: +1-555-123-4569. Website: www.college.edu",
    },
    AnswerRule {
        name: "facilities",
        predicate: Predicate::Any(&["facility", "library", "lab"]),
        answer: "Facilities include: Central library (50,000+ books), 5 computer labs, sports complex, cafeteria, medical center, free Wi-Fi, college bus service, and more. Library hours: 8 AM-10 PM.",
    },
    AnswerRule {
        name: "scholarships",
        predicate: Predicate::Any(&["scholarship", "financial"]),
        answer: "Scholarships available: Merit-based (up to 50% fee waiver), sports scholarships, need-based financial aid, and international student scholarships. Contact student services for details.",
    },
];

/// Return the first rule whose predicate matches `question`, if any.
pub fn match_rule(question: &str) -> Option<&'static AnswerRule> {
    let lower = question.to_lowercase();
    ANSWER_RULES.iter().find(|r| r.predicate.matches(&lower))
}

/// Pick the canned answer for `question`, or [`FALLBACK_ANSWER`].
pub fn answer_for(question: &str) -> &'static str {
    match_rule(question).map_or(FALLBACK_ANSWER, |r| r.answer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_name(question: &str) -> Option<&'static str> {
        match_rule(question).map(|r| r.name)
    }

    #[test]
    fn test_hostel_fee_beats_generic_hostel_and_fees() {
        for q in [
            "What is the hostel fee?",
            "HOSTEL FEE",
            "fee for the hostel please",
            "hostel fees and rules",
        ] {
            assert_eq!(rule_name(q), Some("hostel_fee"), "question: {}", q);
        }
    }

    #[test]
    fn test_hostel_fee_answer_text() {
        assert!(answer_for("What is the hostel fee?")
            .starts_with("The hostel fee for the academic year 2024 is $1200 per semester"));
    }

    #[test]
    fn test_hostel_rules_and_generic_hostel() {
        assert_eq!(rule_name("what are the hostel rules"), Some("hostel_rules"));
        assert_eq!(rule_name("Tell me about the hostel"), Some("hostel"));
    }

    #[test]
    fn test_order_of_generic_rules() {
        assert_eq!(rule_name("How do I apply?"), Some("admission"));
        // "admission" is checked before "course"
        assert_eq!(rule_name("admission to a course"), Some("admission"));
        assert_eq!(rule_name("Which documents are required?"), Some("documents"));
        // "course" is checked before "fee"
        assert_eq!(rule_name("course fee"), Some("courses"));
        assert_eq!(rule_name("What does it cost?"), Some("fees"));
        assert_eq!(rule_name("phone number please"), Some("contact"));
        assert_eq!(rule_name("Is there a library?"), Some("facilities"));
        assert_eq!(rule_name("financial aid"), Some("scholarships"));
    }

    #[test]
    fn test_substring_not_word_match() {
        // "label" contains "lab"
        assert_eq!(rule_name("what label is this"), Some("facilities"));
    }

    #[test]
    fn test_fallback() {
        for q in ["hello", "what's the weather like", ""] {
            assert_eq!(answer_for(q), FALLBACK_ANSWER, "question: {:?}", q);
        }
    }
}
