// src/clients/fallback.rs

use async_trait::async_trait;

use crate::clients::QuestionProvider;
use crate::errors::Result;
use crate::models::{CodingQuestion, McqQuestion, QuestionSet, SubjectiveQuestion};

pub const FALLBACK_DOMAINS: [&str; 3] = ["Java Development", "Python Development", "System Design"];

/// Small built-in question set so a session can run while the question
/// bank is unreachable.
#[derive(Debug, Clone, Default)]
pub struct FallbackQuestions;

impl FallbackQuestions {
    pub fn domains() -> Vec<String> {
        FALLBACK_DOMAINS.iter().map(|d| d.to_string()).collect()
    }

    pub fn question_set(domain: &str) -> QuestionSet {
        let domain = if domain.trim().is_empty() { "General" } else { domain };
        let options = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();

        QuestionSet {
            coding: vec![CodingQuestion {
                id: "coding-1".to_string(),
                title: "Two Sum Problem".to_string(),
                prompt: "Given an array of integers nums and an integer target, return indices of the two numbers such that they add up to target.".to_string(),
                starter_code: "function twoSum(nums, target) {\n    // Your code here\n}".to_string(),
                domain: domain.to_string(),
                difficulty: "EASY".to_string(),
            }],
            mcq: vec![
                McqQuestion {
                    id: "mcq-1".to_string(),
                    title: "Programming Fundamentals".to_string(),
                    prompt: "Which of the following is a programming language?".to_string(),
                    options: options(&["Java", "HTML", "CSS", "SQL"]),
                    multiple_selection: false,
                    difficulty: "EASY".to_string(),
                },
                McqQuestion {
                    id: "mcq-2".to_string(),
                    title: "Database Concepts".to_string(),
                    prompt: "Which SQL command is used to retrieve data from a database?".to_string(),
                    options: options(&["INSERT", "SELECT", "UPDATE", "DELETE"]),
                    multiple_selection: false,
                    difficulty: "EASY".to_string(),
                },
                McqQuestion {
                    id: "mcq-3".to_string(),
                    title: "Web Development".to_string(),
                    prompt: "Which of the following are frontend technologies? (Select multiple)".to_string(),
                    options: options(&["Angular", "React", "Node.js", "MongoDB"]),
                    multiple_selection: true,
                    difficulty: "MEDIUM".to_string(),
                },
            ],
            subjective: Self::subjective_questions(domain),
        }
    }

    pub fn subjective_questions(domain: &str) -> Vec<SubjectiveQuestion> {
        let prompts = [
            ("Project Experience", "Describe a challenging project you worked on and how you handled the hardest technical problem in it."),
            ("Debugging", "Walk through how you would track down a bug that only shows up in production."),
            ("Design Trade-offs", "Explain a design decision where you had to trade performance against maintainability."),
            ("Collaboration", "How do you review code from teammates and handle disagreement about an approach?"),
        ];

        prompts
            .iter()
            .enumerate()
            .map(|(i, (title, prompt))| SubjectiveQuestion {
                id: format!("subjective-{}", i + 1),
                title: title.to_string(),
                prompt: prompt.to_string(),
                domain: domain.to_string(),
                difficulty: "MEDIUM".to_string(),
            })
            .collect()
    }
}

#[async_trait]
impl QuestionProvider for FallbackQuestions {
    async fn available_domains(&self) -> Result<Vec<String>> {
        Ok(Self::domains())
    }

    async fn fetch_question_set(&self, domain: &str, _experience_years: u32) -> Result<QuestionSet> {
        Ok(Self::question_set(domain))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_set_has_one_multi_select_question() {
        let set = FallbackQuestions::question_set("Java Development");
        assert_eq!(set.coding.len(), 1);
        assert_eq!(set.mcq.len(), 3);
        assert_eq!(set.subjective.len(), 4);
        assert_eq!(set.mcq.iter().filter(|q| q.multiple_selection).count(), 1);
        assert_eq!(set.coding[0].domain, "Java Development");
    }

    #[test]
    fn blank_domain_becomes_general() {
        let set = FallbackQuestions::question_set("  ");
        assert_eq!(set.subjective[0].domain, "General");
    }
}
