//! Conversation assembly for the content generator.
//!
//! Pure functions from session data to ordered message lists; the services
//! layer serializes these onto the wire. The system message always comes
//! first, and historical turns appear as assistant/user pairs in
//! chronological order.

use serde::Serialize;

use crate::model::Turn;

/// System instruction for the opening question.
pub const QUIZ_MASTER_PROMPT: &str = "You are an AI quiz master. Generate multiple-choice \
     questions for a quiz. Always respond in the requested JSON format.";

/// System instruction for follow-up questions.
pub const QUIZ_MASTER_FOLLOWUP_PROMPT: &str =
    "You are an AI quiz master. Always respond in the requested JSON format.";

/// System instruction for the closing analysis.
pub const LEARNING_COACH_PROMPT: &str = "You are an AI learning coach. Analyze the user's quiz \
     performance and provide a detailed, encouraging summary in Markdown.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One entry in a generator conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Conversation requesting the very first question for a topic.
#[must_use]
pub fn first_question(topic: &str) -> Vec<Message> {
    vec![
        Message::system(QUIZ_MASTER_PROMPT),
        Message::user(format!(
            "The user wants a quiz on \"{topic}\". Generate the very first question."
        )),
    ]
}

/// Conversation requesting the next question given the turns so far.
#[must_use]
pub fn next_question(history: &[Turn]) -> Vec<Message> {
    let mut messages = Vec::with_capacity(history.len() * 2 + 2);
    messages.push(Message::system(QUIZ_MASTER_FOLLOWUP_PROMPT));

    for turn in history {
        messages.push(Message::assistant(format!(
            "Question: {}",
            turn.question().text()
        )));
        let verdict = if turn.is_correct() {
            "correct"
        } else {
            "incorrect"
        };
        messages.push(Message::user(format!(
            "I answered \"{}\". This was {verdict}.",
            turn.user_answer()
        )));
    }

    messages.push(Message::user(
        "Based on our conversation, generate the next logical question.",
    ));
    messages
}

/// Conversation requesting the closing analysis for a finished quiz.
#[must_use]
pub fn summary_request(topic: &str, history: &[Turn]) -> Vec<Message> {
    vec![
        Message::system(LEARNING_COACH_PROMPT),
        Message::user(format!(
            "The quiz on \"{topic}\" has ended. Here is the transcript:\n\n{}\n\n\
             Provide a learning analysis with these sections:\n\n\
             ### Summary of Topics\n\n### Your Learning Analysis\n\n### What You've Learned",
            transcript(history)
        )),
    ]
}

fn transcript(history: &[Turn]) -> String {
    history
        .iter()
        .map(|turn| {
            let verdict = if turn.is_correct() {
                "Correct"
            } else {
                "Incorrect"
            };
            format!(
                "Q: {}\nYour Answer: {} ({verdict})\nCorrect Answer: {}\n",
                turn.question().text(),
                turn.user_answer(),
                turn.question().correct_option()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Question, QuestionDraft, Turn};

    fn build_question(text: &str, correct_option_index: usize) -> Question {
        QuestionDraft {
            question_text: text.into(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_option_index,
            explanation: "e".into(),
        }
        .validate()
        .unwrap()
    }

    fn build_turn(text: &str, correct: usize, selected: usize) -> Turn {
        Turn::new(build_question(text, correct), selected).unwrap()
    }

    #[test]
    fn first_question_is_system_then_topic() {
        let messages = first_question("the history of tea");

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, QUIZ_MASTER_PROMPT);
        assert_eq!(messages[1].role, Role::User);
        assert!(messages[1].content.contains("\"the history of tea\""));
        assert!(messages[1].content.contains("very first question"));
    }

    #[test]
    fn next_question_interleaves_turn_pairs_in_order() {
        let history = vec![build_turn("Q1", 0, 0), build_turn("Q2", 1, 2)];

        let messages = next_question(&history);

        assert_eq!(messages.len(), 6);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[1].role, Role::Assistant);
        assert_eq!(messages[1].content, "Question: Q1");
        assert_eq!(messages[2].role, Role::User);
        assert!(messages[2].content.contains("This was correct."));
        assert_eq!(messages[3].content, "Question: Q2");
        assert!(messages[4].content.contains("This was incorrect."));
        assert_eq!(messages[5].role, Role::User);
        assert!(messages[5].content.contains("next logical question"));
    }

    #[test]
    fn summary_request_enumerates_all_turns_in_one_user_message() {
        let history: Vec<Turn> = (1..=5)
            .map(|i| build_turn(&format!("Q{i}"), 0, if i % 2 == 0 { 0 } else { 1 }))
            .collect();

        let messages = summary_request("tea", &history);

        let user_messages: Vec<_> = messages
            .iter()
            .filter(|message| message.role == Role::User)
            .collect();
        assert_eq!(user_messages.len(), 1);

        let text = &user_messages[0].content;
        let positions: Vec<_> = (1..=5)
            .map(|i| text.find(&format!("Q: Q{i}\n")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));

        for (turn, i) in history.iter().zip(1usize..) {
            let label = if turn.is_correct() {
                "(Correct)"
            } else {
                "(Incorrect)"
            };
            let block_start = positions[i - 1];
            let block_end = *positions.get(i).unwrap_or(&text.len());
            assert!(text[block_start..block_end].contains(label));
        }

        assert!(text.contains("### Summary of Topics"));
        assert!(text.contains("### Your Learning Analysis"));
        assert!(text.contains("### What You've Learned"));
    }

    #[test]
    fn message_serializes_with_lowercase_role() {
        let value = serde_json::to_value(Message::assistant("hi")).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["content"], "hi");
    }
}
