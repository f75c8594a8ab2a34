use crate::template::*;
use app_dto::chat::ConversationMessage;
use app_schema::community::CommunityMatch;
use app_search::knowledge::SearchResult;

const QUESTION_PREVIEW_CHARS: usize = 200;
const ANSWER_PREVIEW_CHARS: usize = 500;

/// Last [`HISTORY_WINDOW`] messages as `Role: text`, blank-line separated.
pub fn render_history(history: &[ConversationMessage]) -> String {
    if history.is_empty() {
        return HISTORY_PLACEHOLDER.to_string();
    }
    let start = history.len().saturating_sub(HISTORY_WINDOW);
    history[start..]
        .iter()
        .map(|m| format!("{}: {}", m.role.label(), m.content))
        .collect::<Vec<String>>()
        .join("\n\n")
}

fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

pub fn format_knowledge_block(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return String::new();
    }
    let articles = results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "[Knowledge Base Article {}]\nTitle: {}\nCategory: {}\nContent: {}\nRelevance: {}\nMatched Keywords: {}\n---",
                i + 1,
                r.article.title,
                r.article.category,
                r.article.content,
                r.relevance_score,
                r.matched_keywords.join(", ")
            )
        })
        .collect::<Vec<String>>()
        .join("\n\n");
    format!("\n\n{KNOWLEDGE_HEADER}\n\n{articles}\n\n{KNOWLEDGE_FOOTER}")
}

pub fn format_community_block(results: &[CommunityMatch]) -> String {
    if results.is_empty() {
        return String::new();
    }
    let examples = results
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let qa = &m.qa;
            let mut entry = format!("[Community Example {}]\nQuestion: {}\n", i + 1, qa.title);
            if !qa.question.trim().is_empty() {
                entry.push_str(&format!(
                    "Details: {}\n",
                    preview(&qa.question, QUESTION_PREVIEW_CHARS)
                ));
            }
            let answer = match &qa.answer {
                Some(answer) => preview(answer, ANSWER_PREVIEW_CHARS),
                None => "No answer available".to_string(),
            };
            entry.push_str(&format!(
                "Answer: {}\nUpvotes: {}\nSource: {}\n---",
                answer, qa.upvotes, qa.url
            ));
            entry
        })
        .collect::<Vec<String>>()
        .join("\n\n");
    format!("\n\n{COMMUNITY_HEADER}\n\n{examples}\n\n{COMMUNITY_FOOTER}")
}
