use crate::error::AppError;
use crate::models::{ChatMessage, ChatRole, QuickAction};
use chrono::Utc;

const GREETING: &str = "Hello! I'm your Revionix AI Financial Advisor. I can help analyze your finances, explain cash flow patterns, and provide strategic insights. What would you like to know about your business?";

/// 关键词 -> 固定回复, 按顺序匹配, 第一个命中的生效
const CANNED_REPLIES: [(&str, &str); 6] = [
    (
        "cash flow",
        "Your cash flow analysis reveals a **23% improvement** this quarter! Incoming payments show consistent growth, with your fastest-paying clients settling invoices 12 days earlier than average. However, I've identified $3,200 in pending receivables that need attention.",
    ),
    (
        "expenses",
        "Expense breakdown shows **operational efficiency gains** of 15%! Your largest expense categories: Staff (45%), Technology (18%), Marketing (12%). Marketing ROI is exceptional at 4.2x return. Consider reallocating 8% from operational to growth investments.",
    ),
    (
        "revenue",
        "Revenue trajectory is **stellar**! Q4 shows 34% growth with diversification across 5 revenue streams. Your premium services generate 67% higher margins. Seasonal patterns suggest Q1 will be your strongest quarter yet.",
    ),
    (
        "trends",
        "**Key trends identified**: Customer payment cycles improved by 23%, subscription revenue grew 156%, and your average transaction value increased by $89. The golden pattern shows Friday invoicing gets paid 40% faster!",
    ),
    (
        "profit",
        "Profit margins are **gleaming**! Net profit increased 28% with improved operational efficiency. Your top 3 profit centers generate 78% of total margins. Consider expanding these golden revenue streams.",
    ),
    (
        "budget",
        "Budget analysis shows you're **14% under budget** across all categories! Highest savings in technology (22% under) and marketing (18% under). You have $4,500 available for strategic investments this quarter.",
    ),
];

const DEFAULT_REPLY: &str = "**Financial Health Score: 8.7/10** - Your business fundamentals are strong! I've identified 3 optimization opportunities: faster invoice processing, strategic expense reallocation, and cash flow timing improvements. Your golden network is performing exceptionally well!";

pub const QUICK_ACTIONS: [QuickAction; 3] = [
    QuickAction {
        label: "Analyze Trends",
        query: "Show me my financial trends and patterns",
    },
    QuickAction {
        label: "Cash Flow",
        query: "How is my cash flow performing?",
    },
    QuickAction {
        label: "Expense Analysis",
        query: "Break down my expenses and identify savings",
    },
];

/// 按关键词选择回复
pub fn reply_for(query: &str) -> &'static str {
    let query = query.to_lowercase();
    CANNED_REPLIES
        .iter()
        .find(|(keyword, _)| query.contains(keyword))
        .map(|(_, reply)| *reply)
        .unwrap_or(DEFAULT_REPLY)
}

/// 脚本化理财顾问, 保存对话记录
#[derive(Debug)]
pub struct ChatAdvisor {
    history: Vec<ChatMessage>,
    next_id: u64,
}

impl ChatAdvisor {
    pub fn new() -> Self {
        Self {
            history: vec![ChatMessage {
                id: 1,
                role: ChatRole::Bot,
                content: GREETING.to_string(),
                timestamp: Utc::now(),
            }],
            next_id: 2,
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn quick_actions(&self) -> &'static [QuickAction] {
        &QUICK_ACTIONS
    }

    /// 记录用户消息和回复, 返回回复
    pub fn send(&mut self, query: &str) -> Result<&ChatMessage, AppError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::invalid_field("message", "is required"));
        }

        self.push(ChatRole::User, query.to_string())?;
        let reply = reply_for(query);
        tracing::debug!("Advisor reply selected for {:?}", query);
        self.push(ChatRole::Bot, reply.to_string())
    }

    fn push(&mut self, role: ChatRole, content: String) -> Result<&ChatMessage, AppError> {
        let id = self.next_id;
        self.next_id += 1;
        self.history.push(ChatMessage {
            id,
            role,
            content,
            timestamp: Utc::now(),
        });
        self.history
            .last()
            .ok_or_else(|| AppError::invalid_field("message", "was not recorded"))
    }
}

impl Default for ChatAdvisor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keyword_match_is_case_insensitive() {
        assert!(reply_for("How is my CASH FLOW performing?").contains("23% improvement"));
        assert!(reply_for("budget please").contains("14% under budget"));
    }

    #[test]
    fn first_keyword_in_table_order_wins() {
        // "expenses" 排在 "revenue" 之前
        assert!(reply_for("revenue versus expenses").contains("Expense breakdown"));
    }

    #[test]
    fn unknown_query_gets_default() {
        assert_eq!(reply_for("hello there"), DEFAULT_REPLY);
    }

    #[test]
    fn history_starts_with_greeting_and_grows_in_pairs() {
        let mut advisor = ChatAdvisor::new();
        assert_eq!(advisor.history().len(), 1);
        assert_eq!(advisor.history()[0].role, ChatRole::Bot);

        let reply = advisor.send("  Show me my financial trends  ").unwrap();
        assert_eq!(reply.role, ChatRole::Bot);
        assert!(reply.content.contains("Key trends"));

        let history = advisor.history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[1].role, ChatRole::User);
        assert_eq!(history[1].content, "Show me my financial trends");
        assert!(history.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[test]
    fn send_returns_the_recorded_reply() {
        let mut advisor = ChatAdvisor::new();
        let reply = advisor.send("What's my budget?").unwrap().clone();
        assert_eq!(reply.role, ChatRole::Bot);
        assert_eq!(reply.id, 3);
        assert_eq!(advisor.history().last().map(|m| m.id), Some(reply.id));
    }

    #[test]
    fn blank_message_is_rejected() {
        let mut advisor = ChatAdvisor::new();
        assert!(advisor.send("   ").is_err());
        assert_eq!(advisor.history().len(), 1);
    }
}
