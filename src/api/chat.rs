//! Rule-based chat responder.
//!
//! No language model behind this: replies come from a fixed keyword table.
//! Both sides of the exchange are persisted to chat_messages.

use axum::{extract::State, Json};
use std::sync::Arc;
use uuid::Uuid;

use super::auth::Principal;
use super::error::ApiError;
use crate::db::{ChatRequest, ChatResponse, ROLE_ASSISTANT, ROLE_USER};
use crate::AppState;

/// Symbols the responder has a canned take for
const KNOWN_SYMBOLS: [&str; 5] = ["aapl", "tsla", "msft", "btc", "eth"];

/// Keywords that trigger the risk-management reply
const TRADE_KEYWORDS: [&str; 4] = ["buy", "sell", "entry", "exit"];

/// Compute the reply for a message.
///
/// Precedence: a known symbol wins over the trade-keyword guidance, and the
/// first symbol in table order wins when several match.
fn rule_reply(message: &str) -> String {
    let text = message.to_lowercase();

    let mut reply =
        "I'm your trading copilot. Ask me about a symbol like AAPL or BTC.".to_string();

    if TRADE_KEYWORDS.iter().any(|kw| text.contains(kw)) {
        reply = "General guidance only: manage risk, set stops, and size positions responsibly."
            .to_string();
    }

    for sym in KNOWN_SYMBOLS {
        if text.contains(sym) {
            reply = format!(
                "Quick take on {}: trend is up on daily, wait for pullback to 20EMA for better risk/reward.",
                sym.to_uppercase()
            );
            break;
        }
    }

    reply
}

async fn store_message(
    pool: &crate::db::DbPool,
    user_id: &str,
    role: &str,
    content: &str,
) -> Result<(), ApiError> {
    sqlx::query(
        "INSERT INTO chat_messages (id, user_id, role, content, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(role)
    .bind(content)
    .bind(chrono::Utc::now().to_rfc3339())
    .execute(pool)
    .await?;
    Ok(())
}

/// Chat endpoint
///
/// POST /chat
pub async fn chat(
    State(state): State<Arc<AppState>>,
    principal: Principal,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let user_id = &principal.user.id;

    store_message(&state.db, user_id, ROLE_USER, &req.message).await?;

    let reply = rule_reply(&req.message);

    store_message(&state.db, user_id, ROLE_ASSISTANT, &reply).await?;

    Ok(Json(ChatResponse { reply }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::auth::{resolve_principal, signup};
    use crate::config::Config;
    use crate::db::{test_pool, ChatMessage, SignupRequest};

    #[test]
    fn test_default_reply() {
        assert_eq!(
            rule_reply("hello there"),
            "I'm your trading copilot. Ask me about a symbol like AAPL or BTC."
        );
    }

    #[test]
    fn test_trade_keyword_reply() {
        assert_eq!(
            rule_reply("where should I set my EXIT?"),
            "General guidance only: manage risk, set stops, and size positions responsibly."
        );
    }

    #[test]
    fn test_symbol_reply_overrides_guidance() {
        let reply = rule_reply("should I buy tsla today?");
        assert!(reply.starts_with("Quick take on TSLA:"));
    }

    #[test]
    fn test_first_symbol_in_table_order_wins() {
        // tsla appears first in the message but aapl comes first in the table
        let reply = rule_reply("tsla or aapl?");
        assert!(reply.starts_with("Quick take on AAPL:"));
    }

    #[tokio::test]
    async fn test_chat_persists_both_sides() {
        let state = Arc::new(AppState::new(Config::default(), test_pool().await));
        let Json(resp) = signup(
            State(state.clone()),
            Json(SignupRequest {
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                password: "wolf123".to_string(),
            }),
        )
        .await
        .unwrap();
        let principal = resolve_principal(&state.db, &resp.token).await.unwrap();

        let Json(reply) = chat(
            State(state.clone()),
            principal,
            Json(ChatRequest {
                message: "what about eth?".to_string(),
            }),
        )
        .await
        .unwrap();
        assert!(reply.reply.starts_with("Quick take on ETH:"));

        let messages: Vec<ChatMessage> =
            sqlx::query_as("SELECT * FROM chat_messages ORDER BY created_at, role DESC")
                .fetch_all(&state.db)
                .await
                .unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, "user");
        assert_eq!(messages[0].content, "what about eth?");
        assert_eq!(messages[1].role, "assistant");
        assert_eq!(messages[1].content, reply.reply);
    }
}
