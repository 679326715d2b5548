//! Daily messages feed.

use uuid::Uuid;

use crate::constants::MESSAGES_TABLE;
use crate::error::{PairDaysError, PairDaysResult};
use crate::gateway::{Gateway, Query, decode_rows, encode_row};
use crate::message::{Message, MessageText, NewMessageRow};
use crate::store::{id_value, require_user};

pub struct MessageFeed<G: Gateway> {
    gateway: G,
    messages: Vec<Message>,
}

impl<G: Gateway> MessageFeed<G> {
    pub fn new(gateway: G) -> Self {
        MessageFeed {
            gateway,
            messages: Vec::new(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The signed-in user's messages, newest first. Empty when signed out.
    pub async fn list(&mut self) -> PairDaysResult<&[Message]> {
        let Some(user) = self.gateway.current_user().await? else {
            self.messages.clear();
            return Ok(&self.messages);
        };

        let rows = self
            .gateway
            .select(
                &Query::table(MESSAGES_TABLE)
                    .eq("user_id", id_value(user.id))
                    .order_desc("created_at"),
            )
            .await?;
        self.messages = decode_rows(rows)?;
        Ok(&self.messages)
    }

    pub async fn create(&mut self, text: &MessageText) -> PairDaysResult<Message> {
        let user = require_user(&self.gateway).await?;

        let row = NewMessageRow {
            id: Uuid::new_v4(),
            user_id: user.id,
            message: text.as_str(),
        };
        let stored = self
            .gateway
            .insert(MESSAGES_TABLE, vec![encode_row(&row)?])
            .await?;
        let message: Message = stored
            .into_iter()
            .next()
            .map(serde_json::from_value)
            .transpose()?
            .ok_or_else(|| PairDaysError::Gateway("insert returned no message row".into()))?;
        tracing::info!(id = %message.id, "sent message");

        self.reload().await;
        Ok(message)
    }

    /// Delete one of the signed-in user's messages. Both the id and the owner
    /// must match; a message that belongs to someone else is "not found".
    pub async fn delete(&mut self, id: Uuid) -> PairDaysResult<()> {
        let user = require_user(&self.gateway).await?;

        let removed = self
            .gateway
            .delete(
                &Query::table(MESSAGES_TABLE)
                    .eq("id", id_value(id))
                    .eq("user_id", id_value(user.id)),
            )
            .await?;
        if removed == 0 {
            return Err(PairDaysError::NotFound(format!("message {id}")));
        }
        tracing::info!(%id, "deleted message");

        self.reload().await;
        Ok(())
    }

    /// The write is already committed; a failed reload only leaves the
    /// snapshot stale.
    async fn reload(&mut self) {
        if let Err(e) = self.list().await {
            tracing::warn!(error = %e, "reload after write failed, messages list is stale");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::MAX_MESSAGE_CHARS;
    use crate::gateway::{FailOn, InMemoryGateway};

    #[tokio::test]
    async fn test_list_newest_first_and_scoped_to_user() {
        let gateway = InMemoryGateway::new();
        let alice = gateway.add_account("alice@example.com", "pw");
        let bob = gateway.add_account("bob@example.com", "pw");
        let mut feed = MessageFeed::new(gateway.clone());

        gateway.sign_in_as(&alice);
        feed.create(&MessageText::new("good morning").unwrap()).await.unwrap();
        feed.create(&MessageText::new("miss you").unwrap()).await.unwrap();

        let texts: Vec<_> = feed.messages().iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["miss you", "good morning"]);

        gateway.sign_in_as(&bob);
        assert!(feed.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_other_user_cannot_delete() {
        let gateway = InMemoryGateway::new();
        let alice = gateway.add_account("alice@example.com", "pw");
        let bob = gateway.add_account("bob@example.com", "pw");
        let mut feed = MessageFeed::new(gateway.clone());

        gateway.sign_in_as(&alice);
        let message = feed.create(&MessageText::new("hi").unwrap()).await.unwrap();

        gateway.sign_in_as(&bob);
        let err = feed.delete(message.id).await;
        assert!(matches!(err, Err(PairDaysError::NotFound(_))));
        assert_eq!(gateway.rows(MESSAGES_TABLE).len(), 1);

        gateway.sign_in_as(&alice);
        feed.delete(message.id).await.unwrap();
        assert!(feed.messages().is_empty());
    }

    #[tokio::test]
    async fn test_too_long_message_never_reaches_backend() {
        let gateway = InMemoryGateway::new();
        let text = "x".repeat(MAX_MESSAGE_CHARS + 1);
        assert!(MessageText::new(&text).is_err());
        assert!(gateway.rows(MESSAGES_TABLE).is_empty());
    }

    #[tokio::test]
    async fn test_signed_out() {
        let gateway = InMemoryGateway::new();
        let alice = gateway.add_account("alice@example.com", "pw");
        let mut feed = MessageFeed::new(gateway.clone());

        gateway.sign_in_as(&alice);
        feed.create(&MessageText::new("bye").unwrap()).await.unwrap();
        assert_eq!(feed.messages().len(), 1);

        gateway.sign_out();
        assert!(feed.list().await.unwrap().is_empty());
        let err = feed.create(&MessageText::new("hi").unwrap()).await;
        assert!(matches!(err, Err(PairDaysError::NotSignedIn)));
    }

    #[tokio::test]
    async fn test_send_succeeds_when_reload_fails() {
        let gateway = InMemoryGateway::new();
        let alice = gateway.add_account("alice@example.com", "pw");
        gateway.sign_in_as(&alice);
        let mut feed = MessageFeed::new(gateway.clone());

        gateway.fail(FailOn::Select(MESSAGES_TABLE.into()), "network down");
        let message = feed.create(&MessageText::new("on my way").unwrap()).await.unwrap();
        assert_eq!(message.message, "on my way");
        assert_eq!(gateway.rows(MESSAGES_TABLE).len(), 1);
    }
}
