use async_trait::async_trait;
use log::{debug, warn};
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::types::{ChatId, ChatMemberKind, Recipient, UserId};

pub type LookupError = Box<dyn std::error::Error + Send + Sync>;

/// a required channel, either by numeric chat id or by @handle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChannelRef {
    Id(i64),
    Username(String),
}

impl ChannelRef {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw.parse::<i64>() {
            Ok(id) => ChannelRef::Id(id),
            Err(_) if raw.starts_with('@') => ChannelRef::Username(raw.to_string()),
            // getChatMember only resolves public channels as "@name"
            Err(_) => ChannelRef::Username(format!("@{}", raw)),
        }
    }

    pub fn recipient(&self) -> Recipient {
        match self {
            ChannelRef::Id(id) => Recipient::Id(ChatId(*id)),
            ChannelRef::Username(name) => Recipient::ChannelUsername(name.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipStatus {
    Creator,
    Administrator,
    Member,
    Restricted { is_member: bool },
    Left,
    Banned,
}

impl MembershipStatus {
    pub fn counts_as_subscribed(&self) -> bool {
        match self {
            MembershipStatus::Creator
            | MembershipStatus::Administrator
            | MembershipStatus::Member => true,
            MembershipStatus::Restricted { is_member } => *is_member,
            MembershipStatus::Left | MembershipStatus::Banned => false,
        }
    }
}

impl From<&ChatMemberKind> for MembershipStatus {
    fn from(kind: &ChatMemberKind) -> Self {
        match kind {
            ChatMemberKind::Owner(_) => MembershipStatus::Creator,
            ChatMemberKind::Administrator(_) => MembershipStatus::Administrator,
            ChatMemberKind::Member { .. } => MembershipStatus::Member,
            ChatMemberKind::Restricted(restricted) => MembershipStatus::Restricted {
                is_member: restricted.is_member,
            },
            ChatMemberKind::Left { .. } => MembershipStatus::Left,
            ChatMemberKind::Banned(_) => MembershipStatus::Banned,
        }
    }
}

/// external source of channel membership
#[async_trait]
pub trait MembershipLookup: Send + Sync {
    async fn membership_status(
        &self,
        channel: &ChannelRef,
        user_id: i64,
    ) -> Result<MembershipStatus, LookupError>;
}

#[async_trait]
impl MembershipLookup for Bot {
    async fn membership_status(
        &self,
        channel: &ChannelRef,
        user_id: i64,
    ) -> Result<MembershipStatus, LookupError> {
        let member = self
            .get_chat_member(channel.recipient(), UserId(user_id as u64))
            .await?;
        Ok(MembershipStatus::from(&member.kind))
    }
}

/// checks that a user belongs to every required channel; lookup failures count as not subscribed
pub struct SubscriptionOracle {
    channels: Vec<ChannelRef>,
    lookup: Arc<dyn MembershipLookup>,
}

impl SubscriptionOracle {
    pub fn new(channels: &[String], lookup: Arc<dyn MembershipLookup>) -> Self {
        Self {
            channels: channels.iter().map(|raw| ChannelRef::parse(raw)).collect(),
            lookup,
        }
    }

    pub fn channels(&self) -> &[ChannelRef] {
        &self.channels
    }

    pub async fn is_subscribed(&self, user_id: i64) -> bool {
        for channel in &self.channels {
            match self.lookup.membership_status(channel, user_id).await {
                Ok(status) if status.counts_as_subscribed() => {
                    debug!(
                        "User {} is subscribed to {:?} ({:?})",
                        user_id, channel, status
                    );
                }
                Ok(status) => {
                    debug!(
                        "User {} is NOT subscribed to {:?} ({:?})",
                        user_id, channel, status
                    );
                    return false;
                }
                Err(e) => {
                    warn!(
                        "Failed to check subscription of user {} to {:?}: {}",
                        user_id, channel, e
                    );
                    return false;
                }
            }
        }
        true
    }
}
