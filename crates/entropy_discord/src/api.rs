//! Thin wrapper over Serenity's HTTP client.
//!
//! The ticket core never talks to `serenity::http::Http` directly; it goes
//! through [`DiscordApi`] so that error classification (unknown member,
//! closed DMs) happens in one place.

use crate::DiscordResult;
use entropy_error::{DiscordError, DiscordErrorKind};
use serenity::all::{
    Channel, ChannelId, ChannelType, CreateChannel, CreateMessage, EditChannel, EditMessage,
    GetMessages, GuildChannel, GuildId, Member, Message, MessageId, PermissionOverwrite,
    PermissionOverwriteType, Permissions, PrivateChannel, RoleId, User, UserId,
};
use serenity::http::{Http, HttpError};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Discord JSON error code for "Unknown Member".
const ERROR_CODE_UNKNOWN_MEMBER: isize = 10007;

/// Discord JSON error code for "Cannot send messages to this user".
const ERROR_CODE_CANNOT_MESSAGE_USER: isize = 50007;

/// The text-channel permission bundle granted to a ticket's requester.
pub const ALL_TEXT: Permissions = Permissions::VIEW_CHANNEL
    .union(Permissions::SEND_MESSAGES)
    .union(Permissions::SEND_TTS_MESSAGES)
    .union(Permissions::EMBED_LINKS)
    .union(Permissions::ATTACH_FILES)
    .union(Permissions::READ_MESSAGE_HISTORY)
    .union(Permissions::ADD_REACTIONS);

/// Extract the Discord JSON error code from an API error, if any.
fn json_error_code(err: &serenity::Error) -> Option<isize> {
    match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(resp)) => Some(resp.error.code),
        _ => None,
    }
}

/// Platform adapter over a shared Serenity HTTP client.
#[derive(Clone)]
pub struct DiscordApi {
    http: Arc<Http>,
}

impl DiscordApi {
    /// Create an adapter sharing the given HTTP client.
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }

    /// Get the underlying HTTP client.
    ///
    /// Interaction responses are issued directly against this client by the
    /// handlers; everything else goes through the typed methods below.
    pub fn http(&self) -> &Arc<Http> {
        &self.http
    }

    /// Create a text channel under a category.
    #[instrument(skip(self), fields(guild = %guild, name))]
    pub async fn create_text_channel(
        &self,
        guild: GuildId,
        category: ChannelId,
        name: &str,
        topic: &str,
    ) -> DiscordResult<GuildChannel> {
        debug!("Creating ticket text channel");
        let builder = CreateChannel::new(name)
            .kind(ChannelType::Text)
            .topic(topic)
            .category(category);
        let channel = guild.create_channel(&self.http, builder).await?;
        Ok(channel)
    }

    /// Rename a channel and replace its topic string.
    #[instrument(skip(self), fields(channel = %channel, name))]
    pub async fn edit_channel(
        &self,
        channel: ChannelId,
        name: &str,
        topic: &str,
    ) -> DiscordResult<()> {
        channel
            .edit(&self.http, EditChannel::new().name(name).topic(topic))
            .await?;
        Ok(())
    }

    /// Destroy a channel.
    #[instrument(skip(self), fields(channel = %channel))]
    pub async fn delete_channel(&self, channel: ChannelId) -> DiscordResult<()> {
        channel.delete(&self.http).await?;
        Ok(())
    }

    /// Pin a message in a channel.
    pub async fn pin_message(&self, channel: ChannelId, message: MessageId) -> DiscordResult<()> {
        channel.pin(&self.http, message).await?;
        Ok(())
    }

    /// Grant a member the full text bundle on a channel.
    ///
    /// The per-member override is the single source of truth for "this
    /// requester may see this ticket"; category permissions only cover staff.
    #[instrument(skip(self), fields(channel = %channel, user = %user))]
    pub async fn grant_member_text(&self, channel: ChannelId, user: UserId) -> DiscordResult<()> {
        channel
            .create_permission(
                &self.http,
                PermissionOverwrite {
                    allow: ALL_TEXT,
                    deny: Permissions::empty(),
                    kind: PermissionOverwriteType::Member(user),
                },
            )
            .await?;
        Ok(())
    }

    /// Replace a member's override with a full text deny on a channel.
    #[instrument(skip(self), fields(channel = %channel, user = %user))]
    pub async fn deny_member_text(&self, channel: ChannelId, user: UserId) -> DiscordResult<()> {
        channel
            .create_permission(
                &self.http,
                PermissionOverwrite {
                    allow: Permissions::empty(),
                    deny: ALL_TEXT,
                    kind: PermissionOverwriteType::Member(user),
                },
            )
            .await?;
        Ok(())
    }

    /// Fetch a channel by id.
    ///
    /// Used both to recover the ticket id encoded in a channel name and to
    /// detect channels that no longer exist on the platform.
    pub async fn get_channel(&self, channel: ChannelId) -> DiscordResult<Channel> {
        let channel = self.http.get_channel(channel).await?;
        Ok(channel)
    }

    /// Fetch the name of a guild channel.
    pub async fn channel_name(&self, channel: ChannelId) -> DiscordResult<String> {
        match self.get_channel(channel).await? {
            Channel::Guild(guild_channel) => Ok(guild_channel.name),
            other => Err(DiscordError::new(DiscordErrorKind::ChannelName(
                other.id().to_string(),
            ))),
        }
    }

    /// Fetch one page of channel history, newest first.
    ///
    /// Passing `before` continues pagination from an earlier page.
    #[instrument(skip(self), fields(channel = %channel, limit))]
    pub async fn messages_before(
        &self,
        channel: ChannelId,
        before: Option<MessageId>,
        limit: u8,
    ) -> DiscordResult<Vec<Message>> {
        let mut request = GetMessages::new().limit(limit);
        if let Some(before) = before {
            request = request.before(before);
        }
        let messages = channel.messages(&self.http, request).await?;
        Ok(messages)
    }

    /// Send a message to a channel.
    pub async fn send_message(
        &self,
        channel: ChannelId,
        message: CreateMessage,
    ) -> DiscordResult<Message> {
        let sent = channel.send_message(&self.http, message).await?;
        Ok(sent)
    }

    /// Edit an existing message.
    pub async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        builder: EditMessage,
    ) -> DiscordResult<Message> {
        let edited = channel.edit_message(&self.http, message, builder).await?;
        Ok(edited)
    }

    /// Delete a message.
    pub async fn delete_message(
        &self,
        channel: ChannelId,
        message: MessageId,
    ) -> DiscordResult<()> {
        channel.delete_message(&self.http, message).await?;
        Ok(())
    }

    /// Delete a batch of messages at once.
    ///
    /// The platform rejects batches outside 2..=100 or containing messages
    /// older than two weeks; callers fall back to single deletes then.
    pub async fn bulk_delete_messages(
        &self,
        channel: ChannelId,
        messages: &[MessageId],
    ) -> DiscordResult<()> {
        channel
            .delete_messages(&self.http, messages.iter().copied())
            .await?;
        Ok(())
    }

    /// Look up a guild member.
    ///
    /// A missing member is reported as [`DiscordErrorKind::UnknownMember`] so
    /// callers can distinguish "left the server" from transport failures.
    #[instrument(skip(self), fields(guild = %guild, user = %user))]
    pub async fn member(&self, guild: GuildId, user: UserId) -> DiscordResult<Member> {
        guild.member(&self.http, user).await.map_err(|e| {
            if json_error_code(&e) == Some(ERROR_CODE_UNKNOWN_MEMBER) {
                DiscordError::new(DiscordErrorKind::UnknownMember(user.get()))
            } else {
                DiscordError::from(e)
            }
        })
    }

    /// Fetch one page of guild members, paginated by user id.
    #[instrument(skip(self), fields(guild = %guild, limit))]
    pub async fn members_page(
        &self,
        guild: GuildId,
        after: Option<UserId>,
        limit: u64,
    ) -> DiscordResult<Vec<Member>> {
        let members = guild.members(&self.http, Some(limit), after).await?;
        Ok(members)
    }

    /// Look up a user by id.
    pub async fn user(&self, user: UserId) -> DiscordResult<User> {
        let user = user.to_user(&self.http).await?;
        Ok(user)
    }

    /// Open (or reuse) the DM channel to a user.
    ///
    /// Closed DMs are reported as [`DiscordErrorKind::DmsClosed`]; the survey
    /// prompt treats that as informational, everything else escalates.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn dm_channel(&self, user: UserId) -> DiscordResult<PrivateChannel> {
        user.create_dm_channel(&self.http).await.map_err(|e| {
            if json_error_code(&e) == Some(ERROR_CODE_CANNOT_MESSAGE_USER) {
                DiscordError::new(DiscordErrorKind::DmsClosed(user.get()))
            } else {
                DiscordError::from(e)
            }
        })
    }

    /// Send a DM to a user, classifying closed DMs.
    pub async fn send_dm(&self, user: UserId, message: CreateMessage) -> DiscordResult<Message> {
        let channel = self.dm_channel(user).await?;
        channel.id.send_message(&self.http, message).await.map_err(|e| {
            if json_error_code(&e) == Some(ERROR_CODE_CANNOT_MESSAGE_USER) {
                DiscordError::new(DiscordErrorKind::DmsClosed(user.get()))
            } else {
                DiscordError::from(e)
            }
        })
    }

    /// Add a role to a guild member.
    pub async fn add_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> DiscordResult<()> {
        self.http.add_member_role(guild, user, role, None).await?;
        Ok(())
    }

    /// Remove a role from a guild member.
    pub async fn remove_role(
        &self,
        guild: GuildId,
        user: UserId,
        role: RoleId,
    ) -> DiscordResult<()> {
        self.http
            .remove_member_role(guild, user, role, None)
            .await?;
        Ok(())
    }
}
