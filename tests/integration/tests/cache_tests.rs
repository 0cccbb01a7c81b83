//! Cache behaviour tests
//!
//! Run with: cargo test -p integration-tests --test cache_tests

use anyhow::Result;
use integration_tests::{
    cache_with_guild, decode, fixtures::*, load_channel, load_guild, load_member, load_message,
    test_cache_with_config,
};
use mirror_cache::ChannelRef;
use mirror_common::CacheConfig;
use mirror_core::{
    ChannelType, DomainError, GuildPayload, Lookup, MemberPayload, Permissions, Snowflake,
};
use serde_json::json;

// ============================================================================
// Guild lifecycle
// ============================================================================

#[test]
fn test_guild_create_populates_cache() -> Result<()> {
    let mut fixture = GuildFixture::new(Permissions::VIEW_CHANNEL);
    let role = fixture.role("mod", Permissions::KICK_MEMBERS);
    let member = fixture.member(&[role]);
    let category = fixture.category(Vec::new());
    let channel = fixture.text_channel(Some(category), Vec::new());
    let thread = fixture.thread(channel);
    let cache = cache_with_guild(&fixture)?;

    let guild = cache.guild(fixture.id).expect("guild cached");
    assert_eq!(guild.roles.len(), 2);
    assert_eq!(guild.members.len(), 2);
    assert_eq!(guild.channels.len(), 2);
    assert_eq!(guild.threads.len(), 1);
    assert!(guild.everyone_role().is_some());
    assert!(cache.user(member).is_some());

    assert!(matches!(cache.channel(category), Some(ChannelRef::Guild(c)) if c.is_category()));
    assert!(matches!(cache.channel(thread), Some(ChannelRef::Thread(t)) if t.parent_id == channel));
    assert_eq!(cache.guild_id_of(thread), Some(fixture.id));
    Ok(())
}

#[test]
fn test_guild_update_merges_in_place() -> Result<()> {
    let mut fixture = GuildFixture::new(Permissions::VIEW_CHANNEL);
    fixture.member(&[]);
    let mut cache = cache_with_guild(&fixture)?;
    let before: *const _ = cache.guild(fixture.id).expect("guild cached");

    let update: GuildPayload = decode(json!({
        "id": fixture.id.to_string(),
        "name": "renamed"
    }))?;
    cache.upsert_guild(update)?;

    let guild = cache.guild(fixture.id).expect("guild cached");
    assert!(std::ptr::eq(before, guild));
    assert_eq!(guild.name, "renamed");
    assert_eq!(guild.members.len(), 2);
    assert_eq!(cache.guilds().len(), 1);
    Ok(())
}

#[test]
fn test_unavailable_guild_then_available() -> Result<()> {
    let fixture = GuildFixture::new(Permissions::VIEW_CHANNEL);
    let mut cache = test_cache_with_config(CacheConfig::default());

    let stub: GuildPayload = decode(json!({ "id": fixture.id.to_string(), "unavailable": true }))?;
    cache.upsert_guild(stub)?;
    assert!(cache.guild(fixture.id).expect("stub cached").unavailable);

    load_guild(&mut cache, &fixture)?;
    let guild = cache.guild(fixture.id).expect("guild cached");
    assert!(!guild.unavailable);
    assert!(guild.is_owner(fixture.owner_id));
    Ok(())
}

#[test]
fn test_guild_limit_evicts_oldest() -> Result<()> {
    let mut cache = test_cache_with_config(CacheConfig {
        guild_limit: Some(2),
        ..CacheConfig::default()
    });
    let fixtures: Vec<GuildFixture> = (0..3)
        .map(|_| GuildFixture::new(Permissions::VIEW_CHANNEL))
        .collect();
    for fixture in &fixtures {
        load_guild(&mut cache, fixture)?;
    }

    let ids: Vec<Snowflake> = cache.guilds().keys().collect();
    assert_eq!(ids, vec![fixtures[1].id, fixtures[2].id]);
    Ok(())
}

// ============================================================================
// Members
// ============================================================================

#[test]
fn test_member_chunk_grows_limit() -> Result<()> {
    let fixture = GuildFixture::new(Permissions::VIEW_CHANNEL);
    let mut cache = test_cache_with_config(CacheConfig {
        member_limit: Some(10),
        member_limit_step: 25,
        ..CacheConfig::default()
    });
    load_guild(&mut cache, &fixture)?;

    let chunk: Vec<MemberPayload> = (0..30)
        .map(|_| decode(member_json(unique_id(), &[])))
        .collect::<Result<_>>()?;
    assert_eq!(cache.upsert_members(fixture.id, chunk)?, 30);

    let members = &cache.guild(fixture.id).expect("guild cached").members;
    assert_eq!(members.len(), 31);
    assert_eq!(members.limit(), Some(50));
    assert!(members.has(&fixture.owner_id));
    Ok(())
}

#[test]
fn test_member_update_keeps_roles_and_clears_nick() -> Result<()> {
    let mut fixture = GuildFixture::new(Permissions::VIEW_CHANNEL);
    let role = fixture.role("r", Permissions::empty());
    let member = fixture.member(&[role]);
    let mut cache = cache_with_guild(&fixture)?;

    load_member(
        &mut cache,
        fixture.id,
        json!({ "user": user_json(member), "nick": "Nick" }),
    )?;
    load_member(
        &mut cache,
        fixture.id,
        json!({ "user": user_json(member), "nick": null }),
    )?;

    let cached = cache
        .guild(fixture.id)
        .and_then(|g| g.members.get(&member))
        .expect("member cached");
    assert_eq!(cached.nick, None);
    assert_eq!(cached.roles, vec![role]);
    Ok(())
}

#[test]
fn test_member_for_unknown_guild() -> Result<()> {
    let mut cache = test_cache_with_config(CacheConfig::default());
    let err = load_member(&mut cache, unique_id(), member_json(unique_id(), &[])).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DomainError>(),
        Some(DomainError::GuildNotCached(_))
    ));
    Ok(())
}

// ============================================================================
// Channels and messages
// ============================================================================

#[test]
fn test_thread_create_event() -> Result<()> {
    let mut fixture = GuildFixture::new(Permissions::VIEW_CHANNEL);
    let channel = fixture.text_channel(None, Vec::new());
    let mut cache = cache_with_guild(&fixture)?;

    let thread = unique_id();
    load_channel(&mut cache, thread_json(thread, fixture.id, channel))?;
    assert_eq!(
        cache.channel(thread).map(ChannelRef::kind),
        Some(ChannelType::PublicThread)
    );

    load_channel(
        &mut cache,
        json!({ "id": thread.to_string(), "thread_metadata": { "archived": true } }),
    )?;
    assert!(matches!(cache.channel(thread), Some(ChannelRef::Thread(t)) if t.archived));
    Ok(())
}

#[test]
fn test_message_flow() -> Result<()> {
    let mut fixture = GuildFixture::new(Permissions::VIEW_CHANNEL);
    let author = fixture.member(&[]);
    let channel = fixture.text_channel(None, Vec::new());
    let mut cache = test_cache_with_config(CacheConfig {
        message_limit: Some(3),
        ..CacheConfig::default()
    });
    load_guild(&mut cache, &fixture)?;

    let ids: Vec<Snowflake> = (0..5).map(|_| unique_id()).collect();
    for id in &ids {
        assert!(load_message(&mut cache, message_json(*id, channel, author, "hello"))?);
    }

    let messages = cache.channel(channel).expect("channel cached").messages();
    assert_eq!(messages.keys().collect::<Vec<_>>(), ids[2..].to_vec());

    // Edit keeps position and author
    load_message(
        &mut cache,
        json!({ "id": ids[2].to_string(), "channel_id": channel.to_string(), "content": "edited" }),
    )?;
    let edited = cache.message(channel, ids[2]).expect("message cached");
    assert_eq!(edited.content, "edited");
    assert_eq!(edited.author_id, author);

    assert_eq!(cache.message(channel, ids[2]).map(|m| m.guild_id), Some(Lookup::Unresolved));
    assert_eq!(cache.message_guild_id(channel, ids[2])?, Some(fixture.id));
    assert_eq!(
        cache.message(channel, ids[2]).map(|m| m.guild_id),
        Some(Lookup::Resolved(fixture.id))
    );
    Ok(())
}

#[test]
fn test_dm_messages_have_no_guild() -> Result<()> {
    let mut cache = test_cache_with_config(CacheConfig::default());
    let (dm, user) = (unique_id(), unique_id());
    load_channel(&mut cache, dm_json(dm, user))?;

    let message = unique_id();
    assert!(load_message(&mut cache, message_json(message, dm, user, "hey"))?);
    assert_eq!(cache.message_guild_id(dm, message)?, None);
    assert_eq!(
        cache.message(dm, message).map(|m| m.guild_id),
        Some(Lookup::ConfirmedAbsent)
    );
    Ok(())
}

#[test]
fn test_message_for_unknown_channel() -> Result<()> {
    let mut cache = test_cache_with_config(CacheConfig::default());
    let err = load_message(&mut cache, message_json(unique_id(), unique_id(), unique_id(), "x"))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<DomainError>(),
        Some(DomainError::ChannelNotCached(_))
    ));
    Ok(())
}

#[test]
fn test_malformed_channel_payload() -> Result<()> {
    let fixture = GuildFixture::new(Permissions::VIEW_CHANNEL);
    let mut cache = cache_with_guild(&fixture)?;

    // A thread without its parent cannot be constructed
    let err = load_channel(
        &mut cache,
        json!({ "id": unique_id().to_string(), "type": 11, "guild_id": fixture.id.to_string() }),
    )
    .unwrap_err();
    let err = err.downcast::<DomainError>()?;
    assert!(err.is_construction());
    assert_eq!(cache.guild(fixture.id).expect("guild cached").threads.len(), 0);
    Ok(())
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_config_drives_limits() -> Result<()> {
    let config = CacheConfig::from_lookup(|key| match key {
        "MIRROR_GUILD_LIMIT" => Some("1".to_string()),
        "MIRROR_MESSAGE_LIMIT" => Some("unbounded".to_string()),
        _ => None,
    })?;
    assert_eq!(config.guild_limit, Some(1));
    assert_eq!(config.message_limit, None);

    let cache = test_cache_with_config(config);
    assert_eq!(cache.guilds().limit(), Some(1));
    Ok(())
}
