//! Permission resolution tests
//!
//! Drives the resolver through the public cache API with gateway-shaped
//! payloads.
//!
//! Run with: cargo test -p integration-tests --test permission_tests

use anyhow::Result;
use integration_tests::{
    assert_has, assert_lacks, cache_with_guild, channel_permissions, fixtures::*,
    guild_permissions, load_channel, load_guild, test_cache,
};
use mirror_cache::{Subject, Target};
use mirror_core::{DomainError, PermissionSet, Permissions};
use proptest::prelude::*;

fn view_send() -> Permissions {
    Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES
}

// ============================================================================
// Guild Level
// ============================================================================

#[test]
fn test_owner_gets_everything() -> Result<()> {
    let fixture = GuildFixture::new(Permissions::empty());
    let cache = cache_with_guild(&fixture)?;

    let perms = guild_permissions(&cache, fixture.id, fixture.owner_id)?;
    assert_eq!(perms, PermissionSet::all());
    Ok(())
}

#[test]
fn test_roles_are_combined() -> Result<()> {
    let mut fixture = GuildFixture::new(Permissions::VIEW_CHANNEL);
    let kick = fixture.role("kick", Permissions::KICK_MEMBERS);
    let ban = fixture.role("ban", Permissions::BAN_MEMBERS);
    let member = fixture.member(&[kick, ban]);
    let cache = cache_with_guild(&fixture)?;

    let perms = guild_permissions(&cache, fixture.id, member)?;
    assert_eq!(
        perms.allow(),
        Permissions::VIEW_CHANNEL | Permissions::KICK_MEMBERS | Permissions::BAN_MEMBERS
    );
    assert!(perms.deny().is_empty());
    Ok(())
}

#[test]
fn test_everyone_administrator() -> Result<()> {
    let mut fixture = GuildFixture::new(Permissions::ADMINISTRATOR);
    let member = fixture.member(&[]);
    let cache = cache_with_guild(&fixture)?;

    assert_eq!(guild_permissions(&cache, fixture.id, member)?, PermissionSet::all());
    Ok(())
}

// ============================================================================
// Channel Level
// ============================================================================

#[test]
fn test_role_overwrite_denies_send() -> Result<()> {
    let mut fixture = GuildFixture::new(view_send());
    let role = fixture.role("muted", Permissions::empty());
    let member = fixture.member(&[role]);
    let channel = fixture.text_channel(
        None,
        vec![role_overwrite(role, Permissions::empty(), Permissions::SEND_MESSAGES)],
    );
    let cache = cache_with_guild(&fixture)?;

    let perms = channel_permissions(&cache, channel, member)?;
    assert!(!perms.has(Permissions::SEND_MESSAGES));
    assert!(perms.has(Permissions::VIEW_CHANNEL));
    assert_eq!(perms.json().get("SEND_MESSAGES"), None);
    assert_eq!(perms.json().get("VIEW_CHANNEL"), Some(&true));
    Ok(())
}

#[test]
fn test_role_allow_beats_everyone_deny() -> Result<()> {
    let mut fixture = GuildFixture::new(view_send());
    let role = fixture.role("speaker", Permissions::empty());
    let member = fixture.member(&[role]);
    let bystander = fixture.member(&[]);
    let channel = fixture.text_channel(
        None,
        vec![
            fixture.everyone_overwrite(Permissions::empty(), Permissions::SEND_MESSAGES),
            role_overwrite(role, Permissions::SEND_MESSAGES, Permissions::empty()),
        ],
    );
    let cache = cache_with_guild(&fixture)?;

    assert_has(&channel_permissions(&cache, channel, member)?, view_send())?;
    assert_lacks(
        &channel_permissions(&cache, channel, bystander)?,
        Permissions::SEND_MESSAGES,
    )?;
    Ok(())
}

#[test]
fn test_member_deny_beats_role_allow() -> Result<()> {
    let mut fixture = GuildFixture::new(Permissions::VIEW_CHANNEL);
    let role = fixture.role("speaker", Permissions::empty());
    let member = fixture.member(&[role]);
    let channel = fixture.text_channel(
        None,
        vec![
            role_overwrite(role, Permissions::SEND_MESSAGES, Permissions::empty()),
            member_overwrite(member, Permissions::empty(), Permissions::SEND_MESSAGES),
        ],
    );
    let cache = cache_with_guild(&fixture)?;

    let perms = channel_permissions(&cache, channel, member)?;
    assert_lacks(&perms, Permissions::SEND_MESSAGES)?;
    assert_has(&perms, Permissions::VIEW_CHANNEL)?;
    Ok(())
}

#[test]
fn test_role_overwrites_are_merged_before_applying() -> Result<()> {
    // One role denies what another allows: allow wins within the role stage
    let mut fixture = GuildFixture::new(view_send());
    let deny_role = fixture.role("deny", Permissions::empty());
    let allow_role = fixture.role("allow", Permissions::empty());
    let member = fixture.member(&[deny_role, allow_role]);
    let channel = fixture.text_channel(
        None,
        vec![
            role_overwrite(deny_role, Permissions::empty(), Permissions::SEND_MESSAGES),
            role_overwrite(allow_role, Permissions::SEND_MESSAGES, Permissions::empty()),
        ],
    );
    let cache = cache_with_guild(&fixture)?;

    assert_has(&channel_permissions(&cache, channel, member)?, Permissions::SEND_MESSAGES)?;
    Ok(())
}

#[test]
fn test_category_resolves_like_a_channel() -> Result<()> {
    let mut fixture = GuildFixture::new(view_send());
    let member = fixture.member(&[]);
    let category = fixture.category(vec![fixture.everyone_overwrite(
        Permissions::empty(),
        Permissions::VIEW_CHANNEL,
    )]);
    let channel = fixture.text_channel(Some(category), Vec::new());
    let cache = cache_with_guild(&fixture)?;

    assert_lacks(
        &channel_permissions(&cache, category, member)?,
        Permissions::VIEW_CHANNEL,
    )?;
    // Children only inherit overwrites when they are synced with the category
    assert_has(&channel_permissions(&cache, channel, member)?, view_send())?;
    Ok(())
}

#[test]
fn test_overwrite_update_takes_effect() -> Result<()> {
    let mut fixture = GuildFixture::new(view_send());
    let member = fixture.member(&[]);
    let channel = fixture.text_channel(None, Vec::new());
    let mut cache = cache_with_guild(&fixture)?;
    assert_has(&channel_permissions(&cache, channel, member)?, Permissions::SEND_MESSAGES)?;

    load_channel(
        &mut cache,
        serde_json::json!({
            "id": channel.to_string(),
            "guild_id": fixture.id.to_string(),
            "permission_overwrites": [member_overwrite(member, Permissions::empty(), Permissions::SEND_MESSAGES)]
        }),
    )?;
    assert_lacks(&channel_permissions(&cache, channel, member)?, Permissions::SEND_MESSAGES)?;

    // An empty overwrite list removes the member overwrite again
    load_channel(
        &mut cache,
        serde_json::json!({ "id": channel.to_string(), "permission_overwrites": [] }),
    )?;
    assert_has(&channel_permissions(&cache, channel, member)?, Permissions::SEND_MESSAGES)?;
    Ok(())
}

// ============================================================================
// Threads
// ============================================================================

#[test]
fn test_thread_matches_parent() -> Result<()> {
    let mut fixture = GuildFixture::new(view_send());
    let role = fixture.role("muted", Permissions::empty());
    let member = fixture.member(&[role]);
    let channel = fixture.text_channel(
        None,
        vec![role_overwrite(role, Permissions::empty(), Permissions::SEND_MESSAGES)],
    );
    let thread = fixture.thread(channel);
    let cache = cache_with_guild(&fixture)?;

    assert_eq!(
        channel_permissions(&cache, thread, member)?,
        channel_permissions(&cache, channel, member)?
    );
    Ok(())
}

#[test]
fn test_thread_with_uncached_parent() -> Result<()> {
    let mut fixture = GuildFixture::new(view_send());
    let member = fixture.member(&[]);
    let channel = fixture.text_channel(None, Vec::new());
    let thread = fixture.thread(channel);
    let mut cache = cache_with_guild(&fixture)?;

    cache.remove_channel(channel);
    let err = cache
        .resolver()
        .permissions_of(Target::Channel(thread), member.into())
        .unwrap_err();
    assert!(matches!(
        err,
        DomainError::ThreadParentNotCached { thread_id, parent_id }
            if thread_id == thread && parent_id == channel
    ));
    Ok(())
}

// ============================================================================
// Subjects and misses
// ============================================================================

#[test]
fn test_member_reference_subject() -> Result<()> {
    let mut fixture = GuildFixture::new(view_send());
    let member_id = fixture.member(&[]);
    let channel = fixture.text_channel(None, Vec::new());
    let cache = cache_with_guild(&fixture)?;

    let member = cache
        .guild(fixture.id)
        .and_then(|g| g.members.get(&member_id))
        .expect("member cached");
    let perms = cache
        .resolver()
        .permissions_of(Target::Channel(channel), Subject::Member(member))?;
    assert_eq!(perms, channel_permissions(&cache, channel, member_id)?);
    Ok(())
}

#[test]
fn test_missing_everyone_role_is_an_error() -> Result<()> {
    let mut fixture = GuildFixture::new(view_send());
    let member = fixture.member(&[]);
    let mut cache = cache_with_guild(&fixture)?;
    cache.remove_role(fixture.id, fixture.id)?;

    let err = guild_permissions(&cache, fixture.id, member).unwrap_err();
    let err = err.downcast::<DomainError>()?;
    assert!(matches!(err, DomainError::RoleNotCached(id) if id == fixture.id));
    Ok(())
}

#[test]
fn test_uncached_member_and_dm_targets() -> Result<()> {
    let fixture = GuildFixture::new(view_send());
    let mut cache = test_cache();
    load_guild(&mut cache, &fixture)?;
    let dm = unique_id();
    load_channel(&mut cache, dm_json(dm, fixture.owner_id))?;

    let resolver = cache.resolver();
    assert!(matches!(
        resolver.permissions_of(Target::Guild(fixture.id), unique_id().into()),
        Err(DomainError::MemberNotCached { .. })
    ));
    assert!(matches!(
        resolver.permissions_of(Target::Channel(dm), fixture.owner_id.into()),
        Err(DomainError::NotGuildChannel(id)) if id == dm
    ));
    assert!(matches!(
        resolver.permissions_of(Target::Channel(unique_id()), fixture.owner_id.into()),
        Err(DomainError::ChannelNotCached(_))
    ));
    Ok(())
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_administrator_gets_everything_in_any_channel(
        everyone_deny in any::<u64>(),
        role_deny in any::<u64>(),
        member_deny in any::<u64>(),
        member_allow in any::<u64>(),
    ) {
        let mut fixture = GuildFixture::new(Permissions::VIEW_CHANNEL);
        let admin = fixture.role("admin", Permissions::ADMINISTRATOR);
        let member = fixture.member(&[admin]);
        let channel = fixture.text_channel(None, vec![
            fixture.everyone_overwrite(Permissions::empty(), Permissions::from_bits_retain(everyone_deny)),
            role_overwrite(admin, Permissions::empty(), Permissions::from_bits_retain(role_deny)),
            member_overwrite(
                member,
                Permissions::from_bits_retain(member_allow),
                Permissions::from_bits_retain(member_deny),
            ),
        ]);
        let cache = cache_with_guild(&fixture).unwrap();

        let perms = channel_permissions(&cache, channel, member).unwrap();
        prop_assert_eq!(perms, PermissionSet::all());
    }

    #[test]
    fn prop_member_overwrite_has_final_say(
        everyone in any::<u64>(),
        role_allow in any::<u64>(),
        role_deny in any::<u64>(),
        member_allow in any::<u64>(),
        member_deny in any::<u64>(),
    ) {
        let everyone = Permissions::from_bits_retain(everyone) - Permissions::ADMINISTRATOR;
        let member_allow = Permissions::from_bits_retain(member_allow);
        let member_deny = Permissions::from_bits_retain(member_deny);

        let mut fixture = GuildFixture::new(everyone);
        let role = fixture.role("plain", Permissions::empty());
        let member = fixture.member(&[role]);
        let channel = fixture.text_channel(None, vec![
            role_overwrite(
                role,
                Permissions::from_bits_retain(role_allow),
                Permissions::from_bits_retain(role_deny),
            ),
            member_overwrite(member, member_allow, member_deny),
        ]);
        let cache = cache_with_guild(&fixture).unwrap();

        let perms = channel_permissions(&cache, channel, member).unwrap();
        prop_assert!(perms.allow().contains(member_allow));
        prop_assert!(!perms.allow().intersects(member_deny - member_allow));
    }
}
