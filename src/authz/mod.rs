//! Authorization engine.
//!
//! Every permission rule in the server lives here, as pure functions over
//! borrowed snapshots of room/thought state - no I/O, so the whole decision
//! table is unit-testable and auditable in one place. Handlers load state,
//! ask for a [`Decision`], and call [`Decision::require`] before any write.
//!
//! The rules:
//!
//! | action | rule |
//! |---|---|
//! | view room members / thoughts / chat, subscribe | actor is a member |
//! | create room thought, post chat | actor is a member |
//! | view thought | author, or any member for room-scoped |
//! | update thought | author, or any member for room-scoped |
//! | delete thought | author only - membership never grants delete |
//! | list/approve/reject requests, kick, delete room | actor is the owner |
//! | request join | not a member, not the owner, no pending request |

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Outcome of a permission check. `Forbidden` never mutates state; callers
/// evaluate it before any write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Forbidden(&'static str),
    NotFound(&'static str),
}

impl Decision {
    /// Turn a denial into the matching [`ApiError`].
    pub fn require(self) -> ApiResult<()> {
        match self {
            Decision::Allowed => Ok(()),
            Decision::Forbidden(message) => Err(ApiError::Forbidden(message)),
            Decision::NotFound(resource) => Err(ApiError::NotFound(resource)),
        }
    }

    pub fn is_allowed(self) -> bool {
        self == Decision::Allowed
    }
}

/// Snapshot of the room state a decision needs: the owner and the member-id
/// set (which always contains the owner).
#[derive(Debug)]
pub struct RoomAccess {
    pub room_id: Uuid,
    pub owner_id: Uuid,
    pub member_ids: HashSet<Uuid>,
}

impl RoomAccess {
    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.owner_id == user_id
    }

    pub fn is_member(&self, user_id: Uuid) -> bool {
        self.member_ids.contains(&user_id)
    }
}

/// Snapshot of a thought: its author and, for room-scoped thoughts, the
/// containing room.
#[derive(Debug)]
pub struct ThoughtAccess<'a> {
    pub author_id: Uuid,
    pub room: Option<&'a RoomAccess>,
}

const NOT_A_MEMBER: &str = "not a member of this room";
const OWNER_ONLY: &str = "only the owner can perform this action";

/// Member-only reads: member list, room thoughts, chat history.
pub fn view_room(actor: Uuid, room: &RoomAccess) -> Decision {
    if room.is_member(actor) {
        Decision::Allowed
    } else {
        Decision::Forbidden(NOT_A_MEMBER)
    }
}

/// Creating a thought inside a room requires membership at creation time.
pub fn create_room_thought(actor: Uuid, room: &RoomAccess) -> Decision {
    view_room(actor, room)
}

/// Posting a chat message requires membership.
pub fn post_chat(actor: Uuid, room: &RoomAccess) -> Decision {
    view_room(actor, room)
}

/// Subscribing to a room's invalidation topic requires membership.
pub fn subscribe_room(actor: Uuid, room: &RoomAccess) -> Decision {
    view_room(actor, room)
}

/// Viewing a single thought: the author always may; members may for
/// room-scoped thoughts.
pub fn view_thought(actor: Uuid, thought: &ThoughtAccess) -> Decision {
    if thought.author_id == actor {
        return Decision::Allowed;
    }
    match thought.room {
        Some(room) if room.is_member(actor) => Decision::Allowed,
        _ => Decision::Forbidden("not allowed to view this thought"),
    }
}

/// Updating: the author, or - for room-scoped thoughts only - any current
/// member.
pub fn update_thought(actor: Uuid, thought: &ThoughtAccess) -> Decision {
    if thought.author_id == actor {
        return Decision::Allowed;
    }
    match thought.room {
        Some(room) if room.is_member(actor) => Decision::Allowed,
        _ => Decision::Forbidden("not allowed to update this thought"),
    }
}

/// Deleting: the author only. Room membership never grants delete.
pub fn delete_thought(actor: Uuid, thought: &ThoughtAccess) -> Decision {
    if thought.author_id == actor {
        Decision::Allowed
    } else {
        Decision::Forbidden("only the author can delete a thought")
    }
}

/// Owner-only room administration: listing/approving/rejecting join
/// requests, kicking, deleting the room.
pub fn manage_room(actor: Uuid, room: &RoomAccess) -> Decision {
    if room.is_owner(actor) {
        Decision::Allowed
    } else {
        Decision::Forbidden(OWNER_ONLY)
    }
}

/// Why a join request is not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinDecision {
    Allowed,
    AlreadyMember,
    IsOwner,
    AlreadyPending,
}

impl JoinDecision {
    /// Denials are business-rule conflicts, not permission failures.
    pub fn require(self) -> ApiResult<()> {
        match self {
            JoinDecision::Allowed => Ok(()),
            JoinDecision::AlreadyMember => Err(ApiError::Conflict("already a member")),
            JoinDecision::IsOwner => Err(ApiError::Conflict("you are the owner")),
            JoinDecision::AlreadyPending => Err(ApiError::Conflict("request already pending")),
        }
    }
}

/// A join may be requested only by a stranger with no pending request.
pub fn request_join(actor: Uuid, room: &RoomAccess, has_pending: bool) -> JoinDecision {
    if room.is_owner(actor) {
        JoinDecision::IsOwner
    } else if room.is_member(actor) {
        JoinDecision::AlreadyMember
    } else if has_pending {
        JoinDecision::AlreadyPending
    } else {
        JoinDecision::Allowed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn room_with(owner: Uuid, members: &[Uuid]) -> RoomAccess {
        let mut member_ids: HashSet<Uuid> = members.iter().copied().collect();
        member_ids.insert(owner);
        RoomAccess {
            room_id: Uuid::new_v4(),
            owner_id: owner,
            member_ids,
        }
    }

    #[test]
    fn members_may_view_strangers_may_not() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let room = room_with(owner, &[member]);

        assert!(view_room(owner, &room).is_allowed());
        assert!(view_room(member, &room).is_allowed());
        assert_eq!(
            view_room(stranger, &room),
            Decision::Forbidden(NOT_A_MEMBER)
        );
    }

    #[test]
    fn only_the_owner_manages_the_room() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let room = room_with(owner, &[member]);

        assert!(manage_room(owner, &room).is_allowed());
        assert_eq!(manage_room(member, &room), Decision::Forbidden(OWNER_ONLY));
    }

    #[test]
    fn personal_thought_is_private_to_its_author() {
        let author = Uuid::new_v4();
        let other = Uuid::new_v4();
        let thought = ThoughtAccess {
            author_id: author,
            room: None,
        };

        assert!(view_thought(author, &thought).is_allowed());
        assert!(update_thought(author, &thought).is_allowed());
        assert!(!view_thought(other, &thought).is_allowed());
        assert!(!update_thought(other, &thought).is_allowed());
    }

    #[test]
    fn room_members_may_update_but_not_delete() {
        let owner = Uuid::new_v4();
        let author = Uuid::new_v4();
        let member = Uuid::new_v4();
        let room = room_with(owner, &[author, member]);
        let thought = ThoughtAccess {
            author_id: author,
            room: Some(&room),
        };

        // The asymmetric rule: any member can update a shared thought,
        // nobody but the author can delete it.
        assert!(update_thought(member, &thought).is_allowed());
        assert!(update_thought(owner, &thought).is_allowed());
        assert!(!delete_thought(member, &thought).is_allowed());
        assert!(!delete_thought(owner, &thought).is_allowed());
        assert!(delete_thought(author, &thought).is_allowed());
    }

    #[test]
    fn kicked_author_keeps_access_to_their_own_thought() {
        let owner = Uuid::new_v4();
        let author = Uuid::new_v4();
        // Author no longer in the member set.
        let room = room_with(owner, &[]);
        let thought = ThoughtAccess {
            author_id: author,
            room: Some(&room),
        };

        assert!(view_thought(author, &thought).is_allowed());
        assert!(delete_thought(author, &thought).is_allowed());
    }

    #[test]
    fn join_rules() {
        let owner = Uuid::new_v4();
        let member = Uuid::new_v4();
        let stranger = Uuid::new_v4();
        let room = room_with(owner, &[member]);

        assert_eq!(request_join(owner, &room, false), JoinDecision::IsOwner);
        assert_eq!(
            request_join(member, &room, false),
            JoinDecision::AlreadyMember
        );
        assert_eq!(
            request_join(stranger, &room, true),
            JoinDecision::AlreadyPending
        );
        assert_eq!(request_join(stranger, &room, false), JoinDecision::Allowed);
    }

    #[test]
    fn decision_require_maps_to_error_kinds() {
        assert!(Decision::Allowed.require().is_ok());
        assert!(matches!(
            Decision::Forbidden("nope").require(),
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            Decision::NotFound("room").require(),
            Err(ApiError::NotFound("room"))
        ));
        assert!(matches!(
            JoinDecision::AlreadyPending.require(),
            Err(ApiError::Conflict(_))
        ));
    }
}
