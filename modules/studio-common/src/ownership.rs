use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{StudioError, StudioResult};

/// Records that belong to a user.
pub trait Ownable {
    /// `None` for records with no owning user, e.g. anonymous activity.
    fn owner_id(&self) -> Option<Uuid>;
}

/// Who is performing an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Actor {
    Staff {
        user_id: Uuid,
    },
    Member {
        user_id: Uuid,
    },
    Anonymous {
        ip: Option<String>,
        session_key: Option<String>,
    },
}

impl Actor {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Actor::Staff { user_id } | Actor::Member { user_id } => Some(*user_id),
            Actor::Anonymous { .. } => None,
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Actor::Staff { .. })
    }

    /// The authenticated user, or a permission error for anonymous actors.
    pub fn require_user(&self) -> StudioResult<Uuid> {
        self.user_id()
            .ok_or_else(|| StudioError::Permission("authentication required".to_string()))
    }

    pub fn require_staff(&self) -> StudioResult<Uuid> {
        match self {
            Actor::Staff { user_id } => Ok(*user_id),
            _ => Err(StudioError::Permission("staff only".to_string())),
        }
    }

    pub fn can_modify<T: Ownable + ?Sized>(&self, target: &T) -> bool {
        match self {
            Actor::Staff { .. } => true,
            Actor::Member { user_id } => target.owner_id() == Some(*user_id),
            Actor::Anonymous { .. } => false,
        }
    }
}

/// Staff may modify anything, members only what they own.
pub fn ensure_can_modify<T: Ownable + ?Sized>(actor: &Actor, target: &T) -> StudioResult<()> {
    if actor.can_modify(target) {
        Ok(())
    } else {
        Err(StudioError::Permission(
            "you can only modify your own content".to_string(),
        ))
    }
}
